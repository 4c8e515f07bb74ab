//! Integration tests for independent cart views (header badge, drawer)
//! refreshing when the cart or session changes.

#![allow(clippy::unwrap_used)]

use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use hazel_lab_core::{ProductId, Role};
use hazel_lab_integration_tests::{TestContext, cart_item_json, user_json};

#[tokio::test]
async fn test_fragment_refetches_only_after_a_change() {
    let ctx = TestContext::new().await;
    ctx.sign_in(1, Role::Customer);
    Mock::given(method("GET"))
        .and(path("/api/itemscarrito/usuario/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            cart_item_json(40, 2, Some((7, "Chips de chocolate", 3490))),
        ])))
        .expect(2)
        .mount(&ctx.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/itemscarrito"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 41 })))
        .mount(&ctx.server)
        .await;

    let badge = ctx.state.cart_fragment("header-badge");

    let first = badge.view().await.unwrap();
    assert_eq!(first.item_count, 2);
    assert_eq!(first.subtotal, "$6.980");

    // No change published, served from the fragment's copy
    assert!(!badge.is_stale());
    badge.view().await.unwrap();

    ctx.state
        .cart()
        .add_product(ProductId::new(8), 1)
        .await
        .unwrap();
    assert!(badge.is_stale());
    badge.view().await.unwrap();
}

#[tokio::test]
async fn test_every_fragment_sees_the_change() {
    let ctx = TestContext::new().await;
    ctx.sign_in(1, Role::Customer);
    Mock::given(method("GET"))
        .and(path("/api/itemscarrito/usuario/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&ctx.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/itemscarrito"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&ctx.server)
        .await;

    let badge = ctx.state.cart_fragment("header-badge");
    let drawer = ctx.state.cart_fragment("drawer");
    badge.view().await.unwrap();
    drawer.view().await.unwrap();

    ctx.state
        .cart()
        .add_product(ProductId::new(8), 1)
        .await
        .unwrap();

    assert!(badge.is_stale());
    assert!(drawer.is_stale());
}

#[tokio::test]
async fn test_logout_empties_fragment_view() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(user_json(1, "ana@duoc.cl", "cliente")),
        )
        .mount(&ctx.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/itemscarrito/usuario/1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([cart_item_json(40, 3, None)])),
        )
        .mount(&ctx.server)
        .await;

    let badge = ctx.state.cart_fragment("header-badge");
    ctx.state
        .auth()
        .login("ana@duoc.cl", SecretString::from("secreto".to_string()))
        .await
        .unwrap();
    assert_eq!(badge.view().await.unwrap().item_count, 3);

    ctx.state.auth().logout();

    assert!(badge.is_stale());
    let view = badge.view().await.unwrap();
    assert!(view.is_empty());
    assert_eq!(view.subtotal, "$0");
}

#[tokio::test]
async fn test_failed_refresh_keeps_last_good_view() {
    let ctx = TestContext::new().await;
    ctx.sign_in(1, Role::Customer);
    Mock::given(method("GET"))
        .and(path("/api/itemscarrito/usuario/1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([cart_item_json(40, 3, None)])),
        )
        .up_to_n_times(1)
        .mount(&ctx.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/itemscarrito/usuario/1"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&ctx.server)
        .await;

    let drawer = ctx.state.cart_fragment("drawer");
    drawer.view().await.unwrap();

    ctx.state
        .notifier()
        .publish(hazel_lab_storefront::notifier::Topic::CartChanged);
    assert!(drawer.view().await.is_err());

    assert!(drawer.is_stale());
    assert_eq!(drawer.cached_view().item_count, 3);
    assert_eq!(drawer.cached_view().items[0].name, "Unnamed product");
}
