//! Cart commands.
//!
//! Each invocation logs in with the given credentials, performs one cart
//! operation and prints the refreshed cart.
//!
//! # Usage
//!
//! ```bash
//! hl-cli cart --email ana@duoc.cl --password secreto show
//! hl-cli cart --email ana@duoc.cl --password secreto add 12 --quantity 2
//! hl-cli cart --email ana@duoc.cl --password secreto remove 40
//! ```

use secrecy::SecretString;

use hazel_lab_core::{CartItemId, ProductId};
use hazel_lab_storefront::AppState;
use hazel_lab_storefront::config::StorefrontConfig;
use hazel_lab_storefront::views::CartView;

use super::{CliError, app_state};

/// A single cart operation.
#[derive(Debug, Clone, Copy)]
pub enum CartOp {
    Show,
    Add { product: i64, quantity: u32 },
    Increase { item: i64 },
    Decrease { item: i64 },
    Set { item: i64, quantity: u32 },
    Remove { item: i64 },
}

/// Log in, apply `op`, then print the cart.
///
/// # Errors
///
/// Returns an error if login fails or the backend rejects the operation.
pub async fn run(
    config: StorefrontConfig,
    email: &str,
    password: SecretString,
    op: CartOp,
) -> Result<(), CliError> {
    let state = app_state(config)?;
    // Subscribed before any mutation so it sees every publish.
    let fragment = state.cart_fragment("cli");

    let user = state.auth().login(email, password).await?;
    tracing::info!(user_id = %user.id, "Logged in");

    apply(&state, op).await?;

    let view = fragment.view().await?;
    print_cart(&view);

    state.auth().logout();
    Ok(())
}

async fn apply(state: &AppState, op: CartOp) -> Result<(), CliError> {
    let cart = state.cart();
    match op {
        CartOp::Show => {}
        CartOp::Add { product, quantity } => {
            cart.add_product(ProductId::new(product), quantity).await?;
        }
        CartOp::Increase { item } => {
            cart.load().await?;
            cart.increase(CartItemId::new(item)).await?;
        }
        CartOp::Decrease { item } => {
            cart.load().await?;
            cart.decrease(CartItemId::new(item)).await?;
        }
        CartOp::Set { item, quantity } => {
            cart.set_quantity(CartItemId::new(item), quantity).await?;
        }
        CartOp::Remove { item } => {
            cart.remove(CartItemId::new(item)).await?;
        }
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_cart(view: &CartView) {
    if view.is_empty() {
        println!("Your cart is empty.");
        return;
    }
    for item in &view.items {
        println!(
            "{:>5}  {:<40} {:>3} x {:>10} = {:>10}",
            item.id.as_i64(),
            item.name,
            item.quantity,
            item.price,
            item.line_price
        );
    }
    println!("{} item(s), subtotal {}", view.item_count, view.subtotal);
}
