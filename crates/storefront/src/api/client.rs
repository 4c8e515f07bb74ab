//! HTTP client for the backend REST API.

use std::sync::Arc;

use moka::future::Cache;
use reqwest::{Method, RequestBuilder};
use secrecy::SecretString;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use hazel_lab_core::{CartItemId, ProductId, UserId};

use super::cache::{CacheKey, CacheValue};
use super::types::{
    AddCartItemRequest, LoginRequest, NewUser, ProductFilter, ProductInput, QuantityUpdate,
    UserFilter, UserUpdate,
};
use super::{ApiError, extract_message};
use crate::config::StorefrontConfig;
use crate::models::{BestSeller, CartSnapshot, Category, DashboardStats, Product, User};

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the backend REST API.
///
/// Cheap to clone; clones share the connection pool and the catalog cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    config: StorefrontConfig,
    cache: Cache<CacheKey, CacheValue>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("api_url", &self.inner.config.api_url.as_str())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Build`] if the TLS backend cannot be initialized.
    pub fn new(config: &StorefrontConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(ApiError::Build)?;

        let cache = Cache::builder()
            .max_capacity(16)
            .time_to_live(config.catalog_cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                config: config.clone(),
                cache,
            }),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.inner
            .client
            .request(method, self.inner.config.endpoint(path))
            .header("Accept", "application/json")
    }

    /// Send a request and return the body of a 2xx response.
    async fn execute(&self, path: &str, request: RequestBuilder) -> Result<String, ApiError> {
        let response = request.send().await.map_err(|source| ApiError::Http {
            endpoint: path.to_string(),
            source,
        })?;

        let status = response.status();

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await.map_err(|source| ApiError::Http {
            endpoint: path.to_string(),
            source,
        })?;

        if !status.is_success() {
            tracing::warn!(
                endpoint = %path,
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "Backend returned non-success status"
            );
            return Err(ApiError::Status {
                endpoint: path.to_string(),
                status,
                message: extract_message(&response_text),
            });
        }

        Ok(response_text)
    }

    fn decode<T: DeserializeOwned>(path: &str, response_text: &str) -> Result<T, ApiError> {
        serde_json::from_str(response_text).map_err(|source| {
            tracing::error!(
                endpoint = %path,
                error = %source,
                body = %response_text.chars().take(500).collect::<String>(),
                "Failed to parse backend response"
            );
            ApiError::Decode {
                endpoint: path.to_string(),
                source,
            }
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let text = self.execute(path, self.request(Method::GET, path)).await?;
        Self::decode(path, &text)
    }

    async fn get_json_with_query<Q, T>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let text = self
            .execute(path, self.request(Method::GET, path).query(query))
            .await?;
        Self::decode(path, &text)
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let text = self
            .execute(path, self.request(method, path).json(body))
            .await?;
        Self::decode(path, &text)
    }

    /// Send a mutation whose response body carries nothing the caller needs.
    async fn send_ignoring_body<B>(&self, method: Method, path: &str, body: &B) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized,
    {
        self.execute(path, self.request(method, path).json(body))
            .await
            .map(drop)
    }

    async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.execute(path, self.request(Method::DELETE, path))
            .await
            .map(drop)
    }

    // =========================================================================
    // Catalog Methods
    // =========================================================================

    /// List all products.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Vec<Product>, ApiError> {
        self.cached_products(CacheKey::Products, "productos").await
    }

    /// List products flagged as featured.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn featured_products(&self) -> Result<Vec<Product>, ApiError> {
        self.cached_products(CacheKey::FeaturedProducts, "productos/destacados")
            .await
    }

    async fn cached_products(&self, key: CacheKey, path: &str) -> Result<Vec<Product>, ApiError> {
        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&key).await {
            debug!(?key, "Cache hit for products");
            return Ok(products);
        }

        let products: Vec<Product> = self.get_json(path).await?;

        self.inner
            .cache
            .insert(key, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    /// List all categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        if let Some(CacheValue::Categories(categories)) =
            self.inner.cache.get(&CacheKey::Categories).await
        {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let categories: Vec<Category> = self.get_json("categorias").await?;

        self.inner
            .cache
            .insert(
                CacheKey::Categories,
                CacheValue::Categories(categories.clone()),
            )
            .await;

        Ok(categories)
    }

    /// Search products by any combination of filters.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn search_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, ApiError> {
        self.get_json_with_query("productos/buscar/avanzada", filter)
            .await
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_product(&self, input: &ProductInput) -> Result<Product, ApiError> {
        let product = self.send_json(Method::POST, "productos", input).await?;
        self.invalidate_products().await;
        Ok(product)
    }

    /// Replace a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, input), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, ApiError> {
        let product = self
            .send_json(Method::PUT, &format!("productos/{id}"), input)
            .await?;
        self.invalidate_products().await;
        Ok(product)
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: ProductId) -> Result<(), ApiError> {
        self.delete(&format!("productos/{id}")).await?;
        self.invalidate_products().await;
        Ok(())
    }

    // =========================================================================
    // User Methods
    // =========================================================================

    /// List all users.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn users(&self) -> Result<Vec<User>, ApiError> {
        self.get_json("usuarios").await
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the user does not exist or the API request fails.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn user(&self, id: UserId) -> Result<User, ApiError> {
        self.get_json(&format!("usuarios/{id}")).await
    }

    /// Search users by any combination of filters.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn search_users(&self, filter: &UserFilter) -> Result<Vec<User>, ApiError> {
        self.get_json_with_query("usuarios/buscar/avanzada", filter)
            .await
    }

    /// Create a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the user or the request fails.
    #[instrument(skip(self, user), fields(email = %user.email))]
    pub async fn create_user(&self, user: &NewUser) -> Result<User, ApiError> {
        self.send_json(Method::POST, "usuarios", user).await
    }

    /// Update a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the update or the request fails.
    #[instrument(skip(self, update), fields(user_id = %id))]
    pub async fn update_user(&self, id: UserId, update: &UserUpdate) -> Result<User, ApiError> {
        self.send_json(Method::PUT, &format!("usuarios/{id}"), update)
            .await
    }

    /// Delete a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn delete_user(&self, id: UserId) -> Result<(), ApiError> {
        self.delete(&format!("usuarios/{id}")).await
    }

    /// Authenticate with email and password.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Status`] when the backend rejects the credentials.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<User, ApiError> {
        self.send_json(Method::POST, "auth/login", &LoginRequest { email, password })
            .await
    }

    // =========================================================================
    // Location Methods
    // =========================================================================

    /// List Chilean region names.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn regions(&self) -> Result<Vec<String>, ApiError> {
        if let Some(CacheValue::Names(regions)) = self.inner.cache.get(&CacheKey::Regions).await {
            debug!("Cache hit for regions");
            return Ok(regions);
        }

        let regions: Vec<String> = self.get_json("ubicacion/regiones").await?;

        self.inner
            .cache
            .insert(CacheKey::Regions, CacheValue::Names(regions.clone()))
            .await;

        Ok(regions)
    }

    /// List the communes of a region.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn communes(&self, region: &str) -> Result<Vec<String>, ApiError> {
        self.get_json(&format!(
            "ubicacion/comunas/{}",
            urlencoding::encode(region)
        ))
        .await
    }

    // =========================================================================
    // Dashboard Methods
    // =========================================================================

    /// Fetch the admin dashboard's headline figures.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        self.get_json("dashboard/estadisticas").await
    }

    /// Fetch the best-selling products.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn best_sellers(&self) -> Result<Vec<BestSeller>, ApiError> {
        self.get_json("dashboard/productos-mas-vendidos").await
    }

    // =========================================================================
    // Cart Methods (not cached - mutable state)
    // =========================================================================

    /// Fetch a user's cart lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn cart_items(&self, user_id: UserId) -> Result<CartSnapshot, ApiError> {
        self.get_json(&format!("itemscarrito/usuario/{user_id}"))
            .await
    }

    /// Add a product to a user's cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn add_cart_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), ApiError> {
        let body = AddCartItemRequest {
            usuario: user_id.into(),
            producto: product_id.into(),
            quantity,
        };
        self.send_ignoring_body(Method::POST, "itemscarrito", &body)
            .await
    }

    /// Set the quantity of a cart line.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(item_id = %item_id))]
    pub async fn update_cart_item_quantity(
        &self,
        item_id: CartItemId,
        quantity: u32,
    ) -> Result<(), ApiError> {
        self.send_ignoring_body(
            Method::PUT,
            &format!("itemscarrito/{item_id}/cantidad"),
            &QuantityUpdate { quantity },
        )
        .await
    }

    /// Remove a cart line.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(item_id = %item_id))]
    pub async fn remove_cart_item(&self, item_id: CartItemId) -> Result<(), ApiError> {
        self.delete(&format!("itemscarrito/{item_id}")).await
    }

    // =========================================================================
    // Cache Management
    // =========================================================================

    /// Drop cached product listings.
    pub async fn invalidate_products(&self) {
        self.inner.cache.invalidate(&CacheKey::Products).await;
        self.inner.cache.invalidate(&CacheKey::FeaturedProducts).await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_shows_base_url_only() {
        let config = StorefrontConfig::for_api_url("http://localhost:8080/api").unwrap();
        let client = ApiClient::new(&config).unwrap();
        let debug = format!("{client:?}");
        assert!(debug.contains("http://localhost:8080/api"));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_http_error() {
        // Port 9 (discard) is closed on test machines.
        let config = StorefrontConfig::for_api_url("http://127.0.0.1:9/api").unwrap();
        let client = ApiClient::new(&config).unwrap();

        let err = client.categories().await.unwrap_err();
        assert!(matches!(err, ApiError::Http { ref endpoint, .. } if endpoint == "categorias"));
        assert!(err.status().is_none());
    }
}
