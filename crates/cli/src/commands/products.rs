//! Catalog listing.

use hazel_lab_storefront::config::StorefrontConfig;

use super::{CliError, app_state};

/// Print the catalog, or only featured products.
///
/// # Errors
///
/// Returns an error if the backend cannot be reached.
pub async fn list(config: StorefrontConfig, featured: bool) -> Result<(), CliError> {
    let state = app_state(config)?;
    let products = if featured {
        state.api().featured_products().await?
    } else {
        state.api().products().await?
    };

    tracing::debug!(count = products.len(), featured, "Fetched products");

    #[allow(clippy::print_stdout)]
    {
        if products.is_empty() {
            println!("No products.");
        }
        for product in &products {
            let mut flags = Vec::new();
            if product.destacado {
                flags.push("featured");
            }
            if !product.is_available() {
                flags.push("unavailable");
            } else if product.is_stock_critical() {
                flags.push("low stock");
            }
            println!(
                "{:>5}  {:<40} {:>10}  stock {:>4}  {}",
                product.id.as_i64(),
                product.name,
                product.cost.display(),
                product.stock,
                flags.join(", ")
            );
        }
    }
    Ok(())
}
