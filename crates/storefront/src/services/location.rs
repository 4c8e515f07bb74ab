//! Region and commune pickers for address forms.
//!
//! Address forms must stay usable when the backend lookup is down, so these
//! calls never fail: regions fall back to a built-in list, communes to none.

use tracing::{instrument, warn};

use crate::api::ApiClient;

/// Chilean regions, north to south.
pub const CHILEAN_REGIONS: [&str; 16] = [
    "Arica y Parinacota",
    "Tarapacá",
    "Antofagasta",
    "Atacama",
    "Coquimbo",
    "Valparaíso",
    "Metropolitana",
    "O'Higgins",
    "Maule",
    "Ñuble",
    "Biobío",
    "Araucanía",
    "Los Ríos",
    "Los Lagos",
    "Aysén",
    "Magallanes",
];

#[derive(Debug, Clone)]
pub struct LocationService {
    api: ApiClient,
}

impl LocationService {
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Region names from the backend, or [`CHILEAN_REGIONS`] if the lookup fails.
    #[instrument(skip(self))]
    pub async fn regions(&self) -> Vec<String> {
        match self.api.regions().await {
            Ok(regions) => regions,
            Err(err) => {
                warn!(error = %err, "Region lookup failed, using built-in list");
                CHILEAN_REGIONS.iter().map(ToString::to_string).collect()
            }
        }
    }

    /// Communes of `region`, or an empty list if the lookup fails.
    #[instrument(skip(self))]
    pub async fn communes(&self, region: &str) -> Vec<String> {
        if region.trim().is_empty() {
            return Vec::new();
        }
        match self.api.communes(region).await {
            Ok(communes) => communes,
            Err(err) => {
                warn!(error = %err, region, "Commune lookup failed");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::StorefrontConfig;

    fn offline() -> LocationService {
        let config = StorefrontConfig::for_api_url("http://127.0.0.1:9/api").unwrap();
        LocationService::new(ApiClient::new(&config).unwrap())
    }

    #[tokio::test]
    async fn test_unreachable_backend_falls_back() {
        let locations = offline();

        let regions = locations.regions().await;
        assert_eq!(regions.len(), 16);
        assert_eq!(regions[0], "Arica y Parinacota");
        assert_eq!(regions[6], "Metropolitana");

        assert!(locations.communes("Valparaíso").await.is_empty());
    }

    #[tokio::test]
    async fn test_blank_region_has_no_communes() {
        assert!(offline().communes("  ").await.is_empty());
    }
}
