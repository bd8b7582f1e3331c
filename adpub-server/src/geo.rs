use serde::Deserialize;
use tracing::warn;

use crate::errors::AdpubError;

/// ip-api.com style response. Failed lookups come back with HTTP 200 and a
/// non-"success" status field.
#[derive(Deserialize)]
struct GeoPayload {
    #[serde(default)]
    status: String,
    city: Option<String>,
}

/// Client for the external IP geolocation provider.
#[derive(Clone)]
pub struct GeoClient {
    http: reqwest::Client,
    base_url: String,
}

impl GeoClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Resolves an IP address to the city the provider reports for it.
    /// One outbound request, single attempt, no retry.
    pub async fn locate(&self, ip: &str) -> Result<String, AdpubError> {
        let url = format!("{}/{}", self.base_url, ip);
        let resp = self.http.get(&url).send().await?.error_for_status()?;
        let payload: GeoPayload = resp.json().await?;

        if payload.status != "success" {
            warn!(
                "geolocation provider rejected lookup of {}: status {:?}",
                ip, payload.status
            );
            return Err(AdpubError::ProviderRejected(format!(
                "geolocation status {:?}",
                payload.status
            )));
        }

        payload.city.ok_or_else(|| {
            AdpubError::ProviderRejected("geolocation response carried no city".to_string())
        })
    }
}
