use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::errors::AdpubError;

#[derive(Deserialize)]
struct BreweryPayload {
    #[serde(default)]
    status: String,
    // Some deployments of the provider return this as a number, others as a
    // decimal string. Coerced by total_results_count below.
    #[serde(rename = "totalResults", default)]
    total_results: Value,
    #[serde(default)]
    data: Vec<LocationEntry>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct BreweryInfo {
    pub name: Option<String>,
    pub website: Option<String>,
}

/// One location entry as the directory provider returns it. Name and website
/// live on a nested brewery object; the contact fields live on the entry.
#[derive(Deserialize, Clone, Debug)]
pub struct LocationEntry {
    pub brewery: Option<BreweryInfo>,
    pub phone: Option<String>,
    #[serde(rename = "streetAddress")]
    pub street_address: Option<String>,
    #[serde(rename = "postalCode")]
    pub postal_code: Option<String>,
}

/// The stable output shape exposed to HTTP callers. Fields the provider
/// lacks pass through as null.
#[derive(Serialize, Clone, Debug)]
pub struct BusinessRecord {
    pub name: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub street_address: Option<String>,
    pub postal_code: Option<String>,
}

impl From<LocationEntry> for BusinessRecord {
    fn from(entry: LocationEntry) -> Self {
        let (name, website) = match entry.brewery {
            Some(b) => (b.name, b.website),
            None => (None, None),
        };
        Self {
            name,
            website,
            phone: entry.phone,
            street_address: entry.street_address,
            postal_code: entry.postal_code,
        }
    }
}

fn total_results_count(v: &Value) -> u64 {
    match v {
        Value::Number(n) => n.as_u64().unwrap_or(0),
        Value::String(s) => s.parse().unwrap_or(0),
        _ => 0,
    }
}

/// Client for the business directory provider (BreweryDB locations API).
#[derive(Clone)]
pub struct BreweryClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl BreweryClient {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Locality-filtered search. Zero results and a non-"success" status are
    /// both rejections; transport and HTTP errors are unavailability.
    pub async fn find_businesses(&self, city: &str) -> Result<Vec<LocationEntry>, AdpubError> {
        let url = format!("{}/locations", self.base_url);
        let resp = self
            .http
            .get(&url)
            .query(&[("key", self.api_key.as_str()), ("locality", city)])
            .send()
            .await?
            .error_for_status()?;
        let payload: BreweryPayload = resp.json().await?;

        if payload.status != "success" {
            warn!(
                "directory provider rejected search for {:?}: status {:?}",
                city, payload.status
            );
            return Err(AdpubError::ProviderRejected(format!(
                "directory status {:?}",
                payload.status
            )));
        }

        if total_results_count(&payload.total_results) == 0 {
            return Err(AdpubError::ProviderRejected(format!(
                "no directory results for {:?}",
                city
            )));
        }

        Ok(payload.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{web, App, HttpResponse, HttpServer};
    use std::collections::HashMap;

    #[test]
    fn test_total_results_accepts_number_or_string() {
        assert_eq!(total_results_count(&serde_json::json!(12)), 12);
        assert_eq!(total_results_count(&serde_json::json!("7")), 7);
        assert_eq!(total_results_count(&serde_json::json!("junk")), 0);
        assert_eq!(total_results_count(&Value::Null), 0);
    }

    #[test]
    fn test_location_entry_maps_missing_fields_to_null() {
        let entry: LocationEntry = serde_json::from_str(
            r#"{"brewery": {"name": "Barrel House"}, "streetAddress": "9 Vine St"}"#,
        )
        .unwrap();
        let record = BusinessRecord::from(entry);

        assert_eq!(record.name.as_deref(), Some("Barrel House"));
        assert_eq!(record.website, None);
        assert_eq!(record.phone, None);
        assert_eq!(record.street_address.as_deref(), Some("9 Vine St"));
        assert_eq!(record.postal_code, None);

        // Absent fields serialize as explicit nulls, not omitted keys.
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["website"], Value::Null);
        assert_eq!(json["postal_code"], Value::Null);
    }

    #[test]
    fn test_entry_without_brewery_object_maps_to_nulls() {
        let entry: LocationEntry =
            serde_json::from_str(r#"{"phone": "555-0100"}"#).unwrap();
        let record = BusinessRecord::from(entry);

        assert_eq!(record.name, None);
        assert_eq!(record.website, None);
        assert_eq!(record.phone.as_deref(), Some("555-0100"));
    }

    async fn spawn_directory_stub(body: serde_json::Value) -> String {
        let server = HttpServer::new(move || {
            let body = body.clone();
            App::new().route(
                "/locations",
                web::get().to(move |query: web::Query<HashMap<String, String>>| {
                    let body = body.clone();
                    async move {
                        // The provider requires both the key and the filter.
                        if !query.contains_key("key") || !query.contains_key("locality") {
                            return HttpResponse::Ok()
                                .json(serde_json::json!({ "status": "unauthorized" }));
                        }
                        HttpResponse::Ok().json(body)
                    }
                }),
            )
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .unwrap();
        let addr = server.addrs()[0];
        actix_web::rt::spawn(server.run());
        format!("http://{}", addr)
    }

    #[actix_web::test]
    async fn test_find_businesses_returns_entries() {
        let base = spawn_directory_stub(serde_json::json!({
            "status": "success",
            "totalResults": 1,
            "data": [
                {"brewery": {"name": "Hop Works", "website": "https://hopworks.example"},
                 "phone": "555-0100", "streetAddress": "1 Main St", "postalCode": "80014"}
            ]
        }))
        .await;
        let client = BreweryClient::new(reqwest::Client::new(), base, "test-key");

        let entries = client.find_businesses("Aurora").await.unwrap();
        assert_eq!(entries.len(), 1);
        let record = BusinessRecord::from(entries[0].clone());
        assert_eq!(record.name.as_deref(), Some("Hop Works"));
        assert_eq!(record.postal_code.as_deref(), Some("80014"));
    }

    #[actix_web::test]
    async fn test_find_businesses_zero_results_is_rejected() {
        let base = spawn_directory_stub(serde_json::json!({
            "status": "success",
            "totalResults": 0,
            "data": []
        }))
        .await;
        let client = BreweryClient::new(reqwest::Client::new(), base, "test-key");

        let result = client.find_businesses("Nowhere").await;
        assert!(matches!(result, Err(AdpubError::ProviderRejected(_))));
    }

    #[actix_web::test]
    async fn test_find_businesses_unreachable_provider_is_unavailable() {
        let client = BreweryClient::new(reqwest::Client::new(), "http://127.0.0.1:9", "test-key");

        let result = client.find_businesses("Aurora").await;
        assert!(matches!(result, Err(AdpubError::ProviderUnavailable(_))));
    }
}
