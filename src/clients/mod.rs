/// Vite Ma Dose API client
use crate::domain::{County, Credits, VaccinationCentres};
use crate::errors::{ApiError, ApiResult};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// HTTP client wrapper with common configuration
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(timeout: Duration) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("vitemadose-service/1.0")
            .build()?;
        Ok(Self { client })
    }

    pub fn get_client(&self) -> &Client {
        &self.client
    }
}

/// Client for the public centre availability feed
pub struct ViteMaDoseClient {
    http_client: HttpClient,
    base_url: String,
}

impl ViteMaDoseClient {
    pub fn new(base_url: String, timeout: Duration) -> ApiResult<Self> {
        Ok(Self {
            http_client: HttpClient::new(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch the department catalogue
    pub async fn fetch_departments(&self) -> ApiResult<Vec<County>> {
        self.get_json("departements.json").await
    }

    /// Fetch the centres of one department
    pub async fn fetch_centres(&self, department: &str) -> ApiResult<VaccinationCentres> {
        self.get_json(&format!("{}.json", department)).await
    }

    /// Fetch the contributor list published next to the feed
    pub async fn fetch_credits(&self) -> ApiResult<Credits> {
        self.get_json("credits.json").await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let url = format!("{}/{}", self.base_url, path);
        debug!("GET {}", url);

        let resp = self.http_client.get_client().get(&url).send().await?;

        if !resp.status().is_success() {
            return Err(ApiError::Upstream {
                status: resp.status().as_u16(),
                url,
            });
        }

        let body = resp.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client_for(server: &MockServer) -> ViteMaDoseClient {
        ViteMaDoseClient::new(server.base_url(), Duration::from_secs(5)).expect("client builds")
    }

    #[tokio::test]
    async fn test_fetch_centres() {
        let server = MockServer::start_async().await;
        let api_mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/75.json");
                then.status(200).json_body(json!({
                    "last_updated": "2021-04-10T14:33:12+02:00",
                    "centres_disponibles": [
                        {"internal_id": "a", "nom": "A", "prochain_rdv": "2021-04-11T09:00:00+02:00"}
                    ],
                    "centres_indisponibles": [{"internal_id": "b", "nom": "B"}]
                }));
            })
            .await;

        let centres = client_for(&server).fetch_centres("75").await.unwrap();

        api_mock.assert_async().await;
        assert_eq!(centres.available_centres().len(), 1);
        assert_eq!(centres.unavailable_centres().len(), 1);
        assert_eq!(centres.last_updated(), Some("2021-04-10T14:33:12+02:00"));
    }

    #[tokio::test]
    async fn test_fetch_departments() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/departements.json");
                then.status(200).json_body(json!([
                    {"code_departement": "01", "nom_departement": "Ain"},
                    {"code_departement": "75", "nom_departement": "Paris"}
                ]));
            })
            .await;

        let counties = client_for(&server).fetch_departments().await.unwrap();
        assert_eq!(counties.len(), 2);
        assert_eq!(counties[1].nom_departement.as_deref(), Some("Paris"));
    }

    #[tokio::test]
    async fn test_fetch_credits() {
        let server = MockServer::start_async().await;
        let credits_mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/credits.json");
                then.status(200).json_body(json!({
                    "contributors": [
                        {"nom": "Jeanne", "pseudo": "jeanne", "teams": ["ios"]},
                        {"pseudo": "bot", "teams": 12}
                    ]
                }));
            })
            .await;

        let credits = client_for(&server).fetch_credits().await.unwrap();

        credits_mock.assert_async().await;
        assert_eq!(credits.contributors.len(), 2);
        assert_eq!(credits.contributors[1].shown_name(), "bot");
        assert_eq!(credits.contributors[1].shown_role(), "");
    }

    #[tokio::test]
    async fn test_upstream_status_is_surfaced() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/99.json");
                then.status(404);
            })
            .await;

        let err = client_for(&server).fetch_centres("99").await.unwrap_err();
        assert!(matches!(err, ApiError::Upstream { status: 404, .. }));
        assert_eq!(err.code(), "UPSTREAM_404");
    }

    #[tokio::test]
    async fn test_malformed_payload_is_decode_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/13.json");
                then.status(200).body("<html>maintenance</html>");
            })
            .await;

        let err = client_for(&server).fetch_centres("13").await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }
}
