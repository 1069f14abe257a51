use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::geo::Coordinate;
use crate::models::{AreaProfile, EngineResponse};
use crate::query::SearchBody;
use crate::traits::SearchEngine;
use crate::SearchError;

const BACKEND: &str = "elasticsearch";

pub struct ElasticsearchStore {
    client: Client,
    endpoint: Url,
}

impl ElasticsearchStore {
    /// `timeout` bounds every request sent to the cluster.
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, SearchError> {
        let mut endpoint = Url::parse(endpoint)?;
        if !endpoint.path().ends_with('/') {
            let path = format!("{}/", endpoint.path());
            endpoint.set_path(&path);
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }

    fn search_url(&self, indices: &[&str]) -> Result<Url, SearchError> {
        Ok(self.endpoint.join(&format!("{}/_search", indices.join(",")))?)
    }

    async fn search<T: DeserializeOwned>(
        &self,
        indices: &[&str],
        body: &SearchBody,
    ) -> Result<T, SearchError> {
        let url = self.search_url(indices)?;
        debug!(%url, "sending search request");

        let response = self.client.post(url).json(body).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let details = response.text().await.unwrap_or_default();
        Err(status_error(status, &indices.join(","), details))
    }
}

fn status_error(status: StatusCode, indices: &str, details: String) -> SearchError {
    match status {
        StatusCode::NOT_FOUND => SearchError::IndexNotFound(indices.to_string()),
        StatusCode::BAD_REQUEST => SearchError::BadSearchQuery(details),
        _ => SearchError::BackendResponse {
            backend: BACKEND.to_string(),
            status: status.as_u16(),
            details,
        },
    }
}

#[derive(Debug, Deserialize)]
struct SourceResponse<T> {
    hits: SourceHits<T>,
}

#[derive(Debug, Deserialize)]
struct SourceHits<T> {
    #[serde(default = "Vec::new")]
    hits: Vec<SourceHit<T>>,
}

#[derive(Debug, Deserialize)]
struct SourceHit<T> {
    #[serde(rename = "_source")]
    source: T,
}

impl<T> SourceResponse<T> {
    fn first(self) -> Option<T> {
        self.hits.hits.into_iter().next().map(|hit| hit.source)
    }
}

#[derive(Debug, Deserialize)]
struct PostcodeDoc {
    pin: Pin,
}

#[derive(Debug, Deserialize)]
struct Pin {
    location: Coordinate,
}

#[async_trait]
impl SearchEngine for ElasticsearchStore {
    async fn query(&self, indices: &[&str], body: &SearchBody) -> Result<EngineResponse, SearchError> {
        self.search(indices, body).await
    }

    async fn get_area_profile(&self, index: &str, id: &str) -> Result<AreaProfile, SearchError> {
        let body = SearchBody::lookup("id", id);
        let response: SourceResponse<AreaProfile> = self.search(&[index], &body).await?;
        response.first().ok_or(SearchError::AreaProfileNotFound)
    }

    async fn lookup_postcode(
        &self,
        index: &str,
        postcode: &str,
    ) -> Result<Option<Coordinate>, SearchError> {
        let body = SearchBody::lookup("postcode", postcode);
        let response: SourceResponse<PostcodeDoc> = self.search(&[index], &body).await?;
        Ok(response.first().map(|doc| doc.pin.location))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store(endpoint: &str) -> ElasticsearchStore {
        ElasticsearchStore::new(endpoint, Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn search_url_joins_indices() {
        let url = store("http://localhost:9200")
            .search_url(&["datasets", "area-profiles"])
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:9200/datasets,area-profiles/_search");
    }

    #[test]
    fn search_url_keeps_endpoint_path_prefix() {
        let url = store("https://search.internal/es").search_url(&["postcodes"]).unwrap();
        assert_eq!(url.as_str(), "https://search.internal/es/postcodes/_search");
    }

    #[test]
    fn invalid_endpoint_is_rejected() {
        let result = ElasticsearchStore::new("not a url", Duration::from_secs(1));
        assert!(matches!(result, Err(SearchError::Url(_))));
    }

    #[test]
    fn statuses_map_to_typed_errors() {
        assert!(matches!(
            status_error(StatusCode::NOT_FOUND, "datasets", String::new()),
            SearchError::IndexNotFound(index) if index == "datasets"
        ));
        assert!(matches!(
            status_error(StatusCode::BAD_REQUEST, "datasets", "parse_exception".to_string()),
            SearchError::BadSearchQuery(details) if details == "parse_exception"
        ));
        assert!(matches!(
            status_error(StatusCode::SERVICE_UNAVAILABLE, "datasets", String::new()),
            SearchError::BackendResponse { status: 503, .. }
        ));
    }

    #[test]
    fn postcode_hit_yields_its_pin() {
        let response: SourceResponse<PostcodeDoc> = serde_json::from_value(json!({
            "hits": {"total": {"value": 1}, "hits": [{
                "_source": {"postcode": "sw1a1aa", "pin": {"location": {"lat": 51.501009, "lon": -0.141588}}}
            }]}
        }))
        .unwrap();

        let centre = response.first().map(|doc| doc.pin.location);
        assert_eq!(
            centre,
            Some(Coordinate {
                lat: 51.501009,
                lon: -0.141588
            })
        );
    }

    #[test]
    fn no_hits_means_no_document() {
        let response: SourceResponse<PostcodeDoc> =
            serde_json::from_value(json!({"hits": {"total": 0, "hits": []}})).unwrap();
        assert!(response.first().is_none());
    }
}
