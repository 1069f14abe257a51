//! HTTP surface of the census search service.
//!
//! Every route answers `GET` and a bodiless `OPTIONS`, and every response carries the
//! permissive CORS headers browsers expect from a public read-only API.

use axum::{
    http::{header, HeaderValue, StatusCode},
    routing::get,
    Router,
};
use census_search_core::{ReferenceData, SearchCoordinator, SearchEngine};
use std::sync::Arc;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

pub mod area_profiles;
pub mod reference;
pub mod search;

use area_profiles::{get_area_profile_handler, search_area_profile_handler};
use reference::{dimensions_handler, hierarchies_handler, taxonomy_handler, topic_handler};
use search::search_handler;

/// Raw query-string pairs in arrival order.
///
/// A repeated key keeps its first value, so `?q=a&q=b` searches for `a`.
#[derive(Debug, Default)]
pub struct QueryPairs(pub Vec<(String, String)>);

impl QueryPairs {
    pub fn first(&self, key: &str) -> Option<String> {
        self.0
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.clone())
    }
}

/// Application state
pub struct AppState<E> {
    pub coordinator: SearchCoordinator<E>,
    pub reference: ReferenceData,
}

/// Build the API router
pub fn router<E>(state: Arc<AppState<E>>) -> Router
where
    E: SearchEngine + Send + Sync + 'static,
{
    Router::new()
        .route("/search", get(search_handler::<E>).options(preflight_handler))
        .route(
            "/area-profiles/{id}",
            get(get_area_profile_handler::<E>).options(preflight_handler),
        )
        .route(
            "/area-profiles/{id}/search",
            get(search_area_profile_handler::<E>).options(preflight_handler),
        )
        .route(
            "/dimensions",
            get(dimensions_handler::<E>).options(preflight_handler),
        )
        .route(
            "/hierarchies",
            get(hierarchies_handler::<E>).options(preflight_handler),
        )
        .route(
            "/taxonomy",
            get(taxonomy_handler::<E>).options(preflight_handler),
        )
        .route(
            "/taxonomy/{topic}",
            get(topic_handler::<E>).options(preflight_handler),
        )
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET,OPTIONS"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_MAX_AGE,
            HeaderValue::from_static("86400"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn preflight_handler() -> StatusCode {
    StatusCode::NO_CONTENT
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request};
    use axum::response::Response;
    use census_search_core::models::{EngineHit, EngineHits, EngineResponse, HitTotal};
    use census_search_core::query::SearchBody;
    use census_search_core::reference::{DimensionObject, Topic};
    use census_search_core::{
        AreaProfile, Coordinate, GeoLocation, SearchConfig, SearchError, SearchResult, Taxonomy,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    struct FakeEngine {
        fail: bool,
    }

    #[async_trait]
    impl SearchEngine for FakeEngine {
        async fn query(&self, indices: &[&str], _body: &SearchBody) -> Result<EngineResponse, SearchError> {
            if self.fail {
                return Err(SearchError::BackendResponse {
                    backend: "elasticsearch".to_string(),
                    status: 503,
                    details: "cluster unavailable".to_string(),
                });
            }
            Ok(EngineResponse {
                hits: EngineHits {
                    total: HitTotal::Tracked { value: 12 },
                    hits: vec![EngineHit {
                        source: SearchResult {
                            title: format!("{} income", indices.join(",")),
                            ..SearchResult::default()
                        },
                        ..EngineHit::default()
                    }],
                },
            })
        }

        async fn get_area_profile(&self, _index: &str, id: &str) -> Result<AreaProfile, SearchError> {
            if id != "W92000004" {
                return Err(SearchError::AreaProfileNotFound);
            }
            Ok(AreaProfile {
                id: id.to_string(),
                name: "Wales".to_string(),
                code: id.to_string(),
                datasets: Default::default(),
                hierarchy: "Countries".to_string(),
                links: Default::default(),
                location: GeoLocation {
                    kind: "polygon".to_string(),
                    coordinates: json!([[[-5.3, 51.3], [-2.6, 51.3], [-2.6, 53.4], [-5.3, 51.3]]]),
                },
                statistics: Vec::new(),
                visualisations: Default::default(),
            })
        }

        async fn lookup_postcode(
            &self,
            _index: &str,
            _postcode: &str,
        ) -> Result<Option<Coordinate>, SearchError> {
            Ok(None)
        }
    }

    fn app(fail: bool) -> Router {
        let reference = ReferenceData {
            dimensions: census_search_core::DimensionsDoc {
                items: vec![DimensionObject {
                    label: "Sex".to_string(),
                    name: "sex".to_string(),
                }],
                total_count: 1,
            },
            taxonomy: Taxonomy {
                topics: vec![Topic {
                    title: "Health".to_string(),
                    formatted_title: "health".to_string(),
                    child_topics: Vec::new(),
                }],
            },
            ..ReferenceData::default()
        };
        router(Arc::new(AppState {
            coordinator: SearchCoordinator::new(FakeEngine { fail }, SearchConfig::default()),
            reference,
        }))
    }

    async fn send(app: Router, method: Method, uri: &str) -> Response {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        app.oneshot(request).await.unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn search_returns_every_target() {
        let response = send(app(false), Method::GET, "/search?q=income").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
        assert_eq!(response.headers()["content-type"], "application/json");

        let body = json_body(response).await;
        assert_eq!(body["limit"], json!(50));
        assert_eq!(body["offset"], json!(0));
        assert_eq!(body["datasets"]["items"][0]["title"], json!("datasets income"));
        assert_eq!(body["area_profiles"]["count"], json!(1));
        assert_eq!(body["counts"]["all"], json!(12));
        assert_eq!(body["publications"]["items"], json!([]));
    }

    #[test]
    fn repeated_keys_keep_the_first_value() {
        let pairs = QueryPairs(vec![
            ("q".to_string(), "income".to_string()),
            ("limit".to_string(), "5".to_string()),
            ("q".to_string(), "tax".to_string()),
        ]);
        assert_eq!(pairs.first("q").as_deref(), Some("income"));
        assert_eq!(pairs.first("limit").as_deref(), Some("5"));
        assert_eq!(pairs.first("offset"), None);
    }

    #[tokio::test]
    async fn repeated_query_keys_still_search() {
        let response = send(app(false), Method::GET, "/search?q=income&q=tax&limit=5&limit=x").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "application/json");
        assert_eq!(json_body(response).await["limit"], json!(5));

        let response = send(
            app(false),
            Method::GET,
            "/area-profiles/W92000004/search?q=population&relation=within&relation=touches",
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn repeated_bad_value_keeps_the_json_error_body() {
        let response = send(app(false), Method::GET, "/search?q=&q=income").await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()["content-type"], "application/json");
        assert_eq!(json_body(response).await["code"], json!("empty_search_term"));
    }

    #[tokio::test]
    async fn empty_term_is_a_bad_request() {
        let response = send(app(false), Method::GET, "/search?q=").await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["message"], json!("empty search term"));
        assert_eq!(body["code"], json!("empty_search_term"));
    }

    #[tokio::test]
    async fn offset_past_the_window_names_the_limit() {
        let response = send(app(false), Method::GET, "/search?q=test&offset=2000").await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["message"].as_str().unwrap().contains("1000"));
    }

    #[tokio::test]
    async fn engine_failures_are_opaque() {
        let response = send(app(true), Method::GET, "/search?q=income").await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["message"], json!("internal server error"));
    }

    #[tokio::test]
    async fn options_is_an_empty_no_content() {
        let response = send(app(false), Method::OPTIONS, "/search").await;

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(response.headers()["access-control-allow-methods"], "GET,OPTIONS");
        assert_eq!(response.headers()["access-control-max-age"], "86400");
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn area_profile_lookup_and_missing_profile() {
        let response = send(app(false), Method::GET, "/area-profiles/W92000004").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["name"], json!("Wales"));

        let response = send(app(false), Method::GET, "/area-profiles/X00000000").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["message"], json!("area profile not found"));
    }

    #[tokio::test]
    async fn area_profile_search_echoes_the_page() {
        let response = send(
            app(false),
            Method::GET,
            "/area-profiles/W92000004/search?q=population&limit=5&relation=within",
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["limit"], json!(5));
        assert_eq!(body["total_count"], json!(12));
    }

    #[tokio::test]
    async fn invalid_relation_is_rejected() {
        let response = send(
            app(false),
            Method::GET,
            "/area-profiles/W92000004/search?q=population&relation=touches",
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn reference_documents_are_served() {
        let body = json_body(send(app(false), Method::GET, "/dimensions").await).await;
        assert_eq!(body["items"][0]["name"], json!("sex"));

        let body = json_body(send(app(false), Method::GET, "/hierarchies").await).await;
        assert_eq!(body["total_count"], json!(0));

        let response = send(app(false), Method::GET, "/taxonomy/health").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["title"], json!("Health"));

        let response = send(app(false), Method::GET, "/taxonomy/unknown").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["message"], json!("Topic not found"));
    }
}
