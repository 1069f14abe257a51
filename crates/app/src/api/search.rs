use axum::{
    extract::{Query, State},
    Json,
};
use census_search_core::{AggregateSearchResponse, SearchEngine, SearchRequest};
use std::sync::Arc;
use tracing::info;

use super::{AppState, QueryPairs};
use crate::error::ApiError;

/// `/search` query string; every value is validated by the core.
#[derive(Debug, Default)]
pub struct SearchParams {
    pub q: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub dimensions: Option<String>,
    pub hierarchies: Option<String>,
    pub topics: Option<String>,
    pub distance: Option<String>,
    pub relation: Option<String>,
}

impl From<QueryPairs> for SearchParams {
    fn from(pairs: QueryPairs) -> Self {
        Self {
            q: pairs.first("q"),
            limit: pairs.first("limit"),
            offset: pairs.first("offset"),
            dimensions: pairs.first("dimensions"),
            hierarchies: pairs.first("hierarchies"),
            topics: pairs.first("topics"),
            distance: pairs.first("distance"),
            relation: pairs.first("relation"),
        }
    }
}

impl From<SearchParams> for SearchRequest {
    fn from(params: SearchParams) -> Self {
        Self {
            term: params.q.unwrap_or_default(),
            limit: params.limit,
            offset: params.offset,
            dimensions: params.dimensions,
            hierarchies: params.hierarchies,
            topics: params.topics,
            distance: params.distance,
            relation: params.relation,
        }
    }
}

pub async fn search_handler<E>(
    State(state): State<Arc<AppState<E>>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<AggregateSearchResponse>, ApiError>
where
    E: SearchEngine + Send + Sync + 'static,
{
    let params = SearchParams::from(QueryPairs(pairs));
    info!(?params, "search request");
    let request = SearchRequest::from(params);
    let response = state.coordinator.search(&request).await?;

    info!(
        all = response.counts.all,
        datasets = response.counts.datasets,
        area_profiles = response.counts.area_profiles,
        "search completed"
    );
    Ok(Json(response))
}
