use axum::{
    extract::{Path, Query, State},
    Json,
};
use census_search_core::{AreaProfile, AreaSearchRequest, DatasetSearchResults, SearchEngine};
use std::sync::Arc;
use tracing::info;

use super::{AppState, QueryPairs};
use crate::error::ApiError;

#[derive(Debug, Default)]
pub struct AreaSearchParams {
    pub q: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub dimensions: Option<String>,
    pub topics: Option<String>,
    pub relation: Option<String>,
}

impl From<QueryPairs> for AreaSearchParams {
    fn from(pairs: QueryPairs) -> Self {
        Self {
            q: pairs.first("q"),
            limit: pairs.first("limit"),
            offset: pairs.first("offset"),
            dimensions: pairs.first("dimensions"),
            topics: pairs.first("topics"),
            relation: pairs.first("relation"),
        }
    }
}

pub async fn get_area_profile_handler<E>(
    State(state): State<Arc<AppState<E>>>,
    Path(id): Path<String>,
) -> Result<Json<AreaProfile>, ApiError>
where
    E: SearchEngine + Send + Sync + 'static,
{
    info!(%id, "area profile request");
    let profile = state.coordinator.area_profile(&id).await?;
    Ok(Json(profile))
}

/// Dataset search bounded by one area profile's stored geometry.
pub async fn search_area_profile_handler<E>(
    State(state): State<Arc<AppState<E>>>,
    Path(id): Path<String>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<DatasetSearchResults>, ApiError>
where
    E: SearchEngine + Send + Sync + 'static,
{
    let params = AreaSearchParams::from(QueryPairs(pairs));
    info!(%id, ?params, "area profile search request");
    let request = AreaSearchRequest {
        id,
        term: params.q.unwrap_or_default(),
        limit: params.limit,
        offset: params.offset,
        dimensions: params.dimensions,
        topics: params.topics,
        relation: params.relation,
    };

    let results = state.coordinator.search_area_profile(&request).await?;
    info!(id = %request.id, total_count = results.total_count, "area profile search completed");
    Ok(Json(results))
}
