use axum::{
    extract::{Path, State},
    Json,
};
use census_search_core::{DimensionsDoc, GeoHierarchiesDoc, SearchEngine, Taxonomy, Topic};
use std::sync::Arc;

use super::AppState;
use crate::error::ApiError;

pub async fn dimensions_handler<E>(State(state): State<Arc<AppState<E>>>) -> Json<DimensionsDoc>
where
    E: SearchEngine + Send + Sync + 'static,
{
    Json(state.reference.dimensions.clone())
}

pub async fn hierarchies_handler<E>(
    State(state): State<Arc<AppState<E>>>,
) -> Json<GeoHierarchiesDoc>
where
    E: SearchEngine + Send + Sync + 'static,
{
    Json(state.reference.hierarchies.clone())
}

pub async fn taxonomy_handler<E>(State(state): State<Arc<AppState<E>>>) -> Json<Taxonomy>
where
    E: SearchEngine + Send + Sync + 'static,
{
    Json(state.reference.taxonomy.clone())
}

pub async fn topic_handler<E>(
    State(state): State<Arc<AppState<E>>>,
    Path(topic): Path<String>,
) -> Result<Json<Topic>, ApiError>
where
    E: SearchEngine + Send + Sync + 'static,
{
    let topic = state.reference.taxonomy.find_topic(&topic)?;
    Ok(Json(topic.clone()))
}
