use crate::geo::Coordinate;
use crate::models::{AreaProfile, EngineResponse};
use crate::query::SearchBody;
use crate::SearchError;
use async_trait::async_trait;

/// The document store the orchestrator talks to.
#[async_trait]
pub trait SearchEngine {
    /// Runs `body` against every index in `indices` at once.
    async fn query(&self, indices: &[&str], body: &SearchBody) -> Result<EngineResponse, SearchError>;

    async fn get_area_profile(&self, index: &str, id: &str) -> Result<AreaProfile, SearchError>;

    /// Resolves a normalised (lower-case, no whitespace) postcode to its centroid.
    async fn lookup_postcode(
        &self,
        index: &str,
        postcode: &str,
    ) -> Result<Option<Coordinate>, SearchError>;
}
