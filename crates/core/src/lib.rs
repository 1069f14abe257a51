pub mod assemble;
pub mod distance;
pub mod error;
pub mod filters;
pub mod geo;
pub mod models;
pub mod orchestrator;
pub mod pagination;
pub mod postcode;
pub mod query;
pub mod reference;
pub mod stores;
pub mod traits;

pub use distance::{Distance, DistanceUnit, GeoRelation};
pub use error::{ErrorKind, ReferenceDataError, SearchError};
pub use filters::{FilterField, FilterTerm};
pub use geo::{circle_to_polygon, Coordinate, GeoLocation, GeoPolygon};
pub use models::{
    AggregateSearchResponse, AreaProfile, Counts, DatasetSearchResults, SearchResult, SearchResults,
};
pub use orchestrator::{AreaSearchRequest, SearchConfig, SearchCoordinator, SearchRequest};
pub use pagination::PageWindow;
pub use reference::{DimensionsDoc, GeoHierarchiesDoc, ReferenceData, Taxonomy, Topic};
pub use stores::ElasticsearchStore;
pub use traits::SearchEngine;
