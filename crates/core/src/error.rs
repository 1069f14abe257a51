use std::sync::Arc;

use thiserror::Error;

/// How an error should be reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BadRequest,
    NotFound,
    Internal,
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("empty search term")]
    EmptySearchTerm,

    #[error("failed to parse query parameters, values must be an integer")]
    ParsingQueryParameters,

    #[error("limit needs to be a positive number, limit cannot be lower than 0")]
    NegativeLimit,

    #[error("offset needs to be a positive number, offset cannot be lower than 0")]
    NegativeOffset,

    #[error("the maximum offset has been reached, the offset cannot be more than {0}")]
    MaximumOffsetReached(usize),

    #[error("the maximum limit has been reached, the limit cannot be more than {0}")]
    MaximumLimitReached(usize),

    #[error("Too many dimension filters, limited to a maximum of 10")]
    TooManyDimensionFilters,

    #[error("Too many topic filters, limited to a maximum of 10")]
    TooManyTopicFilters,

    #[error("Too many hierarchy filters, limited to a maximum of 5")]
    TooManyHierarchyFilters,

    #[error(
        "invalid distance value: {0}. Should contain a number and unit of distance separated by a comma e.g. 40,km"
    )]
    InvalidDistance(String),

    #[error(
        "invalid relation value: {0}. Should contain one of the following: intersects or within"
    )]
    InvalidRelation(String),

    #[error("area profile not found")]
    AreaProfileNotFound,

    #[error("Topic not found")]
    TopicNotFound,

    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("search index not found: {0}")]
    IndexNotFound(String),

    #[error("bad query sent to elasticsearch index: {0}")]
    BadSearchQuery(String),

    #[error("invalid response from {backend} (status {status}): {details}")]
    BackendResponse {
        backend: String,
        status: u16,
        details: String,
    },

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("serialize error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{target} search did not complete within {timeout_ms}ms")]
    DeadlineExceeded { target: &'static str, timeout_ms: u128 },

    /// A failure observed once and reported to every target that depended on it.
    #[error(transparent)]
    Shared(Arc<SearchError>),
}

impl SearchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Shared(inner) => inner.kind(),
            Self::EmptySearchTerm
            | Self::ParsingQueryParameters
            | Self::NegativeLimit
            | Self::NegativeOffset
            | Self::MaximumOffsetReached(_)
            | Self::MaximumLimitReached(_)
            | Self::TooManyDimensionFilters
            | Self::TooManyTopicFilters
            | Self::TooManyHierarchyFilters
            | Self::InvalidDistance(_)
            | Self::InvalidRelation(_) => ErrorKind::BadRequest,
            Self::AreaProfileNotFound | Self::TopicNotFound => ErrorKind::NotFound,
            Self::InvalidGeometry(_)
            | Self::IndexNotFound(_)
            | Self::BadSearchQuery(_)
            | Self::BackendResponse { .. }
            | Self::Http(_)
            | Self::Url(_)
            | Self::Serialization(_)
            | Self::DeadlineExceeded { .. } => ErrorKind::Internal,
        }
    }

    /// Stable machine-readable code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Shared(inner) => inner.code(),
            Self::EmptySearchTerm => "empty_search_term",
            Self::ParsingQueryParameters => "invalid_query_parameter",
            Self::NegativeLimit => "negative_limit",
            Self::NegativeOffset => "negative_offset",
            Self::MaximumOffsetReached(_) => "maximum_offset_reached",
            Self::MaximumLimitReached(_) => "maximum_limit_reached",
            Self::TooManyDimensionFilters => "too_many_dimension_filters",
            Self::TooManyTopicFilters => "too_many_topic_filters",
            Self::TooManyHierarchyFilters => "too_many_hierarchy_filters",
            Self::InvalidDistance(_) => "invalid_distance",
            Self::InvalidRelation(_) => "invalid_relation",
            Self::AreaProfileNotFound => "area_profile_not_found",
            Self::TopicNotFound => "topic_not_found",
            _ => "internal_error",
        }
    }
}

#[derive(Debug, Error)]
pub enum ReferenceDataError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
