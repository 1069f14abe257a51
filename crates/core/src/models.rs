use serde::{Deserialize, Serialize};

use crate::geo::GeoLocation;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub label: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Links {
    #[serde(rename = "self", default)]
    pub self_link: SelfLink,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelfLink {
    #[serde(default)]
    pub href: String,
    #[serde(default)]
    pub id: String,
}

/// Highlighted fragments per field, keyed by the field that matched.
///
/// The engine may report sub-fields such as `title.raw`; they are folded onto the
/// public field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Matches {
    #[serde(alias = "alias.raw", skip_serializing_if = "Vec::is_empty")]
    pub alias: Vec<String>,
    #[serde(alias = "description.raw", skip_serializing_if = "Vec::is_empty")]
    pub description: Vec<String>,
    #[serde(rename = "dimensions.label", skip_serializing_if = "Vec::is_empty")]
    pub dimension_label: Vec<String>,
    #[serde(rename = "dimensions.name", skip_serializing_if = "Vec::is_empty")]
    pub dimension_name: Vec<String>,
    #[serde(alias = "title.raw", skip_serializing_if = "Vec::is_empty")]
    pub title: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub topic1: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub topic2: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub topic3: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub code: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hierarchy: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub name: Vec<String>,
}

impl Matches {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Keeps only the fragments that belong to dataset documents.
    pub fn dataset_only(self) -> Self {
        Self {
            code: Vec::new(),
            hierarchy: Vec::new(),
            name: Vec::new(),
            ..self
        }
    }
}

/// One dataset or area profile as returned to API callers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchResult {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub alias: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub doc_type: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dimensions: Vec<Dimension>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub topic1: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub topic2: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub topic3: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub code: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub hierarchy: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    pub links: Links,
    #[serde(skip_serializing_if = "Matches::is_empty")]
    pub matches: Matches,
}

/// Hit totals come back as a bare number or, with `track_total_hits`, as `{value, relation}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum HitTotal {
    Count(u64),
    Tracked { value: u64 },
}

impl Default for HitTotal {
    fn default() -> Self {
        Self::Count(0)
    }
}

impl HitTotal {
    pub fn value(self) -> u64 {
        match self {
            Self::Count(value) | Self::Tracked { value } => value,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineHit {
    #[serde(rename = "_source", default)]
    pub source: SearchResult,
    #[serde(default)]
    pub highlight: Matches,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineHits {
    #[serde(default)]
    pub total: HitTotal,
    #[serde(default)]
    pub hits: Vec<EngineHit>,
}

/// Raw `_search` response body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineResponse {
    pub hits: EngineHits,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchResults {
    pub count: usize,
    pub items: Vec<SearchResult>,
    pub total_count: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub all: u64,
    pub datasets: u64,
    pub area_profiles: u64,
    pub publications: u64,
}

/// The merged `/search` payload across every search target.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregateSearchResponse {
    pub counts: Counts,
    pub limit: usize,
    pub offset: usize,
    pub all: SearchResults,
    pub datasets: SearchResults,
    pub area_profiles: SearchResults,
    pub publications: SearchResults,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DatasetSearchResults {
    pub count: usize,
    pub limit: usize,
    pub offset: usize,
    pub total_count: u64,
    pub items: Vec<SearchResult>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistic {
    #[serde(default)]
    pub header: String,
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub units: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub links: Links,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemList {
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaProfile {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub datasets: ItemList,
    #[serde(default)]
    pub hierarchy: String,
    #[serde(default)]
    pub links: Links,
    pub location: GeoLocation,
    #[serde(default)]
    pub statistics: Vec<Statistic>,
    #[serde(rename = "visualisation", default)]
    pub visualisations: ItemList,
}
