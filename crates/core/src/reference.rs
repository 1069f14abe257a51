//! Static reference documents served verbatim by the API.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ReferenceDataError;
use crate::SearchError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DimensionObject {
    pub label: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DimensionsDoc {
    pub items: Vec<DimensionObject>,
    pub total_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeographyObject {
    pub hierarchy: String,
    pub filterable_hierarchy: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoHierarchiesDoc {
    pub items: Vec<GeographyObject>,
    pub total_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub title: String,
    pub formatted_title: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub child_topics: Vec<Topic>,
}

impl Topic {
    fn find(&self, formatted_title: &str) -> Option<&Topic> {
        if self.formatted_title == formatted_title {
            return Some(self);
        }
        self.child_topics
            .iter()
            .find_map(|child| child.find(formatted_title))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Taxonomy {
    pub topics: Vec<Topic>,
}

impl Taxonomy {
    /// Finds a topic by `formatted_title` at any depth of the hierarchy.
    pub fn find_topic(&self, formatted_title: &str) -> Result<&Topic, SearchError> {
        self.topics
            .iter()
            .find_map(|topic| topic.find(formatted_title))
            .ok_or(SearchError::TopicNotFound)
    }
}

/// Every static document loaded once at start-up.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceData {
    pub dimensions: DimensionsDoc,
    pub hierarchies: GeoHierarchiesDoc,
    pub taxonomy: Taxonomy,
}

impl ReferenceData {
    pub fn load(
        dimensions: impl AsRef<Path>,
        hierarchies: impl AsRef<Path>,
        taxonomy: impl AsRef<Path>,
    ) -> Result<Self, ReferenceDataError> {
        Ok(Self {
            dimensions: load_json(dimensions)?,
            hierarchies: load_json(hierarchies)?,
            taxonomy: load_json(taxonomy)?,
        })
    }
}

pub fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, ReferenceDataError> {
    let path = path.as_ref();
    let raw = fs::read(path).map_err(|source| ReferenceDataError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_slice(&raw).map_err(|source| ReferenceDataError::Parse {
        path: path.display().to_string(),
        source,
    })
}
