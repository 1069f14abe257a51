//! Typed request bodies for the engine's `_search` endpoint.
//!
//! Every clause is one arm of [`Query`], so a fragment can never carry two query shapes
//! at once. Serialisation produces the engine's native JSON grammar.

use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::distance::GeoRelation;
use crate::filters::{FilterField, FilterTerm};
use crate::geo::GeoShape;
use crate::pagination::PageWindow;

pub const PRE_TAG: &str = "<b>";
pub const POST_TAG: &str = "</b>";

const LOCATION_FIELD: &str = "location";
const INDEX_FIELD: &str = "_index";
const DIMENSIONS_PATH: &str = "dimensions";

pub const DATASET_FIELDS: [&str; 6] = ["alias", "description", "title", "topic1", "topic2", "topic3"];
pub const DIMENSION_FIELDS: [&str; 2] = ["dimensions.label", "dimensions.name"];
pub const AREA_FIELDS: [&str; 3] = ["code", "hierarchy", "name"];
const TOPIC_LEVELS: [&str; 3] = ["topic1", "topic2", "topic3"];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Query {
    Bool(BoolQuery),
    Match(FieldValue),
    Term(FieldValue),
    Terms(FieldValues),
    Nested(NestedQuery),
    GeoShape(GeoShapeQuery),
}

impl Query {
    pub fn matches(field: &str, value: &str) -> Self {
        Self::Match(FieldValue::new(field, value))
    }

    pub fn term(field: &str, value: &str) -> Self {
        Self::Term(FieldValue::new(field, value))
    }

    /// A `bool` that matches when at least one of `clauses` does.
    pub fn any_of(clauses: Vec<Query>) -> Self {
        Self::Bool(BoolQuery {
            should: clauses,
            minimum_should_match: Some(1),
            ..BoolQuery::default()
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BoolQuery {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub should: Vec<Query>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub filter: Vec<Query>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_should_match: Option<u32>,
}

/// Serialises as `{ "<field>": "<value>" }`.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldValue {
    pub field: String,
    pub value: String,
}

impl FieldValue {
    pub fn new(field: &str, value: &str) -> Self {
        Self {
            field: field.to_string(),
            value: value.to_string(),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.field, &self.value)?;
        map.end()
    }
}

/// Serialises as `{ "<field>": ["<value>", ...] }`.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldValues {
    pub field: String,
    pub values: Vec<String>,
}

impl Serialize for FieldValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.field, &self.values)?;
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NestedQuery {
    pub path: String,
    pub query: Box<Query>,
}

/// A non-scoring spatial restriction on the `location` field.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoShapeQuery {
    pub shape: GeoShape,
    pub relation: GeoRelation,
}

impl Serialize for GeoShapeQuery {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Location<'a> {
            shape: &'a GeoShape,
            relation: GeoRelation,
        }

        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(
            LOCATION_FIELD,
            &Location {
                shape: &self.shape,
                relation: self.relation,
            },
        )?;
        map.end()
    }
}

impl From<&FilterTerm> for Query {
    fn from(filter: &FilterTerm) -> Self {
        match filter.field {
            FilterField::Dimension => Self::Nested(NestedQuery {
                path: DIMENSIONS_PATH.to_string(),
                query: Box::new(Self::term("dimensions.name", &filter.value)),
            }),
            FilterField::Topic => Self::any_of(
                TOPIC_LEVELS
                    .iter()
                    .map(|level| Self::term(level, &filter.value))
                    .collect(),
            ),
            FilterField::Hierarchy => Self::term("hierarchy", &filter.value),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HighlightField {}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Highlight {
    pub pre_tags: Vec<String>,
    pub post_tags: Vec<String>,
    pub fields: BTreeMap<String, HighlightField>,
}

impl Highlight {
    pub fn for_fields<'a>(fields: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            pre_tags: vec![PRE_TAG.to_string()],
            post_tags: vec![POST_TAG.to_string()],
            fields: fields
                .into_iter()
                .map(|field| (field.to_string(), HighlightField::default()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SortClause {
    pub order: SortOrder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreSort {
    #[serde(rename = "_score")]
    pub score: SortClause,
}

impl ScoreSort {
    pub fn descending() -> Self {
        Self {
            score: SortClause {
                order: SortOrder::Desc,
            },
        }
    }
}

/// A full `_search` request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchBody {
    pub from: usize,
    pub size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight: Option<Highlight>,
    pub query: Query,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sort: Vec<ScoreSort>,
    pub track_total_hits: bool,
}

impl SearchBody {
    fn ranked(query: Query, highlight: Highlight, page: PageWindow) -> Self {
        Self {
            from: page.offset,
            size: page.limit,
            highlight: Some(highlight),
            query,
            sort: vec![ScoreSort::descending()],
            track_total_hits: true,
        }
    }

    /// A single-document lookup by exact `field` value.
    pub fn lookup(field: &str, value: &str) -> Self {
        Self {
            from: 0,
            size: 1,
            highlight: None,
            query: Query::term(field, value),
            sort: Vec::new(),
            track_total_hits: false,
        }
    }
}

fn field_matches(fields: &[&str], term: &str) -> Vec<Query> {
    fields.iter().map(|field| Query::matches(field, term)).collect()
}

fn dimension_match(term: &str) -> Query {
    Query::Nested(NestedQuery {
        path: DIMENSIONS_PATH.to_string(),
        query: Box::new(Query::any_of(field_matches(&DIMENSION_FIELDS, term))),
    })
}

fn dataset_should(term: &str) -> Vec<Query> {
    let mut should = field_matches(&DATASET_FIELDS, term);
    should.push(dimension_match(term));
    should
}

fn dataset_highlight() -> Highlight {
    Highlight::for_fields(DATASET_FIELDS.iter().chain(DIMENSION_FIELDS.iter()).copied())
}

fn area_highlight() -> Highlight {
    Highlight::for_fields(AREA_FIELDS)
}

fn all_highlight() -> Highlight {
    Highlight::for_fields(
        DATASET_FIELDS
            .iter()
            .chain(DIMENSION_FIELDS.iter())
            .chain(AREA_FIELDS.iter())
            .copied(),
    )
}

fn to_filters(terms: &[FilterTerm]) -> Vec<Query> {
    terms.iter().map(Query::from).collect()
}

/// Free-text relevance search over the dataset index.
pub fn dataset_query(
    term: &str,
    dimension_filters: &[FilterTerm],
    topic_filters: &[FilterTerm],
    page: PageWindow,
) -> SearchBody {
    let mut filter = to_filters(topic_filters);
    filter.extend(to_filters(dimension_filters));

    let query = Query::Bool(BoolQuery {
        should: dataset_should(term),
        filter,
        minimum_should_match: Some(1),
    });

    SearchBody::ranked(query, dataset_highlight(), page)
}

/// Area profile search: spatial when a shape is known, free text otherwise.
pub fn area_query(
    term: &str,
    hierarchy_filters: &[FilterTerm],
    geo: Option<&GeoShapeQuery>,
    page: PageWindow,
) -> SearchBody {
    let query = match geo {
        Some(geo) => {
            let mut filter = vec![Query::GeoShape(geo.clone())];
            filter.extend(to_filters(hierarchy_filters));
            Query::Bool(BoolQuery {
                filter,
                ..BoolQuery::default()
            })
        }
        None => Query::Bool(BoolQuery {
            should: field_matches(&AREA_FIELDS, term),
            filter: to_filters(hierarchy_filters),
            minimum_should_match: Some(1),
        }),
    };

    SearchBody::ranked(query, area_highlight(), page)
}

/// Cross-index search over datasets and area profiles.
///
/// A shape narrows the search to the area profile index, since only area profiles are
/// meaningfully located by a postcode radius.
pub fn combined_query(
    term: &str,
    hierarchy_filters: &[FilterTerm],
    geo: Option<&GeoShapeQuery>,
    area_profile_index: &str,
    page: PageWindow,
) -> SearchBody {
    let query = match geo {
        Some(geo) => {
            let mut filter = vec![
                Query::GeoShape(geo.clone()),
                Query::Terms(FieldValues {
                    field: INDEX_FIELD.to_string(),
                    values: vec![area_profile_index.to_string()],
                }),
            ];
            filter.extend(to_filters(hierarchy_filters));
            Query::Bool(BoolQuery {
                filter,
                ..BoolQuery::default()
            })
        }
        None => {
            let mut fields = field_matches(&DATASET_FIELDS, term);
            fields.extend(field_matches(&AREA_FIELDS, term));
            Query::Bool(BoolQuery {
                should: vec![Query::any_of(fields)],
                ..BoolQuery::default()
            })
        }
    };

    SearchBody::ranked(query, all_highlight(), page)
}

/// Dataset search restricted to the stored geometry of one area profile.
pub fn area_profile_dataset_query(
    term: &str,
    location: GeoShapeQuery,
    dimension_filters: &[FilterTerm],
    topic_filters: &[FilterTerm],
    page: PageWindow,
) -> SearchBody {
    let mut filter = vec![Query::GeoShape(location)];
    filter.extend(to_filters(topic_filters));
    filter.extend(to_filters(dimension_filters));

    let query = Query::Bool(BoolQuery {
        should: dataset_should(term),
        filter,
        minimum_should_match: Some(1),
    });

    SearchBody::ranked(query, dataset_highlight(), page)
}
