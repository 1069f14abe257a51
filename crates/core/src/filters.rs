use crate::SearchError;

pub const MAX_DIMENSION_FILTERS: usize = 10;
pub const MAX_TOPIC_FILTERS: usize = 10;
pub const MAX_HIERARCHY_FILTERS: usize = 5;

/// The document field a filter value is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterField {
    /// `name` inside the nested `dimensions` sub-document.
    Dimension,
    /// Any level of the `topic1`/`topic2`/`topic3` taxonomy fields.
    Topic,
    /// The flat `hierarchy` field of an area profile.
    Hierarchy,
}

impl FilterField {
    pub fn max_terms(self) -> usize {
        match self {
            Self::Dimension => MAX_DIMENSION_FILTERS,
            Self::Topic => MAX_TOPIC_FILTERS,
            Self::Hierarchy => MAX_HIERARCHY_FILTERS,
        }
    }

    fn too_many(self) -> SearchError {
        match self {
            Self::Dimension => SearchError::TooManyDimensionFilters,
            Self::Topic => SearchError::TooManyTopicFilters,
            Self::Hierarchy => SearchError::TooManyHierarchyFilters,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilterTerm {
    pub field: FilterField,
    pub value: String,
}

/// Splits a comma separated filter list into terms for `field`.
///
/// Blank entries are skipped. More entries than the field allows is an error, never a
/// truncation.
pub fn parse_filters(raw: Option<&str>, field: FilterField) -> Result<Vec<FilterTerm>, SearchError> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };

    let terms: Vec<FilterTerm> = raw
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| FilterTerm {
            field,
            value: entry.to_string(),
        })
        .collect();

    if terms.len() > field.max_terms() {
        return Err(field.too_many());
    }

    Ok(terms)
}

pub fn validate_dimensions(raw: Option<&str>) -> Result<Vec<FilterTerm>, SearchError> {
    parse_filters(raw, FilterField::Dimension)
}

pub fn validate_topics(raw: Option<&str>) -> Result<Vec<FilterTerm>, SearchError> {
    parse_filters(raw, FilterField::Topic)
}

pub fn validate_hierarchies(raw: Option<&str>) -> Result<Vec<FilterTerm>, SearchError> {
    parse_filters(raw, FilterField::Hierarchy)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(count: usize) -> String {
        (0..count)
            .map(|index| format!("value{index}"))
            .collect::<Vec<_>>()
            .join(",")
    }

    #[test]
    fn absent_or_empty_input_yields_no_terms() {
        assert!(validate_topics(None).unwrap().is_empty());
        assert!(validate_topics(Some("")).unwrap().is_empty());
        assert!(validate_topics(Some(" , ,")).unwrap().is_empty());
    }

    #[test]
    fn entries_are_trimmed() {
        let terms = validate_dimensions(Some(" sex , age")).unwrap();
        assert_eq!(
            terms,
            vec![
                FilterTerm {
                    field: FilterField::Dimension,
                    value: "sex".to_string()
                },
                FilterTerm {
                    field: FilterField::Dimension,
                    value: "age".to_string()
                },
            ]
        );
    }

    #[test]
    fn counts_up_to_the_cap_are_accepted() {
        assert_eq!(validate_dimensions(Some(&list(10))).unwrap().len(), 10);
        assert_eq!(validate_topics(Some(&list(10))).unwrap().len(), 10);
        assert_eq!(validate_hierarchies(Some(&list(5))).unwrap().len(), 5);
        assert_eq!(validate_hierarchies(Some(&list(3))).unwrap().len(), 3);
    }

    #[test]
    fn counts_over_the_cap_fail_per_category() {
        assert!(matches!(
            validate_dimensions(Some(&list(11))),
            Err(SearchError::TooManyDimensionFilters)
        ));
        assert!(matches!(
            validate_topics(Some(&list(11))),
            Err(SearchError::TooManyTopicFilters)
        ));
        assert!(matches!(
            validate_hierarchies(Some(&list(6))),
            Err(SearchError::TooManyHierarchyFilters)
        ));
    }
}
