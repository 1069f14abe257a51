use crate::models::{DatasetSearchResults, EngineHit, EngineResponse, SearchResult, SearchResults};
use crate::pagination::PageWindow;

fn with_matches(hit: EngineHit) -> SearchResult {
    SearchResult {
        matches: hit.highlight,
        ..hit.source
    }
}

/// Maps engine hits onto public results; `count` is the page size, `total_count` the
/// engine's total before paging.
pub fn search_results(response: EngineResponse) -> SearchResults {
    let total_count = response.hits.total.value();
    let items: Vec<SearchResult> = response.hits.hits.into_iter().map(with_matches).collect();

    SearchResults {
        count: items.len(),
        items,
        total_count,
    }
}

pub fn dataset_results(response: EngineResponse, page: PageWindow) -> DatasetSearchResults {
    let total_count = response.hits.total.value();
    let items: Vec<SearchResult> = response
        .hits
        .hits
        .into_iter()
        .map(|hit| {
            let mut result = with_matches(hit);
            result.matches = result.matches.dataset_only();
            result
        })
        .collect();

    DatasetSearchResults {
        count: items.len(),
        limit: page.limit,
        offset: page.offset,
        total_count,
        items,
    }
}
