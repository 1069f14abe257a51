use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::OnceCell;
use tokio::time::{timeout_at, Instant};
use tracing::{error, info};

use crate::assemble::{dataset_results, search_results};
use crate::distance::{Distance, GeoRelation};
use crate::filters::{validate_dimensions, validate_hierarchies, validate_topics, FilterTerm};
use crate::models::{AggregateSearchResponse, AreaProfile, Counts, DatasetSearchResults, SearchResults};
use crate::pagination::PageWindow;
use crate::postcode;
use crate::query::{self, GeoShapeQuery};
use crate::traits::SearchEngine;
use crate::SearchError;

/// Index names and limits, fixed at start-up.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub dataset_index: String,
    pub area_profile_index: String,
    pub postcode_index: String,
    pub max_window: usize,
    pub request_timeout: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            dataset_index: "datasets".to_string(),
            area_profile_index: "area-profiles".to_string(),
            postcode_index: "postcodes".to_string(),
            max_window: 1000,
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// Raw `/search` parameters exactly as they arrived.
#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    pub term: String,
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub dimensions: Option<String>,
    pub hierarchies: Option<String>,
    pub topics: Option<String>,
    pub distance: Option<String>,
    pub relation: Option<String>,
}

/// Raw `/area-profiles/{id}/search` parameters.
#[derive(Debug, Clone, Default)]
pub struct AreaSearchRequest {
    pub id: String,
    pub term: String,
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub dimensions: Option<String>,
    pub topics: Option<String>,
    pub relation: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ValidatedSearch {
    pub term: String,
    pub page: PageWindow,
    pub dimension_filters: Vec<FilterTerm>,
    pub hierarchy_filters: Vec<FilterTerm>,
    pub topic_filters: Vec<FilterTerm>,
    pub distance: Distance,
    pub relation: GeoRelation,
}

fn search_term(raw: &str) -> Result<String, SearchError> {
    let term = raw.trim();
    if term.is_empty() {
        return Err(SearchError::EmptySearchTerm);
    }
    Ok(term.to_string())
}

impl SearchRequest {
    pub fn validate(&self, max_window: usize) -> Result<ValidatedSearch, SearchError> {
        let term = search_term(&self.term)?;
        let page = PageWindow::from_raw(self.limit.as_deref(), self.offset.as_deref(), max_window)?;

        Ok(ValidatedSearch {
            term,
            page,
            dimension_filters: validate_dimensions(self.dimensions.as_deref())?,
            hierarchy_filters: validate_hierarchies(self.hierarchies.as_deref())?,
            topic_filters: validate_topics(self.topics.as_deref())?,
            distance: Distance::parse(self.distance.as_deref().unwrap_or_default())?,
            relation: GeoRelation::parse(self.relation.as_deref().unwrap_or_default())?,
        })
    }
}

/// Postcode geography for one request, success or failure, shared by every target that needs it.
type GeographyCell = OnceCell<Result<Option<GeoShapeQuery>, Arc<SearchError>>>;

/// The independent queries fanned out for a single `/search` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    All,
    Datasets,
    AreaProfiles,
}

impl Target {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Datasets => "datasets",
            Self::AreaProfiles => "area_profiles",
        }
    }
}

pub struct SearchCoordinator<E> {
    engine: E,
    config: SearchConfig,
}

impl<E> SearchCoordinator<E>
where
    E: SearchEngine + Send + Sync,
{
    pub fn new(engine: E, config: SearchConfig) -> Self {
        Self { engine, config }
    }

    /// Runs every search target concurrently and merges them into one response.
    ///
    /// All targets share one deadline. Errors are reduced in target order, so when several
    /// fail the `all` failure is reported before `datasets`, and `datasets` before
    /// `area_profiles`. Partial results are never returned.
    pub async fn search(&self, request: &SearchRequest) -> Result<AggregateSearchResponse, SearchError> {
        let search = request.validate(self.config.max_window)?;
        info!(
            term = %search.term,
            limit = search.page.limit,
            offset = search.page.offset,
            dimensions = search.dimension_filters.len(),
            hierarchies = search.hierarchy_filters.len(),
            topics = search.topic_filters.len(),
            "dispatching search targets"
        );

        let deadline = Instant::now() + self.config.request_timeout;
        let geography = GeographyCell::new();

        let (all, datasets, area_profiles) = tokio::join!(
            self.within(deadline, Target::All, self.search_all(&search, &geography)),
            self.within(deadline, Target::Datasets, self.search_datasets(&search)),
            self.within(
                deadline,
                Target::AreaProfiles,
                self.search_area_profiles(&search, &geography)
            ),
        );

        let all = all?;
        let datasets = datasets?;
        let area_profiles = area_profiles?;
        let publications = SearchResults::default();

        Ok(AggregateSearchResponse {
            counts: Counts {
                all: all.total_count,
                datasets: datasets.total_count,
                area_profiles: area_profiles.total_count,
                publications: publications.total_count,
            },
            limit: search.page.limit,
            offset: search.page.offset,
            all,
            datasets,
            area_profiles,
            publications,
        })
    }

    pub async fn area_profile(&self, id: &str) -> Result<AreaProfile, SearchError> {
        self.engine
            .get_area_profile(&self.config.area_profile_index, id)
            .await
    }

    /// Searches datasets inside the stored boundary of one area profile.
    pub async fn search_area_profile(
        &self,
        request: &AreaSearchRequest,
    ) -> Result<DatasetSearchResults, SearchError> {
        let term = search_term(&request.term)?;
        let page = PageWindow::from_raw(
            request.limit.as_deref(),
            request.offset.as_deref(),
            self.config.max_window,
        )?;
        let relation = GeoRelation::parse(request.relation.as_deref().unwrap_or_default())?;
        let dimension_filters = validate_dimensions(request.dimensions.as_deref())?;
        let topic_filters = validate_topics(request.topics.as_deref())?;

        let deadline = Instant::now() + self.config.request_timeout;
        let work = async {
            let profile = self.area_profile(&request.id).await?;
            let location = GeoShapeQuery {
                shape: profile.location.into(),
                relation,
            };
            let body = query::area_profile_dataset_query(
                &term,
                location,
                &dimension_filters,
                &topic_filters,
                page,
            );
            self.engine
                .query(&[self.config.dataset_index.as_str()], &body)
                .await
        };

        let response = self.within(deadline, Target::Datasets, work).await?;
        Ok(dataset_results(response, page))
    }

    async fn within<T, F>(&self, deadline: Instant, target: Target, work: F) -> Result<T, SearchError>
    where
        F: Future<Output = Result<T, SearchError>>,
    {
        let outcome = match timeout_at(deadline, work).await {
            Ok(outcome) => outcome,
            Err(_) => Err(SearchError::DeadlineExceeded {
                target: target.as_str(),
                timeout_ms: self.config.request_timeout.as_millis(),
            }),
        };

        if let Err(error) = &outcome {
            error!(search_target = target.as_str(), %error, "search target failed");
        }
        outcome
    }

    async fn geography<'a>(
        &self,
        search: &ValidatedSearch,
        cell: &'a GeographyCell,
    ) -> Result<Option<&'a GeoShapeQuery>, SearchError> {
        let resolved = cell
            .get_or_init(|| async {
                let polygon = postcode::locate(
                    &self.engine,
                    &self.config.postcode_index,
                    &search.term,
                    search.distance,
                )
                .await
                .map_err(Arc::new)?;
                Ok::<_, Arc<SearchError>>(polygon.map(|polygon| GeoShapeQuery {
                    shape: polygon.into(),
                    relation: search.relation,
                }))
            })
            .await;

        match resolved {
            Ok(geo) => Ok(geo.as_ref()),
            Err(error) => Err(SearchError::Shared(Arc::clone(error))),
        }
    }

    async fn search_all(
        &self,
        search: &ValidatedSearch,
        cell: &GeographyCell,
    ) -> Result<SearchResults, SearchError> {
        let geo = self.geography(search, cell).await?;
        let body = query::combined_query(
            &search.term,
            &search.hierarchy_filters,
            geo,
            &self.config.area_profile_index,
            search.page,
        );
        let indices = [
            self.config.dataset_index.as_str(),
            self.config.area_profile_index.as_str(),
        ];
        let response = self.engine.query(&indices, &body).await?;
        Ok(search_results(response))
    }

    async fn search_datasets(&self, search: &ValidatedSearch) -> Result<SearchResults, SearchError> {
        let body = query::dataset_query(
            &search.term,
            &search.dimension_filters,
            &search.topic_filters,
            search.page,
        );
        let response = self
            .engine
            .query(&[self.config.dataset_index.as_str()], &body)
            .await?;
        Ok(search_results(response))
    }

    async fn search_area_profiles(
        &self,
        search: &ValidatedSearch,
        cell: &GeographyCell,
    ) -> Result<SearchResults, SearchError> {
        let geo = self.geography(search, cell).await?;
        let body = query::area_query(&search.term, &search.hierarchy_filters, geo, search.page);
        let response = self
            .engine
            .query(&[self.config.area_profile_index.as_str()], &body)
            .await?;
        Ok(search_results(response))
    }
}
