//! The filter/pagination composer.
//!
//! `ListComposer` owns one [`FilterState`] and the page it produced. Every
//! mutation ends in at most one request to the [`ListEndpoint`]; responses are
//! applied only if no newer request was issued in the meantime.

use std::sync::{Arc, Weak};
use std::time::Duration;

use jiff::civil::Date;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::composer::capability::{CapabilityProvider, StaticCapabilities};
use crate::composer::debounce::Debouncer;
use crate::composer::filter::{DateConstraint, DateMode, FacetTag, FilterState, RequestParams};
use crate::composer::pagination::{PageRequest, PaginationState};
use crate::composer::response::normalize_response;
use crate::config::ComposerConfig;
use crate::error::{AppError, AppResult};
use crate::external::ListEndpoint;

type Clock = Arc<dyn Fn() -> Date + Send + Sync>;

/// What became of a mutation's request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Response applied to the visible state
    Applied,
    /// A newer request was issued first; this response was dropped
    Superseded,
    /// Restored from the cached default list without a request
    Cached,
    /// Nothing changed, so nothing was requested
    Unchanged,
    /// The composer was closed before the response arrived
    Cancelled,
}

/// Snapshot of everything the table renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListView<R> {
    pub records: Vec<R>,
    pub pagination: PaginationState,
    pub loading: bool,
    pub error: Option<String>,
    /// Filters that produced `records`
    pub applied_filters: FilterState,
}

#[derive(Debug, Clone)]
struct Baseline<R> {
    records: Vec<R>,
    pagination: PaginationState,
}

struct ComposerState<R> {
    filters: FilterState,
    page: PageRequest,
    last_emitted_search: String,
    debouncer: Debouncer,
    /// Sequence number of the latest issued request
    seq: u64,
    records: Vec<R>,
    pagination: PaginationState,
    applied: FilterState,
    loading: bool,
    error: Option<String>,
    baseline: Option<Baseline<R>>,
    closed: bool,
}

struct Shared<R> {
    endpoint: Arc<dyn ListEndpoint>,
    capabilities: Arc<dyn CapabilityProvider>,
    clock: Clock,
    max_page_size: u32,
    cancel: CancellationToken,
    state: RwLock<ComposerState<R>>,
}

impl<R> Drop for Shared<R> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Builder for [`ListComposer`].
pub struct ComposerBuilder<R> {
    endpoint: Arc<dyn ListEndpoint>,
    capabilities: Arc<dyn CapabilityProvider>,
    page: u32,
    page_size: u32,
    max_page_size: u32,
    debounce: Duration,
    clock: Clock,
    filters: FilterState,
    default_list: Option<Baseline<R>>,
}

impl<R> ComposerBuilder<R>
where
    R: DeserializeOwned + Clone + Send + Sync + 'static,
{
    pub fn capabilities(mut self, capabilities: Arc<dyn CapabilityProvider>) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn config(mut self, config: &ComposerConfig) -> Self {
        self.page_size = config.page_size;
        self.max_page_size = config.max_page_size;
        self.debounce = config.debounce();
        self
    }

    /// Filters in effect before the first mutation.
    pub fn filters(mut self, filters: FilterState) -> Self {
        self.filters = filters;
        self
    }

    /// Page requested by the first fetch.
    pub fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Source of "today" for the `today` date mode.
    pub fn clock(mut self, clock: impl Fn() -> Date + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Unfiltered list already held by the caller; shown immediately and
    /// restored by [`ListComposer::reset_to_unfiltered`] without a request.
    pub fn with_default_list(mut self, records: Vec<R>, pagination: PaginationState) -> Self {
        self.default_list = Some(Baseline { records, pagination });
        self
    }

    pub fn build(self) -> AppResult<ListComposer<R>> {
        let page = PageRequest::new(self.page, self.page_size).checked()?;
        if self.page_size > self.max_page_size {
            return Err(AppError::validation(
                "page_size",
                format!("must not exceed {}", self.max_page_size),
            ));
        }
        if let Some(tag) = self.filters.facets.iter().find(|tag| !self.capabilities.allows(**tag)) {
            return Err(AppError::Forbidden {
                message: format!("facet '{}' requires administrator access", tag),
            });
        }

        let (records, pagination) = match &self.default_list {
            Some(baseline) => (baseline.records.clone(), baseline.pagination.clone()),
            None => (Vec::new(), PaginationState::empty(page.page_size)),
        };

        let state = ComposerState {
            filters: self.filters,
            page,
            last_emitted_search: String::new(),
            debouncer: Debouncer::new(self.debounce),
            seq: 0,
            records,
            pagination,
            applied: FilterState::new(),
            loading: false,
            error: None,
            baseline: self.default_list,
            closed: false,
        };

        Ok(ListComposer {
            shared: Arc::new(Shared {
                endpoint: self.endpoint,
                capabilities: self.capabilities,
                clock: self.clock,
                max_page_size: self.max_page_size,
                cancel: CancellationToken::new(),
                state: RwLock::new(state),
            }),
        })
    }
}

/// Combines search text, facets, date and page into list requests.
///
/// Cloning is cheap and every clone drives the same state.
pub struct ListComposer<R> {
    shared: Arc<Shared<R>>,
}

impl<R> Clone for ListComposer<R> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<R> ListComposer<R>
where
    R: DeserializeOwned + Clone + Send + Sync + 'static,
{
    pub fn builder(endpoint: Arc<dyn ListEndpoint>) -> ComposerBuilder<R> {
        let defaults = ComposerConfig::default();
        ComposerBuilder {
            endpoint,
            capabilities: Arc::new(StaticCapabilities::operator()),
            page: 1,
            page_size: defaults.page_size,
            max_page_size: defaults.max_page_size,
            debounce: defaults.debounce(),
            clock: Arc::new(|| jiff::Zoned::now().date()),
            filters: FilterState::new(),
            default_list: None,
        }
    }

    /// Current view for rendering.
    pub async fn view(&self) -> ListView<R> {
        let state = self.shared.state.read().await;
        ListView {
            records: state.records.clone(),
            pagination: state.pagination.clone(),
            loading: state.loading,
            error: state.error.clone(),
            applied_filters: state.applied.clone(),
        }
    }

    /// Filters as the user has set them, including text not yet emitted.
    pub async fn filters(&self) -> FilterState {
        self.shared.state.read().await.filters.clone()
    }

    pub fn selectable_facets(&self) -> Vec<FacetTag> {
        self.shared.capabilities.selectable_facets()
    }

    /// Query parameters the next request would carry.
    pub async fn build_request_params(&self) -> RequestParams {
        let state = self.shared.state.read().await;
        state.filters.to_params(&state.page, (self.shared.clock)())
    }

    /// Store `raw` immediately and emit it once typing pauses.
    pub async fn set_search_text(&self, raw: impl Into<String>) {
        let mut state = self.shared.state.write().await;
        if state.closed {
            return;
        }
        state.filters.search = raw.into();

        // The pending timer must not keep a dropped composer alive.
        let shared: Weak<Shared<R>> = Arc::downgrade(&self.shared);
        state.debouncer.schedule(async move {
            let Some(shared) = shared.upgrade() else {
                return;
            };
            let this = ListComposer { shared };
            // Detach the request so a new keystroke aborting this timer
            // cannot abort a fetch that is already in flight.
            tokio::spawn(async move {
                if let Err(err) = this.emit_search().await {
                    tracing::debug!(error = %err, "Debounced search failed");
                }
            });
        });
    }

    /// Emit the typed search now instead of waiting for the debounce window.
    pub async fn flush_search(&self) -> AppResult<FetchOutcome> {
        self.shared.state.write().await.debouncer.cancel();
        self.emit_search().await
    }

    async fn emit_search(&self) -> AppResult<FetchOutcome> {
        {
            let mut state = self.shared.state.write().await;
            if state.closed {
                return Ok(FetchOutcome::Cancelled);
            }
            if state.filters.trimmed_search() == state.last_emitted_search {
                tracing::trace!("Search text unchanged, skipping request");
                return Ok(FetchOutcome::Unchanged);
            }
            // Claimed under the same lock so a concurrent emit sees it.
            state.last_emitted_search = state.filters.trimmed_search().to_string();
            state.page = state.page.with_page(1);
        }
        self.fetch_current("search").await
    }

    /// Switch `tag` on or off and re-fetch from page 1.
    pub async fn toggle_facet(&self, tag: FacetTag) -> AppResult<FetchOutcome> {
        if !self.shared.capabilities.allows(tag) {
            return Err(AppError::Forbidden {
                message: format!("facet '{}' requires administrator access", tag),
            });
        }

        {
            let mut state = self.shared.state.write().await;
            if state.closed {
                return Ok(FetchOutcome::Cancelled);
            }
            let active = state.filters.toggle(tag);
            state.page = state.page.with_page(1);
            tracing::debug!(facet = %tag, active, "Facet toggled");
        }
        self.fetch_current("facet").await
    }

    /// Replace the date constraint; the value is validated before anything changes.
    pub async fn set_date_constraint(
        &self,
        mode: DateMode,
        value: Option<&str>,
    ) -> AppResult<FetchOutcome> {
        let constraint = DateConstraint::from_mode(mode, value)?;
        self.set_date(constraint).await
    }

    pub async fn set_date(&self, constraint: DateConstraint) -> AppResult<FetchOutcome> {
        {
            let mut state = self.shared.state.write().await;
            if state.closed {
                return Ok(FetchOutcome::Cancelled);
            }
            state.filters.date = constraint;
            state.page = state.page.with_page(1);
        }
        self.fetch_current("date").await
    }

    /// Jump to `page`, clamped into the known page range.
    pub async fn go_to_page(&self, page: u32) -> AppResult<FetchOutcome> {
        {
            let mut state = self.shared.state.write().await;
            if state.closed {
                return Ok(FetchOutcome::Cancelled);
            }
            let target = state.pagination.clamp(page);
            state.page = state.page.with_page(target);
        }
        self.fetch_current("page").await
    }

    pub async fn next_page(&self) -> AppResult<FetchOutcome> {
        let (has_next, current, total_pages) = {
            let state = self.shared.state.read().await;
            let pagination = &state.pagination;
            (pagination.has_next, pagination.current_page, pagination.total_pages)
        };
        if !has_next || current >= total_pages {
            return Ok(FetchOutcome::Unchanged);
        }
        self.go_to_page(current.saturating_add(1)).await
    }

    pub async fn previous_page(&self) -> AppResult<FetchOutcome> {
        let (has_previous, current) = {
            let state = self.shared.state.read().await;
            (state.pagination.has_previous, state.pagination.current_page)
        };
        if !has_previous || current <= 1 {
            return Ok(FetchOutcome::Unchanged);
        }
        self.go_to_page(current.saturating_sub(1)).await
    }

    /// Change records per page and restart from page 1.
    pub async fn set_page_size(&self, page_size: u32) -> AppResult<FetchOutcome> {
        let request = PageRequest::first(page_size).checked()?;
        if page_size > self.shared.max_page_size {
            return Err(AppError::validation(
                "page_size",
                format!("must not exceed {}", self.shared.max_page_size),
            ));
        }

        {
            let mut state = self.shared.state.write().await;
            if state.closed {
                return Ok(FetchOutcome::Cancelled);
            }
            // Cached default list was fetched at the old size.
            if state.page.page_size != page_size {
                state.baseline = None;
            }
            state.page = request;
        }
        self.fetch_current("page_size").await
    }

    /// Re-issue the current request unchanged.
    pub async fn refresh(&self) -> AppResult<FetchOutcome> {
        self.fetch_current("refresh").await
    }

    /// Same as [`refresh`](Self::refresh); offered after a failure.
    pub async fn retry(&self) -> AppResult<FetchOutcome> {
        self.fetch_current("retry").await
    }

    /// Clear search, facets and date in one step.
    ///
    /// Restores the cached default list without a request when one is held;
    /// otherwise fetches page 1 unfiltered. In-flight requests are superseded.
    pub async fn reset_to_unfiltered(&self) -> AppResult<FetchOutcome> {
        {
            let mut state = self.shared.state.write().await;
            if state.closed {
                return Ok(FetchOutcome::Cancelled);
            }
            state.debouncer.cancel();
            state.filters.clear();
            state.last_emitted_search.clear();
            state.page = state.page.with_page(1);

            if let Some(baseline) = state.baseline.clone() {
                state.seq += 1;
                state.records = baseline.records;
                state.pagination = baseline.pagination;
                state.applied = FilterState::new();
                state.loading = false;
                state.error = None;
                tracing::debug!("Restored cached default list");
                return Ok(FetchOutcome::Cached);
            }
        }
        self.fetch_current("reset").await
    }

    /// Detach from the view: cancel in-flight requests and the pending debounce.
    pub async fn close(&self) {
        self.shared.cancel.cancel();
        let mut state = self.shared.state.write().await;
        state.closed = true;
        state.loading = false;
        state.debouncer.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.shared.cancel.is_cancelled()
    }

    async fn fetch_current(&self, reason: &'static str) -> AppResult<FetchOutcome> {
        let (seq, params, request, snapshot) = {
            let mut state = self.shared.state.write().await;
            if state.closed {
                return Ok(FetchOutcome::Cancelled);
            }
            let request = state.page.checked()?;

            // This request carries the latest typed text, so a pending
            // debounced emit would only repeat it.
            state.debouncer.cancel();
            state.last_emitted_search = state.filters.trimmed_search().to_string();

            state.seq += 1;
            state.loading = true;
            let params = state.filters.to_params(&request, (self.shared.clock)());
            (state.seq, params, request, state.filters.clone())
        };

        let endpoint = self.shared.endpoint.name().to_string();
        tracing::debug!(seq, reason, %endpoint, params = %params, "Issuing list request");

        let result = tokio::select! {
            _ = self.shared.cancel.cancelled() => {
                tracing::debug!(seq, "List request cancelled");
                return Ok(FetchOutcome::Cancelled);
            }
            result = self.shared.endpoint.fetch(&params) => result,
        };

        let page = result.and_then(|raw| {
            normalize_response::<R>(raw, &request).map_err(|e| AppError::MalformedPayload {
                endpoint: endpoint.clone(),
                message: e.to_string(),
            })
        });

        let mut state = self.shared.state.write().await;
        if state.closed {
            return Ok(FetchOutcome::Cancelled);
        }
        if seq != state.seq {
            tracing::debug!(seq, latest = state.seq, "Discarding superseded response");
            return Ok(FetchOutcome::Superseded);
        }
        state.loading = false;

        match page {
            Ok(page) => {
                tracing::info!(
                    seq,
                    count = page.pagination.count,
                    page = page.pagination.current_page,
                    total_pages = page.pagination.total_pages,
                    "List page applied"
                );
                if snapshot.is_unfiltered() && request.page == 1 {
                    state.baseline = Some(Baseline {
                        records: page.records.clone(),
                        pagination: page.pagination.clone(),
                    });
                }
                state.page = request.with_page(page.pagination.current_page);
                state.records = page.records;
                state.pagination = page.pagination;
                state.applied = snapshot;
                state.error = None;
                Ok(FetchOutcome::Applied)
            }
            Err(err) => {
                tracing::warn!(seq, %endpoint, error = %err, "List request failed");
                state.error = Some(err.to_string());
                Err(err)
            }
        }
    }
}
