//! Synchronization controller.
//!
//! A [`SearchSession`] owns the query state, the location history and the
//! displayed view. Every event goes through [`dispatch`](crate::dispatch)
//! first; when the resulting state needs data, the session hands out a
//! [`FetchTicket`]. Tickets are executed by a [`Fetcher`], which does not
//! borrow the session, so several fetches may be in flight while the user
//! keeps interacting. Each outcome is handed back through
//! [`SearchSession::commit`], which drops it unless its key is still the
//! current one.

use std::sync::Arc;
use std::time::{Duration, Instant};

use assist_cache::{CacheStatus, FetchCache, QueryKey};
use assist_core::{SearchConfig, SessionId};
use assist_observability::{FetchMetrics, LogFormat, LogLevel, SessionMetrics, StructuredLogger};
use assist_search::{
    codec, project, ActiveFilter, DisplayModel, PreparedRequest, QueryState, SearchError,
};

use crate::backend::SearchBackend;
use crate::events::{dispatch, Navigation, PageContext, SearchEvent};
use crate::history::LocationHistory;

/// Cache of projected results, shared between a session and its fetchers.
pub type ResultCache = FetchCache<DisplayModel, SearchError>;

/// What the result area shows.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    /// No searchable text.
    Idle,
    Loading,
    /// A committed result, possibly empty.
    Loaded(Arc<DisplayModel>),
    /// The fetch for the current key failed; the message is user-facing.
    Failed(String),
}

impl ViewState {
    pub fn model(&self) -> Option<&DisplayModel> {
        match self {
            Self::Loaded(model) => Some(model),
            _ => None,
        }
    }
}

/// A fetch the session wants performed.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchTicket {
    pub key: QueryKey,
    pub request: PreparedRequest,
    /// Page the result is projected for.
    pub page: u32,
    /// Bypass any cached result for the key.
    pub revalidate: bool,
    /// Issued after adopting the server price range.
    pub follow_up: bool,
    issued_at: Instant,
}

/// Result of executing a ticket.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub ticket: FetchTicket,
    pub result: Result<Arc<DisplayModel>, SearchError>,
    pub status: CacheStatus,
}

/// Executes tickets against the backend through the shared cache.
pub struct Fetcher<B> {
    backend: Arc<B>,
    cache: Arc<ResultCache>,
    page_size: u32,
}

impl<B> Clone for Fetcher<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            cache: Arc::clone(&self.cache),
            page_size: self.page_size,
        }
    }
}

impl<B: SearchBackend + 'static> Fetcher<B> {
    /// Resolve `ticket`, joining an identical in-flight fetch or reusing a
    /// cached result unless the ticket asks for revalidation.
    pub async fn run(&self, ticket: FetchTicket) -> FetchOutcome {
        let backend = Arc::clone(&self.backend);
        let request = ticket.request.clone();
        let page = ticket.page;
        let page_size = self.page_size;

        let (result, status) = self
            .cache
            .get_or_fetch(&ticket.key, ticket.revalidate, move || async move {
                let raw = backend.search(request).await?;
                Ok(project(&raw, page, page_size))
            })
            .await;

        FetchOutcome {
            ticket,
            result,
            status,
        }
    }
}

/// One user's search page.
pub struct SearchSession<B> {
    config: Arc<SearchConfig>,
    fetcher: Fetcher<B>,
    history: LocationHistory,
    state: QueryState,
    view: ViewState,
    current_key: Option<QueryKey>,
    logger: StructuredLogger,
    metrics: SessionMetrics,
}

impl<B: SearchBackend + 'static> SearchSession<B> {
    pub fn new(config: SearchConfig, backend: B) -> Self {
        let cache = Arc::new(ResultCache::new(config.cache_capacity));
        Self::with_cache(config, Arc::new(backend), cache)
    }

    /// Build a session sharing `backend` and `cache` with others.
    pub fn with_cache(config: SearchConfig, backend: Arc<B>, cache: Arc<ResultCache>) -> Self {
        let session_id = SessionId::generate();
        let logger = StructuredLogger::new(session_id.clone())
            .with_component("controller")
            .with_min_level(LogLevel::Debug)
            .with_format(LogFormat::Human);
        let metrics = SessionMetrics::new(&session_id);

        Self {
            fetcher: Fetcher {
                backend,
                cache,
                page_size: config.page_size,
            },
            config: Arc::new(config),
            history: LocationHistory::new(),
            state: QueryState::new(),
            view: ViewState::Idle,
            current_key: None,
            logger,
            metrics,
        }
    }

    /// Replace the logger, keeping the session ID.
    pub fn with_logger(mut self, format: LogFormat, min_level: LogLevel) -> Self {
        self.logger = StructuredLogger::new(self.logger.session_id().clone())
            .with_component("controller")
            .with_min_level(min_level)
            .with_format(format);
        self
    }

    pub fn state(&self) -> &QueryState {
        &self.state
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn history(&self) -> &LocationHistory {
        &self.history
    }

    pub fn metrics(&self) -> &SessionMetrics {
        &self.metrics
    }

    pub fn session_id(&self) -> &SessionId {
        self.logger.session_id()
    }

    /// Key the view is expected to show.
    pub fn current_key(&self) -> Option<&QueryKey> {
        self.current_key.as_ref()
    }

    /// Shareable location of the current state.
    pub fn location(&self) -> String {
        codec::to_location(&self.state)
    }

    /// Active-filter chips of the current state.
    pub fn active_filters(&self) -> Vec<ActiveFilter> {
        self.state.active_filters()
    }

    /// A handle for executing tickets without borrowing the session.
    pub fn fetcher(&self) -> Fetcher<B> {
        self.fetcher.clone()
    }

    /// Transition context derived from what is displayed.
    pub fn page_context(&self) -> PageContext {
        match self.view.model() {
            Some(model) => PageContext {
                total_pages: model.pagination.total_pages,
                price_bounds: model.facets.price,
            },
            None => PageContext::default(),
        }
    }

    /// Load the page at `location`, as on first visit or a pasted link.
    pub fn open(&mut self, location: &str) -> Option<FetchTicket> {
        self.state = codec::from_location(location);
        self.history.push(self.location());
        self.logger
            .info_builder("page opened")
            .field("location", self.location())
            .emit();
        self.synchronize(false)
    }

    /// Apply a user event. Returns the fetch needed to bring the view up to
    /// date, if any.
    pub fn dispatch(&mut self, event: SearchEvent) -> Option<FetchTicket> {
        let transition = dispatch(&self.state, &event, &self.page_context());

        match transition.navigation {
            Navigation::Back => {
                let Some(previous) = self.history.back().map(str::to_string) else {
                    self.metrics.record_event(event.name(), false);
                    self.logger.debug("no previous location");
                    return None;
                };
                self.metrics.record_event(event.name(), true);
                self.state = codec::from_location(&previous);
                self.logger
                    .info_builder("navigated back")
                    .field("location", previous)
                    .emit();
                self.synchronize(true)
            }
            Navigation::Push => {
                self.metrics.record_event(event.name(), true);
                self.state = transition.state;
                self.history.push(self.location());
                self.logger
                    .debug_builder("event applied")
                    .field("event", event.name())
                    .field("location", self.location())
                    .emit();
                self.synchronize(false)
            }
            Navigation::Stay => {
                self.metrics.record_event(event.name(), false);
                self.logger
                    .debug_builder("event ignored")
                    .field("event", event.name())
                    .emit();
                None
            }
        }
    }

    /// Point the view at the current state's key and issue its ticket.
    fn synchronize(&mut self, revalidate: bool) -> Option<FetchTicket> {
        self.issue(revalidate, false)
    }

    fn issue(&mut self, revalidate: bool, follow_up: bool) -> Option<FetchTicket> {
        if !self.state.is_searchable() {
            self.current_key = None;
            self.view = ViewState::Idle;
            return None;
        }

        let request = match PreparedRequest::build(&self.state, &self.config) {
            Ok(request) => request,
            Err(e) => {
                self.current_key = None;
                self.view = ViewState::Failed(e.user_message());
                self.logger.error(&e.to_string());
                return None;
            }
        };

        let key = QueryKey::new(&self.config.endpoint, &self.state);
        self.logger
            .debug_builder("fetch issued")
            .field("key", key.digest())
            .field_bool("revalidate", revalidate)
            .field_bool("follow_up", follow_up)
            .emit();

        self.current_key = Some(key.clone());
        // A follow-up keeps the committed result on screen while it runs.
        if !follow_up {
            self.view = ViewState::Loading;
        }

        Some(FetchTicket {
            key,
            request,
            page: self.state.page,
            revalidate,
            follow_up,
            issued_at: Instant::now(),
        })
    }

    /// Apply a finished fetch. Outcomes for keys that are no longer current
    /// are dropped. A successful outcome adopts the server price range while
    /// the user has not chosen one; if that changes the query, the follow-up
    /// ticket is returned. A follow-up never issues another.
    pub fn commit(&mut self, outcome: FetchOutcome) -> Option<FetchTicket> {
        let FetchOutcome {
            ticket,
            result,
            status,
        } = outcome;
        let elapsed = ticket.issued_at.elapsed();
        let metrics = FetchMetrics::new(ticket.key.digest(), cache_status_name(status), elapsed);

        if self.current_key.as_ref() != Some(&ticket.key) {
            self.logger
                .warn_builder("stale response discarded")
                .field("key", ticket.key.digest())
                .emit();
            self.metrics.record_fetch(match &result {
                Ok(model) => completed(metrics, model).stale(),
                Err(e) => metrics.failed(e.user_message()).stale(),
            });
            return None;
        }

        match result {
            Ok(model) => {
                self.log_commit(&ticket, status, &model, elapsed);
                self.metrics.record_fetch(completed(metrics, &model));
                let bounds = model.facets.price;
                self.view = ViewState::Loaded(model);

                if !self.state.apply_default_price(bounds) {
                    return None;
                }
                self.logger
                    .debug_builder("price range adopted from server")
                    .field("range", format!("{} - {}", bounds.min_price, bounds.max_price))
                    .emit();

                if ticket.follow_up {
                    return None;
                }
                self.metrics.record_bootstrap_refetch();
                self.issue(ticket.revalidate, true)
            }
            Err(e) => {
                self.logger
                    .error_builder("fetch failed")
                    .field("key", ticket.key.digest())
                    .field("error", e.to_string())
                    .emit();
                self.metrics.record_fetch(metrics.failed(e.user_message()));
                self.view = ViewState::Failed(e.user_message());
                None
            }
        }
    }

    /// Execute `ticket` and any follow-up to completion.
    pub async fn run(&mut self, ticket: Option<FetchTicket>) {
        let mut next = ticket;
        while let Some(ticket) = next {
            let outcome = self.fetcher.run(ticket).await;
            next = self.commit(outcome);
        }
    }

    /// Dispatch `event` and wait for the view to settle.
    pub async fn handle(&mut self, event: SearchEvent) {
        let ticket = self.dispatch(event);
        self.run(ticket).await;
    }

    fn log_commit(&self, ticket: &FetchTicket, status: CacheStatus, model: &DisplayModel, elapsed: Duration) {
        self.logger
            .info_builder("results committed")
            .field("key", ticket.key.digest())
            .field("cache", cache_status_name(status))
            .field_u64("items", model.items.len() as u64)
            .field_u64("total", model.total)
            .duration_ms("took", elapsed)
            .emit();
    }
}

fn completed(metrics: FetchMetrics, model: &DisplayModel) -> FetchMetrics {
    metrics.succeeded(model.items.len(), model.total)
}

fn cache_status_name(status: CacheStatus) -> &'static str {
    match status {
        CacheStatus::Hit => "hit",
        CacheStatus::Miss => "miss",
        CacheStatus::Joined => "joined",
        CacheStatus::Revalidated => "revalidated",
    }
}
