//! Controller behavior against a scripted backend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use assist_cache::CacheStatus;
use assist_search::{
    FacetField, PreparedRequest, PriceRange, RawSearchResponse, SearchConfig, SearchError,
};
use async_trait::async_trait;
use search_page::{ResultCache, SearchBackend, SearchEvent, SearchSession, ViewState};
use serde_json::{json, Value};
use tokio::sync::oneshot;

#[derive(Default)]
struct MockBackend {
    responses: Mutex<HashMap<String, Result<Value, SearchError>>>,
    gates: Mutex<HashMap<String, oneshot::Receiver<()>>>,
    calls: Mutex<Vec<PreparedRequest>>,
    /// Title every item after the call number instead of the scripted response.
    versioned: bool,
}

impl MockBackend {
    fn respond(self, text: &str, response: Result<Value, SearchError>) -> Self {
        self.responses.lock().unwrap().insert(text.to_string(), response);
        self
    }

    /// Hold requests for `text` until the returned sender fires.
    fn gate(&self, text: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(text.to_string(), rx);
        tx
    }

    fn versioned() -> Self {
        Self {
            versioned: true,
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<PreparedRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchBackend for MockBackend {
    async fn search(&self, request: PreparedRequest) -> Result<RawSearchResponse, SearchError> {
        let text = request.body.search.clone();
        let call = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(request);
            calls.len()
        };

        let gate = self.gates.lock().unwrap().remove(&text);
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        if self.versioned {
            let response = results(&format!("v{call}"), 1, 1)?;
            return Ok(serde_json::from_value(response).unwrap());
        }

        let response = self
            .responses
            .lock()
            .unwrap()
            .get(&text)
            .cloned()
            .unwrap_or_else(|| Ok(json!({ "items": [], "total": 0 })))?;
        Ok(serde_json::from_value(response).unwrap())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

fn results(title: &str, count: usize, total: u64) -> Result<Value, SearchError> {
    let items: Vec<Value> = (0..count)
        .map(|i| json!({ "id": i, "title": format!("{title} {i}"), "sale_price": 100, "in_stock": true }))
        .collect();
    Ok(json!({
        "items": items,
        "total": total,
        "filter_list": [
            { "label": "Price", "options": { "min_price": 5, "max_price": 200 } },
            { "label": "Brand", "options": [{ "name": "Apple", "count": 3 }] }
        ]
    }))
}

fn session(backend: MockBackend) -> (SearchSession<MockBackend>, Arc<MockBackend>) {
    let backend = Arc::new(backend);
    let config = SearchConfig::default();
    let cache = Arc::new(ResultCache::new(config.cache_capacity));
    (SearchSession::with_cache(config, Arc::clone(&backend), cache), backend)
}

fn loaded_titles(session: &SearchSession<MockBackend>) -> Vec<String> {
    match session.view() {
        ViewState::Loaded(model) => model.items.iter().map(|item| item.title.clone()).collect(),
        other => panic!("expected loaded view, got {other:?}"),
    }
}

#[tokio::test]
async fn test_first_result_seeds_price_with_one_follow_up() {
    let (mut session, backend) = session(MockBackend::default().respond("phone", results("Phone", 2, 2)));

    let ticket = session.open("/search?q=phone&lang=English");
    session.run(ticket).await;

    let calls = backend.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].body.filter.price, [0.0, 0.0]);
    assert_eq!(calls[1].body.filter.price, [5.0, 200.0]);

    assert_eq!(session.state().price_range, Some(PriceRange::new(5.0, 200.0)));
    assert!(!session.state().price_adjusted_by_user);
    assert!(!session.location().contains("priceMin"));
    assert_eq!(session.metrics().bootstrap_refetches, 1);
    assert_eq!(loaded_titles(&session), vec!["Phone 0", "Phone 1"]);
}

#[tokio::test]
async fn test_price_from_location_is_not_replaced() {
    let (mut session, backend) = session(MockBackend::default().respond("phone", results("Phone", 1, 1)));

    let ticket = session.open("/search?q=phone&lang=English&priceMin=10&priceMax=50");
    session.run(ticket).await;

    let calls = backend.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].body.filter.price, [10.0, 50.0]);
    assert_eq!(session.state().price_range, Some(PriceRange::new(10.0, 50.0)));
    assert!(session.location().contains("priceMin=10&priceMax=50"));
}

#[tokio::test]
async fn test_blank_location_stays_idle() {
    let (mut session, backend) = session(MockBackend::default());

    assert!(session.open("/search?lang=English").is_none());
    assert_eq!(session.view(), &ViewState::Idle);
    assert!(session.dispatch(SearchEvent::SubmitText("  ".into())).is_none());
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_out_of_order_response_is_discarded() {
    let (mut session, backend) = session(
        MockBackend::default()
            .respond("slow", results("Slow", 1, 1))
            .respond("fast", results("Fast", 1, 1)),
    );
    let release = backend.gate("slow");
    let fetcher = session.fetcher();

    let slow_ticket = session.open("/search?q=slow&lang=English").unwrap();
    let mut slow = Box::pin(fetcher.run(slow_ticket));
    assert!(futures::poll!(&mut slow).is_pending());

    let fast_ticket = session.dispatch(SearchEvent::SubmitText("fast".into())).unwrap();
    let fast = fetcher.run(fast_ticket).await;
    let follow_up = session.commit(fast);
    session.run(follow_up).await;
    assert_eq!(loaded_titles(&session), vec!["Fast 0"]);

    release.send(()).unwrap();
    let slow = slow.await;
    assert!(slow.result.is_ok());
    assert!(session.commit(slow).is_none());

    assert_eq!(loaded_titles(&session), vec!["Fast 0"]);
    assert_eq!(session.state().text, "fast");
    assert_eq!(session.metrics().stale_discards, 1);
}

#[tokio::test]
async fn test_identical_requests_share_one_fetch() {
    let backend = Arc::new(MockBackend::default().respond("phone", results("Phone", 1, 1)));
    let release = backend.gate("phone");
    let config = SearchConfig::default();
    let cache = Arc::new(ResultCache::new(config.cache_capacity));
    let mut first = SearchSession::with_cache(config.clone(), Arc::clone(&backend), Arc::clone(&cache));
    let mut second = SearchSession::with_cache(config, Arc::clone(&backend), cache);

    let location = "/search?q=phone&lang=English";
    let a = first.open(location).unwrap();
    let b = second.open(location).unwrap();
    assert_eq!(a.key, b.key);

    let (fa, fb) = (first.fetcher(), second.fetcher());
    let mut ra = Box::pin(fa.run(a));
    let mut rb = Box::pin(fb.run(b));
    assert!(futures::poll!(&mut ra).is_pending());
    assert!(futures::poll!(&mut rb).is_pending());
    release.send(()).unwrap();

    let (oa, ob) = futures::join!(ra, rb);
    assert_eq!(oa.status, CacheStatus::Miss);
    assert_eq!(ob.status, CacheStatus::Joined);
    assert_eq!(backend.calls().len(), 1);
    assert_eq!(oa.result.unwrap(), ob.result.unwrap());
}

#[tokio::test]
async fn test_navigating_back_revalidates() {
    let (mut session, backend) = session(MockBackend::versioned());

    let ticket = session.open("/search?q=phone&lang=English");
    session.run(ticket).await;
    assert_eq!(loaded_titles(&session), vec!["v2 0"]);

    session
        .handle(SearchEvent::Toggle {
            field: FacetField::Brand,
            value: "Apple".into(),
        })
        .await;
    assert_eq!(loaded_titles(&session), vec!["v3 0"]);
    assert_eq!(session.active_filters().len(), 1);

    let ticket = session.dispatch(SearchEvent::NavigateBack).unwrap();
    assert!(ticket.revalidate);
    let outcome = session.fetcher().run(ticket).await;
    assert_eq!(outcome.status, CacheStatus::Revalidated);
    let follow_up = session.commit(outcome).unwrap();
    assert!(follow_up.revalidate);
    let outcome = session.fetcher().run(follow_up).await;
    assert_eq!(outcome.status, CacheStatus::Revalidated);
    assert!(session.commit(outcome).is_none());

    // Both the restored query and its price follow-up were fetched fresh.
    assert_eq!(backend.calls().len(), 5);
    assert_eq!(loaded_titles(&session), vec!["v5 0"]);
    assert!(session.state().brands.is_empty());
    assert_eq!(session.state().price_range, Some(PriceRange::new(5.0, 200.0)));
    assert_eq!(session.metrics().revalidations, 2);

    // Nothing left to go back to.
    assert!(session.dispatch(SearchEvent::NavigateBack).is_none());
}

#[tokio::test]
async fn test_opening_again_reuses_cached_result() {
    let (mut session, backend) = session(MockBackend::versioned());
    let location = "/search?q=phone&lang=English";

    let ticket = session.open(location);
    session.run(ticket).await;
    let ticket = session.open(location);
    session.run(ticket).await;

    assert_eq!(backend.calls().len(), 2);
    assert_eq!(session.metrics().cache_hits, 2);
    assert_eq!(loaded_titles(&session), vec!["v2 0"]);
}

#[tokio::test]
async fn test_failure_is_shown_and_not_cached() {
    let (mut session, backend) = session(
        MockBackend::default().respond("broken", Err(SearchError::request_failed(Some("Invalid secret key")))),
    );
    let location = "/search?q=broken&lang=English";

    let ticket = session.open(location);
    session.run(ticket).await;
    assert_eq!(session.view(), &ViewState::Failed("Invalid secret key".into()));
    assert_eq!(session.state().price_range, None);
    assert_eq!(session.metrics().failures, 1);

    let ticket = session.open(location).unwrap();
    let outcome = session.fetcher().run(ticket).await;
    assert_eq!(outcome.status, CacheStatus::Miss);
    assert_eq!(backend.calls().len(), 2);
}

#[tokio::test]
async fn test_empty_result() {
    let (mut session, _backend) = session(MockBackend::default());

    let ticket = session.open("/search?q=nothing&lang=English");
    session.run(ticket).await;

    let model = session.view().model().unwrap();
    assert!(model.is_empty());
    assert_eq!(model.total, 0);
    assert!(!model.pagination.is_visible());
    assert_eq!(model.pagination.displayed_text(), "0 items");
}

#[tokio::test]
async fn test_page_change_respects_known_page_count() {
    let (mut session, backend) = session(MockBackend::default().respond("phone", results("Phone", 28, 56)));

    let ticket = session.open("/search?q=phone&lang=English");
    session.run(ticket).await;
    assert_eq!(session.view().model().unwrap().pagination.total_pages, 2);
    let before = backend.calls().len();

    assert!(session.dispatch(SearchEvent::ChangePage(3)).is_none());
    assert_eq!(session.state().page, 1);
    assert_eq!(session.metrics().ignored_events, 1);

    let ticket = session.dispatch(SearchEvent::ChangePage(2)).unwrap();
    assert_eq!(ticket.page, 2);
    session.run(Some(ticket)).await;

    assert_eq!(session.state().page, 2);
    assert!(session.location().contains("page=2"));
    assert_eq!(backend.calls().len(), before + 1);
    assert_eq!(backend.calls()[before].body.page, 2);
}
