use std::cmp::Ordering as CmpOrdering;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::warn;

use crate::config::PAGE_SIZE;
use crate::domain::{Event, FilterSet, Origin};
use crate::errors::EventsResult;
use crate::services::category::resolve_classification;
use crate::services::dedup::dedupe_recurring;
use crate::services::paginator::FeedPagination;
use crate::sources::{map_provider_record, ExternalQuery, ExternalSource};
use crate::storage::traits::{EventStore, LocalQuery};

/// One composed page of the feed as seen by the caller: the accumulated
/// events for the current filter cycle plus the aggregate load-more signal.
#[derive(Debug, Clone)]
pub struct FeedPage {
    pub events: Vec<Event>,
    pub can_load_more: bool,
}

#[derive(Debug)]
pub enum FetchOutcome {
    Page(FeedPage),
    /// Another fetch for this view is still running; nothing was changed.
    InFlight,
    /// A newer filter cycle superseded this fetch; its results were discarded.
    Stale,
}

/// Per-view state guarded by the compositor's mutex. Nothing outside one
/// compositor instance shares pagination or accumulated results.
struct ViewState {
    events: Vec<Event>,
    pagination: FeedPagination,
    local_category_id: Option<i64>,
    category_resolved: bool,
    generation: u64,
}

impl ViewState {
    fn new() -> Self {
        Self {
            events: Vec::new(),
            pagination: FeedPagination::default(),
            local_category_id: None,
            category_resolved: false,
            generation: 0,
        }
    }

    /// Start a fetch cycle: a reset begins a new generation with fresh
    /// cursors, a load-more continues the current one.
    fn begin(&mut self, filter: &FilterSet, reset: bool) -> FetchPlan {
        if reset {
            self.generation += 1;
            self.pagination.reset();
            self.events.clear();
            self.category_resolved = false;
            self.local_category_id = None;
        }

        FetchPlan {
            generation: self.generation,
            reset,
            filter: filter.clone(),
            local_offset: self.pagination.local.page * PAGE_SIZE,
            external_page: self.pagination.external.page,
            category_id: self.local_category_id,
            category_resolved: self.category_resolved,
        }
    }

    /// Apply a finished fetch. Returns `None` when a newer generation
    /// superseded the plan, in which case the results are discarded.
    fn apply(
        &mut self,
        plan: &FetchPlan,
        composed: Vec<Event>,
        local_count: usize,
        external_meta: Option<(bool, u32)>,
        category_id: Option<i64>,
    ) -> Option<FeedPage> {
        if self.generation != plan.generation {
            return None;
        }

        self.local_category_id = category_id;
        self.category_resolved = true;

        self.pagination.advance_local(local_count, PAGE_SIZE);
        match external_meta {
            Some((has_more, next_page)) => self.pagination.advance_external(has_more, next_page),
            None => self.pagination.mark_external_unavailable(),
        }

        self.events.extend(composed);

        Some(FeedPage {
            events: self.events.clone(),
            can_load_more: self.pagination.can_load_more(),
        })
    }
}

struct FetchPlan {
    generation: u64,
    reset: bool,
    filter: FilterSet,
    local_offset: u32,
    external_page: u32,
    category_id: Option<i64>,
    category_resolved: bool,
}

/// Merges the local store and the external provider into one paginated,
/// deduplicated feed. Owns all per-view state; collaborators and the random
/// source are injected.
pub struct FeedCompositor<S, X, R> {
    store: S,
    source: X,
    rng: Mutex<R>,
    state: Mutex<ViewState>,
    in_flight: AtomicBool,
}

impl<S, X, R> FeedCompositor<S, X, R>
where
    S: EventStore,
    X: ExternalSource,
    R: Rng + Send,
{
    pub fn new(store: S, source: X, rng: R) -> Self {
        Self {
            store,
            source,
            rng: Mutex::new(rng),
            state: Mutex::new(ViewState::new()),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Fetch one page of the combined feed. `reset` starts a new filter
    /// cycle; otherwise the fetch is a load-more continuing the current one.
    ///
    /// Single-flight: a call entered while another fetch is running returns
    /// `FetchOutcome::InFlight` without touching any state.
    pub fn fetch_page(&self, filter: &FilterSet, reset: bool) -> EventsResult<FetchOutcome> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return Ok(FetchOutcome::InFlight);
        }
        let _flight = FlightGuard(&self.in_flight);

        let plan = self.lock_state().begin(filter, reset);

        // Step 1: resolve the local category id once per filter cycle
        let category_id = if plan.category_resolved {
            plan.category_id
        } else {
            self.resolve_local_category(&plan.filter)
        };

        // Step 2: local store query; a failure degrades to zero local rows
        let local_query = LocalQuery {
            keyword: plan.filter.keyword.clone(),
            location: plan.filter.location.clone(),
            category_id,
        };
        let local_rows = match self.store.search(&local_query, plan.local_offset, PAGE_SIZE) {
            Ok(rows) => rows,
            Err(e) => {
                warn!(error = %e, "local store query failed, composing without local rows");
                Vec::new()
            }
        };
        let local_count = local_rows.len();

        // Steps 3-4: classification bridge, then the external query; a
        // failure degrades to zero external records for this cycle
        let external_query = ExternalQuery {
            keyword: plan.filter.keyword.clone(),
            location: plan.filter.location.clone(),
            classification_id: resolve_classification(plan.filter.category.as_deref()),
        };
        let (raw_records, external_meta) =
            match self.source.search(&external_query, plan.external_page) {
                Ok(page) => {
                    let meta = (page.has_more, page.next_page);
                    (page.records, Some(meta))
                }
                Err(e) => {
                    warn!(error = %e, "external source query failed, composing local-only");
                    (Vec::new(), None)
                }
            };

        // Steps 5-6: map raw records, then collapse recurring listings.
        // Keyword searches skip dedup so distinct hits stay distinct.
        let mapped: Vec<Event> = raw_records.into_iter().map(map_provider_record).collect();
        let external_events = if plan.filter.has_keyword() {
            mapped
        } else {
            dedupe_recurring(mapped)
        };

        // Steps 7-8: order and interleave
        let local_events: Vec<Event> = local_rows.into_iter().map(Event::from_local_row).collect();
        let composed = {
            let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            compose(&mut *rng, local_events, external_events, &plan.filter, plan.reset)
        };

        // Steps 9-10: apply under the state lock unless superseded
        let outcome = self
            .lock_state()
            .apply(&plan, composed, local_count, external_meta, category_id);

        Ok(match outcome {
            Some(page) => FetchOutcome::Page(page),
            None => FetchOutcome::Stale,
        })
    }

    fn resolve_local_category(&self, filter: &FilterSet) -> Option<i64> {
        let label = filter.category.as_deref()?.trim();
        if label.is_empty() {
            return None;
        }
        match self.store.resolve_category_id(label) {
            Ok(id) => id,
            Err(e) => {
                warn!(error = %e, category = label, "category lookup failed, skipping local category filter");
                None
            }
        }
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, ViewState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    #[cfg(test)]
    fn set_in_flight(&self, value: bool) {
        self.in_flight.store(value, Ordering::SeqCst);
    }
}

struct FlightGuard<'a>(&'a AtomicBool);

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Order the combined batch, then interleave origins for display.
///
/// An unfiltered reset fetch gets a uniform shuffle to vary the landing
/// feed; every other fetch sorts chronologically, undated events last. The
/// interleave then mixes origins by coin flip so one source cannot run the
/// whole page, without dropping or duplicating any record.
fn compose<R: Rng>(
    rng: &mut R,
    local: Vec<Event>,
    external: Vec<Event>,
    filter: &FilterSet,
    reset: bool,
) -> Vec<Event> {
    let mut combined = local;
    combined.extend(external);

    if filter.is_empty() && reset {
        combined.shuffle(rng);
    } else {
        combined.sort_by(cmp_start_none_last);
    }

    interleave_by_origin(rng, combined)
}

/// Chronological order with unknown dates last. Stable under `sort_by`.
fn cmp_start_none_last(a: &Event, b: &Event) -> CmpOrdering {
    match (a.start_time, b.start_time) {
        (Some(left), Some(right)) => left.cmp(&right),
        (Some(_), None) => CmpOrdering::Less,
        (None, Some(_)) => CmpOrdering::Greater,
        (None, None) => CmpOrdering::Equal,
    }
}

fn interleave_by_origin<R: Rng>(rng: &mut R, ordered: Vec<Event>) -> Vec<Event> {
    let mut local: VecDeque<Event> = VecDeque::new();
    let mut external: VecDeque<Event> = VecDeque::new();
    for event in ordered {
        match event.origin {
            Origin::Local => local.push_back(event),
            Origin::External => external.push_back(event),
        }
    }

    let mut out = Vec::with_capacity(local.len() + external.len());
    loop {
        let pick_local = if external.is_empty() {
            true
        } else if local.is_empty() {
            false
        } else {
            rng.gen_bool(0.5)
        };

        let next = if pick_local {
            local.pop_front()
        } else {
            external.pop_front()
        };

        match next {
            Some(event) => out.push(event),
            None => break,
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Price;
    use crate::errors::EventsError;
    use crate::sources::record::ProviderEvent;
    use crate::sources::traits::{ExternalPage, MockExternalSource};
    use crate::storage::traits::MockEventStore;
    use chrono::{DateTime, Utc};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    fn at(iso: &str) -> Option<DateTime<Utc>> {
        Some(DateTime::parse_from_rfc3339(iso).unwrap().with_timezone(&Utc))
    }

    fn local_event(id: &str, start: Option<DateTime<Utc>>) -> Event {
        Event {
            id: id.to_string(),
            title: format!("Local {}", id),
            start_time: start,
            price: Price::free(),
            location: "Town Hall".to_string(),
            description: String::new(),
            image_url: String::new(),
            seats_left: Some(10),
            category: None,
            origin: Origin::Local,
            external_url: None,
            external_organizer: None,
            extra_dates: Vec::new(),
            extra_count: 0,
        }
    }

    fn external_event(id: &str, start: Option<DateTime<Utc>>) -> Event {
        Event {
            origin: Origin::External,
            ..local_event(id, start)
        }
    }

    fn local_row(id: i64, title: &str, start: Option<DateTime<Utc>>) -> crate::domain::LocalEventRow {
        crate::domain::LocalEventRow {
            id,
            title: title.to_string(),
            start_time: start,
            price: 10.0,
            location: "Town Hall, Reading".to_string(),
            description: String::new(),
            image_url: String::new(),
            seats_left: Some(25),
            creator_id: None,
            category_name: None,
        }
    }

    fn raw_record(id: &str, name: &str, venue: &str, date_time: &str) -> ProviderEvent {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "name": name,
            "dates": { "start": { "dateTime": date_time } },
            "_embedded": { "venues": [ { "name": venue, "city": { "name": "Reading" } } ] }
        }))
        .unwrap()
    }

    #[test]
    fn test_interleave_keeps_every_record() {
        let ordered = vec![
            local_event("1", None),
            external_event("tm_a", None),
            local_event("2", None),
            external_event("tm_b", None),
            external_event("tm_c", None),
        ];
        let out = interleave_by_origin(&mut rng(), ordered);
        assert_eq!(out.len(), 5);

        let locals = out.iter().filter(|e| e.origin == Origin::Local).count();
        assert_eq!(locals, 2);
    }

    #[test]
    fn test_interleave_preserves_per_origin_order() {
        let ordered = vec![
            local_event("1", None),
            local_event("2", None),
            external_event("tm_a", None),
            external_event("tm_b", None),
        ];
        let out = interleave_by_origin(&mut rng(), ordered);

        let local_ids: Vec<_> = out
            .iter()
            .filter(|e| e.origin == Origin::Local)
            .map(|e| e.id.as_str())
            .collect();
        let external_ids: Vec<_> = out
            .iter()
            .filter(|e| e.origin == Origin::External)
            .map(|e| e.id.as_str())
            .collect();

        assert_eq!(local_ids, vec!["1", "2"]);
        assert_eq!(external_ids, vec!["tm_a", "tm_b"]);
    }

    #[test]
    fn test_interleave_deterministic_for_fixed_seed() {
        let ordered = || {
            vec![
                local_event("1", None),
                local_event("2", None),
                external_event("tm_a", None),
                external_event("tm_b", None),
            ]
        };
        let first: Vec<String> = interleave_by_origin(&mut rng(), ordered())
            .into_iter()
            .map(|e| e.id)
            .collect();
        let second: Vec<String> = interleave_by_origin(&mut rng(), ordered())
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_sort_puts_undated_last() {
        let mut events = vec![
            local_event("undated", None),
            local_event("late", at("2025-12-01T10:00:00Z")),
            local_event("early", at("2025-11-01T10:00:00Z")),
        ];
        events.sort_by(cmp_start_none_last);

        let ids: Vec<_> = events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["early", "late", "undated"]);
    }

    #[test]
    fn test_compose_completeness_under_filter() {
        let filter = FilterSet {
            location: Some("Reading".to_string()),
            ..Default::default()
        };
        let local = vec![local_event("1", at("2025-11-01T10:00:00Z"))];
        let external = vec![
            external_event("tm_a", at("2025-10-01T10:00:00Z")),
            external_event("tm_b", None),
        ];
        let out = compose(&mut rng(), local, external, &filter, true);
        assert_eq!(out.len(), 3);
    }

    fn compositor_with(
        store: MockEventStore,
        source: MockExternalSource,
    ) -> FeedCompositor<MockEventStore, MockExternalSource, StdRng> {
        FeedCompositor::new(store, source, rng())
    }

    #[test]
    fn test_fetch_composes_both_sources() {
        let mut store = MockEventStore::new();
        store
            .expect_search()
            .returning(|_, _, _| Ok(vec![local_row(1, "Quiz Night", at("2025-11-02T19:00:00Z"))]));

        let mut source = MockExternalSource::new();
        source.expect_search().returning(|_, _| {
            Ok(ExternalPage {
                records: vec![raw_record("a", "Arena Show", "Arena", "2025-11-03T20:00:00Z")],
                has_more: false,
                next_page: 1,
            })
        });

        let compositor = compositor_with(store, source);
        let outcome = compositor.fetch_page(&FilterSet::default(), true).unwrap();

        match outcome {
            FetchOutcome::Page(page) => {
                assert_eq!(page.events.len(), 2);
                assert!(!page.can_load_more);
            }
            other => panic!("expected page, got {:?}", other),
        }
    }

    #[test]
    fn test_keyword_bypasses_dedup() {
        let mut store = MockEventStore::new();
        store.expect_search().returning(|_, _, _| Ok(Vec::new()));

        let mut source = MockExternalSource::new();
        source.expect_search().returning(|_, _| {
            Ok(ExternalPage {
                records: vec![
                    raw_record("a", "Comedy Night", "The Globe", "2025-11-05T19:00:00Z"),
                    raw_record("b", "Comedy Night", "The Globe", "2025-11-20T19:00:00Z"),
                ],
                has_more: false,
                next_page: 1,
            })
        });

        let compositor = compositor_with(store, source);
        let filter = FilterSet {
            keyword: Some("comedy".to_string()),
            ..Default::default()
        };
        let outcome = compositor.fetch_page(&filter, true).unwrap();

        match outcome {
            FetchOutcome::Page(page) => assert_eq!(page.events.len(), 2),
            other => panic!("expected page, got {:?}", other),
        }
    }

    #[test]
    fn test_end_to_end_recurring_listing_collapses() {
        let mut store = MockEventStore::new();
        store.expect_search().returning(|_, _, _| {
            Ok(vec![
                local_row(1, "Pottery Class", at("2025-11-01T18:00:00Z")),
                local_row(2, "Quiz Night", at("2025-11-02T19:00:00Z")),
            ])
        });

        let mut source = MockExternalSource::new();
        source.expect_search().returning(|_, _| {
            Ok(ExternalPage {
                records: vec![
                    raw_record("a", "Comedy Night", "The Globe", "2025-11-05T19:00:00Z"),
                    raw_record("b", "Comedy Night", "The Globe", "2025-11-20T19:00:00Z"),
                    raw_record("c", "Folk Session", "The Anchor", "2025-11-07T20:00:00Z"),
                ],
                has_more: false,
                next_page: 1,
            })
        });

        let compositor = compositor_with(store, source);
        let outcome = compositor.fetch_page(&FilterSet::default(), true).unwrap();

        let page = match outcome {
            FetchOutcome::Page(page) => page,
            other => panic!("expected page, got {:?}", other),
        };

        assert_eq!(page.events.len(), 4);

        let comedy = page
            .events
            .iter()
            .find(|e| e.title == "Comedy Night")
            .expect("comedy night present");
        assert_eq!(comedy.start_time, at("2025-11-05T19:00:00Z"));
        assert_eq!(comedy.extra_dates, vec![at("2025-11-20T19:00:00Z").unwrap()]);
        assert_eq!(comedy.extra_count, 1);
    }

    #[test]
    fn test_load_more_appends_and_advances_offsets() {
        let mut store = MockEventStore::new();
        store
            .expect_search()
            .withf(|_, offset, _| *offset == 0)
            .times(1)
            .returning(|_, _, limit| {
                let rows = (0..limit as i64)
                    .map(|i| local_row(i, &format!("Event {}", i), at("2025-11-02T19:00:00Z")))
                    .collect();
                Ok(rows)
            });
        store
            .expect_search()
            .withf(|_, offset, _| *offset == 12)
            .times(1)
            .returning(|_, _, _| Ok(vec![local_row(99, "Last One", at("2025-12-02T19:00:00Z"))]));

        let mut source = MockExternalSource::new();
        source
            .expect_search()
            .withf(|_, page| *page == 0)
            .times(1)
            .returning(|_, _| {
                Ok(ExternalPage {
                    records: vec![raw_record("a", "Arena Show", "Arena", "2025-11-03T20:00:00Z")],
                    has_more: true,
                    next_page: 1,
                })
            });
        source
            .expect_search()
            .withf(|_, page| *page == 1)
            .times(1)
            .returning(|_, _| {
                Ok(ExternalPage {
                    records: Vec::new(),
                    has_more: false,
                    next_page: 2,
                })
            });

        let compositor = compositor_with(store, source);
        let filter = FilterSet {
            location: Some("Reading".to_string()),
            ..Default::default()
        };

        let first = match compositor.fetch_page(&filter, true).unwrap() {
            FetchOutcome::Page(page) => page,
            other => panic!("expected page, got {:?}", other),
        };
        assert_eq!(first.events.len(), 13);
        assert!(first.can_load_more);

        let second = match compositor.fetch_page(&filter, false).unwrap() {
            FetchOutcome::Page(page) => page,
            other => panic!("expected page, got {:?}", other),
        };
        assert_eq!(second.events.len(), 14);
        assert!(!second.can_load_more);
    }

    #[test]
    fn test_external_failure_degrades_to_local_only() {
        let mut store = MockEventStore::new();
        store
            .expect_search()
            .returning(|_, _, _| Ok(vec![local_row(1, "Quiz Night", at("2025-11-02T19:00:00Z"))]));

        let mut source = MockExternalSource::new();
        source
            .expect_search()
            .returning(|_, _| Err(EventsError::Provider("boom".to_string())));

        let compositor = compositor_with(store, source);
        let page = match compositor.fetch_page(&FilterSet::default(), true).unwrap() {
            FetchOutcome::Page(page) => page,
            other => panic!("expected page, got {:?}", other),
        };

        assert_eq!(page.events.len(), 1);
        assert_eq!(page.events[0].origin, Origin::Local);
        // short local page + unavailable provider = nothing more to load
        assert!(!page.can_load_more);
    }

    #[test]
    fn test_local_failure_degrades_to_external_only() {
        let mut store = MockEventStore::new();
        store
            .expect_search()
            .returning(|_, _, _| Err(EventsError::Database(rusqlite::Error::InvalidQuery)));

        let mut source = MockExternalSource::new();
        source.expect_search().returning(|_, _| {
            Ok(ExternalPage {
                records: vec![raw_record("a", "Arena Show", "Arena", "2025-11-03T20:00:00Z")],
                has_more: false,
                next_page: 1,
            })
        });

        let compositor = compositor_with(store, source);
        let page = match compositor.fetch_page(&FilterSet::default(), true).unwrap() {
            FetchOutcome::Page(page) => page,
            other => panic!("expected page, got {:?}", other),
        };

        assert_eq!(page.events.len(), 1);
        assert_eq!(page.events[0].origin, Origin::External);
    }

    #[test]
    fn test_category_filter_resolved_for_both_sources() {
        let mut store = MockEventStore::new();
        store
            .expect_resolve_category_id()
            .withf(|name| name == "Music")
            .times(1)
            .returning(|_| Ok(Some(3)));
        store
            .expect_search()
            .withf(|query, _, _| query.category_id == Some(3))
            .returning(|_, _, _| Ok(Vec::new()));

        let mut source = MockExternalSource::new();
        source
            .expect_search()
            .withf(|query, _| query.classification_id.as_deref() == Some("KZFzniwnSyZfZ7v7nJ"))
            .returning(|_, _| Ok(ExternalPage::default()));

        let compositor = compositor_with(store, source);
        let filter = FilterSet {
            category: Some("Music".to_string()),
            ..Default::default()
        };
        compositor.fetch_page(&filter, true).unwrap();
    }

    #[test]
    fn test_category_lookup_cached_across_load_more() {
        let mut store = MockEventStore::new();
        store
            .expect_resolve_category_id()
            .times(1)
            .returning(|_| Ok(Some(3)));
        store
            .expect_search()
            .times(2)
            .returning(|_, _, _| Ok(Vec::new()));

        let mut source = MockExternalSource::new();
        source
            .expect_search()
            .times(2)
            .returning(|_, _| Ok(ExternalPage::default()));

        let compositor = compositor_with(store, source);
        let filter = FilterSet {
            category: Some("Music".to_string()),
            ..Default::default()
        };
        compositor.fetch_page(&filter, true).unwrap();
        compositor.fetch_page(&filter, false).unwrap();
    }

    #[test]
    fn test_in_flight_fetch_is_rejected() {
        let store = MockEventStore::new();
        let source = MockExternalSource::new();
        let compositor = compositor_with(store, source);

        compositor.set_in_flight(true);
        let outcome = compositor.fetch_page(&FilterSet::default(), true).unwrap();
        assert!(matches!(outcome, FetchOutcome::InFlight));
    }

    #[test]
    fn test_superseded_fetch_is_discarded() {
        let mut state = ViewState::new();
        let plan = state.begin(&FilterSet::default(), true);

        // A newer filter cycle starts before the first fetch resolves
        state.begin(&FilterSet::default(), true);

        let applied = state.apply(&plan, vec![local_event("1", None)], 1, None, None);
        assert!(applied.is_none());
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_unfiltered_reset_shuffles_but_keeps_all() {
        let local: Vec<Event> = (0..4)
            .map(|i| local_event(&i.to_string(), at("2025-11-01T10:00:00Z")))
            .collect();
        let external: Vec<Event> = (0..4)
            .map(|i| external_event(&format!("tm_{}", i), at("2025-11-02T10:00:00Z")))
            .collect();

        let out = compose(&mut rng(), local, external, &FilterSet::default(), true);
        assert_eq!(out.len(), 8);

        let mut ids: Vec<_> = out.iter().map(|e| e.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 8);
    }
}
