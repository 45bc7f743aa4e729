use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::client::{ClientError, PlanSource};
use crate::model::{
    FeedbackRequest, Place, PlansResponse, SavedPlanView, SummaryRequest, SummaryResponse,
    TimeOfDay, TravelPlan,
};
use crate::render::{ElementKey, PlanAction, REGENERATE_SUMMARY_LABEL};
use crate::session::SearchContext;
use crate::view::{
    ActionError, LoadMoreState, PlanSession, SUMMARY_BAD_REQUEST, SUMMARY_RETRY_MESSAGE,
};


fn plan(i: usize) -> TravelPlan {
    TravelPlan {
        id: format!("plan-{i}"),
        places: vec![Place {
            id: format!("place-{i}"),
            place_name: format!("Stop {i}"),
            address: format!("{i} Main St"),
            url: format!("https://maps.example/{i}"),
            start_time: TimeOfDay::new("9"),
            end_time: TimeOfDay::new("11"),
            place_icon_css_class: "fas fa-landmark".to_string(),
        }],
        saved: false,
        planning_spec: serde_json::json!({ "seed": i }),
    }
}

fn status_error(status: u16) -> ClientError {
    ClientError::Status {
        url: "stub".to_string(),
        status,
        body: String::new(),
    }
}

/// In-memory backend that serves a fixed pool of plans and records calls.
struct StubSource {
    pool: Vec<TravelPlan>,
    fetch_ok: AtomicBool,
    /// Upper bound on plans served, lowered to simulate a shrinking result set.
    available: AtomicUsize,
    post_status: Option<u16>,
    summary_error: Mutex<Option<ClientError>>,
    fetches: Mutex<Vec<Option<usize>>>,
    saves: Mutex<Vec<(String, SavedPlanView)>>,
    feedback: Mutex<Vec<(String, FeedbackRequest)>>,
    summaries: Mutex<Vec<String>>,
}

impl StubSource {
    fn new(total: usize) -> Self {
        Self {
            pool: (0..total).map(plan).collect(),
            fetch_ok: AtomicBool::new(true),
            available: AtomicUsize::new(total),
            post_status: None,
            summary_error: Mutex::new(None),
            fetches: Mutex::new(Vec::new()),
            saves: Mutex::new(Vec::new()),
            feedback: Mutex::new(Vec::new()),
            summaries: Mutex::new(Vec::new()),
        }
    }

    fn failing_posts(mut self, status: u16) -> Self {
        self.post_status = Some(status);
        self
    }

    fn fetch_count(&self) -> usize {
        self.fetches.lock().unwrap().len()
    }
}

impl PlanSource for StubSource {
    async fn fetch_plans(
        &self,
        ctx: &SearchContext,
        number_results: Option<usize>,
    ) -> Option<PlansResponse> {
        self.fetches.lock().unwrap().push(number_results);
        if !self.fetch_ok.load(Ordering::SeqCst) {
            return None;
        }
        let n = number_results
            .unwrap_or(ctx.number_results())
            .min(self.pool.len())
            .min(self.available.load(Ordering::SeqCst));
        Some(PlansResponse {
            travel_plans: self.pool[..n].to_vec(),
            trip_details_url: (0..n).map(|i| format!("/v1/plans/{i}")).collect(),
            travel_destination: "Paris".to_string(),
        })
    }

    async fn save_plan(&self, username: &str, view: &SavedPlanView) -> Result<(), ClientError> {
        self.saves
            .lock()
            .unwrap()
            .push((username.to_string(), view.clone()));
        match self.post_status {
            Some(status) => Err(status_error(status)),
            None => Ok(()),
        }
    }

    async fn send_feedback(
        &self,
        username: &str,
        feedback: &FeedbackRequest,
    ) -> Result<(), ClientError> {
        self.feedback
            .lock()
            .unwrap()
            .push((username.to_string(), feedback.clone()));
        match self.post_status {
            Some(status) => Err(status_error(status)),
            None => Ok(()),
        }
    }

    async fn plan_summary(
        &self,
        request: &SummaryRequest,
    ) -> Result<SummaryResponse, ClientError> {
        self.summaries.lock().unwrap().push(request.plan_id.clone());
        match self.summary_error.lock().unwrap().take() {
            Some(e) => Err(e),
            None => Ok(SummaryResponse {
                message: format!("A fine day for {}", request.plan_id),
            }),
        }
    }
}

fn ctx(number_results: usize) -> SearchContext {
    SearchContext::from_page_url(&format!(
        "http://planner.test/v1/plans?location=Paris&date=2024-05-02&numberResults={number_results}"
    ))
    .unwrap()
}

async fn ready_session(source: &StubSource, number_results: usize, initial: usize) -> PlanSession {
    let mut session = PlanSession::new(ctx(number_results), "alice", initial, 5);
    assert!(session.on_ready(source).await);
    session
}

#[tokio::test]
async fn load_more_reveals_cached_plans_without_fetching() {
    let source = StubSource::new(15);
    let mut session = ready_session(&source, 15, 5).await;
    assert_eq!(source.fetch_count(), 1);
    assert_eq!(
        session.load_more_state(),
        LoadMoreState::HasMore { busy: false }
    );

    let first = session.load_more(&source).await;
    assert!(!first.fetched);
    assert_eq!(
        first.rendered.iter().map(|r| r.index).collect::<Vec<_>>(),
        vec![5, 6, 7, 8, 9]
    );
    assert_eq!(session.displayed_plans(), 10);
    assert!(session.load_more_visible());

    let second = session.load_more(&source).await;
    assert!(!second.fetched);
    assert_eq!(
        second.rendered.iter().map(|r| r.index).collect::<Vec<_>>(),
        vec![10, 11, 12, 13, 14]
    );
    assert_eq!(session.displayed_plans(), 15);
    assert_eq!(session.load_more_state(), LoadMoreState::Exhausted);
    assert!(!session.load_more_visible());
    assert_eq!(source.fetch_count(), 1);
}

#[tokio::test]
async fn displayed_count_follows_min_formula() {
    for (initial, total) in [(5, 15), (5, 12), (3, 20), (0, 7), (5, 5)] {
        for clicks in 0..5 {
            let source = StubSource::new(total);
            let mut session = PlanSession::new(ctx(total), "alice", initial, 5);
            assert!(session.on_ready(&source).await);
            for _ in 0..clicks {
                let expected_visible =
                    session.displayed_plans() < session.plans_data().unwrap().len();
                assert_eq!(session.load_more_visible(), expected_visible);
                if !expected_visible {
                    break;
                }
                session.load_more(&source).await;
            }
            assert_eq!(
                session.displayed_plans(),
                (initial + clicks * 5).min(total),
                "initial={initial} total={total} clicks={clicks}"
            );
            assert_eq!(
                session.load_more_visible(),
                session.displayed_plans() < session.plans_data().unwrap().len()
            );
            assert_eq!(source.fetch_count(), 1);
        }
    }
}

#[tokio::test]
async fn exhausted_cache_fetches_deeper_and_renders_only_new_plans() {
    let source = StubSource::new(12);
    let mut session = ready_session(&source, 5, 5).await;
    assert_eq!(session.load_more_state(), LoadMoreState::Exhausted);

    let outcome = session.load_more(&source).await;
    assert!(outcome.fetched);
    assert_eq!(
        source.fetches.lock().unwrap().clone(),
        vec![None, Some(10)]
    );
    assert_eq!(
        outcome.rendered.iter().map(|r| r.index).collect::<Vec<_>>(),
        vec![5, 6, 7, 8, 9]
    );
    assert_eq!(session.displayed_plans(), 10);
    assert_eq!(session.plans_data().unwrap().len(), 10);
    assert_eq!(session.context().number_results(), 10);

    let outcome = session.load_more(&source).await;
    assert_eq!(source.fetches.lock().unwrap().last(), Some(&Some(15)));
    assert_eq!(outcome.rendered.len(), 2);
    assert_eq!(session.displayed_plans(), 12);
    assert_eq!(session.load_more_state(), LoadMoreState::Exhausted);
}

#[tokio::test]
async fn failed_fetch_leaves_state_unchanged() {
    let source = StubSource::new(12);
    let mut session = ready_session(&source, 5, 5).await;
    source.fetch_ok.store(false, Ordering::SeqCst);

    let outcome = session.load_more(&source).await;
    assert!(outcome.fetched);
    assert!(outcome.rendered.is_empty());
    assert_eq!(session.displayed_plans(), 5);
    assert_eq!(session.plans_data().unwrap().len(), 5);
    assert_eq!(session.context().number_results(), 5);

    source.fetch_ok.store(true, Ordering::SeqCst);
    let retry = session.load_more(&source).await;
    assert_eq!(retry.rendered.len(), 5);
    assert_eq!(session.displayed_plans(), 10);
}

#[tokio::test]
async fn shorter_deeper_fetch_keeps_cache() {
    let source = StubSource::new(12);
    let mut session = ready_session(&source, 10, 10).await;
    assert_eq!(session.load_more_state(), LoadMoreState::Exhausted);
    source.available.store(6, Ordering::SeqCst);

    let outcome = session.load_more(&source).await;
    assert!(outcome.fetched);
    assert!(outcome.rendered.is_empty());
    assert_eq!(source.fetches.lock().unwrap().last(), Some(&Some(15)));
    assert_eq!(session.plans_data().unwrap().len(), 10);
    assert_eq!(session.displayed_plans(), 10);
    assert_eq!(session.context().number_results(), 10);
    assert_eq!(session.load_more_state(), LoadMoreState::Exhausted);
}

#[tokio::test]
async fn control_is_busy_while_deeper_fetch_is_pending() {
    let source = StubSource::new(12);
    let mut session = ready_session(&source, 5, 5).await;
    assert_eq!(session.load_more_state(), LoadMoreState::Exhausted);

    let requested = session.begin_fetch();
    assert_eq!(requested, 10);
    assert_eq!(
        session.load_more_state(),
        LoadMoreState::HasMore { busy: true }
    );
    assert!(session.load_more_visible());
    assert_eq!(session.begin_fetch(), 10);

    let fetched = source.fetch_plans(session.context(), Some(requested)).await;
    let rendered = session.finish_fetch(fetched);
    assert_eq!(
        rendered.iter().map(|r| r.index).collect::<Vec<_>>(),
        vec![5, 6, 7, 8, 9]
    );
    assert_eq!(session.load_more_state(), LoadMoreState::Exhausted);
    assert_eq!(session.context().number_results(), 10);
}

#[tokio::test]
async fn failed_fetch_clears_busy_state() {
    let source = StubSource::new(12);
    let mut session = ready_session(&source, 5, 5).await;
    session.begin_fetch();
    assert!(session.finish_fetch(None).is_empty());
    assert_eq!(session.load_more_state(), LoadMoreState::Exhausted);
    assert_eq!(session.displayed_plans(), 5);
    assert!(session.finish_fetch(None).is_empty());
}

#[tokio::test]
async fn ready_fetch_failure_is_swallowed() {
    let source = StubSource::new(5);
    source.fetch_ok.store(false, Ordering::SeqCst);
    let mut session = PlanSession::new(ctx(5), "alice", 5, 5);
    assert!(!session.on_ready(&source).await);
    assert!(session.plans_data().is_none());
    assert!(!session.load_more_visible());
    assert!(session.render_displayed().is_empty());
}

#[tokio::test]
async fn initial_count_is_clamped_to_cache() {
    let source = StubSource::new(3);
    let session = ready_session(&source, 5, 5).await;
    assert_eq!(session.displayed_plans(), 3);
    assert_eq!(session.load_more_state(), LoadMoreState::Exhausted);
}

#[tokio::test]
async fn save_posts_once_and_disables_regardless_of_status() {
    for failing in [false, true] {
        let source = if failing {
            StubSource::new(5).failing_posts(500)
        } else {
            StubSource::new(5)
        };
        let mut session = ready_session(&source, 5, 5).await;

        let result = session.save(&source, 2).await;
        assert_eq!(result.is_err(), failing);

        let saves = source.saves.lock().unwrap();
        assert_eq!(saves.len(), 1);
        assert_eq!(saves[0].0, "alice");
        assert_eq!(saves[0].1.original_plan_id, "plan-2");
        assert_eq!(saves[0].1.destination, "Paris");
        assert_eq!(saves[0].1.travel_date, "2024-05-02");
        assert_eq!(saves[0].1.places[0].time_period, "9 - 11");

        assert!(session.controls(2).unwrap().save_disabled);
        assert_eq!(session.save_error(2).is_some(), failing);
        let html = session.render_one(2).unwrap().html;
        assert!(html.contains("title=\"save\" disabled><i class=\"bi bi-bookmark\">"));
        assert!(!session.controls(1).unwrap().save_disabled);
    }
}

#[tokio::test]
async fn like_is_local_and_disables_dislike() {
    let source = StubSource::new(5);
    let mut session = ready_session(&source, 5, 5).await;
    session.like(1).unwrap();
    let controls = session.controls(1).unwrap();
    assert!(controls.dislike_disabled);
    assert!(!controls.like_disabled);
    assert_eq!(source.fetch_count(), 1);
    assert!(source.feedback.lock().unwrap().is_empty());
}

#[tokio::test]
async fn dislike_sends_feedback_then_reveals_refresh() {
    let source = StubSource::new(5);
    let mut session = ready_session(&source, 5, 5).await;
    session.dislike(&source, 3).await.unwrap();

    let controls = session.controls(3).unwrap();
    assert!(controls.like_disabled);
    assert!(controls.refresh_visible);
    let feedback = source.feedback.lock().unwrap();
    assert_eq!(feedback[0].0, "alice");
    assert_eq!(feedback[0].1.plan_id, "plan-3");
    assert_eq!(feedback[0].1.plan_spec, serde_json::json!({ "seed": 3 }));

    let html = session.render_one(3).unwrap().html;
    assert!(html.contains("title=\"show me something else\"><i"));
}

#[tokio::test]
async fn failed_dislike_keeps_refresh_hidden() {
    let source = StubSource::new(5).failing_posts(500);
    let mut session = ready_session(&source, 5, 5).await;
    assert!(session.dislike(&source, 3).await.is_err());
    let controls = session.controls(3).unwrap();
    assert!(controls.like_disabled);
    assert!(!controls.refresh_visible);
}

#[tokio::test]
async fn summary_maps_status_codes() {
    let cases = [
        (None, "A fine day for plan-1".to_string()),
        (Some(status_error(400)), SUMMARY_BAD_REQUEST.to_string()),
        (Some(status_error(500)), SUMMARY_RETRY_MESSAGE.to_string()),
        (Some(status_error(503)), String::new()),
        (
            Some(ClientError::Timeout {
                url: "stub".to_string(),
            }),
            String::new(),
        ),
    ];
    for (error, expected) in cases {
        let source = StubSource::new(5);
        *source.summary_error.lock().unwrap() = error;
        let mut session = ready_session(&source, 5, 5).await;

        let message = session.generate_summary(&source, 1).await.unwrap();
        assert_eq!(message, expected);
        let controls = session.controls(1).unwrap();
        assert_eq!(controls.summary_body, expected);
        assert!(!controls.summary_disabled);
        assert_eq!(controls.summary_label, REGENERATE_SUMMARY_LABEL);
        assert_eq!(source.summaries.lock().unwrap().clone(), vec!["plan-1"]);
    }
}

#[tokio::test]
async fn actions_on_hidden_plans_are_rejected_without_requests() {
    let source = StubSource::new(15);
    let mut session = ready_session(&source, 15, 5).await;
    assert!(matches!(
        session.save(&source, 9).await,
        Err(ActionError::UnknownPlan { index: 9 })
    ));
    assert!(matches!(session.like(12), Err(ActionError::UnknownPlan { .. })));
    assert!(source.saves.lock().unwrap().is_empty());

    session.load_more(&source).await;
    assert!(session.save(&source, 9).await.is_ok());
}

#[tokio::test]
async fn refresh_rerenders_displayed_plans_with_fresh_controls() {
    let source = StubSource::new(10);
    let mut session = ready_session(&source, 10, 5).await;
    session.like(0).unwrap();
    let rendered = session.refresh(&source).await.unwrap();
    assert_eq!(rendered.len(), 5);
    assert!(!session.controls(0).unwrap().dislike_disabled);
    assert_eq!(source.fetches.lock().unwrap().last(), Some(&Some(10)));
}

#[tokio::test]
async fn rendered_bindings_address_plan_controls() {
    let source = StubSource::new(5);
    let session = ready_session(&source, 5, 5).await;
    let rendered = session.render_displayed();
    assert_eq!(rendered.len(), 5);
    let save_two = rendered[2]
        .bindings
        .iter()
        .find(|b| b.key == ElementKey::new(PlanAction::Save, 2))
        .unwrap();
    assert_eq!(save_two.plan_id, "plan-2");
    assert_eq!(save_two.key.to_string(), "save-2");
}

#[tokio::test]
async fn document_and_snapshot_reflect_session() {
    let source = StubSource::new(8);
    let mut session = ready_session(&source, 8, 5).await;
    session.like(0).unwrap();

    let html = session.render_document();
    assert!(html.contains("id=\"travel-destination\">Paris</h1>"));
    assert!(html.contains("id=\"plan-4\""));
    assert!(!html.contains("id=\"plan-5\""));
    assert!(html.contains("id=\"load-more-btn\" type=\"button\" class=\"btn btn-outline-primary\">"));

    let snapshot = session.snapshot();
    assert_eq!(snapshot.displayed_plans, 5);
    assert_eq!(snapshot.cached_plans, 8);
    assert_eq!(snapshot.plans.len(), 5);
    assert!(snapshot.plans[0].controls.dislike_disabled);
    assert_eq!(snapshot.plans[4].details_url, "/v1/plans/4");
    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(json["load_more"], serde_json::json!({ "has_more": { "busy": false } }));
}
