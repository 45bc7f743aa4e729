pub mod actions;
pub mod profile;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::client::PlanSource;
use crate::model::{PlansResponse, TravelPlan};
use crate::render::{self, page, ControlState, RenderedPlan};
use crate::session::SearchContext;

pub use actions::{summary_message, ActionError, SUMMARY_BAD_REQUEST, SUMMARY_RETRY_MESSAGE};

pub const DEFAULT_PLANS_PER_PAGE: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadMoreState {
    /// Every cached plan is on screen; the control is hidden.
    Exhausted,
    /// The control is visible. `busy` while a deeper fetch is pending.
    HasMore { busy: bool },
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadMoreOutcome {
    pub rendered: Vec<RenderedPlan>,
    pub fetched: bool,
}

/// Client-side state of one results page.
///
/// The cached response is swapped wholesale on every successful fetch and
/// never patched in place. Per-plan control state lives next to it, one entry
/// per displayed plan.
#[derive(Clone, Debug)]
pub struct PlanSession {
    ctx: SearchContext,
    username: String,
    plans_data: Option<PlansResponse>,
    displayed_plans: usize,
    plans_per_page: usize,
    controls: Vec<ControlState>,
    save_errors: Vec<Option<String>>,
    /// `numberResults` of the deeper fetch in flight, if any.
    pending_fetch: Option<usize>,
}

impl PlanSession {
    /// `initial_displayed` is how many plans the server already rendered.
    pub fn new(
        ctx: SearchContext,
        username: impl Into<String>,
        initial_displayed: usize,
        plans_per_page: usize,
    ) -> Self {
        Self {
            ctx,
            username: username.into(),
            plans_data: None,
            displayed_plans: initial_displayed,
            plans_per_page: plans_per_page.max(1),
            controls: Vec::new(),
            save_errors: Vec::new(),
            pending_fetch: None,
        }
    }

    pub fn context(&self) -> &SearchContext {
        &self.ctx
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn plans_data(&self) -> Option<&PlansResponse> {
        self.plans_data.as_ref()
    }

    pub fn displayed_plans(&self) -> usize {
        self.displayed_plans
    }

    pub fn plans_per_page(&self) -> usize {
        self.plans_per_page
    }

    fn cached_len(&self) -> usize {
        self.plans_data.as_ref().map_or(0, |d| d.len())
    }

    pub fn load_more_state(&self) -> LoadMoreState {
        if self.pending_fetch.is_some() {
            return LoadMoreState::HasMore { busy: true };
        }
        match self.plans_data.as_ref() {
            Some(data) if self.displayed_plans < data.len() => {
                LoadMoreState::HasMore { busy: false }
            }
            _ => LoadMoreState::Exhausted,
        }
    }

    pub fn load_more_visible(&self) -> bool {
        matches!(self.load_more_state(), LoadMoreState::HasMore { .. })
    }

    pub fn controls(&self, index: usize) -> Option<&ControlState> {
        self.controls.get(index)
    }

    pub fn save_error(&self, index: usize) -> Option<&str> {
        self.save_errors.get(index).and_then(|e| e.as_deref())
    }

    pub(crate) fn plan(&self, index: usize) -> Option<&TravelPlan> {
        self.plans_data
            .as_ref()
            .and_then(|d| d.travel_plans.get(index))
    }

    /// Grows or shrinks the control list to match the displayed plans.
    fn sync_controls(&mut self) {
        let shown = self.displayed_plans.min(self.cached_len());
        self.controls.truncate(shown);
        self.save_errors.truncate(shown);
        for index in self.controls.len()..shown {
            let state = match self.plan(index) {
                Some(plan) => ControlState::for_plan(plan),
                None => break,
            };
            self.controls.push(state);
            self.save_errors.push(None);
        }
    }

    fn replace_data(&mut self, data: PlansResponse) {
        self.plans_data = Some(data);
        if self.displayed_plans > self.cached_len() {
            self.displayed_plans = self.cached_len();
        }
        self.sync_controls();
    }

    pub fn render_one(&self, index: usize) -> Option<RenderedPlan> {
        let data = self.plans_data.as_ref()?;
        let plan = data.travel_plans.get(index)?;
        let details = data.details_url(index);
        Some(match self.controls.get(index) {
            Some(controls) => render::render_plan_with(plan, index, details, controls),
            None => render::render_plan(plan, index, details),
        })
    }

    fn render_range(&self, start: usize, end: usize) -> Vec<RenderedPlan> {
        (start..end).filter_map(|i| self.render_one(i)).collect()
    }

    pub fn render_displayed(&self) -> Vec<RenderedPlan> {
        self.render_range(0, self.displayed_plans)
    }

    /// First fetch after the page is ready. Returns whether data was cached.
    pub async fn on_ready<S: PlanSource>(&mut self, source: &S) -> bool {
        match source.fetch_plans(&self.ctx, None).await {
            Some(data) => {
                info!(plans = data.len(), "plans loaded");
                self.replace_data(data);
                true
            }
            None => false,
        }
    }

    /// Handles one click on the load-more control.
    pub async fn load_more<S: PlanSource>(&mut self, source: &S) -> LoadMoreOutcome {
        let cached = self.cached_len();
        if self.plans_data.is_some() && self.displayed_plans < cached {
            let start = self.displayed_plans;
            let end = (start + self.plans_per_page).min(cached);
            self.displayed_plans = end;
            self.sync_controls();
            debug!(start, end, "showing cached plans");
            return LoadMoreOutcome {
                rendered: self.render_range(start, end),
                fetched: false,
            };
        }

        let requested = self.begin_fetch();
        let fetched = source.fetch_plans(&self.ctx, Some(requested)).await;
        LoadMoreOutcome {
            rendered: self.finish_fetch(fetched),
            fetched: true,
        }
    }

    /// Marks the control busy and returns the `numberResults` to fetch.
    ///
    /// Calling it again before [`PlanSession::finish_fetch`] returns the
    /// request already in flight.
    pub fn begin_fetch(&mut self) -> usize {
        *self
            .pending_fetch
            .get_or_insert(self.ctx.number_results() + self.plans_per_page)
    }

    /// Applies the result of a deeper fetch and re-enables the control.
    /// Returns the newly displayed plans.
    pub fn finish_fetch(&mut self, fetched: Option<PlansResponse>) -> Vec<RenderedPlan> {
        let Some(requested) = self.pending_fetch.take() else {
            debug!("no fetch in flight, ignoring response");
            return Vec::new();
        };
        let Some(data) = fetched else {
            return Vec::new();
        };
        let cached = self.cached_len();
        if data.len() < cached {
            warn!(
                cached,
                received = data.len(),
                "deeper fetch returned fewer plans than cached, keeping cache"
            );
            return Vec::new();
        }

        self.ctx.grow_number_results(requested);
        let start = cached.max(self.displayed_plans);
        let new_len = data.len();
        self.plans_data = Some(data);
        self.displayed_plans = new_len;
        self.sync_controls();
        info!(
            from = start,
            to = new_len,
            "rendering newly fetched plans"
        );
        self.render_range(start, new_len)
    }

    /// Reloads the current result set and re-renders what is displayed.
    pub async fn refresh<S: PlanSource>(&mut self, source: &S) -> Option<Vec<RenderedPlan>> {
        let data = source
            .fetch_plans(&self.ctx, Some(self.ctx.number_results()))
            .await?;
        let shown = self.displayed_plans;
        self.controls.clear();
        self.save_errors.clear();
        self.plans_data = Some(data);
        self.displayed_plans = shown.min(self.cached_len());
        self.sync_controls();
        Some(self.render_displayed())
    }

    pub fn render_document(&self) -> String {
        let fragments: Vec<String> = self
            .render_displayed()
            .into_iter()
            .map(|r| r.html)
            .collect();
        let destination = self
            .plans_data
            .as_ref()
            .map(|d| d.travel_destination.as_str())
            .filter(|d| !d.is_empty())
            .unwrap_or(self.ctx.location());
        page::render_results_page(&page::ResultsPage {
            destination,
            username: &self.username,
            plan_fragments: &fragments,
            load_more_visible: self.load_more_visible(),
        })
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let plans = (0..self.displayed_plans.min(self.cached_len()))
            .filter_map(|index| {
                let plan = self.plan(index)?.clone();
                Some(DisplayedPlan {
                    index,
                    details_url: self
                        .plans_data
                        .as_ref()
                        .map(|d| d.details_url(index).to_string())
                        .unwrap_or_default(),
                    controls: self.controls.get(index).cloned()?,
                    save_error: self.save_error(index).map(str::to_string),
                    plan,
                })
            })
            .collect();
        SessionSnapshot {
            destination: self
                .plans_data
                .as_ref()
                .map(|d| d.travel_destination.clone())
                .unwrap_or_default(),
            location: self.ctx.location().to_string(),
            date: self.ctx.date().to_string(),
            username: self.username.clone(),
            number_results: self.ctx.number_results(),
            cached_plans: self.cached_len(),
            displayed_plans: self.displayed_plans,
            load_more: self.load_more_state(),
            plans,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct DisplayedPlan {
    pub index: usize,
    pub details_url: String,
    pub controls: ControlState,
    pub save_error: Option<String>,
    pub plan: TravelPlan,
}

#[derive(Clone, Debug, Serialize)]
pub struct SessionSnapshot {
    pub destination: String,
    pub location: String,
    pub date: String,
    pub username: String,
    pub number_results: usize,
    pub cached_plans: usize,
    pub displayed_plans: usize,
    pub load_more: LoadMoreState,
    pub plans: Vec<DisplayedPlan>,
}
