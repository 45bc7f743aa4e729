use serde::Serialize;
use tracing::{info, warn};

use crate::client::{ClientError, PlanClient};
use crate::model::SavedPlan;
use crate::render::{self, page};

pub const PROFILE_PLANS_PER_PAGE: usize = 3;

/// The user's saved plans with their own show-more paging.
#[derive(Clone, Debug, Serialize)]
pub struct ProfileView {
    pub username: String,
    pub plans: Vec<SavedPlan>,
    pub most_searched: Option<String>,
    pub shown: usize,
}

impl ProfileView {
    pub fn new(username: impl Into<String>, plans: Vec<SavedPlan>, most_searched: Option<String>) -> Self {
        Self {
            username: username.into(),
            plans,
            most_searched,
            shown: PROFILE_PLANS_PER_PAGE,
        }
    }

    /// Loads saved plans and search favorites together. Either may fail on
    /// its own; failures are logged and leave that part empty.
    pub async fn load(client: &PlanClient, username: &str) -> Self {
        let (plans, favorites) =
            futures::join!(client.saved_plans(username), client.favorites(username));
        let plans = match plans {
            Ok(resp) => resp.travel_plans,
            Err(e) => {
                warn!(error = %e, "failed to load saved plans");
                Vec::new()
            }
        };
        let most_searched = match favorites {
            Ok(fav) => fav.most_searched().map(str::to_string),
            Err(e) => {
                warn!(error = %e, "failed to load favorites");
                None
            }
        };
        info!(plans = plans.len(), "user profile is loaded");
        Self::new(username, plans, most_searched)
    }

    pub fn load_more_visible(&self) -> bool {
        self.shown < self.plans.len()
    }

    pub fn load_more(&mut self) {
        self.shown += PROFILE_PLANS_PER_PAGE;
    }

    /// Deletes a saved plan and drops it from the view once the backend confirms.
    pub async fn delete(&mut self, client: &PlanClient, plan_id: &str) -> Result<(), ClientError> {
        client.delete_plan(&self.username, plan_id).await?;
        self.plans.retain(|p| p.id != plan_id);
        info!(plan_id, "saved plan deleted");
        Ok(())
    }

    pub fn render_document(&self) -> String {
        let cards: Vec<String> = self
            .plans
            .iter()
            .enumerate()
            .map(|(i, plan)| render::render_saved_plan_card(plan, &self.username, i, self.shown))
            .collect();
        page::render_profile_page(&page::ProfilePage {
            username: &self.username,
            most_searched: self.most_searched.as_deref(),
            card_fragments: &cards,
            shown: self.shown,
        })
    }
}
