use thiserror::Error;
use tracing::{info, warn};

use super::PlanSession;
use crate::client::{ClientError, PlanSource};
use crate::model::{FeedbackRequest, SavedPlanView, SummaryRequest, SummaryResponse};
use crate::render::{ControlState, REGENERATE_SUMMARY_LABEL};

pub const SUMMARY_BAD_REQUEST: &str = "Bad request";
pub const SUMMARY_RETRY_MESSAGE: &str = "Failed to generate summary, please try again later.";

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("plan {index} is not displayed")]
    UnknownPlan { index: usize },

    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Text shown in the summary modal for a summary request outcome.
pub fn summary_message(result: &Result<SummaryResponse, ClientError>) -> String {
    match result {
        Ok(resp) => resp.message.clone(),
        Err(e) => match e.status() {
            Some(400) => SUMMARY_BAD_REQUEST.to_string(),
            Some(500) => SUMMARY_RETRY_MESSAGE.to_string(),
            _ => String::new(),
        },
    }
}

impl PlanSession {
    fn controls_mut(&mut self, index: usize) -> Result<&mut ControlState, ActionError> {
        self.controls
            .get_mut(index)
            .ok_or(ActionError::UnknownPlan { index })
    }

    /// Saves a displayed plan to the user's profile.
    ///
    /// The save control is disabled whatever the outcome. A failure is kept
    /// on the session and returned so the caller can surface it.
    pub async fn save<S: PlanSource>(&mut self, source: &S, index: usize) -> Result<(), ActionError> {
        self.controls_mut(index)?;
        let plan = self.plan(index).ok_or(ActionError::UnknownPlan { index })?;
        let view = SavedPlanView::from_plan(
            plan,
            self.ctx.location(),
            self.ctx.date(),
            chrono::Utc::now(),
        );

        let result = source.save_plan(&self.username, &view).await;

        let controls = self.controls_mut(index)?;
        controls.save_disabled = true;
        controls.save_title = "saved!".to_string();
        match result {
            Ok(()) => {
                info!(index, plan_id = %view.original_plan_id, "plan saved");
                self.save_errors[index] = None;
                Ok(())
            }
            Err(e) => {
                warn!(index, error = %e, "failed to save plan");
                self.save_errors[index] = Some(e.to_string());
                Err(e.into())
            }
        }
    }

    pub fn like(&mut self, index: usize) -> Result<(), ActionError> {
        self.controls_mut(index)?.dislike_disabled = true;
        Ok(())
    }

    /// Records negative feedback and offers a refresh once the backend has it.
    pub async fn dislike<S: PlanSource>(
        &mut self,
        source: &S,
        index: usize,
    ) -> Result<(), ActionError> {
        self.controls_mut(index)?.like_disabled = true;
        let plan = self.plan(index).ok_or(ActionError::UnknownPlan { index })?;
        let feedback = FeedbackRequest {
            plan_id: plan.id.clone(),
            plan_spec: plan.planning_spec.clone(),
        };

        match source.send_feedback(&self.username, &feedback).await {
            Ok(()) => {
                self.controls_mut(index)?.refresh_visible = true;
                Ok(())
            }
            Err(e) => {
                warn!(index, error = %e, "failed to send feedback");
                Err(e.into())
            }
        }
    }

    /// Requests a summary for a plan and writes it into the plan's modal.
    pub async fn generate_summary<S: PlanSource>(
        &mut self,
        source: &S,
        index: usize,
    ) -> Result<String, ActionError> {
        self.controls_mut(index)?.summary_disabled = true;
        let plan = self.plan(index).ok_or(ActionError::UnknownPlan { index })?;
        let request = SummaryRequest {
            plan_id: plan.id.clone(),
        };

        let result = source.plan_summary(&request).await;
        if let Err(e) = &result {
            warn!(index, error = %e, "failed to generate summary");
        }
        let message = summary_message(&result);

        let controls = self.controls_mut(index)?;
        controls.summary_body = message.clone();
        controls.summary_disabled = false;
        controls.summary_label = REGENERATE_SUMMARY_LABEL.to_string();
        Ok(message)
    }
}
