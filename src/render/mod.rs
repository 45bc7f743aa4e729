pub mod page;

use std::fmt;

use serde::Serialize;

use crate::model::{SavedPlan, TravelPlan};

pub const SUMMARY_LABEL: &str = "generate summary";
pub const REGENERATE_SUMMARY_LABEL: &str = "regenerate summary";

pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Interactive control of a rendered plan.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanAction {
    Like,
    Dislike,
    Refresh,
    Save,
    GenerateSummary,
}

impl PlanAction {
    pub const ALL: [PlanAction; 5] = [
        PlanAction::Like,
        PlanAction::Dislike,
        PlanAction::Refresh,
        PlanAction::Save,
        PlanAction::GenerateSummary,
    ];

    pub fn id_prefix(self) -> &'static str {
        match self {
            PlanAction::Like => "like",
            PlanAction::Dislike => "dislike",
            PlanAction::Refresh => "refresh",
            PlanAction::Save => "save",
            PlanAction::GenerateSummary => "summary",
        }
    }
}

/// Element id of a control, e.g. `save-2`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ElementKey {
    pub action: PlanAction,
    pub index: usize,
}

impl ElementKey {
    pub fn new(action: PlanAction, index: usize) -> Self {
        Self { action, index }
    }
}

impl fmt::Display for ElementKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.action.id_prefix(), self.index)
    }
}

/// A control the caller must wire up after inserting the fragment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Binding {
    pub key: ElementKey,
    pub plan_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RenderedPlan {
    pub index: usize,
    pub html: String,
    pub bindings: Vec<Binding>,
}

/// Display state of one plan's control cluster.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ControlState {
    pub save_disabled: bool,
    pub save_title: String,
    pub like_disabled: bool,
    pub dislike_disabled: bool,
    pub refresh_visible: bool,
    pub summary_disabled: bool,
    pub summary_label: String,
    pub summary_body: String,
}

impl ControlState {
    pub fn for_plan(plan: &TravelPlan) -> Self {
        Self {
            save_disabled: plan.saved,
            save_title: if plan.saved { "saved!" } else { "save" }.to_string(),
            like_disabled: false,
            dislike_disabled: false,
            refresh_visible: false,
            summary_disabled: false,
            summary_label: SUMMARY_LABEL.to_string(),
            summary_body: String::new(),
        }
    }
}

/// Renders one plan as an accordion item with its controls.
pub fn render_plan(plan: &TravelPlan, index: usize, details_url: &str) -> RenderedPlan {
    render_plan_with(plan, index, details_url, &ControlState::for_plan(plan))
}

pub fn render_plan_with(
    plan: &TravelPlan,
    index: usize,
    details_url: &str,
    controls: &ControlState,
) -> RenderedPlan {
    let key = |action| ElementKey::new(action, index);
    let mut out = String::new();

    out.push_str(&format!(
        "<div class=\"accordion-item\" id=\"plan-{index}\" data-plan-id=\"{}\">\n",
        escape_html(&plan.id)
    ));
    out.push_str(&format!(
        "  <h2 class=\"accordion-header\" id=\"heading-{index}\">\n    <button class=\"accordion-button collapsed\" type=\"button\" data-bs-toggle=\"collapse\" data-bs-target=\"#collapse-{index}\" aria-expanded=\"false\" aria-controls=\"collapse-{index}\">Plan {}</button>\n  </h2>\n",
        index + 1
    ));
    out.push_str(&format!(
        "  <div id=\"collapse-{index}\" class=\"accordion-collapse collapse\" aria-labelledby=\"heading-{index}\">\n    <div class=\"accordion-body\">\n"
    ));

    out.push_str("      <table class=\"table table-hover\">\n");
    out.push_str("        <thead><tr><th scope=\"col\"></th><th scope=\"col\">Time</th><th scope=\"col\">Place</th><th scope=\"col\">Address</th></tr></thead>\n");
    out.push_str("        <tbody>\n");
    for place in &plan.places {
        out.push_str(&format!(
            "          <tr><td><i class=\"{}\"></i></td><td>{} - {}</td><td><a href=\"{}\" target=\"_blank\" rel=\"noopener\">{}</a></td><td>{}</td></tr>\n",
            escape_html(&place.place_icon_css_class),
            escape_html(&place.start_time.display()),
            escape_html(&place.end_time.display()),
            escape_html(&place.url),
            escape_html(&place.place_name),
            escape_html(&place.address),
        ));
    }
    out.push_str("        </tbody>\n      </table>\n");

    out.push_str("      <div class=\"btn-toolbar\" role=\"toolbar\">\n");
    out.push_str(&control_button(
        key(PlanAction::Like),
        "btn-outline-success",
        "bi bi-hand-thumbs-up",
        "like",
        controls.like_disabled,
        true,
    ));
    out.push_str(&control_button(
        key(PlanAction::Dislike),
        "btn-outline-danger",
        "bi bi-hand-thumbs-down",
        "dislike",
        controls.dislike_disabled,
        true,
    ));
    out.push_str(&control_button(
        key(PlanAction::Refresh),
        "btn-outline-secondary",
        "bi bi-arrow-clockwise",
        "show me something else",
        false,
        controls.refresh_visible,
    ));
    out.push_str(&format!(
        "        <span class=\"d-inline-block\" tabindex=\"0\" data-bs-toggle=\"tooltip\" title=\"{}\">\n  ",
        escape_html(&controls.save_title)
    ));
    out.push_str(&control_button(
        key(PlanAction::Save),
        "btn-outline-primary",
        "bi bi-bookmark",
        "save",
        controls.save_disabled,
        true,
    ));
    out.push_str("        </span>\n");
    out.push_str(&format!(
        "        <a class=\"btn btn-outline-info m-1\" href=\"{}\" role=\"button\">show details</a>\n",
        escape_html(details_url)
    ));
    out.push_str(&format!(
        "        <button id=\"{}\" type=\"button\" class=\"btn btn-outline-dark m-1\" data-bs-toggle=\"modal\" data-bs-target=\"#summary-modal-{index}\"{}>{}</button>\n",
        key(PlanAction::GenerateSummary),
        disabled_attr(controls.summary_disabled),
        escape_html(&controls.summary_label)
    ));
    out.push_str("      </div>\n");

    out.push_str(&format!(
        "      <div class=\"modal fade\" id=\"summary-modal-{index}\" tabindex=\"-1\" aria-labelledby=\"summary-title-{index}\" aria-hidden=\"true\">\n        <div class=\"modal-dialog\"><div class=\"modal-content\">\n          <div class=\"modal-header\"><h5 class=\"modal-title\" id=\"summary-title-{index}\">Plan summary</h5><button type=\"button\" class=\"btn-close\" data-bs-dismiss=\"modal\" aria-label=\"Close\"></button></div>\n          <div class=\"modal-body\" id=\"summary-body-{index}\">{}</div>\n        </div></div>\n      </div>\n",
        escape_html(&controls.summary_body)
    ));

    out.push_str("    </div>\n  </div>\n</div>\n");

    let bindings = PlanAction::ALL
        .iter()
        .map(|&action| Binding {
            key: key(action),
            plan_id: plan.id.clone(),
        })
        .collect();

    RenderedPlan {
        index,
        html: out,
        bindings,
    }
}

fn disabled_attr(disabled: bool) -> &'static str {
    if disabled {
        " disabled"
    } else {
        ""
    }
}

fn control_button(
    key: ElementKey,
    style: &str,
    icon: &str,
    title: &str,
    disabled: bool,
    visible: bool,
) -> String {
    let hidden = if visible { "" } else { " style=\"display: none\"" };
    format!(
        "        <button id=\"{key}\" type=\"button\" class=\"btn {style} m-1\" data-bs-toggle=\"tooltip\" title=\"{}\"{}{hidden}><i class=\"{icon}\"></i></button>\n",
        escape_html(title),
        disabled_attr(disabled),
    )
}

/// Profile card for a saved plan. Cards past `shown` start hidden.
pub fn render_saved_plan_card(plan: &SavedPlan, username: &str, index: usize, shown: usize) -> String {
    let mut out = String::new();
    let hidden = if index >= shown {
        " display: none;"
    } else {
        ""
    };
    out.push_str(&format!(
        "<div class=\"card rounded mb-2\" style=\"max-width: 350px;{hidden}\">\n  <div class=\"card-body\">\n"
    ));
    out.push_str(&format!(
        "    <h5 class=\"card-title\">{}</h5>\n    <h6 class=\"card-subtitle\">{}</h6>\n",
        escape_html(&plan.destination),
        escape_html(&plan.travel_date)
    ));
    out.push_str("    <ul class=\"list-group list-group-flush\">\n");
    for place in &plan.places {
        out.push_str(&format!(
            "      <li class=\"list-group-item\"><a class=\"card-link\" href=\"{}\">{}</a></li>\n",
            escape_html(&place.url),
            escape_html(&place.place_name)
        ));
    }
    out.push_str("    </ul>\n");
    out.push_str(&format!(
        "    <button type=\"button\" class=\"btn btn-outline-warning m-1 float-end\" data-planid=\"{}\" data-user=\"{}\">delete</button>\n",
        escape_html(&plan.id),
        escape_html(username)
    ));
    out.push_str(&format!(
        "    <a class=\"btn btn-outline-info float-end m-1\" href=\"plans/{}\" role=\"button\">details</a>\n",
        escape_html(&plan.original_plan_id)
    ));
    out.push_str("  </div>\n</div>\n");
    out
}
