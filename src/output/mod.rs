use serde::Serialize;

use crate::view::profile::ProfileView;
use crate::view::PlanSession;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Html,
    Json,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "html" | "htm" => Some(Self::Html),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

pub fn infer_format_from_path(path: &str) -> Option<OutputFormat> {
    let lower = path.trim().to_lowercase();
    if lower.ends_with(".json") {
        return Some(OutputFormat::Json);
    }
    if lower.ends_with(".html") || lower.ends_with(".htm") {
        return Some(OutputFormat::Html);
    }
    None
}

fn render_json<T: Serialize>(value: &T) -> Vec<u8> {
    let mut out = serde_json::to_vec_pretty(value).unwrap_or_else(|_| b"{}".to_vec());
    out.push(b'\n');
    out
}

pub fn render_session(session: &PlanSession, format: OutputFormat) -> Vec<u8> {
    match format {
        OutputFormat::Html => session.render_document().into_bytes(),
        OutputFormat::Json => render_json(&session.snapshot()),
    }
}

pub fn render_profile(profile: &ProfileView, format: OutputFormat) -> Vec<u8> {
    match format {
        OutputFormat::Html => profile.render_document().into_bytes(),
        OutputFormat::Json => render_json(profile),
    }
}
