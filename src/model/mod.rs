use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Start or end of a place visit.
///
/// The planner emits hours as bare integers, saved plans carry them as text.
/// Both forms are kept verbatim so they round-trip into saved views unchanged.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TimeOfDay(String);

impl TimeOfDay {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Human form used in rendered rows: whole hours become `HH:00`.
    pub fn display(&self) -> String {
        match self.0.trim().parse::<u8>() {
            Ok(hour) if hour <= 24 => format!("{hour:02}:00"),
            _ => self.0.clone(),
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(n) => TimeOfDay(n.to_string()),
            Raw::Text(s) => TimeOfDay(s),
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Place {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub place_name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub start_time: TimeOfDay,
    #[serde(default)]
    pub end_time: TimeOfDay,
    #[serde(default)]
    pub place_icon_css_class: String,
}

impl Place {
    pub fn time_period(&self) -> String {
        format!("{} - {}", self.start_time, self.end_time)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct TravelPlan {
    pub id: String,
    #[serde(default)]
    pub places: Vec<Place>,
    #[serde(default)]
    pub saved: bool,
    /// Opaque planner input, echoed back in feedback.
    #[serde(default)]
    pub planning_spec: serde_json::Value,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct PlansResponse {
    #[serde(default)]
    pub travel_plans: Vec<TravelPlan>,
    #[serde(default)]
    pub trip_details_url: Vec<String>,
    #[serde(default)]
    pub travel_destination: String,
}

impl PlansResponse {
    pub fn len(&self) -> usize {
        self.travel_plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.travel_plans.is_empty()
    }

    pub fn details_url(&self, index: usize) -> &str {
        self.trip_details_url
            .get(index)
            .map(|s| s.as_str())
            .unwrap_or("")
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct SavedPlace {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub time_period: String,
    #[serde(default)]
    pub place_name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub url: String,
}

/// Body of a save request: one plan normalized against its search context.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct SavedPlanView {
    pub destination: String,
    pub travel_date: String,
    pub original_plan_id: String,
    pub created_at: String,
    pub places: Vec<SavedPlace>,
}

impl SavedPlanView {
    pub fn from_plan(
        plan: &TravelPlan,
        destination: &str,
        travel_date: &str,
        created_at: chrono::DateTime<chrono::Utc>,
    ) -> Self {
        let places = plan
            .places
            .iter()
            .map(|p| SavedPlace {
                id: p.id.clone(),
                time_period: p.time_period(),
                place_name: p.place_name.clone(),
                address: p.address.clone(),
                url: p.url.clone(),
            })
            .collect();
        Self {
            destination: destination.to_string(),
            travel_date: travel_date.to_string(),
            original_plan_id: plan.id.clone(),
            created_at: created_at.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            places,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct FeedbackRequest {
    pub plan_id: String,
    pub plan_spec: serde_json::Value,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct SummaryRequest {
    pub plan_id: String,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct SummaryResponse {
    #[serde(default)]
    pub message: String,
}

/// A plan as stored in the user's profile.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct SavedPlan {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub original_plan_id: String,
    #[serde(default)]
    pub destination: String,
    #[serde(default)]
    pub travel_date: String,
    #[serde(default)]
    pub places: Vec<SavedPlace>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct SavedPlansResponse {
    #[serde(default)]
    pub travel_plans: Vec<SavedPlan>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct SearchHistoryEntry {
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub count: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct FavoritesResponse {
    #[serde(rename = "searchHistory", default)]
    pub search_history: BTreeMap<String, SearchHistoryEntry>,
}

impl FavoritesResponse {
    /// Location with the highest search count; the first one wins on ties.
    pub fn most_searched(&self) -> Option<&str> {
        let mut best: Option<&SearchHistoryEntry> = None;
        for entry in self.search_history.values() {
            if best.map_or(entry.count > 0, |b| entry.count > b.count) {
                best = Some(entry);
            }
        }
        best.map(|e| e.location.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_of_day_accepts_numbers_and_strings() {
        let place: Place = serde_json::from_str(
            r#"{"place_name":"Louvre","start_time":10,"end_time":"12:30"}"#,
        )
        .unwrap();
        assert_eq!(place.start_time.as_str(), "10");
        assert_eq!(place.end_time.as_str(), "12:30");
        assert_eq!(place.time_period(), "10 - 12:30");
        assert_eq!(place.start_time.display(), "10:00");
        assert_eq!(place.end_time.display(), "12:30");
    }

    #[test]
    fn plans_response_tolerates_missing_fields() {
        let resp: PlansResponse =
            serde_json::from_str(r#"{"travel_plans":[{"id":"p1"}]}"#).unwrap();
        assert_eq!(resp.len(), 1);
        assert!(!resp.travel_plans[0].saved);
        assert_eq!(resp.details_url(0), "");
    }

    #[test]
    fn place_without_name_does_not_drop_response() {
        let resp: PlansResponse = serde_json::from_str(
            r#"{"travel_plans":[{"id":"p1","places":[{"address":"1 Main St","start_time":9}]}]}"#,
        )
        .unwrap();
        let place = &resp.travel_plans[0].places[0];
        assert_eq!(place.place_name, "");
        assert_eq!(place.address, "1 Main St");
    }

    #[test]
    fn saved_view_uses_time_periods() {
        let plan = TravelPlan {
            id: "plan-7".to_string(),
            places: vec![Place {
                id: "a".to_string(),
                place_name: "Cafe".to_string(),
                start_time: TimeOfDay::new("8"),
                end_time: TimeOfDay::new("9"),
                ..Default::default()
            }],
            ..Default::default()
        };
        let at = chrono::DateTime::parse_from_rfc3339("2024-05-01T10:00:00Z")
            .unwrap()
            .with_timezone(&chrono::Utc);
        let view = SavedPlanView::from_plan(&plan, "Paris", "2024-05-02", at);
        assert_eq!(view.original_plan_id, "plan-7");
        assert_eq!(view.places[0].time_period, "8 - 9");
        assert_eq!(view.created_at, "2024-05-01T10:00:00.000Z");
    }

    #[test]
    fn most_searched_picks_highest_count() {
        let fav: FavoritesResponse = serde_json::from_str(
            r#"{"searchHistory":{"a":{"location":"Rome","count":2},"b":{"location":"Oslo","count":5}}}"#,
        )
        .unwrap();
        assert_eq!(fav.most_searched(), Some("Oslo"));
        assert_eq!(FavoritesResponse::default().most_searched(), None);
    }
}
