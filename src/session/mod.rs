use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

pub const DEFAULT_NUMBER_RESULTS: usize = 5;
pub const GUEST_USERNAME: &str = "guest";
pub const JWT_COOKIE: &str = "JWT";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid page URL: {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("page URL must be http or https: {url}")]
    UnsupportedScheme { url: String },

    #[error("page URL is missing the '{name}' query parameter")]
    MissingParam { name: &'static str },

    #[error("invalid numberResults '{value}', expected positive integer")]
    InvalidNumberResults { value: String },
}

/// Search parameters carried by the results page URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchContext {
    page_url: Url,
    location: String,
    date: String,
    number_results: usize,
}

impl SearchContext {
    pub fn from_page_url(raw: &str) -> Result<Self, SessionError> {
        let page_url = Url::parse(raw.trim()).map_err(|e| SessionError::InvalidUrl {
            url: raw.to_string(),
            source: e,
        })?;
        if page_url.scheme() != "http" && page_url.scheme() != "https" {
            return Err(SessionError::UnsupportedScheme {
                url: raw.to_string(),
            });
        }

        let mut location = None;
        let mut date = String::new();
        let mut number_results = DEFAULT_NUMBER_RESULTS;
        for (key, value) in page_url.query_pairs() {
            match key.as_ref() {
                "location" => location = Some(value.trim().to_string()),
                "date" => date = value.trim().to_string(),
                "numberResults" => {
                    number_results = parse_number_results(&value)?;
                }
                _ => {}
            }
        }
        let location = location
            .filter(|l| !l.is_empty())
            .ok_or(SessionError::MissingParam { name: "location" })?;

        Ok(Self {
            page_url,
            location,
            date,
            number_results,
        })
    }

    pub fn page_url(&self) -> &Url {
        &self.page_url
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn number_results(&self) -> usize {
        self.number_results
    }

    /// Records a deeper request. The count never shrinks.
    pub fn grow_number_results(&mut self, requested: usize) {
        if requested > self.number_results {
            info!(
                from = self.number_results,
                to = requested,
                "growing requested result count"
            );
            self.number_results = requested;
        }
    }

    /// The page URL in JSON mode, optionally asking for a different result count.
    pub fn plans_url(&self, number_results: Option<usize>) -> Url {
        let mut pairs: Vec<(String, String)> = Vec::new();
        let mut has_number_results = false;
        for (key, value) in self.page_url.query_pairs() {
            match key.as_ref() {
                "json_only" => continue,
                "numberResults" => {
                    has_number_results = true;
                    let value = number_results
                        .map(|n| n.to_string())
                        .unwrap_or_else(|| value.into_owned());
                    pairs.push((key.into_owned(), value));
                }
                _ => pairs.push((key.into_owned(), value.into_owned())),
            }
        }
        if let (false, Some(n)) = (has_number_results, number_results) {
            pairs.push(("numberResults".to_string(), n.to_string()));
        }
        pairs.push(("json_only".to_string(), "true".to_string()));

        let mut url = self.page_url.clone();
        url.set_fragment(None);
        url.query_pairs_mut().clear().extend_pairs(pairs);
        url
    }
}

fn parse_number_results(value: &str) -> Result<usize, SessionError> {
    match value.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(SessionError::InvalidNumberResults {
            value: value.to_string(),
        }),
    }
}

/// Extracts the `JWT` cookie from a `Cookie` header value.
pub fn jwt_from_cookie_header(header: &str) -> Option<&str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == JWT_COOKIE)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

/// Reads the `username` claim from a JWT without verifying its signature.
///
/// The server owns verification; the client only needs the display name.
/// Tokens past their `exp` claim are treated as absent.
pub fn username_from_jwt(token: &str, now_unix: i64) -> Option<String> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .ok()?;
    let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    if let Some(exp) = claims.get("exp").and_then(|v| v.as_i64()) {
        if exp <= now_unix {
            return None;
        }
    }
    claims
        .get("username")
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Picks the acting user: an explicit name wins, then the JWT, then guest.
pub fn resolve_username(explicit: Option<&str>, jwt: Option<&str>) -> String {
    if let Some(name) = explicit.map(str::trim).filter(|s| !s.is_empty()) {
        return name.to_string();
    }
    let now = chrono::Utc::now().timestamp();
    match jwt.and_then(|token| username_from_jwt(token, now)) {
        Some(name) => {
            debug!(username = %name, "logged-in user resolved from JWT");
            name
        }
        None => {
            info!("the session has expired or the user is not logged in");
            GUEST_USERNAME.to_string()
        }
    }
}
