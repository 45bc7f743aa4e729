use std::str::FromStr;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use super::ClientError;

#[derive(Clone, Debug)]
pub struct ClientOptions {
    pub timeout_seconds: usize,
    pub proxy: Option<String>,
    /// Extra header sent with every request, `Key: Value`.
    pub header: Option<String>,
    /// Session token forwarded as the `JWT` cookie.
    pub jwt: Option<String>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_seconds: 10,
            proxy: None,
            header: None,
            jwt: None,
        }
    }
}

pub(in crate::client) fn parse_header_line(line: &str) -> Result<(HeaderName, HeaderValue), String> {
    let (key, value) = line
        .split_once(':')
        .ok_or_else(|| format!("expected 'Key: Value', got '{line}'"))?;
    let key = HeaderName::from_str(key.trim()).map_err(|e| format!("invalid header name: {e}"))?;
    let value =
        HeaderValue::from_str(value.trim()).map_err(|e| format!("invalid header value: {e}"))?;
    Ok((key, value))
}

pub(in crate::client) fn build_http_client(options: &ClientOptions) -> Result<reqwest::Client, ClientError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        reqwest::header::USER_AGENT,
        HeaderValue::from_static(concat!("tripview/", env!("CARGO_PKG_VERSION"))),
    );
    headers.insert(
        reqwest::header::ACCEPT,
        HeaderValue::from_static("application/json"),
    );

    if let Some(jwt) = options.jwt.as_deref().filter(|t| !t.trim().is_empty()) {
        let cookie = HeaderValue::from_str(&format!("{}={}", crate::session::JWT_COOKIE, jwt.trim()))
            .map_err(|e| ClientError::InvalidHeader {
                message: format!("invalid JWT cookie: {e}"),
            })?;
        headers.insert(reqwest::header::COOKIE, cookie);
    }

    if let Some(line) = options.header.as_deref().filter(|h| !h.trim().is_empty()) {
        let (key, value) =
            parse_header_line(line).map_err(|message| ClientError::InvalidHeader { message })?;
        headers.append(key, value);
    }

    let timeout = Duration::from_secs(options.timeout_seconds.try_into().unwrap_or(10));
    let mut builder = reqwest::Client::builder()
        .default_headers(headers)
        .timeout(timeout);

    if let Some(proxy) = options.proxy.as_deref().filter(|p| !p.trim().is_empty()) {
        let proxy = reqwest::Proxy::all(proxy).map_err(|e| ClientError::ProxySetup {
            proxy: proxy.to_string(),
            source: e,
        })?;
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| ClientError::HttpClientBuild { source: e })
}
