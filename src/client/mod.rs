mod request;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

use crate::model::{
    FavoritesResponse, FeedbackRequest, PlansResponse, SavedPlanView, SavedPlansResponse,
    SummaryRequest, SummaryResponse,
};
use crate::session::SearchContext;

pub use request::ClientOptions;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("request to {url} returned HTTP {status}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    #[error("malformed response from {url}: {source}")]
    Malformed {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("request to {url} was cancelled")]
    Cancelled { url: String },

    #[error("invalid base URL: {url}")]
    InvalidBaseUrl { url: String },

    #[error("invalid header: {message}")]
    InvalidHeader { message: String },

    #[error("failed to build HTTP client: {source}")]
    HttpClientBuild {
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to setup proxy: {proxy}: {source}")]
    ProxySetup {
        proxy: String,
        #[source]
        source: reqwest::Error,
    },
}

impl ClientError {
    /// HTTP status of a non-2xx response, if that is what failed.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    fn from_reqwest(url: &Url, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            ClientError::Timeout {
                url: url.to_string(),
            }
        } else {
            ClientError::Network {
                url: url.to_string(),
                source,
            }
        }
    }
}

/// Backend operations the pagination and action controllers depend on.
#[allow(async_fn_in_trait)]
pub trait PlanSource {
    /// Fetches plans for the search. Failures are logged and come back as `None`.
    async fn fetch_plans(
        &self,
        ctx: &SearchContext,
        number_results: Option<usize>,
    ) -> Option<PlansResponse>;

    async fn save_plan(&self, username: &str, view: &SavedPlanView) -> Result<(), ClientError>;

    async fn send_feedback(
        &self,
        username: &str,
        feedback: &FeedbackRequest,
    ) -> Result<(), ClientError>;

    async fn plan_summary(&self, request: &SummaryRequest)
        -> Result<SummaryResponse, ClientError>;
}

/// HTTP client for the planner API.
///
/// Every request is bounded by the configured timeout and can be cancelled,
/// either through the token handed to the `*_with` methods or all at once
/// through [`PlanClient::cancel_all`].
#[derive(Clone, Debug)]
pub struct PlanClient {
    http: reqwest::Client,
    base: Url,
    cancel: CancellationToken,
}

impl PlanClient {
    pub fn new(options: &ClientOptions, base_url: &str) -> Result<Self, ClientError> {
        let mut base = Url::parse(base_url).map_err(|_| ClientError::InvalidBaseUrl {
            url: base_url.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl {
                url: base_url.to_string(),
            });
        }
        base.set_path("/");
        base.set_query(None);
        base.set_fragment(None);
        Ok(Self {
            http: request::build_http_client(options)?,
            base,
            cancel: CancellationToken::new(),
        })
    }

    /// Client rooted at the origin of a results page.
    pub fn for_page(options: &ClientOptions, ctx: &SearchContext) -> Result<Self, ClientError> {
        Self::new(options, ctx.page_url().as_str())
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// A token tied to this client; cancelling the client cancels it too.
    pub fn request_token(&self) -> CancellationToken {
        self.cancel.child_token()
    }

    pub fn cancel_all(&self) {
        self.cancel.cancel();
    }

    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.clear().extend(segments);
        }
        url
    }

    async fn execute(
        &self,
        builder: reqwest::RequestBuilder,
        url: &Url,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, ClientError> {
        let exchange = async {
            let resp = builder
                .send()
                .await
                .map_err(|e| ClientError::from_reqwest(url, e))?;
            let status = resp.status();
            let body = resp
                .bytes()
                .await
                .map_err(|e| ClientError::from_reqwest(url, e))?;
            if !status.is_success() {
                return Err(ClientError::Status {
                    url: url.to_string(),
                    status: status.as_u16(),
                    body: String::from_utf8_lossy(&body).into_owned(),
                });
            }
            Ok::<_, ClientError>(body.to_vec())
        };

        tokio::select! {
            _ = cancel.cancelled() => Err(ClientError::Cancelled { url: url.to_string() }),
            res = exchange => res,
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        cancel: &CancellationToken,
    ) -> Result<T, ClientError> {
        debug!(%url, "GET");
        let body = self.execute(self.http.get(url.clone()), &url, cancel).await?;
        serde_json::from_slice(&body).map_err(|e| ClientError::Malformed {
            url: url.to_string(),
            source: e,
        })
    }

    async fn post_json<B: Serialize>(
        &self,
        url: Url,
        body: &B,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, ClientError> {
        debug!(%url, "POST");
        self.execute(self.http.post(url.clone()).json(body), &url, cancel)
            .await
    }

    pub async fn fetch_plans_with(
        &self,
        ctx: &SearchContext,
        number_results: Option<usize>,
        cancel: &CancellationToken,
    ) -> Result<PlansResponse, ClientError> {
        self.get_json(ctx.plans_url(number_results), cancel).await
    }

    pub async fn save_plan_with(
        &self,
        username: &str,
        view: &SavedPlanView,
        cancel: &CancellationToken,
    ) -> Result<(), ClientError> {
        let url = self.endpoint(&["v1", "users", username, "plans"]);
        self.post_json(url, view, cancel).await.map(|_| ())
    }

    pub async fn send_feedback_with(
        &self,
        username: &str,
        feedback: &FeedbackRequest,
        cancel: &CancellationToken,
    ) -> Result<(), ClientError> {
        let url = self.endpoint(&["v1", "users", username, "feedback"]);
        self.post_json(url, feedback, cancel).await.map(|_| ())
    }

    pub async fn plan_summary_with(
        &self,
        request: &SummaryRequest,
        cancel: &CancellationToken,
    ) -> Result<SummaryResponse, ClientError> {
        let url = self.endpoint(&["v1", "plan-summary"]);
        let body = self.post_json(url.clone(), request, cancel).await?;
        serde_json::from_slice(&body).map_err(|e| ClientError::Malformed {
            url: url.to_string(),
            source: e,
        })
    }

    pub async fn delete_plan(&self, username: &str, plan_id: &str) -> Result<(), ClientError> {
        let url = self.endpoint(&["v1", "users", username, "plan", plan_id]);
        debug!(%url, "DELETE");
        let cancel = self.request_token();
        self.execute(self.http.delete(url.clone()), &url, &cancel)
            .await
            .map(|_| ())
    }

    pub async fn saved_plans(&self, username: &str) -> Result<SavedPlansResponse, ClientError> {
        let url = self.endpoint(&["v1", "users", username, "plans"]);
        self.get_json(url, &self.request_token()).await
    }

    pub async fn favorites(&self, username: &str) -> Result<FavoritesResponse, ClientError> {
        let url = self.endpoint(&["v1", "users", username, "favorites"]);
        self.get_json(url, &self.request_token()).await
    }
}

impl PlanSource for PlanClient {
    async fn fetch_plans(
        &self,
        ctx: &SearchContext,
        number_results: Option<usize>,
    ) -> Option<PlansResponse> {
        match self
            .fetch_plans_with(ctx, number_results, &self.request_token())
            .await
        {
            Ok(plans) => Some(plans),
            Err(e) => {
                warn!(error = %e, "failed to fetch plans");
                None
            }
        }
    }

    async fn save_plan(&self, username: &str, view: &SavedPlanView) -> Result<(), ClientError> {
        self.save_plan_with(username, view, &self.request_token())
            .await
    }

    async fn send_feedback(
        &self,
        username: &str,
        feedback: &FeedbackRequest,
    ) -> Result<(), ClientError> {
        self.send_feedback_with(username, feedback, &self.request_token())
            .await
    }

    async fn plan_summary(
        &self,
        request: &SummaryRequest,
    ) -> Result<SummaryResponse, ClientError> {
        self.plan_summary_with(request, &self.request_token()).await
    }
}
