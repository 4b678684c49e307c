use super::status::StatusReport;
use super::submission::{AckResponse, Credentials, ProcessRequest};
use crate::Result;
use crate::monitor::{ResultLoader, StatusPoll, StatusSource};
use crate::report::TaskReport;
use core::time::Duration;
use ohno::{IntoAppError, app_err, bail};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

const LOG_TARGET: &str = "      api";
const USER_AGENT: &str = "flow-watch";

/// Time allowed for a single request.
///
/// A status poll that runs out of time is reported as unanswered rather than
/// failed; every other request fails.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Body of the result endpoint, which reports a missing result in-band.
#[derive(Deserialize)]
#[serde(untagged)]
enum ResultBody {
    Missing { error: String },
    Report(Box<TaskReport>),
}

/// Client for the statement-processing backend.
///
/// The backend tracks the authenticated mailbox in a session cookie, so a
/// single client must be used for `authenticate` and everything after it.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a client rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not a valid base or the HTTP client cannot be built.
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url).into_app_err_with(|| format!("parsing base URL '{base_url}'"))?;
        if base_url.cannot_be_a_base() {
            bail!("'{base_url}' cannot be used as a base URL");
        }

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .cookie_store(true)
            .timeout(request_timeout)
            .build()?;

        Ok(Self { client, base_url })
    }

    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Open a backend session for the given mailbox.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects the credentials.
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<()> {
        let ack: AckResponse = self.post_json(&["authenticate"], credentials).await?;
        if !ack.success {
            bail!("authentication failed: {}", ack.message.as_deref().unwrap_or("no reason given"));
        }

        log::info!(target: LOG_TARGET, "authenticated as {}", credentials.email);
        Ok(())
    }

    /// Start a processing job and return its task id.
    ///
    /// This is a single request; a failure here is never retried.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the server rejects it, or no task id comes back.
    pub async fn submit(&self, request: &ProcessRequest) -> Result<String> {
        let ack: AckResponse = self.post_json(&["api", "process-statements"], request).await?;
        if !ack.success {
            bail!("{}", ack.message.as_deref().unwrap_or("the server rejected the request"));
        }

        match ack.task_id {
            Some(task_id) if !task_id.trim().is_empty() => {
                log::info!(target: LOG_TARGET, "submitted task '{task_id}' for {} to {}", request.from_date, request.to_date);
                Ok(task_id)
            }
            _ => bail!("the server accepted the request but returned no task id"),
        }
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        let _ = url
            .path_segments_mut()
            .map_err(|()| app_err!("'{}' cannot be used as a base URL", self.base_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        let url = self.endpoint(segments)?;
        self.try_get_json(&url).await.into_app_err_with(|| format!("requesting {url}"))
    }

    async fn try_get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, reqwest::Error> {
        log::debug!(target: LOG_TARGET, "GET {url}");
        self.client.get(url.clone()).send().await?.error_for_status()?.json().await
    }

    async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(&self, segments: &[&str], body: &B) -> Result<T> {
        let url = self.endpoint(segments)?;
        log::debug!(target: LOG_TARGET, "POST {url}");

        let resp = self.client.post(url.clone()).json(body).send().await?.error_for_status()?;
        resp.json().await.into_app_err_with(|| format!("decoding response from {url}"))
    }
}

impl StatusSource for ApiClient {
    async fn fetch_status(&self, task_id: &str) -> Result<StatusPoll> {
        let url = self.endpoint(&["api", "processing-status", task_id])?;

        match self.try_get_json::<StatusReport>(&url).await {
            Ok(report) => Ok(StatusPoll::Answered(report)),
            Err(e) if e.is_timeout() => {
                log::debug!(target: LOG_TARGET, "no answer from {url} before the request timeout");
                Ok(StatusPoll::Unanswered)
            }
            Err(e) => Err(e).into_app_err_with(|| format!("requesting {url}")),
        }
    }
}

impl ResultLoader for ApiClient {
    async fn load_result(&self, task_id: &str) -> Result<TaskReport> {
        match self.get_json(&["api", "transactions", task_id]).await? {
            ResultBody::Missing { error } => bail!("{error}"),
            ResultBody::Report(report) => {
                log::info!(
                    target: LOG_TARGET,
                    "loaded {} transactions for task '{task_id}'",
                    report.transactions.len()
                );
                Ok(*report)
            }
        }
    }
}
