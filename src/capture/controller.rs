use std::collections::BTreeSet;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::client::ApiClient;
use crate::extract::{ExtractorRequest, ProblemDetails, handle_request};
use crate::models::NewEntryRequest;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Failed to connect to the page. Please refresh.")]
    Unreachable,

    #[error("Error: {0}")]
    Extraction(String),

    #[error("Please select at least one topic")]
    NoTopics,
}

/// The page side of the channel did not answer.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ChannelError(pub String);

/// Anything that can answer a `getProblemDetails` request.
#[async_trait]
pub trait DetailsSource: Send + Sync {
    async fn request(&self, request: ExtractorRequest) -> Result<ProblemDetails, ChannelError>;
}

/// A problem page saved to disk. The file is read again on every request.
pub struct FileSource {
    pub path: PathBuf,
    pub page_url: Option<String>,
}

#[async_trait]
impl DetailsSource for FileSource {
    async fn request(&self, request: ExtractorRequest) -> Result<ProblemDetails, ChannelError> {
        let html = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| ChannelError(format!("{}: {}", self.path.display(), e)))?;
        Ok(handle_request(request, &html, self.page_url.as_deref()))
    }
}

#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    pub retries: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 3,
            delay: Duration::from_secs(1),
        }
    }
}

pub async fn fetch_details_with_retry(
    source: &dyn DetailsSource,
    policy: RetryPolicy,
) -> Result<ProblemDetails, CaptureError> {
    let mut remaining = policy.retries;
    loop {
        match source.request(ExtractorRequest::GetProblemDetails).await {
            Ok(details) if details.success => return Ok(details),
            Ok(details) => {
                let message = details
                    .error
                    .unwrap_or_else(|| "Failed to get problem details".to_string());
                return Err(CaptureError::Extraction(message));
            }
            Err(e) if remaining > 0 => {
                remaining -= 1;
                debug!("details request failed ({}), {} retries left", e, remaining);
                tokio::time::sleep(policy.delay).await;
            }
            Err(e) => {
                warn!("giving up on details request: {}", e);
                return Err(CaptureError::Unreachable);
            }
        }
    }
}

/// Fields shared by every entry created from one capture.
#[derive(Clone, Debug, Default)]
pub struct EntryDraft {
    pub title: String,
    pub description: String,
    pub problem_link: String,
    pub approach: String,
    pub code: String,
    pub time_complexity: String,
    pub space_complexity: String,
    pub is_basic: bool,
}

impl EntryDraft {
    pub fn from_details(details: &ProblemDetails, problem_link: impl Into<String>) -> Self {
        Self {
            title: details.title.clone(),
            description: details.description.clone(),
            code: details.code.clone(),
            problem_link: problem_link.into(),
            ..Default::default()
        }
    }

    fn for_topic(&self, topic: &str) -> NewEntryRequest {
        NewEntryRequest {
            topic: topic.to_string(),
            subtopics: Vec::new(),
            title: self.title.clone(),
            description: self.description.clone(),
            problem_link: self.problem_link.clone(),
            approach: self.approach.clone(),
            code: self.code.clone(),
            time_complexity: self.time_complexity.clone(),
            space_complexity: self.space_complexity.clone(),
            is_basic: self.is_basic,
        }
    }
}

#[derive(Debug, Default)]
pub struct SubmitReport {
    pub saved: Vec<String>,
    pub failed: Vec<(String, String)>,
}

impl SubmitReport {
    pub fn all_saved(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Creates one entry per topic, all requests in flight at once.
pub async fn submit_to_topics(
    client: &ApiClient,
    draft: &EntryDraft,
    topics: &[String],
) -> Result<SubmitReport, CaptureError> {
    let topics: Vec<String> = topics
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();
    if topics.is_empty() {
        return Err(CaptureError::NoTopics);
    }

    let client = client.clone();
    let draft = draft.clone();
    let mut report = fan_out(topics, move |topic| {
        let client = client.clone();
        let entry = draft.for_topic(&topic);
        async move {
            client
                .create_entry(&entry)
                .await
                .map(|_| ())
                .map_err(|e| e.to_string())
        }
    })
    .await;
    report.saved.sort();
    report.failed.sort();

    info!(
        "saved to {} topic(s), {} failed",
        report.saved.len(),
        report.failed.len()
    );
    Ok(report)
}

/// Runs `send` for every topic concurrently. A task that panics or is
/// cancelled still lands in `failed` under its topic.
async fn fan_out<F, Fut>(topics: Vec<String>, send: F) -> SubmitReport
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<(), String>> + Send + 'static,
{
    let mut unsettled: BTreeSet<String> = topics.iter().cloned().collect();
    let mut requests = JoinSet::new();
    for topic in topics {
        let request = send(topic.clone());
        requests.spawn(async move { (topic, request.await) });
    }

    let mut report = SubmitReport::default();
    while let Some(joined) = requests.join_next().await {
        match joined {
            Ok((topic, Ok(()))) => {
                unsettled.remove(&topic);
                report.saved.push(topic);
            }
            Ok((topic, Err(e))) => {
                warn!("saving to topic {} failed: {}", topic, e);
                unsettled.remove(&topic);
                report.failed.push((topic, e));
            }
            Err(e) => warn!("submit task aborted: {}", e),
        }
    }
    for topic in unsettled {
        report.failed.push((topic, "request aborted".to_string()));
    }
    report
}
