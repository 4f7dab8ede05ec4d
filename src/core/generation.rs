use std::time::Duration;

use crate::{
    core::upstream::ensure_success,
    error::{AppError, Result},
    models::{
        generation::GenerationRequest,
        job::{Job, JobStatus, SubmitResponse},
    },
    state::GenerationConfig,
};

const SERVICE: &str = "generation";

/// How often, and how many times, a job status is polled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay before every status query, including the first
    pub interval: Duration,
    /// Status queries issued before giving up
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            max_attempts: 150,
        }
    }
}

/// Client for the generation API's submit and status endpoints
#[derive(Debug, Clone)]
pub struct GenerationClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    poll: PollPolicy,
}

impl GenerationClient {
    /// Create a client sharing `http`'s connection pool
    pub fn new(http: reqwest::Client, config: &GenerationConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            poll: config.poll,
        }
    }

    /// Submit a request and poll it until it reaches a terminal status
    ///
    /// # Errors
    ///
    /// * [`AppError::Upstream`] when the submission or a status query is not 2xx
    /// * [`AppError::JobFailed`] when the job reports `FAILURE`
    /// * [`AppError::PollTimeout`] when no terminal status is seen within the poll policy
    pub async fn run(&self, request: &GenerationRequest) -> Result<Job> {
        let job = self.submit(request).await?;
        self.wait(job).await
    }

    /// Submit a job, returning it in its initial pending state
    pub async fn submit(&self, request: &GenerationRequest) -> Result<Job> {
        let kind = request.kind();
        let body = request.to_payload()?;

        let response = self
            .http
            .post(format!("{}{}", self.base_url, kind.submit_path()))
            .header("API-Key", &self.api_key)
            .json(&body)
            .send()
            .await?;
        let response = ensure_success(SERVICE, response).await?;
        let SubmitResponse { id } = response.json().await?;

        tracing::info!(job_id = %id, %kind, "job submitted");
        Ok(Job::submitted(id, kind))
    }

    /// Query the current status of a job once
    pub async fn status(&self, job: &Job) -> Result<JobStatus> {
        let response = self
            .http
            .get(format!("{}{}", self.base_url, job.kind.status_path(&job.id)))
            .header("API-Key", &self.api_key)
            .send()
            .await?;
        let response = ensure_success(SERVICE, response).await?;
        Ok(response.json().await?)
    }

    /// Poll `job` until it succeeds, fails, or the poll policy runs out
    pub async fn wait(&self, mut job: Job) -> Result<Job> {
        for attempt in 1..=self.poll.max_attempts {
            tokio::time::sleep(self.poll.interval).await;

            let status = self.status(&job).await?;
            job.observe(status);

            match &job.status {
                JobStatus::Succeeded { urls } => {
                    tracing::info!(job_id = %job.id, kind = %job.kind, attempt, results = urls.len(), "job succeeded");
                    return Ok(job);
                }
                JobStatus::Failed { reason } => {
                    tracing::warn!(job_id = %job.id, kind = %job.kind, attempt, %reason, "job failed");
                    return Err(AppError::JobFailed {
                        job_id: job.id,
                        reason: reason.clone(),
                    });
                }
                JobStatus::Pending { status } => {
                    tracing::debug!(job_id = %job.id, kind = %job.kind, attempt, %status, "job pending");
                }
            }
        }

        tracing::warn!(job_id = %job.id, kind = %job.kind, attempts = job.polls, "job poll timed out");
        Err(AppError::PollTimeout {
            job_id: job.id,
            attempts: job.polls,
        })
    }
}
