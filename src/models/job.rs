//! Generation jobs and the status values reported while polling them

use std::fmt;

use serde::Deserialize;

use crate::error::{AppError, Result};

/// The job families exposed by the generation API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    /// Face swap between two images
    FaceSwap,
    /// Super-resolution upscaling
    Upscale,
    /// Text-to-image
    TextToImage,
}

impl JobKind {
    /// Path of the submission endpoint, relative to the API base url
    pub fn submit_path(self) -> &'static str {
        match self {
            Self::FaceSwap => "/faceswap/v1",
            Self::Upscale => "/superresolution/v1",
            Self::TextToImage => "/sdxl/text2image/v1",
        }
    }

    /// Path of the status endpoint for one job
    ///
    /// Text-to-image jobs are submitted under `sdxl` but polled under `sd`.
    pub fn status_path(self, job_id: &str) -> String {
        let prefix = match self {
            Self::FaceSwap => "/faceswap/v1",
            Self::Upscale => "/superresolution/v1",
            Self::TextToImage => "/sd/text2image/v1",
        };
        format!("{}/status/{}", prefix, job_id)
    }

    /// Short name used in log fields
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FaceSwap => "faceswap",
            Self::Upscale => "upscale",
            Self::TextToImage => "text2image",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of a successful submission call
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitResponse {
    /// Upstream job id
    pub id: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

#[derive(Deserialize)]
struct StatusPayload {
    status: String,
    #[serde(default)]
    download_urls: Option<OneOrMany>,
    #[serde(default)]
    error: Option<String>,
}

/// Decoded status of a job, one per poll response
#[derive(Debug, Clone, PartialEq)]
pub enum JobStatus {
    /// Any non-terminal status; `status` keeps the raw upstream value
    Pending {
        /// Raw status string
        status: String,
    },
    /// `SUCCESS`, with the result urls normalized to a list
    Succeeded {
        /// Download urls of the generated images
        urls: Vec<String>,
    },
    /// `FAILURE`, with the server supplied message
    Failed {
        /// Upstream error message
        reason: String,
    },
}

impl<'de> Deserialize<'de> for JobStatus {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        StatusPayload::deserialize(deserializer).map(JobStatus::from_payload)
    }
}

impl JobStatus {
    fn from_payload(payload: StatusPayload) -> Self {
        match payload.status.as_str() {
            "SUCCESS" => Self::Succeeded {
                urls: match payload.download_urls {
                    Some(OneOrMany::One(url)) => vec![url],
                    Some(OneOrMany::Many(urls)) => urls,
                    None => Vec::new(),
                },
            },
            "FAILURE" => Self::Failed {
                reason: payload.error.unwrap_or_else(|| "unknown error".to_string()),
            },
            _ => Self::Pending {
                status: payload.status,
            },
        }
    }

    /// `SUCCESS` or `FAILURE`
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending { .. })
    }
}

/// A submitted job and the latest status seen for it
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    /// Upstream job id
    pub id: String,
    /// Job family
    pub kind: JobKind,
    /// Latest observed status
    pub status: JobStatus,
    /// Number of status polls issued so far
    pub polls: u32,
}

impl Job {
    /// A job that was just accepted by the submission endpoint
    pub fn submitted(id: impl Into<String>, kind: JobKind) -> Self {
        Self {
            id: id.into(),
            kind,
            status: JobStatus::Pending {
                status: String::from("SUBMITTED"),
            },
            polls: 0,
        }
    }

    /// Record the status returned by one poll
    pub fn observe(&mut self, status: JobStatus) {
        self.polls += 1;
        self.status = status;
    }

    /// Result urls; empty unless the job succeeded
    pub fn result_urls(&self) -> &[String] {
        match &self.status {
            JobStatus::Succeeded { urls } => urls,
            _ => &[],
        }
    }

    /// First result url, for routes that return a single image
    pub fn first_url(&self) -> Result<&str> {
        self.result_urls()
            .first()
            .map(String::as_str)
            .ok_or_else(|| {
                AppError::upstream(
                    "generation",
                    200,
                    format!("job {} finished without download urls", self.id),
                )
            })
    }

    /// Consume the job, returning its result urls
    pub fn into_urls(self) -> Vec<String> {
        match self.status {
            JobStatus::Succeeded { urls } => urls,
            _ => Vec::new(),
        }
    }
}
