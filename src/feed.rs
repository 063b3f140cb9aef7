use serde_json::Value;
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::{FeedEntry, Job, JobId};

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("failed to fetch jobs: {0}")]
    Network(String),
    #[error("no jobs found in the response: {0}")]
    Shape(String),
}

impl FeedError {
    /// The message shown to the user for this failure.
    pub fn notice(&self) -> &'static str {
        match self {
            FeedError::Network(_) => "Failed to fetch jobs.",
            FeedError::Shape(_) => "No jobs found in the response.",
        }
    }
}

impl From<reqwest::Error> for FeedError {
    fn from(err: reqwest::Error) -> Self {
        FeedError::Network(err.to_string())
    }
}

pub struct FeedClient {
    url: String,
    client: reqwest::Client,
}

impl FeedClient {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, FeedError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            url: url.to_string(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetches the feed once and normalizes it.
    pub async fn fetch_jobs(&self) -> Result<Vec<Job>, FeedError> {
        info!(url = %self.url, "fetching job feed");
        let response = self.client.get(&self.url).send().await?;

        if !response.status().is_success() {
            return Err(FeedError::Network(format!(
                "feed request failed with status {}",
                response.status()
            )));
        }

        // A body that isn't JSON at all is a transport-level failure, not a shape problem.
        let payload: Value = response.json().await?;
        let jobs = normalize(payload)?;
        info!(count = jobs.len(), "job feed normalized");
        Ok(jobs)
    }
}

/// Converts a raw `{ "jobs": [...] }` payload into identified jobs, in feed order.
///
/// Entries that already carry a non-empty string `id` keep it unless an earlier
/// entry in the same payload claimed it; every other entry gets a fresh UUIDv4,
/// including entries whose `id` is a number or `null`.
pub fn normalize(payload: Value) -> Result<Vec<Job>, FeedError> {
    let Value::Object(mut root) = payload else {
        return Err(FeedError::Shape("payload is not an object".to_string()));
    };
    let entries = match root.remove("jobs") {
        Some(Value::Array(entries)) => entries,
        Some(_) => return Err(FeedError::Shape("`jobs` is not an array".to_string())),
        None => return Err(FeedError::Shape("missing `jobs` field".to_string())),
    };

    let mut seen: HashSet<JobId> = HashSet::with_capacity(entries.len());
    let mut jobs = Vec::with_capacity(entries.len());

    for (index, raw) in entries.into_iter().enumerate() {
        if !raw.is_object() {
            return Err(FeedError::Shape(format!("entry {} is not an object", index)));
        }
        let entry: FeedEntry = serde_json::from_value(raw)
            .map_err(|e| FeedError::Shape(format!("entry {}: {}", index, e)))?;

        let id = match entry.usable_id() {
            Some(existing) if !seen.contains(existing) => JobId::new(existing),
            Some(existing) => {
                warn!(id = existing, index, "duplicate job id in feed, assigning a fresh one");
                JobId::random()
            }
            None => JobId::random(),
        };
        debug!(%id, index, "normalized feed entry");
        seen.insert(id.clone());
        jobs.push(entry.into_job(id));
    }

    Ok(jobs)
}

/// Serves a single canned HTTP response on a loopback port and returns the feed URL.
#[cfg(test)]
pub async fn serve_once(status: &str, body: &str) -> String {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let response = format!(
        "HTTP/1.1 {}\r\n\
         content-type: application/json\r\n\
         content-length: {}\r\n\
         connection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
    });

    format!("http://{}/api/v1", addr)
}
