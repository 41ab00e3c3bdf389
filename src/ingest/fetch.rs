/// Background download of dropped image URLs
///
/// The shelf allocates the destination and registers the job on the
/// foreground; `download` then runs on the async executor and touches
/// nothing but the network and its own destination file. Its
/// `FetchOutcome` comes back to the foreground as a message, and only
/// there is the shelf updated.
use std::collections::HashMap;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

use crate::error::ShelfError;

/// Sent with every request; some image hosts refuse anonymous clients
pub const USER_AGENT: &str = "Mozilla/5.0";

/// Build the shared HTTP client
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!("Falling back to default HTTP client: {}", e);
            reqwest::Client::new()
        })
}

/// A download ready to run
#[derive(Debug, Clone)]
pub struct FetchJob {
    pub id: u64,
    pub url: String,
    pub destination: PathBuf,
    cancel: CancellationToken,
}

/// Why a download produced nothing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    Cancelled,
    Failed(String),
}

/// A finished download, delivered back to the foreground
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub id: u64,
    pub url: String,
    pub destination: PathBuf,
    /// Bytes written on success
    pub result: Result<u64, FetchFailure>,
}

#[derive(Debug)]
struct InFlight {
    id: u64,
    cancel: CancellationToken,
}

/// Downloads currently running, keyed by URL
#[derive(Debug, Default)]
pub struct FetchRegistry {
    next_id: u64,
    in_flight: HashMap<String, InFlight>,
}

impl FetchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_in_flight(&self, url: &str) -> bool {
        self.in_flight.contains_key(url)
    }

    /// Register a download. Returns None if the same URL is already
    /// being fetched; the running download will deliver it.
    pub fn submit(&mut self, url: &str, destination: PathBuf) -> Option<FetchJob> {
        if self.is_in_flight(url) {
            return None;
        }

        self.next_id += 1;
        let cancel = CancellationToken::new();
        self.in_flight.insert(
            url.to_string(),
            InFlight {
                id: self.next_id,
                cancel: cancel.clone(),
            },
        );

        Some(FetchJob {
            id: self.next_id,
            url: url.to_string(),
            destination,
            cancel,
        })
    }

    /// Retire a finished download. Returns false when the outcome
    /// belongs to a job that was cancelled or is otherwise unknown.
    pub fn finish(&mut self, outcome: &FetchOutcome) -> bool {
        match self.in_flight.get(&outcome.url) {
            Some(entry) if entry.id == outcome.id => {
                self.in_flight.remove(&outcome.url);
                true
            }
            _ => false,
        }
    }

    /// Cancel and forget every running download
    pub fn cancel_all(&mut self) -> usize {
        let count = self.in_flight.len();
        for (_, entry) in self.in_flight.drain() {
            entry.cancel.cancel();
        }
        count
    }

    pub fn len(&self) -> usize {
        self.in_flight.len()
    }

    pub fn is_empty(&self) -> bool {
        self.in_flight.is_empty()
    }
}

/// Run a download to completion, failure or cancellation.
///
/// No timeout is applied. On any failure the partial destination file
/// is removed.
pub async fn download(client: reqwest::Client, job: FetchJob) -> FetchOutcome {
    let result = tokio::select! {
        biased;
        _ = job.cancel.cancelled() => Err(FetchFailure::Cancelled),
        fetched = fetch_to_file(&client, &job) => fetched.map_err(|e| FetchFailure::Failed(e.to_string())),
    };

    if result.is_err() {
        let _ = tokio::fs::remove_file(&job.destination).await;
    }

    FetchOutcome {
        id: job.id,
        url: job.url,
        destination: job.destination,
        result,
    }
}

async fn fetch_to_file(client: &reqwest::Client, job: &FetchJob) -> Result<u64, ShelfError> {
    let response = client.get(&job.url).send().await?.error_for_status()?;
    let bytes = response.bytes().await?;

    tokio::fs::write(&job.destination, &bytes)
        .await
        .map_err(|e| ShelfError::io(&job.destination, e))?;
    Ok(bytes.len() as u64)
}
