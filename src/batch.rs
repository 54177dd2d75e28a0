//! Batch loading
//!
//! Walks an identifier list, builds or updates one document per line, writes
//! it to the index and commits periodically. Each identifier gets a bounded
//! number of attempts; identifiers that still fail are appended to a
//! failure log and the batch moves on.

use std::collections::BTreeSet;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::config::BatchConfig;
use crate::document::Document;
use crate::error::{IndexerError, Result};
use crate::pipeline::Pipeline;
use crate::solr::DocumentIndex;
use crate::update::{UpdateAction, Updater};

/// What to do with each identifier of a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Full retrieve → merge → build
    Build,
    Update(UpdateAction),
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "build" => Ok(Action::Build),
            other => other.parse().map(Action::Update),
        }
    }
}

/// Bounded retry with a fixed delay between attempts
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub fn from_config(config: &BatchConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_millis(config.retry_delay_ms),
        )
    }

    /// Run `op` until it succeeds, fails with a non-retryable error, or the
    /// attempts are used up
    pub async fn run<T, F, Fut>(&self, identifier: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.max_attempts => {
                    debug!(identifier, attempt, error = %e, "retrying");
                    attempt += 1;
                    tokio::time::sleep(self.delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Lines of an input file to process: `start` inclusive, `stop` exclusive,
/// both 0-based
#[derive(Debug, Clone, Copy, Default)]
pub struct LineRange {
    pub start: usize,
    pub stop: Option<usize>,
}

impl LineRange {
    fn contains(&self, line: usize) -> bool {
        line >= self.start && self.stop.map_or(true, |stop| line < stop)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub processed: usize,
    pub written: usize,
    /// Update operations with nothing to change
    pub unchanged: usize,
    pub failed: usize,
}

pub struct BatchLoader {
    pipeline: Pipeline,
    updater: Updater,
    index: Arc<dyn DocumentIndex>,
    policy: RetryPolicy,
    commit_every: usize,
    failure_log: PathBuf,
}

impl BatchLoader {
    pub fn new(
        pipeline: Pipeline,
        updater: Updater,
        index: Arc<dyn DocumentIndex>,
        config: &BatchConfig,
    ) -> Self {
        Self {
            pipeline,
            updater,
            index,
            policy: RetryPolicy::from_config(config),
            commit_every: config.commit_every.max(1),
            failure_log: PathBuf::from(&config.failure_log),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Process the identifiers of `input` within `range`
    pub async fn run(
        &self,
        action: Action,
        input: &Path,
        range: LineRange,
    ) -> Result<BatchSummary> {
        let content = tokio::fs::read_to_string(input).await?;
        let identifiers: Vec<&str> = content
            .lines()
            .enumerate()
            .filter(|(line, _)| range.contains(*line))
            .filter_map(|(_, text)| text.split_whitespace().next())
            .collect();
        info!(
            input = %input.display(),
            action = ?action,
            count = identifiers.len(),
            "starting batch"
        );

        let mut summary = BatchSummary::default();
        let mut uncommitted = 0;

        for identifier in identifiers {
            summary.processed += 1;
            match self.process(action, identifier).await {
                Ok(true) => {
                    summary.written += 1;
                    uncommitted += 1;
                }
                Ok(false) => summary.unchanged += 1,
                Err(e) => {
                    warn!(identifier, kind = e.kind(), error = %e, "giving up on identifier");
                    summary.failed += 1;
                    self.log_failure(identifier, &e).await?;
                }
            }

            if uncommitted >= self.commit_every {
                self.commit().await;
                uncommitted = 0;
            }
        }
        if uncommitted > 0 {
            self.commit().await;
        }

        info!(
            processed = summary.processed,
            written = summary.written,
            unchanged = summary.unchanged,
            failed = summary.failed,
            "batch finished"
        );
        Ok(summary)
    }

    /// Produce and write one document. Returns whether a document was written.
    async fn process(&self, action: Action, identifier: &str) -> Result<bool> {
        self.policy
            .run(identifier, || async {
                let doc = self.produce(action, identifier).await?;
                match doc {
                    Some(doc) => {
                        self.index.add_document(&doc).await?;
                        Ok(true)
                    }
                    None => Ok(false),
                }
            })
            .await
    }

    async fn produce(&self, action: Action, identifier: &str) -> Result<Option<Document>> {
        match action {
            Action::Build => self.pipeline.build(identifier).await.map(Some),
            Action::Update(op) => self.updater.apply(op, identifier).await,
        }
    }

    async fn commit(&self) {
        let result = self
            .policy
            .run("commit", || async { Ok(self.index.commit().await?) })
            .await;
        match result {
            Ok(()) => debug!("committed"),
            Err(e) => warn!(error = %e, "commit failed"),
        }
    }

    async fn log_failure(&self, identifier: &str, error: &IndexerError) -> Result<()> {
        let line = format!(
            "{} {} [{}] {}\n",
            identifier,
            chrono::Utc::now().to_rfc3339(),
            error.kind(),
            error
        );
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.failure_log)
            .await?;
        file.write_all(line.as_bytes()).await?;
        Ok(())
    }
}

/// Delete from the index every identifier listed in `old` but not in `new`.
///
/// Commits after every `commit_every` deletions and once at the end. Returns
/// the number of identifiers deleted.
pub async fn delete_stale(
    index: &dyn DocumentIndex,
    new: &Path,
    old: &Path,
    commit_every: usize,
) -> Result<usize> {
    let new_content = tokio::fs::read_to_string(new).await?;
    let old_content = tokio::fs::read_to_string(old).await?;

    let current: BTreeSet<&str> = new_content.split_whitespace().collect();
    let stale: BTreeSet<&str> = old_content
        .split_whitespace()
        .filter(|id| !current.contains(id))
        .collect();
    info!(current = current.len(), stale = stale.len(), "deleting stale documents");

    let commit_every = commit_every.max(1);
    let mut deleted = 0;
    for id in &stale {
        match index.delete(id).await {
            Ok(()) => deleted += 1,
            Err(e) => warn!(id, error = %e, "delete failed"),
        }
        if deleted > 0 && deleted % commit_every == 0 {
            index.commit().await?;
        }
    }
    if !stale.is_empty() {
        index.commit().await?;
    }

    info!(deleted, "stale documents deleted");
    Ok(deleted)
}
