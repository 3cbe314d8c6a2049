//! Concurrent best-effort lookup across independent sources.
//!
//! [`run_named_tasks`] is the generic part: every task gets the same input,
//! runs on its own tokio task behind a bounded worker pool, and is cut off
//! at its own deadline. The deadline starts at dispatch, so a capped pool
//! cannot stretch a run past the longest task timeout. Faults, panics and
//! timeouts are recorded per task and never fail the run. [`Aggregator`] applies it to [`SourceLookup`]s and
//! folds the survivors into an [`AggregateReport`].

use crate::domain::model::{AggregateReport, SourceOutcome, SourceResult};
use crate::domain::phone::CanonicalNumber;
use crate::domain::ports::SourceLookup;
use crate::utils::error::{ReconError, Result};
use std::collections::{BTreeMap, HashSet};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;

pub const DEFAULT_SOURCE_TIMEOUT: Duration = Duration::from_secs(30);

pub type TaskFuture<T> = Pin<Box<dyn Future<Output = Result<Option<T>>> + Send + 'static>>;

type TaskFn<I, T> = Arc<dyn Fn(Arc<I>) -> TaskFuture<T> + Send + Sync>;

/// A named unit of work for [`run_named_tasks`].
pub struct NamedTask<I, T> {
    name: String,
    timeout: Option<Duration>,
    run: TaskFn<I, T>,
}

impl<I, T> NamedTask<I, T> {
    pub fn new<F, Fut>(name: impl Into<String>, run: F) -> Self
    where
        F: Fn(Arc<I>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<T>>> + Send + 'static,
    {
        Self {
            name: name.into(),
            timeout: None,
            run: Arc::new(move |input| Box::pin(run(input))),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RunSettings {
    /// Deadline for a task without its own timeout.
    pub timeout: Duration,
    /// Worker pool size; `None` means one worker per task.
    pub max_workers: Option<usize>,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_SOURCE_TIMEOUT,
            max_workers: None,
        }
    }
}

/// Results of tasks that produced something, plus the outcome of every task.
#[derive(Debug)]
pub struct TaskRun<T> {
    pub results: BTreeMap<String, T>,
    pub outcomes: BTreeMap<String, SourceOutcome>,
    pub elapsed: Duration,
}

enum Settled<T> {
    Found(T),
    Empty,
    Failed(String),
    TimedOut(ReconError),
}

/// Runs every task concurrently against `input` and waits until each one
/// has settled. A task's timeout covers the time it spends queued for a
/// worker as well as its own work.
pub async fn run_named_tasks<I, T>(
    input: I,
    tasks: Vec<NamedTask<I, T>>,
    settings: RunSettings,
) -> TaskRun<T>
where
    I: Send + Sync + 'static,
    T: Send + 'static,
{
    let started = Instant::now();
    let input = Arc::new(input);
    let workers = settings
        .max_workers
        .unwrap_or(tasks.len())
        .clamp(1, tasks.len().max(1));
    let pool = Arc::new(Semaphore::new(workers));

    tracing::debug!(tasks = tasks.len(), workers, "dispatching lookups");

    // 每個任務各自持有逾時，協調端只需依序等待
    let handles: Vec<_> = tasks
        .into_iter()
        .map(|task| {
            let deadline = task.timeout.unwrap_or(settings.timeout);
            let input = Arc::clone(&input);
            let pool = Arc::clone(&pool);
            let run = Arc::clone(&task.run);
            let name = task.name.clone();
            let handle = tokio::spawn(async move {
                let work = async move {
                    match pool.acquire_owned().await {
                        Ok(_permit) => Some(run(input).await),
                        Err(_) => None,
                    }
                };
                match tokio::time::timeout(deadline, work).await {
                    Ok(Some(Ok(Some(value)))) => Settled::Found(value),
                    Ok(Some(Ok(None))) => Settled::Empty,
                    Ok(Some(Err(e))) => Settled::Failed(e.to_string()),
                    Ok(None) => Settled::Failed("worker pool closed".to_string()),
                    Err(_) => Settled::TimedOut(ReconError::SourceTimeout {
                        source_name: name,
                        timeout: deadline,
                    }),
                }
            });
            (task.name, handle)
        })
        .collect();

    let mut results = BTreeMap::new();
    let mut outcomes = BTreeMap::new();

    for (name, handle) in handles {
        let settled = match handle.await {
            Ok(settled) => settled,
            Err(e) if e.is_panic() => Settled::Failed("lookup panicked".to_string()),
            Err(e) => Settled::Failed(e.to_string()),
        };

        let outcome = match settled {
            Settled::Found(value) => {
                tracing::info!(source = %name, "✅ found results");
                results.insert(name.clone(), value);
                SourceOutcome::Found
            }
            Settled::Empty => {
                tracing::debug!(source = %name, "no results");
                SourceOutcome::Empty
            }
            Settled::Failed(message) => {
                tracing::warn!(source = %name, error = %message, "⚠️ lookup failed");
                SourceOutcome::Failed(message)
            }
            Settled::TimedOut(e) => {
                tracing::warn!(source = %name, error = %e, "⚠️ lookup timed out");
                SourceOutcome::TimedOut
            }
        };
        outcomes.insert(name, outcome);
    }

    TaskRun {
        results,
        outcomes,
        elapsed: started.elapsed(),
    }
}

/// Report plus per-source diagnostics from one [`Aggregator::run`].
#[derive(Debug)]
pub struct AggregateOutcome {
    pub report: AggregateReport,
    pub outcomes: BTreeMap<String, SourceOutcome>,
    pub elapsed: Duration,
}

impl AggregateOutcome {
    pub fn failed_sources(&self) -> impl Iterator<Item = &str> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| outcome.is_failure())
            .map(|(name, _)| name.as_str())
    }
}

pub struct Aggregator {
    sources: Vec<Arc<dyn SourceLookup>>,
    settings: RunSettings,
}

impl Aggregator {
    /// Later sources reusing an earlier source's name are dropped, since the
    /// report holds one entry per name.
    pub fn new(sources: Vec<Arc<dyn SourceLookup>>) -> Self {
        let mut seen = HashSet::new();
        let sources = sources
            .into_iter()
            .filter(|source| {
                let fresh = seen.insert(source.name().to_string());
                if !fresh {
                    tracing::warn!(source = %source.name(), "⚠️ duplicate source name, skipping");
                }
                fresh
            })
            .collect();
        Self {
            sources,
            settings: RunSettings::default(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.settings.timeout = timeout;
        self
    }

    pub fn with_max_workers(mut self, max_workers: Option<usize>) -> Self {
        self.settings.max_workers = max_workers;
        self
    }

    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    pub fn settings(&self) -> RunSettings {
        self.settings
    }

    pub async fn run(&self, number: &CanonicalNumber) -> AggregateOutcome {
        let tasks = self
            .sources
            .iter()
            .map(|source| {
                let source = Arc::clone(source);
                let timeout = source.timeout();
                let task = NamedTask::new(
                    source.name().to_string(),
                    move |number: Arc<CanonicalNumber>| {
                        let source = Arc::clone(&source);
                        async move {
                            source
                                .lookup(&number)
                                .await
                                .map(|found| found.and_then(SourceResult::into_non_empty))
                        }
                    },
                );
                match timeout {
                    Some(timeout) => task.with_timeout(timeout),
                    None => task,
                }
            })
            .collect();

        let run = run_named_tasks(number.clone(), tasks, self.settings).await;

        tracing::info!(
            found = run.results.len(),
            dispatched = run.outcomes.len(),
            elapsed = ?run.elapsed,
            "lookup finished"
        );

        AggregateOutcome {
            report: AggregateReport::from_results(run.results),
            outcomes: run.outcomes,
            elapsed: run.elapsed,
        }
    }
}
