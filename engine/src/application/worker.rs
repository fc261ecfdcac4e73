//! Concurrency coordinator.
//!
//! A `Worker` collects the independent startup tasks of one host process run
//! (renderer start, one task per bundling unit) and runs them all
//! concurrently. It is an explicit context object: constructed by the
//! [`Engine`](crate::Engine), populated during setup, and consumed exactly
//! once by [`Worker::run`].

use crate::domain::error::{EngineError, Result};
use crate::domain::services::{BundlingUnit, WorkerSupervisor};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

type TaskFuture = Pin<Box<dyn Future<Output = Result<()>> + Send + 'static>>;

struct PendingTask {
    label: String,
    fut: TaskFuture,
}

#[derive(Default)]
pub struct Worker {
    tasks: Vec<PendingTask>,
}

impl Worker {
    pub fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    /// Append one independent task.
    pub fn register<F>(&mut self, label: impl Into<String>, task: F)
    where
        F: Future<Output = Result<()>> + Send + 'static,
    {
        self.tasks.push(PendingTask {
            label: label.into(),
            fut: Box::pin(task),
        });
    }

    /// Register the renderer start (watch discipline: the task finishes once
    /// the renderer is confirmed up).
    pub fn register_renderer(&mut self, renderer: Arc<WorkerSupervisor>) {
        self.register("renderer", async move {
            renderer.supervise_watch().await.map(|_| ())
        });
    }

    /// Register one one-shot build task per bundling unit.
    pub fn register_builders<I>(&mut self, units: I)
    where
        I: IntoIterator<Item = Arc<BundlingUnit>>,
    {
        for unit in units {
            let label = format!("build {}", unit.name());
            self.register(label, async move { unit.build().await });
        }
    }

    /// Register one watch task per bundling unit.
    pub fn register_watchers<I>(&mut self, units: I)
    where
        I: IntoIterator<Item = Arc<BundlingUnit>>,
    {
        for unit in units {
            let label = format!("watch {}", unit.name());
            self.register(label, async move { unit.watch().await });
        }
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Start every registered task concurrently and wait for all of them.
    ///
    /// All tasks are started before any is awaited; no ordering exists
    /// between them. Every task is awaited even after a failure, and the
    /// first error observed wins. Running an empty coordinator is a
    /// configuration error: it means setup never registered anything.
    pub async fn run(self) -> Result<()> {
        if self.tasks.is_empty() {
            return Err(EngineError::NotConfigured(
                "no worker tasks registered; register the renderer or bundlers before running"
                    .to_string(),
            ));
        }

        info!(tasks = self.tasks.len(), "Starting worker tasks");
        let mut set = JoinSet::new();
        for PendingTask { label, fut } in self.tasks {
            set.spawn(async move { (label, fut.await) });
        }

        let mut first_error = None;
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((label, Ok(()))) => debug!(task = %label, "Worker task finished"),
                Ok((label, Err(e))) => {
                    error!(task = %label, error = %e, "Worker task failed");
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
                Err(join_error) => {
                    error!(error = %join_error, "Worker task panicked");
                    if first_error.is_none() {
                        first_error = Some(EngineError::TaskFailed(join_error.to_string()));
                    }
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
