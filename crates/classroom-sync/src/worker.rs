//! Background workers
//!
//! Two interval loops: one closes overdue assignments, one reconciles
//! drift. Each pass runs inline in its loop task, so a slow pass delays
//! the next tick of the same worker instead of overlapping it. Both
//! loops stop when the shutdown token fires.

use chrono::Utc;
use classroom_access::AccessControl;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::assignment::AssignmentLifecycleCoordinator;
use crate::reconcile::DriftReconciler;

/// Intervals of the background workers, one per worker
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// How often overdue assignments are closed
    pub close_interval: Duration,

    /// How often drift is reconciled
    pub reconcile_interval: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            close_interval: Duration::from_secs(60),
            reconcile_interval: Duration::from_secs(300),
        }
    }
}

/// Spawn both background workers
///
/// The returned handles finish shortly after `shutdown` is cancelled.
pub fn spawn_workers(
    db: DatabaseConnection,
    access: Arc<dyn AccessControl>,
    config: WorkerConfig,
    shutdown: CancellationToken,
) -> Vec<JoinHandle<()>> {
    let close_interval = config.close_interval;
    let reconcile_interval = config.reconcile_interval;

    let closer = AssignmentLifecycleCoordinator::new(db.clone(), access.clone());
    let close_shutdown = shutdown.clone();
    let close_handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(close_interval);
        loop {
            tokio::select! {
                _ = close_shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    match closer.close_due_assignments(Utc::now()).await {
                        Ok(summary) => {
                            if summary.closed > 0 || summary.failed > 0 {
                                debug!(
                                    closed = summary.closed,
                                    failed = summary.failed,
                                    "Assignment closing pass finished"
                                );
                            }
                        }
                        Err(err) => error!(error = %err, "Assignment closing pass failed"),
                    }
                }
            }
        }
        debug!("Assignment closing worker stopped");
    });

    let reconciler = DriftReconciler::new(db, access);
    let reconcile_shutdown = shutdown;
    let reconcile_handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(reconcile_interval);
        loop {
            tokio::select! {
                _ = reconcile_shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    if let Err(err) = reconciler.reconcile_once().await {
                        error!(error = %err, "Reconciliation pass failed");
                    }
                }
            }
        }
        debug!("Drift reconciliation worker stopped");
    });

    vec![close_handle, reconcile_handle]
}
