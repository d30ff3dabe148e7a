//! Permission synchronization between the local store and the platform
//!
//! The local store and the access-control platform cannot be updated
//! atomically: the platform has no transactions spanning multiple users,
//! the store does. Every state change that touches external permissions
//! therefore runs as a saga: apply the external changes one by one while
//! recording prior levels, roll the applied ones back in reverse order if
//! any later change fails, and only commit the local row once the whole
//! external sequence succeeded.
//!
//! Coordinators wrap the saga for the four call sites (classroom archive,
//! member role change, assignment closing, assignment reopening); the
//! drift reconciler is the one-directional consumer that never needs
//! compensation.

pub mod archive;
pub mod assignment;
pub mod error;
pub mod member;
pub mod policy;
pub mod reconcile;
pub mod saga;
pub mod worker;

pub use archive::ClassroomArchiveCoordinator;
pub use assignment::{AssignmentLifecycleCoordinator, CloseSummary};
pub use error::SyncError;
pub use member::MemberRoleCoordinator;
pub use reconcile::{DriftReconciler, ReconcileSummary};
pub use saga::{PermissionOp, PermissionSaga, SagaError};
pub use worker::{spawn_workers, WorkerConfig};
