//! Synchronization core: change computation and confirmation.
//!
//! This module contains the reconciler that diffs local definitions
//! against remote records, the resulting change-set model, and the
//! confirmation gate that filters changes down to the approved subset.

mod changeset;
mod confirm;
mod reconciler;

pub use changeset::{ChangeSet, ConfirmedOperation};
pub use confirm::{ConfirmationGate, Prompter};
pub use reconciler::{ReconcileEntry, ReconcileReport, Reconciler};
