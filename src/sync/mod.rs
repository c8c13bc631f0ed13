//! The fork sync engine.
//!
//! Drives one branch-change event through policy check, fork enumeration,
//! and the per-fork authorize/propose/land pipeline, isolating failures at
//! the fork boundary.

pub mod authorize;
pub mod engine;
pub mod land;
pub mod outcome;
pub mod propose;

pub use authorize::client_for_owner;
pub use engine::{handle_branch_change, handle_branch_change_with_limits, SyncLimits};
pub use land::{land, LandingMode};
pub use outcome::{EventOutcome, SkipReason, SyncOutcome, SyncResult};
pub use propose::{build_proposal, propose_sync};
