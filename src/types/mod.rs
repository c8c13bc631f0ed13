//! Core domain types for the fork sync bot.
//!
//! This module contains the fundamental identifier types used throughout the
//! application, designed to encode invariants via the type system.

pub mod ids;

pub use ids::{DeliveryId, InstallationId, PrNumber, RepoId, Sha};
