//! Webhook handling for GitHub events.
//!
//! This module provides:
//! - Signature verification for webhook payloads (HMAC-SHA256)
//! - Typed branch-change events and the payload parser

pub mod events;
pub mod parser;
pub mod signature;

pub use events::BranchChangeEvent;
pub use parser::{parse_webhook, strip_heads_prefix, ParseError};
pub use signature::{
    compute_signature, format_signature_header, parse_signature_header, verify_signature,
};
