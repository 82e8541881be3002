//! Security module for Tagbot — command access control.
//!
//! Provides:
//! - **Access policy**: which channels, threads, and roles may invoke `/tag`

pub mod access;

pub use access::{AccessDecision, AccessPolicy, AllowReason, NamePattern};
