//! Omni Core - Shared domain types.
//!
//! This crate provides the types shared by the site and its tests:
//! - the persisted visitor targeting record ([`VisitorContext`])
//! - the closed enumerations used for targeting and experiments
//! - the flag catalog ([`FlagKey`]) and its typed snapshot ([`GameFlags`])
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no session
//! access. Persistence and flag evaluation live in `omni-site`.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
