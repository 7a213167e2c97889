//! Core types for the Omni site.
//!
//! This module provides the targeting record and the flag catalog.

pub mod flags;
pub mod visitor;

pub use flags::{FlagKey, GameFlags, ThemeName, UiVariant};
pub use visitor::{
    ContextKind, Country, CustomAttributes, REGULAR_USER_KEY, VIP_USER_KEY, VipStatus,
    VisitorContext,
};
