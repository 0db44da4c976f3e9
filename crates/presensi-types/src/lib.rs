//! Shared domain types for Presensi.
//!
//! This crate contains the domain types used across the Presensi service:
//! the immutable run configuration, the portal-day calendar helpers, the
//! attendance decision/result model, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror,
//! secrecy.

pub mod attendance;
pub mod calendar;
pub mod config;
pub mod error;
