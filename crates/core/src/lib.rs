//! Shared domain types for the point-to-polygon (PTP) conversion service.
//!
//! This crate holds the pieces every other crate depends on:
//!
//! - [`types`] - database id and timestamp aliases.
//! - [`error`] - the core error type.
//! - [`config`] - immutable pipeline configuration loaded from the
//!   environment.
//! - [`shape`] - the annotation shape lookup.
//! - [`geometry`] - coordinate sequence validation.

pub mod config;
pub mod error;
pub mod geometry;
pub mod shape;
pub mod types;

pub use config::PtpConfig;
pub use error::CoreError;
pub use shape::Shape;
