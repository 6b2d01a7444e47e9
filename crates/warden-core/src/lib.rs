//! # warden-core
//!
//! Foundation types for the Warden admission controller.
//!
//! This crate provides the shared vocabulary the other warden crates depend
//! on:
//!
//! - **Dimensions**: [`bundle::Dimension`] — the tracked resource axes
//! - **Bundles**: [`bundle::ResourceBundle`] — per-dimension amounts a
//!   single orchestration requests or holds
//! - **Provenance**: [`provenance::Provenance`] — how a dispatch was
//!   triggered
//! - **Branded IDs**: [`ids::LeaseId`] as a newtype
//! - **Logging**: [`logging::init_subscriber`] for `tracing` setup
//!
//! ## Crate Position
//!
//! Foundation crate. Depended on by `warden-settings` and
//! `warden-admission`.

#![deny(unsafe_code)]

pub mod bundle;
pub mod ids;
pub mod logging;
pub mod provenance;

pub use bundle::{Dimension, ResourceBundle};
pub use ids::LeaseId;
pub use provenance::Provenance;
