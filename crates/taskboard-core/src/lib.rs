//! Core types and trait definitions for the Taskboard record tracker.
//!
//! No HTTP or database code lives here. Storage backends implement
//! [`store::TrackerStore`] on top of the rules in [`lifecycle`].

pub mod access;
pub mod aggregate;
pub mod error;
pub mod event;
pub mod identity;
pub mod lifecycle;
pub mod participant;
pub mod record;
pub mod store;

pub use error::{AsCoreError, Error, Result};
pub use identity::Identity;
pub use record::RecordId;
