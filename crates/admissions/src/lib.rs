//! Client-side engine for the school admission application wizard.
//!
//! The [`wizard`] module holds the step state machine, field store, validators,
//! relation propagation and document staging. The [`backend`] module describes the
//! REST contract the wizard submits to and ships an HTTP implementation of it.

pub mod backend;
pub mod config;
pub mod error;
pub mod telemetry;
pub mod wizard;
