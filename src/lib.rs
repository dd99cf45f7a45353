//! Declarative management of Frontegg webhooks.
//!
//! The crate supplies the schema and CRUD handlers for the
//! `frontegg_webhook` resource plus the REST client they run on. State,
//! diffing and plan/apply belong to whatever drives the [`Provider`].

pub mod config;
pub mod error;
pub mod frontegg;
pub mod resource;

pub use error::{Error, FieldError, Result};
pub use resource::{Provider, ResourceData};
pub use tokio_util::sync::CancellationToken;
