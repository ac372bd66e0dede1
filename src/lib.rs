//! Packlist Client
//!
//! Travel packing lists backed by a remote store. [`StateController`] owns
//! the in-memory view and keeps it in step with the store; the view layer
//! reads [`Snapshot`]s from it.

pub mod commands;
pub mod config;
pub mod controller;
pub mod error;
pub mod forms;
pub mod grouping;
pub mod models;
pub mod stats;
pub mod store;

#[cfg(test)]
mod testing;

pub use commands::{HttpRemoteStore, RemoteError, RemoteStore};
pub use config::Config;
pub use controller::StateController;
pub use error::{Error, Result};
pub use store::Snapshot;
