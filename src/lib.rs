//! Client-side cache for a job-portal REST backend.
//!
//! The [`core::SyncCoordinator`] owns the session and the two collections that
//! depend on it (saved jobs, my applications) and only writes to them with
//! data the server has confirmed.

pub mod cli;
pub mod core;
pub mod database;
pub mod error;
pub mod types;
pub mod utils;

pub use crate::core::{
    CollectionStore, ConfigManager, Credential, HttpApiClient, Session, SyncCoordinator,
};
pub use crate::error::{Result, SyncError};
