// src/core/mod.rs
//! Local state cache, its remote collaborators and the coordinator between them

pub mod client_state;
pub mod collection_store;
pub mod config_manager;
pub mod credential_store;
pub mod job_fit;
pub mod remote;
pub mod service_client;
pub mod session_store;
pub mod sync_coordinator;

pub use client_state::ClientState;
pub use collection_store::{CollectionAction, CollectionStore, Entity};
pub use config_manager::ConfigManager;
pub use credential_store::{CredentialStore, MemoryCredentialStore};
pub use job_fit::{JobFitAction, JobFitState};
pub use remote::{AuthClient, RemoteCollectionClient};
pub use service_client::HttpApiClient;
pub use session_store::{Credential, Session, SessionStore};
pub use sync_coordinator::SyncCoordinator;
