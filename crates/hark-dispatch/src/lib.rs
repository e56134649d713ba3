//! # hark-dispatch
//!
//! Turns a stored recording plus a per-run speech-to-text config into text:
//!
//! - [`dispatcher`]: [`Dispatcher`] and its builder
//! - [`credentials`]: [`CredentialResolver`] trait and the JSON file store
//! - [`storage`]: [`AudioRetriever`] trait and the local filesystem store
//! - [`errors`]: [`DispatchError`] and the collaborator error types

#![deny(unsafe_code)]

pub mod credentials;
pub mod dispatcher;
pub mod errors;
pub mod storage;

pub use credentials::{CredentialFile, CredentialResolver, FileCredentialStore, StoredCredential};
pub use dispatcher::{Dispatcher, DispatcherBuilder};
pub use errors::{CredentialError, DispatchError, StorageError};
pub use storage::{AudioRetriever, LocalAudioStore};
