//! todo-sync Core Library
//!
//! This crate provides the client-side core of todo-sync, a personal task
//! tracker backed by a remote REST service.
//!
//! # Architecture
//!
//! - **Session**: authenticated identity plus bearer token, persisted in a
//!   pluggable key-value store
//! - **Client**: typed HTTP facade over the `/auth` and `/tasks` endpoints
//! - **Sync**: the in-memory task list, updated only from confirmed server
//!   responses
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let storage = Arc::new(FileStore::new(config.credentials_path()));
//! let session = Arc::new(SessionStore::new(AuthClient::new(&config)?, storage));
//! session.login("alice", "secret").await?;
//!
//! let client = TaskClient::new(&config, session.subscribe())?;
//! let mut list = TaskList::new(client).with_session(session.clone());
//! list.load().await;
//! list.create(TaskCreate::new("Buy milk")).await;
//! ```
//!
//! # Modules
//!
//! - `config`: Application configuration
//! - `models`: Task, user and session data structures
//! - `error`: Client error taxonomy
//! - `storage`: Key-value persistence for the session token
//! - `client`: HTTP clients for authentication and tasks
//! - `session`: Session store (login/logout/restore)
//! - `sync`: Task list synchronizer

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod session;
pub mod storage;
pub mod sync;

pub use client::{AuthClient, TaskClient, TaskRemote};
pub use config::Config;
pub use error::{ClientError, ClientResult, Operation, RequestCause};
pub use models::{RegisterRequest, Session, Task, TaskCreate, TaskId, TaskUpdate, User};
pub use session::{SessionStore, TOKEN_KEY};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use sync::{ErrorKind, SyncError, TaskList, TaskListSnapshot};
