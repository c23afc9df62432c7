//! Wiring between the CLI and the core
//!
//! Builds the session store (backed by the credentials file), the task
//! client that reads its token, and the task list on top of both.

use std::sync::Arc;

use anyhow::{bail, Context, Result};

use todo_core::{
    AuthClient, ClientError, Config, ErrorKind, FileStore, SessionStore, StorageError, SyncError,
    TaskClient, TaskList,
};

pub struct App {
    pub config: Config,
    pub sessions: Arc<SessionStore>,
    pub list: TaskList<TaskClient>,
}

impl App {
    /// Build the clients for the configured server (no requests are made)
    pub fn open(config: Config) -> Result<Self> {
        let storage = Arc::new(FileStore::new(config.credentials_path()));
        let auth = AuthClient::new(&config).context("Failed to create HTTP client")?;
        let sessions = Arc::new(SessionStore::new(auth, storage));

        let client = TaskClient::new(&config, sessions.subscribe())
            .context("Failed to create HTTP client")?;
        let list = TaskList::new(client).with_session(sessions.clone());

        Ok(Self {
            config,
            sessions,
            list,
        })
    }

    /// Pick up the session persisted by a previous `todo login`
    pub async fn restore(&self) {
        self.sessions.restore().await;
    }

    /// Fail unless a session is active
    pub fn require_login(&self) -> Result<()> {
        if !self.sessions.is_logged_in() {
            bail!("Not logged in. Run `todo login <username>` first.");
        }
        Ok(())
    }

    /// Turn the list's last error into a command failure
    pub fn fail_with_last_error(&self) -> Result<()> {
        match self.list.last_error() {
            Some(err) => Err(describe(err)),
            None => bail!("Operation failed"),
        }
    }
}

fn describe(err: &SyncError) -> anyhow::Error {
    match err.kind {
        ErrorKind::Auth => anyhow::anyhow!(
            "{}\nYour session has expired. Run `todo login <username>` again.",
            err
        ),
        _ => anyhow::anyhow!("{}", err),
    }
}

/// What the user can do about a local storage failure, if anything
pub fn recovery_hint(err: &anyhow::Error) -> Option<&'static str> {
    err.chain().find_map(|cause| {
        if let Some(storage) = cause.downcast_ref::<StorageError>() {
            return storage.recovery_suggestion();
        }
        match cause.downcast_ref::<ClientError>() {
            Some(ClientError::Storage(storage)) => storage.recovery_suggestion(),
            _ => None,
        }
    })
}
