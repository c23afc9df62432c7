//! Task list synchronizer implementation

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::state::{ErrorKind, SyncError, TaskListSnapshot};
use crate::client::TaskRemote;
use crate::error::{ClientError, Operation};
use crate::models::{Task, TaskCreate, TaskId, TaskUpdate};
use crate::session::SessionStore;

/// Client-held projection of the remote task collection
///
/// Operations never return errors: they report success through their return
/// value and leave the failure in `last_error()`. Operations take `&mut self`,
/// so one list handles one request at a time.
pub struct TaskList<R> {
    remote: R,
    tasks: Vec<Task>,
    last_error: Option<SyncError>,
    pending: bool,
    /// Logged out when the server rejects the token
    session: Option<Arc<SessionStore>>,
    updates: watch::Sender<TaskListSnapshot>,
}

impl<R: TaskRemote> TaskList<R> {
    /// Create an empty list backed by `remote`
    pub fn new(remote: R) -> Self {
        let (updates, _) = watch::channel(TaskListSnapshot::default());
        Self {
            remote,
            tasks: Vec::new(),
            last_error: None,
            pending: false,
            session: None,
            updates,
        }
    }

    /// Force a logout on this session store when a request comes back 401
    pub fn with_session(mut self, session: Arc<SessionStore>) -> Self {
        self.session = Some(session);
        self
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Tasks in display order
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn last_error(&self) -> Option<&SyncError> {
        self.last_error.as_ref()
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> TaskListSnapshot {
        TaskListSnapshot {
            tasks: self.tasks.clone(),
            last_error: self.last_error.clone(),
            pending: self.pending,
        }
    }

    /// Subscribe to state changes
    ///
    /// A new snapshot is published whenever a request starts or finishes.
    pub fn subscribe(&self) -> watch::Receiver<TaskListSnapshot> {
        self.updates.subscribe()
    }

    /// Dismiss the current error
    pub fn clear_error(&mut self) {
        if self.last_error.take().is_some() {
            self.publish();
        }
    }

    /// Replace the collection with the server's list
    pub async fn load(&mut self) -> bool {
        self.begin();
        match self.remote.list().await {
            Ok(tasks) => {
                info!("Loaded {} task(s)", tasks.len());
                self.tasks = tasks;
                self.succeed();
                true
            }
            Err(e) => {
                self.fail(Operation::ListTasks, e);
                false
            }
        }
    }

    /// Create a task and append the server's copy
    pub async fn create(&mut self, request: TaskCreate) -> Option<Task> {
        if let Err(e) = request.validate() {
            self.fail(Operation::CreateTask, e);
            return None;
        }

        self.begin();
        match self.remote.create(&request).await {
            Ok(task) => {
                debug!("Created task {}", task.id);
                self.upsert(task.clone());
                self.succeed();
                Some(task)
            }
            Err(e) => {
                self.fail(Operation::CreateTask, e);
                None
            }
        }
    }

    /// Patch a task and store the server's merged result
    ///
    /// The result replaces the local task in place, or is appended when the
    /// id was not known locally.
    pub async fn update(&mut self, id: TaskId, patch: TaskUpdate) -> Option<Task> {
        if let Err(e) = patch.validate() {
            self.fail(Operation::UpdateTask, e);
            return None;
        }

        self.begin();
        match self.remote.update(id, &patch).await {
            Ok(task) => {
                debug!("Updated task {}", task.id);
                self.upsert(task.clone());
                self.succeed();
                Some(task)
            }
            Err(e) => {
                self.fail(Operation::UpdateTask, e);
                None
            }
        }
    }

    /// Flip `completed` on `task`
    pub async fn toggle_complete(&mut self, task: &Task) -> Option<Task> {
        self.update(task.id, TaskUpdate::toggle(task)).await
    }

    /// Delete a task and drop it locally
    pub async fn delete(&mut self, id: TaskId) -> bool {
        self.begin();
        match self.remote.delete(id).await {
            Ok(()) => {
                if let Some(pos) = self.tasks.iter().position(|t| t.id == id) {
                    self.tasks.remove(pos);
                }
                debug!("Deleted task {}", id);
                self.succeed();
                true
            }
            Err(e) => {
                self.fail(Operation::DeleteTask, e);
                false
            }
        }
    }

    /// Drop all local state (e.g. after logout)
    pub fn reset(&mut self) {
        self.tasks.clear();
        self.last_error = None;
        self.pending = false;
        self.publish();
    }

    fn upsert(&mut self, task: Task) {
        match self.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(existing) => *existing = task,
            None => self.tasks.push(task),
        }
    }

    fn begin(&mut self) {
        self.pending = true;
        self.publish();
    }

    fn succeed(&mut self) {
        self.pending = false;
        self.last_error = None;
        self.publish();
    }

    fn fail(&mut self, operation: Operation, error: ClientError) {
        let error = SyncError::from_client(operation, &error);
        warn!("{}", error);

        if error.kind == ErrorKind::Auth {
            if let Some(ref session) = self.session {
                session.logout();
            }
        }

        self.pending = false;
        self.last_error = Some(error);
        self.publish();
    }

    fn publish(&self) {
        self.updates.send_replace(self.snapshot());
    }
}
