//! Task list synchronization
//!
//! `TaskList` keeps the client's view of the remote task collection. Local
//! state changes only after the server confirms a request:
//!
//! 1. Validate the request locally (empty titles never leave the client)
//! 2. Send it through a `TaskRemote`
//! 3. On success, apply the server's authoritative result
//! 4. On failure, keep the collection as it was and record `last_error`
//!
//! ## Usage
//!
//! ```ignore
//! let mut list = TaskList::new(client).with_session(session);
//! let mut updates = list.subscribe();
//! list.load().await;
//! list.create(TaskCreate::new("Buy milk")).await;
//! ```

mod list;
mod state;

pub use list::TaskList;
pub use state::{ErrorKind, SyncError, TaskListSnapshot};
