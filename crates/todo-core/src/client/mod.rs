//! HTTP clients for the task service
//!
//! - `AuthClient`: register, login, and "who am I" (token passed explicitly)
//! - `TaskClient`: the five task operations, bearer token read from the
//!   current session
//!
//! Both share `HttpApi`, which maps transport errors, non-2xx statuses and
//! undecodable bodies to `ClientError::RequestFailed`. Nothing is retried.

mod auth;
mod http;
mod tasks;

pub use auth::AuthClient;
pub use http::HttpApi;
pub use tasks::{TaskClient, TaskRemote};
