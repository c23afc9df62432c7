//! Task endpoints

use async_trait::async_trait;
use reqwest::RequestBuilder;
use tokio::sync::watch;
use tracing::debug;

use super::http::HttpApi;
use crate::config::Config;
use crate::error::{ClientResult, Operation};
use crate::models::{Session, Task, TaskCreate, TaskId, TaskUpdate};

/// Remote task collection
///
/// Implemented by `TaskClient` over HTTP. Each call is one request/response;
/// failures are returned as-is.
#[async_trait]
pub trait TaskRemote: Send + Sync {
    /// `GET /tasks/`
    async fn list(&self) -> ClientResult<Vec<Task>>;

    /// `GET /tasks/{id}`
    async fn get(&self, id: TaskId) -> ClientResult<Task>;

    /// `POST /tasks/`
    async fn create(&self, request: &TaskCreate) -> ClientResult<Task>;

    /// `PUT /tasks/{id}`
    async fn update(&self, id: TaskId, patch: &TaskUpdate) -> ClientResult<Task>;

    /// `DELETE /tasks/{id}`
    async fn delete(&self, id: TaskId) -> ClientResult<()>;
}

/// HTTP client for `/tasks/*`
///
/// Reads the bearer token from the session channel on every request, so a
/// login or logout takes effect immediately. Without a session the request
/// goes out unauthenticated and the server's rejection is returned.
#[derive(Debug, Clone)]
pub struct TaskClient {
    api: HttpApi,
    session: watch::Receiver<Option<Session>>,
}

impl TaskClient {
    pub fn new(config: &Config, session: watch::Receiver<Option<Session>>) -> ClientResult<Self> {
        Ok(Self::from_api(HttpApi::new(config)?, session))
    }

    pub fn from_api(api: HttpApi, session: watch::Receiver<Option<Session>>) -> Self {
        Self { api, session }
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.session.borrow().as_ref() {
            Some(session) => builder.bearer_auth(&session.token),
            None => {
                debug!("No session; sending request without Authorization");
                builder
            }
        }
    }

    fn task_url(&self, id: TaskId) -> String {
        self.api.url(&format!("/tasks/{}", id))
    }
}

#[async_trait]
impl TaskRemote for TaskClient {
    async fn list(&self) -> ClientResult<Vec<Task>> {
        let builder = self.authorize(self.api.client().get(self.api.url("/tasks/")));
        self.api.send_json(Operation::ListTasks, builder).await
    }

    async fn get(&self, id: TaskId) -> ClientResult<Task> {
        let builder = self.authorize(self.api.client().get(self.task_url(id)));
        self.api.send_json(Operation::GetTask, builder).await
    }

    async fn create(&self, request: &TaskCreate) -> ClientResult<Task> {
        let builder = self.authorize(
            self.api
                .client()
                .post(self.api.url("/tasks/"))
                .json(request),
        );
        self.api.send_json(Operation::CreateTask, builder).await
    }

    async fn update(&self, id: TaskId, patch: &TaskUpdate) -> ClientResult<Task> {
        let builder = self.authorize(self.api.client().put(self.task_url(id)).json(patch));
        self.api.send_json(Operation::UpdateTask, builder).await
    }

    async fn delete(&self, id: TaskId) -> ClientResult<()> {
        let builder = self.authorize(self.api.client().delete(self.task_url(id)));
        self.api.send_empty(Operation::DeleteTask, builder).await
    }
}
