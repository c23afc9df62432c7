//! Session store
//!
//! Owns the authentication token lifecycle:
//!
//! - `login` exchanges credentials for a bearer token and persists it
//! - `logout` forgets the token (idempotent)
//! - `restore` revives a persisted token on startup, validating it against
//!   `/auth/me`; any failure (including an unreadable store) means
//!   "logged out", never a fatal error
//!
//! The current session is published on a `watch` channel. `TaskClient`
//! subscribes to it to pick up the bearer token for each request.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::client::AuthClient;
use crate::error::{ClientError, ClientResult};
use crate::models::{RegisterRequest, Session, User};
use crate::storage::KeyValueStore;

/// Storage key for the persisted bearer token
pub const TOKEN_KEY: &str = "token";

/// Holds the single active session, if any
pub struct SessionStore {
    auth: AuthClient,
    storage: Arc<dyn KeyValueStore>,
    session: watch::Sender<Option<Session>>,
}

impl SessionStore {
    /// Create a logged-out session store
    pub fn new(auth: AuthClient, storage: Arc<dyn KeyValueStore>) -> Self {
        let (session, _) = watch::channel(None);
        Self {
            auth,
            storage,
            session,
        }
    }

    /// The current session, if logged in
    pub fn current_session(&self) -> Option<Session> {
        self.session.borrow().clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.borrow().is_some()
    }

    /// Subscribe to session changes
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.session.subscribe()
    }

    /// Create an account; does not log in
    pub async fn register(&self, request: &RegisterRequest) -> ClientResult<User> {
        request.validate()?;
        self.auth.register(request).await
    }

    /// Exchange credentials for a session
    ///
    /// On failure the previous state (logged in or not) is left untouched.
    pub async fn login(&self, username: &str, password: &str) -> ClientResult<Session> {
        if username.trim().is_empty() {
            return Err(ClientError::Validation {
                field: "username",
                reason: "must not be empty".to_string(),
            });
        }
        if password.is_empty() {
            return Err(ClientError::Validation {
                field: "password",
                reason: "must not be empty".to_string(),
            });
        }

        let response = self
            .auth
            .login(username, password)
            .await
            .map_err(reject_as_auth)?;

        let user = match response.user {
            Some(user) => user,
            None => self
                .auth
                .current_user(&response.access_token)
                .await
                .map_err(reject_as_auth)?,
        };

        let session = Session::new(&user, response.access_token);
        self.storage.set(TOKEN_KEY, &session.token)?;
        self.session.send_replace(Some(session.clone()));

        info!("Logged in as {} (id {})", session.username, session.user_id);
        Ok(session)
    }

    /// Forget the session and the persisted token
    ///
    /// Always leaves the process logged out. A failure to remove the stored
    /// token is logged; the next `restore` will reject it anyway.
    pub fn logout(&self) {
        let previous = self.session.send_replace(None);
        if let Some(ref session) = previous {
            info!("Logged out {}", session.username);
        }
        self.forget_token();
    }

    /// Revive a persisted token
    ///
    /// Returns the restored session, or `None` if there was no token, the
    /// token could not be read, or the server did not accept it. In the last
    /// two cases the stored token is removed.
    pub async fn restore(&self) -> Option<Session> {
        let token = match self.storage.get(TOKEN_KEY) {
            Ok(Some(token)) => token,
            Ok(None) => {
                debug!("No persisted token");
                return None;
            }
            Err(e) => {
                warn!("Could not read persisted token, treating as logged out: {}", e);
                self.session.send_replace(None);
                self.forget_token();
                return None;
            }
        };

        match self.auth.current_user(&token).await {
            Ok(user) => {
                let session = Session::new(&user, token);
                self.session.send_replace(Some(session.clone()));
                info!("Restored session for {}", session.username);
                Some(session)
            }
            Err(e) => {
                warn!("Persisted token rejected, treating as logged out: {}", e);
                self.session.send_replace(None);
                self.forget_token();
                None
            }
        }
    }

    fn forget_token(&self) {
        if let Err(e) = self.storage.remove(TOKEN_KEY) {
            warn!("Failed to clear stored token: {}", e);
        }
    }
}

/// A rejected login is an authentication failure, not a transport one
fn reject_as_auth(error: ClientError) -> ClientError {
    match error.status() {
        Some(400) | Some(401) | Some(403) => ClientError::Auth(
            "incorrect username or password".to_string(),
        ),
        _ => error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::client::HttpApi;
    use crate::storage::{MemoryStore, StorageError, StorageResult};

    fn store_for(server: &MockServer, storage: Arc<MemoryStore>) -> SessionStore {
        let auth = AuthClient::from_api(HttpApi::with_base_url(&server.uri()).unwrap());
        SessionStore::new(auth, storage)
    }

    async fn mount_login(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "tok-1",
                "token_type": "bearer",
                "user": {"id": 1, "username": "alice"}
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_login_persists_token() {
        let server = MockServer::start().await;
        mount_login(&server).await;

        let storage = Arc::new(MemoryStore::new());
        let sessions = store_for(&server, storage.clone());
        let mut rx = sessions.subscribe();

        let session = sessions.login("alice", "pw").await.unwrap();
        assert_eq!(session.user_id, 1);
        assert_eq!(session.token, "tok-1");
        assert_eq!(storage.get(TOKEN_KEY).unwrap().as_deref(), Some("tok-1"));
        assert!(sessions.is_logged_in());

        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().as_ref(), Some(&session));
    }

    #[tokio::test]
    async fn test_login_resolves_user_when_missing() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"access_token": "tok-9"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .and(header("authorization", "Bearer tok-9"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"id": 9, "username": "zed"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let sessions = store_for(&server, Arc::new(MemoryStore::new()));
        let session = sessions.login("zed", "pw").await.unwrap();
        assert_eq!(session.username, "zed");
        assert_eq!(session.user_id, 9);
    }

    #[tokio::test]
    async fn test_failed_login_leaves_state_unchanged() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let storage = Arc::new(MemoryStore::new());
        storage.set(TOKEN_KEY, "previous").unwrap();
        let sessions = store_for(&server, storage.clone());

        let err = sessions.login("alice", "wrong").await.unwrap_err();
        assert!(matches!(err, ClientError::Auth(_)));
        assert!(sessions.current_session().is_none());
        assert_eq!(storage.get(TOKEN_KEY).unwrap().as_deref(), Some("previous"));
    }

    #[tokio::test]
    async fn test_login_validates_before_sending() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let sessions = store_for(&server, Arc::new(MemoryStore::new()));
        let err = sessions.login("  ", "pw").await.unwrap_err();
        assert!(matches!(err, ClientError::Validation { field: "username", .. }));
        let err = sessions.login("alice", "").await.unwrap_err();
        assert!(matches!(err, ClientError::Validation { field: "password", .. }));
    }

    #[tokio::test]
    async fn test_login_server_error_stays_request_failed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let sessions = store_for(&server, Arc::new(MemoryStore::new()));
        let err = sessions.login("alice", "pw").await.unwrap_err();
        assert_eq!(err.status(), Some(500));
    }

    #[tokio::test]
    async fn test_logout_is_idempotent() {
        let server = MockServer::start().await;
        mount_login(&server).await;

        let storage = Arc::new(MemoryStore::new());
        let sessions = store_for(&server, storage.clone());
        sessions.login("alice", "pw").await.unwrap();

        sessions.logout();
        assert!(sessions.current_session().is_none());
        assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);

        sessions.logout();
        assert!(sessions.current_session().is_none());
    }

    /// Store whose writes all fail
    struct ReadOnlyStore(MemoryStore);

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, key: &str) -> StorageResult<Option<String>> {
            self.0.get(key)
        }

        fn set(&self, _key: &str, _value: &str) -> StorageResult<()> {
            Err(read_only())
        }

        fn remove(&self, _key: &str) -> StorageResult<()> {
            Err(read_only())
        }
    }

    fn read_only() -> StorageError {
        StorageError::from_io(
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            "/data/credentials.json".into(),
        )
    }

    #[tokio::test]
    async fn test_logout_clears_session_when_storage_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"id": 4, "username": "dana"})),
            )
            .mount(&server)
            .await;

        let storage = ReadOnlyStore(MemoryStore::new());
        storage.0.set(TOKEN_KEY, "saved").unwrap();
        let auth = AuthClient::from_api(HttpApi::with_base_url(&server.uri()).unwrap());
        let sessions = SessionStore::new(auth, Arc::new(storage));

        assert!(sessions.restore().await.is_some());
        sessions.logout();
        assert!(!sessions.is_logged_in());
        assert!(sessions.current_session().is_none());
    }

    #[tokio::test]
    async fn test_restore_with_valid_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .and(header("authorization", "Bearer saved"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"id": 4, "username": "dana"})),
            )
            .mount(&server)
            .await;

        let storage = Arc::new(MemoryStore::new());
        storage.set(TOKEN_KEY, "saved").unwrap();
        let sessions = store_for(&server, storage);

        let session = sessions.restore().await.unwrap();
        assert_eq!(session.username, "dana");
        assert_eq!(session.token, "saved");
        assert_eq!(sessions.current_session(), Some(session));
    }

    #[tokio::test]
    async fn test_restore_with_stale_token_clears_it() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let storage = Arc::new(MemoryStore::new());
        storage.set(TOKEN_KEY, "expired").unwrap();
        let sessions = store_for(&server, storage.clone());

        assert!(sessions.restore().await.is_none());
        assert!(!sessions.is_logged_in());
        assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn test_restore_without_token_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let sessions = store_for(&server, Arc::new(MemoryStore::new()));
        assert!(sessions.restore().await.is_none());
    }

    #[tokio::test]
    async fn test_corrupt_credentials_file_is_logged_out() {
        use crate::storage::FileStore;
        use tempfile::TempDir;

        let server = MockServer::start().await;
        mount_login(&server).await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("credentials.json");
        std::fs::write(&path, "{garbage").unwrap();

        let storage = Arc::new(FileStore::new(&path));
        let auth = AuthClient::from_api(HttpApi::with_base_url(&server.uri()).unwrap());
        let sessions = SessionStore::new(auth, storage.clone());

        assert!(sessions.restore().await.is_none());
        assert!(!sessions.is_logged_in());

        let session = sessions.login("alice", "pw").await.unwrap();
        assert_eq!(session.token, "tok-1");
        assert_eq!(storage.get(TOKEN_KEY).unwrap().as_deref(), Some("tok-1"));

        std::fs::write(&path, "{garbage").unwrap();
        sessions.logout();
        assert!(!sessions.is_logged_in());
        assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn test_register_validates_email() {
        let server = MockServer::start().await;
        let sessions = store_for(&server, Arc::new(MemoryStore::new()));

        let err = sessions
            .register(&RegisterRequest::new("bob", "not-an-email", "pw"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Validation { field: "email", .. }));
    }
}
