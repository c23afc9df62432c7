//! Authentication endpoints

use tracing::info;

use super::http::HttpApi;
use crate::config::Config;
use crate::error::{ClientResult, Operation};
use crate::models::{AuthResponse, RegisterRequest, User};

/// Client for `/auth/*`
///
/// Holds no credentials; `current_user` takes the token to check, which
/// lets the session store validate a persisted token before adopting it.
#[derive(Debug, Clone)]
pub struct AuthClient {
    api: HttpApi,
}

impl AuthClient {
    pub fn new(config: &Config) -> ClientResult<Self> {
        Ok(Self::from_api(HttpApi::new(config)?))
    }

    pub fn from_api(api: HttpApi) -> Self {
        Self { api }
    }

    /// `POST /auth/register`
    pub async fn register(&self, request: &RegisterRequest) -> ClientResult<User> {
        let builder = self
            .api
            .client()
            .post(self.api.url("/auth/register"))
            .json(request);
        let user: User = self.api.send_json(Operation::Register, builder).await?;
        info!("Registered user {} (id {})", user.username, user.id);
        Ok(user)
    }

    /// `POST /auth/login` with form-encoded credentials
    pub async fn login(&self, username: &str, password: &str) -> ClientResult<AuthResponse> {
        let builder = self
            .api
            .client()
            .post(self.api.url("/auth/login"))
            .form(&[("username", username), ("password", password)]);
        self.api.send_json(Operation::Login, builder).await
    }

    /// `GET /auth/me` for the given bearer token
    pub async fn current_user(&self, token: &str) -> ClientResult<User> {
        let builder = self
            .api
            .client()
            .get(self.api.url("/auth/me"))
            .bearer_auth(token);
        self.api.send_json(Operation::CurrentUser, builder).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::error::{ClientError, RequestCause};

    fn client_for(server: &MockServer) -> AuthClient {
        AuthClient::from_api(HttpApi::with_base_url(&server.uri()).unwrap())
    }

    #[tokio::test]
    async fn test_login_sends_form_credentials() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string_contains("username=alice"))
            .and(body_string_contains("password=s3cret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "tok-1",
                "token_type": "bearer",
                "user": {"id": 1, "username": "alice", "email": "alice@example.com"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let resp = client_for(&server).login("alice", "s3cret").await.unwrap();
        assert_eq!(resp.access_token, "tok-1");
        assert_eq!(resp.user.unwrap().id, 1);
    }

    #[tokio::test]
    async fn test_login_rejected_passes_status_through() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(json!({"detail": "Incorrect username or password"})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).login("alice", "wrong").await.unwrap_err();
        match err {
            ClientError::RequestFailed { operation, cause } => {
                assert_eq!(operation, Operation::Login);
                assert_eq!(cause.status(), Some(401));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_current_user_attaches_bearer() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .and(header("authorization", "Bearer tok-1"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"id": 1, "username": "alice"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let user = client_for(&server).current_user("tok-1").await.unwrap();
        assert_eq!(user.username, "alice");
    }

    #[tokio::test]
    async fn test_register_posts_json() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/register"))
            .and(body_json(json!({
                "username": "bob",
                "email": "bob@example.com",
                "password": "pw"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": 2,
                "username": "bob",
                "email": "bob@example.com",
                "created_at": "2024-05-01T09:30:00"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let user = client_for(&server)
            .register(&RegisterRequest::new("bob", "bob@example.com", "pw"))
            .await
            .unwrap();
        assert_eq!(user.id, 2);
        assert!(user.created_at.is_some());
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).current_user("tok").await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::RequestFailed {
                cause: RequestCause::Decode(_),
                ..
            }
        ));
    }
}
