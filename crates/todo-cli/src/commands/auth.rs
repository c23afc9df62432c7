//! Account and session command handlers

use anyhow::{Context, Result};

use todo_core::RegisterRequest;

use crate::app::App;
use crate::output::Output;
use crate::prompt::password_or_prompt;

/// Create an account
pub async fn register(
    app: &App,
    username: String,
    email: String,
    password: Option<String>,
    output: &Output,
) -> Result<()> {
    let password = password_or_prompt(password)?;
    let request = RegisterRequest::new(username, email, password);

    let user = app
        .sessions
        .register(&request)
        .await
        .context("Registration failed")?;

    output.success(&format!("Registered {}", user.username));
    output.print_user(&user);
    output.message(&format!("Log in with: todo login {}", user.username));
    Ok(())
}

/// Log in and persist the token
pub async fn login(
    app: &App,
    username: String,
    password: Option<String>,
    output: &Output,
) -> Result<()> {
    let password = password_or_prompt(password)?;

    let session = app.sessions.login(&username, &password).await?;

    output.success(&format!("Welcome, {}!", session.username));
    Ok(())
}

/// Forget the stored session
pub fn logout(app: &mut App, output: &Output) -> Result<()> {
    let was_logged_in = app.sessions.is_logged_in();
    app.sessions.logout();
    app.list.reset();

    if was_logged_in {
        output.success("Logged out");
    } else {
        output.message("Not logged in.");
    }
    Ok(())
}

/// Show the current user
pub fn whoami(app: &App, output: &Output) -> Result<()> {
    app.require_login()?;
    if let Some(session) = app.sessions.current_session() {
        output.print_session(&session);
    }
    Ok(())
}
