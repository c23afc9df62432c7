//! Status command handler

use anyhow::Result;

use crate::app::App;
use crate::output::{Output, OutputFormat};

/// Show server, session and task counts
pub async fn show(app: &mut App, output: &Output) -> Result<()> {
    let session = app.sessions.current_session();
    let loaded = session.is_some() && app.list.load().await;
    let snapshot = app.list.snapshot();
    let config = &app.config;

    match output.format {
        OutputFormat::Json => {
            let tasks = if loaded {
                serde_json::json!({
                    "total": snapshot.tasks.len(),
                    "completed": snapshot.completed_count()
                })
            } else {
                serde_json::Value::Null
            };
            println!(
                "{}",
                serde_json::json!({
                    "api_url": config.api_url,
                    "credentials": config.credentials_path(),
                    "logged_in": session.is_some(),
                    "username": session.as_ref().map(|s| s.username.clone()),
                    "tasks": tasks,
                    "last_error": snapshot.last_error.as_ref().map(|e| e.to_string())
                })
            );
        }
        OutputFormat::Quiet => {
            println!(
                "{}",
                session
                    .as_ref()
                    .map(|s| s.username.as_str())
                    .unwrap_or("logged-out")
            );
        }
        OutputFormat::Human => {
            println!("todo-sync Status");
            println!("================");
            println!();
            println!("Server:");
            println!("  URL: {}", config.api_url);
            println!();
            println!("Session:");
            match session {
                Some(ref s) => println!("  Logged in as {}", s.username),
                None => println!("  Not logged in"),
            }
            println!("  Credentials: {}", config.credentials_path().display());
            if loaded {
                println!();
                println!("Tasks:");
                println!("  Total: {}", snapshot.tasks.len());
                println!("  Done:  {}", snapshot.completed_count());
            } else if let Some(ref err) = snapshot.last_error {
                println!();
                println!("Tasks: unavailable ({})", err);
            }
        }
    }

    Ok(())
}
