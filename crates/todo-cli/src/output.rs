//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use todo_core::{Session, Task, User};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    pub fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    /// Print a single task
    pub fn print_task(&self, task: &Task) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:          {}", task.id);
                println!("Title:       {}", task.title);
                if let Some(ref desc) = task.description {
                    println!("Description: {}", desc);
                }
                println!(
                    "Status:      {}",
                    if task.completed { "done" } else { "open" }
                );
                println!("Created:     {}", task.created_at.format("%Y-%m-%d %H:%M"));
                if let Some(updated) = task.updated_at {
                    println!("Updated:     {}", updated.format("%Y-%m-%d %H:%M"));
                }
            }
            OutputFormat::Json => {
                println!("{}", to_json(task));
            }
            OutputFormat::Quiet => {
                println!("{}", task.id);
            }
        }
    }

    /// Print a list of tasks
    pub fn print_tasks(&self, tasks: &[Task]) {
        match self.format {
            OutputFormat::Human => {
                if tasks.is_empty() {
                    println!("No tasks yet. Create your first one with `todo add <title>`.");
                    return;
                }
                for task in tasks {
                    println!(
                        "{:>5} [{}] {}{}",
                        task.id,
                        if task.completed { "x" } else { " " },
                        truncate(&task.title, 50),
                        task.description
                            .as_deref()
                            .map(|d| format!(" - {}", truncate_line(d, 30)))
                            .unwrap_or_default()
                    );
                }
                let done = tasks.iter().filter(|t| t.completed).count();
                println!("\n{} task(s), {} done", tasks.len(), done);
            }
            OutputFormat::Json => {
                println!("{}", to_json(tasks));
            }
            OutputFormat::Quiet => {
                for task in tasks {
                    println!("{}", task.id);
                }
            }
        }
    }

    /// Print a registered user
    pub fn print_user(&self, user: &User) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:       {}", user.id);
                println!("Username: {}", user.username);
                if let Some(ref email) = user.email {
                    println!("Email:    {}", email);
                }
            }
            OutputFormat::Json => {
                println!("{}", to_json(user));
            }
            OutputFormat::Quiet => {
                println!("{}", user.username);
            }
        }
    }

    /// Print the active session (never the token)
    pub fn print_session(&self, session: &Session) {
        match self.format {
            OutputFormat::Human => {
                println!("Logged in as {} (user {})", session.username, session.user_id);
            }
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({
                        "user_id": session.user_id,
                        "username": session.username
                    })
                );
            }
            OutputFormat::Quiet => {
                println!("{}", session.username);
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Truncate to first line and max length
fn truncate_line(s: &str, max_len: usize) -> String {
    let first_line = s.lines().next().unwrap_or("");
    truncate(first_line, max_len)
}
