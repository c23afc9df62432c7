//! Task command handlers
//!
//! Each command loads the list first so local positions and toggles reflect
//! the server's current state, then applies one operation through the
//! task list.

use anyhow::{bail, Result};

use todo_core::{TaskCreate, TaskId, TaskRemote, TaskUpdate};

use crate::app::App;
use crate::output::Output;
use crate::prompt::confirm;

/// List tasks
pub async fn list(app: &mut App, open_only: bool, output: &Output) -> Result<()> {
    app.require_login()?;
    if !app.list.load().await {
        return app.fail_with_last_error();
    }

    if open_only {
        let open: Vec<_> = app
            .list
            .tasks()
            .iter()
            .filter(|t| !t.completed)
            .cloned()
            .collect();
        output.print_tasks(&open);
    } else {
        output.print_tasks(app.list.tasks());
    }
    Ok(())
}

/// Show a single task, fetched directly from the server
pub async fn show(app: &App, id: TaskId, output: &Output) -> Result<()> {
    app.require_login()?;
    let task = app.list.remote().get(id).await?;
    output.print_task(&task);
    Ok(())
}

/// Create a task
pub async fn add(
    app: &mut App,
    title: String,
    description: Option<String>,
    done: bool,
    output: &Output,
) -> Result<()> {
    app.require_login()?;

    let mut request = TaskCreate::new(title).with_completed(done);
    if let Some(desc) = description {
        request = request.with_description(desc);
    }

    let Some(task) = app.list.create(request).await else {
        return app.fail_with_last_error();
    };

    output.success(&format!("Created task {}", task.id));
    output.print_task(&task);
    Ok(())
}

/// Edit title and/or description
pub async fn edit(
    app: &mut App,
    id: TaskId,
    title: Option<String>,
    description: Option<String>,
    output: &Output,
) -> Result<()> {
    app.require_login()?;

    let mut patch = TaskUpdate::new();
    patch.title = title;
    patch.description = description;
    if patch.is_empty() {
        bail!("Nothing to change. Pass --title and/or --description.");
    }

    let Some(task) = app.list.update(id, patch).await else {
        return app.fail_with_last_error();
    };

    output.success("Task updated");
    output.print_task(&task);
    Ok(())
}

/// Toggle completion
pub async fn toggle(app: &mut App, id: TaskId, output: &Output) -> Result<()> {
    app.require_login()?;
    if !app.list.load().await {
        return app.fail_with_last_error();
    }

    let Some(current) = app.list.get(id).cloned() else {
        bail!("Task not found: {}", id);
    };

    let Some(task) = app.list.toggle_complete(&current).await else {
        return app.fail_with_last_error();
    };

    let state = if task.completed { "done" } else { "open" };
    output.success(&format!("Task {} marked {}", task.id, state));
    Ok(())
}

/// Delete a task
pub async fn delete(app: &mut App, id: TaskId, yes: bool, output: &Output) -> Result<()> {
    app.require_login()?;
    if !app.list.load().await {
        return app.fail_with_last_error();
    }

    if !yes && output.should_prompt() {
        let title = app
            .list
            .get(id)
            .map(|t| t.title.clone())
            .unwrap_or_else(|| "(not in your list)".to_string());
        println!("Delete task: {} - {}", id, title);
        if !confirm("Are you sure you want to delete this task?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    if !app.list.delete(id).await {
        return app.fail_with_last_error();
    }

    output.success(&format!("Deleted task {}", id));
    Ok(())
}
