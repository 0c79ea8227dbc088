//! CLI command implementations: call the API, print the result.

use anyhow::Result;

use crate::api::{ApiClient, ClientError, Task, TaskPatch};

fn api_error(err: ClientError) -> anyhow::Error {
    match err {
        ClientError::Api { status, code, message } => {
            anyhow::anyhow!("Error ({status} {code}): {message}")
        }
        other => anyhow::anyhow!(other),
    }
}

pub fn list(client: &ApiClient, output_json: bool) -> Result<()> {
    let tasks = client.list_tasks().map_err(api_error)?;
    if output_json {
        println!("{}", serde_json::to_string_pretty(&serde_json::json!({ "tasks": tasks }))?);
    } else {
        print!("{}", render_table(&tasks));
    }
    Ok(())
}

pub fn create(
    client: &ApiClient,
    title: &str,
    description: Option<&str>,
    output_json: bool,
) -> Result<()> {
    let created = client.create_task(title, description).map_err(api_error)?;
    if output_json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "id": created.id,
                "message": created.message,
            }))?
        );
    } else {
        println!("{} (id {}).", created.message, created.id);
    }
    Ok(())
}

pub fn get(client: &ApiClient, id: i64, output_json: bool) -> Result<()> {
    let task = client.get_task(id).map_err(api_error)?;
    if output_json {
        println!("{}", serde_json::to_string_pretty(&task)?);
    } else {
        println!("ID:          {}", task.id);
        println!("Title:       {}", task.title);
        println!("Description: {}", task.description);
        println!("Completed:   {}", if task.completed { "yes" } else { "no" });
    }
    Ok(())
}

pub fn update(client: &ApiClient, id: i64, patch: &TaskPatch) -> Result<()> {
    let message = client.update_task(id, patch).map_err(api_error)?;
    println!("{message} (id {id}).");
    Ok(())
}

pub fn delete(client: &ApiClient, id: i64) -> Result<()> {
    let message = client.delete_task(id).map_err(api_error)?;
    println!("{message} (id {id}).");
    Ok(())
}

/// Check server reachability. Prints a status line either way and never
/// fails just because the server is down.
pub fn status(client: &ApiClient, server: &str) -> Result<()> {
    println!("Server:    {server}");
    match client.health() {
        Ok(()) => {
            let version = client.server_version().unwrap_or_else(|_| "unknown".to_string());
            println!("Status:    connected (taskkeeperd v{version})");
        }
        Err(e) => {
            println!("Status:    disconnected ({e})");
        }
    }
    Ok(())
}

fn render_table(tasks: &[Task]) -> String {
    if tasks.is_empty() {
        return "No tasks.\n".to_string();
    }
    let title_width = tasks
        .iter()
        .map(|t| t.title.chars().count())
        .chain(["TITLE".len()])
        .max()
        .unwrap_or(5);

    let mut out = String::new();
    out.push_str(&format!("{:<6}  {:<4}  {:<title_width$}  {}\n", "ID", "DONE", "TITLE", "DESC"));
    for task in tasks {
        out.push_str(&format!(
            "{:<6}  {:<4}  {:<title_width$}  {}\n",
            task.id,
            if task.completed { "[x]" } else { "[ ]" },
            task.title,
            task.description,
        ));
    }
    out
}
