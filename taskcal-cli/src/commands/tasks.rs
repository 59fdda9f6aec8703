use anyhow::Result;
use owo_colors::OwoColorize;

use crate::client::Client;
use crate::render::Render;
use crate::utils::tui;

pub async fn run(client: &Client) -> Result<()> {
    let spinner = tui::create_spinner("Loading tasks");
    let tasks = client.list_tasks().await;
    spinner.finish_and_clear();
    let tasks = tasks?;

    if tasks.is_empty() {
        println!("{}", "No tasks yet. Add one with `taskcal add`".dimmed());
        return Ok(());
    }

    println!(
        "{}",
        format!(
            "{:>4}  {:<4}  {:<10}  {:<5}  {:<9} {}",
            "id", "", "date", "time", "repeats", "title"
        )
        .dimmed()
    );
    for task in &tasks {
        println!("{}", task.render());
    }

    Ok(())
}
