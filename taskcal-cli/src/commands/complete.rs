use anyhow::Result;
use owo_colors::OwoColorize;

use crate::client::Client;

pub async fn run(client: &Client, id: i64) -> Result<()> {
    let task = client.complete_task(id).await?;
    println!("{}", format!("  Completed #{}: {}", task.id, task.title).green());
    Ok(())
}
