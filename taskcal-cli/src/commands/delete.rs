use anyhow::Result;
use dialoguer::Confirm;
use owo_colors::OwoColorize;

use crate::client::Client;

pub async fn run(client: &Client, id: i64, force: bool) -> Result<()> {
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete task #{id}?"))
            .default(false)
            .interact()?;

        if !confirmed {
            return Ok(());
        }
    }

    let response = client.delete_task(id).await?;
    println!("{}", format!("  {} (#{id})", response.message).red());

    Ok(())
}
