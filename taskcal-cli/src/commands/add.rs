use anyhow::Result;
use chrono::{Local, NaiveDate};
use dialoguer::Input;
use owo_colors::OwoColorize;
use taskcal_core::{Recurrence, TaskDraft, TaskTime};

use crate::client::Client;
use crate::render::Render;

pub async fn run(
    client: &Client,
    title: Option<String>,
    date: Option<NaiveDate>,
    time: Option<String>,
    recurrence: Recurrence,
) -> Result<()> {
    let interactive = title.is_none() || time.is_none();

    let title = match title {
        Some(t) => t,
        None => Input::<String>::new()
            .with_prompt("  Title")
            .interact_text()?,
    };

    let time = match time {
        Some(t) => t,
        None => prompt_time()?,
    };

    let due_date = date.unwrap_or_else(|| Local::now().date_naive());

    let draft = TaskDraft {
        title,
        due_date: due_date.format("%Y-%m-%d").to_string(),
        time,
        recurrence: Some(recurrence.as_str().to_string()),
    };
    // Reject locally before the round trip; the server checks again.
    draft.validate()?;

    let task = client.create_task(&draft).await?;

    if interactive {
        println!();
    }
    println!(
        "{} {}",
        task.recurrence.render(),
        format!(
            "  Added #{}: {} on {} at {}",
            task.id, task.title, task.due_date, task.time
        )
        .green()
    );

    Ok(())
}

/// Prompt for an HH:MM time until one parses.
fn prompt_time() -> Result<String> {
    loop {
        let input: String = Input::new().with_prompt("  At what time? (HH:MM)").interact_text()?;
        match input.trim().parse::<TaskTime>() {
            Ok(time) => return Ok(time.to_string()),
            Err(e) => eprintln!("  {}", e.to_string().red()),
        }
    }
}
