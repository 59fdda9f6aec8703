//! Follow the server's reminder stream and print each reminder as it arrives.

use std::time::Duration;

use anyhow::Result;
use owo_colors::OwoColorize;
use taskcal_core::Reminder;
use taskcal_core::reminder::REMINDER_EVENT;
use tracing::{debug, warn};

use crate::client::Client;
use crate::sse::{SseFrame, SseParser};

const RECONNECT_DELAY: Duration = Duration::from_secs(3);

pub async fn run(client: &Client) -> Result<()> {
    println!("{}", "Waiting for reminders (Ctrl-C to stop)".dimmed());

    loop {
        match follow(client).await {
            Ok(()) => debug!("Reminder stream closed by server"),
            Err(e) => warn!("Reminder stream interrupted: {e:#}"),
        }
        eprintln!("{}", "  Connection lost, reconnecting...".yellow());
        tokio::time::sleep(RECONNECT_DELAY).await;
    }
}

/// Read one connection until the server closes it.
async fn follow(client: &Client) -> Result<()> {
    let mut response = client.subscribe().await?;
    let mut parser = SseParser::default();

    while let Some(chunk) = response.chunk().await? {
        for frame in parser.push(&chunk) {
            if let Some(line) = reminder_line(&frame) {
                println!("{line}");
            }
        }
    }

    Ok(())
}

fn reminder_line(frame: &SseFrame) -> Option<String> {
    if frame.event.as_deref() != Some(REMINDER_EVENT) {
        return None;
    }

    match Reminder::from_json(&frame.data) {
        Ok(reminder) => Some(format!(
            "🔔 {} at {}",
            reminder.title.bold(),
            reminder.time
        )),
        Err(e) => {
            warn!("Ignoring malformed reminder: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_reminder_events_are_printed() {
        let reminder = SseFrame {
            event: Some(REMINDER_EVENT.into()),
            data: r#"{"task_id":1,"title":"Stretch","time":"09:30","due_at":"2024-06-01T09:30"}"#
                .into(),
        };
        let other = SseFrame {
            event: Some("ping".into()),
            data: "{}".into(),
        };

        let line = reminder_line(&reminder).unwrap();
        assert!(line.contains("Stretch"));
        assert!(line.ends_with("at 09:30"));
        assert!(reminder_line(&other).is_none());
    }

    #[test]
    fn malformed_reminder_is_skipped() {
        let frame = SseFrame {
            event: Some(REMINDER_EVENT.into()),
            data: "not json".into(),
        };

        assert!(reminder_line(&frame).is_none());
    }
}
