use std::collections::HashSet;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use owo_colors::OwoColorize;
use taskcal_core::{Horizon, Occurrence, Task, materialize_with};

use crate::client::Client;
use crate::commands::DEFAULT_WINDOW_DAYS;
use crate::render::{Render, legend};
use crate::utils::dates::days_after;
use crate::utils::tui;

pub async fn run(
    client: &Client,
    horizon: &Horizon,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<()> {
    let today = Local::now().date_naive();
    let from = from.unwrap_or(today);
    let to = match to {
        Some(to) => to,
        None => days_after(from, DEFAULT_WINDOW_DAYS)?,
    };
    if to < from {
        anyhow::bail!("--to ({to}) is before --from ({from})");
    }

    let spinner = tui::create_spinner("Loading tasks");
    let tasks = client.list_tasks().await;
    spinner.finish_and_clear();

    print_calendar(&tasks?, horizon, from, to, today);
    Ok(())
}

/// Materialize `tasks` and print the occurrences in `[from, to]`, grouped by day.
pub fn print_calendar(tasks: &[Task], horizon: &Horizon, from: NaiveDate, to: NaiveDate, today: NaiveDate) {
    let completed: HashSet<i64> = tasks.iter().filter(|t| t.completed).map(|t| t.id).collect();
    let occurrences = in_window(materialize_with(tasks, horizon), from, to);

    if occurrences.is_empty() {
        println!("{}", "No tasks scheduled".dimmed());
        return;
    }

    let mut current_date: Option<NaiveDate> = None;

    for occurrence in &occurrences {
        let date = occurrence.start.date();

        if current_date != Some(date) {
            if current_date.is_some() {
                println!();
            }
            println!("{}", format_date_label(date, today).bold());
            current_date = Some(date);
        }

        let line = occurrence.render();
        if completed.contains(&occurrence.task_id) {
            println!("  {}", line.dimmed().strikethrough());
        } else {
            println!("  {}", line);
        }
    }

    println!();
    println!("{}", legend().dimmed());
}

/// Occurrences whose date falls within `[from, to]`, in chronological order.
///
/// The sort is stable, so occurrences at the same minute keep task order.
pub fn in_window(occurrences: Vec<Occurrence>, from: NaiveDate, to: NaiveDate) -> Vec<Occurrence> {
    let mut visible: Vec<Occurrence> = occurrences
        .into_iter()
        .filter(|o| (from..=to).contains(&o.start.date()))
        .collect();
    visible.sort_by_key(|o| o.start);
    visible
}

/// Format a date as a human-readable label (e.g. "Today", "Tomorrow", "Wed Feb 25")
fn format_date_label(date: NaiveDate, today: NaiveDate) -> String {
    match (date - today).num_days() {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        _ => date.format("%a %b %-d").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskcal_core::{Recurrence, TaskTime, materialize};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn task(id: i64, due: NaiveDate, hour: u32, recurrence: Recurrence) -> Task {
        Task {
            id,
            title: format!("task {id}"),
            due_date: due,
            time: TaskTime::new(hour, 0).unwrap(),
            recurrence,
            completed: false,
        }
    }

    #[test]
    fn window_keeps_inclusive_range_in_time_order() {
        let tasks = vec![
            task(1, date(2024, 6, 1), 18, Recurrence::Daily),
            task(2, date(2024, 6, 2), 7, Recurrence::None),
            task(3, date(2024, 5, 20), 12, Recurrence::Weekly),
        ];

        let visible = in_window(materialize(&tasks), date(2024, 6, 2), date(2024, 6, 3));
        let summary: Vec<(i64, NaiveDate)> =
            visible.iter().map(|o| (o.task_id, o.start.date())).collect();

        assert_eq!(
            summary,
            vec![
                (2, date(2024, 6, 2)),
                (1, date(2024, 6, 2)),
                (3, date(2024, 6, 3)),
                (1, date(2024, 6, 3)),
            ]
        );
    }

    #[test]
    fn window_outside_horizon_is_empty() {
        let tasks = vec![task(1, date(2024, 6, 1), 9, Recurrence::Daily)];

        assert!(in_window(materialize(&tasks), date(2024, 7, 1), date(2024, 7, 31)).is_empty());
    }

    #[test]
    fn date_labels() {
        let today = date(2024, 2, 25);

        assert_eq!(format_date_label(today, today), "Today");
        assert_eq!(format_date_label(date(2024, 2, 26), today), "Tomorrow");
        assert_eq!(format_date_label(date(2024, 2, 28), today), "Wed Feb 28");
    }
}
