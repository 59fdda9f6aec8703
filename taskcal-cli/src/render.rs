//! TUI rendering traits for taskcal types.
//!
//! This module provides extension traits that add colored terminal rendering
//! to taskcal-core types using owo_colors.

use owo_colors::OwoColorize;
use taskcal_core::{Category, Occurrence, Recurrence, Task};

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for Category {
    fn render(&self) -> String {
        match self {
            Category::Daily => "●".blue().to_string(),
            Category::Weekly => "●".green().to_string(),
            Category::None => "●".white().to_string(),
        }
    }
}

impl Render for Recurrence {
    fn render(&self) -> String {
        Category::from(*self).render()
    }
}

impl Render for Occurrence {
    fn render(&self) -> String {
        format!(
            "{:>7} {} {}",
            self.start.format("%H:%M"),
            self.category.render(),
            self.title
        )
    }
}

impl Render for Task {
    fn render(&self) -> String {
        let status = if self.completed {
            "done".green().to_string()
        } else {
            "open".yellow().to_string()
        };

        format!(
            "{:>4}  {}  {}  {}  {} {:<7} {}",
            self.id,
            status,
            self.due_date.format("%Y-%m-%d"),
            self.time,
            self.recurrence.render(),
            self.recurrence.as_str(),
            self.title
        )
    }
}

/// Color key for the calendar view.
pub fn legend() -> String {
    format!(
        "{} Daily task   {} Weekly task   {} One-time task",
        Category::Daily.render(),
        Category::Weekly.render(),
        Category::None.render()
    )
}
