pub mod add;
pub mod calendar;
pub mod complete;
pub mod config;
pub mod delete;
pub mod edit;
pub mod tasks;
pub mod watch;

/// Days shown by `taskcal calendar` when no end date is given
pub const DEFAULT_WINDOW_DAYS: u64 = 7;
