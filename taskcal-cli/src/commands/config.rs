use anyhow::Result;
use owo_colors::OwoColorize;
use taskcal_core::config::TaskcalConfig;

/// Settings changed with `taskcal config --...`
#[derive(Debug, Default)]
pub struct ConfigUpdate {
    pub server_url: Option<String>,
    pub daily_horizon_days: Option<u32>,
    pub weekly_horizon_weeks: Option<u32>,
}

impl ConfigUpdate {
    fn apply(self, config: &mut TaskcalConfig) -> bool {
        let mut changed = false;
        if let Some(url) = self.server_url {
            config.server_url = url;
            changed = true;
        }
        if let Some(days) = self.daily_horizon_days {
            config.daily_horizon_days = days;
            changed = true;
        }
        if let Some(weeks) = self.weekly_horizon_weeks {
            config.weekly_horizon_weeks = weeks;
            changed = true;
        }
        changed
    }
}

pub fn run(mut config: TaskcalConfig, update: ConfigUpdate) -> Result<()> {
    let config_path = TaskcalConfig::config_path()?;

    if update.apply(&mut config) {
        config.validate()?;
        config.save(&config_path)?;
        println!("{}", "  Saved".green());
        println!();
    }

    println!("{}", "Paths".bold());
    println!("  Config:    {}", config_path.display());
    println!("  Database:  {}", config.database_path().display());
    println!();
    println!("{}", "Settings".bold());
    println!("  server_url:            {}", config.server_url);
    println!("  bind:                  {}", config.bind);
    println!("  daily_horizon_days:    {}", config.daily_horizon_days);
    println!("  weekly_horizon_weeks:  {}", config.weekly_horizon_weeks);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_only_touches_given_keys() {
        let mut config = TaskcalConfig::default();
        let update = ConfigUpdate {
            daily_horizon_days: Some(14),
            ..ConfigUpdate::default()
        };

        assert!(update.apply(&mut config));
        assert_eq!(config.daily_horizon_days, 14);
        assert_eq!(config.weekly_horizon_weeks, 8);
        assert_eq!(config.server_url, TaskcalConfig::default().server_url);
    }

    #[test]
    fn empty_update_changes_nothing() {
        let mut config = TaskcalConfig::default();

        assert!(!ConfigUpdate::default().apply(&mut config));
        assert_eq!(config, TaskcalConfig::default());
    }

    #[test]
    fn out_of_range_update_does_not_validate() {
        let mut config = TaskcalConfig::default();
        let update = ConfigUpdate {
            weekly_horizon_weeks: Some(100_000),
            ..ConfigUpdate::default()
        };

        assert!(update.apply(&mut config));
        assert!(config.validate().is_err());
    }
}
