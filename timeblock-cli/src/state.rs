//! CLI state: the `~/.timeblock` home directory and the workday
//! configuration file.

use anyhow::{Context, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use timeblock_core::{DayProfile, WorkdayConfig};

pub fn timeblock_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("TIMEBLOCK_HOME") {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".timeblock"))
}

pub fn ensure_timeblock_home() -> Result<PathBuf> {
    let dir = timeblock_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_timeblock_home()?.join("config.toml"))
}

/// On-disk configuration, hour-granular the way the settings UI captures it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default = "default_timezone")]
    pub timezone: String,

    pub workday_start_hour: u32,
    pub workday_start_minute: u32,
    pub workday_end_hour: u32,
    pub lunch_start_hour: u32,
    pub lunch_end_hour: u32,
    pub weekday_max_minutes: u32,

    pub allow_weekends: bool,
    pub weekend_start_hour: u32,
    pub weekend_start_minute: u32,
    pub weekend_end_hour: u32,
    pub weekend_lunch_start_hour: u32,
    pub weekend_lunch_end_hour: u32,
    pub weekend_max_minutes: u32,
}

fn default_timezone() -> String {
    "America/Chicago".to_string()
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            workday_start_hour: 9,
            workday_start_minute: 0,
            workday_end_hour: 17,
            lunch_start_hour: 12,
            lunch_end_hour: 13,
            weekday_max_minutes: 6 * 60,
            allow_weekends: false,
            weekend_start_hour: 10,
            weekend_start_minute: 0,
            weekend_end_hour: 16,
            weekend_lunch_start_hour: 12,
            weekend_lunch_end_hour: 13,
            weekend_max_minutes: 4 * 60,
        }
    }
}

impl ConfigFile {
    pub fn to_workday(&self) -> WorkdayConfig {
        WorkdayConfig {
            weekday: DayProfile {
                start: self.workday_start_hour * 60 + self.workday_start_minute,
                end: self.workday_end_hour * 60,
                lunch_start: self.lunch_start_hour * 60,
                lunch_end: self.lunch_end_hour * 60,
                max_minutes: self.weekday_max_minutes,
            },
            weekend: DayProfile {
                start: self.weekend_start_hour * 60 + self.weekend_start_minute,
                end: self.weekend_end_hour * 60,
                lunch_start: self.weekend_lunch_start_hour * 60,
                lunch_end: self.weekend_lunch_end_hour * 60,
                max_minutes: self.weekend_max_minutes,
            },
            allow_weekends: self.allow_weekends,
        }
    }

    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid timezone: {}", self.timezone))
    }
}

pub fn load_config() -> Result<ConfigFile> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(ConfigFile::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    Ok(toml::from_str(&s).context("parse config.toml")?)
}

pub fn save_config(cfg: &ConfigFile) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    let cfg = ConfigFile::default();
    save_config(&cfg)?;
    println!("Wrote {}", p.display());
    Ok(())
}
