//! Differential cache: decides when the wiki has to be scraped again.
//!
//! Every tracked key is `unknown`, `fresh` or `stale`. Time makes a key stale
//! once its expiration elapses; a change in a list's item count makes the
//! matching `<list>_check_timestamp` stale immediately. The backing file is
//! loaded and written once per operation, never held open across a run.

use crate::store::{CacheFile, load_cache_file, save_cache_file};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const GLOBAL_CHECK_TIMESTAMP: &str = "global_check_timestamp";

pub fn check_timestamp_key(list_key: &str) -> String {
    format!("{list_key}_check_timestamp")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Freshness {
    Unknown,
    Fresh,
    Stale,
}

#[derive(Debug, Clone)]
pub struct Cache {
    path: PathBuf,
}

impl Cache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_refresh_needed(&self, name: &str, expiration_hours: f64) -> Result<bool> {
        self.is_refresh_needed_at(name, expiration_hours, Utc::now())
    }

    /// Unknown and corrupt keys are initialised to epoch zero and reported stale.
    pub fn is_refresh_needed_at(
        &self,
        name: &str,
        expiration_hours: f64,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let mut file = load_cache_file(&self.path)?;
        let Some(checked) = self.read_timestamp(&file, name) else {
            file.entries.insert(name.to_string(), Value::from(0.0));
            save_cache_file(&self.path, &file)?;
            debug!(key = name, "no usable check timestamp; treating as stale");
            return Ok(true);
        };

        Ok(is_expired(checked, expiration_hours, now))
    }

    pub fn freshness_at(
        &self,
        name: &str,
        expiration_hours: f64,
        now: DateTime<Utc>,
    ) -> Result<Freshness> {
        let file = load_cache_file(&self.path)?;
        Ok(match self.read_timestamp(&file, name) {
            None => Freshness::Unknown,
            Some(checked) if is_expired(checked, expiration_hours, now) => Freshness::Stale,
            Some(_) => Freshness::Fresh,
        })
    }

    pub fn set_checked_timestamp(&self, name: &str, force_refresh: bool) -> Result<()> {
        self.set_checked_timestamp_at(name, force_refresh, Utc::now())
    }

    /// `force_refresh` stores zero so the next check is stale whatever the clock says.
    pub fn set_checked_timestamp_at(
        &self,
        name: &str,
        force_refresh: bool,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let mut file = load_cache_file(&self.path)?;
        let value = if force_refresh { 0.0 } else { epoch_seconds(now) };
        file.entries.insert(name.to_string(), Value::from(value));
        save_cache_file(&self.path, &file)
    }

    /// Returns true when `new_count` differs from the stored count, in which
    /// case the list's check timestamp has been reset to zero.
    pub fn check_for_differences(&self, list_key: &str, new_count: usize) -> Result<bool> {
        let mut file = load_cache_file(&self.path)?;
        let changed = apply_count_difference(&mut file, list_key, new_count);
        if changed {
            save_cache_file(&self.path, &file)?;
        }
        Ok(changed)
    }

    pub fn set_list_items(&self, list_key: &str, count: usize) -> Result<()> {
        let mut file = load_cache_file(&self.path)?;
        file.entries.insert(list_key.to_string(), Value::from(count));
        save_cache_file(&self.path, &file)
    }

    pub fn get_list_items(&self, list_key: &str) -> Result<usize> {
        let file = load_cache_file(&self.path)?;
        Ok(stored_count(&file, list_key))
    }

    /// `check_for_differences` followed by `set_list_items`, committed in a
    /// single write so the stored count and timestamp cannot disagree.
    pub fn reconcile_list_count(&self, list_key: &str, new_count: usize) -> Result<bool> {
        let mut file = load_cache_file(&self.path)?;
        let changed = apply_count_difference(&mut file, list_key, new_count);
        file.entries
            .insert(list_key.to_string(), Value::from(new_count));
        save_cache_file(&self.path, &file)?;
        Ok(changed)
    }

    pub fn reset_timestamps<S: AsRef<str>>(&self, names: &[S]) -> Result<()> {
        let mut file = load_cache_file(&self.path)?;
        for name in names {
            file.entries.insert(name.as_ref().to_string(), Value::from(0.0));
        }
        save_cache_file(&self.path, &file)?;
        info!(keys = names.len(), "check timestamps reset");
        Ok(())
    }

    pub fn entries(&self) -> Result<CacheFile> {
        load_cache_file(&self.path)
    }

    fn read_timestamp(&self, file: &CacheFile, name: &str) -> Option<f64> {
        let value = file.entries.get(name)?;
        let parsed = match value {
            Value::Number(number) => number.as_f64(),
            Value::String(text) => text.trim().parse::<f64>().ok(),
            _ => None,
        }
        .filter(|v| v.is_finite());

        if parsed.is_none() {
            warn!(
                cache = %self.path.display(),
                key = name,
                value = %value,
                "malformed check timestamp; treating as absent"
            );
        }
        parsed
    }
}

fn apply_count_difference(file: &mut CacheFile, list_key: &str, new_count: usize) -> bool {
    let previous = stored_count(file, list_key);
    if previous == new_count {
        return false;
    }

    info!(
        list = list_key,
        previous,
        current = new_count,
        "item count changed; forcing refresh"
    );
    file.entries
        .insert(check_timestamp_key(list_key), Value::from(0.0));
    true
}

fn stored_count(file: &CacheFile, list_key: &str) -> usize {
    match file.entries.get(list_key) {
        Some(Value::Number(number)) => number.as_u64().map(|v| v as usize).unwrap_or_default(),
        Some(Value::String(text)) => text.trim().parse::<usize>().unwrap_or_default(),
        _ => 0,
    }
}

fn is_expired(checked: f64, expiration_hours: f64, now: DateTime<Utc>) -> bool {
    epoch_seconds(now) >= checked + expiration_hours * 3600.0
}

fn epoch_seconds(at: DateTime<Utc>) -> f64 {
    at.timestamp_micros() as f64 / 1_000_000.0
}
