//! Board-level settings shared by the day views and drag handling.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::day_window::parse_timezone;
use crate::error::{DispatchError, Result};
use crate::snap::SnapConfig;

/// Settings for one scheduling board.
///
/// Missing fields fall back to [`BoardConfig::default`]: UTC days, a 15-minute
/// grid, 80 px per hour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// IANA zone used for day boundaries.
    pub timezone: String,
    pub snap: SnapConfig,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_string(),
            snap: SnapConfig::default(),
        }
    }
}

impl BoardConfig {
    /// Parse and validate a JSON config document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: BoardConfig =
            serde_json::from_str(json).map_err(|e| DispatchError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.tz()?;
        self.snap.validate()
    }

    pub fn tz(&self) -> Result<Tz> {
        parse_timezone(&self.timezone)
    }
}
