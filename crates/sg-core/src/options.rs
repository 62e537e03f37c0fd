//! Subsystem configuration
//!
//! Read either from an rc-style text file or from JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::ROOM_GRAPH_PRIORITY;

/// Options of the room graph subsystem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtmosOptions {
    /// Scheduling priority reported to the host
    pub priority: i32,
    /// Resolve space cells through the registry to reach docked grids.
    /// When off, every space cell counts as vacuum.
    pub cross_grid_links: bool,
    /// Log how long the initial scan took
    pub report_init_timing: bool,
}

impl Default for AtmosOptions {
    fn default() -> Self {
        Self {
            priority: ROOM_GRAPH_PRIORITY,
            cross_grid_links: true,
            report_init_timing: true,
        }
    }
}

#[derive(Error, Debug)]
pub enum OptionsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unknown option: {0}")]
    UnknownOption(String),

    #[error("Invalid value '{value}' for option '{option}'")]
    InvalidValue { option: String, value: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AtmosOptions {
    /// Load options from a file; `.json` files are read as JSON
    pub fn load_from_file(path: &Path) -> Result<Self, OptionsError> {
        let contents = std::fs::read_to_string(path)?;
        if path.extension().is_some_and(|ext| ext == "json") {
            Self::from_json(&contents)
        } else {
            Self::parse_config(&contents)
        }
    }

    pub fn from_json(contents: &str) -> Result<Self, OptionsError> {
        Ok(serde_json::from_str(contents)?)
    }

    /// Parse `OPTIONS=` lines.
    ///
    /// ```text
    /// # comment
    /// OPTIONS=!cross_grid_links,priority:50
    /// ```
    pub fn parse_config(contents: &str) -> Result<Self, OptionsError> {
        let mut options = Self::default();

        for (number, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some(opts) = line.strip_prefix("OPTIONS=") else {
                return Err(OptionsError::Parse(format!(
                    "line {}: expected OPTIONS=, got '{}'",
                    number + 1,
                    line
                )));
            };
            for opt in opts.split(',').map(str::trim).filter(|opt| !opt.is_empty()) {
                options.parse_option(opt)?;
            }
        }

        Ok(options)
    }

    fn parse_option(&mut self, opt: &str) -> Result<(), OptionsError> {
        if let Some((key, value)) = opt.split_once(':').or_else(|| opt.split_once('=')) {
            return self.set_option(key.trim(), value.trim());
        }

        let (negated, name) = if let Some(name) = opt.strip_prefix('!') {
            (true, name)
        } else if let Some(name) = opt.strip_prefix("no") {
            (true, name)
        } else {
            (false, opt)
        };
        self.set_bool_option(name, !negated)
    }

    fn set_bool_option(&mut self, name: &str, value: bool) -> Result<(), OptionsError> {
        match name {
            "cross_grid_links" => self.cross_grid_links = value,
            "report_init_timing" => self.report_init_timing = value,
            _ => return Err(OptionsError::UnknownOption(name.to_string())),
        }
        Ok(())
    }

    fn set_option(&mut self, key: &str, value: &str) -> Result<(), OptionsError> {
        let invalid = || OptionsError::InvalidValue {
            option: key.to_string(),
            value: value.to_string(),
        };
        match key {
            "priority" => self.priority = value.parse().map_err(|_| invalid())?,
            "cross_grid_links" | "report_init_timing" => {
                let flag = match value {
                    "true" | "on" | "yes" => true,
                    "false" | "off" | "no" => false,
                    _ => return Err(invalid()),
                };
                self.set_bool_option(key, flag)?;
            }
            _ => return Err(OptionsError::UnknownOption(key.to_string())),
        }
        Ok(())
    }
}
