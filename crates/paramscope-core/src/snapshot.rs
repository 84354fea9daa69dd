use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::params::ParameterSet;

/// A named parameter snapshot, serialized as TOML: one key/value per
/// parameter plus the snapshot name and save timestamp.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParamSnapshot {
    pub name: String,
    pub saved_at: String,
    pub values: BTreeMap<String, f64>,
}

impl ParamSnapshot {
    pub fn capture(name: &str, params: &ParameterSet) -> Self {
        Self {
            name: name.to_string(),
            saved_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            values: params.values().clone(),
        }
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::from_toml(&fs::read_to_string(path)?)
    }
}
