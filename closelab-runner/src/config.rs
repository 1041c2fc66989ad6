//! Pipeline configuration loaded from TOML.
//!
//! Every section and key is optional:
//!
//! ```toml
//! [raw_input]
//! header = "absent"            # or "present"
//!
//! [top_k]
//! k = 10
//! memory_ceiling_bytes = 10485760
//! record_size_bytes = 72       # fixed per-record estimate; 0 disables the ceiling
//!
//! [month]
//! filter = "2020-06"           # run top-K on this month only
//! ```

use std::path::{Path, PathBuf};

use closelab_core::topk::{
    MemoryBudget, DEFAULT_MEMORY_CEILING_BYTES, DEFAULT_RECORD_SIZE_BYTES,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::codec::HeaderPolicy;
use crate::month::Month;

/// Errors from loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub raw_input: RawInputConfig,
    pub top_k: TopKConfig,
    pub month: MonthConfig,
}

impl PipelineConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawInputConfig {
    pub header: HeaderPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TopKConfig {
    pub k: usize,
    pub memory_ceiling_bytes: usize,
    pub record_size_bytes: usize,
}

impl Default for TopKConfig {
    fn default() -> Self {
        Self {
            k: 10,
            memory_ceiling_bytes: DEFAULT_MEMORY_CEILING_BYTES,
            record_size_bytes: DEFAULT_RECORD_SIZE_BYTES,
        }
    }
}

impl TopKConfig {
    pub fn budget(&self) -> MemoryBudget {
        MemoryBudget::new(self.memory_ceiling_bytes).with_record_size(self.record_size_bytes)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MonthConfig {
    pub filter: Option<Month>,
}
