use clap::ValueEnum;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment};
use serde::{Deserialize, Serialize};

use crate::error::Result;

const ENV_PREFIX: &str = "NOTESPLIT";

pub const DEFAULT_OUTPUT_DIR_NAME: &str = "分割后的笔记";
pub const DEFAULT_MAX_IDENTIFIER_LEN: usize = 200;
pub const DEFAULT_EXPORT_PREFIX: &str = "日记";

/// What to do when two entries resolve to the same file name in one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Append `-2`, `-3`, ... to later entries.
    #[default]
    Suffix,
    /// Later entries replace earlier ones.
    Overwrite,
}

/// How runs of blank lines inside a note body are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BlankLinePolicy {
    #[default]
    Keep,
    /// Reduce every run of blank lines to a single blank line.
    Collapse,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    /// Directory created next to the input when no output dir is given.
    pub output_dir_name: String,
    pub max_identifier_len: usize,
    pub collision: CollisionPolicy,
    pub blank_lines: BlankLinePolicy,
    pub export_prefix: String,
    /// Date for undated notes instead of the input's modification date.
    #[serde(default)]
    pub fallback_date: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            output_dir_name: DEFAULT_OUTPUT_DIR_NAME.to_string(),
            max_identifier_len: DEFAULT_MAX_IDENTIFIER_LEN,
            collision: CollisionPolicy::default(),
            blank_lines: BlankLinePolicy::default(),
            export_prefix: DEFAULT_EXPORT_PREFIX.to_string(),
            fallback_date: None,
        }
    }
}

impl Settings {
    /// Defaults overlaid with `NOTESPLIT_*` environment variables.
    pub fn load() -> Result<Self> {
        Self::from_builder(Config::builder().add_source(Environment::with_prefix(ENV_PREFIX)))
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let settings = builder
            .set_default("output_dir_name", DEFAULT_OUTPUT_DIR_NAME)?
            .set_default("max_identifier_len", DEFAULT_MAX_IDENTIFIER_LEN as u64)?
            .set_default("collision", "suffix")?
            .set_default("blank_lines", "keep")?
            .set_default("export_prefix", DEFAULT_EXPORT_PREFIX)?
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }
}
