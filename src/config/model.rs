// src/config/model.rs

use serde::Deserialize;

use crate::event::EventMask;
use crate::types::Timeout;

/// Configuration as read from a TOML file.
///
/// ```toml
/// [watch]
/// paths = ["/srv/data"]
/// events = "CREATE,DELETE,MOVE"
/// recursive = true
/// exclude = ["/srv/data/cache"]
///
/// [reader]
/// timeout = 5
/// batch_size = 1
/// ignore_regex = "\\.swp$"
///
/// [format]
/// template = "%T %w%f %e"
/// time_format = "%H:%M:%S"
///
/// [stats]
/// enabled = true
/// ```
///
/// Every section is optional except that `[watch].paths` must name at least
/// one path once validated.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub watch: WatchSection,

    #[serde(default)]
    pub reader: ReaderSection,

    #[serde(default)]
    pub format: FormatSection,

    #[serde(default)]
    pub stats: StatsSection,
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WatchSection {
    #[serde(default)]
    pub paths: Vec<String>,

    /// Comma-separated event names, as accepted by `str_to_event`.
    #[serde(default = "default_events")]
    pub events: String,

    #[serde(default)]
    pub recursive: bool,

    /// Directories skipped by a recursive watch.
    #[serde(default)]
    pub exclude: Vec<String>,
}

fn default_events() -> String {
    "ALL_EVENTS".to_string()
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            events: default_events(),
            recursive: false,
            exclude: Vec::new(),
        }
    }
}

/// `[reader]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReaderSection {
    /// Seconds to wait for an event: `0` polls, negative blocks.
    #[serde(default = "default_timeout")]
    pub timeout: i64,

    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    #[serde(default)]
    pub ignore_regex: Option<String>,
}

fn default_timeout() -> i64 {
    -1
}

fn default_batch_size() -> usize {
    1
}

impl Default for ReaderSection {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            batch_size: default_batch_size(),
            ignore_regex: None,
        }
    }
}

/// `[format]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FormatSection {
    #[serde(default = "default_template")]
    pub template: String,

    #[serde(default)]
    pub time_format: Option<String>,
}

fn default_template() -> String {
    "%w %e %f".to_string()
}

impl Default for FormatSection {
    fn default() -> Self {
        Self {
            template: default_template(),
            time_format: None,
        }
    }
}

/// `[stats]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatsSection {
    #[serde(default)]
    pub enabled: bool,
}

/// Configuration that passed validation.
///
/// Built through `ConfigFile::try_from(RawConfigFile)`. `Inotools::apply_config`
/// installs the watch, filter, stats and time settings; `timeout`,
/// `batch_size` and `template` drive `Inotools::next_configured_event` and
/// `Inotools::format_configured`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub paths: Vec<String>,
    pub mask: EventMask,
    pub recursive: bool,
    pub exclude: Vec<String>,
    pub timeout: Timeout,
    pub batch_size: usize,
    pub ignore_regex: Option<String>,
    pub template: String,
    pub time_format: Option<String>,
    pub stats_enabled: bool,
}
