// src/config/validate.rs

use regex::Regex;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{InotoolsError, Result};
use crate::event::{str_to_event, EventMask};
use crate::format::{validate_time_format, MAX_STRLEN};
use crate::reader::MAX_EVENTS;
use crate::types::Timeout;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = InotoolsError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        ensure_has_paths(&raw)?;
        let mask = parse_events(&raw.watch.events)?;
        validate_exclude(&raw)?;
        validate_reader(&raw)?;
        validate_format(&raw)?;

        Ok(ConfigFile {
            paths: raw.watch.paths,
            mask,
            recursive: raw.watch.recursive,
            exclude: raw.watch.exclude,
            timeout: Timeout::from(raw.reader.timeout),
            batch_size: raw.reader.batch_size,
            ignore_regex: raw.reader.ignore_regex,
            template: raw.format.template,
            time_format: raw.format.time_format,
            stats_enabled: raw.stats.enabled,
        })
    }
}

fn config_error(msg: impl Into<String>) -> InotoolsError {
    InotoolsError::ConfigError(msg.into())
}

fn ensure_has_paths(cfg: &RawConfigFile) -> Result<()> {
    if cfg.watch.paths.is_empty() {
        return Err(config_error("[watch].paths must name at least one path"));
    }
    if cfg.watch.paths.iter().any(String::is_empty) {
        return Err(config_error("[watch].paths must not contain empty paths"));
    }
    Ok(())
}

fn parse_events(events: &str) -> Result<EventMask> {
    let mask = str_to_event(events)
        .map_err(|e| config_error(format!("[watch].events is invalid: {e}")))?;
    if mask.is_empty() {
        return Err(config_error(format!(
            "[watch].events must name at least one event (got {events:?})"
        )));
    }
    Ok(mask)
}

fn validate_exclude(cfg: &RawConfigFile) -> Result<()> {
    if !cfg.watch.exclude.is_empty() && !cfg.watch.recursive {
        return Err(config_error(
            "[watch].exclude only applies when [watch].recursive = true",
        ));
    }
    Ok(())
}

fn validate_reader(cfg: &RawConfigFile) -> Result<()> {
    let batch = cfg.reader.batch_size;
    if batch == 0 || batch > MAX_EVENTS {
        return Err(config_error(format!(
            "[reader].batch_size must be between 1 and {MAX_EVENTS} (got {batch})"
        )));
    }
    if let Some(pattern) = &cfg.reader.ignore_regex {
        Regex::new(pattern)
            .map_err(|e| config_error(format!("[reader].ignore_regex is invalid: {e}")))?;
    }
    Ok(())
}

fn validate_format(cfg: &RawConfigFile) -> Result<()> {
    let template = &cfg.format.template;
    if template.is_empty() || template.len() > MAX_STRLEN {
        return Err(config_error(format!(
            "[format].template must be 1 to {MAX_STRLEN} bytes long"
        )));
    }
    if let Some(fmt) = &cfg.format.time_format {
        validate_time_format(fmt)
            .map_err(|e| config_error(format!("[format].time_format: {e}")))?;
    }
    Ok(())
}
