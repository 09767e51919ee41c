//! Environment config parser.
//!
//! Line format: `key=value`, recognised keys `{queue, width, height}`.

use std::fs;

use tracing::{debug, warn};

use super::EnvironmentConfig;
use crate::error::{DispatchError, DispatchResult};

const TAG: &str = "parse_env";

pub fn parse_environment(path: &str) -> DispatchResult<EnvironmentConfig> {
    debug!(target: TAG, path, "parsing environment config");

    let contents = fs::read_to_string(path).map_err(|e| DispatchError::ConfigParse {
        file: path.to_string(),
        reason: e.to_string(),
    })?;

    let mut env = EnvironmentConfig::default();
    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            warn!(target: TAG, text = line, "malformed environment line, skipping");
            continue;
        };
        match key.trim() {
            "queue" => env.queue = Some(value.trim().to_string()),
            "width" => match value.trim().parse() {
                Ok(w) => env.width = w,
                Err(_) => warn!(target: TAG, value, "invalid width, keeping default"),
            },
            "height" => match value.trim().parse() {
                Ok(h) => env.height = h,
                Err(_) => warn!(target: TAG, value, "invalid height, keeping default"),
            },
            other => warn!(target: TAG, key = other, "unrecognised environment key, ignoring"),
        }
    }

    if env.queue.is_none() {
        warn!(target: TAG, path, "'queue' not found in environment config");
    } else {
        debug!(
            target: TAG,
            queue = env.queue.as_deref(),
            width = env.width,
            height = env.height,
            "environment parsed"
        );
    }

    Ok(env)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_recognised_keys() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "queue=dispatch_requests").unwrap();
        writeln!(file, "width=100").unwrap();
        writeln!(file, "height=80").unwrap();

        let env = parse_environment(file.path().to_str().unwrap()).unwrap();
        assert_eq!(env.queue.as_deref(), Some("dispatch_requests"));
        assert_eq!(env.width, 100);
        assert_eq!(env.height, 80);
    }

    #[test]
    fn keeps_defaults_on_missing_keys() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# nothing useful here").unwrap();

        let env = parse_environment(file.path().to_str().unwrap()).unwrap();
        assert!(env.queue.is_none());
        assert_eq!(env.width, EnvironmentConfig::default().width);
    }
}
