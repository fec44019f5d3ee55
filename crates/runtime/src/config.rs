//! Runtime configuration and its environment loader.
use std::env;
use std::path::PathBuf;

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub command_buffer_size: usize,
    pub event_buffer_size: usize,
    /// Append every published event to a log under [`Self::session_dir`].
    pub enable_persistence: bool,
    pub save_data_dir: Option<PathBuf>,
    pub session_id: Option<String>,
    /// Attempts per event log write before persistence gives up.
    pub persistence_attempts: u32,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            command_buffer_size: 32,
            event_buffer_size: 100,
            enable_persistence: false,
            save_data_dir: None,
            session_id: None,
            persistence_attempts: 5,
        }
    }
}

impl RuntimeConfig {
    pub const EVENT_LOG: &'static str = "events.log";
    pub const DEFAULT_SESSION_ID: &'static str = "default";

    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `SESSION_COMMAND_BUFFER` - Command queue size (default: 32)
    /// - `SESSION_EVENT_BUFFER` - Per-topic event capacity (default: 100)
    /// - `ENABLE_PERSISTENCE` - Persist the event log (default: false)
    /// - `SAVE_DATA_DIR` - Directory for save data (default: platform-specific)
    /// - `GAME_SESSION_ID` - Session identifier for save files (default: "default")
    /// - `PERSISTENCE_ATTEMPTS` - Attempts per event log write (default: 5)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(capacity) = read_env::<usize>("SESSION_COMMAND_BUFFER") {
            config.command_buffer_size = capacity.max(1);
        }
        if let Some(capacity) = read_env::<usize>("SESSION_EVENT_BUFFER") {
            config.event_buffer_size = capacity.max(1);
        }

        // a bare `ENABLE_PERSISTENCE=` also counts as enabled
        if let Some(enable) = read_env::<bool>("ENABLE_PERSISTENCE") {
            config.enable_persistence = enable;
        } else if env::var("ENABLE_PERSISTENCE").is_ok() {
            config.enable_persistence = true;
        }

        if let Some(attempts) = read_env::<u32>("PERSISTENCE_ATTEMPTS") {
            config.persistence_attempts = attempts.max(1);
        }

        config.save_data_dir = env::var("SAVE_DATA_DIR").ok().map(PathBuf::from);
        config.session_id = env::var("GAME_SESSION_ID").ok();
        config
    }

    /// Save data root: `SAVE_DATA_DIR`, else the platform data directory.
    pub fn data_dir(&self) -> PathBuf {
        self.save_data_dir.clone().unwrap_or_else(|| {
            directories::ProjectDirs::from("", "", "dungeon")
                .map(|dirs| dirs.data_dir().to_path_buf())
                .unwrap_or_else(|| PathBuf::from("./save_data"))
        })
    }

    /// Directory holding this session's logs.
    pub fn session_dir(&self) -> PathBuf {
        let session = self
            .session_id
            .as_deref()
            .unwrap_or(Self::DEFAULT_SESSION_ID);
        self.data_dir().join("sessions").join(session)
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_dir_nests_under_save_dir() {
        let config = RuntimeConfig {
            save_data_dir: Some(PathBuf::from("/tmp/saves")),
            session_id: Some("s7".into()),
            ..RuntimeConfig::default()
        };
        assert_eq!(config.session_dir(), PathBuf::from("/tmp/saves/sessions/s7"));

        let config = RuntimeConfig {
            session_id: None,
            ..config
        };
        assert!(config.session_dir().ends_with("sessions/default"));
    }
}
