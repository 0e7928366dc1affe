use serde::Deserialize;

use crate::error::{ConsoleError, Result};

pub const DEFAULT_CONFIG_PATH: &str = "config/console.toml";
pub const DEFAULT_CHANNEL_ADDR: &str = "127.0.0.1:5000";
pub const DEFAULT_LOG_CAPACITY: usize = 50;
pub const DEFAULT_LOG_PLACEHOLDER: &str = "Waiting for logs...";

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ConsoleConfig {
    /// 페이지가 바인딩되는 모듈 이름 (Reddit_Story_Generator 등)
    #[serde(default)]
    pub module: Option<String>,
    #[serde(default)]
    pub channel: ChannelConfig,
    #[serde(default)]
    pub logs: LogConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ChannelConfig {
    #[serde(default = "default_channel_addr")]
    pub addr: String,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct LogConfig {
    #[serde(default = "default_log_capacity")]
    pub capacity: usize,
    #[serde(default = "default_log_placeholder")]
    pub placeholder: String,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    /// 로컬 샘플러 주기 (--local 모드)
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

fn default_channel_addr() -> String {
    DEFAULT_CHANNEL_ADDR.to_string()
}

fn default_log_capacity() -> usize {
    DEFAULT_LOG_CAPACITY
}

fn default_log_placeholder() -> String {
    DEFAULT_LOG_PLACEHOLDER.to_string()
}

fn default_interval_secs() -> u64 {
    1
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self { addr: default_channel_addr() }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            capacity: default_log_capacity(),
            placeholder: default_log_placeholder(),
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self { interval_secs: default_interval_secs() }
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            module: None,
            channel: ChannelConfig::default(),
            logs: LogConfig::default(),
            monitor: MonitorConfig::default(),
        }
    }
}

impl ConsoleConfig {
    /// `LEAM_CONSOLE_CONFIG` (없으면 config/console.toml)에서 로드 후 환경변수 오버라이드 적용.
    /// 파일이 없으면 기본값을 사용합니다.
    pub fn load() -> Result<Self> {
        let path = std::env::var("LEAM_CONSOLE_CONFIG")
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut cfg = Self::load_from(&path)?;
        cfg.apply_env();
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load_from(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        let s = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No console config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };
        let cfg: Self = toml::from_str(&s)
            .map_err(|e| ConsoleError::Config(format!("{}: {}", path.display(), e)))?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn apply_env(&mut self) {
        if let Ok(module) = std::env::var("LEAM_MODULE") {
            if !module.is_empty() {
                self.module = Some(module);
            }
        }
        if let Ok(addr) = std::env::var("LEAM_CHANNEL_ADDR") {
            if !addr.is_empty() {
                self.channel.addr = addr;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.logs.capacity == 0 {
            return Err(ConsoleError::Config("logs.capacity must be greater than 0".into()));
        }
        if self.monitor.interval_secs == 0 {
            return Err(ConsoleError::Config("monitor.interval_secs must be greater than 0".into()));
        }
        Ok(())
    }

    /// 바인딩된 모듈 이름. 어디에서도 지정되지 않았으면 설정 오류.
    pub fn require_module(&self) -> Result<&str> {
        self.module
            .as_deref()
            .filter(|m| !m.is_empty())
            .ok_or_else(|| ConsoleError::Config("no module bound (set `module`, LEAM_MODULE or --module)".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_console_config_default() {
        let cfg = ConsoleConfig::default();
        assert!(cfg.module.is_none());
        assert_eq!(cfg.logs.capacity, 50);
        assert_eq!(cfg.channel.addr, "127.0.0.1:5000");
        assert!(cfg.require_module().is_err());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = ConsoleConfig::load_from(dir.path().join("nope.toml")).unwrap();
        assert_eq!(cfg, ConsoleConfig::default());
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
module = "Reddit_Story_Generator"

[logs]
capacity = 10
"#
        )
        .unwrap();

        let cfg = ConsoleConfig::load_from(file.path()).unwrap();
        assert_eq!(cfg.require_module().unwrap(), "Reddit_Story_Generator");
        assert_eq!(cfg.logs.capacity, 10);
        assert_eq!(cfg.logs.placeholder, DEFAULT_LOG_PLACEHOLDER);
        assert_eq!(cfg.monitor.interval_secs, 1);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[logs]\ncapacity = 0").unwrap();

        let err = ConsoleConfig::load_from(file.path()).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }

    #[test]
    fn test_bad_toml_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "module = [").unwrap();
        assert!(ConsoleConfig::load_from(file.path()).is_err());
    }
}
