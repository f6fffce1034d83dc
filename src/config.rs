use crate::error::{EdgarError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// バックエンドアドレスの環境変数
pub const BACKEND_ADDR_ENV: &str = "EDGAR_BACKEND_ADDR";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend_addr: Option<String>,
    pub backend_executable: Option<PathBuf>,
    pub poll_interval_ms: u64,
    pub min_query_chars: usize,
    pub default_forms: Vec<String>,
    pub output_dir: Option<PathBuf>,
    pub perform_ner: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default_config())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| EdgarError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("edgar-desk").join("config.json"))
    }

    fn default_config() -> Self {
        Self {
            backend_addr: None,
            backend_executable: None,
            poll_interval_ms: 1000, // 1秒に1回
            min_query_chars: 2,
            default_forms: vec!["10-K".into()],
            output_dir: None,
            perform_ner: false,
        }
    }

    /// 接続先アドレス（環境変数を優先）
    pub fn backend_addr(&self) -> Option<String> {
        if let Ok(addr) = std::env::var(BACKEND_ADDR_ENV) {
            if !addr.trim().is_empty() {
                return Some(addr.trim().to_string());
            }
        }

        self.backend_addr.clone()
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    /// 出力先（未設定ならデスクトップ）
    pub fn output_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.output_dir {
            return Ok(dir.clone());
        }

        dirs::desktop_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| EdgarError::Config("デスクトップフォルダが見つかりません".into()))
    }

    pub fn set_backend_addr(&mut self, addr: String) -> Result<()> {
        self.backend_addr = Some(addr);
        self.save()
    }

    pub fn set_output_dir(&mut self, dir: PathBuf) -> Result<()> {
        self.output_dir = Some(dir);
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
        assert_eq!(config.min_query_chars, 2);
        assert_eq!(config.default_forms, vec!["10-K".to_string()]);
        assert!(!config.perform_ner);
    }

    #[test]
    fn test_partial_config_file_fills_defaults() {
        let config: Config = serde_json::from_str(r#"{"poll_interval_ms": 250}"#).unwrap();
        assert_eq!(config.poll_interval(), Duration::from_millis(250));
        assert_eq!(config.min_query_chars, 2);
    }

    #[test]
    fn test_explicit_output_dir_wins() {
        let config = Config {
            output_dir: Some(PathBuf::from("/tmp/edgar")),
            ..Default::default()
        };
        assert_eq!(config.output_dir().unwrap(), PathBuf::from("/tmp/edgar"));
    }
}
