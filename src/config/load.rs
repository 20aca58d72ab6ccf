use crate::config::types::{Config, MediaTypeTable, UserSettings};
use anyhow::{Context, Result};
use log::warn;
use std::fs;
use std::path::Path;

/// 編譯時嵌入的媒體類型表（不需要外部檔案）
const MEDIA_TYPE_TABLE_JSON: &str = include_str!("../data/media_type_table.json");

pub const SETTINGS_FILE: &str = "settings.json";

impl Config {
    pub fn new() -> Result<Self> {
        let media_types = Self::load_embedded_media_type_table()?;
        let settings = match Self::load_settings(Path::new(SETTINGS_FILE)) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("設定檔讀取失敗，改用預設值: {e:#}");
                UserSettings::default()
            }
        };

        Ok(Self {
            media_types,
            settings,
        })
    }

    /// 只使用內建預設值，不讀取設定檔
    pub fn with_defaults() -> Result<Self> {
        Ok(Self {
            media_types: Self::load_embedded_media_type_table()?,
            settings: UserSettings::default(),
        })
    }

    pub fn load_settings(path: &Path) -> Result<UserSettings> {
        if !path.exists() {
            return Ok(UserSettings::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings from {}", path.display()))
    }

    fn load_embedded_media_type_table() -> Result<MediaTypeTable> {
        serde_json::from_str(MEDIA_TYPE_TABLE_JSON).context("無法解析嵌入的媒體類型設定")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_embedded_table_recognises_media() {
        let config = Config::with_defaults().unwrap();
        assert!(config.media_types.is_video_file(Path::new("/a/b/Episode.MKV")));
        assert!(config.media_types.is_audio_file(Path::new("song.flac")));
        assert!(config.media_types.is_subtitle_file(Path::new("x.srt")));
        assert!(config.media_types.is_markdown_file(Path::new("README.md")));
        assert!(!config.media_types.is_video_file(Path::new("notes.txt")));
    }

    #[test]
    fn test_load_missing_settings_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let settings = Config::load_settings(&temp_dir.path().join("nope.json")).unwrap();
        assert_eq!(settings, UserSettings::default());
    }

    #[test]
    fn test_load_invalid_settings_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(Config::load_settings(&path).is_err());
    }
}
