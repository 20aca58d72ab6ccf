use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

/// 最近使用路徑的保留數量
pub const MAX_RECENT_PATHS: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaTypeTable {
    #[serde(rename = "VIDEO_FILE")]
    pub video_file: Vec<String>,
    #[serde(rename = "AUDIO_FILE")]
    pub audio_file: Vec<String>,
    #[serde(rename = "SUBTITLE_FILE")]
    pub subtitle_file: Vec<String>,
    #[serde(rename = "MARKDOWN_FILE")]
    pub markdown_file: Vec<String>,
}

impl MediaTypeTable {
    fn extensions_set(extensions: &[String]) -> HashSet<String> {
        extensions.iter().map(|ext| ext.to_lowercase()).collect()
    }

    fn matches(extensions: &[String], path: &Path) -> bool {
        let set = Self::extensions_set(extensions);
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| set.contains(&format!(".{}", ext.to_lowercase())))
    }

    #[must_use]
    pub fn is_video_file(&self, path: &Path) -> bool {
        Self::matches(&self.video_file, path)
    }

    #[must_use]
    pub fn is_audio_file(&self, path: &Path) -> bool {
        Self::matches(&self.audio_file, path)
    }

    #[must_use]
    pub fn is_subtitle_file(&self, path: &Path) -> bool {
        Self::matches(&self.subtitle_file, path)
    }

    #[must_use]
    pub fn is_markdown_file(&self, path: &Path) -> bool {
        Self::matches(&self.markdown_file, path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Language {
    #[default]
    #[serde(rename = "en-US")]
    EnUs,
    #[serde(rename = "zh-TW")]
    ZhTw,
    #[serde(rename = "zh-CN")]
    ZhCn,
}

impl Language {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::EnUs => "en-US",
            Self::ZhTw => "zh-TW",
            Self::ZhCn => "zh-CN",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::EnUs => "English",
            Self::ZhTw => "繁體中文",
            Self::ZhCn => "简体中文",
        };
        write!(f, "{name}")
    }
}

/// 批次重新命名的預設參數
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenameSettings {
    pub prefix: String,
    pub suffix: String,
    /// 要從原檔名中刪除的字元集合
    pub remove_chars: String,
    /// 正則表達式，空字串代表不套用
    pub regex_pattern: String,
    pub regex_replacement: String,
    pub regex_case_sensitive: bool,
    /// 序號佔位字元
    pub number_placeholder: char,
    /// 序號補零長度
    pub number_width: usize,
    pub start_number: u64,
    pub step: u64,
    pub keep_extension: bool,
}

impl Default for RenameSettings {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            suffix: String::new(),
            remove_chars: String::new(),
            regex_pattern: String::new(),
            regex_replacement: String::new(),
            regex_case_sensitive: true,
            number_placeholder: '@',
            number_width: 2,
            start_number: 1,
            step: 1,
            keep_extension: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlattenSettings {
    /// 扁平化輸出資料夾名稱（建立在根目錄之下）
    pub output_dir_name: String,
}

impl Default for FlattenSettings {
    fn default() -> Self {
        Self {
            output_dir_name: "flatten".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NfoSettings {
    pub genre: String,
    pub studio: String,
    pub season: u32,
    pub first_episode: u32,
    pub year: u32,
    /// 已存在的單集 NFO 也重新產生
    pub regenerate_all: bool,
    /// 使用 AI 為每集產生簡介
    pub use_ai: bool,
}

impl Default for NfoSettings {
    fn default() -> Self {
        Self {
            genre: "学习".to_string(),
            studio: "lang".to_string(),
            season: 1,
            first_episode: 1,
            year: 2023,
            regenerate_all: false,
            use_ai: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiSettings {
    /// OpenAI 相容 API 的 base URL
    pub base_url: String,
    pub model: String,
    /// 直接寫在設定檔中的 API Key（優先）
    pub api_key: Option<String>,
    /// 未設定 `api_key` 時讀取的環境變數名稱
    pub api_key_env: String,
    pub temperature: f32,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            base_url: "https://dashscope.aliyuncs.com/compatible-mode/v1".to_string(),
            model: "qwen3-235b-a22b".to_string(),
            api_key: None,
            api_key_env: "DASHSCOPE_API_KEY".to_string(),
            temperature: 0.7,
        }
    }
}

impl AiSettings {
    /// 取得 API Key：設定檔優先，其次是環境變數
    #[must_use]
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|key| !key.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaSettings {
    pub video_output_format: String,
    pub audio_output_format: String,
    pub mux_output_format: String,
    /// 合併音訊時套用 loudnorm 音量標準化
    pub normalize_audio: bool,
}

impl Default for MediaSettings {
    fn default() -> Self {
        Self {
            video_output_format: "mp4".to_string(),
            audio_output_format: "mp3".to_string(),
            mux_output_format: "mkv".to_string(),
            normalize_audio: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkdownSettings {
    pub cjk_main_font: String,
    pub main_font: String,
    pub mono_font: String,
    /// xelatex 所在目錄，會加到 PATH 最前面
    pub pdf_engine_dir: Option<String>,
    pub index_prefix: String,
    pub index_exclude: String,
    pub index_title: String,
    pub index_file_name: String,
}

impl Default for MarkdownSettings {
    fn default() -> Self {
        Self {
            cjk_main_font: "Microsoft YaHei UI".to_string(),
            main_font: "Times New Roman".to_string(),
            mono_font: "Consolas".to_string(),
            pdf_engine_dir: None,
            index_prefix: "L".to_string(),
            index_exclude: "L0000_模板.html".to_string(),
            index_title: "LeetCode 题解目录".to_string(),
            index_file_name: "leetcode.md".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    pub language: Language,
    pub recent_paths: Vec<String>,
    pub rename: RenameSettings,
    pub flatten: FlattenSettings,
    pub nfo: NfoSettings,
    pub ai: AiSettings,
    pub media: MediaSettings,
    pub markdown: MarkdownSettings,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub media_types: MediaTypeTable,
    pub settings: UserSettings,
}
