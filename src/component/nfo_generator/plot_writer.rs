//! 以 OpenAI 相容的 chat completion API 產生單集與劇集簡介

use crate::config::AiSettings;
use anyhow::{Context, Result, anyhow, bail};
use log::debug;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const SYSTEM_PROMPT: &str = "你是一位专业的电视剧剧情摘要助手。";
const SHOW_SYSTEM_PROMPT: &str = "请为一部电视剧生成简介，要求简介在50字以内，需概括剧集主要内容和情节发展。";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// 從檔名推斷出的一集
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EpisodeTitle {
    pub title: String,
    pub episode: u32,
}

pub trait PlotWriter {
    /// 產生單集簡介
    fn write_plot(&self, show_title: &str, show_plot: &str, episode_title: &str) -> Result<String>;

    /// 依各集標題產生整部劇的簡介
    fn write_show_plot(&self, show_title: &str, episodes: &[EpisodeTitle]) -> Result<String>;
}

#[must_use]
pub fn build_prompt(show_title: &str, show_plot: &str, episode_title: &str) -> String {
    format!(
        "请根据以下信息，为指定的一集生成一段引人入胜、简洁明了的剧情简介。\n\
         电视剧名称: {show_title}\n\
         电视剧主线剧情: {show_plot}\n\
         本集标题: {episode_title}\n\
         请只输出为 \"{episode_title}\" 这一集生成的剧情简介，不要包含“本集简介是：”或任何多余的客套话。"
    )
}

/// 劇集簡介的使用者訊息：劇名與各集標題的 JSON
pub fn build_show_prompt(show_title: &str, episodes: &[EpisodeTitle]) -> Result<String> {
    #[derive(Serialize)]
    struct ShowOutline<'a> {
        title: &'a str,
        episodes: &'a [EpisodeTitle],
    }

    serde_json::to_string(&ShowOutline {
        title: show_title,
        episodes,
    })
    .context("無法序列化劇集資訊")
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    enable_thinking: bool,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

pub struct ChatPlotWriter {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
    temperature: f32,
}

impl ChatPlotWriter {
    /// 找不到 API key 時回傳錯誤
    pub fn from_settings(settings: &AiSettings) -> Result<Self> {
        let api_key = settings.resolve_api_key().ok_or_else(|| {
            anyhow!(
                "未設定 API key，請在設定中填寫或設定環境變數 {}",
                settings.api_key_env
            )
        })?;

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("無法建立 HTTP 客戶端")?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", settings.base_url.trim_end_matches('/')),
            model: settings.model.clone(),
            api_key,
            temperature: settings.temperature,
        })
    }
}

impl ChatPlotWriter {
    fn complete(&self, system_prompt: &str, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.temperature,
            enable_thinking: false,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .context("AI 請求失敗")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            bail!("AI 服務回傳 {status}: {body}");
        }

        let parsed: ChatResponse = response.json().context("無法解析 AI 回應")?;
        extract_content(parsed)
    }
}

impl PlotWriter for ChatPlotWriter {
    fn write_plot(&self, show_title: &str, show_plot: &str, episode_title: &str) -> Result<String> {
        debug!("請求 AI 簡介: model={}, episode={episode_title}", self.model);
        self.complete(
            SYSTEM_PROMPT,
            &build_prompt(show_title, show_plot, episode_title),
        )
    }

    fn write_show_plot(&self, show_title: &str, episodes: &[EpisodeTitle]) -> Result<String> {
        if episodes.is_empty() {
            bail!("沒有可用的單集標題");
        }
        debug!(
            "請求 AI 劇集簡介: model={}, {} 集",
            self.model,
            episodes.len()
        );
        self.complete(SHOW_SYSTEM_PROMPT, &build_show_prompt(show_title, episodes)?)
    }
}

fn extract_content(response: ChatResponse) -> Result<String> {
    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .unwrap_or_default();

    if content.is_empty() {
        bail!("AI 回應沒有內容");
    }
    Ok(content)
}
