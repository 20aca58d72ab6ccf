use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::path::Path;
use std::process::Command;

/// 媒體檔資訊，純音訊檔沒有畫面相關欄位
#[derive(Debug, Clone, PartialEq)]
pub struct MediaInfo {
    pub duration_seconds: f64,
    pub frame_rate: Option<f64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Deserialize)]
struct FfprobeOutput {
    format: Option<FormatInfo>,
    streams: Option<Vec<StreamInfo>>,
}

#[derive(Deserialize)]
struct FormatInfo {
    duration: Option<String>,
}

#[derive(Deserialize)]
struct StreamInfo {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    duration: Option<String>,
}

/// 使用 ffprobe 取得媒體資訊
pub fn probe_media(path: &Path) -> Result<MediaInfo> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .output()
        .with_context(|| format!("無法執行 ffprobe: {}", path.display()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("ffprobe 執行失敗: {stderr}");
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_probe_output(&stdout).with_context(|| format!("無法解析媒體資訊: {}", path.display()))
}

fn parse_probe_output(json: &str) -> Result<MediaInfo> {
    let probe: FfprobeOutput = serde_json::from_str(json).context("無法解析 ffprobe 輸出")?;
    let streams = probe.streams.unwrap_or_default();

    let video_stream = streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"));

    // 取得長度（優先從 format，其次從任一串流）
    let duration_seconds = probe
        .format
        .as_ref()
        .and_then(|f| f.duration.as_deref())
        .and_then(|d| d.parse::<f64>().ok())
        .or_else(|| {
            streams
                .iter()
                .filter_map(|s| s.duration.as_deref())
                .find_map(|d| d.parse::<f64>().ok())
        })
        .ok_or_else(|| anyhow!("無法取得媒體長度"))?;

    Ok(MediaInfo {
        duration_seconds,
        frame_rate: video_stream
            .and_then(|s| s.r_frame_rate.as_deref())
            .and_then(parse_frame_rate),
        width: video_stream.and_then(|s| s.width),
        height: video_stream.and_then(|s| s.height),
    })
}

/// 解析幀率字串（例如 "30/1" 或 "30000/1001"）
fn parse_frame_rate(rate: &str) -> Option<f64> {
    if let Some((num_str, den_str)) = rate.split_once('/') {
        let num: f64 = num_str.parse().ok()?;
        let den: f64 = den_str.parse().ok()?;
        if den > 0.0 {
            return Some(num / den);
        }
        return None;
    }
    rate.parse().ok()
}
