//! 影片裁切主模組

use super::crop_range::{CropRange, preview_task};
use crate::config::Config;
use crate::signal::reset_shutdown_signal;
use crate::tools::{
    FfmpegCommand, MediaInfo, TaskRunner, confirm_abort, ensure_tools, format_timestamp,
    parse_timestamp, probe_media, prompt_file, run_ffmpeg, validate_file_exists,
};
use anyhow::Result;
use console::style;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use log::{info, warn};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

pub struct MediaCropper<'a> {
    config: &'a mut Config,
    shutdown_signal: Arc<AtomicBool>,
    runner: TaskRunner,
}

impl<'a> MediaCropper<'a> {
    pub fn new(config: &'a mut Config, shutdown_signal: Arc<AtomicBool>) -> Self {
        Self {
            config,
            shutdown_signal,
            runner: TaskRunner::new(),
        }
    }

    pub fn run(&mut self) -> Result<()> {
        println!("{}", style("=== 影片片段裁切 ===").cyan().bold());
        ensure_tools(&["ffmpeg", "ffprobe"])?;

        let Some(input) = prompt_file("請輸入影片檔案路徑", false)? else {
            return Ok(());
        };
        validate_file_exists(&input)?;
        if !self.config.media_types.is_video_file(&input) {
            warn!("副檔名不在影片清單中，仍嘗試處理: {}", input.display());
        }

        println!("{}", style("讀取影片資訊中...").dim());
        let info = probe_media(&input)?;
        Self::display_info(&input, &info);

        let mut range = self.prompt_range(&info, None)?;

        loop {
            println!();
            println!(
                "{} {} → {} (長度 {})",
                style("目前區間:").cyan(),
                format_timestamp(range.start()),
                format_timestamp(range.end()),
                format_timestamp(range.length())
            );

            let options = [
                "以 mpv 預覽區間",
                "裁切影片",
                "擷取區間音訊 (mp3)",
                "重新設定區間",
                "返回",
            ];

            let selection = Select::with_theme(&ColorfulTheme::default())
                .with_prompt("請選擇操作")
                .items(&options)
                .default(0)
                .interact_opt()?;

            let outcome = match selection {
                Some(0) => self.preview(&input, &range),
                Some(1) => self.crop(&input, &range),
                Some(2) => self.extract_audio(&input, &range),
                Some(3) => {
                    range = self.prompt_range(&info, Some(range))?;
                    Ok(())
                }
                Some(4) | None => return Ok(()),
                _ => unreachable!(),
            };

            if let Err(e) = outcome {
                eprintln!("{} {e:#}", style("錯誤:").red().bold());
            }
            reset_shutdown_signal(&self.shutdown_signal);
        }
    }

    fn display_info(input: &Path, info: &MediaInfo) {
        println!("  檔案: {}", input.display());
        println!("  長度: {}", format_timestamp(info.duration_seconds));
        if let (Some(width), Some(height)) = (info.width, info.height) {
            println!("  解析度: {width}x{height}");
        }
        if let Some(fps) = info.frame_rate {
            println!("  幀率: {fps:.3}");
        }
    }

    /// 反覆詢問直到取得合法區間
    fn prompt_range(&self, info: &MediaInfo, current: Option<CropRange>) -> Result<CropRange> {
        let duration = info.duration_seconds;
        let (default_start, default_end) =
            current.map_or((0.0, duration), |r| (r.start(), r.end()));

        loop {
            let start: String = Input::new()
                .with_prompt("開始時間 (HH:MM:SS.mmm / MM:SS / 秒)")
                .default(format_timestamp(default_start))
                .interact_text()?;
            let end: String = Input::new()
                .with_prompt("結束時間")
                .default(format_timestamp(default_end))
                .interact_text()?;

            let parsed = parse_timestamp(&start)
                .and_then(|s| parse_timestamp(&end).map(|e| (s, e)))
                .and_then(|(s, e)| CropRange::new(s, e, duration));

            match parsed {
                Ok(range) => {
                    info!(
                        "裁切區間: {} - {}",
                        format_timestamp(range.start()),
                        format_timestamp(range.end())
                    );
                    return Ok(range);
                }
                Err(e) => println!("{} {e:#}", style("區間無效:").red()),
            }
        }
    }

    fn preview(&self, input: &Path, range: &CropRange) -> Result<()> {
        if let Err(e) = ensure_tools(&["mpv"]) {
            println!("{} {e}", style("無法預覽:").yellow());
            return Ok(());
        }

        println!("{}", style("關閉 mpv 視窗即可回到選單").dim());
        let outcome = self
            .runner
            .run(preview_task(input, range), &self.shutdown_signal, confirm_abort)?;
        if !outcome.success && !outcome.cancelled {
            println!("{}", style("mpv 結束時回報錯誤").yellow());
        }
        Ok(())
    }

    fn crop(&self, input: &Path, range: &CropRange) -> Result<()> {
        let (start_stamp, end_stamp) = range.stamps();
        let command = FfmpegCommand::crop_segment(
            input,
            range.start(),
            range.end(),
            (start_stamp.as_str(), end_stamp.as_str()),
        );
        run_ffmpeg(&self.runner, command, "裁切影片", &self.shutdown_signal)?;
        Ok(())
    }

    fn extract_audio(&self, input: &Path, range: &CropRange) -> Result<()> {
        let (start_stamp, end_stamp) = range.stamps();
        let command = FfmpegCommand::extract_audio_segment(
            input,
            range.start(),
            range.end(),
            (start_stamp.as_str(), end_stamp.as_str()),
        );
        run_ffmpeg(&self.runner, command, "擷取音訊", &self.shutdown_signal)?;
        Ok(())
    }
}

