//! 影音合併主模組

use crate::config::Config;
use crate::config::save::save_settings;
use crate::signal::reset_shutdown_signal;
use crate::tools::{
    FfmpegCommand, TaskRunner, ensure_tools, prompt_directory, prompt_file, run_ffmpeg,
    scan_files_matching,
};
use anyhow::Result;
use console::style;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, MultiSelect, Select};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub const VIDEO_FORMATS: [&str; 2] = ["mp4", "mkv"];
pub const AUDIO_FORMATS: [&str; 5] = ["mp3", "wav", "flac", "ogg", "m4a"];

pub struct MediaMerger<'a> {
    config: &'a mut Config,
    shutdown_signal: Arc<AtomicBool>,
    runner: TaskRunner,
}

impl<'a> MediaMerger<'a> {
    pub fn new(config: &'a mut Config, shutdown_signal: Arc<AtomicBool>) -> Self {
        Self {
            config,
            shutdown_signal,
            runner: TaskRunner::new(),
        }
    }

    pub fn run(&mut self) -> Result<()> {
        ensure_tools(&["ffmpeg"])?;

        loop {
            println!();
            println!("{}", style("=== 影音合併工具 ===").cyan().bold());

            let options = [
                "合併多個影片",
                "從影片擷取音訊 (mp3)",
                "合併多個音訊",
                "封裝影片 + 音訊 / 字幕",
                "返回",
            ];

            let selection = Select::with_theme(&ColorfulTheme::default())
                .with_prompt("請選擇功能")
                .items(&options)
                .default(0)
                .interact_opt()?;

            let outcome = match selection {
                Some(0) => self.merge_videos(),
                Some(1) => self.extract_audio(),
                Some(2) => self.merge_audios(),
                Some(3) => self.mux_streams(),
                Some(4) | None => return Ok(()),
                _ => unreachable!(),
            };

            // 單一功能失敗只回報，回到本選單
            if let Err(e) = outcome {
                eprintln!("{} {e:#}", style("錯誤:").red().bold());
            }
            reset_shutdown_signal(&self.shutdown_signal);
        }
    }

    fn merge_videos(&mut self) -> Result<()> {
        let media_types = self.config.media_types.clone();
        let Some(videos) =
            self.select_files("影片", |path| media_types.is_video_file(path))?
        else {
            return Ok(());
        };

        let Some(format) = self.select_format(&VIDEO_FORMATS, "輸出格式")? else {
            return Ok(());
        };

        let command = FfmpegCommand::concat_videos(&videos, format)?;
        run_ffmpeg(&self.runner, command, "合併影片", &self.shutdown_signal)?;

        self.remember(|config| config.settings.media.video_output_format = format.to_string());
        Ok(())
    }

    fn extract_audio(&mut self) -> Result<()> {
        let media_types = self.config.media_types.clone();
        let Some(videos) =
            self.select_files("影片", |path| media_types.is_video_file(path))?
        else {
            return Ok(());
        };

        let total = videos.len();
        for (i, video) in videos.iter().enumerate() {
            if self.shutdown_signal.load(Ordering::SeqCst) {
                println!("{}", style("操作已中斷").yellow());
                break;
            }

            println!(
                "{}",
                style(format!("[{}/{total}] {}", i + 1, file_name(video))).dim()
            );
            let command = FfmpegCommand::extract_audio(video);
            let description = format!("擷取音訊: {}", file_name(video));
            if let Some(outcome) =
                run_ffmpeg(&self.runner, command, &description, &self.shutdown_signal)?
            {
                if outcome.cancelled {
                    break;
                }
            }
        }
        Ok(())
    }

    fn merge_audios(&mut self) -> Result<()> {
        let media_types = self.config.media_types.clone();
        let Some(audios) =
            self.select_files("音訊", |path| media_types.is_audio_file(path))?
        else {
            return Ok(());
        };
        if audios.len() < 2 {
            println!("{}", style("請至少選擇兩個音訊檔案").yellow());
            return Ok(());
        }

        let Some(format) = self.select_format(&AUDIO_FORMATS, "輸出格式")? else {
            return Ok(());
        };
        let normalize = Confirm::new()
            .with_prompt("套用音量標準化 (loudnorm)？")
            .default(self.config.settings.media.normalize_audio)
            .interact()?;

        let command = FfmpegCommand::concat_audios(&audios, format, normalize)?;
        run_ffmpeg(&self.runner, command, "合併音訊", &self.shutdown_signal)?;

        self.remember(|config| {
            config.settings.media.audio_output_format = format.to_string();
            config.settings.media.normalize_audio = normalize;
        });
        Ok(())
    }

    fn mux_streams(&mut self) -> Result<()> {
        let Some(video) = prompt_file("影片檔案路徑", false)? else {
            return Ok(());
        };
        if !self.config.media_types.is_video_file(&video) || !video.is_file() {
            println!("{}", style(format!("不是有效的影片檔案: {}", video.display())).yellow());
            return Ok(());
        }

        let audio = prompt_file("音訊檔案路徑（留空略過）", true)?;
        let subtitle = prompt_file("字幕檔案路徑（留空略過）", true)?;

        for path in audio.iter().chain(subtitle.iter()) {
            if !path.is_file() {
                println!("{}", style(format!("找不到檔案: {}", path.display())).yellow());
                return Ok(());
            }
        }
        if let Some(subtitle) = &subtitle {
            if !self.config.media_types.is_subtitle_file(subtitle) {
                warn!("字幕副檔名不在清單中: {}", subtitle.display());
            }
        }

        if audio.is_none() && subtitle.is_none() {
            println!(
                "{}",
                style("請確保至少選擇一個影片檔案，並搭配一個音訊或字幕檔案").yellow()
            );
            return Ok(());
        }

        let Some(format) = self.select_format(&VIDEO_FORMATS, "輸出格式")? else {
            return Ok(());
        };

        let command =
            FfmpegCommand::mux_streams(&video, audio.as_deref(), subtitle.as_deref(), format)?;
        run_ffmpeg(&self.runner, command, "封裝影音", &self.shutdown_signal)?;
        Ok(())
    }

    /// 選擇資料夾後勾選要處理的檔案，預設全選並依自然排序
    fn select_files<F>(&mut self, kind: &str, predicate: F) -> Result<Option<Vec<PathBuf>>>
    where
        F: Fn(&Path) -> bool,
    {
        let Some(folder) =
            prompt_directory(&mut self.config.settings, &format!("請選擇{kind}資料夾"))?
        else {
            return Ok(None);
        };

        let files = scan_files_matching(&folder, predicate)?;
        if files.is_empty() {
            println!("{}", style(format!("資料夾中沒有{kind}檔案")).yellow());
            return Ok(None);
        }

        let names: Vec<String> = files.iter().map(|f| file_name(f)).collect();
        let defaults = vec![true; names.len()];
        let Some(selected) = MultiSelect::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("勾選要處理的{kind}（依序處理）"))
            .items(&names)
            .defaults(&defaults)
            .interact_opt()?
        else {
            return Ok(None);
        };

        if selected.is_empty() {
            println!("{}", style("未選擇任何檔案").yellow());
            return Ok(None);
        }

        info!("選擇了 {} 個{kind}檔案", selected.len());
        Ok(Some(selected.into_iter().map(|i| files[i].clone()).collect()))
    }

    fn select_format(
        &self,
        formats: &[&'static str],
        prompt: &str,
    ) -> Result<Option<&'static str>> {
        let media = &self.config.settings.media;
        let default_index = formats
            .iter()
            .position(|f| *f == media.video_output_format || *f == media.audio_output_format)
            .unwrap_or(0);

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .items(formats)
            .default(default_index)
            .interact_opt()?;
        Ok(selection.map(|i| formats[i]))
    }

    fn remember<F>(&mut self, update: F)
    where
        F: FnOnce(&mut Config),
    {
        update(&mut *self.config);
        if let Err(e) = save_settings(&self.config.settings) {
            warn!("無法儲存影音設定: {e}");
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
