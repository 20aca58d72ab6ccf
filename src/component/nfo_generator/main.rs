//! NFO 產生器主模組
//!
//! 詢問劇集資訊後為資料夾中的影片產生 tvshow.nfo 與單集 NFO

use super::nfo_builder::{NfoOptions, NfoResult, collect_episode_titles, generate};
use super::nfo_document::TvShowInfo;
use super::plot_writer::{ChatPlotWriter, PlotWriter};
use crate::config::Config;
use crate::config::save::save_settings;
use crate::tools::prompt_directory;
use anyhow::Result;
use console::style;
use dialoguer::{Confirm, Input};
use indicatif::{ProgressBar, ProgressStyle};
use log::warn;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

pub struct NfoGenerator<'a> {
    config: &'a mut Config,
    shutdown_signal: Arc<AtomicBool>,
}

impl<'a> NfoGenerator<'a> {
    pub fn new(config: &'a mut Config, shutdown_signal: Arc<AtomicBool>) -> Self {
        Self {
            config,
            shutdown_signal,
        }
    }

    pub fn run(&mut self) -> Result<()> {
        println!("{}", style("=== NFO 檔案產生器 ===").cyan().bold());

        let Some(folder) = prompt_directory(&mut self.config.settings, "請選擇影片資料夾")? else {
            return Ok(());
        };

        let existing = self.load_existing_show(&folder)?;
        let show = self.prompt_show(&folder, existing)?;
        let options = self.prompt_options()?;

        let use_ai = Confirm::new()
            .with_prompt("使用 AI 為每集產生簡介？")
            .default(self.config.settings.nfo.use_ai)
            .interact()?;

        let writer = if use_ai {
            match ChatPlotWriter::from_settings(&self.config.settings.ai) {
                Ok(writer) => Some(writer),
                Err(e) => {
                    println!("{} {e:#}", style("AI 功能無法使用:").red());
                    return Ok(());
                }
            }
        } else {
            None
        };

        self.remember_defaults(&show, &options, use_ai);

        let progress_bar = ProgressBar::new(0);
        progress_bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .expect("Invalid progress bar template")
                .progress_chars("#>-"),
        );

        let result = generate(
            &folder,
            &show,
            &options,
            &self.config.media_types,
            writer.as_ref().map(|w| w as &dyn PlotWriter),
            &self.shutdown_signal,
            &progress_bar,
        );
        progress_bar.finish_and_clear();

        Self::display_summary(&result?);
        Ok(())
    }

    fn load_existing_show(&self, folder: &Path) -> Result<Option<TvShowInfo>> {
        let show = match TvShowInfo::load_from_folder(folder) {
            Ok(Some(show)) => show,
            Ok(None) => return Ok(None),
            Err(e) => {
                warn!("tvshow.nfo 讀取失敗: {e:#}");
                println!("{} {e:#}", style("警告:").yellow());
                return Ok(None);
            }
        };

        println!(
            "{}",
            style(format!("找到 tvshow.nfo：{} ({})", show.title, show.year)).green()
        );
        let use_existing = Confirm::new()
            .with_prompt("載入現有 tvshow.nfo 的資訊？")
            .default(true)
            .interact()?;

        Ok(use_existing.then_some(show))
    }

    /// 以各集標題請 AI 擬一段劇集簡介，失敗時顯示原因並回傳 None
    fn suggest_show_plot(&self, folder: &Path, show_title: &str) -> Option<String> {
        let settings = &self.config.settings;
        let suggestion = ChatPlotWriter::from_settings(&settings.ai).and_then(|writer| {
            let episodes =
                collect_episode_titles(folder, &self.config.media_types, settings.nfo.first_episode)?;
            println!("{}", style(format!("依 {} 集標題產生簡介中...", episodes.len())).dim());
            writer.write_show_plot(show_title, &episodes)
        });

        match suggestion {
            Ok(plot) => {
                println!("{} {plot}", style("AI 簡介:").green());
                Some(plot)
            }
            Err(e) => {
                warn!("AI 劇集簡介產生失敗: {e:#}");
                println!("{} {e:#}", style("AI 簡介產生失敗:").red());
                None
            }
        }
    }

    fn prompt_show(&self, folder: &Path, existing: Option<TvShowInfo>) -> Result<TvShowInfo> {
        let defaults = &self.config.settings.nfo;
        let base = existing.unwrap_or_else(|| TvShowInfo {
            year: defaults.year,
            genre: defaults.genre.clone(),
            studio: defaults.studio.clone(),
            ..TvShowInfo::default()
        });

        let title: String = Input::new()
            .with_prompt("電視劇名稱")
            .with_initial_text(&base.title)
            .interact_text()?;
        let original_title: String = Input::new()
            .with_prompt("電視劇原名（可選）")
            .with_initial_text(&base.original_title)
            .allow_empty(true)
            .interact_text()?;
        let ai_plot = Confirm::new()
            .with_prompt("用 AI 依各集標題產生劇集簡介？")
            .default(false)
            .interact()?;
        let initial_plot = if ai_plot {
            self.suggest_show_plot(folder, &title)
                .unwrap_or_else(|| base.plot.clone())
        } else {
            base.plot.clone()
        };
        let plot: String = Input::new()
            .with_prompt("劇情簡介")
            .with_initial_text(&initial_plot)
            .allow_empty(true)
            .interact_text()?;
        let year: u32 = Input::new()
            .with_prompt("年份")
            .default(base.year)
            .validate_with(|y: &u32| -> Result<(), &'static str> {
                if (1900..=2100).contains(y) {
                    Ok(())
                } else {
                    Err("年份必須介於 1900 到 2100 之間")
                }
            })
            .interact_text()?;
        let genre: String = Input::new()
            .with_prompt("類型")
            .with_initial_text(&base.genre)
            .allow_empty(true)
            .interact_text()?;
        let studio: String = Input::new()
            .with_prompt("製作公司")
            .with_initial_text(&base.studio)
            .allow_empty(true)
            .interact_text()?;

        Ok(TvShowInfo {
            title,
            original_title,
            plot,
            year,
            genre,
            studio,
        })
    }

    fn prompt_options(&self) -> Result<NfoOptions> {
        let defaults = &self.config.settings.nfo;
        let in_range = |v: &u32| -> Result<(), &'static str> {
            if (1..=100).contains(v) {
                Ok(())
            } else {
                Err("必須介於 1 到 100 之間")
            }
        };

        let season: u32 = Input::new()
            .with_prompt("季數")
            .default(defaults.season)
            .validate_with(in_range)
            .interact_text()?;
        let first_episode: u32 = Input::new()
            .with_prompt("起始集數（檔名沒有集數時使用）")
            .default(defaults.first_episode)
            .validate_with(in_range)
            .interact_text()?;
        let regenerate_all = Confirm::new()
            .with_prompt("已有 NFO 的影片也重新產生？")
            .default(defaults.regenerate_all)
            .interact()?;

        Ok(NfoOptions {
            season,
            first_episode,
            regenerate_all,
        })
    }

    fn remember_defaults(&mut self, show: &TvShowInfo, options: &NfoOptions, use_ai: bool) {
        let nfo = &mut self.config.settings.nfo;
        nfo.genre.clone_from(&show.genre);
        nfo.studio.clone_from(&show.studio);
        nfo.year = show.year;
        nfo.season = options.season;
        nfo.first_episode = options.first_episode;
        nfo.regenerate_all = options.regenerate_all;
        nfo.use_ai = use_ai;

        if let Err(e) = save_settings(&self.config.settings) {
            warn!("無法儲存 NFO 預設值: {e}");
        }
    }

    fn display_summary(result: &NfoResult) {
        println!();
        if result.cancelled {
            println!("{}", style("操作已中斷").yellow());
        }
        println!("{}", style("=== NFO 產生完成 ===").cyan().bold());
        println!(
            "  產生: {} 個（另含 tvshow.nfo）",
            style(result.generated).green()
        );
        println!("  略過（已存在）: {}", style(result.skipped).dim());

        for warning in &result.warnings {
            println!("  {}", style(warning).yellow());
        }
        if !result.errors.is_empty() {
            println!("  錯誤: {}", style(result.errors.len()).red());
            for error in &result.errors {
                println!("    {}", style(error).red());
            }
        }
    }
}
