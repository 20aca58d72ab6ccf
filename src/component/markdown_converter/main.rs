//! Markdown 轉換主模組

use super::converter::{ConversionResult, convert_to_html, convert_to_pdf};
use super::index_builder::write_index;
use crate::config::Config;
use crate::config::save::save_settings;
use crate::tools::prompt_directory;
use anyhow::Result;
use console::style;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use log::warn;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

pub struct MarkdownConverter<'a> {
    config: &'a mut Config,
    shutdown_signal: Arc<AtomicBool>,
}

impl<'a> MarkdownConverter<'a> {
    pub fn new(config: &'a mut Config, shutdown_signal: Arc<AtomicBool>) -> Self {
        Self {
            config,
            shutdown_signal,
        }
    }

    pub fn run(&mut self) -> Result<()> {
        println!("{}", style("=== Markdown 轉換 ===").cyan().bold());

        let options = ["轉換為 HTML", "轉換為 PDF", "產生 HTML 索引頁", "返回"];
        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("請選擇操作")
            .items(&options)
            .default(0)
            .interact_opt()?;

        match selection {
            Some(0) => self.run_html(),
            Some(1) => self.run_pdf(),
            Some(2) => self.run_index(),
            _ => Ok(()),
        }
    }

    fn prompt_directories(&mut self, default_output: &str) -> Result<Option<(PathBuf, PathBuf)>> {
        let Some(input_dir) =
            prompt_directory(&mut self.config.settings, "請選擇 Markdown 所在資料夾")?
        else {
            return Ok(None);
        };

        let default_output = input_dir.join(default_output);
        let output: String = Input::new()
            .with_prompt("輸出資料夾")
            .default(default_output.to_string_lossy().to_string())
            .interact_text()?;

        Ok(Some((input_dir, PathBuf::from(output.trim()))))
    }

    fn run_html(&mut self) -> Result<()> {
        let Some((input_dir, output_dir)) = self.prompt_directories("html_output")? else {
            return Ok(());
        };

        println!("{}", style("準備樣式與腳本檔案...").dim());
        let progress = new_progress_bar();
        let result = convert_to_html(
            &input_dir,
            &output_dir,
            &self.config.media_types,
            &self.shutdown_signal,
            &progress,
        )?;
        Self::display_summary(&result, "HTML");
        Ok(())
    }

    fn run_pdf(&mut self) -> Result<()> {
        let Some((input_dir, output_dir)) = self.prompt_directories("pdf_output")? else {
            return Ok(());
        };

        let current = self.config.settings.markdown.pdf_engine_dir.clone().unwrap_or_default();
        let engine_dir: String = Input::new()
            .with_prompt("xelatex 所在目錄（留空使用 PATH）")
            .with_initial_text(&current)
            .allow_empty(true)
            .interact_text()?;
        let engine_dir = engine_dir.trim().to_string();
        let engine_dir = (!engine_dir.is_empty()).then_some(engine_dir);

        if engine_dir != self.config.settings.markdown.pdf_engine_dir {
            self.config.settings.markdown.pdf_engine_dir = engine_dir;
            if let Err(e) = save_settings(&self.config.settings) {
                warn!("無法儲存 PDF 引擎路徑: {e}");
            }
        }

        println!("{}", style("呼叫 LaTeX 引擎中，請耐心等待...").dim());
        let progress = new_progress_bar();
        let result = convert_to_pdf(
            &input_dir,
            &output_dir,
            &self.config.media_types,
            &self.config.settings.markdown,
            &self.shutdown_signal,
            &progress,
        )?;
        Self::display_summary(&result, "PDF");
        Ok(())
    }

    fn run_index(&mut self) -> Result<()> {
        let Some(directory) = prompt_directory(&mut self.config.settings, "請選擇 HTML 所在資料夾")?
        else {
            return Ok(());
        };

        match write_index(&directory, &self.config.settings.markdown)? {
            Some(result) => println!(
                "{}",
                style(format!(
                    "索引頁已產生: {}（共 {} 個連結）",
                    result.path.display(),
                    result.link_count
                ))
                .green()
            ),
            None => println!("{}", style("資料夾內沒有符合條件的 HTML 檔案").yellow()),
        }
        Ok(())
    }

    fn display_summary(result: &ConversionResult, kind: &str) {
        println!();
        if result.converted.is_empty() && result.errors.is_empty() && !result.cancelled {
            println!("{}", style("資料夾內沒有 Markdown 檔案").yellow());
            return;
        }

        println!("{}", style(format!("=== {kind} 轉換完成 ===")).cyan().bold());
        println!("  成功: {}", style(result.converted.len()).green());
        if result.cancelled {
            println!("{}", style("  部分檔案因取消而未轉換").yellow());
        }
        if !result.errors.is_empty() {
            println!("  錯誤: {}", style(result.errors.len()).red());
            for error in &result.errors {
                println!("    {}", style(error).red());
            }
        }
    }
}

fn new_progress_bar() -> ProgressBar {
    let progress_bar = ProgressBar::new(0);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .expect("Invalid progress bar template")
            .progress_chars("#>-"),
    );
    progress_bar
}
