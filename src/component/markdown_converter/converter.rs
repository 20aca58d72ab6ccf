//! Markdown 批次轉換
//!
//! 每個檔案各自呼叫一次 pandoc，以 rayon 平行處理，
//! 單一檔案失敗只記錄錯誤，不影響其他檔案

use super::asset_fetcher::ensure_assets;
use super::html_page::render_page;
use super::pandoc_command::{html_fragment_command, pdf_command};
use crate::config::{MarkdownSettings, MediaTypeTable};
use crate::tools::{ensure_tools, scan_files_matching};
use anyhow::{Context, Result, bail};
use indicatif::ProgressBar;
use log::{error, info};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Default)]
pub struct ConversionResult {
    pub converted: Vec<PathBuf>,
    pub errors: Vec<String>,
    pub cancelled: bool,
}

/// 列出資料夾第一層的 Markdown 檔
pub fn list_markdown_files(directory: &Path, media_types: &MediaTypeTable) -> Result<Vec<PathBuf>> {
    scan_files_matching(directory, |path| media_types.is_markdown_file(path))
}

fn output_path(input: &Path, output_dir: &Path, extension: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map_or_else(|| "output".to_string(), |s| s.to_string_lossy().to_string());
    output_dir.join(format!("{stem}.{extension}"))
}

fn run_pandoc(mut command: Command, input: &Path) -> Result<Vec<u8>> {
    let output = command
        .output()
        .with_context(|| format!("無法執行 pandoc: {}", input.display()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("pandoc 轉換失敗: {}", stderr.trim());
    }
    Ok(output.stdout)
}

/// 轉換單一檔案為 HTML 頁面
pub fn convert_file_to_html(input: &Path, output_dir: &Path) -> Result<PathBuf> {
    let fragment = run_pandoc(html_fragment_command(input), input)?;
    let fragment = String::from_utf8_lossy(&fragment);

    let title = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let output = output_path(input, output_dir, "html");
    fs::write(&output, render_page(&title, &fragment))
        .with_context(|| format!("無法寫入 {}", output.display()))?;
    Ok(output)
}

/// 轉換單一檔案為 PDF
pub fn convert_file_to_pdf(
    input: &Path,
    output_dir: &Path,
    settings: &MarkdownSettings,
) -> Result<PathBuf> {
    let output = output_path(input, output_dir, "pdf");
    run_pandoc(pdf_command(input, &output, settings)?, input)?;
    Ok(output)
}

fn convert_all<F>(
    files: &[PathBuf],
    shutdown_signal: &AtomicBool,
    progress: &ProgressBar,
    convert: F,
) -> ConversionResult
where
    F: Fn(&Path) -> Result<PathBuf> + Sync,
{
    progress.set_length(files.len() as u64);

    let outcomes: Vec<Option<Result<PathBuf>>> = files
        .par_iter()
        .map(|file| {
            if shutdown_signal.load(Ordering::SeqCst) {
                return None;
            }
            let outcome = convert(file.as_path());
            if let Err(e) = &outcome {
                error!("轉換失敗 {}: {e:#}", file.display());
            }
            progress.inc(1);
            Some(outcome)
        })
        .collect();

    let mut result = ConversionResult::default();
    for (file, outcome) in files.iter().zip(outcomes) {
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        match outcome {
            Some(Ok(output)) => result.converted.push(output),
            Some(Err(e)) => result.errors.push(format!("{name}: {e:#}")),
            None => result.cancelled = true,
        }
    }

    progress.finish_and_clear();
    info!(
        "轉換完成: 成功 {} 個, 失敗 {} 個",
        result.converted.len(),
        result.errors.len()
    );
    result
}

fn prepare(input_dir: &Path, output_dir: &Path, media_types: &MediaTypeTable) -> Result<Vec<PathBuf>> {
    let files = list_markdown_files(input_dir, media_types)?;
    if files.is_empty() {
        return Ok(files);
    }

    ensure_tools(&["pandoc"])?;
    fs::create_dir_all(output_dir)
        .with_context(|| format!("無法建立輸出資料夾: {}", output_dir.display()))?;
    Ok(files)
}

/// 資料夾內所有 Markdown 轉為 HTML
///
/// 缺少 pandoc 或資源下載失敗時整批中止
pub fn convert_to_html(
    input_dir: &Path,
    output_dir: &Path,
    media_types: &MediaTypeTable,
    shutdown_signal: &AtomicBool,
    progress: &ProgressBar,
) -> Result<ConversionResult> {
    let files = prepare(input_dir, output_dir, media_types)?;
    if files.is_empty() {
        return Ok(ConversionResult::default());
    }

    let downloaded = ensure_assets(output_dir).context("資源下載失敗，轉換中止")?;
    if downloaded > 0 {
        info!("已下載 {downloaded} 個資源檔");
    }

    Ok(convert_all(&files, shutdown_signal, progress, |file| {
        convert_file_to_html(file, output_dir)
    }))
}

/// 資料夾內所有 Markdown 轉為 PDF
pub fn convert_to_pdf(
    input_dir: &Path,
    output_dir: &Path,
    media_types: &MediaTypeTable,
    settings: &MarkdownSettings,
    shutdown_signal: &AtomicBool,
    progress: &ProgressBar,
) -> Result<ConversionResult> {
    let files = prepare(input_dir, output_dir, media_types)?;
    if files.is_empty() {
        return Ok(ConversionResult::default());
    }

    Ok(convert_all(&files, shutdown_signal, progress, |file| {
        convert_file_to_pdf(file, output_dir, settings)
    }))
}
