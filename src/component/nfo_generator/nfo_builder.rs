//! 為資料夾中的影片批次產生 NFO

use super::episode_parser::{EpisodeCounter, extract_episode_title};
use super::nfo_document::{EpisodeInfo, TVSHOW_NFO, TvShowInfo};
use super::plot_writer::{EpisodeTitle, PlotWriter};
use crate::config::MediaTypeTable;
use crate::tools::scan_files_matching;
use anyhow::{Context, Result, bail};
use indicatif::ProgressBar;
use log::{info, warn};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NfoOptions {
    pub season: u32,
    /// 檔名找不到集數時的起始集數
    pub first_episode: u32,
    /// 已有 NFO 的影片也重新產生
    pub regenerate_all: bool,
}

#[derive(Debug, Default)]
pub struct NfoResult {
    pub generated: usize,
    pub skipped: usize,
    /// AI 簡介失敗等改用預設值的情況
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    pub cancelled: bool,
}

fn file_name_and_stem(video: &Path) -> (String, String) {
    let file_name = video
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let base_name = video
        .file_stem()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    (file_name, base_name)
}

/// 依檔名排序列出各集標題與集數，集數推斷方式與 [`generate`] 相同
pub fn collect_episode_titles(
    folder: &Path,
    media_types: &MediaTypeTable,
    first_episode: u32,
) -> Result<Vec<EpisodeTitle>> {
    let videos = scan_files_matching(folder, |path| media_types.is_video_file(path))?;
    let mut counter = EpisodeCounter::new(first_episode);

    Ok(videos
        .iter()
        .map(|video| {
            let (file_name, base_name) = file_name_and_stem(video);
            EpisodeTitle {
                title: extract_episode_title(&base_name),
                episode: counter.resolve(&file_name),
            }
        })
        .collect())
}

/// 寫入 tvshow.nfo 並為每部影片寫入 `<檔名>.nfo`
///
/// tvshow.nfo 每次都會覆寫；單集 NFO 已存在時除非 `regenerate_all` 否則略過
pub fn generate(
    folder: &Path,
    show: &TvShowInfo,
    options: &NfoOptions,
    media_types: &MediaTypeTable,
    plot_writer: Option<&dyn PlotWriter>,
    shutdown_signal: &AtomicBool,
    progress: &ProgressBar,
) -> Result<NfoResult> {
    let videos = scan_files_matching(folder, |path| media_types.is_video_file(path))?;
    if videos.is_empty() {
        bail!("所選資料夾中沒有找到影片檔案: {}", folder.display());
    }

    let tvshow_path = folder.join(TVSHOW_NFO);
    fs::write(&tvshow_path, show.to_xml())
        .with_context(|| format!("無法寫入 {}", tvshow_path.display()))?;
    info!("已寫入 {}", tvshow_path.display());

    let mut result = NfoResult::default();
    let mut counter = EpisodeCounter::new(options.first_episode);
    progress.set_length(videos.len() as u64);

    for video in &videos {
        if shutdown_signal.load(Ordering::SeqCst) {
            warn!("NFO 產生已中斷");
            result.cancelled = true;
            break;
        }
        progress.inc(1);

        let (file_name, base_name) = file_name_and_stem(video);
        let nfo_path = folder.join(format!("{base_name}.nfo"));

        if !options.regenerate_all && nfo_path.exists() {
            result.skipped += 1;
            continue;
        }

        let title = extract_episode_title(&base_name);
        let episode = counter.resolve(&file_name);
        progress.set_message(title.clone());

        let plot = match plot_writer {
            Some(writer) => match writer.write_plot(&show.title, &show.plot, &title) {
                Ok(plot) => plot,
                Err(e) => {
                    warn!("AI 簡介產生失敗 {file_name}: {e:#}");
                    result
                        .warnings
                        .push(format!("為 {title} 產生簡介失敗，改用預設簡介: {e:#}"));
                    show.plot.clone()
                }
            },
            None => show.plot.clone(),
        };

        let info = EpisodeInfo {
            title,
            show_title: show.title.clone(),
            season: options.season,
            episode,
            plot,
            year: show.year,
        };

        match fs::write(&nfo_path, info.to_xml()) {
            Ok(()) => result.generated += 1,
            Err(e) => {
                warn!("寫入失敗 {}: {e}", nfo_path.display());
                result
                    .errors
                    .push(format!("無法寫入 {}: {e}", nfo_path.display()));
            }
        }
    }

    info!(
        "NFO 產生完成: 新增 {} 個, 略過 {} 個",
        result.generated, result.skipped
    );
    Ok(result)
}
