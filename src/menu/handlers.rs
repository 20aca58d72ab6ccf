use crate::component::{
    BatchRenamer, DirectoryFlattener, MarkdownConverter, MediaCropper, MediaMerger, NfoGenerator,
};
use crate::config::Config;
use crate::pause;
use crate::signal::reset_shutdown_signal;
use anyhow::Result;
use console::{Term, style};
use log::error;
use rust_i18n::t;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// 工具執行結束後的共同收尾：顯示錯誤、清除中斷旗標、等待使用者確認
fn finish(term: &Term, shutdown_signal: &AtomicBool, outcome: Result<()>) -> Result<()> {
    if let Err(e) = outcome {
        error!("{e:#}");
        eprintln!("{} {e:#}", style(t!("common.error_prefix")).red().bold());
    }

    reset_shutdown_signal(shutdown_signal);
    pause(term)
}

pub fn run_batch_renamer(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &mut Config,
) -> Result<()> {
    let outcome = BatchRenamer::new(config, Arc::clone(shutdown_signal)).run();
    finish(term, shutdown_signal, outcome)
}

pub fn run_directory_flattener(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &mut Config,
) -> Result<()> {
    let outcome = DirectoryFlattener::new(config, Arc::clone(shutdown_signal)).run();
    finish(term, shutdown_signal, outcome)
}

pub fn run_nfo_generator(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &mut Config,
) -> Result<()> {
    let outcome = NfoGenerator::new(config, Arc::clone(shutdown_signal)).run();
    finish(term, shutdown_signal, outcome)
}

pub fn run_media_merger(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &mut Config,
) -> Result<()> {
    let outcome = MediaMerger::new(config, Arc::clone(shutdown_signal)).run();
    finish(term, shutdown_signal, outcome)
}

pub fn run_media_cropper(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &mut Config,
) -> Result<()> {
    let outcome = MediaCropper::new(config, Arc::clone(shutdown_signal)).run();
    finish(term, shutdown_signal, outcome)
}

pub fn run_markdown_converter(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &mut Config,
) -> Result<()> {
    let outcome = MarkdownConverter::new(config, Arc::clone(shutdown_signal)).run();
    finish(term, shutdown_signal, outcome)
}
