//! 執行 ffmpeg 工作的互動流程：覆寫確認、執行、回報結果

use crate::tools::ffmpeg_command::FfmpegCommand;
use crate::tools::task_runner::{TaskOutcome, TaskRunner};
use anyhow::Result;
use console::style;
use dialoguer::Confirm;
use log::info;
use std::path::Path;
use std::sync::atomic::AtomicBool;

/// 錯誤時顯示的 stderr 行數
const STDERR_TAIL_LINES: usize = 8;

/// 輸出檔已存在時詢問是否覆寫，不存在時直接回傳 true
pub fn confirm_overwrite(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(true);
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    let overwrite = Confirm::new()
        .with_prompt(format!("檔案 '{name}' 已存在，是否覆寫？"))
        .default(false)
        .interact()?;
    Ok(overwrite)
}

/// 收到 Ctrl-C 時詢問是否中止目前的外部工作
#[must_use]
pub fn confirm_abort() -> bool {
    Confirm::new()
        .with_prompt("有工作正在執行，確定要中止嗎？")
        .default(false)
        .interact()
        .unwrap_or(true)
}

/// 執行 ffmpeg 命令，使用者拒絕覆寫時回傳 None
pub fn run_ffmpeg(
    runner: &TaskRunner,
    command: FfmpegCommand,
    description: &str,
    shutdown_signal: &AtomicBool,
) -> Result<Option<TaskOutcome>> {
    let output = command.output_path().to_path_buf();
    if !confirm_overwrite(&output)? {
        println!("{}", style("操作取消：不覆寫現有檔案").yellow());
        return Ok(None);
    }

    info!("{}", command.command_line());
    let task = command.into_task(description)?;
    let outcome = runner.run(task, shutdown_signal, confirm_abort)?;
    report_outcome(&outcome, &output);
    Ok(Some(outcome))
}

pub fn report_outcome(outcome: &TaskOutcome, output: &Path) {
    if outcome.success {
        println!(
            "{} {} ({:.1}s)",
            style("完成，輸出檔案:").green(),
            output.display(),
            outcome.elapsed.as_secs_f64()
        );
        return;
    }

    if outcome.cancelled {
        println!("{}", style(format!("{} 已中止", outcome.description)).yellow());
        return;
    }

    println!(
        "{} {} (退出代碼: {})",
        style("執行失敗:").red().bold(),
        outcome.description,
        outcome
            .exit_code
            .map_or_else(|| "無".to_string(), |code| code.to_string())
    );
    let lines: Vec<&str> = outcome.stderr.lines().collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    for line in &lines[start..] {
        println!("  {}", style(line).dim());
    }
}
