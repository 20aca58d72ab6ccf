use crate::tools::{ExternalTask, file_name_stamp, format_timestamp};
use anyhow::{Result, bail};
use std::path::Path;
use std::process::Command;

/// 已驗證的裁切區間，保證 `0 <= start < end <= duration`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropRange {
    start: f64,
    end: f64,
}

impl CropRange {
    pub fn new(start: f64, end: f64, duration: f64) -> Result<Self> {
        if !start.is_finite() || !end.is_finite() || start < 0.0 {
            bail!("開始時間不可為負數");
        }
        if start >= end {
            bail!("開始時間必須小於結束時間");
        }
        if end > duration {
            bail!(
                "結束時間 {} 超過影片長度 {}",
                format_timestamp(end),
                format_timestamp(duration)
            );
        }
        Ok(Self { start, end })
    }

    #[must_use]
    pub const fn start(&self) -> f64 {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> f64 {
        self.end
    }

    #[must_use]
    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    /// 檔名用的開始與結束時間戳記
    #[must_use]
    pub fn stamps(&self) -> (String, String) {
        (file_name_stamp(self.start), file_name_stamp(self.end))
    }
}

/// 以 mpv 播放指定區間
#[must_use]
pub fn preview_task(input: &Path, range: &CropRange) -> ExternalTask {
    let mut command = Command::new("mpv");
    command
        .arg(format!("--start={:.3}", range.start()))
        .arg(format!("--end={:.3}", range.end()))
        .arg(input);
    ExternalTask::new(
        format!(
            "預覽 {} - {}",
            format_timestamp(range.start()),
            format_timestamp(range.end())
        ),
        command,
    )
}
