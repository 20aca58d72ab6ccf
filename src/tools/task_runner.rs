//! 外部工具執行器
//!
//! 同一時間只允許一個外部工作（ffmpeg、pandoc、mpv）執行，
//! 第二個請求會直接被拒絕而不是排隊

use anyhow::{Context, Result, bail};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// 檢查外部工具是否在 PATH 中，一次回報所有缺少的工具
pub fn ensure_tools(names: &[&str]) -> Result<()> {
    let missing: Vec<&str> = names
        .iter()
        .copied()
        .filter(|name| which::which(name).is_err())
        .collect();

    if !missing.is_empty() {
        bail!(
            "找不到以下必要工具: {}，請確認已安裝並加入 PATH",
            missing.join(", ")
        );
    }
    Ok(())
}

/// 待執行的外部工作
#[derive(Debug)]
pub struct ExternalTask {
    pub description: String,
    pub command: Command,
    /// 工作結束後要刪除的暫存檔（例如 concat 清單）
    pub cleanup_file: Option<PathBuf>,
}

impl ExternalTask {
    pub fn new(description: impl Into<String>, command: Command) -> Self {
        Self {
            description: description.into(),
            command,
            cleanup_file: None,
        }
    }

    #[must_use]
    pub fn with_cleanup_file(mut self, path: PathBuf) -> Self {
        self.cleanup_file = Some(path);
        self
    }
}

#[derive(Debug, Clone)]
pub struct TaskOutcome {
    pub description: String,
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stderr: String,
    /// 被使用者中斷
    pub cancelled: bool,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, Default)]
pub struct TaskRunner {
    busy: Arc<AtomicBool>,
}

impl TaskRunner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// 啟動外部工作，已有工作執行中時回傳錯誤
    pub fn start(&self, mut task: ExternalTask) -> Result<RunningTask> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!("拒絕工作 '{}'：另一個工作正在執行中", task.description);
            bail!("另一個工作正在進行中，請等待其完成後再試");
        }

        info!("執行命令: {:?}", task.command);

        let spawned = task
            .command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("無法啟動外部工具: {}", task.description));

        let mut child = match spawned {
            Ok(child) => child,
            Err(e) => {
                self.busy.store(false, Ordering::SeqCst);
                remove_cleanup_file(task.cleanup_file.as_ref());
                return Err(e);
            }
        };

        let stderr_buffer = Arc::new(Mutex::new(String::new()));
        let last_line = Arc::new(Mutex::new(String::new()));
        let reader = child.stderr.take().map(|stderr| {
            let buffer = Arc::clone(&stderr_buffer);
            let last_line = Arc::clone(&last_line);
            thread::spawn(move || {
                for line in BufReader::new(stderr).lines().map_while(Result::ok) {
                    debug!("{line}");
                    if let Ok(mut last) = last_line.lock() {
                        last.clone_from(&line);
                    }
                    if let Ok(mut buf) = buffer.lock() {
                        buf.push_str(&line);
                        buf.push('\n');
                    }
                }
            })
        });

        Ok(RunningTask {
            child,
            description: task.description,
            cleanup_file: task.cleanup_file,
            stderr_buffer,
            last_line,
            reader,
            busy: Arc::clone(&self.busy),
            started: Instant::now(),
        })
    }

    /// 啟動並等待完成
    pub fn run<F>(
        &self,
        task: ExternalTask,
        shutdown_signal: &AtomicBool,
        confirm_abort: F,
    ) -> Result<TaskOutcome>
    where
        F: FnMut() -> bool,
    {
        self.start(task)?.wait(shutdown_signal, confirm_abort)
    }
}

pub struct RunningTask {
    child: Child,
    description: String,
    cleanup_file: Option<PathBuf>,
    stderr_buffer: Arc<Mutex<String>>,
    last_line: Arc<Mutex<String>>,
    reader: Option<JoinHandle<()>>,
    busy: Arc<AtomicBool>,
    started: Instant,
}

impl RunningTask {
    /// 等待工作結束
    ///
    /// 收到中斷信號時呼叫 `confirm_abort`，回傳 true 才終止子行程，
    /// 否則清除信號繼續等待
    pub fn wait<F>(mut self, shutdown_signal: &AtomicBool, mut confirm_abort: F) -> Result<TaskOutcome>
    where
        F: FnMut() -> bool,
    {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .expect("Invalid progress bar template"),
        );
        spinner.set_message(self.description.clone());

        let mut cancelled = false;
        let status = loop {
            if let Some(status) = self.child.try_wait().context("無法取得子行程狀態")? {
                break status;
            }

            if shutdown_signal.load(Ordering::SeqCst) {
                spinner.suspend(|| {
                    if confirm_abort() {
                        cancelled = true;
                    } else {
                        shutdown_signal.store(false, Ordering::SeqCst);
                    }
                });
                if cancelled {
                    warn!("使用者中斷工作: {}", self.description);
                    let _ = self.child.kill();
                    break self.child.wait().context("無法等待子行程結束")?;
                }
            }

            if let Ok(last) = self.last_line.lock() {
                if !last.is_empty() {
                    spinner.set_message(format!("{} | {}", self.description, last.trim()));
                }
            }
            spinner.tick();
            thread::sleep(POLL_INTERVAL);
        };

        if let Some(reader) = self.reader.take() {
            let _ = reader.join();
        }

        let stderr = self
            .stderr_buffer
            .lock()
            .map(|buf| buf.clone())
            .unwrap_or_default();
        let success = status.success() && !cancelled;

        if success {
            spinner.finish_with_message(format!("{} 完成", self.description));
            info!("工作完成: {}", self.description);
        } else {
            spinner.abandon_with_message(format!("{} 失敗", self.description));
            warn!(
                "工作失敗: {} (退出代碼: {:?})",
                self.description,
                status.code()
            );
        }

        Ok(TaskOutcome {
            description: self.description.clone(),
            success,
            exit_code: status.code(),
            stderr,
            cancelled,
            elapsed: self.started.elapsed(),
        })
    }
}

impl Drop for RunningTask {
    fn drop(&mut self) {
        if matches!(self.child.try_wait(), Ok(None)) {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
        remove_cleanup_file(self.cleanup_file.as_ref());
        self.busy.store(false, Ordering::SeqCst);
    }
}

fn remove_cleanup_file(path: Option<&PathBuf>) {
    if let Some(path) = path {
        match std::fs::remove_file(path) {
            Ok(()) => debug!("已清理暫存檔: {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("清理暫存檔失敗 {}: {e}", path.display()),
        }
    }
}
