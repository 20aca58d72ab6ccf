use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[must_use]
pub fn setup_shutdown_signal() -> Arc<AtomicBool> {
    let shutdown_signal = Arc::new(AtomicBool::new(false));
    let signal_clone = Arc::clone(&shutdown_signal);

    ctrlc::set_handler(move || {
        signal_clone.store(true, Ordering::SeqCst);
        eprintln!("\n收到中斷信號，正在停止目前的工作...");
    })
    .expect("無法設定 Ctrl-C 處理器");

    shutdown_signal
}

/// 工作結束回到選單前清除中斷旗標，讓下一個工作可以正常執行
pub fn reset_shutdown_signal(shutdown_signal: &AtomicBool) {
    shutdown_signal.store(false, Ordering::SeqCst);
}
