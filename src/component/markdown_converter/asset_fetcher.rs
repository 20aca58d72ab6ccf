//! 下載 HTML 頁面需要的樣式與腳本

use super::html_page::{CUSTOM_CSS, CUSTOM_CSS_FILE, REMOTE_ASSETS};
use anyhow::{Context, Result};
use log::info;
use std::fs;
use std::path::Path;
use std::time::Duration;

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(10);

/// 確保輸出資料夾內有全部資源，已存在的檔案不重新下載
///
/// 任何一個下載失敗即回傳錯誤，呼叫端應中止轉換。
/// 回傳實際下載的檔案數
pub fn ensure_assets(output_dir: &Path) -> Result<usize> {
    let missing: Vec<(&str, &str)> = REMOTE_ASSETS
        .iter()
        .copied()
        .filter(|(name, _)| !output_dir.join(name).exists())
        .collect();

    if !missing.is_empty() {
        let client = reqwest::blocking::Client::builder()
            .timeout(DOWNLOAD_TIMEOUT)
            .build()
            .context("無法建立 HTTP 客戶端")?;

        for (name, url) in &missing {
            info!("下載 {name}: {url}");
            let body = client
                .get(*url)
                .send()
                .and_then(reqwest::blocking::Response::error_for_status)
                .and_then(reqwest::blocking::Response::text)
                .with_context(|| format!("下載 {name} 失敗"))?;
            fs::write(output_dir.join(name), body)
                .with_context(|| format!("無法寫入 {name}"))?;
        }
    }

    write_custom_css(output_dir)?;
    Ok(missing.len())
}

/// 自訂樣式每次都重新寫入
pub fn write_custom_css(output_dir: &Path) -> Result<()> {
    let path = output_dir.join(CUSTOM_CSS_FILE);
    fs::write(&path, CUSTOM_CSS).with_context(|| format!("無法寫入 {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_existing_assets_are_not_downloaded() {
        let temp_dir = TempDir::new().unwrap();
        for (name, _) in REMOTE_ASSETS {
            fs::write(temp_dir.path().join(name), "cached").unwrap();
        }

        let downloaded = ensure_assets(temp_dir.path()).unwrap();
        assert_eq!(downloaded, 0);
        assert_eq!(
            fs::read_to_string(temp_dir.path().join("main_style.css")).unwrap(),
            "cached"
        );
        assert_eq!(
            fs::read_to_string(temp_dir.path().join(CUSTOM_CSS_FILE)).unwrap(),
            CUSTOM_CSS
        );
    }
}
