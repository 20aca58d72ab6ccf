use crate::config::UserSettings;
use crate::config::save::remember_recent_path;
use anyhow::Result;
use console::style;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use std::path::{Path, PathBuf};

/// 去除拖放路徑時常見的引號與空白
#[must_use]
pub fn clean_path_input(raw: &str) -> String {
    raw.trim().trim_matches(|c| c == '"' || c == '\'').trim().to_string()
}

/// 詢問資料夾路徑，有歷史紀錄時先讓使用者從中選擇
///
/// 回傳 None 代表使用者按下 ESC
pub fn prompt_directory(settings: &mut UserSettings, prompt: &str) -> Result<Option<PathBuf>> {
    let recent_paths = settings.recent_paths.clone();

    let chosen = if recent_paths.is_empty() {
        let path: String = Input::new().with_prompt(prompt).interact_text()?;
        clean_path_input(&path)
    } else {
        let mut options: Vec<String> = recent_paths
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let indicator = if Path::new(p).exists() { "✓" } else { "✗" };
                format!("{} [{}] {}", i + 1, indicator, p)
            })
            .collect();
        options.push("輸入新路徑...".to_string());

        println!("{}", style("(按 ESC 返回)").dim());

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .items(&options)
            .default(0)
            .interact_opt()?;

        match selection {
            None => return Ok(None),
            Some(idx) if idx < recent_paths.len() => recent_paths[idx].clone(),
            Some(_) => {
                let path: String = Input::new().with_prompt(prompt).interact_text()?;
                clean_path_input(&path)
            }
        }
    };

    if chosen.is_empty() {
        return Ok(None);
    }

    remember_recent_path(settings, &chosen);
    Ok(Some(PathBuf::from(chosen)))
}

/// 詢問單一檔案路徑，空白輸入回傳 None
pub fn prompt_file(prompt: &str, allow_empty: bool) -> Result<Option<PathBuf>> {
    let path: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(allow_empty)
        .interact_text()?;
    let cleaned = clean_path_input(&path);
    if cleaned.is_empty() {
        return Ok(None);
    }
    Ok(Some(PathBuf::from(cleaned)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_path_input_strips_quotes() {
        assert_eq!(clean_path_input("  \"/tmp/my dir\"  "), "/tmp/my dir");
        assert_eq!(clean_path_input("'/tmp/a'"), "/tmp/a");
        assert_eq!(clean_path_input("   "), "");
    }
}
