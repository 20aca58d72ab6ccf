//! 產生 HTML 檔案的導覽索引頁（Markdown 格式）

use crate::config::MarkdownSettings;
use crate::tools::validate_directory_exists;
use anyhow::{Context, Result};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug)]
pub struct IndexResult {
    pub path: PathBuf,
    pub link_count: usize,
}

/// 找出名稱以 `prefix` 開頭（不分大小寫）的 `.html` 檔，排除樣板檔後依名稱排序
pub fn collect_index_entries(directory: &Path, prefix: &str, exclude: &str) -> Result<Vec<String>> {
    validate_directory_exists(directory)?;
    let prefix = prefix.to_lowercase();

    let mut names: Vec<String> = WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .filter(|name| {
            let lower = name.to_lowercase();
            lower.starts_with(&prefix) && lower.ends_with(".html")
        })
        .filter(|name| name != exclude)
        .collect();

    names.sort();
    Ok(names)
}

#[must_use]
pub fn render_index(title: &str, file_names: &[String]) -> String {
    let links: Vec<String> = file_names
        .iter()
        .map(|name| {
            let stem = Path::new(name)
                .file_stem()
                .map_or_else(|| name.clone(), |s| s.to_string_lossy().to_string());
            format!("- [{stem}]({name})")
        })
        .collect();

    format!("# {title}\n\n{}", links.join("\n"))
}

/// 寫出索引頁，沒有符合條件的檔案時回傳 `None`
pub fn write_index(directory: &Path, settings: &MarkdownSettings) -> Result<Option<IndexResult>> {
    let names = collect_index_entries(directory, &settings.index_prefix, &settings.index_exclude)?;
    if names.is_empty() {
        return Ok(None);
    }

    let path = directory.join(&settings.index_file_name);
    fs::write(&path, render_index(&settings.index_title, &names))
        .with_context(|| format!("無法寫入索引頁: {}", path.display()))?;

    info!("索引頁已產生: {} ({} 個連結)", path.display(), names.len());
    Ok(Some(IndexResult {
        path,
        link_count: names.len(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup(names: &[&str]) -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        for name in names {
            fs::write(temp_dir.path().join(name), "<html></html>").unwrap();
        }
        temp_dir
    }

    #[test]
    fn test_collect_filters_and_sorts() {
        let temp_dir = setup(&[
            "L0010_c.html",
            "l0002_b.html",
            "L0001_a.html",
            "L0000_模板.html",
            "notes.html",
            "L0003.md",
        ]);

        let names = collect_index_entries(temp_dir.path(), "L", "L0000_模板.html").unwrap();
        assert_eq!(names, vec!["L0001_a.html", "L0010_c.html", "l0002_b.html"]);
    }

    #[test]
    fn test_render_index() {
        let names = vec!["L0001_a.html".to_string(), "L0002_b.html".to_string()];
        assert_eq!(
            render_index("目錄", &names),
            "# 目錄\n\n- [L0001_a](L0001_a.html)\n- [L0002_b](L0002_b.html)"
        );
    }

    #[test]
    fn test_write_index() {
        let temp_dir = setup(&["L0001_a.html"]);
        let settings = MarkdownSettings::default();

        let result = write_index(temp_dir.path(), &settings).unwrap().unwrap();
        assert_eq!(result.link_count, 1);
        let content = fs::read_to_string(result.path).unwrap();
        assert!(content.contains("- [L0001_a](L0001_a.html)"));
    }

    #[test]
    fn test_write_index_without_matches() {
        let temp_dir = setup(&["readme.html"]);
        let settings = MarkdownSettings::default();
        assert!(write_index(temp_dir.path(), &settings).unwrap().is_none());
        assert!(!temp_dir.path().join(&settings.index_file_name).exists());
    }
}
