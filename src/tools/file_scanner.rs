use crate::tools::natural_sort::sort_naturally;
use crate::tools::validate_directory_exists;
use anyhow::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 列出資料夾第一層的一般檔案（不遞迴），依檔名自然排序
pub fn scan_files(directory: &Path) -> Result<Vec<PathBuf>> {
    scan_files_matching(directory, |_| true)
}

/// 列出資料夾第一層符合條件的檔案，依檔名自然排序
pub fn scan_files_matching<F>(directory: &Path, predicate: F) -> Result<Vec<PathBuf>>
where
    F: Fn(&Path) -> bool,
{
    validate_directory_exists(directory)?;

    let mut files: Vec<(String, PathBuf)> = WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| predicate(entry.path()))
        .map(|entry| {
            let name = entry.file_name().to_string_lossy().to_string();
            (name, entry.into_path())
        })
        .collect();

    sort_naturally(&mut files, |(name, _)| name.as_str());
    Ok(files.into_iter().map(|(_, path)| path).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_scan_files_is_flat_and_natural() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("ep10.mp4"), "a").unwrap();
        fs::write(temp_dir.path().join("ep2.mp4"), "b").unwrap();
        fs::create_dir(temp_dir.path().join("sub")).unwrap();
        fs::write(temp_dir.path().join("sub").join("ep1.mp4"), "c").unwrap();

        let files = scan_files(temp_dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["ep2.mp4", "ep10.mp4"]);
    }

    #[test]
    fn test_scan_files_matching_filters() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.md"), "#").unwrap();
        fs::write(temp_dir.path().join("b.txt"), "x").unwrap();

        let files = scan_files_matching(temp_dir.path(), |p| {
            p.extension().is_some_and(|e| e == "md")
        })
        .unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("a.md"));
    }

    #[test]
    fn test_scan_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        assert!(scan_files(temp_dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_scan_missing_directory_is_error() {
        assert!(scan_files(Path::new("/definitely/not/here")).is_err());
    }
}
