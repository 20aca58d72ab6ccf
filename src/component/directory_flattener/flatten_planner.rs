//! 扁平化計畫
//!
//! 遞迴走訪根目錄，每個檔案的新檔名以祖先目錄的序號串接而成，
//! 例如第 2 個子目錄下第 1 個子目錄的第 3 個檔案會成為 `2.1.3.檔名`

use crate::tools::{natural_sort_key, validate_directory_exists};
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlattenEntry {
    pub source: PathBuf,
    /// 輸出資料夾中的新檔名
    pub new_file_name: String,
}

#[derive(Debug, Clone, Default)]
pub struct FlattenPlan {
    pub output_dir: PathBuf,
    pub entries: Vec<FlattenEntry>,
    /// 無法讀取的目錄等非致命問題
    pub warnings: Vec<String>,
}

impl FlattenPlan {
    #[must_use]
    pub fn destination_of(&self, entry: &FlattenEntry) -> PathBuf {
        self.output_dir.join(&entry.new_file_name)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct FlattenResult {
    pub success_count: usize,
    pub errors: Vec<String>,
}

/// 建立扁平化計畫，輸出資料夾本身不會被走訪
pub fn plan(root: &Path, output_dir_name: &str) -> Result<FlattenPlan> {
    validate_directory_exists(root)?;

    let mut plan = FlattenPlan {
        output_dir: root.join(output_dir_name),
        ..FlattenPlan::default()
    };
    let output_dir = plan.output_dir.clone();
    traverse(root, &[], &output_dir, &mut plan);

    info!(
        "扁平化計畫完成: {} 個檔案, {} 個警告",
        plan.entries.len(),
        plan.warnings.len()
    );
    Ok(plan)
}

fn traverse(directory: &Path, prefixes: &[usize], output_dir: &Path, plan: &mut FlattenPlan) {
    let mut files: Vec<(String, PathBuf)> = Vec::new();
    let mut dirs: Vec<(String, PathBuf)> = Vec::new();

    for entry in WalkDir::new(directory).min_depth(1).max_depth(1) {
        let entry = match entry {
            Ok(entry) => entry,
            // depth 0 是目錄本身打不開，其餘只略過該項目
            Err(e) if e.depth() == 0 => {
                warn!("無法存取 {}: {e}", directory.display());
                plan.warnings
                    .push(format!("無法存取目錄 {}: {e}", directory.display()));
                return;
            }
            Err(e) => {
                let path = e.path().unwrap_or(directory).to_path_buf();
                warn!("無法存取 {}: {e}", path.display());
                plan.warnings
                    .push(format!("無法存取 {}: {e}", path.display()));
                continue;
            }
        };

        let path = entry.path().to_path_buf();
        if path == output_dir {
            continue;
        }

        let name = entry.file_name().to_string_lossy().to_string();
        if entry.path_is_symlink() {
            // 連結到資料夾的不走訪，避免循環
            match fs::metadata(&path) {
                Ok(meta) if meta.is_file() => files.push((name, path)),
                Ok(meta) if meta.is_dir() => {
                    plan.warnings
                        .push(format!("略過資料夾連結: {}", path.display()));
                }
                _ => debug!("略過無效連結: {}", path.display()),
            }
        } else if entry.file_type().is_dir() {
            dirs.push((name, path));
        } else if entry.file_type().is_file() {
            files.push((name, path));
        }
    }

    files.sort_by_cached_key(|(name, _)| natural_sort_key(name));
    dirs.sort_by_cached_key(|(name, _)| natural_sort_key(name));

    for (index, (name, source)) in files.into_iter().enumerate() {
        let chain = index_chain(prefixes, index + 1);
        plan.entries.push(FlattenEntry {
            source,
            new_file_name: format!("{chain}.{name}"),
        });
    }

    for (index, (_, path)) in dirs.into_iter().enumerate() {
        let mut child_prefixes = prefixes.to_vec();
        child_prefixes.push(index + 1);
        traverse(&path, &child_prefixes, output_dir, plan);
    }
}

fn index_chain(prefixes: &[usize], own: usize) -> String {
    prefixes
        .iter()
        .chain(std::iter::once(&own))
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(".")
}

/// 依計畫移動檔案，單一檔案失敗不會中斷整批
pub fn execute(plan: &FlattenPlan) -> Result<FlattenResult> {
    fs::create_dir_all(&plan.output_dir)
        .with_context(|| format!("無法建立目標資料夾: {}", plan.output_dir.display()))?;

    let mut result = FlattenResult::default();
    for entry in &plan.entries {
        let destination = plan.destination_of(entry);

        if destination.exists() {
            warn!("目標已存在，略過: {}", destination.display());
            result.errors.push(format!(
                "移動失敗: '{}' (目標已存在)",
                entry.source.display()
            ));
            continue;
        }

        match fs::rename(&entry.source, &destination) {
            Ok(()) => {
                debug!("{} -> {}", entry.source.display(), destination.display());
                result.success_count += 1;
            }
            Err(e) => {
                warn!("移動失敗 {}: {e}", entry.source.display());
                result
                    .errors
                    .push(format!("移動失敗: '{}' ({e})", entry.source.display()));
            }
        }
    }

    info!(
        "扁平化完成: 成功 {} 個, 失敗 {} 個",
        result.success_count,
        result.errors.len()
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "x").unwrap();
    }

    fn new_names(plan: &FlattenPlan) -> Vec<&str> {
        plan.entries
            .iter()
            .map(|e| e.new_file_name.as_str())
            .collect()
    }

    #[test]
    fn test_top_file_and_sub_file() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir.path().join("top.ext"));
        touch(&temp_dir.path().join("sub").join("sub.ext"));

        let plan = plan(temp_dir.path(), "flatten").unwrap();
        assert_eq!(new_names(&plan), vec!["1.top.ext", "1.1.sub.ext"]);
        assert_eq!(plan.output_dir, temp_dir.path().join("flatten"));
    }

    #[test]
    fn test_files_before_subdirs_and_natural_order() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(&root.join("b10.txt"));
        touch(&root.join("b2.txt"));
        touch(&root.join("ch10").join("x.txt"));
        touch(&root.join("ch2").join("y.txt"));
        touch(&root.join("ch2").join("deep").join("z.txt"));

        let plan = plan(root, "flatten").unwrap();
        assert_eq!(
            new_names(&plan),
            vec![
                "1.b2.txt",
                "2.b10.txt",
                "1.1.y.txt",
                "1.1.1.z.txt",
                "2.1.x.txt"
            ]
        );
    }

    #[test]
    fn test_output_dir_excluded() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir.path().join("flatten").join("1.old.txt"));
        touch(&temp_dir.path().join("new.txt"));

        let plan = plan(temp_dir.path(), "flatten").unwrap();
        assert_eq!(new_names(&plan), vec!["1.new.txt"]);
    }

    #[test]
    fn test_execute_moves_files() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir.path().join("a.txt"));
        touch(&temp_dir.path().join("d").join("b.txt"));

        let plan = plan(temp_dir.path(), "out").unwrap();
        let result = execute(&plan).unwrap();

        assert_eq!(result.success_count, 2);
        assert!(result.errors.is_empty());
        assert!(temp_dir.path().join("out").join("1.a.txt").exists());
        assert!(temp_dir.path().join("out").join("1.1.b.txt").exists());
        assert!(!temp_dir.path().join("a.txt").exists());
    }

    #[test]
    fn test_execute_collects_errors() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir.path().join("a.txt"));
        touch(&temp_dir.path().join("b.txt"));

        let plan = plan(temp_dir.path(), "flatten").unwrap();
        fs::remove_file(temp_dir.path().join("a.txt")).unwrap();

        let result = execute(&plan).unwrap();
        assert_eq!(result.success_count, 1);
        assert_eq!(result.errors.len(), 1);
        assert!(temp_dir.path().join("flatten").join("2.b.txt").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_directory_symlink_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir.path().join("real").join("f.txt"));
        std::os::unix::fs::symlink(temp_dir.path().join("real"), temp_dir.path().join("link"))
            .unwrap();

        let plan = plan(temp_dir.path(), "flatten").unwrap();
        assert_eq!(new_names(&plan), vec!["1.1.f.txt"]);
        assert_eq!(plan.warnings.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_directory_keeps_siblings() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(&root.join("a.txt"));
        touch(&root.join("locked").join("hidden.txt"));
        touch(&root.join("open").join("f.txt"));
        touch(&root.join("z.txt"));

        let locked = root.join("locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        if fs::read_dir(&locked).is_ok() {
            println!("略過測試: 目前身分可以讀取無權限資料夾");
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let plan = plan(root, "flatten").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(new_names(&plan), vec!["1.a.txt", "2.z.txt", "2.1.f.txt"]);
        assert_eq!(plan.warnings.len(), 1);
        assert!(plan.warnings[0].contains("locked"));
    }

    #[test]
    fn test_missing_root_fails() {
        assert!(plan(Path::new("/no/such/root/for/flatten"), "flatten").is_err());
    }
}
