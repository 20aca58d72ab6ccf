//! 待重新命名的檔案清單
//!
//! 清單順序即處理順序，可手動調整或依名稱、修改時間排序

use crate::tools::{natural_sort_key, scan_files};
use anyhow::Result;
use std::cmp::Reverse;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// 單一檔案紀錄
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// 顯示用檔名
    pub name: String,
    pub path: PathBuf,
    /// 取不到時為 UNIX_EPOCH
    pub modified: SystemTime,
}

impl FileRecord {
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
        Self {
            name,
            path: path.to_path_buf(),
            modified: modified_time(path),
        }
    }
}

pub(crate) fn modified_time(path: &Path) -> SystemTime {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .unwrap_or(SystemTime::UNIX_EPOCH)
}

#[derive(Debug, Clone)]
pub struct FileList {
    records: Vec<FileRecord>,
    name_ascending: bool,
    time_ascending: bool,
}

impl Default for FileList {
    fn default() -> Self {
        Self::new()
    }
}

impl FileList {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            records: Vec::new(),
            name_ascending: true,
            time_ascending: true,
        }
    }

    #[must_use]
    pub fn records(&self) -> &[FileRecord] {
        &self.records
    }

    pub(crate) fn records_mut(&mut self) -> &mut [FileRecord] {
        &mut self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 加入檔案，已在清單中的路徑會略過，回傳實際加入數量
    pub fn add_paths<I, P>(&mut self, paths: I) -> usize
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut added = 0;
        for path in paths {
            let path = path.as_ref();
            if self.records.iter().any(|r| r.path == path) {
                continue;
            }
            self.records.push(FileRecord::from_path(path));
            added += 1;
        }
        added
    }

    /// 加入資料夾第一層的所有檔案
    pub fn add_directory(&mut self, directory: &Path) -> Result<usize> {
        let files = scan_files(directory)?;
        Ok(self.add_paths(files))
    }

    /// 移除指定位置的檔案，回傳實際移除數量
    pub fn remove(&mut self, indices: &[usize]) -> usize {
        let mut indices: Vec<usize> = indices
            .iter()
            .copied()
            .filter(|&i| i < self.records.len())
            .collect();
        indices.sort_unstable_by_key(|&i| Reverse(i));
        indices.dedup();

        for &index in &indices {
            self.records.remove(index);
        }
        indices.len()
    }

    /// 拖放式移動：`target` 是放下時所在的位置（移動前的索引），
    /// 等於長度時代表移到最後
    pub fn move_item(&mut self, source: usize, target: usize) -> bool {
        let len = self.records.len();
        if source >= len || target > len {
            return false;
        }

        let record = self.records.remove(source);
        let target = if source < target { target - 1 } else { target };
        self.records.insert(target, record);
        true
    }

    /// 依檔名排序，每次呼叫切換升降冪，回傳排序後是否為升冪
    pub fn sort_by_name(&mut self) -> bool {
        self.name_ascending = !self.name_ascending;
        if self.name_ascending {
            self.records
                .sort_by_cached_key(|r| natural_sort_key(&r.name));
        } else {
            self.records
                .sort_by_cached_key(|r| Reverse(natural_sort_key(&r.name)));
        }
        self.name_ascending
    }

    /// 依修改時間排序，每次呼叫切換升降冪，回傳排序後是否為升冪
    pub fn sort_by_mtime(&mut self) -> bool {
        self.time_ascending = !self.time_ascending;
        if self.time_ascending {
            self.records.sort_by_key(|r| r.modified);
        } else {
            self.records.sort_by_key(|r| Reverse(r.modified));
        }
        self.time_ascending
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn names(list: &FileList) -> Vec<&str> {
        list.records().iter().map(|r| r.name.as_str()).collect()
    }

    fn list_of(names: &[&str]) -> FileList {
        let mut list = FileList::new();
        list.add_paths(names.iter().map(|n| PathBuf::from(format!("/virtual/{n}"))));
        list
    }

    #[test]
    fn test_add_paths_dedupes() {
        let mut list = FileList::new();
        assert_eq!(list.add_paths(["/a/x.txt", "/a/y.txt"]), 2);
        assert_eq!(list.add_paths(["/a/x.txt", "/a/z.txt"]), 1);
        assert_eq!(names(&list), vec!["x.txt", "y.txt", "z.txt"]);
    }

    #[test]
    fn test_missing_file_gets_epoch_mtime() {
        let mut list = FileList::new();
        list.add_paths(["/definitely/not/here.bin"]);
        assert_eq!(list.records()[0].modified, SystemTime::UNIX_EPOCH);
    }

    #[test]
    fn test_add_directory_is_flat_and_natural() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("ep10.mp4"), "").unwrap();
        fs::write(temp_dir.path().join("ep2.mp4"), "").unwrap();
        fs::create_dir(temp_dir.path().join("nested")).unwrap();
        fs::write(temp_dir.path().join("nested").join("ep1.mp4"), "").unwrap();

        let mut list = FileList::new();
        assert_eq!(list.add_directory(temp_dir.path()).unwrap(), 2);
        assert_eq!(names(&list), vec!["ep2.mp4", "ep10.mp4"]);
    }

    #[test]
    fn test_remove_handles_unordered_indices() {
        let mut list = list_of(&["a", "b", "c", "d"]);
        assert_eq!(list.remove(&[0, 2, 9, 2]), 2);
        assert_eq!(names(&list), vec!["b", "d"]);
    }

    #[test]
    fn test_move_item_drag_semantics() {
        let mut list = list_of(&["a", "b", "c", "d"]);
        // 把 a 拖到 c 前面
        assert!(list.move_item(0, 2));
        assert_eq!(names(&list), vec!["b", "a", "c", "d"]);

        // 把 d 拖到最前面
        assert!(list.move_item(3, 0));
        assert_eq!(names(&list), vec!["d", "b", "a", "c"]);

        // 拖到尾端
        assert!(list.move_item(0, 4));
        assert_eq!(names(&list), vec!["b", "a", "c", "d"]);

        assert!(!list.move_item(7, 0));
        assert!(!list.move_item(0, 5));
    }

    #[test]
    fn test_sort_by_name_toggles() {
        let mut list = list_of(&["item2", "item10", "item1"]);
        assert!(!list.sort_by_name());
        assert_eq!(names(&list), vec!["item10", "item2", "item1"]);
        assert!(list.sort_by_name());
        assert_eq!(names(&list), vec!["item1", "item2", "item10"]);
    }

    #[test]
    fn test_sort_by_mtime_toggles() {
        let mut list = list_of(&["new", "old"]);
        list.records_mut()[0].modified = SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(200);
        list.records_mut()[1].modified = SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(100);

        assert!(!list.sort_by_mtime());
        assert_eq!(names(&list), vec!["new", "old"]);
        assert!(list.sort_by_mtime());
        assert_eq!(names(&list), vec!["old", "new"]);
    }

    #[test]
    fn test_clear() {
        let mut list = list_of(&["a"]);
        list.clear();
        assert!(list.is_empty());
    }
}
