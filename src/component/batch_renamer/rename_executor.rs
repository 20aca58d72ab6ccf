//! 重新命名預覽與執行

use super::file_list::{FileList, modified_time};
use super::name_transformer::generate_new_name;
use super::rename_settings::CompiledRenameSettings;
use log::{info, warn};
use std::fs;

/// 預覽單筆結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamePreview {
    pub old_name: String,
    pub new_name: String,
}

impl RenamePreview {
    #[must_use]
    pub fn is_unchanged(&self) -> bool {
        self.old_name == self.new_name
    }
}

#[derive(Debug, Default)]
pub struct RenameResult {
    pub renamed: usize,
    pub unchanged: usize,
    pub errors: Vec<String>,
}

/// 計算每個檔案的新名稱，不動到磁碟
#[must_use]
pub fn preview(list: &FileList, settings: &CompiledRenameSettings) -> Vec<RenamePreview> {
    list.records()
        .iter()
        .enumerate()
        .map(|(index, record)| RenamePreview {
            old_name: record.name.clone(),
            new_name: generate_new_name(&record.name, settings.number_at(index), settings),
        })
        .collect()
}

/// 依清單順序重新命名
///
/// 序號對每個檔案都會遞增，不論該檔案是否實際改名。
/// 目標檔案已存在時不覆蓋，記為錯誤。
pub fn execute(list: &mut FileList, settings: &CompiledRenameSettings) -> RenameResult {
    let mut result = RenameResult::default();

    for (index, record) in list.records_mut().iter_mut().enumerate() {
        let new_name = generate_new_name(&record.name, settings.number_at(index), settings);
        if new_name == record.name {
            result.unchanged += 1;
            continue;
        }

        let new_path = record
            .path
            .parent()
            .map_or_else(|| new_name.clone().into(), |dir| dir.join(&new_name));

        if new_path.exists() {
            warn!("目標已存在，略過: {}", new_path.display());
            result
                .errors
                .push(format!("無法重新命名 {}: 目標 {} 已存在", record.name, new_name));
            continue;
        }

        match fs::rename(&record.path, &new_path) {
            Ok(()) => {
                info!("重新命名: {} -> {}", record.name, new_name);
                record.modified = modified_time(&new_path);
                record.name = new_name;
                record.path = new_path;
                result.renamed += 1;
            }
            Err(e) => {
                warn!("重新命名失敗 {}: {e}", record.path.display());
                result
                    .errors
                    .push(format!("無法重新命名 {}: {e}", record.name));
            }
        }
    }

    result
}
