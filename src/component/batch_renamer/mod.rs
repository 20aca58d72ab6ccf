//! 批次重新命名元件
//!
//! 可自訂前後綴、刪除字元、正則替換與序號的檔名批次修改工具

mod file_list;
mod main;
mod name_transformer;
mod rename_executor;
mod rename_settings;

pub use file_list::{FileList, FileRecord};
pub use main::BatchRenamer;
pub use name_transformer::{format_number, generate_new_name, split_extension};
pub use rename_executor::{RenamePreview, RenameResult, execute, preview};
pub use rename_settings::{CompiledRenameSettings, compile, normalize_replacement, validate};
