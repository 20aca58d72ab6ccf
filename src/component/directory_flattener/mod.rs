//! 目錄扁平化元件
//!
//! 將巢狀資料夾中的所有檔案搬到單一輸出資料夾，檔名前綴記錄原本的層級位置

mod flatten_planner;
mod main;

pub use flatten_planner::{FlattenEntry, FlattenPlan, FlattenResult, execute, plan};
pub use main::DirectoryFlattener;
