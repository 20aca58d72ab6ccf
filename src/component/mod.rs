//! 功能元件模組
//!
//! 每個子模組實現一個獨立的工具，包含主要邏輯和專用輔助函式

pub mod batch_renamer;
pub mod directory_flattener;
pub mod markdown_converter;
pub mod media_cropper;
pub mod media_merger;
pub mod nfo_generator;

pub use batch_renamer::BatchRenamer;
pub use directory_flattener::DirectoryFlattener;
pub use markdown_converter::MarkdownConverter;
pub use media_cropper::MediaCropper;
pub use media_merger::MediaMerger;
pub use nfo_generator::NfoGenerator;
