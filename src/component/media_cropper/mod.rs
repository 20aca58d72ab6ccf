//! 影片裁切元件
//!
//! 指定時間區間後以串流複製裁切影片或擷取該段音訊，可先用 mpv 預覽

mod crop_range;
mod main;

pub use crop_range::{CropRange, preview_task};
pub use main::MediaCropper;
