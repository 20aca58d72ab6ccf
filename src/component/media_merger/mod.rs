//! 影音合併元件
//!
//! 合併影片、擷取音訊、合併音訊（可標準化音量）、封裝外部音軌與字幕

mod main;

pub use main::{AUDIO_FORMATS, MediaMerger, VIDEO_FORMATS};
