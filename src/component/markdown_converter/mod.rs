//! Markdown 轉換元件
//!
//! 透過 pandoc 將資料夾內的 Markdown 轉為 HTML 或 PDF，並可為 HTML 產生索引頁

mod asset_fetcher;
mod converter;
mod html_page;
mod index_builder;
mod main;
mod pandoc_command;

pub use asset_fetcher::{ensure_assets, write_custom_css};
pub use converter::{
    ConversionResult, convert_file_to_html, convert_file_to_pdf, convert_to_html, convert_to_pdf,
    list_markdown_files,
};
pub use html_page::{CUSTOM_CSS, CUSTOM_CSS_FILE, REMOTE_ASSETS, render_page};
pub use index_builder::{IndexResult, collect_index_entries, render_index, write_index};
pub use main::MarkdownConverter;
pub use pandoc_command::{html_fragment_args, pdf_args, path_with_engine_dir};
