//! NFO 產生器元件
//!
//! 為影片資料夾產生媒體庫使用的 tvshow.nfo 與單集 NFO，可選擇以 AI 產生單集與劇集簡介

mod episode_parser;
mod main;
mod nfo_builder;
mod nfo_document;
mod plot_writer;

pub use episode_parser::{EpisodeCounter, extract_episode_number, extract_episode_title};
pub use main::NfoGenerator;
pub use nfo_builder::{NfoOptions, NfoResult, collect_episode_titles, generate};
pub use nfo_document::{EpisodeInfo, TVSHOW_NFO, TvShowInfo, escape_xml, unescape_xml};
pub use plot_writer::{ChatPlotWriter, EpisodeTitle, PlotWriter, build_prompt, build_show_prompt};
