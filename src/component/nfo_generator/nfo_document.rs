//! NFO 文件的產生與讀取

use anyhow::{Context, Result, bail};
use quick_xml::Reader;
use quick_xml::escape::{escape, unescape};
use quick_xml::events::Event;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

const XML_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// 讀取 tvshow.nfo 時年份缺少或無法解析的預設值
pub const FALLBACK_YEAR: u32 = 2000;

pub const TVSHOW_NFO: &str = "tvshow.nfo";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TvShowInfo {
    pub title: String,
    pub original_title: String,
    pub plot: String,
    pub year: u32,
    pub genre: String,
    pub studio: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeInfo {
    pub title: String,
    pub show_title: String,
    pub season: u32,
    pub episode: u32,
    pub plot: String,
    pub year: u32,
}

#[must_use]
pub fn escape_xml(text: &str) -> String {
    escape(text).into_owned()
}

/// 還原實體與數值字元參照，無法解析時原樣保留
#[must_use]
pub fn unescape_xml(text: &str) -> String {
    unescape(text).map_or_else(|_| text.to_string(), |s| s.into_owned())
}

impl TvShowInfo {
    #[must_use]
    pub fn to_xml(&self) -> String {
        format!(
            "{XML_HEADER}
<tvshow>
    <title>{}</title>
    <originaltitle>{}</originaltitle>
    <plot>{}</plot>
    <year>{}</year>
    <genre>{}</genre>
    <studio>{}</studio>
</tvshow>",
            escape_xml(&self.title),
            escape_xml(&self.original_title),
            escape_xml(&self.plot),
            self.year,
            escape_xml(&self.genre),
            escape_xml(&self.studio),
        )
    }

    /// 解析 tvshow.nfo 內容，缺少的欄位留空
    ///
    /// 根元素必須是 `<tvshow>`
    pub fn from_xml(xml: &str) -> Result<Self> {
        let mut fields = child_texts(xml, "tvshow")?;
        let mut take = |tag: &str| fields.remove(tag).unwrap_or_default();
        Ok(Self {
            title: take("title"),
            original_title: take("originaltitle"),
            plot: take("plot"),
            year: take("year").trim().parse().unwrap_or(FALLBACK_YEAR),
            genre: take("genre"),
            studio: take("studio"),
        })
    }

    /// 讀取資料夾中的 tvshow.nfo，不存在時回傳 None
    pub fn load_from_folder(folder: &Path) -> Result<Option<Self>> {
        let path = folder.join(TVSHOW_NFO);
        if !path.is_file() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("無法讀取 {}", path.display()))?;
        let show = Self::from_xml(&content)
            .with_context(|| format!("{} 格式錯誤", path.display()))?;
        Ok(Some(show))
    }
}

impl EpisodeInfo {
    #[must_use]
    pub fn to_xml(&self) -> String {
        format!(
            "{XML_HEADER}
<episodedetails>
    <title>{}</title>
    <showtitle>{}</showtitle>
    <season>{}</season>
    <episode>{}</episode>
    <plot>{}</plot>
    <year>{}</year>
</episodedetails>",
            escape_xml(&self.title),
            escape_xml(&self.show_title),
            self.season,
            self.episode,
            escape_xml(&self.plot),
            self.year,
        )
    }
}

/// 讀出根元素下每個子元素的文字，同名元素只取第一個
fn child_texts(xml: &str, root: &str) -> Result<HashMap<String, String>> {
    let mut reader = Reader::from_str(xml);
    let mut fields = HashMap::new();
    let mut depth = 0usize;
    let mut root_found = false;
    let mut current: Option<String> = None;
    let mut text = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                depth += 1;
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if depth == 1 {
                    if name != root {
                        bail!("根元素為 <{name}>，預期 <{root}>");
                    }
                    root_found = true;
                } else if depth == 2 {
                    current = Some(name);
                    text.clear();
                }
            }
            Event::Empty(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if depth == 0 {
                    if name != root {
                        bail!("根元素為 <{name}>，預期 <{root}>");
                    }
                    root_found = true;
                } else if depth == 1 {
                    fields.entry(name).or_insert_with(String::new);
                }
            }
            Event::Text(e) if depth == 2 => text.push_str(&e.unescape()?),
            Event::CData(e) if depth == 2 => {
                text.push_str(&String::from_utf8_lossy(&e.into_inner()));
            }
            Event::End(_) => {
                if depth == 2 {
                    if let Some(name) = current.take() {
                        fields.entry(name).or_insert_with(|| std::mem::take(&mut text));
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !root_found {
        bail!("找不到 <{root}> 元素");
    }
    Ok(fields)
}
