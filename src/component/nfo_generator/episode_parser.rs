//! 從影片檔名推斷集數與單集標題

use regex::{Regex, RegexBuilder};
use std::sync::LazyLock;

/// 依序嘗試的集數格式，第一個符合的為準
static EPISODE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\[P(\d+)\]",          // [P01]
        r"[._ \-]Ep?(\d+)",     // .E01、 Ep01、-e01
        r"S\d+E(\d+)",          // S01E01
        r"\[(\d+)\]",           // [01]
        r"第(\d+)[集话]",       // 第1集、第1话
        r"^[^\w]*(\d+)[._ \-]", // 01. xxx、01-xxx
    ]
    .iter()
    .map(|pattern| {
        RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .expect("Invalid regex")
    })
    .collect()
});

static REGEX_LEADING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\s*[.\-]?\s*").expect("Invalid regex"));

/// 從檔名取出集數，找不到或為 0 時回傳 None
#[must_use]
pub fn extract_episode_number(file_name: &str) -> Option<u32> {
    EPISODE_PATTERNS.iter().find_map(|pattern| {
        pattern
            .captures(file_name)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<u32>().ok())
    })
    .filter(|&number| number > 0)
}

/// 從不含副檔名的檔名取出單集標題
///
/// 取最後一個 `]` 之後、再取最後一個 `-` 之後的文字，並去掉開頭的編號
#[must_use]
pub fn extract_episode_title(base_name: &str) -> String {
    let after_bracket = base_name.rsplit(']').next().unwrap_or(base_name).trim();
    let after_dash = after_bracket.rsplit('-').next().unwrap_or(after_bracket).trim();
    REGEX_LEADING_NUMBER.replace(after_dash, "").into_owned()
}

/// 檔名沒有集數時使用的遞補計數器，只有實際用到時才遞增
#[derive(Debug, Clone)]
pub struct EpisodeCounter {
    next: u32,
}

impl EpisodeCounter {
    #[must_use]
    pub const fn new(first_episode: u32) -> Self {
        Self {
            next: first_episode,
        }
    }

    /// 檔名有集數就用檔名的，否則取用計數器
    pub fn resolve(&mut self, file_name: &str) -> u32 {
        extract_episode_number(file_name).unwrap_or_else(|| {
            let number = self.next;
            self.next += 1;
            number
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bracket_p_format() {
        assert_eq!(extract_episode_number("[P01]x.mp4"), Some(1));
        assert_eq!(extract_episode_number("[p12] lesson.mkv"), Some(12));
    }

    #[test]
    fn test_season_episode_format() {
        assert_eq!(extract_episode_number("S01E02.mp4"), Some(2));
        assert_eq!(extract_episode_number("show.s02e11.mkv"), Some(11));
    }

    #[test]
    fn test_other_formats() {
        assert_eq!(extract_episode_number("Show - Ep07.mp4"), Some(7));
        assert_eq!(extract_episode_number("Show [03].mp4"), Some(3));
        assert_eq!(extract_episode_number("第5集 開始.mp4"), Some(5));
        assert_eq!(extract_episode_number("第8话.mp4"), Some(8));
        assert_eq!(extract_episode_number("04. intro.mp4"), Some(4));
    }

    #[test]
    fn test_no_match_and_zero() {
        assert_eq!(extract_episode_number("intro.mp4"), None);
        assert_eq!(extract_episode_number("[P00]trailer.mp4"), None);
    }

    #[test]
    fn test_counter_only_advances_when_used() {
        let mut counter = EpisodeCounter::new(1);
        assert_eq!(counter.resolve("intro.mp4"), 1);
        assert_eq!(counter.resolve("S01E09.mp4"), 9);
        assert_eq!(counter.resolve("outro.mp4"), 2);
    }

    #[test]
    fn test_extract_episode_title() {
        assert_eq!(extract_episode_title("[P01] Rust 入門"), "Rust 入門");
        assert_eq!(extract_episode_title("Course - 03. Ownership"), "Ownership");
        assert_eq!(extract_episode_title("12 - "), "");
        assert_eq!(extract_episode_title("plain"), "plain");
    }
}
