//! 重新命名參數的驗證與編譯
//!
//! 正則表達式只在這裡編譯一次，錯誤在執行前就回報

use crate::config::RenameSettings;
use anyhow::{Context, Result, bail};
use regex::{Regex, RegexBuilder};
use std::collections::HashSet;
use std::ops::RangeInclusive;

pub const NUMBER_WIDTH_RANGE: RangeInclusive<usize> = 1..=10;
pub const START_NUMBER_RANGE: RangeInclusive<u64> = 0..=999_999;
pub const STEP_RANGE: RangeInclusive<u64> = 1..=100;

/// 編譯後可直接套用的重新命名參數
#[derive(Debug, Clone)]
pub struct CompiledRenameSettings {
    pub prefix: String,
    pub suffix: String,
    pub remove_chars: HashSet<char>,
    pub regex: Option<Regex>,
    /// 已轉成 `regex` crate 語法的替換字串
    pub replacement: String,
    pub placeholder: char,
    pub number_width: usize,
    pub start_number: u64,
    pub step: u64,
    pub keep_extension: bool,
}

impl CompiledRenameSettings {
    /// 第 `index` 個檔案（從 0 開始）使用的序號
    #[must_use]
    pub fn number_at(&self, index: usize) -> u64 {
        self.start_number + self.step * index as u64
    }
}

pub fn validate(settings: &RenameSettings) -> Result<()> {
    if !NUMBER_WIDTH_RANGE.contains(&settings.number_width) {
        bail!(
            "序號長度必須介於 {} 到 {} 之間",
            NUMBER_WIDTH_RANGE.start(),
            NUMBER_WIDTH_RANGE.end()
        );
    }
    if !START_NUMBER_RANGE.contains(&settings.start_number) {
        bail!(
            "起始序號必須介於 {} 到 {} 之間",
            START_NUMBER_RANGE.start(),
            START_NUMBER_RANGE.end()
        );
    }
    if !STEP_RANGE.contains(&settings.step) {
        bail!(
            "序號間隔必須介於 {} 到 {} 之間",
            STEP_RANGE.start(),
            STEP_RANGE.end()
        );
    }
    Ok(())
}

pub fn compile(settings: &RenameSettings) -> Result<CompiledRenameSettings> {
    validate(settings)?;

    let regex = if settings.regex_pattern.is_empty() {
        None
    } else {
        let compiled = RegexBuilder::new(&settings.regex_pattern)
            .case_insensitive(!settings.regex_case_sensitive)
            .build()
            .with_context(|| format!("無效的正則表達式: {}", settings.regex_pattern))?;
        Some(compiled)
    };

    Ok(CompiledRenameSettings {
        prefix: settings.prefix.clone(),
        suffix: settings.suffix.clone(),
        remove_chars: settings.remove_chars.chars().collect(),
        regex,
        replacement: normalize_replacement(&settings.regex_replacement),
        placeholder: settings.number_placeholder,
        number_width: settings.number_width,
        start_number: settings.start_number,
        step: settings.step,
        keep_extension: settings.keep_extension,
    })
}

/// 將 `\1`、`\g<name>` 形式的群組參照轉成 `${1}`、`${name}`
///
/// 其餘的 `$` 一律是字面字元，跳脫成 `$$`
#[must_use]
pub fn normalize_replacement(replacement: &str) -> String {
    let mut result = String::with_capacity(replacement.len());
    let mut chars = replacement.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' {
            result.push_str("$$");
            continue;
        }
        if c != '\\' {
            result.push(c);
            continue;
        }

        match chars.peek().copied() {
            Some(d) if d.is_ascii_digit() => {
                let mut group = String::new();
                while let Some(&d) = chars.peek() {
                    if !d.is_ascii_digit() {
                        break;
                    }
                    group.push(d);
                    chars.next();
                }
                result.push_str(&format!("${{{group}}}"));
            }
            Some('g') => {
                let rest: String = chars.clone().collect();
                let named = rest
                    .strip_prefix("g<")
                    .and_then(|r| r.split_once('>'))
                    .map(|(name, _)| name.to_string())
                    .filter(|name| !name.is_empty());
                if let Some(name) = named {
                    // 跳過 g<name>
                    for _ in 0..name.chars().count() + 3 {
                        chars.next();
                    }
                    result.push_str(&format!("${{{name}}}"));
                } else {
                    result.push('\\');
                }
            }
            Some('\\') => {
                chars.next();
                result.push('\\');
            }
            _ => result.push('\\'),
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_compile() {
        let compiled = compile(&RenameSettings::default()).unwrap();
        assert!(compiled.regex.is_none());
        assert_eq!(compiled.placeholder, '@');
        assert_eq!(compiled.number_at(0), 1);
    }

    #[test]
    fn test_invalid_regex_reported() {
        let settings = RenameSettings {
            regex_pattern: "(unclosed".to_string(),
            ..RenameSettings::default()
        };
        let err = compile(&settings).unwrap_err();
        assert!(format!("{err:#}").contains("(unclosed"));
    }

    #[test]
    fn test_range_validation() {
        let zero_width = RenameSettings {
            number_width: 0,
            ..RenameSettings::default()
        };
        assert!(validate(&zero_width).is_err());

        let big_step = RenameSettings {
            step: 101,
            ..RenameSettings::default()
        };
        assert!(validate(&big_step).is_err());

        let big_start = RenameSettings {
            start_number: 1_000_000,
            ..RenameSettings::default()
        };
        assert!(validate(&big_start).is_err());
    }

    #[test]
    fn test_case_insensitive_regex() {
        let settings = RenameSettings {
            regex_pattern: "abc".to_string(),
            regex_case_sensitive: false,
            ..RenameSettings::default()
        };
        let compiled = compile(&settings).unwrap();
        assert!(compiled.regex.unwrap().is_match("xABCx"));
    }

    #[test]
    fn test_normalize_replacement() {
        assert_eq!(normalize_replacement(r"\1-\2"), "${1}-${2}");
        assert_eq!(normalize_replacement(r"\g<ep>_x"), "${ep}_x");
        assert_eq!(normalize_replacement("$1 ${name}"), "$$1 $${name}");
        assert_eq!(normalize_replacement(r"US$5 \1"), "US$$5 ${1}");
        assert_eq!(normalize_replacement(r"a\\b"), r"a\b");
        assert_eq!(normalize_replacement(r"\gx"), r"\gx");
    }

    #[test]
    fn test_number_at_steps() {
        let settings = RenameSettings {
            start_number: 5,
            step: 3,
            ..RenameSettings::default()
        };
        let compiled = compile(&settings).unwrap();
        assert_eq!(compiled.number_at(2), 11);
    }
}
