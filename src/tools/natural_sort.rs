//! 自然排序
//!
//! 將字串拆成文字與數字片段，數字片段以數值比較，文字片段以小寫比較，
//! 讓 `item2` 排在 `item10` 之前

use std::cmp::Ordering;

/// 排序鍵的單一片段
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyPart {
    Text(String),
    /// 去除前導零後的數字字串，任意長度都能正確比較
    Number(String),
}

impl Ord for KeyPart {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.len().cmp(&b.len()).then_with(|| a.cmp(b)),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Number(_), Self::Text(_)) => Ordering::Less,
            (Self::Text(_), Self::Number(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for KeyPart {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// 自然排序鍵，片段永遠以文字開頭並文字、數字交替
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct NaturalKey(Vec<KeyPart>);

impl NaturalKey {
    #[must_use]
    pub fn parts(&self) -> &[KeyPart] {
        &self.0
    }
}

#[must_use]
pub fn natural_sort_key(s: &str) -> NaturalKey {
    let mut parts = Vec::new();
    let mut text = String::new();
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if !c.is_ascii_digit() {
            text.push(c);
            continue;
        }

        parts.push(KeyPart::Text(std::mem::take(&mut text).to_lowercase()));

        let mut digits = String::from(c);
        while let Some(&next) = chars.peek() {
            if !next.is_ascii_digit() {
                break;
            }
            digits.push(next);
            chars.next();
        }
        parts.push(KeyPart::Number(digits.trim_start_matches('0').to_string()));
    }
    parts.push(KeyPart::Text(text.to_lowercase()));

    NaturalKey(parts)
}

#[must_use]
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    natural_sort_key(a).cmp(&natural_sort_key(b))
}

/// 依自然排序就地排序，`key` 取出用來比較的字串
pub fn sort_naturally<T, F>(items: &mut [T], key: F)
where
    F: Fn(&T) -> &str,
{
    items.sort_by_cached_key(|item| natural_sort_key(key(item)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers_compare_by_value() {
        let mut names = vec!["item10", "item2", "item1"];
        sort_naturally(&mut names, |s| *s);
        assert_eq!(names, vec!["item1", "item2", "item10"]);
    }

    #[test]
    fn test_text_is_case_insensitive() {
        assert_eq!(natural_cmp("Alpha", "alpha"), Ordering::Equal);
        assert_eq!(natural_cmp("apple", "Banana"), Ordering::Less);
    }

    #[test]
    fn test_leading_zeros_equal_value() {
        assert_eq!(natural_cmp("ep01", "ep1"), Ordering::Equal);
        assert_eq!(natural_cmp("ep009", "ep10"), Ordering::Less);
    }

    #[test]
    fn test_huge_numbers_do_not_overflow() {
        let big = "file123456789012345678901234567890";
        let bigger = "file1234567890123456789012345678901";
        assert_eq!(natural_cmp(big, bigger), Ordering::Less);
    }

    #[test]
    fn test_key_alternates_text_and_number() {
        let key = natural_sort_key("10a");
        assert_eq!(
            key.parts(),
            &[
                KeyPart::Text(String::new()),
                KeyPart::Number("10".to_string()),
                KeyPart::Text("a".to_string()),
            ]
        );
    }

    #[test]
    fn test_chapter_style_names() {
        let mut names = vec!["第10集.mp4", "第2集.mp4", "第1集.mp4"];
        sort_naturally(&mut names, |s| *s);
        assert_eq!(names, vec!["第1集.mp4", "第2集.mp4", "第10集.mp4"]);
    }
}
