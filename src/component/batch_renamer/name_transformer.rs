//! 檔名轉換
//!
//! 依序執行：刪除字元、正則替換、加上前後綴、替換序號佔位字元、補回副檔名

use super::rename_settings::CompiledRenameSettings;

/// 拆出副檔名（含點）
///
/// 以最後一個點為界，但開頭連續的點不算副檔名，
/// 例如 `.bashrc` 沒有副檔名、`a.tar.gz` 的副檔名是 `.gz`
#[must_use]
pub fn split_extension(name: &str) -> (&str, &str) {
    let Some(dot) = name.rfind('.') else {
        return (name, "");
    };

    if name[..dot].chars().all(|c| c == '.') {
        return (name, "");
    }

    name.split_at(dot)
}

/// 將序號補零到指定長度，超過長度時保留完整數字
#[must_use]
pub fn format_number(number: u64, width: usize) -> String {
    format!("{number:0width$}")
}

/// 產生新檔名
#[must_use]
pub fn generate_new_name(original: &str, number: u64, settings: &CompiledRenameSettings) -> String {
    let (base, extension) = split_extension(original);

    let mut name: String = base
        .chars()
        .filter(|c| !settings.remove_chars.contains(c))
        .collect();

    if let Some(regex) = &settings.regex {
        name = regex
            .replace_all(&name, settings.replacement.as_str())
            .into_owned();
    }

    let mut name = format!("{}{}{}", settings.prefix, name, settings.suffix);

    if name.contains(settings.placeholder) {
        let number = format_number(number, settings.number_width);
        name = name.replace(settings.placeholder, &number);
    }

    if settings.keep_extension {
        name.push_str(extension);
    }

    name
}
