use anyhow::{Result, bail};

/// 格式化為 `HH:MM:SS.mmm`
#[must_use]
pub fn format_timestamp(seconds: f64) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1000;
    let millis = total_ms % 1000;
    format!("{hours:02}:{minutes:02}:{secs:02}.{millis:03}")
}

/// 可放進檔名的時間戳記，例如 `00-01-05_250`
#[must_use]
pub fn file_name_stamp(seconds: f64) -> String {
    format_timestamp(seconds).replace(':', "-").replace('.', "_")
}

/// 解析 `HH:MM:SS(.mmm)`、`MM:SS(.mmm)` 或純秒數
pub fn parse_timestamp(input: &str) -> Result<f64> {
    let input = input.trim();
    if input.is_empty() {
        bail!("時間不可為空");
    }

    let parts: Vec<&str> = input.split(':').collect();
    if parts.len() > 3 {
        bail!("無法解析時間: {input}");
    }

    let mut total = 0.0;
    for (index, part) in parts.iter().enumerate() {
        let is_last = index == parts.len() - 1;
        let value: f64 = if is_last {
            part.parse().ok()
        } else {
            part.parse::<u64>().ok().map(|v| v as f64)
        }
        .filter(|v: &f64| v.is_finite() && *v >= 0.0)
        .ok_or_else(|| anyhow::anyhow!("無法解析時間: {input}"))?;

        if index > 0 && value >= 60.0 {
            bail!("分或秒超出範圍: {input}");
        }
        total = total * 60.0 + value;
    }

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0.0), "00:00:00.000");
        assert_eq!(format_timestamp(65.25), "00:01:05.250");
        assert_eq!(format_timestamp(3661.5), "01:01:01.500");
    }

    #[test]
    fn test_file_name_stamp() {
        assert_eq!(file_name_stamp(65.25), "00-01-05_250");
    }

    #[test]
    fn test_parse_timestamp_forms() {
        assert!((parse_timestamp("01:01:01.5").unwrap() - 3661.5).abs() < 1e-9);
        assert!((parse_timestamp("2:03").unwrap() - 123.0).abs() < 1e-9);
        assert!((parse_timestamp("42.75").unwrap() - 42.75).abs() < 1e-9);
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert!(parse_timestamp("").is_err());
        assert!(parse_timestamp("abc").is_err());
        assert!(parse_timestamp("1:2:3:4").is_err());
        assert!(parse_timestamp("00:75").is_err());
        assert!(parse_timestamp("-5").is_err());
    }
}
