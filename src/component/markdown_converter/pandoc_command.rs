//! pandoc 命令建構

use crate::config::MarkdownSettings;
use anyhow::{Context, Result};
use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

/// Markdown 轉 HTML 片段，結果輸出到 stdout
#[must_use]
pub fn html_fragment_args(input: &Path) -> Vec<OsString> {
    vec![
        "-f".into(),
        "gfm".into(),
        "-t".into(),
        "html".into(),
        input.as_os_str().to_os_string(),
    ]
}

/// Markdown 經 xelatex 轉 PDF
#[must_use]
pub fn pdf_args(input: &Path, output: &Path, settings: &MarkdownSettings) -> Vec<OsString> {
    let resource_dir = input.parent().unwrap_or_else(|| Path::new("."));

    let mut resource_path = OsString::from("--resource-path=");
    resource_path.push(resource_dir.as_os_str());

    vec![
        input.as_os_str().to_os_string(),
        "--pdf-engine=xelatex".into(),
        resource_path,
        "-f".into(),
        "commonmark+pipe_tables+tex_math_dollars".into(),
        "--highlight-style=tango".into(),
        "-V".into(),
        format!("CJKmainfont={}", settings.cjk_main_font).into(),
        "-V".into(),
        format!("mainfont={}", settings.main_font).into(),
        "-V".into(),
        format!("monofont={}", settings.mono_font).into(),
        "-V".into(),
        "geometry:margin=1in".into(),
        "-V".into(),
        "fontsize=12pt".into(),
        "-o".into(),
        output.as_os_str().to_os_string(),
    ]
}

/// 把引擎目錄放在 PATH 最前面
pub fn path_with_engine_dir(engine_dir: &Path) -> Result<OsString> {
    let current = std::env::var_os("PATH").unwrap_or_default();
    let paths = std::iter::once(engine_dir.to_path_buf()).chain(std::env::split_paths(&current));
    std::env::join_paths(paths).context("PDF 引擎路徑包含無效字元")
}

#[must_use]
pub fn html_fragment_command(input: &Path) -> Command {
    let mut command = Command::new("pandoc");
    command.args(html_fragment_args(input));
    command
}

pub fn pdf_command(input: &Path, output: &Path, settings: &MarkdownSettings) -> Result<Command> {
    let mut command = Command::new("pandoc");
    command.args(pdf_args(input, output, settings));

    if let Some(dir) = settings.pdf_engine_dir.as_deref().filter(|d| !d.is_empty()) {
        command.env("PATH", path_with_engine_dir(Path::new(dir))?);
    }
    Ok(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_strings(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().to_string()).collect()
    }

    #[test]
    fn test_html_fragment_args() {
        let args = as_strings(&html_fragment_args(Path::new("/notes/a.md")));
        assert_eq!(args, vec!["-f", "gfm", "-t", "html", "/notes/a.md"]);
    }

    #[test]
    fn test_pdf_args() {
        let settings = MarkdownSettings::default();
        let args = as_strings(&pdf_args(
            Path::new("/notes/a.md"),
            Path::new("/out/a.pdf"),
            &settings,
        ));

        assert_eq!(args[0], "/notes/a.md");
        assert!(args.contains(&"--pdf-engine=xelatex".to_string()));
        assert!(args.contains(&"--resource-path=/notes".to_string()));
        assert!(args.contains(&"commonmark+pipe_tables+tex_math_dollars".to_string()));
        assert!(args.contains(&"CJKmainfont=Microsoft YaHei UI".to_string()));
        assert!(args.contains(&"mainfont=Times New Roman".to_string()));
        assert!(args.contains(&"monofont=Consolas".to_string()));
        assert!(args.contains(&"geometry:margin=1in".to_string()));
        assert!(args.contains(&"fontsize=12pt".to_string()));
        assert_eq!(&args[args.len() - 2..], ["-o", "/out/a.pdf"]);
    }

    #[test]
    fn test_engine_dir_is_prepended() {
        let path = path_with_engine_dir(Path::new("/opt/texlive/bin")).unwrap();
        let first = std::env::split_paths(&path).next().unwrap();
        assert_eq!(first, Path::new("/opt/texlive/bin"));
    }
}
