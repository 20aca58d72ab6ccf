use crate::tools::task_runner::ExternalTask;
use anyhow::{Context, Result, bail};
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use uuid::Uuid;

/// loudnorm 音量標準化參數
pub const LOUDNORM_FILTER: &str = "loudnorm=I=-16:LRA=11:TP=-1.5";

/// concat demuxer 用的清單檔
#[derive(Debug, Clone)]
pub struct ConcatList {
    pub path: PathBuf,
    pub content: String,
}

impl ConcatList {
    /// 清單內的相對路徑會以清單檔所在資料夾為基準解析，因此一律寫入絕對路徑
    fn new(inputs: &[PathBuf], directory: &Path) -> Result<Self> {
        let mut content = String::new();
        for input in inputs {
            let absolute = std::path::absolute(input)
                .with_context(|| format!("無法取得絕對路徑: {}", input.display()))?;
            content.push_str(&format!("file '{}'\n", escape_concat_path(&absolute)));
        }
        let path = directory.join(format!("ffmpeg_list_{}.txt", Uuid::new_v4().simple()));
        Ok(Self { path, content })
    }
}

/// concat 清單中以單引號包住路徑，路徑內的單引號寫成 `'\''`
fn escape_concat_path(path: &Path) -> String {
    path.to_string_lossy().replace('\'', r"'\''")
}

/// 依輸出格式選擇音訊編碼器，回傳 None 時交給 ffmpeg 自行決定
#[must_use]
pub fn audio_codec_for(format: &str, normalize: bool) -> Option<&'static str> {
    match format.to_lowercase().as_str() {
        "mp3" => Some("libmp3lame"),
        "ogg" => Some("libvorbis"),
        "m4a" => Some("aac"),
        // 套用濾鏡後無法直接複製串流
        "wav" => Some(if normalize { "pcm_s16le" } else { "copy" }),
        "flac" => Some(if normalize { "flac" } else { "copy" }),
        _ => None,
    }
}

fn seconds_arg(seconds: f64) -> String {
    format!("{seconds:.3}")
}

fn stem_of(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string())
}

fn parent_of(path: &Path) -> PathBuf {
    path.parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    args: Vec<OsString>,
    output_path: PathBuf,
    concat_list: Option<ConcatList>,
}

impl FfmpegCommand {
    fn new(output_path: PathBuf) -> Self {
        Self {
            args: Vec::new(),
            output_path,
            concat_list: None,
        }
    }

    fn arg(&mut self, arg: impl AsRef<OsStr>) -> &mut Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    fn args<I, S>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        for arg in args {
            self.arg(arg);
        }
        self
    }

    fn concat_input(&mut self, inputs: &[PathBuf], directory: &Path) -> Result<&mut Self> {
        let list = ConcatList::new(inputs, directory)?;
        self.args(["-f", "concat", "-safe", "0", "-i"]);
        self.arg(&list.path);
        self.concat_list = Some(list);
        Ok(self)
    }

    /// 以串流複製方式合併多個影片，輸出 `<第一個檔名>_merge.<格式>`
    pub fn concat_videos(inputs: &[PathBuf], format: &str) -> Result<Self> {
        if inputs.len() < 2 {
            bail!("請至少選擇兩個影片檔案進行合併");
        }
        let first = &inputs[0];
        let directory = parent_of(first);
        let output = directory.join(format!("{}_merge.{format}", stem_of(first)));

        let mut cmd = Self::new(output);
        cmd.concat_input(inputs, &directory)?;
        cmd.args(["-c", "copy", "-y"]);
        let output = cmd.output_path.clone();
        cmd.arg(output);
        Ok(cmd)
    }

    /// 合併多個音訊，可選擇套用音量標準化，輸出 `<第一個檔名>_merged.<格式>`
    pub fn concat_audios(inputs: &[PathBuf], format: &str, normalize: bool) -> Result<Self> {
        if inputs.len() < 2 {
            bail!("請至少選擇兩個音訊檔案進行合併");
        }
        let first = &inputs[0];
        let directory = parent_of(first);
        let output = directory.join(format!("{}_merged.{format}", stem_of(first)));

        let mut cmd = Self::new(output);
        cmd.concat_input(inputs, &directory)?;
        if normalize {
            cmd.args(["-filter:a", LOUDNORM_FILTER]);
        }
        if let Some(codec) = audio_codec_for(format, normalize) {
            cmd.args(["-c:a", codec]);
        }
        cmd.arg("-y");
        let output = cmd.output_path.clone();
        cmd.arg(output);
        Ok(cmd)
    }

    /// 從影片擷取 mp3 音訊，輸出 `<檔名>_audio.mp3`
    #[must_use]
    pub fn extract_audio(input: &Path) -> Self {
        let output = parent_of(input).join(format!("{}_audio.mp3", stem_of(input)));

        let mut cmd = Self::new(output);
        cmd.arg("-i").arg(input);
        cmd.args(["-vn", "-c:a", "libmp3lame", "-q:a", "2", "-y"]);
        let output = cmd.output_path.clone();
        cmd.arg(output);
        cmd
    }

    /// 將影片與外部音軌、字幕封裝在一起，至少需要音軌或字幕其中之一
    pub fn mux_streams(
        video: &Path,
        audio: Option<&Path>,
        subtitle: Option<&Path>,
        format: &str,
    ) -> Result<Self> {
        if audio.is_none() && subtitle.is_none() {
            bail!("請至少搭配一個音訊或字幕檔案");
        }

        let output = parent_of(video).join(format!("{}_merge.{format}", stem_of(video)));
        let mut inputs: Vec<OsString> = vec!["-i".into(), video.as_os_str().to_os_string()];
        let mut maps: Vec<String> = vec!["-map".into(), "0:v:0".into()];
        let mut codecs: Vec<String> = vec!["-c:v".into(), "copy".into()];
        let mut next_input = 1;

        if let Some(audio) = audio {
            inputs.extend(["-i".into(), audio.as_os_str().to_os_string()]);
            maps.extend(["-map".into(), format!("{next_input}:a:0")]);
            next_input += 1;
        } else {
            // 沒有外部音軌時保留原影片音軌，`?` 讓沒有音軌的影片不報錯
            maps.extend(["-map".into(), "0:a?".into()]);
        }
        codecs.extend(["-c:a".into(), "copy".into()]);

        if let Some(subtitle) = subtitle {
            inputs.extend(["-i".into(), subtitle.as_os_str().to_os_string()]);
            maps.extend(["-map".into(), format!("{next_input}:s:0")]);
            let subtitle_codec = if format.eq_ignore_ascii_case("mp4") {
                "mov_text"
            } else {
                "copy"
            };
            codecs.extend(["-c:s".into(), subtitle_codec.into()]);
        }

        let mut cmd = Self::new(output);
        cmd.arg("-y");
        cmd.args(inputs).args(maps).args(codecs);
        let output = cmd.output_path.clone();
        cmd.arg(output);
        Ok(cmd)
    }

    /// 以串流複製裁切片段，輸出 `<檔名>_crop_<開始>_<結束><副檔名>`
    #[must_use]
    pub fn crop_segment(input: &Path, start: f64, end: f64, stamps: (&str, &str)) -> Self {
        let extension = input
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        let output = parent_of(input).join(format!(
            "{}_crop_{}_{}{extension}",
            stem_of(input),
            stamps.0,
            stamps.1
        ));

        let (start_arg, end_arg) = (seconds_arg(start), seconds_arg(end));
        let mut cmd = Self::new(output);
        cmd.args(["-y", "-ss", start_arg.as_str(), "-to", end_arg.as_str(), "-i"]);
        cmd.arg(input);
        cmd.args(["-c", "copy", "-avoid_negative_ts", "1"]);
        let output = cmd.output_path.clone();
        cmd.arg(output);
        cmd
    }

    /// 擷取片段音訊為 mp3，輸出 `<檔名>_audio_<開始>_<結束>.mp3`
    #[must_use]
    pub fn extract_audio_segment(input: &Path, start: f64, end: f64, stamps: (&str, &str)) -> Self {
        let output = parent_of(input).join(format!(
            "{}_audio_{}_{}.mp3",
            stem_of(input),
            stamps.0,
            stamps.1
        ));

        let (start_arg, end_arg) = (seconds_arg(start), seconds_arg(end));
        let mut cmd = Self::new(output);
        cmd.args(["-y", "-i"]);
        cmd.arg(input);
        cmd.args(["-ss", start_arg.as_str(), "-to", end_arg.as_str()]);
        cmd.args(["-vn", "-c:a", "libmp3lame", "-q:a", "2"]);
        let output = cmd.output_path.clone();
        cmd.arg(output);
        cmd
    }

    #[must_use]
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    #[must_use]
    pub fn concat_list(&self) -> Option<&ConcatList> {
        self.concat_list.as_ref()
    }

    #[must_use]
    pub fn arguments(&self) -> &[OsString] {
        &self.args
    }

    /// 給紀錄與預覽用的命令列文字
    #[must_use]
    pub fn command_line(&self) -> String {
        let args: Vec<String> = self
            .args
            .iter()
            .map(|a| a.to_string_lossy().to_string())
            .collect();
        format!("ffmpeg {}", args.join(" "))
    }

    #[must_use]
    pub fn build_command(&self) -> Command {
        let mut cmd = Command::new("ffmpeg");
        cmd.args(["-hide_banner", "-nostdin"]);
        cmd.args(&self.args);
        cmd
    }

    /// 寫出 concat 清單（如果有）並轉為可執行的工作
    pub fn into_task(self, description: impl Into<String>) -> Result<ExternalTask> {
        let task = ExternalTask::new(description, self.build_command());
        match self.concat_list {
            Some(list) => {
                fs::write(&list.path, &list.content)
                    .with_context(|| format!("建立暫存清單失敗: {}", list.path.display()))?;
                Ok(task.with_cleanup_file(list.path))
            }
            None => Ok(task),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lossy(cmd: &FfmpegCommand) -> Vec<String> {
        cmd.arguments()
            .iter()
            .map(|a| a.to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_concat_videos_output_and_args() {
        let inputs = vec![
            PathBuf::from("/videos/part1.mp4"),
            PathBuf::from("/videos/part2.mp4"),
        ];
        let cmd = FfmpegCommand::concat_videos(&inputs, "mkv").unwrap();
        assert_eq!(cmd.output_path(), Path::new("/videos/part1_merge.mkv"));

        let args = lossy(&cmd);
        assert_eq!(&args[..5], &["-f", "concat", "-safe", "0", "-i"]);
        assert_eq!(&args[6..], &["-c", "copy", "-y", "/videos/part1_merge.mkv"]);

        let list = cmd.concat_list().unwrap();
        assert!(list.path.starts_with("/videos"));
        assert_eq!(
            list.content,
            "file '/videos/part1.mp4'\nfile '/videos/part2.mp4'\n"
        );
    }

    #[test]
    fn test_concat_list_uses_absolute_paths_for_relative_inputs() {
        let inputs = vec![
            PathBuf::from("videos/a.mp4"),
            PathBuf::from("videos/b.mp4"),
        ];
        let cmd = FfmpegCommand::concat_videos(&inputs, "mp4").unwrap();
        let list = cmd.concat_list().unwrap();
        assert!(list.path.starts_with("videos"));

        let cwd = std::env::current_dir().unwrap();
        let expected: String = ["a.mp4", "b.mp4"]
            .iter()
            .map(|name| {
                let path = cwd.join("videos").join(name);
                format!("file '{}'\n", escape_concat_path(&path))
            })
            .collect();
        assert_eq!(list.content, expected);

        // 每一行都不能相對於清單所在資料夾再解析一次
        for line in list.content.lines() {
            let path = line.trim_start_matches("file '").trim_end_matches('\'');
            assert!(Path::new(path).is_absolute(), "不是絕對路徑: {line}");
        }
    }

    #[test]
    fn test_concat_requires_two_inputs() {
        let inputs = vec![PathBuf::from("/videos/only.mp4")];
        assert!(FfmpegCommand::concat_videos(&inputs, "mp4").is_err());
        assert!(FfmpegCommand::concat_audios(&inputs, "mp3", false).is_err());
    }

    #[test]
    fn test_concat_list_escapes_quotes() {
        let inputs = vec![
            PathBuf::from("/a/my's video.mp4"),
            PathBuf::from("/a/b.mp4"),
        ];
        let cmd = FfmpegCommand::concat_videos(&inputs, "mp4").unwrap();
        let list = cmd.concat_list().unwrap();
        assert!(list.content.starts_with(r"file '/a/my'\''s video.mp4'"));
    }

    #[test]
    fn test_concat_audios_with_normalize() {
        let inputs = vec![PathBuf::from("/m/a.wav"), PathBuf::from("/m/b.wav")];
        let cmd = FfmpegCommand::concat_audios(&inputs, "wav", true).unwrap();
        let args = lossy(&cmd);
        assert!(args.windows(2).any(|w| w == ["-filter:a", LOUDNORM_FILTER]));
        assert!(args.windows(2).any(|w| w == ["-c:a", "pcm_s16le"]));
        assert_eq!(cmd.output_path(), Path::new("/m/a_merged.wav"));
    }

    #[test]
    fn test_audio_codec_selection() {
        assert_eq!(audio_codec_for("mp3", false), Some("libmp3lame"));
        assert_eq!(audio_codec_for("flac", false), Some("copy"));
        assert_eq!(audio_codec_for("flac", true), Some("flac"));
        assert_eq!(audio_codec_for("OGG", false), Some("libvorbis"));
        assert_eq!(audio_codec_for("m4a", true), Some("aac"));
        assert_eq!(audio_codec_for("opus", false), None);
    }

    #[test]
    fn test_extract_audio() {
        let cmd = FfmpegCommand::extract_audio(Path::new("/v/clip.mkv"));
        assert_eq!(cmd.output_path(), Path::new("/v/clip_audio.mp3"));
        assert_eq!(
            lossy(&cmd),
            vec![
                "-i", "/v/clip.mkv", "-vn", "-c:a", "libmp3lame", "-q:a", "2", "-y",
                "/v/clip_audio.mp3"
            ]
        );
        assert!(cmd.concat_list().is_none());
    }

    #[test]
    fn test_mux_with_audio_and_subtitle_for_mp4() {
        let cmd = FfmpegCommand::mux_streams(
            Path::new("/y/video.webm"),
            Some(Path::new("/y/audio.m4a")),
            Some(Path::new("/y/sub.srt")),
            "mp4",
        )
        .unwrap();
        assert_eq!(cmd.output_path(), Path::new("/y/video_merge.mp4"));
        assert_eq!(
            lossy(&cmd),
            vec![
                "-y", "-i", "/y/video.webm", "-i", "/y/audio.m4a", "-i", "/y/sub.srt", "-map",
                "0:v:0", "-map", "1:a:0", "-map", "2:s:0", "-c:v", "copy", "-c:a", "copy",
                "-c:s", "mov_text", "/y/video_merge.mp4"
            ]
        );
    }

    #[test]
    fn test_mux_subtitle_only_keeps_original_audio() {
        let cmd = FfmpegCommand::mux_streams(
            Path::new("/y/video.mkv"),
            None,
            Some(Path::new("/y/sub.ass")),
            "mkv",
        )
        .unwrap();
        let args = lossy(&cmd);
        assert!(args.windows(2).any(|w| w == ["-map", "0:a?"]));
        assert!(args.windows(2).any(|w| w == ["-map", "1:s:0"]));
        assert!(args.windows(2).any(|w| w == ["-c:s", "copy"]));
    }

    #[test]
    fn test_mux_requires_audio_or_subtitle() {
        assert!(FfmpegCommand::mux_streams(Path::new("/y/v.mkv"), None, None, "mkv").is_err());
    }

    #[test]
    fn test_crop_segment() {
        let cmd = FfmpegCommand::crop_segment(
            Path::new("/c/movie.mp4"),
            5.5,
            65.25,
            ("00-00-05_500", "00-01-05_250"),
        );
        assert_eq!(
            cmd.output_path(),
            Path::new("/c/movie_crop_00-00-05_500_00-01-05_250.mp4")
        );
        assert_eq!(
            lossy(&cmd),
            vec![
                "-y", "-ss", "5.500", "-to", "65.250", "-i", "/c/movie.mp4", "-c", "copy",
                "-avoid_negative_ts", "1", "/c/movie_crop_00-00-05_500_00-01-05_250.mp4"
            ]
        );
    }

    #[test]
    fn test_extract_audio_segment() {
        let cmd = FfmpegCommand::extract_audio_segment(
            Path::new("/c/movie.mp4"),
            1.0,
            2.0,
            ("a", "b"),
        );
        assert_eq!(cmd.output_path(), Path::new("/c/movie_audio_a_b.mp3"));
        let args = lossy(&cmd);
        assert_eq!(&args[..3], &["-y", "-i", "/c/movie.mp4"]);
        assert!(args.windows(2).any(|w| w == ["-q:a", "2"]));
    }

    #[test]
    fn test_into_task_writes_concat_list() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let inputs = vec![temp_dir.path().join("a.mp4"), temp_dir.path().join("b.mp4")];
        let cmd = FfmpegCommand::concat_videos(&inputs, "mp4").unwrap();
        let list_path = cmd.concat_list().unwrap().path.clone();

        let task = cmd.into_task("merge").unwrap();
        assert_eq!(task.cleanup_file.as_deref(), Some(list_path.as_path()));
        let content = fs::read_to_string(&list_path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }
}
