//! 端對端測試 - 以 ffmpeg 產生測試影片，實際執行合併、裁切與媒體資訊讀取
//!
//! 系統沒有 ffmpeg / ffprobe 時自動略過

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::AtomicBool;

use tempfile::TempDir;

use media_toolbox::component::media_cropper::CropRange;
use media_toolbox::tools::{FfmpegCommand, TaskRunner, ensure_tools, probe_media};

fn ffmpeg_available() -> bool {
    if ensure_tools(&["ffmpeg", "ffprobe"]).is_ok() {
        true
    } else {
        println!("跳過測試：找不到 ffmpeg / ffprobe");
        false
    }
}

fn has_encoder(name: &str) -> bool {
    Command::new("ffmpeg")
        .args(["-hide_banner", "-encoders"])
        .output()
        .map(|out| String::from_utf8_lossy(&out.stdout).contains(name))
        .unwrap_or(false)
}

/// 產生指定秒數、含畫面與聲音的測試影片
fn create_test_video(directory: &Path, name: &str, seconds: u32) -> PathBuf {
    let output = directory.join(name);
    let duration = seconds.to_string();
    let status = Command::new("ffmpeg")
        .args(["-hide_banner", "-loglevel", "error", "-y"])
        .args(["-f", "lavfi", "-i", "testsrc=size=160x120:rate=25"])
        .args(["-f", "lavfi", "-i", "sine=frequency=440:sample_rate=44100"])
        .args(["-t", duration.as_str()])
        .args(["-c:v", "mpeg4", "-c:a", "aac", "-shortest"])
        .arg(&output)
        .status()
        .expect("無法執行 ffmpeg");
    assert!(status.success(), "測試影片產生失敗");
    output
}

#[test]
fn test_probe_media_e2e() {
    if !ffmpeg_available() {
        return;
    }
    let temp_dir = TempDir::new().unwrap();
    let video = create_test_video(temp_dir.path(), "probe.mp4", 2);

    let info = probe_media(&video).unwrap();
    println!("時長: {:.2}s, 幀率: {:?}", info.duration_seconds, info.frame_rate);

    assert!((info.duration_seconds - 2.0).abs() < 0.5);
    assert_eq!(info.width, Some(160));
    assert_eq!(info.height, Some(120));
    assert!(info.frame_rate.is_some_and(|fps| (fps - 25.0).abs() < 0.01));
}

#[test]
fn test_merge_videos_e2e() {
    if !ffmpeg_available() {
        return;
    }
    let temp_dir = TempDir::new().unwrap();
    let inputs = vec![
        create_test_video(temp_dir.path(), "part 1.mp4", 2),
        create_test_video(temp_dir.path(), "part 2.mp4", 2),
    ];

    let command = FfmpegCommand::concat_videos(&inputs, "mp4").unwrap();
    let output = command.output_path().to_path_buf();
    let list_path = command.concat_list().unwrap().path.clone();
    assert_eq!(output, temp_dir.path().join("part 1_merge.mp4"));

    let runner = TaskRunner::new();
    let shutdown = AtomicBool::new(false);
    let outcome = runner
        .run(command.into_task("合併影片").unwrap(), &shutdown, || false)
        .unwrap();

    assert!(outcome.success, "合併失敗: {}", outcome.stderr);
    assert!(output.exists());
    // 暫存清單在工作結束後刪除
    assert!(!list_path.exists());
    assert!(!runner.is_busy());

    let merged = probe_media(&output).unwrap();
    assert!((merged.duration_seconds - 4.0).abs() < 0.5);
}

#[test]
fn test_crop_segment_e2e() {
    if !ffmpeg_available() {
        return;
    }
    let temp_dir = TempDir::new().unwrap();
    let video = create_test_video(temp_dir.path(), "clip.mp4", 3);
    let info = probe_media(&video).unwrap();

    let range = CropRange::new(1.0, 2.5, info.duration_seconds).unwrap();
    let (start_stamp, end_stamp) = range.stamps();
    let command = FfmpegCommand::crop_segment(
        &video,
        range.start(),
        range.end(),
        (start_stamp.as_str(), end_stamp.as_str()),
    );
    let output = command.output_path().to_path_buf();
    assert_eq!(
        output,
        temp_dir.path().join("clip_crop_00-00-01_000_00-00-02_500.mp4")
    );

    let runner = TaskRunner::new();
    let shutdown = AtomicBool::new(false);
    let outcome = runner
        .run(command.into_task("裁切影片").unwrap(), &shutdown, || false)
        .unwrap();

    assert!(outcome.success, "裁切失敗: {}", outcome.stderr);
    let cropped = probe_media(&output).unwrap();
    assert!(cropped.duration_seconds > 0.0);
    assert!(cropped.duration_seconds < info.duration_seconds);
}

#[test]
fn test_extract_audio_e2e() {
    if !ffmpeg_available() {
        return;
    }
    if !has_encoder("libmp3lame") {
        println!("跳過測試：ffmpeg 未包含 libmp3lame");
        return;
    }
    let temp_dir = TempDir::new().unwrap();
    let video = create_test_video(temp_dir.path(), "lesson.mp4", 2);

    let command = FfmpegCommand::extract_audio(&video);
    let output = command.output_path().to_path_buf();
    assert_eq!(output, temp_dir.path().join("lesson_audio.mp3"));

    let runner = TaskRunner::new();
    let shutdown = AtomicBool::new(false);
    let outcome = runner
        .run(command.into_task("擷取音訊").unwrap(), &shutdown, || false)
        .unwrap();

    assert!(outcome.success, "擷取失敗: {}", outcome.stderr);
    let audio = probe_media(&output).unwrap();
    assert!(audio.width.is_none());
    assert!((audio.duration_seconds - 2.0).abs() < 0.5);
}

#[test]
fn test_second_task_rejected_while_running_e2e() {
    if !ffmpeg_available() {
        return;
    }
    let runner = TaskRunner::new();
    let long_task = || {
        let mut command = Command::new("ffmpeg");
        command.args([
            "-hide_banner",
            "-nostdin",
            "-f",
            "lavfi",
            "-i",
            "anullsrc",
            "-t",
            "30",
            "-f",
            "null",
            "-",
        ]);
        media_toolbox::tools::ExternalTask::new("長時間工作", command)
    };

    let running = runner.start(long_task()).unwrap();
    assert!(runner.is_busy());
    assert!(runner.start(long_task()).is_err());

    // 中斷信號加上確認終止後，子行程被結束且執行器恢復可用
    let shutdown = AtomicBool::new(true);
    let outcome = running.wait(&shutdown, || true).unwrap();
    assert!(outcome.cancelled);
    assert!(!outcome.success);
    assert!(!runner.is_busy());
}
