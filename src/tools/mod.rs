mod ffmpeg_command;
mod ffmpeg_job;
mod file_scanner;
mod media_probe;
mod natural_sort;
mod path_prompt;
mod path_validator;
mod task_runner;
mod time_format;

pub use ffmpeg_command::{ConcatList, FfmpegCommand, LOUDNORM_FILTER, audio_codec_for};
pub use ffmpeg_job::{confirm_abort, confirm_overwrite, report_outcome, run_ffmpeg};
pub use file_scanner::{scan_files, scan_files_matching};
pub use media_probe::{MediaInfo, probe_media};
pub use natural_sort::{KeyPart, NaturalKey, natural_cmp, natural_sort_key, sort_naturally};
pub use path_prompt::{clean_path_input, prompt_directory, prompt_file};
pub use path_validator::{ensure_directory_exists, validate_directory_exists, validate_file_exists};
pub use task_runner::{ExternalTask, RunningTask, TaskOutcome, TaskRunner, ensure_tools};
pub use time_format::{file_name_stamp, format_timestamp, parse_timestamp};
