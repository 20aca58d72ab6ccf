pub mod load;
pub mod save;
pub mod types;

pub use types::{
    AiSettings, Config, FlattenSettings, Language, MAX_RECENT_PATHS, MarkdownSettings,
    MediaSettings, MediaTypeTable, NfoSettings, RenameSettings, UserSettings,
};
