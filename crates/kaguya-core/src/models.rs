mod anime;
mod source;
mod watched;

pub use anime::{Anime, AnimeTitle, CoverImage, Episode};
pub use source::{Source, SourceList, PLACEHOLDER_LABEL, PLACEHOLDER_URL};
pub use watched::{RemoteWatched, WatchedRecord, WatchedUpdate};
