pub mod add;
pub mod attach;
pub mod auth;
pub mod download;
pub mod get;
pub mod init;
pub mod misc;
pub mod notebooks;
pub mod search;
pub mod tags;
pub mod update;

/// Trim tag names and drop empty ones.
pub(crate) fn normalize_tags(tags: &[String]) -> Vec<String> {
    tags.iter()
        .map(|tag| tag.trim())
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}
