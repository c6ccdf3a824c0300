use regex::Regex;
use std::sync::LazyLock;

static YOUTUBE_URL: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^(https?://)?(www\.)?(youtube\.com|youtu\.?be)/.+").ok()
});

/// Check whether the input looks like a YouTube watch or share link
pub fn is_valid_youtube_url(url: &str) -> bool {
    let url = url.trim();
    if url.is_empty() {
        return false;
    }
    YOUTUBE_URL.as_ref().is_some_and(|re| re.is_match(url))
}

/// Zeroed values the server reports before it knows anything real.
const PLACEHOLDERS: [&str; 3] = ["0 KB/s", "--:--", "0 MB"];

/// Returns the value only if the server supplied something other than a
/// placeholder.
pub fn meaningful(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty() && !PLACEHOLDERS.contains(v))
}
