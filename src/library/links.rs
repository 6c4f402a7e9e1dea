//! Validation for user-entered remote links.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    #[error("Please enter a name and a URL.")]
    MissingFields,
    #[error("Please enter a valid URL.")]
    InvalidUrl,
    #[error("Please enter a YouTube URL")]
    MissingYoutubeUrl,
    #[error("Invalid YouTube URL")]
    InvalidYoutubeUrl,
}

/// Checks a name/URL pair from the IPTV, online video and FM forms and
/// returns both trimmed.
pub fn validate_stream_link(name: &str, url: &str) -> Result<(String, String), LinkError> {
    let name = name.trim();
    let url = url.trim();
    if name.is_empty() || url.is_empty() {
        return Err(LinkError::MissingFields);
    }
    if !is_http_url(url) {
        return Err(LinkError::InvalidUrl);
    }
    Ok((name.to_string(), url.to_string()))
}

fn is_http_url(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    ["http://", "https://"]
        .iter()
        .any(|scheme| lower.len() > scheme.len() && lower.starts_with(scheme))
}

/// Parses the 11-character video id out of a pasted YouTube URL.
pub fn parse_youtube_url(url: &str) -> Result<String, LinkError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(LinkError::MissingYoutubeUrl);
    }
    youtube_video_id(url).ok_or(LinkError::InvalidYoutubeUrl)
}

/// Finds the last id marker in `url` (`youtu.be/`, `v/`, `u/x/`, `embed/`,
/// `watch?v=`, `&v=`) and takes everything up to the next `#`, `&` or `?`.
/// Only ids of exactly 11 characters are accepted.
pub fn youtube_video_id(url: &str) -> Option<String> {
    let bytes = url.as_bytes();
    let (start, len) = (0..bytes.len())
        .rev()
        .find_map(|i| marker_at(bytes, i).map(|len| (i, len)))?;
    let rest = &url[start + len..];
    let end = rest.find(['#', '&', '?']).unwrap_or(rest.len());
    let id = &rest[..end];
    (id.chars().count() == 11).then(|| id.to_string())
}

fn marker_at(bytes: &[u8], i: usize) -> Option<usize> {
    let s = &bytes[i..];
    if s.len() >= 9 && s.starts_with(b"youtu") && s[6..].starts_with(b"be/") {
        return Some(9);
    }
    if s.starts_with(b"v/") {
        return Some(2);
    }
    if s.len() >= 4 && s.starts_with(b"u/") && is_word(s[2]) && s[3] == b'/' {
        return Some(4);
    }
    for m in [&b"embed/"[..], b"watch?v=", b"&v="] {
        if s.starts_with(m) {
            return Some(m.len());
        }
    }
    None
}

fn is_word(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// HLS playlists need the streaming transport.
pub fn is_hls(url: &str) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.to_ascii_lowercase().ends_with(".m3u8")
}

/// Prefixes `url` with the user's stream proxy, if one is set.
pub fn with_proxy(proxy: &str, url: &str) -> String {
    let proxy = proxy.trim();
    if proxy.is_empty() {
        url.to_string()
    } else {
        format!("{proxy}{url}")
    }
}

pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_link_requires_both_fields() {
        assert_eq!(
            validate_stream_link("  ", "https://x/live.m3u8"),
            Err(LinkError::MissingFields)
        );
        assert_eq!(validate_stream_link("News", ""), Err(LinkError::MissingFields));
    }

    #[test]
    fn test_stream_link_rejects_non_http() {
        assert_eq!(
            validate_stream_link("News", "ftp://x/live.m3u8"),
            Err(LinkError::InvalidUrl)
        );
        assert_eq!(validate_stream_link("News", "https://"), Err(LinkError::InvalidUrl));
        assert_eq!(
            validate_stream_link(" News ", " HTTPS://x/live.m3u8 "),
            Ok(("News".to_string(), "HTTPS://x/live.m3u8".to_string()))
        );
    }

    #[test]
    fn test_youtube_id_from_common_forms() {
        let id = Some("dQw4w9WgXcQ".to_string());
        assert_eq!(youtube_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"), id);
        assert_eq!(youtube_video_id("https://youtu.be/dQw4w9WgXcQ?t=42"), id);
        assert_eq!(youtube_video_id("https://www.youtube.com/embed/dQw4w9WgXcQ"), id);
        assert_eq!(youtube_video_id("https://www.youtube.com/v/dQw4w9WgXcQ#t=1"), id);
        assert_eq!(
            youtube_video_id("https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ"),
            id
        );
    }

    #[test]
    fn test_youtube_id_uses_last_marker() {
        assert_eq!(
            youtube_video_id("https://www.youtube.com/watch?v=aaaaaaaaaaa&v=bbbbbbbbbbb"),
            Some("bbbbbbbbbbb".to_string())
        );
    }

    #[test]
    fn test_youtube_id_length_must_be_eleven() {
        assert_eq!(youtube_video_id("https://youtu.be/short"), None);
        assert_eq!(youtube_video_id("https://example.com/video"), None);
        assert_eq!(parse_youtube_url(""), Err(LinkError::MissingYoutubeUrl));
        assert_eq!(parse_youtube_url("nope"), Err(LinkError::InvalidYoutubeUrl));
    }

    #[test]
    fn test_is_hls_ignores_query() {
        assert!(is_hls("https://x/live/index.M3U8?token=1"));
        assert!(!is_hls("https://x/radio.mp3"));
    }

    #[test]
    fn test_with_proxy() {
        assert_eq!(with_proxy("", "https://a/b"), "https://a/b");
        assert_eq!(
            with_proxy("https://proxy.example/", "https://a/b"),
            "https://proxy.example/https://a/b"
        );
    }
}
