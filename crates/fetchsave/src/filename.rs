//! Unique filename generation
//!
//! Names look like `20231027T103000Z-a1b2c3d4-page.html`: a sortable UTC
//! timestamp, eight random hex characters, and a sanitized basename taken
//! from the URL.

use chrono::{DateTime, Utc};
use url::Url;

/// Maximum length of the sanitized basename
const MAX_BASENAME_LEN: usize = 50;

/// Basename used when a URL yields neither a path segment nor a host
const FALLBACK_BASENAME: &str = "download";

/// Generate a unique filename for `url` using the current time and a
/// random suffix
pub fn generate(url: &str, extension: &str) -> String {
    generate_at(url, extension, Utc::now(), rand::random::<u32>())
}

/// Generate a filename from a fixed timestamp and random value
///
/// Pure: identical inputs always produce the identical name.
pub fn generate_at(url: &str, extension: &str, now: DateTime<Utc>, random: u32) -> String {
    format!(
        "{}-{:08x}-{}.{}",
        now.format("%Y%m%dT%H%M%SZ"),
        random,
        sanitize_basename(&url_basename(url)),
        extension
    )
}

/// Final non-empty path segment of the URL, falling back to its hostname
pub fn url_basename(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return FALLBACK_BASENAME.to_string();
    };

    parsed
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).next_back())
        .map(str::to_string)
        .or_else(|| parsed.host_str().map(str::to_string))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| FALLBACK_BASENAME.to_string())
}

/// Replace every character outside `[A-Za-z0-9_-]` with `_` and truncate
pub fn sanitize_basename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .take(MAX_BASENAME_LEN)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 10, 27, 10, 30, 0).unwrap()
    }

    #[test]
    fn test_generate_at_is_deterministic() {
        let name = generate_at(
            "https://example.com/path/to/page",
            "html",
            fixed_time(),
            0xa1b2c3d4,
        );
        assert_eq!(name, "20231027T103000Z-a1b2c3d4-page.html");

        let again = generate_at(
            "https://example.com/path/to/page",
            "html",
            fixed_time(),
            0xa1b2c3d4,
        );
        assert_eq!(name, again);
    }

    #[test]
    fn test_random_is_zero_padded() {
        let name = generate_at("https://example.com/a", "md", fixed_time(), 0x1f);
        assert_eq!(name, "20231027T103000Z-0000001f-a.md");
    }

    #[test]
    fn test_hostname_fallback() {
        assert_eq!(url_basename("https://example.com"), "example.com");
        assert_eq!(url_basename("https://example.com/"), "example.com");
        let name = generate_at("https://example.com", "json", fixed_time(), 0xdeadbeef);
        assert_eq!(name, "20231027T103000Z-deadbeef-example_com.json");
    }

    #[test]
    fn test_trailing_slash_uses_last_segment() {
        assert_eq!(url_basename("https://example.com/docs/guide/"), "guide");
    }

    #[test]
    fn test_query_is_ignored() {
        assert_eq!(url_basename("https://example.com/search?q=rust"), "search");
    }

    #[test]
    fn test_sanitize_replaces_one_for_one() {
        assert_eq!(sanitize_basename("page.html"), "page_html");
        assert_eq!(sanitize_basename("a b%20c"), "a_b_20c");
        assert_eq!(sanitize_basename("ok-name_1"), "ok-name_1");
        assert_eq!(sanitize_basename("caf\u{e9}"), "caf_");
    }

    #[test]
    fn test_sanitize_truncates() {
        let long = "x".repeat(80);
        assert_eq!(sanitize_basename(&long).len(), 50);

        let url = format!("https://example.com/{}", "a.".repeat(40));
        let name = generate_at(&url, "txt", fixed_time(), 0);
        let basename = name
            .strip_prefix("20231027T103000Z-00000000-")
            .and_then(|rest| rest.strip_suffix(".txt"))
            .unwrap();
        assert_eq!(basename.len(), 50);
        assert!(basename.chars().all(|c| c == 'a' || c == '_'));
    }

    #[test]
    fn test_generate_uses_expected_shape() {
        let name = generate("https://example.com/report", "txt");
        let parts: Vec<&str> = name.splitn(3, '-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].len(), 16);
        assert!(parts[0].ends_with('Z'));
        assert_eq!(parts[1].len(), 8);
        assert!(parts[1].chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(parts[2], "report.txt");
    }

    #[test]
    fn test_generate_is_unique() {
        let a = generate("https://example.com/page", "html");
        let b = generate("https://example.com/page", "html");
        assert_ne!(a, b);
    }
}
