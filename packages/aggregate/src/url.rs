//! Listing URL parsing.
//!
//! Extracts the complex id from `/complexes/{id}` path segments and
//! the article id from the `articleNo=` (or legacy `article_id=`)
//! query parameter. An unresolvable URL is not an error — the caller
//! groups it under the sentinel id.

use std::sync::LazyLock;

use regex::Regex;

static COMPLEX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/complexes/(\d+)").expect("valid regex"));

static ARTICLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[?&]articleNo=(\d+)").expect("valid regex"));

static LEGACY_ARTICLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[?&]article_id=(\d+)").expect("valid regex"));

/// Identifiers extracted from one listing URL.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListingIds {
    pub complex_id: Option<String>,
    pub article_no: Option<String>,
}

/// Parses a listing URL. Either id may be absent.
#[must_use]
pub fn parse_listing_url(url: &str) -> ListingIds {
    let complex_id = COMPLEX_RE
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string());

    let article_no = ARTICLE_RE
        .captures(url)
        .or_else(|| LEGACY_ARTICLE_RE.captures(url))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string());

    ListingIds {
        complex_id,
        article_no,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_modern_url() {
        let ids =
            parse_listing_url("https://new.land.naver.com/complexes/12345?articleNo=67890");
        assert_eq!(ids.complex_id.as_deref(), Some("12345"));
        assert_eq!(ids.article_no.as_deref(), Some("67890"));
    }

    #[test]
    fn parses_alternate_host() {
        let ids =
            parse_listing_url("https://fin.land.naver.com/complexes/12345?articleNo=67890&tab=D");
        assert_eq!(ids.complex_id.as_deref(), Some("12345"));
        assert_eq!(ids.article_no.as_deref(), Some("67890"));
    }

    #[test]
    fn parses_legacy_article_id() {
        let ids = parse_listing_url("https://land.naver.com/article/info.naver?article_id=67890");
        assert_eq!(ids.complex_id, None);
        assert_eq!(ids.article_no.as_deref(), Some("67890"));
    }

    #[test]
    fn article_no_wins_over_legacy() {
        let ids = parse_listing_url("https://x.example/complexes/1?articleNo=2&article_id=3");
        assert_eq!(ids.article_no.as_deref(), Some("2"));
    }

    #[test]
    fn unresolvable_url_is_empty() {
        let ids = parse_listing_url("https://example.com/somewhere-else");
        assert_eq!(ids, ListingIds::default());
    }

    #[test]
    fn complex_id_without_article() {
        let ids = parse_listing_url("https://new.land.naver.com/complexes/99999");
        assert_eq!(ids.complex_id.as_deref(), Some("99999"));
        assert_eq!(ids.article_no, None);
    }
}
