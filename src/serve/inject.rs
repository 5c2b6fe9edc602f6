//! Live reload script injection into served HTML.

use crate::embed::serve::LIVERELOAD_SCRIPT;

/// Injection point: the script goes right after the first occurrence.
///
/// Matched case-sensitively; `<BODY>` or `<body class=..>` are not found.
pub const SENTINEL: &[u8] = b"<body>";

/// Splice the live reload script after the sentinel, if present.
///
/// Returns the original bytes untouched (and `false`) when the sentinel
/// is missing, so the page is still served.
pub fn maybe_inject_live_reload(body: Vec<u8>) -> (Vec<u8>, bool) {
    match inject_after_sentinel(&body, LIVERELOAD_SCRIPT.as_bytes()) {
        Some(injected) => (injected, true),
        None => (body, false),
    }
}

/// `prefix + sentinel + script + suffix`, or `None` without a sentinel.
pub fn inject_after_sentinel(content: &[u8], script: &[u8]) -> Option<Vec<u8>> {
    let pos = find(content, SENTINEL)? + SENTINEL.len();

    let mut result = Vec::with_capacity(content.len() + script.len());
    result.extend_from_slice(&content[..pos]);
    result.extend_from_slice(script);
    result.extend_from_slice(&content[pos..]);
    Some(result)
}

/// First byte offset of `needle` in `haystack`.
fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT: &[u8] = b"<script>reload()</script>";

    #[test]
    fn test_inject_after_body() {
        let html = b"<html><head></head><body><p>hi</p></body></html>";
        let out = inject_after_sentinel(html, SCRIPT).unwrap();
        assert_eq!(
            out,
            b"<html><head></head><body><script>reload()</script><p>hi</p></body></html>"
        );
    }

    #[test]
    fn test_inject_is_exact_splice() {
        let html = b"prefix <body> suffix \x00 binary \xff tail";
        let out = inject_after_sentinel(html, SCRIPT).unwrap();

        assert_eq!(out.len(), html.len() + SCRIPT.len());

        let split = b"prefix <body>".len();
        assert_eq!(&out[..split], &html[..split]);
        assert_eq!(&out[split..split + SCRIPT.len()], SCRIPT);
        assert_eq!(&out[split + SCRIPT.len()..], &html[split..]);
    }

    #[test]
    fn test_no_sentinel() {
        assert!(inject_after_sentinel(b"<html><p>fragment</p></html>", SCRIPT).is_none());
        assert!(inject_after_sentinel(b"", SCRIPT).is_none());
        assert!(inject_after_sentinel(b"<bod", SCRIPT).is_none());
    }

    #[test]
    fn test_sentinel_is_case_sensitive() {
        assert!(inject_after_sentinel(b"<BODY>x</BODY>", SCRIPT).is_none());
        assert!(inject_after_sentinel(b"<body class=\"a\">x</body>", SCRIPT).is_none());
    }

    #[test]
    fn test_only_first_sentinel_used() {
        let html = b"<body>a<body>b";
        let out = inject_after_sentinel(html, SCRIPT).unwrap();
        assert_eq!(out, b"<body><script>reload()</script>a<body>b");
    }

    #[test]
    fn test_sentinel_at_end() {
        let out = inject_after_sentinel(b"<body>", SCRIPT).unwrap();
        assert_eq!(out, b"<body><script>reload()</script>");
    }

    #[test]
    fn test_maybe_inject_uses_embedded_script() {
        let (out, injected) = maybe_inject_live_reload(b"<body></body>".to_vec());
        assert!(injected);
        assert_eq!(out.len(), 13 + LIVERELOAD_SCRIPT.len());

        let original = b"no marker here".to_vec();
        let (out, injected) = maybe_inject_live_reload(original.clone());
        assert!(!injected);
        assert_eq!(out, original);
    }
}
