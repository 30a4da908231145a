//! # Cache Keys
//!
//! Downloaded texts are stored at ``<cache_dir>/<host>/<escaped path and query>``.
//!
//! The escaping is reversible, so distinct URLs never share a cache file;
//! only the fragment, the userinfo, and the case of the host are dropped.

use std::{
    fmt::Write,
    path::{Path, PathBuf},
};

/// The longest file name written to the cache, in bytes.
///
/// Longer escaped names are split into nested directories.
pub const MAX_NAME_LEN: usize = 200;

/// Suffix of directories holding the continuation of a long name.
///
/// `~` is always escaped, so it never ends a file name.
const CONTINUATION_SUFFIX: char = '~';

/// Extend a path with a context and filename.
///
/// * Does not check that the path exists.
/// * Does not initialize the containing directories.
///
/// # Arguments
/// * `context` - prefix dirs, inserted between `path` and `file`.
/// * `file` - the final file name.
pub fn extend_path<P, S, F>(
    path: P,
    context: &[S],
    filename: F,
) -> PathBuf
where
    P: AsRef<Path>,
    S: AsRef<Path>,
    F: AsRef<Path>,
{
    let mut path = path.as_ref().to_path_buf();
    path.extend(context.iter().map(|s| s.as_ref()));
    path.push(filename.as_ref());
    path
}

/// Percent-escape every byte outside ``[A-Za-z0-9._-]``.
///
/// The result is a single, non-hidden path component.
pub fn escape_component(part: &str) -> String {
    let mut escaped = String::with_capacity(part.len());
    for b in part.bytes() {
        match b {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'.' | b'-' | b'_' => {
                escaped.push(b as char)
            }
            _ => {
                let _ = write!(escaped, "%{b:02X}");
            }
        }
    }

    if escaped.is_empty() || escaped.starts_with('.') {
        // Keep ".", "..", and dotfiles out of the cache tree.
        escaped = escaped.replacen('.', "%2E", 1);
    }
    if escaped.is_empty() {
        escaped.push('_');
    }
    escaped
}

/// Split a URL into its cache ``(context, file name)``.
///
/// * The first context entry is the lowercased host, with any port.
/// * The file name is the escaped path and query; an empty path is ``/``.
/// * Names longer than [`MAX_NAME_LEN`] continue in nested directories.
///
/// ## Returns
/// `None` if the URL has no ``scheme://host`` prefix.
pub fn url_cache_key(url: &str) -> Option<(Vec<String>, String)> {
    let (_, rest) = url.split_once("://")?;
    let rest = rest.split('#').next().unwrap_or_default();

    let split = rest.find(['/', '?']).unwrap_or(rest.len());
    let (authority, target) = rest.split_at(split);

    let host = authority.rsplit('@').next().unwrap_or(authority);
    if host.is_empty() {
        return None;
    }

    let target = if target.starts_with('/') {
        target.to_string()
    } else {
        format!("/{target}")
    };

    let mut context = vec![escape_component(&host.to_lowercase())];

    let mut name = escape_component(&target);
    while name.len() > MAX_NAME_LEN {
        // Escaped names are ASCII; any byte offset is a char boundary.
        let tail = name.split_off(MAX_NAME_LEN);
        name.push(CONTINUATION_SUFFIX);
        context.push(name);
        name = tail;
    }

    Some((context, name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(url: &str) -> (Vec<String>, String) {
        url_cache_key(url).unwrap()
    }

    #[test]
    fn test_extend_path() {
        let path = extend_path("/tmp/wordtally", &["cache", "data"], "file.txt");
        assert_eq!(path, PathBuf::from("/tmp/wordtally/cache/data/file.txt"));
    }

    #[test]
    fn test_escape_component() {
        assert_eq!(escape_component("1342-0.txt"), "1342-0.txt");
        assert_eq!(escape_component("/a b?c=d"), "%2Fa%20b%3Fc%3Dd");
        assert_eq!(escape_component("100%"), "100%25");
        assert_eq!(escape_component("."), "%2E");
        assert_eq!(escape_component(".."), "%2E.");
        assert_eq!(escape_component(".profile"), "%2Eprofile");
        assert_eq!(escape_component(""), "_");
    }

    #[test]
    fn test_url_cache_key() {
        assert_eq!(
            key("https://www.gutenberg.org/files/1342/1342-0.txt"),
            (
                vec!["www.gutenberg.org".to_string()],
                "%2Ffiles%2F1342%2F1342-0.txt".to_string()
            )
        );
        assert_eq!(
            key("http://LocalHost:8080/a/b/?q=1#frag"),
            (
                vec!["localhost%3A8080".to_string()],
                "%2Fa%2Fb%2F%3Fq%3D1".to_string()
            )
        );
        assert_eq!(
            key("https://user@example.com/../x%20y.txt"),
            (
                vec!["example.com".to_string()],
                "%2F..%2Fx%2520y.txt".to_string()
            )
        );
    }

    #[test]
    fn test_url_cache_key_root() {
        let root = key("https://example.com");
        assert_eq!(root, (vec!["example.com".to_string()], "%2F".to_string()));
        assert_eq!(key("https://example.com/"), root);
        assert_eq!(key("https://example.com/#top"), root);
        assert_eq!(key("https://example.com?x=1").1, "%2F%3Fx%3D1");
    }

    #[test]
    fn test_url_cache_key_distinct() {
        let urls = [
            "https://example.com/en/book.txt",
            "https://example.com/fr/book.txt",
            "https://example.com/book.txt",
            "https://example.com/get?id=1",
            "https://example.com/get?id=2",
            "https://example.com/get",
            "https://example.com/get?",
            "https://example.com/get/",
            "https://example.com/a_b",
            "https://example.com/a b",
            "https://example.com/a%20b",
            "https://example.org/en/book.txt",
        ];
        let keys: Vec<_> = urls.iter().map(|u| key(u)).collect();
        for (i, a) in keys.iter().enumerate() {
            for (j, b) in keys.iter().enumerate().skip(i + 1) {
                assert_ne!(a, b, "{} and {} share a cache key", urls[i], urls[j]);
            }
        }

        // Stable across calls.
        assert_eq!(
            key("https://example.com/get?id=1"),
            key("https://example.com/get?id=1")
        );
    }

    #[test]
    fn test_url_cache_key_long_names() {
        let long = format!("https://example.com/{}", "a".repeat(450));
        let (context, file) = key(&long);

        assert_eq!(context.len(), 3);
        assert_eq!(context[0], "example.com");
        assert!(context[1..].iter().all(|d| d.len() == MAX_NAME_LEN + 1));
        assert!(context[1..].iter().all(|d| d.ends_with(CONTINUATION_SUFFIX)));
        assert!(file.len() <= MAX_NAME_LEN);
        assert!(!file.ends_with(CONTINUATION_SUFFIX));

        let joined: String = context[1..]
            .iter()
            .map(|d| d.trim_end_matches(CONTINUATION_SUFFIX))
            .chain([file.as_str()])
            .collect();
        assert_eq!(joined, escape_component(&format!("/{}", "a".repeat(450))));

        // A name exactly at the limit stays flat.
        let exact = format!("https://example.com/{}", "b".repeat(MAX_NAME_LEN - 3));
        let (context, file) = key(&exact);
        assert_eq!(context.len(), 1);
        assert_eq!(file.len(), MAX_NAME_LEN);
    }

    #[test]
    fn test_url_cache_key_rejects() {
        assert_eq!(url_cache_key("example.com/file.txt"), None);
        assert_eq!(url_cache_key("https:///file.txt"), None);
        assert_eq!(url_cache_key("https://?q=1"), None);
    }
}
