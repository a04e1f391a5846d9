//! Lexical path normalization.
//!
//! Library locations come from the media server and scan roots come from the
//! configuration, so the same directory can be spelled `/media/movies/`,
//! `/media//movies` or `C:\media\movies`. [`normalize`] turns all of those
//! into one comparable string without touching the filesystem, and
//! [`is_within`] tests containment on whole components.

/// Converts a raw path into its canonical comparable form.
///
/// - backslashes become `/`
/// - repeated separators collapse
/// - `.` components are dropped and `..` is resolved lexically
/// - trailing separators are removed (the root stays `/`)
///
/// # Examples
///
/// ```
/// use rescan_scanner::path::normalize;
///
/// assert_eq!(normalize("/media//movies/"), "/media/movies");
/// assert_eq!(normalize("/media/./tv/../movies"), "/media/movies");
/// assert_eq!(normalize(r"D:\Media\Movies\"), "D:/Media/Movies");
/// assert_eq!(normalize("/"), "/");
/// ```
pub fn normalize(raw: &str) -> String {
    let unified = raw.replace('\\', "/");
    let absolute = unified.starts_with('/');

    let mut parts: Vec<&str> = Vec::new();
    for component in unified.split('/') {
        match component {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|last| *last != "..") {
                    parts.pop();
                } else if !absolute {
                    parts.push("..");
                }
            }
            other => parts.push(other),
        }
    }

    let joined = parts.join("/");
    match (absolute, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".to_owned(),
        (false, false) => joined,
    }
}

/// Returns `true` if the normalized `path` equals `root` or lies below it.
///
/// Both arguments must already be normalized. Containment is decided on
/// component boundaries, so `/media/movies2` is not within `/media/movies`.
///
/// # Examples
///
/// ```
/// use rescan_scanner::path::is_within;
///
/// assert!(is_within("/media/movies/a.mkv", "/media/movies"));
/// assert!(!is_within("/media/movies2/a.mkv", "/media/movies"));
/// assert!(is_within("/media/movies/a.mkv", "/"));
/// ```
pub fn is_within(path: &str, root: &str) -> bool {
    if root == "/" {
        return path.starts_with('/');
    }

    path.strip_prefix(root)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_trailing_and_repeated_separators() {
        assert_eq!(normalize("/media/movies/"), "/media/movies");
        assert_eq!(normalize("/media///movies//"), "/media/movies");
        assert_eq!(normalize("//"), "/");
    }

    #[test]
    fn test_normalize_dot_components() {
        assert_eq!(normalize("/media/./movies"), "/media/movies");
        assert_eq!(normalize("/media/tv/../movies"), "/media/movies");
        assert_eq!(normalize("/../media"), "/media");
    }

    #[test]
    fn test_normalize_relative() {
        assert_eq!(normalize("media/movies/"), "media/movies");
        assert_eq!(normalize("../media"), "../media");
        assert_eq!(normalize("./"), ".");
    }

    #[test]
    fn test_normalize_backslashes() {
        assert_eq!(normalize(r"\\nas\share\Movies\"), "/nas/share/Movies");
    }

    #[test]
    fn test_is_within_component_boundary() {
        assert!(is_within("/media/movies", "/media/movies"));
        assert!(is_within("/media/movies/sub/a.mkv", "/media/movies"));
        assert!(!is_within("/media/moviesextra/a.mkv", "/media/movies"));
        assert!(!is_within("/media", "/media/movies"));
    }
}
