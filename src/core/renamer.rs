use crate::core::container::Container;
use crate::models::TrackMetadata;

/// Separator between artists in `author` and `mbnames`.
pub const ARTIST_DELIMITER: &str = " · ";

/// Separator between artists in the written tags.
pub const TAG_ARTIST_DELIMITER: &str = "/";

pub fn split_artists(s: &str) -> Vec<&str> {
    s.split(ARTIST_DELIMITER).collect()
}

/// `"A · B"` → `"A/B"`
pub fn join_artists(s: &str) -> String {
    split_artists(s).join(TAG_ARTIST_DELIMITER)
}

pub fn primary_artist(s: &str) -> &str {
    s.split(ARTIST_DELIMITER).next().unwrap_or(s)
}

/// Replace characters the host file system rejects in a file name with `_`.
pub fn sanitize_filename(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c == '/' || c == '\0' {
                return '_';
            }
            if cfg!(target_os = "windows") {
                if matches!(c, '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') {
                    return '_';
                }
                if c.is_ascii_control() {
                    return '_';
                }
            }
            if cfg!(target_os = "macos") && c == ':' {
                return '_';
            }
            c
        })
        .collect()
}

/// `"{primary artist} - {title}{ext}"`, e.g. `"IU - Blueming.m4a"`.
pub fn build_filename(track: &TrackMetadata, container: Container) -> String {
    format!(
        "{} - {}{}",
        sanitize_filename(primary_artist(&track.author)),
        sanitize_filename(&track.title),
        container.extension()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PgcInfo, PgcMenu};

    fn track(author: &str, title: &str) -> TrackMetadata {
        TrackMetadata {
            title: title.to_string(),
            author: author.to_string(),
            pgc_info: PgcInfo {
                pgc_menu: PgcMenu { menu_id: 1 },
            },
        }
    }

    #[test]
    fn test_join_single_artist_is_unchanged() {
        assert_eq!(join_artists("IU"), "IU");
        assert_eq!(join_artists(&join_artists("IU")), "IU");
    }

    #[test]
    fn test_join_multiple_artists() {
        let joined = join_artists("A · B · C");
        assert_eq!(joined, "A/B/C");
        assert_eq!(joined.matches('/').count(), 2);
    }

    #[test]
    fn test_plain_dot_is_not_a_delimiter() {
        assert_eq!(split_artists("A·B"), vec!["A·B"]);
    }

    #[test]
    fn test_primary_artist() {
        assert_eq!(primary_artist("A · B"), "A");
        assert_eq!(primary_artist("Solo"), "Solo");
    }

    #[test]
    fn test_sanitize_filename_removes_slash_and_null() {
        assert_eq!(sanitize_filename("a/b\0c"), "a_b_c");
    }

    #[test]
    fn test_sanitize_filename_cjk() {
        assert_eq!(sanitize_filename("洛天依 - 普通DISCO"), "洛天依 - 普通DISCO");
    }

    #[test]
    fn test_build_filename_per_container() {
        let t = track("IU · Other", "Blueming");
        assert_eq!(build_filename(&t, Container::Mp4), "IU - Blueming.m4a");
        assert_eq!(build_filename(&t, Container::Flac), "IU - Blueming.flac");
    }

    #[test]
    fn test_build_filename_sanitizes() {
        let t = track("AC/DC", "Back\0Slash");
        assert_eq!(build_filename(&t, Container::Mp4), "AC_DC - Back_Slash.m4a");
    }
}
