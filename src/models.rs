use std::path::PathBuf;

use serde::Deserialize;

/// `data` payload of the song endpoint. Only the fields we tag with are decoded;
/// the cached JSON keeps everything the service sent.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TrackMetadata {
    pub title: String,
    /// Artists joined by [`crate::core::renamer::ARTIST_DELIMITER`].
    pub author: String,
    pub pgc_info: PgcInfo,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PgcInfo {
    pub pgc_menu: PgcMenu,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PgcMenu {
    #[serde(rename = "menuId")]
    pub menu_id: u64,
}

impl TrackMetadata {
    /// Id of the album (menu) the track belongs to.
    pub fn album_id(&self) -> u64 {
        self.pgc_info.pgc_menu.menu_id
    }
}

/// `data` payload of the menu endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AlbumMetadata {
    #[serde(rename = "menusRespones")]
    pub menu: AlbumMenu,
    #[serde(rename = "songsList", default)]
    pub songs: Vec<AlbumSong>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AlbumMenu {
    pub title: String,
    #[serde(rename = "coverUrl")]
    pub cover_url: String,
    #[serde(rename = "mbnames")]
    pub artist_names: String,
    #[serde(rename = "pbtime")]
    pub release_timestamp_ms: i64,
    #[serde(rename = "songNum")]
    pub total_track_count: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AlbumSong {
    pub id: u64,
    pub cover_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverImage {
    pub data: Vec<u8>,
    pub format: ImageFormat,
}

/// Result of tagging one input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Written(PathBuf),
    /// The output already existed and overwrite was off.
    Skipped(PathBuf),
}

impl Outcome {
    pub fn output_path(&self) -> &PathBuf {
        match self {
            Outcome::Written(path) | Outcome::Skipped(path) => path,
        }
    }

    pub fn file_name(&self) -> &str {
        self.output_path()
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_payload() {
        let json = r#"{
            "id": 7,
            "title": "Song",
            "author": "A · B",
            "pgc_info": {"pgc_menu": {"menuId": 42, "title": "ignored"}}
        }"#;
        let track: TrackMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(track.title, "Song");
        assert_eq!(track.album_id(), 42);
    }

    #[test]
    fn test_album_payload() {
        let json = r#"{
            "menusRespones": {
                "title": "Album",
                "coverUrl": "https://x/cover.jpg",
                "mbnames": "A",
                "pbtime": 1593561600000,
                "songNum": 3
            },
            "songsList": [{"id": 3, "cover_url": "https://x/cover.jpg"}]
        }"#;
        let album: AlbumMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(album.menu.total_track_count, 3);
        assert_eq!(album.menu.release_timestamp_ms, 1_593_561_600_000);
        assert_eq!(album.songs[0].id, 3);
    }

    #[test]
    fn test_outcome_file_name() {
        let outcome = Outcome::Skipped(PathBuf::from("/out/A - Song.m4a"));
        assert_eq!(outcome.file_name(), "A - Song.m4a");
    }
}
