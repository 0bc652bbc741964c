use std::path::Path;

use chrono::{Datelike, Local, TimeZone};
use lofty::config::WriteOptions;
use lofty::file::{TaggedFile, TaggedFileExt};
use lofty::picture::{Picture, PictureType};
use lofty::probe::Probe;
use lofty::tag::{Accessor, ItemKey, Tag, TagExt};

use crate::cache::cover::{self, CoverCache};
use crate::cache::metadata::{self, MetadataCache};
use crate::cache::CacheStats;
use crate::config::EndpointConfig;
use crate::core::container::{self, Container};
use crate::core::{parser, renamer};
use crate::error::{Error, Result};
use crate::models::{AlbumMetadata, CoverImage, ImageFormat, Outcome, TrackMetadata};
use crate::sources::HttpGet;

/// Container-agnostic tag values for one output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSet {
    pub title: String,
    pub album: String,
    pub artist: String,
    pub album_artist: String,
    pub year: i32,
    pub track_number: u32,
    pub track_total: u32,
    pub disc_number: u32,
    pub disc_total: u32,
    pub cover: CoverImage,
}

/// Anything that turns one input file into one output file.
pub trait TrackWriter {
    fn write(&mut self, input: &Path, output_dir: &Path) -> Result<Outcome>;
}

/// Tags and renames downloads, holding the caches for one run.
pub struct Tagger<H> {
    tracks: MetadataCache<TrackMetadata, H>,
    albums: MetadataCache<AlbumMetadata, H>,
    covers: CoverCache<H>,
    overwrite: bool,
}

impl<H: HttpGet + Clone> Tagger<H> {
    /// Creates the caches under `cache_root`, one subdirectory per resource kind.
    pub fn new(cache_root: &Path, endpoints: &EndpointConfig, http: H, overwrite: bool) -> Result<Self> {
        Ok(Self {
            tracks: metadata::metadata_cache(cache_root, endpoints.track.clone(), http.clone())?,
            albums: metadata::metadata_cache(cache_root, endpoints.album.clone(), http.clone())?,
            covers: cover::cover_cache(cache_root, &endpoints.cover_dir, http)?,
            overwrite,
        })
    }

    pub fn cache_stats(&self) -> [(&'static str, CacheStats); 3] {
        [
            ("track", self.tracks.stats()),
            ("album", self.albums.stats()),
            ("cover", self.covers.stats()),
        ]
    }

    fn track(&mut self, id: u64) -> Result<TrackMetadata> {
        match self.tracks.get(&id)? {
            Some(track) => Ok(track),
            None => Err(Error::remote(self.tracks.remote().url_for(id), "no track data")),
        }
    }

    fn album(&mut self, id: u64) -> Result<AlbumMetadata> {
        match self.albums.get(&id)? {
            Some(album) => Ok(album),
            None => Err(Error::remote(self.albums.remote().url_for(id), "no album data")),
        }
    }

    fn cover(&mut self, url: &str) -> Result<CoverImage> {
        let path = self
            .covers
            .get(&url.to_string())?
            .ok_or_else(|| Error::remote(url, "no cover image"))?;
        let format = ImageFormat::from_path(&path)?;
        let data = std::fs::read(&path).map_err(|e| Error::file(&path, e))?;
        Ok(CoverImage { data, format })
    }
}

impl<H: HttpGet + Clone> TrackWriter for Tagger<H> {
    /// Copies `input` into `output_dir` as `"<artist> - <title>.<ext>"` and
    /// tags the copy. The source file is never modified.
    fn write(&mut self, input: &Path, output_dir: &Path) -> Result<Outcome> {
        let track_id = parser::parse_track_id(input)?;
        let container = container::sniff(input)?;
        let track = self.track(track_id)?;

        let output = output_dir.join(renamer::build_filename(&track, container));
        if !self.overwrite && output.is_file() {
            tracing::info!("{} exists, skipped", output.display());
            return Ok(Outcome::Skipped(output));
        }

        tracing::info!("processing {} -> {}", input.display(), output.display());
        std::fs::copy(input, &output).map_err(|e| Error::file(&output, e))?;

        let album_id = track.album_id();
        let album = self.album(album_id)?;
        let track_number = track_position(track_id, album_id, &album)?;
        let cover = self.cover(&album.menu.cover_url)?;

        let tags = build_tag_set(track_id, &track, &album, track_number, cover)?;
        apply_tags(&output, container, &tags)?;

        Ok(Outcome::Written(output))
    }
}

/// 1-based position of the track in the album's track list.
///
/// The cover URL listed for the track must match the album cover.
pub fn track_position(track_id: u64, album_id: u64, album: &AlbumMetadata) -> Result<u32> {
    let index = album
        .songs
        .iter()
        .position(|song| song.id == track_id)
        .ok_or_else(|| Error::inconsistent(track_id, album_id, "track missing from album track list"))?;

    let listed = &album.songs[index].cover_url;
    if *listed != album.menu.cover_url {
        return Err(Error::inconsistent(
            track_id,
            album_id,
            format!(
                "album cover {:?} differs from track cover {:?}",
                album.menu.cover_url, listed
            ),
        ));
    }

    u32::try_from(index + 1)
        .map_err(|_| Error::inconsistent(track_id, album_id, "track position out of range"))
}

/// Calendar year, in the local time zone, of a millisecond timestamp.
pub fn release_year(timestamp_ms: i64) -> Option<i32> {
    Local
        .timestamp_opt(timestamp_ms.div_euclid(1000), 0)
        .earliest()
        .map(|dt| dt.year())
}

pub fn build_tag_set(
    track_id: u64,
    track: &TrackMetadata,
    album: &AlbumMetadata,
    track_number: u32,
    cover: CoverImage,
) -> Result<TagSet> {
    let year = release_year(album.menu.release_timestamp_ms).ok_or_else(|| {
        Error::inconsistent(
            track_id,
            track.album_id(),
            format!("release time {} out of range", album.menu.release_timestamp_ms),
        )
    })?;

    Ok(TagSet {
        title: track.title.clone(),
        album: album.menu.title.clone(),
        artist: renamer::join_artists(&track.author),
        album_artist: renamer::join_artists(&album.menu.artist_names),
        year,
        track_number,
        track_total: album.menu.total_track_count,
        disc_number: 1,
        disc_total: 1,
        cover,
    })
}

const FLAC_MARKER: &[u8] = b"fLaC";
const FLAC_LAST_BLOCK: u8 = 0x80;
const FLAC_BLOCK_PADDING: u8 = 1;
const FLAC_PADDING_LEN: u32 = 1024;

/// Appends a PADDING block to a FLAC stream whose metadata ends with any
/// other block. lofty's FLAC writer corrupts or panics on such files.
fn ensure_trailing_padding(path: &Path) -> Result<()> {
    let mut bytes = std::fs::read(path).map_err(|e| Error::file(path, e))?;
    if !bytes.starts_with(FLAC_MARKER) {
        // let lofty report what it makes of the file
        return Ok(());
    }

    let truncated = || Error::unsupported(path, "truncated FLAC metadata");
    let mut pos = FLAC_MARKER.len();
    let (last, end) = loop {
        let header = bytes.get(pos..pos + 4).ok_or_else(truncated)?;
        let len = u32::from_be_bytes([0, header[1], header[2], header[3]]) as usize;
        let end = pos + 4 + len;
        if header[0] & FLAC_LAST_BLOCK != 0 {
            break (pos, end);
        }
        pos = end;
    };

    if bytes[last] & !FLAC_LAST_BLOCK == FLAC_BLOCK_PADDING {
        return Ok(());
    }
    if end > bytes.len() {
        return Err(truncated());
    }

    tracing::debug!("{}: adding FLAC padding", path.display());
    bytes[last] &= !FLAC_LAST_BLOCK;
    let mut padding = vec![0; 4 + FLAC_PADDING_LEN as usize];
    padding[0] = FLAC_LAST_BLOCK | FLAC_BLOCK_PADDING;
    padding[1..4].copy_from_slice(&FLAC_PADDING_LEN.to_be_bytes()[1..]);
    bytes.splice(end..end, padding);

    std::fs::write(path, &bytes).map_err(|e| Error::file(path, e))
}

fn read_tagged(path: &Path) -> std::result::Result<TaggedFile, lofty::error::LoftyError> {
    Probe::open(path)?.guess_file_type()?.read()
}

/// Writes `tags` into the container's native tag, replacing the same fields.
///
/// MP4: `©nam ©alb ©ART aART ©day trkn disk covr`.
/// FLAC: `TITLE ALBUM ARTIST ALBUMARTIST DATE TRACKNUMBER TRACKTOTAL
/// DISCNUMBER DISCTOTAL` and a front cover PICTURE block.
pub fn apply_tags(path: &Path, container: Container, tags: &TagSet) -> Result<()> {
    if container == Container::Flac {
        ensure_trailing_padding(path)?;
    }
    let mut tagged_file = read_tagged(path).map_err(|e| Error::tag(path, e))?;

    let tag_type = container.tag_type();
    if tagged_file.tag(tag_type).is_none() {
        tagged_file.insert_tag(Tag::new(tag_type));
    }
    let Some(tag) = tagged_file.tag_mut(tag_type) else {
        return Err(Error::unsupported(path, format!("{tag_type:?} tags not supported")));
    };

    tag.set_title(tags.title.clone());
    tag.set_album(tags.album.clone());
    tag.set_artist(tags.artist.clone());
    tag.insert_text(ItemKey::AlbumArtist, tags.album_artist.clone());
    tag.insert_text(ItemKey::RecordingDate, tags.year.to_string());
    tag.set_track(tags.track_number);
    tag.set_track_total(tags.track_total);
    tag.set_disk(tags.disc_number);
    tag.set_disk_total(tags.disc_total);

    // covr atoms carry no picture type and read back as Other
    tag.remove_picture_type(PictureType::CoverFront);
    if container == Container::Mp4 {
        tag.remove_picture_type(PictureType::Other);
    }
    tag.push_picture(Picture::new_unchecked(
        PictureType::CoverFront,
        Some(tags.cover.format.mime_type()),
        None,
        tags.cover.data.clone(),
    ));

    tag.save_to_path(path, WriteOptions::default())
        .map_err(|e| Error::tag(path, e))?;
    Ok(())
}
