use std::path::Path;

use crate::error::{Error, Result};

/// Parse the track id from an input file name.
///
/// Downloads from the music service are named after the song id with no
/// extension, e.g. "1631371". The whole file name must be ASCII digits.
pub fn parse_track_id(path: &Path) -> Result<u64> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::invalid_input(path, "file name is not valid UTF-8"))?;

    if name.is_empty() || !name.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::invalid_input(
            path,
            format!("file name {name:?} is not a track id"),
        ));
    }

    name.parse()
        .map_err(|e| Error::invalid_input(path, format!("track id {name:?} out of range: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_numeric_name() {
        assert_eq!(parse_track_id(&PathBuf::from("/in/1631371")).unwrap(), 1631371);
    }

    #[test]
    fn test_leading_zeros() {
        assert_eq!(parse_track_id(&PathBuf::from("007")).unwrap(), 7);
    }

    #[test]
    fn test_name_with_extension() {
        let err = parse_track_id(&PathBuf::from("1631371.m4a")).unwrap_err();
        assert!(matches!(err, Error::InvalidInput { .. }));
    }

    #[test]
    fn test_signed_or_blank() {
        assert!(parse_track_id(&PathBuf::from("-12")).is_err());
        assert!(parse_track_id(&PathBuf::from("+12")).is_err());
        assert!(parse_track_id(&PathBuf::from(" 12")).is_err());
    }

    #[test]
    fn test_overflow() {
        let err = parse_track_id(&PathBuf::from("99999999999999999999999")).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }
}
