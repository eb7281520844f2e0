use crate::error::TimestampError;
use chrono::NaiveDateTime;
use exif::{In, Reader, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

const EXIF_DATE_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Reads `DateTimeOriginal` from the primary IFD.
///
/// `Ok(None)` means the file carries no such field, no EXIF at all, or an EXIF
/// block that cannot be decoded. A field that is present but does not parse is
/// an error, never a silent miss.
pub fn read_capture_time(path: &Path) -> Result<Option<NaiveDateTime>, TimestampError> {
    let file = File::open(path).map_err(|source| TimestampError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    let mut buf = BufReader::new(file);

    // Only I/O failures are fatal here. A container we cannot decode carries no
    // usable capture time, the same as one without an EXIF block.
    let exif = match Reader::new().read_from_container(&mut buf) {
        Ok(exif) => exif,
        Err(exif::Error::Io(source)) => {
            return Err(TimestampError::Unreadable {
                path: path.to_path_buf(),
                source,
            })
        }
        Err(err) => {
            debug!(path = %path.display(), %err, "no readable EXIF");
            return Ok(None);
        }
    };

    let Some(field) = exif.get_field(Tag::DateTimeOriginal, In::PRIMARY) else {
        return Ok(None);
    };

    // display_value() quotes ASCII values, so take the raw bytes when we can.
    let raw = match &field.value {
        Value::Ascii(values) if !values.is_empty() => {
            String::from_utf8_lossy(&values[0]).into_owned()
        }
        _ => field.display_value().to_string(),
    };

    parse_exif_datetime(&raw)
        .map(Some)
        .ok_or_else(|| TimestampError::MalformedCaptureTime {
            path: path.to_path_buf(),
            value: raw,
        })
}

pub fn parse_exif_datetime(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim_matches(|c: char| c == '"' || c == '\0' || c.is_whitespace());
    NaiveDateTime::parse_from_str(trimmed, EXIF_DATE_FORMAT).ok()
}

/// Builds a minimal JPEG whose EXIF block holds only `DateTimeOriginal`.
#[cfg(test)]
pub(crate) fn jpeg_with_capture_time(value: &str) -> Vec<u8> {
    // Little-endian TIFF: header, IFD0 with the Exif pointer, Exif IFD, string data.
    let exif_ifd_offset: u32 = 8 + 18;
    let data_offset: u32 = exif_ifd_offset + 18;
    let mut ascii = value.as_bytes().to_vec();
    ascii.push(0);

    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"II");
    tiff.extend_from_slice(&42u16.to_le_bytes());
    tiff.extend_from_slice(&8u32.to_le_bytes());

    tiff.extend_from_slice(&1u16.to_le_bytes());
    tiff.extend_from_slice(&0x8769u16.to_le_bytes());
    tiff.extend_from_slice(&4u16.to_le_bytes());
    tiff.extend_from_slice(&1u32.to_le_bytes());
    tiff.extend_from_slice(&exif_ifd_offset.to_le_bytes());
    tiff.extend_from_slice(&0u32.to_le_bytes());

    tiff.extend_from_slice(&1u16.to_le_bytes());
    tiff.extend_from_slice(&0x9003u16.to_le_bytes());
    tiff.extend_from_slice(&2u16.to_le_bytes());
    tiff.extend_from_slice(&(ascii.len() as u32).to_le_bytes());
    tiff.extend_from_slice(&data_offset.to_le_bytes());
    tiff.extend_from_slice(&0u32.to_le_bytes());

    tiff.extend_from_slice(&ascii);

    let mut app1 = b"Exif\0\0".to_vec();
    app1.extend_from_slice(&tiff);

    let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE1];
    jpeg.extend_from_slice(&((app1.len() + 2) as u16).to_be_bytes());
    jpeg.extend_from_slice(&app1);
    jpeg.extend_from_slice(&[0xFF, 0xD9]);
    jpeg
}

#[cfg(test)]
pub(crate) const JPEG_WITHOUT_EXIF: &[u8] = &[0xFF, 0xD8, 0xFF, 0xD9];

/// APP1 announces EXIF but the TIFF header is cut short.
#[cfg(test)]
pub(crate) const JPEG_WITH_TRUNCATED_EXIF: &[u8] = &[
    0xFF, 0xD8, 0xFF, 0xE1, 0x00, 0x0C, b'E', b'x', b'i', b'f', 0, 0, b'X', b'X', b'X', b'X',
    0xFF, 0xD9,
];
