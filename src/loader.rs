//! ZIP unwrapping and text/binary dispatch, C6.
//!
//! Mirrors `hwpx::container::HwpxContainer` for the ZIP-layer plumbing
//! (a `ZipArchive` over an in-memory `Cursor<Vec<u8>>`, `InvalidHeader`/
//! `ZipLayout` in place of `MissingComponent`) and `detect::detect_format`
//! for the header-sniffing dispatch, generalized from "pick one of three
//! document kinds" to "pick binary vs. text by comparing a header
//! prefix".

use crate::binary::{self, TokenLookup};
use crate::error::{Error, Result};
use crate::text;
use crate::value::Value;
use std::io::{Cursor, Read};
use std::path::Path;
use zip::ZipArchive;

const ZIP_MAGIC: [u8; 2] = [0x50, 0x4B];

/// An entry name has a non-empty extension: a `.` with at least one byte
/// after it.
fn has_extension(name: &str) -> bool {
    match name.rsplit_once('.') {
        Some((_, ext)) => !ext.is_empty(),
        None => false,
    }
}

/// If `data` is a ZIP archive, returns the bytes of its single entry whose
/// name has a non-empty extension (the archive's payload; any
/// extension-less siblings are metadata and ignored). Anything else
/// passes through unchanged.
fn unwrap_zip(data: &[u8]) -> Result<Vec<u8>> {
    if data.len() < 2 || data[..2] != ZIP_MAGIC {
        return Ok(data.to_vec());
    }

    let cursor = Cursor::new(data.to_vec());
    let mut archive = ZipArchive::new(cursor)?;

    let mut candidate: Option<String> = None;
    for i in 0..archive.len() {
        let file = archive.by_index(i)?;
        let name = file.name().to_string();
        if name.ends_with('/') {
            continue;
        }
        if has_extension(&name) {
            if candidate.is_some() {
                return Err(Error::ZipLayout(
                    "more than one entry with an extension in archive".into(),
                ));
            }
            candidate = Some(name);
        }
    }

    let name = candidate
        .ok_or_else(|| Error::ZipLayout("no entry with an extension found in archive".into()))?;
    let mut entry = archive.by_name(&name)?;
    let mut inner = Vec::new();
    entry.read_to_end(&mut inner)?;
    Ok(inner)
}

/// Compares `data`'s prefix against `bin_header` and `txt_header`,
/// dispatching to the binary or text parser. A match on `bin_header`
/// consumes that prefix before handing the remainder to the binary
/// parser; a match on `txt_header` leaves the header bytes in place,
/// since the text parser's own top-level branch discards them
/// structurally. If both headers are empty the input is always text —
/// a caller with no binary dictionary need not supply a header to
/// recognize. Otherwise, matching neither is fatal: there is no partial
/// result to fall back to.
fn dispatch(data: &[u8], bin_header: &[u8], txt_header: &[u8], lookup: impl TokenLookup) -> Result<Value> {
    if bin_header.is_empty() && txt_header.is_empty() {
        return text::parse_text(data);
    }
    if !bin_header.is_empty() && data.starts_with(bin_header) {
        return binary::parse_binary(&data[bin_header.len()..], lookup);
    }
    if !txt_header.is_empty() && data.starts_with(txt_header) {
        return text::parse_text(data);
    }

    let prefix_len = bin_header.len().max(txt_header.len()).min(data.len());
    Err(Error::InvalidHeader {
        expected: format!("{bin_header:?} or {txt_header:?}"),
        found: String::from_utf8_lossy(&data[..prefix_len]).into_owned(),
    })
}

/// Loads a document from raw bytes: unwraps a ZIP container if present,
/// then dispatches on the binary/text header.
pub fn load_bytes(
    data: &[u8],
    bin_header: &[u8],
    txt_header: &[u8],
    lookup: impl TokenLookup,
) -> Result<Value> {
    let unwrapped = unwrap_zip(data)?;
    dispatch(&unwrapped, bin_header, txt_header, lookup)
}

/// As `load_bytes`, reading the bytes from `path` first.
pub fn load(
    path: impl AsRef<Path>,
    bin_header: &[u8],
    txt_header: &[u8],
    lookup: impl TokenLookup,
) -> Result<Value> {
    let data = std::fs::read(path)?;
    load_bytes(&data, bin_header, txt_header, lookup)
}

/// Loads a document from raw bytes known in advance to require the text
/// parser, still unwrapping a ZIP container if present. Useful when a
/// caller has no binary dictionary to supply.
pub fn load_text_bytes(data: &[u8]) -> Result<Value> {
    let unwrapped = unwrap_zip(data)?;
    text::parse_text(&unwrapped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binary::NoLookup;
    use std::io::Write;

    fn zip_with_entries(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let cursor = Cursor::new(&mut buf);
            let mut writer = zip::ZipWriter::new(cursor);
            let options: zip::write::FileOptions<()> = zip::write::FileOptions::default();
            for (name, contents) in entries {
                writer.start_file(*name, options).unwrap();
                writer.write_all(contents).unwrap();
            }
            writer.finish().unwrap();
        }
        buf
    }

    #[test]
    fn passes_through_plain_text() {
        let value = load_text_bytes(b"foo=bar\n").unwrap();
        assert!(value.is_record());
    }

    #[test]
    fn unwraps_single_extensioned_entry() {
        let zip = zip_with_entries(&[("gamestate.eu4", b"foo=bar\n"), ("meta", b"ignored")]);
        let value = load_bytes(&zip, &[], &[], NoLookup).unwrap();
        assert!(value.is_record());
    }

    #[test]
    fn rejects_ambiguous_archive_layout() {
        let zip = zip_with_entries(&[("a.txt", b"foo=bar\n"), ("b.txt", b"baz=qux\n")]);
        let err = load_bytes(&zip, &[], &[], NoLookup).unwrap_err();
        assert!(matches!(err, Error::ZipLayout(_)));
    }

    #[test]
    fn dispatches_to_binary_on_header_match() {
        let mut data = b"BIN1".to_vec();
        data.extend_from_slice(&[0xdd, 0xdd, 0x01, 0x00, 0x0c, 0x00, 0x01, 0x00, 0x00, 0x00]);
        let value = load_bytes(&data, b"BIN1", b"EU4txt", NoLookup).unwrap();
        assert!(value.is_record());
    }

    #[test]
    fn dispatches_to_text_on_txt_header_match() {
        let data = b"EU4txt\r\nfoo=bar\r\n".to_vec();
        let value = load_bytes(&data, b"BIN1", b"EU4txt", NoLookup).unwrap();
        assert_eq!(value.get("foo").unwrap().as_str(), Some("bar"));
    }

    #[test]
    fn neither_header_matching_is_fatal() {
        let data = b"????\r\nfoo=bar\r\n".to_vec();
        let err = load_bytes(&data, b"BIN1", b"EU4txt", NoLookup).unwrap_err();
        assert!(matches!(err, Error::InvalidHeader { .. }));
    }

    #[test]
    fn load_reads_a_path_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("save.eu4");
        std::fs::write(&path, b"tag=FRA\n").unwrap();

        let value = load(&path, &[], &[], NoLookup).unwrap();
        assert_eq!(value.get("tag").unwrap().as_str(), Some("FRA"));
    }
}
