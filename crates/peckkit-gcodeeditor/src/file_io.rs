//! Program file reading and writing
//!
//! Programs are decoded as UTF-8 when possible. Files from older controllers
//! and CAM posts are often in a legacy multi-byte code page; those are decoded
//! byte-for-byte (each byte becomes the code point of the same value) so that
//! an unmodified line is written back with exactly the bytes it was read
//! with. Cycle words are ASCII and survive either way.

use std::fs;
use std::path::Path;

use peckkit_core::{Error, Result};
use serde::{Deserialize, Serialize};

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Detected file encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum FileEncoding {
    /// UTF-8 without byte order mark
    #[default]
    Utf8,
    /// UTF-8 with a leading byte order mark
    Utf8Bom,
    /// Not valid UTF-8; bytes preserved one-to-one
    Legacy,
}

impl FileEncoding {
    /// Detect encoding from file bytes
    pub fn detect(data: &[u8]) -> Self {
        if data.starts_with(&UTF8_BOM) {
            if std::str::from_utf8(&data[UTF8_BOM.len()..]).is_ok() {
                return FileEncoding::Utf8Bom;
            }
            return FileEncoding::Legacy;
        }

        if std::str::from_utf8(data).is_ok() {
            return FileEncoding::Utf8;
        }

        FileEncoding::Legacy
    }

    /// Decode bytes that were classified with [`FileEncoding::detect`]
    pub fn decode(self, data: &[u8]) -> String {
        match self {
            FileEncoding::Utf8 => String::from_utf8_lossy(data).into_owned(),
            FileEncoding::Utf8Bom => String::from_utf8_lossy(&data[UTF8_BOM.len()..]).into_owned(),
            FileEncoding::Legacy => data.iter().map(|&b| char::from(b)).collect(),
        }
    }

    /// Encode text for writing
    ///
    /// In legacy mode characters outside the single-byte range cannot come
    /// from the source file; they are replaced with `?`.
    pub fn encode(self, text: &str) -> Vec<u8> {
        match self {
            FileEncoding::Utf8 => text.as_bytes().to_vec(),
            FileEncoding::Utf8Bom => {
                let mut out = UTF8_BOM.to_vec();
                out.extend_from_slice(text.as_bytes());
                out
            }
            FileEncoding::Legacy => {
                let mut replaced = 0usize;
                let out: Vec<u8> = text
                    .chars()
                    .map(|c| {
                        u8::try_from(u32::from(c)).unwrap_or_else(|_| {
                            replaced += 1;
                            b'?'
                        })
                    })
                    .collect();
                if replaced > 0 {
                    tracing::warn!("{} characters not representable in legacy encoding", replaced);
                }
                out
            }
        }
    }
}

/// Text of a program together with the encoding it was read with
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedProgram {
    pub text: String,
    pub encoding: FileEncoding,
}

/// Read a program file
///
/// # Errors
/// `NotFound` when the path does not exist, `Io` for any other read failure.
pub fn read_program(path: &Path) -> Result<LoadedProgram> {
    if !path.exists() {
        return Err(Error::NotFound {
            path: path.to_path_buf(),
        });
    }

    let data = fs::read(path)?;
    let encoding = FileEncoding::detect(&data);
    if encoding == FileEncoding::Legacy {
        tracing::debug!(
            "{} is not UTF-8, decoding byte-for-byte",
            path.display()
        );
    }

    let text = encoding.decode(&data);
    tracing::info!(
        "Read {} ({} bytes, {:?})",
        path.display(),
        data.len(),
        encoding
    );
    Ok(LoadedProgram { text, encoding })
}

/// Write program text with the given encoding
pub fn write_program(path: &Path, text: &str, encoding: FileEncoding) -> Result<()> {
    let bytes = encoding.encode(text);
    fs::write(path, &bytes)?;
    tracing::info!("Wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect() {
        assert_eq!(FileEncoding::detect(b"G83 Z-3\n"), FileEncoding::Utf8);
        assert_eq!(
            FileEncoding::detect(&[0xEF, 0xBB, 0xBF, b'M', b'3']),
            FileEncoding::Utf8Bom
        );
        // Big5 bytes for a two-character comment
        assert_eq!(
            FileEncoding::detect(&[b'(', 0xA4, 0xA4, 0xA4, 0xE5, b')']),
            FileEncoding::Legacy
        );
    }

    #[test]
    fn test_legacy_bytes_survive() {
        let data = vec![b'(', 0xA4, 0xA4, 0x85, 0xE5, b')', b'\n'];
        let encoding = FileEncoding::detect(&data);
        let text = encoding.decode(&data);
        assert_eq!(encoding.encode(&text), data);
    }

    #[test]
    fn test_bom_restored() {
        let data = [0xEF, 0xBB, 0xBF, b'G', b'0', b'\n'];
        let encoding = FileEncoding::detect(&data);
        let text = encoding.decode(&data);
        assert_eq!(text, "G0\n");
        assert_eq!(encoding.encode(&text), data.to_vec());
    }
}
