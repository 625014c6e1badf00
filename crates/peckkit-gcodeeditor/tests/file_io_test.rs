use peckkit_core::Error;
use peckkit_gcodeeditor::{read_program, write_program, FileEncoding, TextBuffer};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_missing_file_is_not_found() {
    let dir = TempDir::new().unwrap();
    let err = read_program(&dir.path().join("absent.nc")).unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
}

#[test]
fn test_legacy_file_round_trip_after_edit() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("legacy.nc");

    let mut bytes = b"(".to_vec();
    bytes.extend_from_slice(&[0xA5, 0x7E, 0xB1, 0xC6]);
    bytes.extend_from_slice(b")\r\nM03 S8000\r\nG83 Z-3 R0 Q1 F100\r\n");
    fs::write(&path, &bytes).unwrap();

    let loaded = read_program(&path).unwrap();
    assert_eq!(loaded.encoding, FileEncoding::Legacy);

    let mut buffer = TextBuffer::from(loaded.text.as_str());
    assert_eq!(buffer.line_count(), 3);
    buffer.replace_line(2, "G83 Z-3 R0 Q0.5 F100").unwrap();

    let out = dir.path().join("out.nc");
    write_program(&out, &buffer.to_string(), loaded.encoding).unwrap();

    let mut expected = b"(".to_vec();
    expected.extend_from_slice(&[0xA5, 0x7E, 0xB1, 0xC6]);
    expected.extend_from_slice(b")\r\nM03 S8000\r\nG83 Z-3 R0 Q0.5 F100\r\n");
    assert_eq!(fs::read(&out).unwrap(), expected);
}

#[test]
fn test_utf8_file_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("utf8.nc");
    fs::write(&path, "(鑽孔)\nG83 Z-3 R0 Q1\n").unwrap();

    let loaded = read_program(&path).unwrap();
    assert_eq!(loaded.encoding, FileEncoding::Utf8);
    assert!(loaded.text.starts_with("(鑽孔)"));

    write_program(&path, &loaded.text, loaded.encoding).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "(鑽孔)\nG83 Z-3 R0 Q1\n");
}
