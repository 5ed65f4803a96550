//! @ai:module:intent Count the lines of a source file with a streaming byte scan
//! @ai:module:layer infrastructure
//! @ai:module:public_api count_lines, count_lines_in
//! @ai:module:stateless true

use crate::error::{Error, Result};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

const CHUNK_SIZE: usize = 64 * 1024;

/// @ai:intent Count the lines of a file on disk
/// @ai:pre the compiler has already closed the file
/// @ai:post result >= 1
/// @ai:effects fs:read
pub fn count_lines(path: &Path) -> Result<usize> {
    let file = File::open(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    count_lines_in(file).map_err(|e| match e {
        Error::Io(source) => Error::FileRead {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })
}

/// @ai:intent Count lines from any reader in fixed-size chunks
/// @ai:example "a\nb\nc" -> 3, "a\nb\nc\n" -> 3, "" -> 1
/// @ai:edge_cases a trailing newline does not start a new line
/// @ai:effects io
pub fn count_lines_in<R: Read>(mut reader: R) -> Result<usize> {
    let mut buffer = vec![0u8; CHUNK_SIZE];
    let mut newlines = 0usize;
    let mut last_byte = None;

    loop {
        let read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };

        let chunk = &buffer[..read];
        newlines += chunk.iter().filter(|b| **b == b'\n').count();
        last_byte = chunk.last().copied();
    }

    let lines = match last_byte {
        Some(b'\n') => newlines,
        _ => newlines + 1,
    };
    Ok(lines.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn count(content: &[u8]) -> usize {
        count_lines_in(content).unwrap()
    }

    #[test]
    fn test_trailing_newline_is_not_a_line() {
        assert_eq!(count(b"a\nb\nc"), 3);
        assert_eq!(count(b"a\nb\nc\n"), 3);
        assert_eq!(count(b"a\nb\n"), 2);
    }

    #[test]
    fn test_degenerate_files() {
        assert_eq!(count(b""), 1);
        assert_eq!(count(b"\n"), 1);
        assert_eq!(count(b"\n\n"), 2);
        assert_eq!(count(b"no newline"), 1);
    }

    #[test]
    fn test_crlf_counts_once_per_line() {
        assert_eq!(count(b"a\r\nb\r\n"), 2);
    }

    #[test]
    fn test_spans_multiple_chunks() {
        let mut content = vec![b'x'; CHUNK_SIZE - 1];
        content.push(b'\n');
        content.extend_from_slice(b"tail");
        assert_eq!(count(&content), 2);

        let exact = vec![b'\n'; CHUNK_SIZE * 2];
        assert_eq!(count(&exact), CHUNK_SIZE * 2);
    }

    #[test]
    fn test_count_lines_on_disk() {
        let mut file = NamedTempFile::with_suffix(".pas").unwrap();
        write!(file, "program p;\nbegin\nend.\n").unwrap();
        assert_eq!(count_lines(file.path()).unwrap(), 3);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = count_lines(Path::new("/definitely/not/here.pas")).unwrap_err();
        assert!(matches!(err, Error::FileRead { .. }));
    }
}
