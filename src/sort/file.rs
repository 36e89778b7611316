/// Binary float-array file format and positional output writes.
///
/// Layout: an 8-byte native-endian u64 count, then `count` native-
/// endian f32 values. The output file carries the same header with the
/// payload re-ordered into ascending order.
use std::fs::File;
use std::io::{self, ErrorKind};
use std::path::Path;

use crate::common::io::read_file;

/// Bytes of the count header preceding the payload.
pub const HEADER_LEN: u64 = 8;
/// Bytes per value record.
pub const VALUE_LEN: usize = 4;

/// Load and validate an input file, returning its values.
///
/// Stricter than "trust the header": the file must hold the full
/// 8-byte count and at least `count` values behind it.
pub fn read_values(path: &Path) -> io::Result<Vec<f32>> {
    let data = read_file(path)?;
    if data.len() < HEADER_LEN as usize {
        return Err(io::Error::new(
            ErrorKind::InvalidData,
            format!("file too small: {} bytes, need at least {}", data.len(), HEADER_LEN),
        ));
    }

    let count = u64::from_ne_bytes([
        data[0], data[1], data[2], data[3], data[4], data[5], data[6], data[7],
    ]);

    // The whole payload must fit in memory (and in a usize).
    let payload_len = count
        .checked_mul(VALUE_LEN as u64)
        .filter(|&n| n <= usize::MAX as u64 - HEADER_LEN)
        .ok_or_else(|| {
            io::Error::new(
                ErrorKind::InvalidData,
                format!("count {} too large for this platform", count),
            )
        })?;

    let payload = &data[HEADER_LEN as usize..];
    if (payload.len() as u64) < payload_len {
        return Err(io::Error::new(
            ErrorKind::InvalidData,
            format!(
                "truncated payload: header claims {} values but only {} bytes follow",
                count,
                payload.len()
            ),
        ));
    }

    let mut values = Vec::with_capacity(count as usize);
    for chunk in payload[..payload_len as usize].chunks_exact(VALUE_LEN) {
        values.push(f32::from_ne_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
    }
    Ok(values)
}

/// Create the output file, pre-size it to header + payload, and write
/// the count header. Workers then fill disjoint payload ranges.
pub fn create_output(path: &Path, count: u64) -> io::Result<File> {
    let file = File::options()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?;
    file.set_len(HEADER_LEN + count * VALUE_LEN as u64)?;
    write_full_at(&file, &count.to_ne_bytes(), 0)?;
    Ok(file)
}

/// Serialize values into their on-disk byte representation.
pub fn encode_values(values: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(values.len() * VALUE_LEN);
    for v in values {
        bytes.extend_from_slice(&v.to_ne_bytes());
    }
    bytes
}

/// Positional write of the whole buffer at `offset`.
///
/// Positional writes take `&File` and never touch the shared cursor,
/// so concurrent writers to disjoint ranges need no locking. A single
/// call may still write short; loop until done, retrying on EINTR, and
/// treat a zero-length write as an error rather than spinning.
#[cfg(unix)]
pub fn write_full_at(file: &File, mut buf: &[u8], mut offset: u64) -> io::Result<()> {
    use std::os::unix::fs::FileExt;
    while !buf.is_empty() {
        match file.write_at(buf, offset) {
            Ok(0) => {
                return Err(io::Error::new(
                    ErrorKind::WriteZero,
                    "failed to write any data",
                ));
            }
            Ok(n) => {
                buf = &buf[n..];
                offset += n as u64;
            }
            Err(ref e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

#[cfg(windows)]
pub fn write_full_at(file: &File, mut buf: &[u8], mut offset: u64) -> io::Result<()> {
    use std::os::windows::fs::FileExt;
    while !buf.is_empty() {
        match file.seek_write(buf, offset) {
            Ok(0) => {
                return Err(io::Error::new(
                    ErrorKind::WriteZero,
                    "failed to write any data",
                ));
            }
            Ok(n) => {
                buf = &buf[n..];
                offset += n as u64;
            }
            Err(ref e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}
