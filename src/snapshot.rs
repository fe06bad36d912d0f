//! Owner-id buffer snapshot codec (spec.md §4.7): raw or run-length-encoded
//! `i32` buffers with a small fixed header, used by the change-overlay
//! striping in `resolver.rs`.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{Error, ErrorKind};

const MAGIC: &[u8; 4] = b"OWN1";
const FLAG_COMPRESSED: u32 = 1 << 0;

/// Writes `buf` (row-major, `width * height` entries, sentinel = -1) to
/// `writer`, RLE-compressed when `compress` is set (spec.md §4.7).
pub fn encode<W: Write>(writer: &mut W, width: u32, height: u32, buf: &[i32], compress: bool) -> Result<(), Error> {
    debug_assert_eq!(buf.len(), (width as usize) * (height as usize));

    writer.write_all(MAGIC)?;
    writer.write_u32::<BigEndian>(width)?;
    writer.write_u32::<BigEndian>(height)?;
    writer.write_u32::<BigEndian>(if compress { FLAG_COMPRESSED } else { 0 })?;

    if !compress {
        for &value in buf {
            writer.write_i32::<BigEndian>(value)?;
        }
        return Ok(());
    }

    let mut i = 0;
    while i < buf.len() {
        let value = buf[i];
        let mut count: u32 = 1;
        while i + (count as usize) < buf.len() && buf[i + count as usize] == value {
            count += 1;
        }
        writer.write_i32::<BigEndian>(value)?;
        writer.write_u32::<BigEndian>(count)?;
        i += count as usize;
    }
    Ok(())
}

/// Reads a snapshot back into a flat owner-id buffer, validating the magic
/// and, if `expected_shape` is given, the dimensions (spec.md §4.7
/// `ShapeMismatch`).
pub fn decode<R: Read>(reader: &mut R, expected_shape: Option<(u32, u32)>) -> Result<(u32, u32, Vec<i32>), Error> {
    let mut magic = [0u8; 4];
    read_exact_or_truncated(reader, &mut magic)?;
    if &magic != MAGIC {
        return Err(ErrorKind::InvalidFormat("bad magic".to_string()).into());
    }

    let width = read_u32_or_truncated(reader)?;
    let height = read_u32_or_truncated(reader)?;
    let flags = read_u32_or_truncated(reader)?;

    if let Some(expected) = expected_shape {
        if expected != (width, height) {
            return Err(ErrorKind::ShapeMismatch {
                expected,
                found: (width, height),
            }
            .into());
        }
    }

    let total = (width as usize) * (height as usize);
    let mut buf = Vec::with_capacity(total);

    if flags & FLAG_COMPRESSED == 0 {
        for _ in 0..total {
            buf.push(read_i32_or_truncated(reader)?);
        }
        return Ok((width, height, buf));
    }

    while buf.len() < total {
        let value = read_i32_or_truncated(reader)?;
        let count = read_u32_or_truncated(reader)?;
        let remaining = total - buf.len();
        if count as usize > remaining {
            return Err(ErrorKind::Truncated.into());
        }
        buf.extend(std::iter::repeat(value).take(count as usize));
    }

    Ok((width, height, buf))
}

fn read_exact_or_truncated<R: Read>(reader: &mut R, out: &mut [u8]) -> Result<(), Error> {
    reader.read_exact(out).map_err(|_| Error::from(ErrorKind::Truncated))
}

fn read_u32_or_truncated<R: Read>(reader: &mut R) -> Result<u32, Error> {
    reader.read_u32::<BigEndian>().map_err(|_| Error::from(ErrorKind::Truncated))
}

fn read_i32_or_truncated<R: Read>(reader: &mut R) -> Result<i32, Error> {
    reader.read_i32::<BigEndian>().map_err(|_| Error::from(ErrorKind::Truncated))
}

/// Convenience wrapper: encode straight to a file path.
pub fn save_owner_data(path: &std::path::Path, width: u32, height: u32, buf: &[i32], compress: bool) -> Result<(), Error> {
    let mut writer = BufWriter::new(File::create(path)?);
    encode(&mut writer, width, height, buf, compress)?;
    writer.flush()?;
    Ok(())
}

/// Convenience wrapper: decode straight from a file path, checking the
/// shape against the current map's dimensions.
pub fn load_old_owner_data(path: &std::path::Path, expected_shape: (u32, u32)) -> Result<Vec<i32>, Error> {
    let mut reader = BufReader::new(File::open(path)?);
    let (_, _, buf) = decode(&mut reader, Some(expected_shape))?;
    Ok(buf)
}
