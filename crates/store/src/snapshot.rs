//! Snapshot serialization.
//!
//! A snapshot is the complete contents of every table at one commit. All
//! integers are little-endian.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ magic "RAMDISK\0" (8) │ version (2) │ tables (1) │ id (8) │
//! ├──────────────────────────────────────────────────────────┤
//! │ per table: table_id (1) │ entry_count (8)                │
//! │   per entry: key_len (4) │ key │ value_len (4) │ value   │
//! ├──────────────────────────────────────────────────────────┤
//! │ XXH3-64 of everything above (8)                          │
//! └──────────────────────────────────────────────────────────┘
//! ```

use std::{
    io::{Cursor, Read},
    sync::Arc,
};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use xxhash_rust::xxh3::xxh3_64;

use crate::{
    error::{Error, Result},
    tables::TableId,
    transaction::{CommittedState, SnapshotId, TableData},
};

/// Magic number for ramdisk snapshot files.
pub const MAGIC: &[u8; 8] = b"RAMDISK\0";

/// Current format version.
pub const FORMAT_VERSION: u16 = 1;

/// Size of the fixed header preceding the table sections.
pub const HEADER_SIZE: usize = 8 + 2 + 1 + 8;

/// Size of the checksum trailer.
pub const CHECKSUM_SIZE: usize = 8;

/// Serializes a committed state into snapshot bytes.
///
/// # Errors
///
/// Returns [`Error::Corrupted`] if a key or value is longer than a `u32`
/// length prefix can describe.
pub fn encode_snapshot(state: &CommittedState) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(HEADER_SIZE + CHECKSUM_SIZE);
    buf.extend_from_slice(MAGIC);
    buf.write_u16::<LittleEndian>(FORMAT_VERSION)?;
    buf.write_u8(TableId::COUNT as u8)?;
    buf.write_u64::<LittleEndian>(state.snapshot_id.raw())?;

    for id in TableId::all() {
        let table = state.table(id);
        buf.write_u8(id as u8)?;
        buf.write_u64::<LittleEndian>(table.len() as u64)?;
        for (key, value) in table {
            write_field(&mut buf, key)?;
            write_field(&mut buf, value)?;
        }
    }

    let checksum = xxh3_64(&buf);
    buf.write_u64::<LittleEndian>(checksum)?;
    Ok(buf)
}

/// Parses snapshot bytes into a committed state.
///
/// The header is checked first, then the checksum, then the table sections.
///
/// # Errors
///
/// - [`Error::InvalidMagic`] if the bytes are not a ramdisk snapshot.
/// - [`Error::UnsupportedVersion`] if the format version is unknown.
/// - [`Error::ChecksumMismatch`] if the trailer does not match the body.
/// - [`Error::Corrupted`] if the table sections are malformed.
pub fn decode_snapshot(bytes: &[u8]) -> Result<CommittedState> {
    if bytes.len() < HEADER_SIZE + CHECKSUM_SIZE {
        return Err(corrupted(format!("snapshot too short: {} bytes", bytes.len())));
    }
    if &bytes[..MAGIC.len()] != MAGIC {
        return Err(Error::InvalidMagic);
    }

    let (body, trailer) = bytes.split_at(bytes.len() - CHECKSUM_SIZE);
    let mut cursor = Cursor::new(body);
    cursor.set_position(MAGIC.len() as u64);
    let version = cursor.read_u16::<LittleEndian>()?;
    if version != FORMAT_VERSION {
        return Err(Error::UnsupportedVersion { version });
    }

    let expected = Cursor::new(trailer).read_u64::<LittleEndian>()?;
    let computed = xxh3_64(body);
    if expected != computed {
        return Err(Error::ChecksumMismatch { expected, computed });
    }

    let table_count = cursor.read_u8()? as usize;
    if table_count != TableId::COUNT {
        return Err(corrupted(format!("expected {} tables, found {table_count}", TableId::COUNT)));
    }
    let snapshot_id = SnapshotId::new(cursor.read_u64::<LittleEndian>()?);

    let mut state = CommittedState { snapshot_id, ..CommittedState::default() };
    for expected_id in TableId::all() {
        let raw_id = truncated(cursor.read_u8())?;
        if TableId::from_u8(raw_id) != Some(expected_id) {
            return Err(corrupted(format!(
                "expected table {} at this position, found id {raw_id}",
                expected_id.name()
            )));
        }
        let entries = truncated(cursor.read_u64::<LittleEndian>())?;
        let mut table = TableData::new();
        let mut previous: Option<Vec<u8>> = None;
        for _ in 0..entries {
            let key = read_field(&mut cursor)?;
            let value = read_field(&mut cursor)?;
            if previous.as_ref().is_some_and(|prev| *prev >= key) {
                return Err(corrupted(format!("{} keys out of order", expected_id.name())));
            }
            previous = Some(key.clone());
            table.insert(key, value);
        }
        state.tables[expected_id.index()] = Arc::new(table);
    }

    if cursor.position() != body.len() as u64 {
        return Err(corrupted(format!(
            "{} trailing bytes after last table",
            body.len() as u64 - cursor.position()
        )));
    }
    Ok(state)
}

fn write_field(buf: &mut Vec<u8>, field: &[u8]) -> Result<()> {
    let len = u32::try_from(field.len())
        .map_err(|_| corrupted(format!("field of {} bytes exceeds u32 length", field.len())))?;
    buf.write_u32::<LittleEndian>(len)?;
    buf.extend_from_slice(field);
    Ok(())
}

fn read_field(cursor: &mut Cursor<&[u8]>) -> Result<Vec<u8>> {
    let len = truncated(cursor.read_u32::<LittleEndian>())? as usize;
    let remaining = cursor.get_ref().len() as u64 - cursor.position();
    if len as u64 > remaining {
        return Err(corrupted(format!("field of {len} bytes exceeds remaining {remaining}")));
    }
    let mut field = vec![0u8; len];
    truncated(cursor.read_exact(&mut field))?;
    Ok(field)
}

fn truncated<T>(result: std::io::Result<T>) -> Result<T> {
    result.map_err(|_| corrupted("unexpected end of snapshot".to_string()))
}

fn corrupted(reason: String) -> Error {
    Error::Corrupted { reason }
}
