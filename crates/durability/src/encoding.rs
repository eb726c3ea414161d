//! Record framing with CRC32 checksums
//!
//! ```text
//! +-----------+-----------+---------------------+
//! | len (u32) | crc (u32) | bincode(WalRecord)  |
//! +-----------+-----------+---------------------+
//!   little-endian, crc covers the payload only
//! ```
//!
//! A frame whose header or payload runs past the end of the buffer is
//! `Incomplete` (torn write); a frame whose checksum or payload fails to
//! decode is `Corrupt`. Recovery treats both as the end of the valid log.

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use distlog_core::{Error, Result};

use crate::record::WalRecord;

/// Bytes before the payload
pub const FRAME_HEADER_LEN: usize = 8;

/// Outcome of decoding one frame
#[derive(Debug)]
pub enum Decoded {
    /// A valid record and the number of bytes it occupied
    Record(WalRecord, usize),
    /// Buffer ends mid-frame
    Incomplete,
    /// Frame is complete but invalid
    Corrupt(String),
}

/// Encode a record into a checksummed frame
pub fn encode_record(record: &WalRecord) -> Result<Vec<u8>> {
    let payload = bincode::serialize(record)?;
    let len = u32::try_from(payload.len())
        .map_err(|_| Error::InvalidInput(format!("record too large: {} bytes", payload.len())))?;
    let crc = crc32fast::hash(&payload);

    let mut frame = Vec::with_capacity(FRAME_HEADER_LEN + payload.len());
    frame.write_u32::<LittleEndian>(len)?;
    frame.write_u32::<LittleEndian>(crc)?;
    frame.extend_from_slice(&payload);
    Ok(frame)
}

/// Decode the frame at the start of `buf`
pub fn decode_record(buf: &[u8]) -> Decoded {
    if buf.len() < FRAME_HEADER_LEN {
        return Decoded::Incomplete;
    }
    let len = LittleEndian::read_u32(&buf[0..4]) as usize;
    let expected_crc = LittleEndian::read_u32(&buf[4..8]);

    let end = match FRAME_HEADER_LEN.checked_add(len) {
        Some(end) => end,
        None => return Decoded::Corrupt(format!("frame length overflow: {}", len)),
    };
    if buf.len() < end {
        return Decoded::Incomplete;
    }

    let payload = &buf[FRAME_HEADER_LEN..end];
    let actual_crc = crc32fast::hash(payload);
    if actual_crc != expected_crc {
        return Decoded::Corrupt(format!(
            "checksum mismatch: expected {:08x}, got {:08x}",
            expected_crc, actual_crc
        ));
    }

    match bincode::deserialize::<WalRecord>(payload) {
        Ok(record) => Decoded::Record(record, end),
        Err(e) => Decoded::Corrupt(format!("undecodable payload: {}", e)),
    }
}
