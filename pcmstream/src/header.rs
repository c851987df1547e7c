//! Sun/NeXT `.au` header at the start of the card.
//!
//! | Offset | Field       | Notes                                 |
//! |--------|-------------|---------------------------------------|
//! | 0      | magic       | `.snd`                                |
//! | 4      | data offset | first payload byte, from card start   |
//! | 8      | data size   | payload length, `0xffff_ffff` unknown |
//! | 12     | encoding    | 2 = 8-bit linear PCM                  |
//! | 16     | sample rate | Hz                                    |
//! | 20     | channels    |                                       |
//!
//! All fields are big-endian `u32`.

use core::fmt;

use crate::storage::CHUNK_SIZE;

pub const HEADER_LEN: usize = 24;
pub const AU_MAGIC: u32 = 0x2e73_6e64;
/// Encoding code for 8-bit linear PCM.
pub const ENCODING_LINEAR_8: u32 = 2;
const UNKNOWN_SIZE: u32 = 0xffff_ffff;

const _: () = assert!(HEADER_LEN % CHUNK_SIZE == 0);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuHeader {
    pub data_offset: u32,
    /// `None` when the writer did not know the length.
    pub data_size: Option<u32>,
    pub encoding: u32,
    pub sample_rate: u32,
    pub channels: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeaderError {
    BadMagic(u32),
    /// Data offset points inside the header.
    TruncatedHeader(u32),
    /// Data offset does not start on a read frame.
    MisalignedData(u32),
    /// No data size in the header and no card size to derive it from.
    UnknownLength,
    EmptyPayload,
}

impl fmt::Display for HeaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderError::BadMagic(magic) => write!(f, "bad header magic {:#010x}", magic),
            HeaderError::TruncatedHeader(offset) => {
                write!(f, "data offset {} is inside the {}-byte header", offset, HEADER_LEN)
            }
            HeaderError::MisalignedData(offset) => {
                write!(f, "data offset {} is not a multiple of {}", offset, CHUNK_SIZE)
            }
            HeaderError::UnknownLength => write!(f, "payload length unknown"),
            HeaderError::EmptyPayload => write!(f, "payload is empty"),
        }
    }
}

impl core::error::Error for HeaderError {}

#[inline(always)]
fn field(bytes: &[u8; HEADER_LEN], offset: usize) -> u32 {
    u32::from_be_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

impl AuHeader {
    pub fn parse(bytes: &[u8; HEADER_LEN]) -> Result<Self, HeaderError> {
        let magic = field(bytes, 0);
        if magic != AU_MAGIC {
            return Err(HeaderError::BadMagic(magic));
        }

        let data_offset = field(bytes, 4);
        if (data_offset as usize) < HEADER_LEN {
            return Err(HeaderError::TruncatedHeader(data_offset));
        }
        if data_offset as usize % CHUNK_SIZE != 0 {
            return Err(HeaderError::MisalignedData(data_offset));
        }

        let data_size = match field(bytes, 8) {
            UNKNOWN_SIZE => None,
            size => Some(size),
        };

        Ok(AuHeader {
            data_offset,
            data_size,
            encoding: field(bytes, 12),
            sample_rate: field(bytes, 16),
            channels: field(bytes, 20),
        })
    }

    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        let fields = [
            AU_MAGIC,
            self.data_offset,
            self.data_size.unwrap_or(UNKNOWN_SIZE),
            self.encoding,
            self.sample_rate,
            self.channels,
        ];
        for (chunk, value) in out.chunks_exact_mut(4).zip(fields) {
            chunk.copy_from_slice(&value.to_be_bytes());
        }
        out
    }

    /// Playable payload length, limited to what fits on a card of `card_size` bytes.
    pub fn payload_length(&self, card_size: Option<u32>) -> Result<u32, HeaderError> {
        let room = card_size.map(|size| size.saturating_sub(self.data_offset));
        let length = match (self.data_size, room) {
            (Some(size), Some(room)) => size.min(room),
            (Some(size), None) => size,
            (None, Some(room)) => room,
            (None, None) => return Err(HeaderError::UnknownLength),
        };
        if length == 0 {
            return Err(HeaderError::EmptyPayload);
        }
        Ok(length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> AuHeader {
        AuHeader {
            data_offset: 24,
            data_size: Some(0x0001_2345),
            encoding: ENCODING_LINEAR_8,
            sample_rate: 31_250,
            channels: 2,
        }
    }

    #[test]
    fn parses_big_endian_fields() {
        let bytes = [
            0x2e, 0x73, 0x6e, 0x64, // .snd
            0x00, 0x00, 0x00, 0x18, // offset 24
            0x00, 0x01, 0x23, 0x45, // size
            0x00, 0x00, 0x00, 0x02, // encoding
            0x00, 0x00, 0x7a, 0x12, // 31250
            0x00, 0x00, 0x00, 0x02, // stereo
        ];
        assert_eq!(AuHeader::parse(&bytes), Ok(header()));
        assert_eq!(header().to_bytes(), bytes);
    }

    #[test]
    fn rejects_foreign_data() {
        let mut bytes = header().to_bytes();
        bytes[0] = b'R';
        assert!(matches!(AuHeader::parse(&bytes), Err(HeaderError::BadMagic(_))));
    }

    #[test]
    fn rejects_bad_offsets() {
        let mut h = header();
        h.data_offset = 16;
        assert_eq!(AuHeader::parse(&h.to_bytes()), Err(HeaderError::TruncatedHeader(16)));

        h.data_offset = 28;
        assert_eq!(AuHeader::parse(&h.to_bytes()), Err(HeaderError::MisalignedData(28)));

        h.data_offset = 32;
        assert_eq!(AuHeader::parse(&h.to_bytes()).map(|h| h.data_offset), Ok(32));
    }

    #[test]
    fn payload_length_limits() {
        let h = header();
        assert_eq!(h.payload_length(None), Ok(0x0001_2345));
        assert_eq!(h.payload_length(Some(1024)), Ok(1000));

        let unknown = AuHeader { data_size: None, ..h };
        assert_eq!(AuHeader::parse(&unknown.to_bytes()).unwrap().data_size, None);
        assert_eq!(unknown.payload_length(None), Err(HeaderError::UnknownLength));
        assert_eq!(unknown.payload_length(Some(4096)), Ok(4072));

        let empty = AuHeader { data_size: Some(0), ..h };
        assert_eq!(empty.payload_length(None), Err(HeaderError::EmptyPayload));
    }
}
