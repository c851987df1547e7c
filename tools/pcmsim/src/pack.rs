//! Card image generation and inspection

use anyhow::{bail, Context, Result};

use pcmstream::header::{AuHeader, ENCODING_LINEAR_8, HEADER_LEN};
use pcmstream::storage::BLOCK_SIZE;

/// Build a card image: header, signed 8-bit payload, zero padding to a whole block.
pub fn pack(payload: &[u8], sample_rate: u32, channels: u32) -> Result<Vec<u8>> {
    if payload.is_empty() {
        bail!("payload is empty");
    }
    let data_size = u32::try_from(payload.len()).context("payload larger than 4 GiB")?;

    let header = AuHeader {
        data_offset: HEADER_LEN as u32,
        data_size: Some(data_size),
        encoding: ENCODING_LINEAR_8,
        sample_rate,
        channels,
    };

    let mut image = Vec::with_capacity(HEADER_LEN + payload.len() + BLOCK_SIZE as usize);
    image.extend_from_slice(&header.to_bytes());
    image.extend_from_slice(payload);
    let padded = image.len().div_ceil(BLOCK_SIZE as usize) * BLOCK_SIZE as usize;
    image.resize(padded, 0);
    Ok(image)
}

pub fn read_header(image: &[u8]) -> Result<AuHeader> {
    let Some(bytes) = image.first_chunk::<HEADER_LEN>() else {
        bail!("image is shorter than the {}-byte header", HEADER_LEN);
    };
    Ok(AuHeader::parse(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_to_whole_blocks() {
        let image = pack(&[1; 600], 31_250, 2).unwrap();
        assert_eq!(image.len(), 1024);

        let header = read_header(&image).unwrap();
        assert_eq!(header.data_size, Some(600));
        assert_eq!(header.channels, 2);
        assert_eq!(&image[24..26], &[1, 1]);
        assert_eq!(image[624], 0);
    }

    #[test]
    fn rejects_empty_payload() {
        assert!(pack(&[], 31_250, 1).is_err());
        assert!(read_header(&[0; 10]).is_err());
    }
}
