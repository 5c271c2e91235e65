//! Optional compression of converted assets.

use alloc::format;
use alloc::vec::Vec;

use crate::error::ConvertError;

/// A byte-oriented codec the assembler can run converted buffers through.
///
/// `decompress` receives the length of the original data.
pub trait Compressor {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, ConvertError>;
    fn decompress(&self, data: &[u8], original_len: usize) -> Result<Vec<u8>, ConvertError>;
}

/// LZSS with a 1 KiB window and 4-bit match lengths.
#[derive(Clone, Copy, Debug, Default)]
pub struct LzssCompressor;

type Lzss = lzss::Lzss<10, 4, 0x20, { 1 << 10 }, { 2 << 10 }>;

impl Compressor for LzssCompressor {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, ConvertError> {
        Lzss::compress(
            lzss::SliceReader::new(data),
            lzss::VecWriter::with_capacity(data.len()),
        )
        .map_err(|e| ConvertError::Compression(format!("{e}")))
    }

    fn decompress(&self, data: &[u8], original_len: usize) -> Result<Vec<u8>, ConvertError> {
        Lzss::decompress(
            lzss::SliceReader::new(data),
            lzss::VecWriter::with_capacity(original_len),
        )
        .map_err(|e| ConvertError::Compression(format!("{e}")))
    }
}

/// Compress `data` and check that decompression gives it back.
///
/// Returns the compressed bytes only when strictly smaller than `data`.
pub(crate) fn compress_verified(
    compressor: &dyn Compressor,
    asset: &str,
    data: &[u8],
) -> Result<Option<Vec<u8>>, ConvertError> {
    let packed = compressor.compress(data)?;
    let unpacked = compressor.decompress(&packed, data.len())?;
    if unpacked != data {
        return Err(ConvertError::CompressionCorrupted {
            asset: asset.into(),
        });
    }
    if packed.len() < data.len() {
        log::debug!("{asset}: compressed {} -> {} bytes", data.len(), packed.len());
        Ok(Some(packed))
    } else {
        log::debug!(
            "{asset}: compression does not pay off ({} -> {} bytes)",
            data.len(),
            packed.len()
        );
        Ok(None)
    }
}
