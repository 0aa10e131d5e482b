//! TIFF/BigTIFF file header (§4.8).
//!
//! Classic TIFF headers are 8 bytes with 4-byte offsets; BigTIFF headers are
//! 16 bytes with 8-byte offsets. This engine always writes little-endian
//! ("II") headers, but parses either byte order when reading one back for
//! the downsample pass, mirroring the teacher's read-side parser.

use crate::error::TiffError;
use crate::io::{read_u16_be, read_u16_le, read_u32_be, read_u32_le, read_u64_be, read_u64_le};

const BYTE_ORDER_LITTLE_ENDIAN: u16 = 0x4949;
const BYTE_ORDER_BIG_ENDIAN: u16 = 0x4D4D;
const VERSION_TIFF: u16 = 42;
const VERSION_BIGTIFF: u16 = 43;

pub const CLASSIC_HEADER_SIZE: u64 = 8;
pub const BIGTIFF_HEADER_SIZE: u64 = 16;

/// `width * height` above which BigTIFF is selected instead of classic TIFF.
pub const BIG_TIFF_PIXEL_THRESHOLD: u64 = 1 << 29;

/// Decide classic TIFF vs BigTIFF for an image of the given dimensions.
pub fn use_big_tiff(width: u32, height: u32) -> bool {
    u64::from(width) * u64::from(height) > BIG_TIFF_PIXEL_THRESHOLD
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    LittleEndian,
    BigEndian,
}

impl ByteOrder {
    #[inline]
    pub fn read_u16(self, bytes: &[u8]) -> u16 {
        match self {
            ByteOrder::LittleEndian => read_u16_le(bytes),
            ByteOrder::BigEndian => read_u16_be(bytes),
        }
    }

    #[inline]
    pub fn read_u32(self, bytes: &[u8]) -> u32 {
        match self {
            ByteOrder::LittleEndian => read_u32_le(bytes),
            ByteOrder::BigEndian => read_u32_be(bytes),
        }
    }

    #[inline]
    pub fn read_u64(self, bytes: &[u8]) -> u64 {
        match self {
            ByteOrder::LittleEndian => read_u64_le(bytes),
            ByteOrder::BigEndian => read_u64_be(bytes),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TiffHeader {
    pub byte_order: ByteOrder,
    pub is_bigtiff: bool,
    pub first_ifd_offset: u64,
}

impl TiffHeader {
    /// Parse a TIFF header from its first 8 (classic) or 16 (BigTIFF) bytes.
    pub fn parse(bytes: &[u8]) -> Result<Self, TiffError> {
        if bytes.len() < CLASSIC_HEADER_SIZE as usize {
            return Err(TiffError::FileTooSmall {
                required: CLASSIC_HEADER_SIZE,
                actual: bytes.len() as u64,
            });
        }

        let magic = u16::from_le_bytes([bytes[0], bytes[1]]);
        let byte_order = match magic {
            BYTE_ORDER_LITTLE_ENDIAN => ByteOrder::LittleEndian,
            BYTE_ORDER_BIG_ENDIAN => ByteOrder::BigEndian,
            _ => return Err(TiffError::InvalidMagic(magic)),
        };

        let version = byte_order.read_u16(&bytes[2..4]);
        match version {
            VERSION_TIFF => Ok(Self {
                byte_order,
                is_bigtiff: false,
                first_ifd_offset: u64::from(byte_order.read_u32(&bytes[4..8])),
            }),
            VERSION_BIGTIFF => {
                if bytes.len() < BIGTIFF_HEADER_SIZE as usize {
                    return Err(TiffError::FileTooSmall {
                        required: BIGTIFF_HEADER_SIZE,
                        actual: bytes.len() as u64,
                    });
                }
                let offset_size = byte_order.read_u16(&bytes[4..6]);
                if offset_size != 8 {
                    return Err(TiffError::InvalidBigTiffOffsetSize(offset_size));
                }
                Ok(Self {
                    byte_order,
                    is_bigtiff: true,
                    first_ifd_offset: byte_order.read_u64(&bytes[8..16]),
                })
            }
            _ => Err(TiffError::InvalidVersion(version)),
        }
    }

    /// Serialize a little-endian header with the given first-IFD offset
    /// (typically `0` as a placeholder, patched once the first IFD is known).
    pub fn write_le(is_bigtiff: bool, first_ifd_offset: u64) -> Vec<u8> {
        let mut out = Vec::with_capacity(BIGTIFF_HEADER_SIZE as usize);
        out.extend_from_slice(&BYTE_ORDER_LITTLE_ENDIAN.to_le_bytes());
        if is_bigtiff {
            out.extend_from_slice(&VERSION_BIGTIFF.to_le_bytes());
            out.extend_from_slice(&8u16.to_le_bytes());
            out.extend_from_slice(&0u16.to_le_bytes());
            out.extend_from_slice(&first_ifd_offset.to_le_bytes());
        } else {
            out.extend_from_slice(&VERSION_TIFF.to_le_bytes());
            out.extend_from_slice(&(first_ifd_offset as u32).to_le_bytes());
        }
        out
    }

    pub const fn header_size(is_bigtiff: bool) -> u64 {
        if is_bigtiff {
            BIGTIFF_HEADER_SIZE
        } else {
            CLASSIC_HEADER_SIZE
        }
    }

    /// Byte offset within the header of the first-IFD-offset field, used to
    /// patch it once the base IFD's real position is known.
    pub const fn first_ifd_offset_field_position(is_bigtiff: bool) -> u64 {
        if is_bigtiff { 8 } else { 4 }
    }
}
