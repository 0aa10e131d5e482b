//! TIFF tag and field type definitions.
//!
//! This module defines the vocabulary needed to both read back and write the
//! tiled pyramid TIFF container: field types that determine how values are
//! encoded, and the tag IDs used on each IFD (§4.5, §4.6, §4.8).

// =============================================================================
// TIFF Field Types
// =============================================================================

/// TIFF field types that determine how values are encoded.
///
/// Only the types actually used by a tiled JPEG pyramid TIFF are defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum FieldType {
    /// Unsigned 8-bit integer (1 byte)
    Byte = 1,

    /// 8-bit ASCII character (1 byte)
    Ascii = 2,

    /// Unsigned 16-bit integer (2 bytes)
    Short = 3,

    /// Unsigned 32-bit integer (4 bytes)
    Long = 4,

    /// Undefined byte data (1 byte per element)
    Undefined = 7,

    /// Unsigned 64-bit integer (8 bytes) - BigTIFF only
    Long8 = 16,
}

impl FieldType {
    /// Size of a single value of this type in bytes.
    #[inline]
    pub const fn size_in_bytes(self) -> usize {
        match self {
            FieldType::Byte => 1,
            FieldType::Ascii => 1,
            FieldType::Short => 2,
            FieldType::Long => 4,
            FieldType::Long8 => 8,
            FieldType::Undefined => 1,
        }
    }

    /// Create a FieldType from its numeric value.
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            1 => Some(FieldType::Byte),
            2 => Some(FieldType::Ascii),
            3 => Some(FieldType::Short),
            4 => Some(FieldType::Long),
            7 => Some(FieldType::Undefined),
            16 => Some(FieldType::Long8),
            _ => None,
        }
    }

    /// Maximum bytes that can be stored inline in a classic TIFF IFD entry.
    pub const INLINE_THRESHOLD_TIFF: usize = 4;

    /// Maximum bytes that can be stored inline in a BigTIFF IFD entry.
    pub const INLINE_THRESHOLD_BIGTIFF: usize = 8;

    /// Check if a value with this type and count fits inline in a TIFF entry.
    #[inline]
    pub fn fits_inline(self, count: u64, is_bigtiff: bool) -> bool {
        let total_size = self.size_in_bytes() as u64 * count;
        let threshold = if is_bigtiff {
            Self::INLINE_THRESHOLD_BIGTIFF as u64
        } else {
            Self::INLINE_THRESHOLD_TIFF as u64
        };
        total_size <= threshold
    }
}

// =============================================================================
// TIFF Tags
// =============================================================================

/// TIFF tag IDs used by a tiled JPEG pyramid TIFF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum TiffTag {
    /// Marks an IFD as a reduced-resolution version of another image.
    NewSubfileType = 254,

    /// Image width in pixels
    ImageWidth = 256,

    /// Image height (length) in pixels
    ImageLength = 257,

    /// Bits per sample (8 for each of R,G,B)
    BitsPerSample = 258,

    /// Compression scheme used
    Compression = 259,

    /// Photometric interpretation (RGB, YCbCr, etc.)
    PhotometricInterpretation = 262,

    /// Number of components per pixel (3 for RGB/YCbCr)
    SamplesPerPixel = 277,

    /// Width of each tile in pixels
    TileWidth = 322,

    /// Height (length) of each tile in pixels
    TileLength = 323,

    /// Byte offsets of each tile in the file
    TileOffsets = 324,

    /// Byte counts of each tile
    TileByteCounts = 325,

    /// Name/version of the software that produced the file
    Software = 305,

    /// JPEG quantization/Huffman tables shared by per-tile streams
    JpegTables = 347,

    /// Per-sample data format (1 = unsigned integer)
    SampleFormat = 339,
}

impl TiffTag {
    /// Create a TiffTag from its numeric value.
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            254 => Some(TiffTag::NewSubfileType),
            256 => Some(TiffTag::ImageWidth),
            257 => Some(TiffTag::ImageLength),
            258 => Some(TiffTag::BitsPerSample),
            259 => Some(TiffTag::Compression),
            262 => Some(TiffTag::PhotometricInterpretation),
            277 => Some(TiffTag::SamplesPerPixel),
            305 => Some(TiffTag::Software),
            322 => Some(TiffTag::TileWidth),
            323 => Some(TiffTag::TileLength),
            324 => Some(TiffTag::TileOffsets),
            325 => Some(TiffTag::TileByteCounts),
            339 => Some(TiffTag::SampleFormat),
            347 => Some(TiffTag::JpegTables),
            _ => None,
        }
    }

    #[inline]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }
}

// =============================================================================
// Compression & Photometric Interpretation Values
// =============================================================================

/// TIFF compression scheme identifiers. Only JPEG is ever written; other
/// values are recognized so the read-back pass (§4.6) can reject them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum Compression {
    None = 1,
    Lzw = 5,
    OldJpeg = 6,
    Jpeg = 7,
    Deflate = 8,
}

impl Compression {
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            1 => Some(Compression::None),
            5 => Some(Compression::Lzw),
            6 => Some(Compression::OldJpeg),
            7 => Some(Compression::Jpeg),
            8 => Some(Compression::Deflate),
            _ => None,
        }
    }

    #[inline]
    pub const fn is_supported(self) -> bool {
        matches!(self, Compression::Jpeg)
    }
}

/// Photometric interpretation: this engine only ever writes YCbCr JPEG tiles.
pub const PHOTOMETRIC_YCBCR: u16 = 6;

/// `NewSubfileType` bit meaning "this is a reduced-resolution version of
/// another image" (§3).
pub const NEW_SUBFILE_TYPE_REDUCED_RESOLUTION: u32 = 1;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_type_sizes() {
        assert_eq!(FieldType::Byte.size_in_bytes(), 1);
        assert_eq!(FieldType::Short.size_in_bytes(), 2);
        assert_eq!(FieldType::Long.size_in_bytes(), 4);
        assert_eq!(FieldType::Long8.size_in_bytes(), 8);
    }

    #[test]
    fn fits_inline_classic_vs_bigtiff() {
        assert!(FieldType::Long.fits_inline(1, false));
        assert!(!FieldType::Long.fits_inline(2, false));
        assert!(!FieldType::Long8.fits_inline(1, false));

        assert!(FieldType::Long.fits_inline(2, true));
        assert!(FieldType::Long8.fits_inline(1, true));
        assert!(!FieldType::Long8.fits_inline(2, true));
    }

    #[test]
    fn tiff_tag_round_trips_known_values() {
        assert_eq!(TiffTag::from_u16(254), Some(TiffTag::NewSubfileType));
        assert_eq!(TiffTag::from_u16(305), Some(TiffTag::Software));
        assert_eq!(TiffTag::from_u16(339), Some(TiffTag::SampleFormat));
        assert_eq!(TiffTag::ImageWidth.as_u16(), 256);
        assert_eq!(TiffTag::TileOffsets.as_u16(), 324);
        assert_eq!(TiffTag::from_u16(9999), None);
    }

    #[test]
    fn compression_supported_only_for_jpeg() {
        assert!(Compression::Jpeg.is_supported());
        assert!(!Compression::None.is_supported());
        assert!(!Compression::Lzw.is_supported());
    }
}
