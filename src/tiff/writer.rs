//! Incremental tiled-TIFF writer (C7/C8).
//!
//! Tiles are appended to the file as soon as they are encoded; each IFD is
//! written once its tiles' offsets are already known, with its `NextIFD`
//! field left as a zero placeholder that gets patched once the *following*
//! IFD's real position is known. This mirrors the reserve-then-patch idiom
//! used for index tables in tiled-TIFF writers that build their output
//! incrementally rather than buffering the whole file in memory.

use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncSeekExt, AsyncWriteExt};

use crate::error::TiffError;
use crate::tiff::header::TiffHeader;
use crate::tiff::tags::{FieldType, TiffTag, NEW_SUBFILE_TYPE_REDUCED_RESOLUTION, PHOTOMETRIC_YCBCR};

/// One IFD's worth of tile metadata, ready to be written (§4.5, §4.6).
pub struct TileIfdParams {
    pub reduced_resolution: bool,
    pub image_width: u32,
    pub image_length: u32,
    pub tile_width: u32,
    pub tile_length: u32,
    /// Row-major byte offsets of each already-appended tile.
    pub tile_offsets: Vec<u64>,
    /// Byte length of each already-appended tile, same order as `tile_offsets`.
    pub tile_byte_counts: Vec<u64>,
    pub jpeg_tables: Option<Vec<u8>>,
    pub software: Option<String>,
}

#[derive(Clone)]
enum TagValue {
    Short(Vec<u16>),
    Long(Vec<u32>),
    Long8(Vec<u64>),
    Ascii(Vec<u8>),
    Undefined(Vec<u8>),
}

impl TagValue {
    fn field_type(&self) -> FieldType {
        match self {
            TagValue::Short(_) => FieldType::Short,
            TagValue::Long(_) => FieldType::Long,
            TagValue::Long8(_) => FieldType::Long8,
            TagValue::Ascii(_) => FieldType::Ascii,
            TagValue::Undefined(_) => FieldType::Undefined,
        }
    }

    fn count(&self) -> u64 {
        match self {
            TagValue::Short(v) => v.len() as u64,
            TagValue::Long(v) => v.len() as u64,
            TagValue::Long8(v) => v.len() as u64,
            TagValue::Ascii(v) => v.len() as u64,
            TagValue::Undefined(v) => v.len() as u64,
        }
    }

    fn bytes_le(&self) -> Vec<u8> {
        match self {
            TagValue::Short(v) => v.iter().flat_map(|x| x.to_le_bytes()).collect(),
            TagValue::Long(v) => v.iter().flat_map(|x| x.to_le_bytes()).collect(),
            TagValue::Long8(v) => v.iter().flat_map(|x| x.to_le_bytes()).collect(),
            TagValue::Ascii(v) => v.clone(),
            TagValue::Undefined(v) => v.clone(),
        }
    }
}

fn build_tag_list(params: &TileIfdParams, is_bigtiff: bool) -> Vec<(u16, TagValue)> {
    // §4.8: under BigTIFF, ImageWidth/ImageLength get the same Long8 width
    // as TileOffsets/TileByteCounts.
    let dimension_type = |value: u32| -> TagValue {
        if is_bigtiff {
            TagValue::Long8(vec![u64::from(value)])
        } else {
            TagValue::Long(vec![value])
        }
    };
    let offset_count_type = |values: &[u64]| -> TagValue {
        if is_bigtiff {
            TagValue::Long8(values.to_vec())
        } else {
            TagValue::Long(values.iter().map(|&v| v as u32).collect())
        }
    };

    let mut tags: Vec<(u16, TagValue)> = vec![
        (
            TiffTag::NewSubfileType.as_u16(),
            TagValue::Long(vec![if params.reduced_resolution {
                NEW_SUBFILE_TYPE_REDUCED_RESOLUTION
            } else {
                0
            }]),
        ),
        (
            TiffTag::ImageWidth.as_u16(),
            dimension_type(params.image_width),
        ),
        (
            TiffTag::ImageLength.as_u16(),
            dimension_type(params.image_length),
        ),
        (
            TiffTag::BitsPerSample.as_u16(),
            TagValue::Short(vec![8, 8, 8]),
        ),
        (TiffTag::Compression.as_u16(), TagValue::Short(vec![7])),
        (
            TiffTag::PhotometricInterpretation.as_u16(),
            TagValue::Short(vec![PHOTOMETRIC_YCBCR]),
        ),
        (TiffTag::SamplesPerPixel.as_u16(), TagValue::Short(vec![3])),
        (
            TiffTag::TileWidth.as_u16(),
            TagValue::Short(vec![params.tile_width as u16]),
        ),
        (
            TiffTag::TileLength.as_u16(),
            TagValue::Short(vec![params.tile_length as u16]),
        ),
        (
            TiffTag::TileOffsets.as_u16(),
            offset_count_type(&params.tile_offsets),
        ),
        (
            TiffTag::TileByteCounts.as_u16(),
            offset_count_type(&params.tile_byte_counts),
        ),
        (
            TiffTag::SampleFormat.as_u16(),
            TagValue::Short(vec![1, 1, 1]),
        ),
    ];

    if let Some(software) = &params.software {
        let mut bytes = software.clone().into_bytes();
        bytes.push(0);
        tags.push((TiffTag::Software.as_u16(), TagValue::Ascii(bytes)));
    }
    if let Some(tables) = &params.jpeg_tables {
        tags.push((
            TiffTag::JpegTables.as_u16(),
            TagValue::Undefined(tables.clone()),
        ));
    }

    tags.sort_by_key(|(tag, _)| *tag);
    tags
}

/// Appends tiles and IFDs to a TIFF file sequentially. Tiles for the
/// *current* IFD must all be appended (via [`TiffWriter::append_tile`])
/// before that IFD is written.
pub struct TiffWriter {
    file: File,
    is_bigtiff: bool,
    position: u64,
    /// File position of the most recently written IFD's `NextIFD` field,
    /// patched once the following IFD's offset is known.
    pending_next_ifd_field: Option<u64>,
    first_ifd_offset_field: u64,
}

impl TiffWriter {
    pub async fn create(path: &Path, is_bigtiff: bool) -> Result<Self, TiffError> {
        let mut file = File::create(path).await?;
        let header = TiffHeader::write_le(is_bigtiff, 0);
        file.write_all(&header).await?;

        Ok(Self {
            file,
            is_bigtiff,
            position: header.len() as u64,
            pending_next_ifd_field: None,
            first_ifd_offset_field: TiffHeader::first_ifd_offset_field_position(is_bigtiff),
        })
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    /// Append one encoded tile's bytes at the current write position.
    pub async fn append_tile(&mut self, bytes: &[u8]) -> Result<(u64, u64), TiffError> {
        self.file
            .seek(std::io::SeekFrom::Start(self.position))
            .await?;
        self.file.write_all(bytes).await?;
        let offset = self.position;
        self.position += bytes.len() as u64;
        Ok((offset, bytes.len() as u64))
    }

    /// Write one IFD, appending its out-of-line value arrays first, then
    /// linking it into the IFD chain by patching the previous IFD's
    /// `NextIFD` field (or the header's first-IFD offset, for the base IFD).
    pub async fn write_ifd(&mut self, params: &TileIfdParams) -> Result<u64, TiffError> {
        let tags = build_tag_list(params, self.is_bigtiff);
        let entry_size: u64 = if self.is_bigtiff { 20 } else { 12 };
        let inline_width: u64 = if self.is_bigtiff { 8 } else { 4 };

        // Pass 1: append any out-of-line value arrays, recording their offsets.
        let mut overflow_offsets = Vec::with_capacity(tags.len());
        for (_, value) in &tags {
            let total_bytes = value.field_type().size_in_bytes() as u64 * value.count();
            if total_bytes > inline_width {
                let bytes = value.bytes_le();
                self.file
                    .seek(std::io::SeekFrom::Start(self.position))
                    .await?;
                self.file.write_all(&bytes).await?;
                overflow_offsets.push(Some(self.position));
                self.position += bytes.len() as u64;
            } else {
                overflow_offsets.push(None);
            }
        }

        // Pass 2: write the IFD itself (entry count, entries, NextIFD placeholder).
        let ifd_offset = self.position;
        let mut buf = Vec::new();
        if self.is_bigtiff {
            buf.extend_from_slice(&(tags.len() as u64).to_le_bytes());
        } else {
            buf.extend_from_slice(&(tags.len() as u16).to_le_bytes());
        }

        for ((tag, value), overflow) in tags.iter().zip(overflow_offsets.iter()) {
            buf.extend_from_slice(&tag.to_le_bytes());
            buf.extend_from_slice(&(value.field_type() as u16).to_le_bytes());
            if self.is_bigtiff {
                buf.extend_from_slice(&value.count().to_le_bytes());
            } else {
                buf.extend_from_slice(&(value.count() as u32).to_le_bytes());
            }

            let mut value_field = vec![0u8; inline_width as usize];
            match overflow {
                Some(offset) => {
                    if self.is_bigtiff {
                        value_field.copy_from_slice(&offset.to_le_bytes());
                    } else {
                        value_field[..4].copy_from_slice(&(*offset as u32).to_le_bytes());
                    }
                }
                None => {
                    let inline_bytes = value.bytes_le();
                    value_field[..inline_bytes.len()].copy_from_slice(&inline_bytes);
                }
            }
            buf.extend_from_slice(&value_field);
        }

        let next_ifd_field_offset = ifd_offset
            + if self.is_bigtiff { 8 } else { 2 }
            + entry_size * tags.len() as u64;
        buf.extend_from_slice(&vec![0u8; inline_width as usize]);

        self.file
            .seek(std::io::SeekFrom::Start(ifd_offset))
            .await?;
        self.file.write_all(&buf).await?;
        self.position = ifd_offset + buf.len() as u64;

        self.link_ifd(ifd_offset).await?;
        self.pending_next_ifd_field = Some(next_ifd_field_offset);

        Ok(ifd_offset)
    }

    /// Patch whichever pointer (header, or the previous IFD's `NextIFD`)
    /// should reference this newly written IFD.
    async fn link_ifd(&mut self, ifd_offset: u64) -> Result<(), TiffError> {
        let (field_offset, width) = match self.pending_next_ifd_field {
            Some(offset) => (offset, if self.is_bigtiff { 8 } else { 4 }),
            None => (self.first_ifd_offset_field, if self.is_bigtiff { 8 } else { 4 }),
        };

        self.file.seek(std::io::SeekFrom::Start(field_offset)).await?;
        if width == 8 {
            self.file.write_all(&ifd_offset.to_le_bytes()).await?;
        } else {
            self.file
                .write_all(&(ifd_offset as u32).to_le_bytes())
                .await?;
        }
        // Seeking back moved the file cursor; restore it for the next append.
        self.file
            .seek(std::io::SeekFrom::Start(self.position))
            .await?;
        Ok(())
    }

    pub async fn flush(&mut self) -> Result<(), TiffError> {
        self.file.flush().await?;
        Ok(())
    }
}
