//! Minimal IFD reader for the downsample pass (§4.6).
//!
//! Reads back just enough of one IFD — dimensions, tile grid, and the tile
//! offset/byte-count arrays — to decode tiles at random tile coordinates
//! while the same file remains open for append.

use image::RgbImage;

use crate::error::TiffError;
use crate::io::RangeReader;
use crate::tiff::header::{ByteOrder, TiffHeader};
use crate::tiff::tags::{Compression, FieldType, TiffTag};

pub struct TiffIfd {
    pub image_width: u32,
    pub image_length: u32,
    pub tile_width: u32,
    pub tile_length: u32,
    pub tile_offsets: Vec<u64>,
    pub tile_byte_counts: Vec<u64>,
    pub next_ifd: u64,
}

fn read_inline_values(value_field: &[u8], field_type: u16, count: u64, order: ByteOrder) -> Vec<u64> {
    read_values_from_bytes(value_field, field_type, count, order)
}

fn read_values_from_bytes(bytes: &[u8], field_type: u16, count: u64, order: ByteOrder) -> Vec<u64> {
    let Some(field_type) = FieldType::from_u16(field_type) else {
        return Vec::new();
    };
    let size = field_type.size_in_bytes();
    (0..count as usize)
        .map(|i| {
            let slice = &bytes[i * size..i * size + size];
            match field_type {
                FieldType::Byte | FieldType::Ascii | FieldType::Undefined => slice[0] as u64,
                FieldType::Short => order.read_u16(slice) as u64,
                FieldType::Long => order.read_u32(slice) as u64,
                FieldType::Long8 => order.read_u64(slice),
            }
        })
        .collect()
}

impl TiffIfd {
    /// Read the IFD at `ifd_offset`, given the file's already-parsed header.
    pub async fn read(
        reader: &dyn RangeReader,
        header: &TiffHeader,
        ifd_offset: u64,
    ) -> Result<Self, TiffError> {
        let (count_field_size, entry_size, inline_width) = if header.is_bigtiff {
            (8u64, 20u64, 8u64)
        } else {
            (2u64, 12u64, 4u64)
        };

        let count_bytes = reader.read_exact_at(ifd_offset, count_field_size as usize).await?;
        let entry_count = if header.is_bigtiff {
            header.byte_order.read_u64(&count_bytes) as u64
        } else {
            header.byte_order.read_u16(&count_bytes) as u64
        };

        let entries_offset = ifd_offset + count_field_size;
        let entries_bytes = reader
            .read_exact_at(entries_offset, (entry_size * entry_count) as usize)
            .await?;

        let mut image_width = None;
        let mut image_length = None;
        let mut tile_width = None;
        let mut tile_length = None;
        let mut tile_offsets = Vec::new();
        let mut tile_byte_counts = Vec::new();

        for i in 0..entry_count as usize {
            let base = i * entry_size as usize;
            let entry = &entries_bytes[base..base + entry_size as usize];
            let tag = header.byte_order.read_u16(&entry[0..2]);
            let field_type = header.byte_order.read_u16(&entry[2..4]);
            let count = if header.is_bigtiff {
                header.byte_order.read_u64(&entry[4..12])
            } else {
                u64::from(header.byte_order.read_u32(&entry[4..8]))
            };
            let value_field = if header.is_bigtiff { &entry[12..20] } else { &entry[8..12] };

            let type_size = FieldType::from_u16(field_type)
                .map(|t| t.size_in_bytes() as u64)
                .unwrap_or(1);
            let total = type_size * count;

            let values = if total <= inline_width {
                read_inline_values(value_field, field_type, count, header.byte_order)
            } else {
                let offset = if header.is_bigtiff {
                    header.byte_order.read_u64(value_field)
                } else {
                    u64::from(header.byte_order.read_u32(value_field))
                };
                let bytes = reader.read_exact_at(offset, total as usize).await?;
                read_values_from_bytes(&bytes, field_type, count, header.byte_order)
            };

            match TiffTag::from_u16(tag) {
                Some(TiffTag::ImageWidth) => image_width = values.first().map(|&v| v as u32),
                Some(TiffTag::ImageLength) => image_length = values.first().map(|&v| v as u32),
                Some(TiffTag::TileWidth) => tile_width = values.first().map(|&v| v as u32),
                Some(TiffTag::TileLength) => tile_length = values.first().map(|&v| v as u32),
                Some(TiffTag::TileOffsets) => tile_offsets = values,
                Some(TiffTag::TileByteCounts) => tile_byte_counts = values,
                Some(TiffTag::Compression) => {
                    let code = values.first().copied().unwrap_or(0) as u16;
                    let supported = Compression::from_u16(code).map(|c| c.is_supported()).unwrap_or(false);
                    if !supported {
                        return Err(TiffError::UnsupportedCompression(code.to_string()));
                    }
                }
                _ => {}
            }
        }

        let next_ifd_field = entries_offset + entry_size * entry_count;
        let next_bytes = reader
            .read_exact_at(next_ifd_field, count_field_size as usize)
            .await?;
        let next_ifd = if header.is_bigtiff {
            header.byte_order.read_u64(&next_bytes)
        } else {
            u64::from(header.byte_order.read_u32(&next_bytes))
        };

        Ok(Self {
            image_width: image_width.ok_or(TiffError::MissingTag("ImageWidth"))?,
            image_length: image_length.ok_or(TiffError::MissingTag("ImageLength"))?,
            tile_width: tile_width.ok_or(TiffError::MissingTag("TileWidth"))?,
            tile_length: tile_length.ok_or(TiffError::MissingTag("TileLength"))?,
            tile_offsets,
            tile_byte_counts,
            next_ifd,
        })
    }

    pub fn col_count(&self) -> u32 {
        self.image_width.div_ceil(self.tile_width)
    }

    pub fn row_count(&self) -> u32 {
        self.image_length.div_ceil(self.tile_length)
    }

    pub async fn read_tile(
        &self,
        reader: &dyn RangeReader,
        col: u32,
        row: u32,
    ) -> Result<RgbImage, TiffError> {
        let idx = (row * self.col_count() + col) as usize;
        let offset = *self
            .tile_offsets
            .get(idx)
            .ok_or_else(|| TiffError::InvalidIfdOffset(idx as u64))?;
        let len = *self
            .tile_byte_counts
            .get(idx)
            .ok_or_else(|| TiffError::InvalidIfdOffset(idx as u64))?;
        let bytes = reader.read_exact_at(offset, len as usize).await?;
        crate::tile::decode(&bytes).map_err(|e| TiffError::InvalidTagValue {
            tag: "TileOffsets",
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiff::writer::{TileIfdParams, TiffWriter};

    fn unique_temp_path(label: &str) -> std::path::PathBuf {
        use std::sync::atomic::{AtomicU32, Ordering};
        static COUNTER: AtomicU32 = AtomicU32::new(0);
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        std::env::temp_dir().join(format!("dzrip-{label}-{}-{n}", std::process::id()))
    }

    #[tokio::test]
    async fn reads_back_tile_grid_dimensions() {
        let path = unique_temp_path("reader-roundtrip");
        let mut writer = TiffWriter::create(&path, false).await.unwrap();

        let mut canvas = RgbImage::from_pixel(256, 256, image::Rgb([5, 6, 7]));
        let mut buf = Vec::new();
        canvas
            .write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Jpeg)
            .unwrap();
        let (offset, len) = writer.append_tile(&buf).await.unwrap();

        let params = TileIfdParams {
            reduced_resolution: false,
            image_width: 300,
            image_length: 256,
            tile_width: 256,
            tile_length: 256,
            tile_offsets: vec![offset],
            tile_byte_counts: vec![len],
            jpeg_tables: None,
            software: None,
        };
        writer.write_ifd(&params).await.unwrap();
        writer.flush().await.unwrap();

        let file_bytes = tokio::fs::read(&path).await.unwrap();
        let header = TiffHeader::parse(&file_bytes).unwrap();
        let file_reader = crate::io::FileRangeReader::open(&path).await.unwrap();
        let ifd = TiffIfd::read(&file_reader, &header, header.first_ifd_offset)
            .await
            .unwrap();

        assert_eq!(ifd.col_count(), 2);
        assert_eq!(ifd.row_count(), 1);
        assert_eq!(ifd.tile_offsets.len(), 1);

        tokio::fs::remove_file(&path).await.ok();
    }
}
