//! Container-selection tests: writes a real tiled TIFF/BigTIFF file with a
//! real appended tile and a real IFD, then reads it back byte-for-byte to
//! confirm classic vs BigTIFF field widths (§4.8) round-trip correctly.

use dzrip::io::FileRangeReader;
use dzrip::tiff::{use_big_tiff, TiffHeader, TiffIfd, TiffWriter, TileIfdParams};

use super::test_utils::unique_temp_dir;

fn jpeg_tile(size: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(size, size, image::Rgb([128, 64, 32]));
    let mut buf = Vec::new();
    let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, 90);
    encoder.encode_image(&img).unwrap();
    buf
}

#[tokio::test]
async fn classic_tiff_is_selected_below_the_bigtiff_pixel_threshold() {
    let dir = unique_temp_dir("classic-container");
    tokio::fs::create_dir_all(&dir).await.unwrap();
    let path = dir.join("classic.tif");

    let image_width = 512;
    let image_length = 512;
    assert!(!use_big_tiff(image_width, image_length));

    let tile = jpeg_tile(16);
    let mut writer = TiffWriter::create(&path, false).await.unwrap();
    let (offset, len) = writer.append_tile(&tile).await.unwrap();
    writer
        .write_ifd(&TileIfdParams {
            reduced_resolution: false,
            image_width,
            image_length,
            tile_width: 16,
            tile_length: 16,
            tile_offsets: vec![offset],
            tile_byte_counts: vec![len],
            jpeg_tables: None,
            software: None,
        })
        .await
        .unwrap();

    let bytes = tokio::fs::read(&path).await.unwrap();
    let header = TiffHeader::parse(&bytes).unwrap();
    assert!(!header.is_bigtiff);
    assert_ne!(header.first_ifd_offset, 0);

    let reader = FileRangeReader::open(&path).await.unwrap();
    let ifd = TiffIfd::read(&reader, &header, header.first_ifd_offset)
        .await
        .unwrap();
    assert_eq!(ifd.image_width, image_width);
    assert_eq!(ifd.image_length, image_length);
    assert_eq!(ifd.tile_offsets, vec![offset]);
    assert_eq!(ifd.next_ifd, 0);

    tokio::fs::remove_dir_all(&dir).await.ok();
}

#[tokio::test]
async fn bigtiff_is_selected_above_the_pixel_threshold_and_widens_dimension_tags() {
    let dir = unique_temp_dir("bigtiff-container");
    tokio::fs::create_dir_all(&dir).await.unwrap();
    let path = dir.join("big.tif");

    // 30000x30000 crosses BIG_TIFF_PIXEL_THRESHOLD (1 << 29) but the
    // appended tile content is a single small real tile: the point of this
    // test is the container's field widths, not rendering a full-resolution
    // canvas.
    let image_width = 30_000;
    let image_length = 30_000;
    assert!(use_big_tiff(image_width, image_length));

    let tile = jpeg_tile(16);
    let mut writer = TiffWriter::create(&path, true).await.unwrap();
    let (offset, len) = writer.append_tile(&tile).await.unwrap();
    writer
        .write_ifd(&TileIfdParams {
            reduced_resolution: false,
            image_width,
            image_length,
            tile_width: 16,
            tile_length: 16,
            tile_offsets: vec![offset],
            tile_byte_counts: vec![len],
            jpeg_tables: None,
            software: None,
        })
        .await
        .unwrap();

    let bytes = tokio::fs::read(&path).await.unwrap();
    let header = TiffHeader::parse(&bytes).unwrap();
    assert!(header.is_bigtiff);
    // BigTIFF magic is 43, stored in bytes[2..4] little-endian.
    assert_eq!(u16::from_le_bytes([bytes[2], bytes[3]]), 43);
    assert_ne!(header.first_ifd_offset, 0);

    let reader = FileRangeReader::open(&path).await.unwrap();
    let ifd = TiffIfd::read(&reader, &header, header.first_ifd_offset)
        .await
        .unwrap();
    // §4.8: ImageWidth/ImageLength round-trip correctly as Long8-encoded
    // values under BigTIFF, same as TileOffsets/TileByteCounts.
    assert_eq!(ifd.image_width, image_width);
    assert_eq!(ifd.image_length, image_length);
    assert_eq!(ifd.tile_offsets, vec![offset]);

    tokio::fs::remove_dir_all(&dir).await.ok();
}
