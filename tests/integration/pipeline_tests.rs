//! End-to-end pipeline tests: a synthetic on-disk DZI driven through
//! `orchestrator::run`, plus direct base-layer-writer tests for properties
//! that need fetch-level instrumentation the full pipeline doesn't expose.

use std::collections::HashMap;
use std::time::Duration;

use dzrip::{CancellationToken, Manifest, RipError, RipOptions};
use image::{Rgb, RgbImage};

use super::test_utils::{tile_color, unique_temp_dir, write_local_dzi, CountingFetcher};

fn abs_diff(a: u8, b: u8) -> u8 {
    a.max(b) - a.min(b)
}

fn assert_close(actual: Rgb<u8>, expected: Rgb<u8>) {
    for c in 0..3 {
        assert!(
            abs_diff(actual[c], expected[c]) <= 4,
            "channel {c}: {actual:?} vs {expected:?} (JPEG quantization tolerance)"
        );
    }
}

#[tokio::test]
async fn round_trips_pixels_through_the_full_pipeline() {
    let dir = unique_temp_dir("roundtrip");
    let manifest_path = write_local_dzi(&dir, 512, 512, 256, 100).await;
    let output_path = dir.join("output.tif");

    let options = RipOptions {
        source_uri: manifest_path.display().to_string(),
        output_path: output_path.clone(),
        output_tile: 256,
        quality: 100,
        use_shared_quantization_tables: false,
        software: Some("dzrip-test".to_string()),
        max_retries: 1,
        retry_interval: Duration::from_millis(1),
    };
    let cancel = CancellationToken::new();
    let progress = dzrip::NullProgressSink;

    dzrip::orchestrator::run(&options, &cancel, &progress)
        .await
        .unwrap();

    let bytes = tokio::fs::read(&output_path).await.unwrap();
    let header = dzrip::tiff::TiffHeader::parse(&bytes).unwrap();
    assert!(!header.is_bigtiff, "512x512 is far below the BigTIFF threshold");

    let reader = dzrip::io::FileRangeReader::open(&output_path).await.unwrap();
    let base_ifd = dzrip::tiff::TiffIfd::read(&reader, &header, header.first_ifd_offset)
        .await
        .unwrap();
    assert_eq!(base_ifd.col_count(), 2);
    assert_eq!(base_ifd.row_count(), 2);
    assert_eq!(base_ifd.tile_offsets.len(), 4);

    let top_left = base_ifd.read_tile(&reader, 0, 0).await.unwrap();
    assert_close(*top_left.get_pixel(0, 0), tile_color(0, 0));
    let bottom_right = base_ifd.read_tile(&reader, 1, 1).await.unwrap();
    assert_close(*bottom_right.get_pixel(0, 0), tile_color(1, 1));

    // output_tile(256) == tile_size(256) so every output tile maps to
    // exactly one source tile; no carry, no cross-contamination at seams.
    let top_right = base_ifd.read_tile(&reader, 1, 0).await.unwrap();
    assert_close(*top_right.get_pixel(0, 0), tile_color(1, 0));

    // 512x512 halves once to 256x256 before stopping at the output_tile
    // floor (§4.6), so a reduced-resolution IFD must follow the base IFD.
    assert_ne!(base_ifd.next_ifd, 0, "pyramid chain must continue past the base IFD");
    let reduced_ifd = dzrip::tiff::TiffIfd::read(&reader, &header, base_ifd.next_ifd)
        .await
        .unwrap();
    assert_eq!(reduced_ifd.image_width, 256);
    assert_eq!(reduced_ifd.image_length, 256);
    assert_eq!(reduced_ifd.next_ifd, 0, "only one pyramid layer expected");

    tokio::fs::remove_dir_all(&dir).await.ok();
}

#[tokio::test]
async fn fetches_every_source_tile_exactly_once_when_source_and_output_tiles_align() {
    // S1: 1024x1024, S=256, O=512. Because 256 evenly divides 512, no
    // source tile ever straddles an output-tile boundary, so the Region
    // Filler's carry caches never fire: every one of the 16 source tiles
    // is fetched exactly once.
    let mut tiles = HashMap::new();
    for col in 0..4u32 {
        for row in 0..4u32 {
            tiles.insert((col, row), RgbImage::from_pixel(256, 256, tile_color(col, row)));
        }
    }
    let fetcher = CountingFetcher::new(tiles);
    let manifest = Manifest {
        format: "jpg".to_string(),
        tile_size: 256,
        overlap: 0,
        width: 1024,
        height: 1024,
    };

    let path = unique_temp_dir("exact-fetch").join("base.tif");
    tokio::fs::create_dir_all(path.parent().unwrap()).await.unwrap();
    let mut writer = dzrip::tiff::TiffWriter::create(&path, false).await.unwrap();
    let cancel = CancellationToken::new();
    let progress = dzrip::NullProgressSink;

    dzrip::pipeline::write_base_layer(
        &mut writer,
        &fetcher,
        &manifest,
        8,
        512,
        90,
        None,
        None,
        &cancel,
        &progress,
    )
    .await
    .unwrap();

    assert_eq!(fetcher.total_fetches(), 16);
    for col in 0..4 {
        for row in 0..4 {
            assert_eq!(fetcher.fetch_count(col, row), 1);
        }
    }

    tokio::fs::remove_dir_all(path.parent().unwrap()).await.ok();
}

#[tokio::test]
async fn cancellation_before_the_first_tile_leaves_no_first_ifd_offset() {
    let dir = unique_temp_dir("cancel");
    let manifest_path = write_local_dzi(&dir, 768, 768, 256, 90).await;
    let output_path = dir.join("output.tif");

    let options = RipOptions {
        source_uri: manifest_path.display().to_string(),
        output_path: output_path.clone(),
        output_tile: 256,
        quality: 90,
        use_shared_quantization_tables: false,
        software: None,
        max_retries: 1,
        retry_interval: Duration::from_millis(1),
    };
    let cancel = CancellationToken::new();
    cancel.cancel();
    let progress = dzrip::NullProgressSink;

    let result = dzrip::orchestrator::run(&options, &cancel, &progress).await;
    assert!(matches!(result, Err(RipError::Cancelled)));

    let bytes = tokio::fs::read(&output_path).await.unwrap();
    let header = dzrip::tiff::TiffHeader::parse(&bytes).unwrap();
    assert_eq!(
        header.first_ifd_offset, 0,
        "the header's first-IFD pointer must stay at its zero placeholder \
         when cancellation fires before any IFD is written"
    );

    tokio::fs::remove_dir_all(&dir).await.ok();
}
