//! Annex-K JPEG quantization tables, scaled by quality and packaged as a
//! minimal `JPEGTables` stream (§4.7).

/// Standard Annex K luminance quantization table, natural (row-major) order.
const LUMINANCE_BASE: [u16; 64] = [
    16, 11, 10, 16, 24, 40, 51, 61, 12, 12, 14, 19, 26, 58, 60, 55, 14, 13, 16, 24, 40, 57, 69,
    56, 14, 17, 22, 29, 51, 87, 80, 62, 18, 22, 37, 56, 68, 109, 103, 77, 24, 35, 55, 64, 81, 104,
    113, 92, 49, 64, 78, 87, 103, 121, 120, 101, 72, 92, 95, 98, 112, 100, 103, 99,
];

/// Standard Annex K chrominance quantization table, natural order.
const CHROMINANCE_BASE: [u16; 64] = [
    17, 18, 24, 47, 99, 99, 99, 99, 18, 21, 26, 66, 99, 99, 99, 99, 24, 26, 56, 99, 99, 99, 99,
    99, 47, 66, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99,
    99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99,
];

/// Natural-order index of each position in zigzag scan order.
const ZIGZAG: [usize; 64] = [
    0, 1, 8, 16, 9, 2, 3, 10, 17, 24, 32, 25, 18, 11, 4, 5, 12, 19, 26, 33, 40, 48, 41, 34, 27,
    20, 13, 6, 7, 14, 21, 28, 35, 42, 49, 56, 57, 50, 43, 36, 29, 22, 15, 23, 30, 37, 44, 51, 58,
    59, 52, 45, 38, 31, 39, 46, 53, 60, 61, 54, 47, 55, 62, 63,
];

/// Classical IJG quality-to-scale-factor mapping.
fn scale_factor(quality: u8) -> u32 {
    let quality = quality.clamp(1, 100) as u32;
    if quality < 50 {
        5000 / quality
    } else {
        200 - quality * 2
    }
}

/// Scale a base quantization table by quality, in natural order, clamped to `[1,255]`.
fn scale_table(base: &[u16; 64], quality: u8) -> [u8; 64] {
    let scale = scale_factor(quality);
    let mut out = [0u8; 64];
    for (i, &base_value) in base.iter().enumerate() {
        let scaled = (u32::from(base_value) * scale + 50) / 100;
        out[i] = scaled.clamp(1, 255) as u8;
    }
    out
}

fn to_zigzag(natural: &[u8; 64]) -> [u8; 64] {
    let mut out = [0u8; 64];
    for (zigzag_index, &natural_index) in ZIGZAG.iter().enumerate() {
        out[zigzag_index] = natural[natural_index];
    }
    out
}

fn dqt_segment(table_id: u8, table: &[u8; 64]) -> Vec<u8> {
    let mut segment = Vec::with_capacity(69);
    segment.extend_from_slice(&[0xFF, 0xDB]);
    segment.extend_from_slice(&(67u16).to_be_bytes()); // length incl. itself: 2 + 1 + 64
    segment.push(table_id); // precision (high nibble, 0 = 8-bit) | id
    segment.extend_from_slice(&to_zigzag(table));
    segment
}

/// Build a minimal SOI/DQT/DQT/EOI stream holding the luminance (id 0) and
/// chrominance (id 1) tables scaled for `quality`, suitable for the `JPEGTables`
/// field (§4.7's implementation note).
pub fn jpeg_tables_stream(quality: u8) -> Vec<u8> {
    let luminance = scale_table(&LUMINANCE_BASE, quality);
    let chrominance = scale_table(&CHROMINANCE_BASE, quality);

    let mut stream = Vec::new();
    stream.extend_from_slice(&[0xFF, 0xD8]); // SOI
    stream.extend_from_slice(&dqt_segment(0, &luminance));
    stream.extend_from_slice(&dqt_segment(1, &chrominance));
    stream.extend_from_slice(&[0xFF, 0xD9]); // EOI
    stream
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_50_leaves_base_tables_unscaled() {
        let table = scale_table(&LUMINANCE_BASE, 50);
        assert_eq!(table[0], 16);
        assert_eq!(table[7], 61);
    }

    #[test]
    fn quality_100_collapses_to_ones() {
        let table = scale_table(&LUMINANCE_BASE, 100);
        assert!(table.iter().all(|&v| v == 1));
    }

    #[test]
    fn low_quality_scales_up_and_clamps() {
        let table = scale_table(&CHROMINANCE_BASE, 1);
        assert!(table.iter().all(|&v| v == 255));
    }

    #[test]
    fn stream_is_well_formed_soi_dqt_eoi() {
        let stream = jpeg_tables_stream(85);
        assert_eq!(&stream[0..2], &[0xFF, 0xD8]);
        assert_eq!(&stream[stream.len() - 2..], &[0xFF, 0xD9]);
        assert_eq!(stream[2], 0xFF);
        assert_eq!(stream[3], 0xDB);
    }
}
