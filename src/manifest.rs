//! DZI manifest parsing.
//!
//! Parses the small XML document that describes a Deep Zoom Image pyramid:
//! one `<Image>` element carrying `Format`/`TileSize`/`Overlap` attributes and
//! a child `<Size>` element carrying `Width`/`Height`. Unknown attributes and
//! elements are ignored.

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::error::ManifestError;

/// A parsed, validated DZI manifest. Immutable for the lifetime of a rip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    /// Lowercase tile codec extension, e.g. `"jpeg"`, `"png"`.
    pub format: String,
    /// DZI source tile side in pixels, excluding overlap.
    pub tile_size: u32,
    /// Pixels of edge duplication on each inner side.
    pub overlap: u32,
    /// Full image width in pixels.
    pub width: u32,
    /// Full image height in pixels.
    pub height: u32,
}

impl Manifest {
    /// Parse a DZI manifest from its raw XML bytes.
    pub fn parse(xml: &[u8]) -> Result<Self, ManifestError> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut format: Option<String> = None;
        let mut tile_size: Option<u32> = None;
        let mut overlap: Option<u32> = None;
        let mut width: Option<u32> = None;
        let mut height: Option<u32> = None;

        let mut buf = Vec::new();
        loop {
            match reader
                .read_event_into(&mut buf)
                .map_err(|e| ManifestError::Malformed(e.to_string()))?
            {
                Event::Eof => break,
                Event::Start(tag) | Event::Empty(tag) => {
                    let name = tag.local_name();
                    let name = std::str::from_utf8(name.as_ref()).unwrap_or_default();
                    match name {
                        "Image" => {
                            for attr in tag.attributes().flatten() {
                                let key = std::str::from_utf8(attr.key.local_name().as_ref())
                                    .unwrap_or_default();
                                let value = attr
                                    .decode_and_unescape_value(reader.decoder())
                                    .map_err(|e| ManifestError::Malformed(e.to_string()))?;
                                match key {
                                    "Format" => format = Some(value.to_lowercase()),
                                    "TileSize" => {
                                        tile_size = Some(parse_u32("TileSize", &value)?)
                                    }
                                    "Overlap" => overlap = Some(parse_u32("Overlap", &value)?),
                                    _ => {}
                                }
                            }
                        }
                        "Size" => {
                            for attr in tag.attributes().flatten() {
                                let key = std::str::from_utf8(attr.key.local_name().as_ref())
                                    .unwrap_or_default();
                                let value = attr
                                    .decode_and_unescape_value(reader.decoder())
                                    .map_err(|e| ManifestError::Malformed(e.to_string()))?;
                                match key {
                                    "Width" => width = Some(parse_u32("Width", &value)?),
                                    "Height" => height = Some(parse_u32("Height", &value)?),
                                    _ => {}
                                }
                            }
                        }
                        _ => {}
                    }
                }
                _ => {}
            }
            buf.clear();
        }

        let format = format.ok_or(ManifestError::MissingAttribute("Format"))?;
        let tile_size = tile_size.ok_or(ManifestError::MissingAttribute("TileSize"))?;
        let overlap = overlap.unwrap_or(0);
        let width = width.ok_or(ManifestError::MissingAttribute("Width"))?;
        let height = height.ok_or(ManifestError::MissingAttribute("Height"))?;

        if width == 0 || height == 0 || tile_size == 0 {
            return Err(ManifestError::NonPositiveDimension {
                width,
                height,
                tile_size,
            });
        }

        Ok(Manifest {
            format,
            tile_size,
            overlap,
            width,
            height,
        })
    }
}

fn parse_u32(attribute: &'static str, value: &str) -> Result<u32, ManifestError> {
    value
        .parse()
        .map_err(|_| ManifestError::InvalidAttribute {
            attribute,
            value: value.to_string(),
        })
}
