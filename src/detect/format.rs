#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Gif,
    /// `animated` is taken from the VP8X feature flags.
    WebP { animated: bool },
    /// `animated` is true when an `acTL` chunk precedes the image data (APNG).
    Png { animated: bool },
    Jpeg,
    Unknown,
}

impl SourceFormat {
    /// Whether the container may carry more than one frame.
    pub fn is_animated(self) -> bool {
        match self {
            SourceFormat::Gif => true,
            SourceFormat::WebP { animated } | SourceFormat::Png { animated } => animated,
            SourceFormat::Jpeg | SourceFormat::Unknown => false,
        }
    }
}

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// VP8X flags byte: bit 1 marks an animated WebP.
const WEBP_ANIMATION_FLAG: u8 = 0x02;

/// Detect image format from the file header bytes.
pub fn detect_format(header: &[u8]) -> SourceFormat {
    // GIF: "GIF87a" or "GIF89a"
    if header.len() >= 6 && (&header[0..6] == b"GIF87a" || &header[0..6] == b"GIF89a") {
        return SourceFormat::Gif;
    }

    // WebP: "RIFF" <size> "WEBP"
    if header.len() >= 12 && &header[0..4] == b"RIFF" && &header[8..12] == b"WEBP" {
        let animated = header.len() > 20
            && &header[12..16] == b"VP8X"
            && header[20] & WEBP_ANIMATION_FLAG != 0;
        return SourceFormat::WebP { animated };
    }

    if header.len() >= 8 && header[0..8] == PNG_SIGNATURE {
        return SourceFormat::Png {
            animated: find_png_chunk(header, b"acTL").is_some(),
        };
    }

    if header.len() >= 3 && header[0..3] == [0xFF, 0xD8, 0xFF] {
        return SourceFormat::Jpeg;
    }

    SourceFormat::Unknown
}

/// Walk PNG chunks up to the first `IDAT` looking for `wanted`.
/// Returns the chunk's byte offset if found.
pub fn find_png_chunk(data: &[u8], wanted: &[u8; 4]) -> Option<usize> {
    let mut offset = PNG_SIGNATURE.len();

    while offset + 8 <= data.len() {
        let len = u32::from_be_bytes([
            data[offset],
            data[offset + 1],
            data[offset + 2],
            data[offset + 3],
        ]) as usize;
        let chunk_type = &data[offset + 4..offset + 8];

        if chunk_type == wanted {
            return Some(offset);
        }
        // Animation control must come before the image data.
        if chunk_type == b"IDAT" || chunk_type == b"IEND" {
            break;
        }

        // length + type + data + crc
        offset = offset.checked_add(12)?.checked_add(len)?;
    }

    None
}
