// Image decoding — splits a source image into frames and re-encodes each one.

use std::io::Cursor;

use bytes::Bytes;
use image::codecs::gif::GifDecoder;
use image::codecs::png::PngDecoder;
use image::codecs::webp::WebPDecoder;
use image::{AnimationDecoder, DynamicImage, ImageResult};

use crate::config::FrameEncoding;
use crate::detect::format::{detect_format, SourceFormat};

/// Decode `data` into its frames, in display order, each encoded as `encoding`.
///
/// Non-animated images produce exactly one frame.
pub fn decode_frames(data: &[u8], encoding: FrameEncoding) -> ImageResult<Vec<Bytes>> {
    let format = detect_format(data);
    let frames = if format.is_animated() {
        decode_animation(data, format)?
    } else {
        vec![image::load_from_memory(data)?]
    };

    frames
        .into_iter()
        .map(|frame| encode_frame(frame, encoding))
        .collect()
}

fn decode_animation(data: &[u8], format: SourceFormat) -> ImageResult<Vec<DynamicImage>> {
    let frames = match format {
        SourceFormat::Gif => GifDecoder::new(Cursor::new(data))?
            .into_frames()
            .collect_frames()?,
        SourceFormat::WebP { .. } => WebPDecoder::new(Cursor::new(data))?
            .into_frames()
            .collect_frames()?,
        SourceFormat::Png { .. } => PngDecoder::new(Cursor::new(data))?
            .apng()?
            .into_frames()
            .collect_frames()?,
        SourceFormat::Jpeg | SourceFormat::Unknown => {
            return Ok(vec![image::load_from_memory(data)?]);
        }
    };

    // Animation decoders composite every frame onto an RGBA canvas, so
    // palette transparency survives as alpha.
    let mut images: Vec<DynamicImage> = frames
        .into_iter()
        .map(|frame| DynamicImage::ImageRgba8(frame.into_buffer()))
        .collect();

    if images.is_empty() {
        // A container with no frames still has a decodable still image.
        images.push(image::load_from_memory(data)?);
    }
    Ok(images)
}

/// Bring a frame into a colour type the target encoder accepts without
/// losing transparency.
///
/// Any representation carrying alpha (expanded palettes with a transparent
/// index, LA, RGBA, 16-bit and float variants) becomes RGBA8. Opaque images
/// become RGB8. JPEG has no alpha channel, so everything becomes RGB8.
pub fn normalize_color(frame: DynamicImage, encoding: FrameEncoding) -> DynamicImage {
    match encoding {
        FrameEncoding::Png if frame.color().has_alpha() => match frame {
            DynamicImage::ImageRgba8(_) => frame,
            other => DynamicImage::ImageRgba8(other.to_rgba8()),
        },
        _ => match frame {
            DynamicImage::ImageRgb8(_) => frame,
            other => DynamicImage::ImageRgb8(other.to_rgb8()),
        },
    }
}

fn encode_frame(frame: DynamicImage, encoding: FrameEncoding) -> ImageResult<Bytes> {
    let frame = normalize_color(frame, encoding);
    let mut out = Cursor::new(Vec::new());
    frame.write_to(&mut out, encoding.image_format())?;
    Ok(Bytes::from(out.into_inner()))
}
