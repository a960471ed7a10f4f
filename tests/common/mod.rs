// Shared fixtures: synthesised images and an in-memory image source.
#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{self, Cursor};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use image::codecs::gif::GifEncoder;
use image::{DynamicImage, Frame, ImageFormat, Rgba, RgbaImage};
use parking_lot::Mutex;

use frame_relay_engine::source::traits::ImageSource;

pub const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
pub const GREEN: Rgba<u8> = Rgba([0, 255, 0, 255]);
pub const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
pub const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// An animated GIF with one solid 4x4 frame per colour.
pub fn animated_gif(colors: &[Rgba<u8>]) -> Vec<u8> {
    let mut buf = Vec::new();
    {
        let mut encoder = GifEncoder::new(&mut buf);
        encoder
            .encode_frames(
                colors
                    .iter()
                    .map(|c| Frame::new(RgbaImage::from_pixel(4, 4, *c))),
            )
            .unwrap();
    }
    buf
}

/// A single-frame, palette-indexed GIF whose top-left pixel is transparent.
pub fn transparent_gif() -> Vec<u8> {
    let mut img = RgbaImage::from_pixel(4, 4, RED);
    img.put_pixel(0, 0, CLEAR);
    let mut buf = Vec::new();
    {
        let mut encoder = GifEncoder::new(&mut buf);
        encoder.encode_frame(Frame::new(img)).unwrap();
    }
    buf
}

/// An APNG with one solid 4x4 RGBA frame per colour, every frame full canvas.
pub fn animated_apng(colors: &[Rgba<u8>]) -> Vec<u8> {
    let mut buf = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut buf, 4, 4);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_animated(colors.len() as u32, 0).unwrap();
        let mut writer = encoder.write_header().unwrap();
        for color in colors {
            writer
                .write_image_data(RgbaImage::from_pixel(4, 4, *color).as_raw())
                .unwrap();
        }
        writer.finish().unwrap();
    }
    buf
}

/// A lossless animated WebP: three 4x4 frames, red then green then blue,
/// composited without blending. `image` cannot encode animated WebP, so it
/// is checked in.
pub fn animated_webp() -> Vec<u8> {
    include_bytes!("../fixtures/animated.webp").to_vec()
}

pub fn static_png(color: Rgba<u8>) -> Vec<u8> {
    let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, color));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

/// Top-left pixel of an encoded frame.
pub fn first_pixel(encoded: &[u8]) -> Rgba<u8> {
    *image::load_from_memory(encoded)
        .unwrap()
        .to_rgba8()
        .get_pixel(0, 0)
}

/// In-memory image source that counts storage accesses.
#[derive(Default)]
pub struct MemorySource {
    images: Mutex<HashMap<String, Bytes>>,
    reads: AtomicUsize,
    exists_checks: AtomicUsize,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, image_id: &str, data: Vec<u8>) -> Self {
        self.put(image_id, data);
        self
    }

    pub fn put(&self, image_id: &str, data: Vec<u8>) {
        self.images
            .lock()
            .insert(image_id.to_string(), Bytes::from(data));
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn exists_checks(&self) -> usize {
        self.exists_checks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageSource for MemorySource {
    async fn exists(&self, image_id: &str) -> bool {
        self.exists_checks.fetch_add(1, Ordering::SeqCst);
        self.images.lock().contains_key(image_id)
    }

    async fn read(&self, image_id: &str) -> io::Result<Bytes> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.images
            .lock()
            .get(image_id)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, image_id.to_string()))
    }
}
