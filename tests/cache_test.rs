mod common;

use std::sync::Arc;

use frame_relay_engine::config::FrameEncoding;
use frame_relay_engine::engine::stats::StatsCollector;
use frame_relay_engine::engine::store::FrameStore;
use frame_relay_engine::error::FrameError;

use common::{
    animated_apng, animated_gif, animated_webp, first_pixel, static_png, transparent_gif,
    MemorySource, BLUE, GREEN, RED,
};

fn store_over(source: Arc<MemorySource>, capacity: usize) -> FrameStore {
    FrameStore::new(
        source,
        capacity,
        FrameEncoding::Png,
        Arc::new(StatsCollector::new()),
    )
}

#[tokio::test]
async fn test_fifo_eviction_ignores_hits() {
    let source = Arc::new(
        MemorySource::new()
            .with("A", static_png(RED))
            .with("B", static_png(GREEN))
            .with("C", static_png(BLUE))
            .with("D", static_png(RED)),
    );
    let store = store_over(source, 2);

    for id in ["A", "B", "C"] {
        store.get_frames(id).await.unwrap().unwrap();
        assert!(store.len() <= 2);
    }
    assert_eq!(store.cached_ids(), vec!["B", "C"]);

    // Hit on B must not refresh it.
    store.get_frames("B").await.unwrap().unwrap();
    assert_eq!(store.cached_ids(), vec!["B", "C"]);

    store.get_frames("D").await.unwrap().unwrap();
    assert_eq!(store.cached_ids(), vec!["C", "D"]);
    assert!(!store.contains("B"));
}

#[tokio::test]
async fn test_hit_does_not_touch_storage() {
    let source = Arc::new(MemorySource::new().with("anim.gif", animated_gif(&[RED, GREEN])));
    let store = store_over(source.clone(), 5);

    let first = store.get_frames("anim.gif").await.unwrap().unwrap();
    assert_eq!(source.reads(), 1);
    let checks = source.exists_checks();

    for _ in 0..10 {
        let again = store.get_frames("anim.gif").await.unwrap().unwrap();
        assert!(Arc::ptr_eq(&first, &again));
    }
    assert_eq!(source.reads(), 1);
    assert_eq!(source.exists_checks(), checks);
}

#[tokio::test]
async fn test_animated_gif_frames_in_order() {
    let source = Arc::new(MemorySource::new().with("anim.gif", animated_gif(&[RED, GREEN, BLUE])));
    let store = store_over(source, 5);

    let frames = store.get_frames("anim.gif").await.unwrap().unwrap();
    assert_eq!(frames.len(), 3);
    assert_eq!(frames.media_type(), "image/png");
    assert_eq!(first_pixel(frames.frame(0).unwrap()), RED);
    assert_eq!(first_pixel(frames.frame(1).unwrap()), GREEN);
    assert_eq!(first_pixel(frames.frame(2).unwrap()), BLUE);
}

#[tokio::test]
async fn test_apng_frames_in_order() {
    let source = Arc::new(MemorySource::new().with("anim.png", animated_apng(&[RED, GREEN, BLUE])));
    let store = store_over(source, 5);

    let frames = store.get_frames("anim.png").await.unwrap().unwrap();
    assert_eq!(frames.len(), 3);
    assert_eq!(first_pixel(frames.frame(0).unwrap()), RED);
    assert_eq!(first_pixel(frames.frame(1).unwrap()), GREEN);
    assert_eq!(first_pixel(frames.frame(2).unwrap()), BLUE);
}

#[tokio::test]
async fn test_animated_webp_frames_in_order() {
    let source = Arc::new(MemorySource::new().with("anim.webp", animated_webp()));
    let store = store_over(source, 5);

    let frames = store.get_frames("anim.webp").await.unwrap().unwrap();
    assert_eq!(frames.len(), 3);
    assert_eq!(frames.media_type(), "image/png");
    assert_eq!(first_pixel(frames.frame(0).unwrap()), RED);
    assert_eq!(first_pixel(frames.frame(1).unwrap()), GREEN);
    assert_eq!(first_pixel(frames.frame(2).unwrap()), BLUE);
}

#[tokio::test]
async fn test_static_image_is_single_frame() {
    let source = Arc::new(MemorySource::new().with("still.png", static_png(GREEN)));
    let store = store_over(source, 5);

    let frames = store.get_frames("still.png").await.unwrap().unwrap();
    assert_eq!(frames.len(), 1);
    assert_eq!(first_pixel(frames.frame(0).unwrap()), GREEN);
}

#[tokio::test]
async fn test_palette_transparency_preserved() {
    let source = Arc::new(MemorySource::new().with("clear.gif", transparent_gif()));
    let store = store_over(source, 5);

    let frames = store.get_frames("clear.gif").await.unwrap().unwrap();
    let decoded = image::load_from_memory(frames.frame(0).unwrap())
        .unwrap()
        .to_rgba8();
    assert_eq!(decoded.get_pixel(0, 0)[3], 0);
    assert_eq!(decoded.get_pixel(1, 1)[3], 255);
}

#[tokio::test]
async fn test_jpeg_encoding_media_type() {
    let source = Arc::new(MemorySource::new().with("anim.gif", animated_gif(&[RED, GREEN])));
    let store = FrameStore::new(
        source,
        5,
        FrameEncoding::Jpeg,
        Arc::new(StatsCollector::new()),
    );

    let frames = store.get_frames("anim.gif").await.unwrap().unwrap();
    assert_eq!(frames.len(), 2);
    assert_eq!(frames.media_type(), "image/jpeg");
    assert_eq!(
        image::guess_format(frames.frame(1).unwrap()).unwrap(),
        image::ImageFormat::Jpeg
    );
}

#[tokio::test]
async fn test_missing_image_leaves_cache_untouched() {
    let source = Arc::new(MemorySource::new().with("A", static_png(RED)));
    let store = store_over(source.clone(), 2);
    store.get_frames("A").await.unwrap().unwrap();

    assert!(store.get_frames("nope.gif").await.unwrap().is_none());
    assert_eq!(store.cached_ids(), vec!["A"]);
    assert_eq!(source.reads(), 1);
}

#[tokio::test]
async fn test_decode_failure_is_not_cached() {
    let stats = Arc::new(StatsCollector::new());
    let source = Arc::new(
        MemorySource::new()
            .with("bad.gif", b"this is not really a gif".to_vec())
            .with("A", static_png(RED)),
    );
    let store = FrameStore::new(source.clone(), 2, FrameEncoding::Png, stats.clone());
    store.get_frames("A").await.unwrap().unwrap();

    for attempt in 1..=2 {
        let err = store.get_frames("bad.gif").await.unwrap_err();
        assert!(matches!(err, FrameError::Decode { .. }), "{err}");
        assert!(err.is_decode_failure());
        assert!(!store.contains("bad.gif"));
        assert_eq!(store.cached_ids(), vec!["A"]);
        // Every attempt goes back to storage.
        assert_eq!(source.reads(), 1 + attempt);
    }
    assert_eq!(stats.snapshot().decode_failures, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_misses_share_one_entry() {
    let source = Arc::new(MemorySource::new().with("anim.gif", animated_gif(&[RED, GREEN, BLUE])));
    let store = Arc::new(store_over(source, 5));

    let mut handles = Vec::new();
    for _ in 0..16 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store.get_frames("anim.gif").await.unwrap().unwrap()
        }));
    }
    for handle in handles {
        let frames = handle.await.unwrap();
        assert_eq!(frames.len(), 3);
    }
    assert_eq!(store.len(), 1);
    assert_eq!(store.cached_ids(), vec!["anim.gif"]);
}
