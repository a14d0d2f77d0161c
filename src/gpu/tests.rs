// src/gpu/tests.rs

use super::*;
use crate::color::Argb8888;
use crate::framebuffer::{PixelFrameBuffer, SCREEN_HEIGHT, SCREEN_PIXELS, SCREEN_WIDTH};
use crate::gpu::quad::{draw_strip, Surface, TextureView, QUAD_POSITIONS, QUAD_TEX_COORDS};

fn presenter() -> TexturePresenter<HeadlessGpu> {
    let gpu = HeadlessGpu::new(SCREEN_WIDTH, SCREEN_HEIGHT).expect("headless device");
    TexturePresenter::new(gpu).expect("presenter")
}

fn paint(fb: &mut PixelFrameBuffer, color: Argb8888) {
    for y in 0..SCREEN_HEIGHT {
        for x in 0..SCREEN_WIDTH {
            fb.write(x, y, color);
        }
    }
    fb.mark_dirty();
}

#[test_log::test]
fn ring_index_follows_upload_count() {
    let mut presenter = presenter();
    let mut fb = PixelFrameBuffer::new();
    assert_eq!(presenter.ring().current_index(), 0);

    for n in 1..=7u32 {
        paint(&mut fb, Argb8888::from_rgb(n as u8, 0, 0));
        assert!(presenter.upload_if_dirty(&mut fb));
        assert_eq!(presenter.ring().current_index(), n as usize % TEXTURE_RING_SIZE);
    }
    assert_eq!(presenter.stats().uploads, 7);
}

#[test_log::test]
fn upload_leaves_other_slots_alone() {
    let mut presenter = presenter();
    let mut fb = PixelFrameBuffer::new();

    paint(&mut fb, Argb8888::from_rgb(10, 0, 0));
    presenter.upload_if_dirty(&mut fb); // slot 1
    paint(&mut fb, Argb8888::from_rgb(20, 0, 0));
    presenter.upload_if_dirty(&mut fb); // slot 2

    let before: Vec<(u64, Argb8888)> = (0..TEXTURE_RING_SIZE)
        .map(|i| {
            let t = presenter.ring().slot(i).expect("slot");
            (t.writes, t.pixels[0])
        })
        .collect();

    paint(&mut fb, Argb8888::from_rgb(30, 0, 0));
    presenter.upload_if_dirty(&mut fb); // slot 0

    let ring = presenter.ring();
    assert_eq!(ring.current_index(), 0);
    let live = ring.slot(0).expect("slot 0");
    assert_eq!(live.writes, before[0].0 + 1);
    assert!(live.pixels.iter().all(|&p| p == Argb8888::from_rgb(30, 0, 0)));
    for i in 1..TEXTURE_RING_SIZE {
        let t = ring.slot(i).expect("slot");
        assert_eq!((t.writes, t.pixels[0]), before[i], "slot {} changed", i);
    }
}

#[test_log::test]
fn clean_frame_is_not_uploaded() {
    let mut presenter = presenter();
    let mut fb = PixelFrameBuffer::new();

    assert!(!presenter.upload_if_dirty(&mut fb));
    assert_eq!(presenter.ring().current_index(), 0);
    assert_eq!(presenter.stats().uploads, 0);
    assert!((0..TEXTURE_RING_SIZE).all(|i| presenter.ring().slot(i).map(|t| t.writes) == Some(0)));
}

#[test_log::test]
fn upload_clears_dirty_flag() {
    let mut presenter = presenter();
    let mut fb = PixelFrameBuffer::new();
    paint(&mut fb, Argb8888::from_rgb(1, 1, 1));

    assert!(fb.is_dirty());
    presenter.upload_if_dirty(&mut fb);
    assert!(!fb.is_dirty());
    assert!(!presenter.upload_if_dirty(&mut fb));
}

#[test_log::test]
fn idle_present_redraws_live_texture() {
    let mut presenter = presenter();
    let mut fb = PixelFrameBuffer::new();
    paint(&mut fb, Argb8888::from_rgb(0, 0, 200));
    presenter.upload_if_dirty(&mut fb);

    let first = presenter.present();
    let second = presenter.present();

    assert_eq!(first, PresentOutcome::Presented { texture: 1 });
    assert_eq!(second, first);
    assert_eq!(presenter.gpu().frames_presented(), 2);
    assert_eq!(presenter.gpu().last_presented_texture(), Some(1));
    let frame = presenter.gpu().last_frame().expect("frame presented");
    assert!(frame.iter().all(|&p| p == Argb8888::from_rgb(0, 0, 200)));
}

#[test_log::test]
fn missing_drawable_skips_one_frame() {
    let mut presenter = presenter();
    presenter.gpu_mut().drop_drawables(1);

    assert_eq!(presenter.present(), PresentOutcome::Skipped(FrameUnavailable::NoDrawable));
    assert_eq!(presenter.present(), PresentOutcome::Presented { texture: 0 });
    assert_eq!(presenter.stats(), PresenterStats { uploads: 0, presented: 1, skipped: 1 });
}

#[test_log::test]
fn texture_allocation_failure_is_fatal() {
    let gpu = HeadlessGpu::new(SCREEN_WIDTH, SCREEN_HEIGHT)
        .expect("headless device")
        .with_texture_budget(2);

    let err = TexturePresenter::new(gpu).err().expect("must fail");
    let chain = format!("{:#}", err);
    assert!(chain.contains("texture 2"), "{}", chain);
    assert!(chain.contains("out of texture memory"), "{}", chain);
}

#[test]
fn empty_drawable_is_no_device() {
    assert!(matches!(HeadlessGpu::new(0, 10), Err(GpuError::DeviceUnavailable(_))));
}

#[test]
fn quad_maps_texture_rows_top_down() {
    let (w, h) = (4, 3);
    let texels: Vec<Argb8888> = (0..w * h).map(|i| Argb8888::from_rgb(i as u8, 0, 0)).collect();
    let mut target = vec![Argb8888::CLEAR; w * h];

    draw_strip(
        &mut Surface { pixels: &mut target, width: w, height: h },
        &QUAD_POSITIONS,
        &QUAD_TEX_COORDS,
        0,
        4,
        &TextureView { pixels: &texels, width: w, height: h },
    );

    assert_eq!(target, texels);
}

#[test]
fn quad_scales_each_texel_to_a_block() {
    let texels = [
        Argb8888::from_rgb(1, 0, 0),
        Argb8888::from_rgb(2, 0, 0),
        Argb8888::from_rgb(3, 0, 0),
        Argb8888::from_rgb(4, 0, 0),
    ];
    let mut target = vec![Argb8888::CLEAR; 16];

    draw_strip(
        &mut Surface { pixels: &mut target, width: 4, height: 4 },
        &QUAD_POSITIONS,
        &QUAD_TEX_COORDS,
        0,
        4,
        &TextureView { pixels: &texels, width: 2, height: 2 },
    );

    for y in 0..4 {
        for x in 0..4 {
            let expected = texels[(y / 2) * 2 + x / 2];
            assert_eq!(target[y * 4 + x], expected, "({}, {})", x, y);
        }
    }
}

#[test]
fn present_covers_whole_drawable() {
    let gpu = HeadlessGpu::new(SCREEN_WIDTH * 2, SCREEN_HEIGHT * 2).expect("headless device");
    let mut presenter = TexturePresenter::new(gpu).expect("presenter");
    let mut fb = PixelFrameBuffer::new();
    paint(&mut fb, Argb8888::from_rgb(9, 9, 9));
    presenter.upload_if_dirty(&mut fb);

    presenter.present();

    assert_eq!(presenter.gpu().drawable_size(), (SCREEN_WIDTH * 2, SCREEN_HEIGHT * 2));
    let frame = presenter.gpu().last_frame().expect("frame");
    assert_eq!(frame.len(), SCREEN_PIXELS * 4);
    assert!(frame.iter().all(|&p| p == Argb8888::from_rgb(9, 9, 9)));
}
