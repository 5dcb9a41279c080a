use std::sync::Arc;

use super::{ViewerState, Zoom, ZoomLimits};
use crate::config::ViewerConfig;
use crate::display::ChannelView;
use crate::formats::FormatRegistry;
use crate::formats::synthetic::{SyntheticFile, SyntheticFormat};
use crate::model::{ImageSpec, PixelFormat};
use crate::store::{ImageStore, ResidencyState, StoreError};

fn viewer_with(files: &[(&str, ImageSpec)]) -> (ViewerState, SyntheticFormat) {
    let _ = env_logger::builder().is_test(true).try_init();
    let format = files.iter().fold(SyntheticFormat::new(), |format, (name, spec)| {
        format.with_file(name, SyntheticFile::new(spec.clone()))
    });
    let mut registry = FormatRegistry::empty();
    registry.register(format.clone());
    let mut viewer = ViewerState::new(ImageStore::new(Arc::new(registry)), ViewerConfig::default());
    for (name, _) in files {
        viewer.add(*name);
    }
    (viewer, format)
}

fn three_images() -> (ViewerState, SyntheticFormat) {
    viewer_with(&[
        ("a.syn", ImageSpec::new(4, 4, 3, PixelFormat::U8)),
        ("b.syn", ImageSpec::new(2, 2, 1, PixelFormat::U16)),
        ("c.syn", ImageSpec::new(8, 2, 4, PixelFormat::F32)),
    ])
}

#[test]
fn adding_images_does_not_change_current() {
    let (viewer, format) = three_images();
    assert_eq!(viewer.len(), 3);
    assert_eq!(viewer.current_index(), None);
    // headers only
    assert_eq!(format.opens(), 3);
    assert_eq!(format.scanlines_read(), 0);
}

#[test]
fn current_image_loads_pixels_and_tracks_last_viewed() {
    let (mut viewer, _) = three_images();
    viewer.current_image(1).expect("view b");
    assert_eq!(viewer.current_index(), Some(1));
    assert_eq!(viewer.last_viewed(), None);
    let record = viewer.current_record().expect("record");
    assert_eq!(record.state(), ResidencyState::PixelsResident);

    viewer.current_image(2).expect("view c");
    assert_eq!(viewer.last_viewed(), Some(1));

    assert!(matches!(viewer.current_image(3), Err(StoreError::InvalidState(_))));
    assert_eq!(viewer.current_index(), Some(2));
}

#[test]
fn failed_load_still_moves_current() {
    let (mut viewer, _) = three_images();
    viewer.add_image("missing.syn", false);
    assert!(viewer.current_image(3).is_err());
    assert_eq!(viewer.current_index(), Some(3));
    assert!(viewer.store().get(3).expect("record").is_broken());
}

#[test]
fn next_and_prev_wrap_around() {
    let (mut viewer, _) = three_images();
    viewer.next_image().expect("first");
    assert_eq!(viewer.current_index(), Some(0));
    viewer.prev_image().expect("wrap back");
    assert_eq!(viewer.current_index(), Some(2));
    viewer.next_image().expect("wrap forward");
    assert_eq!(viewer.current_index(), Some(0));

    let (mut empty, _) = viewer_with(&[]);
    empty.next_image().expect("empty next");
    empty.prev_image().expect("empty prev");
    assert_eq!(empty.current_index(), None);

    let (mut fresh, _) = three_images();
    fresh.prev_image().expect("last");
    assert_eq!(fresh.current_index(), Some(2));
}

#[test]
fn toggle_swaps_with_last_viewed() {
    let (mut viewer, _) = three_images();
    viewer.toggle_image().expect("nothing to toggle");
    assert_eq!(viewer.current_index(), None);

    viewer.current_image(0).expect("a");
    viewer.current_image(2).expect("c");
    viewer.toggle_image().expect("back to a");
    assert_eq!(viewer.current_index(), Some(0));
    assert_eq!(viewer.last_viewed(), Some(2));
    viewer.toggle_image().expect("back to c");
    assert_eq!(viewer.current_index(), Some(2));
    assert_eq!(viewer.last_viewed(), Some(0));
}

#[test]
fn zoom_steps_are_bounded() {
    let (mut viewer, _) = three_images();
    viewer.zoom_in();
    assert_eq!(viewer.zoom().magnification(), 2.0);
    viewer.normal_size();
    viewer.zoom_out();
    assert_eq!(viewer.zoom().magnification(), 0.5);
    assert_eq!(viewer.zoom().signed(), -2.0);

    for _ in 0..20 {
        viewer.zoom_in();
    }
    assert_eq!(viewer.zoom().magnification(), viewer.config().max_magnification);
    for _ in 0..40 {
        viewer.zoom_out();
    }
    assert_eq!(viewer.zoom().magnification(), viewer.config().min_magnification);

    viewer.set_zoom(-4.0).expect("signed zoom");
    assert_eq!(viewer.zoom().magnification(), 0.25);
    assert!(viewer.set_zoom(0.0).is_err());
}

#[test]
fn fit_picks_the_limiting_axis() {
    let (mut viewer, _) = three_images();
    viewer.fit_image_to_window(100.0, 100.0);
    assert_eq!(viewer.zoom().magnification(), 1.0);

    viewer.current_image(2).expect("8x2 image");
    viewer.fit_image_to_window(32.0, 32.0);
    assert_eq!(viewer.zoom().magnification(), 4.0);
    assert!(viewer.zoom().scale_to_fit());
    assert_eq!(viewer.zoom().display_size(8, 2), (32, 8));

    let mut zoom = Zoom::default();
    zoom.fit_to_window(1.0, 1.0, 100_000, 100_000, &ZoomLimits::default());
    assert_eq!(zoom.magnification(), ZoomLimits::default().min_magnification);
}

#[test]
fn channel_cycle_uses_current_channel_count() {
    let (mut viewer, _) = three_images();
    viewer.current_image(0).expect("rgb image");
    for _ in 0..3 + 2 {
        viewer.view_channel_next();
    }
    assert_eq!(viewer.channel(), ChannelView::FullColor);

    viewer.view_channel_prev();
    assert_eq!(viewer.channel(), ChannelView::Luminance);
    viewer.view_channel(ChannelView::Channel(2)).expect("blue");
    assert!(matches!(
        viewer.view_channel(ChannelView::Channel(3)),
        Err(StoreError::InvalidState(_))
    ));
    assert_eq!(viewer.channel(), ChannelView::Channel(2));

    // the gray image has no channel 2
    viewer.current_image(1).expect("gray image");
    assert_eq!(viewer.channel(), ChannelView::FullColor);
}

#[test]
fn close_image_moves_to_predecessor() {
    let (mut viewer, _) = three_images();
    viewer.current_image(0).expect("a");
    viewer.current_image(2).expect("c");
    viewer.close_image().expect("close c");
    assert_eq!(viewer.len(), 2);
    assert_eq!(viewer.current_index(), Some(1));
    assert_eq!(viewer.last_viewed(), Some(0));
    assert_eq!(viewer.current_record().map(|record| record.name()), Some("b.syn"));

    viewer.current_image(0).expect("a");
    viewer.close_image().expect("close a");
    assert_eq!(viewer.current_index(), Some(0));
    assert_eq!(viewer.last_viewed(), None);
    assert_eq!(viewer.current_record().map(|record| record.name()), Some("b.syn"));

    viewer.close_image().expect("close b");
    assert_eq!(viewer.current_index(), None);
    assert!(viewer.is_empty());
    viewer.close_image().expect("nothing left");
}

#[test]
fn reload_rereads_current_image() {
    let (mut viewer, format) = three_images();
    viewer.current_image(0).expect("a");
    let opens = format.opens();
    viewer.reload().expect("reload");
    assert_eq!(format.opens(), opens + 2);
    assert!(viewer.current_record().expect("record").is_pixels_valid());
}

#[test]
fn display_adjustments_apply_to_current_record_only() {
    let (mut viewer, _) = three_images();
    viewer.gamma_plus();
    viewer.current_image(0).expect("a");
    viewer.gamma_plus();
    viewer.gamma_plus();
    viewer.exposure_plus_half_stop();
    viewer.exposure_minus_tenth_stop();

    let record = viewer.store().get(0).expect("a");
    assert!((record.gamma() - 1.1).abs() < 1e-5);
    assert!((record.exposure() - 0.4).abs() < 1e-5);
    assert_eq!(viewer.store().get(1).expect("b").gamma(), 1.0);

    let transform = viewer.display_transform();
    assert!((transform.gamma - 1.1).abs() < 1e-5);
}

#[test]
fn display_current_renders_the_image() {
    let (mut viewer, _) = three_images();
    assert!(viewer.display_current().is_err());
    viewer.current_image(2).expect("c");
    viewer.view_channel(ChannelView::Luminance).expect("luminance");
    let image = viewer.display_current().expect("render");
    assert_eq!(image.dimensions(), (8, 2));
    let pixel = image.get_pixel(0, 0).0;
    assert_eq!(pixel[0], pixel[1]);
    assert_eq!(pixel[3], 255);
}

#[test]
fn current_thumbnail_uses_configured_size() {
    let (mut viewer, _) = three_images();
    assert!(matches!(
        viewer.current_thumbnail(),
        Err(StoreError::InvalidState(_))
    ));

    let format = SyntheticFormat::new().with_file(
        "wide.syn",
        SyntheticFile::new(ImageSpec::new(40, 20, 3, PixelFormat::U8)),
    );
    let mut registry = FormatRegistry::empty();
    registry.register(format);
    let config = ViewerConfig {
        thumbnail_size: 10,
        ..ViewerConfig::default()
    };
    let mut viewer = ViewerState::new(ImageStore::new(Arc::new(registry)), config);
    viewer.add("wide.syn");
    viewer.current_image(0).expect("view");
    let dimensions = viewer.current_thumbnail().expect("thumbnail").dimensions();
    assert_eq!(dimensions, (10, 5));

    viewer.gamma_plus();
    assert!(!viewer.current_record().expect("record").is_thumbnail_valid());
}
