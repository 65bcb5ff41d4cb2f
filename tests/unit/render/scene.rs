use super::*;

fn status(progress: f32, volume: f32) -> PlaybackStatus {
    PlaybackStatus {
        artist: "Radiohead".to_string(),
        song: "Paranoid Android".to_string(),
        playing: true,
        track: 3,
        tracks: 12,
        time: "1:23".to_string(),
        duration: "4:56".to_string(),
        progress,
        volume,
        ..Default::default()
    }
}

fn scene() -> Scene {
    Scene::new(ChainGeometry::new(4, 2).unwrap(), SceneOpts::default()).unwrap()
}

fn noon() -> NaiveTime {
    NaiveTime::from_hms_opt(12, 34, 15).unwrap()
}

fn row_count(buffer: &PixelBuffer, y: u32) -> usize {
    (0..buffer.width()).filter(|&x| buffer.get(x, y)).count()
}

#[test]
fn single_module_row_is_rejected() {
    let err = Scene::new(ChainGeometry::new(4, 1).unwrap(), SceneOpts::default()).unwrap_err();
    assert!(matches!(err, DisplayError::Validation(_)));
}

#[test]
fn bars_have_truncated_lengths() {
    let mut s = scene();
    let frame = s.compose(&status(0.45, 0.70), noon(), 32);
    assert_eq!(row_count(&frame, 8), 14);
    assert_eq!(row_count(&frame, 9), 22);
    assert!(frame.get(0, 8) && !frame.get(14, 8));
}

#[test]
fn full_and_empty_bars() {
    let mut s = scene();
    let frame = s.compose(&status(1.0, 0.0), noon(), 32);
    assert_eq!(row_count(&frame, 8), 32);
    assert_eq!(row_count(&frame, 9), 0);
}

#[test]
fn clock_occupies_the_top_module_row_only() {
    let mut s = scene();
    // Title off screen, bars empty.
    let frame = s.compose(&status(0.0, 0.0), noon(), 32);
    let top: usize = (0..8).map(|y| row_count(&frame, y)).sum();
    let bottom: usize = (8..16).map(|y| row_count(&frame, y)).sum();
    assert!(top > 0);
    assert_eq!(bottom, 0);
    assert_eq!(row_count(&frame, 0), 0);
}

#[test]
fn title_lands_on_the_bottom_rows() {
    let mut s = scene();
    let frame = s.compose(&status(0.0, 0.0), noon(), 0);
    let title: usize = (10..16).map(|y| row_count(&frame, y)).sum();
    assert!(title > 0);
}

#[test]
fn title_offset_shifts_the_text() {
    let mut s = scene();
    let a = s.compose(&status(0.0, 0.0), noon(), 0);
    let b = s.compose(&status(0.0, 0.0), noon(), -1);
    for y in 10..16 {
        for x in 0..31 {
            assert_eq!(a.get(x + 1, y), b.get(x, y), "x={x} y={y}");
        }
    }
}

#[test]
fn compose_starts_from_a_blank_canvas() {
    let mut s = scene();
    let first = s.compose(&status(1.0, 1.0), noon(), 0);
    let second = s.compose(&status(0.0, 0.0), noon(), 32);
    assert!(first.lit_count() > second.lit_count());
    assert_eq!(row_count(&second, 8), 0);
}

#[test]
fn seconds_indicator_tracks_the_minute() {
    let mut s = Scene::new(
        ChainGeometry::new(4, 2).unwrap(),
        SceneOpts {
            seconds_indicator: true,
            ..SceneOpts::default()
        },
    )
    .unwrap();
    let frame = s.compose(&status(0.0, 0.0), noon(), 32);
    assert_eq!(row_count(&frame, 0), 8);
}

#[test]
fn clock_digest_is_the_fraction_of_the_minute() {
    let d = ClockDigest::from_time(NaiveTime::from_hms_opt(0, 0, 30).unwrap());
    assert_eq!(d.seconds, 30);
    assert!((d.fraction() - 0.5).abs() < 1e-6);
    assert_eq!(ClockDigest::from_time(noon()).fraction(), 0.25);
}

fn with_state_icon(w: u32) -> Scene {
    Scene::new(
        ChainGeometry::new(w, 2).unwrap(),
        SceneOpts {
            state_indicator: true,
            ..SceneOpts::default()
        },
    )
    .unwrap()
}

fn icon_pixels(frame: &PixelBuffer) -> Vec<(u32, u32)> {
    (0..8)
        .flat_map(|y| (0..STATE_ICON_WIDTH).map(move |x| (x, y)))
        .filter(|&(x, y)| frame.get(x, y))
        .collect()
}

#[test]
fn state_icon_shows_play_or_pause() {
    let mut s = with_state_icon(4);
    let playing = s.compose(&status(0.0, 0.0), noon(), 32);
    assert_eq!(icon_pixels(&playing).len(), 9);
    assert!(playing.get(2, 4) && !playing.get(2, 2));

    let paused_status = PlaybackStatus {
        playing: false,
        ..status(0.0, 0.0)
    };
    let paused = s.compose(&paused_status, noon(), 32);
    assert_eq!(icon_pixels(&paused).len(), 10);
    assert!(paused.get(2, 2) && paused.get(2, 6) && !paused.get(1, 4));
}

#[test]
fn state_icon_leaves_the_rest_of_the_frame_alone() {
    let plain = scene().compose(&status(0.45, 0.7), noon(), 3);
    let iconic = with_state_icon(4).compose(&status(0.45, 0.7), noon(), 3);
    for y in 0..16 {
        for x in 0..32 {
            if y >= 8 || x >= STATE_ICON_WIDTH {
                assert_eq!(plain.get(x, y), iconic.get(x, y), "x={x} y={y}");
            }
        }
    }
    assert!(icon_pixels(&plain).is_empty());
}

#[test]
fn state_icon_is_skipped_when_the_clock_needs_the_room() {
    let frame = with_state_icon(2).compose(&status(0.0, 0.0), noon(), 32);
    let mut plain = Scene::new(ChainGeometry::new(2, 2).unwrap(), SceneOpts::default()).unwrap();
    assert_eq!(frame, plain.compose(&status(0.0, 0.0), noon(), 32));
}

#[test]
fn title_width_matches_measurement() {
    let s = scene();
    assert_eq!(s.title_width(&status(0.0, 0.0)), 28 * 4);
}

#[test]
fn bar_len_clamps() {
    assert_eq!(bar_len(32, 1.5), 32);
    assert_eq!(bar_len(32, -0.5), 0);
    assert_eq!(bar_len(32, 0.5), 16);
}
