use super::*;
use crate::{
    foundation::core::ChainGeometry,
    matrix::{
        bus::BusWriter, emulator::ChainEmulator, encoder::AddressingEncoder,
        transport::InMemoryTransport,
    },
    render::scene::{Scene, SceneOpts},
    status::{parser::parse_status, source::ScriptedStatusSource},
};

const A: &str = "Radiohead - Paranoid Android\n\
[playing] #3/12 1:23/4:56 (45%)\n\
volume: 70% repeat: on random: off single: off consume: off";

const B: &str = "Portishead - Roads\n\
[paused] #2/11 3:10/5:05 (62%)\n\
volume: 35% repeat: off random: off single: off consume: off";

fn fixed_clock() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 30).unwrap()
}

fn geometry() -> ChainGeometry {
    ChainGeometry::new(4, 2).unwrap()
}

fn frame_cycle<T: Transport>(transport: T) -> FrameCycle<T> {
    FrameCycle::new(
        BusWriter::new(transport, AddressingEncoder::new(geometry())),
        Scene::new(geometry(), SceneOpts::default()).unwrap(),
    )
    .unwrap()
}

fn opts(max_frames: u64) -> SchedulerOpts {
    SchedulerOpts {
        max_frames: Some(max_frames),
        ..SchedulerOpts::default()
    }
}

#[test]
fn default_timing() {
    let o = SchedulerOpts::default();
    assert_eq!(o.status_interval, Duration::from_millis(500));
    assert_eq!(o.frame_interval, Duration::from_millis(50));
    assert_eq!(o.intensity, 1);
    assert_eq!(o.max_frames, None);
}

#[test]
fn zero_intervals_are_rejected() {
    let bad = SchedulerOpts {
        frame_interval: Duration::ZERO,
        ..SchedulerOpts::default()
    };
    assert!(RenderScheduler::new(frame_cycle(InMemoryTransport::new()), bad).is_err());
}

#[tokio::test(start_paused = true)]
async fn bounded_run_sends_start_up_then_frames() {
    let source = ScriptedStatusSource::new()
        .then_fail("mpd not running")
        .then_fail("mpd not running")
        .then_text(A);
    let mut scheduler = RenderScheduler::new(frame_cycle(InMemoryTransport::new()), opts(30))
        .unwrap()
        .with_clock(fixed_clock);

    let stats = scheduler.run(source).await.unwrap();
    assert_eq!(stats.frames, 30);
    assert_eq!(stats.draw_failures, 0);
    assert_eq!(stats.status.bootstrap_attempts, 3);
    // Refreshes at +500 ms and +1000 ms; the script is exhausted by then.
    assert_eq!(stats.status.failures, 2);
    assert_eq!(stats.bus.frames_sent, 5 + 8 + 30 * 64);

    let sent = scheduler.frame_cycle().bus().transport().frames();
    let heads: Vec<(u8, u8)> = sent[..5].iter().map(|f| (f[0], f[1])).collect();
    assert_eq!(heads, [(0xB, 7), (0x9, 0), (0xF, 0), (0xC, 1), (0xA, 1)]);
}

#[tokio::test(start_paused = true)]
async fn frames_wait_for_the_first_status() {
    let source = ScriptedStatusSource::new()
        .then_fail("x")
        .then_fail("x")
        .then_fail("x")
        .then_text(A);
    let mut scheduler = RenderScheduler::new(frame_cycle(InMemoryTransport::new()), opts(1))
        .unwrap()
        .with_clock(fixed_clock);
    let started = tokio::time::Instant::now();

    let stats = scheduler.run(source).await.unwrap();
    assert!(started.elapsed() >= Duration::from_millis(1500));
    assert_eq!(stats.status.bootstrap_attempts, 4);
    assert_eq!(stats.frames, 1);
}

#[tokio::test(start_paused = true)]
async fn failed_refresh_keeps_drawing_the_old_snapshot_then_picks_up_the_new_one() {
    let source = ScriptedStatusSource::new()
        .then_text(A)
        .then_fail("connection refused")
        .then_text(B);
    let mut scheduler = RenderScheduler::new(
        frame_cycle(ChainEmulator::new(geometry())),
        opts(25),
    )
    .unwrap()
    .with_clock(fixed_clock);

    let stats = scheduler.run(source).await.unwrap();
    assert_eq!(stats.status.failures, 1);
    assert_eq!(stats.status.refreshes, 1);

    // Last frame is drawn at t = 1200 ms, offset 32 - 24, with the second track.
    let mut reference = frame_cycle(InMemoryTransport::new());
    let a = parse_status(A).unwrap();
    for _ in 0..24 {
        reference.compose(&a, fixed_clock());
    }
    let expected = reference.compose(&parse_status(B).unwrap(), fixed_clock());
    assert_eq!(
        scheduler.frame_cycle().bus().transport().to_pixel_buffer(),
        expected
    );
}

#[tokio::test(start_paused = true)]
async fn transport_failures_do_not_end_the_run() {
    let source = ScriptedStatusSource::new().then_text(A);
    let mut transport = InMemoryTransport::new();
    // All 13 start-up writes and the first 7 rows of the first frame.
    transport.fail_next(20);
    let mut scheduler = RenderScheduler::new(frame_cycle(transport), opts(3))
        .unwrap()
        .with_clock(fixed_clock);

    let stats = scheduler.run(source).await.unwrap();
    assert_eq!(stats.frames, 3);
    assert_eq!(stats.draw_failures, 1);
    assert_eq!(stats.bus.frames_failed, 20);
    assert_eq!(stats.bus.frames_sent, 3 * 64 - 7);
}

#[tokio::test(start_paused = true)]
async fn one_failed_start_up_write_still_wakes_the_chain() {
    let source = ScriptedStatusSource::new().then_text(A);
    let mut transport = InMemoryTransport::new();
    transport.fail_next(1);
    let mut scheduler = RenderScheduler::new(frame_cycle(transport), opts(1))
        .unwrap()
        .with_clock(fixed_clock);

    let stats = scheduler.run(source).await.unwrap();
    assert_eq!(stats.bus.frames_failed, 1);
    assert_eq!(stats.draw_failures, 0);
    let sent = scheduler.frame_cycle().bus().transport().frames();
    assert_eq!(sent.len(), 12 + 64);
    assert!(sent[..12].iter().any(|f| (f[0], f[1]) == (0xC, 1)));
}
