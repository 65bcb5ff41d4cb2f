use super::*;
use crate::matrix::transport::InMemoryTransport;

fn writer(w: u32, h: u32) -> BusWriter<InMemoryTransport> {
    let geometry = ChainGeometry::new(w, h).unwrap();
    BusWriter::new(InMemoryTransport::new(), AddressingEncoder::new(geometry))
}

#[test]
fn wire_frame_is_two_bytes_per_device() {
    for n in 1..=12 {
        let all = wire_frame(&RegisterWrite::all(Register::Intensity, 3), n).unwrap();
        assert_eq!(all.len(), 2 * n);
        let one = wire_frame(&RegisterWrite::to_module(Register::Digit2, 0xAA, n - 1), n).unwrap();
        assert_eq!(one.len(), 2 * n);
    }
}

#[test]
fn untargeted_modules_get_noop_pairs() {
    let n = 6;
    let subsets: [&[usize]; 4] = [&[], &[0], &[5], &[1, 2, 4]];
    for subset in subsets {
        let write = RegisterWrite {
            register: Register::Digit4,
            value: 0x5A,
            targets: Targets::subset(subset.iter().copied()),
        };
        let bytes = wire_frame(&write, n).unwrap();
        for (device, pair) in bytes.chunks_exact(2).enumerate() {
            if subset.contains(&device) {
                assert_eq!(pair, [0x5, 0x5A], "device {device} in {subset:?}");
            } else {
                assert_eq!(pair, [0, 0], "device {device} in {subset:?}");
            }
        }
    }
}

#[test]
fn broadcast_repeats_the_pair() {
    let bytes = wire_frame(&RegisterWrite::all(Register::ScanLimit, 7), 3).unwrap();
    assert_eq!(bytes, vec![0xB, 7, 0xB, 7, 0xB, 7]);
}

#[test]
fn out_of_chain_target_is_rejected() {
    let write = RegisterWrite::to_module(Register::Digit0, 1, 4);
    assert!(wire_frame(&write, 4).is_err());
}

#[test]
fn start_up_sends_init_then_clear() {
    let mut bus = writer(4, 2);
    let outcome = bus.start_up(1);
    assert_eq!(
        outcome,
        DrawOutcome {
            writes: 13,
            failed: 0
        }
    );
    let frames = bus.transport().frames();
    assert_eq!(frames.len(), 5 + 8);

    let heads: Vec<(u8, u8)> = frames.iter().map(|f| (f[0], f[1])).collect();
    assert_eq!(
        &heads[..5],
        &[(0xB, 7), (0x9, 0), (0xF, 0), (0xC, 1), (0xA, 1)]
    );
    for (i, head) in heads[5..].iter().enumerate() {
        assert_eq!(*head, (i as u8 + 1, 0));
    }
    assert!(frames.iter().all(|f| f.len() == 16));
}

#[test]
fn failed_start_up_write_does_not_abort_the_sequence() {
    let mut bus = writer(4, 2);
    bus.transport_mut().fail_next(1);
    let outcome = bus.start_up(1);
    assert_eq!(outcome.writes, 13);
    assert_eq!(outcome.failed, 1);

    let heads: Vec<(u8, u8)> = bus.transport().frames().iter().map(|f| (f[0], f[1])).collect();
    assert_eq!(heads.len(), 12);
    assert_eq!(&heads[..4], &[(0x9, 0), (0xF, 0), (0xC, 1), (0xA, 1)]);
    let clears: Vec<(u8, u8)> = (1..=8).map(|digit| (digit, 0)).collect();
    assert_eq!(&heads[4..], clears.as_slice());
}

#[test]
fn clear_continues_past_a_failed_row() {
    let mut bus = writer(2, 1);
    bus.transport_mut().fail_next(2);
    let outcome = bus.clear();
    assert_eq!(outcome.writes, 8);
    assert_eq!(outcome.failed, 2);
    let digits: Vec<u8> = bus.transport().frames().iter().map(|f| f[0]).collect();
    assert_eq!(digits, [3, 4, 5, 6, 7, 8]);
}

#[test]
fn intensity_is_clamped_to_register_range() {
    let mut bus = writer(1, 1);
    bus.set_intensity(40).unwrap();
    assert_eq!(bus.transport().frames()[0], vec![0xA, 0xF]);
}

#[test]
fn draw_sends_one_frame_per_row_write() {
    let mut bus = writer(4, 2);
    let buffer = PixelBuffer::blank(bus.geometry());
    let outcome = bus.draw(&buffer).unwrap();
    assert_eq!(outcome.writes, 4 * 2 * 8);
    assert!(outcome.is_clean());
    assert_eq!(bus.transport().frames().len(), 64);
    assert_eq!(bus.stats().frames_sent, 64);
}

#[test]
fn transport_failure_does_not_stop_the_frame() {
    let mut bus = writer(2, 1);
    bus.transport_mut().fail_next(3);
    let buffer = PixelBuffer::blank(bus.geometry());
    let outcome = bus.draw(&buffer).unwrap();
    assert_eq!(outcome.writes, 16);
    assert_eq!(outcome.failed, 3);
    assert_eq!(bus.transport().frames().len(), 13);
    assert_eq!(
        bus.stats(),
        BusStats {
            frames_sent: 13,
            frames_failed: 3
        }
    );

    // The writer stays usable after a failure.
    assert!(bus.write_all(Register::Shutdown, 1).is_ok());
}

#[test]
fn single_write_failure_is_reported() {
    let mut bus = writer(1, 1);
    bus.transport_mut().fail_next(1);
    let err = bus.write_all(Register::Shutdown, 0).unwrap_err();
    assert!(err.to_string().contains("transport error"));
}

#[test]
fn draw_rejects_foreign_buffer() {
    let mut bus = writer(4, 2);
    let other = PixelBuffer::blank(ChainGeometry::new(4, 1).unwrap());
    assert!(bus.draw(&other).is_err());
    assert!(bus.transport().frames().is_empty());
}
