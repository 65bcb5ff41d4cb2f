use std::collections::BTreeMap;

use super::*;
use crate::matrix::register::Targets;

fn geometry(w: u32, h: u32) -> ChainGeometry {
    ChainGeometry::new(w, h).unwrap()
}

#[test]
fn first_pixel_lands_in_msb() {
    let mut px = [false; 8];
    px[0] = true;
    assert_eq!(row_byte(&px), 0x80);

    let mut px = [false; 8];
    px[7] = true;
    assert_eq!(row_byte(&px), 0x01);

    assert_eq!(row_byte(&[true; 8]), 0xFF);
    assert_eq!(row_byte(&[false; 8]), 0x00);
}

#[test]
fn every_pixel_maps_to_bit_seven_minus_index() {
    for i in 0..8 {
        let mut px = [false; 8];
        px[i] = true;
        assert_eq!(row_byte(&px), 1u8 << (7 - i), "pixel {i}");
    }
    let px = [true, false, true, true, false, false, false, true];
    assert_eq!(row_byte(&px), 0b1011_0001);
}

#[test]
fn lsb_first_mirrors_the_row() {
    let enc = AddressingEncoder::new(geometry(1, 1)).with_column_order(ColumnOrder::LsbFirst);
    let mut px = [false; 8];
    px[0] = true;
    assert_eq!(enc.pack(&px), 0x01);
}

#[test]
fn encode_covers_every_module_with_each_digit_once() {
    for (w, h) in [(1, 1), (4, 1), (4, 2), (3, 3)] {
        let g = geometry(w, h);
        let writes = AddressingEncoder::new(g)
            .encode(&PixelBuffer::blank(g))
            .unwrap();
        assert_eq!(writes.len(), (w * h * 8) as usize);

        let mut per_module: BTreeMap<usize, Vec<Register>> = BTreeMap::new();
        for write in &writes {
            let Targets::Only(set) = &write.targets else {
                panic!("frame writes must address single modules");
            };
            assert_eq!(set.len(), 1);
            let idx = *set.iter().next().unwrap();
            assert!(idx < g.module_count());
            per_module.entry(idx).or_default().push(write.register);
        }
        assert_eq!(per_module.len(), g.module_count());
        for regs in per_module.values_mut() {
            regs.sort();
            assert_eq!(regs.as_slice(), &Register::DIGITS);
        }
    }
}

#[test]
fn pixel_lands_in_the_right_module_and_register() {
    // 4x2 modules => 32x16 pixels.
    let g = geometry(4, 2);
    let mut buf = PixelBuffer::blank(g);
    // Module (2, 1), second row from the top, leftmost column.
    buf.set(2 * 8, 8 + 1, true);

    let writes = AddressingEncoder::new(g).encode(&buf).unwrap();
    let lit: Vec<_> = writes.iter().filter(|w| w.value != 0).collect();
    assert_eq!(lit.len(), 1);
    assert_eq!(lit[0].register, Register::Digit6);
    assert_eq!(lit[0].value, 0x80);
    assert_eq!(lit[0].targets, Targets::single(2 + 4));
}

#[test]
fn top_left_and_bottom_right_corners() {
    let g = geometry(2, 2);
    let mut buf = PixelBuffer::blank(g);
    buf.set(0, 0, true);
    buf.set(15, 15, true);

    let writes = AddressingEncoder::new(g).encode(&buf).unwrap();
    let top_left = writes
        .iter()
        .find(|w| w.targets == Targets::single(0) && w.register == Register::Digit7)
        .unwrap();
    assert_eq!(top_left.value, 0x80);
    let bottom_right = writes
        .iter()
        .find(|w| w.targets == Targets::single(3) && w.register == Register::Digit0)
        .unwrap();
    assert_eq!(bottom_right.value, 0x01);
}

#[test]
fn mismatched_buffer_is_rejected() {
    let small = PixelBuffer::blank(geometry(2, 1));
    assert!(AddressingEncoder::new(geometry(4, 2)).encode(&small).is_err());
}
