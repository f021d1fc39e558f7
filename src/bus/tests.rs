//! System-level scenarios: the PPU driven through the system bus.

use std::cell::Cell;
use std::rc::Rc;

use super::*;
use crate::bus::clock::step;
use crate::ppu::{LINES_PER_FRAME, NES_HEIGHT, NES_WIDTH, RGB_PALETTE, TICKS_PER_LINE};
use crate::test_utils::ScriptedCpu;

const TICKS_PER_FRAME: u32 = TICKS_PER_LINE as u32 * LINES_PER_FRAME as u32;

fn system(chr: &[u8]) -> (SystemDevices, SystemBus) {
    let dev = SystemDevices::new(Ppu::new(chr), Rom::new(vec![0xEA; 0x4000]));
    let bus = dev.map(default_benign_ranges());
    (dev, bus)
}

/// Set the PPU address through the register window.
fn set_vram_address(bus: &SystemBus, address: u16) {
    bus.write(0x2006, (address >> 8) as u8).unwrap();
    bus.write(0x2006, address as u8).unwrap();
}

#[test]
fn blank_frame_with_nmi_enabled() {
    let (dev, bus) = system(&[0u8; 0x2000]);
    let nmis = Rc::new(Cell::new(0u32));
    let n = nmis.clone();
    dev.ppu.borrow_mut().set_nmi_callback(move || n.set(n.get() + 1));

    bus.write(0x2000, 0x80).unwrap();
    {
        let mut ppu = dev.ppu.borrow_mut();
        for _ in 0..TICKS_PER_FRAME {
            ppu.tick().unwrap();
        }
    }

    assert_eq!(nmis.get(), 1);
    let ppu = dev.ppu.borrow();
    assert!(ppu.vblank());
    let out = ppu.output();
    for y in 0..NES_HEIGHT {
        for x in 0..NES_WIDTH {
            assert_eq!(out.pixel(x, y), RGB_PALETTE[0], "pixel ({x}, {y})");
        }
    }
    drop(ppu);

    // status read through the bus reports and clears vblank
    assert_eq!(bus.read(0x2002).unwrap() & 0x80, 0x80);
    assert!(!dev.ppu.borrow().vblank());
}

#[test]
fn register_window_repeats_every_eight_bytes() {
    let (dev, bus) = system(&[0u8; 0x2000]);
    // $3FFE is port 6, $200F is port 7
    bus.write(0x3FFE, 0x21).unwrap();
    bus.write(0x2A06, 0x08).unwrap();
    assert_eq!(dev.ppu.borrow().vram_address(), 0x2108);
    bus.write(0x200F, 0x5C).unwrap();
    assert_eq!(dev.ppu.borrow().video_read(0x2108).unwrap(), 0x5C);
}

#[test]
fn work_ram_mirrors() {
    let (_dev, bus) = system(&[0u8; 0x2000]);
    bus.write(0x0001, 0x42).unwrap();
    for base in [0x0000u16, 0x0800, 0x1000, 0x1800] {
        assert_eq!(bus.read(base + 1).unwrap(), 0x42);
    }
    bus.write(0x1FFF, 0x17).unwrap();
    assert_eq!(bus.read(0x07FF).unwrap(), 0x17);
}

#[test]
fn prg_regions() {
    let (_dev, bus) = system(&[0u8; 0x2000]);
    bus.write(0x6000, 0x33).unwrap();
    assert_eq!(bus.read(0x6000).unwrap(), 0x33);
    assert_eq!(bus.read(0x8000).unwrap(), 0xEA);
    assert_eq!(bus.read(0xFFFF).unwrap(), 0xEA);
    bus.write(0x8000, 0x00).unwrap();
    assert_eq!(bus.read(0x8000).unwrap(), 0xEA);
}

#[test]
fn benign_and_fatal_misses() {
    let (_dev, bus) = system(&[0u8; 0x2000]);
    assert_eq!(bus.read(0x4000).unwrap(), 0);
    assert_eq!(bus.read(0x4015).unwrap(), 0);
    bus.write(0x4017, 0x40).unwrap();

    assert_eq!(bus.read(0x4018), Err(NesError::UnmappedAddress { address: 0x4018 }));
    assert_eq!(bus.write(0x5000, 1), Err(NesError::UnmappedAddress { address: 0x5000 }));
    assert!(matches!(bus.read(0x4014), Err(NesError::Protocol(_))));
}

#[test]
fn palette_written_through_data_port_is_rendered() {
    let (dev, bus) = system(&[0u8; 0x2000]);
    set_vram_address(&bus, 0x3F10);
    bus.write(0x2007, 0x16).unwrap();

    dev.ppu.borrow_mut().render_scan_line(20).unwrap();
    // $3F10 aliases the backdrop
    assert_eq!(dev.ppu.borrow().output().pixel(0, 0), RGB_PALETTE[0x16]);

    // read back through the data port, one read late
    set_vram_address(&bus, 0x3F00);
    assert_eq!(bus.read(0x2007).unwrap(), 0x00);
    assert_eq!(bus.read(0x2007).unwrap(), 0x16);
}

#[test]
fn dma_sprite_appears_in_next_frame() {
    // tile 1: solid colour 1
    let mut chr = vec![0u8; 0x2000];
    chr[16..24].fill(0xFF);
    let (dev, bus) = system(&chr);

    // sprite 0 at (40, 30) using tile 1, everything else off screen
    for i in 0..64u16 {
        bus.write(0x0200 + i * 4, 0xF0).unwrap();
    }
    for (i, b) in [30u8, 1, 0, 40].into_iter().enumerate() {
        bus.write(0x0200 + i as u16, b).unwrap();
    }
    set_vram_address(&bus, 0x3F11);
    bus.write(0x2007, 0x2A).unwrap();

    let nmi = Rc::new(Cell::new(false));
    let mut cpu = ScriptedCpu::new(vec![(0x4014, Some(0x02))]);
    let mut steps = 0;
    while dev.ppu.borrow().frame_count() == 0 {
        step(&mut cpu, &bus, &dev.ppu, &dev.dma, &nmi).unwrap();
        steps += 1;
    }
    assert!(steps > 0);

    let ppu = dev.ppu.borrow();
    let out = ppu.output();
    assert_eq!(out.pixel(40, 30), RGB_PALETTE[0x2A]);
    assert_eq!(out.pixel(47, 37), RGB_PALETTE[0x2A]);
    assert_eq!(out.pixel(48, 30), RGB_PALETTE[0]);
    assert_eq!(out.pixel(40, 38), RGB_PALETTE[0]);
}

#[test]
fn name_table_tile_rendered_through_registers() {
    let mut chr = vec![0u8; 0x2000];
    // tile 2: colour 2 (high plane only)
    chr[32 + 8..32 + 16].fill(0xFF);
    let (dev, bus) = system(&chr);

    set_vram_address(&bus, 0x2000 + 5 * 32 + 3); // tile row 5, column 3
    bus.write(0x2007, 2).unwrap();
    set_vram_address(&bus, 0x3F02);
    bus.write(0x2007, 0x30).unwrap();

    let mut ppu = dev.ppu.borrow_mut();
    for line in 0..LINES_PER_FRAME {
        ppu.render_scan_line(line).unwrap();
    }
    let out = ppu.output();
    assert_eq!(out.pixel(24, 40), RGB_PALETTE[0x30]);
    assert_eq!(out.pixel(31, 47), RGB_PALETTE[0x30]);
    assert_eq!(out.pixel(23, 40), RGB_PALETTE[0]);
}

#[test]
fn shared_sprite_memory_between_ppu_and_dma() {
    let (dev, bus) = system(&[0u8; 0x2000]);
    bus.write(0x0300, 0xAB).unwrap();
    let oam = dev.ppu.borrow().oam();
    dma::transfer(&bus, &dev.dma, 0x03, &oam).unwrap();
    assert_eq!(dev.ppu.borrow().oam().borrow().sprite(0).y, 0xAB);
}
