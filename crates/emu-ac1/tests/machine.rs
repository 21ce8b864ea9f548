//! Integration tests for the AC1 machine unit.

use std::path::PathBuf;

use emu_core::{
    BLACK, Key, KeyboardInput, MachineUnit, MemoryMap, PortMap, Profile, ResetLevel, Rom,
    SimpleCpuLink, SimpleHost, Subscription, VideoSource, WHITE,
};
use emu_ac1::{Ac1, Ac1Config, Ac1Os, Ac1Roms};

/// Glyph `c` line `l` is `c ^ l`, so neighbouring lines differ.
fn pattern_font() -> Rom {
    let bytes: Vec<u8> = (0..0x800)
        .map(|i: usize| ((i / 8) as u8) ^ ((i % 8) as u8))
        .collect();
    Rom::from_bytes(&bytes)
}

fn roms() -> Ac1Roms {
    Ac1Roms {
        mon_31_64x32: Some(Rom::from_bytes(&[0xC3; 0x800])),
        acc_font: Some(pattern_font()),
        ..Ac1Roms::default()
    }
}

fn make_ac1() -> (Ac1, SimpleHost) {
    let mut host = SimpleHost::new(Ac1Config::DEFAULT_SPEED_KHZ);
    let mut m = Ac1::new(Ac1Config::default(), &roms(), None);
    m.reset(&mut host, ResetLevel::PowerOn);
    (m, host)
}

#[test]
fn full_dram_sends_every_access_to_generic_ram() {
    let (mut m, mut host) = make_ac1();
    m.write_port(&mut host, 0x1C, 0x01);
    for addr in (0..=0xFFFFu16).step_by(0x0101) {
        let v = (addr >> 3) as u8;
        assert!(m.write_memory(&mut host, addr, v));
        assert_eq!(host.ram[usize::from(addr)], v, "write {addr:04X}");
        assert_eq!(m.read_memory(&mut host, addr), v, "read {addr:04X}");
    }
}

#[test]
fn one_window_per_address() {
    let (mut m, mut host) = make_ac1();
    host.ram.fill(0x99);
    assert_eq!(m.read_memory(&mut host, 0x0000), 0xC3);
    // Mini-BASIC missing: the RAM below shows through.
    assert_eq!(m.read_memory(&mut host, 0x0800), 0x99);
    m.write_memory(&mut host, 0x1000, 0x12);
    m.write_memory(&mut host, 0x1800, 0x34);
    assert_eq!(m.read_memory(&mut host, 0x1000), 0x12);
    assert_eq!(m.read_memory(&mut host, 0x1800), 0x34);
    assert_eq!(host.ram[0x1000], 0x99);
    assert_eq!(host.ram[0x1800], 0x99);
    assert_eq!(m.read_memory(&mut host, 0x2000), 0x99);
    for addr in [0x0000, 0x1000, 0x1800, 0x2000] {
        assert_eq!(m.read_memory(&mut host, addr), m.read_memory(&mut host, addr));
    }
}

#[test]
fn ram_floppy_aliases_e0_to_e7() {
    let (mut m, mut host) = make_ac1();
    assert_eq!(m.read_port(&mut host, 0xE3), 0xFF);
    host.attach_ram_floppy(0);
    for reg in 0..8u16 {
        m.write_port(&mut host, 0xE0 + reg, 0x10 + reg as u8);
    }
    assert_eq!(
        host.ram_floppies[0],
        Some([0x10, 0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17])
    );
    for reg in 0..8u16 {
        assert_eq!(m.read_port(&mut host, 0xE0 + reg), 0x10 + reg as u8);
    }
    assert_eq!(m.read_port(&mut host, 0xE8), 0xFF);
    assert_eq!(m.read_port(&mut host, 0xD8), 0xFF);
}

#[test]
fn unmapped_port_reads_ff() {
    let (mut m, mut host) = make_ac1();
    assert_eq!(m.read_port(&mut host, 0x40), 0xFF);
    assert_eq!(m.read_port(&mut host, 0x14), 0xFF);
}

#[test]
fn glyph_drawn_lsb_first_at_top_left() {
    let (mut m, mut host) = make_ac1();
    for addr in 0x1000..0x1800u16 {
        m.write_memory(&mut host, addr, b' ');
    }
    m.write_memory(&mut host, 0x17FF, b'A');
    let fe = m.frontend();
    let font = pattern_font();
    for y in 0..8 {
        let bits = font.get(usize::from(b'A') * 8 + y).unwrap();
        for x in 0..6 {
            let expected = if bits & (1 << x) != 0 { WHITE } else { BLACK };
            assert_eq!(fe.color_index_at(x, y), expected, "pixel ({x}, {y})");
        }
    }
    assert_eq!((fe.screen_width(), fe.screen_height()), (384, 256));
    assert!(fe.extract_text().unwrap().starts_with("A\n"));
}

#[test]
fn special_keys_latch_codes() {
    let (mut m, mut host) = make_ac1();
    let fe = m.frontend();
    m.read_port(&mut host, 0x04);
    for (key, code) in [(Key::Enter, 0x8D), (Key::Home, 0x81), (Key::PageDown, 0x95)] {
        assert!(fe.key_pressed(key, false));
        assert_eq!(m.read_port(&mut host, 0x04), code);
    }
    fe.key_released();
    assert_eq!(m.read_port(&mut host, 0x04), 0);
}

#[test]
fn attach_and_detach() {
    let (mut m, _host) = make_ac1();
    let mut cpu = SimpleCpuLink::default();
    m.attach(&mut cpu);
    assert_eq!(cpu.subscribed, vec![Subscription::Cycles]);
    assert_eq!(cpu.sources, 2);
    m.detach(&mut cpu);
    assert!(cpu.subscribed.is_empty());
    assert_eq!(cpu.sources, 0);
}

#[test]
fn reset_significant_options() {
    let (m, _host) = make_ac1();
    let p = Profile::new().with("jkcemu.system", "AC1");
    assert!(!m.requires_reset(&p));
    assert!(m.requires_reset(&p.clone().with("jkcemu.ac1.os.version", "SCCH8.0")));
    assert!(m.requires_reset(&Profile::new().with("jkcemu.system", "LLC2")));
}

#[test]
fn ctc_interrupt_through_chain() {
    let (mut m, mut host) = make_ac1();
    m.write_port(&mut host, 0x00, 0x20);
    // Interrupt enable, timer, prescaler 16, constant 2.
    m.write_port(&mut host, 0x00, 0x85);
    m.write_port(&mut host, 0x00, 0x02);
    m.cycles_elapsed(&mut host, 31);
    assert!(!m.interrupt_requested());
    m.cycles_elapsed(&mut host, 1);
    assert!(m.interrupt_requested());
    assert_eq!(m.accept_interrupt(), Some(0x20));
    m.interrupt_finished();
    assert!(!m.interrupt_requested());
}

fn rom_dir() -> PathBuf {
    std::env::var_os("KC_ROM_DIR").map_or_else(
        || PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../roms"),
        PathBuf::from,
    )
}

#[test]
#[ignore] // Requires real ROMs
fn real_monitor_starts_with_jump() {
    let roms = Ac1Roms::load(&rom_dir());
    let mut host = SimpleHost::new(Ac1Config::DEFAULT_SPEED_KHZ);
    let mut m = Ac1::new(Ac1Config::default(), &roms, None);
    m.reset(&mut host, ResetLevel::PowerOn);
    assert_eq!(m.read_memory(&mut host, 0x0000), 0xC3);
}
