//! Cross-machine scenarios driven through the `Machine` dispatcher.

use std::path::PathBuf;

use emu_core::{
    BLACK, MachineUnit, MemoryMap, PortMap, Profile, ResetLevel, Rom, SimpleCpuLink, SimpleHost,
    Subscription, VideoSource, WHITE,
};
use emu_kc::{Machine, MachineKind, Resources};

const GLYPH_A: [u8; 8] = [0x18, 0x24, 0x42, 0x7E, 0x42, 0x42, 0x42, 0x00];

fn font_with_a() -> Rom {
    let mut bytes = vec![0u8; 0x800];
    let base = usize::from(b'A') * 8;
    bytes[base..base + 8].copy_from_slice(&GLYPH_A);
    Rom::from_bytes(&bytes)
}

fn boot(profile: &Profile, resources: &Resources) -> (Machine, SimpleHost) {
    let mut m = Machine::from_profile(profile, resources).unwrap();
    let mut host = SimpleHost::new(m.default_speed_khz());
    m.reset(&mut host, ResetLevel::PowerOn);
    (m, host)
}

#[test]
fn z1013_a2_glyph_at_home_position() {
    let mut res = Resources::default();
    res.z1013.font = Some(font_with_a());
    let profile = Profile::new()
        .with("jkcemu.system", "Z1013.64")
        .with("jkcemu.z1013.monitor", "A.2");
    let (mut m, mut host) = boot(&profile, &res);
    m.write_memory(&mut host, 0xEC00, b'A');
    let fe = m.frontend();
    for (y, &bits) in GLYPH_A.iter().enumerate() {
        for x in 0..8 {
            let expected = if bits & (0x80 >> x) != 0 { WHITE } else { BLACK };
            assert_eq!(fe.color_index_at(x, y), expected, "pixel ({x}, {y})");
        }
    }
    // Synthesis is a pure read.
    assert_eq!(fe.color_index_at(3, 0), fe.color_index_at(3, 0));
}

#[test]
fn ac1_port_1c_maps_ram_over_rom() {
    let mut res = Resources::default();
    res.ac1.mon_31_64x32 = Some(Rom::from_bytes(&[0xAA; 0x1000]));
    let (mut m, mut host) = boot(&Profile::new().with("jkcemu.system", "AC1"), &res);
    host.ram[0x0000] = 0x55;
    assert_eq!(m.read_memory(&mut host, 0x0000), 0xAA);
    m.write_port(&mut host, 0x1C, 0x01);
    assert_eq!(m.read_memory(&mut host, 0x0000), 0x55);
    assert!(m.write_memory(&mut host, 0x0001, 0x66));
    assert_eq!(host.ram[0x0001], 0x66);
}

#[test]
fn ac1_ram_floppy_registers_in_order() {
    let (mut m, mut host) = boot(
        &Profile::new().with("jkcemu.system", "AC1"),
        &Resources::default(),
    );
    assert_eq!(m.read_port(&mut host, 0xE3), 0xFF);
    host.attach_ram_floppy(0);
    for reg in 0..8u8 {
        m.write_port(&mut host, 0xE0 + u16::from(reg), 0x10 + reg);
    }
    for reg in 0..8u8 {
        assert_eq!(m.read_port(&mut host, 0xE0 + u16::from(reg)), 0x10 + reg);
    }
    assert_eq!(host.ram_floppies[1], None);
}

#[test]
fn bcs3_screen_goes_dark_without_sync() {
    let mut res = Resources::default();
    res.bcs3.se24 = Some(Rom::from_bytes(&[0x00; 0x1000]));
    res.bcs3.se24_font = Some(Rom::from_bytes(&[0xFF; 0x800]));
    let (mut m, mut host) = boot(&Profile::new().with("jkcemu.system", "BCS3"), &res);
    // CTC channels 0-2 cascade into a sync pulse every 16 cycles.
    for port in [0x02, 0x01] {
        m.write_port(&mut host, port, 0x45);
        m.write_port(&mut host, port, 0x01);
    }
    m.write_port(&mut host, 0x00, 0x05);
    m.write_port(&mut host, 0x00, 0x01);
    m.cycles_elapsed(&mut host, 16);
    let fe = m.frontend();
    assert!(fe.display_flags().is_enabled());

    m.write_port(&mut host, 0x00, 0x03);
    m.cycles_elapsed(&mut host, 100_000);
    let border = fe.border_color_index();
    assert!(
        (0..fe.screen_height())
            .step_by(7)
            .all(|y| (0..fe.screen_width()).all(|x| fe.color_index_at(x, y) == border))
    );
}

#[test]
fn every_machine_attaches_and_detaches_cleanly() {
    let res = Resources::default();
    for tag in ["Z1013.12", "AC1", "LLC2", "BCS3", "KC85/1"] {
        let (mut m, _host) = boot(&Profile::new().with("jkcemu.system", tag), &res);
        let mut cpu = SimpleCpuLink::default();
        m.attach(&mut cpu);
        assert!(cpu.subscribed.contains(&Subscription::Cycles), "{tag}");
        m.detach(&mut cpu);
        assert!(cpu.subscribed.is_empty(), "{tag}");
        assert_eq!(cpu.sources, 0, "{tag}");
    }
}

#[test]
fn switching_machines_requires_reset() {
    let res = Resources::default();
    let z1013 = Profile::new().with("jkcemu.system", "Z1013.64");
    let (m, _host) = boot(&z1013, &res);
    assert!(!m.requires_reset(&z1013));
    for kind in MachineKind::ALL {
        let tag = match kind {
            MachineKind::Z1013 => continue,
            MachineKind::Ac1 => "AC1",
            MachineKind::Llc2 => "LLC2",
            MachineKind::Bcs3 => "BCS3",
            MachineKind::Z9001 => "KC87",
        };
        assert!(m.requires_reset(&Profile::new().with("jkcemu.system", tag)), "{tag}");
    }
}

#[test]
fn text_from_every_character_screen() {
    let res = Resources::default();
    for (tag, addr) in [("Z1013.64", 0xEC00), ("LLC2", 0xC000), ("KC87", 0xEC00)] {
        let (mut m, mut host) = boot(&Profile::new().with("jkcemu.system", tag), &res);
        let fe = m.frontend();
        // Power-on garbage is replaced by blanks row by row.
        for offs in 0..0x400u16 {
            m.write_memory(&mut host, addr + offs, b' ');
        }
        m.write_memory(&mut host, addr, b'O');
        m.write_memory(&mut host, addr + 1, b'K');
        let text = fe.extract_text().unwrap();
        assert!(text.starts_with("OK\n"), "{tag}: {text:?}");
    }
}

fn rom_dir() -> PathBuf {
    std::env::var_os("KC_ROM_DIR").map_or_else(
        || PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../roms"),
        PathBuf::from,
    )
}

#[test]
#[ignore] // Requires real ROMs
fn real_roms_boot_every_machine() {
    let res = Resources::load(&rom_dir());
    for tag in ["Z1013.64", "AC1", "LLC2", "BCS3", "KC87"] {
        let (mut m, mut host) = boot(&Profile::new().with("jkcemu.system", tag), &res);
        m.cycles_elapsed(&mut host, 100_000);
        assert!(m.frontend().screen_width() > 0, "{tag}");
    }
}
