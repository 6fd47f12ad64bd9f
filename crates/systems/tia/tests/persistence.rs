//! Save states, display snapshots and settings files.

use emu_tia::objects::Moveable;
use emu_tia::registers::write;
use emu_tia::{DisplayFormat, HeadlessHost, NullSound, StateError, Tia, TiaConfig};

fn poke(tia: &mut Tia, host: &mut HeadlessHost, cycles: u32, addr: u8, value: u8) {
    host.at(cycles);
    tia.poke(host, addr as u16, value);
}

/// A short kernel: playfield, a moving player and a ball over a colored
/// background, with an HMOVE in the HBLANK of every line.
fn run_kernel(tia: &mut Tia, host: &mut HeadlessHost, first_line: u32, lines: u32) {
    for line in first_line..first_line + lines {
        let base = line * 76;
        poke(tia, host, base + 3, write::HMOVE, 0);
        poke(tia, host, base + 10, write::COLUBK, (line as u8) << 1);
        poke(tia, host, base + 14, write::PF1, line as u8);
        poke(tia, host, base + 20, write::GRP0, !(line as u8));
        poke(tia, host, base + 26, write::ENABL, (line as u8) & 0x02);
        poke(tia, host, base + 40, write::HMP0, 0xF0);
    }
}

fn setup() -> (Tia, HeadlessHost) {
    let mut tia = Tia::new(TiaConfig::default(), Box::new(NullSound));
    let mut host = HeadlessHost::new();
    poke(&mut tia, &mut host, 0, write::COLUP0, 0x46);
    poke(&mut tia, &mut host, 0, write::COLUPF, 0x88);
    poke(&mut tia, &mut host, 0, write::CTRLPF, 0x21);
    poke(&mut tia, &mut host, 30, write::RESP0, 0);
    poke(&mut tia, &mut host, 45, write::RESBL, 0);
    (tia, host)
}

#[test]
fn test_restored_state_renders_identically() {
    let (mut tia, mut host) = setup();
    run_kernel(&mut tia, &mut host, 1, 60);
    let saved = tia.save_state().unwrap();

    let mut restored = Tia::new(TiaConfig::default(), Box::new(NullSound));
    restored.load_state(&saved).unwrap();
    let mut restored_host = host.clone();

    run_kernel(&mut tia, &mut host, 61, 100);
    run_kernel(&mut restored, &mut restored_host, 61, 100);

    // Lines drawn after the save match pixel for pixel
    let from = (70 - tia.ystart() as usize) * 160;
    let to = (150 - tia.ystart() as usize) * 160;
    assert_eq!(
        &tia.current_frame_buffer()[from..to],
        &restored.current_frame_buffer()[from..to]
    );
    assert_eq!(tia.collision(), restored.collision());
    assert_eq!(tia.player0().motion(), restored.player0().motion());
}

#[test]
fn test_state_is_json() {
    let (tia, _) = setup();
    let saved = tia.save_state().unwrap();
    let text = serde_json::to_string(&saved).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();

    let mut other = Tia::new(TiaConfig::default(), Box::new(NullSound));
    other.load_state(&parsed).unwrap();
    assert_eq!(other.playfield().ctrlpf(), 0x21);
}

#[test]
fn test_display_snapshot_restores_picture() {
    let (mut tia, mut host) = setup();
    run_kernel(&mut tia, &mut host, 1, 120);
    let snapshot = tia.save_display().unwrap();
    let picture = tia.current_frame_buffer().to_vec();

    let mut other = Tia::new(TiaConfig::default(), Box::new(NullSound));
    other.load_display(&snapshot).unwrap();
    assert_eq!(other.current_frame_buffer(), &picture[..]);
    assert_eq!(other.previous_frame_buffer(), &picture[..]);
}

#[test]
fn test_display_snapshot_is_not_a_state() {
    let (mut tia, _) = setup();
    let snapshot = tia.save_display().unwrap();
    assert!(matches!(
        tia.load_state(&snapshot),
        Err(StateError::DeviceMismatch { .. })
    ));
}

#[test]
fn test_config_file_round_trip() {
    let path = std::env::temp_dir().join(format!("emu_tia_config_{}.json", std::process::id()));
    let config = TiaConfig {
        display_format: DisplayFormat::Pal,
        color_loss: true,
        ystart: 40,
        height: 228,
        ..TiaConfig::default()
    };
    config.save_to_file(&path).unwrap();

    let loaded = TiaConfig::load_from_file(&path).unwrap();
    assert_eq!(loaded.display_format, DisplayFormat::Pal);
    assert_eq!(loaded.ystart, 40);

    let tia = Tia::new(loaded, Box::new(NullSound));
    assert_eq!(tia.max_scanlines(), 342);
    assert_eq!(tia.framerate(), 50.0);
    assert_eq!(tia.current_frame_buffer().len(), 160 * 228);

    std::fs::remove_file(&path).unwrap();
    assert_eq!(TiaConfig::load_or_default(&path).ystart, 34);
}

#[test]
fn test_tampered_position_is_rejected() {
    let (mut tia, mut host) = setup();
    run_kernel(&mut tia, &mut host, 1, 10);
    let mut saved = tia.save_state().unwrap();
    saved["body"]["player0"]["motion"]["pos"] = serde_json::json!(1000);

    let mut other = Tia::new(TiaConfig::default(), Box::new(NullSound));
    let mut other_host = HeadlessHost::new();
    let pos = other.player0().motion().pos();
    assert!(matches!(
        other.load_state(&saved),
        Err(StateError::OutOfRange { value: 1000, .. })
    ));

    // The chip keeps drawing with its own state
    poke(&mut other, &mut other_host, 5 * 76, write::COLUBK, 0x1A);
    poke(&mut other, &mut other_host, 6 * 76, write::COLUBK, 0x1A);
    assert_eq!(other.player0().motion().pos(), pos);
}
