//! Chip events reach the shared log. Kept in its own test binary because the
//! log configuration is process-wide.

use std::fs;
use std::thread;
use std::time::Duration;

use emu_core::logging::{LogCategory, LogConfig, LogLevel};
use emu_tia::{HeadlessHost, NullSound, Tia, TiaConfig};

fn wait_for_line(path: &std::path::Path, needle: &str) -> bool {
    for _ in 0..100 {
        if let Ok(contents) = fs::read_to_string(path) {
            if contents.contains(needle) {
                return true;
            }
        }
        thread::sleep(Duration::from_millis(20));
    }
    false
}

#[test]
fn test_chip_events_are_logged() {
    let config = LogConfig::global();
    let path = std::env::temp_dir().join(format!("emu_tia_log_{}.txt", std::process::id()));
    let _ = fs::remove_file(&path);
    config.set_log_file(path.clone()).unwrap();
    config.set_level(LogCategory::Registers, LogLevel::Debug);
    config.set_level(LogCategory::Frame, LogLevel::Warn);

    assert!(config.should_log(LogCategory::Registers, LogLevel::Debug));
    assert!(!config.should_log(LogCategory::Registers, LogLevel::Trace));
    assert!(!config.should_log(LogCategory::Motion, LogLevel::Trace));

    let mut tia = Tia::new(TiaConfig::default(), Box::new(NullSound));
    let mut host = HeadlessHost::new();

    // Unused register
    tia.poke(&mut host, 0x2D, 0x99);
    assert!(wait_for_line(&path, "unused register $2D"));

    // Runaway frame
    tia.update(&mut host, |tia, host| {
        for line in 0..300 {
            host.at(line * 76);
            tia.poke(host, 0x09, 0);
            if host.stopped {
                break;
            }
        }
    });
    assert!(wait_for_line(&path, "no VSYNC after 290 scanlines"));

    config.clear_log_file();
    config.reset();
    let _ = fs::remove_file(&path);
}
