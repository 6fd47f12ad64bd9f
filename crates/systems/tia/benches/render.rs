use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use emu_tia::registers::write;
use emu_tia::{HeadlessHost, NullSound, Tia, TiaConfig};

fn poke(tia: &mut Tia, host: &mut HeadlessHost, cycles: u32, addr: u8, value: u8) {
    host.at(cycles);
    tia.poke(host, addr as u16, value);
}

/// One NTSC frame: VSYNC, VBLANK, then `writes_per_line` register writes on
/// every visible line.
fn run_frame(tia: &mut Tia, host: &mut HeadlessHost, writes_per_line: u32) {
    tia.update(host, |tia, host| {
        poke(tia, host, 0, write::VSYNC, 0x02);
        poke(tia, host, 3 * 76, write::VSYNC, 0x00);
        poke(tia, host, 3 * 76 + 1, write::VBLANK, 0x02);
        poke(tia, host, 40 * 76, write::VBLANK, 0x00);

        for line in 40..232u32 {
            let base = line * 76;
            poke(tia, host, base + 3, write::HMOVE, 0);
            for i in 0..writes_per_line {
                let cycle = base + 10 + i * 60 / writes_per_line.max(1);
                let reg = match i % 4 {
                    0 => write::GRP0,
                    1 => write::PF1,
                    2 => write::COLUBK,
                    _ => write::ENABL,
                };
                poke(tia, host, cycle, reg, (line + i) as u8);
            }
        }
        poke(tia, host, 232 * 76, write::VBLANK, 0x02);
        poke(tia, host, 262 * 76, write::VSYNC, 0x02);
        poke(tia, host, 265 * 76, write::VSYNC, 0x00);
    });
}

fn setup() -> (Tia, HeadlessHost) {
    let mut tia = Tia::new(TiaConfig::default(), Box::new(NullSound));
    let mut host = HeadlessHost::new();
    poke(&mut tia, &mut host, 0, write::NUSIZ0, 0x03);
    poke(&mut tia, &mut host, 0, write::COLUP0, 0x46);
    poke(&mut tia, &mut host, 0, write::COLUPF, 0x88);
    poke(&mut tia, &mut host, 30, write::RESP0, 0);
    poke(&mut tia, &mut host, 40, write::RESBL, 0);
    poke(&mut tia, &mut host, 41, write::HMP0, 0xF0);
    (tia, host)
}

fn bench_full_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("tia_frame");

    for writes in [0u32, 4, 16].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(writes), writes, |b, &writes| {
            let (mut tia, mut host) = setup();
            b.iter(|| {
                run_frame(&mut tia, &mut host, writes);
                black_box(tia.current_frame_buffer()[80 * 160]);
            });
        });
    }

    group.finish();
}

fn bench_background_scanlines(c: &mut Criterion) {
    c.bench_function("tia_update_frame_262_lines", |b| {
        let (mut tia, mut host) = setup();
        b.iter(|| {
            host.at(0);
            tia.frame_reset(&host);
            tia.update_frame(black_box(262 * 228));
            black_box(tia.collision());
        });
    });
}

criterion_group!(benches, bench_full_frame, bench_background_scanlines);
criterion_main!(benches);
