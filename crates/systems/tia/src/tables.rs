//! Precomputed lookup tables shared by every TIA instance.
//!
//! The tables are built on first use and never change afterwards; each
//! [`crate::Tia`] holds a `&'static` reference obtained from [`tables()`].
//!
//! The object mask tables are 320 entries wide per row so that a row can be
//! addressed at `160 - (pos & 0xFC) + hpos` without wrapping. The low two
//! bits of the position select one of four pre-shifted alignments.

use std::sync::OnceLock;

use crate::registers::{collision::*, TiaBit};

const ROW: usize = 320;
const ALIGNMENTS: usize = 4;
const NUSIZ_MODES: usize = 8;
const MISSILE_SIZES: usize = 4;
const BALL_SIZES: usize = 4;

/// Copy offsets (in pixels) for each NUSIZ number/size code. Double and
/// quad width players draw a single copy.
const COPY_OFFSETS: [&[usize]; NUSIZ_MODES] = [
    &[0],
    &[0, 16],
    &[0, 32],
    &[0, 16, 32],
    &[0, 64],
    &[0],
    &[0, 32, 64],
    &[0],
];

/// How a player reset relates to the copies drawn at the old position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i8)]
pub enum ResetTiming {
    /// Inside the start-up delay of a copy; the first copy is still drawn
    Delay = -1,
    /// Between copies; the first copy is suppressed
    Gap = 0,
    /// While a copy is being displayed; drawing catches up first, then the
    /// first copy is suppressed
    Display = 1,
}

pub struct TiaTables {
    /// Player masks: `[align][suppress][nusiz][320]`, one graphics bit per pixel
    player_mask: Vec<u8>,
    /// Missile masks: `[align][nusiz][size][320]`
    missile_mask: Vec<bool>,
    /// Ball masks: `[align][size][320]`
    ball_mask: Vec<bool>,
    /// Playfield bit for each pixel, `[reflected][160]`
    playfield_mask: [[u32; 160]; 2],
    /// Player reset classification: `[nusiz][old pos][new pos]`
    player_reset_when: Vec<ResetTiming>,
    /// Collision bits for each combination of object enable bits
    collision_mask: [u16; 64],
    /// Bit-reversed graphics bytes for REFPx
    grp_reflect: [u8; 256],
    /// Whether an HMOVE on each CPU cycle of a scanline produces the HMOVE blank
    hmove_blank_enable: [bool; 76],
    /// Extra clocks drawn before a register write takes effect, indexed by
    /// write address; `None` marks the playfield registers, which use
    /// [`TiaTables::playfield_delay`]
    poke_delay: [Option<i32>; 64],
}

/// Lazily built tables for the whole process
pub fn tables() -> &'static TiaTables {
    static TABLES: OnceLock<TiaTables> = OnceLock::new();
    TABLES.get_or_init(TiaTables::build)
}

impl TiaTables {
    fn build() -> Self {
        Self {
            player_mask: build_player_mask(),
            missile_mask: build_missile_mask(),
            ball_mask: build_ball_mask(),
            playfield_mask: build_playfield_mask(),
            player_reset_when: build_player_reset_when(),
            collision_mask: build_collision_mask(),
            grp_reflect: std::array::from_fn(|i| (i as u8).reverse_bits()),
            hmove_blank_enable: std::array::from_fn(|cycle| cycle <= 20 || cycle == 75),
            poke_delay: build_poke_delay(),
        }
    }

    /// Start of the player mask row for a position; index with `+ hpos`.
    #[inline]
    pub fn player_row(&self, pos: i32, suppress: bool, nusiz: u8) -> usize {
        let row = ((pos as usize & 3) * 2 + suppress as usize) * NUSIZ_MODES + (nusiz & 7) as usize;
        row * ROW + 160 - (pos as usize & 0xFC)
    }

    #[inline]
    pub fn player_bits(&self, row: usize, hpos: usize) -> u8 {
        self.player_mask[row + hpos]
    }

    /// Start of the missile mask row for a position; index with `+ hpos`.
    #[inline]
    pub fn missile_row(&self, pos: i32, nusiz: u8, size: u8) -> usize {
        let row = ((pos as usize & 3) * NUSIZ_MODES + (nusiz & 7) as usize) * MISSILE_SIZES
            + (size & 3) as usize;
        row * ROW + 160 - (pos as usize & 0xFC)
    }

    #[inline]
    pub fn missile_bit(&self, row: usize, hpos: usize) -> bool {
        self.missile_mask[row + hpos]
    }

    /// Start of the ball mask row for a position; index with `+ hpos`.
    #[inline]
    pub fn ball_row(&self, pos: i32, size: u8) -> usize {
        let row = (pos as usize & 3) * BALL_SIZES + (size & 3) as usize;
        row * ROW + 160 - (pos as usize & 0xFC)
    }

    #[inline]
    pub fn ball_bit(&self, row: usize, hpos: usize) -> bool {
        self.ball_mask[row + hpos]
    }

    #[inline]
    pub fn playfield_bit(&self, reflected: bool, hpos: usize) -> u32 {
        self.playfield_mask[reflected as usize][hpos]
    }

    #[inline]
    pub fn player_reset_when(&self, nusiz: u8, old_pos: i32, new_pos: i32) -> ResetTiming {
        self.player_reset_when
            [((nusiz & 7) as usize * 160 + old_pos as usize) * 160 + new_pos as usize]
    }

    #[inline]
    pub fn collisions(&self, enabled: u8) -> u16 {
        self.collision_mask[(enabled & 0x3F) as usize]
    }

    #[inline]
    pub fn reflect(&self, grp: u8) -> u8 {
        self.grp_reflect[grp as usize]
    }

    #[inline]
    pub fn hmove_blank_enabled(&self, cycle: usize) -> bool {
        self.hmove_blank_enable[cycle % 76]
    }

    #[inline]
    pub fn poke_delay(&self, addr: u8) -> Option<i32> {
        self.poke_delay[(addr & 0x3F) as usize]
    }

    /// Propagation delay for PF0-PF2 writes, by CPU cycle within the scanline
    #[inline]
    pub fn playfield_delay(&self, cycle: usize) -> i32 {
        const DELAY: [i32; 4] = [4, 5, 2, 3];
        DELAY[cycle & 3]
    }
}

/// Build the alignment-0 rows with `fill`, mirror them into the wrap-around
/// half, then derive alignments 1..3 by shifting right one pixel each.
fn build_aligned<T: Copy + Default>(rows: usize, mut fill: impl FnMut(usize, &mut [T])) -> Vec<T> {
    let mut table = vec![T::default(); ALIGNMENTS * rows * ROW];
    for r in 0..rows {
        let row = &mut table[r * ROW..(r + 1) * ROW];
        fill(r, row);
        row.copy_within(0..160, 160);
    }
    for align in 1..ALIGNMENTS {
        for r in 0..rows {
            for x in 0..ROW {
                table[(align * rows + r) * ROW + x] = table[r * ROW + (x + ROW - align) % ROW];
            }
        }
    }
    table
}

fn build_player_mask() -> Vec<u8> {
    build_aligned(2 * NUSIZ_MODES, |r, row| {
        let suppress = r / NUSIZ_MODES == 1;
        let mode = r % NUSIZ_MODES;
        for x in 0..160 + 72 {
            let bits = match mode {
                5 if !suppress && (1..=16).contains(&x) => 0x80 >> ((x - 1) / 2),
                7 if !suppress && (1..=32).contains(&x) => 0x80 >> ((x - 1) / 4),
                5 | 7 => 0,
                _ => COPY_OFFSETS[mode]
                    .iter()
                    .enumerate()
                    .filter(|&(copy, _)| copy > 0 || !suppress)
                    .find(|&(_, &o)| x >= o && x < o + 8)
                    .map_or(0, |(_, &o)| 0x80 >> (x - o)),
            };
            if bits != 0 {
                row[x % 160] = bits;
            }
        }
    })
}

fn build_missile_mask() -> Vec<bool> {
    build_aligned(NUSIZ_MODES * MISSILE_SIZES, |r, row| {
        let mode = r / MISSILE_SIZES;
        let width = 1 << (r % MISSILE_SIZES);
        for x in 0..160 + 72 {
            if COPY_OFFSETS[mode].iter().any(|&o| x >= o && x < o + width) {
                row[x % 160] = true;
            }
        }
    })
}

fn build_ball_mask() -> Vec<bool> {
    build_aligned(BALL_SIZES, |size, row| {
        row[..1 << size].fill(true);
    })
}

fn build_playfield_mask() -> [[u32; 160]; 2] {
    let normal = |x: usize| -> u32 {
        match x {
            0..=15 => 1 << (x >> 2),
            16..=47 => 0x800 >> ((x - 16) >> 2),
            48..=79 => 0x1000 << ((x - 48) >> 2),
            80..=95 => 1 << ((x - 80) >> 2),
            96..=127 => 0x800 >> ((x - 96) >> 2),
            _ => 0x1000 << ((x - 128) >> 2),
        }
    };
    let reflected = |x: usize| -> u32 {
        match x {
            0..=79 => normal(x),
            80..=111 => 0x80000 >> ((x - 80) >> 2),
            112..=143 => 0x10 << ((x - 112) >> 2),
            _ => 0x08 >> ((x - 144) >> 2),
        }
    };
    [
        std::array::from_fn(normal),
        std::array::from_fn(reflected),
    ]
}

fn build_player_reset_when() -> Vec<ResetTiming> {
    let mut table = vec![ResetTiming::Gap; NUSIZ_MODES * 160 * 160];
    for mode in 0..NUSIZ_MODES {
        let width = match mode {
            5 => 16,
            7 => 32,
            _ => 8,
        };
        for old in 0..160 {
            let base = (mode * 160 + old) * 160;
            for new in 0..160 + 72 + 5 {
                for &o in COPY_OFFSETS[mode] {
                    let start = old + o;
                    if new >= start && new < start + 4 {
                        table[base + new % 160] = ResetTiming::Delay;
                    } else if new >= start + 4 && new < start + 4 + width {
                        table[base + new % 160] = ResetTiming::Display;
                    }
                }
            }
        }
    }
    table
}

fn build_collision_mask() -> [u16; 64] {
    const PAIRS: [(TiaBit, TiaBit, u16); 15] = [
        (TiaBit::M0, TiaBit::P1, M0P1),
        (TiaBit::M0, TiaBit::P0, M0P0),
        (TiaBit::M1, TiaBit::P0, M1P0),
        (TiaBit::M1, TiaBit::P1, M1P1),
        (TiaBit::P0, TiaBit::PF, P0PF),
        (TiaBit::P0, TiaBit::BL, P0BL),
        (TiaBit::P1, TiaBit::PF, P1PF),
        (TiaBit::P1, TiaBit::BL, P1BL),
        (TiaBit::M0, TiaBit::PF, M0PF),
        (TiaBit::M0, TiaBit::BL, M0BL),
        (TiaBit::M1, TiaBit::PF, M1PF),
        (TiaBit::M1, TiaBit::BL, M1BL),
        (TiaBit::BL, TiaBit::PF, BLPF),
        (TiaBit::P0, TiaBit::P1, P0P1),
        (TiaBit::M0, TiaBit::M1, M0M1),
    ];
    std::array::from_fn(|enabled| {
        let enabled = enabled as u8;
        PAIRS
            .iter()
            .filter(|(a, b, _)| enabled & a.mask() != 0 && enabled & b.mask() != 0)
            .fold(0, |mask, &(_, _, bit)| mask | bit)
    })
}

fn build_poke_delay() -> [Option<i32>; 64] {
    use crate::registers::write::*;

    let mut delay = [Some(0); 64];
    for addr in [VBLANK, REFP0, REFP1, GRP0, GRP1, ENAM0, ENAM1, ENABL] {
        delay[addr as usize] = Some(1);
    }
    for addr in [PF0, PF1, PF2] {
        delay[addr as usize] = None;
    }
    delay[RESM0 as usize] = Some(8);
    delay[RESM1 as usize] = Some(8);
    delay[HMOVE as usize] = Some(3);
    delay
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player_pixels(t: &TiaTables, pos: i32, suppress: bool, nusiz: u8) -> Vec<u8> {
        let row = t.player_row(pos, suppress, nusiz);
        (0..160).map(|h| t.player_bits(row, h)).collect()
    }

    #[test]
    fn test_single_player_copy_at_position() {
        let t = tables();
        let pixels = player_pixels(t, 40, false, 0);
        for (x, &bits) in pixels.iter().enumerate() {
            if (40..48).contains(&x) {
                assert_eq!(bits, 0x80 >> (x - 40), "pixel {}", x);
            } else {
                assert_eq!(bits, 0, "pixel {}", x);
            }
        }
    }

    #[test]
    fn test_player_alignment_shifts_pattern() {
        let t = tables();
        let pixels = player_pixels(t, 41, false, 0);
        assert_eq!(pixels[40], 0);
        assert_eq!(pixels[41], 0x80);
        assert_eq!(pixels[48], 0x01);
    }

    #[test]
    fn test_three_close_copies_and_suppress() {
        let t = tables();
        let pixels = player_pixels(t, 20, false, 3);
        assert_eq!(pixels[20], 0x80);
        assert_eq!(pixels[36], 0x80);
        assert_eq!(pixels[52], 0x80);

        let suppressed = player_pixels(t, 20, true, 3);
        assert_eq!(suppressed[20], 0);
        assert_eq!(suppressed[36], 0x80);
        assert_eq!(suppressed[52], 0x80);
    }

    #[test]
    fn test_copies_wrap_around_scanline() {
        let t = tables();
        // Third copy of "3 copies medium" at 150 + 64 = 214 -> 54
        let pixels = player_pixels(t, 150, false, 6);
        assert_eq!(pixels[150], 0x80);
        assert_eq!(pixels[22], 0x80);
        assert_eq!(pixels[54], 0x80);
    }

    #[test]
    fn test_double_and_quad_player_are_delayed_one_pixel() {
        let t = tables();
        let double = player_pixels(t, 0, false, 5);
        assert_eq!(double[0], 0);
        assert_eq!(double[1], 0x80);
        assert_eq!(double[2], 0x80);
        assert_eq!(double[16], 0x01);

        let quad = player_pixels(t, 0, false, 7);
        assert_eq!(quad[4], 0x80);
        assert_eq!(quad[5], 0x40);
        assert_eq!(quad[32], 0x01);
        assert_eq!(quad[33], 0);
    }

    #[test]
    fn test_missile_sizes() {
        let t = tables();
        for size in 0..4u8 {
            let row = t.missile_row(12, 0, size);
            let width = (0..160).filter(|&h| t.missile_bit(row, h)).count();
            assert_eq!(width, 1 << size);
            assert!(t.missile_bit(row, 12));
        }
    }

    #[test]
    fn test_ball_width() {
        let t = tables();
        let row = t.ball_row(159, 3);
        let lit: Vec<usize> = (0..160).filter(|&h| t.ball_bit(row, h)).collect();
        assert_eq!(lit, vec![0, 1, 2, 3, 4, 5, 6, 159]);
    }

    #[test]
    fn test_playfield_mask_covers_twenty_bits() {
        let t = tables();
        for reflected in [false, true] {
            let mut seen = 0u32;
            for h in 0..80 {
                seen |= t.playfield_bit(reflected, h);
            }
            assert_eq!(seen, 0xFFFFF);
        }
        // Right half mirrors the left half when reflected
        assert_eq!(t.playfield_bit(true, 159), t.playfield_bit(true, 0));
        assert_eq!(t.playfield_bit(false, 80), t.playfield_bit(false, 0));
    }

    #[test]
    fn test_reset_timing_classification() {
        let t = tables();
        assert_eq!(t.player_reset_when(0, 40, 42), ResetTiming::Delay);
        assert_eq!(t.player_reset_when(0, 40, 45), ResetTiming::Display);
        assert_eq!(t.player_reset_when(0, 40, 100), ResetTiming::Gap);
        assert_eq!(t.player_reset_when(5, 40, 59), ResetTiming::Display);
    }

    #[test]
    fn test_collision_mask() {
        let t = tables();
        assert_eq!(t.collisions(0), 0);
        assert_eq!(t.collisions(TiaBit::P0.mask()), 0);
        assert_eq!(t.collisions(TiaBit::P0.mask() | TiaBit::P1.mask()), P0P1);
        assert_eq!(t.collisions(0x3F).count_ones(), 15);
    }

    #[test]
    fn test_misc_tables() {
        let t = tables();
        assert_eq!(t.reflect(0x01), 0x80);
        assert_eq!(t.reflect(0xF0), 0x0F);
        assert!(t.hmove_blank_enabled(0));
        assert!(t.hmove_blank_enabled(20));
        assert!(!t.hmove_blank_enabled(21));
        assert!(t.hmove_blank_enabled(75));
        assert_eq!(t.poke_delay(0x0D), None);
        assert_eq!(t.poke_delay(0x2A), Some(3));
        assert_eq!(t.poke_delay(0x09), Some(0));
    }
}
