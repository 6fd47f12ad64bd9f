//! Register addresses and bit assignments.

/// Write registers, after masking the address with `0x3F`.
pub mod write {
    pub const VSYNC: u8 = 0x00;
    pub const VBLANK: u8 = 0x01;
    pub const WSYNC: u8 = 0x02;
    pub const RSYNC: u8 = 0x03;
    pub const NUSIZ0: u8 = 0x04;
    pub const NUSIZ1: u8 = 0x05;
    pub const COLUP0: u8 = 0x06;
    pub const COLUP1: u8 = 0x07;
    pub const COLUPF: u8 = 0x08;
    pub const COLUBK: u8 = 0x09;
    pub const CTRLPF: u8 = 0x0A;
    pub const REFP0: u8 = 0x0B;
    pub const REFP1: u8 = 0x0C;
    pub const PF0: u8 = 0x0D;
    pub const PF1: u8 = 0x0E;
    pub const PF2: u8 = 0x0F;
    pub const RESP0: u8 = 0x10;
    pub const RESP1: u8 = 0x11;
    pub const RESM0: u8 = 0x12;
    pub const RESM1: u8 = 0x13;
    pub const RESBL: u8 = 0x14;
    pub const AUDC0: u8 = 0x15;
    pub const AUDC1: u8 = 0x16;
    pub const AUDF0: u8 = 0x17;
    pub const AUDF1: u8 = 0x18;
    pub const AUDV0: u8 = 0x19;
    pub const AUDV1: u8 = 0x1A;
    pub const GRP0: u8 = 0x1B;
    pub const GRP1: u8 = 0x1C;
    pub const ENAM0: u8 = 0x1D;
    pub const ENAM1: u8 = 0x1E;
    pub const ENABL: u8 = 0x1F;
    pub const HMP0: u8 = 0x20;
    pub const HMP1: u8 = 0x21;
    pub const HMM0: u8 = 0x22;
    pub const HMM1: u8 = 0x23;
    pub const HMBL: u8 = 0x24;
    pub const VDELP0: u8 = 0x25;
    pub const VDELP1: u8 = 0x26;
    pub const VDELBL: u8 = 0x27;
    pub const RESMP0: u8 = 0x28;
    pub const RESMP1: u8 = 0x29;
    pub const HMOVE: u8 = 0x2A;
    pub const HMCLR: u8 = 0x2B;
    pub const CXCLR: u8 = 0x2C;
}

/// Read registers, after masking the address with `0x0F`.
pub mod read {
    pub const CXM0P: u8 = 0x00;
    pub const CXM1P: u8 = 0x01;
    pub const CXP0FB: u8 = 0x02;
    pub const CXP1FB: u8 = 0x03;
    pub const CXM0FB: u8 = 0x04;
    pub const CXM1FB: u8 = 0x05;
    pub const CXBLPF: u8 = 0x06;
    pub const CXPPMM: u8 = 0x07;
    pub const INPT0: u8 = 0x08;
    pub const INPT1: u8 = 0x09;
    pub const INPT2: u8 = 0x0A;
    pub const INPT3: u8 = 0x0B;
    pub const INPT4: u8 = 0x0C;
    pub const INPT5: u8 = 0x0D;
}

/// Chip-select decode: the TIA answers whenever A12 and A7 are both low.
#[inline]
pub fn is_tia_address(addr: u16) -> bool {
    addr & 0x1080 == 0
}

/// Object bits of the per-pixel enable mask. `SCORE` and `PRIORITY` share the
/// byte and come from CTRLPF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TiaBit {
    P0 = 0x01,
    M0 = 0x02,
    P1 = 0x04,
    M1 = 0x08,
    BL = 0x10,
    PF = 0x20,
}

impl TiaBit {
    pub const ALL: [TiaBit; 6] = [
        TiaBit::P0,
        TiaBit::M0,
        TiaBit::P1,
        TiaBit::M1,
        TiaBit::BL,
        TiaBit::PF,
    ];

    #[inline]
    pub fn mask(self) -> u8 {
        self as u8
    }

    /// Collision pairs this object takes part in.
    pub fn collision_pairs(self) -> u16 {
        use collision::*;
        match self {
            TiaBit::P0 => M0P0 | M1P0 | P0PF | P0BL | P0P1,
            TiaBit::P1 => M0P1 | M1P1 | P1PF | P1BL | P0P1,
            TiaBit::M0 => M0P0 | M0P1 | M0PF | M0BL | M0M1,
            TiaBit::M1 => M1P0 | M1P1 | M1PF | M1BL | M0M1,
            TiaBit::BL => P0BL | P1BL | M0BL | M1BL | BLPF,
            TiaBit::PF => P0PF | P1PF | M0PF | M1PF | BLPF,
        }
    }
}

pub const SCORE_BIT: u8 = 0x40;
pub const PRIORITY_BIT: u8 = 0x80;

/// Slots in the color table, also the output of the priority encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ColorIndex {
    P0 = 0,
    P1 = 1,
    PF = 2,
    BK = 3,
    M0 = 4,
    M1 = 5,
    BL = 6,
    HBlank = 7,
}

/// Collision pair bits, as latched by the renderer.
pub mod collision {
    pub const M0P1: u16 = 1 << 0;
    pub const M0P0: u16 = 1 << 1;
    pub const M1P0: u16 = 1 << 2;
    pub const M1P1: u16 = 1 << 3;
    pub const P0PF: u16 = 1 << 4;
    pub const P0BL: u16 = 1 << 5;
    pub const P1PF: u16 = 1 << 6;
    pub const P1BL: u16 = 1 << 7;
    pub const M0PF: u16 = 1 << 8;
    pub const M0BL: u16 = 1 << 9;
    pub const M1PF: u16 = 1 << 10;
    pub const M1BL: u16 = 1 << 11;
    pub const BLPF: u16 = 1 << 12;
    pub const P0P1: u16 = 1 << 13;
    pub const M0M1: u16 = 1 << 14;

    /// The two collision bits reported by each read register, as (bit 7, bit 6).
    /// CXBLPF only reports bit 7.
    pub const READ_PAIRS: [(u16, u16); 8] = [
        (M0P1, M0P0),
        (M1P0, M1P1),
        (P0PF, P0BL),
        (P1PF, P1BL),
        (M0PF, M0BL),
        (M1PF, M1BL),
        (BLPF, 0),
        (P0P1, M0M1),
    ];
}
