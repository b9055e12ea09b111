//! Bounding box sectors.
//!
//! A sector describes where a point lies relative to an oriented box: either
//! `inside`, or any combination of the six half-spaces beyond its faces.
//!
//! - Plain bitmask with named constants
//! - Composite sectors (`AL`, `BRU`, ...) are unions of the base flags
//! - String codes match the sector predicates of the taxonomy
//!
//! # Key Invariants
//!
//! Sectors produced by classification never combine `I` with a side flag,
//! and never set an opposing pair (`A`/`B`, `L`/`R`, `O`/`U`).

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};


/// Bitmask of the inside state and the six half-spaces around a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BBoxSector(pub u8);

impl BBoxSector {
    pub const EMPTY: BBoxSector = BBoxSector(0);
    /// Inside the box.
    pub const I: BBoxSector = BBoxSector(1 << 0);
    /// Ahead, beyond the front face (+z).
    pub const A: BBoxSector = BBoxSector(1 << 1);
    /// Behind, beyond the back face (-z).
    pub const B: BBoxSector = BBoxSector(1 << 2);
    /// Left, beyond the +x face.
    pub const L: BBoxSector = BBoxSector(1 << 3);
    /// Right, beyond the -x face.
    pub const R: BBoxSector = BBoxSector(1 << 4);
    /// Over the top face.
    pub const O: BBoxSector = BBoxSector(1 << 5);
    /// Under the bottom face.
    pub const U: BBoxSector = BBoxSector(1 << 6);

    pub const AL: BBoxSector = BBoxSector(Self::A.0 | Self::L.0);
    pub const AR: BBoxSector = BBoxSector(Self::A.0 | Self::R.0);
    pub const BL: BBoxSector = BBoxSector(Self::B.0 | Self::L.0);
    pub const BR: BBoxSector = BBoxSector(Self::B.0 | Self::R.0);
    pub const AO: BBoxSector = BBoxSector(Self::A.0 | Self::O.0);
    pub const AU: BBoxSector = BBoxSector(Self::A.0 | Self::U.0);
    pub const BO: BBoxSector = BBoxSector(Self::B.0 | Self::O.0);
    pub const BU: BBoxSector = BBoxSector(Self::B.0 | Self::U.0);
    pub const LO: BBoxSector = BBoxSector(Self::L.0 | Self::O.0);
    pub const LU: BBoxSector = BBoxSector(Self::L.0 | Self::U.0);
    pub const RO: BBoxSector = BBoxSector(Self::R.0 | Self::O.0);
    pub const RU: BBoxSector = BBoxSector(Self::R.0 | Self::U.0);
    pub const ALO: BBoxSector = BBoxSector(Self::AL.0 | Self::O.0);
    pub const ARO: BBoxSector = BBoxSector(Self::AR.0 | Self::O.0);
    pub const BLO: BBoxSector = BBoxSector(Self::BL.0 | Self::O.0);
    pub const BRO: BBoxSector = BBoxSector(Self::BR.0 | Self::O.0);
    pub const ALU: BBoxSector = BBoxSector(Self::AL.0 | Self::U.0);
    pub const ARU: BBoxSector = BBoxSector(Self::AR.0 | Self::U.0);
    pub const BLU: BBoxSector = BBoxSector(Self::BL.0 | Self::U.0);
    pub const BRU: BBoxSector = BBoxSector(Self::BR.0 | Self::U.0);

    /// Base flags in code order.
    const BASE: [(BBoxSector, char); 7] = [
        (Self::I, 'i'),
        (Self::A, 'a'),
        (Self::B, 'b'),
        (Self::L, 'l'),
        (Self::R, 'r'),
        (Self::O, 'o'),
        (Self::U, 'u'),
    ];

    pub fn bits(&self) -> u8 {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// True if every flag of `other` is set.
    pub fn contains(&self, other: BBoxSector) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: BBoxSector) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: BBoxSector) {
        self.0 &= !other.0;
    }

    /// Number of directions the sector deviates from the inner zone.
    pub fn divergencies(&self) -> u32 {
        if self.contains(Self::I) {
            return 0;
        }
        self.0.count_ones()
    }

    /// Lower-case code of the set flags, e.g. `"al"`. Empty for no flags.
    pub fn code(&self) -> String {
        Self::BASE
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, c)| *c)
            .collect()
    }
}

impl BitOr for BBoxSector {
    type Output = BBoxSector;

    fn bitor(self, rhs: BBoxSector) -> BBoxSector {
        BBoxSector(self.0 | rhs.0)
    }
}

impl BitOrAssign for BBoxSector {
    fn bitor_assign(&mut self, rhs: BBoxSector) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for BBoxSector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "no sector")
        } else {
            write!(f, "{}", self.code())
        }
    }
}
