//! # Scales
//!
//! A scale is a set of allowed pitch classes. Notes that fall outside the selected scale are moved down to the
//! nearest allowed note below them, in keeping with the round-down behavior of the quantizer.

/// The scales that can be selected with the control pot are represented here.
///
/// The discriminant is the pot position that selects the scale.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Chromatic = 0,
    Ionian = 1,
    Dorian = 2,
    Phrygian = 3,
    Lydian = 4,
    Mixolydian = 5,
    Aeolian = 6,
    Locrian = 7,
}

impl Mode {
    /// `Mode::from_index(i)` is the scale selected by pot position `i`, wrapping past the last scale.
    pub fn from_index(index: u16) -> Self {
        match index % 8 {
            0 => Mode::Chromatic,
            1 => Mode::Ionian,
            2 => Mode::Dorian,
            3 => Mode::Phrygian,
            4 => Mode::Lydian,
            5 => Mode::Mixolydian,
            6 => Mode::Aeolian,
            _ => Mode::Locrian,
        }
    }

    /// `m.intervals()` is the 12 bit pattern of the mode relative to its tonic.
    ///
    /// Bit `n` is set when the note `n` semitones above the tonic belongs to the mode.
    fn intervals(self) -> u16 {
        match self {
            Mode::Chromatic => 0b1111_1111_1111,
            // W W H W W W H
            Mode::Ionian => 0b1010_1011_0101,
            // W H W W W H W
            Mode::Dorian => 0b0110_1010_1101,
            // H W W W H W W
            Mode::Phrygian => 0b0101_1010_1011,
            // W W W H W W H
            Mode::Lydian => 0b1010_1101_0101,
            // W W H W W H W
            Mode::Mixolydian => 0b0110_1011_0101,
            // W H W W H W W
            Mode::Aeolian => 0b0101_1010_1101,
            // H W W H W W W
            Mode::Locrian => 0b0101_0110_1011,
        }
    }
}

/// A set of allowed pitch classes is represented here.
///
/// The 12 lowest bits stand for the 12 semitones of an octave, counted up from the base of the pitch table. A set bit
/// means the note is allowed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScaleMask(u16);

impl ScaleMask {
    /// Every note allowed.
    pub const CHROMATIC: Self = Self(ALL_NOTES);

    /// `ScaleMask::new(bits)` is a mask from the lowest 12 bits of `bits`.
    pub const fn new(bits: u16) -> Self {
        Self(bits & ALL_NOTES)
    }

    /// `ScaleMask::for_mode(m, r)` is mode `m` with its tonic `r` semitones above the base of the pitch table.
    pub fn for_mode(mode: Mode, root: u8) -> Self {
        let pattern = mode.intervals();
        let shift = (root % 12) as u32;
        // 12 bit left rotation moves the tonic from bit 0 to bit `root`
        Self(((pattern << shift) | (pattern >> (12 - shift))) & ALL_NOTES)
    }

    pub fn bits(&self) -> u16 {
        self.0
    }

    /// `mask.is_allowed(i)` is true iff pitch table entry `i` belongs to the scale.
    pub fn is_allowed(&self, index: usize) -> bool {
        self.0 >> (index % 12) & 1 == 1
    }

    /// `mask.floor_to_allowed(i)` is the nearest allowed pitch table index at or below `i`.
    ///
    /// The search walks down at most one octave. Index zero is always accepted as the bottom of the range, and
    /// `None` means the walk ran off the bottom of the table (or the mask allows nothing).
    pub fn floor_to_allowed(&self, index: usize) -> Option<usize> {
        if index == 0 || self.is_allowed(index) {
            return Some(index);
        }

        let lowest = index.saturating_sub(12);
        (lowest..index).rev().find(|i| self.is_allowed(*i))
    }
}

impl Default for ScaleMask {
    fn default() -> Self {
        Self::CHROMATIC
    }
}

const ALL_NOTES: u16 = 0b1111_1111_1111;
