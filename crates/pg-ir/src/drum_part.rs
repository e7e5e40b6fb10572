//! Drum parts: the independent trigger channels of the pattern oracle.

use core::fmt;

/// Number of drum parts the oracle triggers.
pub const NUM_PARTS: usize = 3;

/// One trigger channel of the pattern oracle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DrumPart {
    /// Low percussion (bass drum role).
    #[default]
    Bd,
    /// Mid percussion (snare role).
    Sd,
    /// High percussion (hi-hat role).
    Hh,
}

impl DrumPart {
    /// All parts in bit order.
    pub const ALL: [DrumPart; NUM_PARTS] = [DrumPart::Bd, DrumPart::Sd, DrumPart::Hh];

    /// Bit index of this part in a trigger bitmask.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Single-bit mask for this part.
    pub const fn mask(self) -> u8 {
        1 << self as u8
    }

    /// Part for a bit index, if in range.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Short display label.
    pub const fn label(self) -> &'static str {
        match self {
            DrumPart::Bd => "BD",
            DrumPart::Sd => "SD",
            DrumPart::Hh => "HH",
        }
    }
}

impl fmt::Display for DrumPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_are_distinct_bits() {
        assert_eq!(DrumPart::Bd.mask(), 0b001);
        assert_eq!(DrumPart::Sd.mask(), 0b010);
        assert_eq!(DrumPart::Hh.mask(), 0b100);
    }

    #[test]
    fn from_index_round_trips() {
        for part in DrumPart::ALL {
            assert_eq!(DrumPart::from_index(part.index()), Some(part));
        }
        assert_eq!(DrumPart::from_index(NUM_PARTS), None);
    }
}
