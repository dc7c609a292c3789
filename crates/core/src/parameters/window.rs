//! Analysis window selector
//!
//! The producer applies one of seven tapering windows before each analysis
//! round. Only the selection lives here; computing the window belongs to the
//! analysis collaborator.

use core::fmt;

/// Tapering window applied by the analysis stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Window {
    #[default]
    Rectangular = 0,
    Welch = 1,
    Triangular = 2,
    Bartlett = 3,
    Hanning = 4,
    Hamming = 5,
    Blackman = 6,
}

impl Window {
    /// Number of selectable windows
    pub const COUNT: usize = 7;

    pub const ALL: [Window; Window::COUNT] = [
        Window::Rectangular,
        Window::Welch,
        Window::Triangular,
        Window::Bartlett,
        Window::Hanning,
        Window::Hamming,
        Window::Blackman,
    ];

    /// Window for a zero-based selector index, `None` when out of range
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            Window::Rectangular => "Rectangular",
            Window::Welch => "Welch",
            Window::Triangular => "Triangular",
            Window::Bartlett => "Bartlett",
            Window::Hanning => "Hanning",
            Window::Hamming => "Hamming",
            Window::Blackman => "Blackman",
        }
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_round_trip() {
        for (i, w) in Window::ALL.iter().enumerate() {
            assert_eq!(w.index(), i);
            assert_eq!(Window::from_index(i), Some(*w));
        }
        assert_eq!(Window::from_index(Window::COUNT), None);
    }

    #[test]
    fn default_is_rectangular() {
        assert_eq!(Window::default(), Window::Rectangular);
        assert_eq!(Window::Hamming.to_string(), "Hamming");
    }
}
