//! User commands accepted by the input task

/// One user action on the running pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    ScaleUp,
    ScaleDown,
    FewerBands,
    MoreBands,
    GainUp,
    GainDown,
    /// Select the analysis window by zero-based index
    SelectWindow(usize),
    Quit,
}

impl Command {
    /// Keyboard mapping used by line-oriented front ends.
    ///
    /// `+`/`-` scale, `<`/`>` band count, `]`/`/` gain, `1`..`7` window,
    /// `q` quit.
    pub fn from_key(key: char) -> Option<Self> {
        match key {
            '+' => Some(Command::ScaleUp),
            '-' => Some(Command::ScaleDown),
            '<' => Some(Command::FewerBands),
            '>' => Some(Command::MoreBands),
            ']' => Some(Command::GainUp),
            '/' => Some(Command::GainDown),
            'q' | 'Q' => Some(Command::Quit),
            '1'..='7' => Some(Command::SelectWindow(key as usize - '1' as usize)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_mapping() {
        assert_eq!(Command::from_key(']'), Some(Command::GainUp));
        assert_eq!(Command::from_key('q'), Some(Command::Quit));
        assert_eq!(Command::from_key('1'), Some(Command::SelectWindow(0)));
        assert_eq!(Command::from_key('7'), Some(Command::SelectWindow(6)));
        assert_eq!(Command::from_key('8'), None);
        assert_eq!(Command::from_key('x'), None);
    }
}
