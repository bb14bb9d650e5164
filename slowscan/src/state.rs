//! Transmission state machine.
//!
//! A [`State`] names the segment currently on air; [`State::next`] is the
//! pure transition function. What each state sounds like lives in
//! [`Segment::from_state`](crate::encoder::Segment::from_state), so the
//! grammar of a transmission and the timing table stay separate.

use crate::modes::{
    Family,
    Mode,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    /// VOX wake-up burst, eight fixed tones.
    Vox { step: u8 },
    Header { header_state: HeaderState },
    Line { y: usize, line_state: LineState },
    /// FSKID trailer, one 6-bit symbol per payload byte.
    Fskid { byte: usize, bit: u8 },
}

impl State {
    pub fn initial(vox_enabled: bool) -> Self {
        if vox_enabled {
            State::Vox { step: 0 }
        }
        else {
            State::Header {
                header_state: HeaderState::Leader1,
            }
        }
    }

    pub fn next(&self, mode: &Mode, fskid_len: usize) -> Option<Self> {
        let mut state = *self;
        match &mut state {
            Self::Vox { step } => {
                *step += 1;
                if usize::from(*step) == crate::VOX_SEGMENTS.len() {
                    state = State::Header {
                        header_state: HeaderState::Leader1,
                    };
                }
            }
            Self::Header { header_state } => {
                match header_state {
                    HeaderState::Leader1 => *header_state = HeaderState::LeaderBreak,
                    HeaderState::LeaderBreak => *header_state = HeaderState::Leader2,
                    HeaderState::Leader2 => *header_state = HeaderState::VisStart,
                    HeaderState::VisStart => {
                        *header_state = HeaderState::VisBit { bit: 0 };
                    }
                    HeaderState::VisBit { bit } => {
                        *bit += 1;
                        if *bit == 8 {
                            *header_state = HeaderState::VisStop;
                        }
                    }
                    HeaderState::VisStop => {
                        state = State::Line {
                            y: 0,
                            line_state: LineState::start(mode),
                        };
                    }
                }
            }
            Self::Line { y, line_state } => {
                if let Some(next_line_state) = line_state.next(mode) {
                    *line_state = next_line_state;
                }
                else {
                    *y += line_step(mode);
                    if finished(mode, *y) {
                        return end_of_image(fskid_len);
                    }
                    *line_state = LineState::start(mode);
                }
            }
            Self::Fskid { byte, bit } => {
                *bit += 1;
                if *bit == 6 {
                    *bit = 0;
                    *byte += 1;
                    if *byte == fskid_len {
                        return None;
                    }
                }
            }
        }

        Some(state)
    }
}

fn line_step(mode: &Mode) -> usize {
    match mode.family {
        Family::Pd { .. } => 2,
        _ => 1,
    }
}

fn finished(mode: &Mode, y: usize) -> bool {
    match mode.family {
        // a PD line consumes the source row pair (y, y + 1); an odd
        // trailing row is dropped
        Family::Pd { .. } => y + 1 >= mode.height,
        _ => y >= mode.height,
    }
}

fn end_of_image(fskid_len: usize) -> Option<State> {
    (fskid_len > 0).then_some(State::Fskid { byte: 0, bit: 0 })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeaderState {
    Leader1,
    LeaderBreak,
    Leader2,
    VisStart,
    /// Bits 0..7 are the VIS code LSB-first, bit 7 the parity bit.
    VisBit { bit: u8 },
    VisStop,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineState {
    /// Top-of-line sync pulse for modes with `sync_ms > 0`.
    Sync,

    GrayScan { x: usize },

    /// Porch gap before channel `channel`; index 3 is the gap closing
    /// the line after red.
    MartinGap { channel: usize },
    MartinScan { channel: usize, x: usize },

    /// Sync pulse in front of the red channel.
    ScottieSync,
    ScottieScan { channel: usize, x: usize },
    ScottieGap { channel: usize },

    Robot36Sync,
    Robot36SyncPorch,
    Robot36Luma { x: usize },
    /// Announces which chroma follows: R-Y on even lines, B-Y on odd.
    Robot36Separator,
    Robot36Porch,
    Robot36Chroma { x: usize },

    PdPorch,
    PdScan { block: PdBlock, x: usize },
}

/// The four pixel blocks of one transmitted PD line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PdBlock {
    UpperLuma,
    ChromaRed,
    ChromaBlue,
    LowerLuma,
}

impl PdBlock {
    fn next(self) -> Option<Self> {
        match self {
            Self::UpperLuma => Some(Self::ChromaRed),
            Self::ChromaRed => Some(Self::ChromaBlue),
            Self::ChromaBlue => Some(Self::LowerLuma),
            Self::LowerLuma => None,
        }
    }
}

impl LineState {
    pub fn start(mode: &Mode) -> Self {
        if mode.sync_ms > 0.0 {
            return LineState::Sync;
        }
        match mode.family {
            Family::Grayscale { .. } => LineState::GrayScan { x: 0 },
            Family::Martin { .. } => LineState::MartinGap { channel: 0 },
            Family::Scottie { .. } => LineState::ScottieSync,
            Family::Robot36 { .. } => LineState::Robot36Sync,
            Family::Pd { .. } => LineState::PdPorch,
        }
    }

    /// Next state within the line, or `None` once the line is complete.
    fn next(&self, mode: &Mode) -> Option<Self> {
        let width = mode.width;
        match *self {
            Self::Sync => {
                Some(match mode.family {
                    Family::Grayscale { .. } => Self::GrayScan { x: 0 },
                    Family::Martin { .. } => Self::MartinGap { channel: 0 },
                    Family::Scottie { .. } => Self::ScottieSync,
                    Family::Robot36 { .. } => Self::Robot36Sync,
                    Family::Pd { .. } => Self::PdPorch,
                })
            }

            Self::GrayScan { x } => (x + 1 < width).then_some(Self::GrayScan { x: x + 1 }),

            Self::MartinGap { channel } => {
                (channel < 3).then_some(Self::MartinScan { channel, x: 0 })
            }
            Self::MartinScan { channel, x } => {
                Some(if x + 1 < width {
                    Self::MartinScan { channel, x: x + 1 }
                }
                else {
                    Self::MartinGap {
                        channel: channel + 1,
                    }
                })
            }

            Self::ScottieSync => Some(Self::ScottieScan { channel: 0, x: 0 }),
            Self::ScottieScan { channel, x } => {
                if x + 1 < width {
                    Some(Self::ScottieScan { channel, x: x + 1 })
                }
                else {
                    // no gap after the blue channel
                    (channel < 2).then_some(Self::ScottieGap { channel })
                }
            }
            Self::ScottieGap { channel } => {
                Some(Self::ScottieScan {
                    channel: channel + 1,
                    x: 0,
                })
            }

            Self::Robot36Sync => Some(Self::Robot36SyncPorch),
            Self::Robot36SyncPorch => Some(Self::Robot36Luma { x: 0 }),
            Self::Robot36Luma { x } => {
                Some(if x + 1 < width {
                    Self::Robot36Luma { x: x + 1 }
                }
                else {
                    Self::Robot36Separator
                })
            }
            Self::Robot36Separator => Some(Self::Robot36Porch),
            Self::Robot36Porch => Some(Self::Robot36Chroma { x: 0 }),
            Self::Robot36Chroma { x } => (x + 1 < width).then_some(Self::Robot36Chroma { x: x + 1 }),

            Self::PdPorch => {
                Some(Self::PdScan {
                    block: PdBlock::UpperLuma,
                    x: 0,
                })
            }
            Self::PdScan { block, x } => {
                if x + 1 < width {
                    Some(Self::PdScan { block, x: x + 1 })
                }
                else {
                    block.next().map(|block| Self::PdScan { block, x: 0 })
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        modes::Mode,
        state::{
            HeaderState,
            LineState,
            State,
        },
    };

    fn run(mode: &Mode, fskid_len: usize, vox: bool) -> Vec<State> {
        let mut states = Vec::new();
        let mut state = Some(State::initial(vox));
        while let Some(current) = state {
            states.push(current);
            state = current.next(mode, fskid_len);
        }
        states
    }

    #[test]
    fn header_is_thirteen_states() {
        let states = run(&Mode::R8BW, 0, false);
        assert!(matches!(
            states[0],
            State::Header {
                header_state: HeaderState::Leader1
            }
        ));
        assert!(matches!(
            states[12],
            State::Header {
                header_state: HeaderState::VisStop
            }
        ));
        assert!(matches!(states[13], State::Line { y: 0, .. }));
    }

    #[test]
    fn vox_prepends_eight_states() {
        let states = run(&Mode::R8BW, 0, true);
        assert!(matches!(states[0], State::Vox { step: 0 }));
        assert!(matches!(states[7], State::Vox { step: 7 }));
        assert!(matches!(
            states[8],
            State::Header {
                header_state: HeaderState::Leader1
            }
        ));
    }

    #[test]
    fn grayscale_line_count() {
        let states = run(&Mode::R8BW, 0, false);
        let lines = states
            .iter()
            .filter(|state| {
                matches!(
                    state,
                    State::Line {
                        line_state: LineState::Sync,
                        ..
                    }
                )
            })
            .count();
        assert_eq!(lines, 120);
    }

    #[test]
    fn pd_advances_two_rows_per_line() {
        let states = run(&Mode::PD90, 0, false);
        let mut line_starts = states.iter().filter_map(|state| {
            match state {
                State::Line {
                    y,
                    line_state: LineState::Sync,
                } => Some(*y),
                _ => None,
            }
        });
        assert_eq!(line_starts.next(), Some(0));
        assert_eq!(line_starts.next(), Some(2));
        assert_eq!(line_starts.clone().count(), 126);
        assert_eq!(line_starts.last(), Some(254));
    }

    #[test]
    fn fskid_trailer_states() {
        let states = run(&Mode::R8BW, 2, false);
        let trailer: Vec<_> = states
            .iter()
            .filter(|state| matches!(state, State::Fskid { .. }))
            .collect();
        assert_eq!(trailer.len(), 12);
        assert_eq!(*trailer[0], State::Fskid { byte: 0, bit: 0 });
        assert_eq!(*trailer[11], State::Fskid { byte: 1, bit: 5 });
    }
}
