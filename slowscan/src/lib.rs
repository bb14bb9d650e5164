//! Offline SSTV encoder: image in, frequency-modulated audio out.
//!
//! The pipeline has three layers, each a pull iterator over the previous
//! one: a [`Mode`](modes::Mode) descriptor selects per-mode timing
//! constants, [`Segments`](encoder::Segments) turns the descriptor and a
//! [`FrameBuffer`](image::FrameBuffer) into a stream of
//! `(frequency, duration)` tone segments, and
//! [`PcmSamples`](synth::PcmSamples) synthesizes those into dithered
//! integer samples with a phase-continuous sine oscillator.
//!
//! All durations are milliseconds, all frequencies Hz.
//!
//! # References
//!
//! - <http://lionel.cordesses.free.fr/gpages/sstv.html>
//! - <http://www.barberdsp.com/downloads/Dayton%20Paper.pdf>
//! - <https://web.archive.org/web/20120313215600/http://lionel.cordesses.free.fr/gpages/Cordesses.pdf>

pub mod encoder;
pub mod image;
pub mod modes;
pub mod sink;
pub mod state;
pub mod synth;
mod util;

pub use encoder::{
    byte_to_frequency,
    EncodeError,
    Segment,
    Segments,
    SstvEncoder,
};
pub use modes::{
    Family,
    Mode,
    VisCode,
};
pub use synth::{
    BitDepth,
    PcmSamples,
    ToneSynth,
};

pub const LEADER_TONE: f64 = 1900.0;
pub const LEADER_TIME: f64 = 300.0;

pub const LEADER_BREAK_TIME: f64 = 10.0;

pub const VIS_BIT_TIME: f64 = 30.0;
pub const VIS_LOW_TONE: f64 = 1300.0;
pub const VIS_HIGH_TONE: f64 = 1100.0;

// leader break, vis start/stop, horizontal sync
pub const SYNC_TONE: f64 = 1200.0;

pub const PORCH_TONE: f64 = 1500.0;

pub const CHANNEL_LOW_TONE: f64 = 1500.0;
pub const CHANNEL_HIGH_TONE: f64 = 2300.0;

pub const FSKID_BIT_TIME: f64 = 22.0;
pub const FSKID_HIGH_TONE: f64 = 1900.0;
pub const FSKID_LOW_TONE: f64 = 2100.0;

/// Alternating tone burst that wakes voice-operated transmitters before
/// the VIS header.
pub const VOX_SEGMENTS: [(f64, f64); 8] = [
    (1900.0, 100.0),
    (1500.0, 100.0),
    (1900.0, 100.0),
    (1500.0, 100.0),
    (2300.0, 100.0),
    (1500.0, 100.0),
    (2300.0, 100.0),
    (1500.0, 100.0),
];
