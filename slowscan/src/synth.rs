//! Segment-to-PCM synthesis.
//!
//! [`ToneSynth`] walks a segment stream with a single phase accumulator,
//! so consecutive tones of different frequency join without a phase jump.
//! A fractional-sample carry keeps the emitted sample count aligned with
//! the nominal segment durations over arbitrarily long transmissions.
//! [`PcmSamples`] quantizes the float stream to 8 or 16 bit integers with
//! a seeded dither ring.

use std::f64::consts::TAU;

use rand::{
    distributions::{
        Distribution,
        Uniform,
    },
    rngs::SmallRng,
    SeedableRng,
};

use crate::encoder::Segment;

pub const DITHER_RING_LEN: usize = 1024;

/// `b"slowscan"` as a little-endian integer. Any fixed value works; it
/// only has to stay fixed so identical inputs give identical output.
pub const DEFAULT_DITHER_SEED: u64 = u64::from_le_bytes(*b"slowscan");

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BitDepth {
    Eight,
    Sixteen,
}

impl BitDepth {
    #[inline]
    pub fn new(bits: u32) -> Option<Self> {
        match bits {
            8 => Some(Self::Eight),
            16 => Some(Self::Sixteen),
            _ => None,
        }
    }

    #[inline]
    pub fn bits(&self) -> u32 {
        match self {
            Self::Eight => 8,
            Self::Sixteen => 16,
        }
    }

    /// `2^(bits − 1)`, the magnitude of the most negative sample.
    #[inline]
    fn amplitude(&self) -> f64 {
        match self {
            Self::Eight => 128.0,
            Self::Sixteen => 32768.0,
        }
    }
}

/// Phase-accumulating sine oscillator over a segment stream.
///
/// The phase at the start of a segment equals the phase at the end of the
/// previous one, so frequency transitions produce no clicks. Durations
/// that don't land on a sample boundary carry their fraction into the
/// next segment instead of truncating.
#[derive(Clone, Debug)]
pub struct ToneSynth<I> {
    segments: I,
    sample_rate: f64,
    phase: f64,
    step: f64,
    accumulator: f64,
    remaining: usize,
    silence: bool,
}

impl<I> ToneSynth<I> {
    pub fn new(segments: I, sample_rate: f64) -> Self {
        Self {
            segments,
            sample_rate,
            phase: 0.0,
            step: 0.0,
            accumulator: 0.0,
            remaining: 0,
            silence: false,
        }
    }

    #[inline]
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    fn begin_segment(&mut self, segment: Segment) {
        self.accumulator += segment.duration_ms * self.sample_rate / 1000.0;
        let count = self.accumulator.floor();
        self.accumulator -= count;
        self.remaining = count as usize;
        match segment.frequency {
            Some(frequency) => {
                self.silence = false;
                self.step = (TAU * frequency / self.sample_rate).rem_euclid(TAU);
            }
            None => {
                self.silence = true;
                self.step = 0.0;
            }
        }
    }
}

impl<I> Iterator for ToneSynth<I>
where
    I: Iterator<Item = Segment>,
{
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        loop {
            if self.remaining > 0 {
                self.remaining -= 1;
                if self.silence {
                    return Some(0.0);
                }
                let output = self.phase.sin();
                self.phase += self.step;
                if self.phase > TAU {
                    self.phase -= TAU;
                }
                return Some(output);
            }
            let segment = self.segments.next()?;
            self.begin_segment(segment);
        }
    }
}

/// Quantizer with a fixed ring of uniform dither values in (−0.5, 0.5),
/// advanced one slot per sample. The dither is scaled by `1 / 2^bits`
/// before rounding; the scaling is inherited as-is from the original
/// signal path and deliberately not normalized to ±0.5 LSB.
#[derive(Clone, Debug)]
pub struct DitherQuantizer {
    ring: Vec<f64>,
    index: usize,
    amplitude: f64,
    dither_scale: f64,
}

impl DitherQuantizer {
    pub fn new(bit_depth: BitDepth, seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let between = Uniform::new(-0.5, 0.5);
        let ring = (0..DITHER_RING_LEN)
            .map(|_| between.sample(&mut rng))
            .collect();

        Self {
            ring,
            index: 0,
            amplitude: bit_depth.amplitude(),
            dither_scale: 0.5 / bit_depth.amplitude(),
        }
    }

    #[inline]
    pub fn quantize(&mut self, value: f64) -> i16 {
        let dither = self.ring[self.index];
        self.index += 1;
        if self.index == DITHER_RING_LEN {
            self.index = 0;
        }

        let quantized = (value * self.amplitude + dither * self.dither_scale).round();
        quantized.clamp(-self.amplitude, self.amplitude - 1.0) as i16
    }
}

/// Quantized PCM stream. Samples are surfaced as `i16`; an 8-bit
/// encoding stays within `[-128, 127]` and narrows losslessly at the
/// container boundary.
#[derive(Clone, Debug)]
pub struct PcmSamples<I> {
    synth: ToneSynth<I>,
    quantizer: DitherQuantizer,
}

impl<I> PcmSamples<I> {
    pub fn new(synth: ToneSynth<I>, bit_depth: BitDepth, dither_seed: u64) -> Self {
        Self {
            synth,
            quantizer: DitherQuantizer::new(bit_depth, dither_seed),
        }
    }
}

impl<I> Iterator for PcmSamples<I>
where
    I: Iterator<Item = Segment>,
{
    type Item = i16;

    #[inline]
    fn next(&mut self) -> Option<i16> {
        let value = self.synth.next()?;
        Some(self.quantizer.quantize(value))
    }
}
