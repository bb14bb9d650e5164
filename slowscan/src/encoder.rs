use std::time::Duration;

use crate::{
    image::{
        channel_value,
        quantize_unit,
        ycbcr,
        Channel,
        FrameBuffer,
    },
    modes::{
        Family,
        Mode,
    },
    state::{
        HeaderState,
        LineState,
        PdBlock,
        State,
    },
    synth::{
        BitDepth,
        PcmSamples,
        ToneSynth,
        DEFAULT_DITHER_SEED,
    },
    util::lerp,
    CHANNEL_HIGH_TONE,
    CHANNEL_LOW_TONE,
    FSKID_BIT_TIME,
    FSKID_HIGH_TONE,
    FSKID_LOW_TONE,
    LEADER_BREAK_TIME,
    LEADER_TIME,
    LEADER_TONE,
    PORCH_TONE,
    SYNC_TONE,
    VIS_BIT_TIME,
    VIS_HIGH_TONE,
    VIS_LOW_TONE,
    VOX_SEGMENTS,
};

const MARTIN_CHANNELS: [Channel; 3] = [Channel::Green, Channel::Blue, Channel::Red];
const SCOTTIE_CHANNELS: [Channel; 3] = [Channel::Red, Channel::Green, Channel::Blue];

// Robot 36 separates its chroma scan from the separator with a short
// porch at the leader frequency.
const CHROMA_PORCH_TONE: f64 = 1900.0;

/// Pixel value to scan tone: 0 is black at 1500 Hz, 255 white at 2300 Hz.
#[inline]
pub fn byte_to_frequency(value: u8) -> f64 {
    lerp(value as f64 / 255.0, CHANNEL_LOW_TONE, CHANNEL_HIGH_TONE)
}

#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
pub enum EncodeError {
    #[error("unsupported bit depth: {bits} (expected 8 or 16)")]
    UnsupportedBitDepth { bits: u32 },

    #[error("invalid sample rate: {sample_rate} Hz")]
    InvalidSampleRate { sample_rate: f64 },

    #[error(
        "frame buffer is {actual_width}x{actual_height}, but {mode_name} \
         scans {expected_width}x{expected_height}"
    )]
    ImageDimensionMismatch {
        mode_name: &'static str,
        expected_width: usize,
        expected_height: usize,
        actual_width: usize,
        actual_height: usize,
    },
}

/// One tone of the transmission: frequency in Hz, duration in
/// milliseconds. A `None` frequency is synthesized as silence.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub frequency: Option<f64>,
    pub duration_ms: f64,
}

impl Segment {
    #[inline]
    pub fn tone(frequency: f64, duration_ms: f64) -> Self {
        Self {
            frequency: Some(frequency),
            duration_ms,
        }
    }

    #[inline]
    pub fn silence(duration_ms: f64) -> Self {
        Self {
            frequency: None,
            duration_ms,
        }
    }

    fn from_state<F>(state: &State, mode: &Mode, frame_buffer: &F, fskid: &[u8]) -> Self
    where
        F: FrameBuffer,
    {
        match state {
            State::Vox { step } => {
                let (frequency, duration_ms) = VOX_SEGMENTS[usize::from(*step)];
                Self::tone(frequency, duration_ms)
            }
            State::Header { header_state } => {
                match header_state {
                    HeaderState::Leader1 | HeaderState::Leader2 => {
                        Self::tone(LEADER_TONE, LEADER_TIME)
                    }
                    HeaderState::LeaderBreak => Self::tone(SYNC_TONE, LEADER_BREAK_TIME),
                    HeaderState::VisStart | HeaderState::VisStop => {
                        Self::tone(SYNC_TONE, VIS_BIT_TIME)
                    }
                    HeaderState::VisBit { bit } => {
                        let bit = if *bit == 7 {
                            mode.vis_code.parity()
                        }
                        else {
                            mode.vis_code.get_bit(*bit)
                        };
                        Self::tone(if bit { VIS_HIGH_TONE } else { VIS_LOW_TONE }, VIS_BIT_TIME)
                    }
                }
            }
            State::Line { y, line_state } => line_segment(mode, frame_buffer, *y, line_state),
            State::Fskid { byte, bit } => {
                let set = (fskid[*byte] >> bit) & 1 != 0;
                Self::tone(
                    if set { FSKID_HIGH_TONE } else { FSKID_LOW_TONE },
                    FSKID_BIT_TIME,
                )
            }
        }
    }
}

fn line_segment<F>(mode: &Mode, frame_buffer: &F, y: usize, line_state: &LineState) -> Segment
where
    F: FrameBuffer,
{
    let width = mode.width as f64;
    match (*line_state, mode.family) {
        (LineState::Sync, _) => Segment::tone(SYNC_TONE, mode.sync_ms),

        (LineState::GrayScan { x }, Family::Grayscale { scan_ms }) => {
            let value = quantize_unit(frame_buffer.luma(x, y));
            Segment::tone(byte_to_frequency(value), scan_ms / width)
        }

        (LineState::MartinGap { .. }, Family::Martin { gap_ms, .. }) => {
            Segment::tone(PORCH_TONE, gap_ms)
        }
        (LineState::MartinScan { channel, x }, Family::Martin { scan_ms, .. }) => {
            let value = channel_value(frame_buffer.rgb(x, y), MARTIN_CHANNELS[channel]);
            Segment::tone(byte_to_frequency(value), scan_ms / width)
        }

        (LineState::ScottieSync, Family::Scottie { sync_ms, .. }) => {
            Segment::tone(SYNC_TONE, sync_ms)
        }
        (LineState::ScottieScan { channel, x }, Family::Scottie { scan_ms, .. }) => {
            let value = channel_value(frame_buffer.rgb(x, y), SCOTTIE_CHANNELS[channel]);
            Segment::tone(byte_to_frequency(value), scan_ms / width)
        }
        (LineState::ScottieGap { .. }, Family::Scottie { gap_ms, .. }) => {
            Segment::tone(PORCH_TONE, gap_ms)
        }

        (LineState::Robot36Sync, Family::Robot36 { sync_ms, .. }) => {
            Segment::tone(SYNC_TONE, sync_ms)
        }
        (LineState::Robot36SyncPorch, Family::Robot36 { sync_porch_ms, .. }) => {
            Segment::tone(PORCH_TONE, sync_porch_ms)
        }
        (LineState::Robot36Luma { x }, Family::Robot36 { y_scan_ms, .. }) => {
            let value = quantize_unit(ycbcr(frame_buffer.rgb(x, y))[0]);
            Segment::tone(byte_to_frequency(value), y_scan_ms / width)
        }
        (LineState::Robot36Separator, Family::Robot36 { sep_ms, .. }) => {
            // R-Y follows on even lines and is announced low, B-Y high
            let tone = if y % 2 == 0 {
                CHANNEL_LOW_TONE
            }
            else {
                CHANNEL_HIGH_TONE
            };
            Segment::tone(tone, sep_ms)
        }
        (LineState::Robot36Porch, Family::Robot36 { porch_ms, .. }) => {
            Segment::tone(CHROMA_PORCH_TONE, porch_ms)
        }
        (LineState::Robot36Chroma { x }, Family::Robot36 { c_scan_ms, .. }) => {
            let [_, cb, cr] = ycbcr(frame_buffer.rgb(x, y));
            let value = quantize_unit(if y % 2 == 0 { cr } else { cb });
            Segment::tone(byte_to_frequency(value), c_scan_ms / width)
        }

        (LineState::PdPorch, Family::Pd { porch_ms, .. }) => Segment::tone(PORCH_TONE, porch_ms),
        (LineState::PdScan { block, x }, Family::Pd { pixel_ms, .. }) => {
            let value = match block {
                PdBlock::UpperLuma => ycbcr(frame_buffer.rgb(x, y))[0],
                PdBlock::LowerLuma => ycbcr(frame_buffer.rgb(x, y + 1))[0],
                PdBlock::ChromaRed => {
                    let [_, _, upper] = ycbcr(frame_buffer.rgb(x, y));
                    let [_, _, lower] = ycbcr(frame_buffer.rgb(x, y + 1));
                    (upper + lower) / 2.0
                }
                PdBlock::ChromaBlue => {
                    let [_, upper, _] = ycbcr(frame_buffer.rgb(x, y));
                    let [_, lower, _] = ycbcr(frame_buffer.rgb(x, y + 1));
                    (upper + lower) / 2.0
                }
            };
            Segment::tone(byte_to_frequency(quantize_unit(value)), pixel_ms)
        }

        _ => unreachable!("line state does not belong to the mode's family"),
    }
}

/// One image-to-audio encoding: the mode descriptor, the prepared frame
/// and the synthesis parameters. Construction validates everything; the
/// segment and sample streams it hands out cannot fail.
#[derive(Clone, Debug)]
pub struct SstvEncoder<F> {
    frame_buffer: F,
    mode: Mode,
    sample_rate: f64,
    bit_depth: BitDepth,
    vox_enabled: bool,
    fskid_payload: Vec<u8>,
    dither_seed: u64,
}

impl<F> SstvEncoder<F>
where
    F: FrameBuffer,
{
    pub fn new(frame_buffer: F, mode: Mode, sample_rate: f64, bits: u32) -> Result<Self, EncodeError> {
        let bit_depth =
            BitDepth::new(bits).ok_or(EncodeError::UnsupportedBitDepth { bits })?;

        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(EncodeError::InvalidSampleRate { sample_rate });
        }

        if frame_buffer.width() != mode.width || frame_buffer.height() != mode.height {
            return Err(EncodeError::ImageDimensionMismatch {
                mode_name: mode.name,
                expected_width: mode.width,
                expected_height: mode.height,
                actual_width: frame_buffer.width(),
                actual_height: frame_buffer.height(),
            });
        }

        tracing::debug!(mode = mode.name, sample_rate, bits, "new encoder");

        Ok(Self {
            frame_buffer,
            mode,
            sample_rate,
            bit_depth,
            vox_enabled: false,
            fskid_payload: Vec::new(),
            dither_seed: DEFAULT_DITHER_SEED,
        })
    }

    /// Prepend the VOX wake-up burst.
    pub fn with_vox(mut self) -> Self {
        self.vox_enabled = true;
        self
    }

    pub fn with_dither_seed(mut self, seed: u64) -> Self {
        self.dither_seed = seed;
        self
    }

    /// Append a station identifier to the FSKID trailer. Characters are
    /// keyed as `byte - 0x20`, framed by the `0x20 0x2a` leader and the
    /// `0x01` terminator; each call appends a fully framed block.
    pub fn add_fskid_text(&mut self, text: &str) {
        self.fskid_payload.push(0x20);
        self.fskid_payload.push(0x2a);
        self.fskid_payload
            .extend(text.bytes().map(|byte| byte.saturating_sub(0x20)));
        self.fskid_payload.push(0x01);
    }

    #[inline]
    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    #[inline]
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    #[inline]
    pub fn bit_depth(&self) -> BitDepth {
        self.bit_depth
    }

    #[inline]
    pub fn fskid_payload(&self) -> &[u8] {
        &self.fskid_payload
    }

    /// The tone sequence of the whole transmission.
    pub fn segments(&self) -> Segments<'_, F> {
        Segments {
            encoder: self,
            state: Some(State::initial(self.vox_enabled)),
        }
    }

    /// The transmission as quantized PCM.
    pub fn samples(&self) -> PcmSamples<Segments<'_, F>> {
        PcmSamples::new(
            ToneSynth::new(self.segments(), self.sample_rate),
            self.bit_depth,
            self.dither_seed,
        )
    }

    /// Nominal transmission length, independent of the sample rate.
    pub fn duration(&self) -> Duration {
        let total_ms: f64 = self.segments().map(|segment| segment.duration_ms).sum();
        Duration::from_secs_f64(total_ms / 1000.0)
    }
}

/// Pull iterator over the transmission's segments. Only the segment in
/// flight exists at any time; dropping the iterator abandons the rest of
/// the transmission.
#[derive(Clone, Debug)]
pub struct Segments<'a, F> {
    encoder: &'a SstvEncoder<F>,
    state: Option<State>,
}

impl<'a, F> Iterator for Segments<'a, F>
where
    F: FrameBuffer,
{
    type Item = Segment;

    fn next(&mut self) -> Option<Segment> {
        let state = self.state?;
        let segment = Segment::from_state(
            &state,
            &self.encoder.mode,
            &self.encoder.frame_buffer,
            &self.encoder.fskid_payload,
        );
        self.state = state.next(&self.encoder.mode, self.encoder.fskid_payload.len());
        Some(segment)
    }
}
