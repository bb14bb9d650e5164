//! WAV output.
//!
//! Container framing is the caller's side of the encoder contract; this
//! module is the stock implementation of it. Samples are written little
//! endian at the encoder's bit depth, mono by default.

use std::{
    fs::File,
    io::BufWriter,
    path::Path,
};

use crate::{
    encoder::SstvEncoder,
    image::FrameBuffer,
    synth::BitDepth,
};

#[derive(Debug, thiserror::Error)]
pub enum WavError {
    #[error("wav write error")]
    Hound(#[from] hound::Error),
}

fn spec(encoder_bits: u32, sample_rate: f64, channels: u16) -> hound::WavSpec {
    hound::WavSpec {
        channels,
        sample_rate: sample_rate as u32,
        bits_per_sample: encoder_bits as u16,
        sample_format: hound::SampleFormat::Int,
    }
}

fn write<F>(
    encoder: &SstvEncoder<F>,
    mut writer: hound::WavWriter<BufWriter<File>>,
    channels: u16,
) -> Result<(), WavError>
where
    F: FrameBuffer,
{
    for sample in encoder.samples() {
        for _ in 0..channels {
            match encoder.bit_depth() {
                BitDepth::Eight => writer.write_sample(sample as i8)?,
                BitDepth::Sixteen => writer.write_sample(sample)?,
            }
        }
    }
    writer.finalize()?;
    Ok(())
}

/// Write the whole transmission to a mono WAV file.
pub fn write_wav<F>(path: impl AsRef<Path>, encoder: &SstvEncoder<F>) -> Result<(), WavError>
where
    F: FrameBuffer,
{
    let writer = hound::WavWriter::create(
        path,
        spec(encoder.bit_depth().bits(), encoder.sample_rate(), 1),
    )?;
    write(encoder, writer, 1)
}

/// Write the transmission as two identical channels.
pub fn write_wav_stereo<F>(
    path: impl AsRef<Path>,
    encoder: &SstvEncoder<F>,
) -> Result<(), WavError>
where
    F: FrameBuffer,
{
    let writer = hound::WavWriter::create(
        path,
        spec(encoder.bit_depth().bits(), encoder.sample_rate(), 2),
    )?;
    write(encoder, writer, 2)
}
