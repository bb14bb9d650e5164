mod prepare;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{
    eyre,
    Error,
};
use image::ImageReader;
use slowscan::{
    image::FrameBuffer,
    sink,
    Family,
    Mode,
    SstvEncoder,
};
use tracing_subscriber::EnvFilter;

use crate::prepare::{
    prepare_luma,
    prepare_rgb,
};

#[derive(Debug, clap::Parser)]
enum Args {
    /// Encode an image into an SSTV wav file.
    Encode {
        image: PathBuf,
        output: PathBuf,

        /// Mode name, e.g. "M1", "Robot 36" or "PD-120".
        #[clap(short, long, default_value = "M1")]
        mode: String,

        #[clap(short, long = "samplerate", default_value = "44100")]
        sample_rate: f64,

        /// Sample depth in bits, 8 or 16.
        #[clap(short, long, default_value = "16")]
        bits: u32,

        /// Prepend the VOX wake-up burst.
        #[clap(long)]
        vox: bool,

        /// Station identifier to append as FSKID trailer.
        #[clap(long)]
        fskid: Option<String>,

        /// Duplicate the signal onto two channels.
        #[clap(long)]
        stereo: bool,

        #[clap(long)]
        dither_seed: Option<u64>,
    },
    /// List the supported modes.
    Modes,
}

fn main() -> Result<(), Error> {
    let _ = dotenvy::dotenv();
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    match Args::parse() {
        Args::Encode {
            image,
            output,
            mode,
            sample_rate,
            bits,
            vox,
            fskid,
            stereo,
            dither_seed,
        } => {
            let mode = Mode::by_name(&mode).ok_or_else(|| eyre!("unknown mode: {mode}"))?;
            let source = ImageReader::open(&image)?.decode()?;

            let options = Options {
                output,
                sample_rate,
                bits,
                vox,
                fskid,
                stereo,
                dither_seed,
            };

            match mode.family {
                Family::Grayscale { .. } => {
                    encode(prepare_luma(&source, mode), mode, options)
                }
                _ => encode(prepare_rgb(&source, mode), mode, options),
            }
        }
        Args::Modes => {
            for mode in Mode::ALL {
                println!(
                    "{:6} {:12} {}x{}",
                    mode.short_name, mode.name, mode.width, mode.height
                );
            }
            Ok(())
        }
    }
}

#[derive(Debug)]
struct Options {
    output: PathBuf,
    sample_rate: f64,
    bits: u32,
    vox: bool,
    fskid: Option<String>,
    stereo: bool,
    dither_seed: Option<u64>,
}

fn encode<F>(frame: F, mode: &Mode, options: Options) -> Result<(), Error>
where
    F: FrameBuffer,
{
    let mut encoder = SstvEncoder::new(frame, *mode, options.sample_rate, options.bits)?;
    if options.vox {
        encoder = encoder.with_vox();
    }
    if let Some(seed) = options.dither_seed {
        encoder = encoder.with_dither_seed(seed);
    }
    if let Some(fskid) = &options.fskid {
        encoder.add_fskid_text(fskid);
    }

    tracing::info!(
        mode = mode.name,
        duration_secs = encoder.duration().as_secs_f64(),
        "encoding"
    );

    if options.stereo {
        sink::write_wav_stereo(&options.output, &encoder)?;
    }
    else {
        sink::write_wav(&options.output, &encoder)?;
    }

    Ok(())
}
