//! Whole-pipeline checks: descriptor to segments to quantized PCM.

use image::{
    GrayImage,
    Luma,
    Rgb,
    RgbImage,
};
use slowscan::{
    byte_to_frequency,
    sink,
    Mode,
    Segment,
    SstvEncoder,
};

/// leader, break, leader, start, 7 code bits, parity, stop
const HEADER_LEN: usize = 13;

#[test]
fn mid_gray_robot8bw() {
    let image = GrayImage::from_pixel(160, 120, Luma([128]));
    let encoder = SstvEncoder::new(image, Mode::R8BW, 11025.0, 16).unwrap();

    let segments: Vec<Segment> = encoder.segments().collect();
    assert_eq!(segments[HEADER_LEN], Segment::tone(1200.0, 7.0));
    assert!((segments[HEADER_LEN + 1].frequency.unwrap() - 1901.57).abs() < 0.1);
}

#[test]
fn robot36_red_line() {
    let image = RgbImage::from_fn(320, 240, |_, y| {
        if y == 0 {
            Rgb([255, 0, 0])
        }
        else {
            Rgb([0, 0, 0])
        }
    });
    let encoder = SstvEncoder::new(image, Mode::R36, 11025.0, 16).unwrap();
    let line: Vec<Segment> = encoder.segments().skip(HEADER_LEN).take(644).collect();

    // Y of pure red is 76/255
    let first_luma = line[2].frequency.unwrap();
    assert!((first_luma - byte_to_frequency(76)).abs() < 1e-9);
    assert!((first_luma - 1738.4).abs() < 0.1);

    // line 0 carries R-Y, announced by the low separator
    assert_eq!(line[322], Segment::tone(1500.0, 4.5));
}

#[test]
fn white_martin_m1_pixels_are_all_white_tone() {
    let image = RgbImage::from_pixel(320, 256, Rgb([255, 255, 255]));
    let encoder = SstvEncoder::new(image, Mode::M1, 11025.0, 16).unwrap();
    let line: Vec<Segment> = encoder.segments().skip(HEADER_LEN).take(965).collect();

    let mut syncs = 0;
    let mut gaps = 0;
    let mut pixels = 0;
    for segment in &line {
        match segment.frequency.unwrap() {
            1200.0 => syncs += 1,
            1500.0 => gaps += 1,
            2300.0 => pixels += 1,
            other => panic!("unexpected tone {other}"),
        }
    }
    assert_eq!((syncs, gaps, pixels), (1, 4, 960));
}

#[test]
fn scottie_s2_starts_lines_with_sync() {
    let image = RgbImage::from_pixel(160, 256, Rgb([3, 141, 59]));
    let encoder = SstvEncoder::new(image, Mode::S2, 11025.0, 16).unwrap();
    assert_eq!(
        encoder.segments().nth(HEADER_LEN).unwrap(),
        Segment::tone(1200.0, 9.0)
    );
}

#[test]
fn pcm_sample_count_tracks_duration() {
    let image = GrayImage::from_pixel(160, 120, Luma([200]));
    let encoder = SstvEncoder::new(image, Mode::R8BW, 11025.0, 16).unwrap();

    let expected = encoder.duration().as_secs_f64() * encoder.sample_rate();
    let count = encoder.samples().count();
    assert!((count as f64 - expected.round()).abs() <= 1.0);
}

#[test]
fn pcm_output_is_reproducible() {
    let image = RgbImage::from_pixel(320, 240, Rgb([90, 12, 230]));

    let samples = |seed: Option<u64>| -> Vec<i16> {
        let mut encoder =
            SstvEncoder::new(image.clone(), Mode::R36, 8000.0, 8).unwrap();
        if let Some(seed) = seed {
            encoder = encoder.with_dither_seed(seed);
        }
        encoder.samples().collect()
    };

    assert_eq!(samples(None), samples(None));
    assert_eq!(samples(Some(7)), samples(Some(7)));
    assert_ne!(samples(None), samples(Some(7)));
}

#[test]
fn eight_bit_samples_stay_in_range() {
    let image = RgbImage::from_pixel(160, 256, Rgb([255, 128, 0]));
    let encoder = SstvEncoder::new(image, Mode::M2, 11025.0, 8).unwrap();
    assert!(encoder
        .samples()
        .all(|sample| (-128..=127).contains(&sample)));
}

#[test]
fn wav_file_round_trips_spec_and_length() {
    let image = GrayImage::from_pixel(160, 120, Luma([64]));
    let encoder = SstvEncoder::new(image, Mode::R8BW, 11025.0, 16).unwrap();

    let path = std::env::temp_dir().join("slowscan_encode_test.wav");
    sink::write_wav(&path, &encoder).unwrap();

    let reader = hound::WavReader::open(&path).unwrap();
    assert_eq!(reader.spec().channels, 1);
    assert_eq!(reader.spec().sample_rate, 11025);
    assert_eq!(reader.spec().bits_per_sample, 16);
    assert_eq!(reader.len() as usize, encoder.samples().count());

    std::fs::remove_file(&path).unwrap();
}
