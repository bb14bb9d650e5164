//! Scaling of arbitrary input images to a mode's native geometry:
//! aspect-preserving resize, centered on a white letterbox canvas.

use image::{
    imageops::{
        self,
        FilterType,
    },
    DynamicImage,
    GrayImage,
    Luma,
    Rgb,
    RgbImage,
};
use slowscan::Mode;

pub fn prepare_rgb(source: &DynamicImage, mode: &Mode) -> RgbImage {
    let (width, height) = (mode.width as u32, mode.height as u32);
    let resized = source.resize(width, height, FilterType::Lanczos3).into_rgb8();

    let mut canvas = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
    let x = (width - resized.width()) / 2;
    let y = (height - resized.height()) / 2;
    imageops::overlay(&mut canvas, &resized, x.into(), y.into());
    canvas
}

pub fn prepare_luma(source: &DynamicImage, mode: &Mode) -> GrayImage {
    let (width, height) = (mode.width as u32, mode.height as u32);
    let resized = source.resize(width, height, FilterType::Lanczos3).into_luma8();

    let mut canvas = GrayImage::from_pixel(width, height, Luma([255]));
    let x = (width - resized.width()) / 2;
    let y = (height - resized.height()) / 2;
    imageops::overlay(&mut canvas, &resized, x.into(), y.into());
    canvas
}
