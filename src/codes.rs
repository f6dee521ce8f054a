use barcoders::sym::code128::Code128;
use base64::Engine;
use image::{GrayImage, ImageFormat, Luma};
use qrcode::{Color, QrCode};
use std::io::Cursor;

use crate::error::{AppError, AppResult};

const QR_SCALE: u32 = 4;
const QR_QUIET_ZONE: u32 = 4;

const BARCODE_SCALE: u32 = 3;
const BARCODE_HEIGHT: u32 = 30;
const BARCODE_QUIET_ZONE: u32 = 10;
// Code 128 start character selecting code set B (printable ASCII).
const CODE_SET_B: char = 'Ɓ';

const BLACK: Luma<u8> = Luma([0]);
const WHITE: Luma<u8> = Luma([255]);

pub fn png_data_url(image: &GrayImage) -> AppResult<String> {
    let mut png = Vec::new();
    image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    let mut data_url = String::from("data:image/png;base64,");
    base64::engine::general_purpose::STANDARD.encode_string(png, &mut data_url);
    Ok(data_url)
}

pub fn qr_image(text: &str) -> AppResult<GrayImage> {
    let code = QrCode::new(text.as_bytes())
        .map_err(|err| AppError::failed(format!("Could not encode QR code: {err}")))?;
    let width = code.width() as u32;
    let colors = code.to_colors();
    let size = (width + 2 * QR_QUIET_ZONE) * QR_SCALE;

    Ok(GrayImage::from_fn(size, size, |x, y| {
        let (mx, my) = (x / QR_SCALE, y / QR_SCALE);
        if mx < QR_QUIET_ZONE || my < QR_QUIET_ZONE {
            return WHITE;
        }
        let (mx, my) = (mx - QR_QUIET_ZONE, my - QR_QUIET_ZONE);
        if mx >= width || my >= width {
            return WHITE;
        }
        match colors[(my * width + mx) as usize] {
            Color::Dark => BLACK,
            Color::Light => WHITE,
        }
    }))
}

/// Code 128 bars, one entry per module, `1` for a dark bar. Empty text has
/// no bars.
pub fn code128_modules(text: &str) -> AppResult<Vec<u8>> {
    if text.is_empty() {
        return Ok(Vec::new());
    }
    let barcode = Code128::new(format!("{CODE_SET_B}{text}"))
        .map_err(|err| AppError::failed(format!("Could not encode barcode: {err:?}")))?;
    Ok(barcode.encode())
}

pub fn barcode_image(text: &str) -> AppResult<GrayImage> {
    let modules = code128_modules(text)?;
    let width = (modules.len() as u32 + 2 * BARCODE_QUIET_ZONE) * BARCODE_SCALE;
    let height = BARCODE_HEIGHT * BARCODE_SCALE;

    Ok(GrayImage::from_fn(width, height, |x, _| {
        let module = (x / BARCODE_SCALE).checked_sub(BARCODE_QUIET_ZONE);
        match module.and_then(|m| modules.get(m as usize)) {
            Some(1) => BLACK,
            _ => WHITE,
        }
    }))
}

pub fn generate_qr(text: &str) -> AppResult<String> {
    png_data_url(&qr_image(text)?)
}

pub fn generate_barcode(text: &str) -> AppResult<String> {
    png_data_url(&barcode_image(text)?)
}
