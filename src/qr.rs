use anyhow::{Context, Result};
use image::Luma;
use qrcode::{EcLevel, QrCode};
use std::io::Cursor;

/// Pixels per QR module.
const MODULE_SIZE: u32 = 10;

/// Encode `data` into a black-on-white QR PNG.
///
/// Error-correction level L; the symbol version is the smallest that fits
/// the payload. The renderer adds the standard 4-module quiet zone.
pub fn encode_png(data: &str) -> Result<Vec<u8>> {
  let code =
    QrCode::with_error_correction_level(data, EcLevel::L).context("failed to encode qr code")?;

  let image = code
    .render::<Luma<u8>>()
    .module_dimensions(MODULE_SIZE, MODULE_SIZE)
    .quiet_zone(true)
    .build();

  let mut buf = Vec::new();
  image
    .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
    .context("failed to serialize png")?;

  Ok(buf)
}

/// Derive the object key for a URL: everything after the first `"//"`,
/// prefixed with `qr_codes/` and suffixed with `.png`. A URL without `"//"`
/// is used whole. Two URLs differing only in scheme map to the same key.
pub fn object_key(url: &str) -> String {
  let tail = url.split_once("//").map_or(url, |(_, tail)| tail);
  format!("qr_codes/{tail}.png")
}
