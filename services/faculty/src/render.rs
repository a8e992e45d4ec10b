//! Rendering of session QR symbols

use qrcode::render::{svg, unicode};
use qrcode::{Color, QrCode};
use thiserror::Error;

/// Modules of blank margin required around a symbol
pub const QUIET_ZONE: usize = 4;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("Failed to build QR symbol: {0}")]
    Encode(String),
}

fn build(text: &str) -> Result<QrCode, RenderError> {
    QrCode::new(text.as_bytes()).map_err(|e| RenderError::Encode(e.to_string()))
}

/// SVG document at least `size` pixels wide
pub fn to_svg(text: &str, size: u32) -> Result<String, RenderError> {
    Ok(build(text)?
        .render::<svg::Color>()
        .min_dimensions(size, size)
        .build())
}

/// Block-character rendering for a terminal with a dark background
pub fn to_terminal(text: &str) -> Result<String, RenderError> {
    Ok(build(text)?
        .render::<unicode::Dense1x2>()
        .dark_color(unicode::Dense1x2::Light)
        .light_color(unicode::Dense1x2::Dark)
        .build())
}

/// Dark and light modules of a symbol, without quiet zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleMatrix {
    width: usize,
    dark: Vec<bool>,
}

impl ModuleMatrix {
    pub fn encode(text: &str) -> Result<Self, RenderError> {
        let code = build(text)?;
        Ok(Self {
            width: code.width(),
            dark: code.to_colors().into_iter().map(|c| c == Color::Dark).collect(),
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.width && self.dark[y * self.width + x]
    }

    /// Greyscale raster with `scale` pixels per module and a standard quiet zone
    ///
    /// Returns the side length in pixels and row-major luma values.
    pub fn rasterize(&self, scale: usize) -> (usize, Vec<u8>) {
        let scale = scale.max(1);
        let side = (self.width + 2 * QUIET_ZONE) * scale;
        let mut pixels = vec![u8::MAX; side * side];

        for y in 0..side {
            for x in 0..side {
                let mx = (x / scale).checked_sub(QUIET_ZONE);
                let my = (y / scale).checked_sub(QUIET_ZONE);
                if let (Some(mx), Some(my)) = (mx, my) {
                    if self.is_dark(mx, my) {
                        pixels[y * side + x] = 0;
                    }
                }
            }
        }

        (side, pixels)
    }
}
