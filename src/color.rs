//! Background color parsing
//!
//! Accepts the color specifications the service historically accepted:
//! hexadecimal RGB/RGBA strings (`#000`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`,
//! leading `#` optional) and a small set of named colors.

use crate::error::{RecorteError, Result};
use image::Rgba;
use std::str::FromStr;

/// A parsed background color for compositing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackgroundColor(pub Rgba<u8>);

impl BackgroundColor {
    /// The default background color (black), matching the original service
    pub const BLACK: Self = Self(Rgba([0, 0, 0, 255]));

    /// Fully opaque white
    pub const WHITE: Self = Self(Rgba([255, 255, 255, 255]));

    /// The color as an RGBA pixel
    #[must_use]
    pub fn rgba(&self) -> Rgba<u8> {
        self.0
    }

    /// The color with its alpha channel forced to fully opaque, for use as
    /// a compositing canvas
    #[must_use]
    pub fn opaque(&self) -> Rgba<u8> {
        let Rgba([r, g, b, _]) = self.0;
        Rgba([r, g, b, 255])
    }
}

impl Default for BackgroundColor {
    fn default() -> Self {
        Self::BLACK
    }
}

impl FromStr for BackgroundColor {
    type Err = RecorteError;

    fn from_str(spec: &str) -> Result<Self> {
        let trimmed = spec.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "black" => return Ok(Self::BLACK),
            "white" => return Ok(Self::WHITE),
            _ => {},
        }

        let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);
        if hex.is_empty() || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(RecorteError::invalid_input(format!(
                "unrecognized color specification: '{spec}'"
            )));
        }

        let channels: Vec<u8> = match hex.len() {
            // Shorthand: each digit doubles (#abc -> #aabbcc)
            3 | 4 => hex
                .chars()
                .map(|c| {
                    let nibble = c.to_digit(16).unwrap_or(0) as u8;
                    (nibble << 4) | nibble
                })
                .collect(),
            6 | 8 => hex
                .as_bytes()
                .chunks(2)
                .map(|pair| {
                    let pair = std::str::from_utf8(pair).unwrap_or("0");
                    u8::from_str_radix(pair, 16).unwrap_or(0)
                })
                .collect(),
            _ => {
                return Err(RecorteError::invalid_input(format!(
                    "unrecognized color specification: '{spec}'"
                )))
            },
        };

        let r = channels.first().copied().unwrap_or(0);
        let g = channels.get(1).copied().unwrap_or(0);
        let b = channels.get(2).copied().unwrap_or(0);
        let a = channels.get(3).copied().unwrap_or(255);
        Ok(Self(Rgba([r, g, b, a])))
    }
}
