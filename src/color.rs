use serde_with::DeserializeFromStr;
use std::fmt::Display;
use std::str::FromStr;

use crate::error::{Error, ErrorKind, Result};

#[derive(Clone, Copy, Debug, DeserializeFromStr, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 128, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);
    pub const ORANGE: Color = Color::rgb(255, 165, 0);
    pub const GRAY: Color = Color::rgb(128, 128, 128);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b }
    }
}

impl FromStr for Color {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        let lowercase = s.trim().to_lowercase();

        let named = match lowercase.as_str() {
            "black" => Some(Color::BLACK),
            "white" => Some(Color::WHITE),
            "red" => Some(Color::RED),
            "green" => Some(Color::GREEN),
            "blue" => Some(Color::BLUE),
            "yellow" => Some(Color::YELLOW),
            "orange" => Some(Color::ORANGE),
            "gray" | "grey" => Some(Color::GRAY),
            _ => None,
        };
        if let Some(color) = named {
            return Ok(color);
        }

        let hex = lowercase.strip_prefix('#').unwrap_or(&lowercase);
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::new(
                ErrorKind::ColorParse,
                &format!("'{}' (expected a name or #rrggbb)", s),
            ));
        }
        let channel = |idx: usize| {
            hex.get(idx..idx + 2)
                .and_then(|part| u8::from_str_radix(part, 16).ok())
        };

        match (hex.len(), channel(0), channel(2), channel(4)) {
            (6, Some(r), Some(g), Some(b)) => Ok(Color::rgb(r, g, b)),
            _ => Err(Error::new(
                ErrorKind::ColorParse,
                &format!("'{}' (expected a name or #rrggbb)", s),
            )),
        }
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_colors() {
        assert_eq!(Color::from_str("red").unwrap(), Color::RED);
        assert_eq!(Color::from_str("#1e90FF").unwrap(), Color::rgb(30, 144, 255));
        assert_eq!(Color::from_str("000000").unwrap(), Color::BLACK);
        assert!(Color::from_str("#12345").is_err());
        assert!(Color::from_str("#gg0000").is_err());
        assert!(Color::from_str("#+1+2+3").is_err());
        assert!(Color::from_str("##112233").is_err());
        assert_eq!(Color::rgb(30, 144, 255).to_string(), "#1e90ff");
    }
}
