/*
 *  color.rs
 *
 *  SkyCard - weather at a glance
 *	(c) 2020-26 Stuart Hunter
 *
 *	Hex color codes to terminal escapes
 *
 *	This program is free software: you can redistribute it and/or modify
 *	it under the terms of the GNU General Public License as published by
 *	the Free Software Foundation, either version 3 of the License, or
 *	(at your option) any later version.
 *
 *	This program is distributed in the hope that it will be useful,
 *	but WITHOUT ANY WARRANTY; without even the implied warranty of
 *	MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *	GNU General Public License for more details.
 *
 *	See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *	Public License.
 *
 */

pub const RESET: &str = "\x1b[0m";

/// 24-bit color parsed from a `#RRGGBB` code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb { r: 255, g: 255, b: 255 };
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    /// Accepts `#RRGGBB` or `RRGGBB`, any case.
    pub fn from_hex(code: &str) -> Option<Self> {
        let hex = code.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self { r: channel(0)?, g: channel(2)?, b: channel(4)? })
    }

    /// Rec. 601 luma, 0-255
    pub fn luminance(&self) -> u8 {
        ((self.r as u32 * 299 + self.g as u32 * 587 + self.b as u32 * 114) / 1000) as u8
    }

    pub fn fg(&self) -> String {
        format!("\x1b[38;2;{};{};{}m", self.r, self.g, self.b)
    }

    pub fn bg(&self) -> String {
        format!("\x1b[48;2;{};{};{}m", self.r, self.g, self.b)
    }

    /// Black or white, whichever reads on top of this color.
    pub fn contrast(&self) -> Rgb {
        if self.luminance() >= 128 { Rgb::BLACK } else { Rgb::WHITE }
    }
}

/// `text` on a `code` background with readable foreground.
pub fn badge(text: &str, code: &str) -> String {
    match Rgb::from_hex(code) {
        Some(rgb) => format!("{}{} {} {}", rgb.bg(), rgb.contrast().fg(), text, RESET),
        None => format!("[{}]", text),
    }
}

/// Wraps `text` in the foreground escape for `code`; plain text if the code
/// doesn't parse.
pub fn paint(text: &str, code: &str) -> String {
    match Rgb::from_hex(code) {
        Some(rgb) => format!("{}{}{}", rgb.fg(), text, RESET),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex() {
        assert_eq!(Rgb::from_hex("#60CCFA"), Some(Rgb { r: 0x60, g: 0xcc, b: 0xfa }));
        assert_eq!(Rgb::from_hex("9a3412"), Some(Rgb { r: 0x9a, g: 0x34, b: 0x12 }));
        assert_eq!(Rgb::from_hex("#12345"), None);
        assert_eq!(Rgb::from_hex("#zzzzzz"), None);
    }

    #[test]
    fn test_luminance_and_contrast() {
        assert_eq!(Rgb::BLACK.luminance(), 0);
        assert_eq!(Rgb::WHITE.luminance(), 255);
        assert_eq!(Rgb::WHITE.contrast(), Rgb::BLACK);
        assert_eq!(Rgb::from_hex("#1D4ED8").unwrap().contrast(), Rgb::WHITE);
    }

    #[test]
    fn test_paint() {
        assert_eq!(paint("hi", "#000000"), "\x1b[38;2;0;0;0mhi\x1b[0m");
        assert_eq!(paint("hi", "nope"), "hi");
    }

    #[test]
    fn test_badge() {
        assert_eq!(badge("red-600", "#FFFFFF"), "\x1b[48;2;255;255;255m\x1b[38;2;0;0;0m red-600 \x1b[0m");
        assert_eq!(badge("x", "bad"), "[x]");
    }
}
