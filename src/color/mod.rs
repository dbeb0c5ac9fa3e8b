//! Style-string colour resolution.
//!
//! Accepts `rgb(r,g,b)`, `rgba(r,g,b,a)`, hex (`#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`) and
//! case-insensitive CSS colour keywords. Anything else resolves to transparent black.

mod names;

use names::NAMED_COLORS;

/// Straight-alpha RGBA8 colour.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::new(255, 255, 255, 255);

    /// Build a colour from its channels.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Unpack `0xRRGGBBAA`.
    pub const fn from_packed(v: u32) -> Self {
        let [r, g, b, a] = v.to_be_bytes();
        Self { r, g, b, a }
    }

    /// Pack as `0xRRGGBBAA`.
    pub const fn to_packed(self) -> u32 {
        u32::from_be_bytes([self.r, self.g, self.b, self.a])
    }

    /// `#rrggbb` form. Alpha is not part of the string.
    pub fn to_hex_rgb(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Resolve a style string. Never fails; unknown input yields [`Rgba8::TRANSPARENT`].
pub fn resolve(style: &str) -> Rgba8 {
    let s = style.trim();
    parse_functional(s)
        .or_else(|| parse_hex(s))
        .or_else(|| named(s))
        .unwrap_or(Rgba8::TRANSPARENT)
}

/// Look up a colour keyword, ignoring ASCII case.
pub fn named(name: &str) -> Option<Rgba8> {
    let key = name.trim().to_ascii_lowercase();
    let i = NAMED_COLORS
        .binary_search_by(|(n, _)| (*n).cmp(key.as_str()))
        .ok()?;
    let [_, r, g, b] = NAMED_COLORS[i].1.to_be_bytes();
    Some(Rgba8::new(r, g, b, 255))
}

fn parse_functional(s: &str) -> Option<Rgba8> {
    if let Some(args) = call_args(s, "rgb") {
        let [r, g, b] = <[&str; 3]>::try_from(args.as_slice()).ok()?;
        return Some(Rgba8::new(channel(r)?, channel(g)?, channel(b)?, 255));
    }
    if let Some(args) = call_args(s, "rgba") {
        let [r, g, b, a] = <[&str; 4]>::try_from(args.as_slice()).ok()?;
        let a: f64 = a.parse().ok()?;
        if !a.is_finite() {
            return None;
        }
        let a = (a.clamp(0.0, 1.0) * 255.0).round() as u8;
        return Some(Rgba8::new(channel(r)?, channel(g)?, channel(b)?, a));
    }
    None
}

fn call_args<'a>(s: &'a str, name: &str) -> Option<Vec<&'a str>> {
    let head = s.get(..name.len())?;
    if !head.eq_ignore_ascii_case(name) {
        return None;
    }
    let inner = s[name.len()..]
        .trim_start()
        .strip_prefix('(')?
        .strip_suffix(')')?;
    Some(inner.split(',').map(str::trim).collect())
}

fn channel(s: &str) -> Option<u8> {
    let v: i64 = s.parse().ok()?;
    Some(v.clamp(0, 255) as u8)
}

fn parse_hex(s: &str) -> Option<Rgba8> {
    let s = s.strip_prefix('#')?;
    if !s.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    let nibble = |i: usize| u8::from_str_radix(&s[i..=i], 16).ok().map(|v| v * 17);
    let byte = |i: usize| u8::from_str_radix(&s[i..i + 2], 16).ok();

    match s.len() {
        3 => Some(Rgba8::new(nibble(0)?, nibble(1)?, nibble(2)?, 255)),
        4 => Some(Rgba8::new(nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?)),
        6 => Some(Rgba8::new(byte(0)?, byte(2)?, byte(4)?, 255)),
        8 => Some(Rgba8::new(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
        _ => None,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/color/resolve.rs"]
mod tests;
