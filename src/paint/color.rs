//! Colors and paint references.

use crate::foundation::core::Rgba8Premul;
use crate::foundation::error::{SceneError, SceneResult};
use crate::foundation::math::{mul_div255_u8, unit_to_u8};
use crate::foundation::scan::NumScanner;

/// A straight (non-premultiplied) 8-bit RGBA color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Color {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha.
    pub a: u8,
}

impl Color {
    /// Opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Color with alpha.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

    /// Premultiply.
    pub fn premul(self) -> Rgba8Premul {
        Rgba8Premul::from_straight_rgba(self.r, self.g, self.b, self.a)
    }

    /// Scale alpha by `opacity` in [0, 1].
    pub fn with_opacity(self, opacity: f64) -> Self {
        let k = unit_to_u8(opacity);
        Self {
            a: mul_div255_u8(u16::from(self.a), u16::from(k)),
            ..self
        }
    }

    /// Parse a hex, `rgb()`, `rgba()`, `hsl()` or named color.
    pub fn parse(text: &str) -> SceneResult<Self> {
        let t = text.trim();
        if let Some(hex) = t.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(|| SceneError::parse(format!("invalid hex color '{text}'")));
        }
        let lower = t.to_ascii_lowercase();
        if let Some(args) = lower
            .strip_prefix("rgba(")
            .or_else(|| lower.strip_prefix("rgb("))
        {
            return Ok(parse_rgb_args(args));
        }
        if let Some(args) = lower
            .strip_prefix("hsla(")
            .or_else(|| lower.strip_prefix("hsl("))
        {
            return Ok(parse_hsl_args(args));
        }
        named_color(&lower).ok_or_else(|| SceneError::parse(format!("unknown color '{text}'")))
    }

    /// `#rrggbbaa` form.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }
}

impl serde::Serialize for Color {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.to_hex())
    }
}

impl<'de> serde::Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Arr(Vec<f64>),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Text(s) => Color::parse(&s).map_err(serde::de::Error::custom),
            Repr::Arr(v) => match v.as_slice() {
                [r, g, b] => Ok(Color::rgb(unit_to_u8(*r), unit_to_u8(*g), unit_to_u8(*b))),
                [r, g, b, a] => Ok(Color::rgba(
                    unit_to_u8(*r),
                    unit_to_u8(*g),
                    unit_to_u8(*b),
                    unit_to_u8(*a),
                )),
                _ => Err(serde::de::Error::custom(
                    "color array must have len 3 ([r,g,b]) or 4 ([r,g,b,a])",
                )),
            },
        }
    }
}

fn parse_hex(s: &str) -> Option<Color> {
    fn nibble(c: u8) -> Option<u8> {
        (c as char).to_digit(16).map(|d| d as u8)
    }
    let b = s.as_bytes();
    let byte = |i: usize| -> Option<u8> { Some(nibble(b[i])? << 4 | nibble(b[i + 1])?) };
    match b.len() {
        3 | 4 => {
            let mut out = [255u8; 4];
            for (i, c) in b.iter().enumerate() {
                let n = nibble(*c)?;
                out[i] = n << 4 | n;
            }
            Some(Color::rgba(out[0], out[1], out[2], out[3]))
        }
        6 => Some(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Color::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
        _ => None,
    }
}

// Components are 0..255 or percentages; missing components read as 0 and alpha as opaque.
fn parse_rgb_args(args: &str) -> Color {
    let mut sc = NumScanner::new(args);
    let mut out = [0u8, 0, 0, 255];
    for slot in out.iter_mut() {
        sc.skip_separators();
        let Some(v) = sc.number() else {
            break;
        };
        let v = if sc.peek() == Some(b'%') {
            sc.bump();
            v * 255.0 / 100.0
        } else {
            v
        };
        *slot = v.clamp(0.0, 255.0).round() as u8;
    }
    Color::rgba(out[0], out[1], out[2], out[3])
}

fn parse_hsl_args(args: &str) -> Color {
    let mut sc = NumScanner::new(args);
    let mut v = [0.0f64, 0.0, 0.0, 1.0];
    for (i, slot) in v.iter_mut().enumerate() {
        sc.skip_separators();
        let Some(n) = sc.number() else {
            break;
        };
        let pct = sc.peek() == Some(b'%');
        if pct {
            sc.bump();
        }
        *slot = match i {
            0 => n,
            3 if !pct => n,
            _ => n / 100.0,
        };
    }
    let (r, g, b) = hsl_to_rgb(v[0], v[1], v[2]);
    Color::rgba(unit_to_u8(r), unit_to_u8(g), unit_to_u8(b), unit_to_u8(v[3]))
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (f64, f64, f64) {
    let h = (h % 360.0 + 360.0) % 360.0 / 360.0;
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);
    if s == 0.0 {
        return (l, l, l);
    }

    fn hue(p: f64, q: f64, mut t: f64) -> f64 {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * (2.0 / 3.0 - t) * 6.0
        } else {
            p
        }
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    (hue(p, q, h + 1.0 / 3.0), hue(p, q, h), hue(p, q, h - 1.0 / 3.0))
}

// Sorted for binary search.
const NAMED: &[(&str, Color)] = &[
    ("aqua", Color::rgb(0, 255, 255)),
    ("black", Color::rgb(0, 0, 0)),
    ("blue", Color::rgb(0, 0, 255)),
    ("brown", Color::rgb(165, 42, 42)),
    ("coral", Color::rgb(255, 127, 80)),
    ("crimson", Color::rgb(220, 20, 60)),
    ("cyan", Color::rgb(0, 255, 255)),
    ("darkblue", Color::rgb(0, 0, 139)),
    ("darkgray", Color::rgb(169, 169, 169)),
    ("darkgreen", Color::rgb(0, 100, 0)),
    ("darkgrey", Color::rgb(169, 169, 169)),
    ("darkred", Color::rgb(139, 0, 0)),
    ("fuchsia", Color::rgb(255, 0, 255)),
    ("gold", Color::rgb(255, 215, 0)),
    ("gray", Color::rgb(128, 128, 128)),
    ("green", Color::rgb(0, 128, 0)),
    ("grey", Color::rgb(128, 128, 128)),
    ("indigo", Color::rgb(75, 0, 130)),
    ("ivory", Color::rgb(255, 255, 240)),
    ("khaki", Color::rgb(240, 230, 140)),
    ("lavender", Color::rgb(230, 230, 250)),
    ("lightblue", Color::rgb(173, 216, 230)),
    ("lightgray", Color::rgb(211, 211, 211)),
    ("lightgreen", Color::rgb(144, 238, 144)),
    ("lightgrey", Color::rgb(211, 211, 211)),
    ("lime", Color::rgb(0, 255, 0)),
    ("magenta", Color::rgb(255, 0, 255)),
    ("maroon", Color::rgb(128, 0, 0)),
    ("navy", Color::rgb(0, 0, 128)),
    ("olive", Color::rgb(128, 128, 0)),
    ("orange", Color::rgb(255, 165, 0)),
    ("pink", Color::rgb(255, 192, 203)),
    ("purple", Color::rgb(128, 0, 128)),
    ("red", Color::rgb(255, 0, 0)),
    ("salmon", Color::rgb(250, 128, 114)),
    ("silver", Color::rgb(192, 192, 192)),
    ("skyblue", Color::rgb(135, 206, 235)),
    ("teal", Color::rgb(0, 128, 128)),
    ("tomato", Color::rgb(255, 99, 71)),
    ("transparent", Color::TRANSPARENT),
    ("turquoise", Color::rgb(64, 224, 208)),
    ("violet", Color::rgb(238, 130, 238)),
    ("white", Color::rgb(255, 255, 255)),
    ("yellow", Color::rgb(255, 255, 0)),
];

/// Look up a lower-case color keyword.
pub fn named_color(name: &str) -> Option<Color> {
    NAMED
        .binary_search_by(|(k, _)| k.cmp(&name))
        .ok()
        .map(|i| NAMED[i].1)
}

/// A fill or stroke source.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Paint {
    /// Nothing is painted.
    #[default]
    None,
    /// Constant color.
    Color(Color),
    /// Reference to a named definition (gradient, image or pattern).
    Url(String),
}

impl Paint {
    /// Parse `none`, `url(#name)` or any color form accepted by [`Color::parse`].
    pub fn parse(text: &str) -> SceneResult<Self> {
        let t = text.trim();
        if t.is_empty() || t.eq_ignore_ascii_case("none") {
            return Ok(Paint::None);
        }
        if let Some(inner) = t.strip_prefix("url(") {
            let name = inner
                .strip_suffix(')')
                .map(str::trim)
                .and_then(|s| s.strip_prefix('#'))
                .filter(|s| !s.is_empty())
                .ok_or_else(|| SceneError::parse(format!("invalid paint reference '{text}'")))?;
            return Ok(Paint::Url(name.to_owned()));
        }
        Color::parse(t).map(Paint::Color)
    }

    /// True unless this is [`Paint::None`] or a fully transparent color.
    pub fn is_visible(&self) -> bool {
        match self {
            Paint::None => false,
            Paint::Color(c) => c.a > 0,
            Paint::Url(_) => true,
        }
    }
}

impl serde::Serialize for Paint {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self {
            Paint::None => s.serialize_str("none"),
            Paint::Color(c) => c.serialize(s),
            Paint::Url(name) => s.serialize_str(&format!("url(#{name})")),
        }
    }
}

impl<'de> serde::Deserialize<'de> for Paint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Paint::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/paint/color.rs"]
mod tests;
