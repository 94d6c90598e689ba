use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Straight-alpha RGBA colour, components in `0.0..=1.0`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };
    pub const TRANSPARENT: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };

    pub fn rgb(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as f32 / 255.0,
            g: ((hex >> 8) & 0xff) as f32 / 255.0,
            b: (hex & 0xff) as f32 / 255.0,
            a: 1.0,
        }
    }

    pub fn alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub fn lerp(self, to: Color, t: f64) -> Color {
        let t = t as f32;
        Color {
            r: self.r + (to.r - self.r) * t,
            g: self.g + (to.g - self.g) * t,
            b: self.b + (to.b - self.b) * t,
            a: self.a + (to.a - self.a) * t,
        }
    }

    pub fn to_hex(self) -> String {
        let c = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("#{:02x}{:02x}{:02x}", c(self.r), c(self.g), c(self.b))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Serde adapter storing a [`Color`] as `#rrggbb` or `#rrggbbaa`.
pub mod hex_color {
    use super::Color;
    use eyre::{eyre, Result};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(color: &Color, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if color.a >= 1.0 {
            serializer.serialize_str(&color.to_hex())
        } else {
            let a = (color.a.clamp(0.0, 1.0) * 255.0).round() as u8;
            serializer.serialize_str(&format!("{}{a:02x}", color.to_hex()))
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Color, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_hex_str(&s).map_err(serde::de::Error::custom)
    }

    pub fn parse_hex_str(hex: &str) -> Result<Color> {
        let digits = hex.trim().trim_start_matches('#');
        let value = u32::from_str_radix(digits, 16).map_err(|e| eyre!("invalid colour `{hex}`: {e}"))?;
        match digits.len() {
            6 => Ok(Color::rgb(value)),
            8 => Ok(Color::rgb(value >> 8).alpha((value & 0xff) as f32 / 255.0)),
            _ => Err(eyre!("invalid colour `{hex}`: expected 6 or 8 hex digits")),
        }
    }

    pub mod vec {
        use super::super::Color;
        use serde::{Deserialize, Deserializer, Serializer, ser::SerializeSeq};

        pub fn serialize<S>(colors: &[Color], serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            let mut seq = serializer.serialize_seq(Some(colors.len()))?;
            for c in colors {
                seq.serialize_element(&c.to_hex())?;
            }
            seq.end()
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Color>, D::Error>
        where
            D: Deserializer<'de>,
        {
            let raw = Vec::<String>::deserialize(deserializer)?;
            raw.iter()
                .map(|s| super::parse_hex_str(s).map_err(serde::de::Error::custom))
                .collect()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartTheme {
    #[serde(with = "hex_color::vec")]
    pub palette: Vec<Color>,
    #[serde(with = "hex_color")]
    pub stroke: Color,
    pub stroke_width: f64,
    #[serde(with = "hex_color")]
    pub label: Color,
    pub label_size: f64,
    #[serde(with = "hex_color")]
    pub placeholder: Color,
    /// Tooltip offset from the pointer, in pixels.
    pub tooltip_offset: (f64, f64),
}

impl Default for ChartTheme {
    fn default() -> Self {
        Self {
            // d3 category10
            palette: vec![
                Color::rgb(0x1f77b4),
                Color::rgb(0xff7f0e),
                Color::rgb(0x2ca02c),
                Color::rgb(0xd62728),
                Color::rgb(0x9467bd),
                Color::rgb(0x8c564b),
                Color::rgb(0xe377c2),
                Color::rgb(0x7f7f7f),
                Color::rgb(0xbcbd22),
                Color::rgb(0x17becf),
            ],
            stroke: Color::WHITE,
            stroke_width: 1.0,
            label: Color::rgb(0x333333),
            label_size: 11.0,
            placeholder: Color::rgb(0x999999),
            tooltip_offset: (12.0, -12.0),
        }
    }
}

/// Ordinal colour scale: each new key takes the next palette entry, and a
/// key keeps its colour for the lifetime of the scale.
#[derive(Clone, Debug)]
pub struct ColorScale {
    palette: Vec<Color>,
    mapping: IndexMap<String, usize>,
}

impl ColorScale {
    pub fn new(palette: Vec<Color>) -> Self {
        Self {
            palette,
            mapping: IndexMap::new(),
        }
    }

    pub fn color_for(&mut self, key: &str) -> Color {
        if self.palette.is_empty() {
            return Color::BLACK;
        }
        let next = self.mapping.len();
        let idx = *self.mapping.entry(key.to_string()).or_insert(next);
        self.palette[idx % self.palette.len()]
    }

    pub fn domain(&self) -> impl Iterator<Item = &str> {
        self.mapping.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_with_and_without_alpha() {
        let c = hex_color::parse_hex_str("#ff8000").unwrap();
        assert_eq!(c.to_hex(), "#ff8000");
        let c = hex_color::parse_hex_str("ff800080").unwrap();
        assert!((c.a - 128.0 / 255.0).abs() < 1e-6);
        assert!(hex_color::parse_hex_str("#12").is_err());
    }

    #[test]
    fn color_scale_is_stable_per_key() {
        let mut scale = ColorScale::new(vec![Color::rgb(0x111111), Color::rgb(0x222222)]);
        let a = scale.color_for("a");
        let b = scale.color_for("b");
        assert_ne!(a, b);
        assert_eq!(scale.color_for("a"), a);
        assert_eq!(scale.color_for("c"), a);
    }
}
