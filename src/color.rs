//! Cell colours: linear gradients and five-step palettes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};
use crate::level::intensity;
use crate::types::{ActivityCount, Level};

/// An sRGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build from a `0xRRGGBB` literal.
    #[must_use]
    pub const fn from_u32(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as u8,
            g: ((hex >> 8) & 0xff) as u8,
            b: (hex & 0xff) as u8,
        }
    }

    /// Per-channel linear blend, `t` clamped to `[0, 1]`.
    ///
    /// `t == 1.0` returns `other` exactly.
    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self {
            r: lerp_channel(self.r, other.r, t),
            g: lerp_channel(self.g, other.g, t),
            b: lerp_channel(self.b, other.b, t),
        }
    }

    /// Channels as `0.0..=1.0` floats for drawing APIs.
    #[must_use]
    pub fn to_unit(self) -> (f64, f64, f64) {
        (
            f64::from(self.r) / 255.0,
            f64::from(self.g) / 255.0,
            f64::from(self.b) / 255.0,
        )
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn lerp_channel(a: u8, b: u8, t: f64) -> u8 {
    let a = f64::from(a);
    let b = f64::from(b);
    (a + (b - a) * t).round().clamp(0.0, 255.0) as u8
}

impl FromStr for Rgb {
    type Err = Error;

    /// Accepts `#rrggbb`, `rrggbb` and `#rgb`.
    fn from_str(s: &str) -> Result<Self> {
        let hex = s.trim().trim_start_matches('#');
        let invalid = || Error::InvalidColor(s.to_string());

        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        match hex.len() {
            6 => u32::from_str_radix(hex, 16)
                .map(Self::from_u32)
                .map_err(|_| invalid()),
            3 => {
                let mut channels = [0u8; 3];
                for (slot, c) in channels.iter_mut().zip(hex.chars()) {
                    let nibble = c.to_digit(16).ok_or_else(invalid)?;
                    *slot = u8::try_from(nibble * 17).map_err(|_| invalid())?;
                }
                Ok(Self::new(channels[0], channels[1], channels[2]))
            }
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// What a renderer should paint for a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "rgb")]
pub enum CellColor {
    Solid(Rgb),
    /// Padding cells and out-of-range levels.
    Transparent,
}

impl CellColor {
    #[must_use]
    pub const fn rgb(self) -> Option<Rgb> {
        match self {
            Self::Solid(rgb) => Some(rgb),
            Self::Transparent => None,
        }
    }
}

impl fmt::Display for CellColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Solid(rgb) => fmt::Display::fmt(rgb, f),
            Self::Transparent => f.write_str("transparent"),
        }
    }
}

// ============================================================================
// Gradient
// ============================================================================

/// Continuous colouring between two endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Gradient {
    /// Colour of the lowest non-zero intensity.
    pub start: Rgb,
    /// Colour of the scope maximum.
    pub end: Rgb,
    /// Colour of days with no activity.
    pub empty: Rgb,
}

impl Default for Gradient {
    fn default() -> Self {
        Self {
            start: Rgb::from_u32(0x00e6_f4ea),
            end: Rgb::from_u32(0x001b_8f3b),
            empty: Rgb::from_u32(0x00f3_f3f3),
        }
    }
}

impl Gradient {
    /// Colour for `count` against the scope maximum `max`.
    #[must_use]
    pub fn color_for(&self, count: ActivityCount, max: ActivityCount) -> Rgb {
        if count.is_zero() {
            return self.empty;
        }
        self.start.lerp(self.end, intensity(count, max))
    }

    /// Colour for a pre-computed intensity in `[0, 1]`; zero maps to empty.
    #[must_use]
    pub fn color_at(&self, t: f64) -> Rgb {
        if t <= 0.0 {
            return self.empty;
        }
        self.start.lerp(self.end, t)
    }
}

// ============================================================================
// Palette
// ============================================================================

/// Discrete colouring, one entry per level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Palette(pub [Rgb; Level::COUNT]);

impl Default for Palette {
    fn default() -> Self {
        Self([
            Rgb::from_u32(0x00e0_e0e0),
            Rgb::from_u32(0x00c6_e48b),
            Rgb::from_u32(0x007b_c96f),
            Rgb::from_u32(0x0023_9a3b),
            Rgb::from_u32(0x0019_6127),
        ])
    }
}

impl Palette {
    /// Colour for a level.
    #[must_use]
    pub fn color_for(&self, level: Level) -> CellColor {
        self.color_for_index(level.index())
    }

    /// Colour for a raw level index; anything past the last entry is
    /// transparent.
    #[must_use]
    pub fn color_for_index(&self, index: usize) -> CellColor {
        self.0
            .get(index)
            .copied()
            .map_or(CellColor::Transparent, CellColor::Solid)
    }
}

// ============================================================================
// ColorScheme
// ============================================================================

/// Which colouring a heatmap uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Gradient,
    Palette,
}

/// Complete colouring configuration for day cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorScheme {
    pub mode: ColorMode,
    pub gradient: Gradient,
    pub palette: Palette,
}

impl ColorScheme {
    /// Resolve a day cell. `max` is the scope maximum; `level` is only read
    /// in palette mode.
    #[must_use]
    pub fn paint(&self, count: ActivityCount, level: Level, max: ActivityCount) -> CellColor {
        match self.mode {
            ColorMode::Gradient => CellColor::Solid(self.gradient.color_for(count, max)),
            ColorMode::Palette => self.palette.color_for(level),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(n: u64) -> ActivityCount {
        ActivityCount::new(n)
    }

    mod rgb {
        use super::*;

        #[test]
        fn parse_forms() {
            assert_eq!("#1b8f3b".parse::<Rgb>().unwrap(), Rgb::new(0x1b, 0x8f, 0x3b));
            assert_eq!("1B8F3B".parse::<Rgb>().unwrap(), Rgb::new(0x1b, 0x8f, 0x3b));
            assert_eq!("#fa0".parse::<Rgb>().unwrap(), Rgb::new(0xff, 0xaa, 0x00));
        }

        #[test]
        fn parse_rejects_junk() {
            for bad in ["", "#12345", "#gggggg", "#1234567", "+12345"] {
                assert!(bad.parse::<Rgb>().is_err(), "{bad}");
            }
        }

        #[test]
        fn display_round_trips() {
            let rgb = Rgb::new(1, 171, 255);
            assert_eq!(rgb.to_string(), "#01abff");
            assert_eq!(rgb.to_string().parse::<Rgb>().unwrap(), rgb);
        }

        #[test]
        fn serde_as_hex_string() {
            let json = serde_json::to_string(&Rgb::new(0, 0, 0)).unwrap();
            assert_eq!(json, "\"#000000\"");
            assert!(serde_json::from_str::<Rgb>("\"nope\"").is_err());
        }

        #[test]
        fn lerp_endpoints_are_exact() {
            let a = Rgb::new(0xe6, 0xf4, 0xea);
            let b = Rgb::new(0x1b, 0x8f, 0x3b);
            assert_eq!(a.lerp(b, 0.0), a);
            assert_eq!(a.lerp(b, 1.0), b);
            assert_eq!(a.lerp(b, 7.0), b);
            assert_eq!(Rgb::new(0, 0, 0).lerp(Rgb::new(255, 101, 10), 0.5), Rgb::new(128, 51, 5));
        }
    }

    mod gradient {
        use super::*;

        #[test]
        fn zero_is_empty() {
            let g = Gradient::default();
            assert_eq!(g.color_for(c(0), c(10)), g.empty);
            assert_eq!(g.color_for(c(0), c(0)), g.empty);
            assert_eq!(g.color_at(0.0), g.empty);
        }

        #[test]
        fn max_is_end_color() {
            let g = Gradient::default();
            for max in [1, 3, 7, 99, 1_000_003] {
                assert_eq!(g.color_for(c(max), c(max)), g.end);
            }
        }

        #[test]
        fn midpoint() {
            let g = Gradient {
                start: Rgb::new(0, 0, 0),
                end: Rgb::new(200, 100, 50),
                empty: Rgb::new(255, 255, 255),
            };
            assert_eq!(g.color_for(c(1), c(2)), Rgb::new(100, 50, 25));
            assert_eq!(g.color_for(c(5), c(2)), g.end);
        }
    }

    mod palette {
        use super::*;

        #[test]
        fn indexes_by_level() {
            let p = Palette::default();
            assert_eq!(p.color_for(Level::NONE), CellColor::Solid(Rgb::from_u32(0x00e0_e0e0)));
            assert_eq!(p.color_for(Level::MAX), CellColor::Solid(Rgb::from_u32(0x0019_6127)));
        }

        #[test]
        fn out_of_range_is_transparent() {
            let p = Palette::default();
            assert_eq!(p.color_for_index(5), CellColor::Transparent);
            assert_eq!(p.color_for_index(usize::MAX), CellColor::Transparent);
        }
    }

    #[test]
    fn scheme_switches_mode() {
        let mut scheme = ColorScheme::default();
        let level = Level::new(2).unwrap();
        assert_eq!(
            scheme.paint(c(4), level, c(4)),
            CellColor::Solid(scheme.gradient.end)
        );
        scheme.mode = ColorMode::Palette;
        assert_eq!(scheme.paint(c(4), level, c(4)), scheme.palette.color_for(level));
    }

    #[test]
    fn scheme_from_toml() {
        let scheme: ColorScheme = toml::from_str(
            r##"
            mode = "palette"
            palette = ["#000000", "#111111", "#222222", "#333333", "#444444"]
            [gradient]
            end = "#ff0000"
            "##,
        )
        .unwrap();
        assert_eq!(scheme.mode, ColorMode::Palette);
        assert_eq!(scheme.gradient.end, Rgb::new(255, 0, 0));
        assert_eq!(scheme.gradient.start, Gradient::default().start);
        assert_eq!(scheme.palette.0[4], Rgb::new(0x44, 0x44, 0x44));
    }
}
