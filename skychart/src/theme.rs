//! Chart colour themes.
//!
//! A [`Theme`] is a closed palette: every colour a layer may ask for is a
//! required field, so a theme that parses is a theme that renders. Ten themes
//! are built in; more can be loaded from JSON files of the same shape.

use std::fmt;
use std::fs;
use std::path::Path;

use log::{debug, info, warn};
use once_cell::sync::Lazy;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use starfield::Rgb;

use crate::{ChartError, Result};

/// Name of the theme used when none is given or a name is unknown
pub const DEFAULT_THEME: &str = "midnight";

/// A palette colour, written as `#rrggbb` in JSON and SVG.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color(pub Rgb);

impl Color {
    /// Colour from a `0xRRGGBB` literal
    pub const fn hex(value: u32) -> Self {
        Color(Rgb::new(
            ((value >> 16) & 0xff) as u8,
            ((value >> 8) & 0xff) as u8,
            (value & 0xff) as u8,
        ))
    }

    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }
}

impl From<Rgb> for Color {
    fn from(rgb: Rgb) -> Self {
        Color(rgb)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Rgb::from_hex(&text)
            .map(Color)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid colour '{text}'")))
    }
}

/// Named chart palette.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Poster background outside the sky disc
    pub background: Color,
    /// Poster background gradient, top and bottom stops
    pub gradient_top: Color,
    pub gradient_bottom: Color,
    /// Sky disc radial gradient, zenith and horizon stops
    pub sky_center: Color,
    pub sky_edge: Color,
    pub text: Color,
    pub caption_background: Color,
    /// Monochrome star tiers: magnitude < 0, < 2, and the rest
    pub star_bright: Color,
    pub star_mid: Color,
    pub star_dim: Color,
    pub planet: Color,
    pub moon_light: Color,
    pub moon_dark: Color,
    pub constellation_line: Color,
    pub constellation_label: Color,
    pub grid: Color,
    pub ecliptic: Color,
    pub horizon: Color,
    pub zodiac: Color,
}

impl Default for Theme {
    fn default() -> Self {
        BUILTIN_THEMES[0].clone()
    }
}

impl Theme {
    /// All built-in themes, default first
    pub fn builtin_themes() -> &'static [Theme] {
        &BUILTIN_THEMES
    }

    /// Names of the built-in themes
    pub fn builtin_names() -> Vec<&'static str> {
        BUILTIN_THEMES.iter().map(|t| t.name.as_str()).collect()
    }

    /// Look up a built-in theme, ignoring case
    pub fn builtin(name: &str) -> Option<Theme> {
        find(&BUILTIN_THEMES, name).cloned()
    }

    /// Built-in theme by name, falling back to the default with a warning
    pub fn resolve(name: &str) -> Theme {
        Self::resolve_with(name, &[])
    }

    /// Like [`Theme::resolve`], but `custom` themes are searched first
    pub fn resolve_with(name: &str, custom: &[Theme]) -> Theme {
        if let Some(theme) = find(custom, name).or_else(|| find(&BUILTIN_THEMES, name)) {
            debug!("Using theme '{}'", theme.name);
            return theme.clone();
        }
        warn!("Unknown theme '{name}', falling back to '{DEFAULT_THEME}'");
        Theme::default()
    }

    pub fn from_json_str(json: &str) -> Result<Theme> {
        serde_json::from_str(json).map_err(|e| ChartError::Theme(e.to_string()))
    }

    /// Load a theme file; an empty `name` is replaced by the file stem
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Theme> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| ChartError::Theme(format!("{}: {e}", path.display())))?;
        let mut theme: Theme = serde_json::from_str(&text)
            .map_err(|e| ChartError::Theme(format!("{}: {e}", path.display())))?;
        if theme.name.trim().is_empty() {
            if let Some(stem) = path.file_stem() {
                theme.name = stem.to_string_lossy().into_owned();
            }
        }
        info!("Loaded theme '{}' from {}", theme.name, path.display());
        Ok(theme)
    }
}

fn find<'a>(themes: &'a [Theme], name: &str) -> Option<&'a Theme> {
    themes.iter().find(|t| t.name.eq_ignore_ascii_case(name.trim()))
}

/// Load every `*.json` theme in a directory, in file-name order
pub fn load_theme_dir(dir: impl AsRef<Path>) -> Result<Vec<Theme>> {
    let dir = dir.as_ref();
    let entries =
        fs::read_dir(dir).map_err(|e| ChartError::Theme(format!("{}: {e}", dir.display())))?;

    let mut paths: Vec<_> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    paths.iter().map(|p| Theme::from_json_file(p)).collect()
}

static BUILTIN_THEMES: Lazy<Vec<Theme>> = Lazy::new(|| {
    vec![
        Theme {
            name: "midnight".into(),
            description: "Deep navy sky with warm gold accents".into(),
            background: Color::hex(0x0b1026),
            gradient_top: Color::hex(0x0b1026),
            gradient_bottom: Color::hex(0x1b2350),
            sky_center: Color::hex(0x141b3d),
            sky_edge: Color::hex(0x070a1a),
            text: Color::hex(0xf5e6c8),
            caption_background: Color::hex(0x0b1026),
            star_bright: Color::hex(0xffffff),
            star_mid: Color::hex(0xe8ecff),
            star_dim: Color::hex(0xa9b3d6),
            planet: Color::hex(0xffd27a),
            moon_light: Color::hex(0xf4f1e6),
            moon_dark: Color::hex(0x1d2340),
            constellation_line: Color::hex(0x5c6aa8),
            constellation_label: Color::hex(0x8f9bd0),
            grid: Color::hex(0x2a3466),
            ecliptic: Color::hex(0xc9a45c),
            horizon: Color::hex(0xf5e6c8),
            zodiac: Color::hex(0xc9a45c),
        },
        Theme {
            name: "classic".into(),
            description: "Black sky, white stars, no frills".into(),
            background: Color::hex(0x000000),
            gradient_top: Color::hex(0x000000),
            gradient_bottom: Color::hex(0x0a0a0a),
            sky_center: Color::hex(0x0d0d12),
            sky_edge: Color::hex(0x000000),
            text: Color::hex(0xffffff),
            caption_background: Color::hex(0x000000),
            star_bright: Color::hex(0xffffff),
            star_mid: Color::hex(0xdddddd),
            star_dim: Color::hex(0x999999),
            planet: Color::hex(0xffe9a8),
            moon_light: Color::hex(0xf2f2f2),
            moon_dark: Color::hex(0x1a1a1a),
            constellation_line: Color::hex(0x555555),
            constellation_label: Color::hex(0x888888),
            grid: Color::hex(0x2b2b2b),
            ecliptic: Color::hex(0x777777),
            horizon: Color::hex(0xffffff),
            zodiac: Color::hex(0xaaaaaa),
        },
        Theme {
            name: "aurora".into(),
            description: "Polar night with green and violet highlights".into(),
            background: Color::hex(0x04141a),
            gradient_top: Color::hex(0x04141a),
            gradient_bottom: Color::hex(0x0c2b2a),
            sky_center: Color::hex(0x0a2a2e),
            sky_edge: Color::hex(0x030c10),
            text: Color::hex(0xc8ffe6),
            caption_background: Color::hex(0x04141a),
            star_bright: Color::hex(0xf0fff8),
            star_mid: Color::hex(0xc8f5e4),
            star_dim: Color::hex(0x7fb8a8),
            planet: Color::hex(0xd7a6ff),
            moon_light: Color::hex(0xeafff6),
            moon_dark: Color::hex(0x0f2a2a),
            constellation_line: Color::hex(0x2f8f74),
            constellation_label: Color::hex(0x5fd3a8),
            grid: Color::hex(0x12403a),
            ecliptic: Color::hex(0xa672e8),
            horizon: Color::hex(0x5fd3a8),
            zodiac: Color::hex(0xa672e8),
        },
        Theme {
            name: "nebula".into(),
            description: "Magenta and indigo, like an emission nebula".into(),
            background: Color::hex(0x14061f),
            gradient_top: Color::hex(0x14061f),
            gradient_bottom: Color::hex(0x2e0d3d),
            sky_center: Color::hex(0x2a0b3a),
            sky_edge: Color::hex(0x0c0313),
            text: Color::hex(0xffd9f2),
            caption_background: Color::hex(0x14061f),
            star_bright: Color::hex(0xffffff),
            star_mid: Color::hex(0xffd6f0),
            star_dim: Color::hex(0xb88ac7),
            planet: Color::hex(0xffb36b),
            moon_light: Color::hex(0xfff0fa),
            moon_dark: Color::hex(0x2b1238),
            constellation_line: Color::hex(0x8a3fa0),
            constellation_label: Color::hex(0xd48ae6),
            grid: Color::hex(0x3f1852),
            ecliptic: Color::hex(0xff6fb5),
            horizon: Color::hex(0xffd9f2),
            zodiac: Color::hex(0xff6fb5),
        },
        Theme {
            name: "sepia".into(),
            description: "Antique star atlas on aged paper".into(),
            background: Color::hex(0xf3e7cf),
            gradient_top: Color::hex(0xf3e7cf),
            gradient_bottom: Color::hex(0xe6d3ad),
            sky_center: Color::hex(0xf6ecd6),
            sky_edge: Color::hex(0xe3cfa4),
            text: Color::hex(0x4a3520),
            caption_background: Color::hex(0xf3e7cf),
            star_bright: Color::hex(0x2b1d10),
            star_mid: Color::hex(0x4a3520),
            star_dim: Color::hex(0x7a5e40),
            planet: Color::hex(0x9c3d1c),
            moon_light: Color::hex(0xfffaf0),
            moon_dark: Color::hex(0xb59b73),
            constellation_line: Color::hex(0x8c6d46),
            constellation_label: Color::hex(0x6b5133),
            grid: Color::hex(0xcdb68a),
            ecliptic: Color::hex(0x9c3d1c),
            horizon: Color::hex(0x4a3520),
            zodiac: Color::hex(0x9c3d1c),
        },
        Theme {
            name: "ocean".into(),
            description: "Deep-water blues with aqua lines".into(),
            background: Color::hex(0x021526),
            gradient_top: Color::hex(0x021526),
            gradient_bottom: Color::hex(0x03346e),
            sky_center: Color::hex(0x0a2f57),
            sky_edge: Color::hex(0x010b16),
            text: Color::hex(0xe2f3ff),
            caption_background: Color::hex(0x021526),
            star_bright: Color::hex(0xffffff),
            star_mid: Color::hex(0xd0ecff),
            star_dim: Color::hex(0x7fa9c9),
            planet: Color::hex(0xffd88a),
            moon_light: Color::hex(0xf0f8ff),
            moon_dark: Color::hex(0x0b2a47),
            constellation_line: Color::hex(0x2f7fb3),
            constellation_label: Color::hex(0x6ec2f0),
            grid: Color::hex(0x0f3d66),
            ecliptic: Color::hex(0x48d1cc),
            horizon: Color::hex(0x6ec2f0),
            zodiac: Color::hex(0x48d1cc),
        },
        Theme {
            name: "blueprint".into(),
            description: "Engineering drawing: white lines on cyan-blue".into(),
            background: Color::hex(0x1f4e8c),
            gradient_top: Color::hex(0x1f4e8c),
            gradient_bottom: Color::hex(0x1a4378),
            sky_center: Color::hex(0x2358a0),
            sky_edge: Color::hex(0x1b477f),
            text: Color::hex(0xffffff),
            caption_background: Color::hex(0x1f4e8c),
            star_bright: Color::hex(0xffffff),
            star_mid: Color::hex(0xe6f0ff),
            star_dim: Color::hex(0xb3cdf0),
            planet: Color::hex(0xfff3b0),
            moon_light: Color::hex(0xffffff),
            moon_dark: Color::hex(0x2a63ad),
            constellation_line: Color::hex(0xcfe0ff),
            constellation_label: Color::hex(0xffffff),
            grid: Color::hex(0x5a86c2),
            ecliptic: Color::hex(0xfff3b0),
            horizon: Color::hex(0xffffff),
            zodiac: Color::hex(0xfff3b0),
        },
        Theme {
            name: "monochrome".into(),
            description: "Print-friendly black ink on white".into(),
            background: Color::hex(0xffffff),
            gradient_top: Color::hex(0xffffff),
            gradient_bottom: Color::hex(0xf2f2f2),
            sky_center: Color::hex(0xffffff),
            sky_edge: Color::hex(0xf4f4f4),
            text: Color::hex(0x000000),
            caption_background: Color::hex(0xffffff),
            star_bright: Color::hex(0x000000),
            star_mid: Color::hex(0x222222),
            star_dim: Color::hex(0x555555),
            planet: Color::hex(0x000000),
            moon_light: Color::hex(0xffffff),
            moon_dark: Color::hex(0x333333),
            constellation_line: Color::hex(0x999999),
            constellation_label: Color::hex(0x444444),
            grid: Color::hex(0xdddddd),
            ecliptic: Color::hex(0x777777),
            horizon: Color::hex(0x000000),
            zodiac: Color::hex(0x555555),
        },
        Theme {
            name: "crimson".into(),
            description: "Red-light astronomy palette that spares night vision".into(),
            background: Color::hex(0x120304),
            gradient_top: Color::hex(0x120304),
            gradient_bottom: Color::hex(0x2a0709),
            sky_center: Color::hex(0x220608),
            sky_edge: Color::hex(0x0a0102),
            text: Color::hex(0xff6b6b),
            caption_background: Color::hex(0x120304),
            star_bright: Color::hex(0xffb3b3),
            star_mid: Color::hex(0xff8080),
            star_dim: Color::hex(0xb34747),
            planet: Color::hex(0xffcc99),
            moon_light: Color::hex(0xffd6d6),
            moon_dark: Color::hex(0x2e0a0c),
            constellation_line: Color::hex(0x7a1f24),
            constellation_label: Color::hex(0xc0393f),
            grid: Color::hex(0x3d0c10),
            ecliptic: Color::hex(0xd95f4a),
            horizon: Color::hex(0xff6b6b),
            zodiac: Color::hex(0xd95f4a),
        },
        Theme {
            name: "forest".into(),
            description: "Night sky over a pine forest, green and amber".into(),
            background: Color::hex(0x0b1a12),
            gradient_top: Color::hex(0x0b1a12),
            gradient_bottom: Color::hex(0x16301f),
            sky_center: Color::hex(0x132a1c),
            sky_edge: Color::hex(0x06100a),
            text: Color::hex(0xe9f2d0),
            caption_background: Color::hex(0x0b1a12),
            star_bright: Color::hex(0xfffef2),
            star_mid: Color::hex(0xe9f2d0),
            star_dim: Color::hex(0x9db38c),
            planet: Color::hex(0xf2b84b),
            moon_light: Color::hex(0xf8f6e8),
            moon_dark: Color::hex(0x1c3324),
            constellation_line: Color::hex(0x4f7a55),
            constellation_label: Color::hex(0x8fbf8f),
            grid: Color::hex(0x1f3d2a),
            ecliptic: Color::hex(0xf2b84b),
            horizon: Color::hex(0xe9f2d0),
            zodiac: Color::hex(0xf2b84b),
        },
    ]
});
