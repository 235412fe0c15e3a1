//! Visual styling and color resolution for health charts

use crate::errors::{Result, VisualizationError};
use plotters::style::RGBColor;

/// Color scheme for the chart chrome (everything that is not a marker)
#[derive(Debug, Clone)]
pub struct ColorScheme {
    /// Background color
    pub background: RGBColor,
    /// Title, tick labels and legend text
    pub text: RGBColor,
    /// X-axis line and tick marks
    pub axis: RGBColor,
    /// Legend box background
    pub legend_background: RGBColor,
    /// Legend box border
    pub legend_border: RGBColor,
}

impl ColorScheme {
    /// Plain white sheet, dark text
    pub fn light() -> Self {
        Self {
            background: RGBColor(255, 255, 255),
            text: RGBColor(0, 0, 0),
            axis: RGBColor(0, 0, 0),
            legend_background: RGBColor(255, 255, 255),
            legend_border: RGBColor(204, 204, 204),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::light()
    }
}

/// Visual styling configuration for a chart scene
#[derive(Debug, Clone)]
pub struct ChartStyle {
    /// Color scheme to use
    pub colors: ColorScheme,
    /// Stroke width of connected lines
    pub line_width: u32,
    /// Stroke width of horizontal state segments
    pub step_width: u32,
    /// Radius of point glyphs in pixels
    pub point_radius: u32,
    /// Size of event triangles in pixels
    pub triangle_size: u32,
    /// Font size of the title
    pub title_font_size: u32,
    /// Font size of value labels
    pub label_font_size: u32,
    /// Font size of tick labels and annotations
    pub tick_font_size: u32,
    /// Dash pattern for guides
    pub dashed: GuideStyle,
    /// Dot pattern for midpoint guides
    pub dotted: GuideStyle,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            colors: ColorScheme::default(),
            line_width: 2,
            step_width: 2,
            point_radius: 4,
            triangle_size: 7,
            title_font_size: 22,
            label_font_size: 13,
            tick_font_size: 12,
            dashed: GuideStyle::dashed(),
            dotted: GuideStyle::dotted(),
        }
    }
}

/// Dash pattern in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuideStyle {
    pub dash: f64,
    pub gap: f64,
    pub width: u32,
}

impl GuideStyle {
    pub fn dashed() -> Self {
        Self {
            dash: 6.0,
            gap: 4.0,
            width: 1,
        }
    }

    pub fn dotted() -> Self {
        Self {
            dash: 1.5,
            gap: 3.0,
            width: 1,
        }
    }
}

/// Named colors accepted in configuration files.
///
/// Covers the single-letter shorthands, the `tab:` qualitative palette and the
/// common CSS names.
const NAMED_COLORS: &[(&str, (u8, u8, u8))] = &[
    ("b", (0, 0, 255)),
    ("g", (0, 128, 0)),
    ("r", (255, 0, 0)),
    ("c", (0, 191, 191)),
    ("m", (191, 0, 191)),
    ("y", (191, 191, 0)),
    ("k", (0, 0, 0)),
    ("w", (255, 255, 255)),
    ("tab:blue", (0x1f, 0x77, 0xb4)),
    ("tab:orange", (0xff, 0x7f, 0x0e)),
    ("tab:green", (0x2c, 0xa0, 0x2c)),
    ("tab:red", (0xd6, 0x27, 0x28)),
    ("tab:purple", (0x94, 0x67, 0xbd)),
    ("tab:brown", (0x8c, 0x56, 0x4b)),
    ("tab:pink", (0xe3, 0x77, 0xc2)),
    ("tab:gray", (0x7f, 0x7f, 0x7f)),
    ("tab:grey", (0x7f, 0x7f, 0x7f)),
    ("tab:olive", (0xbc, 0xbd, 0x22)),
    ("tab:cyan", (0x17, 0xbe, 0xcf)),
    ("black", (0, 0, 0)),
    ("white", (255, 255, 255)),
    ("red", (255, 0, 0)),
    ("green", (0, 128, 0)),
    ("blue", (0, 0, 255)),
    ("yellow", (255, 255, 0)),
    ("orange", (255, 165, 0)),
    ("purple", (128, 0, 128)),
    ("brown", (165, 42, 42)),
    ("pink", (255, 192, 203)),
    ("gray", (128, 128, 128)),
    ("grey", (128, 128, 128)),
    ("olive", (128, 128, 0)),
    ("cyan", (0, 255, 255)),
    ("magenta", (255, 0, 255)),
    ("navy", (0, 0, 128)),
    ("teal", (0, 128, 128)),
    ("maroon", (128, 0, 0)),
    ("lime", (0, 255, 0)),
    ("gold", (255, 215, 0)),
    ("silver", (192, 192, 192)),
    ("darkgreen", (0, 100, 0)),
    ("darkblue", (0, 0, 139)),
    ("darkred", (139, 0, 0)),
    ("darkorange", (255, 140, 0)),
    ("darkviolet", (148, 0, 211)),
    ("darkgray", (169, 169, 169)),
    ("darkgrey", (169, 169, 169)),
    ("lightgray", (211, 211, 211)),
    ("lightgrey", (211, 211, 211)),
    ("lightblue", (173, 216, 230)),
    ("lightgreen", (144, 238, 144)),
    ("skyblue", (135, 206, 235)),
    ("steelblue", (70, 130, 180)),
    ("royalblue", (65, 105, 225)),
    ("crimson", (220, 20, 60)),
    ("firebrick", (178, 34, 34)),
    ("tomato", (255, 99, 71)),
    ("coral", (255, 127, 80)),
    ("salmon", (250, 128, 114)),
    ("chocolate", (210, 105, 30)),
    ("sienna", (160, 82, 45)),
    ("violet", (238, 130, 238)),
    ("indigo", (75, 0, 130)),
    ("turquoise", (64, 224, 208)),
    ("forestgreen", (34, 139, 34)),
    ("seagreen", (46, 139, 87)),
    ("limegreen", (50, 205, 50)),
    ("khaki", (240, 230, 140)),
    ("slategray", (112, 128, 144)),
    ("slategrey", (112, 128, 144)),
];

/// Resolve a color specification to an RGB triple.
///
/// Accepts `#rrggbb`, `#rgb` and the names in [`NAMED_COLORS`], ignoring case
/// and surrounding whitespace.
pub fn parse_color(spec: &str) -> Result<RGBColor> {
    let normalized = spec.trim().to_ascii_lowercase();
    let invalid = || VisualizationError::InvalidColor {
        color: spec.to_string(),
    };

    if let Some(hex) = normalized.strip_prefix('#') {
        if !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
        return match hex.len() {
            6 => Ok(RGBColor(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            3 => {
                let short = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);
                Ok(RGBColor(short(0)?, short(1)?, short(2)?))
            }
            _ => Err(invalid()),
        };
    }

    NAMED_COLORS
        .iter()
        .find(|(name, _)| *name == normalized)
        .map(|&(_, (r, g, b))| RGBColor(r, g, b))
        .ok_or_else(invalid)
}
