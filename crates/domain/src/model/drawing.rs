//! Map-overlay drawings and layers
//!
//! `Drawing` is selected by `primitiveType`; polygons carry a second tag,
//! `polygonMode`, selecting one of five shapes.

use super::ids::Position;
use sortie_table::Table;
use std::fmt;

/// Color written as `0xRRGGBBAA`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `0xRRGGBBAA` (prefix optional, case-insensitive)
    pub fn from_color_string(s: &str) -> Option<Self> {
        let hex = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        if hex.len() != 8 {
            return None;
        }
        let value = u32::from_str_radix(hex, 16).ok()?;
        let [r, g, b, a] = value.to_be_bytes();
        Some(Self { r, g, b, a })
    }

    pub fn to_color_string(&self) -> String {
        format!("0x{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_color_string())
    }
}

/// Stroke style
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LineStyle {
    Solid,
    Dot,
    Dot2,
    Dash,
    StrongPoint,
    WireFence,
    Boundary1,
    Boundary2,
    Boundary3,
    Boundary4,
    Boundary5,
    Triangle,
    Cross,
    /// A style this version does not know; written back as-is
    Other(UnknownStyle),
}

/// Tag of an unrecognised style. Only [`LineStyle::parse`] builds one, so
/// it never holds a tag that has its own variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnknownStyle(String);

impl UnknownStyle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl LineStyle {
    pub fn as_str(&self) -> &str {
        match self {
            LineStyle::Solid => "solid",
            LineStyle::Dot => "dot",
            LineStyle::Dot2 => "dot2",
            LineStyle::Dash => "dash",
            LineStyle::StrongPoint => "strongpoint",
            LineStyle::WireFence => "wirefence",
            LineStyle::Boundary1 => "boundry1",
            LineStyle::Boundary2 => "boundry2",
            LineStyle::Boundary3 => "boundry3",
            LineStyle::Boundary4 => "boundry4",
            LineStyle::Boundary5 => "boundry5",
            LineStyle::Triangle => "triangle",
            LineStyle::Cross => "cross",
            LineStyle::Other(s) => s.as_str(),
        }
    }

    pub fn parse(tag: &str) -> Self {
        match tag {
            "solid" => LineStyle::Solid,
            "dot" => LineStyle::Dot,
            "dot2" => LineStyle::Dot2,
            "dash" => LineStyle::Dash,
            "strongpoint" => LineStyle::StrongPoint,
            "wirefence" => LineStyle::WireFence,
            "boundry1" => LineStyle::Boundary1,
            "boundry2" => LineStyle::Boundary2,
            "boundry3" => LineStyle::Boundary3,
            "boundry4" => LineStyle::Boundary4,
            "boundry5" => LineStyle::Boundary5,
            "triangle" => LineStyle::Triangle,
            "cross" => LineStyle::Cross,
            other => LineStyle::Other(UnknownStyle(other.to_string())),
        }
    }
}

/// How a line's points are joined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineMode {
    Segment,
    Segments,
    Free,
}

impl LineMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineMode::Segment => "segment",
            LineMode::Segments => "segments",
            LineMode::Free => "free",
        }
    }

    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "segment" => Some(LineMode::Segment),
            "segments" => Some(LineMode::Segments),
            "free" => Some(LineMode::Free),
            _ => None,
        }
    }
}

/// Fields every drawing has
#[derive(Debug, Clone, PartialEq)]
pub struct DrawingCommon {
    pub visible: bool,
    pub position: Position,
    pub name: String,
    pub color: Rgba,
    pub layer_name: String,
    /// Unmodeled fields, written back untouched
    pub extra: Table,
}

impl DrawingCommon {
    pub fn new(name: impl Into<String>, position: Position, color: Rgba) -> Self {
        Self {
            visible: true,
            position,
            name: name.into(),
            color,
            layer_name: String::new(),
            extra: Table::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineDrawing {
    pub common: DrawingCommon,
    pub closed: bool,
    pub thickness: f64,
    pub style: LineStyle,
    pub line_mode: LineMode,
    /// Offsets from the drawing position
    pub points: Vec<Position>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IconDrawing {
    pub common: DrawingCommon,
    pub file: String,
    pub scale: f64,
    pub angle: f64,
}

/// Polygon geometry, selected by `polygonMode`
#[derive(Debug, Clone, PartialEq)]
pub enum PolygonShape {
    Circle { radius: f64 },
    Oval { r1: f64, r2: f64, angle: f64 },
    Rectangle { width: f64, height: f64, angle: f64 },
    Free { points: Vec<Position> },
    Arrow { length: f64, angle: f64, points: Vec<Position> },
}

impl PolygonShape {
    pub fn mode(&self) -> &'static str {
        match self {
            PolygonShape::Circle { .. } => "circle",
            PolygonShape::Oval { .. } => "oval",
            PolygonShape::Rectangle { .. } => "rect",
            PolygonShape::Free { .. } => "free",
            PolygonShape::Arrow { .. } => "arrow",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PolygonDrawing {
    pub common: DrawingCommon,
    pub fill: Rgba,
    pub thickness: f64,
    pub style: LineStyle,
    pub shape: PolygonShape,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextBoxDrawing {
    pub common: DrawingCommon,
    pub text: String,
    pub font_size: i64,
    pub font: String,
    pub border_thickness: f64,
    pub fill: Rgba,
    pub angle: f64,
}

/// A map overlay object
#[derive(Debug, Clone, PartialEq)]
pub enum Drawing {
    Line(LineDrawing),
    Icon(IconDrawing),
    Polygon(PolygonDrawing),
    TextBox(TextBoxDrawing),
}

impl Drawing {
    /// The `primitiveType` tag
    pub fn primitive_type(&self) -> &'static str {
        match self {
            Drawing::Line(_) => "Line",
            Drawing::Icon(_) => "Icon",
            Drawing::Polygon(_) => "Polygon",
            Drawing::TextBox(_) => "TextBox",
        }
    }

    pub fn common(&self) -> &DrawingCommon {
        match self {
            Drawing::Line(d) => &d.common,
            Drawing::Icon(d) => &d.common,
            Drawing::Polygon(d) => &d.common,
            Drawing::TextBox(d) => &d.common,
        }
    }

    pub fn common_mut(&mut self) -> &mut DrawingCommon {
        match self {
            Drawing::Line(d) => &mut d.common,
            Drawing::Icon(d) => &mut d.common,
            Drawing::Polygon(d) => &mut d.common,
            Drawing::TextBox(d) => &mut d.common,
        }
    }

    pub fn name(&self) -> &str {
        &self.common().name
    }
}

/// A named collection of drawings
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub name: String,
    pub visible: bool,
    pub objects: Vec<Drawing>,
}

impl Layer {
    /// Layers every new mission starts with
    pub const DEFAULT_NAMES: [&'static str; 5] = ["Red", "Blue", "Neutral", "Common", "Author"];

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visible: true,
            objects: Vec::new(),
        }
    }

    /// Append a drawing; its layer name is set to this layer
    pub fn add_drawing(&mut self, mut drawing: Drawing) {
        drawing.common_mut().layer_name = self.name.clone();
        self.objects.push(drawing);
    }

    pub fn find(&self, name: &str) -> Option<&Drawing> {
        self.objects.iter().find(|d| d.name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_string() {
        let c = Rgba::from_color_string("0xff00807f").unwrap();
        assert_eq!(c, Rgba::new(255, 0, 128, 127));
        assert_eq!(c.to_color_string(), "0xff00807f");
        assert_eq!(Rgba::from_color_string("0xFF0000FF"), Some(Rgba::new(255, 0, 0, 255)));
        assert_eq!(Rgba::from_color_string("red"), None);
    }

    #[test]
    fn test_line_style_round_trip() {
        assert_eq!(LineStyle::parse("boundry3"), LineStyle::Boundary3);
        assert_eq!(LineStyle::parse("zigzag").as_str(), "zigzag");
        assert!(matches!(LineStyle::parse("zigzag"), LineStyle::Other(_)));

        for tag in ["solid", "dot", "dot2", "dash", "strongpoint", "wirefence", "boundry1", "triangle", "cross"] {
            let style = LineStyle::parse(tag);
            assert!(!matches!(style, LineStyle::Other(_)), "{tag}");
            assert_eq!(LineStyle::parse(style.as_str()), style);
        }
    }

    #[test]
    fn test_layer_sets_layer_name() {
        let mut layer = Layer::new("Blue");
        layer.add_drawing(Drawing::Icon(IconDrawing {
            common: DrawingCommon::new("HQ", Position::new(1.0, 2.0), Rgba::new(0, 0, 255, 255)),
            file: "P91000108.png".into(),
            scale: 1.0,
            angle: 0.0,
        }));

        assert_eq!(layer.find("HQ").unwrap().common().layer_name, "Blue");
        assert_eq!(layer.objects[0].primitive_type(), "Icon");
    }
}
