//! Drawing and layer codecs
//!
//! ```text
//! primitiveType ─┬─ "Line"     closed, thickness, style, lineMode, points
//!                ├─ "Icon"     file, scale, angle
//!                ├─ "Polygon"  fillColorString, thickness, style, polygonMode ─┬─ "circle"  radius
//!                │                                                             ├─ "oval"    r1, r2, angle
//!                │                                                             ├─ "rect"    width, height, angle
//!                │                                                             ├─ "free"    points
//!                │                                                             └─ "arrow"   length, angle, points
//!                └─ "TextBox"  text, fontSize, font, borderThickness, fillColorString, angle
//! ```
//!
//! Shared fields (visible, colorString, layerName, name, mapX, mapY) are
//! read before the variant fields. Fields nobody models are carried in
//! `DrawingCommon::extra`.

use crate::codec::{decode_field, encode_items, EntityCodec};
use crate::context::{LoadContext, SaveContext};
use crate::record::{points_table, Record};
use sortie_domain::{
    Drawing, DrawingCommon, IconDrawing, Layer, LineDrawing, LineMode, LineStyle, PolygonDrawing,
    PolygonShape, Position, Rgba, TextBoxDrawing,
};
use sortie_shared::{MizError, Result};
use sortie_table::Table;

const COMMON_FIELDS: [&str; 7] = [
    "primitiveType",
    "visible",
    "colorString",
    "layerName",
    "name",
    "mapX",
    "mapY",
];
const LINE_FIELDS: [&str; 5] = ["closed", "thickness", "style", "lineMode", "points"];
const ICON_FIELDS: [&str; 3] = ["file", "scale", "angle"];
const POLYGON_FIELDS: [&str; 4] = ["polygonMode", "fillColorString", "thickness", "style"];
const TEXT_BOX_FIELDS: [&str; 6] = [
    "text",
    "fontSize",
    "font",
    "borderThickness",
    "fillColorString",
    "angle",
];

fn polygon_mode_fields(mode: &str) -> &'static [&'static str] {
    match mode {
        "circle" => &["radius"],
        "oval" => &["r1", "r2", "angle"],
        "rect" => &["width", "height", "angle"],
        "free" => &["points"],
        "arrow" => &["length", "angle", "points"],
        _ => &[],
    }
}

fn color(record: &Record<'_>, field: &str) -> Result<Rgba> {
    let text = record.str(field)?;
    Rgba::from_color_string(text).ok_or_else(|| {
        MizError::malformed(
            record.path(),
            field,
            format!("'{}' is not a 0xRRGGBBAA color", text),
        )
    })
}

fn decode_common(record: &Record<'_>, variant_fields: &[&str]) -> Result<DrawingCommon> {
    let known: Vec<&str> = COMMON_FIELDS
        .iter()
        .chain(variant_fields.iter())
        .copied()
        .collect();

    Ok(DrawingCommon {
        visible: record.bool("visible")?,
        position: Position::new(record.f64("mapX")?, record.f64("mapY")?),
        name: record.str("name")?.to_string(),
        color: color(record, "colorString")?,
        layer_name: record.str("layerName")?.to_string(),
        extra: record.extra(&known),
    })
}

fn encode_common(drawing: &Drawing) -> Table {
    let common = drawing.common();
    Table::new()
        .with("primitiveType", drawing.primitive_type())
        .with("visible", common.visible)
        .with("colorString", common.color.to_color_string())
        .with("layerName", &common.layer_name)
        .with("name", &common.name)
        .with("mapX", common.position.x)
        .with("mapY", common.position.y)
}

fn decode_polygon_shape(record: &Record<'_>, mode: &str) -> Result<PolygonShape> {
    Ok(match mode {
        "circle" => PolygonShape::Circle {
            radius: record.f64("radius")?,
        },
        "oval" => PolygonShape::Oval {
            r1: record.f64("r1")?,
            r2: record.f64("r2")?,
            angle: record.f64("angle")?,
        },
        "rect" => PolygonShape::Rectangle {
            width: record.f64("width")?,
            height: record.f64("height")?,
            angle: record.f64("angle")?,
        },
        "free" => PolygonShape::Free {
            points: record.points("points")?,
        },
        "arrow" => PolygonShape::Arrow {
            length: record.f64("length")?,
            angle: record.f64("angle")?,
            points: record.points("points")?,
        },
        other => {
            return Err(MizError::unsupported(
                "polygon",
                record.path(),
                Some(other.to_string()),
            ))
        }
    })
}

fn encode_polygon_shape(table: &mut Table, shape: &PolygonShape) {
    table.insert("polygonMode", shape.mode());
    match shape {
        PolygonShape::Circle { radius } => {
            table.insert("radius", *radius);
        }
        PolygonShape::Oval { r1, r2, angle } => {
            table.insert("r1", *r1);
            table.insert("r2", *r2);
            table.insert("angle", *angle);
        }
        PolygonShape::Rectangle {
            width,
            height,
            angle,
        } => {
            table.insert("width", *width);
            table.insert("height", *height);
            table.insert("angle", *angle);
        }
        PolygonShape::Free { points } => {
            table.insert("points", points_table(points));
        }
        PolygonShape::Arrow {
            length,
            angle,
            points,
        } => {
            table.insert("length", *length);
            table.insert("angle", *angle);
            table.insert("points", points_table(points));
        }
    }
}

fn line_mode(record: &Record<'_>) -> Result<LineMode> {
    let tag = record.str("lineMode")?;
    LineMode::parse(tag).ok_or_else(|| {
        MizError::malformed(record.path(), "lineMode", format!("unknown line mode '{}'", tag))
    })
}

impl EntityCodec for Drawing {
    const FAMILY: &'static str = "drawing";

    fn decode(record: &Record<'_>, _ctx: &mut LoadContext<'_>) -> Result<Self> {
        let Some(tag) = record.opt_str("primitiveType")? else {
            return Err(MizError::unsupported(Self::FAMILY, record.path(), None));
        };

        match tag {
            "Line" => Ok(Drawing::Line(LineDrawing {
                common: decode_common(record, &LINE_FIELDS)?,
                closed: record.bool("closed")?,
                thickness: record.f64("thickness")?,
                style: LineStyle::parse(record.str("style")?),
                line_mode: line_mode(record)?,
                points: record.points("points")?,
            })),
            "Icon" => Ok(Drawing::Icon(IconDrawing {
                common: decode_common(record, &ICON_FIELDS)?,
                file: record.str("file")?.to_string(),
                scale: record.f64("scale")?,
                angle: record.f64("angle")?,
            })),
            "Polygon" => {
                // secondary discriminator
                let mode = record.str("polygonMode")?;
                let known: Vec<&str> = POLYGON_FIELDS
                    .iter()
                    .chain(polygon_mode_fields(mode).iter())
                    .copied()
                    .collect();
                let shape = decode_polygon_shape(record, mode)?;
                Ok(Drawing::Polygon(PolygonDrawing {
                    common: decode_common(record, &known)?,
                    fill: color(record, "fillColorString")?,
                    thickness: record.f64("thickness")?,
                    style: LineStyle::parse(record.str("style")?),
                    shape,
                }))
            }
            "TextBox" => Ok(Drawing::TextBox(TextBoxDrawing {
                common: decode_common(record, &TEXT_BOX_FIELDS)?,
                text: record.str("text")?.to_string(),
                font_size: record.i64("fontSize")?,
                font: record.str("font")?.to_string(),
                border_thickness: record.f64("borderThickness")?,
                fill: color(record, "fillColorString")?,
                angle: record.f64("angle")?,
            })),
            other => Err(MizError::unsupported(
                Self::FAMILY,
                record.path(),
                Some(other.to_string()),
            )),
        }
    }

    fn encode(&self, _ctx: &SaveContext<'_>) -> Result<Table> {
        let mut table = encode_common(self);
        match self {
            Drawing::Line(line) => {
                table.insert("closed", line.closed);
                table.insert("thickness", line.thickness);
                table.insert("style", line.style.as_str());
                table.insert("lineMode", line.line_mode.as_str());
                table.insert("points", points_table(&line.points));
            }
            Drawing::Icon(icon) => {
                table.insert("file", &icon.file);
                table.insert("scale", icon.scale);
                table.insert("angle", icon.angle);
            }
            Drawing::Polygon(polygon) => {
                table.insert("fillColorString", polygon.fill.to_color_string());
                table.insert("thickness", polygon.thickness);
                table.insert("style", polygon.style.as_str());
                encode_polygon_shape(&mut table, &polygon.shape);
            }
            Drawing::TextBox(text) => {
                table.insert("text", &text.text);
                table.insert("fontSize", text.font_size);
                table.insert("font", &text.font);
                table.insert("borderThickness", text.border_thickness);
                table.insert("fillColorString", text.fill.to_color_string());
                table.insert("angle", text.angle);
            }
        }
        table.merge_missing(&self.common().extra);
        Ok(table)
    }
}

impl EntityCodec for Layer {
    const FAMILY: &'static str = "layer";

    fn decode(record: &Record<'_>, ctx: &mut LoadContext<'_>) -> Result<Self> {
        Ok(Layer {
            name: record.str("name")?.to_string(),
            visible: record.bool_or("visible", true)?,
            objects: decode_field(record, "objects", ctx)?,
        })
    }

    fn encode(&self, ctx: &SaveContext<'_>) -> Result<Table> {
        Ok(Table::new()
            .with("name", &self.name)
            .with("visible", self.visible)
            .with("objects", encode_items(&self.objects, ctx)?))
    }
}
