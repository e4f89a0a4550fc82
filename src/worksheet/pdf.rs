//! Serialise a [`DocumentBuilder`] to PDF bytes with lopdf.
//!
//! Only the two standard Helvetica faces are used, so no font files are
//! embedded and the output stays a few kilobytes per page.

use crate::error::RenderError;
use crate::worksheet::builder::{DocumentBuilder, DrawOp, Rgb};
use crate::worksheet::metrics::{encode_winansi, FontFace};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};

const PT_PER_MM: f32 = 72.0 / 25.4;

fn mm_to_pt(mm: f32) -> f32 {
    mm * PT_PER_MM
}

fn color_operands(c: Rgb) -> Vec<Object> {
    vec![
        (c.0 as f32 / 255.0).into(),
        (c.1 as f32 / 255.0).into(),
        (c.2 as f32 / 255.0).into(),
    ]
}

/// Content-stream operations for one page. `page_height` is in mm and is
/// used to flip the top-left origin into PDF's bottom-left one.
fn page_operations(ops: &[DrawOp], page_height: f32) -> Vec<Operation> {
    let flip = |y: f32| mm_to_pt(page_height - y);
    let mut out = Vec::with_capacity(ops.len() * 5);

    for op in ops {
        match op {
            DrawOp::FillRect { x, y, w, h, color } => {
                out.push(Operation::new("rg", color_operands(*color)));
                out.push(Operation::new(
                    "re",
                    vec![
                        mm_to_pt(*x).into(),
                        flip(y + h).into(),
                        mm_to_pt(*w).into(),
                        mm_to_pt(*h).into(),
                    ],
                ));
                out.push(Operation::new("f", vec![]));
            }
            DrawOp::Line {
                x1,
                y1,
                x2,
                y2,
                color,
                width,
            } => {
                out.push(Operation::new("RG", color_operands(*color)));
                out.push(Operation::new("w", vec![mm_to_pt(*width).into()]));
                out.push(Operation::new("m", vec![mm_to_pt(*x1).into(), flip(*y1).into()]));
                out.push(Operation::new("l", vec![mm_to_pt(*x2).into(), flip(*y2).into()]));
                out.push(Operation::new("S", vec![]));
            }
            DrawOp::Text {
                text,
                x,
                y,
                font,
                size,
                color,
            } => {
                if text.is_empty() {
                    continue;
                }
                out.push(Operation::new("BT", vec![]));
                out.push(Operation::new("rg", color_operands(*color)));
                out.push(Operation::new(
                    "Tf",
                    vec![font.resource_name().into(), (*size).into()],
                ));
                out.push(Operation::new("Td", vec![mm_to_pt(*x).into(), flip(*y).into()]));
                out.push(Operation::new(
                    "Tj",
                    vec![Object::String(encode_winansi(text), StringFormat::Literal)],
                ));
                out.push(Operation::new("ET", vec![]));
            }
        }
    }
    out
}

fn add_font(doc: &mut Document, face: FontFace) -> ObjectId {
    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => face.base_font(),
        "Encoding" => "WinAnsiEncoding",
    })
}

/// Encode every page of `builder` into a single PDF.
pub fn encode(builder: &DocumentBuilder, title: &str) -> Result<Vec<u8>, RenderError> {
    let mut doc = Document::with_version("1.4");
    let pages_id = doc.new_object_id();

    let regular = add_font(&mut doc, FontFace::Helvetica);
    let bold = add_font(&mut doc, FontFace::HelveticaBold);
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            FontFace::Helvetica.resource_name() => regular,
            FontFace::HelveticaBold.resource_name() => bold,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(builder.page_count());
    for ops in builder.pages() {
        let content = Content {
            operations: page_operations(ops, builder.page_height()),
        };
        let data = content.encode().map_err(|e| RenderError::Encode {
            detail: e.to_string(),
        })?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, data));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.set_object(
        pages_id,
        dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                0.into(),
                0.into(),
                mm_to_pt(builder.page_width()).into(),
                mm_to_pt(builder.page_height()).into(),
            ],
        },
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(encode_winansi(title)),
        "Producer" => Object::string_literal(concat!("sagip-worksheet ", env!("CARGO_PKG_VERSION"))),
    });
    doc.trailer.set("Info", info_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).map_err(|e| RenderError::Encode {
        detail: e.to_string(),
    })?;
    Ok(bytes)
}
