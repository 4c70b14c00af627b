use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use super::layout::{Color, DrawOp, FontKind, Page, PageGeometry};
use crate::errors::WebscanError;

const MM_TO_PT: f64 = 72.0 / 25.4;

/// Serialize laid-out pages into PDF bytes. The layout layer works in
/// millimetres from the top-left corner; PDF user space is points from the
/// bottom-left, so everything is converted and flipped here.
pub fn render(pages: &[Page], geometry: PageGeometry) -> Result<Vec<u8>, WebscanError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_regular = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let font_bold = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_regular,
            "F2" => font_bold,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for page in pages {
        let content = Content {
            operations: page_operations(page, geometry),
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                0.into(),
                0.into(),
                Object::Real((geometry.width * MM_TO_PT) as f32),
                Object::Real((geometry.height * MM_TO_PT) as f32),
            ],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)?;
    Ok(buffer)
}

fn real(value: f64) -> Object {
    Object::Real(value as f32)
}

fn rgb_components(color: Color) -> Vec<Object> {
    vec![
        real(color.r as f64 / 255.0),
        real(color.g as f64 / 255.0),
        real(color.b as f64 / 255.0),
    ]
}

fn page_operations(page: &Page, geometry: PageGeometry) -> Vec<Operation> {
    let mut ops = Vec::new();
    let flip = |y_mm: f64| (geometry.height - y_mm) * MM_TO_PT;

    for op in &page.ops {
        match op {
            DrawOp::Text {
                x,
                y,
                lines,
                line_height,
                style,
            } => {
                let font = match style.font {
                    FontKind::Regular => "F1",
                    FontKind::Bold => "F2",
                };
                ops.push(Operation::new("BT", vec![]));
                ops.push(Operation::new("Tf", vec![font.into(), real(style.size)]));
                ops.push(Operation::new("rg", rgb_components(style.color)));
                ops.push(Operation::new(
                    "Td",
                    vec![real(x * MM_TO_PT), real(flip(*y))],
                ));
                for (i, line) in lines.iter().enumerate() {
                    if i > 0 {
                        ops.push(Operation::new(
                            "Td",
                            vec![real(0.0), real(-line_height * MM_TO_PT)],
                        ));
                    }
                    ops.push(Operation::new("Tj", vec![Object::string_literal(line.as_str())]));
                }
                ops.push(Operation::new("ET", vec![]));
            }
            DrawOp::Rect {
                x,
                y,
                width,
                height,
                fill,
                stroke,
            } => {
                if let Some(color) = fill {
                    ops.push(Operation::new("rg", rgb_components(*color)));
                }
                if let Some(color) = stroke {
                    ops.push(Operation::new("RG", rgb_components(*color)));
                }
                // rect is anchored at its bottom-left corner in user space
                ops.push(Operation::new(
                    "re",
                    vec![
                        real(x * MM_TO_PT),
                        real(flip(y + height)),
                        real(width * MM_TO_PT),
                        real(height * MM_TO_PT),
                    ],
                ));
                let paint = match (fill.is_some(), stroke.is_some()) {
                    (true, true) => "B",
                    (true, false) => "f",
                    _ => "S",
                };
                ops.push(Operation::new(paint, vec![]));
            }
            DrawOp::Line { x1, y1, x2, y2, color } => {
                ops.push(Operation::new("RG", rgb_components(*color)));
                ops.push(Operation::new(
                    "m",
                    vec![real(x1 * MM_TO_PT), real(flip(*y1))],
                ));
                ops.push(Operation::new(
                    "l",
                    vec![real(x2 * MM_TO_PT), real(flip(*y2))],
                ));
                ops.push(Operation::new("S", vec![]));
            }
        }
    }

    ops
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::layout::{colors, DocumentBuilder};

    #[test]
    fn renders_to_valid_pdf_header() {
        let mut builder = DocumentBuilder::new(PageGeometry::A4).unwrap();
        builder.write_title("SCANNING REPORT").unwrap();
        builder.write_key_value("URL", "https://example.com", 0.0).unwrap();
        builder
            .write_section_title("Severity Distribution", colors::TEXT)
            .unwrap();

        let pages = builder.into_pages();
        let bytes = render(&pages, PageGeometry::A4).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));
        assert!(bytes.len() > 500);
    }

    #[test]
    fn one_pdf_page_per_layout_page() {
        let mut builder = DocumentBuilder::new(PageGeometry::A4).unwrap();
        for i in 0..400 {
            builder
                .write_wrapped(&format!("line {}", i), 0.0, 9.0)
                .unwrap();
        }
        let page_count = builder.page_count();
        assert!(page_count > 1);

        let bytes = render(&builder.into_pages(), PageGeometry::A4).unwrap();
        let reloaded = Document::load_mem(&bytes).unwrap();
        assert_eq!(reloaded.get_pages().len(), page_count);
    }
}
