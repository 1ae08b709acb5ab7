// In-memory PDF builder shared by the unit tests (via #[path]) and the
// integration tests. Only depends on lopdf.
#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

const LEFT: i64 = 20;
const TOP: i64 = 800;
const LEADING: i64 = 14;
/// Courier at 10pt advances 6 units per glyph
const ADVANCE: i64 = 6;

/// How a page's lines are written into its content stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// One BT/ET text object per line
    ObjectPerLine,
    /// One text object, lines advanced with `Td 0 -14`
    Td,
    /// One text object, lines advanced with `TL` + `T*`
    NextLine,
    /// One text object, lines after the first shown with `'`
    Quote,
    /// One text object, every word its own `Tj` placed with `Tm`
    WordPerShow,
    /// One text object, one `TJ` per line with kerning gaps between words
    Kerned,
}

/// Every line in its own text object
pub fn build_pdf(pages: &[&[&str]]) -> Vec<u8> {
    build_pdf_with_layout(Layout::ObjectPerLine, pages)
}

/// Each inner slice is one page
pub fn build_pdf_with_layout(layout: Layout, pages: &[&[&str]]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for lines in pages {
        let content = Content {
            operations: page_operations(layout, lines),
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encode content stream"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => count,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).expect("save pdf");
    buffer
}

fn op(operator: &str, operands: Vec<Object>) -> Operation {
    Operation::new(operator, operands)
}

fn set_font() -> Operation {
    op("Tf", vec!["F1".into(), 10.into()])
}

fn page_operations(layout: Layout, lines: &[&str]) -> Vec<Operation> {
    let mut ops = Vec::new();
    if lines.is_empty() {
        return ops;
    }

    if layout == Layout::ObjectPerLine {
        for (i, line) in lines.iter().enumerate() {
            let y = TOP - (i as i64) * LEADING;
            ops.push(op("BT", vec![]));
            ops.push(set_font());
            ops.push(op("Td", vec![LEFT.into(), y.into()]));
            ops.push(op("Tj", vec![Object::string_literal(*line)]));
            ops.push(op("ET", vec![]));
        }
        return ops;
    }

    ops.push(op("BT", vec![]));
    ops.push(set_font());
    ops.push(op("TL", vec![LEADING.into()]));
    ops.push(op("Td", vec![LEFT.into(), TOP.into()]));

    for (i, line) in lines.iter().enumerate() {
        let first = i == 0;
        match layout {
            Layout::Td => {
                if !first {
                    ops.push(op("Td", vec![0.into(), (-LEADING).into()]));
                }
                ops.push(op("Tj", vec![Object::string_literal(*line)]));
            }
            Layout::NextLine => {
                if !first {
                    ops.push(op("T*", vec![]));
                }
                ops.push(op("Tj", vec![Object::string_literal(*line)]));
            }
            Layout::Quote => {
                let operator = if first { "Tj" } else { "'" };
                ops.push(op(operator, vec![Object::string_literal(*line)]));
            }
            Layout::WordPerShow => {
                let y = TOP - (i as i64) * LEADING;
                let mut column = 0;
                for word in line.split(' ') {
                    if !word.is_empty() {
                        let x = LEFT + column * ADVANCE;
                        ops.push(op(
                            "Tm",
                            vec![1.into(), 0.into(), 0.into(), 1.into(), x.into(), y.into()],
                        ));
                        ops.push(op("Tj", vec![Object::string_literal(word)]));
                    }
                    column += word.len() as i64 + 1;
                }
            }
            Layout::Kerned => {
                if !first {
                    ops.push(op("Td", vec![0.into(), (-LEADING).into()]));
                }
                let mut array: Vec<Object> = Vec::new();
                for (j, word) in line.split_whitespace().enumerate() {
                    if j > 0 {
                        array.push((-600).into());
                    }
                    array.push(Object::string_literal(word));
                }
                ops.push(op("TJ", vec![Object::Array(array)]));
            }
            Layout::ObjectPerLine => {}
        }
    }

    ops.push(op("ET", vec![]));
    ops
}
