//! PDF writer: paginated runs onto base-14 Helvetica pages via lopdf.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};
use thiserror::Error;

use crate::layout::font_metrics::{get_metrics, FontFace, PageConfig};
use crate::layout::paginate::Page;

const FOOTER_SIZE_PT: f32 = 8.0;
const PRODUCER: &str = concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("PDF encoding failed: {0}")]
    Pdf(String),

    #[error("Render task failed: {0}")]
    Task(String),
}

/// Maps text to WinAnsiEncoding bytes. Characters outside the code page become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20}'..='\u{7e}' => c as u8,
            '\u{a0}'..='\u{ff}' => c as u8,
            '\t' | '\n' | '\r' => b' ',
            '€' => 0x80,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            _ => b'?',
        })
        .collect()
}

fn text_op(ops: &mut Vec<Operation>, face: FontFace, size: f32, x: f32, y: f32, text: &str) {
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new("Tf", vec![face.resource_name().into(), size.into()]));
    ops.push(Operation::new("Td", vec![x.into(), y.into()]));
    ops.push(Operation::new(
        "Tj",
        vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
    ));
    ops.push(Operation::new("ET", vec![]));
}

fn page_operations(page: &Page, number: usize, total: usize, config: &PageConfig) -> Vec<Operation> {
    let height = config.page_height_pt;
    let mut ops = Vec::with_capacity(page.runs.len() * 5 + 8);

    for run in &page.runs {
        text_op(&mut ops, run.face, run.size, run.x, height - run.y, &run.text);
    }

    if !page.rules.is_empty() {
        ops.push(Operation::new("w", vec![0.5_f32.into()]));
        for y in &page.rules {
            let pdf_y = height - y;
            ops.push(Operation::new("m", vec![config.margin_pt.into(), pdf_y.into()]));
            ops.push(Operation::new(
                "l",
                vec![(config.page_width_pt - config.margin_pt).into(), pdf_y.into()],
            ));
            ops.push(Operation::new("S", vec![]));
        }
    }

    let footer = format!("Page {number} of {total}");
    let footer_w = get_metrics(FontFace::Regular).measure_pt(&footer, FOOTER_SIZE_PT);
    let footer_x = (config.page_width_pt - footer_w) / 2.0;
    text_op(&mut ops, FontFace::Regular, FOOTER_SIZE_PT, footer_x, config.margin_pt / 2.0, &footer);

    ops
}

/// Serializes laid-out pages to PDF bytes.
pub fn write_pdf(pages: &[Page], config: &PageConfig, title: &str) -> Result<Vec<u8>, RenderError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut fonts = lopdf::Dictionary::new();
    for face in FontFace::ALL {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => face.base_font(),
            "Encoding" => "WinAnsiEncoding",
        });
        fonts.set(face.resource_name(), font_id);
    }
    let resources_id = doc.add_object(dictionary! { "Font" => fonts });

    let total = pages.len();
    let mut kids: Vec<Object> = Vec::with_capacity(total);
    for (i, page) in pages.iter().enumerate() {
        let content = Content { operations: page_operations(page, i + 1, total, config) };
        let encoded = content.encode().map_err(|e| RenderError::Pdf(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id: ObjectId = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => total as i64,
        "Resources" => resources_id,
        "MediaBox" => vec![
            0.into(),
            0.into(),
            config.page_width_pt.into(),
            config.page_height_pt.into(),
        ],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::String(encode_win_ansi(title), StringFormat::Literal),
        "Producer" => Object::string_literal(PRODUCER),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).map_err(|e| RenderError::Pdf(e.to_string()))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::font_metrics::default_page_config;
    use crate::layout::paginate::{paginate, Run};
    use crate::render::document::{Block, Span};

    #[test]
    fn test_encode_win_ansi() {
        assert_eq!(encode_win_ansi("Aé•"), vec![b'A', 0xe9, 0x95]);
        assert_eq!(encode_win_ansi("ડે"), b"??".to_vec());
        assert_eq!(encode_win_ansi("a\nb"), b"a b".to_vec());
    }

    #[test]
    fn test_single_page_pdf_loads_back() {
        let config = default_page_config();
        let page = Page {
            runs: vec![Run {
                x: 56.0,
                y: 80.0,
                text: "Data Science (92%)".to_string(),
                face: FontFace::Bold,
                size: 12.0,
            }],
            rules: vec![100.0],
        };
        let bytes = write_pdf(&[page], &config, "Report").unwrap();

        assert!(bytes.starts_with(b"%PDF-1.5"));
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_page_count_matches_layout() {
        let config = default_page_config();
        let blocks: Vec<Block> = (0..150)
            .map(|i| Block::Paragraph(vec![Span::regular(format!("Entry {i}"))]))
            .collect();
        let pages = paginate(&blocks, &config);
        assert!(pages.len() > 1);

        let bytes = write_pdf(&pages, &config, "Report").unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), pages.len());
    }

    #[test]
    fn test_footer_numbers_every_page() {
        let config = default_page_config();
        let pages = vec![Page::default(), Page::default()];
        let ops = page_operations(&pages[1], 2, 2, &config);
        let footer = ops
            .iter()
            .find_map(|op| match op.operands.first() {
                Some(Object::String(bytes, _)) if op.operator == "Tj" => Some(bytes.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(footer, b"Page 2 of 2".to_vec());
    }
}
