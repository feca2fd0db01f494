//! Line breaking and pagination of the report block list.
//!
//! Greedy word fill per line using the static Helvetica metrics, then a
//! top-down cursor that opens a new page when the next line would cross the
//! bottom margin. Coordinates are in points with y growing downward from the
//! top edge; the PDF writer flips them.

use crate::layout::font_metrics::{get_metrics, FontFace, PageConfig};
use crate::render::document::{Block, Span, SpanStyle};

// ────────────────────────────────────────────────────────────────────────────
// Output types
// ────────────────────────────────────────────────────────────────────────────

/// One positioned piece of text with a single face. `y` is the baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub x: f32,
    pub y: f32,
    pub text: String,
    pub face: FontFace,
    pub size: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub runs: Vec<Run>,
    /// Baselines of full-width horizontal rules.
    pub rules: Vec<f32>,
}

impl Page {
    fn is_empty(&self) -> bool {
        self.runs.is_empty() && self.rules.is_empty()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Block styles
// ────────────────────────────────────────────────────────────────────────────

const BULLET_INDENT_PT: f32 = 14.0;
const BULLET_MARKER: &str = "-";
const RULE_HEIGHT_PT: f32 = 12.0;

#[derive(Debug, Clone, Copy)]
struct BlockStyle {
    size: f32,
    space_before: f32,
    space_after: f32,
    indent: f32,
    centered: bool,
    /// Headings must not be the last line on a page.
    keep_with_next: bool,
}

fn block_style(block: &Block, config: &PageConfig) -> BlockStyle {
    let body = config.body_size_pt;
    let heading = |size: f32, before: f32, after: f32| BlockStyle {
        size,
        space_before: before,
        space_after: after,
        indent: 0.0,
        centered: false,
        keep_with_next: true,
    };
    match block {
        Block::Title(_) => BlockStyle { centered: true, ..heading(body * 2.0, 0.0, 10.0) },
        Block::Section(_) => heading(body * 1.5, 14.0, 6.0),
        Block::Subsection(_) => heading(body * 1.25, 10.0, 4.0),
        Block::Heading(_) => heading(body * 1.1, 8.0, 2.0),
        Block::Paragraph(_) => BlockStyle {
            size: body,
            space_before: 0.0,
            space_after: 4.0,
            indent: 0.0,
            centered: false,
            keep_with_next: false,
        },
        Block::Bullet(_) => BlockStyle {
            size: body,
            space_before: 0.0,
            space_after: 2.0,
            indent: BULLET_INDENT_PT,
            centered: false,
            keep_with_next: false,
        },
        Block::Rule => BlockStyle {
            size: body,
            space_before: 4.0,
            space_after: 4.0,
            indent: 0.0,
            centered: false,
            keep_with_next: false,
        },
    }
}

fn face_for(style: SpanStyle) -> FontFace {
    match style {
        SpanStyle::Regular => FontFace::Regular,
        SpanStyle::Bold => FontFace::Bold,
        SpanStyle::Italic => FontFace::Oblique,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Word wrapping
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Word {
    text: String,
    face: FontFace,
    space_before: bool,
}

/// Splits styled spans into words. A word gets `space_before` when whitespace
/// separated it from the previous word, even across span boundaries.
fn words_from_spans(spans: &[Span]) -> Vec<Word> {
    let mut words: Vec<Word> = Vec::new();
    let mut pending_space = false;

    for span in spans {
        let face = face_for(span.style);
        let mut rest = span.text.as_str();
        loop {
            let trimmed = rest.trim_start();
            if trimmed.len() != rest.len() {
                pending_space = true;
            }
            if trimmed.is_empty() {
                break;
            }
            let end = trimmed.find(char::is_whitespace).unwrap_or(trimmed.len());
            words.push(Word {
                text: trimmed[..end].to_string(),
                face,
                space_before: pending_space && !words.is_empty(),
            });
            pending_space = false;
            rest = &trimmed[end..];
        }
    }
    words
}

/// A wrapped line: runs with x relative to the line start, plus total width.
#[derive(Debug, Clone, Default)]
struct Line {
    runs: Vec<(f32, String, FontFace)>,
    width: f32,
}

impl Line {
    fn push(&mut self, word: &Word, size: f32) {
        let metrics = get_metrics(word.face);
        let space = if word.space_before && !self.runs.is_empty() {
            metrics.space_width * size
        } else {
            0.0
        };
        let word_w = metrics.measure_pt(&word.text, size);

        match self.runs.last_mut() {
            Some((_, text, face)) if *face == word.face => {
                if space > 0.0 {
                    text.push(' ');
                }
                text.push_str(&word.text);
            }
            _ => self.runs.push((self.width + space, word.text.clone(), word.face)),
        }
        self.width += space + word_w;
    }
}

/// Greedy fill. A single word wider than `max_width` gets a line of its own.
fn wrap_words(words: &[Word], size: f32, max_width: f32) -> Vec<Line> {
    let mut lines: Vec<Line> = Vec::new();
    let mut current = Line::default();

    for word in words {
        let metrics = get_metrics(word.face);
        let space = if word.space_before { metrics.space_width * size } else { 0.0 };
        let word_w = metrics.measure_pt(&word.text, size);

        if !current.runs.is_empty() && current.width + space + word_w > max_width {
            lines.push(std::mem::take(&mut current));
        }
        current.push(word, size);
    }
    if !current.runs.is_empty() {
        lines.push(current);
    }
    lines
}

fn block_lines(block: &Block, style: &BlockStyle, max_width: f32) -> Vec<Line> {
    let heading_words = |text: &str| words_from_spans(&[Span::bold(text)]);
    match block {
        Block::Title(t) | Block::Section(t) | Block::Subsection(t) | Block::Heading(t) => {
            wrap_words(&heading_words(t), style.size, max_width)
        }
        Block::Paragraph(spans) | Block::Bullet(spans) => {
            wrap_words(&words_from_spans(spans), style.size, max_width)
        }
        Block::Rule => Vec::new(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Pagination
// ────────────────────────────────────────────────────────────────────────────

struct Paginator<'a> {
    config: &'a PageConfig,
    pages: Vec<Page>,
    current: Page,
    /// Top of the next line box.
    cursor_y: f32,
}

impl<'a> Paginator<'a> {
    fn new(config: &'a PageConfig) -> Self {
        Paginator {
            config,
            pages: Vec::new(),
            current: Page::default(),
            cursor_y: config.margin_pt,
        }
    }

    fn at_page_top(&self) -> bool {
        self.current.is_empty()
    }

    fn fits(&self, height: f32) -> bool {
        self.cursor_y + height <= self.config.bottom_limit_pt()
    }

    fn new_page(&mut self) {
        self.pages.push(std::mem::take(&mut self.current));
        self.cursor_y = self.config.margin_pt;
    }

    fn line_height(&self, size: f32) -> f32 {
        size * self.config.line_spacing
    }

    fn place_block(&mut self, block: &Block, style: &BlockStyle, next: Option<&BlockStyle>) {
        let max_width = self.config.text_width_pt() - style.indent;
        let lines = block_lines(block, style, max_width);

        if matches!(block, Block::Rule) {
            self.place_rule(style);
            return;
        }
        if lines.is_empty() {
            return;
        }

        let before = if self.at_page_top() { 0.0 } else { style.space_before };
        let own_height = lines.len() as f32 * self.line_height(style.size);
        let follow = match next {
            Some(next) if style.keep_with_next => {
                style.space_after + next.space_before + self.line_height(next.size)
            }
            _ => 0.0,
        };
        if !self.at_page_top() && style.keep_with_next && !self.fits(before + own_height + follow)
        {
            self.new_page();
        } else {
            self.cursor_y += before;
        }

        let margin = self.config.margin_pt;
        for (i, line) in lines.iter().enumerate() {
            let height = self.line_height(style.size);
            if !self.at_page_top() && !self.fits(height) {
                self.new_page();
            }
            let baseline = self.cursor_y + style.size;
            let left = if style.centered {
                margin + (self.config.text_width_pt() - line.width).max(0.0) / 2.0
            } else {
                margin + style.indent
            };

            if i == 0 && matches!(block, Block::Bullet(_)) {
                self.current.runs.push(Run {
                    x: margin + 4.0,
                    y: baseline,
                    text: BULLET_MARKER.to_string(),
                    face: FontFace::Regular,
                    size: style.size,
                });
            }
            for (offset, text, face) in &line.runs {
                self.current.runs.push(Run {
                    x: left + offset,
                    y: baseline,
                    text: text.clone(),
                    face: *face,
                    size: style.size,
                });
            }
            self.cursor_y += height;
        }
        self.cursor_y += style.space_after;
    }

    fn place_rule(&mut self, style: &BlockStyle) {
        if self.at_page_top() {
            return;
        }
        let height = style.space_before + RULE_HEIGHT_PT + style.space_after;
        if !self.fits(height) {
            self.new_page();
            return;
        }
        self.cursor_y += style.space_before;
        self.current.rules.push(self.cursor_y + RULE_HEIGHT_PT / 2.0);
        self.cursor_y += RULE_HEIGHT_PT + style.space_after;
    }

    fn finish(mut self) -> Vec<Page> {
        if !self.current.is_empty() || self.pages.is_empty() {
            self.pages.push(self.current);
        }
        self.pages
    }
}

/// Lays the blocks out onto pages. Always returns at least one page.
pub fn paginate(blocks: &[Block], config: &PageConfig) -> Vec<Page> {
    let styles: Vec<BlockStyle> = blocks.iter().map(|b| block_style(b, config)).collect();
    let mut paginator = Paginator::new(config);

    for (i, block) in blocks.iter().enumerate() {
        paginator.place_block(block, &styles[i], styles.get(i + 1));
    }
    paginator.finish()
}
