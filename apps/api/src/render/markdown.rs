//! Markdown renderer for the report block list.

use crate::render::document::{Block, Span, SpanStyle};

fn spans_to_markdown(spans: &[Span]) -> String {
    spans
        .iter()
        .map(|span| {
            // Markers must hug the text, so surrounding spaces move outside.
            let trimmed = span.text.trim();
            if trimmed.is_empty() || span.style == SpanStyle::Regular {
                return span.text.clone();
            }
            let marker = if span.style == SpanStyle::Bold { "**" } else { "*" };
            let lead = &span.text[..span.text.len() - span.text.trim_start().len()];
            let tail = &span.text[span.text.trim_end().len()..];
            format!("{lead}{marker}{trimmed}{marker}{tail}")
        })
        .collect()
}

/// Renders blocks as markdown. Consecutive bullets form one list.
pub fn render_markdown(blocks: &[Block]) -> String {
    let mut lines: Vec<String> = Vec::new();

    for (i, block) in blocks.iter().enumerate() {
        match block {
            Block::Title(text) => lines.push(format!("# {text}")),
            Block::Section(text) => lines.push(format!("## {text}")),
            Block::Subsection(text) => lines.push(format!("### {text}")),
            Block::Heading(text) => lines.push(format!("#### {text}")),
            Block::Paragraph(spans) => lines.push(spans_to_markdown(spans)),
            Block::Bullet(spans) => lines.push(format!("- {}", spans_to_markdown(spans))),
            Block::Rule => lines.push("---".to_string()),
        }

        let next_is_bullet = matches!(blocks.get(i + 1), Some(Block::Bullet(_)));
        if !(matches!(block, Block::Bullet(_)) && next_is_bullet) {
            lines.push(String::new());
        }
    }

    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}
