//! Document → HTML5.

use std::fmt::Write as _;

use crate::rtf::reader::{Align, CharFormat, Document, Inline, Paragraph, VerticalAlign};

const GENERATOR: &str = concat!("rich-clipboard ", env!("CARGO_PKG_VERSION"));

/// Render a complete HTML document.
pub(crate) fn write(doc: &Document) -> String {
    let mut out = String::with_capacity(256);
    out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(out, "<meta name=\"generator\" content=\"{GENERATOR}\">");
    out.push_str("</head>\n<body>\n");
    for paragraph in &doc.paragraphs {
        write_paragraph(&mut out, doc, paragraph);
    }
    out.push_str("</body>\n</html>\n");
    out
}

fn write_paragraph(out: &mut String, doc: &Document, paragraph: &Paragraph) {
    match paragraph.align {
        Align::Left => out.push_str("<p>"),
        Align::Center => out.push_str("<p style=\"text-align: center\">"),
        Align::Right => out.push_str("<p style=\"text-align: right\">"),
        Align::Justify => out.push_str("<p style=\"text-align: justify\">"),
    }
    if paragraph.inlines.is_empty() {
        out.push_str("<br>");
    }
    for inline in &paragraph.inlines {
        match inline {
            Inline::Text { text, format } => write_run(out, doc, text, format),
            Inline::LineBreak => out.push_str("<br>"),
        }
    }
    out.push_str("</p>\n");
}

fn write_run(out: &mut String, doc: &Document, text: &str, format: &CharFormat) {
    let mut close: Vec<&str> = Vec::new();

    if let Some(link) = format.link.as_deref().and_then(safe_href) {
        out.push_str("<a href=\"");
        escape_into(out, link);
        out.push_str("\">");
        close.push("</a>");
    }

    let style = run_style(doc, format);
    if !style.is_empty() {
        out.push_str("<span style=\"");
        escape_into(out, &style);
        out.push_str("\">");
        close.push("</span>");
    }

    for (on, open, end) in [
        (format.bold, "<b>", "</b>"),
        (format.italic, "<i>", "</i>"),
        (format.underline, "<u>", "</u>"),
        (format.strike, "<s>", "</s>"),
        (format.vertical == VerticalAlign::Super, "<sup>", "</sup>"),
        (format.vertical == VerticalAlign::Sub, "<sub>", "</sub>"),
    ] {
        if on {
            out.push_str(open);
            close.push(end);
        }
    }

    escape_into(out, text);

    for end in close.iter().rev() {
        out.push_str(end);
    }
}

/// Link targets are kept only for web and mail schemes; anything else
/// (`javascript:`, `file:`, relative paths) renders as plain text.
fn safe_href(target: &str) -> Option<&str> {
    const SCHEMES: [&str; 3] = ["http://", "https://", "mailto:"];
    let target = target.trim();
    SCHEMES
        .iter()
        .any(|scheme| {
            target
                .get(..scheme.len())
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
        })
        .then_some(target)
}

fn run_style(doc: &Document, format: &CharFormat) -> String {
    let mut style = String::new();
    if let Some(name) = format.font.and_then(|f| doc.font_name(f)) {
        let _ = write!(style, "font-family: '{}'; ", name.replace('\'', ""));
    }
    if let Some(half_points) = format.size {
        if half_points % 2 == 0 {
            let _ = write!(style, "font-size: {}pt; ", half_points / 2);
        } else {
            let _ = write!(style, "font-size: {}.5pt; ", half_points / 2);
        }
    }
    if let Some(rgb) = format.color.and_then(|c| doc.color(c)) {
        let _ = write!(style, "color: #{:02x}{:02x}{:02x}; ", rgb.r, rgb.g, rgb.b);
    }
    style.truncate(style.trim_end().len());
    style
}

fn escape_into(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\u{00A0}' => out.push_str("&nbsp;"),
            other => out.push(other),
        }
    }
}
