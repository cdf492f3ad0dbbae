//! RTF interpreter: tokens → a flat document of formatted runs.

use std::collections::BTreeMap;

use crate::error::ConvertError;
use crate::rtf::charset::Codepage;
use crate::rtf::lexer::{Lexer, Token};
use tracing::trace;

/// Deepest group nesting accepted before the input is rejected.
pub(crate) const MAX_DEPTH: usize = 256;

/// Default `\uc` skip count.
const DEFAULT_UC: usize = 1;

/// Destinations whose content never reaches the output.
const SKIPPED_DESTINATIONS: &[&str] = &[
    "author",
    "bkmkend",
    "bkmkstart",
    "colorschememapping",
    "comment",
    "datastore",
    "doccomm",
    "filetbl",
    "footer",
    "footerf",
    "footerl",
    "footerr",
    "footnote",
    "generator",
    "header",
    "headerf",
    "headerl",
    "headerr",
    "info",
    "keywords",
    "latentstyles",
    "listoverridetable",
    "listtable",
    "mmathPr",
    "nonshppict",
    "object",
    "operator",
    "pgdsctbl",
    "pict",
    "revtbl",
    "rsidtbl",
    "stylesheet",
    "subject",
    "themedata",
    "title",
    "xmlnstbl",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum VerticalAlign {
    #[default]
    Baseline,
    Super,
    Sub,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum Align {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

/// Group-scoped character formatting.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct CharFormat {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strike: bool,
    pub vertical: VerticalAlign,
    /// Index into the font table.
    pub font: Option<i32>,
    /// Size in half-points.
    pub size: Option<i32>,
    /// Index into the color table.
    pub color: Option<usize>,
    /// Hyperlink target from an enclosing field.
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Inline {
    Text { text: String, format: CharFormat },
    LineBreak,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct Paragraph {
    pub align: Align,
    pub inlines: Vec<Inline>,
}

impl Paragraph {
    fn is_empty(&self) -> bool {
        self.inlines.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Document {
    pub paragraphs: Vec<Paragraph>,
    pub fonts: BTreeMap<i32, String>,
    /// Entry 0 is usually the "auto" color and is `None`.
    pub colors: Vec<Option<Rgb>>,
}

impl Document {
    pub(crate) fn font_name(&self, index: i32) -> Option<&str> {
        self.fonts.get(&index).map(String::as_str)
    }

    pub(crate) fn color(&self, index: usize) -> Option<Rgb> {
        self.colors.get(index).copied().flatten()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Destination {
    Body,
    FontTable,
    ColorTable,
    FieldInstruction,
    Skip,
}

#[derive(Debug, Clone)]
struct GroupState {
    destination: Destination,
    format: CharFormat,
    uc: usize,
}

impl Default for GroupState {
    fn default() -> Self {
        Self {
            destination: Destination::Body,
            format: CharFormat::default(),
            uc: DEFAULT_UC,
        }
    }
}

struct Reader {
    doc: Document,
    stack: Vec<GroupState>,
    state: GroupState,
    paragraph: Paragraph,
    codepage: Codepage,
    /// 8-bit bytes awaiting decode through the code page.
    pending: Vec<u8>,
    /// High surrogate from a preceding `\u`.
    high_surrogate: Option<u16>,
    /// Fallback characters still to skip after a `\u`.
    skip: usize,
    /// `\*` seen; the next control word opens an ignorable destination.
    ignorable: bool,
    /// Font table entry being read.
    font_index: Option<i32>,
    font_name: String,
    /// Color table entry being read.
    color: Option<Rgb>,
    field_instruction: String,
}

/// Parse RTF bytes into a [`Document`].
pub(crate) fn read(input: &[u8]) -> Result<Document, ConvertError> {
    let mut lexer = Lexer::new(input);

    if lexer.next_token()? != Some(Token::GroupStart) {
        return Err(ConvertError::MissingHeader);
    }
    match lexer.next_token()? {
        Some(Token::Word { name: "rtf", .. }) => {}
        _ => return Err(ConvertError::MissingHeader),
    }

    let mut reader = Reader::new();
    loop {
        let Some(token) = lexer.next_token()? else {
            return Err(ConvertError::UnbalancedGroups);
        };
        if reader.skip > 0 && reader.skip_fallback(token) {
            continue;
        }
        match token {
            Token::GroupStart => {
                if reader.stack.len() + 1 >= MAX_DEPTH {
                    return Err(ConvertError::NestingTooDeep(MAX_DEPTH));
                }
                reader.push_group();
            }
            Token::GroupEnd => {
                if !reader.pop_group() {
                    // The header group closed; anything after it is ignored.
                    break;
                }
            }
            Token::Word { name, param } => reader.word(name, param),
            Token::Symbol(symbol) => reader.symbol(symbol),
            Token::Hex(byte) => reader.bytes(&[byte]),
            Token::Text(text) => reader.text(text),
            // Only embedded pictures and objects carry binary data.
            Token::Binary(data) => trace!(len = data.len(), "skipped binary data"),
        }
    }

    Ok(reader.finish())
}

impl Reader {
    fn new() -> Self {
        Self {
            doc: Document::default(),
            stack: Vec::new(),
            state: GroupState::default(),
            paragraph: Paragraph::default(),
            codepage: Codepage::default(),
            pending: Vec::new(),
            high_surrogate: None,
            skip: 0,
            ignorable: false,
            font_index: None,
            font_name: String::new(),
            color: None,
            field_instruction: String::new(),
        }
    }

    fn push_group(&mut self) {
        self.flush();
        self.ignorable = false;
        self.stack.push(self.state.clone());
    }

    /// Returns false when the outermost group closed.
    fn pop_group(&mut self) -> bool {
        self.lone_surrogate();
        self.flush();
        self.ignorable = false;
        if self.state.destination == Destination::FontTable {
            self.finish_font();
        }
        match self.stack.pop() {
            Some(state) => {
                self.state = state;
                true
            }
            None => false,
        }
    }

    /// Consume one token of `\u` fallback text. Returns true if the token
    /// was swallowed entirely.
    fn skip_fallback(&mut self, token: Token<'_>) -> bool {
        match token {
            Token::GroupStart | Token::GroupEnd => {
                self.skip = 0;
                false
            }
            Token::Text(text) => {
                let n = self.skip.min(text.len());
                self.skip -= n;
                if n < text.len() {
                    self.text(&text[n..]);
                }
                true
            }
            Token::Word { .. } | Token::Symbol(_) | Token::Hex(_) | Token::Binary(_) => {
                self.skip -= 1;
                true
            }
        }
    }

    fn finish(mut self) -> Document {
        self.lone_surrogate();
        self.flush();
        if !self.paragraph.is_empty() {
            self.doc.paragraphs.push(self.paragraph);
        }
        self.doc
    }

    // ---------------------------------------------------------------------
    // Text
    // ---------------------------------------------------------------------

    fn text(&mut self, text: &[u8]) {
        self.lone_surrogate();
        if self.state.destination == Destination::Body && text.is_ascii() {
            self.flush();
            // ASCII is valid UTF-8 and decodes the same in every code page.
            self.push_str(&String::from_utf8_lossy(text));
        } else {
            self.bytes(text);
        }
    }

    fn bytes(&mut self, bytes: &[u8]) {
        self.lone_surrogate();
        self.pending.extend_from_slice(bytes);
    }

    /// Decode pending 8-bit bytes into the current destination.
    fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let mut decoded = String::new();
        self.codepage.decode(&self.pending, &mut decoded);
        self.pending.clear();
        self.push_str(&decoded);
    }

    fn push_char(&mut self, c: char) {
        self.flush();
        let mut buf = [0u8; 4];
        self.push_str(c.encode_utf8(&mut buf));
    }

    fn push_str(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        match self.state.destination {
            Destination::Body => {
                if let Some(Inline::Text { text, format }) = self.paragraph.inlines.last_mut() {
                    if *format == self.state.format {
                        text.push_str(s);
                        return;
                    }
                }
                self.paragraph.inlines.push(Inline::Text {
                    text: s.to_string(),
                    format: self.state.format.clone(),
                });
            }
            Destination::FontTable => {
                for c in s.chars() {
                    if c == ';' {
                        self.finish_font();
                    } else {
                        self.font_name.push(c);
                    }
                }
            }
            Destination::ColorTable => {
                for _ in s.chars().filter(|&c| c == ';') {
                    self.doc.colors.push(self.color.take());
                }
            }
            Destination::FieldInstruction => self.field_instruction.push_str(s),
            Destination::Skip => {}
        }
    }

    fn end_paragraph(&mut self) {
        self.flush();
        let align = self.paragraph.align;
        let done = std::mem::replace(
            &mut self.paragraph,
            Paragraph {
                align,
                inlines: Vec::new(),
            },
        );
        self.doc.paragraphs.push(done);
    }

    fn line_break(&mut self) {
        self.flush();
        self.paragraph.inlines.push(Inline::LineBreak);
    }

    fn finish_font(&mut self) {
        if let Some(index) = self.font_index.take() {
            let name = self.font_name.trim();
            if !name.is_empty() {
                self.doc.fonts.insert(index, name.to_string());
            }
        }
        self.font_name.clear();
    }

    // ---------------------------------------------------------------------
    // Control words and symbols
    // ---------------------------------------------------------------------

    fn unicode(&mut self, param: Option<i32>) {
        let Some(value) = param else {
            return;
        };
        // Parameters are signed 16-bit; negative values wrap.
        let unit = u16::try_from(value.rem_euclid(0x1_0000)).unwrap_or(0xFFFD);
        self.skip = self.state.uc;

        if (0xD800..0xDC00).contains(&unit) {
            self.lone_surrogate();
            self.flush();
            self.high_surrogate = Some(unit);
            return;
        }
        let c = match self.high_surrogate.take() {
            Some(high) if (0xDC00..0xE000).contains(&unit) => {
                char::decode_utf16([high, unit]).next().and_then(Result::ok)
            }
            Some(_) => {
                self.push_char(char::REPLACEMENT_CHARACTER);
                char::from_u32(u32::from(unit))
            }
            None => char::from_u32(u32::from(unit)),
        };
        self.push_char(c.unwrap_or(char::REPLACEMENT_CHARACTER));
    }

    /// A high surrogate not followed by its low half becomes U+FFFD.
    fn lone_surrogate(&mut self) {
        if self.high_surrogate.take().is_some() {
            self.push_char(char::REPLACEMENT_CHARACTER);
        }
    }

    fn symbol(&mut self, symbol: u8) {
        self.lone_surrogate();
        match symbol {
            b'*' => self.ignorable = true,
            b'\\' | b'{' | b'}' => self.push_char(char::from(symbol)),
            b'~' => self.push_char('\u{00A0}'),
            b'_' => self.push_char('\u{2011}'),
            // Optional hyphen and anything unknown are dropped.
            _ => {}
        }
    }

    fn word(&mut self, name: &str, param: Option<i32>) {
        let ignorable = std::mem::take(&mut self.ignorable);
        if name != "u" {
            self.lone_surrogate();
        }
        self.flush();

        if self.state.destination == Destination::Skip {
            return;
        }

        if self.destination(name) {
            return;
        }
        if ignorable {
            self.state.destination = Destination::Skip;
            return;
        }

        match self.state.destination {
            Destination::FontTable => self.font_table_word(name, param),
            Destination::ColorTable => self.color_table_word(name, param),
            Destination::FieldInstruction | Destination::Skip => {}
            Destination::Body => self.body_word(name, param),
        }
    }

    /// Handle words that open a destination. Returns true if `name` was one.
    fn destination(&mut self, name: &str) -> bool {
        self.state.destination = match name {
            "fonttbl" => Destination::FontTable,
            "colortbl" => Destination::ColorTable,
            "fldinst" => {
                self.field_instruction.clear();
                Destination::FieldInstruction
            }
            "fldrslt" => {
                self.state.format.link = hyperlink_target(&self.field_instruction);
                Destination::Body
            }
            _ if SKIPPED_DESTINATIONS.contains(&name) => Destination::Skip,
            _ => return false,
        };
        true
    }

    fn font_table_word(&mut self, name: &str, param: Option<i32>) {
        if name == "f" {
            self.finish_font();
            self.font_index = param;
        }
    }

    fn color_table_word(&mut self, name: &str, param: Option<i32>) {
        let value = param.map_or(0, |p| u8::try_from(p.clamp(0, 255)).unwrap_or(u8::MAX));
        let color = self.color.get_or_insert(Rgb { r: 0, g: 0, b: 0 });
        match name {
            "red" => color.r = value,
            "green" => color.g = value,
            "blue" => color.b = value,
            _ => {}
        }
    }

    fn body_word(&mut self, name: &str, param: Option<i32>) {
        let on = param != Some(0);
        match name {
            "ansicpg" => {
                if let Some(cp) = param {
                    self.flush();
                    self.codepage = Codepage::from_ansicpg(cp);
                }
            }
            "uc" => {
                self.state.uc = param
                    .and_then(|n| usize::try_from(n).ok())
                    .unwrap_or(DEFAULT_UC);
            }
            "u" => self.unicode(param),

            "par" | "sect" | "page" => self.end_paragraph(),
            "pard" => self.paragraph.align = Align::Left,
            "line" => self.line_break(),
            "tab" => self.push_char('\t'),
            "ql" => self.paragraph.align = Align::Left,
            "qc" => self.paragraph.align = Align::Center,
            "qr" => self.paragraph.align = Align::Right,
            "qj" => self.paragraph.align = Align::Justify,

            "emdash" => self.push_char('\u{2014}'),
            "endash" => self.push_char('\u{2013}'),
            "bullet" => self.push_char('\u{2022}'),
            "lquote" => self.push_char('\u{2018}'),
            "rquote" => self.push_char('\u{2019}'),
            "ldblquote" => self.push_char('\u{201C}'),
            "rdblquote" => self.push_char('\u{201D}'),
            "emspace" => self.push_char('\u{2003}'),
            "enspace" => self.push_char('\u{2002}'),

            "plain" => self.set_format(|f| {
                let link = f.link.take();
                *f = CharFormat {
                    link,
                    ..CharFormat::default()
                };
            }),
            "b" => self.set_format(|f| f.bold = on),
            "i" => self.set_format(|f| f.italic = on),
            "strike" | "striked" => self.set_format(|f| f.strike = on),
            "ulnone" => self.set_format(|f| f.underline = false),
            "ul" | "uld" | "uldash" | "uldashd" | "uldashdd" | "uldb" | "ulth" | "ulw"
            | "ulwave" => self.set_format(|f| f.underline = on),
            "super" => self.set_format(|f| f.vertical = VerticalAlign::Super),
            "sub" => self.set_format(|f| f.vertical = VerticalAlign::Sub),
            "nosupersub" => self.set_format(|f| f.vertical = VerticalAlign::Baseline),
            "f" => self.set_format(|f| f.font = param),
            "fs" => self.set_format(|f| f.size = param.filter(|&p| p > 0)),
            "cf" => self.set_format(|f| {
                f.color = param.and_then(|p| usize::try_from(p).ok()).filter(|&p| p > 0);
            }),
            _ => {}
        }
    }

    fn set_format(&mut self, apply: impl FnOnce(&mut CharFormat)) {
        self.flush();
        apply(&mut self.state.format);
    }
}

/// Extract the URL from a `HYPERLINK "url"` field instruction.
fn hyperlink_target(instruction: &str) -> Option<String> {
    let rest = instruction.trim_start().strip_prefix("HYPERLINK")?.trim_start();
    let url = match rest.strip_prefix('"') {
        Some(quoted) => quoted.split('"').next()?,
        None => rest.split_whitespace().next()?,
    };
    (!url.is_empty()).then(|| url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain_text(doc: &Document) -> Vec<String> {
        doc.paragraphs
            .iter()
            .map(|p| {
                p.inlines
                    .iter()
                    .map(|i| match i {
                        Inline::Text { text, .. } => text.as_str(),
                        Inline::LineBreak => "\n",
                    })
                    .collect()
            })
            .collect()
    }

    fn runs(doc: &Document) -> Vec<(&str, &CharFormat)> {
        doc.paragraphs
            .iter()
            .flat_map(|p| &p.inlines)
            .filter_map(|i| match i {
                Inline::Text { text, format } => Some((text.as_str(), format)),
                Inline::LineBreak => None,
            })
            .collect()
    }

    #[test]
    fn requires_rtf_header() {
        assert!(matches!(read(b"hello"), Err(ConvertError::MissingHeader)));
        assert!(matches!(read(br"{\pard x}"), Err(ConvertError::MissingHeader)));
        assert!(matches!(read(b""), Err(ConvertError::MissingHeader)));
    }

    #[test]
    fn unbalanced_groups_fail() {
        assert!(matches!(
            read(br"{\rtf1 {\b open"),
            Err(ConvertError::UnbalancedGroups)
        ));
    }

    #[test]
    fn nesting_is_bounded() {
        let mut input = br"{\rtf1 ".to_vec();
        input.extend(std::iter::repeat(b'{').take(MAX_DEPTH + 4));
        input.extend(std::iter::repeat(b'}').take(MAX_DEPTH + 5));
        assert!(matches!(read(&input), Err(ConvertError::NestingTooDeep(_))));
    }

    #[test]
    fn tables_are_not_text() {
        let doc = read(
            br"{\rtf1\ansi{\fonttbl{\f0\fswiss Helvetica;}{\f1\fmodern Courier New;}}
{\colortbl;\red255\green0\blue0;\red0\green0\blue255;}
{\*\expandedcolortbl;;}{\stylesheet{\s0 Normal;}}{\info{\title Doc}}
\f0 hello}",
        )
        .unwrap();
        assert_eq!(plain_text(&doc), ["hello"]);
        assert_eq!(doc.font_name(0), Some("Helvetica"));
        assert_eq!(doc.font_name(1), Some("Courier New"));
        assert_eq!(doc.colors.len(), 3);
        assert_eq!(doc.color(0), None);
        assert_eq!(doc.color(1), Some(Rgb { r: 255, g: 0, b: 0 }));
        assert_eq!(doc.color(2), Some(Rgb { r: 0, g: 0, b: 255 }));
    }

    #[test]
    fn flat_font_table() {
        let doc = read(br"{\rtf1{\fonttbl\f0\fnil\fcharset0 AppleSystemUIFont;}\f0 x}").unwrap();
        assert_eq!(doc.font_name(0), Some("AppleSystemUIFont"));
    }

    #[test]
    fn paragraphs_and_line_breaks() {
        let doc = read(br"{\rtf1 one\par two\line three\par}").unwrap();
        assert_eq!(plain_text(&doc), ["one", "two\nthree"]);
    }

    #[test]
    fn formatting_is_group_scoped() {
        let doc = read(br"{\rtf1 a{\b b{\i c}}d\b0 e}").unwrap();
        let runs = runs(&doc);
        let summary: Vec<(&str, bool, bool)> =
            runs.iter().map(|(t, f)| (*t, f.bold, f.italic)).collect();
        assert_eq!(
            summary,
            [
                ("a", false, false),
                ("b", true, false),
                ("c", true, true),
                ("de", false, false),
            ]
        );
    }

    #[test]
    fn hex_escapes_use_code_page() {
        let doc = read(br"{\rtf1\ansi\ansicpg1252 caf\'e9 \'93q\'94}").unwrap();
        assert_eq!(plain_text(&doc), ["caf\u{e9} \u{201C}q\u{201D}"]);
    }

    #[test]
    fn unicode_skips_fallback() {
        // `@` stands in for the `\u` control word.
        let input = r"{\rtf1 @8364?  \uc2@8364\'80\'80 x}".replace('@', "\\u");
        let doc = read(input.as_bytes()).unwrap();
        assert_eq!(plain_text(&doc), ["\u{20AC}  \u{20AC} x"]);
    }

    #[test]
    fn unicode_surrogate_pairs_and_negative_values() {
        let doc = read(br"{\rtf1 \u-10179?\u-8704?\u-4064?}").unwrap();
        assert_eq!(plain_text(&doc), ["\u{1F600}\u{F020}"]);
    }

    #[test]
    fn unpaired_high_surrogate_is_replaced() {
        let doc = read(br"{\rtf1 \u-10179? x}").unwrap();
        assert_eq!(plain_text(&doc), ["\u{FFFD} x"]);

        let doc = read(br"{\rtf1 \u-10179?\u-10179?\u-8704?}").unwrap();
        assert_eq!(plain_text(&doc), ["\u{FFFD}\u{1F600}"]);

        let doc = read(br"{\rtf1 a\u-10179?\u65?}").unwrap();
        assert_eq!(plain_text(&doc), ["a\u{FFFD}A"]);

        let doc = read(br"{\rtf1 {\u-10179?}b\par}").unwrap();
        assert_eq!(plain_text(&doc), ["\u{FFFD}b"]);
    }

    #[test]
    fn binary_data_does_not_close_groups() {
        let doc = read(br"{\rtf1 before{\pict\bin3 }}}} after}").unwrap();
        assert_eq!(plain_text(&doc), ["before after"]);

        let doc = read(br"{\rtf1 a{\*\blipuid\bin2 \{}b}").unwrap();
        assert_eq!(plain_text(&doc), ["ab"]);
    }

    #[test]
    fn ignorable_unknown_destinations_are_skipped() {
        let doc = read(br"{\rtf1 {\*\unknowndest secret {\b hidden}}shown}").unwrap();
        assert_eq!(plain_text(&doc), ["shown"]);
    }

    #[test]
    fn escaped_characters() {
        let doc = read(br"{\rtf1 a\\b\{c\}d\~e\-f\emdash}").unwrap();
        assert_eq!(plain_text(&doc), ["a\\b{c}d\u{A0}ef\u{2014}"]);
    }

    #[test]
    fn hyperlink_field() {
        let doc = read(
            br#"{\rtf1 see {\field{\*\fldinst{HYPERLINK "https://example.com/a?b=1"}}{\fldrslt here}} now}"#,
        )
        .unwrap();
        let runs = runs(&doc);
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[1].0, "here");
        assert_eq!(runs[1].1.link.as_deref(), Some("https://example.com/a?b=1"));
        assert_eq!(runs[2].1.link, None);
    }

    #[test]
    fn alignment_and_pard() {
        let doc = read(br"{\rtf1\qc centered\par\pard left\par}").unwrap();
        assert_eq!(doc.paragraphs[0].align, Align::Center);
        assert_eq!(doc.paragraphs[1].align, Align::Left);
    }

    #[test]
    fn trailing_bytes_after_document_are_ignored() {
        let doc = read(b"{\\rtf1 x}\0\0garbage").unwrap();
        assert_eq!(plain_text(&doc), ["x"]);
    }

    #[test]
    fn size_and_color_run_properties() {
        let doc = read(br"{\rtf1{\colortbl;\red1\green2\blue3;}\fs26\cf1 big}").unwrap();
        let runs = runs(&doc);
        assert_eq!(runs[0].1.size, Some(26));
        assert_eq!(runs[0].1.color, Some(1));
    }

    #[test]
    fn hyperlink_instruction_parsing() {
        assert_eq!(
            hyperlink_target(r#" HYPERLINK "http://a.b/" \o "tip""#).as_deref(),
            Some("http://a.b/")
        );
        assert_eq!(hyperlink_target("HYPERLINK http://x").as_deref(), Some("http://x"));
        assert_eq!(hyperlink_target("PAGE"), None);
    }
}
