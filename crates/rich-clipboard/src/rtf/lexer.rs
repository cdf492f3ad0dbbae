//! RTF tokenizer.

use crate::error::ConvertError;

/// Control words longer than this are malformed.
const MAX_WORD_LEN: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Token<'a> {
    GroupStart,
    GroupEnd,
    /// `\name` or `\nameN`, delimiter already consumed.
    Word { name: &'a str, param: Option<i32> },
    /// `\` followed by a single non-letter (`\*`, `\~`, `\{` ...).
    Symbol(u8),
    /// `\'hh`
    Hex(u8),
    /// Literal bytes up to the next special character.
    Text(&'a [u8]),
    /// Raw data following `\binN`.
    Binary(&'a [u8]),
}

pub(crate) struct Lexer<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub(crate) fn new(input: &'a [u8]) -> Self {
        Self { input, pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    /// Next token, or `None` at end of input. Bare CR and LF are skipped.
    pub(crate) fn next_token(&mut self) -> Result<Option<Token<'a>>, ConvertError> {
        while matches!(self.peek(), Some(b'\r' | b'\n')) {
            self.pos += 1;
        }
        let Some(byte) = self.peek() else {
            return Ok(None);
        };
        match byte {
            b'{' => {
                self.pos += 1;
                Ok(Some(Token::GroupStart))
            }
            b'}' => {
                self.pos += 1;
                Ok(Some(Token::GroupEnd))
            }
            b'\\' => self.control().map(Some),
            _ => {
                let start = self.pos;
                while let Some(b) = self.peek() {
                    if matches!(b, b'\\' | b'{' | b'}' | b'\r' | b'\n') {
                        break;
                    }
                    self.pos += 1;
                }
                Ok(Some(Token::Text(&self.input[start..self.pos])))
            }
        }
    }

    fn control(&mut self) -> Result<Token<'a>, ConvertError> {
        let start = self.pos;
        self.pos += 1;
        let Some(byte) = self.peek() else {
            return Err(ConvertError::UnexpectedEnd);
        };

        if byte.is_ascii_alphabetic() {
            return self.word(start);
        }

        self.pos += 1;
        match byte {
            b'\'' => {
                let hex = self
                    .input
                    .get(self.pos..self.pos + 2)
                    .and_then(|h| std::str::from_utf8(h).ok())
                    .and_then(|h| u8::from_str_radix(h, 16).ok())
                    .ok_or(ConvertError::MalformedControl(start))?;
                self.pos += 2;
                Ok(Token::Hex(hex))
            }
            // An escaped line break is a paragraph mark.
            b'\r' | b'\n' => Ok(Token::Word {
                name: "par",
                param: None,
            }),
            other => Ok(Token::Symbol(other)),
        }
    }

    fn word(&mut self, start: usize) -> Result<Token<'a>, ConvertError> {
        let name_start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_alphabetic()) {
            self.pos += 1;
        }
        if self.pos - name_start > MAX_WORD_LEN {
            return Err(ConvertError::MalformedControl(start));
        }
        let name = std::str::from_utf8(&self.input[name_start..self.pos])
            .map_err(|_| ConvertError::MalformedControl(start))?;

        let param = self.param();

        if self.peek() == Some(b' ') {
            self.pos += 1;
        }
        if name == "bin" {
            return self.binary(param.unwrap_or(0));
        }
        Ok(Token::Word { name, param })
    }

    /// The `len` raw bytes after `\bin`; they may contain braces and backslashes.
    fn binary(&mut self, len: i32) -> Result<Token<'a>, ConvertError> {
        let len = usize::try_from(len).unwrap_or(0);
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.input.len())
            .ok_or(ConvertError::UnexpectedEnd)?;
        let data = &self.input[self.pos..end];
        self.pos = end;
        Ok(Token::Binary(data))
    }

    fn param(&mut self) -> Option<i32> {
        let negative = self.peek() == Some(b'-')
            && self
                .input
                .get(self.pos + 1)
                .is_some_and(u8::is_ascii_digit);
        if negative {
            self.pos += 1;
        }
        let digits_start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        if self.pos == digits_start {
            return None;
        }
        let value = self.input[digits_start..self.pos]
            .iter()
            .fold(0_i64, |acc, d| {
                (acc * 10 + i64::from(d - b'0')).min(i64::from(i32::MAX) + 1)
            });
        let value = if negative { -value } else { value };
        Some(i32::try_from(value).unwrap_or(if negative { i32::MIN } else { i32::MAX }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token<'_>> {
        let mut lexer = Lexer::new(input.as_bytes());
        let mut out = Vec::new();
        while let Some(token) = lexer.next_token().unwrap() {
            out.push(token);
        }
        out
    }

    #[test]
    fn words_params_and_delimiters() {
        assert_eq!(
            tokens(r"{\rtf1\fs-20 \b hi}"),
            [
                Token::GroupStart,
                Token::Word { name: "rtf", param: Some(1) },
                Token::Word { name: "fs", param: Some(-20) },
                Token::Word { name: "b", param: None },
                Token::Text(b"hi"),
                Token::GroupEnd,
            ]
        );
    }

    #[test]
    fn only_one_delimiting_space_is_consumed() {
        assert_eq!(
            tokens(r"\b  x"),
            [Token::Word { name: "b", param: None }, Token::Text(b" x")]
        );
    }

    #[test]
    fn symbols_and_hex() {
        assert_eq!(
            tokens(r"\*\'e9\~\{"),
            [
                Token::Symbol(b'*'),
                Token::Hex(0xE9),
                Token::Symbol(b'~'),
                Token::Symbol(b'{'),
            ]
        );
    }

    #[test]
    fn newlines_are_ignored_but_escaped_newline_is_par() {
        assert_eq!(
            tokens("a\r\nb\\\nc"),
            [
                Token::Text(b"a"),
                Token::Text(b"b"),
                Token::Word { name: "par", param: None },
                Token::Text(b"c"),
            ]
        );
    }

    #[test]
    fn dash_without_digits_is_text() {
        assert_eq!(
            tokens(r"\li-x"),
            [Token::Word { name: "li", param: None }, Token::Text(b"-x")]
        );
    }

    #[test]
    fn huge_params_saturate() {
        assert_eq!(
            tokens(r"\u99999999999"),
            [Token::Word { name: "u", param: Some(i32::MAX) }]
        );
    }

    #[test]
    fn malformed_hex_is_an_error() {
        let mut lexer = Lexer::new(br"\'zz");
        assert!(matches!(
            lexer.next_token(),
            Err(ConvertError::MalformedControl(0))
        ));
    }

    #[test]
    fn bin_data_is_taken_raw() {
        assert_eq!(
            tokens("{\\bin4 }{\\\\x}"),
            [
                Token::GroupStart,
                Token::Binary(b"}{\\\\"),
                Token::Text(b"x"),
                Token::GroupEnd,
            ]
        );
    }

    #[test]
    fn short_bin_data_is_an_error() {
        let mut lexer = Lexer::new(br"\bin10 abc");
        assert!(matches!(lexer.next_token(), Err(ConvertError::UnexpectedEnd)));
    }

    #[test]
    fn trailing_backslash_is_an_error() {
        let mut lexer = Lexer::new(b"\\");
        assert!(matches!(lexer.next_token(), Err(ConvertError::UnexpectedEnd)));
    }
}
