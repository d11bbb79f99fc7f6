//! Header card parsing and building.
//!
//! A FITS header is a sequence of 80-byte ASCII cards padded to a multiple of
//! 2880 bytes and terminated by an `END` card. Value cards carry `= ` in
//! columns 9-10; everything else (HISTORY, COMMENT, blank) is commentary.

use std::fmt;

use indexmap::IndexMap;

use crate::error::{FitsError, Result};

/// Length of one header card.
pub const CARD_LEN: usize = 80;

/// Length of one logical FITS block.
pub const BLOCK_LEN: usize = 2880;

/// Round a byte count up to a whole number of blocks.
pub fn align_to_block(len: usize) -> usize {
    len.div_ceil(BLOCK_LEN) * BLOCK_LEN
}

/// Typed value of a header card.
#[derive(Debug, Clone, PartialEq)]
pub enum HeaderValue {
    Logical(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    /// Complex values are kept verbatim, e.g. `(1.0, 2.0)`.
    Complex(String),
    /// Value indicator present but no value given.
    Undefined,
}

impl HeaderValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            HeaderValue::Integer(value) => Some(*value),
            HeaderValue::Float(value) if value.fract() == 0.0 => Some(*value as i64),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            HeaderValue::Integer(value) => Some(*value as f64),
            HeaderValue::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            HeaderValue::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            HeaderValue::Logical(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for HeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderValue::Logical(true) => f.write_str("T"),
            HeaderValue::Logical(false) => f.write_str("F"),
            HeaderValue::Integer(value) => write!(f, "{value}"),
            HeaderValue::Float(value) => write!(f, "{value}"),
            HeaderValue::Text(value) | HeaderValue::Complex(value) => f.write_str(value),
            HeaderValue::Undefined => Ok(()),
        }
    }
}

/// One decoded card.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub keyword: String,
    /// `None` for commentary cards.
    pub value: Option<HeaderValue>,
    pub comment: Option<String>,
}

/// Decode an 80-byte card.
pub fn parse_card(card: &[u8]) -> Card {
    let owned = String::from_utf8_lossy(card);
    let text: &str = &owned;
    let keyword = text.get(..8).unwrap_or(text).trim_end().to_string();

    if text.get(8..10) != Some("= ") {
        let comment = text.get(8..).map(|rest| rest.trim().to_string());
        return Card {
            keyword,
            value: None,
            comment: comment.filter(|c| !c.is_empty()),
        };
    }

    let (value, comment) = parse_value(text.get(10..).unwrap_or_default());
    Card {
        keyword,
        value: Some(value),
        comment,
    }
}

/// Parse the value field (columns 11-80) of a value card.
fn parse_value(field: &str) -> (HeaderValue, Option<String>) {
    let field = field.trim_start();

    if let Some(rest) = field.strip_prefix('\'') {
        let mut value = String::new();
        let mut chars = rest.char_indices().peekable();
        let mut end = rest.len();
        while let Some((index, c)) = chars.next() {
            if c != '\'' {
                value.push(c);
                continue;
            }
            // Doubled quote is an escaped quote.
            if chars.peek().is_some_and(|(_, next)| *next == '\'') {
                value.push('\'');
                chars.next();
            } else {
                end = index + 1;
                break;
            }
        }
        let comment = rest
            .get(end..)
            .and_then(|tail| tail.split_once('/'))
            .map(|(_, comment)| comment.trim().to_string())
            .filter(|comment| !comment.is_empty());
        return (HeaderValue::Text(value.trim_end().to_string()), comment);
    }

    let (raw, comment) = match field.split_once('/') {
        Some((raw, comment)) => (
            raw.trim(),
            Some(comment.trim().to_string()).filter(|c| !c.is_empty()),
        ),
        None => (field.trim(), None),
    };

    let value = match raw {
        "" => HeaderValue::Undefined,
        "T" => HeaderValue::Logical(true),
        "F" => HeaderValue::Logical(false),
        _ if raw.starts_with('(') => HeaderValue::Complex(raw.to_string()),
        _ => parse_number(raw).unwrap_or_else(|| HeaderValue::Text(raw.to_string())),
    };
    (value, comment)
}

fn parse_number(raw: &str) -> Option<HeaderValue> {
    if let Ok(value) = raw.parse::<i64>() {
        return Some(HeaderValue::Integer(value));
    }
    raw.replace(['D', 'd'], "E")
        .parse::<f64>()
        .ok()
        .map(HeaderValue::Float)
}

/// Ordered keyword/value pairs of one HDU header.
///
/// Commentary cards are not retained. A repeated keyword keeps its first
/// position and its last value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Header {
    cards: IndexMap<String, HeaderValue>,
}

impl Header {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the header starting at `offset`.
    ///
    /// Returns the header and the number of bytes it occupies, block padding
    /// included.
    pub fn parse(data: &[u8], offset: usize, hdu: usize) -> Result<(Self, usize)> {
        let mut header = Header::new();
        let mut pos = offset;
        loop {
            let card = data
                .get(pos..pos + CARD_LEN)
                .ok_or(FitsError::MissingEnd { hdu })?;
            pos += CARD_LEN;
            let card = parse_card(card);
            if card.keyword == "END" {
                break;
            }
            if let Some(value) = card.value {
                header.cards.insert(card.keyword, value);
            }
        }
        Ok((header, align_to_block(pos - offset)))
    }

    pub fn insert(&mut self, keyword: impl Into<String>, value: HeaderValue) {
        self.cards.insert(keyword.into(), value);
    }

    pub fn get(&self, keyword: &str) -> Option<&HeaderValue> {
        self.cards.get(keyword)
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.cards.contains_key(keyword)
    }

    pub fn int(&self, keyword: &str) -> Option<i64> {
        self.get(keyword).and_then(HeaderValue::as_int)
    }

    pub fn float(&self, keyword: &str) -> Option<f64> {
        self.get(keyword).and_then(HeaderValue::as_float)
    }

    pub fn text(&self, keyword: &str) -> Option<&str> {
        self.get(keyword).and_then(HeaderValue::as_str)
    }

    /// Integer keyword that must be present.
    pub fn required_int(&self, keyword: &str, hdu: usize) -> Result<i64> {
        self.int(keyword)
            .ok_or_else(|| FitsError::missing_keyword(hdu, keyword))
    }

    /// Non-negative integer keyword that must be present.
    pub fn required_len(&self, keyword: &str, hdu: usize) -> Result<usize> {
        let value = self.required_int(keyword, hdu)?;
        usize::try_from(value).map_err(|_| FitsError::missing_keyword(hdu, keyword))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &HeaderValue)> {
        self.cards.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// Build an 80-byte value card.
pub fn build_card(keyword: &str, value: &HeaderValue) -> Result<[u8; CARD_LEN]> {
    if keyword.is_empty() || keyword.len() > 8 || !keyword.is_ascii() {
        return Err(FitsError::invalid_card(keyword, "keyword must be 1-8 ASCII characters"));
    }
    let field = match value {
        HeaderValue::Logical(flag) => format!("{:>20}", if *flag { "T" } else { "F" }),
        HeaderValue::Integer(number) => format!("{number:>20}"),
        HeaderValue::Float(number) => {
            if !number.is_finite() {
                return Err(FitsError::invalid_card(keyword, "non-finite float"));
            }
            format!("{:>20}", format!("{number:?}").to_uppercase())
        }
        HeaderValue::Text(text) => format!("'{:<8}'", text.replace('\'', "''")),
        HeaderValue::Complex(text) => format!("{text:>20}"),
        HeaderValue::Undefined => String::new(),
    };
    let line = format!("{keyword:<8}= {field}");
    if line.len() > CARD_LEN || !line.is_ascii() {
        return Err(FitsError::invalid_card(keyword, "value does not fit in one card"));
    }
    Ok(pad_card(&line))
}

/// The terminating `END` card.
pub fn end_card() -> [u8; CARD_LEN] {
    pad_card("END")
}

fn pad_card(text: &str) -> [u8; CARD_LEN] {
    let mut card = [b' '; CARD_LEN];
    card[..text.len()].copy_from_slice(text.as_bytes());
    card
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn card(text: &str) -> [u8; CARD_LEN] {
        pad_card(text)
    }

    #[test]
    fn parses_value_kinds() {
        let cases = [
            ("SIMPLE  =                    T / conforms", HeaderValue::Logical(true)),
            ("NAXIS1  =                  100", HeaderValue::Integer(100)),
            ("EXPTIME =               1.5D+2 / seconds", HeaderValue::Float(150.0)),
            ("EQUINOX =               2000.0", HeaderValue::Float(2000.0)),
            ("OBJECT  = 'M31 ''core'''       / target", HeaderValue::Text("M31 'core'".into())),
            ("BLANKV  =", HeaderValue::Undefined),
        ];
        for (text, expected) in cases {
            let parsed = parse_card(&card(text));
            assert_eq!(parsed.value, Some(expected), "{text}");
        }
    }

    #[test]
    fn commentary_has_no_value() {
        let parsed = parse_card(&card("HISTORY reduced with pipeline v2"));
        assert_eq!(parsed.keyword, "HISTORY");
        assert_eq!(parsed.value, None);
        assert_eq!(parsed.comment.as_deref(), Some("reduced with pipeline v2"));
    }

    #[test]
    fn string_comment_is_split() {
        let parsed = parse_card(&card("TELESCOP= 'HST     '           / telescope / with slash"));
        assert_eq!(parsed.value, Some(HeaderValue::Text("HST".into())));
        assert_eq!(parsed.comment.as_deref(), Some("telescope / with slash"));
    }

    #[test]
    fn build_then_parse_card() {
        let built = build_card("BUNIT", &HeaderValue::Text("JY/BEAM".into())).unwrap();
        assert_eq!(&built[..20], b"BUNIT   = 'JY/BEAM '");
        let parsed = parse_card(&built);
        assert_eq!(parsed.value, Some(HeaderValue::Text("JY/BEAM".into())));

        let built = build_card("CDELT1", &HeaderValue::Float(-0.5)).unwrap();
        assert_eq!(parse_card(&built).value, Some(HeaderValue::Float(-0.5)));
    }

    #[test]
    fn rejects_long_keyword() {
        assert!(build_card("TOOLONGKEY", &HeaderValue::Integer(1)).is_err());
    }

    #[test]
    fn header_requires_end() {
        let mut data = Vec::new();
        data.extend_from_slice(&card("SIMPLE  =                    T"));
        let err = Header::parse(&data, 0, 0).unwrap_err();
        assert!(matches!(err, FitsError::MissingEnd { hdu: 0 }));
    }

    #[test]
    fn header_length_is_block_aligned() {
        let mut data = Vec::new();
        data.extend_from_slice(&card("SIMPLE  =                    T"));
        data.extend_from_slice(&card("BITPIX  =                    8"));
        data.extend_from_slice(&end_card());
        data.resize(BLOCK_LEN, b' ');
        let (header, consumed) = Header::parse(&data, 0, 0).unwrap();
        assert_eq!(consumed, BLOCK_LEN);
        assert_eq!(header.int("BITPIX"), Some(8));
        assert_eq!(header.len(), 2);
    }

    proptest! {
        #[test]
        fn integer_cards_survive_build(value in any::<i64>()) {
            let built = build_card("NAXIS2", &HeaderValue::Integer(value)).unwrap();
            prop_assert_eq!(parse_card(&built).value, Some(HeaderValue::Integer(value)));
        }
    }
}
