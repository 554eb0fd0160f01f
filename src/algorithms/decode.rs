//! Identifier decoding.
//!
//! Map exporters cannot emit XML ids that start with a digit, so numeric
//! region codes arrive escaped (`_x31_23` for `123`). Decoding substitutes the
//! escape tokens, applies the manual override table and classifies the result
//! as a numeric or text [`Code`].

use std::collections::BTreeMap;

use crate::error::ConfigError;
use crate::model::Code;

/// Escape token table. No token may be a prefix of another, which makes a
/// single left-to-right substitution pass unambiguous.
#[derive(Clone, Debug, PartialEq)]
pub struct EscapeTable {
    tokens: Vec<(String, char)>,
}

impl EscapeTable {
    pub fn new<I, S>(entries: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (S, char)>,
        S: Into<String>,
    {
        let tokens: Vec<(String, char)> = entries.into_iter().map(|(t, d)| (t.into(), d)).collect();
        for (i, (token, digit)) in tokens.iter().enumerate() {
            if !digit.is_ascii_digit() {
                return Err(ConfigError::InvalidEscapeDigit { token: token.clone(), digit: *digit });
            }
            if token.is_empty() {
                return Err(ConfigError::AmbiguousEscapeTokens { token: token.clone(), other: String::new() });
            }
            for (j, (other, _)) in tokens.iter().enumerate() {
                if i != j && other.starts_with(token.as_str()) {
                    return Err(ConfigError::AmbiguousEscapeTokens { token: token.clone(), other: other.clone() });
                }
            }
        }
        Ok(EscapeTable { tokens })
    }

    pub fn tokens(&self) -> impl Iterator<Item = (&str, char)> {
        self.tokens.iter().map(|(t, d)| (t.as_str(), *d))
    }

    /// Replace every escape token with its digit in one pass.
    pub fn substitute(&self, raw: &str) -> String {
        let mut out = String::with_capacity(raw.len());
        let mut rest = raw;
        'outer: while let Some(ch) = rest.chars().next() {
            for (token, digit) in &self.tokens {
                if let Some(tail) = rest.strip_prefix(token.as_str()) {
                    out.push(*digit);
                    rest = tail;
                    continue 'outer;
                }
            }
            out.push(ch);
            rest = &rest[ch.len_utf8()..];
        }
        out
    }
}

impl Default for EscapeTable {
    fn default() -> Self {
        let tokens = ('0'..='9').map(|d| (format!("_x3{d}_"), d)).collect();
        EscapeTable { tokens }
    }
}

/// Full-string overrides for identifiers the token scheme cannot resolve.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OverrideTable {
    entries: BTreeMap<String, String>,
}

impl OverrideTable {
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        OverrideTable { entries: entries.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }

    pub fn get(&self, key: &str) -> Option<&str> { self.entries.get(key).map(String::as_str) }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

/// Pure decoder: a function of (raw id, escape table, override table).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Decoder {
    pub escapes: EscapeTable,
    pub overrides: OverrideTable,
}

impl Decoder {
    pub fn new(escapes: EscapeTable, overrides: OverrideTable) -> Self {
        Decoder { escapes, overrides }
    }

    /// Decoded identifier text: substitution, then override lookup (first by
    /// the substituted string, then by the raw string).
    pub fn decode_text(&self, raw: &str) -> String {
        let substituted = self.escapes.substitute(raw);
        if let Some(o) = self.overrides.get(&substituted).or_else(|| self.overrides.get(raw)) {
            return o.to_string();
        }
        substituted
    }

    pub fn decode(&self, raw: &str) -> Code {
        classify(self.decode_text(raw))
    }
}

/// Non-empty all-digit strings that fit in `u64` become numeric codes.
pub fn classify(text: String) -> Code {
    if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(n) = text.parse::<u64>() {
            return Code::Numeric(n);
        }
    }
    Code::Text(text)
}
