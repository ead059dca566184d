use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{HitranError, Result};

/// Wavenumber (cm⁻¹) to wavelength (µm) numerator.
pub const CM_INV_TO_MICRON: f64 = 1e4;

// ---------------------------------------------------------------------------
// TokenIndex – position of one whitespace-separated token
// ---------------------------------------------------------------------------

/// Position of a token counted from either end of the line.
///
/// Serialized as a signed integer: `1` is the second token, `-1` the last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum TokenIndex {
    FromStart(usize),
    /// `FromEnd(1)` is the last token.
    FromEnd(usize),
}

impl TokenIndex {
    /// Normalise a signed index; negative values count from the end.
    pub fn from_signed(index: isize) -> Self {
        if index < 0 {
            TokenIndex::FromEnd(index.unsigned_abs())
        } else {
            TokenIndex::FromStart(index.unsigned_abs())
        }
    }

    /// Index of an existing token in a line of `len` tokens.
    pub fn resolve(self, len: usize) -> Option<usize> {
        match self {
            TokenIndex::FromStart(i) => (i < len).then_some(i),
            TokenIndex::FromEnd(0) => None,
            TokenIndex::FromEnd(k) => len.checked_sub(k),
        }
    }

    /// Position usable as a slice bound (may equal `len`).
    fn bound(self, len: usize) -> Option<usize> {
        match self {
            TokenIndex::FromStart(i) => (i <= len).then_some(i),
            TokenIndex::FromEnd(k) => len.checked_sub(k),
        }
    }

    /// Slice bound clamped into `0..=len`.
    fn clamped_bound(self, len: usize) -> usize {
        match self {
            TokenIndex::FromStart(i) => i.min(len),
            TokenIndex::FromEnd(k) => len.saturating_sub(k),
        }
    }

    /// Fetch the token or report the line as malformed.
    pub fn token<'a>(self, tokens: &[&'a str], line: usize) -> Result<&'a str> {
        self.resolve(tokens.len())
            .map(|i| tokens[i])
            .ok_or_else(|| {
                HitranError::malformed(
                    line,
                    format!("token {self} out of range ({} tokens)", tokens.len()),
                )
            })
    }
}

impl TryFrom<i64> for TokenIndex {
    type Error = String;

    fn try_from(value: i64) -> std::result::Result<Self, Self::Error> {
        isize::try_from(value)
            .map(TokenIndex::from_signed)
            .map_err(|_| format!("token index {value} does not fit this platform"))
    }
}

impl From<TokenIndex> for i64 {
    fn from(index: TokenIndex) -> Self {
        match index {
            TokenIndex::FromStart(i) => i as i64,
            TokenIndex::FromEnd(k) => -(k as i64),
        }
    }
}

impl fmt::Display for TokenIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", i64::from(*self))
    }
}

// ---------------------------------------------------------------------------
// TokenSpan – half-open token range
// ---------------------------------------------------------------------------

/// Half-open token range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSpan {
    pub start: TokenIndex,
    pub end: TokenIndex,
}

impl TokenSpan {
    /// Span with both bounds counted from the start of the line.
    pub fn new(start: usize, end: usize) -> Self {
        TokenSpan {
            start: TokenIndex::FromStart(start),
            end: TokenIndex::FromStart(end),
        }
    }

    /// Span running from `start` up to `trailing` tokens before the end.
    pub fn until_end(start: usize, trailing: usize) -> Self {
        TokenSpan {
            start: TokenIndex::FromStart(start),
            end: TokenIndex::FromEnd(trailing),
        }
    }

    /// Tokens covered by the span; both bounds must lie inside the line.
    pub fn slice<'t, 'a>(&self, tokens: &'t [&'a str], line: usize) -> Result<&'t [&'a str]> {
        let len = tokens.len();
        match (self.start.bound(len), self.end.bound(len)) {
            (Some(start), Some(end)) if start <= end => Ok(&tokens[start..end]),
            _ => Err(HitranError::malformed(
                line,
                format!("token span {self} out of range ({len} tokens)"),
            )),
        }
    }

    /// Tokens covered by the span after clamping to the line; never fails.
    pub fn slice_clamped<'t, 'a>(&self, tokens: &'t [&'a str]) -> &'t [&'a str] {
        let len = tokens.len();
        let start = self.start.clamped_bound(len);
        let end = self.end.clamped_bound(len);
        if start >= end {
            &[]
        } else {
            &tokens[start..end]
        }
    }
}

impl fmt::Display for TokenSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

// ---------------------------------------------------------------------------
// Numeric field strategies
// ---------------------------------------------------------------------------

/// Fixed-width cut applied to a token before numeric parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cut {
    /// Keep the first `n` characters.
    KeepLeading(usize),
    /// Remove the last `n` characters.
    DropTrailing(usize),
}

impl Cut {
    /// Apply the cut; widths count bytes, as in the fixed-width HITRAN layout.
    pub fn apply(self, token: &str) -> std::result::Result<&str, String> {
        let end = match self {
            Cut::KeepLeading(n) if token.len() >= n => n,
            Cut::DropTrailing(n) if token.len() > n => token.len() - n,
            _ => return Err(format!("token '{token}' too short for {self:?}")),
        };
        token
            .get(..end)
            .ok_or_else(|| format!("{self:?} of '{token}' is not on a character boundary"))
    }

    fn width(self) -> usize {
        match self {
            Cut::KeepLeading(n) | Cut::DropTrailing(n) => n,
        }
    }
}

/// How one floating-point output column is derived from the tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NumericField {
    /// The whole token parsed as a number.
    Token { index: TokenIndex },
    /// A fixed-width substring of the token parsed as a number.
    Substring { index: TokenIndex, cut: Cut },
    /// `numerator / token`, e.g. wavenumber to wavelength.
    Reciprocal { index: TokenIndex, numerator: f64 },
}

impl NumericField {
    pub fn token(index: isize) -> Self {
        NumericField::Token {
            index: TokenIndex::from_signed(index),
        }
    }

    pub fn substring(index: isize, cut: Cut) -> Self {
        NumericField::Substring {
            index: TokenIndex::from_signed(index),
            cut,
        }
    }

    pub fn reciprocal(index: isize, numerator: f64) -> Self {
        NumericField::Reciprocal {
            index: TokenIndex::from_signed(index),
            numerator,
        }
    }

    /// Token the field reads from.
    pub fn index(&self) -> TokenIndex {
        match self {
            NumericField::Token { index }
            | NumericField::Substring { index, .. }
            | NumericField::Reciprocal { index, .. } => *index,
        }
    }

    /// Evaluate the field against one tokenized line.
    pub fn eval(&self, tokens: &[&str], line: usize) -> Result<f64> {
        match self {
            NumericField::Token { index } => parse_float(index.token(tokens, line)?, line),
            NumericField::Substring { index, cut } => {
                let token = index.token(tokens, line)?;
                let text = cut
                    .apply(token)
                    .map_err(|reason| HitranError::malformed(line, reason))?;
                parse_float(text, line)
            }
            NumericField::Reciprocal { index, numerator } => {
                let value = numerator / parse_float(index.token(tokens, line)?, line)?;
                if !value.is_finite() {
                    return Err(HitranError::malformed(
                        line,
                        format!("{numerator} / token {index} is not finite"),
                    ));
                }
                Ok(value)
            }
        }
    }
}

fn parse_float(text: &str, line: usize) -> Result<f64> {
    text.parse::<f64>()
        .map_err(|_| HitranError::malformed(line, format!("'{text}' is not a number")))
}

// ---------------------------------------------------------------------------
// Label strategy
// ---------------------------------------------------------------------------

/// How the transition label is built from the tokens after the band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LabelField {
    /// Join a token range with `separator` (`""` concatenates).
    RangeJoin { span: TokenSpan, separator: String },
}

impl LabelField {
    pub fn concat(span: TokenSpan) -> Self {
        LabelField::RangeJoin {
            span,
            separator: String::new(),
        }
    }

    pub fn comma(span: TokenSpan) -> Self {
        LabelField::RangeJoin {
            span,
            separator: ",".to_string(),
        }
    }

    pub fn eval(&self, tokens: &[&str], line: usize) -> Result<String> {
        match self {
            LabelField::RangeJoin { span, separator } => {
                Ok(span.slice(tokens, line)?.join(separator.as_str()))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// BandCriteria – accepted band strings
// ---------------------------------------------------------------------------

/// Accepted value(s) of the space-joined band tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BandCriteria {
    Single(String),
    AnyOf(Vec<String>),
}

impl BandCriteria {
    /// Equality for `Single`, membership for `AnyOf`.
    pub fn matches(&self, band: &str) -> bool {
        match self {
            BandCriteria::Single(expected) => expected == band,
            BandCriteria::AnyOf(accepted) => accepted.iter().any(|a| a == band),
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            BandCriteria::Single(s) => s.is_empty(),
            BandCriteria::AnyOf(v) => v.is_empty() || v.iter().any(String::is_empty),
        }
    }
}

impl From<&str> for BandCriteria {
    fn from(s: &str) -> Self {
        BandCriteria::Single(s.to_string())
    }
}

impl<const N: usize> From<[&str; N]> for BandCriteria {
    fn from(values: [&str; N]) -> Self {
        BandCriteria::AnyOf(values.iter().map(|s| s.to_string()).collect())
    }
}

// ---------------------------------------------------------------------------
// Rule – one molecule + band
// ---------------------------------------------------------------------------

/// Extraction and filter rule for one molecule/band selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub wavenumber: NumericField,
    pub wavelength: NumericField,
    pub einstein_a: NumericField,
    pub energy: NumericField,
    pub gu: NumericField,
    pub gl: NumericField,
    pub band_span: TokenSpan,
    pub band_criteria: BandCriteria,
    pub line_name: LabelField,
}

impl Rule {
    /// Standard HITRAN line layout with a selection-specific band and label.
    ///
    /// Wavenumber is token 1, Einstein A the first 9 characters of token 3,
    /// lower-state energy token 4 minus its last 12 characters, and gu/gl
    /// the last two tokens.
    pub fn hitran(
        band_span: TokenSpan,
        band_criteria: impl Into<BandCriteria>,
        line_name: LabelField,
    ) -> Self {
        Rule {
            wavenumber: NumericField::token(1),
            wavelength: NumericField::reciprocal(1, CM_INV_TO_MICRON),
            einstein_a: NumericField::substring(3, Cut::KeepLeading(9)),
            energy: NumericField::substring(4, Cut::DropTrailing(12)),
            gu: NumericField::token(-2),
            gl: NumericField::token(-1),
            band_span,
            band_criteria: band_criteria.into(),
            line_name,
        }
    }

    /// Checks that need no input line.
    pub fn validate(&self) -> std::result::Result<(), String> {
        match (self.band_span.start, self.band_span.end) {
            (TokenIndex::FromStart(s), TokenIndex::FromStart(e)) if s < e => {}
            _ => return Err(format!("band span {} must be a non-empty forward range", self.band_span)),
        }
        if self.band_criteria.is_empty() {
            return Err("band criteria must not be empty".to_string());
        }
        let fields = [
            ("wavenumber", &self.wavenumber),
            ("wavelength", &self.wavelength),
            ("einstein_a", &self.einstein_a),
            ("energy", &self.energy),
            ("gu", &self.gu),
            ("gl", &self.gl),
        ];
        for (name, field) in fields {
            if field.index() == TokenIndex::FromEnd(0) {
                return Err(format!("{name}: index -0 is not a token"));
            }
            match field {
                NumericField::Substring { cut, .. } if cut.width() == 0 => {
                    return Err(format!("{name}: cut width must be positive"));
                }
                NumericField::Reciprocal { numerator, .. } if *numerator == 0.0 || !numerator.is_finite() => {
                    return Err(format!("{name}: reciprocal numerator must be finite and non-zero"));
                }
                _ => {}
            }
        }
        Ok(())
    }
}
