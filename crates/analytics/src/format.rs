//! Compact number rendering for chart labels and table cells.
//!
//! Large values are scaled by powers of 1000 and suffixed (`1.500K`,
//! `2.028B`). Values below 1000 are printed as-is, except that fractions
//! with four or more leading zeros collapse into subscript notation
//! (`0.0₅1234` is `0.00000 1234...`).

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Returned for input that does not start with a number. Clients render it
/// verbatim, so the text is part of the contract.
pub const INVALID_INPUT: &str = "Invalid input";

const SUFFIXES: [&str; 13] = [
    "", "K", "M", "B", "T", "Qa", "Qi", "Sx", "Sp", "Oc", "No", "Dc", "Un",
];

const SUBSCRIPT_DIGITS: [&str; 19] = [
    "₀", "₁", "₂", "₃", "₄", "₅", "₆", "₇", "₈", "₉", "₁₀", "₁₁", "₁₂", "₁₃", "₁₄", "₁₅", "₁₆",
    "₁₇", "₁₈",
];

/// Fractions with fewer leading zeros than this are truncated, not compressed.
const SUBSCRIPT_MIN_ZEROS: usize = 4;
const SUBSCRIPT_SIGNIFICANT_DIGITS: usize = 4;
const TRUNCATED_LEN: usize = 6;
const SIGNIFICANT_DIGITS: f64 = 4.0;

/// Anything the formatter accepts: a number, numeric text, or nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum NumericInput {
    Null,
    Number(f64),
    Text(String),
}

impl From<f64> for NumericInput {
    fn from(value: f64) -> Self {
        NumericInput::Number(value)
    }
}

impl From<i64> for NumericInput {
    fn from(value: i64) -> Self {
        NumericInput::Number(value as f64)
    }
}

impl From<u64> for NumericInput {
    fn from(value: u64) -> Self {
        NumericInput::Number(value as f64)
    }
}

impl From<Decimal> for NumericInput {
    fn from(value: Decimal) -> Self {
        NumericInput::Number(value.to_f64().unwrap_or(f64::NAN))
    }
}

impl From<&str> for NumericInput {
    fn from(value: &str) -> Self {
        NumericInput::Text(value.to_string())
    }
}

impl From<String> for NumericInput {
    fn from(value: String) -> Self {
        NumericInput::Text(value)
    }
}

impl<T: Into<NumericInput>> From<Option<T>> for NumericInput {
    fn from(value: Option<T>) -> Self {
        value.map_or(NumericInput::Null, Into::into)
    }
}

/// Formats `input` for display.
///
/// * `Null` renders as the empty string.
/// * Text without a leading number, NaN, and infinities render as
///   [`INVALID_INPUT`].
/// * `|value| >= 1000` is scaled down by 1000 per step and suffixed, keeping
///   about four significant digits. Scaling stops at the last suffix
///   (`Un`, 10^36); anything larger keeps a scaled integer part of 1000 or more.
/// * Smaller values keep their decimal text: up to six characters, or
///   subscript-zero notation when the fraction starts with four or more zeros.
pub fn format_number(input: impl Into<NumericInput>) -> String {
    let (value, text) = match input.into() {
        NumericInput::Null => return String::new(),
        NumericInput::Number(value) => (value, None),
        NumericInput::Text(text) => match parse_leading_number(&text) {
            Some(value) => (value, plain_decimal(&text).map(str::to_string)),
            None => return INVALID_INPUT.to_string(),
        },
    };

    if !value.is_finite() {
        return INVALID_INPUT.to_string();
    }

    let (scaled, magnitude) = scale(value);
    if magnitude == 0 {
        let text = text.unwrap_or_else(|| decimal_text(value));
        return compress_fraction(&text);
    }

    format!("{}{}", to_fixed(scaled, decimals_for(scaled)), SUFFIXES[magnitude])
}

fn scale(value: f64) -> (f64, usize) {
    let mut scaled = value;
    let mut magnitude = 0;
    while scaled.abs() >= 1000.0 && magnitude < SUFFIXES.len() - 1 {
        scaled /= 1000.0;
        magnitude += 1;
    }
    (scaled, magnitude)
}

/// `max(4 - floor(max(1, log10(|v|) + 1)), 0)`: fewer decimals as the
/// integer part grows.
fn decimals_for(scaled: f64) -> u32 {
    let integer_digits = (scaled.abs().log10() + 1.0).max(1.0).floor();
    (SIGNIFICANT_DIGITS - integer_digits).max(0.0) as u32
}

/// Fixed-point rendering with ties rounded away from zero on the exact
/// binary value, so `1.005` (really 1.00499...) gives `1.00`.
fn to_fixed(value: f64, decimals: u32) -> String {
    match Decimal::from_f64_retain(value) {
        Some(exact) => {
            let mut rounded =
                exact.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
            rounded.rescale(decimals);
            rounded.to_string()
        }
        // Out of Decimal's range; only reachable past the last suffix.
        None => format!("{:.*}", decimals as usize, value),
    }
}

/// The shortest round-trip decimal text, never in exponent form.
fn decimal_text(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else {
        value.to_string()
    }
}

fn compress_fraction(text: &str) -> String {
    let mut parts = text.split('.');
    let integer_part = parts.next().unwrap_or_default();
    let fraction = match parts.next() {
        Some(fraction) if !fraction.is_empty() && fraction != "0" => fraction,
        _ => return integer_part.to_string(),
    };

    let leading_zeros = fraction.chars().take_while(|c| *c == '0').count();
    if leading_zeros < SUBSCRIPT_MIN_ZEROS {
        return text.chars().take(TRUNCATED_LEN).collect();
    }

    let subscript = SUBSCRIPT_DIGITS.get(leading_zeros).copied().unwrap_or(SUBSCRIPT_DIGITS[0]);
    let significant: String = fraction[leading_zeros..]
        .chars()
        .take(SUBSCRIPT_SIGNIFICANT_DIGITS)
        .collect();
    format!("{integer_part}.0{subscript}{significant}")
}

/// Parses the longest numeric prefix of `text` after leading whitespace,
/// e.g. `" 12.5kg"` is 12.5. `None` when no digits lead the text.
fn parse_leading_number(text: &str) -> Option<f64> {
    let trimmed = text.trim_start();
    let bytes = trimmed.as_bytes();

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    if trimmed[end..].starts_with("Infinity") {
        return Some(if bytes[0] == b'-' { f64::NEG_INFINITY } else { f64::INFINITY });
    }

    let integer_digits = count_digits(&bytes[end..]);
    end += integer_digits;

    let mut fraction_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        fraction_digits = count_digits(&bytes[end + 1..]);
        if integer_digits + fraction_digits > 0 {
            end += 1 + fraction_digits;
        }
    }
    if integer_digits + fraction_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exponent_end = end + 1;
        if matches!(bytes.get(exponent_end), Some(b'+' | b'-')) {
            exponent_end += 1;
        }
        let exponent_digits = count_digits(&bytes[exponent_end..]);
        if exponent_digits > 0 {
            end = exponent_end + exponent_digits;
        }
    }

    trimmed[..end].parse::<f64>().ok()
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

/// The trimmed text when it is written in plain decimal notation (`"0.50"`,
/// `"-12"`), so small values keep the caller's own digits. Exponents and
/// trailing junk fall back to the parsed value's text.
fn plain_decimal(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    let unsigned = trimmed.strip_prefix(['+', '-']).unwrap_or(trimmed);
    let is_plain = unsigned.bytes().any(|b| b.is_ascii_digit())
        && unsigned.bytes().all(|b| b.is_ascii_digit() || b == b'.')
        && unsigned.bytes().filter(|b| *b == b'.').count() <= 1;
    is_plain.then_some(trimmed)
}
