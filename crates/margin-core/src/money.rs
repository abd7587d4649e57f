//! # Money Module
//!
//! Display formatting and locale-aware parsing of monetary amounts.
//!
//! ## Where Amounts Come From
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  INPUT SOURCES                         FORMAT SEEN                      │
//! │                                                                         │
//! │  Form field (pt-BR user)        ──►    "1.234,56"                       │
//! │  Spreadsheet export             ──►    "R$ 12,50"                       │
//! │  Warehouse query / CLI flag     ──►    "1234.56"                        │
//! │                                                                         │
//! │  parse_amount() accepts all of them and returns one f64.                │
//! │  CurrencyFormat::format() turns results back into "R$ 1.234,56".        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use margin_core::money::{parse_amount, CurrencyFormat};
//!
//! let cost = parse_amount("R$ 1.234,56").unwrap();
//! assert_eq!(cost, 1234.56);
//!
//! let brl = CurrencyFormat::default();
//! assert_eq!(brl.format(cost), "R$ 1.234,56");
//! ```
//!
//! Arithmetic stays in `f64`: margins are ratios, and regional factors and
//! cost multipliers produce fractional cents that must survive into the raw
//! sensitivity dataset. Rounding happens only at the display edge.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};

// =============================================================================
// Currency Format
// =============================================================================

/// How currency values are rendered for display.
///
/// ## Default
/// Brazilian real: symbol `R$`, decimal comma, dot thousands separator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CurrencyFormat {
    pub symbol: String,
    pub decimal_separator: char,
    pub thousands_separator: char,
    pub decimals: u8,
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        CurrencyFormat {
            symbol: "R$".to_string(),
            decimal_separator: ',',
            thousands_separator: '.',
            decimals: 2,
        }
    }
}

impl CurrencyFormat {
    /// Formats `value` with symbol, grouping and fixed decimals.
    ///
    /// ## Example
    /// ```rust
    /// use margin_core::money::CurrencyFormat;
    ///
    /// let brl = CurrencyFormat::default();
    /// assert_eq!(brl.format(1234.5), "R$ 1.234,50");
    /// assert_eq!(brl.format(-5.5), "-R$ 5,50");
    /// assert_eq!(brl.format(0.0), "R$ 0,00");
    /// ```
    pub fn format(&self, value: f64) -> String {
        let decimals = self.decimals as usize;
        let rounded = format!("{:.*}", decimals, value.abs());
        let (whole, frac) = match rounded.split_once('.') {
            Some((whole, frac)) => (whole, Some(frac)),
            None => (rounded.as_str(), None),
        };

        // "-R$ 0,00" would be noise
        let is_negative = value < 0.0 && rounded.bytes().any(|b| (b'1'..=b'9').contains(&b));

        let mut out = String::with_capacity(rounded.len() + self.symbol.len() + 4);
        if is_negative {
            out.push('-');
        }
        if !self.symbol.is_empty() {
            out.push_str(&self.symbol);
            out.push(' ');
        }
        out.push_str(&group_thousands(whole, self.thousands_separator));
        if let Some(frac) = frac {
            out.push(self.decimal_separator);
            out.push_str(frac);
        }
        out
    }
}

/// Inserts `separator` every three digits from the right.
fn group_thousands(digits: &str, separator: char) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(c);
    }
    out
}

// =============================================================================
// Percent & Number Display
// =============================================================================

/// Formats a percentage with two decimals: `61.666` → `"61.67%"`.
pub fn format_percent(value: f64) -> String {
    format!("{:.2}%", value)
}

/// Formats with up to `max_decimals`, dropping trailing zeros.
///
/// ```rust
/// use margin_core::money::format_trimmed;
///
/// assert_eq!(format_trimmed(10.0, 2), "10");
/// assert_eq!(format_trimmed(2.5, 2), "2.5");
/// assert_eq!(format_trimmed(-0.001, 2), "0");
/// ```
pub fn format_trimmed(value: f64, max_decimals: usize) -> String {
    let formatted = format!("{:.*}", max_decimals, value);
    let trimmed = if formatted.contains('.') {
        formatted.trim_end_matches('0').trim_end_matches('.')
    } else {
        formatted.as_str()
    };
    match trimmed {
        "-0" => "0".to_string(),
        other => other.to_string(),
    }
}

/// Rounds half away from zero to `places` decimals.
///
/// Display only: the engine never rounds intermediate figures.
#[inline]
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

// =============================================================================
// Locale-Aware Parsing
// =============================================================================

/// Currency markers stripped before parsing. Longest first.
const CURRENCY_MARKERS: &[&str] = &["US$", "R$", "$", "€", "£", "%"];

/// Parses a user- or spreadsheet-entered amount.
///
/// ## Separator Rules
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  both ',' and '.'   → the LAST one is decimal   "1.234,56"  "1,234.56"  │
/// │  ',' once           → decimal comma             "12,5"                   │
/// │  '.' once           → decimal point             "12.5"   "1.234"         │
/// │  either repeated    → thousands separator       "1.234.567" "1,234,567"  │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
///
/// Whitespace (including non-breaking spaces), currency symbols and a
/// trailing `%` are ignored.
///
/// ## Example
/// ```rust
/// use margin_core::money::parse_amount;
///
/// assert_eq!(parse_amount("1.234,56").unwrap(), 1234.56);
/// assert_eq!(parse_amount("1,234.56").unwrap(), 1234.56);
/// assert_eq!(parse_amount("R$ 12,50").unwrap(), 12.5);
/// assert_eq!(parse_amount("10%").unwrap(), 10.0);
/// assert!(parse_amount("twelve").is_err());
/// ```
pub fn parse_amount(text: &str) -> CoreResult<f64> {
    let invalid = |reason: &str| CoreError::InvalidAmount {
        input: text.to_string(),
        reason: reason.to_string(),
    };

    let mut body: String = text.chars().filter(|c| !c.is_whitespace()).collect();

    let negative = match body.chars().next() {
        Some('-') | Some('\u{2212}') => {
            body = body.chars().skip(1).collect();
            true
        }
        Some('+') => {
            body.remove(0);
            false
        }
        _ => false,
    };

    loop {
        let before = body.len();
        for marker in CURRENCY_MARKERS {
            if let Some(rest) = body.strip_prefix(marker) {
                body = rest.to_string();
            }
            if let Some(rest) = body.strip_suffix(marker) {
                body = rest.to_string();
            }
        }
        if body.len() == before {
            break;
        }
    }

    if body.is_empty() {
        return Err(invalid("no digits"));
    }
    let allowed = |c: char| c.is_ascii_digit() || c == ',' || c == '.';
    if !body.chars().all(allowed) {
        return Err(invalid("unexpected characters"));
    }
    if !body.chars().any(|c| c.is_ascii_digit()) {
        return Err(invalid("no digits"));
    }

    let normalized = normalize_separators(&body);
    let value: f64 = normalized
        .parse()
        .map_err(|_| invalid("malformed number"))?;

    if !value.is_finite() {
        return Err(invalid("not a finite number"));
    }

    Ok(if negative { -value } else { value })
}

/// Rewrites `body` (digits, ',' and '.') into Rust float syntax.
fn normalize_separators(body: &str) -> String {
    let commas = body.matches(',').count();
    let dots = body.matches('.').count();

    match (commas, dots) {
        (0, 0) => body.to_string(),
        (c, d) if c > 0 && d > 0 => {
            let last_comma = body.rfind(',').unwrap_or(0);
            let last_dot = body.rfind('.').unwrap_or(0);
            if last_comma > last_dot {
                body.replace('.', "").replace(',', ".")
            } else {
                body.replace(',', "")
            }
        }
        (1, 0) => body.replace(',', "."),
        (_, 0) => body.replace(',', ""),
        (0, 1) => body.to_string(),
        _ => body.replace('.', ""),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
