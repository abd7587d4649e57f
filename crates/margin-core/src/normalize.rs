//! # Product Key Normalization
//!
//! Spreadsheet exports and warehouse tables spell the same product in many
//! ways: `"Sérum Vitamina C 30ml"`, `"SERUM VITAMINA-C 30 ML "`, ... Cost
//! lookups match on a normalized key instead of the raw name.
//!
//! ## Rules
//! 1. Lowercase
//! 2. Fold Latin diacritics (`é → e`, `ç → c`, `ß → ss`)
//! 3. Every run of non-alphanumeric characters becomes one space
//! 4. Trim
//!
//! ```rust
//! use margin_core::normalize::normalize_key;
//!
//! assert_eq!(normalize_key("  Sérum  Vitamina-C 30ml "), "serum vitamina c 30ml");
//! assert_eq!(normalize_key("PROTEÇÃO SOLAR"), "protecao solar");
//! ```

/// Normalizes a product name into its lookup key.
pub fn normalize_key(name: &str) -> String {
    let mut key = KeyBuilder::with_capacity(name.len());

    for c in name.chars().flat_map(char::to_lowercase) {
        match fold_diacritic(c) {
            Some(base) => base.chars().for_each(|b| key.push(b)),
            None => key.push(c),
        }
    }

    key.out
}

struct KeyBuilder {
    out: String,
    pending_space: bool,
}

impl KeyBuilder {
    fn with_capacity(capacity: usize) -> Self {
        KeyBuilder {
            out: String::with_capacity(capacity),
            pending_space: false,
        }
    }

    fn push(&mut self, c: char) {
        if c.is_alphanumeric() {
            if self.pending_space && !self.out.is_empty() {
                self.out.push(' ');
            }
            self.pending_space = false;
            self.out.push(c);
        } else {
            self.pending_space = true;
        }
    }
}

/// Maps a lowercase Latin letter with a diacritic to its base form.
fn fold_diacritic(c: char) -> Option<&'static str> {
    let base = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => "a",
        'ç' | 'ć' | 'ĉ' | 'ċ' | 'č' => "c",
        'ď' | 'đ' => "d",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => "e",
        'ĝ' | 'ğ' | 'ġ' | 'ģ' => "g",
        'ĥ' | 'ħ' => "h",
        'ì' | 'í' | 'î' | 'ï' | 'ĩ' | 'ī' | 'ĭ' | 'į' | 'ı' => "i",
        'ĵ' => "j",
        'ķ' => "k",
        'ĺ' | 'ļ' | 'ľ' | 'ŀ' | 'ł' => "l",
        'ñ' | 'ń' | 'ņ' | 'ň' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ŏ' | 'ő' => "o",
        'ŕ' | 'ŗ' | 'ř' => "r",
        'ś' | 'ŝ' | 'ş' | 'š' => "s",
        'ß' => "ss",
        'ţ' | 'ť' | 'ŧ' => "t",
        'ù' | 'ú' | 'û' | 'ü' | 'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' => "u",
        'ŵ' => "w",
        'ý' | 'ÿ' | 'ŷ' => "y",
        'ź' | 'ż' | 'ž' => "z",
        'æ' => "ae",
        'œ' => "oe",
        _ => return None,
    };
    Some(base)
}

// =============================================================================
// Unit Tests
// =============================================================================
