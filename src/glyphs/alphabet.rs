use crate::foundation::error::{GlyphreelError, GlyphreelResult};

/// Brightness ramp from densest to lightest, followed by punctuation and brackets.
///
/// The trailing space is part of the ramp (the lightest cell).
pub const DEFAULT_ALPHABET: &str =
    "@B%8&WM#*oahkbdpqwmZO0QLCJUYXzcvunxrjft/|()1{}[]?-_+~<>i!lI;:,^` ";

/// Ordered set of characters to render, without duplicates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alphabet {
    chars: Vec<char>,
}

impl Alphabet {
    pub fn new(chars: &str) -> GlyphreelResult<Self> {
        if chars.is_empty() {
            return Err(GlyphreelError::validation("alphabet must not be empty"));
        }

        let mut out = Vec::with_capacity(chars.len());
        for c in chars.chars() {
            if out.contains(&c) {
                return Err(GlyphreelError::validation(format!(
                    "alphabet contains '{c}' (U+{:04X}) more than once",
                    u32::from(c)
                )));
            }
            out.push(c);
        }
        Ok(Self { chars: out })
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Self {
            chars: DEFAULT_ALPHABET.chars().collect(),
        }
    }
}

/// Output file name for a glyph: its decimal code point, e.g. `'@'` -> `64.png`.
pub fn code_point_file_name(c: char) -> String {
    format!("{}.png", u32::from(c))
}

/// Inverse of [`code_point_file_name`]. Returns `None` for anything that is not
/// `<decimal code point>.png` in canonical form (no sign, no leading zeros).
pub fn parse_code_point_file_name(name: &str) -> Option<char> {
    let stem = name.strip_suffix(".png")?;
    if stem.is_empty() || !stem.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if stem.len() > 1 && stem.starts_with('0') {
        return None;
    }
    char::from_u32(stem.parse::<u32>().ok()?)
}
