//! Display-format specifiers for extracted values.
//!
//! A small mini-language modeled on the std `format!` spec:
//!
//! ```text
//! [[fill]align][width][.precision]
//! ```
//!
//! - `align` is one of `<` (left, the default), `^` (center), `>` (right);
//!   an arbitrary fill character may precede it (default space)
//! - `width` pads the rendered value to at least that many characters
//! - `.precision` rounds floats and truncates strings, as in `format!`
//!
//! The empty spec is valid and renders the plain `Display` output.
//! Anything else is rejected with `AccessError::Format`.

use std::fmt::Display;

use crate::error::AccessError;

/// Horizontal alignment within the padded width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Align {
    Left,
    Center,
    Right,
}

/// A parsed format specifier, applied to any `Display` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FormatSpec {
    fill: char,
    align: Align,
    width: Option<usize>,
    precision: Option<usize>,
}

impl FormatSpec {
    /// Parse a specifier string.
    ///
    /// # Errors
    ///
    /// Returns `AccessError::Format` on malformed input: missing digits
    /// after `.`, an unparseable width, or trailing characters.
    pub(crate) fn parse(spec: &str) -> Result<Self, AccessError> {
        let malformed = |message: &str| AccessError::Format {
            spec: spec.to_string(),
            message: message.to_string(),
        };

        let chars: Vec<char> = spec.chars().collect();
        let mut pos = 0;

        let mut fill = ' ';
        let mut align = Align::Left;
        if chars.len() >= 2 && is_align(chars[1]) {
            fill = chars[0];
            align = to_align(chars[1]);
            pos = 2;
        } else if !chars.is_empty() && is_align(chars[0]) {
            align = to_align(chars[0]);
            pos = 1;
        }

        let width = take_number(&chars, &mut pos)
            .transpose()
            .map_err(|_| malformed("width out of range"))?;

        let precision = if pos < chars.len() && chars[pos] == '.' {
            pos += 1;
            match take_number(&chars, &mut pos) {
                Some(Ok(p)) => Some(p),
                Some(Err(_)) => return Err(malformed("precision out of range")),
                None => return Err(malformed("missing digits after '.'")),
            }
        } else {
            None
        };

        if pos != chars.len() {
            return Err(malformed("unexpected trailing characters"));
        }

        Ok(Self {
            fill,
            align,
            width,
            precision,
        })
    }

    /// Render a value through this specifier.
    pub(crate) fn apply(&self, value: &dyn Display) -> String {
        let rendered = match self.precision {
            Some(precision) => format!("{value:.precision$}"),
            None => value.to_string(),
        };

        let Some(width) = self.width else {
            return rendered;
        };
        let len = rendered.chars().count();
        if len >= width {
            return rendered;
        }

        let pad = width - len;
        let fill = |n: usize| self.fill.to_string().repeat(n);
        match self.align {
            Align::Left => format!("{rendered}{}", fill(pad)),
            Align::Right => format!("{}{rendered}", fill(pad)),
            Align::Center => {
                let left = pad / 2;
                format!("{}{rendered}{}", fill(left), fill(pad - left))
            }
        }
    }
}

fn is_align(c: char) -> bool {
    matches!(c, '<' | '^' | '>')
}

fn to_align(c: char) -> Align {
    match c {
        '<' => Align::Left,
        '^' => Align::Center,
        _ => Align::Right,
    }
}

/// Consume a run of ASCII digits starting at `pos`.
///
/// `None` when no digit is present; `Some(Err(..))` when the run does not
/// fit a `usize`.
fn take_number(
    chars: &[char],
    pos: &mut usize,
) -> Option<Result<usize, std::num::ParseIntError>> {
    let start = *pos;
    while *pos < chars.len() && chars[*pos].is_ascii_digit() {
        *pos += 1;
    }
    if *pos == start {
        return None;
    }
    let digits: String = chars[start..*pos].iter().collect();
    Some(digits.parse())
}
