use std::convert::TryFrom;

use failure::{bail, Error, Fail};
use nom::types::CompleteStr;
use nom::*;

use crate::window::{WindowPredicate, MAX_WINDOW_VALUE};

/// Longest digit run accepted for a `window:` option.
pub const MAX_WINDOW_DIGITS: usize = 9;

#[derive(Clone, Debug, PartialEq, Fail)]
pub enum ParseError {
    #[fail(display = "invalid window option: `{}`", _0)]
    Syntax(String),
    #[fail(display = "window size {} exceeds 65535", _0)]
    OutOfRange(u32),
}

/// Bounds of the `window:` option grammar.
///
/// Built once when the keyword is registered and shared read-only by every
/// rule compiled afterwards.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Grammar {
    max_digits: usize,
    max_value: u16,
}

impl Grammar {
    pub fn new(max_digits: usize, max_value: u16) -> Result<Self, Error> {
        if max_digits == 0 || max_digits > MAX_WINDOW_DIGITS {
            bail!(
                "digit run must be 1 to {} digits long, got {}",
                MAX_WINDOW_DIGITS,
                max_digits
            );
        }

        let widest = 10u32.pow(max_digits as u32) - 1;

        if u32::from(max_value) > widest {
            bail!(
                "maximum value {} can't be written in {} digits",
                max_value,
                max_digits
            );
        }

        Ok(Grammar {
            max_digits,
            max_value,
        })
    }

    /// grammar of the TCP `window:` keyword
    pub fn window() -> Result<Self, Error> {
        Grammar::new(MAX_WINDOW_DIGITS, MAX_WINDOW_VALUE)
    }

    pub fn max_digits(&self) -> usize {
        self.max_digits
    }

    pub fn max_value(&self) -> u16 {
        self.max_value
    }

    /// Compile the argument of one `window:` option, e.g. `"!35402"`.
    pub fn compile(&self, text: &str) -> Result<WindowPredicate, ParseError> {
        let syntax = || ParseError::Syntax(text.to_owned());

        let (remaining, (negated, digits)) =
            parse_window_option(CompleteStr(text)).map_err(|_| syntax())?;

        if !remaining.is_empty() || digits.len() > self.max_digits {
            return Err(syntax());
        }

        let value: u32 = digits.parse().map_err(|_| syntax())?;

        if value > u32::from(self.max_value) {
            return Err(ParseError::OutOfRange(value));
        }

        let threshold = u16::try_from(value).map_err(|_| ParseError::OutOfRange(value))?;

        trace!("window size {}, negated: {}", threshold, negated);

        Ok(WindowPredicate { threshold, negated })
    }
}

named!(spaces<CompleteStr, CompleteStr>, take_while!(|c: char| c == ' '));

named!(parse_window_option<CompleteStr, (bool, CompleteStr)>, do_parse!(
    spaces >>
    negation: opt!(tag!("!")) >>
    spaces >>
    digits: digit >>
    spaces >>
    ( (negation.is_some(), digits) )
));
