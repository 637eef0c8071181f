//! Typed argument tokenizer.
//!
//! Turns the raw argument text of a command line into an ordered list of
//! [`Argument`]s, coercing each token according to its slot in the compiled
//! [`ArgSpec`]. Three token shapes are recognized:
//!
//! - **Greedy**: when the current slot is greedy and input remains, the rest
//!   of the line (minus leading whitespace) is captured verbatim and
//!   tokenizing stops. A greedy slot reached at end of input stays unfilled.
//! - **Quoted**: `'...'` or `"..."`; `\'` and `\"` collapse to a literal quote.
//! - **Bare**: everything up to the next whitespace. Coercion is tried in the
//!   order integer, float, boolean, string; the first match wins.
//!
//! Tokenizing stops at end of input or once `bounds.max` arguments have been
//! produced. Text past the maximum is discarded.
//!
//! # Examples
//!
//! ```
//! use command_dispatch_core::{tokenize, ArgBounds, ArgSpec, Argument, ScratchBuffer};
//!
//! let spec = ArgSpec::compile("i|f|b").unwrap();
//! let bounds = ArgBounds::new(3, 3).unwrap();
//! let mut scratch = ScratchBuffer::default();
//!
//! let argv = tokenize("5 12.5 true", &spec, bounds, &mut scratch).unwrap();
//! assert_eq!(
//!     argv,
//!     vec![Argument::integer(5), Argument::float(12.5), Argument::boolean(true)]
//! );
//! ```

use crate::error::ParseError;
use crate::{ArgBounds, ArgSpec, ArgTypes, Argument};

const BACKSLASH: u8 = b'\\';

/// Reusable byte buffer that quoted tokens are unescaped into.
///
/// The tokenizer sizes it to at least the input length before scanning, so a
/// write past capacity means the buffer was sized wrong and is reported as
/// [`ParseError::BufferOverflow`] instead of growing mid-parse.
#[derive(Debug, Clone, Default)]
pub struct ScratchBuffer {
    bytes: Vec<u8>,
    capacity: usize,
}

impl ScratchBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Logical capacity; writes beyond it fail.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Grows the buffer so it can hold `len` bytes. Never shrinks.
    pub fn ensure_capacity(&mut self, len: usize) {
        if len > self.capacity {
            self.bytes.reserve(len.saturating_sub(self.bytes.len()));
            self.capacity = len;
        }
    }

    fn clear(&mut self) {
        self.bytes.clear();
    }

    fn push(&mut self, byte: u8) -> Result<(), ParseError> {
        if self.bytes.len() >= self.capacity {
            return Err(ParseError::BufferOverflow {
                capacity: self.capacity,
            });
        }
        self.bytes.push(byte);
        Ok(())
    }

    fn retreat(&mut self) {
        self.bytes.pop();
    }

    fn as_text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

/// Tokenizes `input` against `spec`, producing at most `bounds.max` arguments.
///
/// The minimum count is not enforced here; callers check it once the full
/// argument list is known.
///
/// # Errors
///
/// Returns [`ParseError::UnterminatedQuote`] when a quoted token has no
/// closing quote.
pub fn tokenize(
    input: &str,
    spec: &ArgSpec,
    bounds: ArgBounds,
    scratch: &mut ScratchBuffer,
) -> Result<Vec<Argument>, ParseError> {
    scratch.ensure_capacity(input.len());
    Tokenizer::new(input, spec, bounds, scratch).run()
}

struct Tokenizer<'a> {
    input: &'a str,
    bytes: &'a [u8],
    spec: &'a ArgSpec,
    bounds: ArgBounds,
    scratch: &'a mut ScratchBuffer,
    current: usize,
    prev: u8,
    argv: Vec<Argument>,
}

impl<'a> Tokenizer<'a> {
    fn new(
        input: &'a str,
        spec: &'a ArgSpec,
        bounds: ArgBounds,
        scratch: &'a mut ScratchBuffer,
    ) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            spec,
            bounds,
            scratch,
            current: 0,
            prev: b' ',
            argv: Vec::with_capacity(bounds.max),
        }
    }

    fn run(mut self) -> Result<Vec<Argument>, ParseError> {
        while self.argv.len() < self.bounds.max {
            let Some(flags) = self.spec.slot(self.argv.len()) else {
                break;
            };

            if self.current >= self.bytes.len() {
                break;
            }

            if flags.is_greedy() {
                let rest = self.input[self.current..].trim_start_matches(|c: char| c.is_ascii_whitespace());
                self.argv.push(Argument::greedy(rest));
                break;
            }

            self.skip_whitespace();
            let Some(&byte) = self.bytes.get(self.current) else {
                break;
            };

            let argument = if is_quote(byte) && self.prev != BACKSLASH {
                self.quoted(byte, flags)?
            } else {
                self.bare(flags)
            };
            self.argv.push(argument);
        }

        Ok(self.argv)
    }

    fn skip_whitespace(&mut self) {
        while let Some(&byte) = self.bytes.get(self.current) {
            if !byte.is_ascii_whitespace() {
                break;
            }
            self.advance(byte);
        }
    }

    fn advance(&mut self, byte: u8) {
        self.prev = byte;
        self.current += 1;
    }

    fn quoted(&mut self, quote: u8, flags: ArgTypes) -> Result<Argument, ParseError> {
        let start = self.current;
        self.advance(quote);
        self.scratch.clear();

        loop {
            let Some(&byte) = self.bytes.get(self.current) else {
                return Err(ParseError::UnterminatedQuote {
                    quote: char::from(quote),
                    position: start,
                });
            };

            if byte == quote && self.prev != BACKSLASH {
                self.advance(byte);
                break;
            }

            if is_quote(byte) && self.prev == BACKSLASH {
                self.scratch.retreat();
            }
            self.scratch.push(byte)?;
            self.advance(byte);
        }

        Ok(Argument::string(flags.fold_case(&self.scratch.as_text())))
    }

    fn bare(&mut self, flags: ArgTypes) -> Argument {
        let start = self.current;
        while let Some(&byte) = self.bytes.get(self.current) {
            if byte.is_ascii_whitespace() {
                break;
            }
            self.advance(byte);
        }
        coerce(&self.input[start..self.current], flags)
    }
}

fn is_quote(byte: u8) -> bool {
    byte == b'"' || byte == b'\''
}

/// Coerces a bare token. The order integer, float, boolean, string matters:
/// `5` must stay an integer when a slot also accepts floats.
fn coerce(token: &str, flags: ArgTypes) -> Argument {
    if flags.contains(ArgTypes::INTEGER) {
        if let Ok(value) = token.parse::<i64>() {
            return Argument::integer(value);
        }
    }
    if flags.contains(ArgTypes::FLOAT) {
        if let Ok(value) = token.parse::<f64>() {
            return Argument::float(value);
        }
    }
    if flags.contains(ArgTypes::BOOLEAN) {
        if let Some(value) = parse_bool(token) {
            return Argument::boolean(value);
        }
    }
    Argument::string(flags.fold_case(token))
}

fn parse_bool(token: &str) -> Option<bool> {
    if token.len() > 5 {
        return None;
    }
    if token.eq_ignore_ascii_case("true") || token.eq_ignore_ascii_case("on") {
        Some(true)
    } else if token.eq_ignore_ascii_case("false") || token.eq_ignore_ascii_case("off") {
        Some(false)
    } else {
        None
    }
}
