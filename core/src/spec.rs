//! Compact argument spec compiler.
//!
//! A spec string holds one `|`-separated segment per argument slot. Letters
//! inside a segment select the permitted types:
//!
//! | Letter | Meaning                         |
//! |--------|---------------------------------|
//! | `g`    | greedy, rest of line (exclusive) |
//! | `i`    | integer                         |
//! | `f`    | float                           |
//! | `b`    | boolean                         |
//! | `s`    | string                          |
//! | `l`    | lowercase string                |
//! | `u`    | uppercase string                |
//!
//! Any other non-letter character (`,`, spaces, ...) is a separator. A segment
//! with no letters leaves its slot unrestricted.
//!
//! # Examples
//!
//! ```
//! use command_dispatch_core::{ArgSpec, ArgTypes};
//!
//! let spec = ArgSpec::compile("i|f,i|s").unwrap();
//! assert_eq!(spec.slot(0), Some(ArgTypes::INTEGER));
//! assert_eq!(spec.slot(1), Some(ArgTypes::INTEGER | ArgTypes::FLOAT));
//! assert_eq!(spec.slot(2), Some(ArgTypes::STRING));
//! assert_eq!(spec.slot(3), Some(ArgTypes::ANY));
//! ```

use crate::error::SpecError;
use crate::{ArgSpec, ArgTypes, MAX_ARGS};

impl ArgSpec {
    /// Compiles a spec string into per-slot type masks.
    ///
    /// # Errors
    ///
    /// Returns [`SpecError::UnknownType`] for an unrecognized letter,
    /// [`SpecError::TooManySlots`] past [`MAX_ARGS`] segments and
    /// [`SpecError::SlotAfterGreedy`] when a segment follows a greedy one.
    pub fn compile(source: &str) -> Result<Self, SpecError> {
        let mut slots = [ArgTypes::ANY; MAX_ARGS];
        let mut index = 0;
        let mut current = ArgTypes::empty();

        for (position, ch) in source.char_indices() {
            match ch {
                '|' => {
                    if current.is_greedy() {
                        return Err(SpecError::SlotAfterGreedy { position });
                    }
                    slots[index] = finish_slot(current);
                    index += 1;
                    if index >= MAX_ARGS {
                        return Err(SpecError::TooManySlots {
                            position,
                            capacity: MAX_ARGS,
                        });
                    }
                    current = ArgTypes::empty();
                }
                'g' => current = ArgTypes::GREEDY,
                'i' => current = concrete(current, ArgTypes::INTEGER),
                'f' => current = concrete(current, ArgTypes::FLOAT),
                'b' => current = concrete(current, ArgTypes::BOOLEAN),
                's' => current = concrete(current, ArgTypes::STRING),
                'l' => current = concrete(current, ArgTypes::STRING | ArgTypes::LOWERCASE),
                'u' => current = concrete(current, ArgTypes::STRING | ArgTypes::UPPERCASE),
                letter if letter.is_alphabetic() => {
                    return Err(SpecError::UnknownType { letter, position });
                }
                _ => {}
            }
        }

        slots[index] = finish_slot(current);
        Ok(ArgSpec::from_slots(slots))
    }

    /// Recompiles this spec in place.
    ///
    /// On failure the spec is reset to the unrestricted default before the
    /// error is returned, so a partially applied spec is never observable.
    ///
    /// # Examples
    ///
    /// ```
    /// use command_dispatch_core::ArgSpec;
    ///
    /// let mut spec = ArgSpec::compile("i|i").unwrap();
    /// assert!(spec.apply("i|x").is_err());
    /// assert_eq!(spec, ArgSpec::default());
    /// ```
    pub fn apply(&mut self, source: &str) -> Result<(), SpecError> {
        match ArgSpec::compile(source) {
            Ok(compiled) => {
                *self = compiled;
                Ok(())
            }
            Err(err) => {
                self.reset();
                Err(err)
            }
        }
    }
}

fn concrete(current: ArgTypes, bits: ArgTypes) -> ArgTypes {
    current.difference(ArgTypes::GREEDY) | bits
}

fn finish_slot(current: ArgTypes) -> ArgTypes {
    if current.is_empty() {
        ArgTypes::ANY
    } else {
        current
    }
}
