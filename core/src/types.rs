//! Argument type definitions shared by the compiler, tokenizer and dispatcher.
//!
//! An [`ArgSpec`] is a fixed-capacity array of [`ArgTypes`] masks, one per
//! argument slot. The tokenizer produces [`Argument`] values, each carrying
//! the type tag it was coerced to and the [`ArgValue`] itself.

use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::error::DefinitionError;

/// Fixed number of argument slots a single command can declare.
pub const MAX_ARGS: usize = 16;

bitflags! {
    /// Set of value types permitted for one argument slot.
    ///
    /// `GREEDY` is exclusive: a greedy slot captures the rest of the line
    /// verbatim and never carries a concrete type. `LOWERCASE` and
    /// `UPPERCASE` are case-folding modifiers applied to string values.
    ///
    /// # Examples
    ///
    /// ```
    /// use command_dispatch_core::ArgTypes;
    ///
    /// let numeric = ArgTypes::INTEGER | ArgTypes::FLOAT;
    /// assert!(numeric.accepts(ArgTypes::FLOAT));
    /// assert!(!numeric.accepts(ArgTypes::STRING));
    /// assert!(ArgTypes::ANY.is_unrestricted());
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct ArgTypes: u8 {
        const GREEDY = 1 << 0;
        const INTEGER = 1 << 1;
        const FLOAT = 1 << 2;
        const BOOLEAN = 1 << 3;
        const STRING = 1 << 4;
        const LOWERCASE = 1 << 5;
        const UPPERCASE = 1 << 6;

        const ANY = Self::INTEGER.bits()
            | Self::FLOAT.bits()
            | Self::BOOLEAN.bits()
            | Self::STRING.bits();
    }
}

impl ArgTypes {
    /// Value types in the order the tokenizer tries them.
    pub const VALUE_ORDER: [(ArgTypes, &'static str); 4] = [
        (ArgTypes::INTEGER, "integer"),
        (ArgTypes::FLOAT, "float"),
        (ArgTypes::BOOLEAN, "boolean"),
        (ArgTypes::STRING, "string"),
    ];

    /// Returns `true` if the slot captures the remainder of the line.
    pub fn is_greedy(self) -> bool {
        self.contains(ArgTypes::GREEDY)
    }

    /// Returns `true` if every value type is permitted.
    pub fn is_unrestricted(self) -> bool {
        !self.is_greedy() && self.contains(ArgTypes::ANY)
    }

    /// Returns only the value-type bits, dropping greedy and case modifiers.
    pub fn value_types(self) -> ArgTypes {
        self & ArgTypes::ANY
    }

    /// Returns `true` if a value tagged `tag` may occupy a slot with this mask.
    pub fn accepts(self, tag: ArgTypes) -> bool {
        if tag.is_greedy() {
            return self.is_greedy();
        }
        !self.is_greedy() && self.intersects(tag.value_types())
    }

    /// Applies the slot's case-folding modifier to `text`.
    pub fn fold_case(self, text: &str) -> String {
        if self.contains(ArgTypes::LOWERCASE) {
            text.to_lowercase()
        } else if self.contains(ArgTypes::UPPERCASE) {
            text.to_uppercase()
        } else {
            text.to_string()
        }
    }

    /// Human-readable type list (`...`, `any`, or e.g. `integer,float`).
    pub fn describe(self) -> String {
        if self.is_greedy() {
            return "...".to_string();
        }
        if self.is_unrestricted() || self.value_types().is_empty() {
            return "any".to_string();
        }
        Self::VALUE_ORDER
            .iter()
            .filter(|(bit, _)| self.contains(*bit))
            .map(|(_, name)| *name)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl Default for ArgTypes {
    fn default() -> Self {
        ArgTypes::ANY
    }
}

/// Compiled per-slot type constraints.
///
/// Slots not mentioned by a spec string stay unrestricted ([`ArgTypes::ANY`]).
/// Build one with [`ArgSpec::compile`](crate::ArgSpec::compile).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgSpec {
    slots: [ArgTypes; MAX_ARGS],
}

impl ArgSpec {
    /// Creates a spec from explicit slot masks.
    pub fn from_slots(slots: [ArgTypes; MAX_ARGS]) -> Self {
        Self { slots }
    }

    /// Returns the mask for `index`, or `None` past the fixed capacity.
    pub fn slot(&self, index: usize) -> Option<ArgTypes> {
        self.slots.get(index).copied()
    }

    /// Returns all slot masks.
    pub fn slots(&self) -> &[ArgTypes; MAX_ARGS] {
        &self.slots
    }

    /// Index of the first greedy slot, if any.
    pub fn greedy_slot(&self) -> Option<usize> {
        self.slots.iter().position(|slot| slot.is_greedy())
    }

    /// Resets every slot to the unrestricted default.
    pub fn reset(&mut self) {
        self.slots = [ArgTypes::ANY; MAX_ARGS];
    }
}

impl Default for ArgSpec {
    fn default() -> Self {
        Self {
            slots: [ArgTypes::ANY; MAX_ARGS],
        }
    }
}

/// Minimum and maximum argument counts for a command.
///
/// # Examples
///
/// ```
/// use command_dispatch_core::{ArgBounds, MAX_ARGS};
///
/// let bounds = ArgBounds::new(1, 3).unwrap();
/// assert_eq!(bounds.min, 1);
/// assert!(ArgBounds::new(3, 1).is_err());
/// assert!(ArgBounds::new(0, MAX_ARGS + 1).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ArgBounds {
    pub min: usize,
    pub max: usize,
}

impl ArgBounds {
    /// Creates bounds, enforcing `min <= max <= MAX_ARGS`.
    pub fn new(min: usize, max: usize) -> Result<Self, DefinitionError> {
        if min > max || max > MAX_ARGS {
            return Err(DefinitionError::InvalidBounds {
                min,
                max,
                capacity: MAX_ARGS,
            });
        }
        Ok(Self { min, max })
    }
}

/// A coerced argument value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgValue {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    String(String),
}

impl ArgValue {
    /// Returns the integer value, if this is an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ArgValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value as `f64`, widening integers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ArgValue::Float(v) => Some(*v),
            ArgValue::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Returns the boolean value, if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ArgValue::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the text, if this is a string (greedy captures included).
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArgValue::String(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Integer(v) => write!(f, "{v}"),
            ArgValue::Float(v) => write!(f, "{v}"),
            ArgValue::Boolean(v) => write!(f, "{v}"),
            ArgValue::String(v) => f.write_str(v),
        }
    }
}

/// One parsed argument: the type it was coerced to plus its value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Argument {
    /// Single type bit (`INTEGER`, `FLOAT`, `BOOLEAN`, `STRING` or `GREEDY`).
    ///
    /// A greedy capture carries a string value but keeps the `GREEDY` tag, so
    /// it is only accepted by the greedy slot that produced it.
    pub tag: ArgTypes,
    /// Coerced value; greedy captures hold [`ArgValue::String`].
    pub value: ArgValue,
}

impl Argument {
    /// An `INTEGER` argument.
    pub fn integer(value: i64) -> Self {
        Self {
            tag: ArgTypes::INTEGER,
            value: ArgValue::Integer(value),
        }
    }

    /// A `FLOAT` argument.
    pub fn float(value: f64) -> Self {
        Self {
            tag: ArgTypes::FLOAT,
            value: ArgValue::Float(value),
        }
    }

    /// A `BOOLEAN` argument.
    pub fn boolean(value: bool) -> Self {
        Self {
            tag: ArgTypes::BOOLEAN,
            value: ArgValue::Boolean(value),
        }
    }

    /// A `STRING` argument, already case-folded if its slot asked for it.
    pub fn string(value: impl Into<String>) -> Self {
        Self {
            tag: ArgTypes::STRING,
            value: ArgValue::String(value.into()),
        }
    }

    /// A verbatim remainder-of-line capture, tagged `GREEDY`.
    pub fn greedy(value: impl Into<String>) -> Self {
        Self {
            tag: ArgTypes::GREEDY,
            value: ArgValue::String(value.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_spec_is_unrestricted() {
        let spec = ArgSpec::default();
        assert!(spec.slots().iter().all(|slot| slot.is_unrestricted()));
        assert_eq!(spec.greedy_slot(), None);
    }

    #[test]
    fn test_accepts_respects_greedy_exclusivity() {
        assert!(ArgTypes::GREEDY.accepts(ArgTypes::GREEDY));
        assert!(!ArgTypes::GREEDY.accepts(ArgTypes::STRING));
        assert!(!ArgTypes::STRING.accepts(ArgTypes::GREEDY));
        assert!((ArgTypes::STRING | ArgTypes::LOWERCASE).accepts(ArgTypes::STRING));
    }

    #[test]
    fn test_describe_orders_types() {
        let mask = ArgTypes::STRING | ArgTypes::INTEGER | ArgTypes::BOOLEAN;
        assert_eq!(mask.describe(), "integer,boolean,string");
        assert_eq!(ArgTypes::ANY.describe(), "any");
        assert_eq!(ArgTypes::GREEDY.describe(), "...");
    }

    #[test]
    fn test_fold_case() {
        let lower = ArgTypes::STRING | ArgTypes::LOWERCASE;
        let upper = ArgTypes::STRING | ArgTypes::UPPERCASE;
        assert_eq!(lower.fold_case("MiXeD"), "mixed");
        assert_eq!(upper.fold_case("MiXeD"), "MIXED");
        assert_eq!(ArgTypes::STRING.fold_case("MiXeD"), "MiXeD");
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(ArgValue::Integer(4).as_f64(), Some(4.0));
        assert_eq!(ArgValue::Float(1.5).as_i64(), None);
        assert_eq!(ArgValue::String("x".into()).as_str(), Some("x"));
        assert_eq!(ArgValue::Boolean(true).to_string(), "true");
    }
}
