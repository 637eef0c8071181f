//! Argument containers handed to executors.
//!
//! A definition picks its container shape once, through [`ArgumentMode`]:
//! positional definitions receive an index-addressed list, associative ones a
//! map keyed by argument tag (or by slot index when a slot has no tag).

use std::collections::BTreeMap;

use command_dispatch_core::{ArgValue, Argument};
use serde::{Deserialize, Serialize};

/// How parsed arguments are delivered to a definition's executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgumentMode {
    #[default]
    Positional,
    Associative,
}

/// Key of an associative argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArgKey {
    Index(usize),
    Name(String),
}

/// Arguments delivered to an executor.
///
/// # Examples
///
/// ```
/// use command_dispatch::{ArgumentMode, Arguments};
/// use command_dispatch_core::Argument;
///
/// let argv = vec![Argument::string("alice"), Argument::integer(3)];
/// let tags = vec!["target".to_string()];
///
/// let positional = Arguments::build(ArgumentMode::Positional, &argv, &tags);
/// assert_eq!(positional.get(1).and_then(|v| v.as_i64()), Some(3));
///
/// let associative = Arguments::build(ArgumentMode::Associative, &argv, &tags);
/// assert_eq!(associative.get_named("target").and_then(|v| v.as_str()), Some("alice"));
/// assert_eq!(associative.get(1).and_then(|v| v.as_i64()), Some(3));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Arguments {
    Positional(Vec<ArgValue>),
    Associative(BTreeMap<ArgKey, ArgValue>),
}

impl Arguments {
    /// Builds the container for `mode` from a checked argument list.
    pub fn build(mode: ArgumentMode, argv: &[Argument], tags: &[String]) -> Self {
        match mode {
            ArgumentMode::Positional => {
                Arguments::Positional(argv.iter().map(|arg| arg.value.clone()).collect())
            }
            ArgumentMode::Associative => Arguments::Associative(
                argv.iter()
                    .enumerate()
                    .map(|(index, arg)| (slot_key(tags, index), arg.value.clone()))
                    .collect(),
            ),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Arguments::Positional(values) => values.len(),
            Arguments::Associative(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Positional lookup; for associative containers only untagged slots are
    /// addressable by index.
    pub fn get(&self, index: usize) -> Option<&ArgValue> {
        match self {
            Arguments::Positional(values) => values.get(index),
            Arguments::Associative(map) => map.get(&ArgKey::Index(index)),
        }
    }

    /// Lookup by tag name. Always `None` for positional containers.
    pub fn get_named(&self, name: &str) -> Option<&ArgValue> {
        match self {
            Arguments::Positional(_) => None,
            Arguments::Associative(map) => map.get(&ArgKey::Name(name.to_string())),
        }
    }

    /// All values; positional order for lists, key order for maps.
    pub fn values(&self) -> Vec<&ArgValue> {
        match self {
            Arguments::Positional(values) => values.iter().collect(),
            Arguments::Associative(map) => map.values().collect(),
        }
    }
}

fn slot_key(tags: &[String], index: usize) -> ArgKey {
    match tags.get(index).map(|tag| tag.trim()) {
        Some(tag) if !tag.is_empty() => ArgKey::Name(tag.to_string()),
        _ => ArgKey::Index(index),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_ignores_names() {
        let argv = vec![Argument::float(1.0), Argument::float(2.0)];
        let tags = vec!["x".to_string(), "y".to_string()];
        let args = Arguments::build(ArgumentMode::Positional, &argv, &tags);
        assert_eq!(args.len(), 2);
        assert_eq!(args.get_named("x"), None);
        assert_eq!(args.get(0), Some(&ArgValue::Float(1.0)));
    }

    #[test]
    fn test_associative_falls_back_to_index() {
        let argv = vec![
            Argument::string("a"),
            Argument::string("b"),
            Argument::string("c"),
        ];
        let tags = vec!["first".to_string(), String::new()];
        let args = Arguments::build(ArgumentMode::Associative, &argv, &tags);

        assert_eq!(args.get_named("first"), Some(&ArgValue::String("a".into())));
        assert_eq!(args.get(1), Some(&ArgValue::String("b".into())));
        assert_eq!(args.get(2), Some(&ArgValue::String("c".into())));
        assert_eq!(args.get(0), None);
    }

    #[test]
    fn test_empty_container() {
        let args = Arguments::build(ArgumentMode::Associative, &[], &[]);
        assert!(args.is_empty());
        assert!(args.values().is_empty());
    }
}
