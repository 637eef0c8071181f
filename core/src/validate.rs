//! Definition and argument validation.
//!
//! [`validate_definition`] catches structural errors in a command definition
//! (empty names, bad bounds, surplus or duplicate tags) before it is
//! registered. [`check_arguments`] re-checks a tokenized argument list against
//! the definition's bounds and slot types right before the executor runs.
//!
//! # Examples
//!
//! ```
//! use command_dispatch_core::*;
//!
//! let spec = ArgSpec::compile("f|f").unwrap();
//! let bounds = ArgBounds::new(2, 2).unwrap();
//! let tags = vec!["x".to_string(), "y".to_string()];
//! assert!(validate_definition("move", &tags, bounds).is_empty());
//!
//! let argv = vec![Argument::float(1.0), Argument::string("north")];
//! let err = check_arguments(&argv, &spec, bounds).unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::UnsupportedArg);
//! ```

use std::collections::HashSet;

use crate::error::{ArgumentError, DefinitionError};
use crate::{ArgBounds, ArgSpec, Argument};

/// Validates a command definition's name, bounds and tags.
///
/// Returns every problem found, or an empty list when the definition is valid.
///
/// # Examples
///
/// ```
/// use command_dispatch_core::*;
///
/// let bounds = ArgBounds::new(0, 1).unwrap();
/// let errors = validate_definition(" ", &["a".to_string(), "b".to_string()], bounds);
/// assert_eq!(errors[0], DefinitionError::EmptyName);
/// assert!(errors.iter().any(|e| matches!(e, DefinitionError::TooManyTags { .. })));
/// ```
pub fn validate_definition(name: &str, tags: &[String], bounds: ArgBounds) -> Vec<DefinitionError> {
    let mut errors = Vec::new();

    if name.trim().is_empty() {
        errors.push(DefinitionError::EmptyName);
    }

    if let Err(err) = ArgBounds::new(bounds.min, bounds.max) {
        errors.push(err);
    }

    if tags.len() > bounds.max {
        errors.push(DefinitionError::TooManyTags {
            count: tags.len(),
            max: bounds.max,
        });
    }

    let mut seen = HashSet::new();
    for tag in tags.iter().map(|tag| tag.trim()).filter(|tag| !tag.is_empty()) {
        if !seen.insert(tag) {
            errors.push(DefinitionError::DuplicateTag(tag.to_string()));
        }
    }

    errors
}

/// Checks a parsed argument list against bounds and per-slot types.
///
/// The tokenizer never produces more than `bounds.max` arguments, so the
/// upper-bound check only fires for argument lists built some other way.
pub fn check_arguments(argv: &[Argument], spec: &ArgSpec, bounds: ArgBounds) -> Result<(), ArgumentError> {
    let argc = argv.len();
    if argc < bounds.min {
        return Err(ArgumentError::Incomplete {
            min: bounds.min,
            argc,
        });
    }
    if argc > bounds.max {
        return Err(ArgumentError::Extraneous {
            max: bounds.max,
            argc,
        });
    }

    for (index, argument) in argv.iter().enumerate() {
        let Some(slot) = spec.slot(index) else {
            return Err(ArgumentError::Extraneous {
                max: bounds.max,
                argc,
            });
        };
        if !slot.accepts(argument.tag) {
            return Err(ArgumentError::unsupported(index, slot, argument.tag));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    fn bounds(min: usize, max: usize) -> ArgBounds {
        ArgBounds { min, max }
    }

    #[test]
    fn test_validate_definition_accepts_valid() {
        let tags = vec!["x".to_string(), String::new(), "z".to_string()];
        assert!(validate_definition("tp", &tags, bounds(3, 3)).is_empty());
    }

    #[test]
    fn test_validate_definition_rejects_bad_bounds() {
        let errors = validate_definition("tp", &[], bounds(2, 1));
        assert!(matches!(
            errors.as_slice(),
            [DefinitionError::InvalidBounds { min: 2, max: 1, .. }]
        ));
    }

    #[test]
    fn test_validate_definition_rejects_duplicate_tags() {
        let tags = vec!["x".to_string(), "x".to_string()];
        let errors = validate_definition("tp", &tags, bounds(0, 2));
        assert_eq!(errors, vec![DefinitionError::DuplicateTag("x".to_string())]);
    }

    #[test]
    fn test_check_arguments_incomplete() {
        let spec = ArgSpec::default();
        let err = check_arguments(&[Argument::integer(1)], &spec, bounds(2, 3)).unwrap_err();
        assert_eq!(err, ArgumentError::Incomplete { min: 2, argc: 1 });
        assert_eq!(err.kind(), ErrorKind::IncompleteArgs);
    }

    #[test]
    fn test_check_arguments_extraneous() {
        let spec = ArgSpec::default();
        let argv = vec![Argument::integer(1), Argument::integer(2)];
        let err = check_arguments(&argv, &spec, bounds(0, 1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ExtraneousArgs);
    }

    #[test]
    fn test_check_arguments_type_mismatch() {
        let spec = ArgSpec::compile("i").unwrap();
        let err = check_arguments(&[Argument::string("five")], &spec, bounds(1, 1)).unwrap_err();
        assert_eq!(
            err,
            ArgumentError::Unsupported {
                index: 0,
                expected: "integer".to_string(),
                found: "string".to_string(),
            }
        );
    }

    #[test]
    fn test_check_arguments_greedy_slot() {
        let spec = ArgSpec::compile("s|g").unwrap();
        let argv = vec![Argument::string("a"), Argument::greedy("b c")];
        assert!(check_arguments(&argv, &spec, bounds(1, 2)).is_ok());
    }
}
