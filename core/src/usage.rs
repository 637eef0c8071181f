//! Usage signature rendering.
//!
//! Renders one `<name:types>` element per argument slot. Optional slots
//! (index >= `min`) are marked with `*` after the name, untagged slots are
//! named `argN`, and rendering stops after a greedy slot.
//!
//! # Examples
//!
//! ```
//! use command_dispatch_core::{render_usage, ArgBounds, ArgSpec, UsageMode};
//!
//! let spec = ArgSpec::compile("f|f|s").unwrap();
//! let tags = vec!["x".to_string(), "y".to_string()];
//! let bounds = ArgBounds::new(2, 3).unwrap();
//!
//! assert_eq!(
//!     render_usage(&spec, &tags, bounds, UsageMode::Compact),
//!     "<x:float> <y:float> <arg2*:string>"
//! );
//! ```

use serde::{Deserialize, Serialize};

use crate::{ArgBounds, ArgSpec};

/// How much of a signature to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UsageMode {
    /// Omit trailing optional slots that are untagged and unrestricted.
    #[default]
    Compact,
    /// Render every slot up to the maximum argument count.
    Full,
}

/// Renders the argument part of a usage signature.
pub fn render_usage(spec: &ArgSpec, tags: &[String], bounds: ArgBounds, mode: UsageMode) -> String {
    let end = match mode {
        UsageMode::Full => bounds.max,
        UsageMode::Compact => (0..bounds.max)
            .rev()
            .find(|&index| {
                index < bounds.min
                    || is_tagged(tags, index)
                    || spec.slot(index).is_some_and(|slot| !slot.is_unrestricted())
            })
            .map_or(0, |last| last + 1),
    };

    let mut parts = Vec::with_capacity(end);
    for index in 0..end {
        let Some(slot) = spec.slot(index) else {
            break;
        };
        let name = match tags.get(index).map(|tag| tag.trim()) {
            Some(tag) if !tag.is_empty() => tag.to_string(),
            _ => format!("arg{index}"),
        };
        let optional = if index >= bounds.min { "*" } else { "" };
        parts.push(format!("<{name}{optional}:{}>", slot.describe()));
        if slot.is_greedy() {
            break;
        }
    }

    parts.join(" ")
}

/// Renders `name` followed by its argument signature.
pub fn render_signature(
    name: &str,
    spec: &ArgSpec,
    tags: &[String],
    bounds: ArgBounds,
    mode: UsageMode,
) -> String {
    let args = render_usage(spec, tags, bounds, mode);
    if args.is_empty() {
        name.to_string()
    } else {
        format!("{name} {args}")
    }
}

fn is_tagged(tags: &[String], index: usize) -> bool {
    tags.get(index).is_some_and(|tag| !tag.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn test_required_slots_render_without_marker() {
        let spec = ArgSpec::compile("f|f|f").unwrap();
        let bounds = ArgBounds::new(3, 3).unwrap();
        assert_eq!(
            render_usage(&spec, &tags(&["x", "y", "z"]), bounds, UsageMode::Compact),
            "<x:float> <y:float> <z:float>"
        );
    }

    #[test]
    fn test_multi_type_slot_lists_types_in_order() {
        let spec = ArgSpec::compile("sbi").unwrap();
        let bounds = ArgBounds::new(1, 1).unwrap();
        assert_eq!(
            render_usage(&spec, &[], bounds, UsageMode::Compact),
            "<arg0:integer,boolean,string>"
        );
    }

    #[test]
    fn test_compact_drops_trailing_unrestricted_optionals() {
        let spec = ArgSpec::compile("i").unwrap();
        let bounds = ArgBounds::new(0, 4).unwrap();
        assert_eq!(
            render_usage(&spec, &[], bounds, UsageMode::Compact),
            "<arg0*:integer>"
        );
        assert_eq!(
            render_usage(&spec, &[], bounds, UsageMode::Full),
            "<arg0*:integer> <arg1*:any> <arg2*:any> <arg3*:any>"
        );
    }

    #[test]
    fn test_tagged_unrestricted_slot_is_kept() {
        let spec = ArgSpec::default();
        let bounds = ArgBounds::new(0, 3).unwrap();
        assert_eq!(
            render_usage(&spec, &tags(&["", "", "mode"]), bounds, UsageMode::Compact),
            "<arg0*:any> <arg1*:any> <mode*:any>"
        );
    }

    #[test]
    fn test_greedy_stops_rendering() {
        let spec = ArgSpec::compile("l|g").unwrap();
        let bounds = ArgBounds::new(1, 4).unwrap();
        assert_eq!(
            render_usage(&spec, &tags(&["target", "message"]), bounds, UsageMode::Full),
            "<target:string> <message*:...>"
        );
    }

    #[test]
    fn test_signature_without_args() {
        let spec = ArgSpec::default();
        let bounds = ArgBounds::default();
        assert_eq!(
            render_signature("quit", &spec, &[], bounds, UsageMode::Compact),
            "quit"
        );
    }
}
