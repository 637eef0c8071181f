//! Built-in executors that manifest entries bind to by `action` name.

use anyhow::{Context as _, anyhow, bail};
use command_dispatch::{Arguments, ListenerBuilder};
use command_dispatch_core::ArgValue;

/// Action names understood by [`bind`].
pub const ACTIONS: &[&str] = &["echo", "sum", "exec", "fail", "abort"];

/// Binds the executor named `action` to `builder`.
///
/// Entries without an action are registered without an executor, so
/// dispatching them reports `MISSING_EXECUTER`.
pub fn bind(builder: ListenerBuilder, action: Option<&str>) -> anyhow::Result<ListenerBuilder> {
    let Some(action) = action else {
        return Ok(builder);
    };
    let builder = match action {
        "echo" => builder.on_exec(|_, _, args| {
            println!("{}", joined(args));
            Ok(1)
        }),
        "sum" => builder.on_exec(|_, _, args| {
            let mut total = 0.0;
            for value in args.values() {
                total += value
                    .as_f64()
                    .ok_or_else(|| anyhow!("'{value}' is not a number"))?;
            }
            println!("{total}");
            Ok(1)
        }),
        "exec" => builder.on_exec(|controller, invoker, args| {
            let line = joined(args);
            let code = controller
                .dispatch(invoker, &line)
                .with_context(|| format!("nested command '{line}' failed"))?;
            Ok(i64::from(code))
        }),
        "fail" => builder.on_exec(|_, _, args| {
            let reason = joined(args);
            if reason.is_empty() {
                bail!("failure requested");
            }
            bail!("{reason}")
        }),
        "abort" => builder.on_exec(|_, _, _| Ok(0)),
        other => bail!(
            "unknown action '{other}' for command '{}' (expected one of: {})",
            builder.name(),
            ACTIONS.join(", ")
        ),
    };
    Ok(builder)
}

fn joined(args: &Arguments) -> String {
    args.values()
        .into_iter()
        .map(ArgValue::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}
