//! Reentrant dispatch example.
//!
//! A `repeat` command dispatches another command line several times through
//! the same controller. Each nested call gets its own invocation context;
//! the outer one is restored after every inner call, even when the inner
//! command fails or panics.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p command-dispatch-demos --example nested_dispatch
//! ```

use command_dispatch::{Controller, Invoker, Listener};

fn main() -> anyhow::Result<()> {
    let controller = Controller::new();

    controller.register(
        Listener::builder("greet")
            .spec("s")
            .tags(["name"])
            .args(1, 1)
            .associative(true)
            .on_exec(|ctl, _, args| {
                let name = args.get_named("name").and_then(|v| v.as_str()).unwrap_or("?");
                println!("{:indent$}hello, {name} (depth {})", "", ctl.depth(), indent = ctl.depth() * 2);
                Ok(1)
            }),
    )?;

    controller.register(Listener::builder("explode").on_exec(|_, _, _| panic!("boom")))?;

    controller.register(
        Listener::builder("repeat")
            .spec("i|g")
            .tags(["times", "line"])
            .args(2, 2)
            .on_exec(|ctl, invoker, args| {
                let times = args.get(0).and_then(|v| v.as_i64()).unwrap_or(0);
                let line = args.get(1).and_then(|v| v.as_str()).unwrap_or_default();
                let mut succeeded = 0;
                for _ in 0..times {
                    match ctl.dispatch(invoker, line) {
                        Ok(_) => succeeded += 1,
                        Err(err) => println!("  inner '{line}' failed: {}", err.kind()),
                    }
                    let outer = ctl.current_context().map(|ctx| ctx.command().to_string());
                    anyhow::ensure!(outer.as_deref() == Some("repeat"), "outer context lost");
                }
                Ok(succeeded)
            }),
    )?;

    let console = Invoker::console();
    for line in [
        "repeat 2 greet world",
        "repeat 2 repeat 2 greet nested",
        "repeat 2 explode",
    ] {
        println!("> {line}");
        match controller.dispatch(&console, line) {
            Ok(code) => println!("  => {code}"),
            Err(err) => println!("  => {}: {err}", err.kind()),
        }
    }

    println!("depth after all calls: {}", controller.depth());
    Ok(())
}
