//! Teleport command example.
//!
//! Registers a `tp` command taking three float coordinates, dispatches a few
//! lines against it and prints what each one produced, including the errors
//! a malformed line reports.
//!
//! # Usage
//!
//! ```bash
//! RUST_LOG=debug cargo run -p command-dispatch-demos --example teleport
//! ```

use std::cell::Cell;
use std::rc::Rc;

use command_dispatch::{Controller, Invoker, Listener};
use command_dispatch_core::UsageMode;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let controller = Controller::new();
    let teleports = Rc::new(Cell::new(0));

    let counter = Rc::clone(&teleports);
    controller
        .register(
            Listener::builder("tp")
                .description("Teleport to coordinates")
                .spec("f|f|f")
                .tags(["x", "y", "z"])
                .args(3, 3)
                .auth_level(10)
                .on_exec(|_, invoker, args| {
                    let coords: Vec<f64> = args.values().iter().filter_map(|v| v.as_f64()).collect();
                    println!("  {} teleports to {coords:?}", invoker.name);
                    Ok(1)
                })
                .on_post(move |_, _, _| {
                    counter.set(counter.get() + 1);
                    Ok(())
                }),
        )
        .expect("tp definition is valid");

    println!(
        "Usage: {}",
        controller.usage("tp", UsageMode::Full).unwrap_or_default()
    );
    println!();

    let admin = Invoker::new("admin", 100);
    let guest = Invoker::new("guest", 0);

    let attempts = [
        (&admin, "tp 1.0 2.5 -3.25"),
        (&admin, "tp 10 20 30"),
        (&admin, "tp 1.0 2.5"),
        (&admin, "tp north 2 3"),
        (&guest, "tp 0 0 0"),
        (&admin, "teleport 0 0 0"),
    ];

    for (invoker, line) in attempts {
        println!("{} > {line}", invoker.name);
        match controller.dispatch(invoker, line) {
            Ok(code) => println!("  ok ({code})"),
            Err(err) => println!("  {}: {err}", err.kind()),
        }
    }

    println!();
    println!("Successful teleports: {}", teleports.get());
}
