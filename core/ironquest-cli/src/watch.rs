//! `ironquest watch`: follow mutations committed in sibling windows.
//!
//! Each applied mutation is printed as one line: a local timestamp, the
//! mutation name and its JSON payload.

use quest_core::{App, AppState, Mutation};
use std::thread::sleep;
use std::time::{Duration, Instant};

pub fn run(app: &mut App, interval_ms: u64, for_secs: Option<u64>) -> Result<(), String> {
    let strategy = app
        .store
        .sharer()
        .map(|sharer| sharer.strategy_name())
        .unwrap_or("none");
    tracing::info!(strategy, "Watching for sibling mutations");
    println!("watching via {} (Ctrl-C to stop)", strategy);

    app.store.subscribe(|mutation: &Mutation, _state: &AppState| {
        println!("{}", mutation_line(mutation));
    });

    let interval = Duration::from_millis(interval_ms.max(10));
    let deadline = for_secs.map(|secs| Instant::now() + Duration::from_secs(secs));
    loop {
        app.sync();
        if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return Ok(());
        }
        sleep(interval);
    }
}

fn mutation_line(mutation: &Mutation) -> String {
    let time = chrono::Local::now().format("%H:%M:%S");
    match mutation.to_parts() {
        Ok((name, Some(payload))) => format!("{} {} {}", time, name, payload),
        Ok((name, None)) => format!("{} {}", time, name),
        Err(_) => format!("{} {}", time, mutation.name()),
    }
}
