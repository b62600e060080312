//! `ironquest find-path`: one blocking path lookup for the stored parameters.

use quest_core::{App, RequestOutcome};

use crate::render;

pub fn run(app: &mut App, json: bool) -> Result<(), String> {
    if app.store.parameters().name.is_empty() {
        tracing::warn!("No character name set; run `ironquest params set name <NAME>` first");
    }

    app.find_path();

    match app.store.results().outcome() {
        RequestOutcome::Success(path) => {
            if json {
                let text = serde_json::to_string_pretty(path)
                    .map_err(|e| format!("Failed to serialize path: {}", e))?;
                println!("{}", text);
            } else {
                print!("{}", render::path(path));
            }
            Ok(())
        }
        RequestOutcome::Failure(error) => {
            if json {
                if let Ok(text) = serde_json::to_string_pretty(error) {
                    println!("{}", text);
                }
            }
            Err(format!("Path lookup failed: {}", error.message()))
        }
        RequestOutcome::Idle | RequestOutcome::Loading => {
            Err("Path lookup did not complete".to_string())
        }
    }
}
