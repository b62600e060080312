//! `ironquest params`: inspect and edit the persisted parameters.
//!
//! Edits are committed through the store, so they are saved and shared with
//! running overlay windows exactly like edits made in the settings window.

use clap::Subcommand;
use quest_core::{App, Parameters};
use serde_json::Value;

use crate::render;

#[derive(Subcommand)]
pub enum ParamsAction {
    /// Print the current parameters
    Show {
        /// Print as JSON in the persisted format
        #[arg(long)]
        json: bool,
    },

    /// Set one field, e.g. `name Zezima` or `questPriorities[12] HIGH`
    Set {
        /// Field path such as `ironman` or `parameters.lampSkills`
        #[arg(value_name = "FIELD")]
        path: String,

        /// JSON value; anything that is not valid JSON is taken as a string
        #[arg(value_name = "VALUE")]
        value: String,
    },

    /// Restore every field to its default
    Reset,
}

pub fn run(app: &mut App, action: ParamsAction) -> Result<(), String> {
    match action {
        ParamsAction::Show { json } => show(app.store.parameters(), json),
        ParamsAction::Set { path, value } => {
            let value = parse_value(&value);
            app.store
                .update_field_path(&path, &value)
                .map_err(|e| e.to_string())?;
            tracing::info!(field = %path, "Parameter updated");
            show(app.store.parameters(), false)
        }
        ParamsAction::Reset => {
            app.store.set_parameters(Parameters::default());
            tracing::info!("Parameters reset to defaults");
            show(app.store.parameters(), false)
        }
    }
}

fn show(parameters: &Parameters, json: bool) -> Result<(), String> {
    if json {
        let text = serde_json::to_string_pretty(parameters)
            .map_err(|e| format!("Failed to serialize parameters: {}", e))?;
        println!("{}", text);
    } else {
        print!("{}", render::parameters(parameters));
    }
    Ok(())
}

/// `true`, `12`, `["SLAYER"]` and `null` parse as JSON; bare words such as
/// `Zezima` or `HIGH` become strings.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_words_become_strings() {
        assert_eq!(parse_value("Zezima"), json!("Zezima"));
        assert_eq!(parse_value("HIGH"), json!("HIGH"));
    }

    #[test]
    fn json_literals_keep_their_type() {
        assert_eq!(parse_value("true"), json!(true));
        assert_eq!(parse_value("null"), Value::Null);
        assert_eq!(parse_value(r#"["SLAYER","AGILITY"]"#), json!(["SLAYER", "AGILITY"]));
    }
}
