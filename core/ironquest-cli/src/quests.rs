//! `ironquest quests`: incomplete quests for the stored character.

use quest_core::{App, QuestList};

use crate::render;

pub fn run(app: &mut App, json: bool) -> Result<(), String> {
    app.load_quests();

    match &app.store.state().quests {
        QuestList::Loaded(quests) => {
            if json {
                let text = serde_json::to_string_pretty(quests)
                    .map_err(|e| format!("Failed to serialize quests: {}", e))?;
                println!("{}", text);
            } else {
                print!("{}", render::quests(quests));
            }
            Ok(())
        }
        QuestList::Failure(error) => Err(format!("Quest lookup failed: {}", error.message())),
        QuestList::Idle | QuestList::Loading => Err("Quest lookup did not complete".to_string()),
    }
}
