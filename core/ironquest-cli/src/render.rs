//! Plain-text rendering for terminal output.

use quest_core::{Action, Parameters, Path, Quest};
use std::fmt::Write;

pub fn parameters(parameters: &Parameters) -> String {
    let mut out = String::new();
    let name = if parameters.name.is_empty() {
        "(unset)"
    } else {
        parameters.name.as_str()
    };
    let _ = writeln!(out, "name:         {}", name);
    let _ = writeln!(out, "access:       {}", parameters.access_filter);
    let _ = writeln!(out, "type:         {}", parameters.type_filter);
    let _ = writeln!(out, "ironman:      {}", parameters.ironman);
    let _ = writeln!(out, "recommended:  {}", parameters.recommended);

    let skills: Vec<&str> = parameters.lamp_skills.iter().map(|s| s.as_str()).collect();
    let _ = writeln!(
        out,
        "lamp skills:  {}",
        if skills.is_empty() {
            "-".to_string()
        } else {
            skills.join(", ")
        }
    );

    match parameters.algorithm {
        Some(algorithm) => {
            let _ = writeln!(out, "algorithm:    {}", algorithm);
        }
        None => {
            let _ = writeln!(out, "algorithm:    (server default)");
        }
    }

    if parameters.quest_priorities.is_empty() {
        let _ = writeln!(out, "priorities:   -");
    } else {
        let _ = writeln!(out, "priorities:");
        for (id, priority) in &parameters.quest_priorities {
            let _ = writeln!(out, "  {:>5}  {}", id, priority);
        }
    }
    out
}

pub fn path(path: &Path) -> String {
    let mut out = String::new();
    for (index, action) in path.actions.iter().enumerate() {
        let _ = writeln!(out, "{}", action_line(index, action));
    }
    let _ = writeln!(
        out,
        "{} actions, {}% complete",
        path.actions.len(),
        path.stats.percent_complete
    );
    out
}

fn action_line(index: usize, action: &Action) -> String {
    let marker = if action.future { "*" } else { " " };
    format!(
        "{:>4}.{} [{}] {}",
        index + 1,
        marker,
        action.action_type,
        action.message
    )
}

pub fn quests(quests: &[Quest]) -> String {
    let mut out = String::new();
    for quest in quests {
        let _ = writeln!(out, "{:>5}  {:<8}  {}", quest.id, quest.priority.as_str(), quest.display_name);
    }
    let _ = writeln!(out, "{} incomplete quests", quests.len());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use quest_core::{ActionType, PathStats, Player, QuestPriority, Skill};

    #[test]
    fn unset_name_and_empty_lists_are_marked() {
        let text = parameters(&Parameters::default());
        assert!(text.contains("name:         (unset)"));
        assert!(text.contains("lamp skills:  -"));
        assert!(text.contains("priorities:   -"));
        assert!(text.contains("(server default)"));
    }

    #[test]
    fn lamp_skills_keep_their_order() {
        let params = Parameters {
            lamp_skills: vec![Skill::Slayer, Skill::Agility],
            ..Parameters::default()
        };
        assert!(parameters(&params).contains("lamp skills:  SLAYER, AGILITY"));
    }

    #[test]
    fn path_lines_are_numbered_from_one() {
        let path = Path {
            actions: vec![Action {
                action_type: ActionType::Train,
                player: Player::default(),
                future: true,
                message: "Train Attack to 10".to_string(),
                quest: None,
            }],
            stats: PathStats {
                percent_complete: 42.0,
            },
        };
        let text = super::path(&path);
        assert!(text.starts_with("   1.* [TRAIN] Train Attack to 10\n"));
        assert!(text.ends_with("1 actions, 42% complete\n"));
    }

    #[test]
    fn quest_rows_show_priority() {
        let text = quests(&[Quest {
            id: 7,
            display_name: "Cook's Assistant".to_string(),
            priority: QuestPriority::High,
        }]);
        assert!(text.contains("    7  HIGH      Cook's Assistant"));
    }
}
