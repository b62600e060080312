//! Tray menu registration and click dispatch.

use serde::{Deserialize, Serialize};

use super::OverlayHost;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrayItem {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayCommand {
    ShowResults,
    ShowSettings,
    ChangeCharacter,
    Relaunch,
}

impl TrayCommand {
    pub const ALL: &'static [TrayCommand] = &[
        TrayCommand::ShowResults,
        TrayCommand::ShowSettings,
        TrayCommand::ChangeCharacter,
        TrayCommand::Relaunch,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            TrayCommand::ShowResults => "show_results",
            TrayCommand::ShowSettings => "show_settings",
            TrayCommand::ChangeCharacter => "change_character",
            TrayCommand::Relaunch => "relaunch",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TrayCommand::ShowResults => "Show path",
            TrayCommand::ShowSettings => "Settings",
            TrayCommand::ChangeCharacter => "Change character",
            TrayCommand::Relaunch => "Restart IronQuest",
        }
    }
}

#[derive(Debug, Default)]
pub struct TrayMenu {
    registered: bool,
}

impl TrayMenu {
    pub fn items() -> Vec<TrayItem> {
        TrayCommand::ALL
            .iter()
            .map(|command| TrayItem {
                id: command.id().to_string(),
                label: command.label().to_string(),
            })
            .collect()
    }

    pub fn register<H: OverlayHost + ?Sized>(&mut self, host: &mut H) -> Result<()> {
        host.register_tray_menu(&Self::items())
            .into_result("registerTrayMenu", "tray")?;
        self.registered = true;
        Ok(())
    }

    pub fn is_registered(&self) -> bool {
        self.registered
    }

    pub fn dispatch(&self, id: &str) -> Option<TrayCommand> {
        if !self.registered {
            return None;
        }
        TrayCommand::ALL
            .iter()
            .copied()
            .find(|command| command.id() == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::fake::FakeHost;

    #[test]
    fn test_register_sends_every_item() {
        let mut host = FakeHost::default();
        let mut tray = TrayMenu::default();
        tray.register(&mut host).unwrap();

        let ids: Vec<_> = host.tray.iter().map(|item| item.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["show_results", "show_settings", "change_character", "relaunch"]
        );
    }

    #[test]
    fn test_dispatch_requires_registration() {
        let mut host = FakeHost::default();
        let mut tray = TrayMenu::default();
        assert_eq!(tray.dispatch("relaunch"), None);

        tray.register(&mut host).unwrap();
        assert_eq!(tray.dispatch("relaunch"), Some(TrayCommand::Relaunch));
        assert_eq!(tray.dispatch("nope"), None);
    }
}
