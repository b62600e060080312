//! Global hotkeys.

use std::collections::BTreeSet;

use super::OverlayHost;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HotkeyAction {
    /// Show or hide the start window.
    Toggle,
    /// Relaunch the overlay.
    Quit,
}

impl HotkeyAction {
    pub const ALL: &'static [HotkeyAction] = &[HotkeyAction::Toggle, HotkeyAction::Quit];

    /// Action id as declared in the host manifest.
    pub fn id(&self) -> &'static str {
        match self {
            HotkeyAction::Toggle => "toggle_IronQuest",
            HotkeyAction::Quit => "quit_IronQuest",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        HotkeyAction::ALL
            .iter()
            .copied()
            .find(|action| action.id() == id)
    }
}

/// Tracks which hotkeys the host accepted.
#[derive(Debug, Default)]
pub struct Hotkeys {
    registered: BTreeSet<HotkeyAction>,
}

impl Hotkeys {
    /// Registers `action`; a refusal is logged and reported as `false`.
    pub fn register<H: OverlayHost + ?Sized>(&mut self, host: &mut H, action: HotkeyAction) -> bool {
        match host
            .register_hotkey(action.id())
            .into_result("registerHotKey", action.id())
        {
            Ok(_) => {
                self.registered.insert(action);
                true
            }
            Err(err) => {
                tracing::error!(error = %err, hotkey = action.id(), "Failed to register hotkey");
                false
            }
        }
    }

    pub fn register_all<H: OverlayHost + ?Sized>(&mut self, host: &mut H) -> usize {
        HotkeyAction::ALL
            .iter()
            .filter(|&&action| self.register(host, action))
            .count()
    }

    pub fn is_registered(&self, action: HotkeyAction) -> bool {
        self.registered.contains(&action)
    }

    /// Maps a pressed hotkey id to its action, ignoring unregistered ones.
    pub fn dispatch(&self, id: &str) -> Option<HotkeyAction> {
        HotkeyAction::from_id(id).filter(|action| self.is_registered(*action))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::fake::FakeHost;

    #[test]
    fn test_failed_registration_is_not_fatal() {
        let mut host = FakeHost::default();
        host.failing_hotkeys.insert("quit_IronQuest".to_string());

        let mut hotkeys = Hotkeys::default();
        assert_eq!(hotkeys.register_all(&mut host), 1);
        assert!(hotkeys.is_registered(HotkeyAction::Toggle));
        assert!(!hotkeys.is_registered(HotkeyAction::Quit));
    }

    #[test]
    fn test_dispatch_ignores_unregistered() {
        let mut host = FakeHost::default();
        let mut hotkeys = Hotkeys::default();
        hotkeys.register(&mut host, HotkeyAction::Toggle);

        assert_eq!(hotkeys.dispatch("toggle_IronQuest"), Some(HotkeyAction::Toggle));
        assert_eq!(hotkeys.dispatch("quit_IronQuest"), None);
        assert_eq!(hotkeys.dispatch("unknown"), None);
    }
}
