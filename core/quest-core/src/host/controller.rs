//! The background controller window: start-up and event routing.

use super::{HostEvent, HotkeyAction, Hotkeys, OverlayHost, TrayCommand, TrayMenu, WindowName, Windows};
use crate::error::Result;
use crate::parameters::{FieldUpdate, Parameters};
use crate::store::AppStore;

pub struct Controller<H: OverlayHost> {
    host: H,
    hotkeys: Hotkeys,
    tray: TrayMenu,
}

impl<H: OverlayHost> Controller<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            hotkeys: Hotkeys::default(),
            tray: TrayMenu::default(),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn hotkeys(&self) -> &Hotkeys {
        &self.hotkeys
    }

    pub fn windows(&mut self) -> Windows<'_, H> {
        Windows::new(&mut self.host)
    }

    /// Registers hotkeys and the tray menu, then shows the start window.
    ///
    /// `store` must already hold the persisted parameters. Hotkey and tray
    /// failures are logged and leave the overlay running without them.
    pub fn init(&mut self, store: &AppStore) -> Result<()> {
        let registered = self.hotkeys.register_all(&mut self.host);
        tracing::debug!(registered, "Hotkeys registered");

        if let Err(err) = self.tray.register(&mut self.host) {
            tracing::error!(error = %err, "Failed to register tray menu");
        }

        self.toggle_start_window(store.parameters())
    }

    /// Results when a character is known, otherwise the name prompt.
    pub fn start_window(parameters: &Parameters) -> WindowName {
        if parameters.name.is_empty() {
            WindowName::Username
        } else {
            WindowName::Results
        }
    }

    pub fn toggle_start_window(&mut self, parameters: &Parameters) -> Result<()> {
        let window = Self::start_window(parameters);
        self.windows().toggle(window)
    }

    pub fn relaunch(&mut self) -> Result<()> {
        tracing::info!("Relaunching overlay");
        self.host.relaunch().into_result("relaunch", "app")?;
        Ok(())
    }

    pub fn handle_event(&mut self, event: &HostEvent, store: &mut AppStore) -> Result<()> {
        match event {
            HostEvent::Hotkey(id) => match self.hotkeys.dispatch(id) {
                Some(HotkeyAction::Toggle) => self.toggle_start_window(store.parameters()),
                Some(HotkeyAction::Quit) => self.relaunch(),
                None => {
                    tracing::debug!(hotkey = %id, "Ignoring unregistered hotkey");
                    Ok(())
                }
            },
            HostEvent::TrayClick(id) => match self.tray.dispatch(id) {
                Some(TrayCommand::ShowResults) => self.windows().restore(WindowName::Results),
                Some(TrayCommand::ShowSettings) => self.show_settings(),
                Some(TrayCommand::ChangeCharacter) => self.change_character(),
                Some(TrayCommand::Relaunch) => self.relaunch(),
                None => {
                    tracing::debug!(item = %id, "Ignoring unknown tray item");
                    Ok(())
                }
            },
        }
    }

    /// Results window -> settings window.
    pub fn show_settings(&mut self) -> Result<()> {
        let mut windows = self.windows();
        windows.minimize(WindowName::Results)?;
        windows.restore(WindowName::Settings)
    }

    /// Settings window dismissed without searching.
    pub fn close_settings(&mut self) -> Result<()> {
        let mut windows = self.windows();
        windows.close(WindowName::Settings)?;
        windows.restore(WindowName::Results)
    }

    pub fn change_character(&mut self) -> Result<()> {
        let mut windows = self.windows();
        windows.minimize(WindowName::Results)?;
        windows.restore(WindowName::Username)
    }

    /// Name prompt submitted: store the name and move on to the results.
    pub fn submit_username(&mut self, store: &mut AppStore, name: &str) -> Result<()> {
        store.update_field(FieldUpdate::Name(name.trim().to_string()));
        let mut windows = self.windows();
        windows.close(WindowName::Username)?;
        windows.restore(WindowName::Results)
    }
}
