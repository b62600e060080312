//! Typed facade over the overlay host platform.
//!
//! The packaged overlay runs as several declared windows managed by a host
//! (window manager, global hotkeys, tray icon). The host answers every
//! operation with a `{ "status": "success" | "error", "reason": ... }` reply;
//! [`HostReply::into_result`] turns that convention into `Result`.
//!
//! Hotkey presses and tray clicks come back from the host as [`HostEvent`]s,
//! which the [`Controller`] dispatches.

mod controller;
mod hotkeys;
mod tray;
mod windows;

pub use controller::Controller;
pub use hotkeys::{HotkeyAction, Hotkeys};
pub use tray::{TrayCommand, TrayItem, TrayMenu};
pub use windows::Windows;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{QuestError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowName {
    Controller,
    Results,
    Settings,
    Username,
}

impl WindowName {
    pub const ALL: &'static [WindowName] = &[
        WindowName::Controller,
        WindowName::Results,
        WindowName::Settings,
        WindowName::Username,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WindowName::Controller => "controller",
            WindowName::Results => "results",
            WindowName::Settings => "settings",
            WindowName::Username => "username",
        }
    }
}

impl fmt::Display for WindowName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WindowName {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        WindowName::ALL
            .iter()
            .copied()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| format!("unknown window '{}'", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowState {
    Normal,
    Maximized,
    Minimized,
    Hidden,
    Closed,
}

impl WindowState {
    /// Whether `toggle` should bring the window back rather than hide it.
    pub fn is_dismissed(&self) -> bool {
        matches!(self, WindowState::Minimized | WindowState::Closed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostStatusCode {
    Success,
    Error,
}

/// A host answer: status, failure reason, and the value on success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostReply<T> {
    pub status: HostStatusCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<T>,
}

impl<T> HostReply<T> {
    pub fn success(value: T) -> Self {
        Self {
            status: HostStatusCode::Success,
            reason: None,
            value: Some(value),
        }
    }

    pub fn error(reason: impl Into<String>) -> Self {
        Self {
            status: HostStatusCode::Error,
            reason: Some(reason.into()),
            value: None,
        }
    }

    /// Checks the status; the value may legitimately be absent for unit replies.
    pub fn into_result(
        self,
        operation: &'static str,
        target: impl fmt::Display,
    ) -> Result<Option<T>> {
        match self.status {
            HostStatusCode::Success => Ok(self.value),
            HostStatusCode::Error => Err(QuestError::Host {
                operation,
                target: target.to_string(),
                reason: self
                    .reason
                    .unwrap_or_else(|| "unspecified host error".to_string()),
            }),
        }
    }

    /// Like [`into_result`](Self::into_result), but a success must carry a value.
    pub fn into_value(self, operation: &'static str, target: impl fmt::Display) -> Result<T> {
        let target = target.to_string();
        self.into_result(operation, &target)?
            .ok_or_else(|| QuestError::Host {
                operation,
                target,
                reason: "host returned no value".to_string(),
            })
    }
}

impl HostReply<()> {
    pub fn ok() -> Self {
        Self::success(())
    }
}

/// Events delivered by the host after registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "id", rename_all = "snake_case")]
pub enum HostEvent {
    Hotkey(String),
    TrayClick(String),
}

/// Operations the overlay host exposes.
pub trait OverlayHost {
    fn obtain_declared_window(&mut self, name: WindowName) -> HostReply<()>;
    fn get_window_state(&mut self, name: WindowName) -> HostReply<WindowState>;
    fn close_window(&mut self, name: WindowName) -> HostReply<()>;
    fn minimize_window(&mut self, name: WindowName) -> HostReply<()>;
    fn restore_window(&mut self, name: WindowName) -> HostReply<()>;
    fn register_hotkey(&mut self, action_id: &str) -> HostReply<()>;
    fn register_tray_menu(&mut self, items: &[TrayItem]) -> HostReply<()>;
    fn relaunch(&mut self) -> HostReply<()>;
}
