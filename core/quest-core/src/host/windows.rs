//! Window lifecycle operations by symbolic name.

use super::{OverlayHost, WindowName, WindowState};
use crate::error::Result;

/// Borrowing wrapper that turns host replies into `Result`s.
///
/// `close`, `minimize` and `restore` obtain the declared window first, since
/// the host refuses to act on a window it has not created yet.
pub struct Windows<'h, H: OverlayHost + ?Sized> {
    host: &'h mut H,
}

impl<'h, H: OverlayHost + ?Sized> Windows<'h, H> {
    pub fn new(host: &'h mut H) -> Self {
        Self { host }
    }

    pub fn obtain_window(&mut self, name: WindowName) -> Result<()> {
        self.host
            .obtain_declared_window(name)
            .into_result("obtainDeclaredWindow", name)?;
        Ok(())
    }

    pub fn get_window_state(&mut self, name: WindowName) -> Result<WindowState> {
        self.host
            .get_window_state(name)
            .into_value("getWindowState", name)
    }

    /// States of several windows at once; the first failure aborts the batch.
    pub fn get_window_states(
        &mut self,
        names: &[WindowName],
    ) -> Result<Vec<(WindowName, WindowState)>> {
        names
            .iter()
            .map(|&name| Ok((name, self.get_window_state(name)?)))
            .collect()
    }

    pub fn close(&mut self, name: WindowName) -> Result<()> {
        self.obtain_window(name)?;
        self.host.close_window(name).into_result("close", name)?;
        Ok(())
    }

    pub fn minimize(&mut self, name: WindowName) -> Result<()> {
        self.obtain_window(name)?;
        self.host.minimize_window(name).into_result("minimize", name)?;
        Ok(())
    }

    pub fn restore(&mut self, name: WindowName) -> Result<()> {
        self.obtain_window(name)?;
        self.host.restore_window(name).into_result("restore", name)?;
        Ok(())
    }

    /// Restores a minimized or closed window, minimizes anything else.
    pub fn toggle(&mut self, name: WindowName) -> Result<()> {
        if self.get_window_state(name)?.is_dismissed() {
            self.restore(name)
        } else {
            self.minimize(name)
        }
    }
}
