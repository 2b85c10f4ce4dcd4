//! Main menu

use super::events::{Button, Event};

/// Main menu entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MenuEntry {
    Solve,
    Release,
    Calibrate,
}

impl MenuEntry {
    /// Entries in display order
    pub const ALL: [MenuEntry; 3] = [MenuEntry::Solve, MenuEntry::Release, MenuEntry::Calibrate];

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            MenuEntry::Solve => "Solve",
            MenuEntry::Release => "Release",
            MenuEntry::Calibrate => "Calibrate",
        }
    }

    /// Event raised when this entry is chosen
    pub fn event(&self) -> Event {
        match self {
            MenuEntry::Solve => Event::StartSolve,
            MenuEntry::Release => Event::StartRelease,
            MenuEntry::Calibrate => Event::StartCalibration,
        }
    }
}

/// Menu cursor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Menu {
    selected: usize,
}

impl Menu {
    pub fn new() -> Self {
        Self::default()
    }

    /// Highlighted entry
    pub fn selected(&self) -> MenuEntry {
        MenuEntry::ALL[self.selected]
    }

    /// Index of the highlighted entry
    pub fn index(&self) -> usize {
        self.selected
    }

    /// Handle a button press
    ///
    /// Up/Down move the cursor (no wrap-around); Enter returns the
    /// highlighted entry.
    pub fn press(&mut self, button: Button) -> Option<MenuEntry> {
        match button {
            Button::Up => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            Button::Down => {
                self.selected = (self.selected + 1).min(MenuEntry::ALL.len() - 1);
                None
            }
            Button::Enter => Some(self.selected()),
        }
    }
}
