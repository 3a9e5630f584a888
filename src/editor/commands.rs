// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Diagrammr-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Diagrammr and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Keyboard commands understood by the editor.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditorCommand {
    Undo,
    Redo,
    DeleteSelected,
    SelectAll,
    ClearSelection,
}

/// Help listing shown next to the canvas.
pub const SHORTCUTS: &[(&str, EditorCommand)] = &[
    ("Ctrl/Cmd + Z", EditorCommand::Undo),
    ("Ctrl/Cmd + Y", EditorCommand::Redo),
    ("Ctrl/Cmd + A", EditorCommand::SelectAll),
    ("Delete/Backspace", EditorCommand::DeleteSelected),
    ("Escape", EditorCommand::ClearSelection),
];

impl EditorCommand {
    /// Maps a key chord such as `ctrl+z`, `Cmd+Shift+Z` or `backspace` to a command.
    ///
    /// `ctrl` and `cmd`/`meta` are interchangeable.
    pub fn from_chord(chord: &str) -> Option<Self> {
        let mut primary = false;
        let mut shift = false;
        let mut key = None;

        for part in chord.split('+').map(|p| p.trim().to_ascii_lowercase()) {
            match part.as_str() {
                "ctrl" | "control" | "cmd" | "meta" | "command" => primary = true,
                "shift" => shift = true,
                "" => return None,
                _ if key.is_none() => key = Some(part),
                _ => return None,
            }
        }

        match (primary, shift, key?.as_str()) {
            (true, false, "z") => Some(Self::Undo),
            (true, false, "y") | (true, true, "z") => Some(Self::Redo),
            (true, false, "a") => Some(Self::SelectAll),
            (false, false, "delete" | "backspace") => Some(Self::DeleteSelected),
            (false, false, "escape" | "esc") => Some(Self::ClearSelection),
            _ => None,
        }
    }

    /// Whether the command changes the document (and is therefore refused in read-only mode).
    pub fn is_mutating(self) -> bool {
        matches!(self, Self::Undo | Self::Redo | Self::DeleteSelected)
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Undo => "Undo",
            Self::Redo => "Redo",
            Self::DeleteSelected => "Delete Selected",
            Self::SelectAll => "Select All",
            Self::ClearSelection => "Clear Selection",
        }
    }
}

impl fmt::Display for EditorCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}
