// SPDX-License-Identifier: MIT OR Apache-2.0
//! Shared panel type definitions.

/// Panel types that can be docked in the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelType {
    /// Node kinds to drag onto the canvas
    Palette,
    /// Planning graph canvas
    Canvas,
    /// Property editor for the selected node
    Properties,
    /// Log output and notification history
    Log,
    /// Committed graph as RON
    Snapshot,
}

impl PanelType {
    /// Every panel, in menu order
    pub const ALL: [PanelType; 5] = [Self::Palette, Self::Canvas, Self::Properties, Self::Log, Self::Snapshot];

    /// Get the display name for this panel type
    pub fn name(&self) -> &'static str {
        match self {
            Self::Palette => "Palette",
            Self::Canvas => "Canvas",
            Self::Properties => "Properties",
            Self::Log => "Log",
            Self::Snapshot => "Snapshot",
        }
    }

    /// Get the icon for this panel type
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Palette => "\u{1f3a8}",    // palette
            Self::Canvas => "\u{1f500}",     // branch
            Self::Properties => "\u{2699}",  // cog
            Self::Log => "\u{1f4bb}",        // terminal
            Self::Snapshot => "\u{1f4c4}",   // page
        }
    }
}
