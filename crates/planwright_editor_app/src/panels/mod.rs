// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editor panel implementations.

pub mod console;
mod palette;
mod properties;
mod snapshot;

pub use console::ConsolePanel;
pub use palette::PalettePanel;
pub use properties::PropertiesPanel;
pub use snapshot::SnapshotPanel;
