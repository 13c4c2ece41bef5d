// SPDX-License-Identifier: MIT OR Apache-2.0
//! Palette panel - node kinds to drop onto the canvas.

use planwright_editor_graph::{NodeKind, NodeRegistry};

/// The palette panel
#[derive(Debug, Default)]
pub struct PalettePanel {
    /// Filter text
    pub search: String,
}

impl PalettePanel {
    /// Create a new palette panel
    pub fn new() -> Self {
        Self::default()
    }

    /// Render the palette
    ///
    /// Entries are drag sources carrying their [`NodeKind`]; the canvas
    /// creates the node where the drag is released. Clicking an entry's
    /// add button returns its kind so the caller can place it at the view center.
    pub fn ui(&mut self, ui: &mut egui::Ui, registry: &NodeRegistry) -> Option<NodeKind> {
        ui.add(
            egui::TextEdit::singleline(&mut self.search)
                .hint_text("Filter...")
                .desired_width(f32::INFINITY),
        );
        ui.separator();

        let filter = self.search.to_lowercase();
        let mut clicked = None;

        for node_type in registry.types() {
            if !filter.is_empty()
                && !node_type.name.to_lowercase().contains(&filter)
                && !node_type.description.to_lowercase().contains(&filter)
            {
                continue;
            }

            let kind = node_type.kind;
            let [r, g, b] = kind.color();
            let id = egui::Id::new(("palette_entry", kind));
            ui.horizontal(|ui| {
                if ui
                    .small_button("+")
                    .on_hover_text("Add at the view center")
                    .clicked()
                {
                    clicked = Some(kind);
                }
                ui.dnd_drag_source(id, kind, |ui| {
                    ui.horizontal(|ui| {
                        let (rect, _) = ui.allocate_exact_size(egui::vec2(10.0, 10.0), egui::Sense::hover());
                        ui.painter().rect_filled(rect, 2.0, egui::Color32::from_rgb(r, g, b));
                        ui.label(egui::RichText::new(node_type.name).strong());
                    });
                })
                .response
                .on_hover_text(node_type.description);
            });
        }

        ui.add_space(8.0);
        ui.weak("Drag onto the canvas to place a node.");

        clicked
    }
}
