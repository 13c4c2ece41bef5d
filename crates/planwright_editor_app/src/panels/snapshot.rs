// SPDX-License-Identifier: MIT OR Apache-2.0
//! Snapshot panel - committed graph state as RON.

use planwright_editor_graph::{GraphSnapshot, GraphSurface, NotificationSink};

/// Serialize a snapshot as pretty RON
pub fn snapshot_ron(snapshot: &GraphSnapshot) -> Result<String, ron::Error> {
    let config = ron::ser::PrettyConfig::default().struct_names(false).depth_limit(6);
    ron::ser::to_string_pretty(snapshot, config)
}

/// The snapshot panel
#[derive(Debug, Default)]
pub struct SnapshotPanel {
    /// Snapshot the text was produced from
    cached: Option<GraphSnapshot>,
    text: String,
}

impl SnapshotPanel {
    /// Create a new snapshot panel
    pub fn new() -> Self {
        Self::default()
    }

    /// Render the panel
    pub fn ui<S: NotificationSink>(&mut self, ui: &mut egui::Ui, surface: &GraphSurface<S>) {
        let snapshot = surface.snapshot();
        if self.cached.as_ref() != Some(&snapshot) {
            self.text = match snapshot_ron(&snapshot) {
                Ok(text) => text,
                Err(e) => {
                    tracing::error!("Failed to serialize snapshot: {}", e);
                    format!("// serialization failed: {e}")
                }
            };
            self.cached = Some(snapshot);
        }

        ui.horizontal(|ui| {
            if let Some(snapshot) = &self.cached {
                ui.label(format!(
                    "{} nodes, {} connections",
                    snapshot.nodes.len(),
                    snapshot.connections.len()
                ));
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Copy").on_hover_text("Copy RON to clipboard").clicked() {
                    ui.output_mut(|o| o.copied_text.clone_from(&self.text));
                }
            });
        });
        ui.separator();

        egui::ScrollArea::both().auto_shrink([false, false]).show(ui, |ui| {
            ui.add(
                egui::TextEdit::multiline(&mut self.text.as_str())
                    .code_editor()
                    .desired_width(f32::INFINITY),
            );
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planwright_editor_graph::NodeKind;

    #[test]
    fn test_snapshot_export_reads_back() {
        let mut surface = GraphSurface::default();
        let predicate = surface.create_node(NodeKind::Predicate, [0.0, 0.0]).unwrap().id;
        let action = surface.create_node(NodeKind::Action, [240.0, 0.0]).unwrap().id;
        surface.connect(predicate, None, action, None).unwrap();

        let text = snapshot_ron(&surface.snapshot()).unwrap();
        assert!(text.contains("New predicate"));

        let back: GraphSnapshot = ron::from_str(&text).unwrap();
        assert_eq!(back, surface.snapshot());
    }
}
