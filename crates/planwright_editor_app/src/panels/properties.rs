// SPDX-License-Identifier: MIT OR Apache-2.0
//! Properties panel - draft editing of the selected node.
//!
//! Text inputs write into the editor's draft as the user types and commit
//! when they lose focus. Pickers and add/remove buttons commit at once.

use planwright_editor_graph::{
    BindingField, BindingSlot, CommitError, Draft, EditorState, GraphSurface, NodeId, NotificationSink, ObjectCatalog,
    ObjectPicker, PanelLayout, PropertyEditor, StructuralEdit, TextField,
};
use std::hash::Hash;

const ERROR_COLOR: egui::Color32 = egui::Color32::from_rgb(255, 100, 100);
const STALE_COLOR: egui::Color32 = egui::Color32::from_rgb(255, 200, 80);

/// What the user did this frame
#[derive(Default)]
struct PanelActions {
    text_edits: Vec<(TextField, String)>,
    focused: bool,
    blurred: bool,
    structural: Option<StructuralEdit>,
    revert: bool,
    delete: bool,
}

/// The properties panel
#[derive(Debug, Default)]
pub struct PropertiesPanel {
    editor: PropertyEditor,
    /// Last rejected edit that is not a schema error
    last_error: Option<String>,
    /// A text field had keyboard focus last frame
    text_focused: bool,
}

impl PropertiesPanel {
    /// Create a new properties panel
    pub fn new() -> Self {
        Self::default()
    }

    /// Render the panel and apply the user's edits to the surface
    pub fn ui<S: NotificationSink>(&mut self, ui: &mut egui::Ui, surface: &mut GraphSurface<S>) {
        self.follow_selection(surface);

        let draft = match self.editor.state() {
            EditorState::Unselected => {
                self.last_error = None;
                ui.centered_and_justified(|ui| {
                    ui.weak("Select a node to edit its properties");
                });
                return;
            }
            EditorState::Editing(draft) => draft,
        };

        let node_id = draft.node_id();
        let payload = draft.payload().clone();
        let layout = PanelLayout::for_payload(&payload);
        let catalog = surface.catalog();
        let mut actions = PanelActions::default();

        egui::ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
            let [r, g, b] = layout.kind.color();
            ui.horizontal(|ui| {
                ui.label(
                    egui::RichText::new(layout.kind.name())
                        .strong()
                        .color(egui::Color32::from_rgb(r, g, b)),
                );
                ui.weak(node_id.to_string());
            });
            if let Some(node_type) = surface.registry().get(layout.kind) {
                ui.weak(node_type.description);
            }
            ui.separator();

            egui::Grid::new("node_fields").num_columns(2).spacing([8.0, 4.0]).show(ui, |ui| {
                ui.label("Label");
                text_input(ui, &mut actions, TextField::Label, payload.label(), false);
                ui.end_row();

                if layout.shows_object_type {
                    ui.label("Type");
                    text_input(ui, &mut actions, TextField::ObjectType, payload.object_type().unwrap_or_default(), false);
                    ui.end_row();
                }

                ui.label("Description");
                text_input(ui, &mut actions, TextField::Description, payload.description().unwrap_or_default(), true);
                ui.end_row();
            });

            if layout.shows_parameters {
                ui.add_space(6.0);
                egui::CollapsingHeader::new("Parameters").default_open(true).show(ui, |ui| {
                    let parameters = payload.parameters().unwrap_or_default();
                    for (index, parameter) in parameters.iter().enumerate() {
                        ui.horizontal(|ui| {
                            text_input(ui, &mut actions, TextField::ParameterName(index), &parameter.name, false);
                            ui.label(":");
                            text_input(ui, &mut actions, TextField::ParameterType(index), &parameter.type_name, false);
                            if let Some(picker) = self.editor.parameter_picker(&catalog, index) {
                                if let Some(choice) = object_picker(ui, ("param_value", index), &picker, true) {
                                    actions.structural = Some(StructuralEdit::BindParameter { index, label: choice });
                                }
                            }
                            if ui.small_button("\u{1f5d1}").on_hover_text("Remove parameter").clicked() {
                                actions.structural = Some(StructuralEdit::RemoveParameter(index));
                            }
                        });
                    }
                    if ui.button("+ Add parameter").clicked() {
                        actions.structural = Some(StructuralEdit::AddParameter);
                    }
                });
            }

            for &field in layout.binding_fields {
                ui.add_space(6.0);
                egui::CollapsingHeader::new(field.name()).default_open(true).show(ui, |ui| {
                    let bindings = payload.bindings(field).unwrap_or_default();
                    for index in 0..bindings.len() {
                        ui.horizontal(|ui| {
                            self.binding_row(ui, &mut actions, &catalog, field, index, layout.shows_second_object);
                        });
                    }
                    if ui.button("+ Add").clicked() {
                        actions.structural = Some(StructuralEdit::AddBinding(field));
                    }
                });
            }

            if catalog.is_empty() && (layout.shows_parameters || !layout.binding_fields.is_empty()) {
                if let Some(hint) = catalog.picker(None).hint() {
                    ui.add_space(4.0);
                    ui.weak(hint);
                }
            }

            ui.add_space(8.0);
            if let Some(error) = self.editor.draft().and_then(Draft::error) {
                ui.colored_label(ERROR_COLOR, error.to_string());
            }
            if let Some(error) = &self.last_error {
                ui.colored_label(ERROR_COLOR, error);
            }

            ui.separator();
            ui.horizontal(|ui| {
                let dirty = self.editor.draft().is_some_and(Draft::is_dirty);
                if ui.add_enabled(dirty, egui::Button::new("Revert")).clicked() {
                    actions.revert = true;
                }
                if ui.button("Delete node").clicked() {
                    actions.delete = true;
                }
            });
        });

        self.apply(surface, actions, node_id);
    }

    /// Move the editor to the surface's selection
    ///
    /// Clicking another node takes focus away from a property field, but the
    /// new selection reaches the panel a frame before egui reports the blur.
    /// Text typed into the old node is committed first so it is not lost.
    fn follow_selection<S: NotificationSink>(&mut self, surface: &mut GraphSurface<S>) {
        let had_focus = std::mem::take(&mut self.text_focused);
        if let Some(draft) = self.editor.draft() {
            let node_id = draft.node_id();
            let moved = surface.selection() != Some(node_id);
            if had_focus && moved && draft.is_dirty() && surface.node(node_id).is_some() {
                match self.editor.commit_on_blur(surface) {
                    Ok(()) => tracing::debug!("Committed pending edits of node {} on reselect", node_id),
                    Err(e) => tracing::warn!("Pending edits of node {} dropped: {}", node_id, e),
                }
            }
        }
        self.editor.sync(surface);
    }

    fn binding_row(
        &self,
        ui: &mut egui::Ui,
        actions: &mut PanelActions,
        catalog: &ObjectCatalog,
        field: BindingField,
        index: usize,
        shows_second: bool,
    ) {
        let mut slots = vec![BindingSlot::First];
        if shows_second {
            slots.push(BindingSlot::Second);
        }
        for (n, slot) in slots.into_iter().enumerate() {
            if n > 0 {
                ui.label("&");
            }
            let Some(picker) = self.editor.binding_picker(catalog, field, index, slot) else {
                continue;
            };
            if let Some(Some(label)) = object_picker(ui, (field, index, slot), &picker, false) {
                actions.structural = Some(StructuralEdit::BindObject { field, index, slot, label });
            }
        }
        if ui.small_button("\u{1f5d1}").on_hover_text("Remove").clicked() {
            actions.structural = Some(StructuralEdit::RemoveBinding { field, index });
        }
    }

    fn apply<S: NotificationSink>(
        &mut self,
        surface: &mut GraphSurface<S>,
        actions: PanelActions,
        node_id: NodeId,
    ) {
        self.text_focused = actions.focused;

        for (field, text) in actions.text_edits {
            if let Err(e) = self.editor.edit_text(field, &text) {
                tracing::warn!("Edit of {:?} rejected: {}", field, e);
            }
        }

        if actions.revert {
            self.editor.discard();
            self.last_error = None;
        }

        if actions.blurred {
            match self.editor.commit_on_blur(surface) {
                Ok(()) => self.last_error = None,
                // shown from the draft
                Err(CommitError::Schema(_)) => {}
                Err(e) => self.last_error = Some(e.to_string()),
            }
        }

        if let Some(edit) = actions.structural {
            match self.editor.commit_immediately(surface, edit) {
                Ok(()) => self.last_error = None,
                Err(CommitError::Schema(_)) => {}
                Err(e) => {
                    tracing::warn!("Structural edit rejected: {}", e);
                    self.last_error = Some(e.to_string());
                }
            }
        }

        if actions.delete {
            if let Err(e) = surface.delete_node(node_id) {
                tracing::warn!("Failed to delete node {}: {}", node_id, e);
            }
            self.editor.sync(surface);
        }
    }
}

/// Single or multi-line text input bound to a draft field
fn text_input(ui: &mut egui::Ui, actions: &mut PanelActions, field: TextField, current: &str, multiline: bool) {
    let mut buffer = current.to_string();
    let edit = if multiline {
        egui::TextEdit::multiline(&mut buffer).desired_rows(3)
    } else {
        egui::TextEdit::singleline(&mut buffer).desired_width(140.0)
    };
    let response = ui.add(edit.id_salt(("property_text", field)));

    if response.changed() {
        actions.text_edits.push((field, buffer));
    }
    if response.has_focus() {
        actions.focused = true;
    }
    if response.lost_focus() {
        actions.blurred = true;
    }
}

/// Combo box over the object catalog
///
/// Returns `Some(choice)` when the user picked something; the inner `None`
/// means "unbind" and is only offered when `allow_none` is set.
fn object_picker(
    ui: &mut egui::Ui,
    id_salt: impl Hash,
    picker: &ObjectPicker,
    allow_none: bool,
) -> Option<Option<String>> {
    let mut choice = None;

    let response = ui
        .add_enabled_ui(!picker.is_disabled(), |ui| {
            egui::ComboBox::from_id_salt(id_salt)
                .selected_text(picker.selected_text())
                .show_ui(ui, |ui| {
                    if allow_none && ui.selectable_label(picker.current.is_none(), "None").clicked() {
                        choice = Some(None);
                    }
                    for option in &picker.options {
                        let selected = picker.current.as_deref() == Some(option.label.as_str());
                        if ui.selectable_label(selected, option.display()).clicked() {
                            choice = Some(Some(option.label.clone()));
                        }
                    }
                })
                .response
        })
        .inner;

    if let Some(hint) = picker.hint() {
        response.on_disabled_hover_text(hint);
    } else if picker.stale {
        ui.colored_label(STALE_COLOR, "\u{26a0}")
            .on_hover_text("The bound object no longer exists");
    }

    choice
}

#[cfg(test)]
mod tests {
    use super::*;
    use planwright_editor_graph::{NodeKind, NodeRegistry, NullSink};

    fn two_types() -> (GraphSurface<NullSink>, NodeId, NodeId) {
        let mut surface = GraphSurface::new(NodeRegistry::planning(), NullSink);
        let first = surface.create_node(NodeKind::Type, [0.0, 0.0]).unwrap().id;
        let second = surface.create_node(NodeKind::Type, [200.0, 0.0]).unwrap().id;
        (surface, first, second)
    }

    #[test]
    fn test_clicking_another_node_commits_focused_text() {
        let (mut surface, first, second) = two_types();
        let mut panel = PropertiesPanel::new();
        surface.select(Some(first)).unwrap();
        panel.follow_selection(&mut surface);

        // typing in the label field, then clicking the other node
        panel.editor.edit_text(TextField::Label, "block").unwrap();
        panel.text_focused = true;
        surface.select(Some(second)).unwrap();
        panel.follow_selection(&mut surface);

        assert_eq!(surface.node(first).map(|n| n.label()), Some("block"));
        let draft = panel.editor.draft().unwrap();
        assert_eq!(draft.node_id(), second);
        assert!(!draft.is_dirty());
        assert!(!panel.text_focused);
    }

    #[test]
    fn test_reselect_without_focus_discards_draft() {
        let (mut surface, first, second) = two_types();
        let mut panel = PropertiesPanel::new();
        surface.select(Some(first)).unwrap();
        panel.follow_selection(&mut surface);

        panel.editor.edit_text(TextField::Label, "block").unwrap();
        surface.select(Some(second)).unwrap();
        panel.follow_selection(&mut surface);

        assert_ne!(surface.node(first).map(|n| n.label()), Some("block"));
        assert_eq!(panel.editor.draft().map(Draft::node_id), Some(second));
    }

    #[test]
    fn test_focused_text_of_deleted_node_is_dropped() {
        let (mut surface, first, _) = two_types();
        let mut panel = PropertiesPanel::new();
        surface.select(Some(first)).unwrap();
        panel.follow_selection(&mut surface);

        panel.editor.edit_text(TextField::Label, "block").unwrap();
        panel.text_focused = true;
        surface.delete_node(first).unwrap();
        panel.follow_selection(&mut surface);

        assert!(matches!(panel.editor.state(), EditorState::Unselected));
    }
}
