// SPDX-License-Identifier: MIT OR Apache-2.0
//! Canvas rendering of the planning graph.
//!
//! Features:
//! - Node rendering with kind headers, handles and summaries
//! - Connection rendering (bezier curves, animated dashes for flow edges)
//! - Pan/zoom navigation
//! - Node selection and dragging
//! - Connection drag-to-create between handles
//! - Drop-to-create from the palette and context-menu create
//! - Minimap
//!
//! The canvas only ever shows committed state and changes it exclusively
//! through [`GraphSurface`] operations.

use crate::connection::{ConnectionId, EdgeStyle};
use crate::graph::Graph;
use crate::handle::{self, Handle, HandleDirection, HandleRole};
use crate::node::{Node, NodeId, NodeKind};
use crate::notify::NotificationSink;
use crate::payload::{BindingField, NodePayload, ObjectPair};
use crate::surface::GraphSurface;
use egui::{Color32, Pos2, Rect, Stroke, Vec2};

/// Node visual dimensions
const NODE_WIDTH: f32 = 190.0;
const NODE_HEADER_HEIGHT: f32 = 24.0;
const HANDLE_ROW_HEIGHT: f32 = 22.0;
const SUMMARY_LINE_HEIGHT: f32 = 16.0;
const HANDLE_RADIUS: f32 = 6.0;
const HANDLE_PADDING: f32 = 12.0;
const NODE_ROUNDING: f32 = 6.0;
const NODE_SHADOW_OFFSET: f32 = 3.0;

/// Connection visual parameters
const BEZIER_CURVATURE: f32 = 50.0;
const CONNECTION_THICKNESS: f32 = 2.5;
const CONNECTION_HIT_DISTANCE: f32 = 6.0;
const FLOW_DASH: f32 = 10.0;
const FLOW_GAP: f32 = 6.0;
const FLOW_SPEED: f32 = 30.0;

/// Grid parameters
const GRID_SPACING: f32 = 15.0;

/// Dragging state for creating connections
#[derive(Debug, Clone, Copy)]
pub struct ConnectionDrag {
    /// Node the drag started on
    pub from_node: NodeId,
    /// Handle the drag started on
    pub from_handle: Handle,
    /// Current mouse position (screen space)
    pub current_pos: Pos2,
}

/// Canvas interaction mode
#[derive(Debug, Clone, Copy, Default)]
pub enum InteractionMode {
    /// Default mode - selecting and dragging
    #[default]
    Normal,
    /// Panning the view
    Panning,
    /// Dragging a node; the move is committed on release
    DraggingNode {
        /// Node being dragged
        node: NodeId,
        /// Pointer offset from the node origin (graph space)
        grab_offset: Vec2,
        /// Preview position (graph space)
        position: [f32; 2],
    },
    /// Creating a connection
    CreatingConnection(ConnectionDrag),
}

/// Canvas UI state
pub struct GraphCanvas {
    /// Current pan offset (graph space)
    pub pan: Vec2,
    /// Current zoom level
    pub zoom: f32,
    /// Current interaction mode
    pub mode: InteractionMode,
    /// Show minimap
    pub show_minimap: bool,
    /// Show grid
    pub show_grid: bool,
    /// Snap created and moved nodes to the grid
    pub snap_to_grid: bool,
    /// Grid size for snapping
    pub snap_size: f32,
    /// Selected connection (nodes are selected on the surface)
    selected_connection: Option<ConnectionId>,
    /// Last mouse position
    last_mouse_pos: Pos2,
    /// Graph position of the last secondary click
    context_menu_pos: Pos2,
    /// Node being hovered
    hovered_node: Option<NodeId>,
    /// Handle being hovered
    hovered_handle: Option<(NodeId, Handle)>,
    /// Connection being hovered
    hovered_connection: Option<ConnectionId>,
}

impl GraphCanvas {
    /// Create a new canvas state
    pub fn new() -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: 1.0,
            mode: InteractionMode::Normal,
            show_minimap: true,
            show_grid: true,
            snap_to_grid: true,
            snap_size: GRID_SPACING,
            selected_connection: None,
            last_mouse_pos: Pos2::ZERO,
            context_menu_pos: Pos2::ZERO,
            hovered_node: None,
            hovered_handle: None,
            hovered_connection: None,
        }
    }

    /// Convert screen position to graph position
    pub fn screen_to_graph(&self, screen_pos: Pos2, rect: Rect) -> Pos2 {
        let center = rect.center();
        Pos2::new(
            (screen_pos.x - center.x) / self.zoom - self.pan.x,
            (screen_pos.y - center.y) / self.zoom - self.pan.y,
        )
    }

    /// Convert graph position to screen position
    pub fn graph_to_screen(&self, graph_pos: Pos2, rect: Rect) -> Pos2 {
        let center = rect.center();
        Pos2::new(
            (graph_pos.x + self.pan.x) * self.zoom + center.x,
            (graph_pos.y + self.pan.y) * self.zoom + center.y,
        )
    }

    /// Snap position to grid
    pub fn snap_position(&self, pos: [f32; 2]) -> [f32; 2] {
        if self.snap_to_grid && self.snap_size > 0.0 {
            [
                (pos[0] / self.snap_size).round() * self.snap_size,
                (pos[1] / self.snap_size).round() * self.snap_size,
            ]
        } else {
            pos
        }
    }

    /// Graph position at the middle of the view, snapped
    pub fn view_center(&self) -> [f32; 2] {
        self.snap_position([-self.pan.x, -self.pan.y])
    }

    /// Reset pan and zoom
    pub fn reset_view(&mut self) {
        self.pan = Vec2::ZERO;
        self.zoom = 1.0;
    }

    /// Selected connection, if any
    pub fn selected_connection(&self) -> Option<ConnectionId> {
        self.selected_connection
    }

    /// Render the canvas and apply the user's interactions to the surface
    pub fn ui<S: NotificationSink>(&mut self, ui: &mut egui::Ui, surface: &mut GraphSurface<S>) {
        let rect = ui.available_rect_before_wrap();
        let response = ui.allocate_rect(rect, egui::Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        // A connection may have vanished with a deleted node
        if let Some(id) = self.selected_connection {
            if surface.graph().connection(id).is_none() {
                self.selected_connection = None;
            }
        }

        if self.show_grid {
            self.draw_grid(&painter, rect);
        }

        // Hover must be known before input so drags can start on handles
        let mouse_pos = ui.input(|i| i.pointer.hover_pos().unwrap_or(self.last_mouse_pos));
        self.update_hover(mouse_pos, rect, surface.graph());

        self.handle_input(ui, &response, rect, mouse_pos, surface);
        self.context_menu(&response, surface);

        let graph = surface.graph();
        let selection = surface.selection();
        self.draw_connections(ui, &painter, rect, graph);

        if let InteractionMode::CreatingConnection(drag) = self.mode {
            self.draw_connection_drag(&painter, rect, graph, &drag);
        }

        self.draw_nodes(&painter, rect, graph, selection);

        if self.show_minimap {
            self.draw_minimap(&painter, rect, graph, selection);
        }

        self.draw_status_bar(&painter, rect, graph, selection);
    }

    fn draw_grid(&self, painter: &egui::Painter, rect: Rect) {
        let spacing = self.snap_size.max(5.0) * self.zoom;
        let major_spacing = spacing * 5.0;

        let grid_color_minor = Color32::from_rgba_unmultiplied(60, 60, 60, 100);
        let grid_color_major = Color32::from_rgba_unmultiplied(80, 80, 80, 150);

        let offset_x = (self.pan.x * self.zoom) % major_spacing;
        let offset_y = (self.pan.y * self.zoom) % major_spacing;

        for (step, color) in [(spacing, grid_color_minor), (major_spacing, grid_color_major)] {
            if step < 4.0 {
                continue;
            }
            let mut x = rect.left() + offset_x % step;
            while x < rect.right() {
                painter.line_segment(
                    [Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())],
                    Stroke::new(1.0, color),
                );
                x += step;
            }

            let mut y = rect.top() + offset_y % step;
            while y < rect.bottom() {
                painter.line_segment(
                    [Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)],
                    Stroke::new(1.0, color),
                );
                y += step;
            }
        }

        // Draw origin axes
        let origin = self.graph_to_screen(Pos2::ZERO, rect);
        if rect.contains(origin) {
            let axis = Stroke::new(2.0, Color32::from_rgba_unmultiplied(100, 100, 150, 180));
            painter.line_segment([Pos2::new(origin.x, rect.top()), Pos2::new(origin.x, rect.bottom())], axis);
            painter.line_segment([Pos2::new(rect.left(), origin.y), Pos2::new(rect.right(), origin.y)], axis);
        }
    }

    fn update_hover(&mut self, mouse_pos: Pos2, rect: Rect, graph: &Graph) {
        self.hovered_node = None;
        self.hovered_handle = None;
        self.hovered_connection = None;

        if !rect.contains(mouse_pos) {
            return;
        }

        let radius = HANDLE_RADIUS * self.zoom * 1.5;
        'nodes: for node in graph.nodes().rev() {
            for handle in handle::handles(node.kind()) {
                let pos = self.graph_to_screen(self.handle_position(node, handle), rect);
                if pos.distance(mouse_pos) < radius {
                    self.hovered_handle = Some((node.id, *handle));
                    self.hovered_node = Some(node.id);
                    break 'nodes;
                }
            }
            if self.node_rect(node).contains(self.screen_to_graph(mouse_pos, rect)) {
                self.hovered_node = Some(node.id);
                break;
            }
        }

        if self.hovered_node.is_some() {
            return;
        }

        for connection in graph.connections() {
            let Some(points) = self.connection_points(
                graph,
                connection.source,
                connection.source_handle,
                connection.target,
                connection.target_handle,
                rect,
            ) else {
                continue;
            };
            let near = points
                .windows(2)
                .any(|w| distance_to_segment(mouse_pos, w[0], w[1]) < CONNECTION_HIT_DISTANCE);
            if near {
                self.hovered_connection = Some(connection.id);
                break;
            }
        }
    }

    fn handle_input<S: NotificationSink>(
        &mut self,
        ui: &egui::Ui,
        response: &egui::Response,
        rect: Rect,
        mouse_pos: Pos2,
        surface: &mut GraphSurface<S>,
    ) {
        let delta = mouse_pos - self.last_mouse_pos;
        self.last_mouse_pos = mouse_pos;

        // Zoom with scroll wheel
        if response.hovered() {
            let scroll_delta = ui.input(|i| i.raw_scroll_delta.y);
            if scroll_delta != 0.0 {
                let zoom_factor = 1.0 + scroll_delta * 0.001;
                let old_zoom = self.zoom;
                self.zoom = (self.zoom * zoom_factor).clamp(0.1, 4.0);

                // Zoom toward mouse position
                if self.zoom != old_zoom {
                    let mouse_graph = self.screen_to_graph(mouse_pos, rect);
                    let zoom_ratio = self.zoom / old_zoom;
                    self.pan.x += mouse_graph.x * (1.0 - zoom_ratio);
                    self.pan.y += mouse_graph.y * (1.0 - zoom_ratio);
                }
            }
        }

        if response.secondary_clicked() {
            self.context_menu_pos = self.screen_to_graph(mouse_pos, rect);
        }

        // Drop from the palette
        if let Some(kind) = response.dnd_release_payload::<NodeKind>() {
            let graph_pos = self.screen_to_graph(mouse_pos, rect);
            let position = self.snap_position([graph_pos.x, graph_pos.y]);
            if let Ok(node) = surface.create_node(*kind, position) {
                self.select_node(surface, Some(node.id));
            }
        }

        match self.mode {
            InteractionMode::Normal => {
                if response.dragged_by(egui::PointerButton::Middle) {
                    self.mode = InteractionMode::Panning;
                }

                if response.clicked() {
                    if let Some(node_id) = self.hovered_node {
                        self.select_node(surface, Some(node_id));
                    } else if let Some(connection_id) = self.hovered_connection {
                        self.select_node(surface, None);
                        self.selected_connection = Some(connection_id);
                    } else {
                        self.select_node(surface, None);
                    }
                }

                if response.drag_started_by(egui::PointerButton::Primary) {
                    if let Some((node_id, handle)) = self.hovered_handle {
                        self.mode = InteractionMode::CreatingConnection(ConnectionDrag {
                            from_node: node_id,
                            from_handle: handle,
                            current_pos: mouse_pos,
                        });
                    } else if let Some(node) = self.hovered_node.and_then(|id| surface.node(id)) {
                        let graph_pos = self.screen_to_graph(mouse_pos, rect);
                        let origin = Pos2::new(node.position[0], node.position[1]);
                        self.mode = InteractionMode::DraggingNode {
                            node: node.id,
                            grab_offset: graph_pos - origin,
                            position: node.position,
                        };
                        let node_id = node.id;
                        self.select_node(surface, Some(node_id));
                    } else {
                        self.mode = InteractionMode::Panning;
                    }
                }
            }

            InteractionMode::Panning => {
                if response.dragged() {
                    self.pan += delta / self.zoom;
                }
                if response.drag_stopped() || !response.dragged() {
                    self.mode = InteractionMode::Normal;
                }
            }

            InteractionMode::DraggingNode { node, grab_offset, .. } => {
                let graph_pos = self.screen_to_graph(mouse_pos, rect) - grab_offset;
                let position = [graph_pos.x, graph_pos.y];

                if response.drag_stopped() || !response.dragged() {
                    let target = self.snap_position(position);
                    if let Err(err) = surface.move_node(node, target) {
                        tracing::debug!("Dropped drag of vanished node: {}", err);
                    }
                    self.mode = InteractionMode::Normal;
                } else {
                    self.mode = InteractionMode::DraggingNode {
                        node,
                        grab_offset,
                        position,
                    };
                }
            }

            InteractionMode::CreatingConnection(mut drag) => {
                drag.current_pos = mouse_pos;

                if response.drag_stopped() || !response.dragged() {
                    self.mode = InteractionMode::Normal;
                    self.finish_connection(surface, &drag);
                } else {
                    self.mode = InteractionMode::CreatingConnection(drag);
                }
            }
        }

        // Delete key, unless a text field is being edited
        let typing = ui.memory(|m| m.focused().is_some());
        if !typing && response.contains_pointer() && ui.input(|i| i.key_pressed(egui::Key::Delete)) {
            self.delete_selected(surface);
        }
    }

    fn finish_connection<S: NotificationSink>(&mut self, surface: &mut GraphSurface<S>, drag: &ConnectionDrag) {
        // Dropping on a node body uses that node's default handle
        let (other_node, other_role) = match self.hovered_handle {
            Some((node_id, handle)) => (node_id, Some(handle.role)),
            None => match self.hovered_node {
                Some(node_id) => (node_id, None),
                None => return,
            },
        };

        // Rejections are reported through the notification sink
        let _ = match drag.from_handle.direction {
            HandleDirection::Source => {
                surface.connect(drag.from_node, Some(drag.from_handle.role), other_node, other_role)
            }
            HandleDirection::Target => {
                surface.connect(other_node, other_role, drag.from_node, Some(drag.from_handle.role))
            }
        };
    }

    fn context_menu<S: NotificationSink>(&mut self, response: &egui::Response, surface: &mut GraphSurface<S>) {
        let position = self.snap_position([self.context_menu_pos.x, self.context_menu_pos.y]);
        let mut created = None;
        let mut delete = false;

        response.context_menu(|ui| {
            ui.label("Add node");
            for kind in NodeKind::ALL {
                if ui.button(kind.name()).clicked() {
                    created = Some(kind);
                    ui.close_menu();
                }
            }
            if surface.selection().is_some() || self.selected_connection.is_some() {
                ui.separator();
                if ui.button("Delete selected").clicked() {
                    delete = true;
                    ui.close_menu();
                }
            }
        });

        if let Some(kind) = created {
            if let Ok(node) = surface.create_node(kind, position) {
                self.select_node(surface, Some(node.id));
            }
        }
        if delete {
            self.delete_selected(surface);
        }
    }

    fn select_node<S: NotificationSink>(&mut self, surface: &mut GraphSurface<S>, node_id: Option<NodeId>) {
        self.selected_connection = None;
        if let Err(err) = surface.select(node_id) {
            tracing::debug!("Ignoring selection: {}", err);
        }
    }

    /// Delete the selected connection, or else the selected node
    pub fn delete_selected<S: NotificationSink>(&mut self, surface: &mut GraphSurface<S>) {
        if let Some(connection_id) = self.selected_connection.take() {
            if let Err(err) = surface.disconnect(connection_id) {
                tracing::debug!("Nothing to disconnect: {}", err);
            }
        } else if let Some(node_id) = surface.selection() {
            if let Err(err) = surface.delete_node(node_id) {
                tracing::debug!("Nothing to delete: {}", err);
            }
        }
    }

    /// Position of a node, including an in-progress drag
    fn node_origin(&self, node: &Node) -> [f32; 2] {
        match self.mode {
            InteractionMode::DraggingNode { node: id, position, .. } if id == node.id => position,
            _ => node.position,
        }
    }

    fn node_rect(&self, node: &Node) -> Rect {
        let [x, y] = self.node_origin(node);
        Rect::from_min_size(Pos2::new(x, y), node_size(node))
    }

    /// Handle position in graph space; targets on the left, sources on the right
    fn handle_position(&self, node: &Node, handle: &Handle) -> Pos2 {
        let [x, y] = self.node_origin(node);
        let row = handle::handles(node.kind())
            .iter()
            .filter(|h| h.direction == handle.direction)
            .position(|h| h.role == handle.role)
            .unwrap_or(0);
        let offset_y = NODE_HEADER_HEIGHT + row as f32 * HANDLE_ROW_HEIGHT + HANDLE_ROW_HEIGHT / 2.0;
        match handle.direction {
            HandleDirection::Target => Pos2::new(x, y + offset_y),
            HandleDirection::Source => Pos2::new(x + NODE_WIDTH, y + offset_y),
        }
    }

    fn connection_points(
        &self,
        graph: &Graph,
        source: NodeId,
        source_role: HandleRole,
        target: NodeId,
        target_role: HandleRole,
        rect: Rect,
    ) -> Option<Vec<Pos2>> {
        let from_node = graph.node(source)?;
        let to_node = graph.node(target)?;
        let from_handle = handle::resolve(from_node.kind(), Some(source_role), HandleDirection::Source)?;
        let to_handle = handle::resolve(to_node.kind(), Some(target_role), HandleDirection::Target)?;
        let from = self.graph_to_screen(self.handle_position(from_node, &from_handle), rect);
        let to = self.graph_to_screen(self.handle_position(to_node, &to_handle), rect);
        Some(self.bezier(from, to))
    }

    fn bezier(&self, from: Pos2, to: Pos2) -> Vec<Pos2> {
        let distance = (to.x - from.x).abs();
        let curvature = (BEZIER_CURVATURE * self.zoom).min(distance * 0.5).max(20.0 * self.zoom);

        let ctrl1 = Pos2::new(from.x + curvature, from.y);
        let ctrl2 = Pos2::new(to.x - curvature, to.y);
        bezier_points(from, ctrl1, ctrl2, to, 32)
    }

    fn draw_connections(&self, ui: &egui::Ui, painter: &egui::Painter, rect: Rect, graph: &Graph) {
        let time = ui.input(|i| i.time) as f32;
        let mut animating = false;

        for connection in graph.connections() {
            let Some(points) = self.connection_points(
                graph,
                connection.source,
                connection.source_handle,
                connection.target,
                connection.target_handle,
                rect,
            ) else {
                continue;
            };

            let is_selected = self.selected_connection == Some(connection.id);
            let is_hovered = self.hovered_connection == Some(connection.id);
            let base = graph
                .node(connection.source)
                .map_or(Color32::GRAY, |n| kind_color(n.kind()));
            let color = if is_selected {
                Color32::WHITE
            } else if is_hovered {
                brighten(base)
            } else {
                base
            };
            let stroke = Stroke::new(CONNECTION_THICKNESS * self.zoom, color);

            match connection.style {
                EdgeStyle::AnimatedFlow => {
                    animating = true;
                    // dashes travel from source to target
                    let period = (FLOW_DASH + FLOW_GAP) * self.zoom;
                    let offset = period - (time * FLOW_SPEED * self.zoom) % period;
                    painter.extend(egui::Shape::dashed_line_with_offset(
                        &points,
                        stroke,
                        &[FLOW_DASH * self.zoom],
                        &[FLOW_GAP * self.zoom],
                        offset,
                    ));
                }
                EdgeStyle::PlainStructural => {
                    painter.add(egui::Shape::line(points, stroke));
                }
            }
        }

        if animating {
            ui.ctx().request_repaint();
        }
    }

    fn draw_connection_drag(&self, painter: &egui::Painter, rect: Rect, graph: &Graph, drag: &ConnectionDrag) {
        let Some(node) = graph.node(drag.from_node) else {
            return;
        };
        let from_pos = self.graph_to_screen(self.handle_position(node, &drag.from_handle), rect);
        let color = kind_color(node.kind());
        let points = match drag.from_handle.direction {
            HandleDirection::Source => self.bezier(from_pos, drag.current_pos),
            HandleDirection::Target => self.bezier(drag.current_pos, from_pos),
        };
        painter.add(egui::Shape::line(points, Stroke::new(CONNECTION_THICKNESS * self.zoom, color)));
    }

    fn draw_nodes(&self, painter: &egui::Painter, rect: Rect, graph: &Graph, selection: Option<NodeId>) {
        for node in graph.nodes() {
            let is_selected = selection == Some(node.id);
            let node_rect = self.node_rect(node);
            let screen_rect = Rect::from_min_size(
                self.graph_to_screen(node_rect.min, rect),
                node_rect.size() * self.zoom,
            );

            // Check if node is visible
            if !screen_rect.intersects(rect) {
                continue;
            }

            // Draw shadow
            let shadow_rect = screen_rect.translate(Vec2::new(NODE_SHADOW_OFFSET, NODE_SHADOW_OFFSET));
            painter.rect_filled(
                shadow_rect,
                NODE_ROUNDING * self.zoom,
                Color32::from_rgba_unmultiplied(0, 0, 0, 60),
            );

            let bg_color = if is_selected {
                Color32::from_rgb(60, 70, 90)
            } else {
                Color32::from_rgb(45, 45, 48)
            };
            painter.rect_filled(screen_rect, NODE_ROUNDING * self.zoom, bg_color);

            // Header
            let header_rect = Rect::from_min_size(
                screen_rect.min,
                Vec2::new(screen_rect.width(), NODE_HEADER_HEIGHT * self.zoom),
            );
            painter.rect_filled(
                header_rect,
                egui::Rounding {
                    nw: NODE_ROUNDING * self.zoom,
                    ne: NODE_ROUNDING * self.zoom,
                    sw: 0.0,
                    se: 0.0,
                },
                kind_color(node.kind()),
            );
            painter.text(
                Pos2::new(header_rect.left() + 8.0 * self.zoom, header_rect.center().y),
                egui::Align2::LEFT_CENTER,
                node.label(),
                egui::FontId::proportional(12.0 * self.zoom),
                Color32::WHITE,
            );
            painter.text(
                Pos2::new(header_rect.right() - 8.0 * self.zoom, header_rect.center().y),
                egui::Align2::RIGHT_CENTER,
                node.kind().name(),
                egui::FontId::proportional(9.0 * self.zoom),
                Color32::from_white_alpha(160),
            );

            if is_selected {
                painter.rect_stroke(
                    screen_rect,
                    NODE_ROUNDING * self.zoom,
                    Stroke::new(2.0, Color32::from_rgb(100, 150, 255)),
                );
            }

            self.draw_handles(painter, rect, node);

            // Summary below the handle rows
            let rows = handle_rows(node.kind()) as f32;
            let top = screen_rect.top() + (NODE_HEADER_HEIGHT + rows * HANDLE_ROW_HEIGHT) * self.zoom;
            for (i, line) in node_summary(node).iter().enumerate() {
                painter.text(
                    Pos2::new(
                        screen_rect.left() + HANDLE_PADDING * self.zoom,
                        top + (i as f32 + 0.5) * SUMMARY_LINE_HEIGHT * self.zoom,
                    ),
                    egui::Align2::LEFT_CENTER,
                    line,
                    egui::FontId::monospace(10.0 * self.zoom),
                    Color32::from_gray(190),
                );
            }
        }
    }

    fn draw_handles(&self, painter: &egui::Painter, rect: Rect, node: &Node) {
        for handle in handle::handles(node.kind()) {
            let pos = self.graph_to_screen(self.handle_position(node, handle), rect);
            let radius = HANDLE_RADIUS * self.zoom;
            let is_hovered = self.hovered_handle.is_some_and(|(id, h)| id == node.id && h.role == handle.role);
            let color = match handle.direction {
                HandleDirection::Source => Color32::from_rgb(120, 200, 255),
                HandleDirection::Target => Color32::from_rgb(255, 200, 120),
            };

            painter.circle_filled(pos, if is_hovered { radius * 1.3 } else { radius }, color);
            painter.circle_stroke(pos, radius, Stroke::new(1.0, Color32::from_gray(30)));

            let (label_pos, align) = match handle.direction {
                HandleDirection::Target => (
                    Pos2::new(pos.x + HANDLE_PADDING * self.zoom, pos.y),
                    egui::Align2::LEFT_CENTER,
                ),
                HandleDirection::Source => (
                    Pos2::new(pos.x - HANDLE_PADDING * self.zoom, pos.y),
                    egui::Align2::RIGHT_CENTER,
                ),
            };
            painter.text(
                label_pos,
                align,
                handle.name,
                egui::FontId::proportional(10.0 * self.zoom),
                Color32::from_gray(200),
            );
        }
    }

    fn draw_minimap(&self, painter: &egui::Painter, rect: Rect, graph: &Graph, selection: Option<NodeId>) {
        let minimap_size = Vec2::new(150.0, 100.0);
        let minimap_rect = Rect::from_min_size(
            Pos2::new(rect.right() - minimap_size.x - 10.0, rect.bottom() - minimap_size.y - 10.0),
            minimap_size,
        );

        painter.rect_filled(minimap_rect, 4.0, Color32::from_rgba_unmultiplied(30, 30, 30, 200));
        painter.rect_stroke(minimap_rect, 4.0, Stroke::new(1.0, Color32::from_gray(60)));

        if graph.node_count() == 0 {
            return;
        }

        // Bounds of all nodes
        let bounds = graph
            .nodes()
            .map(|n| self.node_rect(n))
            .reduce(|a, b| a.union(b))
            .unwrap_or(Rect::NOTHING)
            .expand(50.0);
        let scale = (minimap_rect.width() / bounds.width()).min(minimap_rect.height() / bounds.height());
        let to_minimap = |p: Pos2| minimap_rect.min + (p - bounds.min) * scale;

        for node in graph.nodes() {
            let node_rect = self.node_rect(node);
            let color = if selection == Some(node.id) {
                Color32::from_rgb(100, 150, 255)
            } else {
                kind_color(node.kind()).gamma_multiply(0.7)
            };
            painter.rect_filled(
                Rect::from_min_max(to_minimap(node_rect.min), to_minimap(node_rect.max)),
                2.0,
                color,
            );
        }

        // Viewport indicator
        let view = Rect::from_min_max(
            self.screen_to_graph(rect.min, rect),
            self.screen_to_graph(rect.max, rect),
        );
        painter.rect_stroke(
            Rect::from_min_max(to_minimap(view.min), to_minimap(view.max)).intersect(minimap_rect),
            2.0,
            Stroke::new(1.0, Color32::WHITE),
        );
    }

    fn draw_status_bar(&self, painter: &egui::Painter, rect: Rect, graph: &Graph, selection: Option<NodeId>) {
        let selected = selection
            .and_then(|id| graph.node(id))
            .map_or_else(|| "none".to_string(), |n| format!("{} '{}'", n.kind(), n.label()));

        painter.text(
            Pos2::new(rect.left() + 5.0, rect.bottom() - 11.0),
            egui::Align2::LEFT_CENTER,
            format!(
                "Nodes: {} | Connections: {} | Zoom: {:.0}% | Selected: {}",
                graph.node_count(),
                graph.connection_count(),
                self.zoom * 100.0,
                selected,
            ),
            egui::FontId::proportional(11.0),
            Color32::from_gray(150),
        );
    }
}

impl Default for GraphCanvas {
    fn default() -> Self {
        Self::new()
    }
}

fn kind_color(kind: NodeKind) -> Color32 {
    let [r, g, b] = kind.color();
    Color32::from_rgb(r, g, b)
}

fn brighten(color: Color32) -> Color32 {
    Color32::from_rgb(
        color.r().saturating_add(50),
        color.g().saturating_add(50),
        color.b().saturating_add(50),
    )
}

fn handle_rows(kind: NodeKind) -> usize {
    let handles = handle::handles(kind);
    let targets = handles.iter().filter(|h| h.direction == HandleDirection::Target).count();
    targets.max(handles.len() - targets)
}

fn node_size(node: &Node) -> Vec2 {
    let height = NODE_HEADER_HEIGHT
        + handle_rows(node.kind()) as f32 * HANDLE_ROW_HEIGHT
        + node_summary(node).len() as f32 * SUMMARY_LINE_HEIGHT
        + 8.0;
    Vec2::new(NODE_WIDTH, height)
}

/// Text lines shown in a node's body
pub fn node_summary(node: &Node) -> Vec<String> {
    match &node.payload {
        NodePayload::Type(data) => data.description.iter().cloned().collect(),
        NodePayload::Object(data) => vec![format!("{} : {}", data.label, data.type_name)],
        NodePayload::Predicate(data) => {
            let names: Vec<_> = data.parameters.iter().map(|p| p.name.as_str()).collect();
            let mut lines = vec![format!("({})", names.join(", "))];
            lines.extend(data.bindings.iter().map(pair_text));
            lines
        }
        NodePayload::Action(data) => {
            let mut lines: Vec<_> = data
                .parameters
                .iter()
                .map(|p| format!("{}: {}", p.name, p.type_name))
                .collect();
            lines.push(format!(
                "{}: {}  {}: {}",
                BindingField::Preconditions.name(),
                data.preconditions.len(),
                BindingField::Effects.name(),
                data.effects.len()
            ));
            lines
        }
    }
}

fn pair_text(pair: &ObjectPair) -> String {
    let first = if pair.object1.is_empty() { "?" } else { pair.object1.as_str() };
    match &pair.object2 {
        Some(second) => format!("{first} & {second}"),
        None => first.to_string(),
    }
}

fn distance_to_segment(p: Pos2, a: Pos2, b: Pos2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_sq();
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Generate points along a cubic bezier curve
fn bezier_points(p0: Pos2, p1: Pos2, p2: Pos2, p3: Pos2, segments: usize) -> Vec<Pos2> {
    let mut points = Vec::with_capacity(segments + 1);
    for i in 0..=segments {
        let t = i as f32 / segments as f32;
        let mt = 1.0 - t;
        let a = mt * mt * mt;
        let b = 3.0 * mt * mt * t;
        let c = 3.0 * mt * t * t;
        let d = t * t * t;
        points.push(Pos2::new(
            a * p0.x + b * p1.x + c * p2.x + d * p3.x,
            a * p0.y + b * p1.y + c * p2.y + d * p3.y,
        ));
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::{ActionData, ObjectData, Parameter, PredicateData};

    #[test]
    fn test_snap_to_grid() {
        let mut canvas = GraphCanvas::new();
        assert_eq!(canvas.snap_position([22.0, 8.0]), [15.0, 15.0]);
        canvas.snap_to_grid = false;
        assert_eq!(canvas.snap_position([22.0, 8.0]), [22.0, 8.0]);
    }

    #[test]
    fn test_view_center_follows_pan() {
        let mut canvas = GraphCanvas::new();
        assert_eq!(canvas.view_center(), [0.0, 0.0]);
        canvas.pan = Vec2::new(31.0, -44.0);
        assert_eq!(canvas.view_center(), [-30.0, 45.0]);
    }

    #[test]
    fn test_screen_graph_inverse() {
        let mut canvas = GraphCanvas::new();
        canvas.pan = Vec2::new(30.0, -10.0);
        canvas.zoom = 2.0;
        let rect = Rect::from_min_size(Pos2::ZERO, Vec2::new(800.0, 600.0));
        let p = Pos2::new(120.0, 45.0);
        let back = canvas.screen_to_graph(canvas.graph_to_screen(p, rect), rect);
        assert!((back - p).length() < 1e-3);
    }

    #[test]
    fn test_handles_on_node_sides() {
        let canvas = GraphCanvas::new();
        let node = Node::new(NodePayload::Action(ActionData {
            label: "stack".to_string(),
            parameters: vec![],
            preconditions: vec![],
            effects: vec![],
            description: None,
        }))
        .with_position(100.0, 50.0);

        let [target, source] = [HandleDirection::Target, HandleDirection::Source]
            .map(|d| handle::resolve(NodeKind::Action, None, d).unwrap());
        assert_eq!(canvas.handle_position(&node, &target).x, 100.0);
        assert_eq!(canvas.handle_position(&node, &source).x, 100.0 + NODE_WIDTH);
    }

    #[test]
    fn test_predicate_summary() {
        let node = Node::new(NodePayload::Predicate(PredicateData {
            label: "on-top".to_string(),
            parameters: vec![Parameter::new("?x", "block"), Parameter::new("?y", "block")],
            bindings: vec![ObjectPair::pair("a", "b"), ObjectPair::single("")],
            description: None,
        }));
        assert_eq!(node_summary(&node), vec!["(?x, ?y)", "a & b", "?"]);
    }

    #[test]
    fn test_object_summary() {
        let node = Node::new(NodePayload::Object(ObjectData::new("a", "block")));
        assert_eq!(node_summary(&node), vec!["a : block"]);
    }

    #[test]
    fn test_segment_distance() {
        let d = distance_to_segment(Pos2::new(5.0, 3.0), Pos2::ZERO, Pos2::new(10.0, 0.0));
        assert!((d - 3.0).abs() < 1e-5);
        let d = distance_to_segment(Pos2::new(-4.0, 3.0), Pos2::ZERO, Pos2::new(10.0, 0.0));
        assert!((d - 5.0).abs() < 1e-5);
    }
}
