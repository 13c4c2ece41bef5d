// SPDX-License-Identifier: MIT OR Apache-2.0
//! Main editor application setup and event loop.

use crate::panel_types::PanelType;
use crate::panels::console::TracingEvent;
use crate::panels::{ConsolePanel, PalettePanel, PropertiesPanel, SnapshotPanel};
use crate::settings::EditorSettings;
use crate::toasts::{EditorNotifications, ToastStack};
use egui_dock::{DockArea, DockState, NodeIndex, Style, TabViewer};
use egui_wgpu::wgpu;
use planwright_editor_graph::{Graph, GraphCanvas, GraphSurface, Node, ObjectCatalog, SurfaceObserver};
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use thiserror::Error;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

/// Window title without a selection
const APP_TITLE: &str = "Planwright";

/// Editor application errors
#[derive(Debug, Error)]
pub enum EditorError {
    /// Window creation failed
    #[error("Failed to create window: {0}")]
    WindowCreation(String),

    /// Renderer initialization failed
    #[error("Failed to initialize renderer: {0}")]
    RendererInit(String),

    /// Event loop error
    #[error("Event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
}

/// Result type for editor operations
pub type Result<T> = std::result::Result<T, EditorError>;

/// Surface type edited by the window
type EditorSurface = GraphSurface<EditorNotifications>;

/// Tab viewer implementation for `egui_dock`
pub struct EditorTabViewer<'a> {
    surface: &'a mut EditorSurface,
    canvas: &'a mut GraphCanvas,
    palette: &'a mut PalettePanel,
    properties: &'a mut PropertiesPanel,
    console: &'a mut ConsolePanel,
    snapshot: &'a mut SnapshotPanel,
}

impl<'a> TabViewer for EditorTabViewer<'a> {
    type Tab = PanelType;

    fn title(&mut self, tab: &mut Self::Tab) -> egui::WidgetText {
        format!("{} {}", tab.icon(), tab.name()).into()
    }

    fn ui(&mut self, ui: &mut egui::Ui, tab: &mut Self::Tab) {
        match tab {
            PanelType::Palette => {
                if let Some(kind) = self.palette.ui(ui, self.surface.registry()) {
                    let position = self.canvas.view_center();
                    if let Ok(node) = self.surface.create_node(kind, position) {
                        if let Err(e) = self.surface.select(Some(node.id)) {
                            tracing::warn!("Failed to select new node: {}", e);
                        }
                    }
                }
            }
            PanelType::Canvas => self.canvas.ui(ui, self.surface),
            PanelType::Properties => self.properties.ui(ui, self.surface),
            PanelType::Log => self.console.ui(ui, self.surface.sink_mut().history_mut()),
            PanelType::Snapshot => self.snapshot.ui(ui, self.surface),
        }
    }

    fn closeable(&mut self, _tab: &mut Self::Tab) -> bool {
        true
    }

    fn on_close(&mut self, tab: &mut Self::Tab) -> bool {
        tracing::debug!("Closed {} panel", tab.name());
        true
    }
}

/// Keeps the window title on the selected node
struct WindowTitleObserver {
    window: Arc<Window>,
}

impl SurfaceObserver for WindowTitleObserver {
    fn on_node_select(&mut self, node: Option<&Node>) {
        let title = match node {
            Some(node) => format!("{APP_TITLE} - {} ({})", node.label(), node.kind()),
            None => APP_TITLE.to_string(),
        };
        self.window.set_title(&title);
    }

    fn on_nodes_update(&mut self, graph: &Graph) {
        tracing::trace!("Graph now has {} nodes", graph.node_count());
    }

    fn on_catalog_update(&mut self, catalog: &ObjectCatalog) {
        tracing::debug!("Object catalog now lists {} objects", catalog.len());
    }
}

/// Graphics state for wgpu rendering
struct GraphicsState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    egui_renderer: egui_wgpu::Renderer,
}

impl GraphicsState {
    fn new(window: Arc<Window>) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .map_err(|e| EditorError::RendererInit(e.to_string()))?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| EditorError::RendererInit("No suitable GPU adapter".to_string()))?;

        tracing::info!("Using GPU: {}", adapter.get_info().name);

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("Planwright Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                ..Default::default()
            },
            None,
        ))
        .map_err(|e| EditorError::RendererInit(e.to_string()))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(wgpu::TextureFormat::is_srgb)
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| EditorError::RendererInit("Surface reports no formats".to_string()))?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            egui_renderer,
        })
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    fn render(
        &mut self,
        egui_ctx: &egui::Context,
        full_output: egui::FullOutput,
        window: &Window,
    ) -> std::result::Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Editor Encoder"),
        });

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: window.scale_factor() as f32,
        };

        let paint_jobs = egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer.update_texture(&self.device, &self.queue, *id, image_delta);
        }

        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );

        {
            // egui-wgpu takes a 'static pass; it must drop before the encoder finishes
            let mut render_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Editor Render Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(wgpu::Color {
                                r: 0.1,
                                g: 0.1,
                                b: 0.1,
                                a: 1.0,
                            }),
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                })
                .forget_lifetime();

            self.egui_renderer.render(&mut render_pass, &paint_jobs, &screen_descriptor);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        Ok(())
    }
}

/// Running state of the editor
struct EditorRunning {
    window: Arc<Window>,
    graphics: GraphicsState,
    egui_ctx: egui::Context,
    egui_state: egui_winit::State,
    editor: EditorInner,
}

/// Inner editor state and panels
struct EditorInner {
    surface: EditorSurface,
    canvas: GraphCanvas,
    dock_state: DockState<PanelType>,
    palette: PalettePanel,
    properties: PropertiesPanel,
    console: ConsolePanel,
    snapshot: SnapshotPanel,
    toasts: ToastStack,
    /// Set by File > Quit
    request_exit: bool,
}

impl EditorInner {
    fn new(settings: &EditorSettings, window: Arc<Window>, tracing_rx: Option<Receiver<TracingEvent>>) -> Self {
        let mut surface = GraphSurface::new(
            settings.registry(),
            EditorNotifications::new(settings.notification_log()),
        );
        surface.add_observer(Box::new(WindowTitleObserver { window }));

        let mut canvas = GraphCanvas::new();
        settings.apply_to_canvas(&mut canvas);

        Self {
            surface,
            canvas,
            dock_state: Self::create_default_layout(),
            palette: PalettePanel::new(),
            properties: PropertiesPanel::new(),
            console: ConsolePanel::with_tracing_receiver(tracing_rx),
            snapshot: SnapshotPanel::new(),
            toasts: ToastStack::default(),
            request_exit: false,
        }
    }

    fn create_default_layout() -> DockState<PanelType> {
        // Canvas in the center
        let mut dock_state = DockState::new(vec![PanelType::Canvas]);
        let surface = dock_state.main_surface_mut();

        let [_center, _left] = surface.split_left(NodeIndex::root(), 0.16, vec![PanelType::Palette]);

        let [center, _right] = surface.split_right(NodeIndex::root(), 0.72, vec![PanelType::Properties]);

        let [_top, _bottom] = surface.split_below(center, 0.72, vec![PanelType::Log, PanelType::Snapshot]);

        dock_state
    }

    fn update(&mut self, ctx: &egui::Context) {
        // drain even while the Log tab is hidden or closed
        self.console.poll_tracing_events();

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                self.file_menu(ui);
                self.edit_menu(ui);
                self.view_menu(ui);

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let graph = self.surface.graph();
                    ui.weak(format!(
                        "{} nodes  {} connections  {} objects",
                        graph.node_count(),
                        graph.connection_count(),
                        self.surface.catalog().len()
                    ));
                });
            });
        });

        let mut tab_viewer = EditorTabViewer {
            surface: &mut self.surface,
            canvas: &mut self.canvas,
            palette: &mut self.palette,
            properties: &mut self.properties,
            console: &mut self.console,
            snapshot: &mut self.snapshot,
        };

        DockArea::new(&mut self.dock_state)
            .style(Style::from_egui(ctx.style().as_ref()))
            .show(ctx, &mut tab_viewer);

        let now = ctx.input(|i| i.time);
        for notification in self.surface.sink_mut().take_unseen() {
            self.toasts.push(notification, now);
        }
        self.toasts.show(ctx);
    }

    fn file_menu(&mut self, ui: &mut egui::Ui) {
        ui.menu_button("File", |ui| {
            if ui.button("Quit").clicked() {
                self.request_exit = true;
                ui.close_menu();
            }
        });
    }

    fn edit_menu(&mut self, ui: &mut egui::Ui) {
        ui.menu_button("Edit", |ui| {
            let has_selection = self.surface.selection().is_some() || self.canvas.selected_connection().is_some();
            if ui.add_enabled(has_selection, egui::Button::new("Delete Selected")).clicked() {
                self.canvas.delete_selected(&mut self.surface);
                ui.close_menu();
            }
            if ui
                .add_enabled(self.surface.selection().is_some(), egui::Button::new("Deselect"))
                .clicked()
            {
                if let Err(e) = self.surface.select(None) {
                    tracing::warn!("Failed to clear selection: {}", e);
                }
                ui.close_menu();
            }
        });
    }

    fn view_menu(&mut self, ui: &mut egui::Ui) {
        ui.menu_button("View", |ui| {
            ui.menu_button("Panels", |ui| {
                for panel in PanelType::ALL {
                    if ui.button(panel.name()).clicked() {
                        self.open_panel(panel);
                        ui.close_menu();
                    }
                }
            });

            ui.separator();
            ui.checkbox(&mut self.canvas.show_grid, "Show Grid");
            ui.checkbox(&mut self.canvas.show_minimap, "Show Minimap");
            ui.checkbox(&mut self.canvas.snap_to_grid, "Snap to Grid");

            ui.separator();
            if ui.button("Reset View").clicked() {
                self.canvas.reset_view();
                ui.close_menu();
            }
            if ui.button("Reset Layout").clicked() {
                self.dock_state = Self::create_default_layout();
                ui.close_menu();
            }
        });
    }

    fn open_panel(&mut self, panel: PanelType) {
        if let Some((surface, node, tab)) = self.dock_state.find_tab(&panel) {
            self.dock_state.set_active_tab((surface, node, tab));
            self.dock_state.set_focused_node_and_surface((surface, node));
        } else {
            self.dock_state.push_to_focused_leaf(panel);
        }
    }
}

/// Main editor application
pub struct EditorApp {
    running: Option<EditorRunning>,
    settings: EditorSettings,
    /// Tracing receiver passed to the log panel on first resume.
    tracing_rx: Option<Receiver<TracingEvent>>,
    /// Failure that stopped the event loop before the window came up
    startup_error: Option<EditorError>,
}

impl EditorApp {
    /// Create a new editor application
    pub fn new(settings: EditorSettings, tracing_rx: Option<Receiver<TracingEvent>>) -> Self {
        Self {
            running: None,
            settings,
            tracing_rx,
            startup_error: None,
        }
    }

    /// Run the editor application until the window closes.
    pub fn run(settings: EditorSettings, tracing_rx: Option<Receiver<TracingEvent>>) -> Result<()> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = EditorApp::new(settings, tracing_rx);
        event_loop.run_app(&mut app)?;

        app.finish()
    }

    /// Outcome of a finished event loop
    fn finish(self) -> Result<()> {
        match self.startup_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<EditorRunning> {
        let [width, height] = self.settings.window_size;
        let window_attrs = Window::default_attributes()
            .with_title(APP_TITLE)
            .with_inner_size(winit::dpi::LogicalSize::new(width, height))
            .with_min_inner_size(winit::dpi::LogicalSize::new(800, 600));

        let window = Arc::new(
            event_loop
                .create_window(window_attrs)
                .map_err(|e| EditorError::WindowCreation(e.to_string()))?,
        );

        tracing::info!("Initializing graphics...");
        let graphics = GraphicsState::new(window.clone())?;

        let egui_ctx = egui::Context::default();
        let editor = EditorInner::new(&self.settings, window.clone(), self.tracing_rx.take());

        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui_ctx.viewport_id(),
            &window,
            Some(window.scale_factor() as f32),
            None,
            Some(2 * 1024), // max texture side
        );

        tracing::info!("Editor initialized, window size {:?}", window.inner_size());

        Ok(EditorRunning {
            window,
            graphics,
            egui_ctx,
            egui_state,
            editor,
        })
    }
}

impl ApplicationHandler for EditorApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() {
            return;
        }

        tracing::info!("Creating editor window...");
        match self.start(event_loop) {
            Ok(running) => self.running = Some(running),
            Err(e) => {
                tracing::error!("{e}");
                self.startup_error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let Some(running) = &mut self.running else {
            return;
        };

        let response = running.egui_state.on_window_event(&running.window, &event);
        if response.consumed {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                tracing::info!("Close requested, exiting...");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                tracing::debug!("Window resized to {:?}", new_size);
                running.graphics.resize(new_size);
                running.window.request_redraw();
            }
            WindowEvent::RedrawRequested => {
                let raw_input = running.egui_state.take_egui_input(&running.window);
                let full_output = running.egui_ctx.run(raw_input, |ctx| {
                    running.editor.update(ctx);
                });

                if running.editor.request_exit {
                    event_loop.exit();
                    return;
                }

                running
                    .egui_state
                    .handle_platform_output(&running.window, full_output.platform_output.clone());

                match running.graphics.render(&running.egui_ctx, full_output, &running.window) {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        let size = running.window.inner_size();
                        running.graphics.resize(size);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        tracing::error!("Out of GPU memory!");
                        event_loop.exit();
                    }
                    Err(wgpu::SurfaceError::Timeout) => {
                        tracing::warn!("Surface timeout");
                    }
                }

                running.window.request_redraw();
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(running) = &self.running {
            running.window.request_redraw();
        }
    }
}
