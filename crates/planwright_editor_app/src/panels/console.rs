// SPDX-License-Identifier: MIT OR Apache-2.0
//! Log panel - tracing output and notification history.

use planwright_editor_graph::{NotificationLog, Severity};
use std::collections::VecDeque;
use std::sync::mpsc;

/// A tracing event captured by the [`TracingBridge`] layer.
#[derive(Debug, Clone)]
pub struct TracingEvent {
    /// The log level.
    pub level: LogLevel,
    /// The formatted message.
    pub message: String,
    /// Target (module path).
    pub target: String,
}

/// A `tracing_subscriber::Layer` that forwards events over an `mpsc` channel
/// so the [`ConsolePanel`] can display them.
pub struct TracingBridge {
    sender: mpsc::Sender<TracingEvent>,
}

impl TracingBridge {
    /// Create a new bridge and return `(layer, receiver)`.
    pub fn new() -> (Self, mpsc::Receiver<TracingEvent>) {
        let (sender, receiver) = mpsc::channel();
        (Self { sender }, receiver)
    }
}

impl<S> tracing_subscriber::Layer<S> for TracingBridge
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let level = LogLevel::from(*event.metadata().level());

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let message = if visitor.message.is_empty() {
            "(empty)".to_string()
        } else {
            visitor.message
        };

        // receiver is gone once the window closes
        let _ = self.sender.send(TracingEvent {
            level,
            message,
            target: event.metadata().target().to_string(),
        });
    }
}

/// Visitor that extracts the `message` field from a tracing event.
#[derive(Default)]
struct MessageVisitor {
    message: String,
}

impl MessageVisitor {
    fn push_field(&mut self, name: &str, value: std::fmt::Arguments<'_>) {
        if name == "message" {
            self.message = value.to_string();
        } else if self.message.is_empty() {
            self.message = format!("{name} = {value}");
        } else {
            self.message.push_str(&format!(", {name} = {value}"));
        }
    }
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.push_field(field.name(), format_args!("{value:?}"));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.push_field(field.name(), format_args!("{value}"));
    }
}

/// Format a `SystemTime` as HH:MM:SS (UTC)
fn format_system_time(time: &std::time::SystemTime) -> String {
    let secs = time
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    format!("{:02}:{:02}:{:02}", (secs / 3600) % 24, (secs / 60) % 60, secs % 60)
}

/// Log level for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Trace
    Trace,
    /// Debug
    Debug,
    /// Info
    Info,
    /// Warning
    Warn,
    /// Error
    Error,
}

impl From<tracing::Level> for LogLevel {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE => Self::Trace,
            tracing::Level::DEBUG => Self::Debug,
            tracing::Level::INFO => Self::Info,
            tracing::Level::WARN => Self::Warn,
            tracing::Level::ERROR => Self::Error,
        }
    }
}

impl LogLevel {
    const ALL: [LogLevel; 5] = [Self::Trace, Self::Debug, Self::Info, Self::Warn, Self::Error];

    fn name(self) -> &'static str {
        match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }

    fn short_name(self) -> &'static str {
        match self {
            Self::Trace => "T",
            Self::Debug => "D",
            Self::Info => "I",
            Self::Warn => "W",
            Self::Error => "E",
        }
    }

    fn index(self) -> usize {
        self as usize
    }

    fn color(self) -> egui::Color32 {
        match self {
            Self::Trace => egui::Color32::from_rgb(100, 100, 100),
            Self::Debug => egui::Color32::from_rgb(150, 150, 150),
            Self::Info => egui::Color32::from_rgb(200, 200, 200),
            Self::Warn => egui::Color32::from_rgb(255, 200, 80),
            Self::Error => egui::Color32::from_rgb(255, 100, 100),
        }
    }

    fn bg_color(self) -> egui::Color32 {
        match self {
            Self::Trace | Self::Debug | Self::Info => egui::Color32::TRANSPARENT,
            Self::Warn => egui::Color32::from_rgba_unmultiplied(255, 200, 80, 20),
            Self::Error => egui::Color32::from_rgba_unmultiplied(255, 100, 100, 30),
        }
    }
}

/// A log entry
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// Level
    pub level: LogLevel,
    /// Message, prefixed with its target
    pub message: String,
    /// Time of the latest occurrence
    pub timestamp: String,
    /// Occurrences collapsed into this entry
    pub count: u32,
}

/// Which list the panel shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConsoleView {
    Log,
    Notifications,
}

/// The log panel
pub struct ConsolePanel {
    /// Receiver for tracing events
    tracing_rx: Option<mpsc::Receiver<TracingEvent>>,
    /// Log entries
    entries: VecDeque<LogEntry>,
    /// Maximum entries to keep
    pub max_entries: usize,
    /// Search filter
    pub search: String,
    /// Auto-scroll to bottom
    pub auto_scroll: bool,
    /// Show timestamps
    pub show_timestamps: bool,
    /// Collapse duplicate messages
    pub collapse_duplicates: bool,
    /// Per-level filter toggles, indexed by level
    visible: [bool; 5],
    /// Entry counts, indexed by level
    counts: [usize; 5],
    view: ConsoleView,
}

impl ConsolePanel {
    /// Create a new console panel wired to a tracing receiver.
    pub fn with_tracing_receiver(tracing_rx: Option<mpsc::Receiver<TracingEvent>>) -> Self {
        Self {
            tracing_rx,
            entries: VecDeque::new(),
            max_entries: 1000,
            search: String::new(),
            auto_scroll: true,
            show_timestamps: false,
            collapse_duplicates: true,
            visible: [false, true, true, true, true],
            counts: [0; 5],
            view: ConsoleView::Log,
        }
    }

    /// Add a log entry
    pub fn log(&mut self, level: LogLevel, message: impl Into<String>) {
        let message = message.into();
        let timestamp = format_system_time(&std::time::SystemTime::now());
        self.counts[level.index()] += 1;

        if self.collapse_duplicates {
            if let Some(last) = self.entries.back_mut() {
                if last.level == level && last.message == message {
                    last.count += 1;
                    last.timestamp = timestamp;
                    return;
                }
            }
        }

        self.entries.push_back(LogEntry {
            level,
            message,
            timestamp,
            count: 1,
        });

        while self.entries.len() > self.max_entries {
            self.entries.pop_front();
        }
    }

    /// Retained entries, oldest first
    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    /// Clear all entries
    pub fn clear(&mut self) {
        self.entries.clear();
        self.counts = [0; 5];
    }

    fn is_shown(&self, entry: &LogEntry) -> bool {
        self.visible[entry.level.index()]
            && (self.search.is_empty() || entry.message.to_lowercase().contains(&self.search.to_lowercase()))
    }

    /// Drain any pending tracing events into the log.
    ///
    /// Called once per frame whether or not the panel is visible.
    pub fn poll_tracing_events(&mut self) {
        let Some(rx) = &self.tracing_rx else {
            return;
        };

        let events: Vec<_> = rx.try_iter().collect();
        for event in events {
            self.log(event.level, format!("[{}] {}", event.target, event.message));
        }
    }

    /// Render the log panel
    pub fn ui(&mut self, ui: &mut egui::Ui, notifications: &mut NotificationLog) {
        ui.horizontal(|ui| {
            ui.selectable_value(&mut self.view, ConsoleView::Log, "Log");
            ui.selectable_value(
                &mut self.view,
                ConsoleView::Notifications,
                format!("Notifications ({})", notifications.len()),
            );
            ui.separator();

            match self.view {
                ConsoleView::Log => self.log_toolbar(ui),
                ConsoleView::Notifications => {
                    if ui.button("Clear").on_hover_text("Clear notification history").clicked() {
                        notifications.clear();
                    }
                }
            }
        });

        ui.separator();

        match self.view {
            ConsoleView::Log => self.log_list(ui),
            ConsoleView::Notifications => notification_list(ui, notifications),
        }
    }

    fn log_toolbar(&mut self, ui: &mut egui::Ui) {
        if ui.button("Clear").on_hover_text("Clear all logs").clicked() {
            self.clear();
        }

        ui.separator();

        for level in LogLevel::ALL {
            let shown = self.visible[level.index()];
            let text = format!("{} {}", level.short_name(), self.counts[level.index()]);
            let color = if shown { level.color() } else { egui::Color32::GRAY };
            if ui
                .add(egui::Button::new(egui::RichText::new(text).color(color).monospace()))
                .on_hover_text(format!("{} messages", level.name()))
                .clicked()
            {
                self.visible[level.index()] = !shown;
            }
        }

        ui.separator();

        ui.add(
            egui::TextEdit::singleline(&mut self.search)
                .hint_text("Search...")
                .desired_width(150.0),
        );
        if !self.search.is_empty() && ui.button("x").on_hover_text("Clear search").clicked() {
            self.search.clear();
        }

        ui.separator();

        ui.menu_button("Options", |ui| {
            ui.checkbox(&mut self.auto_scroll, "Auto-scroll");
            ui.checkbox(&mut self.show_timestamps, "Show timestamps");
            ui.checkbox(&mut self.collapse_duplicates, "Collapse duplicates");
        });
    }

    fn log_list(&self, ui: &mut egui::Ui) {
        egui::ScrollArea::vertical()
            .id_salt("log_entries")
            .auto_shrink([false, false])
            .stick_to_bottom(self.auto_scroll)
            .show(ui, |ui| {
                for entry in self.entries.iter().filter(|e| self.is_shown(e)) {
                    let response = ui.horizontal(|ui| {
                        let bg_color = entry.level.bg_color();
                        if bg_color != egui::Color32::TRANSPARENT {
                            let rect = ui.available_rect_before_wrap();
                            ui.painter().rect_filled(
                                egui::Rect::from_min_size(rect.min, egui::vec2(ui.available_width(), 18.0)),
                                0.0,
                                bg_color,
                            );
                        }

                        if self.show_timestamps {
                            ui.label(
                                egui::RichText::new(&entry.timestamp)
                                    .monospace()
                                    .size(11.0)
                                    .color(egui::Color32::from_rgb(100, 100, 100)),
                            );
                        }

                        ui.label(
                            egui::RichText::new(format!("[{}]", entry.level.short_name()))
                                .monospace()
                                .size(11.0)
                                .color(entry.level.color()),
                        );

                        if entry.count > 1 {
                            ui.label(
                                egui::RichText::new(format!("({})", entry.count))
                                    .monospace()
                                    .size(10.0)
                                    .color(egui::Color32::from_rgb(150, 150, 200)),
                            );
                        }

                        ui.label(
                            egui::RichText::new(&entry.message)
                                .monospace()
                                .size(12.0)
                                .color(entry.level.color()),
                        );
                    });

                    response.response.context_menu(|ui| {
                        if ui.button("Copy message").clicked() {
                            ui.output_mut(|o| o.copied_text.clone_from(&entry.message));
                            ui.close_menu();
                        }
                    });
                }
            });
    }
}

fn notification_list(ui: &mut egui::Ui, notifications: &NotificationLog) {
    if notifications.is_empty() {
        ui.weak("No notifications yet");
        return;
    }

    egui::ScrollArea::vertical()
        .id_salt("notification_entries")
        .auto_shrink([false, false])
        .show(ui, |ui| {
            for notification in notifications.entries().rev() {
                let [r, g, b] = notification.severity.color();
                let icon = match notification.severity {
                    Severity::Success => "\u{2714}",
                    Severity::Error => "\u{2716}",
                };
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new(icon).color(egui::Color32::from_rgb(r, g, b)));
                    ui.label(egui::RichText::new(&notification.summary).strong());
                    ui.label(&notification.detail);
                });
            }
        });
}

impl Default for ConsolePanel {
    fn default() -> Self {
        Self::with_tracing_receiver(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::layer::SubscriberExt;

    #[test]
    fn test_duplicates_collapse() {
        let mut console = ConsolePanel::default();
        console.log(LogLevel::Info, "Node created");
        console.log(LogLevel::Info, "Node created");
        console.log(LogLevel::Warn, "Node created");

        let counts: Vec<_> = console.entries().map(|e| e.count).collect();
        assert_eq!(counts, vec![2, 1]);
        assert_eq!(console.counts[LogLevel::Info.index()], 2);
    }

    #[test]
    fn test_oldest_entries_dropped() {
        let mut console = ConsolePanel::default();
        console.max_entries = 2;
        for i in 0..3 {
            console.log(LogLevel::Info, format!("entry {i}"));
        }
        let messages: Vec<_> = console.entries().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["entry 1", "entry 2"]);
    }

    #[test]
    fn test_bridge_forwards_events() {
        let (bridge, rx) = TracingBridge::new();
        let subscriber = tracing_subscriber::registry().with(bridge);
        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!(target: "planwright", "Invalid connection");
        });

        let mut console = ConsolePanel::with_tracing_receiver(Some(rx));
        console.poll_tracing_events();
        let entry = console.entries().next().unwrap();
        assert_eq!(entry.level, LogLevel::Warn);
        assert_eq!(entry.message, "[planwright] Invalid connection");
    }

    #[test]
    fn test_events_drained_without_rendering() {
        let (bridge, rx) = TracingBridge::new();
        let subscriber = tracing_subscriber::registry().with(bridge);
        let mut console = ConsolePanel::with_tracing_receiver(Some(rx));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(target: "planwright", "Node created");
            console.poll_tracing_events();
            tracing::info!(target: "planwright", "Connection created");
            tracing::info!(target: "planwright", "Node deleted");
            console.poll_tracing_events();
        });

        let messages: Vec<_> = console.entries().map(|e| e.message.as_str()).collect();
        assert_eq!(
            messages,
            ["[planwright] Node created", "[planwright] Connection created", "[planwright] Node deleted"]
        );
        let rx = console.tracing_rx.as_ref().unwrap();
        assert!(rx.try_recv().is_err());
    }
}
