// SPDX-License-Identifier: MIT OR Apache-2.0
//! Notification sink of the editor window and its toast overlay.

use planwright_editor_graph::{Notification, NotificationLog, NotificationSink};
use std::collections::VecDeque;

/// Seconds a toast stays on screen
const TOAST_SECONDS: f64 = 3.0;

/// Toasts shown at once
const MAX_TOASTS: usize = 4;

/// Sink feeding both the notification history and the toast overlay
#[derive(Debug)]
pub struct EditorNotifications {
    history: NotificationLog,
    unseen: Vec<Notification>,
}

impl EditorNotifications {
    /// Create a sink over a history buffer
    pub fn new(history: NotificationLog) -> Self {
        Self {
            history,
            unseen: Vec::new(),
        }
    }

    /// Retained history
    pub fn history_mut(&mut self) -> &mut NotificationLog {
        &mut self.history
    }

    /// Notifications not yet shown as toasts
    pub fn take_unseen(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.unseen)
    }
}

impl NotificationSink for EditorNotifications {
    fn notify(&mut self, notification: Notification) {
        self.history.notify(notification.clone());
        self.unseen.push(notification);
    }
}

/// Short-lived notification overlay
#[derive(Debug, Default)]
pub struct ToastStack {
    /// Toasts with their expiry time
    toasts: VecDeque<(Notification, f64)>,
}

impl ToastStack {
    /// Show a notification, dropping the oldest toast when full
    pub fn push(&mut self, notification: Notification, now: f64) {
        self.toasts.push_back((notification, now + TOAST_SECONDS));
        while self.toasts.len() > MAX_TOASTS {
            self.toasts.pop_front();
        }
    }

    /// Drop expired toasts
    pub fn expire(&mut self, now: f64) {
        self.toasts.retain(|(_, until)| *until > now);
    }

    /// Number of toasts on screen
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    /// Whether no toast is on screen
    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    /// Draw the toasts in the bottom-right corner
    pub fn show(&mut self, ctx: &egui::Context) {
        let now = ctx.input(|i| i.time);
        self.expire(now);
        if self.is_empty() {
            return;
        }

        egui::Area::new(egui::Id::new("notification_toasts"))
            .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-12.0, -12.0))
            .order(egui::Order::Foreground)
            .interactable(false)
            .show(ctx, |ui| {
                for (notification, _) in &self.toasts {
                    let [r, g, b] = notification.severity.color();
                    egui::Frame::popup(ui.style())
                        .stroke(egui::Stroke::new(1.0, egui::Color32::from_rgb(r, g, b)))
                        .show(ui, |ui| {
                            ui.set_max_width(280.0);
                            ui.label(
                                egui::RichText::new(&notification.summary)
                                    .strong()
                                    .color(egui::Color32::from_rgb(r, g, b)),
                            );
                            ui.label(&notification.detail);
                        });
                    ui.add_space(4.0);
                }
            });

        // keep frames coming until the last toast expires
        ctx.request_repaint_after(std::time::Duration::from_millis(250));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sink_feeds_history_and_toasts() {
        let mut sink = EditorNotifications::new(NotificationLog::new(10));
        sink.notify(Notification::success("Node created", "Type node added to canvas"));
        sink.notify(Notification::error("Invalid connection", "Type cannot connect to Action"));

        assert_eq!(sink.history_mut().len(), 2);
        assert_eq!(sink.take_unseen().len(), 2);
        assert!(sink.take_unseen().is_empty());
        assert_eq!(sink.history_mut().len(), 2);
    }

    #[test]
    fn test_toasts_expire() {
        let mut toasts = ToastStack::default();
        toasts.push(Notification::success("a", ""), 0.0);
        toasts.push(Notification::success("b", ""), 2.0);
        toasts.expire(4.0);
        assert_eq!(toasts.len(), 1);
        toasts.expire(5.0);
        assert_eq!(toasts.len(), 0);
    }

    #[test]
    fn test_toasts_capped() {
        let mut toasts = ToastStack::default();
        for i in 0..6 {
            toasts.push(Notification::error(format!("{i}"), ""), 0.0);
        }
        assert_eq!(toasts.len(), MAX_TOASTS);
    }
}
