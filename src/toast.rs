use iced::widget::{button, column, container, text};
use iced::{Color, Element, Length};
use notify_rust::Notification;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::app::Message;

const MAX_TOASTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Error,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub id: u64,
    pub level: Level,
    pub text: String,
    shown_at: Instant,
}

/// Non-blocking notices that replace modal alerts.
///
/// Toasts expire on their own; the flow that raised one is never paused
/// waiting for the user.
#[derive(Debug)]
pub struct Toasts {
    items: VecDeque<Toast>,
    next_id: u64,
    ttl: Duration,
    desktop: bool,
}

impl Toasts {
    pub fn new(ttl: Duration, desktop: bool) -> Self {
        Toasts {
            items: VecDeque::with_capacity(MAX_TOASTS),
            next_id: 0,
            ttl,
            desktop,
        }
    }

    pub fn info<T: Into<String>>(&mut self, text: T) {
        self.push(Level::Info, text.into());
    }

    pub fn error<T: Into<String>>(&mut self, text: T) {
        self.push(Level::Error, text.into());
    }

    fn push(&mut self, level: Level, text: String) {
        match level {
            Level::Info => tracing::info!(toast = %text),
            Level::Error => tracing::warn!(toast = %text),
        }

        if self.desktop {
            if let Err(e) = Notification::new().summary("DevFlow").body(&text).show() {
                tracing::warn!("Could not show desktop notification: {}", e);
            }
        }

        if self.items.len() >= MAX_TOASTS {
            self.items.pop_front();
        }
        self.next_id += 1;
        self.items.push_back(Toast {
            id: self.next_id,
            level,
            text,
            shown_at: Instant::now(),
        });
    }

    pub fn dismiss(&mut self, id: u64) {
        self.items.retain(|t| t.id != id);
    }

    pub fn expire(&mut self, now: Instant) {
        let ttl = self.ttl;
        self.items.retain(|t| now.saturating_duration_since(t.shown_at) < ttl);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Toast> {
        self.items.iter()
    }

    pub fn view(&self) -> Element<'_, Message> {
        let stack = self.items.iter().fold(column![].spacing(6), |col, toast| {
            let color = match toast.level {
                Level::Info => Color::from_rgb(0.43, 0.91, 0.72),
                Level::Error => Color::from_rgb(0.97, 0.44, 0.44),
            };
            col.push(
                button(text(toast.text.as_str()).color(color).size(14))
                    .on_press(Message::DismissToast(toast.id))
                    .style(button::text)
                    .width(Length::Fill),
            )
        });

        container(stack).width(Length::Fill).padding(6).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expire_and_dismiss() {
        let mut toasts = Toasts::new(Duration::from_secs(5), false);
        toasts.info("Source deleted!");
        toasts.error("Error deleting: gone");
        assert_eq!(toasts.iter().count(), 2);

        let first = toasts.iter().next().unwrap().id;
        toasts.dismiss(first);
        assert_eq!(toasts.iter().map(|t| t.level).collect::<Vec<_>>(), vec![Level::Error]);

        toasts.expire(Instant::now() + Duration::from_secs(6));
        assert!(toasts.is_empty());
    }

    #[test]
    fn test_oldest_toast_is_dropped_when_full() {
        let mut toasts = Toasts::new(Duration::from_secs(5), false);
        for i in 0..7 {
            toasts.info(format!("notice {}", i));
        }
        let texts: Vec<_> = toasts.iter().map(|t| t.text.clone()).collect();
        assert_eq!(texts.len(), MAX_TOASTS);
        assert_eq!(texts[0], "notice 2");
    }
}
