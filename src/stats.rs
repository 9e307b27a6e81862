use iced::widget::{column, container, row, text};
use iced::{alignment, Element, Length};

use crate::app::Message;
use crate::error::Result;
use crate::models::Stats;

/// Read-only aggregate counts. Hidden until a fetch succeeds.
#[derive(Debug, Default)]
pub struct StatsPanel {
    stats: Option<Stats>,
}

impl StatsPanel {
    pub fn stats(&self) -> Option<&Stats> {
        self.stats.as_ref()
    }

    pub fn loaded(&mut self, outcome: Result<Stats>) {
        match outcome {
            Ok(stats) => self.stats = Some(stats),
            Err(e) => {
                tracing::warn!("Error loading stats: {}", e);
                self.stats = None;
            }
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        let Some(stats) = self.stats() else {
            return column![].into();
        };

        let mut cards = row![
            stat_card(stats.sources, "Sources"),
            stat_card(stats.documents, "Documents"),
            stat_card(stats.searches, "Searches"),
        ]
        .spacing(15);

        if let Some(chunks) = stats.chromadb_count {
            cards = cards.push(stat_card(chunks, "Indexed chunks"));
        }

        cards.into()
    }
}

fn stat_card(value: u64, label: &'static str) -> Element<'static, Message> {
    container(
        column![text(value.to_string()).size(28), text(label).size(13)]
            .spacing(4)
            .align_x(alignment::Horizontal::Center),
    )
    .width(Length::Fill)
    .padding(12)
    .style(container::rounded_box)
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;

    #[test]
    fn test_failed_fetch_hides_stats() {
        let mut panel = StatsPanel::default();
        panel.loaded(Ok(Stats { sources: 2, documents: 9, searches: 40, chromadb_count: None }));
        assert_eq!(panel.stats().map(|s| s.documents), Some(9));

        panel.loaded(Err(ClientError::request(Some(503), "down")));
        assert!(panel.stats().is_none());
    }
}
