use iced::widget::{button, column, container, row, text, Column};
use iced::{alignment, Color, Element, Length};
use std::collections::HashSet;

use crate::app::Message;
use crate::models::{SearchResult, Source, WebResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveState {
    Unsaved,
    Saving,
    Saved,
}

/// Per-URL save state for one displayed result.
///
/// `saved` is the SavedSet: a URL enters it only on a successful save and
/// never leaves it while this tracker lives.
#[derive(Debug, Default)]
pub struct SaveTracker {
    in_flight: HashSet<String>,
    saved: HashSet<String>,
}

impl SaveTracker {
    pub fn state(&self, url: &str) -> SaveState {
        if self.saved.contains(url) {
            SaveState::Saved
        } else if self.in_flight.contains(url) {
            SaveState::Saving
        } else {
            SaveState::Unsaved
        }
    }

    /// Unsaved -> Saving. Returns false when a save is already running or done.
    pub fn begin(&mut self, url: &str) -> bool {
        if self.state(url) != SaveState::Unsaved {
            return false;
        }
        self.in_flight.insert(url.to_string())
    }

    /// Saving -> Saved on success, Saving -> Unsaved on failure.
    pub fn complete(&mut self, url: &str, succeeded: bool) -> SaveState {
        if self.in_flight.remove(url) && succeeded {
            self.saved.insert(url.to_string());
        }
        self.state(url)
    }

    #[cfg(test)]
    pub fn saved(&self) -> &HashSet<String> {
        &self.saved
    }
}

/// A web-backed citation plus the hit that can be promoted, when known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebEntry {
    pub source: Source,
    pub candidate: Option<WebResult>,
}

/// Pairs each web source with its full web result, matching on URL first
/// and falling back to position.
pub fn web_entries(result: &SearchResult) -> Vec<WebEntry> {
    if result.web_sources.is_empty() {
        return result
            .web_results_full
            .iter()
            .map(|hit| WebEntry {
                source: Source { title: hit.title.clone(), url: Some(hit.url.clone()) },
                candidate: Some(hit.clone()),
            })
            .collect();
    }

    result
        .web_sources
        .iter()
        .enumerate()
        .map(|(idx, source)| {
            let candidate = match source.url.as_deref() {
                Some(url) => result.web_results_full.iter().find(|hit| hit.url == url),
                None => result.web_results_full.get(idx),
            };
            WebEntry { source: source.clone(), candidate: candidate.cloned() }
        })
        .collect()
}

/// A completed search and the saves made against it.
#[derive(Debug)]
pub struct SearchOutcome {
    pub result: SearchResult,
    pub saves: SaveTracker,
}

impl SearchOutcome {
    pub fn new(result: SearchResult) -> Self {
        SearchOutcome { result, saves: SaveTracker::default() }
    }

    pub fn view(&self) -> Element<'_, Message> {
        let result = &self.result;
        let mut card = column![
            text("Answer:").size(16),
            text(result.answer.as_str()).size(15),
        ]
        .spacing(8);

        if !result.doc_sources.is_empty() {
            card = card.push(text(format!("📚 Sources ({})", result.doc_sources.len())).size(18));
            for (idx, source) in result.doc_sources.iter().enumerate() {
                card = card.push(source_line(idx, source));
            }
        }

        let entries = web_entries(result);
        if !entries.is_empty() {
            card = card.push(text(format!("🌐 Web ({})", entries.len())).size(18));
            for (idx, entry) in entries.into_iter().enumerate() {
                let save: Element<Message> = match entry.candidate {
                    Some(hit) => save_button(self.saves.state(&hit.url), hit),
                    None => text("").into(),
                };
                card = card.push(
                    row![container(source_line(idx, &entry.source)).width(Length::Fill), save]
                        .spacing(10)
                        .align_y(alignment::Vertical::Center),
                );
            }
        }

        if let Some(model) = &result.model {
            card = card.push(
                text(format!("Powered by {}", model))
                    .size(13)
                    .color(Color::from_rgb(0.6, 0.6, 0.6)),
            );
        }

        container(card).padding(15).width(Length::Fill).into()
    }
}

fn source_line(idx: usize, source: &Source) -> Column<'static, Message> {
    let mut line = column![text(format!("{}. {}", idx + 1, source.title)).size(15)];
    if let Some(url) = &source.url {
        line = line.push(text(url.clone()).size(13).color(Color::from_rgb(0.48, 0.64, 0.97)));
    }
    line
}

fn save_button(state: SaveState, hit: WebResult) -> Element<'static, Message> {
    match state {
        SaveState::Unsaved => button(text("Save").size(14))
            .on_press(Message::SaveWebResult(hit))
            .padding(8)
            .into(),
        SaveState::Saving => button(text("Saving...").size(14)).padding(8).into(),
        SaveState::Saved => button(text("✓ Saved").size(14)).padding(8).into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(url: &str) -> WebResult {
        WebResult { title: url.to_string(), url: url.to_string(), description: String::new() }
    }

    #[test]
    fn test_saved_only_after_success() {
        let mut saves = SaveTracker::default();
        assert!(saves.begin("http://a"));
        assert_eq!(saves.state("http://a"), SaveState::Saving);
        assert!(!saves.begin("http://a"));

        assert_eq!(saves.complete("http://a", false), SaveState::Unsaved);
        assert!(saves.saved().is_empty());

        assert!(saves.begin("http://a"));
        assert_eq!(saves.complete("http://a", true), SaveState::Saved);
        assert!(saves.saved().contains("http://a"));
        assert!(!saves.begin("http://a"));
    }

    #[test]
    fn test_saves_are_independent_per_url() {
        let mut saves = SaveTracker::default();
        assert!(saves.begin("http://a"));
        assert!(saves.begin("http://b"));

        saves.complete("http://a", true);
        assert_eq!(saves.state("http://a"), SaveState::Saved);
        assert_eq!(saves.state("http://b"), SaveState::Saving);

        saves.complete("http://b", false);
        assert_eq!(saves.state("http://a"), SaveState::Saved);
        assert_eq!(saves.state("http://b"), SaveState::Unsaved);
    }

    #[test]
    fn test_completion_without_begin_is_ignored() {
        let mut saves = SaveTracker::default();
        assert_eq!(saves.complete("http://stray", true), SaveState::Unsaved);
        assert!(saves.saved().is_empty());
    }

    #[test]
    fn test_web_entries_match_by_url() {
        let result = SearchResult {
            web_sources: vec![
                Source { title: "B".into(), url: Some("http://b".into()) },
                Source { title: "Unknown".into(), url: Some("http://zzz".into()) },
            ],
            web_results_full: vec![hit("http://a"), hit("http://b")],
            ..Default::default()
        };

        let entries = web_entries(&result);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].candidate, Some(hit("http://b")));
        assert_eq!(entries[1].candidate, None);
    }

    #[test]
    fn test_web_entries_from_full_results_only() {
        let result = SearchResult { web_results_full: vec![hit("http://x")], ..Default::default() };
        let entries = web_entries(&result);
        assert_eq!(entries[0].source.url.as_deref(), Some("http://x"));
        assert!(entries[0].candidate.is_some());
    }
}
