use iced::widget::{button, checkbox, column, container, row, text, text_input};
use iced::{alignment, Color, Element, Length};

use crate::api::ApiClient;
use crate::app::Message;
use crate::error::Result;
use crate::models::{SearchResult, WebResult};
use crate::results::{SaveState, SearchOutcome};

const SEARCH_FALLBACK: &str = "Search failed";

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// A submitted, non-empty query. Immutable once sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    text: String,
    include_web: bool,
}

impl Query {
    pub fn new(text: &str, include_web: bool) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        Some(Query { text: text.to_string(), include_web })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn include_web(&self) -> bool {
        self.include_web
    }
}

/// Runs a query against the backend: hybrid when web results are wanted,
/// plain document search otherwise.
pub async fn run(client: ApiClient, query: Query) -> Result<SearchResult> {
    if query.include_web {
        client.hybrid_search(&query.text, true).await
    } else {
        let n_results = client.n_results();
        client.search(&query.text, n_results).await
    }
}

#[derive(Debug, Default)]
pub struct SearchBar {
    pub text: String,
    pub include_web: bool,
}

impl SearchBar {
    pub fn query(&self) -> Option<Query> {
        Query::new(&self.text, self.include_web)
    }

    pub fn view(&self, busy: bool) -> Element<'_, Message> {
        let mut input = text_input("Ask anything about your saved resources...", &self.text)
            .padding(15)
            .size(18);
        let mut web = checkbox("Include web", self.include_web);
        let mut submit = button(text(if busy { "Searching..." } else { "Search" })).padding(15);

        if !busy {
            input = input.on_input(Message::QueryChanged).on_submit(Message::SubmitSearch);
            web = web.on_toggle(Message::WebToggled);
            if self.query().is_some() {
                submit = submit.on_press(Message::SubmitSearch);
            }
        }

        column![
            row![input, submit].spacing(10),
            web,
        ]
        .spacing(8)
        .into()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    pub seq: u64,
    pub query: Query,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveTicket {
    pub seq: u64,
    pub result: WebResult,
}

#[derive(Debug, Default)]
pub enum SearchState {
    #[default]
    Idle,
    Searching,
    Success(SearchOutcome),
    Failed(String),
}

/// Exactly one of these is rendered at a time.
#[derive(Debug)]
pub enum SearchPanel<'a> {
    Error(&'a str),
    Loading,
    Result(&'a SearchOutcome),
    Empty,
}

/// Idle -> Searching -> {Success, Failed}, re-entrant from any state.
///
/// Each submit is tagged with a sequence number. Only the latest one may
/// settle the flow; earlier responses (and saves made against a replaced
/// result) are dropped.
#[derive(Debug, Default)]
pub struct SearchFlow {
    state: SearchState,
    latest: u64,
}

impl SearchFlow {
    pub fn is_searching(&self) -> bool {
        matches!(self.state, SearchState::Searching)
    }

    /// Starts a search. Blank text is ignored without touching state.
    pub fn submit(&mut self, text: &str, include_web: bool) -> Option<SearchTicket> {
        let query = Query::new(text, include_web)?;
        self.latest += 1;
        self.state = SearchState::Searching;
        Some(SearchTicket { seq: self.latest, query })
    }

    /// Settles the flow with a response. Returns false for a stale response.
    pub fn finish(&mut self, seq: u64, outcome: Result<SearchResult>) -> bool {
        if seq != self.latest {
            tracing::debug!(seq, latest = self.latest, "dropping stale search response");
            return false;
        }

        self.state = match outcome {
            Ok(result) => SearchState::Success(SearchOutcome::new(result)),
            Err(e) => {
                tracing::warn!(status = ?e.status(), "search failed: {}", e);
                SearchState::Failed(e.user_message(SEARCH_FALLBACK))
            }
        };
        true
    }

    pub fn begin_save(&mut self, result: WebResult) -> Option<SaveTicket> {
        let SearchState::Success(outcome) = &mut self.state else {
            return None;
        };
        if !outcome.saves.begin(&result.url) {
            return None;
        }
        Some(SaveTicket { seq: self.latest, result })
    }

    /// Applies a save outcome. `None` when the result it was made against
    /// is no longer displayed.
    pub fn finish_save(&mut self, seq: u64, url: &str, succeeded: bool) -> Option<SaveState> {
        if seq != self.latest {
            tracing::debug!(seq, latest = self.latest, url, "dropping save for replaced result");
            return None;
        }
        match &mut self.state {
            SearchState::Success(outcome) => Some(outcome.saves.complete(url, succeeded)),
            _ => None,
        }
    }

    pub fn panel(&self) -> SearchPanel<'_> {
        match &self.state {
            SearchState::Failed(message) => SearchPanel::Error(message.as_str()),
            SearchState::Searching => SearchPanel::Loading,
            SearchState::Success(outcome) => SearchPanel::Result(outcome),
            SearchState::Idle => SearchPanel::Empty,
        }
    }

    pub fn view(&self, loading_frame: usize) -> Element<'_, Message> {
        match self.panel() {
            SearchPanel::Error(message) => container(
                text(format!("⚠️ {}", message)).color(Color::from_rgb(0.97, 0.44, 0.44)),
            )
            .padding(15)
            .into(),
            SearchPanel::Loading => container(
                column![
                    text(SPINNER[loading_frame % SPINNER.len()]).size(32),
                    text("🔎 Searching...").size(15),
                ]
                .spacing(10)
                .align_x(alignment::Horizontal::Center),
            )
            .width(Length::Fill)
            .align_x(alignment::Horizontal::Center)
            .padding(30)
            .into(),
            SearchPanel::Result(outcome) => outcome.view(),
            SearchPanel::Empty => container(
                column![
                    text("💡").size(32),
                    text("Ask me anything!").size(20),
                    text("Search through your saved coding resources.").size(15),
                ]
                .spacing(8)
                .align_x(alignment::Horizontal::Center),
            )
            .width(Length::Fill)
            .align_x(alignment::Horizontal::Center)
            .padding(30)
            .into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use crate::error::ClientError;
    use crate::results::web_entries;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn result(answer: &str) -> SearchResult {
        SearchResult { answer: answer.to_string(), ..Default::default() }
    }

    fn web_hit() -> WebResult {
        WebResult { title: "X".into(), url: "http://x".into(), description: "d".into() }
    }

    fn success_with_web() -> SearchFlow {
        let mut flow = SearchFlow::default();
        let ticket = flow.submit("recursion", true).unwrap();
        flow.finish(
            ticket.seq,
            Ok(SearchResult { web_results_full: vec![web_hit()], ..Default::default() }),
        );
        flow
    }

    #[test]
    fn test_blank_query_leaves_state_alone() {
        let mut flow = SearchFlow::default();
        assert!(flow.submit("   \t", true).is_none());
        assert!(matches!(flow.panel(), SearchPanel::Empty));

        let ticket = flow.submit("ownership", false).unwrap();
        flow.finish(ticket.seq, Err(ClientError::request(Some(500), "boom")));
        assert!(flow.submit("", false).is_none());
        assert!(matches!(flow.panel(), SearchPanel::Error("boom")));
    }

    #[test]
    fn test_submit_from_any_state_enters_searching() {
        let mut flow = SearchFlow::default();
        let first = flow.submit("  borrow checker ", false).unwrap();
        assert_eq!(first.query.text(), "borrow checker");
        assert!(flow.is_searching());

        assert!(flow.finish(first.seq, Ok(result("a"))));
        assert!(matches!(flow.panel(), SearchPanel::Result(_)));

        let second = flow.submit("lifetimes", false).unwrap();
        assert!(second.seq > first.seq);
        assert!(matches!(flow.panel(), SearchPanel::Loading));

        flow.finish(second.seq, Err(ClientError::request(None, "")));
        assert!(matches!(flow.panel(), SearchPanel::Error(SEARCH_FALLBACK)));

        flow.submit("macros", true).unwrap();
        assert!(flow.is_searching());
    }

    #[test]
    fn test_stale_response_does_not_overwrite_newer_search() {
        let mut flow = SearchFlow::default();
        let old = flow.submit("slow query", false).unwrap();
        let new = flow.submit("fast query", false).unwrap();

        assert!(flow.finish(new.seq, Ok(result("fresh"))));
        assert!(!flow.finish(old.seq, Ok(result("stale"))));

        match flow.panel() {
            SearchPanel::Result(outcome) => assert_eq!(outcome.result.answer, "fresh"),
            other => panic!("unexpected panel {:?}", other),
        }
    }

    #[test]
    fn test_stale_failure_does_not_end_newer_search() {
        let mut flow = SearchFlow::default();
        let old = flow.submit("one", false).unwrap();
        flow.submit("two", false).unwrap();

        assert!(!flow.finish(old.seq, Err(ClientError::validation("nope"))));
        assert!(flow.is_searching());
    }

    #[test]
    fn test_failed_save_can_be_retried() {
        let mut flow = success_with_web();
        let ticket = flow.begin_save(web_hit()).unwrap();
        assert!(flow.begin_save(web_hit()).is_none());

        assert_eq!(flow.finish_save(ticket.seq, "http://x", false), Some(SaveState::Unsaved));
        let retry = flow.begin_save(web_hit()).unwrap();
        assert_eq!(flow.finish_save(retry.seq, "http://x", true), Some(SaveState::Saved));
        assert!(flow.begin_save(web_hit()).is_none());
    }

    #[test]
    fn test_new_search_resets_saved_set() {
        let mut flow = success_with_web();
        let ticket = flow.begin_save(web_hit()).unwrap();
        flow.finish_save(ticket.seq, "http://x", true);

        let next = flow.submit("recursion again", true).unwrap();
        assert_eq!(flow.finish_save(ticket.seq, "http://x", true), None);
        let result = SearchResult { web_results_full: vec![web_hit()], ..Default::default() };
        flow.finish(next.seq, Ok(result));

        match flow.panel() {
            SearchPanel::Result(outcome) => {
                assert!(outcome.saves.saved().is_empty());
                assert_eq!(outcome.saves.state("http://x"), SaveState::Unsaved);
            }
            other => panic!("unexpected panel {:?}", other),
        }
    }

    #[test]
    fn test_save_outside_success_is_refused() {
        let mut flow = SearchFlow::default();
        assert!(flow.begin_save(web_hit()).is_none());
        flow.submit("pending", true).unwrap();
        assert!(flow.begin_save(web_hit()).is_none());
    }

    #[tokio::test]
    async fn test_hybrid_scenario_renders_both_groups() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/search/hybrid"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "answer": "Recursion is a function calling itself.",
                "doc_sources": [{"title": "Intro to Recursion"}],
                "web_sources": [{"title": "X", "url": "http://x"}],
                "web_results_full": [{"title": "X", "url": "http://x", "description": "d"}]
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/search"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = ApiClient::with_config(&ApiConfig {
            base_url: format!("{}/api", server.uri()),
            ..Default::default()
        });

        let mut flow = SearchFlow::default();
        let ticket = flow.submit("recursion", true).unwrap();
        let outcome = run(client, ticket.query.clone()).await;
        assert!(flow.finish(ticket.seq, outcome));

        match flow.panel() {
            SearchPanel::Result(outcome) => {
                assert_eq!(outcome.result.doc_sources.len(), 1);
                assert_eq!(outcome.result.doc_sources[0].title, "Intro to Recursion");
                let web = web_entries(&outcome.result);
                assert_eq!(web.len(), 1);
                assert_eq!(web[0].candidate, Some(web_hit()));
                assert_eq!(outcome.saves.state("http://x"), SaveState::Unsaved);
            }
            other => panic!("unexpected panel {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_document_only_search_uses_plain_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "answer": "See the Nomicon.",
                "sources": [{"title": "Rustonomicon", "url": "https://doc.rust-lang.org/nomicon"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::with_config(&ApiConfig {
            base_url: format!("{}/api", server.uri()),
            ..Default::default()
        });

        let query = Query::new("unsafe", false).unwrap();
        let result = run(client, query).await.unwrap();
        assert_eq!(result.doc_sources[0].title, "Rustonomicon");
        assert!(result.web_sources.is_empty());
    }
}
