use iced::{
    widget::{button, column, container, row, scrollable, text, text_editor},
    Element, Length, Task, Theme, Subscription,
    time,
    keyboard::{self, Key},
    event::{self, Event as IcedEvent},
};
use std::time::{Duration, Instant};

use crate::api::ApiClient;
use crate::config::Config;
use crate::error::Result;
use crate::models::{Ack, IndexedSource, SearchResult, Stats, UploadReceipt, WebResult};
use crate::results::SaveState;
use crate::search::{self, SearchBar, SearchFlow};
use crate::sources::{SourceManager, SourceRequest};
use crate::stats::StatsPanel;
use crate::toast::Toasts;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Search,
    Sources,
}

#[derive(Debug, Clone)]
pub enum Message {
    TabSelected(Tab),
    QueryChanged(String),
    WebToggled(bool),
    SubmitSearch,
    SearchFinished(u64, Result<SearchResult>),
    SaveWebResult(WebResult),
    WebResultSaved(u64, WebResult, Result<Ack>),
    SourcesLoaded(u64, Result<Vec<IndexedSource>>),
    StatsLoaded(Result<Stats>),
    DraftTitleChanged(String),
    DraftUrlChanged(String),
    DraftContentEdited(text_editor::Action),
    SubmitDraft,
    DraftAdded(Result<Ack>),
    DeleteRequested(i64),
    DeleteConfirmed,
    DeleteCancelled,
    SourceDeleted(i64, Result<Ack>),
    UploadPathChanged(String),
    SubmitUpload,
    Uploaded(Result<UploadReceipt>),
    DismissToast(u64),
    Tick,
    Exit,
}

/// Root controller: owns the tab mode and the active search, and turns the
/// requests raised by each panel into tasks.
pub struct App {
    tab: Tab,
    client: ApiClient,
    search_bar: SearchBar,
    search: SearchFlow,
    sources: SourceManager,
    stats: StatsPanel,
    toasts: Toasts,
    loading_frame: usize,
}

impl App {
    pub fn new() -> (Self, Task<Message>) {
        let config = Config::load();
        let client = ApiClient::with_config(&config.api);
        tracing::info!(base_url = client.base_url(), "starting");

        let app = App::with_client(
            client,
            Toasts::new(
                Duration::from_secs(config.notifications.toast_secs),
                config.notifications.desktop,
            ),
        );

        (app, Task::none())
    }

    pub fn with_client(client: ApiClient, toasts: Toasts) -> Self {
        App {
            tab: Tab::Search,
            client,
            search_bar: SearchBar::default(),
            search: SearchFlow::default(),
            sources: SourceManager::default(),
            stats: StatsPanel::default(),
            toasts,
            loading_frame: 0,
        }
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::TabSelected(tab) => {
                self.tab = tab;
                if tab == Tab::Sources {
                    let reload = self.sources.reload();
                    Task::batch([self.dispatch(reload), self.load_stats()])
                } else {
                    Task::none()
                }
            }
            Message::QueryChanged(value) => {
                self.search_bar.text = value;
                Task::none()
            }
            Message::WebToggled(value) => {
                self.search_bar.include_web = value;
                Task::none()
            }
            Message::SubmitSearch => {
                if self.search.is_searching() {
                    return Task::none();
                }
                let bar = &self.search_bar;
                let Some(ticket) = self.search.submit(&bar.text, bar.include_web) else {
                    return Task::none();
                };

                tracing::debug!(
                    seq = ticket.seq,
                    query = ticket.query.text(),
                    include_web = ticket.query.include_web(),
                    "search submitted"
                );
                self.loading_frame = 0;
                let client = self.client.clone();
                let seq = ticket.seq;
                Task::perform(search::run(client, ticket.query), move |outcome| {
                    Message::SearchFinished(seq, outcome)
                })
            }
            Message::SearchFinished(seq, outcome) => {
                self.search.finish(seq, outcome);
                Task::none()
            }
            Message::SaveWebResult(result) => {
                let Some(ticket) = self.search.begin_save(result) else {
                    return Task::none();
                };

                let client = self.client.clone();
                let seq = ticket.seq;
                let result = ticket.result;
                Task::perform(
                    async move {
                        let outcome = client.save_web_result(&result).await;
                        (result, outcome)
                    },
                    move |(result, outcome)| Message::WebResultSaved(seq, result, outcome),
                )
            }
            Message::WebResultSaved(seq, result, outcome) => {
                let applied = self.search.finish_save(seq, &result.url, outcome.is_ok());
                match (applied, outcome) {
                    (Some(SaveState::Saved), Ok(_)) => {
                        self.toasts.info(format!("Saved to knowledge base: {}", result.title));
                    }
                    (Some(_), Err(e)) => {
                        self.toasts.error(format!("Error saving result: {}", e));
                    }
                    _ => {}
                }
                Task::none()
            }
            Message::SourcesLoaded(seq, outcome) => {
                self.sources.sources_loaded(seq, outcome);
                Task::none()
            }
            Message::StatsLoaded(outcome) => {
                self.stats.loaded(outcome);
                Task::none()
            }
            Message::DraftTitleChanged(value) => {
                if !self.sources.is_adding() {
                    self.sources.draft.title = value;
                }
                Task::none()
            }
            Message::DraftUrlChanged(value) => {
                if !self.sources.is_adding() {
                    self.sources.draft.url = value;
                }
                Task::none()
            }
            Message::DraftContentEdited(action) => {
                self.sources.edit_content(action);
                Task::none()
            }
            Message::SubmitDraft => {
                let request = self.sources.submit_draft();
                self.dispatch_maybe(request)
            }
            Message::DraftAdded(outcome) => {
                let request = self.sources.draft_added(outcome, &mut self.toasts);
                self.dispatch_maybe(request)
            }
            Message::DeleteRequested(id) => {
                self.sources.request_delete(id);
                Task::none()
            }
            Message::DeleteConfirmed => {
                let request = self.sources.confirm_delete();
                self.dispatch_maybe(request)
            }
            Message::DeleteCancelled => {
                self.sources.cancel_delete();
                Task::none()
            }
            Message::SourceDeleted(id, outcome) => {
                let request = self.sources.source_deleted(id, outcome, &mut self.toasts);
                self.dispatch_maybe(request)
            }
            Message::UploadPathChanged(value) => {
                if !self.sources.upload.is_uploading() {
                    self.sources.upload.path_input = value;
                }
                Task::none()
            }
            Message::SubmitUpload => {
                let Some(candidate) = self.sources.upload.submit() else {
                    return Task::none();
                };

                tracing::debug!(file = candidate.file_name(), size = candidate.size(), "uploading");
                let client = self.client.clone();
                Task::perform(
                    async move { client.upload_file(&candidate).await },
                    Message::Uploaded,
                )
            }
            Message::Uploaded(outcome) => {
                let request = self.sources.upload_finished(outcome);
                self.dispatch_maybe(request)
            }
            Message::DismissToast(id) => {
                self.toasts.dismiss(id);
                Task::none()
            }
            Message::Tick => {
                if self.search.is_searching() {
                    self.loading_frame = (self.loading_frame + 1) % 80;
                }
                self.toasts.expire(Instant::now());
                Task::none()
            }
            Message::Exit => {
                iced::exit()
            }
        }
    }

    fn dispatch_maybe(&self, request: Option<SourceRequest>) -> Task<Message> {
        match request {
            Some(request) => self.dispatch(request),
            None => Task::none(),
        }
    }

    fn dispatch(&self, request: SourceRequest) -> Task<Message> {
        let client = self.client.clone();
        match request {
            SourceRequest::Reload(seq) => Task::perform(
                async move { client.list_sources().await },
                move |outcome| Message::SourcesLoaded(seq, outcome),
            ),
            SourceRequest::AddDocument(draft) => Task::perform(
                async move { client.add_manual_document(&draft).await },
                Message::DraftAdded,
            ),
            SourceRequest::Delete(id) => Task::perform(
                async move { client.delete_source(id).await },
                move |outcome| Message::SourceDeleted(id, outcome),
            ),
        }
    }

    fn load_stats(&self) -> Task<Message> {
        let client = self.client.clone();
        Task::perform(async move { client.get_stats().await }, Message::StatsLoaded)
    }

    pub fn subscription(&self) -> Subscription<Message> {
        let timer = if self.search.is_searching() || !self.toasts.is_empty() {
            time::every(Duration::from_millis(80)).map(|_| Message::Tick)
        } else {
            Subscription::none()
        };

        let events = event::listen_with(|event, _status, _id| {
            if let IcedEvent::Keyboard(keyboard::Event::KeyPressed {
                key: Key::Named(keyboard::key::Named::Escape),
                ..
            }) = event
            {
                Some(Message::Exit)
            } else {
                None
            }
        });

        Subscription::batch([timer, events])
    }

    pub fn view(&self) -> Element<Message> {
        let header = column![
            text("🧠 DevFlow").size(28),
            text("Your Personal Coding Knowledge Base").size(15),
        ]
        .spacing(4);

        let tabs = row![
            tab_button("🔍 Search", Tab::Search, self.tab),
            tab_button("📚 Sources", Tab::Sources, self.tab),
        ]
        .spacing(10);

        let body: Element<Message> = match self.tab {
            Tab::Search => column![
                self.search_bar.view(self.search.is_searching()),
                self.search.view(self.loading_frame / 8),
            ]
            .spacing(15)
            .into(),
            Tab::Sources => column![self.stats.view(), self.sources.view()]
                .spacing(25)
                .into(),
        };

        let content = column![
            header,
            tabs,
            scrollable(container(body).padding(10).width(Length::Fill)).height(Length::Fill),
            self.toasts.view(),
        ]
        .spacing(15)
        .padding(15);

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    pub fn theme(&self) -> Theme {
        Theme::TokyoNight
    }
}

fn tab_button(label: &'static str, tab: Tab, active: Tab) -> Element<'static, Message> {
    let style = if tab == active { button::primary } else { button::secondary };
    button(text(label))
        .on_press(Message::TabSelected(tab))
        .style(style)
        .padding(10)
        .into()
}
