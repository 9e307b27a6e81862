use iced::widget::{button, column, container, horizontal_rule, row, text, text_editor, text_input};
use iced::{alignment, Color, Element, Length};

use crate::app::Message;
use crate::error::Result;
use crate::models::{Ack, IndexedSource, ManualDocumentDraft, UploadReceipt};
use crate::toast::Toasts;
use crate::upload::UploadPanel;

/// Network work the source manager asks the controller to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceRequest {
    /// Fetch the list, tagged so only the newest fetch is applied.
    Reload(u64),
    AddDocument(ManualDocumentDraft),
    Delete(i64),
}

/// Indexed-source list plus the forms that mutate it.
///
/// The list is only ever replaced by a fresh fetch: every successful
/// mutation answers with `SourceRequest::Reload`.
pub struct SourceManager {
    sources: Vec<IndexedSource>,
    latest_reload: u64,
    load_error: Option<String>,
    pub draft: ManualDocumentDraft,
    pub editor: text_editor::Content,
    adding: bool,
    draft_error: Option<String>,
    pending_delete: Option<i64>,
    pub upload: UploadPanel,
}

impl Default for SourceManager {
    fn default() -> Self {
        SourceManager {
            sources: Vec::new(),
            latest_reload: 0,
            load_error: None,
            draft: ManualDocumentDraft::default(),
            editor: text_editor::Content::new(),
            adding: false,
            draft_error: None,
            pending_delete: None,
            upload: UploadPanel::default(),
        }
    }
}

impl SourceManager {
    pub fn sources(&self) -> &[IndexedSource] {
        &self.sources
    }

    pub fn is_adding(&self) -> bool {
        self.adding
    }

    pub fn pending_delete(&self) -> Option<i64> {
        self.pending_delete
    }

    /// Starts a new list fetch. Any fetch still in flight becomes stale.
    pub fn reload(&mut self) -> SourceRequest {
        self.latest_reload += 1;
        SourceRequest::Reload(self.latest_reload)
    }

    /// Applies a fetched list. Returns false for a superseded fetch.
    pub fn sources_loaded(&mut self, seq: u64, outcome: Result<Vec<IndexedSource>>) -> bool {
        if seq != self.latest_reload {
            tracing::debug!(seq, latest = self.latest_reload, "dropping stale source list");
            return false;
        }

        match outcome {
            Ok(sources) => {
                self.sources = sources;
                self.load_error = None;
            }
            Err(e) => {
                tracing::warn!("Error loading sources: {}", e);
                self.load_error = Some(format!("Could not load sources: {}", e));
            }
        }
        true
    }

    pub fn edit_content(&mut self, action: text_editor::Action) {
        if self.adding {
            return;
        }
        self.editor.perform(action);
        self.draft.content = editor_text(self.editor.text());
    }

    pub fn submit_draft(&mut self) -> Option<SourceRequest> {
        if self.adding {
            return None;
        }
        if self.draft.title.trim().is_empty() || self.draft.content.trim().is_empty() {
            self.draft_error = Some("Title and content are required".to_string());
            return None;
        }

        self.adding = true;
        self.draft_error = None;
        Some(SourceRequest::AddDocument(self.draft.clone()))
    }

    pub fn draft_added(
        &mut self,
        outcome: Result<Ack>,
        toasts: &mut Toasts,
    ) -> Option<SourceRequest> {
        self.adding = false;
        match outcome {
            Ok(ack) => {
                tracing::debug!(
                    source_id = ?ack.source_id,
                    message = ?ack.message,
                    "document added"
                );
                toasts.info("Document added successfully!");
                self.draft = ManualDocumentDraft::default();
                self.editor = text_editor::Content::new();
                Some(self.reload())
            }
            Err(e) => {
                toasts.error(format!("Error adding source: {}", e));
                None
            }
        }
    }

    /// First step of deletion; nothing is sent until confirmed.
    pub fn request_delete(&mut self, id: i64) {
        self.pending_delete = Some(id);
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    pub fn confirm_delete(&mut self) -> Option<SourceRequest> {
        self.pending_delete.take().map(SourceRequest::Delete)
    }

    pub fn source_deleted(
        &mut self,
        id: i64,
        outcome: Result<Ack>,
        toasts: &mut Toasts,
    ) -> Option<SourceRequest> {
        match outcome {
            Ok(ack) => {
                tracing::debug!(
                    id,
                    success = ack.success,
                    message = ?ack.message,
                    "source deleted"
                );
                toasts.info("Source deleted!");
                Some(self.reload())
            }
            Err(e) => {
                toasts.error(format!("Error deleting: {}", e));
                None
            }
        }
    }

    pub fn upload_finished(&mut self, outcome: Result<UploadReceipt>) -> Option<SourceRequest> {
        if self.upload.finish(outcome) {
            Some(self.reload())
        } else {
            None
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        column![
            self.upload.view(),
            horizontal_rule(2),
            self.draft_form(),
            self.source_list(),
        ]
        .spacing(25)
        .into()
    }

    fn draft_form(&self) -> Element<'_, Message> {
        let mut title = text_input("Document title", &self.draft.title).padding(10);
        let mut url = text_input("https://example.com", &self.draft.url).padding(10);
        let mut content = text_editor(&self.editor)
            .placeholder("Paste your content here...")
            .height(Length::Fixed(140.0));
        let label = if self.is_adding() { "Adding..." } else { "+ Add Document" };
        let mut add = button(text(label)).padding(10);

        if !self.is_adding() {
            title = title.on_input(Message::DraftTitleChanged);
            url = url.on_input(Message::DraftUrlChanged);
            content = content.on_action(Message::DraftContentEdited);
            add = add.on_press(Message::SubmitDraft);
        }

        let mut form = column![
            text("Or Add Manually").size(20),
            text("Title"),
            title,
            text("Content"),
            content,
            text("URL (optional)"),
            url,
            add,
        ]
        .spacing(8);

        if let Some(error) = &self.draft_error {
            form = form.push(text(error.as_str()).color(Color::from_rgb(0.97, 0.44, 0.44)));
        }

        form.into()
    }

    fn source_list(&self) -> Element<'_, Message> {
        let sources = self.sources();
        let heading = text(format!("Your Sources ({})", sources.len())).size(20);
        let mut list = column![heading].spacing(10);

        if let Some(error) = &self.load_error {
            list = list.push(text(error.as_str()).color(Color::from_rgb(0.97, 0.44, 0.44)));
        }

        if sources.is_empty() {
            return list
                .push(text("No sources yet. Upload a file or add a document above!"))
                .into();
        }

        for source in sources {
            let info = column![
                text(source.display_name()).size(16),
                text(format!("[{}] {} documents", source.status, source.doc_count)).size(13),
            ]
            .spacing(4);

            let actions: Element<Message> = if self.pending_delete() == Some(source.id) {
                row![
                    text("Delete this source?").size(14),
                    button(text("Confirm")).on_press(Message::DeleteConfirmed).padding(8),
                    button(text("Cancel")).on_press(Message::DeleteCancelled).padding(8),
                ]
                .spacing(8)
                .align_y(alignment::Vertical::Center)
                .into()
            } else {
                button(text("Delete"))
                    .on_press(Message::DeleteRequested(source.id))
                    .style(button::danger)
                    .padding(8)
                    .into()
            };

            list = list.push(
                container(
                    row![container(info).width(Length::Fill), actions]
                        .spacing(10)
                        .align_y(alignment::Vertical::Center),
                )
                .padding(10),
            );
        }

        list.into()
    }
}

/// `text_editor::Content::text` always ends with a line break; the draft
/// holds exactly what was typed.
fn editor_text(mut text: String) -> String {
    if text.ends_with('\n') {
        text.pop();
    }
    text
}
