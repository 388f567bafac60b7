//! The editor session: two buffers, one conversation, one revision manager.

use crate::command::EditCommand;
use crate::search::{SearchState, find_hits};
use crate::state::{BufferView, InputMode, SessionSnapshot, StatusMessage};
use aivi_core::buffer::{
    BufferId, Clipboard, Direction, PreExchangeSnapshot, TextBuffer, split_lines,
};
use aivi_core::config::AiviConfig;
use aivi_core::context::ConversationContext;
use aivi_core::merge::{DEFAULT_COMMENT_PREFIX, MarkerContext, merge_response};
use aivi_core::viewpoint::ViewpointRegistry;
use aivi_core::Result;
use aivi_infrastructure::revision::{ReadStatus, StepDirection, TranscriptAction};
use aivi_infrastructure::RevisionManager;
use aivi_interaction::{ChatCompletion, CompletionGateway};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Applies [`EditCommand`]s and runs AI exchanges.
///
/// The session exclusively owns both buffers, the conversation context, the
/// mode, the status and the two line slots. Every command returns a
/// [`SessionSnapshot`]; nothing a command does is fatal to the edit loop.
pub struct EditorSession {
    edit: TextBuffer,
    command: TextBuffer,
    active: BufferId,
    registry: ViewpointRegistry,
    context: ConversationContext,
    gateway: CompletionGateway,
    revisions: RevisionManager,
    mode: InputMode,
    status: StatusMessage,
    clipboard: Clipboard,
    pre_exchange: PreExchangeSnapshot,
    marked: BTreeSet<usize>,
    search: SearchState,
    comment_prefix: String,
}

impl EditorSession {
    pub fn new(
        registry: ViewpointRegistry,
        gateway: CompletionGateway,
        revisions: RevisionManager,
    ) -> Self {
        let context = ConversationContext::for_viewpoint(registry.current());
        Self {
            edit: TextBuffer::new(),
            command: TextBuffer::new(),
            active: BufferId::Edit,
            registry,
            context,
            gateway,
            revisions,
            mode: InputMode::Edit,
            status: StatusMessage::default(),
            clipboard: Clipboard::new(),
            pre_exchange: PreExchangeSnapshot::new(),
            marked: BTreeSet::new(),
            search: SearchState::default(),
            comment_prefix: DEFAULT_COMMENT_PREFIX.to_string(),
        }
    }

    /// Builds a session for `path` from the user configuration and loads the
    /// file if it exists.
    pub fn open(
        config: &AiviConfig,
        path: impl AsRef<Path>,
        client: Arc<dyn ChatCompletion>,
    ) -> Result<Self> {
        let registry = ViewpointRegistry::new(config.viewpoints_or_presets())?;
        let revisions = RevisionManager::open(path);
        let mut session = Self::new(registry, CompletionGateway::new(client), revisions)
            .with_comment_prefix(config.comment_prefix.clone());
        session.load();
        info!(
            "[Session] Opened {:?} with viewpoint {}",
            session.revisions.canonical_path(),
            session.registry.current().name
        );
        Ok(session)
    }

    pub fn with_comment_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.comment_prefix = prefix.into();
        self
    }

    /// Applies one command and returns the resulting state.
    pub async fn apply(&mut self, command: EditCommand) -> SessionSnapshot {
        debug!("[Session] {:?}", command);
        match command {
            EditCommand::InsertChar(ch) => {
                self.active_buffer_mut().insert_char(ch);
                self.mode = InputMode::Edit;
            }
            EditCommand::DeleteChar => {
                self.active_buffer_mut().backspace();
            }
            EditCommand::Newline => {
                let head = self.active_buffer_mut().split_line();
                self.context.push_pending(head);
            }
            EditCommand::Move(direction) => {
                self.active_buffer_mut().move_cursor(direction);
            }
            EditCommand::SwitchBuffer => self.active = self.active.other(),
            EditCommand::TriggerExchange => self.exchange().await,
            EditCommand::AdvanceViewpoint => self.advance_viewpoint(),
            EditCommand::SelectViewpoint(name) => self.select_viewpoint(&name),
            EditCommand::Save => self.save(),
            EditCommand::Load => self.load(),
            EditCommand::StepSubrevision(direction) => self.step_subrevision(direction),
            EditCommand::ToggleCompare => self.toggle_compare(),
            EditCommand::DeleteLine => {
                let line = self.active_buffer_mut().delete_line();
                self.clipboard.yank(vec![line]);
            }
            EditCommand::MarkLine => self.mark_current(),
            EditCommand::MarkAndAdvance => {
                self.mark_current();
                self.active_buffer_mut().move_cursor(Direction::Down);
            }
            EditCommand::YankMarked => self.yank_marked(),
            EditCommand::Paste => self.paste(),
            EditCommand::Search => self.start_search(),
            EditCommand::SearchNext => {
                let hit = self.search.next();
                self.jump_to(hit);
            }
            EditCommand::SearchPrev => {
                let hit = self.search.prev();
                self.jump_to(hit);
            }
        }
        self.snapshot()
    }

    /// Current state, taking the pending status.
    pub fn snapshot(&mut self) -> SessionSnapshot {
        SessionSnapshot {
            active: self.active,
            edit: BufferView::from(&self.edit),
            command: BufferView::from(&self.command),
            mode: self.mode,
            viewpoint: self.registry.current().name.clone(),
            rev: self.revisions.rev(),
            subrevision: self.revisions.subrevision_pointer(),
            status: self.status.take(),
            marked: self.marked.iter().copied().collect(),
        }
    }

    pub fn edit_buffer(&self) -> &TextBuffer {
        &self.edit
    }

    pub fn command_buffer(&self) -> &TextBuffer {
        &self.command
    }

    pub fn context(&self) -> &ConversationContext {
        &self.context
    }

    pub fn registry(&self) -> &ViewpointRegistry {
        &self.registry
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    fn buffer_mut(&mut self, id: BufferId) -> &mut TextBuffer {
        match id {
            BufferId::Edit => &mut self.edit,
            BufferId::Command => &mut self.command,
        }
    }

    fn active_buffer_mut(&mut self) -> &mut TextBuffer {
        self.buffer_mut(self.active)
    }

    fn advance_viewpoint(&mut self) {
        let name = self.registry.advance().to_string();
        self.context.reset(self.registry.current());
        info!("[Session] Viewpoint -> {}", name);
        self.status.set(name);
    }

    fn select_viewpoint(&mut self, name: &str) {
        match self.registry.select(name) {
            Ok(viewpoint) => {
                self.context.reset(viewpoint);
                info!("[Session] Viewpoint -> {}", name);
                self.status.set(name);
            }
            Err(e) => {
                warn!("[Session] {}", e);
                self.status.set("no vp");
            }
        }
    }

    fn save(&mut self) {
        let status = self.revisions.write(
            self.edit.lines(),
            self.command.lines(),
            &self.registry.current().name,
        );
        self.status.set(status.code());
    }

    /// Reads the canonical file into the edit buffer. Anything but a clean
    /// read leaves both buffers as they were.
    fn load(&mut self) {
        let outcome = self.revisions.read();
        if outcome.status == ReadStatus::Read {
            self.edit = TextBuffer::from_lines(outcome.lines);
            self.command = TextBuffer::new();
            self.active = BufferId::Edit;
            self.mode = InputMode::Edit;
        }
        self.status.set(outcome.status.code());
    }

    fn step_subrevision(&mut self, direction: StepDirection) {
        match self.revisions.step_subrevision(direction) {
            Some(lines) => {
                self.edit.set_lines(lines);
                self.status
                    .set(format!("s{:<4}", self.revisions.subrevision_pointer()));
            }
            None => self.status.set("no sr"),
        }
    }

    /// Swaps the destination buffer with the pre-exchange snapshot.
    fn toggle_compare(&mut self) {
        let flipped = match self.mode {
            InputMode::Reply => InputMode::Undo,
            InputMode::Undo => InputMode::Reply,
            _ => {
                self.status.set("no rp");
                return;
            }
        };
        let Some(id) = self.pre_exchange.buffer() else {
            self.status.set("no rp");
            return;
        };
        let current = self.buffer_mut(id).lines().to_vec();
        if let Some(stored) = self.pre_exchange.swap(current) {
            self.buffer_mut(id).set_lines(stored);
            self.mode = flipped;
        }
    }

    fn mark_current(&mut self) {
        if self.mode != InputMode::Mark {
            self.marked.clear();
            self.mode = InputMode::Mark;
        }
        let line = self.active_buffer_mut().cursor().line;
        self.marked.insert(line);
    }

    fn yank_marked(&mut self) {
        if self.mode != InputMode::Mark || self.marked.is_empty() {
            return;
        }
        let marked = std::mem::take(&mut self.marked);
        let buffer = self.active_buffer_mut();
        let lines: Vec<String> = marked
            .into_iter()
            .filter_map(|index| buffer.line(index).map(str::to_string))
            .collect();
        self.status.set(format!("y{:<4}", lines.len()));
        self.clipboard.yank(lines);
        self.mode = InputMode::Edit;
    }

    /// Inserts the clipboard above the cursor line; the cursor stays on the
    /// same text.
    fn paste(&mut self) {
        if self.clipboard.is_empty() {
            return;
        }
        let lines = self.clipboard.lines().to_vec();
        let buffer = self.buffer_mut(self.active);
        let cursor = buffer.cursor();
        buffer.insert_lines(cursor.line, &lines);
        buffer.set_cursor(cursor.line + lines.len(), cursor.col);
    }

    fn start_search(&mut self) {
        let term = self.command.lines().join("\n").trim().to_string();
        if term.is_empty() {
            self.status.set("no tm");
            return;
        }
        let hits = find_hits(self.edit.lines(), &term);
        let first = self.search.start(hits);
        if first.is_none() {
            self.status.set("not f");
            return;
        }
        self.status.set(format!("found {}", self.search.len()));
        self.jump_to(first);
    }

    fn jump_to(&mut self, hit: Option<aivi_core::buffer::Position>) {
        match hit {
            Some(position) => {
                self.active = BufferId::Edit;
                self.edit.set_cursor(position.line, position.col);
            }
            None => self.status.set("not f"),
        }
    }

    /// Runs one AI exchange with the current viewpoint.
    ///
    /// The context is rebuilt in a scratch copy and only committed once the
    /// reply has been merged, so a failed call changes nothing but the
    /// status.
    async fn exchange(&mut self) {
        let viewpoint = self.registry.current().clone();
        let mut scratch = self.context.clone();
        scratch.reset(&viewpoint);

        let command_text = self.command.non_blank_text();
        let mut query_lines = split_nonblank(&command_text);
        match self.active {
            BufferId::Command => {
                if !command_text.is_empty() {
                    scratch.append_user(command_text);
                }
            }
            BufferId::Edit => {
                let edit_text = self.edit.non_blank_text();
                query_lines.extend(split_nonblank(&edit_text));
                if !command_text.is_empty() {
                    scratch.append_system(command_text);
                }
                if !edit_text.is_empty() {
                    scratch.append_user(edit_text);
                }
            }
        }
        self.revisions
            .append_transcript(TranscriptAction::Query, &viewpoint.name, &query_lines);
        self.revisions.save_context(&scratch.to_document(&viewpoint));

        let reply = match self.gateway.query(&viewpoint, &mut scratch).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("[Session] Exchange with {} failed: {}", viewpoint.name, e);
                self.status.set("ai er");
                return;
            }
        };

        let destination = self.active;
        let before = self.buffer_mut(destination).lines().to_vec();
        self.pre_exchange.store(destination, before);
        if !self.revisions.has_original() {
            self.revisions.record_original(self.edit.lines());
        }

        let next_subrev = self.revisions.subrevision_count() + 1;
        let markers = MarkerContext::new(
            viewpoint.name.as_str(),
            self.revisions.rev(),
            u32::try_from(next_subrev).unwrap_or(u32::MAX),
        )
        .with_comment_prefix(self.comment_prefix.as_str());
        let outcome = merge_response(
            &reply,
            &viewpoint.text_ops,
            self.buffer_mut(destination),
            &markers,
        );

        self.revisions
            .append_transcript(TranscriptAction::Reply, &viewpoint.name, &split_lines(&reply));
        let document = scratch.to_document(&viewpoint);
        self.revisions.save_context(&document);
        self.revisions
            .store_subrevision(self.edit.lines(), &document, &outcome.strategy.to_string());

        if outcome.fell_back {
            self.status.set("no cd");
        }
        info!(
            "[Session] {} reply merged by {} ({} of {} objects matched)",
            viewpoint.name, outcome.strategy, outcome.matched, outcome.objects
        );
        self.mode = InputMode::Reply;
        self.context = scratch;
    }
}

fn split_nonblank(text: &str) -> Vec<String> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}
