//! Session data structures

use chat_core::{
    reconstruct, ConversationId, Message, MessageId, MessagePatch, Thread, ThreadCursors,
};
use chat_state::{ComposerEvent, ComposerState, StateMachine};
use serde::Serialize;

/// Everything the chat pane shows, rebuilt from the store after each mutation.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    /// Conversation selected in the directory
    pub conversation_id: Option<ConversationId>,

    /// Contents of the input field
    pub input: String,

    /// Id of the version currently open for editing
    pub editing_message: Option<MessageId>,

    pub composer: StateMachine,

    /// Flat message list as last loaded, ordered by `created_at`
    pub messages: Vec<Message>,

    /// Threads rebuilt from `messages`
    pub threads: Vec<Thread>,

    pub cursors: ThreadCursors,

    /// Number of sends/edits still awaiting the store or the generator
    pub in_flight: usize,
}

impl ViewState {
    /// Switch conversations, dropping everything tied to the previous one
    pub fn select(&mut self, conversation_id: Option<ConversationId>) {
        self.conversation_id = conversation_id;
        self.input.clear();
        self.editing_message = None;
        self.composer = StateMachine::new();
        self.messages.clear();
        self.threads.clear();
        self.cursors.clear();
    }

    /// Replace the flat message list and rebuild threads
    pub fn replace_messages(&mut self, messages: Vec<Message>) {
        self.messages = messages;
        self.rebuild_threads();
    }

    pub fn push_message(&mut self, message: Message) {
        self.messages.push(message);
        self.rebuild_threads();
    }

    pub fn patch_message(&mut self, id: MessageId, patch: &MessagePatch) {
        if let Some(message) = self.messages.iter_mut().find(|m| m.id == id) {
            message.apply(patch);
            self.rebuild_threads();
        }
    }

    fn rebuild_threads(&mut self) {
        self.threads = reconstruct(&self.messages);
        self.cursors.retain(&self.threads);
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
        let event = if self.input.is_empty() {
            ComposerEvent::InputCleared
        } else {
            ComposerEvent::InputChanged
        };
        self.composer.handle_event(event);
    }

    pub fn clear_input(&mut self) {
        self.set_input(String::new());
    }

    /// Loaded message with `id`, if any
    pub fn message(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn composer_state(&self) -> &ComposerState {
        self.composer.state()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    /// One display unit per thread, in thread order
    pub fn thread_views(&self) -> Vec<ThreadView> {
        self.threads
            .iter()
            .map(|thread| ThreadView::new(thread, self.cursors.get(thread), self.editing_message))
            .collect()
    }
}

/// What the chat pane renders for one thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThreadView {
    /// Id of the thread's original message
    pub thread_id: MessageId,

    /// Id of the version on screen
    pub message_id: MessageId,

    pub text: String,
    pub response: Option<String>,

    /// `(cursor + 1, version count)` for threads with versions
    pub position: Option<(usize, usize)>,

    pub can_prev: bool,
    pub can_next: bool,

    /// The displayed version is open in the editor
    pub is_editing: bool,
}

impl ThreadView {
    pub fn new(thread: &Thread, cursor: usize, editing: Option<MessageId>) -> Self {
        let shown = thread.displayed(cursor);
        let count = thread.version_count();
        let position = thread.has_versions().then_some((cursor + 1, count));

        Self {
            thread_id: thread.id(),
            message_id: shown.id,
            text: shown.text.clone(),
            response: shown.response.clone(),
            position,
            can_prev: thread.has_versions() && cursor > 0,
            can_next: cursor + 1 < count,
            is_editing: editing == Some(shown.id),
        }
    }
}

/// Result of a send or edit that passed validation.
///
/// Store and generation failures are logged rather than returned, so a
/// submission can complete partially.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendOutcome {
    /// The persisted user message, `None` when the insert failed
    pub message: Option<Message>,

    /// The generated reply, `None` when generation or persisting it failed
    pub reply: Option<String>,
}

impl SendOutcome {
    pub fn is_complete(&self) -> bool {
        self.message.is_some() && self.reply.is_some()
    }
}
