//! Chat session service

use std::sync::Arc;

use chat_core::{ConversationId, Direction, Message, MessageId, MessagePatch, NewMessage, Thread};
use chat_state::{ComposerEvent, ComposerState};
use inference_client::ReplyGenerator;
use log::{debug, error, info, warn};
use storage_manager::ChatStore;
use tokio::sync::RwLock;

use crate::error::{Result, SessionError, ValidationError};
use crate::structs::{SendOutcome, ThreadView, ViewState};

/// Chat pane session.
///
/// Owns the view state of the selected conversation and sequences sends and
/// edits against the store and the reply generator. Cloning is cheap and all
/// clones share the same view.
///
/// The view lock is never held across a store or generator call, so a second
/// submission can start while an earlier one is still waiting for its reply.
#[derive(Clone)]
pub struct ChatSession {
    store: Arc<dyn ChatStore>,
    generator: Arc<dyn ReplyGenerator>,
    view: Arc<RwLock<ViewState>>,
}

impl ChatSession {
    pub fn new(store: Arc<dyn ChatStore>, generator: Arc<dyn ReplyGenerator>) -> Self {
        Self {
            store,
            generator,
            view: Arc::new(RwLock::new(ViewState::default())),
        }
    }

    pub fn store(&self) -> Arc<dyn ChatStore> {
        self.store.clone()
    }

    /// Switch the pane to `conversation_id` and load its threads.
    ///
    /// Input, edit marker and cursors are reset. `None` empties the pane.
    pub async fn select_conversation(&self, conversation_id: Option<ConversationId>) -> Result<()> {
        info!("Selecting conversation {:?}", conversation_id);
        self.view.write().await.select(conversation_id);
        if conversation_id.is_some() {
            self.reload().await?;
        }
        Ok(())
    }

    /// Fetch the selected conversation's messages and rebuild the threads.
    ///
    /// The result is dropped if the selection changed while the fetch was
    /// in flight.
    pub async fn reload(&self) -> Result<()> {
        let Some(conversation_id) = self.conversation_id().await else {
            return Ok(());
        };

        let messages = self.store.list_messages(conversation_id).await?;

        let mut view = self.view.write().await;
        if view.conversation_id != Some(conversation_id) {
            debug!("Discarding stale reload for conversation {}", conversation_id);
            return Ok(());
        }
        debug!(
            "Loaded {} messages for conversation {}",
            messages.len(),
            conversation_id
        );
        view.replace_messages(messages);
        Ok(())
    }

    pub async fn conversation_id(&self) -> Option<ConversationId> {
        self.view.read().await.conversation_id
    }

    pub async fn set_input(&self, text: impl Into<String>) {
        self.view.write().await.set_input(text);
    }

    pub async fn input(&self) -> String {
        self.view.read().await.input.clone()
    }

    pub async fn editing_message(&self) -> Option<MessageId> {
        self.view.read().await.editing_message
    }

    pub async fn composer_state(&self) -> ComposerState {
        self.view.read().await.composer_state().clone()
    }

    /// True while any send or edit is waiting on the store or the generator
    pub async fn is_loading(&self) -> bool {
        self.view.read().await.is_loading()
    }

    pub async fn threads(&self) -> Vec<Thread> {
        self.view.read().await.threads.clone()
    }

    pub async fn thread_views(&self) -> Vec<ThreadView> {
        self.view.read().await.thread_views()
    }

    /// Open the version `message_id` for editing and prefill the input with its text.
    pub async fn begin_edit(&self, message_id: MessageId) -> Result<()> {
        let mut view = self.view.write().await;
        let message = view
            .message(message_id)
            .cloned()
            .ok_or(SessionError::MessageNotFound(message_id))?;

        view.composer.handle_event(ComposerEvent::EditStarted {
            original_id: message.edit_target(),
        });
        view.editing_message = Some(message_id);
        view.set_input(message.text);
        Ok(())
    }

    pub async fn cancel_edit(&self) {
        let mut view = self.view.write().await;
        if view.editing_message.take().is_some() {
            view.composer.handle_event(ComposerEvent::EditCancelled);
            view.clear_input();
        }
    }

    /// Step the cursor of `thread_id`. Stepping past either end is a no-op.
    pub async fn advance(&self, thread_id: MessageId, direction: Direction) -> Result<usize> {
        let mut view = self.view.write().await;
        let ViewState {
            threads, cursors, ..
        } = &mut *view;
        let thread = threads
            .iter()
            .find(|t| t.id() == thread_id)
            .ok_or(SessionError::ThreadNotFound(thread_id))?;
        Ok(cursors.advance(thread, direction))
    }

    /// Send the current input, as an edit when a version is open for editing.
    pub async fn submit(&self) -> Result<SendOutcome> {
        let (input, editing) = {
            let view = self.view.read().await;
            (view.input.clone(), view.editing_message)
        };
        match editing {
            Some(message_id) => self.send_edit(message_id, &input).await,
            None => self.send_new(&input).await,
        }
    }

    /// Persist `text` as a new thread and attach a generated reply to it.
    ///
    /// Store and generation failures are logged and leave the outcome
    /// partially filled; only validation errors are returned.
    pub async fn send_new(&self, text: &str) -> Result<SendOutcome> {
        let conversation_id = self.begin_submit(text).await?;
        info!("Sending new message in conversation {}", conversation_id);

        let inserted = self
            .store
            .insert_message(NewMessage::original(conversation_id, text))
            .await;

        let message = match inserted {
            Ok(message) => message,
            Err(e) => {
                error!("Failed to persist message: {}", e);
                self.view.write().await.clear_input();
                self.finish_submit(conversation_id, Some(e.to_string())).await;
                return Ok(SendOutcome::default());
            }
        };

        {
            let mut view = self.view.write().await;
            if view.conversation_id == Some(conversation_id) {
                view.push_message(message.clone());
            }
            view.clear_input();
        }

        let reply = self.generate_reply(conversation_id, &message).await;
        let failure = reply.is_none().then(|| "no reply attached".to_string());
        self.finish_submit(conversation_id, failure).await;

        Ok(SendOutcome {
            message: Some(message),
            reply,
        })
    }

    /// Add `text` as the newest version of the thread containing `message_id`.
    ///
    /// `message_id` may name any version; the edit always branches from the
    /// thread's original. Input and edit marker are cleared whatever the
    /// outcome of the store and generator calls.
    pub async fn send_edit(&self, message_id: MessageId, text: &str) -> Result<SendOutcome> {
        let original_id = {
            let view = self.view.read().await;
            validate(&view, text)?;
            view.message(message_id)
                .map(Message::edit_target)
                .ok_or(SessionError::MessageNotFound(message_id))?
        };
        let conversation_id = self.begin_submit(text).await?;
        info!(
            "Sending edit of message {} in conversation {}",
            original_id, conversation_id
        );

        let outcome = self.persist_edit(conversation_id, original_id, text).await;

        {
            let mut view = self.view.write().await;
            if view.editing_message.take().is_some() {
                view.composer.handle_event(ComposerEvent::EditCancelled);
            }
            view.clear_input();
        }
        let failure = (!outcome.is_complete()).then(|| "edit incomplete".to_string());
        self.finish_submit(conversation_id, failure).await;

        let mut view = self.view.write().await;
        let ViewState {
            threads, cursors, ..
        } = &mut *view;
        if let Some(thread) = threads.iter().find(|t| t.id() == original_id) {
            cursors.focus_latest(thread);
        }

        Ok(outcome)
    }

    async fn persist_edit(
        &self,
        conversation_id: ConversationId,
        original_id: MessageId,
        text: &str,
    ) -> SendOutcome {
        let patch = MessagePatch::mark_edited();
        if let Err(e) = self.store.update_message(original_id, patch.clone()).await {
            error!("Failed to mark message {} as edited: {}", original_id, e);
            return SendOutcome::default();
        }
        self.with_current_view(conversation_id, |view| {
            view.patch_message(original_id, &patch)
        })
        .await;

        let inserted = self
            .store
            .insert_message(NewMessage::successor(conversation_id, original_id, text))
            .await;
        let message = match inserted {
            Ok(message) => message,
            Err(e) => {
                error!("Failed to persist edit of message {}: {}", original_id, e);
                return SendOutcome::default();
            }
        };
        self.with_current_view(conversation_id, |view| view.push_message(message.clone()))
            .await;

        let reply = self.generate_reply(conversation_id, &message).await;
        SendOutcome {
            message: Some(message),
            reply,
        }
    }

    /// Generate a reply for `message` and attach it. Failures are logged.
    async fn generate_reply(
        &self,
        conversation_id: ConversationId,
        message: &Message,
    ) -> Option<String> {
        let reply = match self.generator.generate(&message.text).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Reply generation failed for message {}: {}", message.id, e);
                return None;
            }
        };

        let patch = MessagePatch::response(reply.clone());
        if let Err(e) = self.store.update_message(message.id, patch.clone()).await {
            error!("Failed to persist reply for message {}: {}", message.id, e);
            return None;
        }
        self.with_current_view(conversation_id, |view| view.patch_message(message.id, &patch))
            .await;
        Some(reply)
    }

    async fn begin_submit(&self, text: &str) -> Result<ConversationId> {
        let mut view = self.view.write().await;
        let conversation_id = validate(&view, text)?;
        view.composer.handle_event(ComposerEvent::SubmitStarted);
        view.in_flight += 1;
        Ok(conversation_id)
    }

    async fn finish_submit(&self, conversation_id: ConversationId, failure: Option<String>) {
        {
            let mut view = self.view.write().await;
            view.in_flight = view.in_flight.saturating_sub(1);
            if view.in_flight > 0 {
                if let Some(error) = failure {
                    warn!("Submission finished without a reply: {}", error);
                }
                debug!("{} submission(s) still in flight", view.in_flight);
            } else {
                let event = match failure {
                    Some(error) => ComposerEvent::SubmitFailed { error },
                    None => ComposerEvent::SubmitFinished,
                };
                view.composer.handle_event(event);
                restore_composer(&mut view);
            }
        }

        if self.conversation_id().await != Some(conversation_id) {
            return;
        }
        if let Err(e) = self.reload().await {
            error!("Failed to reload conversation {}: {}", conversation_id, e);
        }
    }

    async fn with_current_view<F>(&self, conversation_id: ConversationId, apply: F)
    where
        F: FnOnce(&mut ViewState),
    {
        let mut view = self.view.write().await;
        if view.conversation_id == Some(conversation_id) {
            apply(&mut view);
        }
    }
}

/// Bring the composer back in line with the edit marker and input once
/// nothing is in flight.
fn restore_composer(view: &mut ViewState) {
    if let Some(message_id) = view.editing_message {
        let original_id = view
            .message(message_id)
            .map(Message::edit_target)
            .unwrap_or(message_id);
        view.composer.handle_event(ComposerEvent::EditStarted { original_id });
    } else if !view.input.is_empty() {
        view.composer.handle_event(ComposerEvent::InputChanged);
    }
}

fn validate(view: &ViewState, text: &str) -> Result<ConversationId> {
    if text.trim().is_empty() {
        return Err(ValidationError::EmptyText.into());
    }
    view.conversation_id
        .ok_or_else(|| ValidationError::NoConversationSelected.into())
}
