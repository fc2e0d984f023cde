//! Thread - an original message and its edited successors
//!
//! Threads are derived data: they are rebuilt from scratch on every load and
//! never persisted.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::message::{Message, MessageId};

/// One logical turn of the conversation together with its edit history.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Thread {
    /// The first message of the group (`parent_message_id` is `None`)
    pub original: Message,

    /// All versions, oldest first. Empty when the original was never edited.
    ///
    /// When non-empty, entry 0 is a copy of `original` whose
    /// `parent_message_id` points at itself.
    pub versions: Vec<Message>,
}

impl Thread {
    /// Identity of the thread: the id of its original message
    pub fn id(&self) -> MessageId {
        self.original.id
    }

    pub fn has_versions(&self) -> bool {
        !self.versions.is_empty()
    }

    pub fn version_count(&self) -> usize {
        self.versions.len()
    }

    /// Index of the newest version, if the thread has any
    pub fn latest_index(&self) -> Option<usize> {
        self.versions.len().checked_sub(1)
    }

    /// Message shown for `cursor`; the original when there are no versions.
    /// Out-of-range cursors are clamped to the newest version.
    pub fn displayed(&self, cursor: usize) -> &Message {
        match self.latest_index() {
            Some(last) => &self.versions[cursor.min(last)],
            None => &self.original,
        }
    }

    /// True when `message_id` is the original or one of the versions
    pub fn contains(&self, message_id: MessageId) -> bool {
        self.original.id == message_id || self.versions.iter().any(|m| m.id == message_id)
    }
}

/// Rebuild threads from a conversation's messages.
///
/// `messages` must be ordered by `created_at` ascending. Threads come out in
/// the order of their original messages; successors keep their input order
/// inside `versions`. An original flagged `edited` without any successor still
/// yields a one-entry `versions` list.
pub fn reconstruct(messages: &[Message]) -> Vec<Thread> {
    let mut successors: HashMap<MessageId, Vec<&Message>> = HashMap::new();
    for message in messages {
        if let Some(parent_id) = message.parent_message_id {
            successors.entry(parent_id).or_default().push(message);
        }
    }

    let threads: Vec<Thread> = messages
        .iter()
        .filter_map(|message| {
            if message.edited {
                let children = successors.get(&message.id).map(Vec::as_slice).unwrap_or(&[]);

                let mut first_version = message.clone();
                first_version.parent_message_id = Some(message.id);

                let mut versions = Vec::with_capacity(children.len() + 1);
                versions.push(first_version);
                versions.extend(children.iter().map(|child| (*child).clone()));

                Some(Thread {
                    original: message.clone(),
                    versions,
                })
            } else if message.parent_message_id.is_none() {
                Some(Thread {
                    original: message.clone(),
                    versions: Vec::new(),
                })
            } else {
                None
            }
        })
        .collect();

    let edited: HashSet<MessageId> = messages.iter().filter(|m| m.edited).map(|m| m.id).collect();
    let orphaned = successors
        .iter()
        .filter(|(parent_id, _)| !edited.contains(*parent_id))
        .map(|(_, children)| children.len())
        .sum::<usize>();
    if orphaned > 0 {
        log::debug!(
            "{} successor message(s) reference a parent that is not an edited message; they are not displayed",
            orphaned
        );
    }

    threads
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use uuid::Uuid;

    struct Fixture {
        conversation_id: Uuid,
        clock: i64,
        messages: Vec<Message>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                conversation_id: Uuid::new_v4(),
                clock: 0,
                messages: Vec::new(),
            }
        }

        fn push(&mut self, text: &str, parent: Option<Uuid>, edited: bool) -> Message {
            self.clock += 1;
            let message = Message {
                id: Uuid::new_v4(),
                conversation_id: self.conversation_id,
                text: text.to_string(),
                response: None,
                parent_message_id: parent,
                edited,
                created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
                    + Duration::seconds(self.clock),
            };
            self.messages.push(message.clone());
            message
        }
    }

    #[test]
    fn test_unedited_messages_yield_one_thread_each() {
        let mut fx = Fixture::new();
        let a = fx.push("a", None, false);
        let b = fx.push("b", None, false);
        let c = fx.push("c", None, false);

        let threads = reconstruct(&fx.messages);

        assert_eq!(threads.len(), 3);
        assert!(threads.iter().all(|t| t.versions.is_empty()));
        let ids: Vec<_> = threads.iter().map(Thread::id).collect();
        assert_eq!(ids, vec![a.id, b.id, c.id]);
    }

    #[test]
    fn test_edited_message_groups_successors() {
        let mut fx = Fixture::new();
        let a = fx.push("A", None, false);
        let b = fx.push("B", None, true);
        let c = fx.push("C", Some(b.id), false);

        let threads = reconstruct(&fx.messages);

        assert_eq!(threads.len(), 2);
        assert_eq!(threads[0].original, a);
        assert!(threads[0].versions.is_empty());

        assert_eq!(threads[1].original, b);
        assert_eq!(threads[1].versions.len(), 2);
        let first = &threads[1].versions[0];
        assert_eq!(first.id, b.id);
        assert_eq!(first.text, "B");
        assert_eq!(first.parent_message_id, Some(b.id));
        assert_eq!(threads[1].versions[1], c);
    }

    #[test]
    fn test_version_count_is_successors_plus_one() {
        let mut fx = Fixture::new();
        let root = fx.push("v1", None, true);
        fx.push("unrelated", None, false);
        for text in ["v2", "v3", "v4"] {
            fx.push(text, Some(root.id), false);
        }

        let threads = reconstruct(&fx.messages);
        let thread = threads.iter().find(|t| t.id() == root.id).unwrap();

        assert_eq!(thread.version_count(), 4);
        assert_eq!(thread.versions[0].id, root.id);
        let texts: Vec<_> = thread.versions.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["v1", "v2", "v3", "v4"]);
    }

    #[test]
    fn test_edited_without_successors_keeps_single_version() {
        let mut fx = Fixture::new();
        let lonely = fx.push("only", None, true);

        let threads = reconstruct(&fx.messages);

        assert_eq!(threads.len(), 1);
        assert!(threads[0].has_versions());
        assert_eq!(threads[0].versions.len(), 1);
        assert_eq!(threads[0].versions[0].parent_message_id, Some(lonely.id));
    }

    #[test]
    fn test_successor_of_unedited_parent_is_not_displayed() {
        let mut fx = Fixture::new();
        let parent = fx.push("parent", None, false);
        fx.push("stray", Some(parent.id), false);

        let threads = reconstruct(&fx.messages);

        assert_eq!(threads.len(), 1);
        assert!(threads[0].versions.is_empty());
    }

    #[test]
    fn test_interleaved_threads_keep_original_order() {
        let mut fx = Fixture::new();
        let first = fx.push("first", None, true);
        let second = fx.push("second", None, true);
        let second_edit = fx.push("second v2", Some(second.id), false);
        let first_edit = fx.push("first v2", Some(first.id), false);

        let threads = reconstruct(&fx.messages);

        assert_eq!(threads.len(), 2);
        assert_eq!(threads[0].id(), first.id);
        assert_eq!(threads[0].versions[1], first_edit);
        assert_eq!(threads[1].id(), second.id);
        assert_eq!(threads[1].versions[1], second_edit);
    }

    #[test]
    fn test_displayed_clamps_cursor() {
        let mut fx = Fixture::new();
        let root = fx.push("v1", None, true);
        fx.push("v2", Some(root.id), false);
        let plain = fx.push("plain", None, false);

        let threads = reconstruct(&fx.messages);

        assert_eq!(threads[0].displayed(0).text, "v1");
        assert_eq!(threads[0].displayed(1).text, "v2");
        assert_eq!(threads[0].displayed(9).text, "v2");
        assert_eq!(threads[1].displayed(3).id, plain.id);
    }

    #[test]
    fn test_empty_input() {
        assert!(reconstruct(&[]).is_empty());
    }
}
