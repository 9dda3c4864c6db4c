use std::collections::HashSet;

use log::{debug, info, warn};

use crate::api::events::ListSignal;
use crate::api::models::Conversation;

const NEW_TITLE: &str = "New Conversation";
const NEW_PREVIEW: &str = "Start chatting with Gemini";
const NEW_ACTIVITY: &str = "Just now";

/// Dashboard state: conversations newest first, the search query and a
/// conversation waiting on delete confirmation.
#[derive(Debug, Clone, Default)]
pub struct ConversationList {
    items: Vec<Conversation>,
    query: String,
    pending_delete: Option<String>,
}

impl ConversationList {
    /// Seed the list. Later duplicates of an id are dropped.
    pub fn new(seed: Vec<Conversation>) -> Self {
        let mut seen = HashSet::new();
        let items = seed
            .into_iter()
            .filter(|c| {
                let fresh = seen.insert(c.id.clone());
                if !fresh {
                    warn!("conversations: duplicate id {} dropped from seed", c.id);
                }
                fresh
            })
            .collect();
        Self { items, ..Self::default() }
    }

    pub fn with_samples() -> Self {
        Self::new(sample_conversations())
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Conversation> {
        self.items.iter().find(|c| c.id == id)
    }

    pub fn search_query(&self) -> &str {
        &self.query
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Conversations matching the query, in display order. Clone the
    /// iterator to walk the view again.
    pub fn filtered(&self) -> FilteredView<'_> {
        FilteredView {
            inner: self.items.iter(),
            needle: self.query.to_lowercase(),
        }
    }

    /// "3 conversations", counted over the filtered view.
    pub fn summary(&self) -> String {
        let n = self.filtered().count();
        format!("{n} conversation{}", if n == 1 { "" } else { "s" })
    }

    pub fn create_conversation(&mut self) -> ListSignal {
        let id = self.fresh_id();
        self.items.insert(
            0,
            Conversation::new(id.clone(), NEW_TITLE, NEW_PREVIEW, NEW_ACTIVITY),
        );
        info!("conversations: created {id}");
        ListSignal::Created { id }
    }

    /// Mark `id` for deletion. Returns false, changing nothing, when the id
    /// is not in the list.
    pub fn request_delete(&mut self, id: &str) -> bool {
        if self.get(id).is_none() {
            debug!("conversations: delete requested for missing {id}");
            return false;
        }
        self.pending_delete = Some(id.to_string());
        true
    }

    pub fn pending_delete(&self) -> Option<&Conversation> {
        self.pending_delete.as_deref().and_then(|id| self.get(id))
    }

    pub fn confirm_delete(&mut self) -> Option<ListSignal> {
        let id = self.pending_delete.take()?;
        let Some(pos) = self.items.iter().position(|c| c.id == id) else {
            debug!("conversations: {id} already gone at confirmation");
            return None;
        };
        self.items.remove(pos);
        info!("conversations: deleted {id}");
        Some(ListSignal::Deleted { id })
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = uuid::Uuid::new_v4().simple().to_string();
            if self.get(&id).is_none() {
                return id;
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    inner: std::slice::Iter<'a, Conversation>,
    needle: String,
}

impl<'a> Iterator for FilteredView<'a> {
    type Item = &'a Conversation;

    fn next(&mut self) -> Option<Self::Item> {
        let needle = &self.needle;
        self.inner.find(|c| c.matches(needle))
    }
}

pub fn sample_conversations() -> Vec<Conversation> {
    vec![
        Conversation::new(
            "1",
            "Project Planning",
            "Let me help you create a roadmap for your project",
            "2 min ago",
        ),
        Conversation::new(
            "2",
            "Code Review",
            "The implementation looks good overall",
            "1 hour ago",
        ),
        Conversation::new(
            "3",
            "Design Ideas",
            "Here are some modern design patterns you could use",
            "3 hours ago",
        ),
        Conversation::new(
            "4",
            "Bug Troubleshooting",
            "This error is typically caused by...",
            "Yesterday",
        ),
    ]
}
