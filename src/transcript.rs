// src/transcript.rs
use crate::render::Speaker;

/// Stable handle to one rendered entry, valid until that entry is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId(u64);

#[derive(Debug, Clone)]
pub struct Entry {
    pub id: EntryId,
    pub speaker: Speaker,
    pub html: String,
}

/// The rendered conversation, in display order.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    entries: Vec<Entry>,
    next_id: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, speaker: Speaker, html: impl Into<String>) -> EntryId {
        let id = EntryId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry { id, speaker, html: html.into() });
        id
    }

    /// Remove an entry. Returns false if it was already gone.
    pub fn remove(&mut self, id: EntryId) -> bool {
        match self.entries.iter().position(|e| e.id == id) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Drop every entry and append `rendered` in order. Ids handed out before
    /// stay invalid afterwards.
    pub fn replace_all<I>(&mut self, rendered: I)
    where
        I: IntoIterator<Item = (Speaker, String)>,
    {
        self.entries.clear();
        for (speaker, html) in rendered {
            self.append(speaker, html);
        }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Concatenated HTML of all entries, i.e. the inner HTML of `#chat-body`.
    pub fn to_html(&self) -> String {
        self.entries.iter().map(|e| e.html.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remove_only_touches_the_given_entry() {
        let mut t = Transcript::new();
        let a = t.append(Speaker::User, "<a>");
        let b = t.append(Speaker::Ai, "<b>");
        t.append(Speaker::User, "<c>");

        assert!(t.remove(b));
        assert!(!t.remove(b));
        assert_eq!(t.to_html(), "<a><c>");
        assert!(t.remove(a));
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn replace_all_invalidates_old_ids() {
        let mut t = Transcript::new();
        let old = t.append(Speaker::Ai, "...");
        t.replace_all(vec![(Speaker::User, "u".to_string()), (Speaker::Ai, "a".to_string())]);

        assert!(!t.remove(old));
        assert_eq!(t.to_html(), "ua");
        assert_eq!(t.entries()[1].speaker, Speaker::Ai);
    }
}
