//! Interactive query editor state.
//!
//! The in-progress text is kept as a left/right split around the caret, and
//! a history list remembers prior queries for up/down browsing.

/// Query text split at the insertion caret.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryInput {
    left: String,
    right: String,
}

impl QueryInput {
    pub fn text(&self) -> String {
        format!("{}{}", self.left, self.right)
    }

    /// The halves around the caret, for rendering the caret position.
    pub fn halves(&self) -> (&str, &str) {
        (&self.left, &self.right)
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty() && self.right.is_empty()
    }

    pub fn insert(&mut self, ch: char) {
        self.left.push(ch);
    }

    pub fn backspace(&mut self) {
        self.left.pop();
    }

    pub fn caret_left(&mut self) {
        if let Some(ch) = self.left.pop() {
            self.right.insert(0, ch);
        }
    }

    pub fn caret_right(&mut self) {
        if !self.right.is_empty() {
            let ch = self.right.remove(0);
            self.left.push(ch);
        }
    }
}

/// History of query entries with an index into it. Always holds at least one
/// entry so there is a current editor to type into.
#[derive(Debug, Clone)]
pub struct QueryHistory {
    entries: Vec<QueryInput>,
    pos: usize,
}

impl Default for QueryHistory {
    fn default() -> Self {
        Self {
            entries: vec![QueryInput::default()],
            pos: 0,
        }
    }
}

impl QueryHistory {
    pub fn current(&self) -> &QueryInput {
        &self.entries[self.pos]
    }

    pub fn current_mut(&mut self) -> &mut QueryInput {
        &mut self.entries[self.pos]
    }

    /// Start a new entry: reuse the newest one if it is still empty,
    /// otherwise append a fresh empty entry. Either way the index moves to
    /// the newest entry.
    pub fn fresh_entry(&mut self) {
        if !self.entries[self.entries.len() - 1].is_empty() {
            self.entries.push(QueryInput::default());
        }
        self.pos = self.entries.len() - 1;
    }

    pub fn up(&mut self) {
        self.pos = self.pos.saturating_sub(1);
    }

    pub fn down(&mut self) {
        if self.pos + 1 < self.entries.len() {
            self.pos += 1;
        }
    }

    /// Jump to the newest entry.
    pub fn last(&mut self) {
        self.pos = self.entries.len() - 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caret_editing() {
        let mut h = QueryHistory::default();
        h.fresh_entry();
        let i = h.current_mut();
        i.caret_left(); // no-ops at the boundaries
        i.caret_right();
        i.insert('1');
        i.caret_left();
        i.insert('0');
        assert_eq!(i.text(), "01");
        h.up();
        assert_eq!(h.current().text(), "01");
    }

    #[test]
    fn test_fresh_entry_reuses_empty() {
        let mut h = QueryHistory::default();
        h.fresh_entry();
        h.current_mut().insert('a');
        h.fresh_entry();
        assert_eq!(h.current().text(), "");
        h.fresh_entry(); // still empty: reused, not stacked
        assert_eq!(h.current().text(), "");
        h.up();
        assert_eq!(h.current().text(), "a");
    }

    #[test]
    fn test_history_browsing_clamps() {
        let mut h = QueryHistory::default();
        h.current_mut().insert('a');
        h.fresh_entry();
        h.current_mut().insert('b');
        h.fresh_entry();
        h.up();
        assert_eq!(h.current().text(), "b");
        h.up();
        assert_eq!(h.current().text(), "a");
        h.up(); // clamped at the oldest
        assert_eq!(h.current().text(), "a");
        h.last();
        assert_eq!(h.current().text(), "");
        h.down(); // clamped at the newest
        assert_eq!(h.current().text(), "");
    }

    #[test]
    fn test_backspace_and_caret_halves() {
        let mut i = QueryInput::default();
        for ch in "abc".chars() {
            i.insert(ch);
        }
        i.caret_left();
        assert_eq!(i.halves(), ("ab", "c"));
        i.backspace();
        assert_eq!(i.text(), "ac");
    }
}
