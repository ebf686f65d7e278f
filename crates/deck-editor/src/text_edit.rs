//! In-place text editing.
//!
//! A session holds the pre-edit string and the live draft. The document is
//! not touched until the session commits, and a commit only produces a
//! patch when there is something worth persisting.

use deck_core::element::ElementRef;
use deck_core::patch::Patch;

/// Line box height as a multiple of the font size.
pub const LINE_HEIGHT: f64 = 1.2;

#[derive(Debug, Clone, PartialEq)]
pub struct TextEditSession {
    element: ElementRef,
    original: String,
    draft: String,
    /// Last measured `scrollHeight` of the input surface.
    scroll_height: Option<f64>,
}

impl TextEditSession {
    /// Start editing `element`, seeded with its current content.
    pub fn new(element: ElementRef, original: impl Into<String>) -> Self {
        let original = original.into();
        Self {
            element,
            draft: original.clone(),
            original,
            scroll_height: None,
        }
    }

    pub fn element(&self) -> ElementRef {
        self.element
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Replace the draft with the input surface's current value.
    pub fn input(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Shift+Enter.
    pub fn insert_newline(&mut self) {
        self.draft.push('\n');
    }

    pub fn is_dirty(&self) -> bool {
        self.draft != self.original
    }

    pub fn measure(&mut self, scroll_height: f64) {
        self.scroll_height = Some(scroll_height);
    }

    /// Height the input surface should grow to: the measured content height
    /// when the host has reported one, otherwise an estimate from the line
    /// count. Never shorter than one line.
    pub fn auto_height(&self, font_size: f64) -> f64 {
        let line = font_size * LINE_HEIGHT;
        let estimate = self.draft.split('\n').count() as f64 * line;
        self.scroll_height.unwrap_or(estimate).max(line)
    }

    /// End the session, persisting the draft if it changed and is not blank.
    pub fn commit(self) -> Option<Patch> {
        if !self.is_dirty() {
            return None;
        }
        if self.draft.trim().is_empty() {
            log::debug!("{}: blank text not committed", self.element);
            return None;
        }
        Some(Patch::text(self.element, self.draft))
    }

    /// End the session discarding the draft. Returns the pre-edit string.
    pub fn revert(self) -> String {
        self.original
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn commit_emits_final_draft_once() {
        let mut session = TextEditSession::new(ElementRef::Title, "Seed round");
        session.input("Series A");
        session.input("Series A+");
        assert_eq!(
            session.commit(),
            Some(Patch::text(ElementRef::Title, "Series A+"))
        );
    }

    #[test]
    fn unchanged_or_blank_draft_commits_nothing() {
        let session = TextEditSession::new(ElementRef::Subtitle, "Hello");
        assert_eq!(session.commit(), None);

        let mut session = TextEditSession::new(ElementRef::Subtitle, "Hello");
        session.input("   \n ");
        assert_eq!(session.commit(), None);
    }

    #[test]
    fn revert_returns_original() {
        let mut session = TextEditSession::new(ElementRef::Description, "before");
        session.input("after");
        assert_eq!(session.revert(), "before");
    }

    #[test]
    fn newline_and_auto_height() {
        let mut session = TextEditSession::new(ElementRef::Description, "one");
        assert_eq!(session.auto_height(10.0), 12.0);
        session.insert_newline();
        session.input(format!("{}two", session.draft()));
        assert_eq!(session.draft(), "one\ntwo");
        assert_eq!(session.auto_height(10.0), 24.0);
        session.measure(40.0);
        assert_eq!(session.auto_height(10.0), 40.0);
    }
}
