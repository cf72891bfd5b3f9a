// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::fmt;

pub const DEFAULT_MAX_DISPLAY: usize = 3;

type SelectionListener = Box<dyn FnMut(&[String])>;

/// Searchable multi-select over a candidate list. Every selection change is
/// reported to the listener immediately; there is no apply step.
pub struct MultiSelect {
    placeholder: String,
    search_placeholder: String,
    max_display: usize,
    candidates: Vec<String>,
    selected: Vec<String>,
    search: String,
    cursor: usize,
    on_change: Option<SelectionListener>,
}

impl fmt::Debug for MultiSelect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiSelect")
            .field("placeholder", &self.placeholder)
            .field("candidates", &self.candidates.len())
            .field("selected", &self.selected)
            .field("search", &self.search)
            .field("cursor", &self.cursor)
            .finish_non_exhaustive()
    }
}

impl MultiSelect {
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            placeholder: placeholder.into(),
            search_placeholder: "Search...".to_owned(),
            max_display: DEFAULT_MAX_DISPLAY,
            candidates: Vec::new(),
            selected: Vec::new(),
            search: String::new(),
            cursor: 0,
            on_change: None,
        }
    }

    pub fn with_search_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.search_placeholder = placeholder.into();
        self
    }

    pub fn with_max_display(mut self, max_display: usize) -> Self {
        self.max_display = max_display.max(1);
        self
    }

    pub fn with_candidates(mut self, candidates: Vec<String>) -> Self {
        self.candidates = candidates;
        self
    }

    pub fn on_change(&mut self, listener: impl FnMut(&[String]) + 'static) {
        self.on_change = Some(Box::new(listener));
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn search_placeholder(&self) -> &str {
        &self.search_placeholder
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_selected(&self, value: &str) -> bool {
        self.selected.iter().any(|selected| selected == value)
    }

    /// Replaces the candidates; the current selection is kept.
    pub fn set_candidates(&mut self, candidates: Vec<String>) {
        self.candidates = candidates;
        self.clamp_cursor();
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.clamp_cursor();
    }

    pub fn push_search(&mut self, ch: char) {
        self.search.push(ch);
        self.clamp_cursor();
    }

    pub fn pop_search(&mut self) {
        self.search.pop();
        self.clamp_cursor();
    }

    /// Candidates matching the search text, case-insensitively.
    pub fn visible(&self) -> Vec<&str> {
        let needle = self.search.trim().to_lowercase();
        self.candidates
            .iter()
            .map(String::as_str)
            .filter(|candidate| needle.is_empty() || candidate.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let len = self.visible().len();
        if len == 0 {
            self.cursor = 0;
            return;
        }
        let next = (self.cursor as isize + delta).clamp(0, len as isize - 1);
        self.cursor = next as usize;
    }

    pub fn toggle(&mut self, value: &str) -> bool {
        let now_selected = match self.selected.iter().position(|selected| selected == value) {
            Some(index) => {
                self.selected.remove(index);
                false
            }
            None => {
                self.selected.push(value.to_owned());
                true
            }
        };
        self.emit();
        now_selected
    }

    /// Toggles the candidate under the cursor, if any is visible.
    pub fn toggle_at_cursor(&mut self) -> Option<bool> {
        let value = self.visible().get(self.cursor).map(|value| (*value).to_owned())?;
        Some(self.toggle(&value))
    }

    pub fn clear(&mut self) {
        self.selected.clear();
        self.emit();
    }

    pub fn display_text(&self) -> String {
        match self.selected.as_slice() {
            [] => self.placeholder.clone(),
            [single] => single.clone(),
            many if many.len() <= self.max_display => many.join(", "),
            many => format!("{} items selected", many.len()),
        }
    }

    fn clamp_cursor(&mut self) {
        let len = self.visible().len();
        if self.cursor >= len {
            self.cursor = len.saturating_sub(1);
        }
    }

    fn emit(&mut self) {
        if let Some(listener) = self.on_change.as_mut() {
            listener(&self.selected);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::MultiSelect;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn domains() -> MultiSelect {
        MultiSelect::new("Domain").with_candidates(vec![
            "alpha.io".to_owned(),
            "Beta.com".to_owned(),
            "gamma.net".to_owned(),
            "delta.com".to_owned(),
        ])
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let mut select = domains();
        select.set_search("COM");
        assert_eq!(select.visible(), vec!["Beta.com", "delta.com"]);
        assert_eq!(select.candidates().len(), 4);

        select.set_search("");
        assert_eq!(select.visible().len(), 4);
    }

    #[test]
    fn toggles_preserve_order_and_notify() {
        let seen: Rc<RefCell<Vec<Vec<String>>>> = Rc::default();
        let mut select = domains();
        let sink = Rc::clone(&seen);
        select.on_change(move |values| sink.borrow_mut().push(values.to_vec()));

        assert!(select.toggle("gamma.net"));
        assert!(select.toggle("alpha.io"));
        assert!(!select.toggle("gamma.net"));
        select.clear();

        assert_eq!(
            *seen.borrow(),
            vec![
                vec!["gamma.net".to_owned()],
                vec!["gamma.net".to_owned(), "alpha.io".to_owned()],
                vec!["alpha.io".to_owned()],
                Vec::<String>::new(),
            ]
        );
    }

    #[test]
    fn display_text_summarizes_selection() {
        let mut select = domains();
        assert_eq!(select.display_text(), "Domain");
        select.toggle("alpha.io");
        assert_eq!(select.display_text(), "alpha.io");
        select.toggle("Beta.com");
        select.toggle("gamma.net");
        assert_eq!(select.display_text(), "alpha.io, Beta.com, gamma.net");
        select.toggle("delta.com");
        assert_eq!(select.display_text(), "4 items selected");
    }

    #[test]
    fn cursor_toggles_visible_candidates() {
        let mut select = domains();
        select.push_search('e');
        select.push_search('l');
        assert_eq!(select.visible(), vec!["delta.com"]);
        assert_eq!(select.toggle_at_cursor(), Some(true));
        assert!(select.is_selected("delta.com"));

        select.set_search("nothing");
        assert_eq!(select.toggle_at_cursor(), None);

        select.pop_search();
        select.set_search("");
        select.move_cursor(10);
        assert_eq!(select.cursor(), 3);
        select.move_cursor(-10);
        assert_eq!(select.cursor(), 0);
    }

    #[test]
    fn replacing_candidates_keeps_selection() {
        let mut select = domains();
        select.toggle("alpha.io");
        select.set_candidates(vec!["omega.org".to_owned()]);
        assert_eq!(select.selected(), ["alpha.io"]);
        assert_eq!(select.visible(), vec!["omega.org"]);
    }
}
