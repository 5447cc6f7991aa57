//! Which countries the user picked. Kept apart from the analysis output and
//! joined by country name when rendering.
use crate::types::Analysis;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    // insertion order is the display order
    selected: Vec<String>,
}

impl SelectionState {
    pub fn is_selected(&self, country: &str) -> bool {
        self.selected.iter().any(|c| c == country)
    }

    /// Add or remove `country`. Returns whether it is selected afterwards.
    pub fn toggle(&mut self, country: &str) -> bool {
        if let Some(pos) = self.selected.iter().position(|c| c == country) {
            self.selected.remove(pos);
            false
        } else {
            self.selected.push(country.to_string());
            true
        }
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Replace the selection with the countries named in a comma-separated
    /// query. Names match case-insensitively and are stored with the
    /// dataset's spelling; unknown names are ignored. Returns the number
    /// selected.
    pub fn apply_query(&mut self, query: &str, analysis: &Analysis) -> usize {
        self.clear();
        for name in query.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let needle = name.to_lowercase();
            let found = analysis
                .countries
                .iter()
                .find(|c| c.country.to_lowercase() == needle);
            if let Some(c) = found {
                if !self.is_selected(&c.country) {
                    self.selected.push(c.country.clone());
                }
            }
        }
        self.selected.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.selected.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// `1. A`, `2. B`, … or `None`.
    pub fn numbered_list(&self) -> String {
        if self.selected.is_empty() {
            return "None".to_string();
        }
        self.selected
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{}. {}", i + 1, c))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Comma-joined, the same shape `apply_query` accepts.
    pub fn as_query(&self) -> String {
        self.selected.join(", ")
    }
}
