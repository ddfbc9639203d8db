//! Search and pagination view over the rule list
//!
//! Pure presentation state for the rule-editing dialog: case-insensitive
//! filtering across both fields, fixed page size, and automatic page reset
//! whenever the search term or the rule count changes.

use crate::core::state::Rule;

/// Rules shown per page in the editing dialog.
pub const PAGE_SIZE: usize = 5;

/// Presentation state for browsing the rule list.
#[derive(Debug, Clone)]
pub struct RuleBrowser {
    term: String,
    page: usize,
    last_count: usize,
}

impl Default for RuleBrowser {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleBrowser {
    /// Browser starting on page 1 with no filter.
    pub fn new() -> Self {
        Self {
            term: String::new(),
            page: 1,
            last_count: 0,
        }
    }

    /// Current search term.
    pub fn term(&self) -> &str {
        &self.term
    }

    /// Update the search term, resetting to page 1 when it changes.
    pub fn set_term(&mut self, term: impl Into<String>) {
        let term = term.into();
        if term != self.term {
            self.term = term;
            self.page = 1;
        }
    }

    /// Current page (1-based).
    pub fn page(&self) -> usize {
        self.page
    }

    /// Jump to a page; clamped into range on the next `visible` call.
    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    /// Number of pages for the current filter.
    pub fn page_count(&self, rules: &[Rule]) -> usize {
        let matches = rules.iter().filter(|r| self.matches(r)).count();
        matches.div_ceil(PAGE_SIZE).max(1)
    }

    /// The rules visible on the current page, as `(index, rule)` pairs so
    /// the caller can address edits back to the full list.
    ///
    /// Filtering is applied before pagination. A changed rule count (after
    /// add/delete) resets to page 1.
    pub fn visible<'a>(&mut self, rules: &'a [Rule]) -> Vec<(usize, &'a Rule)> {
        if rules.len() != self.last_count {
            self.last_count = rules.len();
            self.page = 1;
        }

        let filtered: Vec<(usize, &Rule)> = rules
            .iter()
            .enumerate()
            .filter(|(_, r)| self.matches(r))
            .collect();

        let pages = filtered.len().div_ceil(PAGE_SIZE).max(1);
        if self.page > pages {
            self.page = pages;
        }

        filtered
            .into_iter()
            .skip((self.page - 1) * PAGE_SIZE)
            .take(PAGE_SIZE)
            .collect()
    }

    fn matches(&self, rule: &Rule) -> bool {
        if self.term.is_empty() {
            return true;
        }
        let term = self.term.to_lowercase();
        rule.find.to_lowercase().contains(&term) || rule.replace.to_lowercase().contains(&term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(n: usize) -> Vec<Rule> {
        (0..n)
            .map(|i| Rule::new(format!("*r{i}"), format!("Texto {i}")))
            .collect()
    }

    #[test]
    fn pages_hold_five_rules() {
        let rules = rules(12);
        let mut browser = RuleBrowser::new();

        let page1 = browser.visible(&rules);
        assert_eq!(page1.len(), 5);
        assert_eq!(page1[0].0, 0);

        browser.set_page(3);
        let page3 = browser.visible(&rules);
        assert_eq!(page3.len(), 2);
        assert_eq!(page3[0].0, 10);
        assert_eq!(browser.page_count(&rules), 3);
    }

    #[test]
    fn filter_is_case_insensitive_across_both_fields() {
        let rules = vec![
            Rule::new("*id", "Identidade"),
            Rule::new("*END", "endereço"),
            Rule::new("*tel", "Telefone"),
        ];
        let mut browser = RuleBrowser::new();
        browser.set_term("end");

        let visible = browser.visible(&rules);
        let finds: Vec<&str> = visible.iter().map(|(_, r)| r.find.as_str()).collect();
        assert_eq!(finds, vec!["*END"]);

        browser.set_term("IDENT");
        let visible = browser.visible(&rules);
        assert_eq!(visible[0].1.replace, "Identidade");
    }

    #[test]
    fn filtering_happens_before_pagination() {
        // 8 rules match "par", so the filtered set has 2 pages
        let mut all = rules(20);
        for i in 0..8 {
            all[i].replace = format!("Parágrafo {i}");
        }
        let mut browser = RuleBrowser::new();
        browser.visible(&all);
        browser.set_term("par");

        assert_eq!(browser.visible(&all).len(), 5);
        assert_eq!(browser.page_count(&all), 2);
        browser.set_page(2);
        assert_eq!(browser.visible(&all).len(), 3);
    }

    #[test]
    fn term_change_resets_page() {
        let rules = rules(12);
        let mut browser = RuleBrowser::new();
        browser.visible(&rules);
        browser.set_page(3);
        browser.visible(&rules);
        assert_eq!(browser.page(), 3);

        browser.set_term("texto 1");
        assert_eq!(browser.page(), 1);
    }

    #[test]
    fn count_change_resets_page() {
        let mut all = rules(12);
        let mut browser = RuleBrowser::new();
        browser.visible(&all);
        browser.set_page(3);
        browser.visible(&all);
        assert_eq!(browser.page(), 3);

        all.remove(0);
        browser.visible(&all);
        assert_eq!(browser.page(), 1);
    }

    #[test]
    fn out_of_range_page_clamps() {
        let rules = rules(7);
        let mut browser = RuleBrowser::new();
        browser.visible(&rules);
        browser.set_page(9);
        let visible = browser.visible(&rules);
        assert_eq!(browser.page(), 2);
        assert_eq!(visible.len(), 2);
    }
}
