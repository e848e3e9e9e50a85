use std::collections::HashSet;

/// Content-quality veto consulted for prediction-family requests.
pub trait ContentFilter: Send + Sync {
    fn is_rejected(&self, value: &str) -> bool;
}

/// Accepts everything.
pub struct NoFilter;

impl ContentFilter for NoFilter {
    fn is_rejected(&self, _value: &str) -> bool {
        false
    }
}

/// Rejects values that contain any listed word.
#[derive(Debug, Default)]
pub struct SuppressionList {
    words: HashSet<String>,
}

impl SuppressionList {
    pub fn new() -> Self {
        Self::default()
    }

    /// One word per line; empty lines and `#` comments are skipped.
    pub fn from_text(text: &str) -> Self {
        text.lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .map(str::to_string)
            .collect()
    }

    pub fn insert(&mut self, word: impl Into<String>) {
        self.words.insert(word.into());
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl FromIterator<String> for SuppressionList {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            words: iter.into_iter().collect(),
        }
    }
}

impl ContentFilter for SuppressionList {
    fn is_rejected(&self, value: &str) -> bool {
        self.words.iter().any(|w| value.contains(w.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_filter() {
        assert!(!NoFilter.is_rejected("何でも"));
    }

    #[test]
    fn test_suppression_list_substring() {
        let list = SuppressionList::from_text("# blocked\n仲野\n\n  深耕  \n");
        assert_eq!(list.len(), 2);
        assert!(list.is_rejected("私の名前は仲野です"));
        assert!(list.is_rejected("深耕"));
        assert!(!list.is_rejected("中野"));
    }

    #[test]
    fn test_insert() {
        let mut list = SuppressionList::new();
        assert!(list.is_empty());
        list.insert("信仰");
        assert!(list.is_rejected("信仰する"));
    }
}
