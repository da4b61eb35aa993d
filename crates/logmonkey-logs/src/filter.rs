use std::collections::HashSet;

use logmonkey_types::LogEntry;

use crate::error::LogError;

/// Level and tag constraints applied to parsed entries
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    /// Exact level to keep (None = all)
    level: Option<String>,

    /// Tags to keep (empty = all)
    tags: HashSet<String>,
}

impl FilterCriteria {
    /// Criteria that accept every entry
    pub fn new() -> Self {
        Self::default()
    }

    /// Only keep entries whose level equals `level`
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = Some(level.into());
        self
    }

    /// Only keep entries whose tag is one of `tags`
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Check if a log entry passes both constraints
    pub fn matches(&self, entry: &LogEntry) -> bool {
        if let Some(level) = &self.level {
            if entry.level() != level {
                return false;
            }
        }

        if !self.tags.is_empty() && !self.tags.contains(entry.tag()) {
            return false;
        }

        true
    }

    pub fn level(&self) -> Option<&str> {
        self.level.as_deref()
    }

    pub fn tags(&self) -> &HashSet<String> {
        &self.tags
    }

    /// Check if the criteria match everything
    pub fn is_empty(&self) -> bool {
        self.level.is_none() && self.tags.is_empty()
    }
}

/// Split comma separated tag filter text into a set.
///
/// Each tag is trimmed. Empty text or an empty element (`a,,b`) is rejected.
pub fn parse_tag_filter(text: &str) -> Result<HashSet<String>, LogError> {
    let mut tags = HashSet::new();
    for tag in text.split(',') {
        let tag = tag.trim();
        if tag.is_empty() {
            return Err(LogError::InvalidFilterSyntax(text.to_string()));
        }
        tags.insert(tag.to_string());
    }
    Ok(tags)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(level: &str, tag: &str) -> LogEntry {
        LogEntry::new("", "lmf1", "2020-01-01 00:00:00", level, tag, "msg")
    }

    #[test]
    fn test_empty_criteria_match_all() {
        let filter = FilterCriteria::new();
        assert!(filter.is_empty());
        assert!(filter.matches(&entry("D", "net")));
        assert!(filter.matches(&entry("", "")));
    }

    #[test]
    fn test_level_filter_keeps_order() {
        let filter = FilterCriteria::new().with_level("D");
        let entries = [entry("D", "a"), entry("I", "b"), entry("D", "c")];

        let kept: Vec<_> = entries.iter().filter(|e| filter.matches(e)).collect();
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].tag(), "a");
        assert_eq!(kept[1].tag(), "c");
    }

    #[test]
    fn test_level_filter_is_case_sensitive() {
        let filter = FilterCriteria::new().with_level("debug");
        assert!(!filter.matches(&entry("DEBUG", "net")));
    }

    #[test]
    fn test_tag_filter() {
        let filter = FilterCriteria::new().with_tags(["net", "io"]);
        assert!(filter.matches(&entry("D", "net")));
        assert!(filter.matches(&entry("E", "io")));
        assert!(!filter.matches(&entry("D", "disk")));
        assert!(!filter.matches(&entry("D", "Net")));
    }

    #[test]
    fn test_empty_tag_set_matches_all() {
        let filter = FilterCriteria::new().with_tags(Vec::<String>::new());
        assert!(filter.is_empty());
        assert!(filter.matches(&entry("D", "anything")));
    }

    #[test]
    fn test_level_and_tags_combine() {
        let filter = FilterCriteria::new().with_level("E").with_tags(["net"]);
        assert!(filter.matches(&entry("E", "net")));
        assert!(!filter.matches(&entry("D", "net")));
        assert!(!filter.matches(&entry("E", "io")));
    }

    #[test]
    fn test_parse_tag_filter() {
        let tags = parse_tag_filter("net, io,net").unwrap();
        assert_eq!(tags.len(), 2);
        assert!(tags.contains("net"));
        assert!(tags.contains("io"));

        let tags = parse_tag_filter("disk io").unwrap();
        assert!(tags.contains("disk io"));
    }

    #[test]
    fn test_parse_tag_filter_rejects_empty_elements() {
        for text in ["", ",", "net,,io", "net, ", " "] {
            let err = parse_tag_filter(text).unwrap_err();
            assert!(matches!(err, LogError::InvalidFilterSyntax(_)), "{text:?}");
        }
    }
}
