//! Source deduplication.
//!
//! Providers often cite one page several times with slightly different
//! titles (grounding chunks vs. attributions). Sources are keyed by exact uri:
//! the last title seen for a uri wins, while output order is the order in
//! which each uri was first seen.

use crate::types::Source;
use std::collections::HashMap;

/// Ordered, uri-keyed set of sources.
#[derive(Debug, Clone, Default)]
pub struct SourceSet {
    entries: Vec<Source>,
    /// uri -> position in `entries`
    positions: HashMap<String, usize>,
}

impl SourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a source, overwriting the title of an existing entry in place.
    pub fn insert(&mut self, source: Source) {
        match self.positions.get(&source.uri) {
            Some(&idx) => self.entries[idx].title = source.title,
            None => {
                self.positions.insert(source.uri.clone(), self.entries.len());
                self.entries.push(source);
            }
        }
    }

    pub fn extend<I: IntoIterator<Item = Source>>(&mut self, sources: I) {
        for source in sources {
            self.insert(source);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_vec(self) -> Vec<Source> {
        self.entries
    }
}

impl FromIterator<Source> for SourceSet {
    fn from_iter<I: IntoIterator<Item = Source>>(iter: I) -> Self {
        let mut set = SourceSet::new();
        set.extend(iter);
        set
    }
}

/// Merge source lists in the order the stages ran.
pub fn dedupe_sources<I, S>(stages: I) -> Vec<Source>
where
    I: IntoIterator<Item = S>,
    S: IntoIterator<Item = Source>,
{
    stages.into_iter().flatten().collect::<SourceSet>().into_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_title_wins_first_position_kept() {
        let merged = dedupe_sources(vec![
            vec![
                Source::new("A (chunk)", "https://a"),
                Source::new("B", "https://b"),
            ],
            vec![
                Source::new("C", "https://c"),
                Source::new("A (attribution)", "https://a"),
            ],
        ]);

        assert_eq!(
            merged,
            vec![
                Source::new("A (attribution)", "https://a"),
                Source::new("B", "https://b"),
                Source::new("C", "https://c"),
            ]
        );
    }

    #[test]
    fn test_uri_match_is_case_sensitive() {
        let set: SourceSet = vec![
            Source::new("lower", "https://a.test/x"),
            Source::new("upper", "https://a.test/X"),
        ]
        .into_iter()
        .collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_one_entry_per_uri() {
        let inputs: Vec<Source> = (0..30)
            .map(|i| Source::new(format!("t{}", i), format!("https://u{}", i % 7)))
            .collect();
        let merged = dedupe_sources([inputs]);

        assert_eq!(merged.len(), 7);
        let uris: Vec<_> = merged.iter().map(|s| s.uri.as_str()).collect();
        assert_eq!(
            uris,
            vec![
                "https://u0",
                "https://u1",
                "https://u2",
                "https://u3",
                "https://u4",
                "https://u5",
                "https://u6"
            ]
        );
        // i = 28 is the last input with uri u0
        assert_eq!(merged[0].title, "t28");
    }

    #[test]
    fn test_empty_input() {
        let merged = dedupe_sources(Vec::<Vec<Source>>::new());
        assert!(merged.is_empty());
        assert!(SourceSet::new().is_empty());
    }
}
