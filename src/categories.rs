//! Coarse channel categories derived from raw playlist group labels.
//!
//! Playlist `group-title` values are free-form and inconsistent across
//! providers. Browsing collapses them into a small fixed set by scanning an
//! ordered keyword table; the first category whose keyword occurs in the
//! lower-cased label wins.

use strum::Display;

/// Coarse browsing category for a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Category {
    Movies,
    Music,
    Education,
    News,
    Sports,
    Kids,
    Entertainment,
    Religious,
    Shopping,
    /// Fallback when no keyword matches
    General,
}

/// Keyword table in priority order. Earlier rows win: "Kids Movie Night"
/// classifies as Movies because Movies is tested first.
const KEYWORD_TABLE: &[(Category, &[&str])] = &[
    (Category::Movies, &["movie"]),
    (Category::Music, &["music", "song", "radio"]),
    (Category::Education, &["education", "learn", "documentary"]),
    (Category::News, &["news"]),
    (Category::Sports, &["sport"]),
    (Category::Kids, &["kid", "child"]),
    (
        Category::Entertainment,
        &["entertainment", "lifestyle", "comedy"],
    ),
    (Category::Religious, &["religious"]),
    (Category::Shopping, &["shop", "sale"]),
];

impl Category {
    /// Classify a raw group label by substring match against the lower-cased
    /// label, in table order. No match falls back to General.
    pub fn classify(raw_group: &str) -> Category {
        let lowered = raw_group.to_lowercase();
        for (category, keywords) in KEYWORD_TABLE {
            if keywords.iter().any(|kw| lowered.contains(kw)) {
                return *category;
            }
        }
        Category::General
    }

    /// True for the fallback category. Browse ordering pushes these groups
    /// behind a source's named categories.
    pub fn is_general(self) -> bool {
        self == Category::General
    }
}
