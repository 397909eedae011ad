// src/taxonomy.rs
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Color used for level names the client does not recognise.
pub const FALLBACK_COLOR: &str = "#666";

static LEVEL_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^L(\d+)-(\w+)$").expect("valid level code pattern"));

/// The six Bloom's taxonomy levels, lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TaxonomyLevel {
    Remember,
    Understand,
    Apply,
    Analyze,
    Evaluate,
    Create,
}

impl TaxonomyLevel {
    pub const ALL: [TaxonomyLevel; 6] = [
        TaxonomyLevel::Remember,
        TaxonomyLevel::Understand,
        TaxonomyLevel::Apply,
        TaxonomyLevel::Analyze,
        TaxonomyLevel::Evaluate,
        TaxonomyLevel::Create,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TaxonomyLevel::Remember => "Remember",
            TaxonomyLevel::Understand => "Understand",
            TaxonomyLevel::Apply => "Apply",
            TaxonomyLevel::Analyze => "Analyze",
            TaxonomyLevel::Evaluate => "Evaluate",
            TaxonomyLevel::Create => "Create",
        }
    }

    /// 1-based rank, as used in the `L{n}-{Name}` codes.
    pub fn rank(self) -> u8 {
        match self {
            TaxonomyLevel::Remember => 1,
            TaxonomyLevel::Understand => 2,
            TaxonomyLevel::Apply => 3,
            TaxonomyLevel::Analyze => 4,
            TaxonomyLevel::Evaluate => 5,
            TaxonomyLevel::Create => 6,
        }
    }

    pub fn code(self) -> String {
        format!("L{}-{}", self.rank(), self.name())
    }

    pub fn color(self) -> &'static str {
        match self {
            TaxonomyLevel::Remember => "#FF6B6B",
            TaxonomyLevel::Understand => "#4ECDC4",
            TaxonomyLevel::Apply => "#45B7D1",
            TaxonomyLevel::Analyze => "#96CEB4",
            TaxonomyLevel::Evaluate => "#FFEAA7",
            TaxonomyLevel::Create => "#DDA0DD",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            TaxonomyLevel::Remember => "Recall facts and basic concepts",
            TaxonomyLevel::Understand => "Explain ideas and concepts",
            TaxonomyLevel::Apply => "Use information in new situations",
            TaxonomyLevel::Analyze => "Draw connections among ideas",
            TaxonomyLevel::Evaluate => "Justify a stand or decision",
            TaxonomyLevel::Create => "Produce new or original work",
        }
    }

    /// Style class carrying this level's colors in the stylesheet.
    pub fn css_class(self) -> String {
        format!("level-{}", self.name().to_lowercase())
    }

    /// Resolves either a bare name (`Apply`) or a code (`L3-Apply`).
    pub fn lookup(level: &str) -> Option<TaxonomyLevel> {
        let name = match LEVEL_CODE.captures(level) {
            Some(caps) => caps.get(2).map_or(level, |m| m.as_str()),
            None => level,
        };
        TaxonomyLevel::ALL.into_iter().find(|l| l.name() == name)
    }
}

/// Display color for a level name or code, gray when unknown.
pub fn level_color(level: &str) -> &'static str {
    TaxonomyLevel::lookup(level).map_or(FALLBACK_COLOR, TaxonomyLevel::color)
}

/// Style class for a level name or code, `level-unknown` when unknown.
pub fn level_class(level: &str) -> String {
    TaxonomyLevel::lookup(level).map_or_else(|| "level-unknown".to_string(), TaxonomyLevel::css_class)
}

/// `L1-Remember` -> `Level 1: Remember`. Only the first `L` and the first
/// `-` are rewritten.
pub fn display_label(level: &str) -> String {
    level.replacen('L', "Level ", 1).replacen('-', ": ", 1)
}

/// Text after the first `-` of a level code, or the whole code.
pub fn short_name(level: &str) -> &str {
    level.split_once('-').map_or(level, |(_, rest)| rest)
}
