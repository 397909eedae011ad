// src/models.rs
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;

/// A JSON object kept in the order the backend sent it.
///
/// Several renderers depend on key order (the most-common-level scan and
/// the distribution chart), so a hash map would not do.
#[derive(Debug, Clone, PartialEq)]
pub struct Ordered<V>(pub Vec<(String, V)>);

impl<V> Default for Ordered<V> {
    fn default() -> Self {
        Ordered(Vec::new())
    }
}

impl<V> Ordered<V> {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<V> FromIterator<(String, V)> for Ordered<V> {
    fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
        Ordered(iter.into_iter().collect())
    }
}

impl<V: Serialize> Serialize for Ordered<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

struct OrderedVisitor<V>(PhantomData<V>);

impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedVisitor<V> {
    type Value = Ordered<V>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a JSON object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut entries: Vec<(String, V)> = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((key, value)) = access.next_entry::<String, V>()? {
            // Later duplicates overwrite in place.
            match entries.iter().position(|(k, _)| *k == key) {
                Some(i) => entries[i].1 = value,
                None => entries.push((key, value)),
            }
        }
        Ok(Ordered(entries))
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for Ordered<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(OrderedVisitor(PhantomData))
    }
}

/// Result of classifying one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub question: String,
    pub level: String,
    pub description: String,
    pub color: String,
}

/// Raw `/classify` response.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifyResponse {
    #[serde(default)]
    pub success: bool,
    pub level: Option<String>,
    pub description: Option<String>,
    pub question: Option<String>,
    pub color: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelStat {
    pub count: u32,
    pub percentage: f64,
}

pub type LevelPercentages = Ordered<LevelStat>;
pub type LevelCounts = Ordered<u32>;

/// One entry of a multi-level ranking, most confident first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelScore {
    pub level: String,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionAnalysis {
    pub question_number: u32,
    pub question: String,
    #[serde(default)]
    pub description: String,
    pub level: String,
    #[serde(default)]
    pub level_display: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub is_multi_level: bool,
    #[serde(default)]
    pub all_levels: Option<Vec<LevelScore>>,
}

impl QuestionAnalysis {
    /// The ranked levels to show as separate badges, if this question
    /// should be displayed as multi-level.
    pub fn ranked_levels(&self) -> Option<&[LevelScore]> {
        match &self.all_levels {
            Some(levels) if self.is_multi_level && levels.len() > 1 => Some(levels),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UploadAnalysis {
    #[serde(default)]
    pub total_questions: u32,
    #[serde(default)]
    pub level_counts: LevelCounts,
    #[serde(default)]
    pub level_percentages: LevelPercentages,
    #[serde(default)]
    pub questions: Vec<QuestionAnalysis>,
}

impl UploadAnalysis {
    /// Most frequent level by a linear scan; a later entry must be strictly
    /// greater to win, so ties go to the first one seen. `-` when nothing
    /// has a positive count.
    pub fn most_common_level(&self) -> &str {
        let mut best = "-";
        let mut max = 0;
        for (level, &count) in self.level_counts.iter() {
            if count > max {
                max = count;
                best = level;
            }
        }
        best
    }
}

/// Raw `/upload_report` response.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub success: bool,
    pub analysis: Option<UploadAnalysis>,
    pub error: Option<String>,
}

/// Raw `/login` response.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub success: bool,
    pub message: Option<String>,
}

/// A file picked or dropped by the user, not yet sent.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { name: name.into(), bytes }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_level_percentages_keep_backend_order() {
        let raw = json!({
            "L3-Apply": {"count": 5, "percentage": 50.0},
            "L1-Remember": {"count": 5, "percentage": 50.0},
            "L2-Understand": {"count": 0, "percentage": 0}
        });
        let parsed: LevelPercentages = serde_json::from_value(raw).unwrap();
        let keys: Vec<&str> = parsed.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["L3-Apply", "L1-Remember", "L2-Understand"]);
        assert_eq!(parsed.get("L2-Understand").unwrap().count, 0);
    }

    #[test]
    fn test_most_common_level_first_seen_wins_ties() {
        let analysis: UploadAnalysis = serde_json::from_value(json!({
            "total_questions": 6,
            "level_counts": {"L1-Remember": 3, "L2-Understand": 3}
        }))
        .unwrap();
        assert_eq!(analysis.most_common_level(), "L1-Remember");

        let analysis: UploadAnalysis = serde_json::from_value(json!({
            "level_counts": {"L2-Understand": 3, "L1-Remember": 3, "L5-Evaluate": 4}
        }))
        .unwrap();
        assert_eq!(analysis.most_common_level(), "L5-Evaluate");
    }

    #[test]
    fn test_most_common_level_empty() {
        assert_eq!(UploadAnalysis::default().most_common_level(), "-");
        let analysis: UploadAnalysis =
            serde_json::from_value(json!({"level_counts": {"L1-Remember": 0}})).unwrap();
        assert_eq!(analysis.most_common_level(), "-");
    }

    #[test]
    fn test_question_defaults() {
        let q: QuestionAnalysis = serde_json::from_value(json!({
            "question_number": 1,
            "question": "What is a cell?",
            "description": "Recall facts and basic concepts",
            "level": "L1-Remember"
        }))
        .unwrap();
        assert!(!q.is_multi_level);
        assert!(q.ranked_levels().is_none());
    }

    #[test]
    fn test_ranked_levels_requires_more_than_one() {
        let q: QuestionAnalysis = serde_json::from_value(json!({
            "question_number": 2,
            "question": "Design and evaluate an experiment",
            "level": "L6-Create",
            "is_multi_level": true,
            "all_levels": [{"level": "L6-Create", "color": "#DDA0DD", "score": 8}]
        }))
        .unwrap();
        assert!(q.ranked_levels().is_none());
    }
}
