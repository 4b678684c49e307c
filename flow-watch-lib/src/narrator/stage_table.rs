use crate::Result;
use ohno::bail;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Narration shown by default while a statement-processing task runs.
const DEFAULT_MESSAGES: [&str; 9] = [
    "Establishing secure connection...",
    "Scanning mail inbox...",
    "Extracting PDF attachments...",
    "Decrypting bank statements...",
    "Processing transactions...",
    "Categorizing expenses...",
    "Analyzing spending patterns...",
    "Generating insights...",
    "Finalizing your dashboard...",
];

/// Spacing between default stage thresholds, in percentage points.
const DEFAULT_STEP: u8 = 11;

/// One narrated step of a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Stage {
    /// Progress value that must be exceeded for this stage to become current.
    pub threshold: u8,

    /// Text shown while this stage is current.
    pub message: String,
}

impl Stage {
    #[must_use]
    pub fn new(threshold: u8, message: impl Into<String>) -> Self {
        Self {
            threshold,
            message: message.into(),
        }
    }
}

/// An immutable, ordered set of stages with strictly ascending thresholds.
///
/// Cloning is cheap; clones share the same backing storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Stage>", into = "Vec<Stage>")]
pub struct StageTable {
    stages: Arc<[Stage]>,
}

impl StageTable {
    /// Build a table from explicit stages.
    ///
    /// # Errors
    ///
    /// Returns an error if `stages` is empty, if thresholds are not strictly
    /// ascending, or if any threshold is above 100.
    pub fn new(stages: Vec<Stage>) -> Result<Self> {
        if stages.is_empty() {
            bail!("a stage table needs at least one stage");
        }

        for stage in &stages {
            if stage.threshold > 100 {
                bail!("stage threshold {} for '{}' is above 100", stage.threshold, stage.message);
            }
        }

        for pair in stages.windows(2) {
            if pair[1].threshold <= pair[0].threshold {
                bail!(
                    "stage thresholds must be strictly ascending, but '{}' ({}) follows '{}' ({})",
                    pair[1].message,
                    pair[1].threshold,
                    pair[0].message,
                    pair[0].threshold
                );
            }
        }

        Ok(Self { stages: stages.into() })
    }

    /// Build a table whose thresholds are `0, step, 2*step, ...`.
    ///
    /// # Errors
    ///
    /// Returns an error if `messages` is empty, `step` is zero, or the last threshold would exceed 100.
    pub fn evenly_spaced(messages: impl IntoIterator<Item = String>, step: u8) -> Result<Self> {
        if step == 0 {
            bail!("stage spacing must be greater than zero");
        }

        let mut stages = Vec::new();
        for (index, message) in messages.into_iter().enumerate() {
            let Some(threshold) = u8::try_from(index).ok().and_then(|i| i.checked_mul(step)) else {
                bail!("too many stages for a spacing of {step}");
            };
            stages.push(Stage::new(threshold, message));
        }

        Self::new(stages)
    }

    /// Number of stages in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Always `false`; a table holds at least one stage.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Index of the final stage.
    #[must_use]
    pub fn last_index(&self) -> usize {
        self.stages.len().saturating_sub(1)
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Stage> {
        self.stages.get(index)
    }

    /// Narration for the stage at `index`, or `None` if there is no such stage or its message is blank.
    #[must_use]
    pub fn message(&self, index: usize) -> Option<&str> {
        self.get(index).map(|s| s.message.as_str()).filter(|m| !m.trim().is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Stage> {
        self.stages.iter()
    }
}

impl Default for StageTable {
    fn default() -> Self {
        let stages = DEFAULT_MESSAGES
            .iter()
            .zip((0u8..).map(|i| i * DEFAULT_STEP))
            .map(|(message, threshold)| Stage::new(threshold, *message))
            .collect::<Vec<_>>();

        Self { stages: stages.into() }
    }
}

impl TryFrom<Vec<Stage>> for StageTable {
    type Error = ohno::AppError;

    fn try_from(stages: Vec<Stage>) -> Result<Self> {
        Self::new(stages)
    }
}

impl From<StageTable> for Vec<Stage> {
    fn from(table: StageTable) -> Self {
        table.stages.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_is_valid() {
        let table = StageTable::default();
        assert_eq!(table.len(), 9);
        assert_eq!(table.last_index(), 8);
        assert_eq!(table.get(8).map(|s| s.threshold), Some(88));
        _ = StageTable::new(table.iter().cloned().collect()).unwrap();
    }

    #[test]
    fn test_empty_table_is_rejected() {
        assert!(StageTable::new(Vec::new()).is_err());
    }

    #[test]
    fn test_descending_thresholds_are_rejected() {
        let stages = vec![Stage::new(0, "a"), Stage::new(50, "b"), Stage::new(40, "c")];
        assert!(StageTable::new(stages).is_err());
    }

    #[test]
    fn test_duplicate_thresholds_are_rejected() {
        let stages = vec![Stage::new(0, "a"), Stage::new(20, "b"), Stage::new(20, "c")];
        assert!(StageTable::new(stages).is_err());
    }

    #[test]
    fn test_threshold_above_100_is_rejected() {
        let stages = vec![Stage::new(0, "a"), Stage::new(101, "b")];
        assert!(StageTable::new(stages).is_err());
    }

    #[test]
    fn test_evenly_spaced() {
        let table = StageTable::evenly_spaced(["a", "b", "c"].map(String::from), 25).unwrap();
        let thresholds: Vec<u8> = table.iter().map(|s| s.threshold).collect();
        assert_eq!(thresholds, vec![0, 25, 50]);
    }

    #[test]
    fn test_evenly_spaced_overflow_is_rejected() {
        assert!(StageTable::evenly_spaced(["a", "b", "c"].map(String::from), 60).is_err());
        assert!(StageTable::evenly_spaced(["a"].map(String::from), 0).is_err());
    }

    #[test]
    fn test_blank_message_is_none() {
        let table = StageTable::new(vec![Stage::new(0, "  "), Stage::new(10, "busy")]).unwrap();
        assert_eq!(table.message(0), None);
        assert_eq!(table.message(1), Some("busy"));
        assert_eq!(table.message(2), None);
    }

    #[test]
    fn test_deserialize_validates() {
        #[derive(Deserialize)]
        struct Holder {
            stages: StageTable,
        }

        let ok: Holder = toml::from_str(
            r#"
            [[stages]]
            threshold = 0
            message = "start"

            [[stages]]
            threshold = 50
            message = "half"
            "#,
        )
        .unwrap();
        assert_eq!(ok.stages.len(), 2);

        let bad = toml::from_str::<Holder>(
            r#"
            [[stages]]
            threshold = 50
            message = "half"

            [[stages]]
            threshold = 10
            message = "start"
            "#,
        );
        assert!(bad.is_err());
    }
}
