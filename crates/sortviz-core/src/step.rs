//! Observable step records.
//!
//! A [`Step`] describes one engine action that a renderer can animate. Steps
//! are stamped with a per-run sequence number by the [`StepEmitter`] and are
//! delivered in strict chronological order.
//!
//! [`StepEmitter`]: crate::StepEmitter

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// What an engine did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StepKind {
    Compare,
    Swap,
    Overwrite,
    Read,
    MarkSorted,
    MarkPivot,
    Reset,
    Done,
}

impl StepKind {
    /// Marker steps only change how positions are highlighted. They honor
    /// pause and cancel but are not held for the pacing delay.
    #[must_use]
    pub const fn is_marker(self) -> bool {
        matches!(
            self,
            Self::MarkSorted | Self::MarkPivot | Self::Reset | Self::Done
        )
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Compare => "compare",
            Self::Swap => "swap",
            Self::Overwrite => "overwrite",
            Self::Read => "read",
            Self::MarkSorted => "mark_sorted",
            Self::MarkPivot => "mark_pivot",
            Self::Reset => "reset",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One observable engine action.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Step {
    seq: u64,
    kind: StepKind,
    indices: Vec<usize>,
    values: Vec<u32>,
    metadata: Vec<(String, String)>,
}

impl Step {
    /// Create an unstamped step. The emitter assigns the sequence number.
    #[must_use]
    pub fn new(kind: StepKind, indices: Vec<usize>, values: Vec<u32>) -> Self {
        Self {
            seq: 0,
            kind,
            indices,
            values,
            metadata: Vec::new(),
        }
    }

    /// A step touching a single position.
    #[must_use]
    pub fn at(kind: StepKind, index: usize, value: u32) -> Self {
        Self::new(kind, vec![index], vec![value])
    }

    /// A step touching two positions.
    #[must_use]
    pub fn pair(kind: StepKind, (i, j): (usize, usize), (vi, vj): (u32, u32)) -> Self {
        Self::new(kind, vec![i, j], vec![vi, vj])
    }

    /// A step with no positions (`Reset`, `Done`).
    #[must_use]
    pub fn bare(kind: StepKind) -> Self {
        Self::new(kind, Vec::new(), Vec::new())
    }

    /// Attach a metadata entry. Later entries with the same key shadow
    /// earlier ones on lookup.
    #[must_use]
    pub fn with_meta(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        self.metadata.push((key.into(), value.to_string()));
        self
    }

    pub(crate) fn stamped(mut self, seq: u64) -> Self {
        self.seq = seq;
        self
    }

    #[must_use]
    pub fn seq(&self) -> u64 {
        self.seq
    }

    #[must_use]
    pub fn kind(&self) -> StepKind {
        self.kind
    }

    #[must_use]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    #[must_use]
    pub fn values(&self) -> &[u32] {
        &self.values
    }

    #[must_use]
    pub fn metadata(&self) -> &[(String, String)] {
        &self.metadata
    }

    /// Look up the most recent metadata value for `key`.
    #[must_use]
    pub fn meta(&self, key: &str) -> Option<&str> {
        self.metadata
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}", self.seq, self.kind)?;
        if !self.indices.is_empty() {
            write!(f, " {:?}", self.indices)?;
        }
        if !self.values.is_empty() {
            write!(f, " = {:?}", self.values)?;
        }
        for (key, value) in &self.metadata {
            write!(f, " {key}={value}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_kinds_are_not_paced() {
        assert!(StepKind::MarkSorted.is_marker());
        assert!(StepKind::MarkPivot.is_marker());
        assert!(StepKind::Reset.is_marker());
        assert!(StepKind::Done.is_marker());
        assert!(!StepKind::Compare.is_marker());
        assert!(!StepKind::Swap.is_marker());
        assert!(!StepKind::Overwrite.is_marker());
        assert!(!StepKind::Read.is_marker());
    }

    #[test]
    fn meta_lookup_prefers_latest_entry() {
        let step = Step::bare(StepKind::Done)
            .with_meta("pass", 1)
            .with_meta("pass", 2);
        assert_eq!(step.meta("pass"), Some("2"));
        assert_eq!(step.meta("digit"), None);
    }

    #[test]
    fn display_is_compact() {
        let step = Step::pair(StepKind::Swap, (0, 1), (3, 5))
            .with_meta("pass", 1)
            .stamped(4);
        assert_eq!(step.to_string(), "#4 swap [0, 1] = [3, 5] pass=1");
    }
}
