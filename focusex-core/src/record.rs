use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{ConditionLabel, SampleBlock, SelfReport};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("condition {0} already recorded this session")]
    DuplicateCondition(ConditionLabel),
    #[error("session incomplete, missing {missing:?}")]
    IncompleteSession { missing: Vec<ConditionLabel> },
    #[error("focus rating {0} outside 1..=5")]
    InvalidRating(u8),
}

/// Everything captured for one condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionRecord {
    pub baseline: SampleBlock,
    pub pre_trial: SampleBlock,
    pub trial: SampleBlock,
    pub self_report: SelfReport,
}

/// Completed session, keyed by condition.
///
/// Only [`SessionRecordBuilder::finish`] produces one, so a record always
/// holds exactly the conditions the session was asked to run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionRecord {
    conditions: BTreeMap<ConditionLabel, ConditionRecord>,
}

impl SessionRecord {
    pub fn builder() -> SessionRecordBuilder {
        SessionRecordBuilder::default()
    }

    pub fn get(&self, label: ConditionLabel) -> Option<&ConditionRecord> {
        self.conditions.get(&label)
    }

    pub fn labels(&self) -> impl Iterator<Item = ConditionLabel> + '_ {
        self.conditions.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ConditionLabel, &ConditionRecord)> {
        self.conditions.iter().map(|(label, record)| (*label, record))
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct SessionRecordBuilder {
    conditions: BTreeMap<ConditionLabel, ConditionRecord>,
}

impl SessionRecordBuilder {
    pub fn insert(
        &mut self,
        label: ConditionLabel,
        record: ConditionRecord,
    ) -> Result<(), RecordError> {
        if self.conditions.contains_key(&label) {
            return Err(RecordError::DuplicateCondition(label));
        }
        self.conditions.insert(label, record);
        Ok(())
    }

    /// Seals the record once every expected condition is present.
    pub fn finish<'a, I>(self, expected: I) -> Result<SessionRecord, RecordError>
    where
        I: IntoIterator<Item = &'a ConditionLabel>,
    {
        let missing: Vec<ConditionLabel> = expected
            .into_iter()
            .filter(|label| !self.conditions.contains_key(*label))
            .copied()
            .collect();
        if !missing.is_empty() {
            return Err(RecordError::IncompleteSession { missing });
        }
        Ok(SessionRecord {
            conditions: self.conditions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AcquisitionPhase, FocusRating};

    fn record(report: SelfReport) -> ConditionRecord {
        ConditionRecord {
            baseline: SampleBlock::new(AcquisitionPhase::Baseline, vec![vec![1.0, 2.0]]),
            pre_trial: SampleBlock::new(AcquisitionPhase::PreTrial, vec![vec![3.0]]),
            trial: SampleBlock::new(AcquisitionPhase::Task, vec![vec![4.0, 5.0, 6.0]]),
            self_report: report,
        }
    }

    #[test]
    fn duplicate_condition_is_rejected() {
        let mut builder = SessionRecord::builder();
        builder
            .insert(ConditionLabel::Fatigue, record(SelfReport::NoResponse))
            .unwrap();
        assert_eq!(
            builder.insert(ConditionLabel::Fatigue, record(SelfReport::NoResponse)),
            Err(RecordError::DuplicateCondition(ConditionLabel::Fatigue))
        );
        let session = builder.finish(&[ConditionLabel::Fatigue]).unwrap();
        assert_eq!(session.len(), 1);
    }

    #[test]
    fn finish_reports_missing_conditions() {
        let mut builder = SessionRecord::builder();
        builder
            .insert(ConditionLabel::LowAttention, record(SelfReport::NoResponse))
            .unwrap();
        let err = builder.finish(&ConditionLabel::ALL).unwrap_err();
        assert_eq!(
            err,
            RecordError::IncompleteSession {
                missing: vec![ConditionLabel::HighAttention, ConditionLabel::Fatigue]
            }
        );
    }

    #[test]
    fn serializes_as_mapping_keyed_by_label() {
        let mut builder = SessionRecord::builder();
        let rated = SelfReport::Rated(FocusRating::try_from(4).unwrap());
        builder.insert(ConditionLabel::HighAttention, record(rated)).unwrap();
        let session = builder.finish(&[ConditionLabel::HighAttention]).unwrap();

        let value = serde_json::to_value(&session).unwrap();
        let entry = &value["HighAttention"];
        assert_eq!(entry["self_report"], 4);
        assert_eq!(entry["baseline"]["phase"], "baseline");
        assert_eq!(entry["trial"]["channels"][0][2], 6.0);

        let back: SessionRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, session);
    }
}
