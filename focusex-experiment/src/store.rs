use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use focusex_core::SessionRecord;
use log::{info, warn};
use serde::{Deserialize, Serialize};

pub const FILE_PREFIX: &str = "eeg_experiment_";
pub const TRIAL_PREFIX: &str = "eeg_experiment_trial_";
pub const EXTENSION: &str = "json";

/// How a result file is named. One policy per save, never combined.
#[derive(Copy, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingPolicy {
    /// `eeg_experiment_<YYYYmmdd_HHMMSS>.json`, local time.
    #[default]
    Timestamp,
    /// `eeg_experiment_trial_<NNN>.json`, one past the highest number on disk.
    Sequential,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to serialize session record: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StoreError {
    fn io<'a>(action: &'static str, path: &'a Path) -> impl FnOnce(io::Error) -> StoreError + 'a {
        move |source| StoreError::Io {
            action,
            path: path.to_path_buf(),
            source,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResultStore {
    dir: PathBuf,
    naming: NamingPolicy,
}

impl ResultStore {
    pub fn new<P: Into<PathBuf>>(dir: P, naming: NamingPolicy) -> Self {
        Self {
            dir: dir.into(),
            naming,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn naming(&self) -> NamingPolicy {
        self.naming
    }

    pub fn persist(&self, record: &SessionRecord) -> Result<PathBuf, StoreError> {
        self.persist_at(record, Local::now().naive_local())
    }

    /// Writes `record` in one atomic step and returns the file path.
    pub fn persist_at(
        &self,
        record: &SessionRecord,
        now: NaiveDateTime,
    ) -> Result<PathBuf, StoreError> {
        fs::create_dir_all(&self.dir).map_err(StoreError::io("failed to create", &self.dir))?;

        let name = self.file_name(now)?;
        let path = self.dir.join(&name);
        if path.exists() {
            warn!("overwriting existing result file {}", path.display());
        }

        let bytes = serde_json::to_vec_pretty(record)?;
        write_atomic(&path, &bytes)?;
        info!(
            "saved {} conditions to {} ({} bytes)",
            record.len(),
            path.display(),
            bytes.len()
        );
        Ok(path)
    }

    pub fn file_name(&self, now: NaiveDateTime) -> Result<String, StoreError> {
        match self.naming {
            NamingPolicy::Timestamp => Ok(timestamp_file_name(now)),
            NamingPolicy::Sequential => next_trial_file_name(&self.dir)
                .map_err(StoreError::io("failed to scan", &self.dir)),
        }
    }
}

/// Same instant, same name. Two saves within one second collide.
pub fn timestamp_file_name(now: NaiveDateTime) -> String {
    format!("{FILE_PREFIX}{}.{EXTENSION}", now.format("%Y%m%d_%H%M%S"))
}

/// Sequence number of a `eeg_experiment_trial_<digits>.json` name.
pub fn trial_number(file_name: &str) -> Option<u64> {
    let digits = file_name
        .strip_prefix(TRIAL_PREFIX)?
        .strip_suffix(EXTENSION)?
        .strip_suffix('.')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

pub fn next_trial_file_name(dir: &Path) -> io::Result<String> {
    let mut highest = 0u64;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if let Some(n) = entry.file_name().to_str().and_then(trial_number) {
            highest = highest.max(n);
        }
    }
    let next = highest.checked_add(1).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("trial number {highest} has no successor"),
        )
    })?;
    Ok(format!("{TRIAL_PREFIX}{next:03}.{EXTENSION}"))
}

/// Temp file in the target directory, synced, then renamed over `path`.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("session");
    let tmp = path.with_file_name(format!(".{file_name}.tmp"));

    let written = File::create(&tmp)
        .and_then(|mut file| {
            file.write_all(bytes)?;
            file.sync_all()
        })
        .map_err(StoreError::io("failed to write", &tmp))
        .and_then(|()| fs::rename(&tmp, path).map_err(StoreError::io("failed to rename", path)));

    if written.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    written
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use focusex_core::{
        AcquisitionPhase, ConditionLabel, ConditionRecord, SampleBlock, SelfReport,
    };

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 14)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn session() -> SessionRecord {
        let mut builder = SessionRecord::builder();
        for label in ConditionLabel::ALL {
            builder
                .insert(
                    label,
                    ConditionRecord {
                        baseline: SampleBlock::new(AcquisitionPhase::Baseline, vec![vec![0.1; 4]]),
                        pre_trial: SampleBlock::empty(AcquisitionPhase::PreTrial),
                        trial: SampleBlock::new(AcquisitionPhase::Task, vec![vec![0.2; 8]]),
                        self_report: SelfReport::NoResponse,
                    },
                )
                .unwrap();
        }
        builder.finish(&ConditionLabel::ALL).unwrap()
    }

    #[test]
    fn timestamp_name_has_second_resolution() {
        assert_eq!(
            timestamp_file_name(at(9, 5, 7)),
            "eeg_experiment_20260314_090507.json"
        );
        assert_eq!(timestamp_file_name(at(9, 5, 7)), timestamp_file_name(at(9, 5, 7)));
    }

    #[test]
    fn trial_numbers_are_parsed_strictly() {
        assert_eq!(trial_number("eeg_experiment_trial_007.json"), Some(7));
        assert_eq!(trial_number("eeg_experiment_trial_1234.json"), Some(1234));
        assert_eq!(trial_number("eeg_experiment_trial_.json"), None);
        assert_eq!(trial_number("eeg_experiment_trial_01a.json"), None);
        assert_eq!(trial_number("eeg_experiment_trial_002.npy"), None);
        assert_eq!(trial_number("eeg_experiment_20260314_090507.json"), None);
    }

    #[test]
    fn sequential_name_starts_at_one() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            next_trial_file_name(dir.path()).unwrap(),
            "eeg_experiment_trial_001.json"
        );
    }

    #[test]
    fn sequential_name_is_max_plus_one_across_gaps() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "eeg_experiment_trial_001.json",
            "eeg_experiment_trial_003.json",
            "eeg_experiment_trial_009.npy",
            "notes.txt",
        ] {
            fs::write(dir.path().join(name), b"{}").unwrap();
        }
        assert_eq!(
            next_trial_file_name(dir.path()).unwrap(),
            "eeg_experiment_trial_004.json"
        );
    }

    #[test]
    fn sequential_name_continues_past_u32() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("eeg_experiment_trial_4294967295.json"), b"{}").unwrap();
        assert_eq!(
            next_trial_file_name(dir.path()).unwrap(),
            "eeg_experiment_trial_4294967296.json"
        );
    }

    #[test]
    fn exhausted_trial_numbers_are_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let last = format!("eeg_experiment_trial_{}.json", u64::MAX);
        fs::write(dir.path().join(last), b"{}").unwrap();

        let err = next_trial_file_name(dir.path()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);

        let store = ResultStore::new(dir.path(), NamingPolicy::Sequential);
        assert!(matches!(
            store.persist(&session()),
            Err(StoreError::Io { action: "failed to scan", .. })
        ));
    }

    #[test]
    fn persisted_record_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::new(dir.path(), NamingPolicy::Timestamp);
        let record = session();

        let path = store.persist_at(&record, at(14, 0, 0)).unwrap();
        assert_eq!(path, dir.path().join("eeg_experiment_20260314_140000.json"));

        let back: SessionRecord = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(back, record);

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(leftovers.len(), 1, "temporary file left behind: {leftovers:?}");
    }

    #[test]
    fn sequential_saves_count_up() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::new(dir.path().join("results"), NamingPolicy::Sequential);
        let record = session();

        let first = store.persist(&record).unwrap();
        let second = store.persist(&record).unwrap();
        assert!(first.ends_with("eeg_experiment_trial_001.json"));
        assert!(second.ends_with("eeg_experiment_trial_002.json"));
    }

    #[test]
    fn unwritable_directory_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("occupied");
        fs::write(&blocker, b"not a directory").unwrap();

        let store = ResultStore::new(&blocker, NamingPolicy::Timestamp);
        assert!(matches!(
            store.persist(&session()),
            Err(StoreError::Io { .. })
        ));
    }
}
