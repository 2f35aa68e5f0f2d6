//! Generation log (v1).
//!
//! The log is the durable unit of prompt history. It stores, in order:
//! - each validated prompt-history record
//! - the result record returned for it, once one arrives

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use uuid::Uuid;

use crate::{GenerationResultRecord, PromptHistoryRecord, RecordError, RECORD_SCHEMA_VERSION};

/// File extension recommended for saved logs.
pub const LOG_FILE_EXT: &str = "sketchlog.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub prompt: PromptHistoryRecord,
    #[serde(default)]
    pub result: Option<GenerationResultRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationLog {
    pub log_id: Uuid,
    pub schema_version: String,
    pub entries: Vec<LogEntry>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Default for GenerationLog {
    fn default() -> Self {
        Self::new()
    }
}

impl GenerationLog {
    pub fn new() -> Self {
        Self {
            log_id: Uuid::new_v4(),
            schema_version: RECORD_SCHEMA_VERSION.to_string(),
            entries: vec![],
            notes: None,
        }
    }

    /// Validate and append a prompt record. Returns its id.
    pub fn push_prompt(&mut self, record: PromptHistoryRecord) -> Result<Uuid, RecordError> {
        record.validate()?;
        let id = record.id;
        tracing::debug!(
            record_id = %id,
            img2img = record.is_img2img(),
            "prompt record logged"
        );
        self.entries.push(LogEntry {
            prompt: record,
            result: None,
        });
        Ok(id)
    }

    /// Attach the result for a logged prompt. A later result replaces an earlier one.
    pub fn attach_result(&mut self, result: GenerationResultRecord) -> Result<Uuid, RecordError> {
        let prompt_id = result.prompt_history_id;
        if result.images.is_empty() {
            return Err(RecordError::EmptyResult { id: prompt_id });
        }

        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.prompt.id == prompt_id)
            .ok_or(RecordError::UnknownPromptRecord { id: prompt_id })?;

        let result_id = result.id;
        if entry.result.is_some() {
            tracing::warn!(record_id = %prompt_id, "replacing existing result");
        }
        tracing::info!(
            record_id = %prompt_id,
            images = result.images.len(),
            "result attached"
        );
        entry.result = Some(result);
        Ok(result_id)
    }

    pub fn find(&self, prompt_id: Uuid) -> Option<&LogEntry> {
        self.entries.iter().find(|e| e.prompt.id == prompt_id)
    }

    /// Most recent entry that has a result.
    pub fn latest_result(&self) -> Option<&GenerationResultRecord> {
        self.entries.iter().rev().find_map(|e| e.result.as_ref())
    }

    pub fn pending(&self) -> impl Iterator<Item = &PromptHistoryRecord> {
        self.entries
            .iter()
            .filter(|e| e.result.is_none())
            .map(|e| &e.prompt)
    }
}

/// Save a log to disk as pretty JSON.
pub fn save_log(path: impl AsRef<Path>, log: &GenerationLog) -> anyhow::Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create parent dir: {}", parent.display()))?;
    }

    let json = serde_json::to_string_pretty(log).context("serialize log to json")?;
    fs::write(path, json).with_context(|| format!("write log file: {}", path.display()))?;
    tracing::info!(path = %path.display(), entries = log.entries.len(), "log saved");
    Ok(())
}

/// Load a log from disk.
pub fn load_log(path: impl AsRef<Path>) -> anyhow::Result<GenerationLog> {
    let path = path.as_ref();
    let data =
        fs::read_to_string(path).with_context(|| format!("read log file: {}", path.display()))?;
    let log: GenerationLog = serde_json::from_str(&data).context("parse log json")?;
    Ok(log)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn attach_requires_known_prompt() {
        let mut log = GenerationLog::new();
        let orphan = GenerationResultRecord::new(Uuid::new_v4(), vec!["img".into()], json!({}), "");
        assert!(matches!(
            log.attach_result(orphan),
            Err(RecordError::UnknownPromptRecord { .. })
        ));
    }

    #[test]
    fn attach_rejects_empty_results() {
        let mut log = GenerationLog::new();
        let id = log.push_prompt(PromptHistoryRecord::new("cat")).unwrap();
        let empty = GenerationResultRecord::new(id, vec![], json!({}), "");
        assert!(matches!(log.attach_result(empty), Err(RecordError::EmptyResult { .. })));
    }

    #[test]
    fn invalid_prompt_is_not_logged() {
        let mut log = GenerationLog::new();
        assert!(log.push_prompt(PromptHistoryRecord::new("")).is_err());
        assert!(log.entries.is_empty());
    }

    #[test]
    fn latest_result_and_pending() {
        let mut log = GenerationLog::new();
        let first = log.push_prompt(PromptHistoryRecord::new("one")).unwrap();
        let second = log.push_prompt(PromptHistoryRecord::new("two")).unwrap();
        assert_eq!(log.pending().count(), 2);
        assert!(log.latest_result().is_none());

        log.attach_result(GenerationResultRecord::new(first, vec!["a".into()], json!({}), "i"))
            .unwrap();
        assert_eq!(log.latest_result().unwrap().prompt_history_id, first);
        assert_eq!(log.pending().map(|p| p.id).collect::<Vec<_>>(), vec![second]);
    }
}
