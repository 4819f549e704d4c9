//! Append-only JSONL turn store.
//!
//! Each conversant gets a `<conversant_id>.jsonl` file under the history
//! directory. Every completed turn is appended as a single JSON line.
//! An in-memory write-through cache keeps reads off the disk after the
//! first load.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use ik_domain::error::{Error, Result};

/// One persisted conversation turn: the inbound message plus the reply
/// that was computed for it. Created once per inbound message; never
/// mutated or deleted afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// Channel-level sender address (e.g. the WhatsApp id).
    pub conversant_id: String,
    #[serde(default)]
    pub sender_name: Option<String>,
    /// Message kind as reported by the channel (e.g. `"text"`).
    pub kind: String,
    pub text: String,
    #[serde(default)]
    pub reply: Option<String>,
    pub received_at: String,
}

impl ConversationTurn {
    /// Build a turn stamped with the current time.
    pub fn new(conversant_id: &str, sender_name: Option<&str>, kind: &str, text: &str) -> Self {
        Self {
            conversant_id: conversant_id.to_owned(),
            sender_name: sender_name.map(ToOwned::to_owned),
            kind: kind.to_owned(),
            text: text.to_owned(),
            reply: None,
            received_at: Utc::now().to_rfc3339(),
        }
    }
}

/// Writes append-only JSONL turn files with an in-memory write-through
/// cache so reads never hit disk after the first load.
pub struct TurnStore {
    base_dir: PathBuf,
    cache: RwLock<HashMap<String, Vec<ConversationTurn>>>,
}

impl TurnStore {
    pub fn new(base_dir: &Path) -> Self {
        Self {
            base_dir: base_dir.to_path_buf(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Append one turn to a conversant's file.
    ///
    /// Writes to disk first — the cache is only updated when I/O succeeds.
    pub fn append(&self, turn: &ConversationTurn) -> Result<()> {
        let path = self.file_path(&turn.conversant_id);
        let json = serde_json::to_string(turn)
            .map_err(|e| Error::Other(format!("serializing turn: {e}")))?;

        use std::io::Write;
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(Error::Io)?;
        file.write_all(json.as_bytes()).map_err(Error::Io)?;
        file.write_all(b"\n").map_err(Error::Io)?;

        let mut cache = self.cache.write();
        cache
            .entry(turn.conversant_id.clone())
            .or_default()
            .push(turn.clone());

        Ok(())
    }

    /// The most recent `limit` turns for a conversant, newest-first.
    ///
    /// A conversant with no file yields an empty vec.
    pub fn recent(&self, conversant_id: &str, limit: usize) -> Result<Vec<ConversationTurn>> {
        let all = self.load(conversant_id)?;
        Ok(all.iter().rev().take(limit).cloned().collect())
    }

    // ── Private helpers ───────────────────────────────────────────────

    /// Full turn list in append order, cache-first.
    fn load(&self, conversant_id: &str) -> Result<Vec<ConversationTurn>> {
        {
            let cache = self.cache.read();
            if let Some(turns) = cache.get(conversant_id) {
                return Ok(turns.clone());
            }
        }

        let turns = read_jsonl_file(&self.file_path(conversant_id), conversant_id)?;
        let mut cache = self.cache.write();
        cache.insert(conversant_id.to_owned(), turns.clone());
        Ok(turns)
    }

    fn file_path(&self, conversant_id: &str) -> PathBuf {
        self.base_dir.join(format!("{}.jsonl", sanitize(conversant_id)))
    }
}

/// Keep conversant-derived filenames to a safe character set.
fn sanitize(id: &str) -> String {
    id.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '+' { c } else { '_' })
        .collect()
}

/// Read and parse a JSONL turn file. Malformed lines are skipped with a
/// warning, never fatal.
fn read_jsonl_file(path: &Path, conversant_id: &str) -> Result<Vec<ConversationTurn>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let raw = std::fs::read_to_string(path).map_err(Error::Io)?;
    let mut turns = Vec::new();
    for line in raw.lines() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<ConversationTurn>(line) {
            Ok(t) => turns.push(t),
            Err(e) => {
                tracing::warn!(conversant_id, error = %e, "skipping malformed turn line");
            }
        }
    }
    Ok(turns)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(conversant: &str, text: &str, reply: &str) -> ConversationTurn {
        let mut t = ConversationTurn::new(conversant, Some("Guest"), "text", text);
        t.reply = Some(reply.to_owned());
        t
    }

    #[test]
    fn recent_returns_newest_first_bounded_by_limit() {
        let dir = tempfile::tempdir().unwrap();
        let store = TurnStore::new(dir.path());

        for i in 1..=5 {
            store.append(&turn("4475550001", &format!("msg {i}"), "ok")).unwrap();
        }

        let recent = store.recent("4475550001", 3).unwrap();
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].text, "msg 5");
        assert_eq!(recent[2].text, "msg 3");
    }

    #[test]
    fn unknown_conversant_yields_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = TurnStore::new(dir.path());
        assert!(store.recent("nobody", 10).unwrap().is_empty());
    }

    #[test]
    fn turns_survive_a_fresh_store() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = TurnStore::new(dir.path());
            store.append(&turn("123", "hello", "hi there")).unwrap();
        }
        let store = TurnStore::new(dir.path());
        let recent = store.recent("123", 10).unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].reply.as_deref(), Some("hi there"));
    }

    #[test]
    fn malformed_line_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let store = TurnStore::new(dir.path());
        store.append(&turn("123", "first", "ok")).unwrap();

        use std::io::Write;
        let path = dir.path().join("123.jsonl");
        let mut f = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(f, "{{not json").unwrap();

        // Fresh store so the read comes from disk, not the cache.
        let store = TurnStore::new(dir.path());
        let recent = store.recent("123", 10).unwrap();
        assert_eq!(recent.len(), 1);
    }

    #[test]
    fn conversant_ids_are_sanitized_for_filenames() {
        let dir = tempfile::tempdir().unwrap();
        let store = TurnStore::new(dir.path());
        store.append(&turn("../evil", "hi", "ok")).unwrap();
        assert!(dir.path().join("___evil.jsonl").exists());
    }
}
