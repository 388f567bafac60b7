use super::naming::RevisionNaming;
use super::subrevision::{StepDirection, SubrevisionLog};
use super::transcript::{TranscriptAction, format_transcript};
use aivi_core::buffer::split_lines;
use aivi_core::context::ContextDocument;
use aivi_core::{AiviError, Result};
use chrono::Local;
use std::fs::{self, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Result of [`RevisionManager::write`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStatus {
    Wrote,
    Failed,
}

impl WriteStatus {
    /// Five-column status code.
    pub fn code(self) -> &'static str {
        match self {
            WriteStatus::Wrote => "wrote",
            WriteStatus::Failed => "no wr",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStatus {
    Read,
    NotFound,
    Denied,
    Directory,
    Empty,
    Io,
}

impl ReadStatus {
    /// Five-column status code.
    pub fn code(self) -> &'static str {
        match self {
            ReadStatus::Read => "read ",
            ReadStatus::NotFound => "not f",
            ReadStatus::Denied => "denid",
            ReadStatus::Directory => "dir  ",
            ReadStatus::Empty => "empty",
            ReadStatus::Io => "IO er",
        }
    }

    fn from_io(error: &io::Error) -> Self {
        match error.kind() {
            ErrorKind::NotFound => ReadStatus::NotFound,
            ErrorKind::PermissionDenied => ReadStatus::Denied,
            ErrorKind::IsADirectory => ReadStatus::Directory,
            _ => ReadStatus::Io,
        }
    }
}

/// Result of [`RevisionManager::read`]. `lines` is empty unless the status
/// is [`ReadStatus::Read`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOutcome {
    pub status: ReadStatus,
    pub lines: Vec<String>,
}

impl ReadOutcome {
    fn failed(status: ReadStatus) -> Self {
        Self {
            status,
            lines: Vec::new(),
        }
    }
}

/// Owns every file a session touches: the canonical document, its numbered
/// backups, transcripts, context documents and sub-revision artifacts.
///
/// Revision numbers come from scanning the directory, so a session reopened
/// later continues after the highest revision on disk. Nothing here returns
/// an I/O error to the editor loop except [`load_context`](Self::load_context);
/// failures become statuses and warnings.
#[derive(Debug)]
pub struct RevisionManager {
    naming: RevisionNaming,
    rev: u32,
    subrevisions: SubrevisionLog,
}

impl RevisionManager {
    pub fn open(canonical: impl AsRef<Path>) -> Self {
        let naming = RevisionNaming::new(canonical.as_ref());
        let rev = naming.scan();
        info!(
            "[Revision] Opened {:?} at r{}",
            naming.canonical(),
            rev
        );
        Self {
            naming,
            rev,
            subrevisions: SubrevisionLog::new(),
        }
    }

    pub fn canonical_path(&self) -> PathBuf {
        self.naming.canonical()
    }

    pub fn rev(&self) -> u32 {
        self.rev
    }

    /// Saves the edit buffer as a new revision.
    ///
    /// The new text is staged in a temporary sibling, then the existing
    /// canonical file is renamed to `base.{rev}.ext` and the staged file
    /// takes its place. Any failure leaves the canonical file and `rev` as
    /// they were. The numbering never goes backwards within a session even
    /// if backups were deleted meanwhile.
    pub fn write(&mut self, edit: &[String], command: &[String], viewpoint: &str) -> WriteStatus {
        let next = self.naming.scan().max(self.rev) + 1;
        let canonical = self.naming.canonical();
        let staging = self.naming.staging();

        if let Err(e) = fs::write(&staging, join_lines(edit)) {
            warn!("[Revision] Cannot stage {:?}: {}", staging, e);
            return WriteStatus::Failed;
        }

        let backup = canonical.exists().then(|| self.naming.backup(next));
        if let Some(backup) = &backup {
            if let Err(e) = fs::rename(&canonical, backup) {
                warn!("[Revision] Cannot back up {:?} to {:?}: {}", canonical, backup, e);
                discard(&staging);
                return WriteStatus::Failed;
            }
        }

        if let Err(e) = fs::rename(&staging, &canonical) {
            warn!("[Revision] Cannot replace {:?}: {}", canonical, e);
            if let Some(backup) = &backup {
                if let Err(e) = fs::rename(backup, &canonical) {
                    warn!("[Revision] Cannot restore {:?} from {:?}: {}", canonical, backup, e);
                }
            }
            discard(&staging);
            return WriteStatus::Failed;
        }
        self.rev = next;
        self.append_transcript(TranscriptAction::Write, viewpoint, command);
        info!("[Revision] Wrote {:?} as r{}", canonical, self.rev);
        WriteStatus::Wrote
    }

    /// Reads the canonical file. A clean read rescans the revision number.
    pub fn read(&mut self) -> ReadOutcome {
        let canonical = self.naming.canonical();
        if canonical.is_dir() {
            return ReadOutcome::failed(ReadStatus::Directory);
        }
        let text = match fs::read_to_string(&canonical) {
            Ok(text) => text,
            Err(e) => {
                let status = ReadStatus::from_io(&e);
                warn!("[Revision] Cannot read {:?}: {}", canonical, e);
                return ReadOutcome::failed(status);
            }
        };
        if text.is_empty() {
            return ReadOutcome::failed(ReadStatus::Empty);
        }
        self.rev = self.naming.scan();
        debug!("[Revision] Read {:?} at r{}", canonical, self.rev);
        ReadOutcome {
            status: ReadStatus::Read,
            lines: split_lines(&text),
        }
    }

    /// Appends formatted lines to the current revision's transcript.
    /// Returns false when the file could not be written.
    pub fn append_transcript<S: AsRef<str>>(
        &self,
        action: TranscriptAction,
        viewpoint: &str,
        lines: &[S],
    ) -> bool {
        let path = self.naming.transcript(self.rev);
        let formatted = format_transcript(action, viewpoint, lines);
        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .and_then(|mut file| file.write_all(join_lines(&formatted).as_bytes()));
        match result {
            Ok(()) => true,
            Err(e) => {
                warn!("[Revision] Cannot append transcript {:?}: {}", path, e);
                false
            }
        }
    }

    /// Writes the context document for the current revision.
    pub fn save_context(&self, document: &ContextDocument) -> bool {
        let path = self.naming.context(self.rev);
        let result = document
            .to_json()
            .and_then(|json| fs::write(&path, json).map_err(AiviError::from));
        match result {
            Ok(()) => true,
            Err(e) => {
                warn!("[Revision] Cannot save context {:?}: {}", path, e);
                false
            }
        }
    }

    pub fn load_context(&self, rev: u32) -> Result<ContextDocument> {
        let path = self.naming.context(rev);
        let json = fs::read_to_string(&path)
            .map_err(|e| AiviError::io(format!("Failed to read context {:?}: {}", path, e)))?;
        ContextDocument::from_json(&json)
    }

    /// Keeps the pre-exchange state as sub-revision 0 (first call only).
    pub fn record_original(&mut self, lines: &[String]) {
        self.subrevisions.record_original(lines);
    }

    pub fn has_original(&self) -> bool {
        self.subrevisions.has_original()
    }

    /// Stores a snapshot and writes its `.subrev` artifact. Returns the
    /// 1-based sub-revision index. The revision number is left alone.
    pub fn store_subrevision(
        &mut self,
        lines: &[String],
        document: &ContextDocument,
        kind: &str,
    ) -> usize {
        let index = self.subrevisions.push(kind, lines.to_vec());
        let path = self.naming.subrevision(self.rev, index);
        let result = document.to_json().and_then(|json| {
            let mut artifact = format!("{kind} {}\n", Local::now().to_rfc3339());
            artifact.push_str(&join_lines(lines));
            artifact.push_str(SUBREVISION_SEPARATOR);
            artifact.push('\n');
            artifact.push_str(&json);
            fs::write(&path, artifact).map_err(AiviError::from)
        });
        if let Err(e) = result {
            warn!("[Revision] Cannot write sub-revision {:?}: {}", path, e);
        }
        index
    }

    /// Moves the sub-revision pointer and returns the snapshot to display.
    pub fn step_subrevision(&mut self, direction: StepDirection) -> Option<Vec<String>> {
        let lines = self.subrevisions.step(direction)?.to_vec();
        let pointer = self.subrevisions.pointer();
        match self.subrevisions.get(pointer) {
            Some(entry) => debug!("[Revision] Showing s{} from {}", pointer, entry.kind),
            None => debug!("[Revision] Showing the original text"),
        }
        Some(lines)
    }

    pub fn subrevision_pointer(&self) -> usize {
        self.subrevisions.pointer()
    }

    pub fn subrevision_count(&self) -> usize {
        self.subrevisions.len()
    }
}

const SUBREVISION_SEPARATOR: &str = "----- context -----";

fn discard(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        debug!("[Revision] Cannot remove staged {:?}: {}", path, e);
    }
}

fn join_lines<S: AsRef<str>>(lines: &[S]) -> String {
    let mut text = String::new();
    for line in lines {
        text.push_str(line.as_ref());
        text.push('\n');
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use aivi_core::context::{ConversationContext, ConversationMessage};
    use aivi_core::viewpoint::get_default_presets;
    use tempfile::TempDir;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_write_then_read_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut manager = RevisionManager::open(dir.path().join("quickai.txt"));
        assert_eq!(manager.rev(), 0);

        let edit = lines(&["first line", "", "third"]);
        assert_eq!(manager.write(&edit, &lines(&["fix it"]), "Freestyle"), WriteStatus::Wrote);
        assert_eq!(manager.rev(), 1);

        let outcome = manager.read();
        assert_eq!(outcome.status, ReadStatus::Read);
        assert_eq!(outcome.lines, edit);
    }

    #[test]
    fn test_second_write_backs_up_first() {
        let dir = TempDir::new().unwrap();
        let mut manager = RevisionManager::open(dir.path().join("quickai.txt"));
        manager.write(&lines(&["v1"]), &[] as &[String], "Zen");
        manager.write(&lines(&["v2"]), &[] as &[String], "Zen");

        assert_eq!(manager.rev(), 2);
        let backup = fs::read_to_string(dir.path().join("quickai.2.txt")).unwrap();
        assert_eq!(backup, "v1\n");
        let current = fs::read_to_string(dir.path().join("quickai.txt")).unwrap();
        assert_eq!(current, "v2\n");
    }

    #[test]
    fn test_writes_never_collide_after_deletions() {
        let dir = TempDir::new().unwrap();
        let mut manager = RevisionManager::open(dir.path().join("quickai.txt"));
        manager.write(&lines(&["v1"]), &[] as &[String], "Zen");
        manager.write(&lines(&["v2"]), &[] as &[String], "Zen");
        manager.write(&lines(&["v3"]), &[] as &[String], "Zen");

        for entry in fs::read_dir(dir.path()).unwrap() {
            let path = entry.unwrap().path();
            if path.file_name().unwrap() != "quickai.txt" {
                fs::remove_file(path).unwrap();
            }
        }

        assert_eq!(manager.write(&lines(&["v4"]), &[] as &[String], "Zen"), WriteStatus::Wrote);
        assert_eq!(manager.rev(), 4);
        assert_eq!(fs::read_to_string(dir.path().join("quickai.4.txt")).unwrap(), "v3\n");
    }

    #[test]
    fn test_open_continues_after_existing_revisions() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("quickai.7.txt"), "old").unwrap();
        fs::write(dir.path().join("quickai.9.ctx"), "").unwrap();
        fs::write(dir.path().join("quickaiX.20.txt"), "").unwrap();
        let manager = RevisionManager::open(dir.path().join("quickai.txt"));
        assert_eq!(manager.rev(), 9);
    }

    #[test]
    fn test_read_statuses() {
        let dir = TempDir::new().unwrap();
        let mut missing = RevisionManager::open(dir.path().join("absent.txt"));
        assert_eq!(missing.read().status, ReadStatus::NotFound);

        fs::write(dir.path().join("blank.txt"), "").unwrap();
        let mut blank = RevisionManager::open(dir.path().join("blank.txt"));
        let outcome = blank.read();
        assert_eq!(outcome.status, ReadStatus::Empty);
        assert_eq!(outcome.status.code(), "empty");
        assert!(outcome.lines.is_empty());

        fs::create_dir(dir.path().join("folder.txt")).unwrap();
        let mut folder = RevisionManager::open(dir.path().join("folder.txt"));
        assert_eq!(folder.read().status.code(), "dir  ");
    }

    #[test]
    fn test_write_failure_is_a_status() {
        let dir = TempDir::new().unwrap();
        let mut manager = RevisionManager::open(dir.path().join("missing-dir").join("a.txt"));
        let status = manager.write(&lines(&["x"]), &[] as &[String], "Zen");
        assert_eq!(status, WriteStatus::Failed);
        assert_eq!(status.code(), "no wr");
    }

    #[test]
    fn test_failed_write_keeps_canonical_and_rev() {
        let dir = TempDir::new().unwrap();
        let mut manager = RevisionManager::open(dir.path().join("quickai.txt"));
        manager.write(&lines(&["v1"]), &[] as &[String], "Zen");

        // A directory in the staging slot makes the staged write fail.
        fs::create_dir(dir.path().join(".quickai.txt.tmp")).unwrap();
        let status = manager.write(&lines(&["v2"]), &[] as &[String], "Zen");
        assert_eq!(status, WriteStatus::Failed);
        assert_eq!(manager.rev(), 1);
        assert_eq!(fs::read_to_string(dir.path().join("quickai.txt")).unwrap(), "v1\n");
        assert!(!dir.path().join("quickai.2.txt").exists());

        fs::remove_dir(dir.path().join(".quickai.txt.tmp")).unwrap();
        assert_eq!(manager.write(&lines(&["v2"]), &[] as &[String], "Zen"), WriteStatus::Wrote);
        assert_eq!(manager.rev(), 2);
        assert_eq!(fs::read_to_string(dir.path().join("quickai.2.txt")).unwrap(), "v1\n");
        assert!(!dir.path().join(".quickai.txt.tmp").exists());
    }

    #[test]
    fn test_transcript_appends() {
        let dir = TempDir::new().unwrap();
        let manager = RevisionManager::open(dir.path().join("quickai.txt"));
        assert!(manager.append_transcript(TranscriptAction::Query, "Zen", &["a"]));
        assert!(manager.append_transcript(TranscriptAction::Reply, "Zen", &["b", "c"]));
        let text = fs::read_to_string(dir.path().join("quickai.0.ctx")).unwrap();
        assert_eq!(text, "000<[Zen][Query]a\n000<[Zen][Reply]b\n001<[Zen][Reply]c\n");
    }

    #[test]
    fn test_context_save_then_load() {
        let dir = TempDir::new().unwrap();
        let viewpoint = &get_default_presets()[0];
        let mut context = ConversationContext::for_viewpoint(viewpoint);
        context.append_user("Teh cat");
        context.append_assistant("The cat");
        let manager = RevisionManager::open(dir.path().join("quickai.txt"));

        assert!(manager.save_context(&context.to_document(viewpoint)));
        let loaded = manager.load_context(0).unwrap();
        assert_eq!(loaded.model, viewpoint.model);
        assert_eq!(loaded.messages, context.messages());
        assert!(matches!(
            loaded.messages.last(),
            Some(ConversationMessage { content, .. }) if content == "The cat"
        ));
        assert!(manager.load_context(5).unwrap_err().is_io());
    }

    #[test]
    fn test_subrevisions_do_not_touch_rev() {
        let dir = TempDir::new().unwrap();
        let viewpoint = &get_default_presets()[0];
        let document = ConversationContext::for_viewpoint(viewpoint).to_document(viewpoint);
        let mut manager = RevisionManager::open(dir.path().join("quickai.txt"));

        manager.record_original(&lines(&["orig"]));
        assert_eq!(manager.store_subrevision(&lines(&["one"]), &document, "concatenate"), 1);
        assert_eq!(manager.store_subrevision(&lines(&["two"]), &document, "replace"), 2);
        assert_eq!(manager.rev(), 0);

        let artifact = fs::read_to_string(dir.path().join("quickai.0.2.subrev")).unwrap();
        assert!(artifact.starts_with("replace "));
        assert!(artifact.contains("\ntwo\n----- context -----\n"));

        assert_eq!(manager.step_subrevision(StepDirection::Forward), Some(lines(&["orig"])));
        assert_eq!(manager.step_subrevision(StepDirection::Backward), Some(lines(&["two"])));
    }
}
