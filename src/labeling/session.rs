use std::path::Path;

use tracing::{debug, info};

use super::SessionError;
use super::action::{Transition, UserAction};
use super::frame::Progress;
use crate::manifest::{Manifest, ManifestRow};

/// Navigation state over an owned manifest copy.
///
/// The current index always lies in `0..len` and both directions wrap. Labels
/// are only written through [`LabelingSession::assign_label`], which also
/// advances, so a row can only be relabeled by moving back to it.
#[derive(Debug, Clone)]
pub struct LabelingSession {
    manifest: Manifest,
    labels: Vec<String>,
    index: usize,
}

impl LabelingSession {
    pub fn new(
        manifest: Manifest,
        labels: Vec<String>,
        start_index: usize,
    ) -> Result<Self, SessionError> {
        if manifest.is_empty() {
            return Err(SessionError::EmptyManifest);
        }
        if start_index >= manifest.len() {
            return Err(SessionError::StartOutOfRange {
                start: start_index,
                len: manifest.len(),
            });
        }
        for (idx, label) in labels.iter().enumerate() {
            // An empty cell reads back as unset, so "" cannot be a label.
            if label.is_empty() {
                return Err(SessionError::EmptyLabel);
            }
            if labels[..idx].contains(label) {
                return Err(SessionError::DuplicateLabel(label.clone()));
            }
        }
        info!(
            rows = manifest.len(),
            labeled = manifest.labeled_count(),
            start = start_index,
            "Started labeling session"
        );
        Ok(Self {
            manifest,
            labels,
            index: start_index,
        })
    }

    /// Read a manifest CSV and start a session over it.
    pub fn from_manifest(
        path: &Path,
        labels: Vec<String>,
        start_index: usize,
    ) -> Result<Self, SessionError> {
        Self::new(Manifest::read(path)?, labels, start_index)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.manifest.len()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// The manifest with every label assigned so far.
    pub fn result(&self) -> &Manifest {
        &self.manifest
    }

    pub fn current_row(&self) -> &ManifestRow {
        &self.manifest.rows()[self.index]
    }

    pub fn progress(&self) -> Progress {
        Progress {
            current: self.index + 1,
            total: self.len(),
        }
    }

    pub fn labeled_count(&self) -> usize {
        self.manifest.labeled_count()
    }

    /// Every row carries a label. Informational; navigation never stops.
    pub fn is_complete(&self) -> bool {
        self.labeled_count() == self.len()
    }

    /// Move to the next row, wrapping to the first. Returns the new index.
    pub fn advance(&mut self) -> usize {
        self.index = (self.index + 1) % self.len();
        self.index
    }

    /// Move to the previous row, wrapping to the last. Returns the new index.
    pub fn retreat(&mut self) -> usize {
        self.index = (self.index + self.len() - 1) % self.len();
        self.index
    }

    /// Write `label` on the current row, then advance.
    pub fn assign_label(&mut self, label: &str) -> Result<usize, SessionError> {
        if !self.labels.iter().any(|known| known == label) {
            return Err(SessionError::UnknownLabel(label.to_string()));
        }
        self.manifest.set_label(self.index, label)?;
        debug!(row = self.index, label, "Assigned label");
        Ok(self.advance())
    }

    /// Apply a user action. Unknown labels leave the state untouched.
    pub fn apply(&mut self, action: &UserAction) -> Result<Transition, SessionError> {
        let from = self.index;
        let (to, labeled) = match action {
            UserAction::Previous => (self.retreat(), None),
            UserAction::Next => (self.advance(), None),
            UserAction::Label(label) => (self.assign_label(label)?, Some(label.clone())),
        };
        Ok(Transition { from, to, labeled })
    }

    /// Write the current table, labeled or not, as a fully quoted CSV.
    pub fn export(&self, path: &Path) -> Result<(), SessionError> {
        self.manifest.write_quoted(path)?;
        info!(
            path = %path.display(),
            labeled = self.labeled_count(),
            rows = self.len(),
            "Exported labels"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::ManifestRow;
    use tempfile::tempdir;

    fn manifest(rows: usize) -> Manifest {
        Manifest::new(
            vec!["raw".into(), "mask".into()],
            (0..rows)
                .map(|idx| {
                    ManifestRow::unlabeled(vec![
                        format!("raw/{idx}.tiff").into(),
                        format!("mask/{idx}.tiff").into(),
                    ])
                })
                .collect(),
        )
        .unwrap()
    }

    fn labels() -> Vec<String> {
        vec!["alive".into(), "dead".into()]
    }

    #[test]
    fn advance_and_retreat_wrap_around() {
        for start in 0..5 {
            let mut session = LabelingSession::new(manifest(5), labels(), start).unwrap();
            for _ in 0..5 {
                session.advance();
            }
            assert_eq!(session.index(), start);
            for _ in 0..5 {
                session.retreat();
            }
            assert_eq!(session.index(), start);
        }

        let mut session = LabelingSession::new(manifest(3), labels(), 2).unwrap();
        assert_eq!(session.advance(), 0);
        assert_eq!(session.retreat(), 2);
        let mut session = LabelingSession::new(manifest(3), labels(), 0).unwrap();
        assert_eq!(session.retreat(), 2);
    }

    #[test]
    fn single_row_session_stays_put() {
        let mut session = LabelingSession::new(manifest(1), labels(), 0).unwrap();
        assert_eq!(session.advance(), 0);
        assert_eq!(session.retreat(), 0);
        assert_eq!(session.assign_label("dead").unwrap(), 0);
        assert!(session.is_complete());
    }

    #[test]
    fn label_then_retreat_reads_back() {
        let mut session = LabelingSession::new(manifest(4), labels(), 3).unwrap();
        assert_eq!(session.assign_label("dead").unwrap(), 0);
        assert_eq!(session.result().row(3).unwrap().label.as_deref(), Some("dead"));
        session.retreat();
        assert_eq!(session.index(), 3);
        assert_eq!(session.current_row().label.as_deref(), Some("dead"));
        assert_eq!(session.labeled_count(), 1);
        assert!(!session.is_complete());
    }

    #[test]
    fn unknown_label_leaves_state_unchanged() {
        let mut session = LabelingSession::new(manifest(3), labels(), 1).unwrap();
        let err = session
            .apply(&UserAction::Label("zombie".into()))
            .unwrap_err();
        assert!(matches!(err, SessionError::UnknownLabel(_)));
        assert_eq!(session.index(), 1);
        assert_eq!(session.labeled_count(), 0);
    }

    #[test]
    fn apply_reports_transitions() {
        let mut session = LabelingSession::new(manifest(3), labels(), 0).unwrap();
        let back = session.apply(&UserAction::Previous).unwrap();
        assert_eq!(back, Transition { from: 0, to: 2, labeled: None });
        assert!(back.wrapped(&UserAction::Previous));

        let labeled = session.apply(&UserAction::Label("alive".into())).unwrap();
        assert_eq!(labeled.from, 2);
        assert_eq!(labeled.to, 0);
        assert_eq!(labeled.labeled.as_deref(), Some("alive"));

        let next = session.apply(&UserAction::Next).unwrap();
        assert_eq!(next, Transition { from: 0, to: 1, labeled: None });
        assert!(!next.wrapped(&UserAction::Next));
    }

    #[test]
    fn progress_is_one_based() {
        let mut session = LabelingSession::new(manifest(10), labels(), 0).unwrap();
        assert_eq!(session.progress(), Progress { current: 1, total: 10 });
        session.retreat();
        assert_eq!(session.progress().to_string(), "10/10");
    }

    #[test]
    fn construction_rejects_bad_inputs() {
        let empty = Manifest::new(vec!["raw".into()], Vec::new()).unwrap();
        assert!(matches!(
            LabelingSession::new(empty, labels(), 0),
            Err(SessionError::EmptyManifest)
        ));
        assert!(matches!(
            LabelingSession::new(manifest(2), labels(), 2),
            Err(SessionError::StartOutOfRange { start: 2, len: 2 })
        ));
        assert!(matches!(
            LabelingSession::new(manifest(2), vec!["a".into(), "a".into()], 0),
            Err(SessionError::DuplicateLabel(_))
        ));
    }

    #[test]
    fn empty_label_is_not_a_vocabulary_entry() {
        let labels = vec!["alive".to_string(), String::new()];
        assert!(matches!(
            LabelingSession::new(manifest(2), labels, 0),
            Err(SessionError::EmptyLabel)
        ));
    }

    #[test]
    fn session_owns_its_copy() {
        let original = manifest(2);
        let mut session = LabelingSession::new(original.clone(), labels(), 0).unwrap();
        session.assign_label("alive").unwrap();
        assert_eq!(original.labeled_count(), 0);
        assert_eq!(session.labeled_count(), 1);
    }

    #[test]
    fn export_then_resume_keeps_labels() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("labels.csv");
        let mut session = LabelingSession::new(manifest(3), labels(), 0).unwrap();
        session.assign_label("alive").unwrap();
        session.assign_label("dead").unwrap();
        session.export(&path).unwrap();

        let resumed = LabelingSession::from_manifest(&path, labels(), 2).unwrap();
        assert_eq!(resumed.result(), session.result());
        assert_eq!(resumed.index(), 2);
        assert_eq!(resumed.labeled_count(), 2);
    }
}
