//! @ai:module:intent Accumulate stored diagnostics into severity and file indexes
//! @ai:module:layer domain
//! @ai:module:public_api DiagnosticStore, DiagnosticId
//! @ai:module:depends_on diagnostic, severity

use crate::diagnostic::Diagnostic;
use crate::severity::Severity;
use std::collections::{BTreeMap, HashMap};

/// @ai:intent Stable handle to a record inside one store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DiagnosticId(usize);

/// @ai:intent Two derived indexes over a single list of diagnostic records
/// @ai:invariant every record id appears exactly once in `by_severity` and once in `by_file`
/// @ai:invariant index order is recognition order
#[derive(Debug, Default)]
pub struct DiagnosticStore {
    records: Vec<Diagnostic>,
    by_severity: BTreeMap<Severity, Vec<DiagnosticId>>,
    by_file: Vec<(String, Vec<DiagnosticId>)>,
    file_slots: HashMap<String, usize>,
}

impl DiagnosticStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// @ai:intent Append a diagnostic to both indexes in one step
    /// @ai:post the record is reachable from its severity bucket and its file
    /// @ai:effects mutates self
    pub(crate) fn record(&mut self, diagnostic: Diagnostic) -> DiagnosticId {
        let id = DiagnosticId(self.records.len());

        self.by_severity
            .entry(diagnostic.severity.bucket())
            .or_default()
            .push(id);

        let slot = match self.file_slots.get(&diagnostic.path) {
            Some(slot) => *slot,
            None => {
                let slot = self.by_file.len();
                self.by_file.push((diagnostic.path.clone(), Vec::new()));
                self.file_slots.insert(diagnostic.path.clone(), slot);
                slot
            }
        };
        self.by_file[slot].1.push(id);

        self.records.push(diagnostic);
        id
    }

    /// @ai:intent Append continuation text to a record still inside the correlation window
    /// @ai:effects mutates self
    pub(crate) fn append_message(&mut self, id: DiagnosticId, text: &str) {
        if let Some(record) = self.records.get_mut(id.0) {
            record.message.push('\n');
            record.message.push_str(text);
        }
    }

    pub fn get(&self, id: DiagnosticId) -> Option<&Diagnostic> {
        self.records.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// @ai:intent All records in recognition order
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.records.iter()
    }

    /// @ai:intent Records in one reporting bucket, fatal diagnostics included under `Error`
    /// @ai:effects pure
    pub fn by_severity(&self, severity: Severity) -> impl Iterator<Item = &Diagnostic> {
        self.by_severity
            .get(&severity.bucket())
            .map(|ids| ids.as_slice())
            .unwrap_or_default()
            .iter()
            .map(|id| &self.records[id.0])
    }

    /// @ai:intent Number of records in one reporting bucket
    pub fn count(&self, severity: Severity) -> usize {
        self.by_severity
            .get(&severity.bucket())
            .map_or(0, |ids| ids.len())
    }

    /// @ai:intent Records of one file in recognition order
    /// @ai:effects pure
    pub fn by_file(&self, path: &str) -> impl Iterator<Item = &Diagnostic> {
        self.file_slots
            .get(path)
            .map(|slot| self.by_file[*slot].1.as_slice())
            .unwrap_or_default()
            .iter()
            .map(|id| &self.records[id.0])
    }

    /// @ai:intent Distinct files in first-seen order
    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.by_file.iter().map(|(path, _)| path.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diag(path: &str, severity: Severity) -> Diagnostic {
        Diagnostic::new(path, 1, None, severity, "msg")
    }

    #[test]
    fn test_record_updates_both_indexes() {
        let mut store = DiagnosticStore::new();
        store.record(diag("a.pas", Severity::Warning));
        store.record(diag("b.pas", Severity::Error));
        store.record(diag("a.pas", Severity::Fatal));

        assert_eq!(store.len(), 3);
        assert_eq!(store.count(Severity::Error), 2);
        assert_eq!(store.count(Severity::Fatal), 2);
        assert_eq!(store.count(Severity::Warning), 1);
        assert_eq!(store.count(Severity::Hint), 0);
        assert_eq!(store.by_file("a.pas").count(), 2);
        assert_eq!(store.by_file("missing.pas").count(), 0);
    }

    #[test]
    fn test_files_keep_first_seen_order() {
        let mut store = DiagnosticStore::new();
        store.record(diag("z.pas", Severity::Hint));
        store.record(diag("a.pas", Severity::Hint));
        store.record(diag("z.pas", Severity::Hint));
        assert_eq!(store.files().collect::<Vec<_>>(), vec!["z.pas", "a.pas"]);
    }

    #[test]
    fn test_fatal_keeps_original_severity_in_error_bucket() {
        let mut store = DiagnosticStore::new();
        store.record(diag("a.pas", Severity::Fatal));
        let bucket: Vec<_> = store.by_severity(Severity::Error).collect();
        assert_eq!(bucket.len(), 1);
        assert_eq!(bucket[0].severity, Severity::Fatal);
    }

    #[test]
    fn test_append_message_is_visible_through_every_index() {
        let mut store = DiagnosticStore::new();
        let id = store.record(diag("a.pas", Severity::Error));
        store.append_message(id, "more");
        assert_eq!(store.get(id).unwrap().message, "msg\nmore");
        assert_eq!(store.by_file("a.pas").next().unwrap().message, "msg\nmore");
        assert_eq!(store.by_severity(Severity::Error).next().unwrap().message, "msg\nmore");
    }
}
