use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What kinds of source references an import invocation accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportMode {
    /// Only a single-file reference is accepted; folder references are
    /// rejected before any network call.
    FileOnly,
    /// A file or a folder reference is accepted.
    FileOrFolder,
}

/// Where imported files land in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportTarget {
    /// Append files to an existing document.
    Document(Uuid),
    /// Create one new document per imported item inside this section.
    Section { section_id: Uuid },
    /// Materialize one new document in the section as the import target and
    /// attach every imported file to it. `name` defaults to the source
    /// folder's name.
    NewSubfolder {
        section_id: Uuid,
        name: Option<String>,
    },
}

/// Caller-facing result of one external import run. `run_id` correlates the
/// result with trace logs and the run's audit entry; `trace` is a bounded log
/// of operational milestones kept even on total failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportReport {
    pub run_id: Uuid,
    pub scanned: usize,
    pub imported: usize,
    pub skipped: usize,
    pub skipped_samples: Vec<String>,
    pub trace: Vec<String>,
}

impl ImportReport {
    pub fn empty(run_id: Uuid) -> Self {
        ImportReport {
            run_id,
            scanned: 0,
            imported: 0,
            skipped: 0,
            skipped_samples: Vec::new(),
            trace: Vec::new(),
        }
    }
}
