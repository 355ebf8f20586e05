//! Human-readable report, shared by the console and the audit log.
//!
//! # Layout
//!
//! ```text
//! Duplicate entries:
//! ==================================================
//! Type: File
//! Fingerprint (md5): 5eb63bbbe01eeed093cb22bb8f5acdc3
//! Path 1: ./a/hello.txt
//! Path 2: ./b/copy.txt
//! --------------------------------------------------
//! Type: Directory
//! Name: temp
//! Path 1: ./x/temp
//! Path 2: ./y/temp
//! ==================================================
//! ```
//!
//! In name mode, `--show-fingerprints` adds a `Fingerprint i:` line before
//! each file's `Path i:` line. A scan that did not cover the whole tree ends
//! with a notice so a partial report is never mistaken for a clean one.

use crate::duplicates::{DuplicateGroup, GroupKey, GroupKind, ScanResult, ScanStatus};
use crate::scanner::{DigestAlgorithm, Fingerprinter};

const MAJOR_RULE_WIDTH: usize = 50;

/// Placeholder shown for a file whose fingerprint could not be computed.
pub const UNREADABLE: &str = "unreadable";

/// Message printed when a scan finds nothing to report.
pub const NO_DUPLICATES: &str = "No duplicate entries found.";

/// Renders a [`ScanResult`] as plain text.
#[derive(Debug, Clone)]
pub struct TextReport<'a> {
    result: &'a ScanResult,
    content: bool,
    digest: DigestAlgorithm,
    show_fingerprints: bool,
}

impl<'a> TextReport<'a> {
    /// Create a report for `result`.
    ///
    /// # Arguments
    ///
    /// * `result` - The scan result to render
    /// * `content` - Whether files were grouped by content fingerprint
    /// * `digest` - Algorithm the fingerprints were computed with
    #[must_use]
    pub fn new(result: &'a ScanResult, content: bool, digest: DigestAlgorithm) -> Self {
        Self {
            result,
            content,
            digest,
            show_fingerprints: false,
        }
    }

    /// Print a fingerprint for every file in name-mode groups.
    ///
    /// Content-mode groups already carry the fingerprint as their key, so
    /// the flag has no effect on them.
    #[must_use]
    pub fn with_fingerprints(mut self, show: bool) -> Self {
        self.show_fingerprints = show;
        self
    }

    /// Render the report to a string.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();

        if self.result.groups.is_empty() {
            out.push_str(NO_DUPLICATES);
            out.push('\n');
        } else {
            let major = "=".repeat(MAJOR_RULE_WIDTH);
            let minor = "-".repeat(MAJOR_RULE_WIDTH);

            out.push_str("Duplicate entries:\n");
            out.push_str(&major);
            out.push('\n');
            for (i, group) in self.result.groups.iter().enumerate() {
                if i > 0 {
                    out.push_str(&minor);
                    out.push('\n');
                }
                self.render_group(group, &mut out);
            }
            out.push_str(&major);
            out.push('\n');
        }

        if let Some(notice) = status_notice(self.result) {
            out.push_str(&notice);
            out.push('\n');
        }
        out
    }

    fn render_group(&self, group: &DuplicateGroup, out: &mut String) {
        let kind = group.kind();
        out.push_str(&format!("Type: {}\n", kind.label()));

        if self.is_content_group(group, kind) {
            out.push_str(&format!("Fingerprint ({}): {}\n", self.digest, group.key));
        } else {
            out.push_str(&format!("Name: {}\n", group.key));
        }

        // Computed on demand; name-mode scans never read file contents
        let fingerprinter = (self.show_fingerprints && !self.content && kind == GroupKind::File)
            .then(|| Fingerprinter::new(self.digest));

        for (i, entry) in group.entries.iter().enumerate() {
            let n = i + 1;
            if let Some(ref fp) = fingerprinter {
                let shown = fp
                    .fingerprint(&entry.path)
                    .map(|f| f.into_string())
                    .unwrap_or_else(|_| UNREADABLE.to_string());
                out.push_str(&format!("Fingerprint {n}: {shown}\n"));
            }
            out.push_str(&format!("Path {n}: {}\n", entry.path.display()));
        }
    }

    fn is_content_group(&self, group: &DuplicateGroup, kind: GroupKind) -> bool {
        matches!(group.key, GroupKey::Content(_)) || (self.content && kind == GroupKind::File)
    }
}

/// Notice line for a scan that did not finish cleanly.
#[must_use]
pub fn status_notice(result: &ScanResult) -> Option<String> {
    match result.summary.status {
        ScanStatus::Complete => None,
        ScanStatus::Incomplete => Some(format!(
            "Notice: scan incomplete, {} item(s) could not be read; results are partial.",
            result.failed_items.len()
        )),
        ScanStatus::Interrupted => {
            Some("Notice: scan interrupted; results are partial.".to_string())
        }
    }
}
