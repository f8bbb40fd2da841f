//! Human-readable notices reported after an import command

use std::fmt;

/// Outcome message shown to whoever triggered the import
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// Every prepared job reached the queue
    Queued(usize),
    /// Nothing could be queued, or the queue refused a job
    ImportFailed,
    /// A bundle's jobs reached the queue
    BundleImporting,
    BundleFailed,
}

impl Notice {
    pub fn is_success(&self) -> bool {
        matches!(self, Notice::Queued(_) | Notice::BundleImporting)
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Queued(count) => write!(f, "{} job(s) queued for import.", count),
            Notice::ImportFailed => write!(f, "Unable to queue import."),
            Notice::BundleImporting => write!(f, "Importing bundle."),
            Notice::BundleFailed => write!(f, "Unable to import bundle."),
        }
    }
}
