pub mod bundle;
pub mod import;
pub mod importers;
pub mod queue;
pub mod seeds;
pub mod weed;

use seedbed_core::ErrorBag;

/// Print every collected error to stderr, one per line
pub(crate) fn print_errors(errors: &ErrorBag) {
    for (key, err) in errors.iter() {
        eprintln!("  {}: {}", key, err);
    }
}
