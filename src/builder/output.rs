//! Classification of make output lines.
//!
//! Bob reports each object with a fixed sentence. The marker strings live
//! here and nowhere else.

/// Marker of a line reporting a failed object, e.g. `Failed to create HELLO.PGM!`.
pub const FAILED_MARKER: &str = "Failed to create";

/// Marker of a line reporting a built object, e.g. `HELLO.PGM was created successfully!`.
pub const SUCCESS_MARKER: &str = "was created successfully!";

/// Outcome of one target, as reported by the executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetEvent {
    Failed(String),
    Succeeded(String),
}

/// Turns executor output lines into per-target events.
pub trait OutputClassifier {
    /// Classify one line, without its trailing newline.
    fn classify(&self, line: &str) -> Option<TargetEvent>;
}

/// Classifier for Bob's `make` output.
#[derive(Debug, Clone, Copy, Default)]
pub struct BobOutputClassifier;

impl OutputClassifier for BobOutputClassifier {
    fn classify(&self, line: &str) -> Option<TargetEvent> {
        if line.contains(FAILED_MARKER) {
            // The object is the last word, with the trailing `!` dropped.
            let last = line.split_whitespace().last()?;
            let target = last.split('!').next().unwrap_or(last);
            if !target.is_empty() {
                return Some(TargetEvent::Failed(target.to_string()));
            }
        }

        if line.contains(SUCCESS_MARKER) {
            // `<mark> OBJECT was created successfully!`
            let target = line.split_whitespace().nth(1)?;
            return Some(TargetEvent::Succeeded(target.to_string()));
        }

        None
    }
}
