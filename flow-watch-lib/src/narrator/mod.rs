//! Narration of raw progress values as semantic stages
//!
//! A backend task reports a bare percentage. The narrator turns that number into
//! a sequence of human-readable stages ("Scanning inbox...", "Decrypting bank
//! statements...") so the user sees what is happening rather than a counter.
//!
//! # Implementation Model
//!
//! A [`StageTable`] is an immutable, ordered list of [`Stage`]s, each carrying an
//! ascending progress threshold and the message to show while that stage is
//! current. Tables are cheap to clone and are shared read-only by every polling
//! session.
//!
//! [`advance_stage`] is the only operation. It is pure: given the index the
//! caller currently shows and a freshly observed progress value, it returns the
//! index to show next. The result never moves backwards, so jittery or
//! out-of-order progress reports cannot make the narration regress.

mod stage_table;

pub use stage_table::{Stage, StageTable};

/// Compute the stage to show after observing `progress`.
///
/// Starting at `current`, the index moves forward while the next stage's threshold
/// is strictly exceeded by `progress`. The returned index is never smaller than
/// `current` (after clamping `current` into the table) and never larger than
/// [`StageTable::last_index`].
#[must_use]
pub fn advance_stage(current: usize, progress: u8, table: &StageTable) -> usize {
    let last = table.last_index();
    let mut index = current.min(last);

    while index < last {
        match table.get(index + 1) {
            Some(next) if progress > next.threshold => index += 1,
            _ => break,
        }
    }

    index
}
