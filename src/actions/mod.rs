//! Interactive actions: candidate confirmation and safe deletion.
//!
//! The confirmation loop walks candidate pairs one at a time (`y/n/q`),
//! the deletion pass moves accepted files to trash with a final `y/n/a`
//! check per file. Both prompts are traits so the app loop can be driven
//! by scripted answers in tests.

pub mod confirm;
pub mod delete;

pub use confirm::{print_candidate, Confirmer, StdinConfirmer, Verdict, SIZE_WARN_BYTES};
pub use delete::{
    execute_deletions, move_to_trash, DeleteChoice, DeleteError, DeleteOutcome, DeletePrompt,
    StdinDeletePrompt, TrashTarget,
};
