//! Copy policy evaluation.
//!
//! The copy decision is a pure predicate over a label's configured policy,
//! the candidate vote, the change kind between the two revisions, and
//! (when a policy asks for it) whether the file lists of the two revisions
//! are equal.

pub mod copy;

pub use copy::can_copy;
