//! Grammar line matchers and bit-order arithmetic.
//!
//! Each matcher takes one trimmed line and returns the captured fields as
//! string slices, or `None` when the line does not follow its statement grammar.

pub mod ba_;
pub mod ba_bo_;
pub mod ba_sg_;
pub mod bo_;
pub mod line;
pub mod message_layout;
pub mod sg_;
pub(crate) mod strings;
pub mod val_;
