//! Action-line vocabulary.
//!
//! ## Modules
//!
//! - `position`: table positions, heads-up sides and the `Seat` trait
//! - `token`: tokenizer, token classification and (actor, action) grouping

pub mod position;
pub mod token;

pub use position::{Position, Seat, Side};
pub use token::{tokenize, ActionLine, ActionToken, Descriptor, Step};
