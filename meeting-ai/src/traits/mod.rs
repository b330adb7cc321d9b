//! Provider traits.

pub mod analysis;
pub mod directory;
pub mod task_board;
