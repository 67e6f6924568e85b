//! Structural validation and completion driven by type descriptors

mod check;
mod complete;

pub use check::{check_dispatch, check_type, CheckOptions};
pub use complete::{item_type, snippet, struct_fields, value_items};

