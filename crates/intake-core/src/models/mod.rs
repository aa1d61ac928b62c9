//! Data models for the intake workflow
//!
//! Configuration records (mappings, extension rules, widget settings), the
//! ephemeral upload input, draft entities and the persisted session layout.

mod draft;
mod extension_rule;
mod mime_mapping;
mod session;
mod uploaded_file;
mod widget;

pub use draft::*;
pub use extension_rule::*;
pub use mime_mapping::*;
pub use session::*;
pub use uploaded_file::*;
pub use widget::*;
