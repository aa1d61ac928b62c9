//! Validation modules

pub mod mime;

pub use mime::{
    normalize_mime_type, parse_mime_type_lines, validate_mime_type, validate_mime_type_list,
    MIME_TYPE_PATTERN,
};
