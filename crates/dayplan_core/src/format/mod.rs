//! Note line formats.

pub mod line_format;
