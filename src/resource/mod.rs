//! Resource-level concerns shared by every resource type.

pub mod meta;

pub use meta::{Meta, content_version, inject_meta};
