//! Blob ストア実装

pub mod local;

pub use local::{ImageFormat, LocalBlobStore};
