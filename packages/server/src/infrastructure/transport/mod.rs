//! Transport 実装
//!
//! ドメイン層の `Transport` trait をプロセス内のキューで実装します。

pub mod hub;

pub use hub::{ClientInfo, ConnectionHub};
