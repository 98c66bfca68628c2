//! Infrastructure 層
//!
//! ドメイン層が定義する trait（Repository / BlobStore / Transport）の具体的な実装と、
//! 外部とやり取りするデータ形式（DTO）を提供します。

pub mod blob;
pub mod dto;
pub mod repository;
pub mod transport;
