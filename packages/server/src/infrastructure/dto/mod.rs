//! Data Transfer Objects
//!
//! WebSocket フレームと HTTP レスポンスの形式を定義します。

pub mod http;
pub mod websocket;
