//! Application Layer
//!
//! 検出ループと統計管理のユースケースを実装します。
//!
//! ## モジュール構成
//! - `detection_loop`: 単一スレッドの順次検出ループ（取得→検出→送信→表示）
//! - `stats`: 統計情報管理（FPS、レイテンシ、エラー回数）

pub mod detection_loop;
pub mod stats;
