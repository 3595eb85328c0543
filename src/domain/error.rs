//! エラー型定義
//!
//! Domain層の統一エラー型。thiserrorを使用して型安全なエラー処理を提供します。
//!
//! # 設計方針
//! - unwrap()の使用を禁止し、明示的なエラーハンドリングを強制
//! - Result型でエラー伝播を明示化
//! - 回復ポリシーは呼び出し側（Application層）が決める:
//!   検出エラーと送信エラーはログのみで継続、フレーム取得失敗は致命的

use thiserror::Error;

/// Domain層の統一エラー型
#[derive(Error, Debug)]
pub enum DomainError {
    /// カメラ・フレーム取得関連のエラー
    #[error("Capture error: {0}")]
    Capture(String),

    /// 顔検出関連のエラー
    #[error("Detection error: {0}")]
    Detection(String),

    /// 通信（シリアル送信）関連のエラー
    #[error("Communication error: {0}")]
    Communication(String),

    /// 表示（ウィンドウ描画）関連のエラー
    #[error("Display error: {0}")]
    Display(String),

    /// 設定関連のエラー
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// 初期化エラー
    #[error("Initialization failed: {0}")]
    Initialization(String),
}

/// Domain層の統一Result型
pub type DomainResult<T> = Result<T, DomainError>;
