//! Port定義（Clean Architectureのインターフェース）
//!
//! Domain層が外部実装に依存するための抽象trait。
//! Infrastructure層がこれらを実装し、Application層がDIで注入する。

use std::time::Duration;

use crate::domain::{Annotations, DomainResult, FaceBox, Frame};

/// キャプチャポート: カメラフレームの取得を抽象化
pub trait CapturePort {
    /// 1フレームを取得する
    ///
    /// # Returns
    /// - `Ok(Some(Frame))`: フレームの取得成功
    /// - `Ok(None)`: フレームが取得できない（ソース枯渇。ループ終了条件）
    /// - `Err(DomainError)`: 致命的エラー
    fn capture_frame(&mut self) -> DomainResult<Option<Frame>>;

    /// カメラを解放する
    ///
    /// ループ終了時に1回だけ呼び出される。
    fn release(&mut self) -> DomainResult<()>;
}

/// 検出ポート: 顔検出を抽象化
pub trait DetectPort {
    /// フレーム内の顔をすべて検出する
    ///
    /// # Returns
    /// - `Ok(Vec<FaceBox>)`: 検出結果（0個以上、順序付き）
    /// - `Err(DomainError)`: 検出エラー（呼び出し側は空結果として継続する）
    fn detect_faces(&mut self, frame: &Frame) -> DomainResult<Vec<FaceBox>>;
}

/// 通信ポート: シリアル送信を抽象化
///
/// 実デバイスとシミュレーションの両実装がこのtraitを満たすため、
/// ループ側はどちらを保持しているかを一切分岐しない。
pub trait CommPort {
    /// シグナルのバイト列をデバイスに送信
    ///
    /// # Arguments
    /// - `data`: 送信データ（"Detected" または "No" のASCIIバイト列）
    ///
    /// # Returns
    /// - `Ok(())`: 送信成功
    /// - `Err(DomainError)`: 送信エラー（デバイス切断等）
    fn send(&mut self, data: &[u8]) -> DomainResult<()>;

    /// 受信バッファをクリアする
    ///
    /// デバイス側から届いた未読バイトを破棄する。エラーは呼び出し側で無視される。
    fn flush_input(&mut self) -> DomainResult<()>;

    /// 実デバイスと接続しているか
    ///
    /// 起動時のログ出力とテストのためのみに使用し、ループ内では参照しない。
    fn is_connected(&self) -> bool;
}

/// 表示ポート: オーバーレイ描画とウィンドウ表示を抽象化
pub trait DisplayPort {
    /// オーバーレイ付きでフレームを表示する
    ///
    /// 各バウンディングボックスの矩形、カウントラベル、
    /// シグナルに応じた色のステータス行を描画して表示する。
    fn present(&mut self, frame: &Frame, annotations: &Annotations) -> DomainResult<()>;

    /// キー入力を短時間ポーリングする
    ///
    /// # Arguments
    /// - `wait`: 待機時間（ブロッキング、通常1ms程度）
    ///
    /// # Returns
    /// - `Ok(Some(char))`: 押下されたキー
    /// - `Ok(None)`: 入力なし
    fn poll_key(&mut self, wait: Duration) -> DomainResult<Option<char>>;

    /// すべてのウィンドウを破棄する
    fn close(&mut self) -> DomainResult<()>;
}
