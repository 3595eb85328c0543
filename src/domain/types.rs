//! コア型定義
//!
//! Domain層の中心となるデータ構造。
//! 1ループイテレーション内でのみ生存する一時的な型が中心。

use std::time::Instant;

/// カメラから取得した1フレーム
#[derive(Debug, Clone)]
pub struct Frame {
    /// フレーム取得時刻
    pub timestamp: Instant,
    /// フレーム画像データ（BGR形式、連続メモリ）
    pub data: Vec<u8>,
    /// 画像の幅
    pub width: u32,
    /// 画像の高さ
    pub height: u32,
}

impl Frame {
    /// 新しいフレームを作成
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            timestamp: Instant::now(),
            data,
            width,
            height,
        }
    }
}

/// 検出された顔のバウンディングボックス（ピクセル座標）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl FaceBox {
    /// 新しいバウンディングボックスを作成
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }
}

/// マイコンへ送信する2値シグナル
///
/// 顔の検出数から決定的に導出され、固定のASCIIバイト列として
/// シリアルポートへ書き込まれる。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// 2人以上の顔を検出（アラート状態）
    Detected,
    /// 顔なし、または1人のみ
    No,
}

impl Signal {
    /// 検出数からシグナルを導出
    ///
    /// 閾値は「1より大きい」。1人だけの場合はアラートにしない。
    pub fn from_face_count(count: usize) -> Self {
        if count > 1 {
            Signal::Detected
        } else {
            Signal::No
        }
    }

    /// シリアルポートへ書き込むワイヤ表現
    ///
    /// フレーミングや区切り文字のない生のASCIIバイト列。
    pub fn as_bytes(&self) -> &'static [u8] {
        match self {
            Signal::Detected => b"Detected",
            Signal::No => b"No",
        }
    }

    /// 表示用の文字列表現
    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::Detected => "Detected",
            Signal::No => "No",
        }
    }

    /// アラート状態か（ステータス表示の色分けに使用）
    pub fn is_alert(&self) -> bool {
        matches!(self, Signal::Detected)
    }
}

/// 1フレーム分のオーバーレイ情報
///
/// 検出結果とシグナルをまとめて表示アダプタへ渡すための型。
/// イテレーション終了時に破棄され、フレームをまたいで保持されない。
#[derive(Debug, Clone)]
pub struct Annotations {
    /// 検出された顔のバウンディングボックス
    pub boxes: Vec<FaceBox>,
    /// 検出数
    pub total: usize,
    /// 導出されたシグナル
    pub signal: Signal,
}

impl Annotations {
    /// 検出結果からオーバーレイ情報を構築
    pub fn from_boxes(boxes: Vec<FaceBox>) -> Self {
        let total = boxes.len();
        let signal = Signal::from_face_count(total);
        Self {
            boxes,
            total,
            signal,
        }
    }

    /// 各ボックスに添えるカウントラベル
    pub fn count_label(&self) -> String {
        format!("Count: {}", self.total)
    }

    /// 画面上部のステータス行
    pub fn status_label(&self) -> String {
        format!("Status: {}", self.signal.as_str())
    }
}
