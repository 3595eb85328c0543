//! 表示アダプタ
//!
//! OpenCVのhighguiを使用したウィンドウ表示とオーバーレイ描画の実装。
//! 検出ボックスの矩形、カウントラベル、シグナルに応じた色の
//! ステータス行をフレームのコピーに描画して表示する。

use std::time::Duration;

use opencv::{
    core::{Mat, Point, Rect, Scalar},
    highgui,
    imgproc::{self, FONT_HERSHEY_SIMPLEX, LINE_8},
};

use crate::domain::{Annotations, DisplayPort, DomainError, DomainResult, Frame};
use crate::infrastructure::mat_convert;

/// ステータス行の描画位置
const STATUS_ORIGIN: (i32, i32) = (10, 30);
/// カウントラベルのボックス上端からのオフセット（ピクセル）
const LABEL_OFFSET_Y: i32 = 10;

/// highgui表示アダプタ
pub struct HighguiDisplayAdapter {
    window_name: String,
    window_created: bool,
}

impl HighguiDisplayAdapter {
    /// 新しい表示アダプタを作成
    ///
    /// ウィンドウ自体は初回のpresent時に作成される。
    pub fn new(window_name: &str) -> Self {
        Self {
            window_name: window_name.to_string(),
            window_created: false,
        }
    }

    /// オーバーレイをMatに描画する
    fn draw_overlay(&self, img: &mut Mat, annotations: &Annotations) -> DomainResult<()> {
        let blue = Scalar::new(255.0, 0.0, 0.0, 0.0);
        let white = Scalar::new(255.0, 255.0, 255.0, 0.0);
        let green = Scalar::new(0.0, 255.0, 0.0, 0.0);
        let red = Scalar::new(0.0, 0.0, 255.0, 0.0);

        // 各顔に矩形とカウントラベルを描画
        let count_label = annotations.count_label();
        for face in &annotations.boxes {
            let rect = Rect::new(face.x, face.y, face.width, face.height);
            imgproc::rectangle(img, rect, blue, 2, LINE_8, 0)
                .map_err(|e| DomainError::Display(format!("Failed to draw rectangle: {:?}", e)))?;

            imgproc::put_text(
                img,
                &count_label,
                Point::new(face.x, face.y - LABEL_OFFSET_Y),
                FONT_HERSHEY_SIMPLEX,
                0.8,
                white,
                2,
                LINE_8,
                false,
            )
            .map_err(|e| DomainError::Display(format!("Failed to draw count label: {:?}", e)))?;
        }

        // ステータス行（アラート時は赤、通常は緑）
        let status_color = if annotations.signal.is_alert() {
            red
        } else {
            green
        };
        imgproc::put_text(
            img,
            &annotations.status_label(),
            Point::new(STATUS_ORIGIN.0, STATUS_ORIGIN.1),
            FONT_HERSHEY_SIMPLEX,
            1.0,
            status_color,
            2,
            LINE_8,
            false,
        )
        .map_err(|e| DomainError::Display(format!("Failed to draw status line: {:?}", e)))?;

        Ok(())
    }
}

impl DisplayPort for HighguiDisplayAdapter {
    /// オーバーレイ付きでフレームを表示する
    fn present(&mut self, frame: &Frame, annotations: &Annotations) -> DomainResult<()> {
        let mut img = mat_convert::frame_to_mat(frame)
            .map_err(|e| DomainError::Display(format!("Failed to convert frame: {:?}", e)))?;

        self.draw_overlay(&mut img, annotations)?;

        if !self.window_created {
            // WINDOW_AUTOSIZEで等倍表示（リサイズ不可）
            let _ = highgui::named_window(&self.window_name, highgui::WINDOW_AUTOSIZE);
            self.window_created = true;
        }

        highgui::imshow(&self.window_name, &img)
            .map_err(|e| DomainError::Display(format!("Failed to show frame: {:?}", e)))
    }

    /// キー入力を短時間ポーリングする
    fn poll_key(&mut self, wait: Duration) -> DomainResult<Option<char>> {
        let wait_ms = (wait.as_millis() as i32).max(1);
        let key = highgui::wait_key(wait_ms)
            .map_err(|e| DomainError::Display(format!("Failed to poll key: {:?}", e)))?;

        if key < 0 {
            Ok(None)
        } else {
            Ok(Some((key as u8) as char))
        }
    }

    /// すべてのウィンドウを破棄する
    fn close(&mut self) -> DomainResult<()> {
        highgui::destroy_all_windows()
            .map_err(|e| DomainError::Display(format!("Failed to destroy windows: {:?}", e)))
    }
}
