//! カメラキャプチャアダプタ
//!
//! OpenCVのVideoCaptureを使用したWebカメラからのフレーム取得実装。

use opencv::{
    core::Mat,
    prelude::*,
    videoio::{self, VideoCapture},
};

use crate::domain::{CapturePort, DomainError, DomainResult, Frame};
use crate::infrastructure::mat_convert;

/// カメラキャプチャアダプタ
pub struct CameraCaptureAdapter {
    capture: VideoCapture,
    device_index: i32,
}

impl CameraCaptureAdapter {
    /// 新しいカメラキャプチャアダプタを作成
    ///
    /// # Arguments
    /// - `device_index`: カメラデバイスのインデックス（通常は0）
    ///
    /// # Errors
    /// - カメラのオープン失敗（デバイスなし、他プロセスが使用中等）
    pub fn new(device_index: i32) -> DomainResult<Self> {
        let capture = VideoCapture::new(device_index, videoio::CAP_ANY).map_err(|e| {
            DomainError::Initialization(format!(
                "Failed to create capture for camera {}: {:?}",
                device_index, e
            ))
        })?;

        let opened = capture.is_opened().map_err(|e| {
            DomainError::Initialization(format!("Failed to query camera state: {:?}", e))
        })?;
        if !opened {
            return Err(DomainError::Initialization(format!(
                "Could not open video source {}",
                device_index
            )));
        }

        tracing::info!("Camera {} opened", device_index);

        Ok(Self {
            capture,
            device_index,
        })
    }
}

impl CapturePort for CameraCaptureAdapter {
    /// 1フレームを取得する
    ///
    /// # Returns
    /// - `Ok(Some(Frame))`: 取得成功
    /// - `Ok(None)`: フレームが取得できない（カメラ切断等。呼び出し側はループを終了する）
    fn capture_frame(&mut self) -> DomainResult<Option<Frame>> {
        let mut mat = Mat::default();
        let grabbed = self
            .capture
            .read(&mut mat)
            .map_err(|e| DomainError::Capture(format!("Failed to read frame: {:?}", e)))?;

        if !grabbed || mat.rows() == 0 {
            return Ok(None);
        }

        let frame = mat_convert::mat_to_frame(&mat)
            .map_err(|e| DomainError::Capture(format!("Failed to convert frame: {:?}", e)))?;

        Ok(Some(frame))
    }

    /// カメラを解放する
    fn release(&mut self) -> DomainResult<()> {
        tracing::info!("Releasing camera {}", self.device_index);
        self.capture
            .release()
            .map_err(|e| DomainError::Capture(format!("Failed to release camera: {:?}", e)))
    }
}
