//! 顔検出アダプタ
//!
//! OpenCVのHaar Cascade分類器を使用した顔検出実装。
//! モデル自体は学習済みのXMLファイルとして外部から与えられる。

use opencv::{
    core::{Mat, Rect, Size, Vector},
    imgproc,
    objdetect::CascadeClassifier,
    prelude::*,
};

use crate::domain::{config::DetectionConfig, DetectPort, DomainError, DomainResult, FaceBox, Frame};
use crate::infrastructure::mat_convert;

/// Haar Cascade顔検出アダプタ
pub struct CascadeDetectAdapter {
    classifier: CascadeClassifier,
    scale_factor: f64,
    min_neighbors: i32,
    min_face_size: i32,
}

impl CascadeDetectAdapter {
    /// 新しい顔検出アダプタを作成
    ///
    /// # Arguments
    /// - `config`: 検出設定（モデルパス、スケールファクタ、近傍数、最小顔サイズ）
    ///
    /// # Errors
    /// - モデルファイルの読み込み失敗（パス不正、ファイル破損）
    pub fn new(config: &DetectionConfig) -> DomainResult<Self> {
        let classifier = CascadeClassifier::new(&config.model_path).map_err(|e| {
            DomainError::Initialization(format!(
                "Failed to load cascade model '{}': {:?}",
                config.model_path, e
            ))
        })?;

        let empty = classifier.empty().map_err(|e| {
            DomainError::Initialization(format!("Failed to query cascade state: {:?}", e))
        })?;
        if empty {
            return Err(DomainError::Initialization(format!(
                "Cascade model '{}' is empty or missing",
                config.model_path
            )));
        }

        tracing::info!("Cascade model loaded: {}", config.model_path);

        Ok(Self {
            classifier,
            scale_factor: config.scale_factor,
            min_neighbors: config.min_neighbors,
            min_face_size: config.min_face_size as i32,
        })
    }
}

impl DetectPort for CascadeDetectAdapter {
    /// フレーム内の顔をすべて検出する
    ///
    /// フレームをグレースケールに変換し、multi-scale探索で
    /// バウンディングボックスの列を返す。
    fn detect_faces(&mut self, frame: &Frame) -> DomainResult<Vec<FaceBox>> {
        let bgr = mat_convert::frame_to_mat(frame)
            .map_err(|e| DomainError::Detection(format!("Failed to convert frame: {:?}", e)))?;

        let mut gray = Mat::default();
        imgproc::cvt_color(&bgr, &mut gray, imgproc::COLOR_BGR2GRAY, 0).map_err(|e| {
            DomainError::Detection(format!("Failed to convert to grayscale: {:?}", e))
        })?;

        let mut faces: Vector<Rect> = Vector::new();
        self.classifier
            .detect_multi_scale(
                &gray,
                &mut faces,
                self.scale_factor,
                self.min_neighbors,
                0, // flags（旧API互換、未使用）
                Size::new(self.min_face_size, self.min_face_size),
                Size::new(0, 0), // max_size無制限
            )
            .map_err(|e| DomainError::Detection(format!("Face detection failed: {:?}", e)))?;

        Ok(faces
            .iter()
            .map(|r| FaceBox::new(r.x, r.y, r.width, r.height))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_model_is_rejected() {
        let config = DetectionConfig {
            model_path: "does_not_exist_cascade.xml".to_string(),
            ..DetectionConfig::default()
        };

        let result = CascadeDetectAdapter::new(&config);
        assert!(result.is_err());
    }
}
