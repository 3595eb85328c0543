//! 設定管理
//!
//! TOML設定ファイルの読み込みとDomain型への変換。

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::domain::{DomainError, DomainResult};

/// アプリケーション設定のルート構造
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct AppConfig {
    /// カメラ設定
    #[serde(default)]
    pub camera: CameraConfig,
    /// 顔検出設定
    #[serde(default)]
    pub detection: DetectionConfig,
    /// シリアル通信設定
    #[serde(default)]
    pub serial: SerialConfig,
    /// 表示設定
    #[serde(default)]
    pub display: DisplayConfig,
    /// 統計設定
    #[serde(default)]
    pub stats: StatsConfig,
}

/// カメラ設定
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CameraConfig {
    /// カメラデバイスのインデックス
    ///
    /// 通常は0（最初に見つかったカメラ）
    pub device_index: i32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self { device_index: 0 }
    }
}

/// 顔検出設定
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DetectionConfig {
    /// Haar Cascadeモデルファイルのパス
    ///
    /// OpenCV同梱の haarcascade_frontalface_default.xml を想定
    pub model_path: String,

    /// 画像ピラミッドのスケールファクタ
    ///
    /// 1.0より大きい値。デフォルト: 1.1
    pub scale_factor: f64,

    /// 矩形を採用するために必要な近傍数
    ///
    /// 大きいほど誤検出が減るが検出漏れが増える。デフォルト: 3
    pub min_neighbors: i32,

    /// 検出する顔の最小サイズ（ピクセル、正方形の一辺）
    ///
    /// デフォルト: 30
    pub min_face_size: u32,
}

impl DetectionConfig {
    /// デフォルトのモデルファイルパス
    pub const DEFAULT_MODEL_PATH: &'static str = "models/haarcascade_frontalface_default.xml";
    /// デフォルトのスケールファクタ
    pub const DEFAULT_SCALE_FACTOR: f64 = 1.1;
    /// デフォルトの近傍数
    pub const DEFAULT_MIN_NEIGHBORS: i32 = 3;
    /// デフォルトの最小顔サイズ（ピクセル）
    pub const DEFAULT_MIN_FACE_SIZE: u32 = 30;
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            model_path: Self::DEFAULT_MODEL_PATH.to_string(),
            scale_factor: Self::DEFAULT_SCALE_FACTOR,
            min_neighbors: Self::DEFAULT_MIN_NEIGHBORS,
            min_face_size: Self::DEFAULT_MIN_FACE_SIZE,
        }
    }
}

/// シリアル通信設定
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SerialConfig {
    /// シリアルポート名
    ///
    /// 例 (Windows): "COM5"、(Linux): "/dev/ttyUSB0"
    /// 列挙された利用可能ポートに存在しない場合はシミュレーションモードで起動する
    pub port_name: String,

    /// ボーレート
    ///
    /// デフォルト: 9600
    pub baud_rate: u32,

    /// 読み書きタイムアウト（ミリ秒）
    ///
    /// デフォルト: 100ms
    pub timeout_ms: u64,
}

impl SerialConfig {
    /// デフォルトのポート名
    pub const DEFAULT_PORT_NAME: &'static str = "COM5";
    /// デフォルトのボーレート
    pub const DEFAULT_BAUD_RATE: u32 = 9600;
    /// デフォルトのタイムアウト（ミリ秒）
    pub const DEFAULT_TIMEOUT_MS: u64 = 100;

    /// タイムアウトをDurationとして取得
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port_name: Self::DEFAULT_PORT_NAME.to_string(),
            baud_rate: Self::DEFAULT_BAUD_RATE,
            timeout_ms: Self::DEFAULT_TIMEOUT_MS,
        }
    }
}

/// 表示設定
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DisplayConfig {
    /// ウィンドウタイトル
    pub window_name: String,

    /// 終了キー
    ///
    /// デフォルト: 'q'
    pub quit_key: char,

    /// キーポーリングの待機時間（ミリ秒）
    ///
    /// デフォルト: 1ms
    pub poll_wait_ms: u64,
}

impl DisplayConfig {
    /// デフォルトのウィンドウタイトル
    pub const DEFAULT_WINDOW_NAME: &'static str = "Face Count Alert";
    /// デフォルトの終了キー
    pub const DEFAULT_QUIT_KEY: char = 'q';
    /// デフォルトのキーポーリング待機時間（ミリ秒）
    pub const DEFAULT_POLL_WAIT_MS: u64 = 1;

    /// キーポーリング待機時間をDurationとして取得
    pub fn poll_wait(&self) -> Duration {
        Duration::from_millis(self.poll_wait_ms)
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            window_name: Self::DEFAULT_WINDOW_NAME.to_string(),
            quit_key: Self::DEFAULT_QUIT_KEY,
            poll_wait_ms: Self::DEFAULT_POLL_WAIT_MS,
        }
    }
}

/// 統計設定
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StatsConfig {
    /// 統計情報の出力間隔（秒）
    pub report_interval_sec: u64,
}

impl StatsConfig {
    /// デフォルトの統計出力間隔（秒）
    pub const DEFAULT_REPORT_INTERVAL_SEC: u64 = 10;

    /// 統計出力間隔をDurationとして取得
    pub fn report_interval(&self) -> Duration {
        Duration::from_secs(self.report_interval_sec)
    }
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            report_interval_sec: Self::DEFAULT_REPORT_INTERVAL_SEC,
        }
    }
}

impl AppConfig {
    /// TOMLファイルから設定を読み込む
    pub fn from_file<P: AsRef<Path>>(path: P) -> DomainResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DomainError::Configuration(format!("Failed to read config file: {}", e))
        })?;

        toml::from_str(&content)
            .map_err(|e| DomainError::Configuration(format!("Failed to parse config file: {}", e)))
    }

    /// デフォルト設定をTOMLファイルに書き出す
    pub fn write_default<P: AsRef<Path>>(path: P) -> DomainResult<()> {
        let config = Self::default();
        let content = toml::to_string_pretty(&config).map_err(|e| {
            DomainError::Configuration(format!("Failed to serialize config: {}", e))
        })?;

        std::fs::write(path, content)
            .map_err(|e| DomainError::Configuration(format!("Failed to write config file: {}", e)))
    }

    /// 設定の妥当性を検証
    pub fn validate(&self) -> DomainResult<()> {
        // 検出パラメータの検証
        if self.detection.scale_factor <= 1.0 {
            return Err(DomainError::Configuration(
                "scale_factor must be greater than 1.0".to_string(),
            ));
        }
        if self.detection.min_neighbors < 0 {
            return Err(DomainError::Configuration(
                "min_neighbors must be non-negative".to_string(),
            ));
        }
        if self.detection.min_face_size == 0 {
            return Err(DomainError::Configuration(
                "min_face_size must be greater than 0".to_string(),
            ));
        }
        if self.detection.model_path.is_empty() {
            return Err(DomainError::Configuration(
                "model_path must not be empty".to_string(),
            ));
        }

        // シリアル設定の検証
        if self.serial.port_name.is_empty() {
            return Err(DomainError::Configuration(
                "port_name must not be empty".to_string(),
            ));
        }
        if self.serial.baud_rate == 0 {
            return Err(DomainError::Configuration(
                "baud_rate must be greater than 0".to_string(),
            ));
        }

        // 表示設定の検証
        if self.display.window_name.is_empty() {
            return Err(DomainError::Configuration(
                "window_name must not be empty".to_string(),
            ));
        }
        if self.display.poll_wait_ms == 0 {
            return Err(DomainError::Configuration(
                "poll_wait_ms must be greater than 0".to_string(),
            ));
        }
        if !self.display.quit_key.is_ascii() {
            return Err(DomainError::Configuration(
                "quit_key must be an ASCII character".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.camera.device_index, 0);
        assert_eq!(config.serial.port_name, "COM5");
        assert_eq!(config.serial.baud_rate, 9600);
        assert_eq!(config.display.quit_key, 'q');
        assert_eq!(config.detection.scale_factor, 1.1);
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_scale_factor() {
        let mut config = AppConfig::default();
        config.detection.scale_factor = 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_baud_rate() {
        let mut config = AppConfig::default();
        config.serial.baud_rate = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_empty_port() {
        let mut config = AppConfig::default();
        config.serial.port_name = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_quit_key() {
        let mut config = AppConfig::default();
        config.display.quit_key = 'あ';
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_parse_full() {
        let toml = r#"
            [camera]
            device_index = 1

            [detection]
            model_path = "models/haarcascade_frontalface_default.xml"
            scale_factor = 1.2
            min_neighbors = 5
            min_face_size = 40

            [serial]
            port_name = "/dev/ttyUSB0"
            baud_rate = 115200
            timeout_ms = 50

            [display]
            window_name = "Face Count Alert"
            quit_key = "q"
            poll_wait_ms = 1

            [stats]
            report_interval_sec = 5
        "#;
        let config: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.camera.device_index, 1);
        assert_eq!(config.detection.min_neighbors, 5);
        assert_eq!(config.serial.port_name, "/dev/ttyUSB0");
        assert_eq!(config.serial.baud_rate, 115200);
        assert_eq!(config.stats.report_interval_sec, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_parse_partial_uses_defaults() {
        // セクションを省略した場合はデフォルト値が使われる
        let toml = r#"
            [serial]
            port_name = "COM3"
            baud_rate = 9600
            timeout_ms = 100
        "#;
        let config: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.serial.port_name, "COM3");
        assert_eq!(config.camera.device_index, 0);
        assert_eq!(config.display.quit_key, 'q');
    }

    #[test]
    fn test_config_write_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        AppConfig::write_default(&path).unwrap();
        let config = AppConfig::from_file(&path).unwrap();

        assert_eq!(config.serial.port_name, "COM5");
        config.validate().unwrap();
    }

    #[test]
    fn test_config_example_loads() {
        // config.toml.exampleが正常に読み込めることを確認
        let config = AppConfig::from_file("config.toml.example")
            .expect("config.toml.example should load");

        config
            .validate()
            .expect("config.toml.example should be valid");
    }

    #[test]
    fn test_config_missing_file() {
        let result = AppConfig::from_file("does_not_exist.toml");
        assert!(matches!(result, Err(DomainError::Configuration(_))));
    }

    #[test]
    fn test_serial_timeout_duration() {
        let config = SerialConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(100));
    }
}
