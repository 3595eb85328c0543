mod application;
mod domain;
mod infrastructure;
mod logging;

use crate::application::detection_loop::{DetectionLoop, LoopConfig};
use crate::domain::config::AppConfig;
use crate::domain::ports::CommPort; // traitメソッド使用のため
use crate::infrastructure::camera::CameraCaptureAdapter;
use crate::infrastructure::comm_selector::CommSelector;
use crate::infrastructure::display::HighguiDisplayAdapter;
use crate::infrastructure::face_detect::CascadeDetectAdapter;
use crate::logging::init_logging;

fn main() {
    // ログシステムの初期化（標準出力）
    let _guard = init_logging("info", false, None);

    tracing::info!("face-count-alert starting...");

    match run() {
        Ok(_) => {
            tracing::info!("face-count-alert terminated gracefully.");
        }
        Err(e) => {
            tracing::error!("Fatal error: {:?}", e);
            std::process::exit(1);
        }
    }
}

/// アプリケーションのメイン処理
fn run() -> anyhow::Result<()> {
    // 設定ファイルの読み込み（存在しない場合はデフォルト設定を使用）
    let config = match AppConfig::from_file("config.toml") {
        Ok(config) => {
            tracing::info!("Loaded configuration from config.toml");
            config
        }
        Err(e) => {
            tracing::warn!("Failed to load config.toml: {:?}, using defaults", e);
            AppConfig::default()
        }
    };

    // 設定の検証
    config.validate()?;

    tracing::info!("Configuration validated successfully");
    tracing::info!("Camera: device_index={}", config.camera.device_index);
    tracing::info!(
        "Detection: model={}, scale_factor={}, min_neighbors={}, min_face_size={}",
        config.detection.model_path,
        config.detection.scale_factor,
        config.detection.min_neighbors,
        config.detection.min_face_size
    );
    tracing::info!(
        "Serial: port={}, baud={}, timeout={}ms",
        config.serial.port_name,
        config.serial.baud_rate,
        config.serial.timeout_ms
    );

    // カメラキャプチャアダプタの初期化
    tracing::info!("Initializing camera capture adapter...");
    let capture = CameraCaptureAdapter::new(config.camera.device_index)?;

    // 顔検出アダプタの初期化
    tracing::info!("Initializing face detection adapter...");
    let detector = CascadeDetectAdapter::new(&config.detection)?;

    // 通信デバイスの選択（実デバイスが開けなければシミュレーションにフォールバック）
    tracing::info!("Selecting communication device...");
    let comm = CommSelector::from_config(&config.serial);
    tracing::info!(
        "Communication mode: {}",
        if comm.is_connected() { "serial" } else { "simulation" }
    );

    // 表示アダプタの初期化
    let display = HighguiDisplayAdapter::new(&config.display.window_name);

    // 検出ループ設定
    let loop_config = LoopConfig {
        quit_key: config.display.quit_key,
        poll_wait: config.display.poll_wait(),
        stats_interval: config.stats.report_interval(),
    };

    tracing::info!(
        "Starting detection loop. Press '{}' to quit.",
        config.display.quit_key
    );

    // 検出ループの起動（ブロッキング）
    let mut detection_loop = DetectionLoop::new(capture, detector, comm, display, loop_config);
    detection_loop.run()?;

    Ok(())
}
