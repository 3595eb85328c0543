//! 検出ループ制御モジュール
//!
//! フレーム取得 → 顔検出 → シグナル導出 → シリアル送信 → 表示 を
//! 単一スレッドで順次実行するメインループを実装します。
//!
//! 状態は「実行中」の1つのみで、終了遷移は終了キー押下または
//! フレーム取得失敗の2つ。ループ内の回復可能なエラー
//! （検出エラー・送信エラー）はログを出して継続します。

use std::time::{Duration, Instant};

use crate::application::stats::{StatKind, StatsCollector};
use crate::domain::{
    ports::{CapturePort, CommPort, DetectPort, DisplayPort},
    types::Annotations,
    DomainResult,
};

/// 検出ループ設定
#[derive(Debug, Clone)]
pub struct LoopConfig {
    /// 終了キー
    pub quit_key: char,
    /// キーポーリングの待機時間
    pub poll_wait: Duration,
    /// 統計出力間隔
    pub stats_interval: Duration,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            quit_key: 'q',
            poll_wait: Duration::from_millis(1),
            stats_interval: Duration::from_secs(10),
        }
    }
}

/// 検出ループ実行コンテキスト
///
/// 4つのポートをDIで受け取り、プロセス生存期間にわたって保持する。
/// CommPortは起動時に一度だけ選択されたハンドルであり、
/// ループはその種別（実デバイス/シミュレーション)を一切分岐しない。
pub struct DetectionLoop<C, D, M, V>
where
    C: CapturePort,
    D: DetectPort,
    M: CommPort,
    V: DisplayPort,
{
    capture: C,
    detector: D,
    comm: M,
    display: V,
    config: LoopConfig,
    stats: StatsCollector,
}

impl<C, D, M, V> DetectionLoop<C, D, M, V>
where
    C: CapturePort,
    D: DetectPort,
    M: CommPort,
    V: DisplayPort,
{
    /// 新しいDetectionLoopを作成
    pub fn new(capture: C, detector: D, comm: M, display: V, config: LoopConfig) -> Self {
        let stats = StatsCollector::new(config.stats_interval);
        Self {
            capture,
            detector,
            comm,
            display,
            config,
            stats,
        }
    }

    /// ループを起動（ブロッキング）
    ///
    /// 終了キー押下またはフレーム取得失敗で戻る。
    /// 終了時にはカメラ解放とウィンドウ破棄を必ず実行する。
    pub fn run(&mut self) -> DomainResult<()> {
        tracing::info!(
            "Detection loop started. Press '{}' to quit.",
            self.config.quit_key
        );

        let result = self.run_loop();
        self.shutdown();
        result
    }

    fn run_loop(&mut self) -> DomainResult<()> {
        loop {
            let iteration_start = Instant::now();

            // フレーム取得（失敗はこのランにとって致命的、リトライしない）
            let frame = match self.capture.capture_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    tracing::info!("No frame available, stopping loop");
                    break;
                }
                Err(e) => {
                    tracing::error!("Frame acquisition failed: {}", e);
                    break;
                }
            };

            // 顔検出（エラーは空結果として回復し、次のフレームへ継続）
            let detect_start = Instant::now();
            let boxes = match self.detector.detect_faces(&frame) {
                Ok(boxes) => boxes,
                Err(e) => {
                    tracing::warn!("Detection error: {}", e);
                    self.stats.record_detect_error();
                    Vec::new()
                }
            };
            self.stats
                .record_duration(StatKind::Detect, detect_start.elapsed());

            // 検出数からシグナルを導出
            let annotations = Annotations::from_boxes(boxes);

            // シグナル送信（ベストエフォート、最大1回、ACKなし）
            let send_start = Instant::now();
            if let Err(e) = self.comm.send(annotations.signal.as_bytes()) {
                tracing::warn!("Serial write error: {}", e);
                self.stats.record_send_error();
            }
            self.stats
                .record_duration(StatKind::Communication, send_start.elapsed());

            // 受信バッファのクリア（エラーは無視）
            let _ = self.comm.flush_input();

            // オーバーレイ描画と表示
            self.display.present(&frame, &annotations)?;

            // 統計記録
            self.stats.record_frame();
            self.stats
                .record_duration(StatKind::EndToEnd, iteration_start.elapsed());
            if self.stats.should_report() {
                self.stats.report_and_reset();
            }

            // 終了キーのポーリング
            match self.display.poll_key(self.config.poll_wait) {
                Ok(Some(key)) if key == self.config.quit_key => {
                    tracing::info!("Quit key pressed, stopping loop");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!("Key polling error: {}", e);
                }
            }
        }

        Ok(())
    }

    /// 終了処理: カメラ解放とウィンドウ破棄
    fn shutdown(&mut self) {
        if let Err(e) = self.capture.release() {
            tracing::warn!("Failed to release capture device: {}", e);
        }
        if let Err(e) = self.display.close() {
            tracing::warn!("Failed to close display windows: {}", e);
        }
        tracing::info!("Detection loop finished");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DomainError, FaceBox, Frame, Signal};
    use std::collections::VecDeque;

    fn test_frame() -> Frame {
        Frame::new(vec![0u8; 8 * 8 * 3], 8, 8)
    }

    fn face(x: i32) -> FaceBox {
        FaceBox::new(x, 10, 40, 40)
    }

    // モック実装
    struct ScriptedCapture {
        frames: VecDeque<Frame>,
        released: bool,
    }

    impl ScriptedCapture {
        fn with_frames(count: usize) -> Self {
            Self {
                frames: (0..count).map(|_| test_frame()).collect(),
                released: false,
            }
        }
    }

    impl CapturePort for ScriptedCapture {
        fn capture_frame(&mut self) -> DomainResult<Option<Frame>> {
            Ok(self.frames.pop_front())
        }

        fn release(&mut self) -> DomainResult<()> {
            self.released = true;
            Ok(())
        }
    }

    struct ScriptedDetector {
        results: VecDeque<DomainResult<Vec<FaceBox>>>,
    }

    impl DetectPort for ScriptedDetector {
        fn detect_faces(&mut self, _frame: &Frame) -> DomainResult<Vec<FaceBox>> {
            self.results.pop_front().unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    struct RecordingComm {
        sent: Vec<Vec<u8>>,
        flush_count: u32,
        fail_send: bool,
    }

    impl RecordingComm {
        fn new() -> Self {
            Self {
                sent: Vec::new(),
                flush_count: 0,
                fail_send: false,
            }
        }
    }

    impl CommPort for RecordingComm {
        fn send(&mut self, data: &[u8]) -> DomainResult<()> {
            if self.fail_send {
                return Err(DomainError::Communication("device gone".to_string()));
            }
            self.sent.push(data.to_vec());
            Ok(())
        }

        fn flush_input(&mut self) -> DomainResult<()> {
            self.flush_count += 1;
            Ok(())
        }

        fn is_connected(&self) -> bool {
            true
        }
    }

    struct RecordingDisplay {
        presented: Vec<Annotations>,
        keys: VecDeque<Option<char>>,
        closed: bool,
    }

    impl RecordingDisplay {
        fn new() -> Self {
            Self {
                presented: Vec::new(),
                keys: VecDeque::new(),
                closed: false,
            }
        }
    }

    impl DisplayPort for RecordingDisplay {
        fn present(&mut self, _frame: &Frame, annotations: &Annotations) -> DomainResult<()> {
            self.presented.push(annotations.clone());
            Ok(())
        }

        fn poll_key(&mut self, _wait: Duration) -> DomainResult<Option<char>> {
            Ok(self.keys.pop_front().unwrap_or(None))
        }

        fn close(&mut self) -> DomainResult<()> {
            self.closed = true;
            Ok(())
        }
    }

    fn make_loop(
        capture: ScriptedCapture,
        detector: ScriptedDetector,
        comm: RecordingComm,
        display: RecordingDisplay,
    ) -> DetectionLoop<ScriptedCapture, ScriptedDetector, RecordingComm, RecordingDisplay> {
        DetectionLoop::new(capture, detector, comm, display, LoopConfig::default())
    }

    #[test]
    fn test_no_faces_sends_no() {
        let detector = ScriptedDetector {
            results: VecDeque::from([Ok(vec![])]),
        };
        let mut l = make_loop(
            ScriptedCapture::with_frames(1),
            detector,
            RecordingComm::new(),
            RecordingDisplay::new(),
        );

        l.run().unwrap();

        assert_eq!(l.comm.sent, vec![b"No".to_vec()]);
        assert_eq!(l.display.presented[0].signal, Signal::No);
        assert!(!l.display.presented[0].signal.is_alert());
    }

    #[test]
    fn test_single_face_sends_no() {
        // 1人だけではアラートにしない
        let detector = ScriptedDetector {
            results: VecDeque::from([Ok(vec![face(10)])]),
        };
        let mut l = make_loop(
            ScriptedCapture::with_frames(1),
            detector,
            RecordingComm::new(),
            RecordingDisplay::new(),
        );

        l.run().unwrap();

        assert_eq!(l.comm.sent, vec![b"No".to_vec()]);
        assert_eq!(l.display.presented[0].total, 1);
        assert_eq!(l.display.presented[0].signal, Signal::No);
    }

    #[test]
    fn test_two_faces_send_detected_with_alert_overlay() {
        let detector = ScriptedDetector {
            results: VecDeque::from([Ok(vec![face(10), face(100)])]),
        };
        let mut l = make_loop(
            ScriptedCapture::with_frames(1),
            detector,
            RecordingComm::new(),
            RecordingDisplay::new(),
        );

        l.run().unwrap();

        assert_eq!(l.comm.sent, vec![b"Detected".to_vec()]);
        let ann = &l.display.presented[0];
        assert_eq!(ann.boxes.len(), 2);
        assert_eq!(ann.count_label(), "Count: 2");
        assert!(ann.signal.is_alert());
    }

    #[test]
    fn test_detector_error_recovers_and_continues() {
        // 1フレーム目で検出エラー、2フレーム目は正常に処理される
        let detector = ScriptedDetector {
            results: VecDeque::from([
                Err(DomainError::Detection("model choked".to_string())),
                Ok(vec![face(10), face(100)]),
            ]),
        };
        let mut l = make_loop(
            ScriptedCapture::with_frames(2),
            detector,
            RecordingComm::new(),
            RecordingDisplay::new(),
        );

        l.run().unwrap();

        assert_eq!(l.comm.sent, vec![b"No".to_vec(), b"Detected".to_vec()]);
        assert_eq!(l.display.presented.len(), 2);
        assert_eq!(l.display.presented[0].total, 0);
    }

    #[test]
    fn test_send_error_does_not_stop_loop() {
        let detector = ScriptedDetector {
            results: VecDeque::from([Ok(vec![]), Ok(vec![])]),
        };
        let mut comm = RecordingComm::new();
        comm.fail_send = true;

        let mut l = make_loop(
            ScriptedCapture::with_frames(2),
            detector,
            comm,
            RecordingDisplay::new(),
        );

        l.run().unwrap();

        // 送信は全滅しても2フレームとも表示まで到達する
        assert!(l.comm.sent.is_empty());
        assert_eq!(l.display.presented.len(), 2);
    }

    #[test]
    fn test_quit_key_stops_loop() {
        let detector = ScriptedDetector {
            results: VecDeque::new(),
        };
        let mut display = RecordingDisplay::new();
        display.keys = VecDeque::from([None, Some('q')]);

        let mut l = make_loop(
            ScriptedCapture::with_frames(100),
            detector,
            RecordingComm::new(),
            display,
        );

        l.run().unwrap();

        // 2イテレーション目の'q'で終了
        assert_eq!(l.display.presented.len(), 2);
        assert!(l.capture.released);
        assert!(l.display.closed);
    }

    #[test]
    fn test_frame_exhaustion_releases_resources() {
        let detector = ScriptedDetector {
            results: VecDeque::new(),
        };
        let mut l = make_loop(
            ScriptedCapture::with_frames(0),
            detector,
            RecordingComm::new(),
            RecordingDisplay::new(),
        );

        // フレームが取得できない場合もパニックせず正常終了する
        l.run().unwrap();

        assert!(l.capture.released);
        assert!(l.display.closed);
        assert!(l.comm.sent.is_empty());
    }

    #[test]
    fn test_only_two_wire_values_ever_sent() {
        let detector = ScriptedDetector {
            results: VecDeque::from([
                Ok(vec![]),
                Ok(vec![face(1)]),
                Ok(vec![face(1), face(2), face(3)]),
                Err(DomainError::Detection("oops".to_string())),
            ]),
        };
        let mut l = make_loop(
            ScriptedCapture::with_frames(4),
            detector,
            RecordingComm::new(),
            RecordingDisplay::new(),
        );

        l.run().unwrap();

        assert_eq!(l.comm.sent.len(), 4);
        for sent in &l.comm.sent {
            assert!(sent == b"No" || sent == b"Detected");
        }
    }

    #[test]
    fn test_flush_input_called_every_iteration() {
        let detector = ScriptedDetector {
            results: VecDeque::new(),
        };
        let mut l = make_loop(
            ScriptedCapture::with_frames(3),
            detector,
            RecordingComm::new(),
            RecordingDisplay::new(),
        );

        l.run().unwrap();

        assert_eq!(l.comm.flush_count, 3);
    }
}
