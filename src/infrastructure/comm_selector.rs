//! 通信アダプタのセレクタ（起動時のデバイス選択）
//!
//! 設定されたシリアルポートのオープンを試み、失敗した場合は
//! モック実装に差し替える。選択は起動時に1回だけ行われ、
//! リトライも再プローブもしない。
//! trait objectではなくenumでディスパッチする。

use crate::domain::{config::SerialConfig, CommPort, DomainResult};
use crate::infrastructure::mock_comm::MockCommAdapter;
use crate::infrastructure::serial_comm::SerialCommAdapter;

/// 通信アダプタの選択
pub enum CommSelector {
    /// 実デバイス（シリアルポート）
    Serial(SerialCommAdapter),
    /// シミュレーション（no-op）
    Mock(MockCommAdapter),
}

impl CommSelector {
    /// 設定からデバイスを選択する
    ///
    /// この関数は決して失敗しない。オープンできない理由
    /// （ポートが列挙に存在しない、オープンエラー）を問わず
    /// モックにフォールバックするため、以降のループは
    /// どちらのハンドルを持っているかを意識しなくてよい。
    pub fn from_config(config: &SerialConfig) -> Self {
        match SerialCommAdapter::open(&config.port_name, config.baud_rate, config.timeout()) {
            Ok(adapter) => {
                tracing::info!("Connected to device on {}", adapter.port_name());
                CommSelector::Serial(adapter)
            }
            Err(e) => {
                tracing::warn!("Device connection failed: {}", e);
                tracing::warn!("Starting in SIMULATION MODE. No hardware required.");
                CommSelector::Mock(MockCommAdapter::new())
            }
        }
    }

    /// 実デバイスと接続しているか
    pub fn is_live(&self) -> bool {
        matches!(self, CommSelector::Serial(_))
    }
}

impl CommPort for CommSelector {
    fn send(&mut self, data: &[u8]) -> DomainResult<()> {
        match self {
            CommSelector::Serial(adapter) => adapter.send(data),
            CommSelector::Mock(adapter) => adapter.send(data),
        }
    }

    fn flush_input(&mut self) -> DomainResult<()> {
        match self {
            CommSelector::Serial(adapter) => adapter.flush_input(),
            CommSelector::Mock(adapter) => adapter.flush_input(),
        }
    }

    fn is_connected(&self) -> bool {
        match self {
            CommSelector::Serial(adapter) => adapter.is_connected(),
            CommSelector::Mock(adapter) => adapter.is_connected(),
        }
    }
}
