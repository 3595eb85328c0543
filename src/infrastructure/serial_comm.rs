//! シリアル通信アダプタ
//!
//! serialportクレートを使用したマイコン（Arduino等）との通信実装。
//! オープン時に利用可能ポートの列挙を行い、設定されたポートが
//! 存在しない場合は即座にエラーを返す（フォールバックは上位で行う）。

use std::io::Write;
use std::time::Duration;

use serialport::ClearBuffer;

use crate::domain::{CommPort, DomainError, DomainResult};

/// シリアル通信アダプタ
pub struct SerialCommAdapter {
    port: Box<dyn serialport::SerialPort>,
    port_name: String,
}

impl SerialCommAdapter {
    /// シリアルポートをオープンする
    ///
    /// # Arguments
    /// - `port_name`: ポート名（例: "COM5", "/dev/ttyUSB0"）
    /// - `baud_rate`: ボーレート
    /// - `timeout`: 読み書きタイムアウト
    ///
    /// # Errors
    /// - ポートが列挙された利用可能ポートに存在しない
    /// - オープン失敗（他プロセスが使用中、権限不足等）
    pub fn open(port_name: &str, baud_rate: u32, timeout: Duration) -> DomainResult<Self> {
        let available = serialport::available_ports().map_err(|e| {
            DomainError::Communication(format!("Failed to enumerate serial ports: {}", e))
        })?;

        if !available.iter().any(|p| p.port_name == port_name) {
            let names: Vec<&str> = available.iter().map(|p| p.port_name.as_str()).collect();
            return Err(DomainError::Communication(format!(
                "Port '{}' not found in available ports: {:?}",
                port_name, names
            )));
        }

        let port = serialport::new(port_name, baud_rate)
            .timeout(timeout)
            .open()
            .map_err(|e| {
                DomainError::Communication(format!("Failed to open port '{}': {}", port_name, e))
            })?;

        tracing::info!(
            "Serial port opened: {} @ {} baud (timeout {:?})",
            port_name,
            baud_rate,
            timeout
        );

        Ok(Self {
            port,
            port_name: port_name.to_string(),
        })
    }

    /// オープン中のポート名
    pub fn port_name(&self) -> &str {
        &self.port_name
    }
}

impl CommPort for SerialCommAdapter {
    /// シグナルのバイト列を送信
    fn send(&mut self, data: &[u8]) -> DomainResult<()> {
        self.port.write_all(data).map_err(|e| {
            DomainError::Communication(format!(
                "Write to '{}' failed: {}",
                self.port_name, e
            ))
        })
    }

    /// 受信バッファをクリア
    fn flush_input(&mut self) -> DomainResult<()> {
        self.port.clear(ClearBuffer::Input).map_err(|e| {
            DomainError::Communication(format!(
                "Failed to clear input buffer of '{}': {}",
                self.port_name, e
            ))
        })
    }

    fn is_connected(&self) -> bool {
        true
    }
}
