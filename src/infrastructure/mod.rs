//! Infrastructure層: 外部技術の統合
//!
//! Domain層のtraitを実装し、外部ライブラリ（OpenCV/serialport）と接続する。

pub mod camera;
pub mod comm_selector;
pub mod display;
pub mod face_detect;
pub(crate) mod mat_convert;
pub mod mock_comm;
pub mod serial_comm;
