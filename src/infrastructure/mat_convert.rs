//! Frame ⇄ Mat 変換ヘルパー
//!
//! Domain層のFrame（BGR連続バッファ）とOpenCVのMatを相互変換する。
//! カメラ・検出・表示の各アダプタで共用される。

use opencv::{
    core::{self, Mat},
    prelude::*,
};

use crate::domain::Frame;

/// FrameからBGR形式のMatを作成する
///
/// Frameのバッファを参照するMatを作り、所有権を切り離すためにクローンして返す。
pub(crate) fn frame_to_mat(frame: &Frame) -> opencv::Result<Mat> {
    let rows = frame.height as i32;
    let cols = frame.width as i32;

    let borrowed = unsafe {
        Mat::new_rows_cols_with_data_unsafe(
            rows,
            cols,
            core::CV_8UC3, // BGR形式
            frame.data.as_ptr() as *mut std::ffi::c_void,
            core::Mat_AUTO_STEP,
        )?
    };

    borrowed.try_clone()
}

/// BGR形式のMatからFrameを作成する
///
/// 非連続メモリのMatはクローンして連続化してからコピーする。
pub(crate) fn mat_to_frame(mat: &Mat) -> opencv::Result<Frame> {
    let owned;
    let mat = if mat.is_continuous() {
        mat
    } else {
        owned = mat.try_clone()?;
        &owned
    };

    let data = mat.data_bytes()?.to_vec();
    Ok(Frame::new(data, mat.cols() as u32, mat.rows() as u32))
}
