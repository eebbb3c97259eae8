//! 运动指数
//!
//! 直接接收 `ImageData.data`（RGBA）。尺寸与缓冲长度不符时按 0 处理，不抛异常。

use neuropulse::analysis::config::MotionConfig;
use neuropulse::analysis::frame::PixelBuffer;
use neuropulse::analysis::motion;
use wasm_bindgen::prelude::*;

/// 计算两帧之间的运动指数 (0-100)
#[wasm_bindgen(js_name = "computeMovement")]
pub fn compute_movement(prev: Vec<u8>, curr: Vec<u8>, width: u32, height: u32) -> u8 {
    match (
        PixelBuffer::rgba(width, height, prev, 0.0),
        PixelBuffer::rgba(width, height, curr, 0.0),
    ) {
        (Ok(a), Ok(b)) => motion::compute_movement(&a, &b, &MotionConfig::default()),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_buffers_do_not_move() {
        let frame = vec![90u8; 8 * 8 * 4];
        assert_eq!(compute_movement(frame.clone(), frame, 8, 8), 0);
    }

    #[test]
    fn malformed_buffers_are_zero() {
        assert_eq!(compute_movement(vec![0; 10], vec![255; 256], 8, 8), 0);
    }

    #[test]
    fn black_to_white_is_full_scale() {
        assert_eq!(compute_movement(vec![0; 256], vec![255; 256], 8, 8), 100);
    }
}
