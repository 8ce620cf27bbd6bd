use super::text_box::OcrFrame;

/// 过滤过小的文字框：仅保留 `h > min_height` 的框
pub fn filter_by_height(frames: Vec<OcrFrame>, min_height: i32) -> Vec<OcrFrame> {
    frames
        .into_iter()
        .map(|frame| frame.into_iter().filter(|b| b.h > min_height).collect())
        .collect()
}
