//! 同行合并 - 把同一帧内属于同一行文字的多个检测框合并为一个
//!
//! 1. 两两判断是否同行相邻（纵向重叠 + 横向间距）
//! 2. 以满足条件的框对为边求连通分量（并查集）
//! 3. 每个分量按 (cy, cx) 排序后拼接文本，几何取外接矩形

use log::debug;
use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::Regex;

use super::config::{MergeConfig, TrackingConfig, DEFAULT_STRIP_CHARS};
use super::error::TrackingError;
use super::text_box::{OcrFrame, TextBox};

static DEFAULT_STRIP: Lazy<Option<Regex>> =
    Lazy::new(|| strip_regex(DEFAULT_STRIP_CHARS).ok().flatten());

pub struct LineMerger {
    min_y_overlap: f32,
    max_x_gap: i32,
    strip: Option<Regex>,
    parallel: bool,
}

impl LineMerger {
    pub fn new() -> Self {
        let merge = MergeConfig::default();
        Self {
            min_y_overlap: merge.min_y_overlap,
            max_x_gap: merge.max_x_gap,
            strip: DEFAULT_STRIP.clone(),
            parallel: true,
        }
    }

    pub fn from_config(config: &TrackingConfig) -> Result<Self, TrackingError> {
        Ok(Self {
            min_y_overlap: config.merge.min_y_overlap,
            max_x_gap: config.merge.max_x_gap,
            strip: strip_regex(&config.strip_chars)?,
            parallel: config.parallel,
        })
    }

    /// 两个框是否属于同一行且水平相邻
    pub fn should_merge(&self, a: &TextBox, b: &TextBox) -> bool {
        let min_h = a.h.min(b.h);
        if min_h <= 0 {
            return false;
        }
        let y_ratio = a.y_overlap(b) as f32 / min_h as f32;
        y_ratio > self.min_y_overlap && a.x_gap(b) < self.max_x_gap
    }

    /// 所有满足合并条件的无序框对 (i < j)
    pub fn merge_pairs(&self, boxes: &[TextBox]) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for i in 0..boxes.len() {
            for j in (i + 1)..boxes.len() {
                if self.should_merge(&boxes[i], &boxes[j]) {
                    pairs.push((i, j));
                }
            }
        }
        pairs
    }

    /// 连通分量分组，只包含至少出现在一条边上的框
    ///
    /// 组内下标升序，组之间按最小下标排序。
    pub fn group_boxes(&self, boxes: &[TextBox]) -> Vec<Vec<usize>> {
        let pairs = self.merge_pairs(boxes);
        let mut parent: Vec<usize> = (0..boxes.len()).collect();
        let mut touched = vec![false; boxes.len()];

        for &(i, j) in &pairs {
            union(&mut parent, i, j);
            touched[i] = true;
            touched[j] = true;
        }

        let mut slot_of_root: Vec<Option<usize>> = vec![None; boxes.len()];
        let mut groups: Vec<Vec<usize>> = Vec::new();
        for idx in (0..boxes.len()).filter(|&i| touched[i]) {
            let root = find(&mut parent, idx);
            match slot_of_root[root] {
                Some(slot) => groups[slot].push(idx),
                None => {
                    slot_of_root[root] = Some(groups.len());
                    groups.push(vec![idx]);
                }
            }
        }
        groups
    }

    /// 合并单帧：合并框在前，未分组的框原样跟随，最后统一清理文本
    pub fn merge_frame(&self, frame: &[TextBox]) -> OcrFrame {
        let groups = self.group_boxes(frame);

        let mut grouped = vec![false; frame.len()];
        let mut merged: OcrFrame = Vec::with_capacity(frame.len());
        for group in &groups {
            let members: Vec<&TextBox> = group.iter().map(|&i| &frame[i]).collect();
            for &i in group {
                grouped[i] = true;
            }
            merged.push(merge_group(&members));
        }

        if !groups.is_empty() {
            debug!(
                "merged {} boxes into {} lines",
                groups.iter().map(Vec::len).sum::<usize>(),
                groups.len()
            );
        }

        merged.extend(
            frame
                .iter()
                .zip(&grouped)
                .filter(|(_, g)| !**g)
                .map(|(b, _)| b.clone()),
        );

        for b in merged.iter_mut() {
            b.text = self.clean_text(&b.text);
        }
        merged
    }

    /// 逐帧合并，帧之间互不依赖
    pub fn merge_frames(&self, frames: &[OcrFrame]) -> Vec<OcrFrame> {
        if self.parallel {
            frames.par_iter().map(|f| self.merge_frame(f)).collect()
        } else {
            frames.iter().map(|f| self.merge_frame(f)).collect()
        }
    }

    pub fn clean_text(&self, text: &str) -> String {
        match &self.strip {
            Some(re) => re.replace_all(text, "").into_owned(),
            None => text.to_string(),
        }
    }
}

impl Default for LineMerger {
    fn default() -> Self {
        Self::new()
    }
}

/// 组内按从上到下、从左到右拼接文本，几何取外接矩形
pub fn merge_group(members: &[&TextBox]) -> TextBox {
    let mut picked: Vec<&TextBox> = members.to_vec();
    picked.sort_by_key(|b| (b.cy, b.cx));

    let text: String = picked.iter().map(|b| b.text.as_str()).collect();
    let x1 = picked.iter().map(|b| b.cx).min().unwrap_or(0);
    let y1 = picked.iter().map(|b| b.cy).min().unwrap_or(0);
    let x2 = picked.iter().map(|b| b.right()).max().unwrap_or(x1);
    let y2 = picked.iter().map(|b| b.bottom()).max().unwrap_or(y1);

    TextBox {
        cx: x1,
        cy: y1,
        w: x2 - x1,
        h: y2 - y1,
        text,
        degree: 0.0,
    }
}

fn strip_regex(chars: &str) -> Result<Option<Regex>, TrackingError> {
    if chars.is_empty() {
        return Ok(None);
    }
    let class: String = chars.chars().map(|c| regex::escape(&c.to_string())).collect();
    Regex::new(&format!("[{}]", class))
        .map(Some)
        .map_err(|e| TrackingError::Config(format!("invalid strip_chars: {}", e)))
}

fn find(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

fn union(parent: &mut [usize], a: usize, b: usize) {
    let ra = find(parent, a);
    let rb = find(parent, b);
    if ra != rb {
        parent[ra] = rb;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_frame() -> OcrFrame {
        vec![
            TextBox::new(180, 656, 357, 41, "E生平安医疗险"),
            TextBox::new(540, 656, 357, 41, "E生平安医疗险"),
            TextBox::new(61, 741, 594, 84, "最高600万保障"),
            TextBox::new(101, 848, 521, 84, "让您平安无忧"),
            TextBox::new(258, 997, 184, 46, "立即投你"),
        ]
    }

    fn sorted_texts(frame: &[TextBox]) -> Vec<String> {
        let mut texts: Vec<String> = frame.iter().map(|b| b.text.clone()).collect();
        texts.sort();
        texts
    }

    #[test]
    fn test_adjacent_boxes_merge_into_one_line() {
        let merger = LineMerger::new();
        let merged = merger.merge_frame(&sample_frame());

        assert_eq!(merged.len(), 4);
        let line = &merged[0];
        assert_eq!((line.cx, line.cy, line.w, line.h), (180, 656, 717, 41));
        assert_eq!(line.text, "E生平安医疗险E生平安医疗险");
        assert_eq!(line.degree, 0.0);
    }

    #[test]
    fn test_should_merge_thresholds() {
        let merger = LineMerger::new();
        let a = TextBox::new(0, 0, 100, 40, "a");

        // 间距 29 合并，30 不合并
        assert!(merger.should_merge(&a, &TextBox::new(129, 0, 50, 40, "b")));
        assert!(!merger.should_merge(&a, &TextBox::new(130, 0, 50, 40, "b")));

        // 纵向重叠恰好一半不合并
        assert!(!merger.should_merge(&a, &TextBox::new(100, 20, 50, 40, "b")));
        assert!(merger.should_merge(&a, &TextBox::new(100, 19, 50, 40, "b")));
    }

    #[test]
    fn test_chain_merges_transitively() {
        let merger = LineMerger::new();
        let a = TextBox::new(0, 0, 100, 40, "甲");
        let b = TextBox::new(110, 0, 100, 40, "乙");
        let c = TextBox::new(220, 0, 100, 40, "丙");
        assert!(merger.should_merge(&a, &b));
        assert!(merger.should_merge(&b, &c));
        assert!(!merger.should_merge(&a, &c));

        let merged = merger.merge_frame(&[c, a, b]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].text, "甲乙丙");
        assert_eq!((merged[0].cx, merged[0].w), (0, 320));
    }

    #[test]
    fn test_merge_is_order_invariant() {
        let merger = LineMerger::new();
        let frame = sample_frame();
        let mut reversed = frame.clone();
        reversed.reverse();

        assert_eq!(
            sorted_texts(&merger.merge_frame(&frame)),
            sorted_texts(&merger.merge_frame(&reversed))
        );
    }

    #[test]
    fn test_group_sorted_top_to_bottom_then_left_to_right() {
        let upper = TextBox::new(300, 10, 50, 40, "二");
        let lower_left = TextBox::new(0, 20, 50, 40, "三");
        let first = TextBox::new(200, 10, 50, 40, "一");
        let merged = merge_group(&[&lower_left, &upper, &first]);
        assert_eq!(merged.text, "一二三");
        assert_eq!((merged.cx, merged.cy, merged.w, merged.h), (0, 10, 350, 50));
    }

    #[test]
    fn test_ungrouped_boxes_pass_through_with_cleanup() {
        let merger = LineMerger::new();
        let mut lone = TextBox::new(10, 500, 200, 40, "(限时)优惠，欢迎。");
        lone.degree = 12.5;

        let merged = merger.merge_frame(&[lone]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].text, "限时优惠欢迎");
        assert_eq!(merged[0].degree, 12.5);
    }

    #[test]
    fn test_empty_frame() {
        let merger = LineMerger::new();
        assert!(merger.merge_frame(&[]).is_empty());
        assert!(merger.group_boxes(&[]).is_empty());
    }

    #[test]
    fn test_custom_strip_chars() {
        let config = TrackingConfig {
            strip_chars: "-[]".to_string(),
            ..Default::default()
        };
        let merger = LineMerger::from_config(&config).expect("valid strip chars");
        assert_eq!(merger.clean_text("[a-b](c)"), "ab(c)");

        let config = TrackingConfig {
            strip_chars: String::new(),
            ..Default::default()
        };
        let merger = LineMerger::from_config(&config).expect("empty strip chars");
        assert_eq!(merger.clean_text("(a)"), "(a)");
    }

    #[test]
    fn test_default_merger_strips_same_chars_as_default_config() {
        let from_config =
            LineMerger::from_config(&TrackingConfig::default()).expect("default config");
        let text = "冷水(下锅)焯水，好。";
        assert_eq!(LineMerger::new().clean_text(text), "冷水下锅焯水好");
        assert_eq!(LineMerger::new().clean_text(text), from_config.clean_text(text));
    }

    #[test]
    fn test_merge_frames_keeps_frame_order() {
        let merger = LineMerger::new();
        let frames = vec![sample_frame(), vec![], vec![TextBox::new(0, 0, 10, 40, "x")]];
        let merged = merger.merge_frames(&frames);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].len(), 4);
        assert!(merged[1].is_empty());
        assert_eq!(merged[2][0].text, "x");
    }
}
