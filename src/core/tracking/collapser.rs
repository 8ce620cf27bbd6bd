use log::debug;
use rayon::prelude::*;

use super::sequence_tracker::Tracker;
use super::similarity::DuplicateJudge;
use super::text_box::TextBox;

/// 轨迹内相邻重复文本去重
pub struct DuplicateCollapser {
    judge: DuplicateJudge,
    parallel: bool,
}

impl DuplicateCollapser {
    pub fn new() -> Self {
        Self::with_judge(DuplicateJudge::new(), true)
    }

    pub fn with_judge(judge: DuplicateJudge, parallel: bool) -> Self {
        Self { judge, parallel }
    }

    pub fn judge(&self) -> &DuplicateJudge {
        &self.judge
    }

    /// 反复扫描相邻对，删除每对中的后一个，直到没有重复
    ///
    /// 返回删除的框数，首个框永远保留。
    pub fn collapse(&self, boxes: &mut Vec<TextBox>) -> usize {
        let before = boxes.len();
        let mut rounds = 0;

        loop {
            let pop_indexes: Vec<usize> = boxes
                .windows(2)
                .enumerate()
                .filter(|(_, pair)| self.judge.is_duplicate(&pair[0].text, &pair[1].text))
                .map(|(i, _)| i + 1)
                .collect();

            if pop_indexes.is_empty() {
                break;
            }
            rounds += 1;

            for &idx in pop_indexes.iter().rev() {
                boxes.remove(idx);
            }
        }

        let removed = before - boxes.len();
        if removed > 0 {
            debug!("collapsed {} duplicate boxes in {} rounds", removed, rounds);
        }
        removed
    }

    pub fn collapse_tracker(&self, tracker: &mut Tracker) -> usize {
        self.collapse(tracker.boxes_mut())
    }

    /// 轨迹之间互不依赖，可并行
    pub fn collapse_trackers(&self, trackers: &mut [Tracker]) -> usize {
        if self.parallel {
            trackers
                .par_iter_mut()
                .map(|t| self.collapse_tracker(t))
                .sum()
        } else {
            trackers.iter_mut().map(|t| self.collapse_tracker(t)).sum()
        }
    }
}

impl Default for DuplicateCollapser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boxes(texts: &[&str]) -> Vec<TextBox> {
        texts
            .iter()
            .map(|t| TextBox::new(180, 730, 352, 57, *t))
            .collect()
    }

    fn texts(boxes: &[TextBox]) -> Vec<&str> {
        boxes.iter().map(|b| b.text.as_str()).collect()
    }

    #[test]
    fn test_collapse_dialogue() {
        let collapser = DuplicateCollapser::new();
        let mut seq = boxes(&[
            "老板",
            "您这有慢头吗",
            "您这有馒头吗",
            "我想买2个",
            "我想买2个",
            "我们这只有套餐",
            "我们这只有套餐",
            "没有慢头",
            "不吃出去",
        ]);

        let removed = collapser.collapse(&mut seq);
        assert_eq!(removed, 3);
        assert_eq!(
            texts(&seq),
            vec!["老板", "您这有慢头吗", "我想买2个", "我们这只有套餐", "没有慢头", "不吃出去"]
        );
    }

    #[test]
    fn test_chain_collapses_over_multiple_rounds() {
        let collapser = DuplicateCollapser::new();
        // 第一轮删 B 后 A、C 才相邻，第二轮删 C
        let mut seq = boxes(&["abcd", "abcdxyz", "abce", "红烧肉"]);
        collapser.collapse(&mut seq);
        assert_eq!(texts(&seq), vec!["abcd", "红烧肉"]);
    }

    #[test]
    fn test_near_duplicate_chain_reduces_to_first() {
        let collapser = DuplicateCollapser::new();
        let mut seq = boxes(&["abcd", "abxd", "ayxd", "zyxd"]);
        collapser.collapse(&mut seq);
        assert_eq!(texts(&seq), vec!["abcd"]);
    }

    #[test]
    fn test_collapse_is_idempotent() {
        let collapser = DuplicateCollapser::new();
        let mut seq = boxes(&["您这有慢头吗", "您这有馒头吗", "没有慢头", "没有馒头", "不吃出去"]);
        collapser.collapse(&mut seq);
        let once = seq.clone();
        assert_eq!(collapser.collapse(&mut seq), 0);
        assert_eq!(seq, once);
    }

    #[test]
    fn test_collapse_keeps_first_and_never_grows() {
        let collapser = DuplicateCollapser::new();
        let original = boxes(&["同一句", "同一句", "同一句"]);
        let mut seq = original.clone();
        collapser.collapse(&mut seq);
        assert_eq!(seq.len(), 1);
        assert_eq!(seq[0], original[0]);

        let mut empty: Vec<TextBox> = Vec::new();
        assert_eq!(collapser.collapse(&mut empty), 0);
        let mut single = boxes(&["只有一个"]);
        assert_eq!(collapser.collapse(&mut single), 0);
    }

    #[test]
    fn test_collapse_trackers_in_parallel() {
        let collapser = DuplicateCollapser::new();
        let mut a = Tracker::new(TextBox::new(0, 0, 10, 40, "甲"));
        a.push(TextBox::new(0, 0, 10, 40, "甲"));
        let mut b = Tracker::new(TextBox::new(0, 0, 10, 40, "没有慢头"));
        b.push(TextBox::new(0, 0, 10, 40, "不吃出去"));

        let mut trackers = vec![a, b];
        assert_eq!(collapser.collapse_trackers(&mut trackers), 1);
        assert_eq!(trackers[0].len(), 1);
        assert_eq!(trackers[1].len(), 2);
    }
}
