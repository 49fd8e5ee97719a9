//! Greedy non-maximum suppression

use fridgescan_core::BoundingBox;

/// Suppress overlapping duplicates among one frame's candidate boxes.
///
/// Candidates below `confidence_threshold` are discarded up front. The
/// rest are visited in descending confidence order; each survivor
/// suppresses every remaining candidate whose IoU with it exceeds
/// `nms_threshold`. Returns the indices of the survivors, in no
/// particular order.
pub fn suppress(
    boxes: &[BoundingBox],
    confidences: &[f32],
    confidence_threshold: f32,
    nms_threshold: f32,
) -> Vec<usize> {
    debug_assert_eq!(boxes.len(), confidences.len());

    let mut order: Vec<usize> = (0..boxes.len())
        .filter(|&i| confidences[i] >= confidence_threshold)
        .collect();
    order.sort_by(|&a, &b| confidences[b].total_cmp(&confidences[a]));

    let mut suppressed = vec![false; boxes.len()];
    let mut keep = Vec::new();

    for (position, &index) in order.iter().enumerate() {
        if suppressed[index] {
            continue;
        }
        keep.push(index);

        for &other in &order[position + 1..] {
            if !suppressed[other] && boxes[index].iou(&boxes[other]) > nms_threshold {
                suppressed[other] = true;
            }
        }
    }

    keep
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heavily_overlapping_boxes_keep_the_strongest() {
        // IoU of these two is ~0.9 > 0.4, so only the 0.8 box survives.
        let boxes = vec![
            BoundingBox::new(0.0, 0.0, 100.0, 100.0),
            BoundingBox::new(0.0, 0.0, 100.0, 111.1),
        ];
        let confidences = vec![0.8, 0.6];

        let keep = suppress(&boxes, &confidences, 0.0, 0.4);
        assert_eq!(keep, vec![0]);
    }

    #[test]
    fn barely_overlapping_boxes_both_survive() {
        // 10x10 boxes offset by 8.2 on one axis: IoU ~0.1, under 0.4.
        let boxes = vec![
            BoundingBox::new(0.0, 0.0, 10.0, 10.0),
            BoundingBox::new(8.2, 0.0, 10.0, 10.0),
        ];
        let confidences = vec![0.8, 0.6];

        let mut keep = suppress(&boxes, &confidences, 0.0, 0.4);
        keep.sort();
        assert_eq!(keep, vec![0, 1]);
    }

    #[test]
    fn low_confidence_candidates_are_discarded_first() {
        let boxes = vec![
            BoundingBox::new(0.0, 0.0, 10.0, 10.0),
            BoundingBox::new(50.0, 50.0, 10.0, 10.0),
        ];
        let confidences = vec![0.9, 0.1];

        let keep = suppress(&boxes, &confidences, 0.5, 0.4);
        assert_eq!(keep, vec![0]);
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(suppress(&[], &[], 0.5, 0.4).is_empty());
    }

    #[test]
    fn suppression_chains_through_clusters() {
        // Three stacked boxes: the strongest suppresses both others.
        let boxes = vec![
            BoundingBox::new(0.0, 0.0, 20.0, 20.0),
            BoundingBox::new(1.0, 1.0, 20.0, 20.0),
            BoundingBox::new(2.0, 2.0, 20.0, 20.0),
        ];
        let confidences = vec![0.7, 0.9, 0.6];

        let keep = suppress(&boxes, &confidences, 0.0, 0.4);
        assert_eq!(keep, vec![1]);
    }
}
