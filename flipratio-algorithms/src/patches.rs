//! Connected-component labeling and patch rejection.
//!
//! Padding the peak border with disks leaves two kinds of artifacts in a
//! mask: components truncated by the frame edge and free-floating patches
//! the size of the padding disk. Both are punched out before integration.
#![allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]

use flipratio_core::{DiskShape, Mask};
use ndarray::Array2;

/// Tight bounding box of a labeled component, half-open on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    /// First row containing the component.
    pub row_start: usize,
    /// One past the last row containing the component.
    pub row_end: usize,
    /// First column containing the component.
    pub col_start: usize,
    /// One past the last column containing the component.
    pub col_end: usize,
}

impl BoundingBox {
    /// Whether the box touches any of the four image edges.
    #[must_use]
    pub fn touches_edge(&self, shape: (usize, usize)) -> bool {
        self.edges_touched(shape) > 0
    }

    /// Number of distinct image edges (top, left, bottom, right) the box touches.
    #[must_use]
    pub fn edges_touched(&self, shape: (usize, usize)) -> usize {
        let (rows, cols) = shape;
        usize::from(self.row_start == 0)
            + usize::from(self.col_start == 0)
            + usize::from(self.row_end == rows)
            + usize::from(self.col_end == cols)
    }
}

/// Labeling of the 4-connected components of a mask.
///
/// Labels run 1..=len; 0 is reserved for false pixels. Derived data,
/// recomputed whenever the mask changes.
#[derive(Debug, Clone)]
pub struct ComponentLabels {
    labels: Array2<u32>,
    boxes: Vec<BoundingBox>,
    sizes: Vec<usize>,
}

impl ComponentLabels {
    /// Number of components found.
    #[must_use]
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    /// True when the mask had no true pixels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// The per-pixel label array (0 = no component).
    #[must_use]
    pub fn labels(&self) -> &Array2<u32> {
        &self.labels
    }

    /// Bounding box of the component with the given 1-based label.
    #[must_use]
    pub fn bounding_box(&self, label: u32) -> BoundingBox {
        self.boxes[label as usize - 1]
    }

    /// Pixel count of the component with the given 1-based label.
    #[must_use]
    pub fn size(&self, label: u32) -> usize {
        self.sizes[label as usize - 1]
    }

    /// Iterates (label, bounding box, size) over all components.
    pub fn iter(&self) -> impl Iterator<Item = (u32, BoundingBox, usize)> + '_ {
        self.boxes
            .iter()
            .zip(&self.sizes)
            .enumerate()
            .map(|(idx, (bb, &size))| (idx as u32 + 1, *bb, size))
    }

    /// Clears every pixel of the given component from `mask`.
    pub fn remove_component(&self, mask: &mut Mask, label: u32) {
        let bb = self.bounding_box(label);
        for i in bb.row_start..bb.row_end {
            for j in bb.col_start..bb.col_end {
                if self.labels[[i, j]] == label {
                    mask[[i, j]] = false;
                }
            }
        }
    }

    /// Rebuilds a full-frame mask holding only the given component.
    #[must_use]
    pub fn component_mask(&self, label: u32) -> Mask {
        self.labels.mapv(|l| l == label)
    }
}

/// Union-Find over flattened pixel indices.
struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            self.parent[x] = self.find(self.parent[x]);
        }
        self.parent[x]
    }

    fn union(&mut self, x: usize, y: usize) {
        let px = self.find(x);
        let py = self.find(y);

        if px == py {
            return;
        }

        match self.rank[px].cmp(&self.rank[py]) {
            std::cmp::Ordering::Less => self.parent[px] = py,
            std::cmp::Ordering::Greater => self.parent[py] = px,
            std::cmp::Ordering::Equal => {
                self.parent[py] = px;
                self.rank[px] += 1;
            }
        }
    }
}

/// Labels the 4-connected components of a mask.
#[must_use]
pub fn label_components(mask: &Mask) -> ComponentLabels {
    let (rows, cols) = mask.dim();
    let mut uf = UnionFind::new(rows * cols);

    for i in 0..rows {
        for j in 0..cols {
            if !mask[[i, j]] {
                continue;
            }
            let idx = i * cols + j;
            if j > 0 && mask[[i, j - 1]] {
                uf.union(idx, idx - 1);
            }
            if i > 0 && mask[[i - 1, j]] {
                uf.union(idx, idx - cols);
            }
        }
    }

    let mut labels = Array2::zeros((rows, cols));
    let mut root_to_label: std::collections::HashMap<usize, u32> =
        std::collections::HashMap::new();
    let mut boxes: Vec<BoundingBox> = Vec::new();
    let mut sizes: Vec<usize> = Vec::new();

    for i in 0..rows {
        for j in 0..cols {
            if !mask[[i, j]] {
                continue;
            }
            let root = uf.find(i * cols + j);
            let next = boxes.len() as u32 + 1;
            let label = *root_to_label.entry(root).or_insert_with(|| {
                boxes.push(BoundingBox {
                    row_start: i,
                    row_end: i + 1,
                    col_start: j,
                    col_end: j + 1,
                });
                sizes.push(0);
                next
            });
            labels[[i, j]] = label;

            let bb = &mut boxes[label as usize - 1];
            bb.row_start = bb.row_start.min(i);
            bb.row_end = bb.row_end.max(i + 1);
            bb.col_start = bb.col_start.min(j);
            bb.col_end = bb.col_end.max(j + 1);
            sizes[label as usize - 1] += 1;
        }
    }

    ComponentLabels {
        labels,
        boxes,
        sizes,
    }
}

/// Removes components that touch the frame edge or are sized like the disk.
///
/// Edge-touching components are truncated by the frame and cannot be
/// integrated; components whose pixel count is within `tolerance * disk.len()`
/// of the disk itself are padding artifacts, not signal. Removals are
/// independent of each other.
pub fn punch_out_border_and_small(mask: &mut Mask, disk: &DiskShape, tolerance: f64) {
    let components = label_components(mask);
    let shape = mask.dim();
    let disk_len = disk.len() as f64;

    for (label, bb, size) in components.iter() {
        let disk_sized = (size as f64 - disk_len).abs() < tolerance * disk_len;
        if bb.touches_edge(shape) || disk_sized {
            components.remove_component(mask, label);
        }
    }
}

/// Removes components whose bounding box touches exactly 1 or 2 image edges.
///
/// Fragments bleeding off one or two sides are truncated; a component
/// touching 3 or 4 edges spans the frame and is the interior bulk.
pub fn remove_edge_patches(mask: &mut Mask) {
    let components = label_components(mask);
    let shape = mask.dim();

    for (label, bb, _) in components.iter() {
        let touched = bb.edges_touched(shape);
        if touched == 1 || touched == 2 {
            components.remove_component(mask, label);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flipratio_core::mask::{self, count_true};

    fn mask_from(rows: &[&[u8]]) -> Mask {
        let shape = (rows.len(), rows[0].len());
        let mut out = mask::blank(shape);
        for (i, row) in rows.iter().enumerate() {
            for (j, &v) in row.iter().enumerate() {
                out[[i, j]] = v != 0;
            }
        }
        out
    }

    #[test]
    fn test_label_two_components() {
        let mask = mask_from(&[
            &[1, 1, 0, 0, 0],
            &[1, 0, 0, 1, 1],
            &[0, 0, 0, 1, 1],
        ]);
        let components = label_components(&mask);
        assert_eq!(components.len(), 2);

        let first = components.labels()[[0, 0]];
        let second = components.labels()[[1, 3]];
        assert_ne!(first, second);
        assert_eq!(components.size(first), 3);
        assert_eq!(components.size(second), 4);

        let bb = components.bounding_box(second);
        assert_eq!(
            bb,
            BoundingBox {
                row_start: 1,
                row_end: 3,
                col_start: 3,
                col_end: 5
            }
        );
    }

    #[test]
    fn test_diagonal_pixels_are_separate() {
        let mask = mask_from(&[&[1, 0], &[0, 1]]);
        let components = label_components(&mask);
        assert_eq!(components.len(), 2);
    }

    #[test]
    fn test_punch_out_clears_all_edges() {
        let mut mask = mask_from(&[
            &[1, 1, 0, 0, 0, 0],
            &[0, 0, 0, 1, 0, 0],
            &[0, 0, 1, 1, 0, 0],
            &[0, 0, 0, 0, 0, 1],
            &[0, 0, 0, 0, 0, 1],
        ]);
        punch_out_border_and_small(&mut mask, &DiskShape::new(1), 0.1);

        let (rows, cols) = mask.dim();
        for j in 0..cols {
            assert!(!mask[[0, j]]);
            assert!(!mask[[rows - 1, j]]);
        }
        for i in 0..rows {
            assert!(!mask[[i, 0]]);
            assert!(!mask[[i, cols - 1]]);
        }
        // the interior component survives
        assert!(mask[[2, 2]]);
        assert!(mask[[2, 3]]);
        assert!(mask[[1, 3]]);
    }

    #[test]
    fn test_punch_out_removes_disk_sized_patch() {
        // disk radius 2 has 9 pixels: a 3x3 patch matches it exactly
        let mut mask = mask::blank((12, 12));
        for i in 4..7 {
            for j in 4..7 {
                mask[[i, j]] = true;
            }
        }
        mask[[9, 9]] = true;
        mask[[9, 10]] = true;

        punch_out_border_and_small(&mut mask, &DiskShape::new(2), 0.1);
        assert!(!mask[[5, 5]]);
        // the 2-pixel patch differs from the disk by far more than 10%
        assert!(mask[[9, 9]]);
        assert!(mask[[9, 10]]);
    }

    #[test]
    fn test_remove_edge_patches_keeps_interior_and_spanning() {
        let mut mask = mask_from(&[
            &[1, 1, 0, 0, 0, 0],
            &[0, 0, 0, 1, 1, 0],
            &[0, 0, 0, 0, 0, 0],
            &[1, 1, 1, 1, 1, 1],
        ]);
        // top-left patch touches 2 edges, interior patch touches 0,
        // bottom row touches 3 (left, bottom, right)
        remove_edge_patches(&mut mask);

        assert!(!mask[[0, 0]]);
        assert!(!mask[[0, 1]]);
        assert!(mask[[1, 3]]);
        assert!(mask[[1, 4]]);
        assert!(mask[[3, 0]]);
        assert!(mask[[3, 5]]);
    }

    #[test]
    fn test_component_mask_roundtrip() {
        let mask = mask_from(&[&[1, 0, 1], &[1, 0, 0]]);
        let components = label_components(&mask);
        let label = components.labels()[[0, 0]];
        let only = components.component_mask(label);
        assert_eq!(count_true(&only), 3);
        assert!(!only[[0, 2]]);
    }
}
