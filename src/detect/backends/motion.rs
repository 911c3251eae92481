use std::collections::VecDeque;

use anyhow::Result;
use sha2::{Digest, Sha256};

use crate::detect::backend::HumanDetector;
use crate::detect::result::{BoundingBox, RawCandidate};
use crate::frame::Frame;

/// Side of the square blocks compared between frames.
pub const DEFAULT_BLOCK_SIZE: u32 = 16;
/// Mean absolute luma difference above which a block counts as changed.
pub const DEFAULT_DIFF_THRESHOLD: u8 = 25;

/// CPU frame-differencing backend.
///
/// Compares each frame against the previous one block by block, groups
/// changed blocks into 4-connected regions, and reports one candidate per
/// region. Confidence is the mean normalized difference of the region's
/// blocks, so a high-contrast figure scores close to 1.0 and sensor noise
/// stays near 0.
pub struct MotionBackend {
    block_size: u32,
    diff_threshold: u8,
    last_hash: Option<[u8; 32]>,
    previous: Option<PreviousFrame>,
}

struct PreviousFrame {
    luma: Vec<u8>,
    width: u32,
    height: u32,
}

impl MotionBackend {
    pub fn new() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            diff_threshold: DEFAULT_DIFF_THRESHOLD,
            last_hash: None,
            previous: None,
        }
    }

    pub fn with_block_size(mut self, block_size: u32) -> Self {
        self.block_size = block_size.max(1);
        self
    }

    pub fn with_diff_threshold(mut self, diff_threshold: u8) -> Self {
        self.diff_threshold = diff_threshold;
        self
    }

    fn block_scores(&self, previous: &[u8], current: &[u8], width: u32, height: u32) -> Grid {
        let bs = self.block_size;
        let cols = width.div_ceil(bs);
        let rows = height.div_ceil(bs);
        let mut scores = vec![0f32; (cols * rows) as usize];

        for row in 0..rows {
            for col in 0..cols {
                let x0 = col * bs;
                let y0 = row * bs;
                let x1 = (x0 + bs).min(width);
                let y1 = (y0 + bs).min(height);
                let mut total = 0u64;
                for y in y0..y1 {
                    let offset = (y * width) as usize;
                    for x in x0..x1 {
                        let idx = offset + x as usize;
                        total += u64::from(previous[idx].abs_diff(current[idx]));
                    }
                }
                let count = u64::from((x1 - x0) * (y1 - y0));
                let mean = total as f32 / count as f32;
                if mean > f32::from(self.diff_threshold) {
                    scores[(row * cols + col) as usize] = mean / 255.0;
                }
            }
        }

        Grid { cols, rows, scores }
    }

    fn regions(&self, grid: &Grid, width: u32, height: u32) -> Vec<RawCandidate> {
        let mut visited = vec![false; grid.scores.len()];
        let mut candidates = Vec::new();

        for start in 0..grid.scores.len() {
            if visited[start] || grid.scores[start] == 0.0 {
                continue;
            }
            visited[start] = true;
            let mut queue = VecDeque::from([start]);
            let (mut min_col, mut min_row) = (u32::MAX, u32::MAX);
            let (mut max_col, mut max_row) = (0u32, 0u32);
            let mut score_sum = 0f32;
            let mut blocks = 0u32;

            while let Some(idx) = queue.pop_front() {
                let col = idx as u32 % grid.cols;
                let row = idx as u32 / grid.cols;
                min_col = min_col.min(col);
                min_row = min_row.min(row);
                max_col = max_col.max(col);
                max_row = max_row.max(row);
                score_sum += grid.scores[idx];
                blocks += 1;

                for neighbour in grid.neighbours(col, row) {
                    if !visited[neighbour] && grid.scores[neighbour] > 0.0 {
                        visited[neighbour] = true;
                        queue.push_back(neighbour);
                    }
                }
            }

            let bs = self.block_size;
            let bbox = BoundingBox::new(
                min_col * bs,
                min_row * bs,
                (max_col - min_col + 1) * bs,
                (max_row - min_row + 1) * bs,
            )
            .clamped(width, height);
            let confidence = (score_sum / blocks as f32).clamp(0.0, 1.0);
            candidates.push(RawCandidate::new(bbox, confidence));
        }

        candidates
    }
}

impl Default for MotionBackend {
    fn default() -> Self {
        Self::new()
    }
}

struct Grid {
    cols: u32,
    rows: u32,
    scores: Vec<f32>,
}

impl Grid {
    fn neighbours(&self, col: u32, row: u32) -> impl Iterator<Item = usize> + '_ {
        let cols = self.cols;
        let rows = self.rows;
        [(-1i64, 0i64), (1, 0), (0, -1), (0, 1)]
            .into_iter()
            .filter_map(move |(dc, dr)| {
                let c = i64::from(col) + dc;
                let r = i64::from(row) + dr;
                if c < 0 || r < 0 || c >= i64::from(cols) || r >= i64::from(rows) {
                    None
                } else {
                    Some((r as u32 * cols + c as u32) as usize)
                }
            })
    }
}

impl HumanDetector for MotionBackend {
    fn name(&self) -> &'static str {
        "motion"
    }

    fn detect(&mut self, frame: &Frame) -> Result<Vec<RawCandidate>> {
        let current_hash: [u8; 32] = Sha256::digest(frame.pixels()).into();
        if self.last_hash == Some(current_hash) {
            return Ok(Vec::new());
        }
        self.last_hash = Some(current_hash);

        let luma = frame.luma();
        let candidates = match &self.previous {
            Some(prev) if prev.width == frame.width && prev.height == frame.height => {
                let grid = self.block_scores(&prev.luma, &luma, frame.width, frame.height);
                self.regions(&grid, frame.width, frame.height)
            }
            _ => Vec::new(),
        };

        self.previous = Some(PreviousFrame {
            luma,
            width: frame.width,
            height: frame.height,
        });
        Ok(candidates)
    }
}
