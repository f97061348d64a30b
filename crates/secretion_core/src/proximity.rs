use glam::DVec3;
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

/// Upper bound on grid cells; coarser cells are used past it.
const MAX_GRID_CELLS: usize = 1 << 21;

/// Dense 3-D uniform grid over a point set.
///
/// Uses the "offset array" layout (compressed rows): all entity indices are
/// stored in one vector sorted by cell, and
/// `cell_offsets[i]..cell_offsets[i + 1]` is the slice belonging to cell `i`.
#[derive(Clone, Debug, Default)]
pub struct UniformGrid {
    pub cell_size: f64,
    pub origin: DVec3,
    pub dims: [usize; 3],
    pub cell_offsets: Vec<usize>,
    pub entity_indices: Vec<usize>,
}

impl UniformGrid {
    /// Builds the grid over `points` with cells of at least `min_cell_size`.
    /// Non-finite points are left out of the grid.
    pub fn build(points: &[DVec3], min_cell_size: f64) -> Self {
        let mut finite = points.iter().copied().filter(|p| p.is_finite());
        let Some(first) = finite.next() else {
            return Self {
                cell_size: min_cell_size,
                cell_offsets: vec![0],
                ..Self::default()
            };
        };
        let (lo, hi) = finite.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));
        let extent = hi - lo;

        let mut cell_size = if min_cell_size.is_finite() {
            min_cell_size.max(f64::EPSILON)
        } else {
            f64::MAX
        };
        let mut dims = Self::dims_for(extent, cell_size);
        while Self::cell_count(dims).map_or(true, |n| n > MAX_GRID_CELLS) {
            cell_size *= 2.0;
            dims = Self::dims_for(extent, cell_size);
        }

        let mut grid = Self {
            cell_size,
            origin: lo,
            dims,
            cell_offsets: Vec::new(),
            entity_indices: Vec::new(),
        };
        let cell_count = dims[0] * dims[1] * dims[2];

        let atomic_counts: Vec<AtomicUsize> =
            (0..cell_count).map(|_| AtomicUsize::new(0)).collect();
        points.par_iter().for_each(|&p| {
            if let Some(idx) = grid.cell_idx(p) {
                atomic_counts[idx].fetch_add(1, AtomicOrdering::Relaxed);
            }
        });
        let counts: Vec<usize> = atomic_counts.into_iter().map(|a| a.into_inner()).collect();

        grid.cell_offsets.resize(cell_count + 1, 0);
        let mut total = 0;
        for (i, &count) in counts.iter().enumerate() {
            grid.cell_offsets[i] = total;
            total += count;
        }
        grid.cell_offsets[cell_count] = total;

        grid.entity_indices.resize(total, 0);
        let mut cursor = grid.cell_offsets[..cell_count].to_vec();
        for (entity_idx, &p) in points.iter().enumerate() {
            if let Some(cell_idx) = grid.cell_idx(p) {
                grid.entity_indices[cursor[cell_idx]] = entity_idx;
                cursor[cell_idx] += 1;
            }
        }
        grid
    }

    /// Cells per axis. Float-to-int casts saturate, so a huge extent yields
    /// `usize::MAX` rather than wrapping.
    fn dims_for(extent: DVec3, cell_size: f64) -> [usize; 3] {
        let axis = |e: f64| ((e / cell_size).floor() + 1.0) as usize;
        [axis(extent.x), axis(extent.y), axis(extent.z)]
    }

    fn cell_count(dims: [usize; 3]) -> Option<usize> {
        dims[0].checked_mul(dims[1])?.checked_mul(dims[2])
    }

    /// Unclamped integer cell coordinates of `p`; `None` for non-finite input.
    #[inline]
    fn coords(&self, p: DVec3) -> Option<[i64; 3]> {
        if !p.is_finite() {
            return None;
        }
        let rel = (p - self.origin) / self.cell_size;
        Some([
            rel.x.floor() as i64,
            rel.y.floor() as i64,
            rel.z.floor() as i64,
        ])
    }

    #[inline]
    pub fn cell_idx(&self, p: DVec3) -> Option<usize> {
        let [x, y, z] = self.coords(p)?;
        let [dx, dy, dz] = self.dims;
        if x < 0 || y < 0 || z < 0 || x as usize >= dx || y as usize >= dy || z as usize >= dz {
            return None;
        }
        Some((z as usize * dy + y as usize) * dx + x as usize)
    }

    /// Calls `callback` with every entity in the 3x3x3 block of cells around
    /// `p`. Anything within one `cell_size` of `p` is reported.
    pub fn query_neighbors<F>(&self, p: DVec3, mut callback: F)
    where
        F: FnMut(usize),
    {
        let Some(c) = self.coords(p) else {
            return;
        };
        let [dx, dy, dz] = self.dims;
        let range = |v: i64, dim: usize| {
            let lo = (v - 1).max(0);
            let hi = (v + 1).min(dim as i64 - 1);
            lo..=hi
        };
        for z in range(c[2], dz) {
            for y in range(c[1], dy) {
                for x in range(c[0], dx) {
                    let cell_idx = (z as usize * dy + y as usize) * dx + x as usize;
                    let start = self.cell_offsets[cell_idx];
                    let end = self.cell_offsets[cell_idx + 1];
                    for &entity_idx in &self.entity_indices[start..end] {
                        callback(entity_idx);
                    }
                }
            }
        }
    }
}

/// Incrementally maintained list of close pairs between two sets A and B.
///
/// A pair `(a, b)` is tracked when the surface distance between the two
/// spheres is below `contact_range + 2 * slack`. The list is rebuilt only when
/// some sphere moved farther than `slack` since the last rebuild, so every
/// pair currently closer than `contact_range` is always in the list.
///
/// # Examples
/// ```
/// use glam::DVec3;
/// use secretion_core::proximity::ClosePairIndex;
///
/// let mut index = ClosePairIndex::new(1.0, 0.5);
/// let a = vec![(DVec3::ZERO, 1.0)];
/// let b = vec![(DVec3::new(2.5, 0.0, 0.0), 1.0), (DVec3::new(50.0, 0.0, 0.0), 1.0)];
/// index.refresh(&a, &b);
/// assert_eq!(index.pairs(), &[(0, 0)]);
/// ```
#[derive(Clone, Debug)]
pub struct ClosePairIndex {
    contact_range: f64,
    slack: f64,
    pairs: Vec<(usize, usize)>,
    reference_a: Vec<(DVec3, f64)>,
    reference_b: Vec<(DVec3, f64)>,
    built: bool,
    rebuilds: u64,
}

impl ClosePairIndex {
    pub fn new(contact_range: f64, slack: f64) -> Self {
        Self {
            contact_range,
            slack,
            pairs: Vec::new(),
            reference_a: Vec::new(),
            reference_b: Vec::new(),
            built: false,
            rebuilds: 0,
        }
    }

    /// Distance threshold of the cached list.
    #[inline]
    pub fn cutoff(&self) -> f64 {
        self.contact_range + 2.0 * self.slack
    }

    pub fn contact_range(&self) -> f64 {
        self.contact_range
    }

    pub fn slack(&self) -> f64 {
        self.slack
    }

    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Cached pairs in ascending `(a, b)` order.
    pub fn pairs(&self) -> &[(usize, usize)] {
        &self.pairs
    }

    pub fn for_each_close_pair<F>(&self, mut callback: F)
    where
        F: FnMut(usize, usize),
    {
        for &(a, b) in &self.pairs {
            callback(a, b);
        }
    }

    /// Brings the pair list up to date with the given spheres. Returns `true`
    /// when a full rebuild was needed.
    pub fn refresh(&mut self, a: &[(DVec3, f64)], b: &[(DVec3, f64)]) -> bool {
        if self.built && !self.needs_rebuild(a, b) {
            return false;
        }
        self.rebuild(a, b);
        true
    }

    fn needs_rebuild(&self, a: &[(DVec3, f64)], b: &[(DVec3, f64)]) -> bool {
        if a.len() != self.reference_a.len() || b.len() != self.reference_b.len() {
            return true;
        }
        let moved = |now: &[(DVec3, f64)], then: &[(DVec3, f64)]| {
            now.iter().zip(then).any(|(&(p, r), &(p0, r0))| {
                r != r0 || !p.is_finite() || p.distance(p0) > self.slack
            })
        };
        moved(a, &self.reference_a) || moved(b, &self.reference_b)
    }

    fn rebuild(&mut self, a: &[(DVec3, f64)], b: &[(DVec3, f64)]) {
        let cutoff = self.cutoff();
        let max_radius = a
            .iter()
            .chain(b.iter())
            .map(|&(_, r)| r)
            .fold(0.0_f64, f64::max);
        let b_points: Vec<DVec3> = b.iter().map(|&(p, _)| p).collect();
        let grid = UniformGrid::build(&b_points, 2.0 * max_radius + cutoff);

        let per_a: Vec<Vec<(usize, usize)>> = a
            .par_iter()
            .enumerate()
            .map(|(ai, &(pa, ra))| {
                let mut hits = Vec::new();
                grid.query_neighbors(pa, |bi| {
                    let (pb, rb) = b[bi];
                    if pa.distance(pb) - ra - rb < cutoff {
                        hits.push((ai, bi));
                    }
                });
                hits.sort_unstable();
                hits
            })
            .collect();

        self.pairs.clear();
        self.pairs.extend(per_a.into_iter().flatten());
        self.reference_a.clear();
        self.reference_a.extend_from_slice(a);
        self.reference_b.clear();
        self.reference_b.extend_from_slice(b);
        self.built = true;
        self.rebuilds += 1;
        tracing::debug!(
            pairs = self.pairs.len(),
            a = a.len(),
            b = b.len(),
            "Rebuilt close pair list"
        );
    }
}
