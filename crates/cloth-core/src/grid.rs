use glam::Vec3;

/// Uniform spatial hash grid over particle positions.
///
/// Uses counting sort for O(N) construction: count particles per cell -> prefix sum -> scatter.
/// The grid is a transient index: it is rebuilt from current positions every
/// frame and never outlives one.
pub struct SpatialHashGrid {
    cell_size: f32,
    inv_cell_size: f32,
    table_size: usize,
    /// Count array (reused): cell_count[hash] = number of particles in cell
    cell_count: Vec<u32>,
    /// Prefix sum: cell_start[hash] = index where particles for this cell begin in sorted_indices
    cell_start: Vec<u32>,
    /// Particle indices sorted by cell hash
    sorted_indices: Vec<u32>,
    /// Cell hash per particle (used during build)
    particle_hashes: Vec<u32>,
    /// Adjacency table from `query_all`: neighbours of particle i are
    /// adj_ids[first_adj[i]..first_adj[i + 1]]
    first_adj: Vec<u32>,
    adj_ids: Vec<u32>,
    /// Buckets to scan for the current query particle
    buckets: Vec<usize>,
    /// bucket_mark[h] == mark when bucket h is already in `buckets`
    bucket_mark: Vec<u32>,
    mark: u32,
}

impl SpatialHashGrid {
    /// Create grid with given cell size and hash table size.
    /// For self collision the cell size is the collision thickness and the
    /// table holds twice the particle count.
    pub fn new(cell_size: f32, table_size: usize) -> Self {
        let table_size = table_size.max(1);
        Self {
            cell_size,
            inv_cell_size: 1.0 / cell_size,
            table_size,
            cell_count: vec![0u32; table_size],
            cell_start: vec![0u32; table_size],
            sorted_indices: Vec::new(),
            particle_hashes: Vec::new(),
            first_adj: Vec::new(),
            adj_ids: Vec::new(),
            buckets: Vec::new(),
            bucket_mark: vec![0u32; table_size],
            mark: 0,
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Build the grid from current positions.
    /// O(N) using counting sort.
    pub fn build(&mut self, positions: &[Vec3]) {
        let count = positions.len();
        self.sorted_indices.resize(count, 0);
        self.particle_hashes.resize(count, 0);

        // 1. Clear cell_count
        self.cell_count.fill(0);

        // 2. For each particle, compute cell hash, store it, and increment count
        for (i, &p) in positions.iter().enumerate() {
            let (cx, cy, cz) = self.cell_coords(p);
            let h = self.hash_cell(cx, cy, cz);
            self.particle_hashes[i] = h as u32;
            self.cell_count[h] += 1;
        }

        // 3. Prefix sum on cell_count -> cell_start
        self.cell_start[0] = 0;
        for k in 1..self.table_size {
            self.cell_start[k] = self.cell_start[k - 1] + self.cell_count[k - 1];
        }

        // 4. Reset cell_count to 0 (reuse for scatter offsets)
        self.cell_count.fill(0);

        // 5. Scatter particles into sorted_indices
        for i in 0..count {
            let h = self.particle_hashes[i] as usize;
            let idx = self.cell_start[h] + self.cell_count[h];
            self.sorted_indices[idx as usize] = i as u32;
            self.cell_count[h] += 1;
        }

        // Adjacency from a previous frame is stale now.
        self.first_adj.clear();
        self.adj_ids.clear();
    }

    /// For every particle, collect the other particles within `max_dist`
    /// into the adjacency table read by [`adjacent`](Self::adjacent).
    ///
    /// Must follow `build` on the same positions.
    pub fn query_all(&mut self, positions: &[Vec3], max_dist: f32) {
        let max_dist2 = max_dist * max_dist;
        self.first_adj.clear();
        self.adj_ids.clear();
        self.first_adj.reserve(positions.len() + 1);

        for (i, &p) in positions.iter().enumerate() {
            self.first_adj.push(self.adj_ids.len() as u32);

            let lo = self.cell_coords(p - Vec3::splat(max_dist));
            let hi = self.cell_coords(p + Vec3::splat(max_dist));
            self.collect_buckets(lo, hi);

            for &h in &self.buckets {
                let start = self.cell_start[h] as usize;
                let end = start + self.cell_count[h] as usize;
                for &j in &self.sorted_indices[start..end] {
                    if j as usize == i {
                        continue;
                    }
                    if p.distance_squared(positions[j as usize]) <= max_dist2 {
                        self.adj_ids.push(j);
                    }
                }
            }
        }
        self.first_adj.push(self.adj_ids.len() as u32);
    }

    /// Particles found near `id` by the last `query_all`. Empty if no query
    /// ran since the last build.
    pub fn adjacent(&self, id: usize) -> &[u32] {
        if id + 1 >= self.first_adj.len() {
            return &[];
        }
        let start = self.first_adj[id] as usize;
        let end = self.first_adj[id + 1] as usize;
        &self.adj_ids[start..end]
    }

    /// Fill `buckets` with the distinct table buckets covering cells `lo..=hi`.
    /// A box with at least as many cells as the table covers every bucket.
    fn collect_buckets(&mut self, lo: (i32, i32, i32), hi: (i32, i32, i32)) {
        self.buckets.clear();
        let span = |a: i32, b: i32| (b as i64 - a as i64 + 1).max(0) as u64;
        let cells = span(lo.0, hi.0)
            .saturating_mul(span(lo.1, hi.1))
            .saturating_mul(span(lo.2, hi.2));
        if cells >= self.table_size as u64 {
            self.buckets.extend(0..self.table_size);
            return;
        }

        self.mark = self.mark.wrapping_add(1);
        if self.mark == 0 {
            self.bucket_mark.fill(0);
            self.mark = 1;
        }
        for cx in lo.0..=hi.0 {
            for cy in lo.1..=hi.1 {
                for cz in lo.2..=hi.2 {
                    let h = self.hash_cell(cx, cy, cz);
                    if self.bucket_mark[h] != self.mark {
                        self.bucket_mark[h] = self.mark;
                        self.buckets.push(h);
                    }
                }
            }
        }
    }

    /// Hash function: cell coords -> table index
    #[inline]
    fn hash_cell(&self, cx: i32, cy: i32, cz: i32) -> usize {
        let h = (cx as u32)
            .wrapping_mul(73856093)
            ^ (cy as u32).wrapping_mul(19349663)
            ^ (cz as u32).wrapping_mul(83492791);
        (h as usize) % self.table_size
    }

    /// Convert world position to cell coordinates
    #[inline]
    fn cell_coords(&self, pos: Vec3) -> (i32, i32, i32) {
        (
            (pos.x * self.inv_cell_size).floor() as i32,
            (pos.y * self.inv_cell_size).floor() as i32,
            (pos.z * self.inv_cell_size).floor() as i32,
        )
    }
}
