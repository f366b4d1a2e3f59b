//! Rolling caches for the slice-order sweep
//!
//! Both caches are sized by the X-Y slice area, so peak auxiliary memory is
//! independent of volume depth: the voxel cache rings over four consecutive
//! Z-slices of samples and the vertex cache rings over two Z-layers of
//! emitted vertex indices.

use isomesh_core::Vector3f;

/// Sentinel marking an unoccupied vertex-cache slot.
pub(crate) const INVALID_INDEX: u32 = u32::MAX;

/// Ring buffer holding four consecutive Z-slices of scalar samples.
pub(crate) struct VoxelCache {
    width: usize,
    height: usize,
    slice_len: usize,
    voxels: Vec<f32>,
}

impl VoxelCache {
    pub fn new(width: u32, height: u32) -> Self {
        let width = width as usize;
        let height = height as usize;
        let slice_len = width * height;
        Self {
            width,
            height,
            slice_len,
            voxels: vec![0.0; slice_len * 4],
        }
    }

    /// Sample every voxel of Z-slice `z` into the ring, replacing slice
    /// `z - 4`.
    pub fn fill_slice<S>(&mut self, z: u32, sample: &S)
    where
        S: Fn(u32, u32, u32) -> f32,
    {
        let base = (z % 4) as usize * self.slice_len;
        let slice = &mut self.voxels[base..base + self.slice_len];
        let mut i = 0;
        for y in 0..self.height as u32 {
            for x in 0..self.width as u32 {
                slice[i] = sample(x, y, z);
                i += 1;
            }
        }
    }

    /// Fetch a cached sample. `z` must lie within the four-slice window.
    pub fn get(&self, x: u32, y: u32, z: u32) -> f32 {
        let index = x as usize + self.width * (y as usize + self.height * (z % 4) as usize);
        self.voxels[index]
    }

    /// Central-difference field gradient at a lattice point, one-sided at
    /// the grid boundary. Points from high field values toward low, so the
    /// normalized gradient faces outward when the interior is the
    /// below-isolevel region.
    pub fn gradient(&self, x: u32, y: u32, z: u32, max: [u32; 3]) -> Vector3f {
        Vector3f::new(
            self.get(x.max(1) - 1, y, z) - self.get((x + 1).min(max[0]), y, z),
            self.get(x, y.max(1) - 1, z) - self.get(x, (y + 1).min(max[1]), z),
            self.get(x, y, z.max(1) - 1) - self.get(x, y, (z + 1).min(max[2])),
        )
    }
}

/// Ring buffer mapping lattice vertices of the last two Z-layers to the mesh
/// vertices created on their owning edges.
///
/// Every lattice vertex owns the three edges leaving it toward +X, +Y, and
/// +Z, so a slot is addressed by the flat lattice index modulo two slice
/// areas, times three, plus the edge direction. Stale entries from expired
/// layers are not cleared here; the polygonizer filters them by comparing
/// the referenced vertex's Z against the sweep front.
pub(crate) struct VertexCache {
    capacity: usize,
    indices: Vec<u32>,
}

impl VertexCache {
    pub fn new(width: u32, height: u32) -> Self {
        let capacity = width as usize * height as usize * 2;
        Self {
            capacity,
            indices: vec![INVALID_INDEX; capacity * 3],
        }
    }

    fn slot(&self, lattice_index: usize, direction: u32) -> usize {
        (lattice_index % self.capacity) * 3 + direction as usize
    }

    pub fn get(&self, lattice_index: usize, direction: u32) -> u32 {
        self.indices[self.slot(lattice_index, direction)]
    }

    pub fn insert(&mut self, lattice_index: usize, direction: u32, index: u32) {
        let slot = self.slot(lattice_index, direction);
        self.indices[slot] = index;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voxel_cache_ring_addressing() {
        let mut cache = VoxelCache::new(3, 2);
        let sample = |x: u32, y: u32, z: u32| (x + 10 * y + 100 * z) as f32;

        for z in 0..4 {
            cache.fill_slice(z, &sample);
        }
        assert_eq!(cache.get(2, 1, 3), 312.0);

        // Slice 4 replaces slice 0 in the ring.
        cache.fill_slice(4, &sample);
        assert_eq!(cache.get(1, 0, 4), 401.0);
        assert_eq!(cache.get(2, 1, 1), 112.0);
    }

    #[test]
    fn test_gradient_central_difference() {
        let mut cache = VoxelCache::new(4, 4);
        let sample = |x: u32, _y: u32, _z: u32| (x * x) as f32;
        for z in 0..4 {
            cache.fill_slice(z, &sample);
        }

        // Interior: sigma(x-1) - sigma(x+1) = -4x.
        let g = cache.gradient(2, 1, 1, [3, 3, 3]);
        assert_eq!(g, Vector3f::new(-8.0, 0.0, 0.0));

        // Boundary: one-sided differences clamp to the grid.
        let g = cache.gradient(0, 0, 0, [3, 3, 3]);
        assert_eq!(g, Vector3f::new(-1.0, 0.0, 0.0));
        let g = cache.gradient(3, 3, 3, [3, 3, 3]);
        assert_eq!(g, Vector3f::new(-5.0, 0.0, 0.0));
    }

    #[test]
    fn test_vertex_cache_ring_reuse() {
        let mut cache = VertexCache::new(4, 4);
        assert_eq!(cache.get(5, 1), INVALID_INDEX);

        cache.insert(5, 1, 42);
        assert_eq!(cache.get(5, 1), 42);
        assert_eq!(cache.get(5, 0), INVALID_INDEX);

        // Two slice areas later the same slot is reached again.
        assert_eq!(cache.get(5 + 32, 1), 42);
    }
}
