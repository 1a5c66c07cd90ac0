// Unbounded uniform grid for broadphase collision detection.
//
// Chunks are square cells of edge `chunk_dimension`, addressed by integer
// chunk coordinates and stored sparsely in a hash map. Bodies larger than a
// chunk are registered in every chunk their extent touches.

use rustc_hash::FxHashMap;

use crate::math::vec2::Vec2;
use crate::objects::rigid_body::{BodyId, RigidBody};
use crate::shapes::Shape;

/// Packed `(cx, cy)` chunk coordinates: `cx` in the high 32 bits, `cy` in
/// the low 32 bits.
pub type ChunkKey = i64;

/// Packs two chunk coordinates into one key. Bijective over all `i32` pairs.
#[inline]
pub fn chunk_key(cx: i32, cy: i32) -> ChunkKey {
    ((cx as i64) << 32) | (cy as u32 as i64)
}

/// Inverse of [`chunk_key`].
#[inline]
pub fn unpack_chunk_key(key: ChunkKey) -> (i32, i32) {
    ((key >> 32) as i32, key as i32)
}

/// Chunk coordinate containing world coordinate `value`.
#[inline]
pub fn chunk_coord(value: f64, chunk_dimension: f64) -> i32 {
    (value / chunk_dimension).floor() as i32
}

/// Inclusive range of chunk coordinates occupied by a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkExtent {
    pub min_cx: i32,
    pub max_cx: i32,
    pub min_cy: i32,
    pub max_cy: i32,
}

impl ChunkExtent {
    pub fn contains(&self, cx: i32, cy: i32) -> bool {
        (self.min_cx..=self.max_cx).contains(&cx) && (self.min_cy..=self.max_cy).contains(&cy)
    }

    pub fn chunk_count(&self) -> usize {
        let cols = (self.max_cx as i64 - self.min_cx as i64 + 1).max(0);
        let rows = (self.max_cy as i64 - self.min_cy as i64 + 1).max(0);
        (cols * rows) as usize
    }

    /// Iterates every `(cx, cy)` in the extent, column by column.
    pub fn iter(&self) -> impl Iterator<Item = (i32, i32)> {
        let ChunkExtent {
            min_cx,
            max_cx,
            min_cy,
            max_cy,
        } = *self;
        (min_cx..=max_cx).flat_map(move |cx| (min_cy..=max_cy).map(move |cy| (cx, cy)))
    }
}

/// Chunk range touched by a shape centered at `position`.
///
/// Circles use their exact bounding square. Rects use their bounding box and,
/// when `pad_rect` is set, one extra chunk on every side so that fast bodies
/// near large obstacles still find them.
pub fn chunk_extent(shape: &Shape, position: Vec2, chunk_dimension: f64, pad_rect: bool) -> ChunkExtent {
    let half = shape.half_extents();
    let pad = match shape {
        Shape::Rect(_) if pad_rect => 1,
        _ => 0,
    };
    ChunkExtent {
        min_cx: chunk_coord(position.x - half.x, chunk_dimension).saturating_sub(pad),
        max_cx: chunk_coord(position.x + half.x, chunk_dimension).saturating_add(pad),
        min_cy: chunk_coord(position.y - half.y, chunk_dimension).saturating_sub(pad),
        max_cy: chunk_coord(position.y + half.y, chunk_dimension).saturating_add(pad),
    }
}

/// A single grid cell: the bodies currently overlapping it.
#[derive(Debug, Default, Clone)]
struct Chunk {
    bodies: Vec<BodyId>,
}

impl Chunk {
    fn insert(&mut self, id: BodyId) {
        if !self.bodies.contains(&id) {
            self.bodies.push(id);
        }
    }

    fn remove(&mut self, id: BodyId) {
        if let Some(pos) = self.bodies.iter().position(|&b| b == id) {
            self.bodies.swap_remove(pos);
        }
    }
}

/// Sparse uniform grid mapping chunk keys to the bodies inside them.
#[derive(Debug)]
pub struct SpatialGrid {
    chunk_dimension: f64,
    pad_rect_extent: bool,
    chunks: FxHashMap<ChunkKey, Chunk>,
}

impl SpatialGrid {
    /// Creates an empty grid.
    ///
    /// # Arguments
    /// * `chunk_dimension` - Edge length of one square chunk, must be positive.
    /// * `pad_rect_extent` - Whether rect extents get a one-chunk margin.
    pub fn new(chunk_dimension: f64, pad_rect_extent: bool) -> Self {
        debug_assert!(chunk_dimension > 0.0, "Chunk dimension must be positive");
        SpatialGrid {
            chunk_dimension,
            pad_rect_extent,
            chunks: FxHashMap::default(),
        }
    }

    pub fn chunk_dimension(&self) -> f64 {
        self.chunk_dimension
    }

    /// Chunk range the body would occupy at its current position.
    pub fn extent_for(&self, body: &RigidBody) -> ChunkExtent {
        chunk_extent(&body.shape, body.position, self.chunk_dimension, self.pad_rect_extent)
    }

    /// Brings the body's grid registration in line with its position.
    ///
    /// Does nothing if the occupied range is unchanged. Otherwise removes the
    /// body from every chunk in its stored range, inserts it into every chunk
    /// of the new range and stores the new range on the body.
    /// Returns `true` if the registration changed.
    pub fn update_membership(&mut self, body: &mut RigidBody) -> bool {
        let extent = self.extent_for(body);
        if body.chunk_extent == Some(extent) {
            return false;
        }
        if let Some(old) = body.chunk_extent {
            self.remove_from(body.id, old);
        }
        for (cx, cy) in extent.iter() {
            self.chunks.entry(chunk_key(cx, cy)).or_default().insert(body.id);
        }
        body.chunk_extent = Some(extent);
        true
    }

    /// Drops the body from every chunk it is registered in.
    pub fn remove(&mut self, body: &mut RigidBody) {
        if let Some(old) = body.chunk_extent.take() {
            self.remove_from(body.id, old);
        }
    }

    fn remove_from(&mut self, id: BodyId, extent: ChunkExtent) {
        for (cx, cy) in extent.iter() {
            if let Some(chunk) = self.chunks.get_mut(&chunk_key(cx, cy)) {
                chunk.remove(id);
            }
        }
    }

    /// Bodies registered in chunk `(cx, cy)`. A chunk never created is empty.
    pub fn bodies_in(&self, cx: i32, cy: i32) -> &[BodyId] {
        self.chunks
            .get(&chunk_key(cx, cy))
            .map(|chunk| chunk.bodies.as_slice())
            .unwrap_or(&[])
    }

    /// Non-empty chunks as `(cx, cy, body_count)`, for debug overlays.
    pub fn occupied_chunks(&self) -> impl Iterator<Item = (i32, i32, usize)> + '_ {
        self.chunks.iter().filter(|(_, chunk)| !chunk.bodies.is_empty()).map(|(&key, chunk)| {
            let (cx, cy) = unpack_chunk_key(key);
            (cx, cy, chunk.bodies.len())
        })
    }

    /// Number of chunks ever created, including empty ones.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }
}
