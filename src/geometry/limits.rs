// Centralized ingestion limits to harden against untrusted layer documents

// Layer size caps
pub const MAX_FEATURES: usize = 100_000;
pub const MAX_RINGS_PER_FEATURE: usize = 10_000;

// Vertices
pub const MAX_VERTICES_PER_FEATURE: usize = 2_000_000;
pub const MAX_VERTICES_TOTAL: usize = 50_000_000;

// Identifiers and names
pub const MAX_ID_LEN: usize = 1_024;

// Numeric bounds
pub const COORD_MIN: f64 = -1.0e9;
pub const COORD_MAX: f64 =  1.0e9;

#[inline]
pub fn in_coord_bounds(x: f64) -> bool { x.is_finite() && x >= COORD_MIN && x <= COORD_MAX }

// Rings above this many segments are scanned for self-intersections through
// a segment R-tree instead of pair by pair
pub const MAX_SCAN_SEGMENTS: usize = 4_096;
