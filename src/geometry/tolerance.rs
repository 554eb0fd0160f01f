// Centralized tolerances and defaults for robust geometry

pub const EPS_POS: f64 = 1e-9;            // vertex coincidence threshold (CRS units)
pub const EPS_DENOM: f64 = 1e-15;         // denominator guard for segment intersection
pub const EPS_AREA: f64 = 1e-12;          // rings at or below this area are degenerate

// Default ring simplification tolerance (CRS units)
pub const DEFAULT_SIMPLIFY_TOLERANCE: f64 = 0.1;

// Default east/west bucket boundaries (CRS units along x)
pub const DEFAULT_LOW_THRESHOLD: f64 = -30.0;
pub const DEFAULT_HIGH_THRESHOLD: f64 = 30.0;

#[inline] pub fn approx_eq(a: f64, b: f64, eps: f64) -> bool { (a - b).abs() <= eps }
