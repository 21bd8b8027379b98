use std::fmt::Display;

use lazy_static::lazy_static;

lazy_static! {
  pub static ref DEFAULT_PARAMS: Params = Params {
    // Polygons need more than 1% of their area inside a sector to count
    min_intersect_ratio: 0.01,

    // Length of the ranked span list
    top_n: 20,

    // Default to system physical cores (to prevent interference from hyperthreading)
    n_threads: num_cpus::get_physical(),
    // Smaller batches stay on the calling thread
    parallel_threshold: 64,
  };
}

/// Span analysis parameters.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Params {
    /// Area fraction a polygon must exceed (strictly) inside a sector to match
    pub min_intersect_ratio: f64,

    /// Number of entries kept in the ranked list
    pub top_n: usize,

    /// Number of worker threads available
    pub n_threads: usize,
    /// Minimum number of entities before work is spread over threads
    pub parallel_threshold: usize,
}

impl Default for Params {
    fn default() -> Params {
        *DEFAULT_PARAMS
    }
}

impl Display for Params {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "===== Span Analysis Parameters =====")?;
        writeln!(
            f,
            "\t - min_intersect_ratio (polygon area fraction): {}",
            self.min_intersect_ratio
        )?;
        writeln!(f, "\t - top_n (ranked list length): {}", self.top_n)?;
        writeln!(f, "\t - n_threads (n threads to use): {}", self.n_threads)?;
        write!(
            f,
            "\t - parallel_threshold (min entities for workers): {}",
            self.parallel_threshold
        )
    }
}
