//! Summary statistics for per-move figures of a game.
//!
//! Game summaries report centipawn-loss distributions per side. This crate holds the
//! small numeric toolkit they are built from:
//!
//! - [`descriptive`]: min / max / mean / median / spread of a sample
//! - [`percentiles`]: nearest-rank percentiles, precomputed for a fixed set of points
//!
//! # Examples
//!
//! ```
//! use kibitz_stats::{descriptive::DescriptiveStats, percentiles::Percentiles};
//!
//! let losses = [0.0, 12.0, 35.0, 4.0, 310.0];
//! let stats = DescriptiveStats::new(losses).unwrap();
//! assert_eq!(stats.max, 310.0);
//! assert_eq!(stats.median, 12.0);
//!
//! let percentiles = Percentiles::new(&losses, &[50.0, 90.0]);
//! assert_eq!(percentiles.get(90.0), Some(310.0));
//! ```

pub mod descriptive;
pub mod percentiles;
