//! Move-quality evaluation for analysed games.
//!
//! This crate turns raw engine scores into the per-move verdicts the rest of the
//! pipeline builds on:
//!
//! 1. **Normalization** ([`evaluation`]) - canonicalizes a `{cp?, mate?}` engine score
//!    into one signed centipawn-equivalent number.
//! 2. **Classification** ([`classification`]) - converts a before/after evaluation pair
//!    into a centipawn loss and a discrete [`Classification`](classification::Classification),
//!    with a rating-dependent threshold table and a position-status-aware downgrade.
//! 3. **Accuracy** ([`accuracy`]) - aggregates per-move losses into a 0-100 score.
//!
//! # Perspective Convention
//!
//! Engine scores are always reported from the side to move's perspective. For a move
//! played by side `S`, the "before" score is therefore `S`'s view and the "after"
//! score is the opponent's view. Summing the two gives how much ground `S` gave up:
//!
//! ```text
//! cp_loss = max(0, before + after)
//! ```
//!
//! No color-conditional branching is needed anywhere in this crate.
//!
//! # Example
//!
//! ```
//! use kibitz_evaluator::{
//!     classification::{Classification, ClassifyOptions, classify_move},
//!     evaluation::Evaluation,
//! };
//!
//! let options = ClassifyOptions {
//!     rating: 1300,
//!     ..ClassifyOptions::default()
//! };
//! let result = classify_move(Evaluation::cp(200), Evaluation::cp(100), true, &options);
//! assert_eq!(result.cp_loss, 300);
//! assert_eq!(result.classification, Classification::Blunder);
//! ```

pub mod accuracy;
pub mod classification;
pub mod evaluation;
