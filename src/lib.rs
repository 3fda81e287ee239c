//! Weak lensing binned pair statistics
//!
//! A [Lensum] accumulates, for one lens, the pair counts and the shear sums
//! in radial bins; [Lensums] holds the lensums of a run over many lenses.
//! Both are written to and read from a whitespace-separated text format,
//! one lensum per line.
//!
//! ```
//! use lensum::{Lensums, ShearStyle};
//!
//! let mut lensums = Lensums::new(2, 3, ShearStyle::Reduced)?;
//! lensums.iter_mut().for_each(|mut lensum| lensum.npair_mut()[0] = 5);
//! let total = lensums.sum()?;
//! assert_eq!(total.npair(), &[10, 0, 0]);
//! # Ok::<(), lensum::Error>(())
//! ```

pub mod error;
pub mod lensum;
pub mod lensums;
mod profile;
pub mod shear;

pub use error::Error;
pub use lensum::{Lensum, LensumError};
pub use lensums::{LensumMut, Lensums, LensumsError, LensumsLoader};
pub use shear::ShearStyle;
