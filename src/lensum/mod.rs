use crate::ShearStyle;
use itertools::izip;
use std::{fmt, io::Write, ops::AddAssign};

mod format;
pub use format::Real;

#[derive(thiserror::Error, Debug)]
pub enum LensumError {
    #[error("failed to allocate a lensum with {0} bins")]
    Allocation(usize),
    #[error("cannot add a lensum with {src} bins into a lensum with {dest} bins")]
    SizeMismatch { dest: usize, src: usize },
    #[error("cannot add a {src} lensum into a {dest} lensum")]
    ShearStyleMismatch { dest: ShearStyle, src: ShearStyle },
    #[error("expected {expected} fields in lensum record, found {found}")]
    Format { expected: usize, found: usize },
    #[error("failed to parse field #{position} ({token:?}) of lensum record")]
    Parse { position: usize, token: String },
    #[error("lensum I/O failure")]
    Io(#[from] std::io::Error),
    #[error("failed to write the lensum profile")]
    Csv(#[from] csv::Error),
}
pub type Result<T> = std::result::Result<T, LensumError>;

/// Zero filled bin array, failing instead of aborting if memory is short
fn zeroed<T: Clone + Default>(nbin: usize) -> Result<Vec<T>> {
    let mut bins = Vec::new();
    bins.try_reserve_exact(nbin)
        .map_err(|_| LensumError::Allocation(nbin))?;
    bins.resize(nbin, T::default());
    Ok(bins)
}

fn accumulate<T: Copy + AddAssign>(dest: &mut [T], src: &[T]) {
    dest.iter_mut().zip(src).for_each(|(d, s)| *d += *s);
}

/// Lensfit sensitivity sums
#[derive(Debug, Clone, PartialEq)]
pub struct Sensitivity {
    /// tangential shear sensitivity sum
    dsensum: Vec<f64>,
    /// cross shear sensitivity sum
    osensum: Vec<f64>,
}
impl Sensitivity {
    fn new(nbin: usize) -> Result<Self> {
        Ok(Self {
            dsensum: zeroed(nbin)?,
            osensum: zeroed(nbin)?,
        })
    }
}

/// Binned pair statistics of a single lens
///
/// Every bin array has exactly `nbin` elements; the arrays are only reachable
/// through slices so their length is fixed for the lifetime of the record.
/// The shear style is fixed at construction: a [ShearStyle::Lensfit] record
/// carries the [Sensitivity] sums, a [ShearStyle::Reduced] record does not.
#[derive(Debug, Clone, PartialEq)]
pub struct Lensum {
    index: i64,
    /// external identifier (redshift bin, catalog row, ...)
    pub zindex: i64,
    /// sum of the pair weights
    pub weight: f64,
    /// number of pairs over all bins
    pub totpairs: i64,
    npair: Vec<i64>,
    rsum: Vec<f64>,
    wsum: Vec<f64>,
    dsum: Vec<f64>,
    osum: Vec<f64>,
    sensitivity: Option<Sensitivity>,
}
impl Lensum {
    /// Creates a zeroed lensum with `nbin` radial bins
    pub fn new(nbin: usize, shear_style: ShearStyle) -> Result<Self> {
        Ok(Self {
            index: 0,
            zindex: 0,
            weight: 0f64,
            totpairs: 0,
            npair: zeroed(nbin)?,
            rsum: zeroed(nbin)?,
            wsum: zeroed(nbin)?,
            dsum: zeroed(nbin)?,
            osum: zeroed(nbin)?,
            sensitivity: match shear_style {
                ShearStyle::Lensfit => Some(Sensitivity::new(nbin)?),
                ShearStyle::Reduced => None,
            },
        })
    }
    pub(crate) fn with_index(self, index: i64) -> Self {
        Self { index, ..self }
    }
    /// Position of the lensum in its collection
    pub fn index(&self) -> i64 {
        self.index
    }
    /// Number of radial bins
    pub fn nbin(&self) -> usize {
        self.npair.len()
    }
    pub fn shear_style(&self) -> ShearStyle {
        if self.sensitivity.is_some() {
            ShearStyle::Lensfit
        } else {
            ShearStyle::Reduced
        }
    }
    /// Pair counts per bin
    pub fn npair(&self) -> &[i64] {
        &self.npair
    }
    pub fn npair_mut(&mut self) -> &mut [i64] {
        &mut self.npair
    }
    /// Sum of the pair separations per bin
    pub fn rsum(&self) -> &[f64] {
        &self.rsum
    }
    pub fn rsum_mut(&mut self) -> &mut [f64] {
        &mut self.rsum
    }
    /// Weight sum per bin
    pub fn wsum(&self) -> &[f64] {
        &self.wsum
    }
    pub fn wsum_mut(&mut self) -> &mut [f64] {
        &mut self.wsum
    }
    /// Tangential shear weighted sum per bin
    pub fn dsum(&self) -> &[f64] {
        &self.dsum
    }
    pub fn dsum_mut(&mut self) -> &mut [f64] {
        &mut self.dsum
    }
    /// Cross shear weighted sum per bin
    pub fn osum(&self) -> &[f64] {
        &self.osum
    }
    pub fn osum_mut(&mut self) -> &mut [f64] {
        &mut self.osum
    }
    /// Tangential sensitivity sum per bin, `None` unless lensfit
    pub fn dsensum(&self) -> Option<&[f64]> {
        self.sensitivity.as_ref().map(|s| s.dsensum.as_slice())
    }
    pub fn dsensum_mut(&mut self) -> Option<&mut [f64]> {
        self.sensitivity.as_mut().map(|s| s.dsensum.as_mut_slice())
    }
    /// Cross sensitivity sum per bin, `None` unless lensfit
    pub fn osensum(&self) -> Option<&[f64]> {
        self.sensitivity.as_ref().map(|s| s.osensum.as_slice())
    }
    pub fn osensum_mut(&mut self) -> Option<&mut [f64]> {
        self.sensitivity.as_mut().map(|s| s.osensum.as_mut_slice())
    }
    /// Floating point bin arrays in record order
    pub(crate) fn float_sums(&self) -> impl Iterator<Item = &[f64]> + '_ {
        [&self.rsum, &self.wsum, &self.dsum, &self.osum]
            .into_iter()
            .map(|sums| sums.as_slice())
            .chain(
                self.sensitivity
                    .iter()
                    .flat_map(|s| [s.dsensum.as_slice(), s.osensum.as_slice()]),
            )
    }
    /// Mean pair separation per bin
    ///
    /// Empty bins give NaN (or infinity if `rsum` is not zero).
    pub fn mean_radius(&self) -> Vec<f64> {
        self.rsum
            .iter()
            .zip(&self.npair)
            .map(|(r, &n)| r / n as f64)
            .collect()
    }
    /// Adds `src` into `self`
    ///
    /// Both lensums must have the same number of bins and the same shear style,
    /// otherwise `self` is left unchanged and an error is returned.
    pub fn add(&mut self, src: &Lensum) -> Result<()> {
        if self.nbin() != src.nbin() {
            return Err(LensumError::SizeMismatch {
                dest: self.nbin(),
                src: src.nbin(),
            });
        }
        if self.shear_style() != src.shear_style() {
            return Err(LensumError::ShearStyleMismatch {
                dest: self.shear_style(),
                src: src.shear_style(),
            });
        }
        self.weight += src.weight;
        self.totpairs += src.totpairs;
        accumulate(&mut self.npair, &src.npair);
        accumulate(&mut self.rsum, &src.rsum);
        accumulate(&mut self.wsum, &src.wsum);
        accumulate(&mut self.dsum, &src.dsum);
        accumulate(&mut self.osum, &src.osum);
        if let (Some(dest), Some(src)) = (self.sensitivity.as_mut(), src.sensitivity.as_ref()) {
            accumulate(&mut dest.dsensum, &src.dsensum);
            accumulate(&mut dest.osensum, &src.osensum);
        }
        Ok(())
    }
    /// Resets the sums and sets `zindex` to -1
    pub fn clear(&mut self) {
        self.zindex = -1;
        self.weight = 0f64;
        self.totpairs = 0;
        self.npair.fill(0);
        self.rsum.fill(0f64);
        self.wsum.fill(0f64);
        self.dsum.fill(0f64);
        self.osum.fill(0f64);
        if let Some(s) = self.sensitivity.as_mut() {
            s.dsensum.fill(0f64);
            s.osensum.fill(0f64);
        }
    }
    /// Writes the summary table to `stream`
    pub fn print_to<W: Write>(&self, stream: &mut W) -> Result<()> {
        write!(stream, "{}", self)?;
        Ok(())
    }
    /// Logs the summary table
    pub fn print(&self) {
        self.to_string().lines().for_each(|line| log::info!("{}", line));
    }
    /// Drops the lensum held in `lensum`, if any
    pub fn destroy(lensum: &mut Option<Lensum>) {
        if let Some(lensum) = lensum.take() {
            log::trace!("dropping lensum #{}", lensum.index);
        }
    }
}
impl fmt::Display for Lensum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  zindex:   {}", self.zindex)?;
        writeln!(f, "  weight:   {:.6}", self.weight)?;
        writeln!(f, "  totpairs: {}", self.totpairs)?;
        writeln!(f, "  nbin:     {}", self.nbin())?;
        write!(
            f,
            "  bin       npair            meanr           dsum            osum"
        )?;
        if self.sensitivity.is_some() {
            write!(f, "           dsensum        osensum")?;
        }
        writeln!(f)?;
        for (i, npair, meanr, dsum, osum) in izip!(
            0usize..,
            &self.npair,
            self.mean_radius(),
            &self.dsum,
            &self.osum
        ) {
            write!(
                f,
                "  {:3} {:11} {:15.6} {:15.6} {:15.6}",
                i, npair, meanr, dsum, osum
            )?;
            if let Some(s) = &self.sensitivity {
                write!(f, " {:15.6} {:15.6}", s.dsensum[i], s.osensum[i])?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
