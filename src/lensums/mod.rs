use crate::{
    lensum::{Lensum, LensumError},
    ShearStyle,
};
use std::{
    io::{BufRead, Write},
    ops::Deref,
};

mod loader;
pub use loader::LensumsLoader;

#[derive(thiserror::Error, Debug)]
pub enum LensumsError {
    #[error("failed to allocate {0} lensums")]
    Allocation(usize),
    #[error("the lensums collection is empty")]
    Empty,
    #[error("lensum #{index} is out of range, the collection has {size} elements")]
    IndexOutOfRange { index: usize, size: usize },
    #[error("lensum failure")]
    Lensum(#[from] LensumError),
    /// Opening a lensums file; failures while reading its records come as
    /// [LensumsError::Lensum]
    #[error("failed to open the lensums file")]
    Io(#[from] std::io::Error),
}
pub type Result<T> = std::result::Result<T, LensumsError>;

/// Mutable view on one lensum of a [Lensums]
///
/// The sums can be changed, the number of bins and the shear style cannot:
/// ```compile_fail
/// use lensum::{Lensum, Lensums, ShearStyle};
///
/// let mut lensums = Lensums::new(2, 3, ShearStyle::Reduced).unwrap();
/// *lensums.get_mut(1).unwrap() = Lensum::new(5, ShearStyle::Lensfit).unwrap();
/// ```
pub struct LensumMut<'a>(&'a mut Lensum);
impl Deref for LensumMut<'_> {
    type Target = Lensum;

    fn deref(&self) -> &Self::Target {
        self.0
    }
}
impl LensumMut<'_> {
    pub fn zindex_mut(&mut self) -> &mut i64 {
        &mut self.0.zindex
    }
    pub fn weight_mut(&mut self) -> &mut f64 {
        &mut self.0.weight
    }
    pub fn totpairs_mut(&mut self) -> &mut i64 {
        &mut self.0.totpairs
    }
    pub fn npair_mut(&mut self) -> &mut [i64] {
        self.0.npair_mut()
    }
    pub fn rsum_mut(&mut self) -> &mut [f64] {
        self.0.rsum_mut()
    }
    pub fn wsum_mut(&mut self) -> &mut [f64] {
        self.0.wsum_mut()
    }
    pub fn dsum_mut(&mut self) -> &mut [f64] {
        self.0.dsum_mut()
    }
    pub fn osum_mut(&mut self) -> &mut [f64] {
        self.0.osum_mut()
    }
    pub fn dsensum_mut(&mut self) -> Option<&mut [f64]> {
        self.0.dsensum_mut()
    }
    pub fn osensum_mut(&mut self) -> Option<&mut [f64]> {
        self.0.osensum_mut()
    }
    /// Adds `src` into the lensum, see [Lensum::add]
    pub fn add(&mut self, src: &Lensum) -> std::result::Result<(), LensumError> {
        self.0.add(src)
    }
    pub fn clear(&mut self) {
        self.0.clear()
    }
}

/// Lensums of a run over many lenses
///
/// All the lensums share the same number of bins and shear style.
#[derive(Debug, Clone, PartialEq)]
pub struct Lensums {
    nbin: usize,
    shear_style: ShearStyle,
    data: Vec<Lensum>,
}
impl Deref for Lensums {
    type Target = [Lensum];

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}
impl Lensums {
    /// Creates `nlens` zeroed lensums indexed from 0 to `nlens-1`
    pub fn new(nlens: usize, nbin: usize, shear_style: ShearStyle) -> Result<Self> {
        log::info!("Creating lensums: nlens: {}  nbin: {}", nlens, nbin);
        let mut data = Vec::new();
        data.try_reserve_exact(nlens)
            .map_err(|_| LensumsError::Allocation(nlens))?;
        for index in 0..nlens {
            data.push(Lensum::new(nbin, shear_style)?.with_index(index as i64));
        }
        Ok(Self {
            nbin,
            shear_style,
            data,
        })
    }
    /// Reads lensums records until the end of `stream`
    ///
    /// The lensum indices are the ones found in the records.
    pub fn read_all<R: BufRead>(
        stream: &mut R,
        nbin: usize,
        shear_style: ShearStyle,
    ) -> Result<Self> {
        let mut data = vec![];
        let mut lensum = Lensum::new(nbin, shear_style)?;
        while lensum.read(stream)? {
            data.push(lensum.clone());
        }
        Ok(Self {
            nbin,
            shear_style,
            data,
        })
    }
    /// Number of radial bins of every lensum
    pub fn nbin(&self) -> usize {
        self.nbin
    }
    pub fn shear_style(&self) -> ShearStyle {
        self.shear_style
    }
    /// Mutable access to one lensum for filling its bins
    pub fn get_mut(&mut self, index: usize) -> Option<LensumMut<'_>> {
        self.data.get_mut(index).map(LensumMut)
    }
    pub fn iter_mut(&mut self) -> impl Iterator<Item = LensumMut<'_>> {
        self.data.iter_mut().map(LensumMut)
    }
    /// Writes all the lensums in index order
    pub fn write_all<W: Write>(&self, stream: &mut W) -> Result<()> {
        for lensum in &self.data {
            lensum.write(stream)?;
        }
        Ok(())
    }
    /// Sums all the lensums into a new one
    ///
    /// The lensums are added one after the other in index order, without any
    /// compensated summation.
    pub fn sum(&self) -> Result<Lensum> {
        if self.data.is_empty() {
            return Err(LensumsError::Empty);
        }
        let mut total = Lensum::new(self.nbin, self.shear_style)?;
        for lensum in &self.data {
            total.add(lensum)?;
        }
        Ok(total)
    }
    /// Logs the sum of all the lensums
    pub fn print_sum(&self) -> Result<()> {
        self.sum()?.print();
        Ok(())
    }
    /// Logs the lensum at `index`
    pub fn print_one(&self, index: usize) -> Result<()> {
        let lensum = self
            .data
            .get(index)
            .ok_or(LensumsError::IndexOutOfRange {
                index,
                size: self.data.len(),
            })?;
        log::info!("element {} of lensums:", index);
        lensum.print();
        Ok(())
    }
    /// Logs the first and the last lensums
    pub fn print_first_last(&self) -> Result<()> {
        if self.data.is_empty() {
            return Err(LensumsError::Empty);
        }
        self.print_one(0)?;
        self.print_one(self.data.len() - 1)
    }
    /// Drops the lensums held in `lensums`, if any
    pub fn destroy(lensums: &mut Option<Lensums>) {
        if let Some(lensums) = lensums.take() {
            log::trace!("dropping {} lensums", lensums.len());
        }
    }
}
