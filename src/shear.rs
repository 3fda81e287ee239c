use strum_macros::{Display, EnumIter, EnumString};

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ShearStyleError {
    #[error("unknown shear style code: {0} (expected 1 for reduced or 2 for lensfit)")]
    Code(i64),
}

/// Shear accumulation mode
///
/// `Lensfit` records carry the per-bin sensitivity sums (`dsensum`, `osensum`)
/// that `Reduced` records do not have.
#[derive(EnumIter, EnumString, Display, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ShearStyle {
    Reduced,
    Lensfit,
}
impl ShearStyle {
    /// Number of per-bin arrays written for each record
    pub fn nsum_arrays(&self) -> usize {
        match self {
            ShearStyle::Reduced => 5,
            ShearStyle::Lensfit => 7,
        }
    }
    /// Number of tokens in one text record with `nbin` bins
    pub fn ntokens(&self, nbin: usize) -> usize {
        4 + self.nsum_arrays() * nbin
    }
    /// Numeric code used by the pair-counting configuration files
    pub fn code(&self) -> i64 {
        match self {
            ShearStyle::Reduced => 1,
            ShearStyle::Lensfit => 2,
        }
    }
}
impl TryFrom<i64> for ShearStyle {
    type Error = ShearStyleError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(ShearStyle::Reduced),
            2 => Ok(ShearStyle::Lensfit),
            _ => Err(ShearStyleError::Code(code)),
        }
    }
}
