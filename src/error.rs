use crate::{lensum::LensumError, lensums::LensumsError, shear::ShearStyleError};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Error in the `lensum` module")]
    Lensum(#[from] LensumError),
    #[error("Error in the `lensums` module")]
    Lensums(#[from] LensumsError),
    #[error("Error in the `shear` module")]
    ShearStyle(#[from] ShearStyleError),
}
