use super::{Lensums, Result};
use crate::ShearStyle;
use flate2::read::GzDecoder;
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
    time::Instant,
};

/// Lensums file loader
///
/// The number of bins and the shear style are not written in the lensums
/// files, they must be given to the loader.
/// Files with a `.gz` extension are decompressed on the fly.
pub struct LensumsLoader {
    path: PathBuf,
    nbin: usize,
    shear_style: ShearStyle,
}
impl LensumsLoader {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            nbin: 0,
            shear_style: ShearStyle::Reduced,
        }
    }
    pub fn nbin(self, nbin: usize) -> Self {
        Self { nbin, ..self }
    }
    pub fn shear_style(self, shear_style: ShearStyle) -> Self {
        Self {
            shear_style,
            ..self
        }
    }
    fn reader(&self) -> Result<Box<dyn BufRead>> {
        let file = File::open(&self.path)?;
        Ok(match self.path.extension() {
            Some(ext) if ext == "gz" => Box::new(BufReader::new(GzDecoder::new(file))),
            _ => Box::new(BufReader::new(file)),
        })
    }
    pub fn load(self) -> Result<Lensums> {
        log::info!("Loading {:?}...", self.path);
        let now = Instant::now();
        let mut reader = self.reader()?;
        let lensums = Lensums::read_all(&mut reader, self.nbin, self.shear_style)?;
        log::info!(
            "... loaded {} lensums in {}ms",
            lensums.len(),
            now.elapsed().as_millis()
        );
        Ok(lensums)
    }
}
