use crate::lensum::{Lensum, Result};
use serde::Serialize;
use std::io::Write;

/// One radial bin of a lensum profile
#[derive(Serialize, Debug, PartialEq)]
struct Bin {
    bin: usize,
    npair: i64,
    meanr: f64,
    wsum: f64,
    dsum: f64,
    osum: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    dsensum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    osensum: Option<f64>,
}

impl Lensum {
    fn profile(&self) -> Vec<Bin> {
        self.mean_radius()
            .into_iter()
            .enumerate()
            .map(|(i, meanr)| Bin {
                bin: i,
                npair: self.npair()[i],
                meanr,
                wsum: self.wsum()[i],
                dsum: self.dsum()[i],
                osum: self.osum()[i],
                dsensum: self.dsensum().map(|s| s[i]),
                osensum: self.osensum().map(|s| s[i]),
            })
            .collect()
    }
    /// Writes the radial profile as CSV, one row per bin
    pub fn to_csv<W: Write>(&self, stream: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(stream);
        for bin in self.profile() {
            wtr.serialize(bin)?;
        }
        wtr.flush()?;
        Ok(())
    }
}
