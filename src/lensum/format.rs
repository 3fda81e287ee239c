//! Lensum text records
//!
//! One lensum per line, fields separated by white spaces:
//! `index zindex weight totpairs npair[nbin] rsum[nbin] wsum[nbin] dsum[nbin] osum[nbin]`
//! followed by `dsensum[nbin] osensum[nbin]` for lensfit lensums.
//! The record does not carry the number of bins nor the shear style,
//! they must be known before reading.

use super::{Lensum, LensumError, Result, Sensitivity};
use crate::ShearStyle;
use std::{
    fmt,
    io::{BufRead, Write},
    str::{FromStr, SplitWhitespace},
};

/// Significant digits of the floating point fields
const SIGNIFICANT_DIGITS: usize = 17;

fn trim_zeros(digits: &str) -> &str {
    if digits.contains('.') {
        digits.trim_end_matches('0').trim_end_matches('.')
    } else {
        digits
    }
}

/// Floating point display matching C `%.17g`
///
/// 17 significant digits are enough to read back the exact same `f64`.
#[derive(Debug, Clone, Copy)]
pub struct Real(pub f64);
impl fmt::Display for Real {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let x = self.0;
        if x.is_nan() {
            return f.write_str("nan");
        }
        if x.is_infinite() {
            return f.write_str(if x > 0f64 { "inf" } else { "-inf" });
        }
        if x == 0f64 {
            return f.write_str(if x.is_sign_negative() { "-0" } else { "0" });
        }
        let sci = format!("{:.*e}", SIGNIFICANT_DIGITS - 1, x);
        let (mantissa, exponent) = sci.split_once('e').ok_or(fmt::Error)?;
        let exponent: i32 = exponent.parse().map_err(|_| fmt::Error)?;
        if exponent < -4 || exponent >= SIGNIFICANT_DIGITS as i32 {
            write!(
                f,
                "{}e{}{:02}",
                trim_zeros(mantissa),
                if exponent < 0 { '-' } else { '+' },
                exponent.abs()
            )
        } else {
            let decimals = (SIGNIFICANT_DIGITS as i32 - 1 - exponent) as usize;
            f.write_str(trim_zeros(&format!("{:.*}", decimals, x)))
        }
    }
}

/// Record fields with their position for error reporting
struct Fields<'a> {
    tokens: SplitWhitespace<'a>,
    position: usize,
}
impl<'a> Fields<'a> {
    fn next<T: FromStr>(&mut self) -> Result<T> {
        let token = self.tokens.next().unwrap_or_default();
        let value = token.parse().map_err(|_| LensumError::Parse {
            position: self.position,
            token: token.to_string(),
        })?;
        self.position += 1;
        Ok(value)
    }
    fn bins<T: FromStr>(&mut self, nbin: usize) -> Result<Vec<T>> {
        (0..nbin).map(|_| self.next()).collect()
    }
}

impl Lensum {
    /// Parses one text record into the lensum
    ///
    /// The lensum is left unchanged if the record is malformed.
    pub fn parse_record(&mut self, line: &str) -> Result<()> {
        let nbin = self.nbin();
        let shear_style = self.shear_style();
        let expected = shear_style.ntokens(nbin);
        let found = line.split_whitespace().count();
        if found != expected {
            return Err(LensumError::Format { expected, found });
        }
        let mut fields = Fields {
            tokens: line.split_whitespace(),
            position: 0,
        };
        let index = fields.next()?;
        let zindex = fields.next()?;
        let weight = fields.next()?;
        let totpairs = fields.next()?;
        let npair = fields.bins(nbin)?;
        let rsum = fields.bins(nbin)?;
        let wsum = fields.bins(nbin)?;
        let dsum = fields.bins(nbin)?;
        let osum = fields.bins(nbin)?;
        let sensitivity = match shear_style {
            ShearStyle::Lensfit => Some(Sensitivity {
                dsensum: fields.bins(nbin)?,
                osensum: fields.bins(nbin)?,
            }),
            ShearStyle::Reduced => None,
        };
        *self = Lensum {
            index,
            zindex,
            weight,
            totpairs,
            npair,
            rsum,
            wsum,
            dsum,
            osum,
            sensitivity,
        };
        Ok(())
    }
    /// Reads the next record from `stream` into the lensum
    ///
    /// Blank lines are skipped. Returns `false` once the end of the stream is
    /// reached without reading anything.
    pub fn read<R: BufRead>(&mut self, stream: &mut R) -> Result<bool> {
        let mut line = String::new();
        loop {
            line.clear();
            if stream.read_line(&mut line)? == 0 {
                return Ok(false);
            }
            if !line.trim().is_empty() {
                break;
            }
        }
        self.parse_record(&line)?;
        Ok(true)
    }
    /// Writes the lensum as a single text record
    pub fn write<W: Write>(&self, stream: &mut W) -> Result<()> {
        write!(
            stream,
            "{} {} {} {}",
            self.index,
            self.zindex,
            Real(self.weight),
            self.totpairs
        )?;
        for npair in &self.npair {
            write!(stream, " {}", npair)?;
        }
        for sum in self.float_sums().flatten() {
            write!(stream, " {}", Real(*sum))?;
        }
        writeln!(stream)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{thread_rng, Rng};
    use std::io::Cursor;

    fn random(nbin: usize, shear_style: ShearStyle) -> Lensum {
        let mut rng = thread_rng();
        let mut lensum = Lensum::new(nbin, shear_style)
            .unwrap()
            .with_index(rng.gen_range(0..1_000_000));
        lensum.zindex = rng.gen_range(-1..1_000_000);
        lensum.weight = rng.gen::<f64>() * 1e6;
        lensum.totpairs = rng.gen_range(0..i64::MAX / 2);
        lensum
            .npair_mut()
            .iter_mut()
            .for_each(|n| *n = rng.gen_range(0..1_000_000_000));
        let sums: Vec<f64> = (0..7 * nbin)
            .map(|_| rng.gen_range(-1e3..1e3) * 10f64.powi(rng.gen_range(-12..12)))
            .collect();
        let mut sums = sums.chunks(nbin);
        let mut fill = |bins: &mut [f64]| bins.copy_from_slice(sums.next().unwrap());
        fill(lensum.rsum_mut());
        fill(lensum.wsum_mut());
        fill(lensum.dsum_mut());
        fill(lensum.osum_mut());
        if let Some(bins) = lensum.dsensum_mut() {
            fill(bins);
        }
        if let Some(bins) = lensum.osensum_mut() {
            fill(bins);
        }
        lensum
    }

    #[test]
    fn real_like_printf() {
        assert_eq!(Real(0.).to_string(), "0");
        assert_eq!(Real(15.).to_string(), "15");
        assert_eq!(Real(-2.5).to_string(), "-2.5");
        assert_eq!(Real(0.1).to_string(), "0.10000000000000001");
        assert_eq!(Real(1e20).to_string(), "1e+20");
        assert_eq!(Real(9.5367431640625e-7).to_string(), "9.5367431640625e-07");
        assert_eq!(Real(4.8828125e-4).to_string(), "0.00048828125");
        assert_eq!(Real(123456.).to_string(), "123456");
        assert_eq!(Real(f64::NAN).to_string(), "nan");
        assert_eq!(Real(f64::NEG_INFINITY).to_string(), "-inf");
    }
    #[test]
    fn real_round_trip() {
        let mut rng = thread_rng();
        for _ in 0..1000 {
            let x: f64 = rng.gen_range(-1.0..1.0) * 10f64.powi(rng.gen_range(-300..300));
            assert_eq!(Real(x).to_string().parse::<f64>().unwrap(), x);
        }
    }
    #[test]
    fn write_layout() {
        let mut lensum = Lensum::new(2, ShearStyle::Reduced).unwrap().with_index(3);
        lensum.zindex = 42;
        lensum.weight = 1.5;
        lensum.totpairs = 10;
        lensum.npair_mut().copy_from_slice(&[4, 6]);
        lensum.rsum_mut().copy_from_slice(&[8., 30.]);
        lensum.wsum_mut().copy_from_slice(&[0.5, 1.]);
        let mut buffer = Vec::new();
        lensum.write(&mut buffer).unwrap();
        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "3 42 1.5 10 4 6 8 30 0.5 1 0 0 0 0\n"
        );
    }
    #[test]
    fn round_trip() {
        for shear_style in [ShearStyle::Reduced, ShearStyle::Lensfit] {
            let lensum = random(11, shear_style);
            let mut buffer = Vec::new();
            lensum.write(&mut buffer).unwrap();
            let mut other = Lensum::new(11, shear_style).unwrap();
            assert!(other.read(&mut Cursor::new(buffer)).unwrap());
            assert_eq!(other, lensum);
        }
    }
    #[test]
    fn mean_radius_after_round_trip() {
        let mut lensum = Lensum::new(3, ShearStyle::Reduced).unwrap();
        lensum.npair_mut().copy_from_slice(&[2, 0, 5]);
        lensum.rsum_mut().copy_from_slice(&[4., 0., 15.]);
        let mut buffer = Vec::new();
        lensum.write(&mut buffer).unwrap();
        let mut other = Lensum::new(3, ShearStyle::Reduced).unwrap();
        other.read(&mut Cursor::new(buffer)).unwrap();
        let meanr = other.mean_radius();
        assert_eq!(meanr[0], 2.);
        assert!(meanr[1].is_nan());
        assert_eq!(meanr[2], 3.);
    }
    #[test]
    fn read_skips_blank_lines_and_stops_at_end() {
        let mut stream = Cursor::new("\n  \n0 -1 0 0 1 2 3 4 5\n\n");
        let mut lensum = Lensum::new(1, ShearStyle::Reduced).unwrap();
        assert!(lensum.read(&mut stream).unwrap());
        assert_eq!(lensum.zindex, -1);
        assert_eq!(lensum.npair(), &[1]);
        assert_eq!(lensum.osum(), &[5.]);
        assert!(!lensum.read(&mut stream).unwrap());
    }
    #[test]
    fn read_tabs() {
        let mut lensum = Lensum::new(1, ShearStyle::Reduced).unwrap();
        lensum.parse_record("7\t3 2.0 9 1 2 3 4 5").unwrap();
        assert_eq!(lensum.index(), 7);
        assert_eq!(lensum.weight, 2.);
    }
    #[test]
    fn short_record() {
        let mut lensum = Lensum::new(2, ShearStyle::Lensfit).unwrap();
        // a reduced record is short for a lensfit lensum
        let err = lensum
            .parse_record("0 0 1 2 1 1 0 0 0 0 0 0 0 0")
            .unwrap_err();
        assert!(matches!(
            err,
            LensumError::Format {
                expected: 18,
                found: 14
            }
        ));
        assert_eq!(lensum, Lensum::new(2, ShearStyle::Lensfit).unwrap());
    }
    #[test]
    fn long_record() {
        let mut lensum = Lensum::new(1, ShearStyle::Reduced).unwrap();
        assert!(matches!(
            lensum.parse_record("0 0 1 2 1 1 0 0 0 9"),
            Err(LensumError::Format {
                expected: 9,
                found: 10
            })
        ));
    }
    #[test]
    fn bad_token() {
        let mut lensum = Lensum::new(1, ShearStyle::Reduced).unwrap();
        match lensum.parse_record("0 0 1 2 1.5 1 0 0 0") {
            Err(LensumError::Parse { position, token }) => {
                assert_eq!(position, 4);
                assert_eq!(token, "1.5");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(lensum.npair(), &[0]);
    }
}
