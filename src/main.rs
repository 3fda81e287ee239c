use anyhow::Context;
use lensum::{Lensum, LensumsLoader, ShearStyle};
use rayon::prelude::*;
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
struct Shape {
    /// Number of radial bins
    #[structopt(short, long)]
    nbin: usize,
    /// Shear style: reduced or lensfit
    #[structopt(short, long, default_value = "reduced")]
    shear_style: ShearStyle,
}
impl Shape {
    fn loader(&self, path: &Path) -> LensumsLoader {
        LensumsLoader::new(path)
            .nbin(self.nbin)
            .shear_style(self.shear_style)
    }
}

#[derive(Debug, StructOpt)]
#[structopt(name = "lensum", about = "Weak lensing lensums summation")]
enum Opt {
    /// Sums the lensums of one or more files
    Sum {
        /// Lensums files or glob patterns
        #[structopt(required = true)]
        files: Vec<String>,
        #[structopt(flatten)]
        shape: Shape,
        /// Writes the total lensum record to a file
        #[structopt(short, long)]
        output: Option<PathBuf>,
        /// Writes the total lensum radial profile to a CSV file
        #[structopt(long)]
        csv: Option<PathBuf>,
    },
    /// Prints the first and last lensums of a file
    Print {
        /// Lensums file
        file: PathBuf,
        #[structopt(flatten)]
        shape: Shape,
        /// Prints only this lensum
        #[structopt(short, long)]
        index: Option<usize>,
        /// Prints also the sum of all the lensums
        #[structopt(long)]
        sum: bool,
    },
}

fn expand(patterns: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut paths = vec![];
    for pattern in patterns {
        let matches = glob::glob(pattern)
            .with_context(|| format!("invalid file pattern: {}", pattern))?
            .collect::<Result<Vec<_>, _>>()?;
        if matches.is_empty() {
            paths.push(PathBuf::from(pattern));
        } else {
            paths.extend(matches);
        }
    }
    Ok(paths)
}

fn sum(
    files: Vec<String>,
    shape: Shape,
    output: Option<PathBuf>,
    csv: Option<PathBuf>,
) -> anyhow::Result<()> {
    let paths = expand(&files)?;
    log::info!("Summing the lensums of {} files", paths.len());
    // one partial sum per file, added up in file order afterwards
    let partials = paths
        .par_iter()
        .map(|path| -> anyhow::Result<Option<Lensum>> {
            let lensums = shape
                .loader(path)
                .load()
                .with_context(|| format!("failed to load {:?}", path))?;
            if lensums.is_empty() {
                log::warn!("{:?} has no lensum", path);
                return Ok(None);
            }
            let partial = lensums.sum()?;
            log::debug!(
                "{:?}: {} lensums, {} pairs",
                path,
                lensums.len(),
                partial.totpairs
            );
            Ok(Some(partial))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    let mut total = Lensum::new(shape.nbin, shape.shear_style)?;
    for partial in partials.iter().flatten() {
        total.add(partial)?;
    }
    log::info!("sum of lensums:");
    total.print();
    if let Some(path) = output {
        let mut file = BufWriter::new(
            File::create(&path).with_context(|| format!("failed to create {:?}", path))?,
        );
        total.write(&mut file)?;
        file.flush()?;
    }
    if let Some(path) = csv {
        total.to_csv(File::create(&path).with_context(|| format!("failed to create {:?}", path))?)?;
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    match Opt::from_args() {
        Opt::Sum {
            files,
            shape,
            output,
            csv,
        } => sum(files, shape, output, csv)?,
        Opt::Print {
            file,
            shape,
            index,
            sum,
        } => {
            let lensums = shape
                .loader(&file)
                .load()
                .with_context(|| format!("failed to load {:?}", file))?;
            match index {
                Some(index) => lensums.print_one(index)?,
                None => lensums.print_first_last()?,
            }
            if sum {
                log::info!("sum of lensums:");
                lensums.print_sum()?;
            }
        }
    }
    Ok(())
}
