use anyhow::{bail, Context, Result};
use log::{info, warn};
use stardust::config::{DataSource, DEFAULT_FILE_NAME, SAMPLE_FILE_NAME};
use stardust::data::resolve::ColumnRole;
use stardust::StarDust;

const USAGE: &str = "\
usage: stardust [FILE]

FILE is a file name inside data/ or a path to a .csv, .json or .parquet export.
Without FILE, data/PGD_SiC_2021-01-10.csv is read, falling back to the synthetic
data/PGD_SiC_sample.csv written by `cargo run --bin generate_sample`.";

/// Default PGD export if present, otherwise the generated sample.
fn default_source() -> Result<DataSource> {
    let source = DataSource::default();
    if source.path().exists() {
        return Ok(source);
    }
    let sample = DataSource::sample();
    if sample.path().exists() {
        warn!("{DEFAULT_FILE_NAME} not found, using {SAMPLE_FILE_NAME}");
        return Ok(sample);
    }
    bail!("no dataset found in {}\n\n{USAGE}", source.data_dir.display());
}

fn main() -> Result<()> {
    env_logger::init();

    let sd = match std::env::args().nth(1) {
        Some(arg) if arg == "-h" || arg == "--help" => {
            println!("{USAGE}");
            return Ok(());
        }
        Some(arg) if std::path::Path::new(&arg).exists() => StarDust::from_path(&arg),
        Some(name) => StarDust::with_file(&name),
        None => StarDust::from_source(&default_source()?),
    };
    let mut sd = sd.context("loading grain database")?;

    let total = sd.len();
    let deltas = sd
        .table()
        .column_names()
        .iter()
        .filter(|c| ColumnRole::of(c) == ColumnRole::Delta)
        .count();
    let types = sd.grain_types();
    info!("{total} grains, {deltas} delta-ratio columns");

    sd.filter_type("M")?;

    println!("{} of {total} grains are mainstream (M)", sd.len());
    println!("grain types present: {:?}", types);
    Ok(())
}
