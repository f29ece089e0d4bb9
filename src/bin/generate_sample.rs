use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use parquet::arrow::ArrowWriter;
use stardust::config::{default_data_dir, SAMPLE_FILE_NAME};

/// Deterministic splitmix64 stream, enough for reproducible sample grains.
struct GrainRng(u64);

impl GrainRng {
    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in `[0, 1)`.
    fn uniform(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Approximately normal: Irwin-Hall sum of twelve uniforms.
    fn normal(&mut self, mean: f64, sigma: f64) -> f64 {
        let z: f64 = (0..12).map(|_| self.uniform()).sum::<f64>() - 6.0;
        mean + sigma * z
    }
}

/// Rough population parameters per grain type:
/// (type, share, mean d29Si, mean d30Si, mean 12C/13C)
const POPULATIONS: [(&str, f64, f64, f64, f64); 6] = [
    ("M", 0.90, 40.0, 50.0, 60.0),
    ("X", 0.02, -350.0, -450.0, 250.0),
    ("Y", 0.03, -20.0, 10.0, 150.0),
    ("Z", 0.02, -50.0, 80.0, 70.0),
    ("AB", 0.02, 30.0, 40.0, 5.0),
    ("N", 0.01, -10.0, -5.0, 3.0),
];

const N_GRAINS: usize = 500;

const HEADERS: [&str; 9] = [
    "PGD ID",
    "PGD Type",
    "d(29Si/28Si)",
    "err[d(29Si/28Si)]",
    "d(30Si/28Si)",
    "err[d(30Si/28Si)]",
    "12C/13C",
    "err[12C/13C]",
    "14N/15N",
];

struct Grain {
    id: String,
    kind: &'static str,
    values: [Option<f64>; 7],
}

fn pick_type(rng: &mut GrainRng) -> (&'static str, f64, f64, f64) {
    let mut u = rng.uniform() * POPULATIONS.iter().map(|p| p.1).sum::<f64>();
    for &(kind, share, d29, d30, c) in &POPULATIONS {
        if u < share {
            return (kind, d29, d30, c);
        }
        u -= share;
    }
    let (kind, _, d29, d30, c) = POPULATIONS[0];
    (kind, d29, d30, c)
}

fn generate(rng: &mut GrainRng) -> Vec<Grain> {
    (0..N_GRAINS)
        .map(|i| {
            let (kind, d29, d30, c) = pick_type(rng);
            let d29_err = rng.normal(8.0, 2.0).abs();
            let d30_err = rng.normal(10.0, 2.5).abs();
            let c_ratio = rng.normal(c, c * 0.2).abs();
            // Nitrogen and some carbon uncertainties are only reported for part of the grains.
            let c_err = (rng.uniform() > 0.1).then(|| c_ratio * 0.02);
            let n_ratio = (rng.uniform() > 0.6).then(|| rng.normal(1000.0, 400.0).abs());

            Grain {
                id: format!("SiC-{:04}", i + 1),
                kind,
                values: [
                    Some(rng.normal(d29, 30.0)),
                    Some(d29_err),
                    Some(rng.normal(d30, 35.0)),
                    Some(d30_err),
                    Some(c_ratio),
                    c_err,
                    n_ratio,
                ],
            }
        })
        .collect()
}

fn write_csv(path: &Path, grains: &[Grain]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV")?;
    writer.write_record(HEADERS)?;
    for g in grains {
        let mut record = vec![g.id.clone(), g.kind.to_string()];
        record.extend(g.values.iter().map(|v| v.map(|v| format!("{v:.4}")).unwrap_or_default()));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

fn to_batch(grains: &[Grain]) -> Result<RecordBatch> {
    let mut fields = vec![
        Field::new(HEADERS[0], DataType::Utf8, false),
        Field::new(HEADERS[1], DataType::Utf8, false),
    ];
    let mut arrays: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from_iter_values(grains.iter().map(|g| g.id.as_str()))),
        Arc::new(StringArray::from_iter_values(grains.iter().map(|g| g.kind))),
    ];
    for (col, name) in HEADERS[2..].iter().enumerate() {
        fields.push(Field::new(*name, DataType::Float64, true));
        arrays.push(Arc::new(Float64Array::from(
            grains.iter().map(|g| g.values[col]).collect::<Vec<_>>(),
        )));
    }
    RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays).context("building RecordBatch")
}

fn main() -> Result<()> {
    env_logger::init();

    let mut rng = GrainRng(42);
    let grains = generate(&mut rng);

    let data_dir = default_data_dir();
    std::fs::create_dir_all(&data_dir).context("creating data directory")?;

    let csv_path = data_dir.join(SAMPLE_FILE_NAME);
    write_csv(&csv_path, &grains)?;

    let batch = to_batch(&grains)?;
    let parquet_path = data_dir.join(SAMPLE_FILE_NAME).with_extension("parquet");
    let file = std::fs::File::create(&parquet_path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
    writer.write(&batch)?;
    writer.close()?;

    println!("{}", pretty_format_batches(&[batch.slice(0, 5)])?);
    println!(
        "Wrote {} grains to {} and {}",
        grains.len(),
        csv_path.display(),
        parquet_path.display()
    );
    Ok(())
}
