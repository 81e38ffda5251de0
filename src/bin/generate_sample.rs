//! Write a synthetic patient dataset as `sample_data.arff` and
//! `sample_data.parquet` for trying out the CLI.

use std::fmt::Write as _;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    fn pick<'a>(&mut self, options: &[&'a str]) -> &'a str {
        options[(self.next_u64() % options.len() as u64) as usize]
    }
}

struct Patient {
    age: Option<f64>,
    bmi: f64,
    smoker: &'static str,
    region: &'static str,
    outcome: &'static str,
}

const SMOKER: [&str; 2] = ["yes", "no"];
const REGIONS: [&str; 3] = ["north", "south", "east"];
const OUTCOMES: [&str; 2] = ["sick", "healthy"];

fn generate(rng: &mut SimpleRng, count: usize) -> Vec<Patient> {
    (0..count)
        .map(|_| {
            let age = (20.0 + rng.next_f64() * 60.0).round();
            let bmi = ((18.0 + rng.next_f64() * 17.0) * 10.0).round() / 10.0;
            let smoker = rng.pick(&SMOKER);
            let region = rng.pick(&REGIONS);

            // Older smokers with a high BMI are the interesting subgroup.
            let mut risk = 0.1;
            if age > 55.0 {
                risk += 0.25;
            }
            if smoker == "yes" {
                risk += 0.3;
            }
            if bmi > 30.0 {
                risk += 0.15;
            }
            let outcome = if rng.chance(risk) { OUTCOMES[0] } else { OUTCOMES[1] };

            Patient {
                age: (!rng.chance(0.05)).then_some(age),
                bmi,
                smoker,
                region,
                outcome,
            }
        })
        .collect()
}

fn write_arff(path: &str, patients: &[Patient]) -> Result<()> {
    let mut out = String::from("% synthetic patients\n@relation patients\n\n");
    out.push_str("@attribute age numeric\n");
    out.push_str("@attribute bmi numeric\n");
    writeln!(out, "@attribute smoker {{{}}}", SMOKER.join(","))?;
    writeln!(out, "@attribute region {{{}}}", REGIONS.join(","))?;
    writeln!(out, "@attribute outcome {{{}}}", OUTCOMES.join(","))?;
    out.push_str("\n@data\n");
    for p in patients {
        let age = p.age.map_or_else(|| "?".to_string(), |a| a.to_string());
        writeln!(out, "{age},{},{},{},{}", p.bmi, p.smoker, p.region, p.outcome)?;
    }
    std::fs::write(path, out).with_context(|| format!("writing {path}"))
}

fn write_parquet(path: &str, patients: &[Patient]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("age", DataType::Float64, true),
        Field::new("bmi", DataType::Float64, false),
        Field::new("smoker", DataType::Utf8, false),
        Field::new("region", DataType::Utf8, false),
        Field::new("outcome", DataType::Utf8, false),
    ]));

    let text_column = |f: fn(&Patient) -> &'static str| -> ArrayRef {
        Arc::new(StringArray::from(patients.iter().map(f).collect::<Vec<_>>()))
    };
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Float64Array::from(patients.iter().map(|p| p.age).collect::<Vec<_>>())),
        Arc::new(Float64Array::from(patients.iter().map(|p| p.bmi).collect::<Vec<_>>())),
        text_column(|p| p.smoker),
        text_column(|p| p.region),
        text_column(|p| p.outcome),
    ];
    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let mut rng = SimpleRng::new(42);
    let patients = generate(&mut rng, 500);

    write_arff("sample_data.arff", &patients)?;
    write_parquet("sample_data.parquet", &patients)?;
    log::info!("generated {} patients", patients.len());

    println!(
        "Wrote {} instances to sample_data.arff and sample_data.parquet",
        patients.len()
    );
    Ok(())
}
