use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rusty_subgroup::quality::available_measures;
use rusty_subgroup::{load_file, Condition, LoadOptions, MeasureConfig, Session};

#[derive(Parser)]
#[command(name = "rusty-subgroup")]
#[command(about = "Score a subgroup of an ARFF, CSV or Parquet dataset", long_about = None)]
struct Cli {
    /// Dataset file (.arff, .csv, .parquet)
    file: PathBuf,
    /// Class attribute (default: last column)
    #[arg(long)]
    class: Option<String>,
    /// Class value counted as positive (default: first value seen)
    #[arg(long)]
    target: Option<String>,
    /// Quality measure name
    #[arg(long)]
    measure: Option<String>,
    /// Minimum accepted score
    #[arg(long)]
    min: Option<f64>,
    /// JSON file with `measure` and `minimum_value`
    #[arg(long)]
    config: Option<PathBuf>,
    /// Subgroup condition such as "age>=40"; repeat for a conjunction
    #[arg(long = "condition", short = 'c')]
    conditions: Vec<String>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str::<MeasureConfig>(&text)
                .with_context(|| format!("parsing {}", path.display()))?
        }
        None => MeasureConfig::default(),
    };
    if let Some(measure) = cli.measure {
        config.measure = measure;
    }
    if cli.min.is_some() {
        config.minimum_value = cli.min;
    }
    let measure = config.build().with_context(|| {
        format!("choose one of: {}", available_measures().join(", "))
    })?;

    let options = LoadOptions {
        class_attribute: cli.class,
    };
    let dataset = load_file(&cli.file, &options)
        .with_context(|| format!("loading {}", cli.file.display()))?;

    print!("{dataset}");
    println!("% {} instances", dataset.len());

    let target = match cli.target {
        Some(t) => t,
        None => dataset
            .instances()
            .iter()
            .map(|i| i.target_value())
            .find(|v| !v.is_missing())
            .map(|v| v.to_string())
            .context("class attribute has no present values")?,
    };

    let conditions = cli
        .conditions
        .iter()
        .map(|c| Condition::parse(&dataset, c))
        .collect::<Result<Vec<_>>>()?;

    let mut session = Session::new(dataset, measure);
    session.set_target_value(&target)?;

    let totals = session.class_distribution();
    println!(
        "target {} = {target}: P = {}, N = {}",
        session.dataset().class_attribute().name(),
        totals.big_p,
        totals.big_n
    );

    let eval = session.evaluate(&conditions);
    let description = if conditions.is_empty() {
        "<all>".to_string()
    } else {
        conditions
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(" AND ")
    };
    println!("subgroup: {description}");
    println!("  p = {}, n = {}", eval.table.p, eval.table.n);
    println!(
        "  {} [{}] = {:.6} ({})",
        session.measure().name(),
        session.measure().formula(),
        eval.score,
        if eval.accepted { "accepted" } else { "rejected" }
    );
    Ok(())
}
