pub mod analyzer;
pub mod clip;
pub mod error;
pub mod geometry;
pub mod map_instance;
pub mod params;
pub mod reference;
pub mod sector;
pub mod span;

use clap::Parser;
use params::DEFAULT_PARAMS;
use reference::DEFAULT_REFERENCE;

use crate::{analyzer::SpanAnalyzer, map_instance::MapInstance, params::Params};

#[derive(Parser, Debug, Clone)]
#[command(version, about = "Classify AWB map points by the colour-temperature sectors they cover.")]
pub struct Args {
    /// Path to the map point file
    #[arg(short, long)]
    pub file: String,

    /// Number of entries in the ranked span list
    #[arg(short, long)]
    pub top: Option<usize>,

    /// Worker threads (defaults to physical cores)
    #[arg(long)]
    pub threads: Option<usize>,

    /// List the map points passing the filter for this interval, e.g. "D65-D50"
    #[arg(short, long)]
    pub interval: Option<String>,

    /// Print the sector triangle of every interval
    #[arg(long)]
    pub sectors: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    log::set_max_level(log::LevelFilter::Trace);
    env_logger::builder()
        .filter(
            None,
            if args.verbose {
                log::LevelFilter::Debug
            } else {
                log::LevelFilter::Info
            },
        )
        .init();

    let mut params: Params = *DEFAULT_PARAMS;
    if let Some(top) = args.top {
        params.top_n = top;
    }
    if let Some(threads) = args.threads {
        params.n_threads = threads.max(1);
    }

    if let Some(name) = args.interval.as_deref() {
        anyhow::ensure!(
            DEFAULT_REFERENCE.interval(name).is_some(),
            "Unknown interval {name}; expected one of: {}",
            DEFAULT_REFERENCE
                .intervals()
                .iter()
                .map(|iv| iv.name())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    if args.sectors {
        for iv in DEFAULT_REFERENCE.intervals() {
            if let Some([corner, pa, pb]) = DEFAULT_REFERENCE.sector_vertices(&iv.a, &iv.b) {
                println!("{:<10} {} {} {}", iv.name(), corner, pa, pb);
            }
        }
    }

    log::info!("Loading map points from: {}", args.file);
    let instance = MapInstance::load(&args.file)?;

    let analyzer = SpanAnalyzer::new(DEFAULT_REFERENCE.clone(), params);
    log::info!("{}", analyzer.params());
    let output = analyzer.analyze(&instance.entities);

    println!("{:>4}  {:<32} {:<48} {:>5}  COORDS", "RANK", "ALIAS", "INTERVALS", "SPAN");
    for (rank, span) in output.top.iter().enumerate() {
        println!(
            "{:>4}{} {:<32} {:<48} {:>5}  ({:.3}, {:.3})",
            rank + 1,
            if span.touches_key_interval() { "*" } else { " " },
            span.alias,
            span.joined_names(),
            span.count,
            span.coords.x,
            span.coords.y
        );
    }

    if let Some(name) = args.interval.as_deref() {
        let passing = output.filter(name);
        println!("Map points for {} ({}): {}", name, passing.len(), passing.join(", "));
    }

    log::info!("Total runtime: {:.3?}", instance.start_time.elapsed());
    println!(
        "{}",
        format!(
            r#"{{"Instance": "{}", "Time": "{:.2?}", "MapPoints": {}, "Warnings": {}}}"#,
            instance.instance_name,
            instance.start_time.elapsed().as_secs_f64(),
            output.len(),
            output.warnings.len(),
        )
    );
    Ok(())
}
