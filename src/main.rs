use std::path::PathBuf;
use std::process;
use std::str::FromStr;

use clap::{Parser, ValueEnum};
use log::{debug, error, info, LevelFilter};

use garden_grammar::config::{GardenConfig, PlantingConfig};
use garden_grammar::layouts::{garden, planting};
use garden_grammar::outline::{leaf_summary, render_outline};
use garden_grammar::{GrammarEngine, RegionKind, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Layout {
    /// Path-divided zones settling into planted parcels
    Garden,
    /// Quartered beds recursively mixed from a palette
    Planting,
}

#[derive(Parser, Debug)]
#[command(name = "garden_grammar")]
#[command(about = "Generate procedural layouts by recursive rectangle subdivision")]
struct Args {
    /// Layout rules to use
    #[arg(short, long, value_enum, default_value = "garden")]
    layout: Layout,

    /// Width of the generated area
    #[arg(short = 'W', long, default_value = "600")]
    width: f64,

    /// Height of the generated area
    #[arg(short = 'H', long, default_value = "600")]
    height: f64,

    /// Random seed (uses random seed if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// JSON file overriding the layout's default settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of layouts to generate in parallel, with consecutive seeds
    #[arg(short = 'n', long, default_value = "1")]
    count: usize,

    /// Print the full region tree
    #[arg(long)]
    outline: bool,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() {
    let args = Args::parse();

    let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!("Invalid log level: {}. Using 'warn' instead.", args.log_level);
        LevelFilter::Warn
    });
    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();
    debug!("Parsed arguments: {:?}", args);

    if let Err(err) = run(&args) {
        error!("{err}");
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let seed = args.seed.unwrap_or_else(rand::random);
    info!(seed = seed; "Starting");

    match args.layout {
        Layout::Garden => {
            let config = match &args.config {
                Some(path) => GardenConfig::load_from(path)?,
                None => GardenConfig::defaults()?,
            };
            report(&garden::engine(&config)?, args, seed)
        }
        Layout::Planting => {
            let config = match &args.config {
                Some(path) => PlantingConfig::load_from(path)?,
                None => PlantingConfig::defaults()?,
            };
            report(&planting::engine(&config)?, args, seed)
        }
    }
}

fn report<K: RegionKind>(engine: &GrammarEngine<K>, args: &Args, seed: u64) -> Result<()> {
    let seeds: Vec<u64> = (0..args.count.max(1))
        .map(|i| seed.wrapping_add(i as u64))
        .collect();

    println!("Layout: {:?}", args.layout);
    println!("Area: {}x{}", args.width, args.height);

    let runs = engine.generate_many(args.width, args.height, &seeds);
    for (seed, run) in seeds.iter().zip(runs) {
        let generation = run?;
        let stats = &generation.stats;

        println!();
        println!("Seed: {}", seed);
        println!(
            "Created {} regions ({} leaves, depth {}, {} embeds, {} stopped by safeguard)",
            stats.regions, stats.leaves, stats.max_depth, stats.embeds, stats.safeguarded
        );

        let total = args.width * args.height;
        for (kind, summary) in leaf_summary(&generation.root) {
            println!(
                "  {:<14} {:>4} leaves  {:>5.1}% of area",
                kind,
                summary.count,
                100.0 * summary.area / total
            );
        }

        if args.outline {
            print!("{}", render_outline(&generation.root));
        }
    }
    Ok(())
}
