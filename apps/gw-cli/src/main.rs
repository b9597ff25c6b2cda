use clap::{Parser, Subcommand};
use gw_core::timing::{self, timed};
use gw_core::{EdgeId, ExecContext, NodeId};
use gw_grid::{FlowReport, Grid, GridConfig, GridError};
use gw_project::{ProjectResult, REGIONS, build_grid, load_dataset, random_grid, region};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "gw-cli")]
#[command(about = "Gridworks CLI - power grid generation and flow modelling", long_about = None)]
struct Cli {
    /// Worker threads for parallel steps (1 = sequential)
    #[arg(long, global = true)]
    workers: Option<usize>,
    /// Seed for every random choice
    #[arg(long, global = true, default_value_t = gw_core::context::DEFAULT_SEED)]
    seed: u64,
    /// Log phase timings
    #[arg(long, global = true)]
    timing: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grow a random grid: spanning tree, generators, flows, congestion relief
    Model {
        /// Number of nodes in the layout
        #[arg(long, default_value_t = 100)]
        nodes: usize,
        /// Nodes served per new generator
        #[arg(long, default_value_t = 10)]
        clusters: usize,
        /// Congestion relief rounds
        #[arg(long, default_value_t = 1)]
        reduce: usize,
        /// Grid tunables (YAML)
        #[arg(long)]
        config: Option<PathBuf>,
        #[command(flatten)]
        report: ReportArgs,
    },
    /// Model a region of a dataset file
    Load {
        /// Dataset file (YAML or JSON)
        dataset: PathBuf,
        /// Region to keep (see `regions`)
        #[arg(long)]
        region: Option<String>,
        /// Keep only sources with these fuel tags
        #[arg(long)]
        fuel: Vec<String>,
        /// Congestion relief rounds
        #[arg(long, default_value_t = 0)]
        reduce: usize,
        #[command(flatten)]
        report: ReportArgs,
    },
    /// List the named regions
    Regions,
}

#[derive(clap::Args)]
struct ReportArgs {
    /// Flow histogram bands
    #[arg(long, default_value_t = 10)]
    bands: usize,
    /// Accept relief lines shorter than this
    #[arg(long, default_value_t = 0.5)]
    max_line: f64,
    /// Print the J-metric and Estrada index
    #[arg(long)]
    resilience: bool,
}

fn main() -> ProjectResult<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    if cli.timing {
        timing::enable_timing();
    }
    let workers = cli.workers.unwrap_or_else(default_workers);
    let ctx = ExecContext::new(workers, cli.seed).map_err(GridError::from)?;
    tracing::debug!(workers, seed = cli.seed, "execution context ready");

    match cli.command {
        Commands::Model {
            nodes,
            clusters,
            reduce,
            config,
            report,
        } => cmd_model(&ctx, nodes, clusters, reduce, config.as_deref(), &report),
        Commands::Load {
            dataset,
            region,
            fuel,
            reduce,
            report,
        } => cmd_load(&ctx, &dataset, region.as_deref(), &fuel, reduce, &report),
        Commands::Regions => {
            cmd_regions();
            Ok(())
        }
    }
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

fn cmd_model(
    ctx: &ExecContext,
    nodes: usize,
    clusters: usize,
    reduce: usize,
    config: Option<&Path>,
    args: &ReportArgs,
) -> ProjectResult<()> {
    let config: GridConfig = match config {
        Some(path) => serde_yaml::from_str(&std::fs::read_to_string(path)?)?,
        None => GridConfig::default(),
    };

    println!("Layout: {} nodes, {} nodes/generator", nodes, clusters);
    let mut grid = timed("layout", || random_grid(ctx, nodes, config))?;
    println!("  {} lines in spanning tree", grid.network().attached_edges().count());

    println!("Adding generators");
    let built = grid.build_generators_for_unserved(ctx, clusters)?;
    println!("  Built: {}", built);
    print_unserved(&mut grid)?;

    let built = grid.build_generators_for_unserved(ctx, clusters)?;
    let grown = grid.grow_generators_for_unserved()?;
    println!("  Built: {}", built);
    println!("  Grown: {}", grown);
    let grown = grid.grow_generators_for_unserved()?;
    println!("  Grown: {}", grown);

    println!("Flows");
    print_flow_bands(grid.ensure_flows(), args.bands);
    println!("{}", grid.summary());

    reduce_congestion(ctx, &mut grid, reduce, args)?;
    if args.resilience {
        print_resilience(ctx, &grid)?;
    }
    Ok(())
}

fn cmd_load(
    ctx: &ExecContext,
    path: &Path,
    region_name: Option<&str>,
    fuels: &[String],
    reduce: usize,
    args: &ReportArgs,
) -> ProjectResult<()> {
    println!("Loading dataset: {}", path.display());
    let mut dataset = load_dataset(path)?;
    if let Some(name) = region_name {
        match region(name) {
            Some(bounds) => dataset = dataset.within(&bounds),
            None => {
                println!("Unknown region '{}'", name);
                cmd_regions();
                return Ok(());
            }
        }
    }
    let dataset = dataset.with_fuels(fuels);

    let mut grid = build_grid(&dataset)?;
    println!(
        "Grid: {} nodes, {} loads, {} generators",
        grid.nodes().len(),
        grid.loads().len(),
        grid.generators().len()
    );

    print_flow_bands(grid.ensure_flows(), args.bands);
    println!("{}", grid.summary());

    reduce_congestion(ctx, &mut grid, reduce, args)?;
    if args.resilience {
        print_resilience(ctx, &grid)?;
    }
    Ok(())
}

fn cmd_regions() {
    println!("Regions available for modelling:");
    for (name, b) in REGIONS {
        println!();
        println!("{:<15} N: {}", format!("{}:", name), b.north);
        println!("\tW: {}\tE: {}", b.west, b.east);
        println!("\t\tS: {}", b.south);
    }
}

/// Build the short relief lines each round proposes, then take back the
/// ones that end up carrying nothing.
fn reduce_congestion(
    ctx: &ExecContext,
    grid: &mut Grid,
    rounds: usize,
    args: &ReportArgs,
) -> ProjectResult<()> {
    for round in 1..=rounds {
        println!("Reducing congestion (round {})", round);
        let reliefs = grid.reduce_congestion(ctx)?;

        let mut seen: HashSet<(NodeId, NodeId)> = HashSet::new();
        let mut added: Vec<EdgeId> = Vec::new();
        for relief in reliefs.iter().filter(|r| r.line.length < args.max_line) {
            let line = relief.line;
            if !seen.insert((line.from.min(line.to), line.from.max(line.to))) {
                continue;
            }
            added.push(grid.add_line(line.from, line.to, line.length)?);
        }

        let report = grid.reset();
        let idle: Vec<EdgeId> = added
            .iter()
            .copied()
            .filter(|e| report.flow(*e) == 0.0)
            .collect();
        for e in &idle {
            grid.detach_edge(*e)?;
        }

        println!("  Candidates: {}", reliefs.len());
        println!("  Qualifying lines: {}", added.len());
        println!("  No-flow lines: {}", idle.len());
        println!("  New lines: {}", added.len() - idle.len());
        print_flow_bands(grid.ensure_flows(), args.bands);
        println!("{}", grid.summary());
    }
    Ok(())
}

fn print_unserved(grid: &mut Grid) -> ProjectResult<()> {
    let components = grid.unserved_components()?;
    let sizes: Vec<usize> = components.iter().map(|c| c.len()).collect();
    println!(
        "  Unserved: {} ({} subgraphs) {:?}",
        sizes.iter().sum::<usize>(),
        sizes.len(),
        sizes
    );
    Ok(())
}

fn print_flow_bands(report: &FlowReport, n: usize) {
    for (i, band) in report.histogram(n).iter().enumerate() {
        println!(
            "\t{}-{}%\t({:.1}-{:.1}):\t{}",
            100 * i / n,
            100 * (i + 1) / n,
            band.lower,
            band.upper,
            band.count
        );
    }
    let min = report.flows.values().copied().reduce(f64::min).unwrap_or(0.0);
    println!("\tMin, max: {:.2}, {:.2}", min, report.max_flow());
}

fn print_resilience(ctx: &ExecContext, grid: &Grid) -> ProjectResult<()> {
    let resilience = timed("resilience", || grid.resilience())?;
    println!("Resilience");
    println!("  J(0.5): {:.4}", resilience.j(ctx, 0.5));
    println!("  Estrada: {:.4}", resilience.estrada());
    println!("  Randic: {:.4}", resilience.randic_index());
    Ok(())
}
