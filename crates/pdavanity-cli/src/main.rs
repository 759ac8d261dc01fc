//! PdaVanity CLI
//!
//! Search for program-derived addresses with vanity constraints.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use pdavanity_core::{
    constraint_difficulty, derive_program_address, estimate_difficulty, format_count,
    format_difficulty, format_duration, Address, Constraints, IntegerWidth, SearchConfig,
    SearchController, SearchOptions, SearchOutcome, SearchProgress, SeedDimension, SeedEncoding,
    SeedSpec, SeedValue,
};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "pdavanity")]
#[command(author = "PdaVanity Team")]
#[command(version = "0.1.0")]
#[command(about = "Program-derived address vanity search", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the seed space for matching derived addresses
    Search {
        /// Program id (Base58)
        #[arg(short, long)]
        program_id: Option<String>,

        #[command(flatten)]
        seeds: SeedArgs,

        #[command(flatten)]
        constraints: ConstraintArgs,

        /// Maximum attempts
        #[arg(long)]
        max_attempts: Option<u64>,

        /// Seed tuples per batch
        #[arg(long)]
        batch_size: Option<usize>,

        /// Search on this many threads (0 = all cores); omit for single-threaded
        #[arg(long)]
        threads: Option<usize>,

        /// Read search options from a JSON file; flags override its values
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Estimate search size and duration
    Estimate {
        #[command(flatten)]
        seeds: SeedArgs,

        #[command(flatten)]
        constraints: ConstraintArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Derive the address for literal seeds
    Derive {
        /// Program id (Base58)
        #[arg(short, long)]
        program_id: String,

        #[command(flatten)]
        seeds: SeedArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct SeedArgs {
    /// Seed spec, repeatable: str:TEXT, addr:BASE58, int:N, hex:HEX, auto:TEXT,
    /// range:u8|u16|u32|u64:MIN-MAX
    #[arg(short, long = "seed", value_parser = parse_seed)]
    seeds: Vec<SeedSpec>,
}

#[derive(Args)]
struct ConstraintArgs {
    /// Address must start with this
    #[arg(long)]
    prefix: Option<String>,

    /// Address must end with this
    #[arg(long)]
    suffix: Option<String>,

    /// Address must contain this
    #[arg(long)]
    contains: Option<String>,

    #[arg(long)]
    starts_with: Option<String>,

    #[arg(long)]
    ends_with: Option<String>,

    #[arg(long)]
    min_length: Option<usize>,

    #[arg(long)]
    max_length: Option<usize>,

    /// Case sensitive matching
    #[arg(short = 'c', long)]
    case_sensitive: bool,

    /// Reject addresses containing this, repeatable
    #[arg(short = 'x', long = "exclude")]
    exclude: Vec<String>,
}

impl ConstraintArgs {
    /// Overlay the flags that were given onto `base`
    fn apply(self, mut base: Constraints) -> Constraints {
        base.prefix = self.prefix.or(base.prefix);
        base.suffix = self.suffix.or(base.suffix);
        base.contains = self.contains.or(base.contains);
        base.starts_with = self.starts_with.or(base.starts_with);
        base.ends_with = self.ends_with.or(base.ends_with);
        base.min_length = self.min_length.or(base.min_length);
        base.max_length = self.max_length.or(base.max_length);
        base.case_sensitive |= self.case_sensitive;
        base.exclude_patterns.extend(self.exclude);
        base
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Search {
            program_id,
            seeds,
            constraints,
            max_attempts,
            batch_size,
            threads,
            config,
            json,
        } => {
            let mut options = match config {
                Some(path) => load_options(&path)?,
                None => SearchOptions::new(String::new(), Vec::new(), Constraints::default()),
            };
            if let Some(program_id) = program_id {
                options.program_id = program_id;
            }
            if !seeds.seeds.is_empty() {
                options.seeds = seeds.seeds;
            }
            options.constraints = constraints.apply(options.constraints);
            options.max_attempts = max_attempts.or(options.max_attempts);
            options.batch_size = batch_size.or(options.batch_size);

            cmd_search(&options, threads, json)?;
        }
        Commands::Estimate {
            seeds,
            constraints,
            json,
        } => {
            cmd_estimate(&seeds.seeds, &constraints.apply(Constraints::default()), json)?;
        }
        Commands::Derive {
            program_id,
            seeds,
            json,
        } => {
            cmd_derive(&program_id, &seeds.seeds, json)?;
        }
    }

    Ok(())
}

fn load_options(path: &PathBuf) -> Result<SearchOptions> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn cmd_search(options: &SearchOptions, threads: Option<usize>, json_output: bool) -> Result<()> {
    let estimate = estimate_difficulty(&options.seeds, &options.constraints);

    if !json_output {
        eprintln!("PdaVanity v0.1.0");
        eprintln!("Program: {}", options.program_id);
        eprintln!("Seeds:   {}", options.seeds.len());
        let space = if estimate.combinations_saturated {
            estimate.combinations_label()
        } else {
            format_difficulty(estimate.total_combinations as f64)
        };
        eprintln!("Space:   {} combinations", space);
        eprintln!(
            "Difficulty: {} ({}, ~{})",
            format_difficulty(estimate.effective_difficulty),
            estimate.tier.label(),
            format_duration(estimate.estimated_seconds)
        );
        eprintln!();
    }

    let config = SearchConfig {
        threads: threads.unwrap_or_default(),
        ..Default::default()
    };
    let mut controller = SearchController::new(config);

    let per_match = constraint_difficulty(&options.constraints);
    let mut observer = |progress: &SearchProgress| {
        if !json_output {
            eprint!("\r{}", progress.format(per_match));
            if !progress.is_running {
                eprintln!();
            }
        }
    };

    let outcome = match threads {
        Some(_) => controller.search_parallel(options, &mut observer)?,
        None => controller.search(options, &mut observer)?,
    };

    if json_output {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_outcome(&outcome);
    }

    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DeriveOutput {
    address: Address,
    bump: u8,
    seeds: Vec<String>,
}

fn cmd_derive(program_id: &str, seeds: &[SeedSpec], json_output: bool) -> Result<()> {
    let program: Address = program_id
        .parse()
        .with_context(|| format!("invalid program id '{}'", program_id))?;

    let mut encoded = Vec::with_capacity(seeds.len());
    for (index, spec) in seeds.iter().enumerate() {
        match SeedDimension::from_spec(spec).with_context(|| format!("seed {}", index))? {
            SeedDimension::Fixed(bytes) => encoded.push(bytes),
            SeedDimension::Range { .. } => bail!("seed {}: derive takes literal seeds only", index),
        }
    }

    let derived = derive_program_address(&encoded, &program)?;
    let output = DeriveOutput {
        address: derived.address,
        bump: derived.bump,
        seeds: encoded.iter().map(hex::encode).collect(),
    };

    if json_output {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("Address: {}", output.address);
        println!("Bump:    {}", output.bump);
        println!("Seeds:   [{}]", output.seeds.join(", "));
    }

    Ok(())
}

fn cmd_estimate(seeds: &[SeedSpec], constraints: &Constraints, json_output: bool) -> Result<()> {
    let estimate = estimate_difficulty(seeds, constraints);

    if json_output {
        println!("{}", serde_json::to_string_pretty(&estimate)?);
        return Ok(());
    }

    println!("Combinations:   {}", estimate.combinations_label());
    println!(
        "Per match:      {}",
        format_difficulty(estimate.constraint_difficulty)
    );
    println!(
        "Estimated time: {}",
        format_duration(estimate.estimated_seconds)
    );
    println!("Tier:           {}", estimate.tier.label());

    Ok(())
}

fn print_outcome(outcome: &SearchOutcome) {
    for warning in &outcome.warnings {
        eprintln!("warning: {}", warning);
    }

    println!();
    if outcome.results.is_empty() {
        println!("No matches found ({}).", outcome.reason.message());
    } else {
        println!("🎉 {} MATCH(ES) FOUND", outcome.results.len());
    }
    for result in &outcome.results {
        println!("{:-<60}", "");
        println!("Address:   {}", result.address);
        println!("Bump:      {}", result.bump);
        println!("Seeds:     {}", result.seeds_used);
        println!("Attempt:   {}", result.attempts_at_discovery);
        println!("Matched:   {}", result.matched_constraint_names.join(", "));
    }
    println!("{:-<60}", "");
    println!("Stopped:   {}", outcome.reason.message());
    println!("Attempts:  {}", format_count(outcome.attempts));
    if outcome.skipped > 0 {
        println!("Skipped:   {}", format_count(outcome.skipped));
    }
    println!("Time:      {:.2}s", outcome.elapsed_ms as f64 / 1000.0);
}

fn parse_width(s: &str) -> Result<IntegerWidth, String> {
    match s.to_lowercase().as_str() {
        "u8" | "1" => Ok(IntegerWidth::U8),
        "u16" | "2" => Ok(IntegerWidth::U16),
        "u32" | "4" => Ok(IntegerWidth::U32),
        "u64" | "8" => Ok(IntegerWidth::U64),
        _ => Err(format!("unknown integer width '{}' (u8, u16, u32, u64)", s)),
    }
}

fn parse_seed(s: &str) -> Result<SeedSpec, String> {
    let (kind, value) = s
        .split_once(':')
        .ok_or_else(|| format!("seed '{}' must look like KIND:VALUE", s))?;

    match kind.to_lowercase().as_str() {
        "str" | "string" => Ok(SeedSpec::string(value)),
        "addr" | "address" => Ok(SeedSpec::address(value)),
        "int" | "integer" => value
            .parse::<u64>()
            .map(SeedSpec::integer)
            .map_err(|e| format!("seed '{}': {}", s, e)),
        "hex" | "bytes" => Ok(SeedSpec::literal(
            SeedEncoding::Bytes,
            SeedValue::Text(value.to_string()),
        )),
        "auto" => Ok(SeedSpec::auto(value)),
        "range" => {
            let (width, bounds) = value
                .split_once(':')
                .ok_or_else(|| format!("range seed '{}' must look like range:u16:MIN-MAX", s))?;
            let (min, max) = bounds
                .split_once('-')
                .ok_or_else(|| format!("range seed '{}' must look like range:u16:MIN-MAX", s))?;
            let min = min.parse().map_err(|e| format!("range min '{}': {}", min, e))?;
            let max = max.parse().map_err(|e| format!("range max '{}': {}", max, e))?;
            Ok(SeedSpec::range(parse_width(width)?, min, max))
        }
        _ => Err(format!(
            "unknown seed kind '{}' (str, addr, int, hex, auto, range)",
            kind
        )),
    }
}
