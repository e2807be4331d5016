use std::error::Error;
use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, error::ErrorKind};

use crate::config::OrderConfig;
use crate::constants::source::DEFAULT_DATA_FILENAME;
use crate::data::Record;
use crate::metrics::block_composition;
use crate::schedule::build_schedule;
use crate::session::Session;
use crate::sidecar::FileOrderStore;
use crate::source::CsvFileSource;
use crate::state::{Confirmation, DisplayMode, OrderController};

#[derive(Debug, Parser)]
#[command(
    name = "running-order",
    disable_help_subcommand = true,
    about = "Shuffle and confirm a presentation running order",
    long_about = "Load presentation cards from a CSV file, shuffle them into category-balanced blocks, and confirm the order once into a JSON sidecar.",
    after_help = "The sidecar defaults to order.json in the working directory; a confirmed sidecar is restored on every later run."
)]
/// CLI for `running-order`.
///
/// Common usage:
/// - Preview the current order: `running-order show`
/// - Confirm it and write `order.json`: `running-order confirm`
/// - Restore from a downloaded sidecar: `running-order import saved-order.json`
struct RunningOrderCli {
    #[arg(
        long,
        value_name = "CSV",
        default_value = DEFAULT_DATA_FILENAME,
        help = "CSV file with class, group, theme, and materials URL columns"
    )]
    data: PathBuf,
    #[arg(
        long = "order-path",
        value_name = "ORDER_PATH",
        help = "Optional path of the persisted order sidecar"
    )]
    order_path: Option<PathBuf>,
    #[arg(
        long = "order-dir",
        value_name = "DIR",
        conflicts_with = "order_path",
        help = "Optional directory for the sidecar (uses the order.json filename)"
    )]
    order_dir: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        help = "Seed for shuffling; without it a random seed is drawn and printed with the preview"
    )]
    seed: Option<u64>,
    #[arg(
        long = "block-count",
        value_parser = parse_positive_usize,
        help = "Blocks per shuffle (records required per category)"
    )]
    block_count: Option<usize>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the current order (default).
    Show,
    /// Confirm the current order and write the sidecar.
    ///
    /// Every run draws a new preview unless `--seed` is given; pass the seed
    /// printed by `show` to confirm the order it displayed.
    Confirm,
    /// Restore from an uploaded sidecar file and re-save it.
    Import {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Report category composition per block of the current order.
    Verify,
}

/// Run the `running-order` CLI over `args_iter` (program name excluded).
pub fn run_running_order<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let Some(cli) =
        parse_cli::<RunningOrderCli, _>(std::iter::once("running-order".to_string()).chain(args_iter))?
    else {
        return Ok(());
    };

    let seed = cli.seed.unwrap_or_else(rand::random::<u64>);
    let defaults = OrderConfig::default();
    let config = OrderConfig {
        seed: Some(seed),
        block_count: cli.block_count.unwrap_or(defaults.block_count),
        ..defaults
    };

    let order_path = if let Some(path) = cli.order_path {
        path
    } else if let Some(dir) = cli.order_dir {
        FileOrderStore::default_path_in_dir(dir)
    } else {
        FileOrderStore::default_path()
    };
    let order_store = Arc::new(FileOrderStore::open(&order_path));
    let source = CsvFileSource::new(&cli.data);
    let mut session = Session::open(config.clone(), &source, order_store)?;

    if let Some(warning) = session.restore_warning() {
        eprintln!(
            "Persisted order in {} was not used: {}",
            order_path.display(),
            warning
        );
    }

    match cli.command.unwrap_or(Command::Show) {
        Command::Show => print_order(session.controller(), &config, seed),
        Command::Confirm => match session.confirm()? {
            Confirmation::Confirmed(_) => {
                println!("Order confirmed and saved to {}", order_path.display());
                println!();
                print_order(session.controller(), &config, seed);
            }
            Confirmation::AlreadyConfirmed => {
                println!("Order was already confirmed; nothing changed.");
                println!();
                print_order(session.controller(), &config, seed);
            }
        },
        Command::Import { file } => {
            let blob = fs::read_to_string(&file)?;
            let state = session.restore_from_json(&blob)?;
            if state.confirmed {
                println!("Loaded confirmed order from {}", file.display());
            } else {
                println!("Loaded {} (unconfirmed); reshuffled", file.display());
            }
            println!();
            print_order(session.controller(), &config, seed);
        }
        Command::Verify => print_verification(session.controller()),
    }

    Ok(())
}

fn print_order(controller: &OrderController, config: &OrderConfig, seed: u64) {
    let order = controller.current_order();
    match controller.mode() {
        DisplayMode::SourceOrder => println!("Showing CSV order (no order.json yet)"),
        DisplayMode::Shuffled => {
            println!("Order not confirmed yet (preview seed {seed})");
            println!("Run `confirm --seed {seed}` to confirm exactly this preview.");
        }
        DisplayMode::Confirmed => println!("Order confirmed"),
    }
    println!();

    let numbered = controller.is_confirmed();
    if controller.has_persisted_state() {
        for section in build_schedule(&order, &config.schedule) {
            println!("=== {} ===", section.label);
            for item in section.items {
                print_card(controller, item.record, numbered.then_some(item.position));
            }
            println!();
        }
    } else {
        for record in order {
            print_card(controller, record, None);
        }
    }
}

fn print_card(controller: &OrderController, record: &Record, position: Option<usize>) {
    let slug = controller
        .shuffler()
        .scheme()
        .slug_for(&record.category)
        .unwrap_or("-");
    let prefix = position.map_or_else(|| "  -".to_string(), |pos| format!("{pos:>3}"));
    println!(
        "{prefix}. [{slug}] {} {} | {}",
        record.category, record.group, record.theme
    );
    println!("       {}", record.materials_url);
}

fn print_verification(controller: &OrderController) {
    let order = controller.current_order();
    let shuffler = controller.shuffler();
    let Some(blocks) = block_composition(&order, shuffler.scheme(), shuffler.block_count()) else {
        println!(
            "{} records cannot be split into {} equal blocks",
            order.len(),
            shuffler.block_count()
        );
        return;
    };
    let mut balanced = true;
    for block in &blocks {
        let counts: Vec<String> = block
            .counts
            .iter()
            .map(|entry| format!("{}={}", entry.category, entry.count))
            .collect();
        let status = if block.is_balanced() { "ok" } else { "UNBALANCED" };
        balanced &= block.is_balanced();
        println!(
            "block {}: {} unknown={} [{}]",
            block.block + 1,
            counts.join(" "),
            block.unknown,
            status
        );
    }
    println!();
    if balanced {
        println!("Every block holds one record per category.");
    } else {
        println!("Current order is not stratified.");
    }
}

fn parse_positive_usize(raw: &str) -> Result<usize, String> {
    let parsed = raw.parse::<usize>().map_err(|_| {
        format!(
            "Could not parse --block-count value '{}' as a positive integer",
            raw
        )
    })?;
    if parsed == 0 {
        return Err("--block-count must be greater than zero".to_string());
    }
    Ok(parsed)
}

fn parse_cli<T, I>(args: I) -> Result<Option<T>, Box<dyn Error>>
where
    T: Parser,
    I: IntoIterator,
    I::Item: Into<OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                Ok(None)
            }
            _ => Err(err.into()),
        },
    }
}
