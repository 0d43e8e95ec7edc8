use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::WrapErr;

use cwfill::{find_fill, FillFailure, FillOptions, GridConfig, WordList};

#[derive(Debug, Parser)]
#[command(author, version, about = "Fill a crossword structure with words from a word list")]
struct Cli {
    /// Structure file: `_` for open cells, anything else for blocks
    structure: PathBuf,

    /// Word list with one word per line
    words: PathBuf,

    /// Also write the filled grid to this file
    output: Option<PathBuf>,

    /// Give up after this many seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Re-establish arc consistency after every choice
    #[arg(long)]
    maintain_arc_consistency: bool,

    /// Log more (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn failure_message(failure: FillFailure) -> &'static str {
    match failure {
        FillFailure::HardFailure => "No solution.",
        FillFailure::Timeout => "No solution found before the timeout.",
    }
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => simplelog::LevelFilter::Warn,
        1 => simplelog::LevelFilter::Info,
        _ => simplelog::LevelFilter::Debug,
    };
    simplelog::TermLogger::init(
        level,
        simplelog::Config::default(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )?;

    let grid_config = GridConfig::load(&cli.structure)?;
    let word_list = WordList::load(&cli.words)?;
    let options = FillOptions {
        timeout: cli.timeout.map(Duration::from_secs),
        maintain_arc_consistency: cli.maintain_arc_consistency,
    };

    let result = match find_fill(&grid_config, &word_list, &options) {
        Ok(result) => result,
        Err(failure) => {
            println!("{}", failure_message(failure));
            return Ok(());
        }
    };

    let display_grid = grid_config.render_grid(&word_list, &result.choices);
    log::info!("{:?}", result.statistics);
    println!("{}", display_grid);

    if let Some(output) = &cli.output {
        fs::write(output, &display_grid)
            .wrap_err_with(|| format!("failed to write {}", output.display()))?;
    }

    Ok(())
}
