//! CLI entry point for the expected-value calculator.
//!
//! Usage:
//!   chutes-ev solve [<board.json> | --stdin | --blank] [options]
//!   chutes-ev validate [<board.json> | --stdin | --blank] [options]
//!   chutes-ev board [--blank]
//!
//! Without a board file the standard 100-square board is used.
//! Set `RUST_LOG=debug` to see solver details.

use std::fs;
use std::io::{self, BufWriter, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;

use chutes_ev::{cross_check, expected_values, Board, ExpectedValues, OverrunRule, ValidationConfig};

#[derive(Parser)]
#[command(name = "chutes-ev")]
#[command(about = "Expected number of spins to finish a Chutes and Ladders board")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve for the expected spins remaining from every square
    Solve {
        #[command(flatten)]
        board: BoardArgs,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Also print the finish square (always 0)
        #[arg(long)]
        include_finish: bool,
    },
    /// Cross-check EV(start) against a Monte Carlo simulation
    Validate {
        #[command(flatten)]
        board: BoardArgs,

        /// Number of simulated games
        #[arg(long, default_value = "100000")]
        trials: u64,

        /// RNG seed for the simulation
        #[arg(long, default_value = "24301")]
        seed: u64,

        /// Largest accepted difference between analytic and simulated EV
        #[arg(long, default_value = "0.5")]
        tolerance: f64,
    },
    /// Print a board as JSON, handy as a template for custom boards
    Board {
        #[command(flatten)]
        board: BoardArgs,
    },
}

#[derive(Args)]
struct BoardArgs {
    /// Path to board JSON file (defaults to the standard board)
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Read the board from stdin instead of a file
    #[arg(long, conflicts_with = "file")]
    stdin: bool,

    /// Use the standard track with no chutes or ladders
    #[arg(long, conflicts_with_all = ["file", "stdin"])]
    blank: bool,

    /// Override what happens to spins that overrun the finish
    #[arg(long, value_enum)]
    overrun: Option<OverrunArg>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OverrunArg {
    /// The spin counts but the player stays put
    Forfeit,
    /// The player spins again for free
    Respin,
}

impl From<OverrunArg> for OverrunRule {
    fn from(arg: OverrunArg) -> Self {
        match arg {
            OverrunArg::Forfeit => OverrunRule::Forfeit,
            OverrunArg::Respin => OverrunRule::Respin,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// `square ev` per line
    Table,
    Csv,
    Json,
}

/// One line of solve output
#[derive(Debug, Serialize)]
struct SquareOutput {
    square: u32,
    ev: f64,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Solve {
            board,
            format,
            include_finish,
        } => {
            let board = load_board(&board)?;
            let ev = expected_values(&board).context("Failed to compute expected values")?;
            write_values(&ev, format, include_finish)?;
        }
        Commands::Validate {
            board,
            trials,
            seed,
            tolerance,
        } => {
            let board = load_board(&board)?;
            let config = ValidationConfig {
                trials,
                seed,
                tolerance,
            };
            let check = cross_check(&board, &config).context("Monte Carlo cross-check failed")?;
            println!("{}", serde_json::to_string_pretty(&check)?);

            if !check.within_tolerance {
                std::process::exit(1);
            }
        }
        Commands::Board { board } => {
            let board = load_board(&board)?;
            println!("{}", serde_json::to_string_pretty(&board)?);
        }
    }

    Ok(())
}

fn load_board(args: &BoardArgs) -> Result<Board> {
    let mut board = if args.stdin {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read board from stdin")?;
        parse_board(&buffer)?
    } else if let Some(path) = &args.file {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read board file {}", path.display()))?;
        parse_board(&json).with_context(|| format!("In board file {}", path.display()))?
    } else if args.blank {
        Board::blank()
    } else {
        Board::standard()
    };

    if let Some(overrun) = args.overrun {
        board.overrun = overrun.into();
    }
    board.validate().context("Invalid board")?;

    log::info!(
        "board {}..{} with {}-position spinner, {} chutes, {} ladders, overrun {:?}",
        board.start,
        board.finish,
        board.spin_positions,
        board.chutes.len(),
        board.ladders.len(),
        board.overrun
    );
    Ok(board)
}

fn parse_board(json: &str) -> Result<Board> {
    serde_json::from_str(json).context("Error parsing board JSON")
}

fn write_values(ev: &ExpectedValues, format: OutputFormat, include_finish: bool) -> Result<()> {
    let mut rows: Vec<SquareOutput> = ev
        .iter()
        .map(|(square, ev)| SquareOutput { square, ev })
        .collect();
    if include_finish {
        rows.push(SquareOutput {
            square: ev.finish(),
            ev: 0.0,
        });
    }

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    match format {
        OutputFormat::Table => {
            for row in &rows {
                writeln!(out, "{} {}", row.square, row.ev)?;
            }
        }
        OutputFormat::Csv => {
            writeln!(out, "square,ev")?;
            for row in &rows {
                writeln!(out, "{},{}", row.square, row.ev)?;
            }
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &rows)?;
            writeln!(out)?;
        }
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chutes_ev::BoardError;

    fn file_args(path: PathBuf) -> BoardArgs {
        BoardArgs {
            file: Some(path),
            stdin: false,
            blank: false,
            overrun: None,
        }
    }

    #[test]
    fn test_invalid_board_keeps_board_error_in_chain() {
        let path = std::env::temp_dir().join(format!("chutes-ev-invalid-{}.json", std::process::id()));
        fs::write(&path, r#"{"start": 0, "finish": 10, "spinPositions": 0}"#).unwrap();
        let err = load_board(&file_args(path.clone())).unwrap_err();
        fs::remove_file(&path).unwrap();

        assert_eq!(err.to_string(), "Invalid board");
        let source = err
            .chain()
            .find_map(|e| e.downcast_ref::<BoardError>())
            .expect("board error in chain");
        assert_eq!(source, &BoardError::NoSpinPositions);
    }

    #[test]
    fn test_overrun_flag_overrides_board() {
        let args = BoardArgs {
            file: None,
            stdin: false,
            blank: true,
            overrun: Some(OverrunArg::Respin),
        };
        let board = load_board(&args).unwrap();
        assert_eq!(board.overrun, OverrunRule::Respin);
        assert!(board.chutes.is_empty());
    }
}
