mod logging;
mod ui;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use splitbill_core::{describe_balance, Ledger, DEFAULT_CURRENCY};
use std::io;
use std::panic;
use std::path::PathBuf;
use tracing::info;
use ui::{run_app, App};

#[derive(Parser, Debug)]
#[command(name = "splitbill")]
#[command(about = "Split bills with friends in the terminal", long_about = None)]
struct Args {
    /// Currency symbol shown before amounts
    #[arg(short, long, default_value = DEFAULT_CURRENCY)]
    currency: String,

    /// Start with no friends instead of the default roster
    #[arg(long)]
    empty: bool,

    /// Print the roster and balances without starting the TUI
    #[arg(long)]
    check: bool,

    /// Write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

fn cleanup_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(path) = &args.log_file {
        logging::init_file_logging(path, args.verbose)?;
    }

    let ledger = if args.empty {
        Ledger::new()
    } else {
        Ledger::seeded()
    };
    info!(friends = ledger.roster().len(), "ledger ready");

    // Check mode - print balances and exit
    if args.check {
        println!("{} friends:", ledger.roster().len());
        for friend in ledger.roster() {
            println!(
                "  - {} ({}): {}",
                friend.name,
                friend.id,
                describe_balance(&friend.name, friend.balance, &args.currency)
            );
        }
        return Ok(());
    }

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        cleanup_terminal();
        original_hook(panic_info);
    }));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let app = App::new(ledger, args.currency);
    let res = run_app(&mut terminal, app);

    // Restore terminal
    cleanup_terminal();
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}
