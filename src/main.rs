//! `consentctl`: an operator CLI that exercises the consent component over
//! a file-backed storage area. Useful for checking what a stored record
//! resolves to under the current policy, and for trying a policy-version
//! bump without a browser.

use anyhow::Result;
use clap::{Parser, Subcommand};
use cookie_consent::banner::{BannerSpec, BannerSurface, ConsentBanner};
use cookie_consent::bridge::LogBridge;
use cookie_consent::location::PageLocation;
use cookie_consent::policy::Policy;
use cookie_consent::record::ConsentState;
use cookie_consent::store::{ConsentStore, FileStorage};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "consentctl")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory holding the stored record (the stand-in for the browser's
    /// storage area)
    #[arg(long, default_value = ".consent", global = true)]
    store_dir: PathBuf,

    /// Optional consent.yaml overriding the built-in policy
    #[arg(long, global = true)]
    policy: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the decision the stored record resolves to
    Status,
    /// Run the banner flow in the terminal
    Prompt {
        /// Treat the document as a nested section page rather than the
        /// site root
        #[arg(long)]
        nested: bool,
    },
    /// Delete the stored record
    Reset,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let policy = match &cli.policy {
        Some(path) => Policy::from_project_file(path)?,
        None => Policy::default(),
    };
    let mut store = ConsentStore::new(FileStorage::new(cli.store_dir.clone()), policy);
    match cli.command {
        Commands::Status => status(&store),
        Commands::Prompt { nested } => prompt(store, nested),
        Commands::Reset => {
            store.clear();
            Ok(())
        }
    }
}

fn describe(state: ConsentState) -> &'static str {
    match state {
        ConsentState::Granted => "granted",
        ConsentState::Denied => "denied",
        ConsentState::Unknown => "no decision",
    }
}

fn status(store: &ConsentStore<FileStorage>) -> Result<()> {
    println!("{}", describe(store.read()));
    Ok(())
}

/// Renders the banner as a terminal prompt. Unmounting a printed prompt is
/// a no-op; the decision line that follows it is the dismissal.
struct TerminalSurface;

impl BannerSurface for TerminalSurface {
    fn mount(&mut self, spec: &BannerSpec) {
        println!("{}", spec.message);
        println!("privacy policy: {}", spec.privacy_policy_href);
        print!("[y]es / [n]o: ");
        let _ = io::stdout().flush();
    }

    fn unmount(&mut self) {}
}

fn prompt(store: ConsentStore<FileStorage>, nested: bool) -> Result<()> {
    let location = match nested {
        true => PageLocation::Nested,
        false => PageLocation::SiteRoot,
    };
    let mut banner = ConsentBanner::new(store, TerminalSurface, Some(LogBridge), location);
    banner.maybe_show();
    if !banner.is_shown() {
        println!("already decided: {}", describe(banner.store().read()));
        return Ok(());
    }
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    match line.trim() {
        "y" | "yes" => banner.accept(),
        _ => banner.decline(),
    }
    println!("recorded: {}", describe(banner.store().read()));
    Ok(())
}
