use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::Result;
use numfield_core::{FormatEngine, LocaleRegistry, RoundingPolicy};
use tracing_subscriber::EnvFilter;

mod config;
mod session;

use config::Config;

#[derive(Parser)]
#[command(version, about = "numfield - live locale-aware numeric field formatting", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Locale tag (e.g. en-US, de-DE, en-IN)
    #[arg(long, short, global = true, env = "NUMFIELD_LOCALE")]
    locale: Option<String>,

    /// Cursor policy when reformatting drops digits: clamp or compensate
    #[arg(long, global = true)]
    rounding: Option<RoundingPolicy>,

    /// Path to config file (defaults to <config dir>/numfield/config.kdl)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log edit-cycle details to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a number the way the field would display it
    Format {
        value: f64,
    },
    /// Leniently parse field text into a number
    Parse {
        text: String,
    },
    /// Simulate typing into a field, printing the field after every key
    ///
    /// `<` is backspace, `>` deletes forward, `!` clears, `{n}` moves the cursor.
    Type {
        keys: String,

        /// Text already in the field, cursor at its end
        #[arg(long, default_value = "")]
        initial: String,
    },
    /// List known locales and their symbols
    Locales,
}

fn main() -> Result<()> {
    init_miette();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::discover(cli.config.as_deref())?;
    let registry = config.registry();
    let tag = cli
        .locale
        .as_deref()
        .or(config.locale.as_deref())
        .unwrap_or("en-US");
    let profile = registry.resolve(tag)?;
    let policy = cli.rounding.or(config.rounding).unwrap_or_default();
    tracing::debug!("Using locale {} with {} rounding", profile.tag(), policy);

    match cli.command {
        Commands::Format { value } => {
            println!("{}", profile.format(value));
        }
        Commands::Parse { text } => {
            let engine = FormatEngine::new(profile);
            let result = engine.reformat(&text);
            match result.value {
                Some(value) => println!("{value}\t{}", result.text),
                None => println!("absent"),
            }
        }
        Commands::Type { keys, initial } => {
            let keys = session::parse_keys(&keys)?;
            for step in session::replay(profile, policy, &initial, &keys)? {
                println!("{step}");
            }
        }
        Commands::Locales => list_locales(&registry),
    }

    Ok(())
}

fn list_locales(registry: &LocaleRegistry) {
    for profile in registry.profiles() {
        println!(
            "{:<8} grouping {:<8} decimal {:<8} {:<8} {}",
            profile.tag(),
            symbol_name(profile.grouping_separator()),
            symbol_name(profile.decimal_marker()),
            profile.grouping(),
            profile.format(1234567.89),
        );
    }
}

fn symbol_name(c: char) -> String {
    match c {
        '\u{a0}' => "NBSP".to_string(),
        '\u{202f}' => "NNBSP".to_string(),
        ' ' => "SPACE".to_string(),
        c => format!("{c:?}"),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn init_miette() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .with_cause_chain()
                .color(true)
                .context_lines(5)
                .tab_width(2)
                .break_words(true)
                .build(),
        )
    }))
    .expect("couldn't set the miette hook");
    miette::set_panic_hook();
}
