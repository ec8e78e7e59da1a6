//! # tagfig demo application
//!
//! A sample CLI tool that shows how an application wires tagfig in. It is
//! not a real app; it exists to demonstrate and manually verify tagfig's
//! features.
//!
//! ## Running
//!
//! ```sh
//! cargo run --example tagfig_demo -- show
//! cargo run --example tagfig_demo -- --format toml gen
//! ```
//!
//! ## Features demonstrated
//!
//! | Feature                | How to exercise it                                                     |
//! |------------------------|------------------------------------------------------------------------|
//! | Compiled defaults      | `cargo run --example tagfig_demo -- show`                              |
//! | Config file overlay    | `cargo run --example tagfig_demo -- --file demo.yaml show`             |
//! | Strict decoding        | Add a typo to the file, then pass `--strict`                           |
//! | Template generation    | `cargo run --example tagfig_demo -- --format toml gen`                 |
//! | Key lookup             | `cargo run --example tagfig_demo -- get server.bind`                   |
//! | Listing                | `cargo run --example tagfig_demo -- --format json list`                |
//! | Field tree             | `cargo run --example tagfig_demo -- describe`                          |
//! | Versioned reloads      | `cargo run --example tagfig_demo -- reload a.yaml b.yaml --retain 1`   |
//! | Logging                | `RUST_LOG=tagfig=debug cargo run --example tagfig_demo -- show`        |

mod config;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use tagfig::{FieldInfo, Format, Tagfig, TagfigBuilder, TagfigError, VersionedCache};

use config::DemoConfig;

/// tagfig demo: a sample CLI app for showcasing tagfig.
#[derive(Parser, Debug)]
#[command(name = "tagfig-demo")]
struct Cli {
    /// Document format for files and output.
    #[arg(long, value_enum, global = true, default_value_t = DemoFormat::Yaml)]
    format: DemoFormat,

    /// Config file to overlay on the defaults.
    #[arg(long, global = true)]
    file: Option<PathBuf>,

    /// Reject documents containing unknown keys.
    #[arg(long, global = true)]
    strict: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DemoFormat {
    Json,
    Yaml,
    Toml,
}

impl From<DemoFormat> for Format {
    fn from(format: DemoFormat) -> Self {
        match format {
            DemoFormat::Json => Format::Json,
            DemoFormat::Yaml => Format::Yaml,
            DemoFormat::Toml => Format::Toml,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the resolved configuration as a document.
    Show,
    /// Generate a fully defaulted template.
    Gen {
        /// Write the template here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print one value by dotted key.
    Get { key: String },
    /// Print every value as dotted key-value pairs.
    List,
    /// Print the field tree with tags.
    Describe,
    /// Load each file in turn into a versioned cache.
    Reload {
        files: Vec<PathBuf>,
        /// Number of snapshots to keep.
        #[arg(long, default_value_t = 3)]
        retain: usize,
    },
}

fn make_builder(cli: &Cli) -> TagfigBuilder {
    Tagfig::builder()
        .format(cli.format.into())
        .strict(cli.strict)
}

fn resolve(builder: &TagfigBuilder, file: Option<&Path>) -> Result<DemoConfig, TagfigError> {
    match file {
        Some(path) => builder.load_file(path),
        None => builder.materialize(),
    }
}

fn print_tree(fields: &[FieldInfo], depth: usize) {
    for field in fields {
        let indent = "  ".repeat(depth);
        let default = field.tags.default.as_deref().unwrap_or("-");
        println!(
            "{indent}{} ({}) default={default} {}",
            field.tags.ident, field.type_name, field.tags.describe
        );
        print_tree(&field.children, depth + 1);
    }
}

fn reload(builder: &TagfigBuilder, files: &[PathBuf], retain: usize) -> Result<(), TagfigError> {
    let cache = VersionedCache::<DemoConfig>::new(retain);
    for path in files {
        match builder.load_file(path).and_then(|config| cache.load(config)) {
            Ok(version) => println!("{}: loaded as version {version}", path.display()),
            Err(e) => println!("{}: rejected: {e}", path.display()),
        }
    }
    println!("retained versions: {:?}", cache.versions());
    if let Some(current) = cache.get() {
        println!("current name: {}", current.name);
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), TagfigError> {
    let builder = make_builder(&cli);
    let file = cli.file.as_deref();

    match cli.command {
        Commands::Show => {
            let config = resolve(&builder, file)?;
            let bytes = builder.encode(&config)?;
            print!("{}", String::from_utf8_lossy(&bytes));
        }
        Commands::Gen { output } => {
            println!("{}", builder.template::<DemoConfig>(output.as_deref())?);
        }
        Commands::Get { key } => {
            let config = resolve(&builder, file)?;
            println!("{}", builder.get(&config, &key)?);
        }
        Commands::List => {
            let config = resolve(&builder, file)?;
            println!("{}", builder.list(&config)?);
        }
        Commands::Describe => print_tree(&builder.describe::<DemoConfig>()?, 0),
        Commands::Reload { files, retain } => reload(&builder, &files, retain)?,
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Config error:\n{e}");
        process::exit(1);
    }
}
