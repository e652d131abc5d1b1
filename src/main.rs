//! PDF tree explorer command-line interface
//!
//! Opens a document, prints its object tree, optionally activates nodes to
//! expand references, and previews, exports or saves on request.

use std::{path::PathBuf, process};

use clap::{Arg, ArgAction, ArgMatches, Command};
use pdftree::{
    Error, Explorer, ExplorerConfig, ExplorerWorker, Logger, LopdfAnalyzer, NodeId, Result,
    TreeFormat, TreeFormatter, UtilityConfig,
};
use tracing::{debug, error, info, warn};

fn build_cli() -> Command {
    Command::new("pdftree")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Explore the object tree of a PDF document")
        .long_about(
            "Prints a PDF document as a tree of dictionaries, arrays and values. \
             Indirect references are expanded on activation, and object streams \
             can be previewed or exported.",
        )
        // Input
        .arg(Arg::new("input")
            .short('i')
            .long("input")
            .value_name("FILE")
            .help("Input PDF file path")
            .required(true))
        .arg(Arg::new("mode")
            .long("mode")
            .value_parser(["pages", "whole"])
            .help("Build the tree from page dictionaries or from the whole object table"))

        // Configuration
        .arg(Arg::new("config")
            .short('c')
            .long("config")
            .value_name("FILE")
            .help("Configuration file (JSON/YAML)"))
        .arg(Arg::new("set")
            .long("set")
            .value_name("KEY=VALUE")
            .action(ArgAction::Append)
            .help("Override a configuration key"))
        .arg(Arg::new("verbose")
            .short('v')
            .long("verbose")
            .value_parser(["error", "warn", "info", "debug", "trace"])
            .help("Log level"))

        // Navigation
        .arg(Arg::new("activate")
            .long("activate")
            .value_name("ID")
            .value_parser(clap::value_parser!(usize))
            .action(ArgAction::Append)
            .help("Activate a node by id before printing (repeatable)"))
        .arg(Arg::new("no-auto-resolve")
            .long("no-auto-resolve")
            .action(ArgAction::SetTrue)
            .help("Do not expand references on activation"))

        // Output
        .arg(Arg::new("depth")
            .long("depth")
            .value_name("N")
            .value_parser(clap::value_parser!(usize))
            .help("Print at most N levels below the roots"))
        .arg(Arg::new("format")
            .short('f')
            .long("format")
            .value_parser(["text", "json"])
            .default_value("text")
            .help("Tree output format"))

        // Streams and saving
        .arg(Arg::new("stream")
            .long("stream")
            .value_name("OBJ")
            .value_parser(clap::value_parser!(u32))
            .help("Print a preview of an object's stream"))
        .arg(Arg::new("export")
            .long("export")
            .value_name("OBJ")
            .value_parser(clap::value_parser!(u32))
            .help("Write an object's stream to a file"))
        .arg(Arg::new("out")
            .short('o')
            .long("out")
            .value_name("PATH")
            .requires("export")
            .help("Export destination (default: <stem>_obj<OBJ>.txt)"))
        .arg(Arg::new("save")
            .long("save")
            .value_name("PATH")
            .help("Save the document to PATH"))
}

fn load_config(matches: &ArgMatches) -> Result<ExplorerConfig> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => ExplorerConfig::from_file(&PathBuf::from(path))?,
        None => ExplorerConfig::default(),
    };

    if let Some(overrides) = matches.get_many::<String>("set") {
        for entry in overrides {
            let (key, value) = entry
                .split_once('=')
                .ok_or_else(|| Error::ConfigError(format!("Expected KEY=VALUE, got {}", entry)))?;
            config.set(key.trim(), value.trim().to_string())?;
        }
    }
    if let Some(level) = matches.get_one::<String>("verbose") {
        config.set("log_level", level.clone())?;
    }
    Ok(config)
}

async fn run(matches: ArgMatches, config: ExplorerConfig) -> Result<()> {
    let input = PathBuf::from(
        matches
            .get_one::<String>("input")
            .map(String::as_str)
            .unwrap_or_default(),
    );
    let mode = match matches.get_one::<String>("mode") {
        Some(mode) => mode.parse()?,
        None => config.default_mode,
    };
    let format: TreeFormat = matches
        .get_one::<String>("format")
        .map(|f| f.parse())
        .transpose()?
        .unwrap_or_default();
    let auto_resolve = config.auto_resolve && !matches.get_flag("no-auto-resolve");

    let worker = ExplorerWorker::spawn(Explorer::new(LopdfAnalyzer::new(), config));
    let session = worker.open(input).await?;
    let mut tree = worker.build_tree(session.clone(), mode).await?;
    info!("Tree has {} root(s)", tree.roots().len());

    if let Some(ids) = matches.get_many::<usize>("activate") {
        for &id in ids {
            let (returned, outcome) = worker
                .activate(tree, NodeId(id), session.clone(), auto_resolve)
                .await?;
            tree = returned;
            match outcome {
                Ok(outcome) => debug!("Activated {}: {:?}", NodeId(id), outcome),
                Err(e) => warn!("Activation of {} failed: {}", NodeId(id), e),
            }
        }
    }

    let mut formatter = TreeFormatter::new();
    if let Some(&depth) = matches.get_one::<usize>("depth") {
        formatter = formatter.with_max_depth(depth);
    }
    print!("{}", formatter.format(&tree, format)?);

    if let Some(&object_index) = matches.get_one::<u32>("stream") {
        match worker.preview(session.clone(), object_index).await? {
            Some(preview) => {
                println!("--- object {} stream ({} bytes) ---", object_index, preview.total_bytes);
                print!("{}", preview.text);
                if preview.truncated {
                    println!("--- preview truncated ---");
                }
            }
            None => info!("Object {} has no stream", object_index),
        }
    }

    if let Some(&object_index) = matches.get_one::<u32>("export") {
        let destination = matches.get_one::<String>("out").map(PathBuf::from);
        match worker.export(session.clone(), object_index, destination).await? {
            Some(path) => info!("Exported object {} to {}", object_index, path.display()),
            None => info!("Object {} has no stream, nothing exported", object_index),
        }
    }

    if let Some(path) = matches.get_one::<String>("save") {
        worker.save(session.clone(), PathBuf::from(path)).await?;
        info!("Saved document to {}", path);
    }

    worker.close().await?;
    worker.shutdown().await
}

#[tokio::main]
async fn main() {
    let matches = build_cli().get_matches();

    let config = match load_config(&matches) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };
    Logger::with_level(&config.log_level).init();

    if let Err(e) = run(matches, config).await {
        error!("{}", e);
        process::exit(1);
    }
}
