//! vocalrt diagnostics
//!
//! Loads a configuration, wires the runtime services the way a synthesis
//! server would, and reports what it found:
//! 1. memory probe and output buffer placement
//! 2. allophone set for each requested locale
//! 3. audio formats the codec layer can produce

use anyhow::{Context, Result};
use log::{error, info};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use vocalrt::config::{Config, PropertySource};
use vocalrt::factory::ComponentRegistry;
use vocalrt::formats::{audio_file_format_types, StaticCodecRegistry};
use vocalrt::locale::Locale;
use vocalrt::memory::{DestinationSelector, MemoryPolicy, MemoryProbe};
use vocalrt::resource::{ResourceParser, ResourceResolver};
use vocalrt::startup::{ensure_started, Lifecycle, SystemLifecycle};
use vocalrt::voice::VoiceTable;

/// Property naming the memory probe descriptor
const MEMORY_PROBE_PROPERTY: &str = "runtime.memoryprobe";
/// Property naming the resource parser descriptor
const RESOURCE_PARSER_PROPERTY: &str = "runtime.resourceparser";

const USAGE: &str = "Usage: vocalrt [--debug] [--config <path>] [--locale <tag>]... [--start]";

struct Options {
    debug: bool,
    config: Option<PathBuf>,
    locales: Vec<String>,
    start: bool,
}

fn parse_args() -> std::result::Result<Options, String> {
    let mut options = Options {
        debug: false,
        config: None,
        locales: Vec::new(),
        start: false,
    };
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--debug" | "-d" => options.debug = true,
            "--start" => options.start = true,
            "--config" | "-c" => {
                let path = args.next().ok_or("--config needs a path")?;
                options.config = Some(PathBuf::from(path));
            }
            "--locale" | "-l" => {
                let tag = args.next().ok_or("--locale needs a tag")?;
                options.locales.push(tag);
            }
            "--help" | "-h" => return Err(USAGE.to_string()),
            other => return Err(format!("Unknown argument: {}\n{}", other, USAGE)),
        }
    }

    Ok(options)
}

fn main() {
    let options = match parse_args() {
        Ok(options) => options,
        Err(message) => {
            eprintln!("{}", message);
            process::exit(2);
        }
    };

    init_logging(options.debug);

    if let Err(e) = run(options) {
        error!("Fatal error: {:#}", e);
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

/// `--debug` sends everything to `vocalrt.log`; otherwise only errors,
/// unless `RUST_LOG` says more.
fn init_logging(debug: bool) {
    const LOG_FILE: &str = "vocalrt.log";

    let mut builder = if debug {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(LOG_FILE);
        let mut builder = env_logger::Builder::new();
        match file {
            Ok(file) => {
                builder
                    .filter_level(log::LevelFilter::Debug)
                    .target(env_logger::Target::Pipe(Box::new(file)));
            }
            Err(e) => {
                eprintln!("Cannot log to {}: {}", LOG_FILE, e);
                builder.filter_level(log::LevelFilter::Warn);
            }
        }
        builder
    } else {
        let mut builder = env_logger::Builder::new();
        builder
            .filter_level(log::LevelFilter::Error)
            .parse_default_env();
        builder
    };
    builder.init();

    if debug {
        info!("vocalrt {} diagnostics (debug logging)", vocalrt::VERSION);
    }
}

fn run(options: Options) -> Result<()> {
    let config = match &options.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("loading configuration")?;
    let config = Arc::new(config);
    println!("Configuration: {}", config.path().display());

    // Components named in the configuration
    let probe_descriptor = config.get_string(MEMORY_PROBE_PROPERTY, "vocalrt.memory.SystemMemory");
    let probe: Arc<dyn MemoryProbe> = ComponentRegistry::<dyn MemoryProbe>::with_builtins()
        .instantiate(&probe_descriptor, config.as_ref())?
        .into();
    let parser_descriptor =
        config.get_string(RESOURCE_PARSER_PROPERTY, "vocalrt.resource.JsonAllophoneParser");
    let parser: Arc<dyn ResourceParser> = ComponentRegistry::<dyn ResourceParser>::with_builtins()
        .instantiate(&parser_descriptor, config.as_ref())?
        .into();

    // Memory state and output placement
    let properties: Arc<dyn PropertySource> = config.clone();
    let policy = MemoryPolicy::global(properties.clone(), probe.clone());
    let selector = DestinationSelector::global(config.as_ref(), policy.clone());
    println!(
        "Memory: {} bytes available, threshold {} bytes{}",
        probe.available_memory(),
        policy.threshold(),
        if policy.is_very_low_memory() {
            " (very low)"
        } else if policy.is_low_memory() {
            " (low)"
        } else {
            ""
        }
    );
    let destination = selector
        .create_destination()
        .context("creating audio destination")?;
    println!(
        "Audio store: {} -> {}",
        selector.mode(),
        if destination.is_in_ram() { "memory" } else { "file" }
    );

    // Allophone sets per locale
    let resolver = ResourceResolver::new(properties, Arc::new(VoiceTable::new()), parser);
    for tag in &options.locales {
        let locale = Locale::parse(tag).with_context(|| format!("invalid locale '{}'", tag))?;
        match resolver.resolve_for_locale(&locale)? {
            Some(set) => println!(
                "Locale {}: allophone set {} from {} ({} allophones)",
                locale,
                set.name(),
                set.identifier(),
                set.len()
            ),
            None => println!("Locale {}: no allophone set configured", locale),
        }
    }

    let formats = audio_file_format_types(&StaticCodecRegistry::default());
    println!("Audio formats:\n{}", formats.trim_end());

    if options.start {
        let lifecycle = SystemLifecycle::new();
        ensure_started(&config, &lifecycle).context("starting system")?;
        println!("System state: {:?}", lifecycle.state());
    }

    Ok(())
}
