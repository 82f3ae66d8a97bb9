use clap::{Args, Parser, Subcommand};
use responsive_variants::config::{self, VariantConfig};
use responsive_variants::generate::{self, GenerateOptions};
use responsive_variants::markup::{self, Attributes, ImgOptions, PictureOptions};
use responsive_variants::naming;
use responsive_variants::output;
use responsive_variants::types::Format;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "responsive-variants")]
#[command(about = "Generate responsive image variants and the srcset markup that uses them")]
#[command(long_about = "\
Generate responsive image variants and the srcset markup that uses them

Variants are written next to their source by an external converter
(ImageMagick's `convert` unless configured otherwise):

  photos/
  ├── dawn.jpg
  ├── dawn_400w.webp      # <basename>_<width>w.<format>
  ├── dawn_800w.webp
  └── dawn_1200w.webp

Existing variants are skipped unless --force is given. The markup
commands (srcset, img, picture) only derive names and never touch disk.

Exit status: 0 when everything succeeded, 1 when some items failed,
2 on fatal errors (converter not found, invalid input, bad config).

Logging goes to stderr and is controlled by RUST_LOG (default: warn).
Run 'responsive-variants gen-config' to print a documented variants.toml.")]
#[command(version)]
struct Cli {
    /// Config file; missing is fine, stock defaults apply
    #[arg(long, default_value = config::CONFIG_FILENAME, global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

/// Width override shared by every command.
#[derive(Args, Clone)]
struct VariantArgs {
    /// Target widths, comma separated (e.g. 400,800,1200)
    #[arg(long, value_delimiter = ',')]
    widths: Option<Vec<u32>>,
}

#[derive(Args)]
struct GenerateArgs {
    /// Image file or directory to process
    path: PathBuf,

    #[command(flatten)]
    variant: VariantArgs,

    /// Output format (webp, avif, png, jpg, ...)
    #[arg(long)]
    format: Option<Format>,

    /// Encoder quality, 1-100
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=100))]
    quality: Option<u32>,

    /// Regenerate variants that already exist
    #[arg(long)]
    force: bool,

    /// Converter program (name on PATH or a path)
    #[arg(long)]
    converter: Option<String>,

    /// Per-conversion timeout in seconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    /// Print the summary as JSON instead of progress lines
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct MarkupArgs {
    /// Original image path or URL, as it should appear in the markup
    src: String,

    #[command(flatten)]
    variant: VariantArgs,

    /// `sizes` attribute value
    #[arg(long)]
    sizes: Option<String>,

    /// Extra attribute for the <img>, as name=value (repeatable)
    #[arg(long = "attr", value_parser = parse_attribute)]
    attrs: Vec<(String, String)>,
}

#[derive(Subcommand)]
enum Command {
    /// Generate variants for an image or a directory of images
    Generate(GenerateArgs),
    /// Print the srcset attribute value for an image
    Srcset {
        /// Original image path or URL
        src: String,
        #[command(flatten)]
        variant: VariantArgs,
        /// Output format
        #[arg(long)]
        format: Option<Format>,
    },
    /// Print an <img> element with srcset
    Img {
        #[command(flatten)]
        markup: MarkupArgs,
        /// Output format
        #[arg(long)]
        format: Option<Format>,
    },
    /// Print a <picture> element with one <source> per format
    Picture {
        #[command(flatten)]
        markup: MarkupArgs,
        /// Formats in preference order, comma separated (e.g. avif,webp)
        #[arg(long, value_delimiter = ',')]
        formats: Vec<Format>,
    },
    /// Print a stock variants.toml with all options documented
    GenConfig,
}

fn parse_attribute(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) => Ok((name.to_string(), value.to_string())),
        None => Ok((raw.to_string(), String::new())),
    }
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let load = || config::load_config(&cli.config);

    match cli.command {
        Command::Generate(args) => return run_generate(args, load()?),
        Command::Srcset {
            src,
            variant,
            format,
        } => {
            let mut config = load()?;
            apply_widths(&mut config, &variant);
            let format = format.unwrap_or_else(|| config.format.clone());
            println!("{}", naming::srcset(&src, &config.widths, &format)?);
        }
        Command::Img { markup: args, format } => {
            let options = ImgOptions {
                widths: args.variant.widths,
                format,
                sizes: args.sizes,
            };
            let attrs: Attributes = args.attrs.into_iter().collect();
            let html = markup::img(&args.src, &attrs, &options, &load()?)?;
            println!("{}", html.into_string());
        }
        Command::Picture {
            markup: args,
            formats,
        } => {
            let options = PictureOptions {
                widths: args.variant.widths,
                formats,
                sizes: args.sizes,
            };
            let attrs: Attributes = args.attrs.into_iter().collect();
            let html = markup::picture(&args.src, &attrs, &options, &load()?)?;
            println!("{}", html.into_string());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn run_generate(
    args: GenerateArgs,
    mut config: VariantConfig,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    apply_widths(&mut config, &args.variant);
    if let Some(format) = args.format {
        config.format = format;
    }
    if let Some(quality) = args.quality {
        config.quality = quality;
    }
    if let Some(command) = args.converter {
        config.converter.command = command;
    }
    if let Some(secs) = args.timeout {
        config.converter.timeout_secs = secs;
    }

    init_thread_pool(&config.processing);
    let options = GenerateOptions {
        force: args.force,
        ..GenerateOptions::from_config(&config)
    };

    let summary = if args.json {
        generate::generate(&args.path, &options, &config.converter, None)?
    } else {
        let (tx, rx) = std::sync::mpsc::channel();
        let printer = std::thread::spawn(move || {
            for event in rx {
                output::print_generate_event(&event);
            }
        });
        let result = generate::generate(&args.path, &options, &config.converter, Some(tx));
        printer
            .join()
            .map_err(|_| "progress printer thread panicked")?;
        result?
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        output::print_summary(&summary);
    }

    Ok(if summary.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

fn apply_widths(config: &mut VariantConfig, variant: &VariantArgs) {
    if let Some(widths) = &variant.widths {
        config.widths = widths.clone();
    }
}

/// Log to stderr so stdout stays clean for markup and JSON.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
