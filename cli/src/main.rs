//! unlayout CLI - rebuild sections and tables from fragment dumps

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use unlayout::{
    build_document, render, Document, FragmentDump, JsonFormat, Part, ReconstructOptions,
    TextOptions,
};

#[derive(Parser)]
#[command(name = "unlayout")]
#[command(author = "iyulab")]
#[command(version)]
#[command(
    about = "Rebuild sections, paragraphs and tables from positioned text fragments",
    long_about = None
)]
struct Cli {
    #[command(flatten)]
    reconstruct: ReconstructArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Clone)]
struct ReconstructArgs {
    /// Options file (JSON, see `unlayout config`)
    #[arg(long, global = true, value_name = "FILE", env = "UNLAYOUT_CONFIG")]
    config: Option<PathBuf>,

    /// Style id that marks table header fragments
    #[arg(long, global = true, value_name = "STYLE", env = "UNLAYOUT_HEADER_STYLE")]
    header_style: Option<String>,

    /// Classify unknown style ids from font names (Bold, Italic, Oblique)
    #[arg(long, global = true)]
    infer_styles: bool,

    /// Build documents one at a time
    #[arg(long, global = true)]
    sequential: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconstruct a fragment dump and print plain text
    Text {
        /// Input fragment dump ("-" for stdin)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Wrap bold/italic spans in markers
        #[arg(short, long)]
        markup: bool,

        /// Print the depth of each section
        #[arg(short, long)]
        depths: bool,
    },

    /// Reconstruct a fragment dump and print JSON
    Json {
        /// Input fragment dump ("-" for stdin)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Show structure statistics and diagnostics
    Info {
        /// Input fragment dump ("-" for stdin)
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Reconstruct many fragment dumps into a directory
    Batch {
        /// Input fragment dumps
        #[arg(value_name = "FILES", required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value = "json")]
        format: BatchFormat,
    },

    /// Print the effective options as JSON
    Config,

    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, ValueEnum)]
enum BatchFormat {
    /// Pretty JSON
    Json,
    /// Plain text
    Text,
}

impl BatchFormat {
    fn extension(self) -> &'static str {
        match self {
            BatchFormat::Json => "json",
            BatchFormat::Text => "txt",
        }
    }
}

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = load_options(&cli.reconstruct).and_then(|options| match cli.command {
        Some(Commands::Text {
            input,
            output,
            markup,
            depths,
        }) => {
            let text_options = TextOptions::new().with_markup(markup).with_depth(depths);
            cmd_text(&input, output.as_deref(), &options, &text_options)
        }
        Some(Commands::Json {
            input,
            output,
            compact,
        }) => cmd_json(&input, output.as_deref(), compact, &options),
        Some(Commands::Info { input }) => cmd_info(&input, &options),
        Some(Commands::Batch {
            inputs,
            output,
            format,
        }) => cmd_batch(&inputs, &output, format, &options),
        Some(Commands::Config) => cmd_config(&options),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            println!("{}", "Usage: unlayout <COMMAND> <FILE>".yellow());
            println!("       unlayout --help for more information");
            Ok(())
        }
    });

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

/// Options file first, then command-line overrides.
fn load_options(args: &ReconstructArgs) -> CliResult<ReconstructOptions> {
    let mut options = match &args.config {
        Some(path) => {
            log::debug!("loading options from {}", path.display());
            ReconstructOptions::from_json(&fs::read_to_string(path)?)?
        }
        None => ReconstructOptions::default(),
    };

    if let Some(style) = &args.header_style {
        options = options.with_table_header_style(style.clone());
    }
    if args.infer_styles {
        options.styles = options.styles.with_name_inference(true);
    }
    if args.sequential {
        options = options.sequential();
    }
    Ok(options)
}

fn load_document(input: &Path, options: &ReconstructOptions) -> CliResult<Document> {
    let dump = if input == Path::new("-") {
        FragmentDump::from_reader(io::stdin().lock())?
    } else {
        FragmentDump::from_path(input)?
    };
    let doc = build_document(&dump, options)?;

    for diagnostic in &doc.diagnostics {
        eprintln!("{}: {}", "Warning".yellow().bold(), diagnostic);
    }
    Ok(doc)
}

fn write_output(output: Option<&Path>, content: &str) -> CliResult<()> {
    if let Some(path) = output {
        fs::write(path, content)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", content);
    }
    Ok(())
}

fn cmd_text(
    input: &Path,
    output: Option<&Path>,
    options: &ReconstructOptions,
    text_options: &TextOptions,
) -> CliResult<()> {
    let doc = load_document(input, options)?;
    let text = render::to_text(&doc, text_options)?;
    write_output(output, &text)
}

fn cmd_json(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
    options: &ReconstructOptions,
) -> CliResult<()> {
    let doc = load_document(input, options)?;

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };

    let json = render::to_json(&doc, format)?;
    write_output(output, &json)
}

fn cmd_info(input: &Path, options: &ReconstructOptions) -> CliResult<()> {
    let doc = load_document(input, options)?;

    println!("{}", "Document Structure".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Sections".bold(), doc.section_count());
    println!("{}: {}", "Paragraphs".bold(), doc.paragraph_count());
    println!("{}: {}", "Tables".bold(), doc.table_count());
    if let Some(depth) = doc.max_depth() {
        println!("{}: {}", "Heading levels".bold(), depth + 1);
    }

    let text = doc.plain_text();
    println!("{}: {}", "Words".bold(), text.split_whitespace().count());
    println!("{}: {}", "Characters".bold(), text.chars().count());

    let tables: Vec<_> = doc.parts().filter_map(Part::as_table).collect();
    if !tables.is_empty() {
        println!();
        println!("{}", "Tables".cyan().bold());
        println!("{}", "─".repeat(40).dimmed());
        for (i, table) in tables.iter().enumerate() {
            println!(
                "  {} {} columns, {} header rows, {} rows",
                format!("#{}", i + 1).bold(),
                table.column_count(),
                table.header_row_count(),
                table.row_count()
            );
        }
    }

    if !doc.diagnostics.is_empty() {
        println!();
        println!("{}: {}", "Diagnostics".yellow().bold(), doc.diagnostics.len());
    }

    Ok(())
}

fn cmd_batch(
    inputs: &[PathBuf],
    output_dir: &Path,
    format: BatchFormat,
    options: &ReconstructOptions,
) -> CliResult<()> {
    fs::create_dir_all(output_dir)?;

    let pb = ProgressBar::new(inputs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let process = |input: &Path| {
        let result = convert_one(input, output_dir, format, options);
        pb.inc(1);
        result
    };

    // Documents share no state, so each file can be built on its own thread
    let results: Vec<unlayout::Result<PathBuf>> = if options.parallel {
        inputs.par_iter().map(|input| process(input)).collect()
    } else {
        inputs.iter().map(|input| process(input)).collect()
    };

    pb.finish_with_message("Done!");

    let mut failed = 0;
    println!("\n{}", "Output files:".green().bold());
    for (input, result) in inputs.iter().zip(&results) {
        match result {
            Ok(path) => println!("  {} {}", "├─".dimmed(), path.display()),
            Err(e) => {
                failed += 1;
                println!("  {} {}: {}", "✗".red(), input.display(), e);
            }
        }
    }

    if failed > 0 {
        return Err(format!("{} of {} files failed", failed, inputs.len()).into());
    }
    Ok(())
}

fn convert_one(
    input: &Path,
    output_dir: &Path,
    format: BatchFormat,
    options: &ReconstructOptions,
) -> unlayout::Result<PathBuf> {
    let dump = FragmentDump::from_path(input)?;
    let doc = build_document(&dump, options)?;
    let content = match format {
        BatchFormat::Json => render::to_json(&doc, JsonFormat::Pretty)?,
        BatchFormat::Text => render::to_text(&doc, &TextOptions::default())?,
    };

    let path = output_dir.join(output_name(input, format));
    fs::write(&path, content)?;
    log::info!("{} -> {}", input.display(), path.display());
    Ok(path)
}

fn output_name(input: &Path, format: BatchFormat) -> String {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    format!("{}.{}", stem, format.extension())
}

fn cmd_config(options: &ReconstructOptions) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(options)?);
    Ok(())
}

fn cmd_version() {
    println!("{} {}", "unlayout".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Section and table reconstruction from text fragments");
    println!();
    println!("License: MIT");
}
