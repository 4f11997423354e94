//! reflow CLI - reading order reconstruction for PDF layout geometry

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::thread;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use reflow::{
    Document, DocumentInput, JsonFormat, PageSelection, ProgressEvent, Reflow, TextOptions,
};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "reflow")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Rebuild reading order from PDF layout geometry", long_about = None)]
struct Cli {
    /// Input geometry JSON file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output file (stdout if not specified)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Log pass decisions at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the ordered document as JSON
    Order {
        /// Input geometry JSON file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// Write the ordered document as plain text
    Text {
        /// Input geometry JSON file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Separate pages with a marker line
        #[arg(long)]
        page_breaks: bool,

        /// Emit a placeholder line for images and figures
        #[arg(long)]
        media: bool,

        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// Show column, block and paragraph statistics
    Info {
        /// Input geometry JSON file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

#[derive(Args, Default)]
struct LayoutArgs {
    /// Page range (e.g., "1-10", "1,3,5")
    #[arg(long)]
    pages: Option<String>,

    /// Reject degenerate geometry instead of dropping it
    #[arg(long)]
    strict: bool,

    /// Lay out pages on a single thread
    #[arg(long)]
    sequential: bool,

    /// Do not join paragraphs across page breaks
    #[arg(long)]
    no_cross_page: bool,

    /// Keep running headers, footers and page numbers
    #[arg(long)]
    keep_artifacts: bool,
}

impl LayoutArgs {
    fn builder(&self) -> CliResult<Reflow> {
        let mut reflow = Reflow::new();
        if let Some(p) = &self.pages {
            let selection =
                PageSelection::parse(p).map_err(|e| format!("Invalid page range: {}", e))?;
            reflow = reflow.with_pages(selection);
        }
        if self.strict {
            reflow = reflow.strict();
        }
        if self.sequential {
            reflow = reflow.sequential();
        }
        if self.no_cross_page {
            reflow = reflow.without_cross_page_merge();
        }
        if self.keep_artifacts {
            reflow = reflow.keep_artifacts();
        }
        Ok(reflow)
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Order {
            input,
            output,
            compact,
            layout,
        }) => cmd_order(&input, output.as_deref(), compact, &layout),
        Some(Commands::Text {
            input,
            output,
            page_breaks,
            media,
            layout,
        }) => {
            let options = TextOptions::new()
                .with_page_breaks(page_breaks)
                .with_media_placeholders(media);
            cmd_text(&input, output.as_deref(), &options, &layout)
        }
        Some(Commands::Info { input }) => cmd_info(&input),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: order if input is provided
            if let Some(input) = cli.input {
                cmd_order(&input, cli.output.as_deref(), false, &LayoutArgs::default())
            } else {
                println!("{}", "Usage: reflow <FILE> [-o OUTPUT]".yellow());
                println!("       reflow --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn read_geometry(input: &Path) -> CliResult<DocumentInput> {
    let file = File::open(input)?;
    let geometry = serde_json::from_reader(BufReader::new(file))?;
    Ok(geometry)
}

/// Lay out a geometry file, driving a progress bar from the engine's page events.
fn layout(input: &Path, reflow: Reflow) -> CliResult<Document> {
    let geometry = read_geometry(input)?;

    let pb = ProgressBar::new(geometry.pages.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let (sender, receiver) = crossbeam_channel::unbounded();
    let reflow = reflow.with_progress(sender);

    let joined = thread::scope(|s| {
        let worker = s.spawn(move || reflow.process(geometry));
        for event in receiver.iter() {
            match event {
                ProgressEvent::PageDone { number, total } => {
                    pb.set_length(total as u64);
                    pb.set_message(format!("page {}", number));
                    pb.inc(1);
                }
            }
        }
        worker.join()
    });

    let result = joined.map_err(|_| "layout worker panicked")??;
    pb.finish_and_clear();
    Ok(result.into_document())
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

fn cmd_order(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
    args: &LayoutArgs,
) -> CliResult<()> {
    let doc = layout(input, args.builder()?)?;

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };

    let json = reflow::render::to_json(&doc, format)?;
    write_output(output, &json)
}

fn cmd_text(
    input: &Path,
    output: Option<&Path>,
    options: &TextOptions,
    args: &LayoutArgs,
) -> CliResult<()> {
    let doc = layout(input, args.builder()?)?;
    let text = reflow::render::to_text(&doc, options)?;
    write_output(output, &text)
}

fn cmd_info(input: &Path) -> CliResult<()> {
    let doc = layout(input, Reflow::new())?;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Pages".bold(), doc.page_count());

    println!();
    println!("{}", "Pages".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    for page in &doc.pages {
        let columns = page.columns.len().max(1);
        let mut line = format!(
            "{:>5}  {} col  {} blocks  {} paragraphs",
            page.number,
            columns,
            page.reading_block_count(),
            page.paragraphs().count()
        );
        if let Some(label) = &page.label {
            line.push_str(&format!("  label {}", label));
        }
        if page.reference_page {
            println!("{}  {}", line, "reference".yellow());
        } else {
            println!("{}", line);
        }
    }

    println!();
    println!("{}", "Diagnostics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    for (name, count) in doc.diagnostics.entries() {
        let value = count.to_string();
        let value = if count > 0 {
            value.yellow()
        } else {
            value.dimmed()
        };
        println!("{:<24}{}", name.bold(), value);
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "reflow".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Reading order reconstruction for PDF layout geometry");
    println!();
    println!("License: MIT");
}
