//! textract-hocr CLI - Textract JSON to hOCR conversion tool

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;

use textract_hocr::{
    BlockIndex, BlockKind, ConvertOptions, Diagnostics, Document, Error, ErrorMode,
};

#[derive(Parser)]
#[command(name = "textract-hocr")]
#[command(version)]
#[command(about = "Convert AWS Textract JSON output to hOCR HTML", long_about = None)]
struct Cli {
    /// Input Textract JSON file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output hOCR file (stdout if not specified)
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert Textract JSON to hOCR
    Convert {
        /// Input Textract JSON file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output hOCR file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Page range (e.g. "3" or "2-5")
        #[arg(long)]
        pages: Option<String>,

        /// Source image or PDF to derive page dimensions from
        #[arg(long, value_name = "FILE")]
        source: Option<PathBuf>,

        /// Page width in pixels (overrides --source)
        #[arg(long, requires = "height")]
        width: Option<u32>,

        /// Page height in pixels (overrides --source)
        #[arg(long, requires = "width")]
        height: Option<u32>,

        /// Table rendering mode
        #[arg(long, value_enum, default_value = "flow")]
        table_mode: TableModeArg,

        /// Absorb input anomalies into warnings instead of failing
        #[arg(long)]
        lenient: bool,

        /// Fail instead of keeping the first-placed cell when table cells
        /// collide
        #[arg(long)]
        fail_on_conflict: bool,

        /// Render pages on one thread
        #[arg(long)]
        sequential: bool,
    },

    /// Show document information
    Info {
        /// Input Textract JSON file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum TableModeArg {
    /// Flat flow of lines inside an ocr_table div
    Flow,
    /// Real <table>/<tr>/<td> markup with spans
    Structural,
}

impl From<TableModeArg> for textract_hocr::TableMode {
    fn from(mode: TableModeArg) -> Self {
        match mode {
            TableModeArg::Flow => textract_hocr::TableMode::Flow,
            TableModeArg::Structural => textract_hocr::TableMode::Structural,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Convert {
            input,
            output,
            pages,
            source,
            width,
            height,
            table_mode,
            lenient,
            fail_on_conflict,
            sequential,
        }) => cmd_convert(ConvertArgs {
            input,
            output,
            pages,
            source,
            dimensions: width.zip(height),
            table_mode,
            lenient,
            fail_on_conflict,
            sequential,
        }),
        Some(Commands::Info { input }) => cmd_info(&input),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            if let Some(input) = cli.input {
                cmd_convert(ConvertArgs {
                    input,
                    output: cli.output,
                    pages: None,
                    source: None,
                    dimensions: None,
                    table_mode: TableModeArg::Flow,
                    lenient: false,
                    fail_on_conflict: false,
                    sequential: false,
                })
            } else {
                println!("{}", "Usage: textract-hocr <FILE> [OUTPUT]".yellow());
                println!("       textract-hocr --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(exit_code(&e));
    }
}

/// Error-to-exit-code mapping: page-range problems are 2, schema problems
/// are 3, unresolved table conflicts are 4, everything else is 1.
fn exit_code(err: &Error) -> i32 {
    match err {
        Error::PageOutOfRange(..) | Error::InvalidPageRange(_) => 2,
        Error::Schema(_) | Error::Json(_) => 3,
        Error::LayoutConflict { .. } => 4,
        _ => 1,
    }
}

struct ConvertArgs {
    input: PathBuf,
    output: Option<PathBuf>,
    pages: Option<String>,
    source: Option<PathBuf>,
    dimensions: Option<(u32, u32)>,
    table_mode: TableModeArg,
    lenient: bool,
    fail_on_conflict: bool,
    sequential: bool,
}

fn cmd_convert(args: ConvertArgs) -> textract_hocr::Result<()> {
    let mut options = ConvertOptions::new().with_table_mode(args.table_mode.into());

    if let Some(pages) = args.pages.as_deref() {
        let (first, last) = parse_pages(pages)?;
        options = options.with_page_range(first, last);
    }
    if let Some((width, height)) = args.dimensions {
        options = options.with_dimensions(width, height);
    }
    if let Some(source) = args.source {
        options = options.with_source_file(source);
    }
    if args.lenient {
        options = options.lenient();
    }
    if args.fail_on_conflict {
        options = options.fail_on_conflict();
    }
    if args.sequential {
        options = options.sequential();
    }

    let result = textract_hocr::convert_file_with_options(&args.input, &options)?;
    report_diagnostics(&result.diagnostics);

    match args.output {
        Some(path) => {
            fs::write(&path, &result.hocr)?;
            println!("{} {}", "Saved to".green(), path.display());
        }
        None => print!("{}", result.hocr),
    }

    Ok(())
}

/// Parse a page range argument: a single page ("3") or an inclusive
/// range ("2-5").
fn parse_pages(s: &str) -> textract_hocr::Result<(u32, u32)> {
    let invalid = || Error::InvalidPageRange(format!("cannot parse page range {:?}", s));
    if let Some((first, last)) = s.split_once('-') {
        let first = first.trim().parse().map_err(|_| invalid())?;
        let last = last.trim().parse().map_err(|_| invalid())?;
        Ok((first, last))
    } else {
        let page = s.trim().parse().map_err(|_| invalid())?;
        Ok((page, page))
    }
}

fn report_diagnostics(diagnostics: &Diagnostics) {
    for diagnostic in diagnostics.iter() {
        let location = match (diagnostic.page, diagnostic.block_id.as_deref()) {
            (Some(page), Some(id)) => format!(" [page {}, block {}]", page, id),
            (Some(page), None) => format!(" [page {}]", page),
            (None, Some(id)) => format!(" [block {}]", id),
            (None, None) => String::new(),
        };
        eprintln!(
            "{}{}: {}",
            "warning".yellow().bold(),
            location.dimmed(),
            diagnostic.message
        );
    }
    if !diagnostics.is_empty() {
        eprintln!(
            "{} {} recoverable {}",
            "Finished with".yellow(),
            diagnostics.len(),
            if diagnostics.len() == 1 {
                "anomaly"
            } else {
                "anomalies"
            }
        );
    }
}

fn cmd_info(input: &Path) -> textract_hocr::Result<()> {
    let document = Document::from_path(input)?;
    let mut diagnostics = Diagnostics::new();
    let index = BlockIndex::build(&document, ErrorMode::Lenient, &mut diagnostics)?;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "-".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Pages".bold(), index.page_count());
    println!("{}: {}", "Blocks".bold(), document.block_count());

    println!();
    println!("{}", "Block Counts".cyan().bold());
    println!("{}", "-".repeat(40).dimmed());
    for (label, kind) in [
        ("Lines", BlockKind::Line),
        ("Words", BlockKind::Word),
        ("Tables", BlockKind::Table),
        ("Cells", BlockKind::Cell),
    ] {
        println!(
            "{}: {}",
            label.bold(),
            index.blocks_of_kind(kind, None).len()
        );
    }

    if !diagnostics.is_empty() {
        println!();
        println!(
            "{}: {}",
            "Anomalies".yellow().bold(),
            diagnostics.len()
        );
    }

    Ok(())
}

fn cmd_version() {
    println!(
        "{} {}",
        "textract-hocr".cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("Textract JSON to hOCR conversion tool");
}
