use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use icarus::clean::{clean, CleanOptions, PipelinePreset};
use icarus::config::{PROGRESS_INTERVAL, WRITER_BUFFER_BYTES};
use icarus::models::CleanedArticle;
use icarus::reader::{DumpReader, RecordFilter};
use icarus::stats::RunStats;
use indicatif::ProgressBar;
use std::fs;
use std::io::{self, BufWriter, Read, Write};
use std::process::ExitCode;
use std::time::Instant;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "icarus")]
#[command(about = "Extract plain text from Wikipedia dumps")]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stream a dump file and write cleaned articles
    Extract(ExtractArgs),
    /// Clean a single wikitext document from a file or stdin
    Clean(CleanArgs),
}

#[derive(Clone, Copy, ValueEnum)]
enum PresetArg {
    Full,
    Basic,
}

impl From<PresetArg> for PipelinePreset {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::Full => PipelinePreset::Full,
            PresetArg::Basic => PipelinePreset::Basic,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// One JSON object per line: {"title": ..., "text": ...}
    Jsonl,
    /// Bare text with a blank line between articles
    Text,
}

#[derive(Args)]
struct CleanFlags {
    /// Fail an article on malformed markup instead of recovering
    #[arg(long)]
    strict: bool,

    /// Which pass list to run
    #[arg(long, value_enum, default_value_t = PresetArg::Full)]
    preset: PresetArg,

    /// Longest run of consecutive newlines kept (1 = no blank lines)
    #[arg(long, default_value_t = 1)]
    max_blank_lines: usize,

    /// Delete heading lines instead of keeping their text
    #[arg(long)]
    drop_headings: bool,

    /// Delete list and indent lines instead of keeping their text
    #[arg(long)]
    drop_lists: bool,
}

impl CleanFlags {
    fn options(&self) -> CleanOptions {
        CleanOptions {
            preset: self.preset.into(),
            strict: self.strict,
            max_blank_line_run: self.max_blank_lines,
            drop_headings: self.drop_headings,
            drop_lists: self.drop_lists,
        }
    }
}

#[derive(Args)]
struct ExtractArgs {
    /// Path to the Wikipedia dump file (.xml.bz2)
    #[arg(short, long)]
    input: String,

    /// Output file ("-" for stdout)
    #[arg(short, long, default_value = "-")]
    output: String,

    /// Treat the input as uncompressed XML
    #[arg(long)]
    raw_xml: bool,

    /// Limit number of articles to process (for testing)
    #[arg(long)]
    limit: Option<u64>,

    /// Skip Category: pages
    #[arg(long)]
    skip_categories: bool,

    /// Skip "(disambiguation)" pages
    #[arg(long)]
    skip_disambiguations: bool,

    /// Skip Template: pages
    #[arg(long)]
    skip_templates: bool,

    /// Skip Wikipedia: project pages
    #[arg(long)]
    skip_wikipedia: bool,

    /// Skip #REDIRECT pages
    #[arg(long)]
    skip_redirects: bool,

    /// Skip articles with fewer characters of raw text
    #[arg(long, default_value_t = 0)]
    min_chars: usize,

    /// Output record format
    #[arg(long, value_enum, default_value_t = OutputFormat::Jsonl)]
    format: OutputFormat,

    #[command(flatten)]
    clean: CleanFlags,
}

#[derive(Args)]
struct CleanArgs {
    /// Path to a wikitext file ("-" for stdin)
    #[arg(short, long, default_value = "-")]
    input: String,

    /// Title used in diagnostics
    #[arg(short, long, default_value = "N/A")]
    title: String,

    #[command(flatten)]
    clean: CleanFlags,
}

fn run_extract(args: ExtractArgs) -> Result<()> {
    let filter = RecordFilter {
        skip_categories: args.skip_categories,
        skip_disambiguations: args.skip_disambiguations,
        skip_templates: args.skip_templates,
        skip_wikipedia: args.skip_wikipedia,
        skip_redirects: args.skip_redirects,
        min_chars: args.min_chars,
    };
    let reader = DumpReader::open(&args.input, !args.raw_xml)?
        .with_filter(filter)
        .with_limit(args.limit);

    let sink: Box<dyn Write> = if args.output == "-" {
        Box::new(io::stdout().lock())
    } else {
        let file = fs::File::create(&args.output)
            .with_context(|| format!("Failed to create output file: {}", args.output))?;
        Box::new(file)
    };
    let mut writer = BufWriter::with_capacity(WRITER_BUFFER_BYTES, sink);

    let opts = args.clean.options();
    let mut stats = RunStats::default();
    let pb = ProgressBar::new_spinner();

    info!("Starting extraction from: {}", args.input);
    let start = Instant::now();

    for record in reader {
        let Some(raw) = record.text.as_deref() else {
            continue;
        };
        stats.record_read(raw.len());

        match clean(raw, &record.title, &opts) {
            Ok(text) => {
                write_article(&mut writer, args.format, &record.title, &text)?;
                stats.article_written(text.len());
            }
            Err(e) => {
                warn!(title = %record.title, error = %e, "cleaning failed, skipping article");
                stats.article_failed();
            }
        }

        if stats.records_read % PROGRESS_INTERVAL == 0 {
            pb.tick();
        }
    }

    pb.finish_and_clear();
    writer.flush().context("Failed to flush output")?;
    let duration = start.elapsed();
    info!(
        duration_secs = duration.as_secs_f64(),
        articles = stats.articles_written,
        "Extraction complete"
    );

    println!();
    println!("=== Summary ===");
    println!("Total time:         {:.2}s", duration.as_secs_f64());
    println!();
    println!("Articles read:      {}", stats.records_read);
    println!("Articles written:   {}", stats.articles_written);
    println!("Articles failed:    {}", stats.articles_failed);
    println!("Bytes in:           {}", stats.bytes_in);
    println!("Bytes out:          {}", stats.bytes_out);

    Ok(())
}

fn write_article(
    writer: &mut impl Write,
    format: OutputFormat,
    title: &str,
    text: &str,
) -> Result<()> {
    match format {
        OutputFormat::Jsonl => {
            serde_json::to_writer(&mut *writer, &CleanedArticle { title, text })?;
            writer.write_all(b"\n")?;
        }
        OutputFormat::Text => {
            writer.write_all(text.as_bytes())?;
            writer.write_all(b"\n\n")?;
        }
    }
    Ok(())
}

fn run_clean(args: CleanArgs) -> Result<()> {
    let raw = if args.input == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        buf
    } else {
        fs::read_to_string(&args.input)
            .with_context(|| format!("Failed to read input file: {}", args.input))?
    };

    let cleaned = clean(&raw, &args.title, &args.clean.options())?;
    io::stdout()
        .write_all(cleaned.as_bytes())
        .context("Failed to write stdout")?;
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    let result = match cli.command {
        Commands::Extract(args) => run_extract(args),
        Commands::Clean(args) => run_clean(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Error: {:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
