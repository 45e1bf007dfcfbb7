use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use dbpe::normalize::normalize_line;
use dbpe::{
    fetch, FetchConfig, FetchOutcome, FetchProgress, HuggingFaceBpe, PipelineArtifacts,
    PipelineConfig, SubwordTokenizer, TrainingPipeline,
};
use env_logger::Env;
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use serde::Deserialize;
use serde_json::json;

#[derive(Parser, Debug)]
#[command(author, version, about = "Devanagari BPE toolkit", long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Decrease verbosity (-q, -qq)
    #[arg(short = 'q', long, global = true, action = ArgAction::Count)]
    quiet: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the full fetch/normalize/train/evaluate pipeline
    Train(TrainArgs),
    /// Download the raw corpus without training
    Fetch(FetchArgs),
    /// Encode a line of text with a trained tokenizer
    Encode(EncodeArgs),
    /// Decode token ids back into text
    Decode(DecodeArgs),
    /// Inspect encoder configuration metadata
    Info(InfoArgs),
}

#[derive(Args, Debug)]
struct TrainArgs {
    /// Raw corpus file (download destination when --url is given)
    #[arg(long, value_name = "PATH", default_value = dbpe::config::DEFAULT_RAW_CORPUS)]
    corpus: PathBuf,

    /// Source URL for the raw corpus
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// Download ceiling in bytes
    #[arg(long, value_name = "BYTES")]
    max_bytes: Option<u64>,

    /// Output directory for all artifacts
    #[arg(short, long, value_name = "DIR", default_value = dbpe::config::DEFAULT_OUTPUT_DIR)]
    output: PathBuf,

    /// Maximum number of sampled lines
    #[arg(long, value_name = "COUNT")]
    sample_size: Option<usize>,

    /// Maximum source lines to scan while sampling
    #[arg(long, value_name = "COUNT")]
    max_lines: Option<usize>,

    /// Target vocabulary size
    #[arg(long, value_name = "SIZE")]
    vocab_size: Option<usize>,

    /// Minimum frequency for merges
    #[arg(long, value_name = "COUNT")]
    min_frequency: Option<u32>,

    /// Replace the reserved special tokens (repeat flag)
    #[arg(long = "special-token", value_name = "TOKEN")]
    special_tokens: Vec<String>,

    /// Compression ratio acceptance floor
    #[arg(long, value_name = "RATIO")]
    compression_floor: Option<f64>,

    /// Skip the encode/decode smoke test
    #[arg(long)]
    no_smoke_test: bool,

    /// Disable trainer progress output
    #[arg(long)]
    no_progress: bool,
}

#[derive(Args, Debug)]
struct FetchArgs {
    /// Source URL for the raw corpus
    #[arg(value_name = "URL")]
    url: String,

    /// Destination file
    #[arg(short, long, value_name = "PATH", default_value = dbpe::config::DEFAULT_RAW_CORPUS)]
    output: PathBuf,

    /// Download ceiling in bytes
    #[arg(long, value_name = "BYTES")]
    max_bytes: Option<u64>,
}

#[derive(Args, Debug)]
struct EncodeArgs {
    /// Encoder configuration to load
    #[arg(short = 'm', long, value_name = "PATH")]
    tokenizer: PathBuf,

    /// Text to encode
    #[arg(value_name = "TEXT")]
    text: String,

    /// Emit machine-readable JSON instead of human-readable output
    #[arg(long)]
    json: bool,

    /// Encode the text verbatim instead of normalizing it first
    #[arg(long)]
    no_normalize: bool,
}

#[derive(Args, Debug)]
struct DecodeArgs {
    /// Encoder configuration to load
    #[arg(short = 'm', long, value_name = "PATH")]
    tokenizer: PathBuf,

    /// Token ids to decode
    #[arg(value_name = "ID", required = true)]
    ids: Vec<u32>,
}

#[derive(Args, Debug)]
struct InfoArgs {
    /// Encoder configuration to inspect
    #[arg(short = 'm', long, value_name = "PATH")]
    tokenizer: PathBuf,

    /// Emit machine-readable JSON summary
    #[arg(long)]
    json: bool,
}

#[derive(Deserialize)]
struct EncoderFile {
    model: ModelSection,
    #[serde(default)]
    added_tokens: Vec<AddedTokenEntry>,
}

#[derive(Deserialize)]
struct ModelSection {
    #[serde(rename = "type")]
    kind: String,
    vocab: serde_json::Map<String, serde_json::Value>,
    merges: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct AddedTokenEntry {
    content: String,
    #[serde(default)]
    special: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Train(args) => run_train(args),
        Commands::Fetch(args) => run_fetch(args),
        Commands::Encode(args) => run_encode(args),
        Commands::Decode(args) => run_decode(args),
        Commands::Info(args) => run_info(args),
    }
}

fn init_logging(verbose: u8, quiet: u8) {
    use log::LevelFilter;

    let level = if quiet > 0 {
        match quiet {
            1 => LevelFilter::Warn,
            _ => LevelFilter::Error,
        }
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    builder.format_timestamp_millis();
    builder.filter_level(level);
    let _ = builder.try_init();
}

fn run_train(args: TrainArgs) -> Result<()> {
    let mut builder = PipelineConfig::builder()
        .raw_corpus(args.corpus)
        .output_dir(args.output)
        .sample_size(args.sample_size)
        .max_lines(args.max_lines)
        .show_progress(!args.no_progress);
    if let Some(url) = args.url {
        builder = builder.corpus_url(url);
    }
    if let Some(max_bytes) = args.max_bytes {
        builder = builder.max_corpus_bytes(max_bytes);
    }
    if let Some(vocab_size) = args.vocab_size {
        builder = builder.vocab_size(vocab_size);
    }
    if let Some(min_frequency) = args.min_frequency {
        builder = builder.min_frequency(min_frequency);
    }
    if !args.special_tokens.is_empty() {
        builder = builder.special_tokens(args.special_tokens);
    }
    if let Some(floor) = args.compression_floor {
        builder = builder.compression_floor(floor);
    }
    if args.no_smoke_test {
        builder = builder.smoke_sentence(None);
    }
    let cfg = builder.build()?;

    let pipeline = TrainingPipeline::new(cfg);
    let artifacts: PipelineArtifacts<HuggingFaceBpe> = if pipeline.config().corpus_url.is_some() {
        let bar = download_bar(pipeline.config().fetch.max_bytes);
        let ceiling = pipeline.config().fetch.max_bytes;
        let result = pipeline.run_with_progress(|progress: FetchProgress| {
            if let Some(total) = progress.expected_total {
                bar.set_length(total.min(ceiling));
            }
            bar.set_position(progress.bytes_on_disk);
        });
        bar.finish_and_clear();
        result.context("pipeline run failed")?
    } else {
        pipeline.run().context("pipeline run failed")?
    };

    println!(
        "✅ wrote tokenizer with vocab {} to {}",
        artifacts.tokenizer.vocab_size(),
        artifacts.encoder_path.display()
    );
    for path in &artifacts.model_paths {
        println!("   model file {}", path.display());
    }
    let compression = artifacts.compression;
    println!(
        "   compression ratio {:.2} ({} chars / {} tokens)",
        compression.ratio, compression.total_chars, compression.total_tokens
    );
    if compression.meets_floor() {
        println!("   meets the {:.1} compression floor", compression.floor);
    } else {
        println!(
            "⚠️  compression ratio is below the required {:.1} floor",
            compression.floor
        );
    }
    if let Some(trip) = &artifacts.round_trip {
        println!("🧪 smoke test: {:?}", trip.input);
        println!("   ids    : {:?}", trip.ids);
        println!("   tokens : {:?}", trip.tokens);
        println!("   decoded: {:?}", trip.decoded);
    }

    Ok(())
}

fn run_fetch(args: FetchArgs) -> Result<()> {
    let mut cfg = FetchConfig::default();
    if let Some(max_bytes) = args.max_bytes {
        cfg.max_bytes = max_bytes;
    }

    let bar = download_bar(cfg.max_bytes);
    let ceiling = cfg.max_bytes;
    let outcome = fetch::fetch_corpus(&args.url, &args.output, &cfg, |progress| {
        if let Some(total) = progress.expected_total {
            bar.set_length(total.min(ceiling));
        }
        bar.set_position(progress.bytes_on_disk);
    });
    bar.finish_and_clear();

    match outcome.with_context(|| format!("failed to fetch {}", args.url))? {
        FetchOutcome::AlreadyComplete => {
            println!(
                "✅ {} already satisfies the byte ceiling; nothing fetched",
                args.output.display()
            );
        }
        FetchOutcome::Fetched { appended } => {
            println!(
                "✅ appended {appended} bytes to {}",
                args.output.display()
            );
        }
    }
    Ok(())
}

fn run_encode(args: EncodeArgs) -> Result<()> {
    let tokenizer = HuggingFaceBpe::load(&args.tokenizer)
        .with_context(|| format!("failed to load tokenizer from {}", args.tokenizer.display()))?;

    let text = if args.no_normalize {
        args.text
    } else {
        normalize_line(&args.text)
    };
    let encoding = tokenizer.encode(&text)?;
    info!("encoded {} tokens", encoding.ids.len());

    if args.json {
        let record = json!({
            "text": text,
            "ids": encoding.ids,
            "tokens": encoding.tokens,
        });
        println!("{}", serde_json::to_string(&record)?);
    } else {
        println!("text  : {text}");
        println!(
            "ids   : {}",
            encoding
                .ids
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(" ")
        );
        println!("tokens: {}", encoding.tokens.join(" "));
    }
    Ok(())
}

fn run_decode(args: DecodeArgs) -> Result<()> {
    let tokenizer = HuggingFaceBpe::load(&args.tokenizer)
        .with_context(|| format!("failed to load tokenizer from {}", args.tokenizer.display()))?;
    let text = tokenizer.decode(&args.ids)?;
    println!("{text}");
    Ok(())
}

fn run_info(args: InfoArgs) -> Result<()> {
    let data = fs::read_to_string(&args.tokenizer)
        .with_context(|| format!("failed to read {}", args.tokenizer.display()))?;
    let parsed: EncoderFile =
        serde_json::from_str(&data).context("failed to parse encoder configuration")?;

    let special_tokens = parsed
        .added_tokens
        .iter()
        .filter(|token| token.special)
        .map(|token| token.content.clone())
        .collect::<Vec<_>>();
    let summary = json!({
        "path": args.tokenizer.display().to_string(),
        "model_type": parsed.model.kind,
        "vocab_size": parsed.model.vocab.len(),
        "merges": parsed.model.merges.len(),
        "special_tokens": special_tokens,
    });

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("Model type    : {}", parsed.model.kind);
        println!("Vocab size    : {}", parsed.model.vocab.len());
        println!("Merges        : {}", parsed.model.merges.len());
        if special_tokens.is_empty() {
            println!("Special tokens: (none)");
        } else {
            println!("Special tokens: {}", special_tokens.join(", "));
        }
    }
    Ok(())
}

fn download_bar(ceiling: u64) -> ProgressBar {
    let bar = ProgressBar::new(ceiling);
    let style = ProgressStyle::with_template("{bar:40.cyan/blue} {bytes}/{total_bytes} ({eta})")
        .expect("valid progress template");
    bar.set_style(style);
    bar
}
