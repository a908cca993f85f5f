use chandas_core::persistence::{load_catalog, save_catalog};
use chandas_core::{
    AnalyzerConfig, ChandasEngine, InputScript, MatchResult, MeterCatalog, Result, ScoredMeter,
    VerseAnalysis,
};
use clap::{Parser, Subcommand, ValueEnum};
use crossterm::style::Stylize;
use std::io::{stdin, BufRead};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const SAMPLE_VERSE: &str = "वागर्थाविव संपृक्तौ वागर्थप्रतिपत्तये।\nजगतः पितरौ वन्दे पार्वतीपरमेश्वरौ॥";

/// CLI arguments
#[derive(Parser)]
#[command(name = "chandas")]
#[command(about = "Scan Sanskrit verse and identify its meter")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Meter catalog (.json, or a binary snapshot); the built-in one otherwise
    #[arg(short, long, env = "CHANDAS_CATALOG", global = true)]
    catalog: Option<PathBuf>,

    /// Analyzer settings as JSON
    #[arg(long, env = "CHANDAS_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Minimum score for a meter to count as identified
    #[arg(short, long, env = "CHANDAS_THRESHOLD", global = true)]
    threshold: Option<f64>,

    /// Script of the verse text
    #[arg(short, long, value_enum, global = true)]
    script: Option<ScriptArg>,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a verse and identify its meter
    Analyze {
        /// Verse text; lines separated by newlines
        #[arg(short, long)]
        verse: Option<String>,
        /// Read the verse from a file
        #[arg(short, long, conflicts_with = "verse")]
        file: Option<PathBuf>,
        /// Print the analysis as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the meters in the catalog
    Meters {
        #[arg(long)]
        json: bool,
    },
    /// Write the active catalog to a file
    ExportCatalog { path: PathBuf },
}

#[derive(Clone, Copy, ValueEnum)]
enum ScriptArg {
    Auto,
    Devanagari,
    Iast,
}

impl From<ScriptArg> for InputScript {
    fn from(arg: ScriptArg) -> Self {
        match arg {
            ScriptArg::Auto => InputScript::Auto,
            ScriptArg::Devanagari => InputScript::Devanagari,
            ScriptArg::Iast => InputScript::Iast,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => AnalyzerConfig::load(path)?,
        None => AnalyzerConfig::default(),
    };
    if let Some(threshold) = cli.threshold {
        config = config.with_threshold(threshold);
    }
    if let Some(script) = cli.script {
        config = config.with_script(script.into());
    }

    let catalog = match &cli.catalog {
        Some(path) => load_catalog(path)?,
        None => MeterCatalog::builtin()?,
    };
    let engine = ChandasEngine::new(catalog, config)?;

    match cli.command {
        Commands::Analyze { verse, file, json } => {
            let text = match (verse, file) {
                (Some(v), _) => v,
                (None, Some(path)) => std::fs::read_to_string(path)?,
                (None, None) => read_verse_from_stdin()?,
            };
            let text = if text.trim().is_empty() {
                eprintln!("{}", "No verse provided. Using a sample verse instead.".yellow());
                SAMPLE_VERSE.to_string()
            } else {
                text
            };
            let analysis = engine.analyze_text(&text);
            if json {
                println!("{}", serde_json::to_string_pretty(&analysis)?);
            } else {
                print_analysis(&analysis);
            }
        }
        Commands::Meters { json } => {
            let meters = engine.list_meters();
            if json {
                println!("{}", serde_json::to_string_pretty(&meters)?);
            } else {
                for m in meters {
                    let lengths: Vec<String> = m.quarter_lengths.iter().map(|l| l.to_string()).collect();
                    println!(
                        "{:<20} {:?} [{}]  {}",
                        m.name.bold(),
                        m.class,
                        lengths.join(", "),
                        m.description.unwrap_or_default()
                    );
                }
            }
        }
        Commands::ExportCatalog { path } => {
            save_catalog(engine.catalog(), &path)?;
            println!("Catalog written to '{}'", path.display());
        }
    }
    Ok(())
}

/// Reads lines until a blank one.
fn read_verse_from_stdin() -> Result<String> {
    eprintln!("Enter the verse (a blank line ends input):");
    let mut lines = Vec::new();
    for line in stdin().lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            break;
        }
        lines.push(line);
    }
    Ok(lines.join("\n"))
}

fn section(title: &str) {
    println!("\n{}", title.blue().bold());
    println!("{}", "-".repeat(title.chars().count()).blue());
}

fn print_analysis(analysis: &VerseAnalysis) {
    section("Syllable Breakdown");
    for line in &analysis.lines {
        println!("Line {}: {}", line.index + 1, line.text);
        println!(
            "  Syllables ({}): {}",
            line.syllables.len(),
            line.syllable_texts().join(", ").bold()
        );
        println!("  Pattern: {}", line.weights.pattern().cyan());
    }

    let stats = &analysis.statistics;
    section("Metrical Statistics");
    println!("Total syllables: {}", stats.total_syllables);
    println!("Guru (heavy) syllables: {}", stats.guru);
    println!("Laghu (light) syllables: {}", stats.laghu);
    println!("Guru percentage: {:.2}%", stats.guru_percentage());

    section("Meter Identification");
    match &analysis.result {
        MatchResult::Identified(m) => {
            println!("{} {}", "Meter:".green(), m.name.as_str().green().bold());
            println!("{}", format!("Confidence: {:.0}%", m.score * 100.0).green());
            print_scores(m);
        }
        MatchResult::Unidentified { closest: Some(c) } => {
            println!("{}", "No meter identified.".yellow());
            println!(
                "{}",
                format!("Closest candidate: {} ({:.0}%)", c.name, c.score * 100.0).yellow()
            );
            print_scores(c);
            for miss in &c.mismatches {
                println!(
                    "  line {}, syllable {}: expected {}, found {}",
                    miss.line + 1,
                    miss.line_position + 1,
                    miss.expected.symbol(),
                    miss.observed
                );
            }
        }
        MatchResult::Unidentified { closest: None } => {
            println!("{}", "No known meter matched.".yellow());
        }
    }

    if !analysis.diagnostics.is_empty() {
        section("Diagnostics");
        for d in &analysis.diagnostics {
            println!("{}", d.to_string().dark_yellow());
        }
    }
}

fn print_scores(meter: &ScoredMeter) {
    for l in &meter.line_scores {
        println!("  line {}: {:.0}%", l.line + 1, l.score * 100.0);
    }
    for q in &meter.quarters {
        println!(
            "  quarter {} (line {}): {:.0}% [{} of {} syllables]",
            q.quarter + 1,
            q.line + 1,
            q.score * 100.0,
            q.observed_len,
            q.expected_len
        );
    }
}
