//! substructure_accuracy - 指紋スクリーニングの精度を厳密な部分構造判定と比較する
//!
//! 入力 SD ファイルの各分子を元構造として登録し、非環単結合で切ったフラグメントを
//! 重複排除して集める。全 (フラグメント, 元構造) ペアについて指紋の包含判定と
//! 部分グラフ判定を行い、混同行列と正解率を出力する。
//!
//! # 使用方法
//!
//! ```bash
//! cargo run --release -p tools --bin substructure_accuracy -- \
//!   path data/actives.sdf data/decoys.sdf.gz \
//!   --threads 8 \
//!   --json summary.json
//! ```

use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::Parser;
use env_logger::Env;

use subscreen_chem::{
    ColorRefinementKeyer, ExhaustiveFragmenter, Molecule, SubgraphOracle, resolve_fingerprinter,
};
use subscreen_core::progress::format_hours;
use subscreen_core::{AccuracyReport, CancelToken, CorpusBuilder, Evaluator, count_records};
use tools::common::io::is_stdio;
use tools::config::{ConfigOverrides, RunConfig};
use tools::progress::ConsoleProgress;
use tools::source::SdfFileReader;
use tools::summary::RunSummary;
use tools::system::RunEnvironment;

#[derive(Parser)]
#[command(
    name = "substructure_accuracy",
    about = "Measure how well a fingerprint screen approximates exact substructure search"
)]
struct Cli {
    /// 指紋の種類（path / circular / element、別名 standard, default, ecfp）
    fingerprinter: String,

    /// 入力 SD ファイル（.gz 可、`-` は標準入力で単独指定のみ）
    #[arg(required = true, num_args = 1..)]
    inputs: Vec<PathBuf>,

    /// 設定ファイル（.toml / .yaml / .json）
    #[arg(long)]
    config: Option<PathBuf>,

    /// 並列スレッド数（0 = 自動、1 = 逐次評価）
    #[arg(short = 't', long)]
    threads: Option<usize>,

    /// フラグメントとして残す最小の重原子数
    #[arg(long)]
    min_fragment_atoms: Option<usize>,

    /// 指紋のビット幅
    #[arg(long)]
    fingerprint_width: Option<usize>,

    /// path 指紋のパス長（結合数）
    #[arg(long)]
    path_depth: Option<usize>,

    /// 正解率の小数桁数
    #[arg(long)]
    accuracy_digits: Option<u32>,

    /// 結果サマリを書き出す JSON ファイル（.gz なら圧縮）
    #[arg(long)]
    json: Option<PathBuf>,

    /// 保持する偽陰性ペアの件数
    #[arg(long)]
    max_false_negative_examples: Option<usize>,

    /// 進捗バーを表示しない
    #[arg(long)]
    no_progress: bool,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            threads: self.threads,
            min_fragment_atoms: self.min_fragment_atoms,
            fingerprint_width: self.fingerprint_width,
            path_depth: self.path_depth,
            accuracy_digits: self.accuracy_digits,
            max_false_negative_examples: self.max_false_negative_examples,
            no_progress: self.no_progress,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let started = Instant::now();
    let cli = Cli::parse();

    let config = RunConfig::resolve(cli.config.as_deref(), &cli.overrides())?;
    if cli.inputs.len() > 1 && cli.inputs.iter().any(is_stdio) {
        bail!("'-' (stdin) must be the only input");
    }
    for input in cli.inputs.iter().filter(|p| !is_stdio(p)) {
        if !input.is_file() {
            bail!("Input file not found: {}", input.display());
        }
    }

    let fingerprinter = resolve_fingerprinter(&cli.fingerprinter, &config.fingerprint_options())?;
    let keyer = ColorRefinementKeyer::new();
    let fragmenter = ExhaustiveFragmenter::new(config.min_fragment_atoms);
    let oracle = SubgraphOracle;

    if config.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(config.threads)
            .build_global()
            .unwrap_or_else(|e| log::warn!("Failed to set thread count: {e}"));
    }

    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupted!");
        handler_token.cancel();
    })
    .context("Failed to set Ctrl-C handler")?;

    let input_names: Vec<String> = cli.inputs.iter().map(|p| p.display().to_string()).collect();
    println!("Running: {} on {}", fingerprinter.name(), input_names.join(", "));
    log::debug!("config: {config:?}");

    print!("First counting the input structures...");
    std::io::stdout().flush()?;
    let reader = SdfFileReader::new();
    let total_records = count_records::<Molecule, _, _>(&reader, &cli.inputs)?;
    println!("done");
    log::info!("{total_records} input structures");

    let progress = ConsoleProgress::new(config.progress);
    let corpus = CorpusBuilder::<Molecule>::new(fingerprinter.as_ref(), &keyer, &fragmenter)
        .build_from_sources(&reader, &cli.inputs, total_records, &progress, &cancel)?;
    log::info!(
        "{} originals, {} fragments ({} pairs); stats: {:?}",
        corpus.originals.len(),
        corpus.fragments.len(),
        corpus.pair_count(),
        corpus.stats
    );

    let evaluator = Evaluator::<Molecule>::new(&oracle)
        .with_progress(&progress)
        .with_cancel(cancel.clone())
        .with_max_false_negative_examples(config.max_false_negative_examples);
    let outcome = if config.threads == 1 {
        evaluator.evaluate(&corpus)?
    } else {
        evaluator.evaluate_parallel(&corpus)?
    };

    let report = AccuracyReport::from_counters(outcome.counters, config.accuracy_digits);
    println!("{report}");
    for example in &outcome.false_negative_examples {
        log::info!("false negative: {} in {}", example.fragment, example.original);
    }

    if let Some(path) = &cli.json {
        let mut summary = RunSummary {
            environment: RunEnvironment::capture(),
            fingerprinter: fingerprinter.name().to_string(),
            inputs: cli.inputs.clone(),
            config: config.clone(),
            corpus: corpus.stats.clone(),
            originals: corpus.originals.len(),
            fragments: corpus.fragments.len(),
            report: report.clone(),
            false_negative_examples: outcome.false_negative_examples.clone(),
            duration_secs: 0.0,
        };
        summary.set_duration(started.elapsed());
        summary.save_json(path)?;
        log::info!("Summary written to {}", path.display());
    }

    println!("Complete run took: {} hours", format_hours(started.elapsed()));
    Ok(())
}
