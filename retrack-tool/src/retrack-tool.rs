#![allow(clippy::uninlined_format_args)]

mod logger;

use anyhow::Context;
use retrack::{backends, Flags, Match, Regex};
use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Instant,
};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "retrack-tool")]
struct Opt {
    /// The regular expression.
    pattern: String,

    /// Do not run the optimizer.
    #[structopt(long)]
    no_opt: bool,

    /// Dump the parsed pattern tree to stdout.
    #[structopt(long)]
    dump_ast: bool,

    /// Dump the optimized pattern tree to stdout.
    #[structopt(long)]
    dump_optimized_ast: bool,

    /// Dump the bytecode to stdout.
    #[structopt(long)]
    dump_bytecode: bool,

    /// The input values to match against.
    #[structopt(conflicts_with_all = &["bench", "file"])]
    inputs: Vec<String>,

    /// Match against the contents of a specified file.
    #[structopt(long, conflicts_with_all = &["bench", "inputs"])]
    file: Option<PathBuf>,

    /// Benchmark the matches of the specified file.
    #[structopt(long, conflicts_with_all = &["file", "inputs"])]
    bench: Option<PathBuf>,
}

fn format_match(r: &Match, input: &str) -> String {
    let mut result = format!("\"{}\" ({}..{})", &input[r.range()], r.start(), r.end());

    // Show capture groups if any exist
    if !r.captures.is_empty() {
        let captures: Vec<String> = r
            .captures
            .iter()
            .map(|cg| match cg {
                Some(range) => format!(
                    "\"{}\" ({}..{})",
                    &input[range.clone()],
                    range.start,
                    range.end
                ),
                None => "None".to_string(),
            })
            .collect();
        result.push_str(&format!(", captures: [{}]", captures.join(", ")));
    }
    result
}

fn exec_re_on_string(re: &Regex, input: &str) {
    let mut matches = re.find_iter(input);
    if let Some(res) = matches.next() {
        let count = 1 + matches.count();
        println!("Match: {}, total: {}", format_match(&res, input), count);
    } else {
        println!("No match");
    }
}

fn bench_re_on_path(re: &Regex, path: &Path) -> anyhow::Result<()> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let input = contents.as_str();
    // Warmup
    re.find_iter(input).count();
    let start = Instant::now();
    for _ in 0..25 {
        re.find_iter(input).count();
    }
    let duration = start.elapsed();
    println!("{} ms", duration.as_millis());
    Ok(())
}

fn init_logging() -> anyhow::Result<()> {
    let rustlog = env::var("RUST_LOG").unwrap_or_else(|_| String::new());
    let level = match &*rustlog {
        "" | "off" => log::LevelFilter::Off,
        "error" => log::LevelFilter::Error,
        "warn" => log::LevelFilter::Warn,
        "info" => log::LevelFilter::Info,
        "debug" => log::LevelFilter::Debug,
        "trace" => log::LevelFilter::Trace,
        unk => anyhow::bail!("unrecognized log level '{}'", unk),
    };
    logger::Logger::init()?;
    log::set_max_level(level);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    init_logging()?;
    let args = Opt::from_args();

    let flags = Flags {
        no_opt: args.no_opt,
    };
    let mut parsed = backends::try_parse(&args.pattern, flags)
        .with_context(|| format!("compiling {:?}", args.pattern))?;
    if args.dump_ast {
        println!("Pattern tree:\n{}", parsed.node);
    }

    if !flags.no_opt {
        backends::optimize(&mut parsed);
        if args.dump_optimized_ast {
            println!("Optimized pattern tree:\n{}", parsed.node);
        }
    }

    if args.dump_bytecode {
        println!("Bytecode:\n{}", backends::emit(&parsed));
    }

    let re = Regex::with_flags(&args.pattern, flags)?;
    if let Some(ref path) = args.file {
        let contents =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        exec_re_on_string(&re, contents.as_str());
    } else if let Some(ref path) = args.bench {
        bench_re_on_path(&re, path)?;
    } else {
        for input in args.inputs {
            exec_re_on_string(&re, &input);
        }
    }
    Ok(())
}
