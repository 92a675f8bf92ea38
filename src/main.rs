use std::fs::File;
use std::io::BufReader;

use clap::Parser;

use mesisim::config::CacheConfig;
use mesisim::io::get_reader;
use mesisim::simulator::{Mode, Report, Simulator};

#[derive(Parser, Debug)]
#[command(about = String::from("Trace-driven MESI last level cache simulator"))]
struct Args {
    /// Path to the trace file to replay
    trace: String,

    /// Suppress the per-access log; the Inspect operation dumps resident lines in this mode
    #[arg(short, long)]
    silent: bool,

    /// Path to a JSON cache geometry file; the reference geometry is used when omitted
    #[arg(short, long)]
    config: Option<String>,

    /// Also print the final statistics as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), String> {
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => {
            let config_file = File::open(path).map_err(|e| format!("Couldn't open the config file at path {path}: {e}"))?;
            serde_json::from_reader(BufReader::new(config_file)).map_err(|e| format!("Couldn't parse the config file: {e}"))?
        }
        None => CacheConfig::default(),
    };
    config.validate()?;
    let mode = if args.silent { Mode::Silent } else { Mode::Verbose };
    let trace_file = File::open(&args.trace).map_err(|e| format!("Couldn't open the trace file at path {}: {e}", args.trace))?;
    let trace_reader = get_reader(trace_file)?;
    let mut simulator = Simulator::new(&config, mode);
    simulator.replay(BufReader::new(trace_reader))?;
    let report = simulator.statistics().report();
    print_summary(&report);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report).map_err(|e| format!("Couldn't serialise the output {e}"))?);
    }
    Ok(())
}

fn print_summary(report: &Report) {
    println!("total accesses: {}", report.accesses);
    println!("reads:          {}", report.reads);
    println!("writes:         {}", report.writes);
    println!("hits:           {}", report.hits);
    println!("misses:         {}", report.misses);
    if let (Some(hit_ratio), Some(miss_ratio)) = (report.hit_ratio, report.miss_ratio) {
        println!("hit ratio:      {hit_ratio:.4}");
        println!("miss ratio:     {miss_ratio:.4}");
    }
}
