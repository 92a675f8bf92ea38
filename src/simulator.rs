use std::io::BufRead;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::cache::{AccessOutcome, Cache, CoherenceState};
use crate::config::CacheConfig;
use crate::replacement_policies::TreePlru;

lazy_static! {
    // Operation code in decimal, address in hex with an optional 0x prefix. Anything after the
    // two fields is ignored
    static ref RECORD_PATTERN: Regex = Regex::new(r"^\s*(\d+)\s+(?:0[xX])?([0-9a-fA-F]{1,8})\b").unwrap();
}

/// One trace record: an operation code and the address it applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceRecord {
    pub code: u32,
    pub address: u32,
}

/// Parses one trace line, returning `None` for blank or malformed lines so the replay loop can
/// skip them without touching any state
pub fn parse_record(line: &str) -> Option<TraceRecord> {
    let caps = RECORD_PATTERN.captures(line)?;
    let code = caps[1].parse().ok()?;
    let address = u32::from_str_radix(&caps[2], 16).ok()?;
    Some(TraceRecord { code, address })
}

/// The operations a trace can request: the six coherence operations plus the two control
/// operations, which act on the whole cache instead of one line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    Write,
    SnoopRead,
    SnoopWrite,
    SnoopRwitm,
    SnoopUpgrade,
    Reset,
    Inspect,
}

impl Operation {
    /// The operation code contract. Codes 0 and 2 are both reads (data and instruction fetch);
    /// any code not listed here is ignored by the dispatcher
    pub fn from_code(code: u32) -> Option<Operation> {
        match code {
            0 | 2 => Some(Operation::Read),
            1 => Some(Operation::Write),
            3 => Some(Operation::SnoopRead),
            4 => Some(Operation::SnoopWrite),
            5 => Some(Operation::SnoopRwitm),
            6 => Some(Operation::SnoopUpgrade),
            8 => Some(Operation::Reset),
            9 => Some(Operation::Inspect),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Operation::Read => "read",
            Operation::Write => "write",
            Operation::SnoopRead => "snoop read",
            Operation::SnoopWrite => "snoop write",
            Operation::SnoopRwitm => "snoop rwitm",
            Operation::SnoopUpgrade => "snoop upgrade",
            Operation::Reset => "reset",
            Operation::Inspect => "inspect",
        }
    }
}

/// Whether each processed record is logged. The Inspect operation only dumps the cache contents
/// in silent mode; in verbose mode the per-access log already shows every line as it changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Verbose,
    Silent,
}

/// Aggregate counters for one replay. Reads and writes are the only operations counted as
/// accesses; hits and misses also move for snoops, which perform the same lookup. Reset leaves
/// all of these alone
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Statistics {
    pub accesses: u64,
    pub reads: u64,
    pub writes: u64,
    pub hits: u64,
    pub misses: u64,
}

/// The end-of-run report: the counters plus derived ratios. Can be serialised to the JSON output
/// format. The ratios are over all lookups and are omitted when the trace contained no reads or
/// writes at all
#[derive(Debug, Serialize, PartialEq)]
pub struct Report {
    pub accesses: u64,
    pub reads: u64,
    pub writes: u64,
    pub hits: u64,
    pub misses: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hit_ratio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub miss_ratio: Option<f64>,
}

impl Statistics {
    pub fn report(&self) -> Report {
        let lookups = self.hits + self.misses;
        let defined = self.accesses > 0;
        Report {
            accesses: self.accesses,
            reads: self.reads,
            writes: self.writes,
            hits: self.hits,
            misses: self.misses,
            hit_ratio: (defined).then(|| self.hits as f64 / lookups as f64),
            miss_ratio: (defined).then(|| self.misses as f64 / lookups as f64),
        }
    }
}

/// The dispatcher: owns the cache and the counters, maps operation codes onto the coherence
/// handlers, and replays traces record by record
///
/// All simulation state lives in this one object, so tests can drive it directly without any
/// process-level setup
pub struct Simulator {
    cache: Cache<TreePlru>,
    stats: Statistics,
    mode: Mode,
}

impl Simulator {
    /// Creates a simulator for a given geometry. The config should already be validated
    ///
    /// # Arguments
    ///
    /// * `config`: The cache geometry, usually resulting from parsing JSON
    /// * `mode`: Verbose per-access logging or silent operation
    ///
    /// returns: Simulator
    pub fn new(config: &CacheConfig, mode: Mode) -> Self {
        let num_sets = config.num_sets as usize;
        let num_ways = config.num_ways as usize;
        Self {
            cache: Cache::new(
                config.layout(),
                num_sets,
                num_ways,
                TreePlru::new(num_sets, num_ways),
            ),
            stats: Statistics::default(),
            mode,
        }
    }

    /// Replays every record the reader yields, in order, skipping malformed lines. A read error
    /// on the underlying trace is fatal and aborts the replay
    pub fn replay<R: BufRead>(&mut self, reader: R) -> Result<(), String> {
        for line in reader.lines() {
            let line = line.map_err(|e| format!("Couldn't read from the trace: {e}"))?;
            if let Some(record) = parse_record(&line) {
                self.apply(&record);
            }
        }
        Ok(())
    }

    /// Applies a single record: decompose, dispatch, count, log. Unrecognised operation codes
    /// change nothing at all
    pub fn apply(&mut self, record: &TraceRecord) {
        let Some(op) = Operation::from_code(record.code) else {
            return;
        };
        let parts = self.cache.decompose(record.address);
        let set = parts.set_index as usize;
        let outcome = match op {
            Operation::Read => {
                self.stats.accesses += 1;
                self.stats.reads += 1;
                self.cache.read(parts.tag, set)
            }
            Operation::Write => {
                self.stats.accesses += 1;
                self.stats.writes += 1;
                self.cache.write(parts.tag, set)
            }
            Operation::SnoopRead => self.cache.snoop(parts.tag, set, CoherenceState::Shared),
            Operation::SnoopWrite | Operation::SnoopRwitm | Operation::SnoopUpgrade => {
                self.cache.snoop(parts.tag, set, CoherenceState::Invalid)
            }
            Operation::Reset => {
                self.cache.reset();
                if self.mode == Mode::Verbose {
                    println!("reset: all lines invalidated");
                }
                return;
            }
            Operation::Inspect => {
                if self.mode == Mode::Silent {
                    self.dump();
                }
                return;
            }
        };
        if outcome.hit {
            self.stats.hits += 1;
        } else {
            self.stats.misses += 1;
        }
        if self.mode == Mode::Verbose {
            self.log_access(op, record.address, parts.tag, set, &outcome);
        }
    }

    pub fn statistics(&self) -> &Statistics {
        &self.stats
    }

    pub fn cache(&self) -> &Cache<TreePlru> {
        &self.cache
    }

    fn log_access(&self, op: Operation, address: u32, tag: u32, set: usize, outcome: &AccessOutcome) {
        let result = if outcome.hit { "hit" } else { "miss" };
        match outcome.way {
            Some(way) => println!(
                "{} 0x{address:08x}: {result} set=0x{set:x} way={way} tag=0x{tag:x} state={}",
                op.name(),
                outcome.state.letter()
            ),
            // A snoop that missed: nothing resident, nothing changed
            None => println!("{} 0x{address:08x}: {result} set=0x{set:x}", op.name()),
        }
    }

    fn dump(&self) {
        println!("valid cache lines:");
        for (set, way, line) in self.cache.valid_lines() {
            println!(
                "set=0x{set:x} way={way} tag=0x{:x} state={}",
                line.tag,
                line.state.letter()
            );
        }
    }
}
