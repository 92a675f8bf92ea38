//! # MesiSim
//!
//! MesiSim is a trace-driven simulator for a set-associative last level cache
//!
//! It models per-line coherence with a four-state MESI protocol and picks eviction victims with a
//! tree-based pseudo-LRU policy. Traces are replayed deterministically, one record at a time, and
//! the simulator reports hit/miss statistics at the end of the run
//!
//! The cache geometry is runtime configuration rather than compile time constants, which keeps the
//! simulator flexible without a measurable cost for a single-pass replay

/// Contains the address layout, which splits an address into its tag, set index, and offset
pub mod address;

/// Contains the line store and the per-operation coherence transition logic
pub mod cache;

/// Contains definitions for the JSON geometry format and its validation
pub mod config;

/// Contains the reader used to stream a trace file from disk
pub mod io;

/// Contains the replacement policy trait and the tree pseudo-LRU implementation
pub mod replacement_policies;

/// Contains the dispatcher which replays trace records against the cache and collects statistics
pub mod simulator;
