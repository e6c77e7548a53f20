//! # flowbench: typed dataflow pipelines for benchmark jobs
//!
//! A benchmark job measures a workload and then post-processes what was
//! measured. flowbench expresses that post-processing as a directed acyclic
//! graph of elements with named, typed inputs and outputs, checks the graph
//! before anything runs, and sweeps it in dependency order.
//!
//! ## Architecture
//!
//! - **Pipeline**: elements, edges, validation, the level sort and the sweep
//! - **Nodes**: built-in elements (statistics, reshaping, output, transport)
//! - **Config**: TOML engine configuration (logging, validation, execution)
//! - **Transport**: crossbeam channels carry client results to the server flow
//!
//! ## Configuration
//!
//! The engine configuration is read from the platform-appropriate config
//! directory under `flowbench`:
//!
//! - **Linux**: `~/.config/flowbench/flowbench.toml`
//! - **macOS**: `~/Library/Application Support/flowbench/flowbench.toml`
//! - **Windows**: `%APPDATA%\flowbench\flowbench.toml`
//!
//! ## Example
//!
//! ```
//! use flowbench::pipeline::{nodes::{Mean, Producer, SendResults}, Environment, Job, Mapping, Pipeline, TypeSpec};
//!
//! let mut job = Job::new("startup");
//! let run = job.add(Producer::new("Run", [("times", TypeSpec::list(TypeSpec::Int))]).unwrap());
//! let mean = job.add(Mean::new());
//! let send = job.add(SendResults::new());
//! job.set_client_flow(
//!     Pipeline::start(run)
//!         .via(Mapping::rename("times", "values").unwrap())
//!         .then(mean)
//!         .then(send),
//! );
//! assert!(job.check().is_valid());
//!
//! let store = job
//!     .run_client(&Environment::new("startup"), |_, store| {
//!         store.seed(run, "times", vec![10i64, 20]);
//!         Ok(())
//!     })
//!     .unwrap();
//! assert_eq!(store.latest(mean, "mean").and_then(|v| v.as_f64()), Some(15.0));
//! ```

pub mod config;
pub mod error;
pub mod pipeline;

// Re-export commonly used types
pub use config::EngineConfig;
pub use error::{FlowError, Result, ResultExt};
pub use pipeline::{Element, Environment, Job, Mapping, Pipeline, PipelineError, TypeSpec, Types, Value};
