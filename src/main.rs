//! flowbench - demo runner
//!
//! Builds a small benchmark job, runs its client flow for one composition,
//! ships the results over a channel and runs the server flow on them.
//! The first argument, if given, is the path of the engine config file.

use flowbench::{
    config::EngineConfig,
    pipeline::{
        nodes::{Dump, Mean, Print, Producer, ReceiveResults, RuntimeStatistics, SendResults},
        Environment, Job, Mapping, Pipeline, PipelineError, TypeSpec,
    },
    FlowError,
};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

fn main() -> anyhow::Result<()> {
    use anyhow::Context;

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let loaded = EngineConfig::load_or_default(config_path.as_deref());
    let config = loaded.as_ref().cloned().unwrap_or_default();

    // Initialize logging; the guard flushes the log file on exit
    let (file_layer, _guard) = match &config.logging.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, &config.logging.file_prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
                .boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(&config.logging.filter))
                .context("Invalid log filter")?,
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    if let Err(e) = &loaded {
        tracing::warn!("Failed to load config, using defaults: {}", e);
    }
    tracing::info!("Starting flowbench {}", env!("CARGO_PKG_VERSION"));

    run_demo(&config).context("Demo run failed")?;

    tracing::info!("Done");
    Ok(())
}

fn run_demo(config: &EngineConfig) -> flowbench::Result<()> {
    use flowbench::ResultExt;

    let mut job = Job::new("demo").with_config(&config);
    let run = job.add(
        Producer::new("Run", [("times", TypeSpec::list(TypeSpec::list(TypeSpec::Int)))])
            .context("Declaring producer outputs")?,
    );
    let stats = job.add(RuntimeStatistics::new());
    let mean = job.add(Mean::new());
    let print = job.add(Print::new());
    let send = job.add(SendResults::new());
    let receive = job.add(ReceiveResults::new());
    let dump = job.add(Dump::new().pretty());
    let show = job.add(Print::new());

    let averages = Mapping::rename("averages", "values").context("Building mapping")?;
    job.set_client_flow(
        Pipeline::start(run)
            .then(stats)
            .fan_out([print, send])
            .concat(Pipeline::start(stats).via(averages).then(mean).then(send)),
    );
    job.set_server_flow(Pipeline::start(receive).then(dump).then(show));

    let check = job.check();
    if !check.is_valid() {
        let report = if check.client.is_valid() { check.server } else { check.client };
        return Err(FlowError::from(PipelineError::Validation(report))
            .with_context(format!("Job {} failed the plausibility check", job.name())));
    }
    println!("{}", job.to_dot());

    let (outbox, inbox) = crossbeam_channel::unbounded();
    let client = Environment::new(job.name())
        .with_composition("demo @ localhost")
        .with_outbox(outbox);
    let server = Environment::new(job.name()).with_inbox(inbox);

    // stand-in workload: three iterations per invocation, in milliseconds
    job.run_client(&client, |invocation, store| {
        let base = 100 + i64::from(invocation) * 5;
        store.append_to_list(run, "times", vec![base, base - 3, base + 4]);
        Ok(())
    })
    .context("Client flow failed")?;

    job.run_server(&server).context("Server flow failed")?;
    Ok(())
}
