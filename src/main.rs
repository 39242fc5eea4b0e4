// trackfilter - command line entry point
// Copyright (C) 2024 - trackfilter contributors
// Licensed under AGPL v3
//
// Prints the raw and smoothed distance of a GPX track and writes the
// smoothed track back out.

use clap::Parser;
use tracing::{error, info};

use trackfilter::config::Config;
use trackfilter::input::GpxSource;
use trackfilter::output::{CsvOutput, GpxOutput, TrackSink};
use trackfilter::pipeline::TrackPipeline;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::parse();

    init_logging(config.verbose);

    let params = config.model_params()?;
    let initial_covariance = config.initial_covariance()?;
    let pipeline = TrackPipeline::new(params, initial_covariance);

    info!("Reading {}", config.input);
    let mut source = GpxSource::open(&config.input).map_err(|e| {
        error!("Failed to open {}: {}", config.input, e);
        e
    })?;
    let report = pipeline.run_source(&mut source)?;

    if config.json {
        println!("{}", report.to_json()?);
    } else {
        println!("Unfiltered distance: {:.2}", report.raw_distance);
        println!("Filtered distance: {:.2}", report.smoothed_distance);
    }

    let mut sinks: Vec<Box<dyn TrackSink>> = vec![Box::new(GpxOutput::create(&config.output)?)];
    if let Some(csv) = &config.csv {
        sinks.push(Box::new(CsvOutput::create(csv)?));
    }
    pipeline.emit(&report, &mut sinks)?;

    info!("Smoothed track written to {}", config.output);
    Ok(())
}

/// Initialize logging subsystem
///
/// Logs go to stderr so the distance lines on stdout stay clean.
fn init_logging(verbose: bool) {
    let subscriber = tracing_subscriber::fmt()
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true)
        .with_writer(std::io::stderr);

    if verbose {
        subscriber.with_max_level(tracing::Level::DEBUG).init();
        info!("Verbose logging enabled (DEBUG level)");
    } else {
        subscriber.with_max_level(tracing::Level::INFO).init();
    }
}
