//! Life expectancy stream pipeline
//!
//! Runs the record emitter and the decade statistics consumer as two tasks
//! joined by a bounded channel. Ctrl-C stops the consumer cooperatively.

use decade_stats::config::ConsumerConfig;
use decade_stats::consumer::{StopReason, StreamConsumer};
use decade_stats::sink::{BarStyle, ChartSeries};
use emitter::config::EmitterConfig;
use emitter::publisher::{PublishError, Publisher};
use emitter::source::load_records;
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("START pipeline");

    let emitter_config = EmitterConfig::from_env();
    let consumer_config = ConsumerConfig::from_env();
    consumer_config.aggregator.validate()?;

    let records = load_records(&emitter_config)?;

    let (tx, mut rx) = mpsc::channel(emitter_config.channel_capacity);
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

    let publisher = Publisher::new(&emitter_config);
    let producer = tokio::spawn(async move { publisher.publish_all(&records, &tx).await });

    let consumer = tokio::spawn(async move {
        let mut consumer = StreamConsumer::new(consumer_config, ChartSeries::new());
        let reason = consumer.run(&mut rx, &mut shutdown_rx).await;
        (reason, consumer)
    });

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Pipeline interrupted by user");
            let _ = shutdown_tx.send(true);
        }
    });

    let (reason, consumer) = consumer.await?;

    // The consumer dropped its receiver, so a still-running producer fails
    // its next send and exits.
    match producer.await? {
        Ok(sent) => info!(sent, "Producer finished"),
        Err(PublishError::ChannelClosed { sent }) => {
            warn!(sent, "Producer stopped early")
        }
        Err(err) => return Err(err.into()),
    }

    if reason == StopReason::Shutdown {
        if let Some(window) = consumer.aggregator().open_window() {
            info!(
                decade = %window.decade(),
                count = window.count(),
                "Decade left open at shutdown"
            );
        }
    }

    let chart = consumer.sink();
    let declines = chart
        .points()
        .filter(|p| p.style == BarStyle::Decline)
        .count();
    let stats = consumer.stats();
    info!(
        points = chart.len(),
        declines,
        accepted = stats.accepted,
        rejected = stats.rejected(),
        reports = consumer.reports().len(),
        "END pipeline"
    );

    Ok(())
}
