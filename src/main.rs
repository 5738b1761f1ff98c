//! viewstat - Turn cumulative video view counts into interval deltas

use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use viewstat::{
    aggregation::{IntervalAggregator, group_by_video},
    cli::{
        Cli, Command, log_filter_directive, parse_date_filter, parse_reference_now, select_video,
    },
    data_loader::{DataLoader, ObservationSource},
    error::Result,
    filters::ObservationFilter,
    interval::IntervalWidth,
    output::{JsonFormatter, OutputFormatter, TableFormatter},
    series::{build_chart_series, summarize_video},
    timezone::TimezoneConfig,
    types::VideoId,
};

/// Pick the output formatter, dropping colors when stdout is not a terminal
fn create_formatter(json: bool) -> Box<dyn OutputFormatter> {
    if json {
        return Box::new(JsonFormatter);
    }

    let colored = std::env::var("NO_COLOR").is_err() && is_terminal::is_terminal(std::io::stdout());
    Box::new(TableFormatter::new(colored))
}

/// Build the observation filter shared by every report
fn create_filter(cli: &Cli, tz_config: &TimezoneConfig) -> Result<ObservationFilter> {
    let mut filter = ObservationFilter::new().with_timezone(tz_config.tz);

    if let Some(since_str) = &cli.since {
        filter = filter.with_since(parse_date_filter(since_str)?);
    }
    if let Some(until_str) = &cli.until {
        filter = filter.with_until(parse_date_filter(until_str)?);
    }

    Ok(filter)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging on stderr. --verbose overrides RUST_LOG.
    let rust_log = std::env::var("RUST_LOG").ok();
    let directive = log_filter_directive(cli.verbose, rust_log.as_deref());
    let filter = tracing_subscriber::EnvFilter::try_new(&directive)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("viewstat=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let tz_config = TimezoneConfig::from_cli(cli.timezone.as_deref(), cli.utc)?;
    info!("Using timezone: {}", tz_config.display_name());

    let width = IntervalWidth::from_hours(cli.interval_hours)?;
    let reference_now = parse_reference_now(cli.now.as_deref())?;
    let mut filter = create_filter(&cli, &tz_config)?;
    let formatter = create_formatter(cli.json);

    let data_loader = DataLoader::new(cli.file.clone()).await?;

    match &cli.command {
        Command::Intervals {
            video,
            future_slots,
        } => {
            info!("Running interval report ({width} grid)");

            if let Some(name) = video {
                filter = filter.with_video(VideoId::new(name.as_str()));
            }

            let entries = filter.filter_stream(data_loader.load_observations());
            let by_video = group_by_video(entries).await?;
            let (video_id, observations) = select_video(by_video, video.as_deref())?;

            let aggregator = IntervalAggregator::new(width, tz_config.clone());
            let buckets = aggregator.aggregate(&observations, reference_now);
            let series = build_chart_series(&buckets, width, &tz_config.tz, *future_slots);

            println!(
                "{}",
                formatter.format_intervals(&video_id, &buckets, &series, &tz_config.tz)
            );
        }

        Command::Summary { period } => {
            info!("Running video summary report");

            let entries = filter.filter_stream(data_loader.load_observations());
            let by_video = group_by_video(entries).await?;

            let summaries: Vec<_> = by_video
                .iter()
                .filter_map(|(video_id, observations)| {
                    summarize_video(video_id, observations, reference_now, *period)
                })
                .collect();

            println!(
                "{}",
                formatter.format_summaries(&summaries, *period, &tz_config.tz)
            );
        }

        Command::Videos => {
            info!("Listing recorded videos");

            let entries = filter.filter_stream(data_loader.load_observations());
            let by_video = group_by_video(entries).await?;

            let videos: Vec<(VideoId, usize)> = by_video
                .into_iter()
                .map(|(video_id, observations)| (video_id, observations.len()))
                .collect();

            println!("{}", formatter.format_videos(&videos));
        }
    }

    Ok(())
}
