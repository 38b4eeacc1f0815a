use std::{panic, sync::Arc};

use {
    anyhow::{Context, Result},
    clap::Parser,
    tabled::{Table, settings::Style},
};

use pivot_sentinel::{
    AlertDispatcher, BinanceProvider, Cli, Command, DetectorArgs, LogNotifier, MONITOR,
    MarketDataProvider, MonitorSettings, PairInterval, PivotMonitor, PivotReport,
    SqliteAlertRepository, analysis::series_ema, assemble_series, calculate_zigzag,
    engine::MonitorTarget,
};

const EMA_TAIL_LEN: usize = 5;

fn init_logging() {
    let (global_level, my_code_level) = if cfg!(debug_assertions) {
        (log::LevelFilter::Warn, log::LevelFilter::Info)
    } else {
        (log::LevelFilter::Error, log::LevelFilter::Error)
    };

    let mut builder = env_logger::Builder::new();

    builder
        .filter(None, global_level)
        .filter(Some("pivot_sentinel"), my_code_level)
        .parse_default_env()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::force_capture();
        log::error!("CRITICAL PANIC:\n{}\nStack Trace:\n{}", info, backtrace);
    }));

    init_logging();

    let args = Cli::parse();
    match args.command {
        Command::Monitor {
            pairs,
            timeframe,
            shard_size,
            db,
            no_db,
            detector,
        } => {
            let settings = MonitorSettings {
                shard_size,
                candle_count: detector.candles,
                zigzag: detector.zigzag_params(),
                ..MonitorSettings::default()
            };
            let db_path = (!no_db).then_some(db);
            run_monitor(&pairs, &timeframe, settings, db_path.as_deref()).await
        }
        Command::Pivots {
            pair,
            timeframe,
            ema_period,
            json,
            detector,
        } => {
            let target = PairInterval::parse_list(&pair, MONITOR.pair_separator, &timeframe)?
                .into_iter()
                .next()
                .context("no pair given")?;
            run_pivots(&target, &detector, ema_period, json).await
        }
    }
}

async fn run_monitor(
    pairs: &str,
    timeframe: &str,
    settings: MonitorSettings,
    db_path: Option<&str>,
) -> Result<()> {
    settings.zigzag.validate()?;

    let provider: Arc<dyn MarketDataProvider> = Arc::new(BinanceProvider::with_default_limits()?);

    let mut dispatcher = AlertDispatcher::default().with_notifier(Arc::new(LogNotifier));
    if let Some(path) = db_path {
        let repo = SqliteAlertRepository::new(path)
            .await
            .with_context(|| format!("Failed to open alert history at {}", path))?;
        dispatcher = dispatcher.with_sink(Arc::new(repo));
    }

    let monitor = PivotMonitor::new(provider, Arc::new(dispatcher)).with_settings(settings);
    let status = monitor.activate(pairs, timeframe).await?;
    println!(
        "Monitoring {} on {} ({} shards). Ctrl-C to stop.",
        status.pairs.join(", "),
        status.timeframe.as_deref().unwrap_or(timeframe),
        status.shard_count
    );

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;

    log::info!("Shutdown signal received, stopping workers...");
    monitor.deactivate().await;

    let alerts = monitor.latest_alerts();
    println!("{} alert(s) this session", alerts.len());
    for alert in alerts {
        println!("  {}", alert.message());
    }
    Ok(())
}

async fn run_pivots(
    target: &MonitorTarget,
    detector: &DetectorArgs,
    ema_period: usize,
    json: bool,
) -> Result<()> {
    let params = detector.zigzag_params();
    let provider = BinanceProvider::with_default_limits()?;

    let series = assemble_series(
        &provider,
        target,
        detector.candles,
        MonitorSettings::default().page_size,
    )
    .await
    .with_context(|| format!("Failed to load candles for {}", target))?;

    let zigzag = calculate_zigzag(&series, &params)?;
    let ema = series_ema(&series, ema_period);
    let report = PivotReport::new(&series, &zigzag, &ema, ema_period, EMA_TAIL_LEN);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "{} | {} candles | {} tops, {} bottoms | last close {:?}",
        target, report.candles, report.top_count, report.bottom_count, report.last_close
    );
    println!("EMA({}) tail: {:?}", ema_period, report.ema_tail);

    let mut table = Table::new(report.bottom_rows.clone());
    table.with(Style::rounded());
    println!("{}", table);
    Ok(())
}
