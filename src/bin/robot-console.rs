// Robot Console - exchange dashboard CLI
// Single entry point for the live ticker monitor and robot control commands

use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use robot_console::{
    canonicalize, fallback_snapshot, AccountContext, AutomationController, Config, ConfigError,
    ControlApiClient, CurrencySelection, Leverage, MarketDataStore, RobotSettings,
    StreamingMarketDataClient, TradeHistoryPager,
};

#[derive(Parser)]
#[command(name = "robot-console")]
#[command(version = "0.1.0")]
#[command(about = "Exchange market monitor and trading robot console", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a default configuration file
    Init,

    /// Stream live ticker updates to the terminal
    Monitor {
        /// Stop after this many seconds (runs until Ctrl+C if omitted)
        #[arg(short, long)]
        duration: Option<u64>,
    },

    /// Trading robot control
    #[command(subcommand)]
    Robot(RobotCommands),

    /// Robot settings for an account
    #[command(subcommand)]
    Settings(SettingsCommands),

    /// Paginated trade history
    History {
        /// Account context (demo or real)
        #[arg(short, long, default_value = "demo")]
        account: String,

        /// Page number (starting at 1)
        #[arg(short, long, default_value = "1")]
        page: u32,

        /// Records per page (5, 10, 20 or 50)
        #[arg(short = 's', long, default_value = "10")]
        page_size: u32,
    },

    /// License key operations
    #[command(subcommand)]
    Key(KeyCommands),
}

#[derive(Subcommand)]
enum RobotCommands {
    /// Query the authoritative robot state
    Status {
        /// Account context (demo or real)
        #[arg(short, long, default_value = "demo")]
        account: String,
    },

    /// Start or stop the robot (flips the current state)
    Toggle {
        /// Account context (demo or real)
        #[arg(short, long, default_value = "demo")]
        account: String,
    },
}

#[derive(Subcommand)]
enum SettingsCommands {
    /// Show current settings
    Get {
        /// Account context (demo or real)
        #[arg(short, long, default_value = "demo")]
        account: String,
    },

    /// Save settings
    Set {
        /// Account context (demo or real)
        #[arg(short, long, default_value = "demo")]
        account: String,

        /// Leverage (3, 5, 20, 50 or 100)
        #[arg(short, long, default_value = "3")]
        leverage: u32,

        /// Minimum trade amount
        #[arg(long, default_value = "10")]
        min: f64,

        /// Maximum trade amount
        #[arg(long, default_value = "100")]
        max: f64,

        /// Comma-separated currencies, or "all"
        #[arg(short, long, default_value = "all")]
        pairs: String,
    },
}

#[derive(Subcommand)]
enum KeyCommands {
    /// Activate a license key
    Activate {
        /// The key to activate (single use)
        key: String,
    },

    /// Purchase a new key
    Purchase {
        /// Key type to purchase
        key_type: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    std::env::set_var("RUST_LOG", log_level);
    tracing_subscriber::fmt::init();

    match cli.command {
        // Init doesn't require config (it creates it)
        Commands::Init => {
            init_workspace(&cli.config)?;
        }

        Commands::Monitor { duration } => {
            let config = load_config_or_exit(&cli.config)?;
            run_monitor(config, duration).await?;
        }

        Commands::Robot(cmd) => {
            let config = load_config_or_exit(&cli.config)?;
            handle_robot_command(cmd, config).await?;
        }

        Commands::Settings(cmd) => {
            let config = load_config_or_exit(&cli.config)?;
            handle_settings_command(cmd, config).await?;
        }

        Commands::History {
            account,
            page,
            page_size,
        } => {
            let config = load_config_or_exit(&cli.config)?;
            show_history(config, &account, page, page_size).await?;
        }

        Commands::Key(cmd) => {
            let config = load_config_or_exit(&cli.config)?;
            handle_key_command(cmd, config).await?;
        }
    }

    Ok(())
}

/// Load config or exit with a helpful error message
fn load_config_or_exit(path: &str) -> Result<Config, Box<dyn std::error::Error>> {
    match Config::from_file(path) {
        Ok(config) => Ok(config),
        Err(e) => {
            error!("❌ Configuration Error");
            error!("{}", e);

            if matches!(e, ConfigError::FileRead(_)) {
                error!("");
                error!("💡 Quick fix:");
                error!("   1. Run: robot-console init");
                error!("   2. Edit config.toml with your endpoints and session token");
                error!("   3. Try again");
            }

            std::process::exit(1);
        }
    }
}

fn init_workspace(config_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    if std::path::Path::new(config_path).exists() {
        warn!("⚠️  {} already exists, skipping", config_path);
        return Ok(());
    }

    Config::default().to_file(config_path)?;
    info!("📝 Created {}", config_path);
    info!("💡 Next steps:");
    info!("   1. Edit {} with your endpoints and session token", config_path);
    info!("   2. Run: robot-console monitor");

    Ok(())
}

async fn run_monitor(
    config: Config,
    duration: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(MarketDataStore::new());

    // Show the placeholder list until the first live frame arrives
    let fallback = fallback_snapshot();
    info!("… waiting for live data ({} placeholder coins)", fallback.tickers.len());

    store.subscribe(|snapshot| {
        let badge = if snapshot.stale { " (stale)" } else { "" };
        let mut lines: Vec<String> = snapshot
            .tickers
            .values()
            .map(|t| {
                format!(
                    "{:<12} {:>14.4} {:>+7.2}%",
                    canonicalize(&t.symbol).display(),
                    t.price,
                    t.change_24h
                )
            })
            .collect();
        lines.sort();

        info!("--- {} symbols{} ---", snapshot.tickers.len(), badge);
        for line in lines {
            info!("{}", line);
        }
        for bot in &snapshot.bots {
            info!(
                "🤖 {} {} over {} ({} copiers)",
                bot.name, bot.performance_label, bot.period_label, bot.copier_count
            );
        }
    });

    let client = StreamingMarketDataClient::new(config.stream, store);
    client.start();

    match duration {
        Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
        None => tokio::signal::ctrl_c().await?,
    }

    client.stop().await;
    info!("monitor stopped");
    Ok(())
}

async fn handle_robot_command(
    cmd: RobotCommands,
    config: Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let controller = build_controller(&config);

    match cmd {
        RobotCommands::Status { account } => {
            let context = parse_context(&account)?;
            let state = controller.ensure_status(context).await;
            info!("robot on {} is {:?}", context, state);
        }
        RobotCommands::Toggle { account } => {
            let context = parse_context(&account)?;
            match controller.toggle(context).await {
                Ok(state) => info!("✅ robot on {} is now {:?}", context, state),
                Err(e) => error!("❌ {}", e),
            }
        }
    }

    Ok(())
}

async fn handle_settings_command(
    cmd: SettingsCommands,
    config: Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let controller = build_controller(&config);

    match cmd {
        SettingsCommands::Get { account } => {
            let context = parse_context(&account)?;
            let settings = controller.fetch_settings(context).await?;
            info!("settings for {}:", context);
            info!("  leverage:  x{}", settings.leverage.as_u32());
            info!(
                "  trade amount: {} - {}",
                settings.min_trade_amount, settings.max_trade_amount
            );
            match &settings.selected {
                CurrencySelection::All => info!("  currencies: all"),
                CurrencySelection::Chosen(list) => info!("  currencies: {}", list.join(", ")),
            }
            info!("  available: {}", settings.available_currencies.join(", "));
        }
        SettingsCommands::Set {
            account,
            leverage,
            min,
            max,
            pairs,
        } => {
            let context = parse_context(&account)?;

            let leverage = Leverage::from_u32(leverage)
                .ok_or("leverage must be one of 3, 5, 20, 50, 100")?;

            // Validation needs the authoritative available list
            let current = controller.fetch_settings(context).await?;
            let selected = if pairs == "all" {
                CurrencySelection::All
            } else {
                CurrencySelection::Chosen(
                    pairs.split(',').map(|p| p.trim().to_string()).collect(),
                )
            };

            let settings = RobotSettings {
                available_currencies: current.available_currencies,
                selected,
                leverage,
                min_trade_amount: min,
                max_trade_amount: max,
            };

            match controller.save_settings(context, &settings).await {
                Ok(()) => info!("✅ settings saved for {}", context),
                Err(e) => error!("❌ {}", e),
            }
        }
    }

    Ok(())
}

async fn show_history(
    config: Config,
    account: &str,
    page: u32,
    page_size: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let context = parse_context(account)?;
    let api = ControlApiClient::new(&config.api.base_url, &config.api.session_token);

    let pager = TradeHistoryPager::new(api, context);
    pager.set_page_size(page_size)?;
    pager.goto_page(page)?;

    match pager.fetch_current().await? {
        Some(history) => {
            info!(
                "trade history for {} (page {}/{}, {} per page):",
                context, history.page, history.total_pages, history.page_size
            );
            for record in &history.records {
                info!(
                    "  #{:<8} {:<5} invested {:>10.2} profit {:>+10.2}  {} → {}",
                    record.id,
                    record.status,
                    record.investment,
                    record.profit,
                    record.start_date.format("%Y-%m-%d %H:%M"),
                    record.end_date.format("%Y-%m-%d %H:%M"),
                );
            }
        }
        None => warn!("request was superseded before the response arrived"),
    }

    Ok(())
}

async fn handle_key_command(
    cmd: KeyCommands,
    config: Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let controller = build_controller(&config);

    match cmd {
        KeyCommands::Activate { key } => match controller.activate_key(&key).await {
            Ok(msg) => info!("✅ {}", msg),
            Err(e) => error!("❌ {}", e),
        },
        KeyCommands::Purchase { key_type } => match controller.purchase_key(&key_type).await {
            Ok((msg, Some(key))) => {
                info!("✅ {}", msg);
                info!("🔑 your key: {}", key);
            }
            Ok((msg, None)) => info!("✅ {}", msg),
            Err(e) => error!("❌ {}", e),
        },
    }

    Ok(())
}

fn build_controller(config: &Config) -> AutomationController {
    let api = ControlApiClient::new(&config.api.base_url, &config.api.session_token);
    AutomationController::new(api, Duration::from_secs(config.api.control_timeout_secs))
}

fn parse_context(value: &str) -> Result<AccountContext, String> {
    AccountContext::parse(value)
        .ok_or_else(|| format!("unknown account context '{}', expected demo or real", value))
}
