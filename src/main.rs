//! deal-analyzer: fix-and-flip deal evaluation
//!
//! Entry point. Loads `.env` and configuration, initialises structured
//! logging, then dispatches one of:
//!
//!   deal-analyzer serve
//!   deal-analyzer analyze "<address>"
//!   deal-analyzer evaluate <price> <sqft> [year_built]

use anyhow::{bail, Context, Result};
use rust_decimal::Decimal;
use secrecy::SecretString;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};

use deal_analyzer::analysis::DealAnalyzer;
use deal_analyzer::api::{self, ApiState};
use deal_analyzer::config::AppConfig;
use deal_analyzer::engine::{AnalyzeOptions, ComparableSettings, DealPipeline};
use deal_analyzer::listing::realtor::RealtorClient;
use deal_analyzer::listing::ListingProvider;
use deal_analyzer::llm::deepseek::DeepSeekClient;
use deal_analyzer::llm::Commentator;
use deal_analyzer::report::format_report;
use deal_analyzer::types::PropertyInfo;

const BANNER: &str = r#"
  ____             _      _                _
 |  _ \  ___  __ _| |    / \   _ __   __ _| |_   _ _______ _ __
 | | | |/ _ \/ _` | |   / _ \ | '_ \ / _` | | | | |_  / _ \ '__|
 | |_| |  __/ (_| | |  / ___ \| | | | (_| | | |_| |/ /  __/ |
 |____/ \___|\__,_|_| /_/   \_\_| |_|\__,_|_|\__, /___\___|_|
                                             |___/
  Fix-and-flip deal evaluation
  v0.1.0
"#;

const USAGE: &str = "usage:
  deal-analyzer serve
  deal-analyzer analyze \"<street, city, state>\"
  deal-analyzer evaluate <price> <sqft> [year_built]";

#[derive(Debug, PartialEq)]
enum Command {
    Serve,
    Analyze(String),
    Evaluate {
        price: Decimal,
        sqft: u32,
        year_built: Option<i32>,
    },
}

impl Command {
    fn parse(args: &[String]) -> Result<Self> {
        match args.first().map(String::as_str) {
            None | Some("serve") => Ok(Command::Serve),
            Some("analyze") => {
                let address = args[1..].join(" ");
                if address.trim().is_empty() {
                    bail!("analyze needs an address\n{USAGE}");
                }
                Ok(Command::Analyze(address))
            }
            Some("evaluate") => {
                let price = args
                    .get(1)
                    .with_context(|| format!("evaluate needs a price\n{USAGE}"))?;
                let sqft = args
                    .get(2)
                    .with_context(|| format!("evaluate needs a floor area\n{USAGE}"))?;
                let year_built = args
                    .get(3)
                    .map(|y| y.parse::<i32>().with_context(|| format!("Invalid year built: {y}")))
                    .transpose()?;
                Ok(Command::Evaluate {
                    price: Decimal::from_str(price)
                        .with_context(|| format!("Invalid price: {price}"))?,
                    sqft: sqft
                        .parse()
                        .with_context(|| format!("Invalid square footage: {sqft}"))?,
                    year_built,
                })
            }
            Some(other) => bail!("unknown command: {other}\n{USAGE}"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = Command::parse(&args)?;

    let config_path =
        std::env::var("DEAL_ANALYZER_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    let cfg = AppConfig::load(&config_path)?;

    init_logging();

    let analyzer = DealAnalyzer::new(cfg.analysis.to_policy());

    match command {
        Command::Evaluate {
            price,
            sqft,
            year_built,
        } => {
            let mut property = PropertyInfo::new("Manual entry", price).with_sqft(sqft);
            property.year_built = year_built;
            let analysis = analyzer.analyze(&property, &[])?;
            println!("{}", format_report(&analysis));
        }
        Command::Analyze(address) => {
            let pipeline = build_pipeline(&cfg, analyzer)?;
            let report = pipeline
                .analyze_address(&address, &AnalyzeOptions::default())
                .await?;
            println!("{}", report.report);
            if let Some(commentary) = report.commentary {
                println!("AI ANALYSIS\n-----------\n{commentary}");
            }
        }
        Command::Serve => {
            println!("{BANNER}");
            let pipeline = build_pipeline(&cfg, analyzer)?;
            info!(
                port = cfg.server.port,
                commentary = pipeline.has_commentator(),
                "deal-analyzer starting up"
            );
            let state = Arc::new(ApiState::new(pipeline));
            api::serve(state, cfg.server.port).await?;
        }
    }

    Ok(())
}

/// Wire the listing and commentary clients from config and environment.
fn build_pipeline(cfg: &AppConfig, analyzer: DealAnalyzer) -> Result<DealPipeline> {
    let listing_key = AppConfig::resolve_env(&cfg.listing.api_key_env).unwrap_or_else(|_| {
        warn!(
            env = %cfg.listing.api_key_env,
            "No listing API key configured; property lookups will be rejected"
        );
        String::new()
    });
    let listing = RealtorClient::new(
        SecretString::new(listing_key),
        Some(cfg.listing.api_host.clone()),
        cfg.listing.timeout_secs,
    )?;
    info!(provider = listing.name(), host = %cfg.listing.api_host, "Listing provider ready");

    let commentator: Option<Box<dyn Commentator>> = if !cfg.llm.enabled {
        info!("LLM commentary disabled in config");
        None
    } else {
        match AppConfig::resolve_env(&cfg.llm.api_key_env) {
            Ok(key) if !key.is_empty() => {
                let client = DeepSeekClient::new(
                    SecretString::new(key),
                    Some(cfg.llm.base_url.clone()),
                    Some(cfg.llm.model.clone()),
                    cfg.llm.timeout_secs,
                )?
                .with_sampling(cfg.llm.temperature, cfg.llm.max_tokens);
                info!(model = client.model_name(), "Using DeepSeek commentary");
                Some(Box::new(client) as Box<dyn Commentator>)
            }
            _ => {
                warn!(
                    env = %cfg.llm.api_key_env,
                    "No LLM API key configured; running without commentary"
                );
                None
            }
        }
    };

    let comps = ComparableSettings {
        enabled: cfg.listing.enabled,
        price_band: cfg.listing.comps_price_band,
        limit: cfg.listing.comps_limit,
    };

    Ok(DealPipeline::new(Box::new(listing), commentator, analyzer, comps))
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("deal_analyzer=info"));

    let json_logging = std::env::var("DEAL_ANALYZER_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    }
}
