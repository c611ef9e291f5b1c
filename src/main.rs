use alloy_primitives::{Address, U256};
use anyhow::{anyhow, bail, Context, Result};
use swap_router::config::{AppConfig, ChainId, ChainRegistry};
use swap_router::errors::RouteError;
use swap_router::router::Router;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing().context("initialize tracing subscriber")?;

    if let Err(err) = run().await {
        let retryable = err
            .downcast_ref::<RouteError>()
            .is_some_and(RouteError::is_transient);
        tracing::error!(error = ?err, retryable, "fatal router error");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> Result<()> {
    let config = AppConfig::load().context("load configuration from environment")?;
    let registry = ChainRegistry::from_config(&config).context("build chain registry")?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [chain_id, token_in, token_out, amount_in] = args.as_slice() else {
        bail!("usage: swap-router <chain-id> <from-token> <to-token> <amount-in>");
    };
    let chain = ChainId::from_id(chain_id.parse().context("parse chain id")?)?;
    let token_in: Address = token_in.parse().context("parse from-token address")?;
    let token_out: Address = token_out.parse().context("parse to-token address")?;
    let amount_in =
        U256::from_str_radix(amount_in, 10).context("parse input amount (base units)")?;

    info!(
        chain = %chain,
        token_in = %token_in,
        token_out = %token_out,
        amount_in = %amount_in,
        max_hops = config.max_hops(),
        "swap-router quoting"
    );

    let router = Router::new(registry, config.max_hops());
    let quote = router.quote(chain, token_in, token_out, amount_in).await?;

    println!("{}", serde_json::to_string_pretty(&quote)?);
    Ok(())
}

fn init_tracing() -> Result<()> {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info,hyper=warn".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(env_filter))
        .with_target(false)
        .try_init()
        .map_err(|err| anyhow!("tracing subscriber init: {err}"))
}
