//! Option Pricer CLI
//!
//! Prices one listed contract with every model and prints the comparison.
//!
//! Usage: `option-pricer [CONFIG.json] [--json]`

use std::process::ExitCode;

use option_pricer::prelude::*;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let as_json = args.iter().any(|a| a == "--json");
    let config_path = args.iter().find(|a| !a.starts_with("--"));

    match run(config_path.map(String::as_str), as_json) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "pricing run failed");
            ExitCode::FAILURE
        }
    }
}

fn run(config_path: Option<&str>, as_json: bool) -> PricerResult<()> {
    let config = match config_path {
        Some(path) => PricingConfig::from_file(path)?,
        None => {
            let config = PricingConfig::default();
            config.validate()?;
            config
        }
    };

    let yahoo = YahooClient::new()?;
    let option = OptionContract::resolve(
        &yahoo,
        &config.ticker,
        config.strike_price,
        config.target_maturity,
        config.risk_free_rate,
    )?;
    let stock = StockData::fetch(&yahoo, &config.ticker, config.lookback())?;

    let comparison = PricingComparator::new(&option, &stock, &yahoo, &config.models).compare()?;

    if as_json {
        let json = serde_json::to_string_pretty(&comparison)
            .map_err(|e| PricerError::Serialization(e.to_string()))?;
        println!("{}", json);
    } else {
        print_report(&comparison);
    }
    Ok(())
}

fn print_report(cmp: &PricingComparison) {
    println!("\nOption Pricing Analysis - {}", cmp.ticker);
    println!("Strike Price: {:.2} $", cmp.strike);
    println!("Current Stock Price: {:.2} $", cmp.spot);
    println!("Historical Volatility: {:.2}%", cmp.volatility * 100.0);
    println!("Maturity: {}", cmp.maturity);
    println!("Days to Maturity: {}", cmp.days_to_maturity);

    for side in [&cmp.calls, &cmp.puts] {
        println!("\nPricing Results for {}s:", side.option_type.label());
        println!("{:<20} {:>10} {:>10}", "Method", "Price", "Std Err");
        println!("{}", "-".repeat(42));

        if let Some(market) = side.market_price {
            println!("{:<20} {:>9.2} $", "Market", market);
        }
        for result in &side.models {
            match result.std_error {
                Some(se) => println!("{:<20} {:>9.2} $ {:>10.4}", result.model.name(), result.price, se),
                None => println!("{:<20} {:>9.2} $", result.model.name(), result.price),
            }
        }
        if let Some(iv) = side.market_implied_vol {
            println!("Market implied volatility: {:.2}%", iv * 100.0);
        }
    }

    let g = &cmp.greeks;
    println!("\nGreeks (call):");
    println!("{:<10} {:.4}", "Delta", g.delta);
    println!("{:<10} {:.4}", "Gamma", g.gamma);
    println!("{:<10} {:.4}  ({:.4} per day)", "Theta", g.theta, g.theta_per_day());
    println!("{:<10} {:.4}  ({:.4} per vol point)", "Vega", g.vega, g.vega_per_point());
    println!("{:<10} {:.4}  ({:.4} per rate point)", "Rho", g.rho, g.rho_per_point());
}
