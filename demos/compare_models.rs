//! Offline walk-through of a pricing comparison
//!
//! Builds a synthetic price history and option chain in memory, resolves the
//! contract against it and compares all four models with the listed quotes.
//!
//! Run with `cargo run --example compare_models`.

use chrono::{Duration, Utc};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, StandardNormal};

use option_pricer::prelude::*;

fn synthetic_closes(spot: f64, daily_vol: f64, sessions: usize, seed: u64) -> Vec<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut closes = Vec::with_capacity(sessions);
    let mut s = spot;
    for _ in 0..sessions {
        let z: f64 = StandardNormal.sample(&mut rng);
        s *= 1.0 + daily_vol * z;
        closes.push(s);
    }
    closes
}

fn listed_chain(spot: f64, vol: f64, rate: f64, time: f64) -> ListedChain {
    let strikes: Vec<f64> = (-5..=5).map(|i| (spot / 5.0).round() * 5.0 + 5.0 * i as f64).collect();
    // Quotes at a modest skew over the flat volatility
    let quote = |strike: f64, option_type: OptionType| {
        let skew = 0.02 * (spot / strike).ln().abs();
        ListedQuote {
            strike,
            last_price: (bs_price(spot, strike, rate, vol + skew, time, option_type) * 100.0).round() / 100.0,
        }
    };
    ListedChain {
        calls: strikes.iter().map(|&k| quote(k, OptionType::Call)).collect(),
        puts: strikes.iter().map(|&k| quote(k, OptionType::Put)).collect(),
    }
}

fn main() -> PricerResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    println!("Multi-Model Option Pricing (offline)");
    println!("====================================\n");

    let ticker = "DEMO";
    let rate = 0.04;
    let closes = synthetic_closes(150.0, 0.015, 300, 7);
    let spot = closes.last().copied().unwrap_or(150.0);

    let today = Utc::now().date_naive();
    let expiries = [today + Duration::days(91), today + Duration::days(182), today + Duration::days(364)];
    let mut market = StaticMarketData::new().with_closes(ticker, closes);
    for expiry in expiries {
        let time = (expiry - today).num_days() as f64 / 365.0;
        market = market.with_chain(ticker, expiry, listed_chain(spot, 0.24, rate, time));
    }

    // Default target: nearest listing to 180 days ahead
    let option = OptionContract::resolve(&market, ticker, 150.0, None, rate)?;
    let stock = StockData::fetch(&market, ticker, Lookback::one_year())?;

    println!("Contract: {} {} strike {:.2}", option.ticker(), option.maturity_date(), option.strike_price());
    println!("Spot {:.2}, historical vol {:.2}%\n", stock.current_price(), stock.volatility() * 100.0);

    let config = ModelConfig {
        monte_carlo: MonteCarloConfig {
            seed: Some(2024),
            ..Default::default()
        },
        heston: HestonConfig {
            seed: Some(2025),
            ..HestonConfig::quick()
        },
        ..Default::default()
    };
    let comparison = PricingComparator::new(&option, &stock, &market, &config).compare()?;

    for side in [&comparison.calls, &comparison.puts] {
        println!("{}s:", side.option_type.label());
        if let Some(market_price) = side.market_price {
            println!("  {:<15} {:>9.2}", "Market", market_price);
        }
        for result in &side.models {
            match side.market_price {
                Some(market_price) => println!(
                    "  {:<15} {:>9.2}  ({:+.2} vs market)",
                    result.model.name(),
                    result.price,
                    result.deviation_from(market_price)
                ),
                None => println!("  {:<15} {:>9.2}", result.model.name(), result.price),
            }
        }
        if let Some(iv) = side.market_implied_vol {
            println!("  Implied vol of the quote: {:.2}%", iv * 100.0);
        }
        println!();
    }

    // Variance trajectories under the comparison's Heston settings
    let heston = HestonPricer::new(&option, &stock, config.heston.params)
        .with_seed(config.heston.seed.unwrap_or_default());
    let call = heston.estimate(OptionType::Call, config.heston.num_simulations, config.heston.num_steps)?;
    let (lo, hi) = call.confidence_interval(1.96);
    println!("Heston call 95% interval: [{:.2}, {:.2}] over {} paths", lo, hi, call.num_paths);

    let paths = heston.simulate_paths(1_000, 50)?;
    let mean_terminal_vol = paths.terminal_variances().mapv(f64::sqrt).mean().unwrap_or(0.0);
    println!(
        "Heston: {} paths, mean terminal vol {:.2}% (long-term {:.2}%)",
        paths.num_paths(),
        mean_terminal_vol * 100.0,
        config.heston.params.long_term_vol() * 100.0
    );

    Ok(())
}
