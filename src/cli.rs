use clap::{Parser, Subcommand};

use crate::{
    orderbook::OrderBook,
    orders::{LimitOrder, MarketOrder, Order, Side},
    simulate::{SimConfig, run_simulation},
    utils::SubmissionClock,
};

/// Simple CLI to interact with the matching engine
#[derive(Parser)]
#[command(name = "Order Matching Engine CLI")]
#[command(version = "0.1", about = "A demo of a price-time-priority matching engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scripted session and print the trades and the resulting book
    Demo,

    /// Drive randomized order flow through a book and report throughput
    Simulate {
        /// Number of orders to submit
        #[arg(long, default_value_t = 100_000)]
        orders: u64,

        /// Average order size
        #[arg(long, default_value_t = 4.0)]
        mean_qty: f64,

        /// Std-dev of the mid-price drift applied per order
        #[arg(long, default_value_t = 0.5)]
        noise_sigma: f64,

        /// Seed for reproducible flow
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn run_demo() -> anyhow::Result<()> {
    let mut book = OrderBook::new();
    let mut clock = SubmissionClock::new();

    // seed two price levels of resting liquidity on each side
    let resting = [
        Order::Limit(LimitOrder::new(1, Side::Buy, 5, 98, 11, clock.next())?),
        Order::Limit(LimitOrder::new(2, Side::Buy, 10, 99, 12, clock.next())?),
        Order::Limit(LimitOrder::new(3, Side::Sell, 8, 101, 13, clock.next())?),
        Order::Limit(LimitOrder::new(4, Side::Sell, 6, 102, 14, clock.next())?),
    ];
    for order in resting {
        book.process_order(order);
    }
    println!("Seeded book:");
    print_order_book(&book);

    // a crossing limit sell sweeps the best bid and rests its remainder
    let crossing = Order::Limit(LimitOrder::new(5, Side::Sell, 12, 99, 15, clock.next())?);
    let report = book.process_order(crossing);
    println!("Limit sell 12 @ 99 -> {:?}, remaining {}", report.status, report.remaining);
    print_trades(&report.trades)?;

    // a market buy takes whatever the ask side offers
    let sweep = Order::Market(MarketOrder::new(6, Side::Buy, 10, 16, clock.next())?);
    let report = book.process_order(sweep);
    println!("Market buy 10 -> {:?}, remaining {}", report.status, report.remaining);
    print_trades(&report.trades)?;

    // cancel the remaining deep bid
    let report = book.process_order(Order::Cancel { order_id: 1 });
    println!("Cancel order 1 -> {:?}", report.status);

    println!("Final book:");
    print_order_book(&book);
    println!("Trade log holds {} trades.", book.trades().len());
    Ok(())
}

fn print_trades(trades: &[crate::trade::Trade]) -> anyhow::Result<()> {
    if trades.is_empty() {
        println!("No trades occurred.");
        return Ok(());
    }
    for trade in trades {
        println!("{}", serde_json::to_string(trade)?);
    }
    Ok(())
}

fn print_order_book(book: &OrderBook) {
    println!("------ Order Book ------");
    println!("Asks (best first):");
    for order in book.asks() {
        println!(
            "  Price: {}, Qty: {}, Id: {}",
            order.price, order.remaining, order.order_id
        );
    }
    println!("Bids (best first):");
    for order in book.bids() {
        println!(
            "  Price: {}, Qty: {}, Id: {}",
            order.price, order.remaining, order.order_id
        );
    }
    println!("------------------------");
}

pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Demo => run_demo(),
        Commands::Simulate {
            orders,
            mean_qty,
            noise_sigma,
            seed,
        } => {
            let cfg = SimConfig {
                orders,
                mean_qty,
                noise_sigma,
                seed,
                ..SimConfig::default()
            };
            let summary = run_simulation(&cfg)?;
            println!(
                "Processed {} orders in {:.3}s ({:.0} orders/s)",
                summary.orders,
                summary.elapsed.as_secs_f64(),
                summary.orders_per_sec()
            );
            println!(
                "Trades: {}, cancels: {}, resting: {}, best bid: {:?}, best ask: {:?}",
                summary.trades, summary.cancels, summary.resting, summary.best_bid, summary.best_ask
            );
            Ok(())
        }
    }
}
