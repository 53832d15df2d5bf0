//! Checkout Example
//!
//! This example fills a cart from a fixture catalog, applies the requested discounts
//! and prints the receipt.
//!
//! Use `-f` (or `KITCART_FIXTURE`) to load a fixture set by name
//! Use `-c` to apply a coupon code
//! Use `-s` to verify the shopper as a student
//! Use `-p` to redeem loyalty points
//! Use `-q` to set the quantity of each project
//!
//! Set `RUST_LOG=kitcart=debug` to trace every cart action.

use std::{
    io::{self, Write},
    sync::Arc,
    time::Instant,
};

use anyhow::Result;
use clap::Parser;
use humanize_duration::{Truncate, prelude::DurationExt};
use tracing_subscriber::EnvFilter;

use kitcart::{
    config::PricingConfig,
    fixtures::Fixture,
    receipt::Receipt,
    session::{CartSession, Collaborators},
    store::MemoryStore,
    utils::ExampleCartArgs,
    verification::{SimulatedVerifier, StudentDocument},
};

/// Checkout Example
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_err| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = ExampleCartArgs::parse();

    let fixture = Fixture::from_set(&args.fixture)?;
    let config = PricingConfig::from_set(&args.fixture)?;

    let collaborators = Collaborators {
        coupons: Arc::new(fixture.coupon_directory().with_latency(config.latency)),
        verifier: Arc::new(SimulatedVerifier::new(config.latency)),
    };

    let mut session = CartSession::start("demo", &config, collaborators, MemoryStore::new());

    let mut ids: Vec<&str> = fixture
        .projects()
        .values()
        .filter(|project| project.price(args.package).is_some())
        .map(|project| project.id.as_str())
        .collect();

    ids.sort_unstable();

    for id in ids {
        let line = fixture.line(id, args.package)?;

        for _ in 0..args.quantity {
            session.add_item(line.clone());
        }
    }

    let start = Instant::now();

    if let Some(code) = args.coupon.as_deref() {
        match session.apply_coupon(code).await {
            Ok(coupon) => tracing::info!("{}", coupon.confirmation(config.currency)),
            Err(err) => tracing::warn!("{err}"),
        }
    }

    if args.student {
        session
            .verify_student(&StudentDocument::new("student-id.png", Vec::new()))
            .await;
    }

    session.toggle_points(args.points);

    let elapsed = start.elapsed();

    let Some(order) = session.checkout() else {
        tracing::warn!("no projects offered as {}", args.package);
        return Ok(());
    };

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    Receipt::from(order).write_to(&mut handle)?;

    writeln!(
        handle,
        " Collaborators answered in {} ({}s)",
        elapsed.human(Truncate::Nano),
        elapsed.as_secs_f32()
    )?;

    writeln!(handle, " Points remaining: {}", session.points_balance())?;

    Ok(())
}
