//! GFocus CLI
//!
//! Command-line checkout for GFocus: browse plans, pay, and wait for the
//! payment backend to confirm.

mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gfocus_checkout::{CheckoutOutcome, PaymentConfirmationWorkflow, cancel_pair};
use gfocus_client::CheckoutClient;
use gfocus_sandbox::{SandboxServer, SandboxStore};
use gfocus_types::{PaymentMethod, Plan, PlanKey, TransactionCode};

#[derive(Parser)]
#[command(name = "gfocus")]
#[command(author, version, about = "GFocus checkout CLI", long_about = None)]
struct Cli {
    /// Base URL of the payment backend
    #[arg(
        long,
        global = true,
        env = "GFOCUS_API_URL",
        default_value = "http://localhost:8080"
    )]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the plan catalog
    Plans {
        /// Show yearly pricing instead of monthly
        #[arg(long)]
        yearly: bool,
    },
    /// List payment methods
    Methods,
    /// Generate a transaction code for a plan
    Code {
        /// Plan key (free, pro-monthly, pro-yearly, enterprise-monthly, enterprise-yearly)
        #[arg(long)]
        plan: Option<String>,
    },
    /// Pay for a plan and wait for confirmation
    Checkout {
        /// Contact email for the license
        #[arg(long)]
        email: String,
        /// Plan key; unknown keys fall back to pro-monthly
        #[arg(long)]
        plan: Option<String>,
        /// Seats to buy on per-user plans
        #[arg(long, default_value_t = 1)]
        users: u32,
        /// Payment method (card, qr, momo, paypal)
        #[arg(long, default_value = "qr")]
        method: String,
        /// Reuse an existing transaction code instead of generating one
        #[arg(long)]
        code: Option<String>,
    },
    /// Run a local stand-in for the payment backend
    Sandbox {
        /// Port to listen on
        #[arg(long, default_value = "8080")]
        port: u16,
        /// Settle pending payments as paid on the N-th status check
        #[arg(long)]
        auto_settle_after: Option<u32>,
    },
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,gfocus_checkout=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Plans { yearly } => {
            let mut plans = Vec::new();
            for plan in Plan::for_cycle(yearly) {
                let mut entry = serde_json::to_value(plan)?;
                if let Some(savings) = plan.yearly_savings() {
                    entry["yearly_savings"] = serde_json::to_value(savings)?;
                }
                plans.push(entry);
            }
            println!("{}", serde_json::to_string_pretty(&plans)?);
        }

        Commands::Methods => {
            let methods: Vec<_> = PaymentMethod::all()
                .iter()
                .map(|m| {
                    serde_json::json!({
                        "id": m.id(),
                        "name": m.name(),
                        "description": m.description(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&methods)?);
        }

        Commands::Code { plan } => {
            let plan = resolve_plan(plan.as_deref());
            println!("{}", TransactionCode::for_plan(plan.name));
        }

        Commands::Checkout {
            email,
            plan,
            users,
            method,
            code,
        } => {
            let plan = resolve_plan(plan.as_deref());
            if plan.price.is_free() {
                anyhow::bail!("The {} plan is free, there is nothing to pay", plan.name);
            }
            let method: PaymentMethod = method.parse()?;
            let code = match code {
                Some(raw) => raw.parse::<TransactionCode>()?,
                None => TransactionCode::for_plan(plan.name),
            };

            if plan.per_user {
                println!(
                    "Order: {} plan, {} seats at {} {}, total {}",
                    plan.name,
                    plan.billed_seats(users),
                    plan.price,
                    plan.billing,
                    plan.total_for(users)
                );
            } else {
                println!("Order: {} plan, {} {}", plan.name, plan.price, plan.billing);
            }
            println!("Transaction code: {}", code);
            println!("{}", method.instructions(plan, users, &code));
            if method.needs_transfer_note() {
                println!("The note must match the code exactly, or the payment cannot be matched.");
            }
            println!("Verifying payment... (Ctrl+C to stop)");

            let config = config::Config::from_env()?;
            tracing::debug!(api_url = %cli.api_url, ?config, "Starting checkout");
            let workflow = PaymentConfirmationWorkflow::with_policy(
                CheckoutClient::new(&cli.api_url)?,
                config.poll_policy(),
            );

            let (handle, token) = cancel_pair();
            tokio::spawn(handle.cancel_on(tokio::signal::ctrl_c()));

            let report = workflow
                .confirm_payment_until(&email, plan.wire_id(), &code, token)
                .await?;

            match report.outcome {
                CheckoutOutcome::Paid { license_key } => {
                    println!("✓ Payment confirmed");
                    if let Some(key) = license_key {
                        println!("License key: {}", key);
                    }
                }
                CheckoutOutcome::Rejected {
                    paid_amount,
                    required_amount,
                } => {
                    println!("✗ Payment does not cover the plan");
                    println!(
                        "  Paid: {}, required: {}",
                        format_amount(paid_amount),
                        format_amount(required_amount)
                    );
                    std::process::exit(1);
                }
                CheckoutOutcome::TimedOut => {
                    println!(
                        "… Payment still pending after {}s. Check back later with code {}",
                        config.poll_timeout.as_secs(),
                        code
                    );
                    std::process::exit(1);
                }
                CheckoutOutcome::Cancelled => {
                    println!("✗ Verification stopped. Your code is {}", code);
                    std::process::exit(1);
                }
            }
        }

        Commands::Sandbox {
            port,
            auto_settle_after,
        } => {
            let store = match auto_settle_after {
                Some(polls) => SandboxStore::with_auto_settle(polls),
                None => SandboxStore::new(),
            };
            SandboxServer::new(store)
                .run(&format!("127.0.0.1:{}", port))
                .await?;
        }
    }

    Ok(())
}

fn format_amount(amount: Option<f64>) -> String {
    amount
        .map(|a| format!("{}", a))
        .unwrap_or_else(|| "unknown".to_string())
}

/// Resolves `--plan`, falling back to Pro monthly like the payment page.
fn resolve_plan(key: Option<&str>) -> &'static Plan {
    let plan = Plan::resolve(key);
    if let Some(raw) = key {
        if raw.parse::<PlanKey>().is_err() {
            tracing::warn!(plan = raw, fallback = plan.wire_id(), "Unknown plan, using fallback");
        }
    }
    plan
}
