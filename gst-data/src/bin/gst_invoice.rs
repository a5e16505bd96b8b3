use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gst_core::InvoiceContext;
use gst_core::calculations::{GstSummary, InvoiceTotalsCalculator};
use gst_data::{InvoiceLinesLoader, LineItemLoader, Settings, SummaryReport, TotalsReport};
use rust_decimal::Decimal;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

// ─── CLI definition ──────────────────────────────────────────────────────────

/// GST invoice calculator.
///
/// Computes invoice totals with the CGST/SGST/IGST split and summarises GST
/// by rate across many invoices.
#[derive(Debug, Parser)]
#[command(name = "gst-invoice")]
#[command(version, about, long_about = None)]
struct Cli {
    /// TOML settings file (seller state, GSTIN, line-item cap, discount
    /// treatment).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compute totals for one invoice from a line-item CSV.
    Totals {
        /// Line-item CSV (quantity, unit_price, gst_rate, optional discount).
        #[arg(short, long)]
        items: PathBuf,

        /// Seller's state. Defaults to the settings file.
        #[arg(long)]
        seller_state: Option<String>,

        /// Buyer's state (place of supply). Blank is treated as intra-state.
        #[arg(long, default_value = "")]
        buyer_state: String,

        /// Invoice-level discount in rupees.
        #[arg(long, default_value = "0")]
        overall_discount: Decimal,

        /// Amount already received in rupees.
        #[arg(long, default_value = "0")]
        amount_paid: Decimal,
    },

    /// Summarise GST by rate across an invoice-lines CSV.
    Summary {
        /// CSV with invoice_number, seller_state, buyer_state and line columns.
        #[arg(long)]
        invoices: PathBuf,
    },
}

// ─── tracing ─────────────────────────────────────────────────────────────────

/// Initialise the tracing subscriber.
///
/// * Honours `RUST_LOG` when set.
/// * Falls back to `info`.
/// * Writes to stderr so reports on stdout stay clean.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::from("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .init();
}

// ─── commands ────────────────────────────────────────────────────────────────

fn run_totals(
    settings: &Settings,
    items: PathBuf,
    seller_state: Option<String>,
    buyer_state: String,
    overall_discount: Decimal,
    amount_paid: Decimal,
) -> Result<()> {
    let calculator = InvoiceTotalsCalculator::new(settings.totals_config()?);
    let seller_state = settings.resolve_seller_state(seller_state.as_deref())?;

    let line_items = LineItemLoader::load_from_file(&items)
        .with_context(|| format!("Failed to load line items: {}", items.display()))?;
    info!(count = line_items.len(), "Loaded line items from {}", items.display());

    let context = InvoiceContext::new(line_items)
        .with_states(seller_state, buyer_state)
        .with_overall_discount(overall_discount)
        .with_amount_paid(amount_paid);

    let totals = calculator
        .calculate(&context)
        .context("Failed to compute invoice totals")?;

    println!("{}", TotalsReport::new(&totals));
    Ok(())
}

fn run_summary(
    settings: &Settings,
    invoices: PathBuf,
) -> Result<()> {
    let calculator = InvoiceTotalsCalculator::new(settings.totals_config()?);

    let drafts = InvoiceLinesLoader::load_from_file(&invoices)
        .with_context(|| format!("Failed to load invoices: {}", invoices.display()))?;
    info!(count = drafts.len(), "Loaded invoices from {}", invoices.display());

    let mut summary = GstSummary::new();
    for draft in &drafts {
        let totals = calculator
            .calculate(&draft.context)
            .with_context(|| format!("Invoice {} is invalid", draft.invoice_number))?;
        debug!(invoice = %draft.invoice_number, grand_total = %totals.grand_total, "Computed invoice");
        summary
            .add_invoice(&totals)
            .with_context(|| format!("Failed to add invoice {} to the summary", draft.invoice_number))?;
    }

    println!("{}", SummaryReport::new(&summary));
    Ok(())
}

// ─── entry point ─────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();

    let settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;

    match cli.command {
        Command::Totals {
            items,
            seller_state,
            buyer_state,
            overall_discount,
            amount_paid,
        } => run_totals(
            &settings,
            items,
            seller_state,
            buyer_state,
            overall_discount,
            amount_paid,
        ),
        Command::Summary { invoices } => run_summary(&settings, invoices),
    }
}
