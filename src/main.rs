// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{bail, Context, Result};
use std::env;
use std::sync::Arc;

// Use library instead of local modules
use milk_track::{
    init_logging, Commodity, CommodityLedger, Config, DateKey, InputError, Ledgers, PriceInput,
    RecordOutcome, SqliteStore, CURRENCY_LABEL,
};

type Store = Arc<SqliteStore>;

fn main() -> Result<()> {
    let config = Config::load()?;
    init_logging(&config.log_filter);

    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        None | Some("ui") => run_ui_mode(&config)?,
        Some("help") | Some("--help") | Some("-h") => print_usage(),
        Some(command) => run_command(&config, command, &args[2..])?,
    }

    Ok(())
}

fn print_usage() {
    println!("🥛 MilkTrack {}", milk_track::VERSION);
    println!();
    println!("Usage:");
    println!("  milk-track                                  Open the terminal UI");
    println!("  milk-track record <milk|water> <date> <amount>");
    println!("  milk-track price  <milk|water> <date> <price>");
    println!("  milk-track list   <milk|water>");
    println!("  milk-track summary <milk|water> [YYYY-MM]");
    println!("  milk-track reset  <milk|water>");
}

fn open_ledgers(config: &Config) -> Result<Ledgers<Store>> {
    let store = SqliteStore::open(&config.db_path)
        .with_context(|| format!("Failed to open database {}", config.db_path.display()))?;
    Ok(Ledgers::open(Arc::new(store)))
}

fn run_command(config: &Config, command: &str, args: &[String]) -> Result<()> {
    let commodity: Commodity = args
        .first()
        .context("Missing commodity (milk or water)")?
        .parse()?;
    let rest = &args[1..];
    let arg = |i: usize| rest.get(i).map(String::as_str).unwrap_or("");

    let mut ledgers = open_ledgers(config)?;
    let ledger = ledgers.get_mut(commodity);

    match command {
        "record" => record(ledger, arg(0), arg(1)),
        "price" => set_price(ledger, arg(0), arg(1)),
        "list" => {
            list(ledger);
            Ok(())
        }
        "summary" => summary(ledger, rest.first().map(String::as_str)),
        "reset" => {
            ledger.wipe_storage()?;
            println!("✓ Cleared stored {} data", commodity);
            Ok(())
        }
        other => {
            print_usage();
            bail!("Unknown command: {}", other)
        }
    }
}

fn warn_if_unsaved(ledger: &dyn CommodityLedger) {
    if ledger.failed_saves() > 0 {
        eprintln!("⚠️  Could not write to the database; the change was not saved");
    }
}

fn record(ledger: &mut dyn CommodityLedger, date: &str, amount: &str) -> Result<()> {
    let date = DateKey::parse_opt(date);

    match ledger.record_amount(date, amount) {
        Ok(outcome) => {
            let commodity = ledger.commodity();
            let marker = match outcome {
                RecordOutcome::Recorded => "✓ Saved",
                RecordOutcome::Unchanged => "✓ Unchanged",
            };
            if let Some(date) = date {
                println!("{} {} for {}: {} {}", marker, commodity, date, amount.trim(), commodity.unit_label());
            }
            warn_if_unsaved(ledger);
            Ok(())
        }
        Err(InputError::NotReady) => bail!("Ledger not loaded"),
        Err(err) => {
            let prompt = ledger.prompt().map(str::to_string);
            bail!("{}", prompt.unwrap_or_else(|| err.to_string()))
        }
    }
}

fn set_price(ledger: &mut dyn CommodityLedger, date: &str, price: &str) -> Result<()> {
    let Some(date) = DateKey::parse_opt(date) else {
        bail!("Please select a valid date (YYYY-MM-DD)");
    };

    match ledger.set_price_override(Some(date), price)? {
        PriceInput::Committed(value) => {
            println!(
                "✓ {} price for {} set to {} {} (now the default for days without a price)",
                ledger.commodity().title(),
                date,
                CURRENCY_LABEL,
                value
            );
            warn_if_unsaved(ledger);
        }
        PriceInput::Buffered => bail!("Not a valid price: {:?}", price),
    }

    Ok(())
}

fn list(ledger: &dyn CommodityLedger) {
    let commodity = ledger.commodity();

    println!("📒 {} Record", commodity.title());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let lines = ledger.daily_lines();
    if lines.is_empty() {
        println!("  (no entries yet)");
    }
    for line in &lines {
        println!("  {}", line.describe(commodity));
    }

    println!();
    println!(
        "  Default price: {} {} (last entered)",
        CURRENCY_LABEL,
        ledger.last_entered_price()
    );
    print_totals(commodity, ledger.summary());
}

fn summary(ledger: &dyn CommodityLedger, month: Option<&str>) -> Result<()> {
    let commodity = ledger.commodity();

    match month {
        Some(text) => {
            let (year, month) = parse_month(text)?;
            println!("📊 {} Summary for {}-{:02}", commodity.title(), year, month);
            print_totals(commodity, ledger.month_summary(year, month));
        }
        None => {
            println!("📊 {} Summary (all time)", commodity.title());
            print_totals(commodity, ledger.summary());
        }
    }

    Ok(())
}

fn print_totals(commodity: Commodity, summary: milk_track::Summary) {
    println!(
        "  Total {} Consumed: {} {}",
        commodity.title(),
        summary.total_quantity,
        commodity.unit_label()
    );
    println!("  Total Cost to Pay: {} {:.0}", CURRENCY_LABEL, summary.total_cost);
}

/// "2024-07" → (2024, 7)
fn parse_month(text: &str) -> Result<(i32, u32)> {
    let (year, month) = text
        .split_once('-')
        .with_context(|| format!("Expected YYYY-MM, got {:?}", text))?;
    let year: i32 = year.parse().with_context(|| format!("Bad year in {:?}", text))?;
    let month: u32 = month.parse().with_context(|| format!("Bad month in {:?}", text))?;
    if !(1..=12).contains(&month) {
        bail!("Month out of range in {:?}", text);
    }
    Ok((year, month))
}

#[cfg(feature = "tui")]
fn run_ui_mode(config: &Config) -> Result<()> {
    println!("🥛 Loading MilkTrack...\n");

    let ledgers = open_ledgers(config)?;
    println!("✓ Database: {}", config.db_path.display());
    println!("Starting UI... (Press 'q' to quit)\n");

    let mut app = ui::App::new(ledgers, chrono::Local::now().date_naive());
    ui::run_ui(&mut app)?;

    println!("\n✅ UI closed successfully");

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_config: &Config) -> Result<()> {
    bail!("TUI mode not available. Rebuild with `--features tui` or see `milk-track help`")
}
