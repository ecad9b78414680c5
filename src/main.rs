// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{bail, Context, Result};
use chrono::Local;
use honey_books::{format_rupiah, format_signed_for_report, AppConfig, Books, Period};
use std::env;

/// Log lines on stderr would draw over the TUI's alternate screen, so the
/// viewer stays silent unless RUST_LOG asks otherwise
fn default_log_filter(command: Option<&str>) -> &'static str {
    match command {
        None => "off",
        Some(_) => "info",
    }
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let filter = default_log_filter(args.get(1).map(String::as_str));
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();
    let books = Books::new(AppConfig::from_env());

    match args.get(1).map(String::as_str) {
        Some("seed") => run_seed(&books)?,
        Some("report") => run_report(&books, &args[2..])?,
        Some(other) => {
            eprintln!("❌ Unknown command: {}", other);
            eprintln!("   Usage: honey-books [seed | report <tahun> <bulan> [--json]]");
            std::process::exit(2);
        }
        // UI mode (default)
        None => run_ui_mode(&books)?,
    }

    Ok(())
}

fn run_seed(books: &Books) -> Result<()> {
    println!("🍯 Seeding demo opening balances");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let created = books
        .seed_demo()
        .context("Failed to write demo opening balances")?;
    let path = books.config().opening_path();
    if created {
        println!("✓ Created {}", path.display());
    } else {
        println!("✓ {} already exists, left untouched", path.display());
    }
    Ok(())
}

fn run_report(books: &Books, args: &[String]) -> Result<()> {
    let json = args.iter().any(|a| a == "--json");
    let positional: Vec<&String> = args.iter().filter(|a| !a.starts_with("--")).collect();

    let default = books.config().default_period;
    let period = match positional.as_slice() {
        [] => default,
        [tahun, bulan] => Period::parse(tahun, bulan)?,
        _ => bail!("Usage: honey-books report <tahun> <bulan> [--json]"),
    };
    let today = Local::now().date_naive();

    let tb = books.trial_balance(period, today).context("Failed to build trial balance")?;
    let income = books.income_statement(period, today)?;
    let balance = books.balance_sheet(period, today)?;
    let equity = books.equity_change(period, today)?;

    if json {
        let out = serde_json::json!({
            "periode": period.to_string(),
            "neraca_saldo": tb,
            "laba_rugi": income,
            "posisi_keuangan": balance,
            "perubahan_ekuitas": equity,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("📊 Laporan {}", period);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    if tb.is_empty() {
        println!("Tidak ada data untuk periode ini.");
        return Ok(());
    }

    println!("\nNeraca Saldo");
    for line in tb.sorted_by_code() {
        println!(
            "  {:<10} {:<40} {:<6} {:>18} {:>18}",
            line.code,
            line.name,
            line.side.as_str(),
            format_rupiah(line.debit),
            format_rupiah(line.credit)
        );
    }
    println!(
        "  {:<58} {:>18} {:>18}",
        "Total",
        format_rupiah(tb.total_debit()),
        format_rupiah(tb.total_credit())
    );

    println!("\nLaba Rugi");
    println!("  {:<40} {:>18}", "Pendapatan", format_rupiah(income.totals.revenue));
    println!("  {:<40} {:>18}", "Retur penjualan", format_rupiah(income.totals.sales_returns));
    println!("  {:<40} {:>18}", "Penjualan bersih", format_rupiah(income.net_sales));
    println!("  {:<40} {:>18}", "Harga pokok penjualan", format_rupiah(income.totals.cogs));
    println!("  {:<40} {:>18}", "Laba kotor", format_rupiah(income.gross_profit));
    println!("  {:<40} {:>18}", "Beban", format_rupiah(income.totals.expenses));
    println!("  {:<40} {:>18}", "Laba bersih", format_rupiah(income.net_profit));

    println!("\nPosisi Keuangan");
    for group in &balance.groups {
        println!("  {}", group.name);
        for category in &group.categories {
            for sub in &category.subcategories {
                println!("    {}", sub.name);
                for item in &sub.items {
                    println!("      {:<36} {:>18}", item.name, format_signed_for_report(item.amount));
                }
            }
        }
        println!("  {:<40} {:>18}", format!("Total {}", group.name), format_signed_for_report(group.total));
    }

    println!("\nPerubahan Ekuitas");
    for (label, amount) in equity.rows() {
        println!("  {:<40} {:>18}", label, format_rupiah(amount));
    }
    println!("  {:<40} {:>18}", "Modal Akhir", format_rupiah(equity.closing_capital));

    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(books: &Books) -> Result<()> {
    println!("🖥️  Loading Honey Books UI...\n");

    let today = Local::now().date_naive();
    let mut period = books.config().default_period;
    if period > Period::of_date(today) {
        period = Period::of_date(today);
    }

    println!("Starting UI for {}... (Press 'q' to quit)\n", period);

    let mut app = ui::App::new(books, period, today)?;
    ui::run_ui(&mut app)?;

    println!("\n✅ UI closed successfully");

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_books: &Books) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use the API: cargo run --bin honey-server --features server");
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tui_mode_logs_nothing_by_default() {
        assert_eq!(default_log_filter(None), "off");
        assert_eq!(default_log_filter(Some("report")), "info");
        assert_eq!(default_log_filter(Some("seed")), "info");
    }
}
