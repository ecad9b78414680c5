// 💰 Amount parsing & Rupiah formatting
// Form input uses "." for thousands and "," for decimals (1.234.567,50)

use num_format::{Locale, ToFormattedString};

/// Parse a user-entered Rupiah amount. Never fails: empty or garbage input is 0.0
pub fn parse_amount(text: &str) -> f64 {
    let s = text.trim();
    if s.is_empty() {
        return 0.0;
    }

    // Drop thousand separators first, then turn the decimal comma into a point
    let normalized = s.replace('.', "").replace(',', ".");
    match normalized.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Parse a numeric cell from a storage file (plain float, "." as decimal point)
/// Returns None for empty cells and for anything that is not a number
pub fn parse_cell(text: &str) -> Option<f64> {
    let s = text.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse an integer cell; "34.0" style float cells are truncated
pub fn parse_int_cell(text: &str) -> Option<i64> {
    let s = text.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<i64>()
        .ok()
        .or_else(|| parse_cell(s).map(|v| v.trunc() as i64))
}

fn group_thousands(value: i64) -> String {
    value.to_formatted_string(&Locale::en).replace(',', ".")
}

/// Display format: rounds to the nearest integer ("Rp 1.234.568")
pub fn format_rupiah(amount: f64) -> String {
    if amount == 0.0 || !amount.is_finite() {
        return "Rp 0".to_string();
    }
    format!("Rp {}", group_thousands(amount.round_ties_even() as i64))
}

/// Report format: truncates toward zero ("Rp 1.234.567")
pub fn format_rupiah_for_report(amount: f64) -> String {
    if amount == 0.0 || !amount.is_finite() {
        return "Rp 0".to_string();
    }
    format!("Rp {}", group_thousands(amount.trunc() as i64))
}

/// Balance-sheet cell: negative amounts get a leading "-" before "Rp"
pub fn format_signed_for_report(amount: f64) -> String {
    if amount >= 0.0 {
        format_rupiah_for_report(amount)
    } else {
        format!("-{}", format_rupiah_for_report(amount.abs()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount_locale_format() {
        assert_eq!(parse_amount("1.234,56"), 1234.56);
        assert_eq!(parse_amount("1.234.567,50"), 1234567.50);
        assert_eq!(parse_amount("1000000"), 1000000.0);
        assert_eq!(parse_amount("  250.000 "), 250000.0);
    }

    #[test]
    fn test_parse_amount_garbage_is_zero() {
        assert_eq!(parse_amount(""), 0.0);
        assert_eq!(parse_amount("   "), 0.0);
        assert_eq!(parse_amount("abc"), 0.0);
        assert_eq!(parse_amount("12a"), 0.0);
        assert_eq!(parse_amount("inf"), 0.0);
    }

    #[test]
    fn test_parse_cells() {
        assert_eq!(parse_cell("1500000.5"), Some(1500000.5));
        assert_eq!(parse_cell(""), None);
        assert_eq!(parse_cell("n/a"), None);
        assert_eq!(parse_int_cell("34"), Some(34));
        assert_eq!(parse_int_cell("34.9"), Some(34));
        assert_eq!(parse_int_cell("x"), None);
    }

    #[test]
    fn test_format_rupiah() {
        assert_eq!(format_rupiah(0.0), "Rp 0");
        assert_eq!(format_rupiah(1234567.0), "Rp 1.234.567");
        assert_eq!(format_rupiah(999.0), "Rp 999");
        assert_eq!(format_rupiah(f64::NAN), "Rp 0");
        assert_eq!(format_rupiah(-20000.0), "Rp -20.000");
    }

    #[test]
    fn test_display_rounds_report_truncates() {
        assert_eq!(format_rupiah(1234.7), "Rp 1.235");
        assert_eq!(format_rupiah_for_report(1234.7), "Rp 1.234");
        assert_eq!(format_rupiah_for_report(0.4), "Rp 0");
    }

    #[test]
    fn test_signed_report_format() {
        assert_eq!(format_signed_for_report(5000000.0), "Rp 5.000.000");
        assert_eq!(format_signed_for_report(-750000.0), "-Rp 750.000");
        assert_eq!(format_signed_for_report(0.0), "Rp 0");
    }
}
