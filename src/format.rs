//! Display helpers for monetary and percentage values
//!
//! Cosmetic boundary formatting; "-" stands in for values that are
//! undefined or not yet known.

/// "$1,234.56" with thousands separators; "-" when undefined
pub fn format_usd(x: Option<f64>) -> String {
    match x {
        Some(v) if v.is_finite() => {
            let sign = if v < 0.0 { "-" } else { "" };
            let cents = format!("{:.2}", v.abs());
            let (whole, frac) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));
            format!("{sign}${}.{frac}", group_thousands(whole))
        }
        _ => "-".to_string(),
    }
}

/// "1.23%" from a fraction; "-" when undefined
pub fn format_pct(x: Option<f64>) -> String {
    match x {
        Some(v) if v.is_finite() => format!("{:.2}%", v * 100.0),
        _ => "-".to_string(),
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_usd() {
        assert_eq!(format_usd(Some(1234567.891)), "$1,234,567.89");
        assert_eq!(format_usd(Some(0.5)), "$0.50");
        assert_eq!(format_usd(Some(-42.0)), "-$42.00");
        assert_eq!(format_usd(None), "-");
        assert_eq!(format_usd(Some(f64::NAN)), "-");
    }

    #[test]
    fn test_format_pct() {
        assert_eq!(format_pct(Some(0.0123)), "1.23%");
        assert_eq!(format_pct(Some(-0.005)), "-0.50%");
        assert_eq!(format_pct(None), "-");
    }
}
