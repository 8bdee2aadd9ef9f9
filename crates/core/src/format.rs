pub const NOT_AVAILABLE: &str = "N/A";

/// Formats `value` with `decimals` fraction digits and `,` thousands separators.
pub fn grouped(value: f64, decimals: usize) -> String {
    let rendered = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match rendered.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (rendered.as_str(), None),
    };

    let mut out = String::with_capacity(rendered.len() + int_part.len() / 3 + 1);
    // "-0" is not worth showing.
    if value < 0.0 && rendered.chars().any(|c| c.is_ascii_digit() && c != '0') {
        out.push('-');
    }
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

pub fn millions(value: f64) -> String {
    if value < 0.0 {
        format!("-${}M", grouped(-value, 0))
    } else {
        format!("${}M", grouped(value, 0))
    }
}

pub fn per_share(value: f64) -> String {
    if value < 0.0 {
        format!("-${:.2}", -value)
    } else {
        format!("${value:.2}")
    }
}

pub fn signed_percent(value: f64) -> String {
    format!("{value:+.1}%")
}

pub fn percent(value: f64) -> String {
    format!("{value:.1}%")
}

pub fn or_na(value: Option<f64>, f: fn(f64) -> String) -> String {
    value.map(f).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

pub fn raw(value: Option<f64>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => NOT_AVAILABLE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grouped_inserts_separators() {
        assert_eq!(grouped(0.0, 0), "0");
        assert_eq!(grouped(999.0, 0), "999");
        assert_eq!(grouped(89500.0, 0), "89,500");
        assert_eq!(grouped(1234567.891, 2), "1,234,567.89");
        assert_eq!(grouped(-380000.0, 0), "-380,000");
        assert_eq!(grouped(-0.2, 0), "0");
    }

    #[test]
    fn money_and_percent_formats() {
        assert_eq!(millions(89500.0), "$89,500M");
        assert_eq!(millions(-120.0), "-$120M");
        assert_eq!(per_share(1.456), "$1.46");
        assert_eq!(per_share(-0.3), "-$0.30");
        assert_eq!(signed_percent(6.0), "+6.0%");
        assert_eq!(signed_percent(-2.0), "-2.0%");
        assert_eq!(percent(45.2), "45.2%");
    }

    #[test]
    fn raw_keeps_source_precision() {
        assert_eq!(raw(Some(89500.0)), "89500");
        assert_eq!(raw(Some(1.46)), "1.46");
        assert_eq!(raw(None), "N/A");
        assert_eq!(or_na(None, millions), "N/A");
    }
}
