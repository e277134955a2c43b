//! Human-readable value formatting for tooltips and summaries

use geolens_core::{FieldSource, PropertyValue};

/// Format a property for display.
///
/// Integers get thousands separators, other numbers at most two decimals,
/// booleans read `Yes`/`No`, null is empty.
pub fn format_value(value: &PropertyValue) -> String {
    match value {
        PropertyValue::Null => String::new(),
        PropertyValue::Bool(true) => "Yes".into(),
        PropertyValue::Bool(false) => "No".into(),
        PropertyValue::Number(n) => format_number(*n, 2),
        PropertyValue::String(s) => s.clone(),
    }
}

/// `n` rounded to `decimals`, trailing zeros dropped, thousands grouped.
pub fn format_number(n: f64, decimals: usize) -> String {
    if !n.is_finite() {
        return n.to_string();
    }
    let fixed = format!("{:.*}", decimals, n);
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, f.trim_end_matches('0')),
        None => (fixed.as_str(), ""),
    };
    let (sign, digits) = match int_part.strip_prefix('-') {
        Some(d) => ("-", d),
        None => ("", int_part),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    // "-0" after rounding a tiny negative number
    let sign = if grouped.chars().all(|c| c == '0') && frac_part.is_empty() { "" } else { sign };
    if frac_part.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac_part}")
    }
}

/// Area in square meters as m², ha or km².
pub fn format_area(square_meters: f64) -> String {
    if square_meters < 10_000.0 {
        format!("{} m²", format_number(square_meters, 0))
    } else if square_meters < 1_000_000.0 {
        format!("{} ha", format_number(square_meters / 10_000.0, 2))
    } else {
        format!("{} km²", format_number(square_meters / 1_000_000.0, 2))
    }
}

/// Length in kilometers as m or km.
pub fn format_length(km: f64) -> String {
    if km < 1.0 {
        format!("{} m", format_number(km * 1000.0, 0))
    } else {
        format!("{} km", format_number(km, 2))
    }
}

/// `field: value` lines for the listed fields an item carries.
pub fn tooltip(fields: &[String], item: &impl FieldSource) -> Option<String> {
    let lines: Vec<String> = fields
        .iter()
        .filter_map(|f| item.field(f).map(|v| format!("{f}: {}", format_value(v))))
        .collect();
    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geolens_core::TabularRecord;

    #[test]
    fn values() {
        assert_eq!(format_value(&PropertyValue::Number(1234567.0)), "1,234,567");
        assert_eq!(format_value(&PropertyValue::Number(1234.567)), "1,234.57");
        assert_eq!(format_value(&PropertyValue::Number(-1500.5)), "-1,500.5");
        assert_eq!(format_value(&PropertyValue::Number(0.001)), "0");
        assert_eq!(format_value(&PropertyValue::Bool(true)), "Yes");
        assert_eq!(format_value(&PropertyValue::Null), "");
        assert_eq!(format_value(&PropertyValue::from("Paris")), "Paris");
    }

    #[test]
    fn areas_and_lengths() {
        assert_eq!(format_area(950.4), "950 m²");
        assert_eq!(format_area(25_000.0), "2.5 ha");
        assert_eq!(format_area(3_141_592.0), "3.14 km²");
        assert_eq!(format_length(0.25), "250 m");
        assert_eq!(format_length(12.346), "12.35 km");
    }

    #[test]
    fn tooltip_lists_present_fields() {
        let r = TabularRecord::new().with("name", "a").with("pop", 12000.0);
        let fields = vec!["name".to_string(), "missing".to_string(), "pop".to_string()];
        assert_eq!(tooltip(&fields, &r).as_deref(), Some("name: a\npop: 12,000"));
        assert_eq!(tooltip(&[], &r), None);
    }
}
