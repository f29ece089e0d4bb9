use crate::error::{Result, StarDustError};

/// Convert an isotope label in `Element-MassNumber` form (e.g. `"Si-28"`) into the
/// database column convention `MassNumberElement` (e.g. `"28Si"`).
pub fn to_database_name(label: &str) -> Result<String> {
    let trimmed = label.trim();
    let mut parts = trimmed.split('-');

    let (element, mass) = match (parts.next(), parts.next(), parts.next()) {
        (Some(element), Some(mass), None) => (element, mass),
        (_, None, _) => return Err(format_error(label, "missing '-' separator")),
        _ => return Err(format_error(label, "more than one '-' separator")),
    };

    if element.is_empty() {
        return Err(format_error(label, "empty element symbol"));
    }
    if mass.is_empty() {
        return Err(format_error(label, "empty mass number"));
    }

    Ok(format!("{mass}{element}"))
}

fn format_error(label: &str, reason: &'static str) -> StarDustError {
    StarDustError::Format {
        label: label.to_string(),
        reason,
    }
}
