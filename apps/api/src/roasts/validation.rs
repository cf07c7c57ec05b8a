//! Calendar query validation for the HTTP boundary. `EntryService` assumes
//! its inputs have already passed through here.

/// `year` must be exactly four ASCII digits.
pub fn validate_year(year: &str) -> Result<String, String> {
    if year.len() == 4 && year.bytes().all(|b| b.is_ascii_digit()) {
        Ok(year.to_string())
    } else {
        Err(format!(
            "year must be a 4-digit string (e.g., \"2025\"), got \"{year}\""
        ))
    }
}

/// Accepts "1".."9" or "01".."12" and returns the zero-padded form.
pub fn normalize_month(month: &str) -> Result<String, String> {
    let padded = if month.len() == 1 {
        format!("0{month}")
    } else {
        month.to_string()
    };

    let valid = padded.len() == 2
        && padded.bytes().all(|b| b.is_ascii_digit())
        && matches!(padded.parse::<u8>(), Ok(1..=12));

    if valid {
        Ok(padded)
    } else {
        Err(format!(
            "month must be a zero-padded 2-digit string from \"01\" to \"12\", got \"{month}\""
        ))
    }
}
