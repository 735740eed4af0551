//! Display formatting shared by treatment tables and case reports.

/// Format a number the way detail tables show it: exact integers without a
/// fractional part, everything else with two decimals.
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        if value.abs() < i64::MAX as f64 {
            return format!("{}", value as i64);
        }
        return format!("{:.0}", value);
    }
    format!("{:.2}", value)
}

/// Turn a field key into a column header: `atropine_mg_initial` becomes
/// `Atropine Mg Initial`.
pub fn display_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut prev_is_word = false;
    for c in key.chars() {
        let c = if c == '_' { ' ' } else { c };
        let is_word = c.is_ascii_alphanumeric();
        if is_word && !prev_is_word {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
        prev_is_word = is_word;
    }
    out
}

/// Greedy word wrap for fixed-width document lines.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.len() + word.len() + 1 > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
