/// `(major, minor)` of a dotted version string, tolerating suffixes like `1.4.0-beta2`.
pub(crate) fn major_minor(version: &str) -> Option<(u64, u64)> {
    let mut parts = version.trim().trim_start_matches('v').split('.');
    let major = leading_number(parts.next()?)?;
    let minor = leading_number(parts.next()?)?;
    Some((major, minor))
}

fn leading_number(part: &str) -> Option<u64> {
    let digits: String = part.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}

/// Patch versions are compatible; anything else is not.
pub(crate) fn same_minor(declared: &str, expected: &str) -> bool {
    match (major_minor(declared), major_minor(expected)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}
