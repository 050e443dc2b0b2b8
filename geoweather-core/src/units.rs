//! Temperature unit symbol chosen from the user's locale.

pub const CELSIUS: &str = "°C";
pub const FAHRENHEIT: &str = "°F";

/// Regions that display Fahrenheit.
const FAHRENHEIT_REGIONS: [&str; 3] = ["US", "LR", "MM"];

/// Returns the unit symbol for a locale tag such as `en-US`, `en_US.UTF-8` or `[my_MM]`.
///
/// Anything without a recognizable region falls back to Celsius.
pub fn unit_for(locale_tag: &str) -> &'static str {
    match region_of(locale_tag) {
        Some(region) if FAHRENHEIT_REGIONS.contains(&region.as_str()) => FAHRENHEIT,
        _ => CELSIUS,
    }
}

/// Extracts the region subtag (two letters or three digits) following the language subtag.
fn region_of(locale_tag: &str) -> Option<String> {
    let tag = locale_tag.trim().trim_start_matches('[').trim_end_matches(']');
    // POSIX locales carry a codeset and modifier: `en_US.UTF-8@euro`.
    let tag = tag.split(['.', '@', ',']).next()?;

    let mut subtags = tag.split(['-', '_']);
    let language = subtags.next()?;
    if language.is_empty() || !language.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }

    subtags
        .find(|s| is_region(s))
        .map(|s| s.to_ascii_uppercase())
}

fn is_region(subtag: &str) -> bool {
    match subtag.len() {
        2 => subtag.chars().all(|c| c.is_ascii_alphabetic()),
        3 => subtag.chars().all(|c| c.is_ascii_digit()),
        _ => false,
    }
}
