// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Seller phone number formatting for contact links.

/// Strip everything but ASCII digits (for `wa.me/<digits>` style links).
pub fn digits_only(phone: &str) -> String {
    phone.chars().filter(char::is_ascii_digit).collect()
}

/// International form: digits only, one leading trunk `0` dropped, then
/// prefixed with `+<country_code>`. Empty input stays empty.
pub fn international(phone: &str, country_code: &str) -> String {
    let digits = digits_only(phone);
    if digits.is_empty() {
        return String::new();
    }
    let local = digits.strip_prefix('0').unwrap_or(&digits);
    format!("+{}{}", country_code, local)
}
