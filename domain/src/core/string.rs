//! String utilities for the domain layer.

/// Convert a type or operation name to snake_case.
///
/// `"Reservation"` → `"reservation"`, `"GuestProfile"` → `"guest_profile"`,
/// `"HTTPRoute"` → `"http_route"`.
pub fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len() + 4);

    for (i, &ch) in chars.iter().enumerate() {
        if ch.is_uppercase() {
            let prev_lower =
                i > 0 && (chars[i - 1].is_lowercase() || chars[i - 1].is_ascii_digit());
            let next_lower = chars.get(i + 1).is_some_and(|c| c.is_lowercase());
            let prev_upper = i > 0 && chars[i - 1].is_uppercase();
            if i > 0 && (prev_lower || (prev_upper && next_lower)) && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
        } else if ch == '-' || ch == ' ' {
            if !out.ends_with('_') {
                out.push('_');
            }
        } else {
            out.push(ch);
        }
    }

    out
}

/// Last path segment of a Rust type path (`"hotel::model::Reservation"` → `"Reservation"`).
///
/// Generic arguments are kept as written after the final segment.
pub fn simple_type_name(path: &'static str) -> &'static str {
    let head = path.split('<').next().unwrap_or(path);
    match head.rfind("::") {
        Some(idx) => &path[idx + 2..],
        None => path,
    }
}
