//! Wallet address and display string helpers.

/// Whether `s` is a `0x`-prefixed, 40 hex digit address. Case is not checked.
pub fn is_valid_address(s: &str) -> bool {
    match s.strip_prefix("0x") {
        Some(hex) => hex.len() == 40 && hex.bytes().all(|b| b.is_ascii_hexdigit()),
        None => false,
    }
}

/// Where [`truncate`] elides characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    Start,
    #[default]
    Middle,
    End,
}

/// Shortens `s` to `length` characters around an ellipsis.
///
/// Strings whose trimmed length fits are returned unchanged. `Middle` keeps
/// the larger half at the front for odd lengths.
pub fn truncate(s: &str, length: usize, position: Position) -> String {
    let trimmed: Vec<char> = s.trim().chars().collect();
    if trimmed.len() <= length {
        return s.to_string();
    }
    let head = |n: usize| trimmed[..n].iter().collect::<String>();
    let tail = |n: usize| trimmed[trimmed.len() - n..].iter().collect::<String>();
    match position {
        Position::Start => format!("...{}", tail(length)),
        Position::Middle => {
            let first = length - length / 2;
            format!("{}...{}", head(first), tail(length / 2))
        }
        Position::End => format!("{}...", head(length)),
    }
}

/// Uppercases the first character of `s`.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
