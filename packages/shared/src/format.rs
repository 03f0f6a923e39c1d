//! Display helpers for server and player data.

/// Remove carriage returns and line feeds.
///
/// Some server names carry embedded line breaks that break single-line layouts.
pub fn strip_line_breaks(text: &str) -> String {
    text.chars().filter(|c| *c != '\r' && *c != '\n').collect()
}

/// Convert a two-letter country code into its regional-indicator flag emoji.
///
/// Returns an empty string for anything that is not exactly two ASCII letters.
pub fn country_flag(code: &str) -> String {
    let code = code.trim();
    if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return String::new();
    }

    code.chars()
        .filter_map(|c| char::from_u32(0x1F1A5 + c.to_ascii_uppercase() as u32))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_line_breaks() {
        // テスト項目: 改行文字が取り除かれる
        assert_eq!(strip_line_breaks("Frankfurt\r\nServer 1\n"), "FrankfurtServer 1");
        assert_eq!(strip_line_breaks("plain"), "plain");
    }

    #[test]
    fn test_country_flag() {
        // テスト項目: 国コードが旗の絵文字に変換される
        assert_eq!(country_flag("fi"), "🇫🇮");
        assert_eq!(country_flag("DE"), "🇩🇪");
    }

    #[test]
    fn test_country_flag_invalid_code() {
        // テスト項目: 不正な国コードは空文字列になる
        assert_eq!(country_flag(""), "");
        assert_eq!(country_flag("x"), "");
        assert_eq!(country_flag("usa"), "");
        assert_eq!(country_flag("1a"), "");
    }
}
