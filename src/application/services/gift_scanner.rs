use regex::Regex;
use std::sync::LazyLock;

/// Finds Nitro gift codes in message content.
pub struct GiftCodeScanner;

impl GiftCodeScanner {
    /// Returns the distinct gift codes in `content`, in order of appearance.
    ///
    /// Codes of 16 to 25 word characters are looked for first. Only when none
    /// are found is any code length accepted.
    #[must_use]
    pub fn scan(content: &str) -> Vec<String> {
        static STRICT_GIFT_RE: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"(?:discord\.gift|discord(?:app)?\.com/gifts)/(\w{16,25})\b")
                .expect("strict gift pattern")
        });

        static LOOSE_GIFT_RE: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"(?:discord\.gift|discord(?:app)?\.com/gifts)/(\w+)")
                .expect("loose gift pattern")
        });

        if !content.contains("discord") {
            return Vec::new();
        }

        let codes = Self::collect(&STRICT_GIFT_RE, content);
        if codes.is_empty() {
            Self::collect(&LOOSE_GIFT_RE, content)
        } else {
            codes
        }
    }

    fn collect(pattern: &Regex, content: &str) -> Vec<String> {
        let mut codes: Vec<String> = Vec::new();

        for cap in pattern.captures_iter(content) {
            if let Some(code) = cap.get(1) {
                let code = code.as_str().to_owned();
                if !codes.contains(&code) {
                    codes.push(code);
                }
            }
        }

        codes
    }
}
