//! String helpers shared by normalization, mention correction, ranking, and
//! source aggregation.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Interface chrome that Google AI Overview captures include around the answer.
static AI_OVERVIEW_BOILERPLATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?im)^[ \t]*(?:ai overview|ai mode|learn more|show more|show all|dive deeper in ai mode|generative ai is experimental\.?|ai responses may include mistakes\.?(?:[ \t]+(?:learn more|for legal advice, consult a professional\.))?)[ \t]*(?:\r?\n|$)",
    )
    .expect("valid ai overview boilerplate regex")
});

/// Removes combining marks after canonical decomposition: `"Condé"` → `"Conde"`.
#[must_use]
pub fn strip_diacritics(s: &str) -> String {
    s.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Case- and diacritic-insensitive comparison key.
#[must_use]
pub fn fold(s: &str) -> String {
    strip_diacritics(s).to_lowercase()
}

/// Unicode case-insensitive equality, matching how ranking lowercases text.
#[must_use]
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

#[must_use]
pub fn count_non_ascii(s: &str) -> usize {
    s.chars().filter(|c| !c.is_ascii()).count()
}

#[must_use]
pub fn is_ai_overview(provider: &str) -> bool {
    let p = provider.to_ascii_lowercase();
    p.contains("ai_overview") || p == "google"
}

/// Returns the part of a response that is the actual answer.
///
/// AI Overview captures have their interface labels removed; other providers
/// are returned unchanged.
#[must_use]
pub fn extract_answer_text<'a>(provider: &str, text: &'a str) -> Cow<'a, str> {
    if is_ai_overview(provider) {
        AI_OVERVIEW_BOILERPLATE.replace_all(text, "")
    } else {
        Cow::Borrowed(text)
    }
}

/// Byte index of the first case-insensitive occurrence of `needle_lower` in
/// `haystack_lower`. Both arguments must already be lowercased.
#[must_use]
pub fn find_lowered(haystack_lower: &str, needle_lower: &str) -> Option<usize> {
    if needle_lower.is_empty() {
        return None;
    }
    haystack_lower.find(needle_lower)
}

/// Bare hostname of a cited URL: lowercased with any leading `www.` removed.
///
/// URLs missing a scheme are retried with `https://`. Returns `None` when no
/// host can be extracted.
#[must_use]
pub fn domain_from_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let parsed = url::Url::parse(trimmed)
        .ok()
        .filter(|u| u.host_str().is_some())
        .or_else(|| url::Url::parse(&format!("https://{trimmed}")).ok())?;

    let host = parsed.host_str()?.to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    if host.is_empty() {
        None
    } else {
        Some(host.to_string())
    }
}

/// Shortens text to at most `max_chars` characters, appending `…` when cut.
#[must_use]
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let collapsed: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        return collapsed;
    }
    let mut out: String = collapsed.chars().take(max_chars).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_accents() {
        assert_eq!(strip_diacritics("Condé Nast"), "Conde Nast");
        assert_eq!(strip_diacritics("Škoda Müller"), "Skoda Muller");
    }

    #[test]
    fn fold_lowercases_and_strips() {
        assert_eq!(fold("CONDÉ"), "conde");
    }

    #[test]
    fn case_insensitive_beyond_ascii() {
        assert!(eq_ignore_case("ÉCOLE", "École"));
        assert!(eq_ignore_case("Nike", "NIKE"));
        assert!(!eq_ignore_case("Ecole", "École"));
    }

    #[test]
    fn counts_non_ascii_chars() {
        assert_eq!(count_non_ascii("Condé"), 1);
        assert_eq!(count_non_ascii("Conde"), 0);
    }

    #[test]
    fn ai_overview_boilerplate_removed() {
        let raw = "AI Overview\nNike leads the market.\nAI responses may include mistakes. Learn more\nShow more";
        let cleaned = extract_answer_text("ai_overviews", raw);
        assert_eq!(cleaned.trim(), "Nike leads the market.");
    }

    #[test]
    fn other_providers_untouched() {
        let raw = "AI Overview\nNike";
        assert!(matches!(
            extract_answer_text("openai", raw),
            Cow::Borrowed(_)
        ));
    }

    #[test]
    fn domain_strips_www_and_lowercases() {
        assert_eq!(
            domain_from_url("https://WWW.Example.com/path?q=1").as_deref(),
            Some("example.com")
        );
    }

    #[test]
    fn domain_without_scheme() {
        assert_eq!(
            domain_from_url("news.example.org/article").as_deref(),
            Some("news.example.org")
        );
    }

    #[test]
    fn domain_of_garbage_is_none() {
        assert_eq!(domain_from_url(""), None);
        assert_eq!(domain_from_url("   "), None);
    }

    #[test]
    fn excerpt_truncates_on_char_boundary() {
        assert_eq!(excerpt("héllo   world", 5), "héllo…");
        assert_eq!(excerpt("short", 10), "short");
    }
}
