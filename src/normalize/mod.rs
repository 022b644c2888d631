use std::sync::OnceLock;

use regex::Regex;

fn weekday_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(mon|tues?|wed(nes)?|thu(rs?)?|fri|sat(ur)?|sun)(day)?\b")
            .expect("weekday pattern is valid")
    })
}

fn time_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b\d{1,2}:\d{2}\b").expect("time pattern is valid"))
}

fn multi_show_suffix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"&\s*\d+(:\d+)?\s*$").expect("suffix pattern is valid"))
}

fn punctuation_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\w\s]").expect("punctuation pattern is valid"))
}

/// Canonicalize a free-text string (title, venue name) for fuzzy-equality
/// comparison. Lowercases, strips weekday names, `HH:MM` times, trailing
/// "& N" multi-show suffixes and punctuation, then collapses whitespace.
///
/// Idempotent: `normalize(normalize(x)) == normalize(x)`.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped = weekday_re().replace_all(lowered.trim(), "");
    let stripped = time_re().replace_all(&stripped, "");
    let stripped = multi_show_suffix_re().replace_all(&stripped, "");
    let stripped = punctuation_re().replace_all(&stripped, "");

    // Collapse internal whitespace and trim in one pass
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}
