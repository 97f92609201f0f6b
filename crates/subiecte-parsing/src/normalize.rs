use once_cell::sync::Lazy;
use regex::Regex;

/// Collapse PDF line-wrap artifacts: any run of whitespace containing a
/// newline becomes a single space, then the result is trimmed.
pub fn flatten_text(text: &str) -> String {
    static WRAP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\n\s*").unwrap());
    WRAP_RE.replace_all(text, " ").trim().to_string()
}

/// Strip the ministry letterhead block embedded by page breaks, from the
/// "Ministerul Educației" anchor through the "Pagina N din M" footer.
/// Text without the anchor passes through unchanged.
pub fn strip_boilerplate(text: &str) -> String {
    static BOILERPLATE_RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"(?is)Ministerul\s*Educa(?:ţ|ț)iei.*?Pagina\s*\d+\s*din\s*\d+").unwrap()
    });
    BOILERPLATE_RE.replace_all(text, "").to_string()
}

/// Remove point-count phrases ("2 puncte", "30 de puncte") from task text.
pub fn strip_points(text: &str) -> String {
    static POINTS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+\s+(?:de\s+)?puncte").unwrap());
    POINTS_RE.replace_all(text, "").to_string()
}

/// The one known extraction mojibake: cedilla t-comma coming out of older
/// subject PDFs as "Åƒ". A literal replacement, applied to all extracted text.
pub fn fix_mojibake(text: &str) -> String {
    text.replace("Åƒ", "Å£")
}
