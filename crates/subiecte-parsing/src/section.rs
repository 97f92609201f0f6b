use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::SectionNode;
use crate::normalize::flatten_text;

/// Numbering style of a labeled list inside a subject or rubric block.
///
/// Each style pairs a label grammar with a boundary rule. The original
/// grammars express boundaries as lookaheads; the regex crate has no
/// lookahead, so content is taken as the slice between one label match and
/// the next (or a terminating points phrase, or end of text).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberingStyle {
    /// `1.` .. `10.`; a trailing "N puncte" phrase also ends the content.
    Number,
    /// `1.` with any digit count, no points boundary (rubric lists).
    Barem,
    /// `A.`
    Uppercase,
    /// `A 4 puncte` -- the points phrase *is* the label terminator and is
    /// consumed by the label match, never included in content.
    UppercaseNoDot,
    /// `a)`
    Lowercase,
    /// `A.` or `a.`
    Letter,
}

struct StyleSpec {
    /// Label match with no positional requirement; used for the first label,
    /// which may sit mid-line after preamble text.
    label: &'static Regex,
    /// Newline-preceded label; every label after the first must start a line,
    /// otherwise it is ordinary content.
    line_label: &'static Regex,
    /// Optional content terminator scanned inside the current section.
    stop: Option<&'static Regex>,
}

macro_rules! style_regexes {
    ($any:ident, $line:ident, $pat:literal) => {
        static $any: Lazy<Regex> = Lazy::new(|| Regex::new($pat).unwrap());
        static $line: Lazy<Regex> = Lazy::new(|| Regex::new(concat!(r"\n", $pat)).unwrap());
    };
}

style_regexes!(NUMBER_LABEL, NUMBER_LINE, r"((?:10|[0-9]))\.\s+");
style_regexes!(BAREM_LABEL, BAREM_LINE, r"(\d+)\.\s+");
style_regexes!(UPPER_LABEL, UPPER_LINE, r"([A-Z])\.\s+");
style_regexes!(UPPER_ND_LABEL, UPPER_ND_LINE, r"([A-Z])\s+\d+\s+puncte\s*");
style_regexes!(LOWER_LABEL, LOWER_LINE, r"([a-z])\)\s+");
style_regexes!(LETTER_LABEL, LETTER_LINE, r"([A-Za-z])\.\s+");

static POINTS_STOP: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+\d+\s+puncte").unwrap());

impl NumberingStyle {
    fn spec(&self) -> StyleSpec {
        match self {
            NumberingStyle::Number => StyleSpec {
                label: &NUMBER_LABEL,
                line_label: &NUMBER_LINE,
                stop: Some(&POINTS_STOP),
            },
            NumberingStyle::Barem => StyleSpec {
                label: &BAREM_LABEL,
                line_label: &BAREM_LINE,
                stop: None,
            },
            NumberingStyle::Uppercase => StyleSpec {
                label: &UPPER_LABEL,
                line_label: &UPPER_LINE,
                stop: None,
            },
            NumberingStyle::UppercaseNoDot => StyleSpec {
                label: &UPPER_ND_LABEL,
                line_label: &UPPER_ND_LINE,
                stop: None,
            },
            NumberingStyle::Lowercase => StyleSpec {
                label: &LOWER_LABEL,
                line_label: &LOWER_LINE,
                stop: None,
            },
            NumberingStyle::Letter => StyleSpec {
                label: &LETTER_LABEL,
                line_label: &LETTER_LINE,
                stop: None,
            },
        }
    }
}

/// One discovered section: label text plus the content slice bounds.
struct RawSection<'t> {
    label: &'t str,
    content: &'t str,
}

fn scan_sections<'t>(text: &'t str, spec: &StyleSpec) -> (Option<usize>, Vec<RawSection<'t>>) {
    let mut sections = Vec::new();
    let mut first_label_start = None;

    // (label start, content start, label text) of the section being read
    let mut cur = spec.label.captures(text).map(|c| {
        let m = c.get(0).expect("match 0 always present");
        (m.start(), m.end(), c.get(1).expect("label group").as_str())
    });

    while let Some((label_start, content_start, label)) = cur.take() {
        if first_label_start.is_none() {
            first_label_start = Some(label_start);
        }
        let rest = &text[content_start..];

        let line_caps = spec.line_label.captures(rest);
        let line_at = line_caps
            .as_ref()
            .map(|c| c.get(0).expect("match 0").start());
        let stop_match = spec.stop.and_then(|re| re.find(rest));
        let stop_at = stop_match.as_ref().map(|m| m.start());

        match (stop_at, line_at) {
            // The points phrase terminates this section's content; label
            // scanning resumes right after it and may match mid-line again.
            (Some(s), l) if l.is_none_or(|l| s < l) => {
                sections.push(RawSection {
                    label,
                    content: &rest[..s],
                });
                let resume = content_start + stop_match.expect("stop_at implies match").end();
                cur = spec.label.captures(&text[resume..]).map(|c| {
                    let m = c.get(0).expect("match 0");
                    (
                        resume + m.start(),
                        resume + m.end(),
                        c.get(1).expect("label group").as_str(),
                    )
                });
            }
            (_, Some(l)) => {
                let caps = line_caps.expect("line_at implies captures");
                let m = caps.get(0).expect("match 0");
                sections.push(RawSection {
                    label,
                    content: &rest[..l],
                });
                cur = Some((
                    content_start + m.start(),
                    content_start + m.end(),
                    caps.get(1).expect("label group").as_str(),
                ));
            }
            (_, None) => {
                sections.push(RawSection {
                    label,
                    content: rest,
                });
            }
        }
    }

    (first_label_start, sections)
}

/// Segment `text` into labeled sections according to `style`.
///
/// Zero labels is the "not a list" soft fallback: the flattened text comes
/// back as a leaf, never an error. Otherwise text before the first label
/// becomes an `"enunt"` preamble key and every section becomes
/// `exercitiul_{label}` (label lowercased and trimmed). Source documents do
/// not guarantee unique labels; a recurring label appends its content with a
/// newline separator instead of overwriting.
pub fn parse_numbered(text: &str, style: NumberingStyle) -> SectionNode {
    let spec = style.spec();
    let (first_label_start, sections) = scan_sections(text, &spec);

    if sections.is_empty() {
        return SectionNode::Leaf(flatten_text(text));
    }

    let mut map: IndexMap<String, SectionNode> = IndexMap::new();

    let preamble = text[..first_label_start.unwrap_or(0)].trim();
    if !preamble.is_empty() {
        map.insert("enunt".to_string(), SectionNode::Leaf(preamble.to_string()));
    }

    for section in sections {
        let key = format!("exercitiul_{}", section.label.trim().to_lowercase());
        let content = section.content.trim();
        match map.entry(key) {
            indexmap::map::Entry::Occupied(mut entry) => {
                if let SectionNode::Leaf(existing) = entry.get_mut() {
                    existing.push('\n');
                    existing.push_str(content);
                }
            }
            indexmap::map::Entry::Vacant(entry) => {
                entry.insert(SectionNode::Leaf(content.to_string()));
            }
        }
    }

    SectionNode::Branch(map)
}
