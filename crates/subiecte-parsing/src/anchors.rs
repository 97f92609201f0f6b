use once_cell::sync::Lazy;
use regex::Regex;

use crate::ParsingError;

/// Which versioned anchor set to use for subject segmentation.
///
/// The corpus spans document templates: recent papers carry the exact
/// "Subiectul I (30 de puncte)" headings, while older scanned papers go
/// through OCR that confuses the Roman numeral I with visually similar
/// glyphs and sometimes drops or mangles the point counts. Exactly one set
/// is active per extraction call; callers pick the era matching their
/// corpus slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CorpusEra {
    #[default]
    Modern,
    EarlyScan,
}

impl std::str::FromStr for CorpusEra {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "modern" => Ok(CorpusEra::Modern),
            "early-scan" => Ok(CorpusEra::EarlyScan),
            other => Err(format!(
                "unknown corpus era '{other}' (expected 'modern' or 'early-scan')"
            )),
        }
    }
}

static MODERN_ANCHORS: Lazy<[Regex; 3]> = Lazy::new(|| {
    let fill = r"[\s_]*";
    let dash = r"\s*(?:-|–)\s*";
    let points = r"\(30\s+de\s+puncte\)";
    [
        Regex::new(&format!(r"(?i)Subiectul\s+I{fill}{points}")).unwrap(),
        Regex::new(&format!(r"(?i)Subiectul\s+al\s+II{dash}lea{fill}{points}")).unwrap(),
        Regex::new(&format!(r"(?i)Subiectul\s+al\s+III{dash}lea{fill}{points}")).unwrap(),
    ]
});

// OCR renders the Roman numeral I as any of I ! l |; point counts, when
// present at all, sit in loose whitespace/underscore padding.
static EARLY_SCAN_ANCHORS: Lazy<[Regex; 3]> = Lazy::new(|| {
    let fill = r"[\s_]*";
    let dash = r"\s*(?:-|–)\s*";
    let points = r"(?:\(?\d+[\s_]+(?:de[\s_]+)?puncte\)?)?";
    [
        Regex::new(&format!(r"(?i)Subiectul\s+[I!l|]{fill}{points}")).unwrap(),
        Regex::new(&format!(
            r"(?i)Subiectul\s+(?:al\s+)?[I!l|]{{2}}(?:{dash}lea)?{fill}{points}"
        ))
        .unwrap(),
        Regex::new(&format!(
            r"(?i)Subiectul\s+(?:al\s+)?[I!l|]{{3}}(?:{dash}lea)?{fill}{points}"
        ))
        .unwrap(),
    ]
});

impl CorpusEra {
    fn anchors(&self) -> &'static [Regex; 3] {
        match self {
            CorpusEra::Modern => &MODERN_ANCHORS,
            CorpusEra::EarlyScan => &EARLY_SCAN_ANCHORS,
        }
    }
}

/// Whether every subject anchor of the era matches somewhere in `text`.
/// A miss means layout extraction produced unusable output (scanned page,
/// broken encoding) and the caller should fall back to OCR.
pub fn anchors_present(text: &str, era: CorpusEra) -> bool {
    era.anchors().iter().all(|re| re.is_match(text))
}

/// Split a full exam document into its top-level subject blocks.
///
/// Window i spans from the end of anchor i to the start of anchor i+1 found
/// after it; the last window runs to the end of the text. Any window that
/// cannot be resolved fails the whole operation with the 1-based subject
/// index -- fatal for the enclosing version unit, not retried.
pub fn extract_subjects(text: &str, era: CorpusEra) -> Result<Vec<String>, ParsingError> {
    let anchors = era.anchors();
    let mut subjects = Vec::with_capacity(anchors.len());

    for (i, anchor) in anchors.iter().enumerate() {
        let m = anchor
            .find(text)
            .ok_or(ParsingError::SubjectNotFound { index: i + 1 })?;
        let start = m.end();

        let end = match anchors.get(i + 1) {
            Some(next) => {
                let n = next
                    .find(&text[start..])
                    .ok_or(ParsingError::SubjectNotFound { index: i + 1 })?;
                start + n.start()
            }
            None => text.len(),
        };

        subjects.push(text[start..end].trim().to_string());
    }

    Ok(subjects)
}
