use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::ParsingError;
use crate::SectionNode;
use crate::normalize::{flatten_text, strip_boilerplate, strip_points};
use crate::section::{NumberingStyle, parse_numbered};

/// Parse a single task or rubric block.
///
/// Boilerplate is always removed first. Points phrases are removed before
/// segmentation when `delete_points` is set, except for
/// [`NumberingStyle::UppercaseNoDot`] where the points phrase is the label
/// terminator and the label grammar already keeps it out of content.
/// `style: None` is a passthrough: the trimmed text comes back as a leaf.
pub fn parse_task(
    text: &str,
    style: Option<NumberingStyle>,
    delete_points: bool,
) -> SectionNode {
    let cleaned = strip_boilerplate(text);
    let cleaned = if delete_points && style != Some(NumberingStyle::UppercaseNoDot) {
        strip_points(&cleaned)
    } else {
        cleaned
    };

    match style {
        Some(style) => parse_numbered(&cleaned, style),
        None => SectionNode::Leaf(cleaned.trim().to_string()),
    }
}

/// Parse a task block with a nested subtask level.
///
/// When the outer parse finds no structure, the whole text is retried with
/// the subtask style directly; some papers skip the task level and number
/// subtasks at the top. A task whose own sub-parse stays flat keeps its flat
/// text. Inner keys are renamed `exercitiul_X` -> `subpunctul_X`; `enunt`
/// survives at both levels unchanged.
pub fn parse_subtask(
    text: &str,
    task_style: NumberingStyle,
    subtask_style: NumberingStyle,
) -> SectionNode {
    let tasks = match parse_task(text, Some(task_style), true) {
        SectionNode::Leaf(_) => {
            tracing::debug!(?task_style, ?subtask_style, "no task-level labels, retrying with subtask style");
            return parse_task(text, Some(subtask_style), true);
        }
        SectionNode::Branch(tasks) => tasks,
    };

    let mut parsed: IndexMap<String, SectionNode> = IndexMap::new();
    for (key, node) in tasks {
        if key == "enunt" {
            parsed.insert(key, node);
            continue;
        }
        let task_text = match &node {
            SectionNode::Leaf(text) => text.clone(),
            SectionNode::Branch(_) => {
                parsed.insert(key, node);
                continue;
            }
        };

        match parse_task(&task_text, Some(subtask_style), true) {
            SectionNode::Leaf(_) => {
                parsed.insert(key, SectionNode::Leaf(task_text));
            }
            SectionNode::Branch(sub) => {
                let renamed: IndexMap<String, SectionNode> = sub
                    .into_iter()
                    .map(|(subkey, value)| {
                        if subkey == "enunt" {
                            (subkey, value)
                        } else {
                            let label = subkey.trim_start_matches("exercitiul_");
                            (format!("subpunctul_{label}"), value)
                        }
                    })
                    .collect();
                parsed.insert(key, SectionNode::Branch(renamed));
            }
        }
    }

    SectionNode::Branch(parsed)
}

static SOURCE_INTRO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)Citi(?:ţ|ț)i,?\s*cu aten(?:ţ|ț)ie,?\s*(?:sursa|sursele)(?:\s*(?:istorice|istorică))?\s*de\s*mai\s*jos\s*:",
    )
    .unwrap()
});

/// Parse a subject built around a quoted historical source.
///
/// The "Citiți cu atenție sursa … de mai jos:" lead-in is dropped, the
/// passage up to the "Pornind" task introduction becomes `"sursa"`, and the
/// remainder is parsed as numbered tasks under `"cerinta"`. A subject of
/// this shape without a "Pornind" boundary cannot be split and fails the
/// whole unit.
pub fn parse_sourced_tasks(text: &str) -> Result<SectionNode, ParsingError> {
    let without_intro = SOURCE_INTRO.replace(text, "");
    let split = without_intro
        .find("Pornind")
        .ok_or(ParsingError::SourceNotFound)?;

    let sursa = flatten_text(&without_intro[..split]);
    let cerinta = parse_task(
        &without_intro[split..],
        Some(NumberingStyle::Number),
        true,
    );

    let mut map = IndexMap::new();
    map.insert("sursa".to_string(), SectionNode::Leaf(sursa));
    map.insert("cerinta".to_string(), cerinta);
    Ok(SectionNode::Branch(map))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_strips_points_before_segmentation() {
        let node = parse_task(
            "1. Primul text. 2 puncte\n2. Al doilea text.",
            Some(NumberingStyle::Number),
            true,
        );
        let map = node.as_branch().expect("branch");
        assert_eq!(map["exercitiul_1"].as_leaf(), Some("Primul text."));
        assert_eq!(map["exercitiul_2"].as_leaf(), Some("Al doilea text."));
    }

    #[test]
    fn rubric_keeps_points_in_content() {
        let node = parse_task(
            "1. Se acordă 2 puncte pentru răspuns.\n2. Oficiu.",
            Some(NumberingStyle::Barem),
            false,
        );
        let map = node.as_branch().expect("branch");
        assert_eq!(
            map["exercitiul_1"].as_leaf(),
            Some("Se acordă 2 puncte pentru răspuns.")
        );
    }

    #[test]
    fn passthrough_style_returns_trimmed_leaf() {
        let node = parse_task("  Analizați conceptul de adevăr.  ", None, false);
        assert_eq!(node.as_leaf(), Some("Analizați conceptul de adevăr."));
    }

    #[test]
    fn task_removes_ministry_letterhead() {
        let text = "Ministerul Educaţiei Naţionale\nExamenul de bacalaureat\nPagina 1 din 2\n1. Prima cerință.\n2. A doua cerință.";
        let node = parse_task(text, Some(NumberingStyle::Number), true);
        let map = node.as_branch().expect("branch");
        assert!(!map.contains_key("enunt"));
        assert_eq!(map["exercitiul_1"].as_leaf(), Some("Prima cerință."));
    }

    #[test]
    fn subtask_renames_inner_keys() {
        let text = "A. Tema principală.\n1. prima sarcină\n2. a doua sarcină\nB. Fără subpuncte aici.";
        let node = parse_subtask(text, NumberingStyle::Uppercase, NumberingStyle::Number);
        let map = node.as_branch().expect("branch");
        let a = map["exercitiul_a"].as_branch().expect("nested branch");
        assert_eq!(a["enunt"].as_leaf(), Some("Tema principală."));
        assert_eq!(a["subpunctul_1"].as_leaf(), Some("prima sarcină"));
        assert_eq!(a["subpunctul_2"].as_leaf(), Some("a doua sarcină"));
        assert_eq!(
            map["exercitiul_b"].as_leaf(),
            Some("Fără subpuncte aici.")
        );
    }

    #[test]
    fn subtask_retries_flat_text_with_inner_style() {
        // no uppercase task labels at all, subtask numbering at top level
        let text = "1. prima\n2. a doua";
        let node = parse_subtask(text, NumberingStyle::Uppercase, NumberingStyle::Number);
        let map = node.as_branch().expect("branch");
        assert_eq!(map["exercitiul_1"].as_leaf(), Some("prima"));
        assert_eq!(map["exercitiul_2"].as_leaf(), Some("a doua"));
    }

    #[test]
    fn sourced_subject_splits_on_pornind() {
        let text = "Citiţi, cu atenţie, sursa de mai jos:\nLa 1 decembrie 1918 s-a\nproclamat unirea.\nPornind de la această sursă, răspundeţi:\n1. Precizaţi secolul. 2 puncte\n2. Menţionaţi spaţiul istoric. 2 puncte";
        let node = parse_sourced_tasks(text).expect("split");
        let map = node.as_branch().expect("branch");
        assert_eq!(
            map["sursa"].as_leaf(),
            Some("La 1 decembrie 1918 s-a proclamat unirea.")
        );
        let cerinta = map["cerinta"].as_branch().expect("cerinta branch");
        assert_eq!(
            cerinta["enunt"].as_leaf(),
            Some("Pornind de la această sursă, răspundeţi:")
        );
        assert_eq!(
            cerinta["exercitiul_1"].as_leaf(),
            Some("Precizaţi secolul.")
        );
        assert_eq!(
            cerinta["exercitiul_2"].as_leaf(),
            Some("Menţionaţi spaţiul istoric.")
        );
    }

    #[test]
    fn sourced_subject_without_boundary_is_an_error() {
        let text = "Citiţi, cu atenţie, sursa de mai jos:\nUn text fără cerinţe.";
        assert!(matches!(
            parse_sourced_tasks(text),
            Err(ParsingError::SourceNotFound)
        ));
    }
}
