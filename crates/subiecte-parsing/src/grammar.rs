use indexmap::IndexMap;

use subiecte_core::{ParsedExam, SectionNode, SubjectResult};

use crate::compose::{parse_sourced_tasks, parse_subtask, parse_task};
use crate::normalize::flatten_text;
use crate::section::NumberingStyle;
use crate::{GrammarError, ParsingError};

/// How one subject's task block is segmented.
///
/// Rules are data rather than callables so a grammar table can be inspected
/// and tested without running a parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskRule {
    /// Single-level numbered parse; `None` is the flat passthrough.
    Plain(Option<NumberingStyle>),
    /// Two-level parse: task labels with a subtask numbering inside each.
    Nested {
        task: NumberingStyle,
        subtask: NumberingStyle,
    },
    /// Quoted-source subject: a "sursa" passage plus numbered requirements.
    Sourced,
}

/// How one subject's rubric block is segmented. Rubrics never strip points
/// phrases; the award amounts are the content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RubricRule {
    pub style: Option<NumberingStyle>,
}

impl TaskRule {
    pub fn apply(&self, text: &str) -> Result<SectionNode, ParsingError> {
        match self {
            TaskRule::Plain(style) => Ok(parse_task(text, *style, true)),
            TaskRule::Nested { task, subtask } => Ok(parse_subtask(text, *task, *subtask)),
            TaskRule::Sourced => parse_sourced_tasks(text),
        }
    }
}

impl RubricRule {
    pub fn apply(&self, text: &str) -> SectionNode {
        parse_task(text, self.style, false)
    }
}

/// Task and rubric rules for one subject position.
#[derive(Debug, Clone, Copy)]
pub struct SubjectGrammar {
    pub task: TaskRule,
    pub rubric: RubricRule,
}

/// The complete rule table for one exam field, one entry per subject.
#[derive(Debug, Clone, Copy)]
pub struct FieldGrammar {
    pub name: &'static str,
    pub subjects: &'static [SubjectGrammar],
}

const fn subject(task: TaskRule, rubric_style: Option<NumberingStyle>) -> SubjectGrammar {
    SubjectGrammar {
        task,
        rubric: RubricRule {
            style: rubric_style,
        },
    }
}

const NUMBER_TASK: TaskRule = TaskRule::Plain(Some(NumberingStyle::Number));
const FLAT_TASK: TaskRule = TaskRule::Plain(None);
const BAREM: Option<NumberingStyle> = Some(NumberingStyle::Barem);
const FLAT_BAREM: Option<NumberingStyle> = None;
const UPPER_ND_BAREM: Option<NumberingStyle> = Some(NumberingStyle::UppercaseNoDot);

/// Both biology tracks share the same house style.
const BIOLOGIE: &[SubjectGrammar] = &[
    subject(
        TaskRule::Nested {
            task: NumberingStyle::UppercaseNoDot,
            subtask: NumberingStyle::Number,
        },
        UPPER_ND_BAREM,
    ),
    subject(
        TaskRule::Nested {
            task: NumberingStyle::UppercaseNoDot,
            subtask: NumberingStyle::Lowercase,
        },
        UPPER_ND_BAREM,
    ),
    subject(NUMBER_TASK, BAREM),
];

static FIELD_GRAMMARS: &[FieldGrammar] = &[
    FieldGrammar {
        name: "biologie_anatomie",
        subjects: BIOLOGIE,
    },
    FieldGrammar {
        name: "biologie_vegetala_animala",
        subjects: BIOLOGIE,
    },
    FieldGrammar {
        name: "economie",
        subjects: &[
            subject(
                TaskRule::Nested {
                    task: NumberingStyle::Uppercase,
                    subtask: NumberingStyle::Number,
                },
                BAREM,
            ),
            subject(FLAT_TASK, FLAT_BAREM),
            subject(NUMBER_TASK, BAREM),
        ],
    },
    FieldGrammar {
        name: "filosofie",
        subjects: &[
            subject(NUMBER_TASK, BAREM),
            subject(
                TaskRule::Plain(Some(NumberingStyle::Uppercase)),
                Some(NumberingStyle::Uppercase),
            ),
            subject(
                TaskRule::Nested {
                    task: NumberingStyle::Uppercase,
                    subtask: NumberingStyle::Number,
                },
                Some(NumberingStyle::Uppercase),
            ),
        ],
    },
    FieldGrammar {
        name: "istorie",
        subjects: &[
            subject(TaskRule::Sourced, BAREM),
            subject(TaskRule::Sourced, BAREM),
            subject(FLAT_TASK, BAREM),
        ],
    },
    FieldGrammar {
        name: "logica",
        subjects: &[
            subject(FLAT_TASK, FLAT_BAREM),
            subject(FLAT_TASK, FLAT_BAREM),
            subject(FLAT_TASK, FLAT_BAREM),
        ],
    },
    FieldGrammar {
        name: "psihologie",
        subjects: &[
            subject(NUMBER_TASK, BAREM),
            subject(FLAT_TASK, FLAT_BAREM),
            subject(FLAT_TASK, FLAT_BAREM),
        ],
    },
    FieldGrammar {
        name: "sociologie",
        subjects: &[
            subject(FLAT_TASK, FLAT_BAREM),
            subject(
                TaskRule::Plain(Some(NumberingStyle::Letter)),
                Some(NumberingStyle::Letter),
            ),
            subject(NUMBER_TASK, BAREM),
        ],
    },
];

/// Look up the grammar for an exam field. Field names mirror the on-disk
/// corpus directory names. An unknown name is a configuration error and
/// aborts the run before any unit is touched.
pub fn field_grammar(name: &str) -> Result<&'static FieldGrammar, GrammarError> {
    FIELD_GRAMMARS
        .iter()
        .find(|g| g.name == name)
        .ok_or_else(|| GrammarError::UnknownField(name.to_string()))
}

/// Names of all registered fields, in registry order.
pub fn known_fields() -> impl Iterator<Item = &'static str> {
    FIELD_GRAMMARS.iter().map(|g| g.name)
}

impl FieldGrammar {
    /// Number of subjects this field's papers are expected to contain.
    pub fn subject_count(&self) -> usize {
        self.subjects.len()
    }

    /// Assemble a full exam from segmented subject and rubric texts.
    ///
    /// Produces `subiectul_{i+1}` entries in subject order. A subject whose
    /// task or rubric parse comes out empty fails the unit; every leaf in
    /// the returned tree is flattened.
    pub fn parse(&self, subjects: &[String], rubrics: &[String]) -> Result<ParsedExam, ParsingError> {
        for got in [subjects.len(), rubrics.len()] {
            if got != self.subjects.len() {
                return Err(ParsingError::SubjectCount {
                    expected: self.subjects.len(),
                    got,
                });
            }
        }

        let mut exam: ParsedExam = IndexMap::new();
        for (i, rules) in self.subjects.iter().enumerate() {
            let subiect = rules.task.apply(&subjects[i])?;
            let barem = rules.rubric.apply(&rubrics[i]);
            if subiect.is_empty() || barem.is_empty() {
                return Err(ParsingError::EmptyResult { subject: i + 1 });
            }
            exam.insert(
                format!("subiectul_{}", i + 1),
                SubjectResult {
                    subiect: subiect.map_leaves(&flatten_text),
                    barem: barem.map_leaves(&flatten_text),
                },
            );
        }
        Ok(exam)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn unknown_field_is_a_configuration_error() {
        let err = field_grammar("informatica").unwrap_err();
        assert!(matches!(err, GrammarError::UnknownField(name) if name == "informatica"));
    }

    #[test]
    fn registry_covers_all_corpus_fields() {
        let names: Vec<_> = known_fields().collect();
        assert_eq!(names.len(), 8);
        for name in [
            "biologie_anatomie",
            "biologie_vegetala_animala",
            "economie",
            "filosofie",
            "istorie",
            "logica",
            "psihologie",
            "sociologie",
        ] {
            assert!(names.contains(&name), "missing grammar for {name}");
        }
    }

    #[test]
    fn every_grammar_has_three_subjects() {
        for name in known_fields() {
            let grammar = field_grammar(name).unwrap();
            assert_eq!(grammar.subject_count(), 3, "{name}");
        }
    }

    #[test]
    fn logica_subjects_stay_flat_and_ordered() {
        let grammar = field_grammar("logica").unwrap();
        let subjects = strings(&[
            "Prima cerinţă,\ncontinuată.",
            "A doua cerinţă.",
            "A treia cerinţă.",
        ]);
        let rubrics = strings(&["Se acordă 10 puncte.", "20 de puncte.", "30 de puncte."]);
        let exam = grammar.parse(&subjects, &rubrics).unwrap();

        let keys: Vec<_> = exam.keys().cloned().collect();
        assert_eq!(keys, vec!["subiectul_1", "subiectul_2", "subiectul_3"]);
        assert_eq!(
            exam["subiectul_1"].subiect.as_leaf(),
            Some("Prima cerinţă, continuată.")
        );
        // rubric text keeps its points phrases
        assert_eq!(
            exam["subiectul_1"].barem.as_leaf(),
            Some("Se acordă 10 puncte.")
        );
    }

    #[test]
    fn flat_subject_text_loses_points_phrases() {
        let grammar = field_grammar("logica").unwrap();
        let subjects = strings(&[
            "Definiţi termenul. 10 puncte",
            "Argumentaţi. 10 puncte",
            "Construiţi un silogism. 10 puncte",
        ]);
        let rubrics = strings(&["r1", "r2", "r3"]);
        let exam = grammar.parse(&subjects, &rubrics).unwrap();
        assert_eq!(
            exam["subiectul_1"].subiect.as_leaf(),
            Some("Definiţi termenul.")
        );
    }

    #[test]
    fn istorie_first_subject_splits_source_from_tasks() {
        let grammar = field_grammar("istorie").unwrap();
        let sourced = "Citiţi, cu atenţie, sursa de mai jos:\nDomnitorul a semnat actul.\nPornind de la această sursă, răspundeţi:\n1. Precizaţi secolul. 2 puncte";
        let subjects = strings(&[sourced, sourced, "Elaboraţi un eseu despre unire."]);
        let rubrics = strings(&[
            "1. Se acordă 2 puncte.",
            "1. Se acordă 2 puncte.",
            "Se punctează structura eseului.",
        ]);
        let exam = grammar.parse(&subjects, &rubrics).unwrap();

        let first = exam["subiectul_1"].subiect.as_branch().unwrap();
        assert_eq!(
            first["sursa"].as_leaf(),
            Some("Domnitorul a semnat actul.")
        );
        let cerinta = first["cerinta"].as_branch().unwrap();
        assert_eq!(
            cerinta["exercitiul_1"].as_leaf(),
            Some("Precizaţi secolul.")
        );
        assert_eq!(
            exam["subiectul_3"].subiect.as_leaf(),
            Some("Elaboraţi un eseu despre unire.")
        );
    }

    #[test]
    fn istorie_missing_source_boundary_fails_the_unit() {
        let grammar = field_grammar("istorie").unwrap();
        let subjects = strings(&["Sursa fără cerinţe.", "idem", "eseu"]);
        let rubrics = strings(&["r", "r", "r"]);
        assert!(matches!(
            grammar.parse(&subjects, &rubrics),
            Err(ParsingError::SourceNotFound)
        ));
    }

    #[test]
    fn subject_count_mismatch_is_reported() {
        let grammar = field_grammar("logica").unwrap();
        let err = grammar
            .parse(&strings(&["a", "b"]), &strings(&["r1", "r2", "r3"]))
            .unwrap_err();
        assert!(matches!(
            err,
            ParsingError::SubjectCount {
                expected: 3,
                got: 2
            }
        ));
    }

    #[test]
    fn empty_subject_text_is_rejected() {
        let grammar = field_grammar("logica").unwrap();
        let err = grammar
            .parse(&strings(&["prima", "", "a treia"]), &strings(&["r", "r", "r"]))
            .unwrap_err();
        assert!(matches!(err, ParsingError::EmptyResult { subject: 2 }));
    }

    #[test]
    fn filosofie_second_subject_uses_uppercase_labels() {
        let grammar = field_grammar("filosofie").unwrap();
        let subjects = strings(&[
            "1. Prima cerinţă.",
            "A. Analizaţi conceptul.\nB. Comparaţi poziţiile.",
            "A. Tema.\n1. prima\n2. a doua",
        ]);
        let rubrics = strings(&[
            "1. Se acordă punctaj.",
            "A. Criterii.\nB. Criterii.",
            "A. Criterii.",
        ]);
        let exam = grammar.parse(&subjects, &rubrics).unwrap();

        let second = exam["subiectul_2"].subiect.as_branch().unwrap();
        assert_eq!(second["exercitiul_a"].as_leaf(), Some("Analizaţi conceptul."));
        assert_eq!(second["exercitiul_b"].as_leaf(), Some("Comparaţi poziţiile."));

        let third = exam["subiectul_3"].subiect.as_branch().unwrap();
        let a = third["exercitiul_a"].as_branch().unwrap();
        assert_eq!(a["subpunctul_1"].as_leaf(), Some("prima"));
    }
}
