use once_cell::sync::Lazy;
use regex::Regex;

use crate::search::predicate::Predicate;
use crate::store::CollectionKind;

/// Normative type label carried by circular notices.
pub const CIRCULAR_LABEL: &str = "Circular";

/// "NN/YY" circular identifier, e.g. "06/20" or "3/21".
static NOTICE_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,2}/\d{2}$").unwrap());

/// Compile keywords and an optional year into a filter predicate for one
/// collection. Pure: the same inputs always yield a structurally equal tree.
///
/// Clause layering:
/// 1. A keyword shaped like a circular number compiles, for the notice
///    collection, to an exact-match on the number field alone. High
///    precision beats generic matching, so every other clause is dropped.
/// 2. Each keyword must match at least one searchable field of the target
///    collection (OR across fields); keywords combine with AND.
/// 3. A year must match the issue date, or, for notices, a circular number
///    ending in the two-digit year.
pub fn compile(keywords: &[String], target: CollectionKind, year: Option<i32>) -> Predicate {
    if target == CollectionKind::Notice {
        if let Some(code) = keywords.iter().find(|k| NOTICE_NUMBER_RE.is_match(k.trim())) {
            return Predicate::And(vec![
                Predicate::eq("norm_type", CIRCULAR_LABEL),
                Predicate::eq("number", code.trim()),
            ]);
        }
    }

    let fields = search_fields(target);
    let mut clauses: Vec<Predicate> = Vec::new();

    for keyword in keywords {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            continue;
        }
        clauses.push(Predicate::Or(
            fields
                .iter()
                .map(|field| Predicate::contains(field, keyword))
                .collect(),
        ));
    }

    if let Some(year) = year {
        clauses.push(year_clause(target, year));
    }

    match clauses.len() {
        0 => Predicate::All,
        1 => clauses.swap_remove(0),
        _ => Predicate::And(clauses),
    }
}

fn year_clause(target: CollectionKind, year: i32) -> Predicate {
    let mut arms = vec![Predicate::starts_with("issue_date", &year.to_string())];
    if target == CollectionKind::Notice {
        arms.push(Predicate::And(vec![
            Predicate::eq("norm_type", CIRCULAR_LABEL),
            Predicate::ends_with("number", &format!("/{:02}", year.rem_euclid(100))),
        ]));
    }
    Predicate::Or(arms)
}

/// Searchable fields per collection, deduplicated preserving order.
fn search_fields(target: CollectionKind) -> Vec<&'static str> {
    let raw: &[&str] = match target {
        CollectionKind::Notice => &[
            "norm_type",
            "number",
            "summary",
            "topic",
            "keywords",
            "affected.name",
            "affected.entity_kind",
        ],
        CollectionKind::Instruction => &["title", "summary", "keywords", "norm_type"],
        CollectionKind::Regulation => &["title", "articles.summary", "articles.keywords"],
    };

    let mut fields = Vec::with_capacity(raw.len());
    for field in raw {
        if !fields.contains(field) {
            fields.push(*field);
        }
    }
    fields
}
