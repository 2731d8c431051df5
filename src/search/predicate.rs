use serde_json::Value;

/// A boolean filter expression over document fields.
///
/// Field paths are dot-separated; an array encountered at any step matches
/// if any element matches, which is how clauses reach into affected-entity
/// sub-records and regulation articles. String comparisons for `Eq` and
/// `Contains` are case-insensitive; `StartsWith`/`EndsWith` are literal.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Matches every document
    All,
    Eq { field: String, value: String },
    Contains { field: String, value: String },
    StartsWith { field: String, value: String },
    EndsWith { field: String, value: String },
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

impl Predicate {
    pub fn eq(field: &str, value: &str) -> Self {
        Self::Eq {
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    pub fn contains(field: &str, value: &str) -> Self {
        Self::Contains {
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    pub fn starts_with(field: &str, value: &str) -> Self {
        Self::StartsWith {
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    pub fn ends_with(field: &str, value: &str) -> Self {
        Self::EndsWith {
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    /// Evaluate against a raw JSON document.
    pub fn eval(&self, doc: &Value) -> bool {
        match self {
            Self::All => true,
            Self::Eq { field, value } => {
                field_matches(doc, field, &|s| s.to_lowercase() == value.to_lowercase())
            }
            Self::Contains { field, value } => {
                field_matches(doc, field, &|s| s.to_lowercase().contains(&value.to_lowercase()))
            }
            Self::StartsWith { field, value } => {
                field_matches(doc, field, &|s| s.starts_with(value.as_str()))
            }
            Self::EndsWith { field, value } => {
                field_matches(doc, field, &|s| s.ends_with(value.as_str()))
            }
            Self::And(clauses) => clauses.iter().all(|c| c.eval(doc)),
            Self::Or(clauses) => clauses.iter().any(|c| c.eval(doc)),
        }
    }
}

fn field_matches(doc: &Value, path: &str, matcher: &dyn Fn(&str) -> bool) -> bool {
    let segments: Vec<&str> = path.split('.').collect();
    descend(doc, &segments, matcher)
}

fn descend(value: &Value, segments: &[&str], matcher: &dyn Fn(&str) -> bool) -> bool {
    if let Value::Array(items) = value {
        return items.iter().any(|v| descend(v, segments, matcher));
    }
    match segments.split_first() {
        None => leaf_matches(value, matcher),
        Some((head, rest)) => value
            .get(head)
            .is_some_and(|v| descend(v, rest, matcher)),
    }
}

fn leaf_matches(value: &Value, matcher: &dyn Fn(&str) -> bool) -> bool {
    match value {
        Value::String(s) => matcher(s),
        // Numeric identifiers compare through their decimal rendering
        Value::Number(n) => matcher(&n.to_string()),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn notice() -> Value {
        json!({
            "id": "n1",
            "norm_type": "Circular",
            "number": "06/20",
            "topic": "Operativa de caja",
            "issue_date": "2020-06-15",
            "keywords": ["caja", "efectivo"],
            "affected": [
                {"name": "Entidad Uno", "entity_kind": "banco"},
                {"name": "Entidad Dos", "entity_kind": "cooperativa"}
            ]
        })
    }

    fn section() -> Value {
        json!({
            "id": "r1",
            "title": "Título II",
            "articles": [
                {"number": 12, "summary": "Obligaciones de información"},
                {"number": 13, "summary": "Régimen sancionador"}
            ]
        })
    }

    #[test]
    fn test_all_matches_everything() {
        assert!(Predicate::All.eval(&notice()));
        assert!(Predicate::All.eval(&json!({})));
    }

    #[test]
    fn test_eq_is_case_insensitive() {
        assert!(Predicate::eq("norm_type", "circular").eval(&notice()));
        assert!(Predicate::eq("norm_type", "CIRCULAR").eval(&notice()));
        assert!(!Predicate::eq("norm_type", "instruccion").eval(&notice()));
    }

    #[test]
    fn test_contains_substring_case_insensitive() {
        assert!(Predicate::contains("topic", "CAJA").eval(&notice()));
        assert!(!Predicate::contains("topic", "pagos").eval(&notice()));
    }

    #[test]
    fn test_starts_and_ends_with() {
        assert!(Predicate::starts_with("issue_date", "2020").eval(&notice()));
        assert!(!Predicate::starts_with("issue_date", "2021").eval(&notice()));
        assert!(Predicate::ends_with("number", "/20").eval(&notice()));
        assert!(!Predicate::ends_with("number", "/21").eval(&notice()));
    }

    #[test]
    fn test_keyword_list_matches_any_element() {
        assert!(Predicate::contains("keywords", "efectivo").eval(&notice()));
        assert!(!Predicate::contains("keywords", "valores").eval(&notice()));
    }

    #[test]
    fn test_nested_path_through_array() {
        assert!(Predicate::contains("affected.name", "entidad dos").eval(&notice()));
        assert!(Predicate::eq("affected.entity_kind", "banco").eval(&notice()));
        assert!(!Predicate::contains("affected.name", "entidad tres").eval(&notice()));
    }

    #[test]
    fn test_article_paths() {
        assert!(Predicate::contains("articles.summary", "sancionador").eval(&section()));
        // stored as a number, matched through its decimal rendering
        assert!(Predicate::eq("articles.number", "12").eval(&section()));
        assert!(!Predicate::contains("articles.summary", "capital").eval(&section()));
    }

    #[test]
    fn test_missing_field_never_matches() {
        assert!(!Predicate::contains("summary", "caja").eval(&notice()));
        assert!(!Predicate::contains("a.b.c", "x").eval(&notice()));
    }

    #[test]
    fn test_and_or_combinators() {
        let both = Predicate::And(vec![
            Predicate::eq("norm_type", "Circular"),
            Predicate::contains("topic", "caja"),
        ]);
        assert!(both.eval(&notice()));

        let either = Predicate::Or(vec![
            Predicate::contains("topic", "pagos"),
            Predicate::contains("topic", "caja"),
        ]);
        assert!(either.eval(&notice()));

        let neither = Predicate::Or(vec![
            Predicate::contains("topic", "pagos"),
            Predicate::contains("topic", "valores"),
        ]);
        assert!(!neither.eval(&notice()));
    }

    #[test]
    fn test_empty_and_matches_empty_or_does_not() {
        assert!(Predicate::And(vec![]).eval(&notice()));
        assert!(!Predicate::Or(vec![]).eval(&notice()));
    }
}
