use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::models::SubType;

/// Leading instruction code: scope letter (I internal, E external) plus
/// sequence number, e.g. "I141" in "I141 - Procedimiento de altas".
static TITLE_CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([IE])(\d+)").unwrap());

/// Parsed instruction title code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TitleCode {
    pub prefix: char,
    pub seq: u32,
}

/// Parse the leading scope letter + sequence number from an instruction
/// title. Returns `None` for titles that carry no code.
pub fn parse_title_code(title: &str) -> Option<TitleCode> {
    let caps = TITLE_CODE_RE.captures(title.trim_start())?;
    let prefix = caps.get(1)?.as_str().chars().next()?;
    let seq: u32 = caps.get(2)?.as_str().parse().ok()?;
    Some(TitleCode { prefix, seq })
}

/// Scope letters requested by an intent's sub-type. Absent or "both" means
/// one winner for each letter.
pub fn requested_prefixes(sub_type: Option<SubType>) -> &'static [char] {
    match sub_type {
        Some(SubType::Internal) => &['I'],
        Some(SubType::External) => &['E'],
        Some(SubType::Both) | None => &['I', 'E'],
    }
}

/// Select the most recent instruction per requested prefix: "most recent"
/// is the highest title sequence number, not any stored timestamp. Ties
/// keep the first-fetched document (store-arrival order).
pub fn resolve_latest(docs: &[Value], prefixes: &[char]) -> Vec<Value> {
    let mut winners = Vec::with_capacity(prefixes.len());

    for &prefix in prefixes {
        let mut best: Option<(u32, &Value)> = None;
        for doc in docs {
            let Some(code) = doc
                .get("title")
                .and_then(Value::as_str)
                .and_then(parse_title_code)
            else {
                continue;
            };
            if code.prefix != prefix {
                continue;
            }
            if best.is_none_or(|(seq, _)| code.seq > seq) {
                best = Some((code.seq, doc));
            }
        }
        if let Some((_, doc)) = best {
            winners.push(doc.clone());
        }
    }

    winners
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn instruction(id: &str, title: &str) -> Value {
        json!({"id": id, "title": title})
    }

    #[test]
    fn test_parse_title_code() {
        assert_eq!(
            parse_title_code("I141 - Procedimiento de altas"),
            Some(TitleCode { prefix: 'I', seq: 141 })
        );
        assert_eq!(
            parse_title_code("E3 - Corresponsales"),
            Some(TitleCode { prefix: 'E', seq: 3 })
        );
        assert_eq!(parse_title_code("  I10"), Some(TitleCode { prefix: 'I', seq: 10 }));
    }

    #[test]
    fn test_parse_title_code_rejects_uncoded_titles() {
        assert_eq!(parse_title_code("Manual de caja"), None);
        assert_eq!(parse_title_code("X12 - Otra cosa"), None);
        assert_eq!(parse_title_code("I - sin numero"), None);
        assert_eq!(parse_title_code(""), None);
    }

    #[test]
    fn test_latest_internal_picks_highest_sequence() {
        let docs = vec![
            instruction("a", "I10 - X"),
            instruction("b", "I141 - Y"),
            instruction("c", "E3 - Z"),
        ];
        let winners = resolve_latest(&docs, requested_prefixes(Some(SubType::Internal)));
        assert_eq!(winners.len(), 1);
        assert_eq!(winners[0]["title"], "I141 - Y");
    }

    #[test]
    fn test_latest_both_returns_one_per_prefix() {
        let docs = vec![
            instruction("a", "I10 - X"),
            instruction("b", "I141 - Y"),
            instruction("c", "E3 - Z"),
            instruction("d", "E25 - W"),
        ];
        let winners = resolve_latest(&docs, requested_prefixes(None));
        assert_eq!(winners.len(), 2);
        assert_eq!(winners[0]["title"], "I141 - Y");
        assert_eq!(winners[1]["title"], "E25 - W");
    }

    #[test]
    fn test_latest_tie_keeps_arrival_order() {
        let docs = vec![
            instruction("first", "I7 - Primera"),
            instruction("second", "I7 - Segunda"),
        ];
        let winners = resolve_latest(&docs, &['I']);
        assert_eq!(winners.len(), 1);
        assert_eq!(winners[0]["id"], "first");
    }

    #[test]
    fn test_latest_skips_uncoded_titles() {
        let docs = vec![
            instruction("a", "Manual general"),
            instruction("b", "I2 - Unica codificada"),
            json!({"id": "c"}),
        ];
        let winners = resolve_latest(&docs, &['I', 'E']);
        assert_eq!(winners.len(), 1);
        assert_eq!(winners[0]["id"], "b");
    }

    #[test]
    fn test_latest_empty_input() {
        assert!(resolve_latest(&[], &['I', 'E']).is_empty());
    }

    #[test]
    fn test_numeric_comparison_not_lexicographic() {
        // I9 vs I10: numeric order must win
        let docs = vec![instruction("a", "I9 - Vieja"), instruction("b", "I10 - Nueva")];
        let winners = resolve_latest(&docs, &['I']);
        assert_eq!(winners[0]["id"], "b");
    }
}
