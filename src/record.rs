use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

// Domain tags produced by the upstream snapshot export. Domains missing
// from a snapshot are treated as empty, never as an error.
pub const PROFILE: &str = "PROFILE";
pub const PROFILE_SUMMARY: &str = "PROFILE_SUMMARY";
pub const POSITIONS: &str = "POSITIONS";
pub const EDUCATION: &str = "EDUCATION";
pub const SKILLS: &str = "SKILLS";
pub const CERTIFICATIONS: &str = "CERTIFICATIONS";
pub const LANGUAGES: &str = "LANGUAGES";
pub const PROJECTS: &str = "PROJECTS";
pub const RECOMMENDATIONS: &str = "RECOMMENDATIONS";
pub const VOLUNTEERING: &str = "VOLUNTEERING_EXPERIENCES";

/// One flat, field-keyed unit of profile data within a domain.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Record(serde_json::Map<String, Value>);

impl Record {
    /// Tolerant field access: missing or null keys yield an empty string,
    /// strings are trimmed, numbers stringified. Renderers branch solely
    /// on emptiness to decide whether a field is displayed.
    pub fn field(&self, key: &str) -> String {
        match self.0.get(key) {
            Some(Value::String(s)) => s.trim().to_string(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }

    /// First non-empty value among synonym keys, e.g. the export writes
    /// either "Fields of Study" or "Field Of Study" depending on vintage.
    pub fn first_field(&self, keys: &[&str]) -> String {
        keys.iter()
            .map(|k| self.field(k))
            .find(|v| !v.is_empty())
            .unwrap_or_default()
    }
}

#[cfg(test)]
impl Record {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Record(map),
            _ => Record::default(),
        }
    }
}

/// The canonical record set: domain tag → ordered records. Order within a
/// domain is recency order (most recent first) and is relied on for top-N
/// truncation and "earlier roles" grouping.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordSet(HashMap<String, Vec<Record>>);

impl RecordSet {
    pub fn domain(&self, name: &str) -> &[Record] {
        self.0.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn first(&self, name: &str) -> Option<&Record> {
        self.domain(name).first()
    }

    pub fn has(&self, name: &str) -> bool {
        !self.domain(name).is_empty()
    }

    /// True when no domain holds any record at all.
    pub fn is_empty(&self) -> bool {
        self.0.values().all(Vec::is_empty)
    }

    /// (domain, record count) pairs, sorted by domain name.
    pub fn overview(&self) -> Vec<(&str, usize)> {
        let mut rows: Vec<(&str, usize)> = self
            .0
            .iter()
            .map(|(name, records)| (name.as_str(), records.len()))
            .collect();
        rows.sort();
        rows
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_key_is_empty() {
        let r = Record::from_value(json!({ "Title": "Engineer" }));
        assert_eq!(r.field("Company Name"), "");
    }

    #[test]
    fn null_is_empty() {
        let r = Record::from_value(json!({ "Title": null }));
        assert_eq!(r.field("Title"), "");
    }

    #[test]
    fn strings_are_trimmed() {
        let r = Record::from_value(json!({ "Title": "  Engineer  " }));
        assert_eq!(r.field("Title"), "Engineer");
    }

    #[test]
    fn numbers_are_stringified() {
        let r = Record::from_value(json!({ "Team Size": 7000 }));
        assert_eq!(r.field("Team Size"), "7000");
    }

    #[test]
    fn synonym_fallback() {
        let r = Record::from_value(json!({ "Field Of Study": "Computer Science" }));
        assert_eq!(
            r.first_field(&["Fields of Study", "Field Of Study"]),
            "Computer Science"
        );
    }

    #[test]
    fn synonym_prefers_first_non_empty() {
        let r = Record::from_value(json!({ "Started On": "", "Start Date": "Jan 2020" }));
        assert_eq!(r.first_field(&["Started On", "Start Date"]), "Jan 2020");
    }

    #[test]
    fn absent_domain_is_empty_slice() {
        let set: RecordSet = serde_json::from_value(json!({})).unwrap();
        assert!(set.domain("POSITIONS").is_empty());
        assert!(set.first("POSITIONS").is_none());
        assert!(!set.has("POSITIONS"));
        assert!(set.is_empty());
    }

    #[test]
    fn domain_order_preserved() {
        let set: RecordSet = serde_json::from_value(json!({
            "POSITIONS": [
                { "Title": "Second" },
                { "Title": "First" }
            ]
        }))
        .unwrap();
        let titles: Vec<String> = set.domain("POSITIONS").iter().map(|r| r.field("Title")).collect();
        assert_eq!(titles, vec!["Second", "First"]);
    }
}
