use regex::Regex;

use crate::error::{MergeError, Result};
use crate::domain::value_objects::StripRules;

/// Strips version-specific, non-functional XML noise before hashing.
///
/// Removal is regex-based rather than a full parse: exports are large, the
/// constructs to drop are shallow and well-delimited, and a regex scan keeps
/// working as a best-effort strip even when the document is not well-formed
/// enough for a structural pass. For each configured element name the paired
/// form (`<history>…</history>`), the self-closing form, and any orphaned
/// closing tag left behind by a nested removal are dropped; for each
/// configured attribute prefix every matching declaration (`xmlns="…"`,
/// `xmlns:a='…'`) is dropped. Text content and ordering of the remaining
/// functional elements are untouched.
pub struct ContentNormalizer {
    element_patterns: Vec<Regex>,
    attribute_patterns: Vec<Regex>,
}

impl ContentNormalizer {
    pub fn new(rules: &StripRules) -> Result<Self> {
        let mut element_patterns = Vec::with_capacity(rules.elements.len() * 3);
        for name in &rules.elements {
            let n = regex::escape(name);
            // Order matters: the paired pattern must run before the orphan
            // close tag pattern, or it would never see an intact pair.
            for pattern in [
                format!(r"(?s)<{n}(?:\s[^>]*)?>.*?</{n}\s*>"),
                format!(r"<{n}(?:\s[^>]*)?/>"),
                format!(r"</{n}\s*>"),
            ] {
                element_patterns.push(Regex::new(&pattern).map_err(|e| {
                    MergeError::InvalidStripRule {
                        rule: name.clone(),
                        source: e,
                    }
                })?);
            }
        }

        let mut attribute_patterns = Vec::with_capacity(rules.attribute_prefixes.len());
        for prefix in &rules.attribute_prefixes {
            let p = regex::escape(prefix);
            let pattern = format!(r#"\s+{p}[\w:.-]*\s*=\s*(?:"[^"]*"|'[^']*')"#);
            attribute_patterns.push(Regex::new(&pattern).map_err(|e| {
                MergeError::InvalidStripRule {
                    rule: prefix.clone(),
                    source: e,
                }
            })?);
        }

        Ok(Self {
            element_patterns,
            attribute_patterns,
        })
    }

    /// Deterministic, side-effect free, and idempotent:
    /// `normalize(normalize(x)) == normalize(x)` for every input.
    pub fn normalize(&self, raw_xml: &str) -> String {
        let mut out = raw_xml.to_string();
        // Re-run until a fixed point: removing one span can expose a match
        // that the same left-to-right pass already walked past. The output
        // strictly shrinks on every iteration, so this terminates.
        loop {
            let next = self.strip_once(&out);
            if next == out {
                return out;
            }
            out = next;
        }
    }

    fn strip_once(&self, input: &str) -> String {
        let mut out = input.to_string();
        for re in &self.element_patterns {
            out = re.replace_all(&out, "").into_owned();
        }
        for re in &self.attribute_patterns {
            out = re.replace_all(&out, "").into_owned();
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> ContentNormalizer {
        ContentNormalizer::new(&StripRules::default()).unwrap()
    }

    const SAMPLE: &str = concat!(
        r#"<interface xmlns:a="urn:vendor" xmlns="urn:types" uuid="u1">"#,
        "<versionUuid>v2</versionUuid>",
        r#"<history><version uuid="v1" author="bob"/></history>"#,
        "<name>startForm</name><rule>a!textField()</rule></interface>",
    );

    #[test]
    fn strips_version_and_history_and_namespaces() {
        let out = normalizer().normalize(SAMPLE);
        assert_eq!(
            out,
            r#"<interface uuid="u1"><name>startForm</name><rule>a!textField()</rule></interface>"#
        );
    }

    #[test]
    fn preserves_order_and_text_of_functional_elements() {
        let out = normalizer().normalize("<x><b>2</b><versionUuid>v</versionUuid><a>1</a></x>");
        assert_eq!(out, "<x><b>2</b><a>1</a></x>");
    }

    #[test]
    fn strips_self_closing_form() {
        let out = normalizer().normalize(r#"<x><versionUuid value="v9"/><k>1</k></x>"#);
        assert_eq!(out, "<x><k>1</k></x>");
    }

    #[test]
    fn idempotent() {
        let n = normalizer();
        let once = n.normalize(SAMPLE);
        assert_eq!(n.normalize(&once), once);
    }

    #[test]
    fn nested_same_name_elements_are_fully_removed() {
        // The lazy paired pattern stops at the inner close tag; the orphaned
        // outer close tag must not survive the strip.
        let n = normalizer();
        let tricky = "<history x=\"1\"><history>inner</history></history><k>1</k>";
        let once = n.normalize(tricky);
        assert_eq!(once, "<k>1</k>");
        assert_eq!(n.normalize(&once), once);
    }

    #[test]
    fn malformed_input_degrades_to_best_effort() {
        // Unclosed history block: the paired pattern cannot match, so the
        // block stays, but the result is still deterministic and idempotent.
        let n = normalizer();
        let malformed = "<x><history><version uuid=\"v1\"><k>1</k>";
        let once = n.normalize(malformed);
        assert_eq!(n.normalize(&once), once);
        assert!(once.contains("<k>1</k>"));
    }

    #[test]
    fn custom_rules_strip_custom_constructs() {
        let rules = StripRules {
            elements: vec!["audit".to_string()],
            attribute_prefixes: vec!["exportedAt".to_string()],
        };
        let n = ContentNormalizer::new(&rules).unwrap();
        let out = n.normalize(r#"<x exportedAt="2024-01-01"><audit>who</audit><k>1</k></x>"#);
        assert_eq!(out, "<x><k>1</k></x>");
        // default constructs are left alone under custom rules
        let kept = n.normalize("<x><versionUuid>v</versionUuid></x>");
        assert_eq!(kept, "<x><versionUuid>v</versionUuid></x>");
    }

    #[test]
    fn element_name_is_matched_exactly_not_as_prefix() {
        let out = normalizer().normalize("<historyLog>keep</historyLog>");
        assert_eq!(out, "<historyLog>keep</historyLog>");
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(normalizer().normalize(""), "");
    }
}
