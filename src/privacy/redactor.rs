//! Pattern redactor for sensitive data and unsafe markup

use crate::config::RedactionRule;
use crate::error::{Error, Result};
use regex::{Regex, RegexBuilder};

/// Upper bound on sanitize passes; each pass strictly reduces the number of
/// unsafe constructs, so real inputs settle in one or two.
const MAX_SANITIZE_PASSES: usize = 8;

/// Regex-driven detector and anonymizer.
pub struct PatternRedactor {
    rules: Vec<CompiledRule>,
    markup: Vec<MarkupRule>,
}

struct CompiledRule {
    category: String,
    pattern: Regex,
    placeholder: String,
}

struct MarkupRule {
    pattern: Regex,
    placeholder: &'static str,
}

/// A sensitive span found by `PatternRedactor::detect`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    /// Category of the rule that matched
    pub category: String,
    /// Byte offset of the match start
    pub start: usize,
    /// Byte offset of the match end
    pub end: usize,
}

/// A piece of text during anonymization. Protected pieces are placeholders
/// already written by an earlier category and are never rescanned.
struct Segment {
    text: String,
    protected: bool,
}

impl PatternRedactor {
    /// Create a redactor from the given rules, preserving their order.
    pub fn new(rules: Vec<RedactionRule>) -> Result<Self> {
        let compiled = rules
            .into_iter()
            .map(|rule| {
                let pattern = RegexBuilder::new(&rule.pattern)
                    .case_insensitive(rule.case_insensitive)
                    .build()
                    .map_err(|e| {
                        Error::Config(format!(
                            "Invalid regex pattern for redaction rule '{}': {}",
                            rule.category, e
                        ))
                    })?;
                let placeholder = format!("[{}_REDACTED]", rule.category.to_uppercase());
                Ok(CompiledRule {
                    category: rule.category,
                    pattern,
                    placeholder,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            rules: compiled,
            markup: markup_rules()?,
        })
    }

    /// Number of redaction categories loaded.
    pub fn category_count(&self) -> usize {
        self.rules.len()
    }

    /// Category names in registration order.
    pub fn categories(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.category.as_str()).collect()
    }

    /// Strip script/iframe blocks and `javascript:` URIs.
    ///
    /// Idempotent: passes repeat until the text stops changing, so
    /// `sanitize(sanitize(x)) == sanitize(x)`.
    pub fn sanitize(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        let mut current = text.trim().to_string();
        for _ in 0..MAX_SANITIZE_PASSES {
            let mut next = current.clone();
            for rule in &self.markup {
                next = rule.pattern.replace_all(&next, rule.placeholder).into_owned();
            }
            let next = next.trim().to_string();
            if next == current {
                break;
            }
            current = next;
        }
        current
    }

    /// Replace every sensitive span with `[<CATEGORY>_REDACTED]`.
    ///
    /// Categories run sequentially in registration order, each in a single
    /// left-to-right pass over the text that earlier categories left
    /// unredacted.
    pub fn anonymize(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        let mut segments = vec![Segment {
            text: text.to_string(),
            protected: false,
        }];

        for rule in &self.rules {
            let mut next = Vec::with_capacity(segments.len());
            for segment in segments {
                if segment.protected {
                    next.push(segment);
                    continue;
                }
                let mut last = 0;
                for mat in rule.pattern.find_iter(&segment.text) {
                    if mat.start() > last {
                        next.push(Segment {
                            text: segment.text[last..mat.start()].to_string(),
                            protected: false,
                        });
                    }
                    next.push(Segment {
                        text: rule.placeholder.clone(),
                        protected: true,
                    });
                    last = mat.end();
                }
                if last < segment.text.len() {
                    next.push(Segment {
                        text: segment.text[last..].to_string(),
                        protected: false,
                    });
                }
            }
            segments = next;
        }

        segments.into_iter().map(|s| s.text).collect()
    }

    /// Report sensitive spans without rewriting the text.
    ///
    /// Offsets refer to the original input; each category scans independently.
    pub fn detect(&self, text: &str) -> Vec<Detection> {
        let mut found = Vec::new();
        for rule in &self.rules {
            for mat in rule.pattern.find_iter(text) {
                found.push(Detection {
                    category: rule.category.clone(),
                    start: mat.start(),
                    end: mat.end(),
                });
            }
        }
        found.sort_by_key(|d| d.start);
        found
    }

    /// Check if text contains any sensitive data
    pub fn contains_sensitive(&self, text: &str) -> bool {
        self.rules.iter().any(|rule| rule.pattern.is_match(text))
    }
}

fn markup_rules() -> Result<Vec<MarkupRule>> {
    let defs: [(&str, &'static str); 3] = [
        (r"(?is)<script.*?</script>", "[SCRIPT_REMOVED]"),
        (r"(?is)<iframe.*?</iframe>", "[IFRAME_REMOVED]"),
        (r"(?i)javascript:", "[JAVASCRIPT_REMOVED]"),
    ];
    defs.iter()
        .map(|(pattern, placeholder)| {
            Regex::new(pattern)
                .map(|pattern| MarkupRule {
                    pattern,
                    placeholder,
                })
                .map_err(|e| Error::Internal(format!("markup pattern failed to compile: {}", e)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_redaction_rules as rules;

    fn redactor() -> PatternRedactor {
        PatternRedactor::new(rules()).unwrap()
    }

    #[test]
    fn test_anonymize_email() {
        let r = redactor();
        let out = r.anonymize("Contact me at test@example.com please");
        assert_eq!(out, "Contact me at [EMAIL_REDACTED] please");
    }

    #[test]
    fn test_anonymize_email_case_insensitive() {
        let r = redactor();
        let out = r.anonymize("TEST@EXAMPLE.COM");
        assert_eq!(out, "[EMAIL_REDACTED]");
    }

    #[test]
    fn test_anonymize_phone() {
        let r = redactor();
        let out = r.anonymize("call +39 333 1234567 tonight");
        assert!(out.contains("[PHONE_REDACTED]"));
        assert!(!out.contains("1234567"));
    }

    #[test]
    fn test_anonymize_fiscal_code() {
        let r = redactor();
        let out = r.anonymize("my code is RSSMRA85T10A562S");
        assert_eq!(out, "my code is [FISCAL_CODE_REDACTED]");
    }

    #[test]
    fn test_anonymize_iban() {
        let r = redactor();
        let out = r.anonymize("IBAN IT60X0542811101000000123456 thanks");
        assert_eq!(out, "IBAN [IBAN_REDACTED] thanks");
    }

    #[test]
    fn test_anonymize_credit_card_digits_removed() {
        let r = redactor();
        let out = r.anonymize("card 4111-1111-1111-1111");
        // Phone runs before credit_card and may claim the span first
        assert!(!out.contains("4111"));
        assert!(out.contains("_REDACTED]"));
    }

    #[test]
    fn test_anonymize_api_key() {
        let r = redactor();
        let key = format!("AIza{}", "B".repeat(35));
        let out = r.anonymize(&format!("token {} end", key));
        assert_eq!(out, "token [API_KEY_REDACTED] end");
    }

    #[test]
    fn test_anonymize_password_assignment() {
        let r = redactor();
        let out = r.anonymize("my password: hunter22 ok");
        assert!(out.contains("[PASSWORD_REDACTED]"));
        assert!(!out.contains("hunter22"));
    }

    #[test]
    fn test_placeholder_not_rescanned() {
        let r = redactor();
        // "key: " followed by an api-key placeholder must not be re-redacted
        // as a password assignment.
        let key = format!("AIza{}", "C".repeat(35));
        let out = r.anonymize(&format!("key: {}", key));
        assert_eq!(out, "key: [API_KEY_REDACTED]");
    }

    #[test]
    fn test_anonymize_empty_and_clean() {
        let r = redactor();
        assert_eq!(r.anonymize(""), "");
        assert_eq!(r.anonymize("Tell me about the Punic wars"), "Tell me about the Punic wars");
    }

    #[test]
    fn test_redaction_completeness_email() {
        let r = redactor();
        let out = r.anonymize("a@b.io and c.d@e-f.org");
        assert!(!r.contains_sensitive(&out));
        assert_eq!(out.matches("[EMAIL_REDACTED]").count(), 2);
    }

    #[test]
    fn test_sanitize_script() {
        let r = redactor();
        let out = r.sanitize("hi <script>alert(1)</script> there");
        assert_eq!(out, "hi [SCRIPT_REMOVED] there");
    }

    #[test]
    fn test_sanitize_multiline_iframe_and_js_uri() {
        let r = redactor();
        let out = r.sanitize("<IFRAME src=x>\n</iframe><a href=\"JavaScript:evil()\">");
        assert!(out.starts_with("[IFRAME_REMOVED]"));
        assert!(out.contains("[JAVASCRIPT_REMOVED]"));
        assert!(!out.to_lowercase().contains("javascript:"));
    }

    #[test]
    fn test_sanitize_idempotent() {
        let r = redactor();
        let inputs = [
            "plain text",
            "  padded  ",
            "<scr<script></script>ipt>alert(1)</script>",
            "javajavascript:script:",
            "<script>a</script><iframe>b</iframe>javascript:c",
            "",
        ];
        for input in inputs {
            let once = r.sanitize(input);
            let twice = r.sanitize(&once);
            assert_eq!(once, twice, "not idempotent for {:?}", input);
        }
    }

    #[test]
    fn test_detect_reports_categories() {
        let r = redactor();
        let found = r.detect("mail test@example.com code RSSMRA85T10A562S");
        let cats: Vec<&str> = found.iter().map(|d| d.category.as_str()).collect();
        assert_eq!(cats, vec!["email", "fiscal_code"]);
    }

    #[test]
    fn test_invalid_rule_is_config_error() {
        let bad = vec![RedactionRule {
            category: "broken".to_string(),
            pattern: "(".to_string(),
            case_insensitive: true,
        }];
        assert!(matches!(PatternRedactor::new(bad), Err(Error::Config(_))));
    }

    #[test]
    fn test_category_count() {
        assert_eq!(redactor().category_count(), 8);
    }
}
