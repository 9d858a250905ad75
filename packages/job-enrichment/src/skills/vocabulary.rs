//! Curated skill vocabulary and the token matching rule.
//!
//! Each entry is `{token, mode, canonical}`. Tokens made only of letters,
//! digits and hyphens match as whole words; tokens containing `+`, `#`, `/`,
//! `.` or a space match as plain substrings, since word boundaries around
//! those characters are meaningless. The canonical form merges variants of
//! the same skill ("node", "nodejs", "node.js").
//!
//! The list is a starting point, not an authority. Single-letter and very
//! common-word tokens ("r", "go", "spring", "express") are left out because
//! they match ordinary prose far more often than the skill.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

/// Characters that force substring matching.
const SPECIAL_CHARS: &[char] = &['+', '#', '/', '.', ' '];

/// How a token is located in page text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Bounded on both sides by non-alphanumeric characters or the text edge
    WholeWord,
    /// Anywhere in the text
    Substring,
}

impl MatchMode {
    /// Pick the mode for a token from its characters.
    pub fn infer(token: &str) -> Self {
        if token.contains(SPECIAL_CHARS) {
            Self::Substring
        } else {
            Self::WholeWord
        }
    }

    /// Test `needle` against `haystack`. Both are expected to be lowercase.
    pub fn is_match(self, haystack: &str, needle: &str) -> bool {
        if needle.is_empty() {
            return false;
        }
        match self {
            Self::Substring => haystack.contains(needle),
            Self::WholeWord => contains_word(haystack, needle),
        }
    }
}

lazy_static! {
    // Whole-word tokens of the curated table, compiled once
    static ref VOCABULARY_WORD_REGEXES: HashMap<&'static str, Regex> = VOCABULARY
        .iter()
        .filter(|pattern| pattern.mode == MatchMode::WholeWord)
        .filter_map(|pattern| word_regex(pattern.token).map(|re| (pattern.token, re)))
        .collect();
}

/// `token` bounded by a non-alphanumeric character or the text edge.
fn word_regex(token: &str) -> Option<Regex> {
    Regex::new(&format!(
        r"(?:^|[^\p{{Alphabetic}}\p{{N}}]){}(?:$|[^\p{{Alphabetic}}\p{{N}}])",
        regex::escape(token)
    ))
    .ok()
}

fn contains_word(haystack: &str, needle: &str) -> bool {
    match VOCABULARY_WORD_REGEXES.get(needle) {
        Some(re) => re.is_match(haystack),
        None => word_regex(needle).is_some_and(|re| re.is_match(haystack)),
    }
}

/// One vocabulary entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkillPattern {
    pub token: &'static str,
    pub mode: MatchMode,
    pub canonical: &'static str,
}

impl SkillPattern {
    /// A token matched as a whole word.
    pub const fn word(token: &'static str) -> Self {
        Self {
            token,
            mode: MatchMode::WholeWord,
            canonical: token,
        }
    }

    /// A token matched as a substring.
    pub const fn literal(token: &'static str) -> Self {
        Self {
            token,
            mode: MatchMode::Substring,
            canonical: token,
        }
    }

    /// Report matches under a different name.
    pub const fn canonical(self, canonical: &'static str) -> Self {
        Self { canonical, ..self }
    }

    pub fn is_match(&self, lowercase_text: &str) -> bool {
        self.mode.is_match(lowercase_text, self.token)
    }
}

/// Scan order is output order.
pub static VOCABULARY: &[SkillPattern] = &[
    // Languages
    SkillPattern::word("python"),
    SkillPattern::word("java"),
    SkillPattern::word("javascript"),
    SkillPattern::word("typescript"),
    SkillPattern::literal("c++"),
    SkillPattern::literal("c#"),
    SkillPattern::word("golang").canonical("go"),
    SkillPattern::word("rust"),
    SkillPattern::word("ruby"),
    SkillPattern::word("php"),
    SkillPattern::word("perl"),
    SkillPattern::word("swift"),
    SkillPattern::word("kotlin"),
    SkillPattern::word("scala"),
    SkillPattern::word("matlab"),
    SkillPattern::word("sas"),
    SkillPattern::word("spss"),
    SkillPattern::word("stata"),
    SkillPattern::word("bash"),
    SkillPattern::word("powershell"),
    SkillPattern::word("sql"),
    SkillPattern::word("nosql"),
    SkillPattern::word("html"),
    SkillPattern::word("css"),
    // Frameworks and libraries
    SkillPattern::word("react"),
    SkillPattern::literal("react.js").canonical("react"),
    SkillPattern::word("angular"),
    SkillPattern::word("vue"),
    SkillPattern::literal("vue.js").canonical("vue"),
    SkillPattern::literal("node.js"),
    SkillPattern::word("nodejs").canonical("node.js"),
    SkillPattern::word("node").canonical("node.js"),
    SkillPattern::word("django"),
    SkillPattern::word("flask"),
    SkillPattern::word("fastapi"),
    SkillPattern::literal("spring boot"),
    SkillPattern::literal(".net"),
    SkillPattern::word("jquery"),
    SkillPattern::word("wordpress"),
    SkillPattern::word("drupal"),
    SkillPattern::word("graphql"),
    SkillPattern::literal("rest api"),
    // Data and analytics
    SkillPattern::word("pandas"),
    SkillPattern::word("numpy"),
    SkillPattern::word("tensorflow"),
    SkillPattern::word("pytorch"),
    SkillPattern::word("scikit-learn"),
    SkillPattern::literal("machine learning"),
    SkillPattern::literal("data analysis"),
    SkillPattern::word("tableau"),
    SkillPattern::literal("power bi"),
    SkillPattern::word("excel"),
    // Databases
    SkillPattern::word("postgresql"),
    SkillPattern::word("postgres").canonical("postgresql"),
    SkillPattern::word("mysql"),
    SkillPattern::literal("sql server"),
    SkillPattern::word("oracle"),
    SkillPattern::word("mongodb"),
    SkillPattern::word("redis"),
    SkillPattern::word("elasticsearch"),
    // Cloud and devops
    SkillPattern::word("aws"),
    SkillPattern::word("azure"),
    SkillPattern::word("gcp"),
    SkillPattern::literal("google cloud").canonical("gcp"),
    SkillPattern::word("docker"),
    SkillPattern::word("kubernetes"),
    SkillPattern::word("k8s").canonical("kubernetes"),
    SkillPattern::word("terraform"),
    SkillPattern::word("ansible"),
    SkillPattern::word("jenkins"),
    SkillPattern::literal("ci/cd"),
    SkillPattern::word("git"),
    SkillPattern::word("github"),
    SkillPattern::word("gitlab"),
    SkillPattern::word("linux"),
    SkillPattern::word("unix"),
    // Enterprise systems and practice
    SkillPattern::word("salesforce"),
    SkillPattern::word("peoplesoft"),
    SkillPattern::word("workday"),
    SkillPattern::word("servicenow"),
    SkillPattern::word("jira"),
    SkillPattern::word("agile"),
    SkillPattern::word("scrum"),
];

/// Known spellings of the same skill, used to expand caller-supplied skills.
pub static SYNONYM_GROUPS: &[&[&str]] = &[
    &["node", "nodejs", "node.js"],
    &["js", "javascript"],
    &["ts", "typescript"],
    &["py", "python"],
    &["postgres", "postgresql"],
    &["k8s", "kubernetes"],
    &["react", "reactjs", "react.js"],
    &["vue", "vuejs", "vue.js"],
    &["c#", "csharp"],
    &["c++", "cpp"],
];

/// Every known spelling of `skill`, lowercased, starting with `skill` itself.
pub fn skill_variants(skill: &str) -> Vec<String> {
    let lowered = skill.trim().to_lowercase();
    let mut variants = vec![lowered.clone()];

    if let Some(group) = SYNONYM_GROUPS
        .iter()
        .find(|group| group.contains(&lowered.as_str()))
    {
        for variant in group.iter().filter(|v| **v != lowered) {
            variants.push((*variant).to_string());
        }
    }

    variants
}
