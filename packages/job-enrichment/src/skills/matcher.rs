//! Pure text-to-skills matching.

use std::collections::HashSet;

use super::vocabulary::{skill_variants, MatchMode, SkillPattern, VOCABULARY};

/// Match page text against the curated vocabulary.
///
/// Returns canonical forms, deduplicated, in vocabulary order.
pub fn match_vocabulary(text: &str) -> Vec<String> {
    match_patterns(text, VOCABULARY)
}

/// Match page text against an arbitrary pattern table.
pub fn match_patterns(text: &str, patterns: &[SkillPattern]) -> Vec<String> {
    let text = text.to_lowercase();
    let mut seen = HashSet::new();

    patterns
        .iter()
        .filter(|pattern| pattern.is_match(&text))
        .filter(|pattern| seen.insert(pattern.canonical))
        .map(|pattern| pattern.canonical.to_string())
        .collect()
}

/// Match page text against caller-supplied skills.
///
/// Each candidate is expanded into its known spellings; if any spelling
/// occurs in the text, the candidate itself (trimmed, original casing) is
/// returned. Output follows candidate order with case-insensitive duplicates
/// and blank entries dropped.
pub fn match_targeted<S: AsRef<str>>(text: &str, candidates: &[S]) -> Vec<String> {
    let text = text.to_lowercase();
    let mut seen = HashSet::new();

    candidates
        .iter()
        .map(|candidate| candidate.as_ref().trim())
        .filter(|candidate| !candidate.is_empty())
        .filter(|candidate| seen.insert(candidate.to_lowercase()))
        .filter(|candidate| candidate_matches(&text, candidate))
        .map(str::to_string)
        .collect()
}

/// Whether any caller-supplied skill occurs in the text.
pub fn matches_any<S: AsRef<str>>(text: &str, candidates: &[S]) -> bool {
    let text = text.to_lowercase();
    candidates
        .iter()
        .map(|candidate| candidate.as_ref().trim())
        .filter(|candidate| !candidate.is_empty())
        .any(|candidate| candidate_matches(&text, candidate))
}

fn candidate_matches(lowercase_text: &str, candidate: &str) -> bool {
    skill_variants(candidate)
        .iter()
        .any(|variant| MatchMode::infer(variant).is_match(lowercase_text, variant))
}

/// Which matching mode an enrichment pass runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkillMatcher {
    /// Curated vocabulary, canonical names
    Vocabulary,
    /// Caller-supplied skills, caller's spelling
    Targeted(Vec<String>),
}

impl SkillMatcher {
    /// Targeted when any non-blank skill is given, vocabulary otherwise.
    pub fn for_skills(skills: &[String]) -> Self {
        let skills: Vec<String> = skills
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        if skills.is_empty() {
            Self::Vocabulary
        } else {
            Self::Targeted(skills)
        }
    }

    pub fn match_text(&self, text: &str) -> Vec<String> {
        match self {
            Self::Vocabulary => match_vocabulary(text),
            Self::Targeted(skills) => match_targeted(text, skills),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_vocabulary_scenario() {
        assert_eq!(
            match_vocabulary("We use Python, React and Docker daily"),
            vec!["python", "react", "docker"]
        );
    }

    #[test]
    fn test_vocabulary_merges_node_variants() {
        let skills = match_vocabulary("Node.js or NodeJS; plain node is fine too");
        assert_eq!(skills, vec!["node.js"]);
    }

    #[test]
    fn test_vocabulary_special_tokens_use_substring() {
        let skills = match_vocabulary("Maintain CI/CD for C++ and C# services on .NET");
        assert_eq!(skills, vec!["c++", "c#", ".net", "ci/cd"]);
    }

    #[test]
    fn test_vocabulary_ignores_embedded_words() {
        assert!(match_vocabulary("Excellent javascripting skills, mysqlish").is_empty());
    }

    #[test]
    fn test_vocabulary_empty_text() {
        assert!(match_vocabulary("").is_empty());
    }

    #[test]
    fn test_targeted_scenario_preserves_caller_casing() {
        let skills = match_targeted(
            "node.js developer with strong SQL skills",
            &["Node", "SQL"],
        );
        assert_eq!(skills, vec!["Node", "SQL"]);
    }

    #[test]
    fn test_targeted_expands_synonyms() {
        let text = "Frontend work in JS and TS, scripting in py";
        assert_eq!(
            match_targeted(text, &["JavaScript", "TypeScript", "Python", "Go"]),
            vec!["JavaScript", "TypeScript", "Python"]
        );
    }

    #[test]
    fn test_targeted_finds_bounded_occurrence_after_glued_one() {
        assert_eq!(match_targeted("xab-ab-ab", &["ab-ab"]), vec!["ab-ab"]);
        assert!(matches_any("requires xrust-lang or rust-lang", &["rust-lang"]));
    }

    #[test]
    fn test_targeted_drops_duplicates_and_blanks() {
        let skills = match_targeted("sql everywhere", &["SQL", "", "sql", "  "]);
        assert_eq!(skills, vec!["SQL"]);
    }

    #[test]
    fn test_matches_any() {
        assert!(matches_any("we deploy on kubernetes", &["k8s"]));
        assert!(!matches_any("we deploy on kubernetes", &["docker"]));
        assert!(!matches_any("anything", &[] as &[&str]));
    }

    #[test]
    fn test_matcher_selection() {
        assert_eq!(SkillMatcher::for_skills(&[]), SkillMatcher::Vocabulary);
        assert_eq!(
            SkillMatcher::for_skills(&[" ".to_string()]),
            SkillMatcher::Vocabulary
        );
        assert_eq!(
            SkillMatcher::for_skills(&["Rust".to_string()]),
            SkillMatcher::Targeted(vec!["Rust".to_string()])
        );
    }

    proptest! {
        #[test]
        fn prop_vocabulary_output_is_unique_canonical(text in "[a-zA-Z .#+/,]{0,200}") {
            let skills = match_vocabulary(&text);
            let unique: HashSet<_> = skills.iter().collect();
            prop_assert_eq!(unique.len(), skills.len());
            for skill in &skills {
                prop_assert!(VOCABULARY.iter().any(|p| p.canonical == skill.as_str()));
            }
        }

        #[test]
        fn prop_targeted_output_is_subset_of_candidates(
            text in "[a-z .]{0,120}",
            candidates in proptest::collection::vec("[a-zA-Z]{1,8}", 0..6),
        ) {
            let skills = match_targeted(&text, &candidates[..]);
            for skill in &skills {
                prop_assert!(candidates.iter().any(|c| c.trim() == skill.as_str()));
            }
            prop_assert_eq!(!skills.is_empty(), matches_any(&text, &candidates[..]));
        }
    }
}
