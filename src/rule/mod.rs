//! The rule matcher : given an input section, finds the first
//! `(OutputSectionEntry, RuleContainer)` whose file/section patterns accept it, in
//! rule declaration order. This is the hot path of the whole pipeline; it runs once
//! per input section, often in the millions for a large link.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::input::InputFile;
use crate::model::section::Section;
use crate::script::ast::{InputSectDesc, SectionPattern, SortPolicy};
use crate::session::{Arena, InputId, OutputSectionId, RuleId, SectionId};

/// One declared input-section description, bound to the output section it appends
/// into. The accumulator is bucketed by section pattern, with a
/// single bucket for the common case of a rule with no explicit section patterns
/// (`*(...)` matching everything from the matched file).
#[derive(Debug)]
pub struct RuleContainer {
    /// The output section this rule appends into
    pub output_section: OutputSectionId,
    /// The parsed input-section description this rule was built from
    pub desc: InputSectDesc,
    /// Matched input sections, one bucket per `desc.sections` entry (or a single
    /// bucket if `desc.sections` is empty)
    pub matched: Vec<Vec<SectionId>>,
    /// Position among every declared rule, across all output sections; the matcher
    /// walks rules in this order
    pub declaration_order: u32,
}

impl RuleContainer {
    /// Build an empty accumulator for `desc`, to be inserted into
    /// [`crate::session::LinkerSession::rules`].
    pub fn new(output_section: OutputSectionId, desc: InputSectDesc, declaration_order: u32) -> Self {
        let bucket_count = desc.sections.len().max(1);
        Self {
            output_section,
            desc,
            matched: vec![Vec::new(); bucket_count],
            declaration_order,
        }
    }

    /// Record `section` as matched by this rule's pattern at `pattern_index` (0 if
    /// the rule has no explicit section patterns).
    pub fn append(&mut self, pattern_index: usize, section: SectionId) {
        let i = pattern_index.min(self.matched.len() - 1);
        self.matched[i].push(section);
    }

    /// Apply each bucket's sort policy and flatten into final input-section order for
    /// layout. Called once per rule before address assignment; sorting here (rather
    /// than at match time) lets every input section for the bucket arrive first.
    pub fn sort_and_flatten(&mut self, sections: &Arena<Section>) -> Vec<SectionId> {
        let mut out = Vec::new();
        for (i, bucket) in self.matched.iter_mut().enumerate() {
            let sort = self
                .desc
                .sections
                .get(i)
                .map(|p: &SectionPattern| p.sort)
                .unwrap_or(SortPolicy::None);
            apply_sort_policy(bucket, sort, sections);
            out.extend(bucket.iter().copied());
        }
        out
    }
}

/// Parse the numeric suffix after `.init_array.`/`.fini_array.`/`.ctors.`/`.dtors.`,
/// for `SORT_BY_INIT_PRIORITY`. Sections without a recognized prefix or a parseable
/// suffix sort last.
fn init_priority(name: &str) -> Option<u32> {
    const PREFIXES: &[&str] = &[".init_array.", ".fini_array.", ".ctors.", ".dtors."];
    for prefix in PREFIXES {
        if let Some(rest) = name.strip_prefix(prefix) {
            return rest.parse::<u32>().ok();
        }
    }
    None
}

fn apply_sort_policy(bucket: &mut [SectionId], policy: SortPolicy, sections: &Arena<Section>) {
    match policy {
        SortPolicy::None | SortPolicy::Explicit => {}
        SortPolicy::Name => bucket.sort_by(|&a, &b| sections.get(a).name.cmp(&sections.get(b).name)),
        SortPolicy::Alignment => {
            bucket.sort_by(|&a, &b| sections.get(b).alignment.cmp(&sections.get(a).alignment))
        }
        SortPolicy::InitPriority => bucket.sort_by_key(|&id| {
                init_priority(&sections.get(id).name).unwrap_or(u32::MAX)
        }),
        SortPolicy::NameAlignment => bucket.sort_by(|&a, &b| {
                let (sa, sb) = (sections.get(a), sections.get(b));
                sa.name.cmp(&sb.name).then(sb.alignment.cmp(&sa.alignment))
        }),
        SortPolicy::AlignmentName => bucket.sort_by(|&a, &b| {
                let (sa, sb) = (sections.get(a), sections.get(b));
                sb.alignment.cmp(&sa.alignment).then(sa.name.cmp(&sb.name))
        }),
    }
}

/// The (archive, member, resolved path) triple the matcher needs about a section's
/// owning input, resolved once per section before matching starts.
#[derive(Debug, Clone, Default)]
pub struct SectionOrigin {
    /// True if this section (or its common-symbol origin) came from an archive member
    pub is_archive: bool,
    /// The archive member name, if `is_archive`
    pub member_name: Option<String>,
    /// The resolved input path (archive path for a member, object path otherwise)
    pub file_path: Option<String>,
}

/// Build the `SectionId -> (InputId, SectionOrigin)` reverse index the matcher needs.
/// Sections don't carry a back-reference to their owning input, so this is a one-time serial pass
/// before rule matching starts.
pub fn build_section_origins(
    inputs: &Arena<crate::input::Input>,
) -> HashMap<SectionId, SectionOrigin> {
    let mut origins = HashMap::new();
    for (input_id, input) in inputs.iter() {
        match &input.file {
            Some(InputFile::ObjectFile { sections }) => {
                let path = input.resolved_path.as_ref().map(|p| p.display().to_string());
                for &sid in sections {
                    origins.insert(
                        sid,
                        SectionOrigin {
                            is_archive: false,
                            member_name: None,
                            file_path: path.clone(),
                        },
                    );
                }
            }
            Some(InputFile::ArchiveMember {
                    archive,
                    member_name,
                    sections,
            }) => {
                let archive_input = inputs.get(*archive);
                let path = archive_input
                    .resolved_path
                    .as_ref()
                    .map(|p| p.display().to_string());
                for &sid in sections {
                    origins.insert(
                        sid,
                        SectionOrigin {
                            is_archive: true,
                            member_name: Some(member_name.clone()),
                            file_path: path.clone(),
                        },
                    );
                }
            }
            Some(InputFile::InternalFile { sections }) => {
                for &sid in sections {
                    origins.insert(
                        sid,
                        SectionOrigin {
                            is_archive: false,
                            member_name: None,
                            file_path: Some(input.original_path.clone()),
                        },
                    );
                }
            }
            _ => {
                let _ = input_id;
            }
        }
    }
    origins
}

/// Per-`(Input, Pattern)` cache for the two sub-matches worth memoizing:
/// archive-member-name matches and file-pattern matches. Guarded by a lock since rule
/// matching is partitionable across input files and may run on a worker pool.
#[derive(Debug, Default)]
pub struct MatchCache {
    member: Mutex<HashMap<(InputId, String), bool>>,
    file: Mutex<HashMap<(InputId, String), bool>>,
}

impl MatchCache {
    fn member_matches(&self, input: InputId, pattern: &str, member_name: &str) -> bool {
        let key = (input, pattern.to_string());
        if let Some(&hit) = self.member.lock().expect("match cache poisoned").get(&key) {
            return hit;
        }
        let result = glob_match(pattern, member_name);
        self.member.lock().expect("match cache poisoned").insert(key, result);
        result
    }

    fn file_matches(&self, input: InputId, pattern: &str, candidates: &[&str]) -> bool {
        let key = (input, pattern.to_string());
        if let Some(&hit) = self.file.lock().expect("match cache poisoned").get(&key) {
            return hit;
        }
        let result = candidates.iter().any(|c| file_pattern_matches(pattern, c));
        self.file.lock().expect("match cache poisoned").insert(key, result);
        result
    }
}

fn file_pattern_matches(pattern: &str, candidate: &str) -> bool {
    if glob_match(pattern, candidate) {
        return true;
    }
    // thin-archive / bare-name fallback: also try the candidate's basename.
    let basename = candidate.rsplit('/').next().unwrap_or(candidate);
    glob_match(pattern, basename)
}

/// True if `pattern` contains any glob metacharacter; a plain-text pattern is matched
/// by a precomputed equality instead.
pub fn has_glob_meta(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

/// A small recursive glob matcher supporting `*` (any run, including empty) and `?`
/// (exactly one character); `[...]` is not supported by linker-script section
/// patterns in practice and is treated as a literal.
pub fn glob_match(pattern: &str, text: &str) -> bool {
    fn rec(p: &[u8], t: &[u8]) -> bool {
        match p.first() {
            None => t.is_empty(),
            Some(b'*') => rec(&p[1..], t) || (!t.is_empty() && rec(p, &t[1..])),
            Some(b'?') => !t.is_empty() && rec(&p[1..], &t[1..]),
            Some(&c) => !t.is_empty() && t[0] == c && rec(&p[1..], &t[1..]),
        }
    }
    rec(pattern.as_bytes(), text.as_bytes())
}

/// Match a section-name pattern, honoring the `COMMON`/`.scommon.N` special cases
/// : a plain (non-glob) pattern of one of those forms also matches any
/// section whose name extends it with a `.`-separated suffix.
fn section_name_matches(pattern: &str, name: &str) -> bool {
    if has_glob_meta(pattern) {
        return glob_match(pattern, name);
    }
    if name == pattern {
        return true;
    }
    if pattern == "COMMON" || pattern.starts_with(".scommon.") {
        return name.starts_with(&format!("{pattern}."));
    }
    false
}

/// Evaluate one rule's exclusions and patterns against a section, returning the
/// pattern index that accepted it. `None` means this rule
/// rejects the section.
fn rule_accepts(
    desc: &InputSectDesc,
    input: InputId,
    origin: &SectionOrigin,
    section: &Section,
    cache: &MatchCache,
) -> Option<usize> {
    // Step 1: archive gate.
    if desc.is_archive && !origin.is_archive {
        return None;
    }
    if desc.is_archive {
        if let Some(member_pattern) = &desc.member_pattern {
            let member_name = origin.member_name.as_deref().unwrap_or("");
            if !cache.member_matches(input, member_pattern, member_name) {
                return None;
            }
        }
    }

    // Step 2: file pattern.
    let mut candidates: Vec<&str> = Vec::new();
    if let Some(path) = &origin.file_path {
        candidates.push(path.as_str());
    }
    if !desc.file_pattern.is_empty() && desc.file_pattern != "*" {
        if !cache.file_matches(input, &desc.file_pattern, &candidates) {
            return None;
        }
    }

    // Step 3: section patterns, exclusions evaluated first.
    if section.name == "COMMON" || section.name.starts_with(".scommon.") {
        // A COMMON accumulator section is only ever matched by a pattern naming it
        // (or a plain `*`); it never falls through to a catch-all by accident.
    }
    if desc.sections.is_empty() {
        if exclusions_reject(&desc.exclude_files, input, origin, cache) {
            return None;
        }
        return Some(0);
    }
    for (i, pat) in desc.sections.iter().enumerate() {
        let mut excludes = desc.exclude_files.clone();
        excludes.extend(pat.exclude_files.iter().cloned());
        if exclusions_reject(&excludes, input, origin, cache) {
            continue;
        }
        if section_name_matches(&pat.pattern, &section.name) {
            return Some(i);
        }
    }
    None
}

fn exclusions_reject(excludes: &[String], input: InputId, origin: &SectionOrigin, cache: &MatchCache) -> bool {
    if excludes.is_empty() {
        return false;
    }
    let mut candidates: Vec<&str> = Vec::new();
    if let Some(path) = &origin.file_path {
        candidates.push(path.as_str());
    }
    if let Some(member) = &origin.member_name {
        candidates.push(member.as_str());
    }
    excludes.iter().any(|ex| cache.file_matches(input, ex, &candidates))
}

/// Find the first rule (in declaration order) that accepts `section_id`, returning
/// its id and the section-pattern index it matched under (for
/// [`RuleContainer::append`]). Returns `None` if the section should fall through to
/// the output section's implicit catch-all.
pub fn find_rule(
    rules: &Arena<RuleContainer>,
    sections: &Arena<Section>,
    origins: &HashMap<SectionId, SectionOrigin>,
    cache: &MatchCache,
    input: InputId,
    section_id: SectionId,
) -> Option<(RuleId, usize)> {
    let section = sections.get(section_id);
    let default_origin = SectionOrigin::default();
    let origin = origins.get(&section_id).unwrap_or(&default_origin);
    for (rule_id, rule) in rules.iter() {
        if let Some(pattern_index) = rule_accepts(&rule.desc, input, origin, section, cache) {
            return Some((rule_id, pattern_index));
        }
    }
    None
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod test {
    use super::*;
    use crate::model::section::{SectionFlags, SectionKind};
    use crate::script::ast::KeepPolicy;

    fn desc(file_pattern: &str, sections: Vec<SectionPattern>) -> InputSectDesc {
        InputSectDesc {
            keep: KeepPolicy::NoKeep,
            file_pattern: file_pattern.to_string(),
            member_pattern: None,
            is_archive: false,
            exclude_files: Vec::new(),
            sections,
        }
    }

    fn pat(pattern: &str) -> SectionPattern {
        SectionPattern {
            pattern: pattern.to_string(),
            sort: SortPolicy::None,
            exclude_files: Vec::new(),
        }
    }

    #[test]
    fn glob_star_matches_any_suffix() {
        assert!(glob_match(".text*", ".text.foo"));
        assert!(glob_match(".text*", ".text"));
        assert!(!glob_match(".text*", ".data"));
    }

    #[test]
    fn plain_pattern_is_exact() {
        assert!(!has_glob_meta(".text"));
        assert!(section_name_matches(".text", ".text"));
        assert!(!section_name_matches(".text", ".text.foo"));
    }

    #[test]
    fn common_pattern_matches_suffixed_names() {
        assert!(section_name_matches("COMMON", "COMMON"));
        assert!(section_name_matches("COMMON", "COMMON.foo"));
        assert!(!section_name_matches("COMMON", "COMMONX"));
    }

    #[test]
    fn first_matching_rule_wins_in_declaration_order() {
        let mut sections: Arena<Section> = Arena::new();
        let text = sections.push(Section::new(".text", SectionFlags::ALLOC, SectionKind::ProgBits));

        let mut outputs: Arena<crate::layout::OutputSectionEntry> = Arena::new();
        let out_a = outputs.push(crate::layout::OutputSectionEntry::new(".text", Default::default(), Default::default(), 0));

        let mut rules: Arena<RuleContainer> = Arena::new();
        rules.push(RuleContainer::new(out_a, desc("*", vec![pat(".text")]), 0));
        rules.push(RuleContainer::new(out_a, desc("*", vec![pat("*")]), 1));

        let origins = HashMap::new();
        let cache = MatchCache::default();
        let mut inputs: Arena<crate::input::Input> = Arena::new();
        let input = inputs.push(crate::input::Input::new(
                "a.o",
                0,
                crate::input::InputAttributes::empty(),
        ));
        let (rule_id, pattern_index) = find_rule(&rules, &sections, &origins, &cache, input, text).unwrap();
        assert_eq!(pattern_index, 0);
        assert_eq!(rules.get(rule_id).declaration_order, 0);
    }

    #[test]
    fn init_priority_sorts_ascending_with_unsuffixed_last() {
        let mut sections: Arena<Section> = Arena::new();
        let a = sections.push(Section::new(".init_array.200", SectionFlags::empty(), SectionKind::ProgBits));
        let b = sections.push(Section::new(".init_array.100", SectionFlags::empty(), SectionKind::ProgBits));
        let c = sections.push(Section::new(".init_array", SectionFlags::empty(), SectionKind::ProgBits));
        let mut bucket = vec![a, b, c];
        apply_sort_policy(&mut bucket, SortPolicy::InitPriority, &sections);
        assert_eq!(bucket, vec![b, a, c]);
    }
}
