//! Symbol resolution : the multi-pass archive fixed point, version-script
//! binding, `EXTERN`/`--undefined`/`--dynamic-list`/`--export-dynamic-symbol`
//! handling, and `PROVIDE`/`HIDDEN` export-suppression routing. Writes
//! [`crate::model::symbol::NamePool`], the one piece of shared state the
//! concurrency model reserves for the serial resolution step.

use std::collections::HashSet;

use crate::diag::Diag;
use crate::model::symbol::{Desc, NamePool, SymbolBinding, VersionBinding};
use crate::script::ast::{AssignWrapper, VersionNode};
use crate::session::{InputId, SymbolId};

/// One symbol definition a single input contributes, as read off its symbol table
/// before resolution decides a winner per name. Kept separate from
/// [`crate::model::symbol::ResolveInfo`] since several inputs may each offer a
/// candidate for the same name before one wins.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// The symbol name
    pub name: String,
    /// The contributing input
    pub origin: InputId,
    /// `STB_*`
    pub binding: SymbolBinding,
    /// Defined, undefined, or common (never `WeakUndefined` here: that's derived
    /// from `binding == Weak` combined with `Desc::Undefined`)
    pub desc: Desc,
    /// Size in bytes; meaningful for commons and data objects
    pub size: u64,
    /// The fragment this candidate is defined at, if `desc == Defined`
    pub fragment: Option<crate::session::FragmentId>,
}

/// Resolve one candidate definition against the current state of `name` in `pool`,
/// applying the usual linker precedence rules: a defined candidate beats an
/// undefined one; two strong defined candidates are a multiple-definition
/// diagnostic (demoted to a warning by `--allow-multiple-definition`); weak
/// candidates never override an existing strong definition; commons merge by
/// max(size)/max(alignment) rather than picking a winner.
pub fn resolve_one(
    pool: &mut NamePool,
    diagnostics: &crate::diag::Diagnostics,
    allow_multiple_definition: bool,
    candidate: Candidate,
) -> SymbolId {
    let id = pool.intern(&candidate.name);
    let effective_desc = if candidate.desc == Desc::Undefined && candidate.binding == SymbolBinding::Weak {
        Desc::WeakUndefined
    } else {
        candidate.desc
    };

    let existing_desc = pool.get(id).desc;
    let existing_origin = pool.get(id).origin;

    match (existing_desc, effective_desc) {
        // Nothing resolved yet, or only a weaker state recorded so far: take the
        // candidate outright.
        (Desc::Undefined, _) | (Desc::WeakUndefined, _) => {
            apply_candidate(pool, id, &candidate, effective_desc);
        }
        // Already defined; an undefined/common candidate never displaces it.
        (Desc::Defined, Desc::Undefined) | (Desc::Defined, Desc::WeakUndefined) => {}
        (Desc::Defined, Desc::Common) => {}
        // Two defined candidates: strong-strong is a conflict, strong-weak keeps the
        // strong one, weak-strong replaces it.
        (Desc::Defined, Desc::Defined) => {
            let existing_binding = pool.get(id).binding;
            match (existing_binding, candidate.binding) {
                (SymbolBinding::Weak, SymbolBinding::Weak) | (_, SymbolBinding::Weak) => {}
                (SymbolBinding::Weak, _) => apply_candidate(pool, id, &candidate, effective_desc),
                _ => {
                    if !allow_multiple_definition {
                        diagnostics.emit(Diag::MultipleDefinition {
                                symbol: candidate.name.clone(),
                                first: existing_origin.map(|o| format!("{o:?}")).unwrap_or_default(),
                                second: format!("{:?}", candidate.origin),
                        });
                    }
                }
            }
        }
        // Common merges by max size/alignment rather than a winner-takes-all pick;
        // alignment itself is derived from size elsewhere, so only size
        // needs to be tracked here.
        (Desc::Common, Desc::Common) => {
            let info = pool.get_mut(id);
            if candidate.size > info.size {
                info.size = candidate.size;
                info.origin = Some(candidate.origin);
            }
        }
        (Desc::Common, Desc::Defined) => {
            apply_candidate(pool, id, &candidate, effective_desc);
        }
        (Desc::Common, Desc::Undefined) | (Desc::Common, Desc::WeakUndefined) => {}
    }

    id
}

fn apply_candidate(pool: &mut NamePool, id: SymbolId, candidate: &Candidate, desc: Desc) {
    let info = pool.get_mut(id);
    info.desc = desc;
    info.binding = candidate.binding;
    info.size = candidate.size;
    info.fragment = candidate.fragment;
    info.origin = Some(candidate.origin);
}

/// Drive the archive fixed point : repeatedly offer every not-yet-pulled
/// archive member's defined symbols to the pool as long as some strong undefined
/// reference in the pool would pull it in, until a pass pulls nothing new. Weak
/// undefined references never pull a member on their own.
///
/// `members` is the candidate set each archive member would contribute if pulled;
/// the caller is responsible for actually materializing the member's sections once
/// `pull` decides to include it (the resolver only decides membership, not I/O).
pub fn resolve_archive_fixed_point(
    pool: &mut NamePool,
    diagnostics: &crate::diag::Diagnostics,
    allow_multiple_definition: bool,
    members: &[(InputId, Vec<Candidate>)],
) -> HashSet<InputId> {
    let mut pulled = HashSet::new();
    loop {
        let mut pulled_this_pass = false;
        for (input, candidates) in members {
            if pulled.contains(input) {
                continue;
            }
            let defines_needed_symbol = candidates.iter().any(|c| {
                    c.desc == Desc::Defined
                        && pool
                        .get_by_name(&c.name)
                        .map(|id| pool.get(id).pulls_archive_members())
                        .unwrap_or(false)
            });
            if defines_needed_symbol {
                for candidate in candidates {
                    resolve_one(pool, diagnostics, allow_multiple_definition, candidate.clone());
                }
                pulled.insert(*input);
                pulled_this_pass = true;
            }
        }
        if !pulled_this_pass {
            break;
        }
    }
    pulled
}

/// `EXTERN(sym1 sym2...)` / `--extern-list` / `--undefined`: force a strong
/// undefined reference for each name, which by itself keeps archive members alive
/// without requiring the name to ever be satisfied.
pub fn force_undefined(pool: &mut NamePool, names: &[String]) {
    for name in names {
        let id = pool.intern(name);
        let info = pool.get_mut(id);
        if info.desc != Desc::Defined {
            info.desc = Desc::Undefined;
            info.binding = SymbolBinding::Global;
        }
    }
}

/// `--dynamic-list` / `--export-dynamic-symbol`: mark every pool entry whose name
/// matches one of `patterns` for dynamic export, overriding a `local:` version-node
/// decision the same way the original CLI surface does.
pub fn apply_dynamic_list(pool: &mut NamePool, patterns: &[String]) {
    let matches: Vec<SymbolId> = pool
        .iter()
        .filter(|(_, info)| patterns.iter().any(|p| crate::rule::glob_match(p, &info.name)))
        .map(|(id, _)| id)
        .collect();
    for id in matches {
        pool.get_mut(id).version = Some(VersionBinding::Global);
    }
}

/// `--export-dynamic`: mark every global, non-suppressed symbol for export.
pub fn export_all_globals(pool: &mut NamePool) {
    let ids: Vec<SymbolId> = pool
        .iter()
        .filter(|(_, info)| info.binding != SymbolBinding::Local && info.version.is_none())
        .map(|(id, _)| id)
        .collect();
    for id in ids {
        pool.get_mut(id).version = Some(VersionBinding::Global);
    }
}

/// Apply a parsed `VERSION` script's nodes to the pool: each
/// node's `global:`/`local:` patterns assign a [`VersionBinding`] to every matching
/// symbol; `extern "C"`/`extern "C++"` blocks contribute patterns the same way.
/// A pattern matching nothing is a non-fatal [`Diag::UnresolvableVersionMatch`].
pub fn apply_version_script(
    pool: &mut NamePool,
    diagnostics: &crate::diag::Diagnostics,
    nodes: &[VersionNode],
) {
    for node in nodes {
        let node_name = node.name.clone().unwrap_or_else(|| "(anonymous)".to_string());
        apply_version_patterns(pool, diagnostics, &node_name, &node.global, VersionBinding::Global);
        apply_version_patterns(pool, diagnostics, &node_name, &node.local, VersionBinding::Local);
    }
}

fn apply_version_patterns(
    pool: &mut NamePool,
    diagnostics: &crate::diag::Diagnostics,
    node_name: &str,
    patterns: &[crate::script::ast::VersionPattern],
    binding: VersionBinding,
) {
    for pattern in patterns {
        let matches: Vec<SymbolId> = pool
            .iter()
            .filter(|(_, info)| crate::rule::glob_match(&pattern.pattern, &info.name))
            .map(|(id, _)| id)
            .collect();
        if matches.is_empty() {
            diagnostics.emit(Diag::UnresolvableVersionMatch {
                    node: node_name.to_string(),
                    pattern: pattern.pattern.clone(),
            });
            continue;
        }
        for id in matches {
            pool.get_mut(id).version = Some(binding);
        }
    }
}

/// Evaluate one top-level (or `SECTIONS`-body) scripted symbol assignment against
/// the name pool: `PROVIDE` binds only if `name` is not yet defined in the pool;
/// `HIDDEN` always binds but additionally suppresses dynamic export the same way a
/// `local:` version node does; `PROVIDE_HIDDEN` composes both behaviors.
///
/// `value` is already resolved by the time this runs: the layout engine's
/// location-counter-aware evaluator (`crate::layout::assign_addresses`) is the only
/// pass with a live `.` and section addresses to evaluate the assignment's
/// right-hand side against, so it computes `value` and passes it in here just to
/// decide whether/how the assignment binds and to record it on the pool entry.
pub fn apply_scripted_assignment(pool: &mut NamePool, name: &str, wrapper: AssignWrapper, value: u64) {
    let already_defined = pool
        .get_by_name(name)
        .map(|id| pool.get(id).desc == Desc::Defined)
        .unwrap_or(false);

    let should_bind = match wrapper {
        AssignWrapper::Provide | AssignWrapper::ProvideHidden => !already_defined,
        AssignWrapper::None | AssignWrapper::Hidden => true,
    };
    if !should_bind {
        return;
    }

    let id = pool.intern(name);
    {
        let info = pool.get_mut(id);
        info.desc = Desc::Defined;
        info.fragment = None;
        info.value = Some(value);
    }

    if matches!(wrapper, AssignWrapper::Hidden | AssignWrapper::ProvideHidden) {
        pool.get_mut(id).version = Some(VersionBinding::Local);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod test {
    use super::*;
    use crate::diag::Diagnostics;
    use crate::input::{Input, InputAttributes};
    use crate::session::Arena;

    fn two_inputs() -> (InputId, InputId) {
        let mut inputs: Arena<Input> = Arena::new();
        let a = inputs.push(Input::new("a.o", 0, InputAttributes::empty()));
        let b = inputs.push(Input::new("b.o", 1, InputAttributes::empty()));
        (a, b)
    }

    fn candidate(name: &str, origin: InputId, binding: SymbolBinding, desc: Desc) -> Candidate {
        Candidate {
            name: name.to_string(),
            origin,
            binding,
            desc,
            size: 0,
            fragment: None,
        }
    }

    #[test]
    fn defined_wins_over_undefined() {
        let (a, b) = two_inputs();
        let mut pool = NamePool::default();
        let diags = Diagnostics::new(false, false);
        resolve_one(&mut pool, &diags, false, candidate("foo", a, SymbolBinding::Global, Desc::Undefined));
        let id = resolve_one(&mut pool, &diags, false, candidate("foo", b, SymbolBinding::Global, Desc::Defined));
        assert_eq!(pool.get(id).desc, Desc::Defined);
    }

    #[test]
    fn two_strong_definitions_is_a_diagnostic() {
        let (a, b) = two_inputs();
        let mut pool = NamePool::default();
        let diags = Diagnostics::new(false, false);
        resolve_one(&mut pool, &diags, false, candidate("foo", a, SymbolBinding::Global, Desc::Defined));
        resolve_one(&mut pool, &diags, false, candidate("foo", b, SymbolBinding::Global, Desc::Defined));
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn allow_multiple_definition_suppresses_diagnostic() {
        let (a, b) = two_inputs();
        let mut pool = NamePool::default();
        let diags = Diagnostics::new(false, false);
        resolve_one(&mut pool, &diags, true, candidate("foo", a, SymbolBinding::Global, Desc::Defined));
        resolve_one(&mut pool, &diags, true, candidate("foo", b, SymbolBinding::Global, Desc::Defined));
        assert!(diags.is_empty());
    }

    #[test]
    fn weak_definition_does_not_conflict_with_strong() {
        let (a, b) = two_inputs();
        let mut pool = NamePool::default();
        let diags = Diagnostics::new(false, false);
        resolve_one(&mut pool, &diags, false, candidate("foo", a, SymbolBinding::Global, Desc::Defined));
        resolve_one(&mut pool, &diags, false, candidate("foo", b, SymbolBinding::Weak, Desc::Defined));
        assert!(diags.is_empty());
    }

    #[test]
    fn commons_merge_by_max_size() {
        let (a, b) = two_inputs();
        let mut pool = NamePool::default();
        let diags = Diagnostics::new(false, false);
        let mut ca = candidate("foo", a, SymbolBinding::Global, Desc::Common);
        ca.size = 4;
        let mut cb = candidate("foo", b, SymbolBinding::Global, Desc::Common);
        cb.size = 16;
        let id = resolve_one(&mut pool, &diags, false, ca);
        resolve_one(&mut pool, &diags, false, cb);
        assert_eq!(pool.get(id).size, 16);
    }

    #[test]
    fn weak_undefined_does_not_pull_archive_members_in_fixed_point() {
        let (a, _b) = two_inputs();
        let mut pool = NamePool::default();
        let diags = Diagnostics::new(false, false);
        let id = pool.intern("foo");
        pool.get_mut(id).desc = Desc::WeakUndefined;

        let members = vec![(a, vec![candidate("foo", a, SymbolBinding::Global, Desc::Defined)])];
        let pulled = resolve_archive_fixed_point(&mut pool, &diags, false, &members);
        assert!(pulled.is_empty());
    }

    #[test]
    fn strong_undefined_pulls_archive_member() {
        let (a, _b) = two_inputs();
        let mut pool = NamePool::default();
        let diags = Diagnostics::new(false, false);
        pool.intern("foo");

        let members = vec![(a, vec![candidate("foo", a, SymbolBinding::Global, Desc::Defined)])];
        let pulled = resolve_archive_fixed_point(&mut pool, &diags, false, &members);
        assert!(pulled.contains(&a));
    }

    #[test]
    fn hidden_assignment_suppresses_export_like_local_version_node() {
        let mut pool = NamePool::default();
        apply_scripted_assignment(&mut pool, "foo", AssignWrapper::Hidden, 0x1000);
        let id = pool.get_by_name("foo").unwrap();
        assert!(pool.get(id).is_export_suppressed());
    }

    #[test]
    fn provide_does_not_rebind_an_already_defined_symbol() {
        let mut pool = NamePool::default();
        let id = pool.intern("foo");
        pool.get_mut(id).desc = Desc::Defined;
        pool.get_mut(id).fragment = None;
        pool.get_mut(id).value = Some(0xABC);
        apply_scripted_assignment(&mut pool, "foo", AssignWrapper::Provide, 0x2000);
        // still defined, unaffected by PROVIDE since it was already bound
        assert_eq!(pool.get(id).desc, Desc::Defined);
        assert_eq!(pool.get(id).value, Some(0xABC));
    }

    #[test]
    fn provide_binds_an_undefined_symbol_to_the_given_value() {
        let mut pool = NamePool::default();
        apply_scripted_assignment(&mut pool, "foo", AssignWrapper::Provide, 0x1);
        let id = pool.get_by_name("foo").unwrap();
        assert_eq!(pool.get(id).desc, Desc::Defined);
        assert_eq!(pool.get(id).value, Some(0x1));
    }

    #[test]
    fn version_script_pattern_matching_nothing_is_a_diagnostic() {
        let mut pool = NamePool::default();
        pool.intern("foo");
        let diags = Diagnostics::new(false, false);
        let node = VersionNode {
            name: Some("VERS_1.0".to_string()),
            global: vec![crate::script::ast::VersionPattern {
                    pattern: "bar".to_string(),
                    is_extern: false,
            }],
            local: vec![],
            depends: vec![],
        };
        apply_version_script(&mut pool, &diags, std::slice::from_ref(&node));
        assert_eq!(diags.len(), 1);
    }
}
