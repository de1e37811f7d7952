//! Symbols: the `NamePool` shared name table plus the per-symbol `ResolveInfo`/
//! `LDSymbol` pair.

use std::collections::HashMap;

use crate::session::{FragmentId, InputId, SymbolId};

/// `STT_*`, narrowed to what the resolver and relocation scanners branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolType {
    /// No type information
    NoType,
    /// Data object
    Object,
    /// Function
    Func,
    /// Section symbol (used by relocations against a section rather than a named
    /// symbol)
    Section,
    /// TLS object, resolved through a GOT-based TLS access model
    Tls,
    /// Indirect function (IFUNC), resolved at load time through a resolver stub
    GnuIFunc,
}

/// `STB_*`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolBinding {
    /// Local to the defining input, never exported
    Local,
    /// Ordinarily visible binding
    Global,
    /// Weak binding: does not itself pull archive members, and is silently overridden
    /// by a same-named global/weak definition without a multiple-definition
    /// diagnostic
    Weak,
}

/// `STV_*`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    /// Visibility follows binding
    #[default]
    Default,
    /// Never preemptible, even if exported
    Protected,
    /// Not exported; visible only within the defining module
    Hidden,
    /// Hidden and additionally not placed in the dynamic symbol table at all
    Internal,
}

/// Resolution state of a symbol name, tracked across the multi-pass archive
/// resolution fixed point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Desc {
    /// Has a fragment or absolute value
    Defined,
    /// Referenced but not yet (or never) defined
    Undefined,
    /// A COMMON symbol: has size/alignment but no fragment until common allocation
    Common,
    /// Undefined and weak: does not itself keep an archive member alive
    WeakUndefined,
}

/// Where a version script assigned a matched symbol: the global export surface, or
/// hidden in a `local:` block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionBinding {
    /// Exported under the named (or empty/base) version node
    Global,
    /// Hidden from the dynamic symbol table
    Local,
}

/// The resolved identity of a symbol name: one per name, after resolution has settled
/// on a winning definition.
#[derive(Debug, Clone)]
pub struct ResolveInfo {
    /// The symbol's name
    pub name: String,
    /// `STT_*`
    pub symbol_type: SymbolType,
    /// `STB_*`
    pub binding: SymbolBinding,
    /// `STV_*`
    pub visibility: Visibility,
    /// Defined/undefined/common/weak-undefined
    pub desc: Desc,
    /// The input that contributed the winning definition; `None` before resolution
    pub origin: Option<InputId>,
    /// Size in bytes (0 for most function/section symbols, meaningful for commons and
    /// data objects)
    pub size: u64,
    /// The fragment this symbol points into; `None` for an absolute value or an
    /// unresolved common
    pub fragment: Option<FragmentId>,
    /// An absolute value assigned directly by a script symbol assignment
    /// (`foo = expr;`/`PROVIDE(foo = expr);`), as opposed to a fragment-relative one.
    /// `None` for symbols defined by an input section rather than a script.
    pub value: Option<u64>,
    /// Set once a version script or `--dynamic-list`/`--export-dynamic-symbol` has
    /// decided this symbol's dynamic-export status
    pub version: Option<VersionBinding>,
    /// True if a `.llvm_patchable_<name>` alias exists, which must be materialized
    /// before any PLT entry for this symbol is (Open Question, resolved in
    /// `DESIGN.md`: the core now requires the alias to be registered before
    /// `ensure_plt` runs and errors otherwise rather than silently ordering around it)
    pub patchable: bool,
}

impl ResolveInfo {
    /// A fresh, undefined reference: the initial state every name starts in before
    /// any input has been scanned.
    pub fn new_undefined(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            symbol_type: SymbolType::NoType,
            binding: SymbolBinding::Global,
            visibility: Visibility::Default,
            desc: Desc::Undefined,
            origin: None,
            size: 0,
            fragment: None,
            value: None,
            version: None,
            patchable: false,
        }
    }

    /// True if this symbol's current state should pull in an archive member that
    /// defines it: a strong (non-weak) undefined reference.
    pub fn pulls_archive_members(&self) -> bool {
        matches!(self.desc, Desc::Undefined)
    }

    /// True if this symbol is hidden from the dynamic symbol table, either by
    /// explicit visibility or by a version script `local:` block.
    pub fn is_export_suppressed(&self) -> bool {
        matches!(
            self.visibility,
            Visibility::Hidden | Visibility::Internal
        ) || matches!(self.version, Some(VersionBinding::Local))
    }
}

/// The linker-output-facing half of a symbol: its resolved value and symtab
/// placement, as opposed to [`ResolveInfo`]'s resolution bookkeeping.
#[derive(Debug, Clone)]
pub struct LdSymbol {
    /// Resolved value: either an absolute address or an offset within `fragment`
    pub value: u64,
    /// The fragment this value is relative to; `None` for an absolute symbol
    pub fragment: Option<FragmentId>,
    /// Set by `--gc-sections`/stripping to omit this symbol from the output symtab
    pub should_ignore: bool,
    /// Index in the output symbol table; assigned during symtab emission
    pub symtab_index: Option<u32>,
}

impl LdSymbol {
    /// A symbol with an as-yet-unassigned value, pointing into `fragment`.
    pub fn new(fragment: FragmentId) -> Self {
        Self {
            value: 0,
            fragment: Some(fragment),
            should_ignore: false,
            symtab_index: None,
        }
    }

    /// An absolute-valued symbol (no fragment), e.g. one defined entirely by a script
    /// assignment that evaluates to a constant.
    pub fn new_absolute(value: u64) -> Self {
        Self {
            value,
            fragment: None,
            should_ignore: false,
            symtab_index: None,
        }
    }
}

/// Maps `&str` to [`SymbolId`], the shared name table every input's symbols resolve
/// into. Written only during the serial resolution step ; every other step
/// only reads it.
#[derive(Default)]
pub struct NamePool {
    symbols: crate::session::Arena<ResolveInfo>,
    by_name: HashMap<String, SymbolId>,
}

impl NamePool {
    /// Look up the id for `name`, creating a fresh undefined entry if this is the
    /// first time `name` has been seen.
    pub fn intern(&mut self, name: &str) -> SymbolId {
        if let Some(&id) = self.by_name.get(name) {
            return id;
        }
        let id = self.symbols.push(ResolveInfo::new_undefined(name));
        self.by_name.insert(name.to_string(), id);
        id
    }

    /// Look up an already-interned name without creating one.
    pub fn get_by_name(&self, name: &str) -> Option<SymbolId> {
        self.by_name.get(name).copied()
    }

    /// Borrow a symbol's resolution state.
    pub fn get(&self, id: SymbolId) -> &ResolveInfo {
        self.symbols.get(id)
    }

    /// Mutably borrow a symbol's resolution state.
    pub fn get_mut(&mut self, id: SymbolId) -> &mut ResolveInfo {
        self.symbols.get_mut(id)
    }

    /// Number of distinct names interned so far.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// True if nothing has been interned yet.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Iterate every interned symbol, in first-interned order.
    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &ResolveInfo)> {
        self.symbols.iter()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn interning_the_same_name_twice_returns_the_same_id() {
        let mut pool = NamePool::default();
        let a = pool.intern("foo");
        let b = pool.intern("foo");
        assert_eq!(a, b);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn fresh_symbol_is_undefined_and_pulls_archive_members() {
        let mut pool = NamePool::default();
        let id = pool.intern("foo");
        assert!(pool.get(id).pulls_archive_members());
    }

    #[test]
    fn weak_undefined_symbol_does_not_pull_archive_members() {
        let mut pool = NamePool::default();
        let id = pool.intern("foo");
        pool.get_mut(id).desc = Desc::WeakUndefined;
        assert!(!pool.get(id).pulls_archive_members());
    }

    #[test]
    fn hidden_visibility_suppresses_export() {
        let mut pool = NamePool::default();
        let id = pool.intern("foo");
        pool.get_mut(id).visibility = Visibility::Hidden;
        assert!(pool.get(id).is_export_suppressed());
    }

    #[test]
    fn local_version_node_suppresses_export_even_with_default_visibility() {
        let mut pool = NamePool::default();
        let id = pool.intern("foo");
        pool.get_mut(id).version = Some(VersionBinding::Local);
        assert!(pool.get(id).is_export_suppressed());
    }
}
