//! The `ScriptCommand` tree the parser builds.

use super::expr::Expr;

/// An assignment operator, including the compound forms `PROVIDE`/`HIDDEN` wrap and
/// the compound arithmetic forms (`+= -= *= /= <<= >>= &= |= ^=`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    /// Plain `=`
    Assign,
    /// `+=`
    AddAssign,
    /// `-=`
    SubAssign,
    /// `*=`
    MulAssign,
    /// `/=`
    DivAssign,
    /// `<<=`
    ShlAssign,
    /// `>>=`
    ShrAssign,
    /// `&=`
    AndAssign,
    /// `|=`
    OrAssign,
    /// `^=`
    XorAssign,
}

/// Whether a symbol assignment is wrapped in `PROVIDE`, `HIDDEN`, or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssignWrapper {
    /// No wrapper: unconditional assignment
    #[default]
    None,
    /// `PROVIDE(name = expr)`: only binds if `name` is otherwise undefined
    Provide,
    /// `HIDDEN(name = expr)`: unconditional, but hides the symbol from dynamic export
    Hidden,
    /// `PROVIDE_HIDDEN(name = expr)`: both behaviors
    ProvideHidden,
}

/// A symbol assignment statement, usable at top level or inside a `SECTIONS` body.
#[derive(Debug, Clone)]
pub struct Assignment {
    /// The symbol name assigned to
    pub name: String,
    /// `=`/`+=`/etc.
    pub op: AssignOp,
    /// The right-hand side expression
    pub value: Expr,
    /// `PROVIDE`/`HIDDEN` wrapping, if any
    pub wrapper: AssignWrapper,
}

/// A `SORT*` wrapper applied to a section pattern, already reduced to its effective
/// policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortPolicy {
    /// No sorting: declaration order
    #[default]
    None,
    /// `SORT_BY_NAME`
    Name,
    /// `SORT_BY_ALIGNMENT`
    Alignment,
    /// `SORT_BY_NAME` outer, `SORT_BY_ALIGNMENT` inner (or the symmetric nesting):
    /// name first, alignment as the tie-break
    NameAlignment,
    /// `SORT_BY_ALIGNMENT` outer, `SORT_BY_NAME` inner: alignment first, name as the
    /// tie-break
    AlignmentName,
    /// `SORT_BY_INIT_PRIORITY`
    InitPriority,
    /// `SORT_NONE`: explicitly suppress any outer sort
    Explicit,
}

/// One section-name pattern within an input-section description, with its sort
/// wrapper and local exclusions.
#[derive(Debug, Clone)]
pub struct SectionPattern {
    /// The glob pattern itself (`.text`, `.text.*`, `*`,...)
    pub pattern: String,
    /// Effective sort policy after nested `SORT*` wrappers are resolved
    pub sort: SortPolicy,
    /// `EXCLUDE_FILE(...)` patterns local to this section pattern
    pub exclude_files: Vec<String>,
}

/// Keep/reorder policy for a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeepPolicy {
    /// Ordinary rule: gc-collectable, reorderable
    #[default]
    NoKeep,
    /// `KEEP(...)`: not gc-collectable
    Keep,
    /// Linker-inserted catch-all, ordinary keep semantics
    SpecialNoKeep,
    /// Linker-inserted catch-all, not gc-collectable
    SpecialKeep,
    /// `DONTMOVE(...)`: not reorderable
    Fixed,
    /// `KEEP_DONTMOVE(...)`: neither gc-collectable nor reorderable
    KeepFixed,
}

impl KeepPolicy {
    /// True for any variant that protects the matched sections from `--gc-sections`.
    pub fn is_kept(self) -> bool {
        matches!(self, Self::Keep | Self::SpecialKeep | Self::KeepFixed)
    }

    /// True for any variant that forbids the layout engine from reordering matched
    /// fragments relative to their rule.
    pub fn is_fixed(self) -> bool {
        matches!(self, Self::Fixed | Self::KeepFixed)
    }
}

/// An input-section description: `KEEP(archive:member(pattern1 pattern2...))` in
/// full generality.
#[derive(Debug, Clone)]
pub struct InputSectDesc {
    /// `KEEP`/`DONTMOVE`/`KEEP_DONTMOVE` wrapper
    pub keep: KeepPolicy,
    /// The file pattern (before any `:member` suffix)
    pub file_pattern: String,
    /// `archive:member` member pattern, if the file pattern contained a `:`
    pub member_pattern: Option<String>,
    /// True if this rule only matches sections originating from an archive
    pub is_archive: bool,
    /// `EXCLUDE_FILE(...)` patterns global to the whole input-section description
    pub exclude_files: Vec<String>,
    /// Section-name patterns; empty means "match every section of the matched file"
    pub sections: Vec<SectionPattern>,
}

/// One statement inside a `SECTIONS` output-section body.
#[derive(Debug, Clone)]
pub enum SectionBodyStatement {
    /// A symbol assignment
    Assignment(Assignment),
    /// `FILL(expr)`
    Fill(Expr),
    /// `BYTE/SHORT/LONG/QUAD/SQUAD(expr)`, tagged with the width in bytes
    Data {
        /// 1, 2, 4, or 8
        width: u8,
        /// The value expression
        value: Expr,
    },
    /// An input-section description
    InputSection(InputSectDesc),
}

/// The prolog of an output-section statement.
#[derive(Debug, Clone, Default)]
pub struct SectionProlog {
    /// Optional VMA expression before the section name
    pub vma: Option<Expr>,
    /// `(TYPE[,PERM])`, kept as raw text since the type/perm vocabulary is
    /// target/script-defined and the core only needs to round-trip it
    pub type_and_perm: Option<String>,
    /// `AT(expr)` in the prolog
    pub at: Option<Expr>,
    /// `ALIGN(expr)`
    pub align: Option<Expr>,
    /// `SUBALIGN(expr)`
    pub subalign: Option<Expr>,
    /// `ONLY_IF_RO`
    pub only_if_ro: bool,
    /// `ONLY_IF_RW`
    pub only_if_rw: bool,
}

/// The epilog of an output-section statement.
#[derive(Debug, Clone, Default)]
pub struct SectionEpilog {
    /// `>region`
    pub region: Option<String>,
    /// `AT>region`
    pub at_region: Option<String>,
    /// `:phdr` list
    pub phdrs: Vec<String>,
    /// `=fillexpr`
    pub fill: Option<Expr>,
}

/// One `SECTIONS` output-section statement.
#[derive(Debug, Clone)]
pub struct OutputSectionStmt {
    /// Output section name, or `/DISCARD/`
    pub name: String,
    /// Prolog fields
    pub prolog: SectionProlog,
    /// Body statements in declaration order
    pub body: Vec<SectionBodyStatement>,
    /// Epilog fields
    pub epilog: SectionEpilog,
}

/// A `PHDRS` entry.
#[derive(Debug, Clone)]
pub struct PhdrDecl {
    /// The phdr's name, referenced by `:name` in section epilogs
    pub name: String,
    /// The segment type text (`PT_LOAD`, `PT_NOTE`,..., or a numeric type)
    pub phdr_type: String,
    /// `FILEHDR` keyword present
    pub filehdr: bool,
    /// `PHDRS` keyword present
    pub phdrs_kw: bool,
    /// `AT(expr)`
    pub at: Option<Expr>,
    /// `FLAGS(expr)`
    pub flags: Option<Expr>,
}

/// A `MEMORY` entry.
#[derive(Debug, Clone)]
pub struct MemoryDecl {
    /// Region name
    pub name: String,
    /// Attribute string, e.g. `"rwx"`, `"rw!x"`
    pub attributes: String,
    /// `ORIGIN = expr`
    pub origin: Expr,
    /// `LENGTH = expr`
    pub length: Expr,
}

/// One symbol pattern inside a `VERSION` node's `global:`/`local:` block.
#[derive(Debug, Clone)]
pub struct VersionPattern {
    /// The symbol name pattern (glob)
    pub pattern: String,
    /// True if this pattern came from an `extern "C"`/`extern "C++"` block
    pub is_extern: bool,
}

/// One `VERSION` node.
#[derive(Debug, Clone)]
pub struct VersionNode {
    /// The version name, `None` for the anonymous node
    pub name: Option<String>,
    /// Patterns exported under this node
    pub global: Vec<VersionPattern>,
    /// Patterns hidden from dynamic export under this node
    pub local: Vec<VersionPattern>,
    /// Names of version nodes this one depends on (`VERSION_2.0 {... } VERSION_1.0;`)
    pub depends: Vec<String>,
}

/// Top-level recognized script commands.
#[derive(Debug, Clone)]
pub enum ScriptCommand {
    /// `ENTRY(symbol)`
    Entry(String),
    /// `OUTPUT(path)`
    Output(String),
    /// `OUTPUT_ARCH(name)`
    OutputArch(String),
    /// `OUTPUT_FORMAT(name[, big, little])`
    OutputFormat(Vec<String>),
    /// `SEARCH_DIR(path)`
    SearchDir(String),
    /// `EXTERN(sym1 sym2...)`
    Extern(Vec<String>),
    /// `INPUT(file1 file2...)`, with each entry's `-l`/whole-archive markers already
    /// resolved to plain path text (the driver maps these to real `Input`s)
    Input(Vec<String>),
    /// `GROUP(file1 file2...)`: like `INPUT` but wrapped in an implicit
    /// `--start-group`/`--end-group`
    Group(Vec<String>),
    /// `NOCROSSREFS(section1 section2...)`
    NoCrossRefs(Vec<String>),
    /// `REGION_ALIAS(alias, region)`
    RegionAlias(String, String),
    /// A top-level symbol assignment
    Assignment(Assignment),
    /// `SECTIONS {... }`
    Sections(Vec<OutputSectionStmt>),
    /// `MEMORY {... }`
    Memory(Vec<MemoryDecl>),
    /// `PHDRS {... }`
    Phdrs(Vec<PhdrDecl>),
    /// `VERSION {... }` or `VERSION name {... }`, in declaration order; an
    /// anonymous node (`name: None`) must be the only node in the script
    Version(Vec<VersionNode>),
    /// A plugin directive, kept as raw argument text since the plugin ABI is an
    /// external collaborator
    Plugin {
        /// The directive keyword (`PLUGIN_ACTIVE`, `LINKER_PLUGIN`,...)
        directive: String,
        /// Raw argument text
        args: Vec<String>,
    },
    /// `INCLUDE(path)` / `INCLUDE_OPTIONAL(path)`, already expanded into the
    /// commands from the included file by the time the parser returns them at this
    /// level; this variant remains for scripts whose driver wants to know an
    /// inclusion happened (e.g. for reproduce-tarball bookkeeping)
    Include {
        /// The included path
        path: String,
        /// False for `INCLUDE_OPTIONAL`
        required: bool,
    },
}

/// The parsed form of one script file: an ordered list of top-level commands.
#[derive(Debug, Clone, Default)]
pub struct LinkerScript {
    /// Commands in declaration order
    pub commands: Vec<ScriptCommand>,
}
