//! Diagnostics for the linker core, as distinct from the lower-level object-file
//! [`crate::error::Error`]. A `Diag` describes something that can go wrong anywhere
//! from script parsing through final emit; a [`Diagnostics`] sink accumulates them for
//! the duration of a link.

use std::fmt;

/// Severity of a recorded diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Recorded, does not by itself abort the link
    Warning,
    /// Recorded, aborts the link once the current phase reaches its next boundary
    Fatal,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
/// A single diagnosable condition raised anywhere in the linker core.
pub enum Diag {
    // -- script syntax --
    /// An `INCLUDE`d file never closed a `/* ... */` comment
    #[error("{file}:{line}: unclosed comment")]
    UnclosedComment {
        /// File the comment began in
        file: String,
        /// Line the comment began on
        line: u32,
    },
    /// A quoted token was never closed before end of file
    #[error("{file}:{line}: unclosed quote")]
    UnclosedQuote {
        /// File the quote began in
        file: String,
        /// Line the quote began on
        line: u32,
    },
    /// The lexer or parser encountered a token it did not expect in this context
    #[error("{file}:{line}: unexpected token {found:?}, expected {expected}")]
    UnexpectedToken {
        /// File the token was read from
        file: String,
        /// Line the token was read from
        line: u32,
        /// The token actually found
        found: String,
        /// A description of what was expected
        expected: String,
    },
    /// `INCLUDE` formed a cycle back to a file already being processed
    #[error("include cycle detected: {cycle}")]
    IncludeCycle {
        /// The chain of filenames forming the cycle, joined by " -> "
        cycle: String,
    },
    /// A `PHDRS` entry named a segment type the parser does not recognize
    #[error("{file}:{line}: invalid PHDR type {type_name:?}")]
    InvalidPhdrType {
        /// File the PHDRS command was read from
        file: String,
        /// Line the PHDRS command was read from
        line: u32,
        /// The unrecognized type name
        type_name: String,
    },
    /// Two nested `SORT_*` wrappers combined in a way that has no defined effective
    /// policy (e.g. two alignment sorts nested inside each other)
    #[error("invalid combination of sort directives: outer {outer:?}, inner {inner:?}")]
    InvalidSortCombination {
        /// The outer sort directive
        outer: String,
        /// The inner sort directive
        inner: String,
    },
    /// A top-level script keyword was recognized lexically but is not a supported
    /// directive in this position
    #[error("{file}:{line}: unknown directive {directive:?}")]
    UnknownDirective {
        /// File the directive was read from
        file: String,
        /// Line the directive was read from
        line: u32,
        /// The unrecognized directive
        directive: String,
    },

    // -- expression evaluation --
    /// `ASSERT(expr, msg)` evaluated `expr` to zero
    #[error("assertion failed: {message}")]
    AssertionFailed {
        /// The message supplied to `ASSERT`
        message: String,
    },
    /// A `/` or `%` expression operator divided by a runtime-zero operand
    #[error("division or modulo by zero in expression")]
    DivisionByZero,
    /// An expression referenced a memory region that was never declared in `MEMORY`
    #[error("undefined memory region {name:?}")]
    UndefinedMemoryRegion {
        /// The region name referenced
        name: String,
    },

    // -- input --
    /// An input path named on the command line or by a script command could not be
    /// opened
    #[error("cannot open input {path:?}: {reason}")]
    UnreadableInput {
        /// The path that could not be opened
        path: String,
        /// The underlying I/O failure
        reason: String,
    },
    /// An archive member name referenced by a script rule does not exist in the
    /// archive
    #[error("archive {archive:?} has no member {member:?}")]
    ArchiveMemberNotFound {
        /// The archive searched
        archive: String,
        /// The member name looked for
        member: String,
    },
    /// The machine recorded in an input's ELF header does not match the link's target
    #[error("{path:?} has unsupported machine {machine:#x}, expected {expected:#x}")]
    UnsupportedMachine {
        /// The offending input
        path: String,
        /// The machine value found
        machine: u32,
        /// The machine value the link target expects
        expected: u32,
    },

    // -- resolution --
    /// A strong symbol was defined by more than one input
    #[error("multiple definition of {symbol:?}: first in {first:?}, again in {second:?}")]
    MultipleDefinition {
        /// The symbol name
        symbol: String,
        /// The input that defined it first
        first: String,
        /// The input defining it again
        second: String,
    },
    /// A strong reference to `symbol` was never satisfied
    #[error("undefined reference to {symbol:?}")]
    UndefinedReference {
        /// The symbol name
        symbol: String,
    },
    /// A version script referenced a symbol pattern that matched nothing
    #[error("version node {node:?} pattern {pattern:?} matched no symbol")]
    UnresolvableVersionMatch {
        /// The version node the pattern was declared in
        node: String,
        /// The pattern that matched nothing
        pattern: String,
    },

    // -- layout --
    /// A memory region's assigned output sections exceed its declared length
    #[error("memory region {region:?} overflowed by {overflow:#x} bytes")]
    RegionOverflow {
        /// The overflowing region's name
        region: String,
        /// Bytes by which the region's content exceeds its length
        overflow: u64,
    },
    /// Two output sections claimed overlapping address ranges under `--check-sections`
    #[error("sections {first:?} and {second:?} overlap in the address range")]
    SectionAddressOverlap {
        /// The first section
        first: String,
        /// The second section
        second: String,
    },
    /// Two input sections matched to the same output section disagree on flags and
    /// `--no-warn-mismatch` was not given
    #[error("conflicting section flags for {section:?}: {first:#x} vs {second:#x}")]
    ConflictingSectionFlags {
        /// The input section name
        section: String,
        /// Flags of the first matched input section
        first: u64,
        /// Flags of the conflicting input section
        second: u64,
    },

    // -- relocation --
    /// A relocation type has no scan/apply handling for the current target
    #[error("unsupported relocation type {reloc_type:#x} against {symbol:?}")]
    UnsupportedRelocation {
        /// The raw relocation type
        reloc_type: u32,
        /// The symbol the relocation targets
        symbol: String,
    },
    /// A relocation's computed value does not fit in its field
    #[error("relocation overflow: {reloc_type:#x} against {symbol:?}, value {value:#x}")]
    RelocationOverflow {
        /// The raw relocation type
        reloc_type: u32,
        /// The symbol the relocation targets
        symbol: String,
        /// The value that overflowed the field
        value: i64,
    },
    /// A RISC-V `R_RISCV_PCREL_LO12_{I,S}` could not find its paired
    /// `R_RISCV_PCREL_HI20`
    #[error("R_RISCV_PCREL_LO12 at offset {offset:#x} in {section:?} has no matching HI20")]
    HiNotFound {
        /// The section containing the unpaired LO relocation
        section: String,
        /// The offset of the unpaired LO relocation
        offset: u64,
    },

    // -- relaxation --
    /// An `R_RISCV_ALIGN` relocation requested more padding than the space between it
    /// and the next relocation allows once slack has already been removed
    #[error("insufficient space to satisfy alignment in {section:?} at offset {offset:#x}")]
    AlignSlackInsufficient {
        /// The section the alignment directive applies to
        section: String,
        /// The offset of the alignment directive
        offset: u64,
    },
    /// Relaxation did not reach a fixed point within the per-target pass cap
    #[error("relaxation did not converge after {passes} passes")]
    RelaxationDidNotConverge {
        /// The number of passes attempted before giving up
        passes: u32,
    },

    // -- plugin --
    /// A plugin called an operation that is illegal in the current `LinkState`
    #[error("plugin operation {operation:?} is invalid in link state {state:?}")]
    InvalidLinkState {
        /// The operation attempted
        operation: String,
        /// The link state at the time
        state: String,
    },
    /// A plugin attempted to add a fragment that was already added
    #[error("plugin attempted to add chunk {chunk:?} a second time")]
    MultipleChunkAdd {
        /// The chunk identifier
        chunk: String,
    },
    /// A plugin attempted to remove a chunk that is not tracked
    #[error("plugin attempted to remove unknown chunk {chunk:?}")]
    ChunkNotFound {
        /// The chunk identifier
        chunk: String,
    },

    // -- build id --
    /// `--build-id=0xHEX` was given a literal that does not match `[0-9a-fA-F]+`
    #[error("--build-id hex string {literal:?} is not valid hexadecimal")]
    InvalidBuildIdHexString {
        /// The literal as given on the command line
        literal: String,
    },

    // -- dynamic --
    /// A PLT entry was requested for a symbol marked `patchable` before its
    /// `__llvm_patchable_<name>` alias was resolved
    #[error("PLT requested for patchable symbol {symbol:?} before its alias was registered")]
    PatchableAliasNotRegistered {
        /// The symbol the PLT entry was requested for
        symbol: String,
    },
}

impl Diag {
    /// The severity this diagnostic carries before any `--fatal-warnings`/
    /// `--warnings-as-errors` promotion is applied.
    pub fn default_severity(&self) -> Severity {
        match self {
            Diag::UnclosedComment { .. }
            | Diag::UnclosedQuote { .. }
            | Diag::UnexpectedToken { .. }
            | Diag::IncludeCycle { .. }
            | Diag::InvalidPhdrType { .. }
            | Diag::InvalidSortCombination { .. }
            | Diag::UnknownDirective { .. }
            | Diag::AssertionFailed { .. }
            | Diag::DivisionByZero
            | Diag::UndefinedMemoryRegion { .. }
            | Diag::UnreadableInput { .. }
            | Diag::ArchiveMemberNotFound { .. }
            | Diag::UnsupportedMachine { .. }
            | Diag::MultipleDefinition { .. }
            | Diag::RegionOverflow { .. }
            | Diag::SectionAddressOverlap { .. }
            | Diag::UnsupportedRelocation { .. }
            | Diag::RelocationOverflow { .. }
            | Diag::HiNotFound { .. }
            | Diag::AlignSlackInsufficient { .. }
            | Diag::RelaxationDidNotConverge { .. }
            | Diag::InvalidLinkState { .. }
            | Diag::MultipleChunkAdd { .. }
            | Diag::ChunkNotFound { .. }
            | Diag::InvalidBuildIdHexString { .. }
            | Diag::PatchableAliasNotRegistered { .. } => Severity::Fatal,
            Diag::UndefinedReference { .. }
            | Diag::UnresolvableVersionMatch { .. }
            | Diag::ConflictingSectionFlags { .. } => Severity::Warning,
        }
    }
}

/// One recorded diagnostic, with the severity it was actually emitted at (after any
/// `--fatal-warnings`-style promotion).
#[derive(Debug, Clone)]
pub struct Record {
    /// The diagnostic itself
    pub diag: Diag,
    /// The severity it was emitted at
    pub severity: Severity,
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.severity {
            Severity::Warning => write!(f, "warning: {}", self.diag),
            Severity::Fatal => write!(f, "error: {}", self.diag),
        }
    }
}

/// Append-only diagnostic sink shared across a link. Diagnosis (constructing a `Diag`)
/// may happen from any worker; recording it takes a lock only for the append, per the
/// concurrency model's "append-only, serialized emission" rule.
#[derive(Debug, Default)]
pub struct Diagnostics {
    records: std::sync::Mutex<Vec<Record>>,
    fatal: std::sync::atomic::AtomicBool,
    fatal_warnings: bool,
    warnings_as_errors: bool,
}

impl Diagnostics {
    /// Create a sink. `fatal_warnings` promotes every warning to fatal.
    /// `warnings_as_errors` additionally changes the default severity table itself
    /// (distinct knob per `--warnings-as-errors` vs `--fatal-warnings` in the CLI
    /// surface).
    pub fn new(fatal_warnings: bool, warnings_as_errors: bool) -> Self {
        Self {
            records: std::sync::Mutex::new(Vec::new()),
            fatal: std::sync::atomic::AtomicBool::new(false),
            fatal_warnings,
            warnings_as_errors,
        }
    }

    /// Record a diagnostic, applying severity promotion, and flip the "diagnose" flag
    /// if it ends up fatal.
    pub fn emit(&self, diag: Diag) {
        let mut severity = diag.default_severity();
        if severity == Severity::Warning && (self.fatal_warnings || self.warnings_as_errors) {
            severity = Severity::Fatal;
        }
        if severity == Severity::Fatal {
            self.fatal.store(true, std::sync::atomic::Ordering::Relaxed);
        }
        #[allow(clippy::unwrap_used)]
        self.records.lock().unwrap().push(Record { diag, severity });
    }

    /// True once any fatal diagnostic has been recorded. Tasks test this at step
    /// boundaries and abandon remaining work in the current step.
    pub fn has_fatal(&self) -> bool {
        self.fatal.load(std::sync::atomic::Ordering::Relaxed)
    }

    /// Number of diagnostics recorded so far, regardless of severity.
    pub fn len(&self) -> usize {
        #[allow(clippy::unwrap_used)]
        self.records.lock().unwrap().len()
    }

    /// True if no diagnostics have been recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of every diagnostic recorded so far, in emission order.
    pub fn records(&self) -> Vec<Record> {
        #[allow(clippy::unwrap_used)]
        self.records.lock().unwrap().clone()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn warning_does_not_set_fatal() {
        let diags = Diagnostics::new(false, false);
        diags.emit(Diag::UndefinedReference {
            symbol: "foo".into(),
        });
        assert!(!diags.has_fatal());
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn fatal_warnings_promotes_severity() {
        let diags = Diagnostics::new(true, false);
        diags.emit(Diag::UndefinedReference {
            symbol: "foo".into(),
        });
        assert!(diags.has_fatal());
    }

    #[test]
    fn region_overflow_is_fatal_by_default() {
        let diags = Diagnostics::new(false, false);
        diags.emit(Diag::RegionOverflow {
            region: "RAM".into(),
            overflow: 0x100,
        });
        assert!(diags.has_fatal());
    }
}
