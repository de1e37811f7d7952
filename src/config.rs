//! Recognized link-time options. Command-line parsing itself is out of scope for the
//! core (see the crate-level docs); [`GeneralOptions`] is the surface the driver
//! populates from whatever front end it is embedded in and the rest of the core reads.

use std::collections::HashSet;

use typed_builder::TypedBuilder;

/// `--hash-style`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashStyle {
    /// `.hash` only
    #[default]
    SysV,
    /// `.gnu.hash` only
    Gnu,
    /// Both `.hash` and `.gnu.hash`
    Both,
}

/// `-z now|lazy`, `-z relro|norelro`, and the other `-z` boolean toggles the core
/// reads directly (as opposed to ones only the dynamic loader interprets).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ZOptions {
    /// `-z now`: no lazy PLT binding: GOTPLT slots hold final addresses immediately
    /// and PLT0 is omitted
    pub now: bool,
    /// `-z relro`: emit `PT_GNU_RELRO` covering the relro-eligible sections
    pub relro: bool,
    /// `-z execstack`: mark `PT_GNU_STACK` executable
    pub execstack: bool,
    /// `-z noexecstack`: mark `PT_GNU_STACK` non-executable (default)
    pub noexecstack: bool,
    /// `-z global`: `DF_1_GLOBAL`
    pub global: bool,
    /// `-z initfirst`: `DF_1_INITFIRST`
    pub initfirst: bool,
    /// `-z nodelete`: `DF_1_NODELETE`
    pub nodelete: bool,
    /// `-z combreloc`: sort `.rela.dyn` by symbol for the dynamic loader's benefit
    pub combreloc: bool,
}

/// `--build-id[=...]`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BuildIdMode {
    /// No build-ID note is emitted
    #[default]
    None,
    /// 8-byte xxhash64 digest
    Fast,
    /// 16-byte md5 digest
    Md5,
    /// 20-byte sha1 digest
    Sha1,
    /// 16-byte digest from a random source, not derived from the image
    Uuid,
    /// A fixed byte string supplied as hex on the command line, validated to match
    /// `[0-9a-fA-F]+`
    HexString(String),
}

/// `--riscv-relax`, `--riscv-gprelax`, `--riscv-relax-to-c`, and the generic
/// `--relax/--no-relax` switch, bundled since they gate the same relaxation loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TypedBuilder)]
pub struct RelaxOptions {
    #[builder(default = true)]
    /// Master switch; `--no-relax` clears this and the loop does not run at all
    pub relax: bool,
    #[builder(default = true)]
    /// `R_RISCV_CALL`/`CALL_PLT` shrinking and `R_RISCV_ALIGN` slack removal
    pub riscv_relax: bool,
    #[builder(default = true)]
    /// GP-relative rewriting of `PCREL_HI20`/`LO12` and `HI20`/`LO12` pairs
    pub riscv_gprelax: bool,
    #[builder(default = false)]
    /// Prefer compressed (`C.J`/`C.JAL`/compressed `LUI`) encodings when relaxation
    /// has a choice
    pub riscv_relax_to_c: bool,
    #[builder(default = 64)]
    /// Hard cap on relaxation passes before `Diag::RelaxationDidNotConverge`
    pub max_passes: u32,
}

impl Default for RelaxOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Top-level linking mode, mirroring `-shared`/`-static`/the default (dynamically
/// linked executable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputKind {
    /// `-shared`: position-independent shared object
    SharedObject,
    /// `-static`: fully static executable, no dynamic sections
    StaticExecutable,
    /// The default: dynamically linked executable
    #[default]
    DynamicExecutable,
}

#[derive(Debug, Clone, PartialEq, Eq, TypedBuilder)]
/// Options that are not one of: the input file list, or an attribute of a specific
/// input file. Populated by whatever embeds the core (CLI front end, build system
/// integration, test harness) and read throughout the pipeline.
pub struct GeneralOptions {
    #[builder(default, setter(strip_option, into))]
    /// `--entry`: the symbol (or absolute address text) that becomes `e_entry`
    pub entry: Option<String>,
    #[builder(default)]
    /// `--gc-sections`
    pub gc_sections: bool,
    #[builder(default)]
    /// `--print-gc-sections`
    pub print_gc_sections: bool,
    #[builder(default)]
    /// `--no-undefined`: promotes `Diag::UndefinedReference` to fatal
    pub no_undefined: bool,
    #[builder(default)]
    /// `--allow-multiple-definition`: demotes `Diag::MultipleDefinition` to a warning
    pub allow_multiple_definition: bool,
    #[builder(default)]
    /// `--warn-common`: report size/alignment mismatches on merged common symbols
    pub warn_common: bool,
    #[builder(default)]
    /// Top-level output kind (`-shared`/`-static`/default)
    pub output_kind: OutputKind,
    #[builder(default)]
    /// `--export-dynamic`: export every global symbol to the dynamic symbol table
    pub export_dynamic: bool,
    #[builder(default, setter(into))]
    /// `--dynamic-list`: symbol name patterns to force into the dynamic symbol table
    pub dynamic_list: Vec<String>,
    #[builder(default, setter(into))]
    /// `--export-dynamic-symbol`: individually named symbols to force-export
    pub export_dynamic_symbols: Vec<String>,
    #[builder(default, setter(strip_option, into))]
    /// `--version-script`: path to a version script, parsed as a `VERSION` command
    pub version_script: Option<String>,
    #[builder(default, setter(into))]
    /// `--extern-list` / `EXTERN`: force-undefined symbols that keep archive members
    /// alive without themselves requiring definition
    pub extern_list: Vec<String>,
    #[builder(default, setter(into))]
    /// `-T`: additional linker scripts, processed in argument order
    pub scripts: Vec<String>,
    #[builder(default, setter(into))]
    /// `-L`: directories searched for bare `-lfoo`-style inputs
    pub search_dirs: Vec<String>,
    #[builder(default, setter(strip_option, into))]
    /// `--sysroot`: prefix applied to absolute paths found in scripts
    pub sysroot: Option<String>,
    #[builder(default)]
    /// Relaxation configuration (`--relax`/`--no-relax` and the RISC-V variants)
    pub relax: RelaxOptions,
    #[builder(default)]
    /// `--build-id[=...]`
    pub build_id: BuildIdMode,
    #[builder(default)]
    /// `--hash-style`
    pub hash_style: HashStyle,
    #[builder(default)]
    /// `-z ...` boolean toggles
    pub z_options: ZOptions,
    #[builder(default = 0x1000)]
    /// `--max-page-size=N`
    pub max_page_size: u64,
    #[builder(default = 0x1000)]
    /// `--common-page-size=N`
    pub common_page_size: u64,
    #[builder(default)]
    /// `--no-warn-mismatch`: do not diagnose conflicting input section flags when
    /// merging into the same output section
    pub no_warn_mismatch: bool,
    #[builder(default = 1)]
    /// `--threads=N`; 1 or less forces every parallel step to run sequentially
    pub threads: usize,
    #[builder(default)]
    /// `--reproduce` / `--reproduce-on-fail`: capture a reproduce tarball
    pub reproduce: ReproduceMode,
    #[builder(default)]
    /// `--print-memory-usage`
    pub print_memory_usage: bool,
    #[builder(default)]
    /// `--fatal-warnings`: promote every warning-severity diagnostic to fatal
    pub fatal_warnings: bool,
    #[builder(default)]
    /// `--warnings-as-errors`: alters the default severity table itself, distinct
    /// from `--fatal-warnings`' blanket promotion
    pub warnings_as_errors: bool,
    #[builder(default)]
    /// `--fatal-internal-errors`: an internal (programmer) error aborts immediately
    /// rather than being recorded and continuing
    pub fatal_internal_errors: bool,
    #[builder(default)]
    /// `--check-sections`: diagnose output sections whose address ranges overlap
    pub check_sections: bool,
    #[builder(default, setter(into))]
    /// Diagnostic ids silenced regardless of default severity, mirroring the codec
    /// layer's [`crate::Config::ignore`] pattern at the linker-diagnostics layer
    pub suppressed: HashSet<String>,
}

/// `--reproduce[-on-fail]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReproduceMode {
    /// No tarball captured
    #[default]
    Off,
    /// Always capture a reproduce tarball
    Always,
    /// Capture a reproduce tarball only if the link fails
    OnFail,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults_are_conservative() {
        let opts = GeneralOptions::builder().build();
        assert!(!opts.gc_sections);
        assert!(!opts.no_undefined);
        assert_eq!(opts.threads, 1);
        assert_eq!(opts.max_page_size, 0x1000);
        assert_eq!(opts.build_id, BuildIdMode::None);
    }

    #[test]
    fn relax_options_default_enables_relaxation() {
        let relax = RelaxOptions::default();
        assert!(relax.relax);
        assert!(relax.riscv_relax);
        assert_eq!(relax.max_passes, 64);
    }
}
