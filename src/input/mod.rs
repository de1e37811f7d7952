//! Inputs and the files that back them.

pub mod mapping;

use std::path::PathBuf;

use crate::session::SectionId;

bitflags::bitflags! {
    /// Per-input attributes set by the driver (`-Bstatic`/`-Bdynamic`, `--as-needed`,
    /// `--whole-archive`, ...) or by a script `INPUT`/`GROUP` command.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct InputAttributes: u16 {
        /// `--whole-archive`: pull in every member, not only those resolving an
        /// undefined reference
        const WHOLE_ARCHIVE = 0x01;
        /// `--as-needed`: drop the `DT_NEEDED` entry if nothing from this input is
        /// actually referenced
        const AS_NEEDED = 0x02;
        /// `--add-needed`: force a `DT_NEEDED` entry even if nothing is referenced
        const ADD_NEEDED = 0x04;
        /// `-Bstatic` was in effect when this input was named
        const STATIC = 0x08;
        /// `-just-symbols`: pull in the symbol table but contribute no sections
        const JUST_SYMBOLS = 0x10;
        /// This input is raw binary data (`--format=binary`), wrapped in a synthetic
        /// section rather than parsed as ELF
        const IS_BINARY = 0x20;
        /// This input is the base image for a `--patch-base`-style incremental link
        const IS_PATCH_BASE = 0x40;
    }
}

/// The polymorphic file kinds an [`Input`] can resolve to. Closed set, dispatched by
/// match rather than a vtable, per the arena/tagged-variant redesign.
#[derive(Debug)]
pub enum InputFile {
    /// A regular relocatable object file
    ObjectFile {
        /// Sections owned by this object, indexed in original ELF section-table order
        sections: Vec<SectionId>,
    },
    /// An archive (`.a`), not yet expanded into members
    ArchiveFile {
        /// Member names available in this archive, in archive order
        member_names: Vec<String>,
    },
    /// One member extracted from an [`InputFile::ArchiveFile`]
    ArchiveMember {
        /// The archive this member was extracted from, for diagnostics
        archive: crate::session::InputId,
        /// This member's name inside the archive
        member_name: String,
        /// Sections owned by this member
        sections: Vec<SectionId>,
    },
    /// A linker script named as an input (as opposed to `-T`)
    LinkerScriptFile {
        /// Raw script source, already read off disk
        source: String,
    },
    /// An LLVM-IR bitcode object, treated by the core as replace-inputs-then-relink:
    /// the core never inspects IR directly, only the objects it is later replaced by
    BitcodeFile,
    /// A shared object (`.so`) providing only undefined-reference resolution and a
    /// `DT_NEEDED` entry, no sections to place
    DynamicObject {
        /// `DT_SONAME`, if the object has one, else the resolved path's basename
        soname: Option<String>,
    },
    /// A linker-synthesized pseudo-input: the home for sections a plugin adds, or for
    /// command-line `BYTE`/`SHORT`/`LONG`/`QUAD` data that needs an owning input for
    /// diagnostics
    InternalFile {
        /// Sections synthesized into this internal input
        sections: Vec<SectionId>,
    },
}

/// One named input to the link, in arrival order. Arrival order (`ordinal`) is the
/// tie-break used throughout the pipeline wherever two otherwise-equal candidates
/// must be ordered deterministically.
#[derive(Debug)]
pub struct Input {
    /// The path as it was named (on the command line, or by `INPUT`/`GROUP`)
    pub original_path: String,
    /// The path after search-dir/sysroot resolution; `None` until resolution runs
    pub resolved_path: Option<PathBuf>,
    /// The archive member name, if this is (or originates from) an archive member
    pub archive_member: Option<String>,
    /// Monotonic arrival ordinal, assigned when the `Input` is created
    pub ordinal: u64,
    /// Attributes in effect when this input was named
    pub attributes: InputAttributes,
    /// The resolved file kind; `None` until the input has been opened and identified
    pub file: Option<InputFile>,
}

impl Input {
    /// Construct an input that has not yet been resolved or opened.
    pub fn new(original_path: impl Into<String>, ordinal: u64, attributes: InputAttributes) -> Self {
        Self {
            original_path: original_path.into(),
            resolved_path: None,
            archive_member: None,
            ordinal,
            attributes,
            file: None,
        }
    }

    /// True once [`Input::file`] has been populated by the loader.
    pub fn is_resolved(&self) -> bool {
        self.file.is_some()
    }

    /// Whether this input should contribute a `DT_NEEDED` entry given whether
    /// anything from it was actually referenced, per `--as-needed`/`--add-needed`.
    pub fn needs_dt_needed(&self, referenced: bool) -> bool {
        if self.attributes.contains(InputAttributes::ADD_NEEDED) {
            return true;
        }
        if self.attributes.contains(InputAttributes::AS_NEEDED) {
            return referenced;
        }
        true
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn as_needed_drops_unreferenced_dynamic_inputs() {
        let input = Input::new("libfoo.so", 0, InputAttributes::AS_NEEDED);
        assert!(!input.needs_dt_needed(false));
        assert!(input.needs_dt_needed(true));
    }

    #[test]
    fn add_needed_always_keeps_the_entry() {
        let input = Input::new("libfoo.so", 0, InputAttributes::ADD_NEEDED);
        assert!(input.needs_dt_needed(false));
    }

    #[test]
    fn default_attributes_always_need_dt_needed() {
        let input = Input::new("libfoo.so", 0, InputAttributes::default());
        assert!(input.needs_dt_needed(false));
    }
}
