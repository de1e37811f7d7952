//! The `Section` side of the data model: an input section and its accumulated
//! fragments, before and after it has been matched to an output-section rule.

use crate::session::{FragmentId, OutputSectionId, RuleId};

bitflags::bitflags! {
    /// Section flags, modeled as a plain bitflags set rather than re-deriving the
    /// codec layer's const-generic `ElfSectionHeaderFlags` (the linker model
    /// deliberately does not extend the const-generic codec types, see `DESIGN.md`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct SectionFlags: u64 {
        /// `SHF_WRITE`
        const WRITE = 0x1;
        /// `SHF_ALLOC`
        const ALLOC = 0x2;
        /// `SHF_EXECINSTR`
        const EXECINSTR = 0x4;
        /// `SHF_MERGE`
        const MERGE = 0x10;
        /// `SHF_STRINGS`
        const STRINGS = 0x20;
        /// `SHF_TLS`
        const TLS = 0x400;
        /// `SHF_HEX_GPREL`: Hexagon-specific, marks a section as accessed
        /// GP-relative (the `.scommon.*` common-allocation buckets)
        const HEX_GPREL = 0x1000_0000;
    }
}

/// Section type, narrowed to the values the layout engine branches on (full ELF
/// `sh_type` decoding lives in the codec layer; the linker model only needs to
/// distinguish "has file content" from "has none").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    /// `SHT_PROGBITS` and friends: contributes bytes to the file image
    ProgBits,
    /// `SHT_NOBITS` (`.bss`-like): contributes size but no file bytes
    NoBits,
    /// `SHT_NOTE`
    Note,
}

impl SectionKind {
    /// Merge two section kinds destined for the same output section, per the
    /// "progbits ∪ nobits" compatibility rule: any PROGBITS input wins over an
    /// all-NOBITS accumulation so the output section keeps file contents.
    pub fn merge(self, other: SectionKind) -> SectionKind {
        match (self, other) {
            (SectionKind::ProgBits, _) | (_, SectionKind::ProgBits) => SectionKind::ProgBits,
            (SectionKind::Note, _) | (_, SectionKind::Note) => SectionKind::Note,
            _ => SectionKind::NoBits,
        }
    }
}

/// The variant payloads a [`Section`] can carry, closed per the tagged-variant
/// redesign of the original's `ELFSection`/`CommonELFSection`/`EhFrameSection`/
/// `EhFrameHdrSection`/`ARMEXIDXSection` inheritance hierarchy.
#[derive(Debug, Clone, Default)]
pub enum SectionVariant {
    /// An ordinary input or output section
    #[default]
    Elf,
    /// A COMMON-symbol accumulator; the input section synthesized to hold the common
    /// symbols this section collects before common allocation assigns them real
    /// storage
    Common,
    /// `.eh_frame`: holds CIE/FDE fragments
    EhFrame,
    /// `.eh_frame_hdr`: the binary-searchable index over `.eh_frame`
    EhFrameHdr,
    /// `.ARM.exidx`: ARM exception-index table (kept for format completeness; no ARM
    /// relocator is wired up, see Non-goals)
    ArmExIdx,
}

/// One section, either as read from an input or as synthesized by the layout engine
/// for an output section.
#[derive(Debug, Clone)]
pub struct Section {
    /// Section name (`.text`, `.data.foo`, ...)
    pub name: String,
    /// Immutable section flags as read from the input (or assigned at synthesis time)
    pub flags: SectionFlags,
    /// PROGBITS/NOBITS/NOTE
    pub kind: SectionKind,
    /// `sh_entsize`; 0 if the section has no fixed entry size
    pub entry_size: u64,
    /// Alignment as declared by the input (or the running max of its fragments', once
    /// fragments are appended)
    pub alignment: u64,
    /// Original index in the input's section header table; meaningless for
    /// linker-synthesized sections
    pub original_index: u32,
    /// Which kind of section this is, beyond the common header fields
    pub variant: SectionVariant,
    /// Fragments owned by this section, in the order they were appended
    pub fragments: Vec<FragmentId>,
    /// Assigned file offset; `None` until address assignment runs
    pub offset: Option<u64>,
    /// Assigned virtual address; `None` until address assignment runs
    pub address: Option<u64>,
    /// The output section this input section was matched into; `None` for an output
    /// section itself, or for an input section not yet matched
    pub output_section: Option<OutputSectionId>,
    /// The rule this input section matched; `None` until the rule matcher runs
    pub matched_rule: Option<RuleId>,
    /// Set by `--gc-sections` when nothing reaches this section
    pub is_ignored: bool,
    /// Set when `/DISCARD/` (or an equivalent script rule) claims this section
    pub is_discarded: bool,
}

impl Section {
    /// A fresh, unmatched, unplaced section.
    pub fn new(name: impl Into<String>, flags: SectionFlags, kind: SectionKind) -> Self {
        Self {
            name: name.into(),
            flags,
            kind,
            entry_size: 0,
            alignment: 1,
            original_index: 0,
            variant: SectionVariant::Elf,
            fragments: Vec::new(),
            offset: None,
            address: None,
            output_section: None,
            matched_rule: None,
            is_ignored: false,
            is_discarded: false,
        }
    }

    /// Sum of this section's fragment sizes is an invariant the layout engine
    /// maintains incrementally; this recomputes it from scratch given a fragment
    /// arena, for assertions and tests.
    pub fn total_fragment_size(&self, fragments: &crate::session::Arena<super::fragment::Fragment>) -> u64 {
        self.fragments
            .iter()
            .map(|&id| fragments.get(id).size())
            .sum()
    }

    /// True if nothing should be emitted for this section at all (gc'd or
    /// explicitly discarded).
    pub fn is_dead(&self) -> bool {
        self.is_ignored || self.is_discarded
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn progbits_wins_merge_over_nobits() {
        assert_eq!(
            SectionKind::NoBits.merge(SectionKind::ProgBits),
            SectionKind::ProgBits
        );
        assert_eq!(
            SectionKind::ProgBits.merge(SectionKind::NoBits),
            SectionKind::ProgBits
        );
    }

    #[test]
    fn nobits_merge_stays_nobits() {
        assert_eq!(
            SectionKind::NoBits.merge(SectionKind::NoBits),
            SectionKind::NoBits
        );
    }

    #[test]
    fn new_section_is_not_dead() {
        let section = Section::new(".text", SectionFlags::ALLOC | SectionFlags::EXECINSTR, SectionKind::ProgBits);
        assert!(!section.is_dead());
    }
}
