//! Relocation records, target-agnostic at the model layer; interpretation of `kind`
//! is delegated to the target-specific [`crate::relocation::Relocator`].

use crate::session::{SectionId, SymbolId};

/// One relocation entry, read from an input section's relocation table.
#[derive(Debug, Clone)]
pub struct Relocation {
    /// The section this relocation patches bytes within
    pub owning_section: SectionId,
    /// Byte offset within `owning_section` the relocation applies at; invariant:
    /// always `< owning_section`'s size, and kept consistent with any
    /// `RegionFragmentEx` mutation via [`crate::model::fragment::RegionFragmentEx::delete_bytes`]
    pub offset: u32,
    /// Target-specific relocation type, e.g. cast from
    /// [`crate::arch::riscv::ElfRelocationTypeRISCV`] or
    /// [`crate::arch::hexagon::ElfRelocationTypeHexagon`]
    pub reloc_type: u32,
    /// The symbol this relocation resolves against
    pub symbol: SymbolId,
    /// The addend to apply, for RELA-style relocations (always 0 and unused for
    /// REL-style targets, which encode the addend in the target bytes themselves)
    pub addend: i64,
    /// Bytes at the target location at the time this relocation was read, cached so
    /// `apply` can combine them with the computed value without re-reading the
    /// fragment
    pub cached_target_bytes: Vec<u8>,
}

impl Relocation {
    /// True once a fatal discard has made this relocation's symbol unreachable (its
    /// owning section was gc'd); callers still run `apply` for discarded relocations,
    /// writing the target-specified sentinel value rather than skipping them.
    pub fn is_in_discarded_section(&self, sections: &crate::session::Arena<crate::model::section::Section>) -> bool {
        sections.get(self.owning_section).is_dead()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::section::{Section, SectionFlags, SectionKind};

    #[test]
    fn discarded_section_is_detected() {
        let mut sections = crate::session::Arena::new();
        let mut section = Section::new(".text", SectionFlags::ALLOC, SectionKind::ProgBits);
        section.is_discarded = true;
        let section_id = sections.push(section);

        let mut names = crate::model::symbol::NamePool::default();
        let symbol_id = names.intern("foo");

        let reloc = Relocation {
            owning_section: section_id,
            offset: 0,
            reloc_type: 0,
            symbol: symbol_id,
            addend: 0,
            cached_target_bytes: Vec::new(),
        };
        assert!(reloc.is_in_discarded_section(&sections));
    }
}
