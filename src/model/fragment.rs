//! The fragment variants : the closed tagged-variant replacement for the
//! original's `Fragment` inheritance hierarchy. A fragment is the smallest unit the
//! layout engine places; `RegionFragmentEx` is the only variant mutable enough to
//! support relaxation's in-place byte deletion.

use std::sync::Arc;

use crate::session::{SectionId, SymbolId};

/// Fields every fragment carries, regardless of variant, matching the original's
/// shared `Fragment` base-class state.
#[derive(Debug, Clone)]
pub struct FragmentHeader {
    /// The section this fragment is appended to
    pub owning_section: SectionId,
    /// Required alignment, always ≥ 1
    pub alignment: u32,
    /// Offset before alignment padding is applied; `None` is the "unset" sentinel
    pub unaligned_offset: Option<u32>,
}

impl FragmentHeader {
    /// A fresh header with no offset assigned yet.
    pub fn new(owning_section: SectionId, alignment: u32) -> Self {
        Self {
            owning_section,
            alignment: alignment.max(1),
            unaligned_offset: None,
        }
    }

    /// `align_up(unaligned_offset, alignment)`, once an unaligned offset has been
    /// assigned.
    pub fn padded_offset(&self) -> Option<u32> {
        self.unaligned_offset
            .map(|off| align_up(off, self.alignment))
    }
}

/// `align_up(value, alignment)` for a power-of-two (or 0/1, meaning "no constraint")
/// alignment, the expression the layout engine and every fragment/section offset
/// computation shares.
pub fn align_up(value: u32, alignment: u32) -> u32 {
    if alignment <= 1 {
        return value;
    }
    let mask = alignment - 1;
    (value + mask) & !mask
}

/// A byte-string backed fragment, shared (not copied) from the input's memory
/// mapping.
#[derive(Debug, Clone)]
pub struct Region {
    /// The underlying bytes, kept alive by the input's mapping
    pub bytes: Arc<[u8]>,
}

/// An owned, mutable byte region supporting in-place instruction deletion/replacement,
/// the only fragment kind relaxation mutates directly.
#[derive(Debug, Clone)]
pub struct RegionFragmentEx {
    /// Owned bytes, mutated in place by relaxation
    pub data: Vec<u8>,
    /// Symbols whose fragment-ref points into this fragment
    pub symbols: Vec<SymbolId>,
}

impl RegionFragmentEx {
    /// Construct from borrowed input bytes, copying them since relaxation needs to
    /// mutate in place (the original holds a raw, separately-owned copy for the same
    /// reason).
    pub fn new(bytes: &[u8]) -> Self {
        Self {
            data: bytes.to_vec(),
            symbols: Vec::new(),
        }
    }

    /// Overwrite `size` bytes at `offset` with `instruction`'s little-endian bytes,
    /// for relaxation passes that replace rather than delete (e.g. `auipc+jalr` -> a
    /// single `jal`, which is a replace-then-delete).
    pub fn replace_instruction(&mut self, offset: u32, instruction: u32, size: u8) {
        let offset = offset as usize;
        let size = size as usize;
        self.data[offset..offset + size].copy_from_slice(&instruction.to_le_bytes()[..size]);
    }

    /// Delete `length` bytes at `offset`, shrinking the fragment in place and
    /// reporting the adjustments the caller must apply to every relocation offset and
    /// symbol range that lives in the same owning section.
    ///
    /// `relocation_offsets` and `symbol_ranges` are mutable views the caller builds
    /// from its own relocation/symbol storage (kept decoupled from this module so the
    /// fragment model does not need to know about [`crate::model::relocation::Relocation`]
    /// or [`crate::model::symbol::ResolveInfo`] layouts); each `(offset, size)` pair
    /// in `symbol_ranges` is adjusted per the same contract a relocation offset is.
    pub fn delete_bytes<'a>(
        &mut self,
        offset: u32,
        length: u32,
        relocation_offsets: impl Iterator<Item = &'a mut u32>,
        symbol_ranges: impl Iterator<Item = &'a mut (u32, u32)>,
    ) {
        for reloc_offset in relocation_offsets {
            if *reloc_offset > offset {
                *reloc_offset -= length;
            }
        }

        for (sym_offset, sym_size) in symbol_ranges {
            if *sym_offset > offset {
                *sym_offset -= length;
            } else if offset >= *sym_offset && offset - *sym_offset < *sym_size {
                *sym_size -= length;
            }
        }

        let start = offset as usize;
        let end = start + length as usize;
        self.data.drain(start..end);
    }

    /// Current size in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// A trampoline/stub kind, distinguishing the absolute and position-independent
/// variants Hexagon's grow-only trampoline insertion synthesizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StubKind {
    /// Absolute-addressing trampoline
    Absolute,
    /// Position-independent trampoline
    Pic,
}

/// Build-ID hash algorithm selection, mirrored from [`crate::config::BuildIdMode`]
/// onto the fragment itself once the mode has been resolved to a concrete size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildIdKind {
    /// 8-byte xxhash64
    Fast,
    /// 16-byte md5
    Md5,
    /// 20-byte sha1
    Sha1,
    /// 16-byte random uuid
    Uuid,
    /// Fixed-length hex string supplied verbatim
    HexString,
}

/// The closed set of fragment payloads. Dispatch is by match, not a
/// vtable, since the set is fixed.
#[derive(Debug, Clone)]
pub enum FragmentKind {
    /// Padding/fill bytes repeating a fill pattern
    Fillment {
        /// The fill word (truncated to however many bytes are needed)
        value: u64,
        /// Number of bytes this fragment occupies
        size: u32,
    },
    /// A NUL-terminated string constant
    String(Vec<u8>),
    /// Borrowed immutable bytes straight from an input's mapping
    Region(Region),
    /// Owned, mutable bytes supporting relaxation's instruction deletion/replacement
    RegionEx(RegionFragmentEx),
    /// Backend-specific opaque target data (a relocator's scratch payload, not
    /// otherwise structured by the core)
    Target(Vec<u8>),
    /// A relaxation-inserted trampoline/stub
    Stub {
        /// Absolute vs PIC stub body
        kind: StubKind,
        /// Encoded instruction bytes
        bytes: Vec<u8>,
        /// The symbol this stub ultimately branches to
        target: SymbolId,
    },
    /// One GOT slot
    Got {
        /// The symbol this slot resolves, `None` for the reserved GOT[0] `_DYNAMIC`
        /// slot
        symbol: Option<SymbolId>,
    },
    /// Raw bytes emitted by a script's `BYTE`/`SHORT`/`LONG`/`QUAD` command
    OutputSectData(Vec<u8>),
    /// One PLT stub (PLT0 or PLTn)
    Plt {
        /// `None` for PLT0, `Some` GOTPLT-slot-referencing symbol for PLTn
        symbol: Option<SymbolId>,
        /// Encoded instruction bytes
        bytes: Vec<u8>,
    },
    /// A CFI Common Information Entry, copied verbatim from the input's `.eh_frame`
    Cie(Vec<u8>),
    /// A CFI Frame Description Entry
    Fde {
        /// Raw FDE bytes
        bytes: Vec<u8>,
        /// The CIE this FDE refers to
        cie: crate::session::FragmentId,
    },
    /// The `.eh_frame_hdr` binary-search table, built after all CIEs/FDEs are placed
    EhFrameHdr(Vec<u8>),
    /// A diagnostic/instrumentation-only fragment carrying no file bytes
    Timing,
    /// A removed fragment; contributes neither bytes nor size
    Null,
    /// One deduplicated entry of a mergeable string section (`SHF_MERGE|SHF_STRINGS`)
    MergeString {
        /// The deduplicated bytes
        bytes: Vec<u8>,
        /// How many input occurrences were folded into this one
        refcount: u32,
    },
    /// `.note.gnu.build-id`'s hash payload, finalized only after the rest of the image
    /// is laid out
    BuildId {
        /// Which algorithm produced (or will produce) the hash bytes
        kind: BuildIdKind,
        /// The hash bytes; zero-filled until [`crate::buildid`] finalizes them
        bytes: Vec<u8>,
    },
}

impl FragmentKind {
    /// Size in bytes this fragment currently occupies. For [`FragmentKind::Null`]
    /// this is always zero, which is what lets a sentinel/removed fragment sit
    /// harmlessly in a section's fragment list.
    pub fn size(&self) -> u64 {
        match self {
            FragmentKind::Fillment { size,.. } => *size as u64,
            FragmentKind::String(b) => b.len() as u64,
            FragmentKind::Region(r) => r.bytes.len() as u64,
            FragmentKind::RegionEx(r) => r.size() as u64,
            FragmentKind::Target(b) => b.len() as u64,
            FragmentKind::Stub { bytes,.. } => bytes.len() as u64,
            FragmentKind::Got {.. } => 8,
            FragmentKind::OutputSectData(b) => b.len() as u64,
            FragmentKind::Plt { bytes,.. } => bytes.len() as u64,
            FragmentKind::Cie(b) => b.len() as u64,
            FragmentKind::Fde { bytes,.. } => bytes.len() as u64,
            FragmentKind::EhFrameHdr(b) => b.len() as u64,
            FragmentKind::Timing => 0,
            FragmentKind::Null => 0,
            FragmentKind::MergeString { bytes,.. } => bytes.len() as u64,
            FragmentKind::BuildId { bytes,.. } => bytes.len() as u64,
        }
    }
}

/// A fragment: shared header plus its variant payload.
#[derive(Debug, Clone)]
pub struct Fragment {
    /// Header fields shared by every variant
    pub header: FragmentHeader,
    /// The variant payload
    pub kind: FragmentKind,
}

impl Fragment {
    /// Construct a fragment from a header and payload.
    pub fn new(header: FragmentHeader, kind: FragmentKind) -> Self {
        Self { header, kind }
    }

    /// Current size in bytes, delegating to the payload.
    pub fn size(&self) -> u64 {
        self.kind.size()
    }

    /// Alignment, always ≥ 1.
    pub fn alignment(&self) -> u32 {
        self.header.alignment
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn align_up_rounds_to_next_multiple() {
        assert_eq!(align_up(0x41, 8), 0x48);
        assert_eq!(align_up(0x40, 8), 0x40);
        assert_eq!(align_up(5, 0), 5);
        assert_eq!(align_up(5, 1), 5);
    }

    #[test]
    fn delete_bytes_shifts_later_offsets_and_shrinks_straddling_symbols() {
        let mut frag = RegionFragmentEx::new(&[0u8; 16]);
        let mut reloc_offsets = vec![4u32, 10u32, 20u32];
        let mut symbol_ranges = vec![(2u32, 10u32), (12u32, 4u32)];

        frag.delete_bytes(
            8,
            4,
            reloc_offsets.iter_mut(),
            symbol_ranges.iter_mut(),
        );

        assert_eq!(frag.size(), 12);
        // offset 4 <= delete offset 8: untouched
        assert_eq!(reloc_offsets[0], 4);
        // offset 10 > 8: shifted back by the deleted length
        assert_eq!(reloc_offsets[1], 6);
        assert_eq!(reloc_offsets[2], 16);
        // symbol at 2 with size 10 straddles the delete point (8 is within [2, 12)):
        // its size shrinks
        assert_eq!(symbol_ranges[0], (2, 6));
        // symbol at 12 starts after the delete point: offset shifts, size untouched
        assert_eq!(symbol_ranges[1], (8, 4));
    }

    #[test]
    fn null_fragment_has_zero_size() {
        use crate::model::section::{Section, SectionFlags, SectionKind};
        let mut sections: crate::session::Arena<Section> = crate::session::Arena::new();
        let section_id = sections.push(Section::new(".text", SectionFlags::empty(), SectionKind::ProgBits));
        let header = FragmentHeader::new(section_id, 1);
        let frag = Fragment::new(header, FragmentKind::Null);
        assert_eq!(frag.size(), 0);
    }
}
