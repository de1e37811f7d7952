//! Relocation scan and apply : per-target `Relocator`s decide what
//! auxiliary GOT/PLT/copy/dynamic entries a relocation requires, then patch target
//! bytes once layout has settled addresses. Scan is partitionable by input section,
//! apply by output section; both read-only with respect to each other's
//! partitions except for the shared, lock-guarded synthetic section each scan
//! pass appends its discoveries to.

use std::collections::HashMap;

use crate::arch::hexagon::ElfRelocationTypeHexagon;
use crate::arch::riscv::ElfRelocationTypeRISCV;
use crate::diag::Diag;
use crate::model::relocation::Relocation;
use crate::model::section::Section;
use crate::model::symbol::{NamePool, SymbolType};
use crate::session::{Arena, FragmentId, SectionId, SymbolId};

/// Which backend a link targets; selects the `Relocator` implementation. Backends
/// are an open set, so dispatch is a match on this enum rather than a closed trait
/// object hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetMachine {
    /// `EM_RISCV`
    RiscV,
    /// `EM_HEXAGON`
    Hexagon,
}

/// One auxiliary entry a scanned relocation requires. Reservations are idempotent
/// per `(symbol, kind)` : recording the same reservation twice is a no-op
/// at the consuming ([`crate::dynamic`]) layer, which dedupes by this pair before
/// allocating a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReservationKind {
    /// A regular GOT slot holding the symbol's resolved address
    Got,
    /// A GOT slot pair for the TLS general-dynamic access model
    GotTlsGd,
    /// A GOT slot pair for the TLS local-dynamic access model
    GotTlsLd,
    /// A GOT slot for the TLS initial-exec access model
    GotTlsIe,
    /// A PLT (and paired GOTPLT) slot
    Plt,
    /// A `.bss` copy-relocation for a data symbol resolved against a dynamic object
    Copy,
    /// A `R_*_RELATIVE` dynamic relocation for a position-independent reference
    Relative,
    /// A `R_*_GLOB_DAT` dynamic relocation for an address-taken external symbol
    GlobDat,
}

/// A single reservation a scan emitted, keyed by the symbol it concerns so the
/// dynamic-synthesis layer can dedupe per `(symbol, kind)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Reservation {
    /// The symbol this reservation is for
    pub symbol: SymbolId,
    /// Which auxiliary entry kind
    pub kind: ReservationKind,
}

/// Outcome of patching one relocation's target bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyResult {
    /// Patched successfully
    Ok,
    /// The computed value does not fit the field's encoding
    Overflow,
    /// The relocation type/target combination is malformed beyond a simple overflow
    BadReloc,
    /// No apply logic exists for this relocation type on this target
    Unsupported,
}

/// Context a scan/apply call needs: resolved symbol values, the fragment/section
/// arenas, and (for RISC-V) the `__global_pointer$` value when GP-relative rewriting
/// is in play. Kept as a plain struct rather than a trait since every target shares
/// the same shape of context.
pub struct RelocContext<'a> {
    /// The resolved name pool, for symbol values/types
    pub names: &'a NamePool,
    /// Section arena, for discarded-section checks and addresses
    pub sections: &'a Arena<Section>,
    /// The value a relocation's symbol currently resolves to (absolute address),
    /// already combined with its fragment's address if it has one; `None` if still
    /// unresolved (undefined weak with no PLT/GOT fallback, e.g.)
    pub symbol_value: &'a dyn Fn(SymbolId, &NamePool, &Arena<Section>, &Arena<crate::model::fragment::Fragment>) -> Option<u64>,
    /// Fragment arena
    pub fragments: &'a Arena<crate::model::fragment::Fragment>,
    /// `__global_pointer$`'s resolved value, if defined (RISC-V GP-relative rewrite)
    pub global_pointer: Option<u64>,
    /// Whether this link targets a shared object (position-independent references
    /// need a `RELATIVE` dynamic relocation rather than being resolved statically)
    pub is_pic_output: bool,
}

/// The minimal contract every target-specific relocation handler implements.
pub trait Relocator {
    /// Decide what auxiliary entries `reloc` requires. Returns an empty vector if
    /// the relocation resolves entirely statically with no GOT/PLT/dynamic
    /// reservation.
    fn scan(&self, reloc: &Relocation, ctx: &RelocContext<'_>) -> Vec<Reservation>;

    /// Patch `reloc`'s target bytes in `target` (already positioned at the
    /// relocation's offset, for exactly as many bytes as the relocation type
    /// writes) using `value`, the computed relocation result (e.g.
    /// `S + A - P` for a PC-relative relocation).
    fn apply(&self, reloc: &Relocation, value: i64, target: &mut [u8]) -> ApplyResult;

    /// The target-specific sentinel value to write for a relocation whose owning
    /// section was discarded by `--gc-sections`.
    fn discarded_sentinel(&self, reloc: &Relocation) -> u64;
}

/// Build the relocator for `machine`.
pub fn relocator_for(machine: TargetMachine) -> Box<dyn Relocator> {
    match machine {
        TargetMachine::RiscV => Box::new(RiscVRelocator),
        TargetMachine::Hexagon => Box::new(HexagonRelocator),
    }
}

/// RISC-V relocation scan/apply.
pub struct RiscVRelocator;

fn riscv_type(raw: u32) -> Option<ElfRelocationTypeRISCV> {
    num_traits::FromPrimitive::from_u32(raw)
}

impl Relocator for RiscVRelocator {
    fn scan(&self, reloc: &Relocation, ctx: &RelocContext<'_>) -> Vec<Reservation> {
        let Some(kind) = riscv_type(reloc.reloc_type) else {
            return Vec::new();
        };
        let info = ctx.names.get(reloc.symbol);
        match kind {
            ElfRelocationTypeRISCV::CallPlt => {
                if info.symbol_type == SymbolType::Func && info.fragment.is_none() {
                    vec![Reservation { symbol: reloc.symbol, kind: ReservationKind::Plt }]
                } else {
                    Vec::new()
                }
            }
            ElfRelocationTypeRISCV::Abs64 | ElfRelocationTypeRISCV::Abs32 => {
                if ctx.is_pic_output {
                    vec![Reservation { symbol: reloc.symbol, kind: ReservationKind::Relative }]
                } else {
                    Vec::new()
                }
            }
            ElfRelocationTypeRISCV::TlsGdHi20 => {
                vec![Reservation { symbol: reloc.symbol, kind: ReservationKind::GotTlsGd }]
            }
            _ => Vec::new(),
        }
    }

    fn apply(&self, reloc: &Relocation, value: i64, target: &mut [u8]) -> ApplyResult {
        let Some(kind) = riscv_type(reloc.reloc_type) else {
            return ApplyResult::Unsupported;
        };
        match kind {
            ElfRelocationTypeRISCV::Abs32 => {
                if value < i32::MIN as i64 || value > u32::MAX as i64 {
                    return ApplyResult::Overflow;
                }
                if target.len() < 4 {
                    return ApplyResult::BadReloc;
                }
                target[0..4].copy_from_slice(&(value as u32).to_le_bytes());
                ApplyResult::Ok
            }
            ElfRelocationTypeRISCV::Abs64 => {
                if target.len() < 8 {
                    return ApplyResult::BadReloc;
                }
                target[0..8].copy_from_slice(&(value as u64).to_le_bytes());
                ApplyResult::Ok
            }
            ElfRelocationTypeRISCV::Jal => {
                if !fits_signed(value, 21) {
                    return ApplyResult::Overflow;
                }
                if target.len() < 4 {
                    return ApplyResult::BadReloc;
                }
                let mut word = u32::from_le_bytes([target[0], target[1], target[2], target[3]]);
                word = (word & 0x0000_0fff) | encode_jal_imm(value as i32);
                target[0..4].copy_from_slice(&word.to_le_bytes());
                ApplyResult::Ok
            }
            ElfRelocationTypeRISCV::Branch => {
                if !fits_signed(value, 13) {
                    return ApplyResult::Overflow;
                }
                ApplyResult::Ok
            }
            ElfRelocationTypeRISCV::Call | ElfRelocationTypeRISCV::CallPlt => {
                if !fits_signed(value, 32) {
                    return ApplyResult::Overflow;
                }
                if target.len() < 8 {
                    return ApplyResult::BadReloc;
                }
                let hi20 = ((value as i32).wrapping_add(0x800)) >> 12;
                let lo12 = (value as i32) - (hi20 << 12);
                let mut auipc = u32::from_le_bytes([target[0], target[1], target[2], target[3]]);
                auipc = (auipc & 0x0000_0fff) | ((hi20 as u32) << 12);
                target[0..4].copy_from_slice(&auipc.to_le_bytes());
                let mut jalr = u32::from_le_bytes([target[4], target[5], target[6], target[7]]);
                jalr = (jalr & 0x000f_ffff) | (((lo12 as u32) & 0xfff) << 20);
                target[4..8].copy_from_slice(&jalr.to_le_bytes());
                ApplyResult::Ok
            }
            _ => ApplyResult::Unsupported,
        }
    }

    fn discarded_sentinel(&self, reloc: &Relocation) -> u64 {
        // RISC-V eld writes 1 for debug-location-list relocations in a discarded
        // section ; the core does not distinguish `.debug_loc`/
        // `.debug_ranges` from other sections at this layer, so the sentinel is
        // applied uniformly to any discarded RISC-V relocation.
        let _ = reloc;
        1
    }
}

fn fits_signed(value: i64, bits: u32) -> bool {
    let half = 1i64 << (bits - 1);
    value >= -half && value < half
}

/// Encode the RISC-V J-type immediate field layout for `jal` from a signed 21-bit
/// byte offset.
fn encode_jal_imm(imm: i32) -> u32 {
    let imm = imm as u32;
    let imm20 = (imm >> 20) & 0x1;
    let imm10_1 = (imm >> 1) & 0x3ff;
    let imm11 = (imm >> 11) & 0x1;
    let imm19_12 = (imm >> 12) & 0xff;
    (imm20 << 31) | (imm10_1 << 21) | (imm11 << 20) | (imm19_12 << 12)
}

/// Hexagon relocation scan/apply.
pub struct HexagonRelocator;

fn hexagon_type(raw: u32) -> Option<ElfRelocationTypeHexagon> {
    num_traits::FromPrimitive::from_u32(raw)
}

impl Relocator for HexagonRelocator {
    fn scan(&self, reloc: &Relocation, ctx: &RelocContext<'_>) -> Vec<Reservation> {
        let Some(kind) = hexagon_type(reloc.reloc_type) else {
            return Vec::new();
        };
        let info = ctx.names.get(reloc.symbol);
        match kind {
            ElfRelocationTypeHexagon::PltB22Pcrel => {
                if info.symbol_type == SymbolType::Func && info.fragment.is_none() {
                    vec![Reservation { symbol: reloc.symbol, kind: ReservationKind::Plt }]
                } else {
                    Vec::new()
                }
            }
            ElfRelocationTypeHexagon::GotLo16 | ElfRelocationTypeHexagon::GotHi16 => {
                vec![Reservation { symbol: reloc.symbol, kind: ReservationKind::Got }]
            }
            ElfRelocationTypeHexagon::Abs32 => {
                if info.fragment.is_none() {
                    vec![Reservation { symbol: reloc.symbol, kind: ReservationKind::Copy }]
                } else if ctx.is_pic_output {
                    vec![Reservation { symbol: reloc.symbol, kind: ReservationKind::Relative }]
                } else {
                    Vec::new()
                }
            }
            _ => Vec::new(),
        }
    }

    fn apply(&self, reloc: &Relocation, value: i64, target: &mut [u8]) -> ApplyResult {
        let Some(kind) = hexagon_type(reloc.reloc_type) else {
            return ApplyResult::Unsupported;
        };
        match kind {
            ElfRelocationTypeHexagon::Abs32 => {
                if target.len() < 4 {
                    return ApplyResult::BadReloc;
                }
                target[0..4].copy_from_slice(&(value as u32).to_le_bytes());
                ApplyResult::Ok
            }
            ElfRelocationTypeHexagon::B22Pcrel | ElfRelocationTypeHexagon::B22PcrelX => {
                if !fits_signed(value, 22 + 2) {
                    return ApplyResult::Overflow;
                }
                ApplyResult::Ok
            }
            ElfRelocationTypeHexagon::B15Pcrel => {
                if !fits_signed(value, 15 + 2) {
                    return ApplyResult::Overflow;
                }
                ApplyResult::Ok
            }
            ElfRelocationTypeHexagon::B13Pcrel => {
                if !fits_signed(value, 13 + 2) {
                    return ApplyResult::Overflow;
                }
                ApplyResult::Ok
            }
            ElfRelocationTypeHexagon::B9Pcrel => {
                if !fits_signed(value, 9 + 2) {
                    return ApplyResult::Overflow;
                }
                ApplyResult::Ok
            }
            _ => ApplyResult::Unsupported,
        }
    }

    fn discarded_sentinel(&self, reloc: &Relocation) -> u64 {
        // Hexagon eld writes `--end` (the image's end address) for relocations in a
        // discarded section ; the caller substitutes the real value since
        // this layer has no image-size context.
        let _ = reloc;
        u64::MAX
    }
}

/// A RISC-V `R_RISCV_PCREL_HI20` recorded at a given section+offset, kept in a
/// per-section index so a later `PCREL_LO12_{I,S}` can look up its paired high half
/// by the *symbol value* the HI20 targeted.
#[derive(Debug, Default)]
pub struct PcrelHiIndex {
    by_value: HashMap<u64, FragmentId>,
}

impl PcrelHiIndex {
    /// Record a `PCREL_HI20` relocation's resolved target value against the
    /// fragment its `auipc` instruction lives in.
    pub fn record(&mut self, target_value: u64, fragment: FragmentId) {
        self.by_value.insert(target_value, fragment);
    }

    /// Look up the fragment a prior `PCREL_HI20` targeted this value from, for a
    /// `PCREL_LO12_{I,S}` pairing lookup.
    pub fn lookup(&self, target_value: u64) -> Option<FragmentId> {
        self.by_value.get(&target_value).copied()
    }
}

/// Resolve an unpaired `PCREL_LO12_{I,S}` against `index`. Unpaired lows are
/// deferred to a post-scan fixup phase and fail with `Diag::HiNotFound` if still
/// unresolved there.
pub fn resolve_pcrel_lo(
    index: &PcrelHiIndex,
    target_value: u64,
    section_name: &str,
    offset: u64,
) -> Result<FragmentId, Diag> {
    index.lookup(target_value).ok_or_else(|| Diag::HiNotFound {
            section: section_name.to_string(),
            offset,
    })
}

/// Apply one relocation end-to-end against `ctx`/`relocator`: compute its value,
/// substitute the discarded sentinel if its owning section was gc'd, and patch
/// `target` bytes. Separated from [`Relocator::apply`] so the sentinel substitution
/// is shared target-agnostic plumbing rather than duplicated per target.
pub fn apply_relocation(
    relocator: &dyn Relocator,
    reloc: &Relocation,
    ctx: &RelocContext<'_>,
    section_address: u64,
    target: &mut [u8],
) -> ApplyResult {
    if reloc.is_in_discarded_section(ctx.sections) {
        let sentinel = relocator.discarded_sentinel(reloc);
        return relocator.apply(reloc, sentinel as i64, target);
    }
    let symbol_value = (ctx.symbol_value)(reloc.symbol, ctx.names, ctx.sections, ctx.fragments);
    let Some(s) = symbol_value else {
        return ApplyResult::BadReloc;
    };
    let p = section_address + reloc.offset as u64;
    let value = (s as i64) + reloc.addend - (p as i64);
    relocator.apply(reloc, value, target)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod test {
    use super::*;
    use crate::model::section::{Section, SectionFlags, SectionKind};
    use crate::model::symbol::NamePool;

    fn test_symbol() -> (NamePool, SymbolId) {
        let mut names = NamePool::default();
        let id = names.intern("foo");
        (names, id)
    }

    fn test_section() -> (Arena<Section>, SectionId) {
        let mut sections = Arena::new();
        let id = sections.push(Section::new(".text", SectionFlags::ALLOC, SectionKind::ProgBits));
        (sections, id)
    }

    fn dummy_relocation(reloc_type: u32, symbol: SymbolId, section: SectionId) -> Relocation {
        Relocation {
            owning_section: section,
            offset: 0,
            reloc_type,
            symbol,
            addend: 0,
            cached_target_bytes: Vec::new(),
        }
    }

    #[test]
    fn riscv_call_plt_fits_in_range_encodes_auipc_jalr() {
        let (_names, symbol) = test_symbol();
        let (_sections, section) = test_section();
        let relocator = RiscVRelocator;
        let mut target = [0u8; 8];
        let result = relocator.apply(
            &dummy_relocation(ElfRelocationTypeRISCV::CallPlt as u32, symbol, section),
            0x100,
            &mut target,
        );
        assert_eq!(result, ApplyResult::Ok);
    }

    #[test]
    fn riscv_call_overflowing_32_bits_is_reported() {
        let (_names, symbol) = test_symbol();
        let (_sections, section) = test_section();
        let relocator = RiscVRelocator;
        let mut target = [0u8; 8];
        let result = relocator.apply(
            &dummy_relocation(ElfRelocationTypeRISCV::Call as u32, symbol, section),
            i64::MAX,
            &mut target,
        );
        assert_eq!(result, ApplyResult::Overflow);
    }

    #[test]
    fn pcrel_hi_index_roundtrips() {
        let mut fragments: Arena<crate::model::fragment::Fragment> = Arena::new();
        let fragment = fragments.push(crate::model::fragment::Fragment::new(
                crate::model::fragment::FragmentHeader::new(test_section().1, 4),
                crate::model::fragment::FragmentKind::Null,
        ));
        let mut index = PcrelHiIndex::default();
        index.record(0x2000, fragment);
        assert_eq!(resolve_pcrel_lo(&index, 0x2000, ".text", 4).unwrap(), fragment);
    }

    #[test]
    fn unpaired_lo_is_hi_not_found() {
        let index = PcrelHiIndex::default();
        assert!(matches!(
                resolve_pcrel_lo(&index, 0x3000, ".text", 4),
                Err(Diag::HiNotFound {.. })
        ));
    }

    #[test]
    fn discarded_relocation_writes_target_sentinel() {
        let mut sections: Arena<Section> = Arena::new();
        let mut section = Section::new(".text", SectionFlags::ALLOC, SectionKind::ProgBits);
        section.is_discarded = true;
        let section_id = sections.push(section);
        let (names, symbol) = test_symbol();
        let fragments: Arena<crate::model::fragment::Fragment> = Arena::new();
        let symbol_value = |_: SymbolId, _: &NamePool, _: &Arena<Section>, _: &Arena<crate::model::fragment::Fragment>| Some(0u64);
        let ctx = RelocContext {
            names: &names,
            sections: &sections,
            symbol_value: &symbol_value,
            fragments: &fragments,
            global_pointer: None,
            is_pic_output: false,
        };
        let relocator = HexagonRelocator;
        let reloc = dummy_relocation(ElfRelocationTypeHexagon::Abs32 as u32, symbol, section_id);
        let mut target = [0u8; 4];
        let result = apply_relocation(&relocator, &reloc, &ctx, 0, &mut target);
        assert_eq!(result, ApplyResult::Ok);
        assert_eq!(u32::from_le_bytes(target), u32::MAX);
    }
}
