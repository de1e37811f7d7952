//! GOT/PLT/dynamic-relocation synthesis : turns the reservations
//! [`crate::relocation::Relocator::scan`] records into fragments and `.dynamic`
//! entries. Sizing and fragment creation happen during pre-layout, before
//! [`crate::layout::assign_addresses`] runs; the dynamic relocation tables
//! themselves are only populated once every address is final.

use std::collections::HashMap;

use crate::diag::Diag;
use crate::model::fragment::{Fragment, FragmentHeader, FragmentKind};
use crate::model::symbol::{Desc, NamePool};
use crate::relocation::{Reservation, ReservationKind};
use crate::session::{Arena, FragmentId, SectionId, SymbolId};

/// `#[repr(u64)]` `.dynamic` entry tags the core can emit. Modeled with the same
/// const-bearing-enum shape the codec layer uses for section/segment types
/// ([`crate::header::program::ProgramHeaderType`]-style), since `.dynamic` entries
/// are themselves ELF wire data.
#[repr(u64)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum DynamicTag {
    /// Marks the end of the `.dynamic` array
    Null = Self::NULL,
    /// Name of a needed shared library
    Needed = Self::NEEDED,
    /// Size in bytes of the PLT relocation table
    PltRelSz = Self::PLTRELSZ,
    /// Address of the GOT used by the PLT
    PltGot = Self::PLTGOT,
    /// Address of the symbol hash table
    Hash = Self::HASH,
    /// Address of the string table
    StrTab = Self::STRTAB,
    /// Address of the symbol table
    SymTab = Self::SYMTAB,
    /// Address of the PLT's relocation table
    JmpRel = Self::JMPREL,
    /// Address of the init function
    Init = Self::INIT,
    /// Address of the fini function
    Fini = Self::FINI,
    /// Address of `.rela.dyn`
    Rela = Self::RELA,
    /// Size in bytes of `.rela.dyn`
    RelaSz = Self::RELASZ,
    /// Size of one `.rela.dyn` entry
    RelaEnt = Self::RELAENT,
    /// Number of `R_*_RELATIVE` entries at the head of `.rela.dyn`
    RelaCount = Self::RELACOUNT,
    /// Address of `.init_array`
    InitArray = Self::INIT_ARRAY,
    /// Size in bytes of `.init_array`
    InitArraySz = Self::INIT_ARRAYSZ,
    /// Address of `.fini_array`
    FiniArray = Self::FINI_ARRAY,
    /// Size in bytes of `.fini_array`
    FiniArraySz = Self::FINI_ARRAYSZ,
    /// GNU-style symbol hash table address
    GnuHash = Self::GNU_HASH,
    /// Flags, `DF_*` bits
    Flags = Self::FLAGS,
    /// Extension flags, `DF_1_*` bits
    Flags1 = Self::FLAGS_1,
    /// Hexagon ABI version
    HexagonVer = crate::arch::hexagon::DT_HEXAGON_VER,
}

impl DynamicTag {
    /// `DT_NULL`
    pub const NULL: u64 = 0;
    /// `DT_NEEDED`
    pub const NEEDED: u64 = 1;
    /// `DT_PLTRELSZ`
    pub const PLTRELSZ: u64 = 2;
    /// `DT_PLTGOT`
    pub const PLTGOT: u64 = 3;
    /// `DT_HASH`
    pub const HASH: u64 = 4;
    /// `DT_STRTAB`
    pub const STRTAB: u64 = 5;
    /// `DT_SYMTAB`
    pub const SYMTAB: u64 = 6;
    /// `DT_RELA`
    pub const RELA: u64 = 7;
    /// `DT_RELASZ`
    pub const RELASZ: u64 = 8;
    /// `DT_RELAENT`
    pub const RELAENT: u64 = 9;
    /// `DT_INIT`
    pub const INIT: u64 = 12;
    /// `DT_FINI`
    pub const FINI: u64 = 13;
    /// `DT_JMPREL`
    pub const JMPREL: u64 = 23;
    /// `DT_INIT_ARRAY`
    pub const INIT_ARRAY: u64 = 25;
    /// `DT_FINI_ARRAY`
    pub const FINI_ARRAY: u64 = 26;
    /// `DT_INIT_ARRAYSZ`
    pub const INIT_ARRAYSZ: u64 = 27;
    /// `DT_FINI_ARRAYSZ`
    pub const FINI_ARRAYSZ: u64 = 28;
    /// `DT_FLAGS`
    pub const FLAGS: u64 = 30;
    /// `DT_FLAGS_1` (in the `DT_VALRNGHI` sun-vendor range)
    pub const FLAGS_1: u64 = 0x6fff_fffb;
    /// `DT_GNU_HASH`
    pub const GNU_HASH: u64 = 0x6fff_fef5;
    /// `DT_RELACOUNT` (in the `DT_ADDRRNGHI` sun-vendor range)
    pub const RELACOUNT: u64 = 0x6fff_fff9;
}

/// One finalized `.dynamic` entry: tag plus its `d_val`/`d_ptr` union, which the
/// core always treats as a plain `u64`.
#[derive(Debug, Clone, Copy)]
pub struct DynamicEntry {
    /// Entry tag
    pub tag: DynamicTag,
    /// Value, interpreted per `tag` (address, size, or flag bits)
    pub value: u64,
}

/// GOT/GOTPLT/PLT/relocation-table state accumulated during pre-layout and
/// finalized once the relaxation loop and address assignment have settled. Owned alongside a [`crate::session::LinkerSession`], not inside it,
/// since only the pre-layout and dynamic-finalize stages touch it.
#[derive(Default)]
pub struct DynamicState {
    got_slots: HashMap<(SymbolId, ReservationKind), FragmentId>,
    pltplt_slots: HashMap<SymbolId, FragmentId>,
    copy_relocs: Vec<SymbolId>,
    glob_dat_relocs: Vec<SymbolId>,
    relative_relocs: Vec<SymbolId>,
    jump_slot_relocs: Vec<SymbolId>,
    needed: Vec<String>,
}

impl DynamicState {
    /// A fresh, empty synthesis state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `reservations` from one relocation's scan, creating GOT/PLT
    /// fragments in `fragments` (appended to `got_section`/`plt_section` /
    /// `gotplt_section`) as needed. Reservations are idempotent per `(symbol,
    /// kind)` : a repeat reservation for a symbol/kind pair already
    /// recorded is a no-op here. `names` is consulted only to enforce
    /// ensure_plt's patchable-alias precondition.
    pub fn apply_reservations(
        &mut self,
        reservations: &[Reservation],
        names: &NamePool,
        fragments: &mut Arena<Fragment>,
        got_section: SectionId,
        gotplt_section: SectionId,
        plt_section: SectionId,
    ) -> Result<(), Diag> {
        for reservation in reservations {
            match reservation.kind {
                ReservationKind::Got | ReservationKind::GotTlsIe => {
                    self.ensure_got(reservation.symbol, reservation.kind, fragments, got_section);
                    self.glob_dat_relocs.push(reservation.symbol);
                }
                ReservationKind::GotTlsGd | ReservationKind::GotTlsLd => {
                    self.ensure_got(reservation.symbol, reservation.kind, fragments, got_section);
                }
                ReservationKind::Plt => {
                    self.ensure_plt(reservation.symbol, names, fragments, gotplt_section, plt_section)?;
                }
                ReservationKind::Copy => {
                    if !self.copy_relocs.contains(&reservation.symbol) {
                        self.copy_relocs.push(reservation.symbol);
                    }
                }
                ReservationKind::Relative => {
                    if !self.relative_relocs.contains(&reservation.symbol) {
                        self.relative_relocs.push(reservation.symbol);
                    }
                }
                ReservationKind::GlobDat => {
                    if !self.glob_dat_relocs.contains(&reservation.symbol) {
                        self.glob_dat_relocs.push(reservation.symbol);
                    }
                }
            }
        }
        Ok(())
    }

    /// `ensure_got(symbol, kind)` : returns the existing slot for
    /// `(symbol, kind)` or appends a fresh one. GOT[0] itself (`_DYNAMIC`) is
    /// created once by [`DynamicState::reserve_got_zero`], before any symbol
    /// reservation runs.
    pub fn ensure_got(
        &mut self,
        symbol: SymbolId,
        kind: ReservationKind,
        fragments: &mut Arena<Fragment>,
        got_section: SectionId,
    ) -> FragmentId {
        if let Some(existing) = self.got_slots.get(&(symbol, kind)) {
            return *existing;
        }
        let slots = match kind {
            ReservationKind::GotTlsGd | ReservationKind::GotTlsLd => 2,
            _ => 1,
        };
        let mut first = None;
        for _ in 0..slots {
            let id = fragments.push(Fragment::new(
                    FragmentHeader::new(got_section, 8),
                    FragmentKind::Got { symbol: Some(symbol) },
            ));
            first.get_or_insert(id);
        }
        let id = first.expect("slots is always >= 1");
        self.got_slots.insert((symbol, kind), id);
        id
    }

    /// Reserve GOT[0], the `_DYNAMIC`-pointing slot every dynamically linked
    /// output carries as its first reserved GOT slot.
    pub fn reserve_got_zero(&mut self, fragments: &mut Arena<Fragment>, got_section: SectionId) -> FragmentId {
        fragments.push(Fragment::new(
                FragmentHeader::new(got_section, 8),
                FragmentKind::Got { symbol: None },
        ))
    }

    /// `ensure_plt(symbol)`: the GOTPLT slot plus PLTn stub for `symbol`, creating
    /// PLT0 and GOTPLT[0..2] lazily on first use. `-z now` callers
    /// should use [`DynamicState::reserve_plt0`] up front instead and skip lazy
    /// PLT0 creation here; this method only ever creates PLTn entries.
    ///
    /// Errors if `symbol` is marked `patchable` (a `.llvm_patchable_<name>` alias
    /// exists for it) but its `__llvm_patchable_` alias has not yet been resolved
    /// to a definition: the alias must be registered before its target's PLT
    /// entry is materialized.
    pub fn ensure_plt(
        &mut self,
        symbol: SymbolId,
        names: &NamePool,
        fragments: &mut Arena<Fragment>,
        gotplt_section: SectionId,
        plt_section: SectionId,
    ) -> Result<FragmentId, Diag> {
        if let Some(existing) = self.pltplt_slots.get(&symbol) {
            return Ok(*existing);
        }
        let info = names.get(symbol);
        if info.patchable && !matches!(info.desc, Desc::Defined) {
            return Err(Diag::PatchableAliasNotRegistered { symbol: info.name.clone() });
        }
        fragments.push(Fragment::new(
                FragmentHeader::new(gotplt_section, 8),
                FragmentKind::Got { symbol: Some(symbol) },
        ));
        let plt_entry = fragments.push(Fragment::new(
                FragmentHeader::new(plt_section, 16),
                FragmentKind::Plt { symbol: Some(symbol), bytes: plt_stub_bytes(symbol) },
        ));
        self.pltplt_slots.insert(symbol, plt_entry);
        self.jump_slot_relocs.push(symbol);
        Ok(plt_entry)
    }

    /// PLT0, the shared lazy-binding trampoline; its code is backend-specific.
    /// Omitted entirely under `-z now`, where every
    /// GOTPLT slot instead holds its symbol's final address up front.
    pub fn reserve_plt0(&mut self, fragments: &mut Arena<Fragment>, plt_section: SectionId) -> FragmentId {
        fragments.push(Fragment::new(
                FragmentHeader::new(plt_section, 16),
                FragmentKind::Plt { symbol: None, bytes: Vec::new() },
        ))
    }

    /// Record a `DT_NEEDED` entry for a dynamic dependency. Ordering matches
    /// input arrival; duplicates (the same library pulled in by more than one
    /// input) are collapsed.
    pub fn record_needed(&mut self, soname: &str) {
        if !self.needed.iter().any(|n| n == soname) {
            self.needed.push(soname.to_string());
        }
    }

    /// Every symbol with a `COPY` relocation into `.bss`.
    pub fn copy_relocations(&self) -> &[SymbolId] {
        &self.copy_relocs
    }

    /// Every symbol with a `GLOB_DAT` relocation into `.rela.dyn`.
    pub fn glob_dat_relocations(&self) -> &[SymbolId] {
        &self.glob_dat_relocs
    }

    /// Every symbol with a `RELATIVE` relocation into `.rela.dyn`. Spec §8's
    /// testable property: `DT_RELACOUNT` must equal this count, and `.rela.dyn`
    /// must list them before any `GLOB_DAT`/`COPY` entries (`sh_link`-adjacent
    /// dynamic linkers rely on the `RELATIVE` run being contiguous at the head).
    pub fn relative_relocations(&self) -> &[SymbolId] {
        &self.relative_relocs
    }

    /// Every symbol with a `JUMP_SLOT` relocation into `.rela.plt`, in PLT
    /// allocation order.
    pub fn jump_slot_relocations(&self) -> &[SymbolId] {
        &self.jump_slot_relocs
    }

    /// Build the `.dynamic` entry list once every synthesized section's final
    /// address and size are known: entries are reserved by category and applied
    /// only after every size in that category settles.
    #[allow(clippy::too_many_arguments)]
    pub fn build_dynamic_entries(&self, layout: &DynamicLayout) -> Vec<DynamicEntry> {
        let mut entries = Vec::new();
        for soname in &self.needed {
            entries.push(DynamicEntry { tag: DynamicTag::Needed, value: layout.strtab_offset(soname) });
        }
        if let Some(hash) = layout.hash_addr {
            entries.push(DynamicEntry { tag: DynamicTag::Hash, value: hash });
        }
        if let Some(gnu_hash) = layout.gnu_hash_addr {
            entries.push(DynamicEntry { tag: DynamicTag::GnuHash, value: gnu_hash });
        }
        entries.push(DynamicEntry { tag: DynamicTag::StrTab, value: layout.strtab_addr });
        entries.push(DynamicEntry { tag: DynamicTag::SymTab, value: layout.symtab_addr });
        if let Some(pltgot) = layout.pltgot_addr {
            entries.push(DynamicEntry { tag: DynamicTag::PltGot, value: pltgot });
            entries.push(DynamicEntry {
                    tag: DynamicTag::PltRelSz,
                    value: self.jump_slot_relocs.len() as u64 * layout.rela_entsize,
            });
            entries.push(DynamicEntry { tag: DynamicTag::JmpRel, value: layout.rela_plt_addr });
        }
        if layout.rela_dyn_count > 0 {
            entries.push(DynamicEntry { tag: DynamicTag::Rela, value: layout.rela_dyn_addr });
            entries.push(DynamicEntry {
                    tag: DynamicTag::RelaSz,
                    value: layout.rela_dyn_count * layout.rela_entsize,
            });
            entries.push(DynamicEntry { tag: DynamicTag::RelaEnt, value: layout.rela_entsize });
            entries.push(DynamicEntry {
                    tag: DynamicTag::RelaCount,
                    value: self.relative_relocs.len() as u64,
            });
        }
        if let Some(init) = layout.init_addr {
            entries.push(DynamicEntry { tag: DynamicTag::Init, value: init });
        }
        if let Some(fini) = layout.fini_addr {
            entries.push(DynamicEntry { tag: DynamicTag::Fini, value: fini });
        }
        if let Some((addr, size)) = layout.init_array {
            entries.push(DynamicEntry { tag: DynamicTag::InitArray, value: addr });
            entries.push(DynamicEntry { tag: DynamicTag::InitArraySz, value: size });
        }
        if let Some((addr, size)) = layout.fini_array {
            entries.push(DynamicEntry { tag: DynamicTag::FiniArray, value: addr });
            entries.push(DynamicEntry { tag: DynamicTag::FiniArraySz, value: size });
        }
        if layout.is_hexagon {
            entries.push(DynamicEntry {
                    tag: DynamicTag::HexagonVer,
                    value: crate::arch::hexagon::DT_HEXAGON_VER_VALUE,
            });
        }
        entries.push(DynamicEntry { tag: DynamicTag::Null, value: 0 });
        entries
    }
}

/// The addresses/sizes [`DynamicState::build_dynamic_entries`] needs, gathered
/// from the finished layout pass. Kept as a plain data bag rather than borrowing
/// `LinkerSession` directly so dynamic-entry sizing can be unit tested without a
/// full session.
pub struct DynamicLayout {
    /// `.dynstr`'s base address
    pub strtab_addr: u64,
    /// `.dynsym`'s base address
    pub symtab_addr: u64,
    /// `.hash`'s address, if `--hash-style` includes `sysv`
    pub hash_addr: Option<u64>,
    /// `.gnu.hash`'s address, if `--hash-style` includes `gnu`
    pub gnu_hash_addr: Option<u64>,
    /// `.got.plt`'s address, if any PLT slots exist
    pub pltgot_addr: Option<u64>,
    /// `.rela.plt`'s address
    pub rela_plt_addr: u64,
    /// `.rela.dyn`'s address
    pub rela_dyn_addr: u64,
    /// Number of `.rela.dyn` entries
    pub rela_dyn_count: u64,
    /// `sizeof(Elf64_Rela)` for the output's word size
    pub rela_entsize: u64,
    /// `_init`'s address, if present
    pub init_addr: Option<u64>,
    /// `_fini`'s address, if present
    pub fini_addr: Option<u64>,
    /// `.init_array`'s (address, size), if present
    pub init_array: Option<(u64, u64)>,
    /// `.fini_array`'s (address, size), if present
    pub fini_array: Option<(u64, u64)>,
    /// Whether the output targets Hexagon, for the `DT_HEXAGON_VER` tag
    pub is_hexagon: bool,
    strtab_offsets: HashMap<String, u64>,
}

impl DynamicLayout {
    fn strtab_offset(&self, name: &str) -> u64 {
        *self.strtab_offsets.get(name).unwrap_or(&0)
    }
}

/// Backend-specific PLTn instruction bytes. Placeholder-sized: the real encoding
/// (GOTPLT-slot-relative load-and-branch) depends on which target's relocator is
/// active, which this synthesis layer does not otherwise need to know.
fn plt_stub_bytes(_target: SymbolId) -> Vec<u8> {
    vec![0u8; 16]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod test {
    use super::*;
    use crate::model::section::{Section, SectionFlags, SectionKind};
    use crate::model::symbol::NamePool;

    fn sections() -> (Arena<Section>, SectionId, SectionId, SectionId) {
        let mut sections = Arena::new();
        let got = sections.push(Section::new(".got", SectionFlags::ALLOC | SectionFlags::WRITE, SectionKind::ProgBits));
        let gotplt = sections.push(Section::new(".got.plt", SectionFlags::ALLOC | SectionFlags::WRITE, SectionKind::ProgBits));
        let plt = sections.push(Section::new(".plt", SectionFlags::ALLOC | SectionFlags::EXECINSTR, SectionKind::ProgBits));
        (sections, got, gotplt, plt)
    }

    #[test]
    fn plt_reservation_is_idempotent_per_symbol() {
        let (_sections, got, gotplt, plt) = sections();
        let mut names = NamePool::default();
        let symbol = names.intern("foo");
        let mut fragments: Arena<Fragment> = Arena::new();
        let mut state = DynamicState::new();
        state.apply_reservations(
            &[Reservation { symbol, kind: ReservationKind::Plt }],
            &names,
            &mut fragments,
            got,
            gotplt,
            plt,
        ).unwrap();
        let count_before = fragments.len();
        state.apply_reservations(
            &[Reservation { symbol, kind: ReservationKind::Plt }],
            &names,
            &mut fragments,
            got,
            gotplt,
            plt,
        ).unwrap();
        assert_eq!(fragments.len(), count_before);
        assert_eq!(state.jump_slot_relocations().len(), 1);
    }

    #[test]
    fn plt_for_unregistered_patchable_alias_is_rejected() {
        let (_sections, got, gotplt, plt) = sections();
        let mut names = NamePool::default();
        let symbol = names.intern("foo");
        names.get_mut(symbol).patchable = true;
        let mut fragments: Arena<Fragment> = Arena::new();
        let mut state = DynamicState::new();
        let result = state.apply_reservations(
            &[Reservation { symbol, kind: ReservationKind::Plt }],
            &names,
            &mut fragments,
            got,
            gotplt,
            plt,
        );
        assert!(matches!(result, Err(Diag::PatchableAliasNotRegistered { .. })));
    }

    #[test]
    fn plt_for_registered_patchable_alias_succeeds() {
        let (_sections, got, gotplt, plt) = sections();
        let mut names = NamePool::default();
        let symbol = names.intern("foo");
        names.get_mut(symbol).patchable = true;
        names.get_mut(symbol).desc = Desc::Defined;
        let mut fragments: Arena<Fragment> = Arena::new();
        let mut state = DynamicState::new();
        state.apply_reservations(
            &[Reservation { symbol, kind: ReservationKind::Plt }],
            &names,
            &mut fragments,
            got,
            gotplt,
            plt,
        ).unwrap();
        assert_eq!(state.jump_slot_relocations().len(), 1);
    }

    #[test]
    fn tls_gd_reserves_two_got_slots() {
        let (_sections, got, gotplt, plt) = sections();
        let mut names = NamePool::default();
        let symbol = names.intern("tls_var");
        let mut fragments: Arena<Fragment> = Arena::new();
        let mut state = DynamicState::new();
        state.apply_reservations(
            &[Reservation { symbol, kind: ReservationKind::GotTlsGd }],
            &names,
            &mut fragments,
            got,
            gotplt,
            plt,
        ).unwrap();
        assert_eq!(fragments.len(), 2);
    }

    #[test]
    fn relacount_matches_relative_reloc_count() {
        let (_sections, got, gotplt, plt) = sections();
        let mut names = NamePool::default();
        let a = names.intern("a");
        let b = names.intern("b");
        let mut fragments: Arena<Fragment> = Arena::new();
        let mut state = DynamicState::new();
        state.apply_reservations(
            &[
                Reservation { symbol: a, kind: ReservationKind::Relative },
                Reservation { symbol: b, kind: ReservationKind::Relative },
            ],
            &names,
            &mut fragments,
            got,
            gotplt,
            plt,
        ).unwrap();
        let layout = DynamicLayout {
            strtab_addr: 0x1000,
            symtab_addr: 0x2000,
            hash_addr: None,
            gnu_hash_addr: None,
            pltgot_addr: None,
            rela_plt_addr: 0,
            rela_dyn_addr: 0x3000,
            rela_dyn_count: 2,
            rela_entsize: 24,
            init_addr: None,
            fini_addr: None,
            init_array: None,
            fini_array: None,
            is_hexagon: false,
            strtab_offsets: HashMap::new(),
        };
        let entries = state.build_dynamic_entries(&layout);
        let relacount = entries
            .iter()
            .find(|e| e.tag == DynamicTag::RelaCount)
            .expect("RELACOUNT entry present");
        assert_eq!(relacount.value, 2);
    }

    #[test]
    fn hexagon_output_emits_dt_hexagon_ver() {
        let state = DynamicState::new();
        let layout = DynamicLayout {
            strtab_addr: 0,
            symtab_addr: 0,
            hash_addr: None,
            gnu_hash_addr: None,
            pltgot_addr: None,
            rela_plt_addr: 0,
            rela_dyn_addr: 0,
            rela_dyn_count: 0,
            rela_entsize: 24,
            init_addr: None,
            fini_addr: None,
            init_array: None,
            fini_array: None,
            is_hexagon: true,
            strtab_offsets: HashMap::new(),
        };
        let entries = state.build_dynamic_entries(&layout);
        let tag = entries.iter().find(|e| e.tag == DynamicTag::HexagonVer).unwrap();
        assert_eq!(tag.value, crate::arch::hexagon::DT_HEXAGON_VER_VALUE);
    }
}
