//! The relaxation fixed-point loop : re-examines every candidate
//! relocation after each pass and keeps iterating until a pass makes no further
//! change, or [`crate::config::RelaxOptions::max_passes`] is exceeded.
//!
//! RISC-V relaxation shrinks (byte-deletion, via
//! [`crate::model::fragment::RegionFragmentEx::delete_bytes`]); Hexagon relaxation
//! only grows (trampoline insertion). Mixing the two within one pass loop would
//! make convergence ambiguous, so each target's driver owns its own notion of "no
//! further change": a grow-only pass and a shrink-only pass never need to
//! reconcile within the same loop.

use std::collections::HashMap;

use crate::arch::riscv::ElfRelocationTypeRISCV;
use crate::config::RelaxOptions;
use crate::diag::Diag;
use crate::model::fragment::{Fragment, FragmentHeader, FragmentKind, RegionFragmentEx, StubKind};
use crate::model::relocation::Relocation;
use crate::model::section::Section;
use crate::session::{Arena, FragmentId, RelocationId, SectionId, SymbolId};

/// One RISC-V relaxation candidate: an instruction-shrinking opportunity scan has
/// already found feasible, expressed as the byte range to delete and (for a
/// replace-then-delete shrink) the replacement encoding to write first.
#[derive(Debug, Clone)]
pub struct RiscVCandidate {
    /// The fragment the bytes live in
    pub fragment: FragmentId,
    /// Byte offset within the fragment the deletion starts at
    pub offset: u32,
    /// Number of bytes to delete
    pub length: u32,
    /// If `Some`, overwrite this many bytes at `offset` with this instruction
    /// word before deleting the remainder (e.g. replacing an `auipc+jalr` pair
    /// with a single `jal` and deleting the freed 4 bytes)
    pub replacement: Option<(u32, u8)>,
}

/// Decide whether `reloc` (a `CALL`/`CALL_PLT` relocation immediately followed, per
/// the scan, by an `R_RISCV_RELAX` hint) can shrink to a direct `jal`: true when
/// the PC-relative distance to `target` fits a 21-bit signed immediate.
pub fn call_fits_in_jal(pc: u64, target: u64) -> bool {
    let delta = target as i64 - pc as i64;
    (-(1 << 20)..(1 << 20)).contains(&delta)
}

/// Run one RISC-V relaxation pass over `candidates`, each already confirmed
/// shrinkable by the caller's scan. Mutates the owning fragment in place via
/// [`RegionFragmentEx::delete_bytes`], and shifts every relocation offset in
/// `relocations` / symbol range in `symbol_ranges` that shares the candidate's
/// owning section, per that method's contract. Returns how many bytes were
/// removed in total; zero means this pass reached a fixed point.
pub fn run_riscv_pass(
    candidates: &[RiscVCandidate],
    fragments: &mut Arena<Fragment>,
    relocations: &mut Arena<Relocation>,
    reloc_ids_by_section: &HashMap<SectionId, Vec<RelocationId>>,
    symbol_ranges: &mut HashMap<SymbolId, (u32, u32)>,
    symbols_in_section: &HashMap<SectionId, Vec<SymbolId>>,
) -> u32 {
    let mut total_removed = 0u32;
    for candidate in candidates {
        let owning_section = fragments.get(candidate.fragment).header.owning_section;
        let FragmentKind::RegionEx(region) = &mut fragments.get_mut(candidate.fragment).kind else {
            continue;
        };
        if let Some((instruction, size)) = candidate.replacement {
            region.replace_instruction(candidate.offset, instruction, size);
        }

        let reloc_ids: std::collections::HashSet<_> = reloc_ids_by_section
            .get(&owning_section)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .collect();
        let offsets = relocations
            .iter_mut()
            .filter(|(id, _)| reloc_ids.contains(id))
            .map(|(_, r)| &mut r.offset);

        let symbol_ids: std::collections::HashSet<_> = symbols_in_section
            .get(&owning_section)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .collect();
        let ranges = symbol_ranges
            .iter_mut()
            .filter(|(symbol, _)| symbol_ids.contains(*symbol))
            .map(|(_, range)| range);

        region.delete_bytes(candidate.offset, candidate.length, offsets, ranges);
        total_removed += candidate.length;
    }
    total_removed
}

/// Remove `R_RISCV_ALIGN` slack: the bytes an `ALIGN` relocation's padding
/// fragment reserved beyond what's needed once preceding shrinks have moved its
/// start address closer to the required alignment boundary. Fails with [`Diag::AlignSlackInsufficient`] if the requested
/// alignment cannot be satisfied by removing bytes alone (i.e. more padding is
/// needed, not less — relaxation only ever shrinks RISC-V fragments, so this is
/// unrecoverable within the loop).
pub fn remove_align_slack(
    fragment_offset: u64,
    alignment: u32,
    current_padding: u32,
    section_name: &str,
) -> Result<u32, Diag> {
    let misalignment = (fragment_offset % alignment as u64) as u32;
    let needed_padding = if misalignment == 0 { 0 } else { alignment - misalignment };
    if needed_padding > current_padding {
        return Err(Diag::AlignSlackInsufficient {
                section: section_name.to_string(),
                offset: fragment_offset,
        });
    }
    Ok(current_padding - needed_padding)
}

/// True if `reloc_type` is a RISC-V relocation relaxation ever touches — delegates
/// to [`ElfRelocationTypeRISCV::is_relaxation_candidate`].
pub fn is_riscv_relaxable(reloc_type: u32) -> bool {
    num_traits::FromPrimitive::from_u32(reloc_type)
        .map(|t: ElfRelocationTypeRISCV| t.is_relaxation_candidate())
        .unwrap_or(false)
}

/// Drive the RISC-V relaxation loop to a fixed point or [`Diag::RelaxationDidNotConverge`].
/// `scan_pass` is called once per iteration and must return the candidates a fresh
/// scan finds shrinkable given the fragments' current (already-shrunk) state; the
/// loop stops as soon as a pass's candidate list is empty.
pub fn drive_riscv_relaxation(
    options: &RelaxOptions,
    mut scan_pass: impl FnMut() -> Vec<RiscVCandidate>,
    mut apply_pass: impl FnMut(&[RiscVCandidate]) -> u32,
) -> Result<u32, Diag> {
    let mut total_removed = 0u32;
    for pass in 0..options.max_passes {
        let candidates = scan_pass();
        if candidates.is_empty() {
            return Ok(total_removed);
        }
        total_removed += apply_pass(&candidates);
        let _ = pass;
    }
    Err(Diag::RelaxationDidNotConverge { passes: options.max_passes })
}

/// A Hexagon trampoline insertion opportunity: a branch relocation whose target is
/// out of the instruction's branch-displacement range and needs a stub inserted
/// into its output section: a grow-only trampoline/stub insertion, scoped per
/// output section.
#[derive(Debug, Clone, Copy)]
pub struct HexagonTrampolineRequest {
    /// The symbol the out-of-range branch targets
    pub target: SymbolId,
    /// Whether the output is position-independent (selects [`StubKind::Pic`] vs
    /// [`StubKind::Absolute`])
    pub is_pic: bool,
}

/// Stub sharing table: one trampoline per `(target, is_pic)` pair per output
/// section, reused by every branch that needs it rather than duplicated (spec
/// §4.8 implies this via "per output section" — a section-wide table, not a
/// per-relocation one, keeps trampoline growth bounded by distinct targets).
#[derive(Default)]
pub struct HexagonStubTable {
    stubs: HashMap<(SymbolId, bool), FragmentId>,
}

impl HexagonStubTable {
    /// A fresh, empty stub table, one per output section.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the existing stub fragment for `request`, or insert and return a
    /// freshly appended one in `stub_section`.
    pub fn ensure_stub(
        &mut self,
        request: HexagonTrampolineRequest,
        fragments: &mut Arena<Fragment>,
        stub_section: SectionId,
    ) -> FragmentId {
        let key = (request.target, request.is_pic);
        if let Some(existing) = self.stubs.get(&key) {
            return *existing;
        }
        let kind = if request.is_pic { StubKind::Pic } else { StubKind::Absolute };
        let id = fragments.push(Fragment::new(
                FragmentHeader::new(stub_section, 4),
                FragmentKind::Stub {
                    kind,
                    bytes: hexagon_stub_bytes(kind),
                    target: request.target,
                },
        ));
        self.stubs.insert(key, id);
        id
    }

    /// Number of distinct stubs inserted so far.
    pub fn len(&self) -> usize {
        self.stubs.len()
    }

    /// True if no stubs have been inserted.
    pub fn is_empty(&self) -> bool {
        self.stubs.is_empty()
    }
}

/// Backend-specific stub encoding. Placeholder-sized packet; the real encoding
/// (an absolute jump or a GOT-relative indirect jump) is backend machinery this
/// synthesis layer does not otherwise need to model.
fn hexagon_stub_bytes(_kind: StubKind) -> Vec<u8> {
    vec![0u8; 4]
}

/// Drive the Hexagon relaxation loop: unlike RISC-V's shrink loop, a pass here
/// only ever adds stubs, so "no further change" means `request_pass` found no new
/// out-of-range branches against the now-larger image. Growth can itself push a
/// previously in-range branch out of range, which is why this still needs to be a
/// loop rather than a single pass.
pub fn drive_hexagon_relaxation(
    options: &RelaxOptions,
    mut request_pass: impl FnMut() -> Vec<HexagonTrampolineRequest>,
    mut apply_pass: impl FnMut(&[HexagonTrampolineRequest]) -> usize,
) -> Result<usize, Diag> {
    let mut total_inserted = 0usize;
    for _ in 0..options.max_passes {
        let requests = request_pass();
        if requests.is_empty() {
            return Ok(total_inserted);
        }
        total_inserted += apply_pass(&requests);
    }
    Err(Diag::RelaxationDidNotConverge { passes: options.max_passes })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod test {
    use super::*;
    use crate::model::section::{SectionFlags, SectionKind};
    use crate::model::symbol::NamePool;

    #[test]
    fn call_within_21_bits_fits_jal() {
        assert!(call_fits_in_jal(0x1000, 0x1000 + 0x1000));
        assert!(!call_fits_in_jal(0x1000, 0x1000 + (1 << 21)));
    }

    #[test]
    fn align_slack_removal_computes_shrink() {
        let result = remove_align_slack(0x1002, 4, 8, ".text").unwrap();
        assert_eq!(result, 6);
    }

    #[test]
    fn align_slack_insufficient_is_reported() {
        let result = remove_align_slack(0x1003, 16, 2, ".text");
        assert!(matches!(result, Err(Diag::AlignSlackInsufficient {.. })));
    }

    #[test]
    fn riscv_pass_shrinks_region_and_shifts_offsets() {
        let mut sections: Arena<Section> = Arena::new();
        let section = sections.push(Section::new(".text", SectionFlags::ALLOC | SectionFlags::EXECINSTR, SectionKind::ProgBits));
        let mut fragments: Arena<Fragment> = Arena::new();
        let fragment = fragments.push(Fragment::new(
                FragmentHeader::new(section, 2),
                FragmentKind::RegionEx(RegionFragmentEx::new(&[0u8; 16])),
        ));
        let mut names = NamePool::default();
        let symbol = names.intern("target");
        let mut relocations: Arena<Relocation> = Arena::new();
        let reloc_id = relocations.push(Relocation {
                owning_section: section,
                offset: 12,
                reloc_type: 0,
                symbol,
                addend: 0,
                cached_target_bytes: Vec::new(),
        });
        let mut reloc_ids_by_section = HashMap::new();
        reloc_ids_by_section.insert(section, vec![reloc_id]);
        let mut symbol_ranges = HashMap::new();
        symbol_ranges.insert(symbol, (0u32, 16u32));
        let mut symbols_in_section = HashMap::new();
        symbols_in_section.insert(section, vec![symbol]);

        let candidate = RiscVCandidate {
            fragment,
            offset: 4,
            length: 4,
            replacement: Some((0x0000_006f, 4)),
        };
        let removed = run_riscv_pass(
            &[candidate],
            &mut fragments,
            &mut relocations,
            &reloc_ids_by_section,
            &mut symbol_ranges,
            &symbols_in_section,
        );
        assert_eq!(removed, 4);
        assert_eq!(relocations.get(reloc_id).offset, 8);
        assert_eq!(symbol_ranges[&symbol], (0, 12));
        let FragmentKind::RegionEx(region) = &fragments.get(fragment).kind else {
            unreachable!()
        };
        assert_eq!(region.size(), 12);
    }

    #[test]
    fn riscv_relaxation_converges_when_scan_goes_dry() {
        let mut sections: Arena<Section> = Arena::new();
        let section = sections.push(Section::new(".text", SectionFlags::ALLOC, SectionKind::ProgBits));
        let mut fragments: Arena<Fragment> = Arena::new();
        let fragment = fragments.push(Fragment::new(FragmentHeader::new(section, 2), FragmentKind::Null));
        let mut calls = 0;
        let result = drive_riscv_relaxation(
            &RelaxOptions::default(),
                || {
                calls += 1;
                if calls < 3 {
                    vec![RiscVCandidate { fragment, offset: 0, length: 0, replacement: None }]
                } else {
                    Vec::new()
                }
            },
            |_| 0,
        );
        assert_eq!(result.unwrap(), 0);
        assert_eq!(calls, 3);
    }

    #[test]
    fn riscv_relaxation_reports_non_convergence() {
        let mut sections: Arena<Section> = Arena::new();
        let section = sections.push(Section::new(".text", SectionFlags::ALLOC, SectionKind::ProgBits));
        let mut fragments: Arena<Fragment> = Arena::new();
        let fragment = fragments.push(Fragment::new(FragmentHeader::new(section, 2), FragmentKind::Null));
        let mut options = RelaxOptions::default();
        options.max_passes = 2;
        let result = drive_riscv_relaxation(
            &options,
                || vec![RiscVCandidate { fragment, offset: 0, length: 0, replacement: None }],
            |_| 0,
        );
        assert!(matches!(result, Err(Diag::RelaxationDidNotConverge { passes: 2 })));
    }

    #[test]
    fn hexagon_stub_table_dedupes_per_target() {
        let mut sections: Arena<Section> = Arena::new();
        let stub_section = sections.push(Section::new(".text.stubs", SectionFlags::ALLOC | SectionFlags::EXECINSTR, SectionKind::ProgBits));
        let mut fragments: Arena<Fragment> = Arena::new();
        let mut names = NamePool::default();
        let symbol = names.intern("far_fn");
        let mut table = HexagonStubTable::new();
        let first = table.ensure_stub(
            HexagonTrampolineRequest { target: symbol, is_pic: false },
            &mut fragments,
            stub_section,
        );
        let second = table.ensure_stub(
            HexagonTrampolineRequest { target: symbol, is_pic: false },
            &mut fragments,
            stub_section,
        );
        assert_eq!(first, second);
        assert_eq!(table.len(), 1);
    }
}
