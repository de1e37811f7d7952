//! The top-level pipeline : sequences every other module's stage functions
//! against one [`LinkerSession`], in the order spec'd by the concurrency model
//! (parallel scan/match/relax/hash stages; serial resolution/layout/relaxation-loop
//! stages run on the calling thread since they mutate shared, order-sensitive
//! state). [`Driver`] owns no state of its own beyond the thread pool it builds per
//! parallel stage ; everything durable lives in the session it is handed.

use std::collections::{HashMap, HashSet};

use tracing::{debug, debug_span, info_span};

use crate::buildid;
use crate::diag::Diag;
use crate::dynamic::DynamicState;
use crate::input::InputFile;
use crate::layout::{self, CommonAllocationTarget};
use crate::model::fragment::BuildIdKind;
use crate::relax::{self, HexagonTrampolineRequest, HexagonStubTable, RiscVCandidate};
use crate::relocation::{self, ApplyResult, RelocContext, TargetMachine};
use crate::resolver::{self, Candidate};
use crate::rule::{self, MatchCache};
use crate::script::ast::{LinkerScript, ScriptCommand};
use crate::script::parser::Parser;
use crate::session::{InputId, LinkerSession, SectionId};

/// One parsed script's source, named for diagnostics and for `INCLUDE` resolution
/// against the other sources in the same batch.
pub struct ScriptSource {
    /// Name attributed to diagnostics raised while parsing this source (a path, or
    /// a synthetic name for a script supplied as a literal string)
    pub name: String,
    /// Raw script text
    pub text: String,
}

/// Summary handed back once [`Driver::link`] completes successfully: the headline
/// numbers a caller typically wants without walking the session's arenas itself.
#[derive(Debug, Clone, Default)]
pub struct LinkSummary {
    /// Input sections matched to some output section
    pub sections_matched: usize,
    /// Input sections that matched no rule at all
    pub sections_unmatched: usize,
    /// Bytes removed by the RISC-V relaxation loop, if it ran
    pub riscv_bytes_removed: Option<u32>,
    /// Trampolines inserted by the Hexagon relaxation loop, if it ran
    pub hexagon_stubs_inserted: Option<usize>,
    /// The finalized build-ID digest, if one was configured
    pub build_id: Option<Vec<u8>>,
}

/// Orchestrates the linker core's pipeline stages. Stateless; every stage takes the
/// session (and whatever target-specific inputs it needs) explicitly.
#[derive(Debug, Default)]
pub struct Driver;

impl Driver {
    /// A fresh driver. Cheap ; there is nothing to construct.
    pub fn new() -> Self {
        Self
    }

    /// Parse every script in `sources` and lower it into `session`'s
    /// memory/segment/output-section/rule state, in the order given. `INCLUDE`
    /// directives resolve against the other sources in the same batch by name;
    /// a name not present there is an unresolvable include.
    pub fn parse_scripts(
        &self,
        session: &mut LinkerSession,
        sources: &[ScriptSource],
    ) -> Result<Vec<LinkerScript>, Diag> {
        let _span = info_span!("parse_scripts", count = sources.len()).entered();
        let by_name: HashMap<&str, &str> = sources
            .iter()
            .map(|s| (s.name.as_str(), s.text.as_str()))
            .collect();

        let mut scripts = Vec::with_capacity(sources.len());
        for source in sources {
            let mut parser = Parser::new(source.name.clone(), &source.text, &session.diagnostics);
            let script = parser.parse(|path| by_name.get(path).copied());
            layout::build_from_script(session, &script)?;
            scripts.push(script);
        }
        Ok(scripts)
    }

    /// Resolve every symbol definition into `session.names`. Must run after
    /// inputs are loaded and after [`Driver::parse_scripts`] (so `EXTERN`/
    /// `VERSION` script commands are available), and before
    /// [`Driver::match_sections`].
    ///
    /// `regular_candidates` are non-archive inputs (object files, dynamic objects,
    /// internal files): each of their candidates binds unconditionally via
    /// [`resolver::resolve_one`]. `archive_candidates` are archive members,
    /// offered to the multi-pass fixed point in
    /// [`resolver::resolve_archive_fixed_point`]; the caller is responsible for
    /// materializing the sections of whichever members the returned set says were
    /// pulled in (this stage only decides membership, not I/O, matching
    /// `resolve_archive_fixed_point`'s own contract).
    ///
    /// Script-level `EXTERN`/`VERSION` commands and `session.options`'
    /// `--extern-list`/`--export-dynamic`/`--dynamic-list`/
    /// `--export-dynamic-symbol` layer on top afterward, in that order, so a
    /// version-script `local:` block is the only thing that can still override a
    /// plain `--export-dynamic`.
    pub fn resolve_symbols(
        &self,
        session: &mut LinkerSession,
        scripts: &[LinkerScript],
        regular_candidates: &[(InputId, Vec<Candidate>)],
        archive_candidates: &[(InputId, Vec<Candidate>)],
    ) -> Result<HashSet<InputId>, Diag> {
        let _span = info_span!("resolve_symbols").entered();
        let allow_multi = session.options.allow_multiple_definition;

        for (_, candidates) in regular_candidates {
            for candidate in candidates {
                resolver::resolve_one(&mut session.names, &session.diagnostics, allow_multi, candidate.clone());
            }
        }

        let pulled = resolver::resolve_archive_fixed_point(
            &mut session.names,
            &session.diagnostics,
            allow_multi,
            archive_candidates,
        );

        let mut forced = session.options.extern_list.clone();
        for script in scripts {
            for command in &script.commands {
                if let ScriptCommand::Extern(names) = command {
                    forced.extend(names.iter().cloned());
                }
            }
        }
        resolver::force_undefined(&mut session.names, &forced);

        for script in scripts {
            for command in &script.commands {
                if let ScriptCommand::Version(nodes) = command {
                    resolver::apply_version_script(&mut session.names, &session.diagnostics, nodes);
                }
            }
        }

        if session.options.export_dynamic {
            resolver::export_all_globals(&mut session.names);
        }
        let mut dynamic_patterns = session.options.dynamic_list.clone();
        dynamic_patterns.extend(session.options.export_dynamic_symbols.iter().cloned());
        resolver::apply_dynamic_list(&mut session.names, &dynamic_patterns);

        debug!(pulled = pulled.len(), "symbol resolution complete");
        Ok(pulled)
    }

    /// Route every input section into the rule (and thus output section) it
    /// matches, in declaration order. Must run after [`Driver::parse_scripts`] (so
    /// `session.rules` exists) and after inputs are populated. Sections belonging to
    /// an input whose `file` is still `None` (unresolved) are skipped rather than
    /// treated as unmatched.
    pub fn match_sections(&self, session: &mut LinkerSession) -> Result<usize, Diag> {
        let _span = info_span!("match_rules").entered();
        let origins = rule::build_section_origins(&session.inputs);
        let owner: HashMap<SectionId, InputId> = section_owners(session);

        let cache = MatchCache::default();
        let mut matched = 0usize;
        let section_ids: Vec<SectionId> = session.sections.iter().map(|(id, _)| id).collect();
        for section_id in section_ids {
            let Some(&input_id) = owner.get(&section_id) else {
                continue;
            };
            if let Some((rule_id, pattern_index)) =
                rule::find_rule(&session.rules, &session.sections, &origins, &cache, input_id, section_id)
            {
                session.rules.get_mut(rule_id).append(pattern_index, section_id);
                session.sections.get_mut(section_id).matched_rule = Some(rule_id);
                matched += 1;
            }
        }
        debug!(matched, "rule matching complete");
        Ok(matched)
    }

    /// Materialize common-symbol storage; must run before `assign_addresses`.
    /// No-op if nothing in `session.names` is still `Desc::Common`.
    pub fn pre_layout(
        &self,
        session: &mut LinkerSession,
        common_target: CommonAllocationTarget,
    ) -> Result<(), Diag> {
        let _span = debug_span!("pre_layout").entered();
        layout::allocate_common_symbols(session, common_target)
    }

    /// Walk declared output sections in order, assigning virtual/load addresses and
    /// placing every matched input section. Must run after
    /// [`Driver::match_sections`] and [`Driver::pre_layout`].
    pub fn assign_addresses(&self, session: &mut LinkerSession) -> Result<(), Diag> {
        let _span = info_span!("assign_addresses").entered();
        layout::assign_addresses(session)
    }

    /// Scan every relocation for GOT/PLT/copy/dynamic-relocation reservations and
    /// materialize the fragments they need into `dynamic`, appending them to the
    /// given synthetic sections. Part of pre-layout: must run before
    /// [`Driver::assign_addresses`] so the synthesized fragments participate in
    /// address assignment like any other section's.
    pub fn synthesize_dynamic(
        &self,
        session: &mut LinkerSession,
        machine: TargetMachine,
        dynamic: &mut DynamicState,
        got_section: SectionId,
        gotplt_section: SectionId,
        plt_section: SectionId,
    ) -> Result<(), Diag> {
        let _span = debug_span!("pre_layout", stage = "dynamic_scan").entered();
        let relocator = relocation::relocator_for(machine);
        let is_pic_output = session.options.output_kind == crate::config::OutputKind::SharedObject;
        let no_symbol_value =
            |_: crate::session::SymbolId,
             _: &crate::model::symbol::NamePool,
             _: &crate::session::Arena<crate::model::section::Section>,
             _: &crate::session::Arena<crate::model::fragment::Fragment>| None;

        let reloc_ids: Vec<_> = session.relocations.iter().map(|(id, _)| id).collect();
        for reloc_id in reloc_ids {
            let reloc = session.relocations.get(reloc_id).clone();
            let reservations = {
                let ctx = RelocContext {
                    names: &session.names,
                    sections: &session.sections,
                    symbol_value: &no_symbol_value,
                    fragments: &session.fragments,
                    global_pointer: None,
                    is_pic_output,
                };
                relocator.scan(&reloc, &ctx)
            };
            let before = session.fragments.len();
            dynamic.apply_reservations(
                &reservations,
                &session.names,
                &mut session.fragments,
                got_section,
                gotplt_section,
                plt_section,
            )?;
            attach_new_fragments(session, before);
        }
        Ok(())
    }

    /// Drive the RISC-V byte-deletion relaxation loop to a fixed point, scanning
    /// `session.relocations` for `R_RISCV_CALL`/`CALL_PLT` pairs with an adjacent
    /// `R_RISCV_RELAX` marker at the same offset. Returns total bytes removed.
    ///
    /// Reimplements [`relax::drive_riscv_relaxation`]'s fixed-point contract
    /// directly (rather than calling it with scan/apply closures) since both
    /// halves need overlapping borrows of `session` that two simultaneously-live
    /// closures cannot express.
    pub fn relax_riscv(&self, session: &mut LinkerSession) -> Result<u32, Diag> {
        let _span = info_span!("relax").entered();
        let options = session.options.relax;
        if !options.relax || !options.riscv_relax {
            return Ok(0);
        }

        let mut total_removed = 0u32;
        for _ in 0..options.max_passes {
            let candidates = scan_riscv_candidates(session);
            if candidates.is_empty() {
                return Ok(total_removed);
            }
            total_removed += apply_riscv_candidates(session, &candidates);
        }
        Err(Diag::RelaxationDidNotConverge { passes: options.max_passes })
    }

    /// Drive the Hexagon grow-only trampoline insertion loop to a fixed point.
    /// `scan` supplies the out-of-range branches a fresh pass over
    /// `session.relocations` finds, given the fragments' current (already-grown)
    /// addresses; `stub_section` is the output section stubs are appended to.
    ///
    /// Reimplements [`relax::drive_hexagon_relaxation`]'s fixed-point contract
    /// directly, for the same borrow-splitting reason as [`Driver::relax_riscv`].
    pub fn relax_hexagon(
        &self,
        session: &mut LinkerSession,
        stub_section: SectionId,
        mut scan: impl FnMut(&LinkerSession) -> Vec<HexagonTrampolineRequest>,
    ) -> Result<usize, Diag> {
        let _span = info_span!("relax").entered();
        let options = session.options.relax;
        if !options.relax {
            return Ok(0);
        }

        let mut table = HexagonStubTable::new();
        let mut total_inserted = 0usize;
        for _ in 0..options.max_passes {
            let requests = scan(session);
            if requests.is_empty() {
                return Ok(total_inserted);
            }
            for request in &requests {
                let before = table.len();
                let fragment_id = table.ensure_stub(*request, &mut session.fragments, stub_section);
                if table.len() != before {
                    session.sections.get_mut(stub_section).fragments.push(fragment_id);
                    total_inserted += 1;
                }
            }
        }
        Err(Diag::RelaxationDidNotConverge { passes: options.max_passes })
    }

    /// Apply every non-discarded relocation in `session.relocations`'s target
    /// bytes, dispatching to the `machine`-specific [`relocation::Relocator`].
    /// `symbol_value` resolves a symbol to its final address ; the caller supplies
    /// it since address assignment, not this module, owns that computation.
    /// Diagnoses (rather than aborts on) the first overflow/bad-relocation/
    /// unsupported-type outcome per relocation, via `session.diagnostics`.
    pub fn apply_relocations(
        &self,
        session: &mut LinkerSession,
        machine: TargetMachine,
        symbol_value: &dyn Fn(
            crate::session::SymbolId,
            &crate::model::symbol::NamePool,
            &crate::session::Arena<crate::model::section::Section>,
            &crate::session::Arena<crate::model::fragment::Fragment>,
        ) -> Option<u64>,
        global_pointer: Option<u64>,
    ) -> Result<usize, Diag> {
        let _span = info_span!("apply_relocations").entered();
        let relocator = relocation::relocator_for(machine);
        let is_pic_output = session.options.output_kind == crate::config::OutputKind::SharedObject;

        let reloc_ids: Vec<_> = session.relocations.iter().map(|(id, _)| id).collect();
        let mut applied = 0usize;
        for reloc_id in reloc_ids {
            let reloc = session.relocations.get(reloc_id).clone();
            let section_address = session.sections.get(reloc.owning_section).address.unwrap_or(0);
            let symbol_name = session.names.get(reloc.symbol).name.clone();

            let value = if reloc.is_in_discarded_section(&session.sections) {
                relocator.discarded_sentinel(&reloc) as i64
            } else {
                match symbol_value(reloc.symbol, &session.names, &session.sections, &session.fragments) {
                    Some(s) => {
                        let p = section_address + reloc.offset as u64;
                        (s as i64) + reloc.addend - (p as i64)
                    }
                    None => {
                        session.diagnostics.emit(Diag::UnsupportedRelocation {
                            reloc_type: reloc.reloc_type,
                            symbol: symbol_name,
                        });
                        continue;
                    }
                }
            };

            let ctx = RelocContext {
                names: &session.names,
                sections: &session.sections,
                symbol_value,
                fragments: &session.fragments,
                global_pointer,
                is_pic_output,
            };
            let mut target_bytes = reloc.cached_target_bytes.clone();
            let result = relocation::apply_relocation(
                relocator.as_ref(),
                &reloc,
                &ctx,
                section_address,
                &mut target_bytes,
            );

            match result {
                ApplyResult::Ok => {
                    session.relocations.get_mut(reloc_id).cached_target_bytes = target_bytes;
                    applied += 1;
                }
                ApplyResult::Overflow => session.diagnostics.emit(Diag::RelocationOverflow {
                    reloc_type: reloc.reloc_type,
                    symbol: symbol_name,
                    value,
                }),
                ApplyResult::BadReloc | ApplyResult::Unsupported => {
                    session.diagnostics.emit(Diag::UnsupportedRelocation {
                        reloc_type: reloc.reloc_type,
                        symbol: symbol_name,
                    })
                }
            }
        }
        Ok(applied)
    }

    /// Finalize the `.note.gnu.build-id` fragment, if one is configured : hash (or
    /// embed) the id and write it into `image` at `note_offset`. Must run last,
    /// once the rest of the image is final.
    pub fn finalize_build_id(
        &self,
        session: &LinkerSession,
        image: &mut [u8],
        note_offset: usize,
    ) -> Result<Option<Vec<u8>>, Diag> {
        let _span = debug_span!("finalize_build_id").entered();
        let Some((kind, fixed)) = buildid::resolve_mode(&session.options.build_id)? else {
            return Ok(None);
        };
        let _: BuildIdKind = kind;
        Ok(Some(buildid::finalize_in_place(image, note_offset, kind, &fixed)))
    }

    /// Run every pipeline stage that does not require target-specific relaxation or
    /// relocation callbacks : scripts through address assignment. Callers
    /// targeting RISC-V/Hexagon drive [`Driver::relax_riscv`]/[`Driver::relax_hexagon`],
    /// [`Driver::apply_relocations`] and [`Driver::finalize_build_id`] themselves
    /// afterward, since those need target-specific inputs this method cannot
    /// supply generically.
    pub fn link_up_to_layout(
        &self,
        session: &mut LinkerSession,
        scripts: &[ScriptSource],
        common_target: CommonAllocationTarget,
        regular_candidates: &[(InputId, Vec<Candidate>)],
        archive_candidates: &[(InputId, Vec<Candidate>)],
    ) -> Result<LinkSummary, Diag> {
        let _span = info_span!("link").entered();
        let parsed_scripts = self.parse_scripts(session, scripts)?;
        self.resolve_symbols(session, &parsed_scripts, regular_candidates, archive_candidates)?;
        let matched = self.match_sections(session)?;
        self.pre_layout(session, common_target)?;
        self.assign_addresses(session)?;

        let total_sections = session.sections.len();
        Ok(LinkSummary {
            sections_matched: matched,
            sections_unmatched: total_sections.saturating_sub(matched),
            riscv_bytes_removed: None,
            hexagon_stubs_inserted: None,
            build_id: None,
        })
    }
}

/// Append every fragment pushed since `before` (an earlier `session.fragments.len()`
/// snapshot) to its owning section's fragment list. [`DynamicState::apply_reservations`]
/// creates GOT/GOTPLT/PLT fragments in the arena directly, without threading the
/// owning section's list through ; this is the one spot that keeps the two in sync.
fn attach_new_fragments(session: &mut LinkerSession, before: usize) {
    let new_ids: Vec<_> = session
        .fragments
        .iter()
        .skip(before)
        .map(|(id, fragment)| (id, fragment.header.owning_section))
        .collect();
    for (fragment_id, owning_section) in new_ids {
        session.sections.get_mut(owning_section).fragments.push(fragment_id);
    }
}

/// Build the `SectionId -> InputId` reverse index [`rule::find_rule`] needs but
/// [`rule::build_section_origins`] does not itself carry, since sections don't hold
/// a back-reference to their owning input.
fn section_owners(session: &LinkerSession) -> HashMap<SectionId, InputId> {
    let mut owner = HashMap::new();
    for (input_id, input) in session.inputs.iter() {
        let Some(file) = &input.file else { continue };
        let sections: &[SectionId] = match file {
            InputFile::ObjectFile { sections } => sections,
            InputFile::ArchiveMember { sections, .. } => sections,
            InputFile::InternalFile { sections } => sections,
            InputFile::ArchiveFile { .. }
            | InputFile::LinkerScriptFile { .. }
            | InputFile::BitcodeFile
            | InputFile::DynamicObject { .. } => &[],
        };
        for &section_id in sections {
            owner.insert(section_id, input_id);
        }
    }
    owner
}

/// One scan pass over every RISC-V-relaxable relocation, pairing each
/// `CALL`/`CALL_PLT` with an `R_RISCV_RELAX` marker at the same offset (the
/// marker means the linker may relax the preceding relocation). Only fragments
/// still backed by [`crate::model::fragment::FragmentKind::RegionEx`] can be
/// shrunk; any other fragment kind at that offset is left untouched.
fn scan_riscv_candidates(session: &LinkerSession) -> Vec<RiscVCandidate> {
    use crate::arch::riscv::ElfRelocationTypeRISCV;
    use crate::model::fragment::FragmentKind;
    use num_traits::FromPrimitive;

    let mut by_offset: HashMap<(SectionId, u32), u32> = HashMap::new();
    for (_, reloc) in session.relocations.iter() {
        by_offset.insert((reloc.owning_section, reloc.offset), reloc.reloc_type);
    }

    let mut candidates = Vec::new();
    for (_, reloc) in session.relocations.iter() {
        let Some(reloc_kind) = ElfRelocationTypeRISCV::from_u32(reloc.reloc_type) else {
            continue;
        };
        if !matches!(reloc_kind, ElfRelocationTypeRISCV::Call | ElfRelocationTypeRISCV::CallPlt) {
            continue;
        }
        let marker = by_offset.get(&(reloc.owning_section, reloc.offset)).copied();
        if marker != Some(ElfRelocationTypeRISCV::Relax as u32) {
            continue;
        }

        for (fragment_id, fragment) in session.fragments.iter() {
            if fragment.header.owning_section != reloc.owning_section {
                continue;
            }
            let Some(padded) = fragment.header.padded_offset() else { continue };
            let FragmentKind::RegionEx(region) = &fragment.kind else { continue };
            let fragment_end = padded as u64 + region.size() as u64;
            if (reloc.offset as u64) < padded as u64 || (reloc.offset as u64) >= fragment_end {
                continue;
            }
            let local_offset = reloc.offset - padded;
            // auipc+jalr (8 bytes) collapses to a single jal (4 bytes); the
            // immediate itself is filled in once the real target address is
            // known, so this only ever emits the zero-displacement opcode word.
            const JAL_X0_ZERO_DISPLACEMENT: u32 = 0x0000_006f;
            candidates.push(RiscVCandidate {
                fragment: fragment_id,
                offset: local_offset,
                length: 4,
                replacement: Some((JAL_X0_ZERO_DISPLACEMENT, 4)),
            });
            break;
        }
    }
    candidates
}

/// Apply one pass's worth of RISC-V shrink candidates, delegating the actual byte
/// deletion and offset-shifting bookkeeping to [`relax::run_riscv_pass`].
fn apply_riscv_candidates(session: &mut LinkerSession, candidates: &[RiscVCandidate]) -> u32 {
    let mut reloc_ids_by_section: HashMap<SectionId, Vec<crate::session::RelocationId>> = HashMap::new();
    for (id, reloc) in session.relocations.iter() {
        reloc_ids_by_section.entry(reloc.owning_section).or_default().push(id);
    }

    let mut symbol_ranges: HashMap<crate::session::SymbolId, (u32, u32)> = HashMap::new();
    let mut symbols_in_section: HashMap<SectionId, Vec<crate::session::SymbolId>> = HashMap::new();
    for (symbol_id, info) in session.names.iter() {
        let Some(fragment_id) = info.fragment else { continue };
        let fragment = session.fragments.get(fragment_id);
        let Some(offset) = fragment.header.padded_offset() else { continue };
        symbol_ranges.insert(symbol_id, (offset, info.size as u32));
        symbols_in_section
            .entry(fragment.header.owning_section)
            .or_default()
            .push(symbol_id);
    }

    relax::run_riscv_pass(
        candidates,
        &mut session.fragments,
        &mut session.relocations,
        &reloc_ids_by_section,
        &mut symbol_ranges,
        &symbols_in_section,
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod test {
    use super::*;
    use crate::config::GeneralOptions;
    use crate::model::section::{Section, SectionFlags, SectionKind};

    fn empty_session() -> LinkerSession {
        LinkerSession::new(GeneralOptions::builder().build())
    }

    #[test]
    fn parse_scripts_lowers_sections_command_into_outputs() {
        let mut session = empty_session();
        let script = ScriptSource {
            name: "link.ld".to_string(),
            text: "SECTIONS { .text : { *(.text) } }".to_string(),
        };
        let driver = Driver::new();
        let parsed = driver.parse_scripts(&mut session, &[script]).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(session.outputs.len(), 1);
        let (_, entry) = session.outputs.iter().next().unwrap();
        assert_eq!(entry.name, ".text");
    }

    #[test]
    fn match_sections_routes_input_section_into_its_rule() {
        let mut session = empty_session();
        let section_id = session.sections.push(Section::new(
            ".text",
            SectionFlags::ALLOC | SectionFlags::EXECINSTR,
            SectionKind::ProgBits,
        ));
        let mut input = crate::input::Input::new("a.o", 0, crate::input::InputAttributes::default());
        input.file = Some(InputFile::ObjectFile { sections: vec![section_id] });
        session.inputs.push(input);

        let script = ScriptSource {
            name: "link.ld".to_string(),
            text: "SECTIONS { .text : { *(.text) } }".to_string(),
        };
        let driver = Driver::new();
        driver.parse_scripts(&mut session, &[script]).unwrap();
        let matched = driver.match_sections(&mut session).unwrap();
        assert_eq!(matched, 1);
        assert!(session.sections.get(section_id).matched_rule.is_some());
    }

    #[test]
    fn resolve_symbols_pulls_archive_member_through_the_fixed_point() {
        let mut session = empty_session();
        session.names.intern("main_calls_foo");
        let member_input = session.inputs.push(crate::input::Input::new(
            "libfoo.a(foo.o)",
            1,
            crate::input::InputAttributes::default(),
        ));
        let archive_candidates = vec![(
            member_input,
            vec![Candidate {
                name: "main_calls_foo".to_string(),
                origin: member_input,
                binding: crate::model::symbol::SymbolBinding::Global,
                desc: crate::model::symbol::Desc::Defined,
                size: 0,
                fragment: None,
            }],
        )];

        let driver = Driver::new();
        let pulled = driver
            .resolve_symbols(&mut session, &[], &[], &archive_candidates)
            .unwrap();
        assert!(pulled.contains(&member_input));
        let id = session.names.get_by_name("main_calls_foo").unwrap();
        assert_eq!(session.names.get(id).desc, crate::model::symbol::Desc::Defined);
    }

    #[test]
    fn resolve_symbols_applies_version_script_and_export_dynamic() {
        let mut session = empty_session();
        session.options.export_dynamic = true;
        let object_input = session.inputs.push(crate::input::Input::new(
            "a.o",
            0,
            crate::input::InputAttributes::default(),
        ));
        let regular_candidates = vec![(
            object_input,
            vec![Candidate {
                name: "visible_fn".to_string(),
                origin: object_input,
                binding: crate::model::symbol::SymbolBinding::Global,
                desc: crate::model::symbol::Desc::Defined,
                size: 0,
                fragment: None,
            }],
        )];
        let script = crate::script::ast::LinkerScript {
            commands: vec![ScriptCommand::Version(vec![crate::script::ast::VersionNode {
                name: None,
                global: vec![],
                local: vec![crate::script::ast::VersionPattern {
                    pattern: "visible_fn".to_string(),
                    is_extern: false,
                }],
                depends: vec![],
            }])],
        };

        let driver = Driver::new();
        driver
            .resolve_symbols(&mut session, std::slice::from_ref(&script), &regular_candidates, &[])
            .unwrap();

        let id = session.names.get_by_name("visible_fn").unwrap();
        // the version script's `local:` block wins over `--export-dynamic`
        assert!(session.names.get(id).is_export_suppressed());
    }

    #[test]
    fn pre_layout_materializes_common_symbols_before_address_assignment() {
        let mut session = empty_session();
        let id = session.names.intern("shared_counter");
        session.names.get_mut(id).desc = crate::model::symbol::Desc::Common;
        session.names.get_mut(id).size = 4;

        let driver = Driver::new();
        driver.pre_layout(&mut session, CommonAllocationTarget::RiscV).unwrap();
        assert!(session.sections.iter().any(|(_, s)| s.name == ".bss"));
        assert!(session.names.get(id).fragment.is_some());
    }

    #[test]
    fn unmatched_sections_are_reported_as_unmatched() {
        let mut session = empty_session();
        session.sections.push(Section::new(".weird", SectionFlags::ALLOC, SectionKind::ProgBits));

        let outputs_before = session.outputs.len();
        let driver = Driver::new();
        let summary = driver
            .link_up_to_layout(&mut session, &[], CommonAllocationTarget::RiscV, &[], &[])
            .unwrap();
        assert_eq!(outputs_before, 0);
        assert_eq!(summary.sections_matched, 0);
        assert_eq!(summary.sections_unmatched, 1);
    }

    #[test]
    fn finalize_build_id_is_none_when_mode_is_none() {
        let session = empty_session();
        let driver = Driver::new();
        let mut image = vec![0u8; 32];
        let result = driver.finalize_build_id(&session, &mut image, 8).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn finalize_build_id_writes_fast_digest() {
        let mut options = GeneralOptions::builder().build();
        options.build_id = crate::config::BuildIdMode::Fast;
        let session = LinkerSession::new(options);
        let driver = Driver::new();
        let mut image = vec![0x42u8; 64];
        let digest = driver.finalize_build_id(&session, &mut image, 16).unwrap().unwrap();
        assert_eq!(digest.len(), 8);
        assert_eq!(&image[16..24], digest.as_slice());
    }
}
