//! Output-section layout : lowering a parsed `MEMORY`/`PHDRS`/`SECTIONS`
//! script into [`OutputSectionEntry`]/[`memory::MemoryRegion`]/[`segment::Segment`],
//! the pre-layout duty of materializing common-symbol storage, and the
//! location-counter-driven address assignment pass that walks declared output
//! sections in order and places every matched input section into them.

pub mod memory;
pub mod segment;

use std::collections::HashMap;

use crate::diag::Diag;
use crate::model::section::{Section, SectionFlags, SectionKind};
use crate::resolver;
use crate::script::ast::{
    AssignOp, AssignWrapper, LinkerScript, MemoryDecl, OutputSectionStmt, PhdrDecl,
    ScriptCommand, SectionBodyStatement, SectionEpilog, SectionProlog,
};
use crate::script::expr::{EvalContext, RegionView};
use crate::session::{
    Arena, LinkerSession, MemoryRegionId, OutputSectionId, RuleId, SectionId, SegmentId, SymbolId,
};
use memory::{MemoryAttributes, MemoryRegion};
use segment::{PhdrType, Segment, SegmentFlags};

/// One output section: the header an `OutputSectionStmt` lowers into, the rules
/// appending into it, and its assigned layout. A script may declare the same output section name more
/// than once; each occurrence's body statements are appended onto the same entry
/// in the order they were parsed, across every occurrence.
#[derive(Debug, Clone)]
pub struct OutputSectionEntry {
    /// Output section name, or `/DISCARD/`
    pub name: String,
    /// Prolog fields from the first occurrence (VMA, `AT`, `ALIGN`, `SUBALIGN`,
    /// `ONLY_IF_RO`/`RW`); later occurrences may only add body statements
    pub prolog: SectionProlog,
    /// Epilog fields from the first occurrence (`>region`, `AT>region`, `:phdr`,
    /// `=fill`)
    pub epilog: SectionEpilog,
    /// Body statements in declaration order, across every occurrence of this output
    /// section name; each `SectionBodyStatement::InputSection` here has a matching
    /// entry in `rules`, in the same relative order
    pub body: Vec<SectionBodyStatement>,
    /// Rules appending into this output section, in declaration order
    pub rules: Vec<RuleId>,
    /// Section flags: the union of every input section merged into it
    pub flags: SectionFlags,
    /// PROGBITS/NOBITS/NOTE, merged per `SectionKind::merge`
    pub kind: SectionKind,
    /// Running max alignment across every merged input section
    pub alignment: u64,
    /// Assigned VMA; `None` until address assignment runs
    pub address: Option<u64>,
    /// Assigned LMA; `None` until address assignment runs
    pub load_address: Option<u64>,
    /// Total size in bytes
    pub size: u64,
    /// The segment this output section was placed into, via `:phdr`
    pub segment: Option<SegmentId>,
    /// Position among every declared output section; address assignment walks
    /// output sections in this order
    pub declaration_order: u32,
    /// True for `/DISCARD/`: every input section routed here is dropped, never
    /// emitted
    pub is_discard: bool,
}

impl OutputSectionEntry {
    /// A fresh, unplaced output section.
    pub fn new(
        name: impl Into<String>,
        prolog: SectionProlog,
        epilog: SectionEpilog,
        declaration_order: u32,
    ) -> Self {
        let name = name.into();
        let is_discard = name == "/DISCARD/";
        Self {
            name,
            prolog,
            epilog,
            body: Vec::new(),
            rules: Vec::new(),
            flags: SectionFlags::empty(),
            kind: SectionKind::NoBits,
            alignment: 1,
            address: None,
            load_address: None,
            size: 0,
            segment: None,
            declaration_order,
            is_discard,
        }
    }

    /// Widen this entry's accumulated flags/kind/alignment to account for one more
    /// merged input section, per the "union of flags, progbits-wins" compatibility
    /// rule. Returns the flags as they stood before this merge, so the
    /// caller can diagnose a mismatch against what was already accumulated.
    pub fn merge_section(
        &mut self,
        section_flags: SectionFlags,
        section_kind: SectionKind,
        section_alignment: u64,
    ) -> SectionFlags {
        let prior = self.flags;
        self.flags |= section_flags;
        self.kind = self.kind.merge(section_kind);
        self.alignment = self.alignment.max(section_alignment.max(1));
        prior
    }
}

/// Find `name` among already-declared output sections, or append a fresh one. A
/// script may reopen the same output section name across multiple `SECTIONS`
/// blocks (or multiple `-T` scripts), so this is a find-or-insert rather than a
/// blind push.
pub fn find_or_insert(
    outputs: &mut Arena<OutputSectionEntry>,
    name: &str,
    declaration_order: u32,
) -> OutputSectionId {
    for (id, entry) in outputs.iter() {
        if entry.name == name {
            return id;
        }
    }
    outputs.push(OutputSectionEntry::new(
            name,
            SectionProlog::default(),
            SectionEpilog::default(),
            declaration_order,
    ))
}

/// Lower one parsed script's `MEMORY`/`PHDRS`/`SECTIONS` commands into
/// `session.memory_regions`/`session.segments`/`session.outputs`/`session.rules`.
/// Call once per script, in script-processing order; commands from a later script
/// extend the same session rather than starting over.
pub fn build_from_script(session: &mut LinkerSession, script: &LinkerScript) -> Result<(), Diag> {
    for command in &script.commands {
        match command {
            ScriptCommand::Memory(decls) => build_memory(session, decls)?,
            ScriptCommand::Phdrs(decls) => build_phdrs(session, decls)?,
            ScriptCommand::Sections(stmts) => build_sections(session, stmts)?,
            _ => {}
        }
    }
    Ok(())
}

fn build_memory(session: &mut LinkerSession, decls: &[MemoryDecl]) -> Result<(), Diag> {
    for decl in decls {
        let attrs = MemoryAttributes::parse(&decl.attributes);
        let (origin, length) = {
            let mut symbols = HashMap::new();
            let placed = HashMap::new();
            let mut ctx = const_eval_ctx(session, &mut symbols, &placed);
            let origin = decl.origin.eval(&mut ctx)?;
            let length = decl.length.eval(&mut ctx)?;
            (origin, length)
        };
        session
            .memory_regions
            .push(MemoryRegion::new(decl.name.clone(), attrs, origin, length));
    }
    Ok(())
}

fn build_phdrs(session: &mut LinkerSession, decls: &[PhdrDecl]) -> Result<(), Diag> {
    for decl in decls {
        let phdr_type = PhdrType::parse(&decl.phdr_type, "script", 0)?;
        let mut seg = Segment::new(decl.name.clone(), phdr_type);
        seg.filehdr = decl.filehdr;
        seg.phdrs_kw = decl.phdrs_kw;
        if let Some(at) = &decl.at {
            let mut symbols = HashMap::new();
            let placed = HashMap::new();
            let mut ctx = const_eval_ctx(session, &mut symbols, &placed);
            seg.at = Some(at.eval(&mut ctx)?);
        }
        session.segments.push(seg);
    }
    Ok(())
}

fn build_sections(session: &mut LinkerSession, stmts: &[OutputSectionStmt]) -> Result<(), Diag> {
    for stmt in stmts {
        let next_order = session.outputs.len() as u32;
        let output_id = find_or_insert(&mut session.outputs, &stmt.name, next_order);
        {
            let entry = session.outputs.get_mut(output_id);
            if entry.body.is_empty() {
                entry.prolog = stmt.prolog.clone();
                entry.epilog = stmt.epilog.clone();
            }
        }
        for body_stmt in &stmt.body {
            if let SectionBodyStatement::InputSection(desc) = body_stmt {
                let declaration_order = session.rules.len() as u32;
                let rule_id = session.rules.push(crate::rule::RuleContainer::new(
                        output_id,
                        desc.clone(),
                        declaration_order,
                ));
                session.outputs.get_mut(output_id).rules.push(rule_id);
            }
            session
                .outputs
                .get_mut(output_id)
                .body
                .push(body_stmt.clone());
        }
    }
    Ok(())
}

/// Snapshot of one already-placed output section's layout, for `ADDR`/`LOADADDR`/
/// `SIZEOF`/`ALIGNOF` expression lookups.
#[derive(Debug, Clone, Copy, Default)]
struct PlacedSection {
    address: u64,
    load_address: u64,
    size: u64,
    alignment: u64,
}

/// The [`EvalContext`] both constant folding (`MEMORY`/`PHDRS` expressions, which
/// run before any output section exists) and address assignment evaluate script
/// expressions against.
struct LayoutEvalContext<'a> {
    dot: u64,
    symbols: &'a mut HashMap<String, u64>,
    sections: &'a HashMap<String, PlacedSection>,
    regions: &'a Arena<MemoryRegion>,
    max_page_size: u64,
    common_page_size: u64,
}

impl<'a> EvalContext for LayoutEvalContext<'a> {
    fn dot(&self) -> u64 {
        self.dot
    }

    fn set_dot(&mut self, value: u64) {
        self.dot = value;
    }

    fn symbol_value(&self, name: &str) -> Option<u64> {
        self.symbols.get(name).copied()
    }

    fn is_defined(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    fn section_addr(&self, name: &str) -> Option<u64> {
        self.sections.get(name).map(|s| s.address)
    }

    fn section_load_addr(&self, name: &str) -> Option<u64> {
        self.sections.get(name).map(|s| s.load_address)
    }

    fn section_size(&self, name: &str) -> Option<u64> {
        self.sections.get(name).map(|s| s.size)
    }

    fn section_alignment(&self, name: &str) -> Option<u64> {
        self.sections.get(name).map(|s| s.alignment)
    }

    fn region(&self, name: &str) -> Option<RegionView> {
        self.regions
            .iter()
            .find(|(_, r)| r.name == name)
            .map(|(_, r)| RegionView {
                origin: r.origin,
                length: r.length,
        })
    }

    fn max_page_size(&self) -> u64 {
        self.max_page_size
    }

    fn common_page_size(&self) -> u64 {
        self.common_page_size
    }

    fn sizeof_headers(&self) -> u64 {
        0
    }
}

fn const_eval_ctx<'a>(
    session: &'a LinkerSession,
    symbols: &'a mut HashMap<String, u64>,
    placed: &'a HashMap<String, PlacedSection>,
) -> LayoutEvalContext<'a> {
    LayoutEvalContext {
        dot: 0,
        symbols,
        sections: placed,
        regions: &session.memory_regions,
        max_page_size: session.options.max_page_size,
        common_page_size: session.options.common_page_size,
    }
}

fn apply_assign_op(op: AssignOp, current: u64, rhs: u64) -> u64 {
    match op {
        AssignOp::Assign => rhs,
        AssignOp::AddAssign => current.wrapping_add(rhs),
        AssignOp::SubAssign => current.wrapping_sub(rhs),
        AssignOp::MulAssign => current.wrapping_mul(rhs),
        AssignOp::DivAssign => {
            if rhs == 0 {
                current
            } else {
                current / rhs
            }
        }
        AssignOp::ShlAssign => current.wrapping_shl(rhs as u32),
        AssignOp::ShrAssign => current.wrapping_shr(rhs as u32),
        AssignOp::AndAssign => current & rhs,
        AssignOp::OrAssign => current | rhs,
        AssignOp::XorAssign => current ^ rhs,
    }
}

fn find_region_id(session: &LinkerSession, name: &str) -> Option<MemoryRegionId> {
    session
        .memory_regions
        .iter()
        .find(|(_, r)| r.name == name)
        .map(|(id, _)| id)
}

fn find_segment_id(session: &LinkerSession, name: &str) -> Option<SegmentId> {
    session
        .segments
        .iter()
        .find(|(_, s)| s.name == name)
        .map(|(id, _)| id)
}

fn region_cursor(session: &LinkerSession, name: &str) -> Option<u64> {
    find_region_id(session, name).map(|id| session.memory_regions.get(id).cursor)
}

fn advance_region(session: &mut LinkerSession, name: &str, size: u64) -> Result<(), Diag> {
    let Some(id) = find_region_id(session, name) else {
        return Err(Diag::UndefinedMemoryRegion {
                name: name.to_string(),
        });
    };
    let (overflowed, overflow) = {
        let region = session.memory_regions.get_mut(id);
        region.cursor += size;
        (region.is_overflowed(), region.overflow())
    };
    if overflowed {
        session.diagnostics.emit(Diag::RegionOverflow {
                region: name.to_string(),
                overflow,
        });
    }
    Ok(())
}

fn section_segment_flags(flags: SectionFlags) -> SegmentFlags {
    let mut out = SegmentFlags::empty();
    if flags.contains(SectionFlags::ALLOC) {
        out |= SegmentFlags::READ;
    }
    if flags.contains(SectionFlags::WRITE) {
        out |= SegmentFlags::WRITE;
    }
    if flags.contains(SectionFlags::EXECINSTR) {
        out |= SegmentFlags::EXEC;
    }
    out
}

/// Run address assignment over every declared output section, in declaration
/// order : evaluate the prolog's `VMA`/`ALIGN` expressions, walk the
/// section's body statements in order (placing each rule's matched input sections
/// one at a time and folding in symbol assignments and `BYTE`/`SHORT`/`LONG`/`QUAD`
/// data as the location counter passes them), then resolve the epilog's `>region`/
/// `AT>region`/`:phdr` placement. A `/DISCARD/` output section instead marks every
/// section its rules matched as discarded and contributes nothing to the image.
///
/// Expressions are re-evaluated from scratch on every call (no caching across
/// passes), since relaxation changes fragment sizes between address-assignment
/// passes.
pub fn assign_addresses(session: &mut LinkerSession) -> Result<(), Diag> {
    let mut symbols: HashMap<String, u64> = HashMap::new();
    let mut placed: HashMap<String, PlacedSection> = HashMap::new();
    let mut dot: u64 = 0;

    let output_ids: Vec<OutputSectionId> = session.outputs.iter().map(|(id, _)| id).collect();

    for output_id in output_ids {
        if session.outputs.get(output_id).is_discard {
            discard_rule_sections(session, output_id);
            continue;
        }

        let prolog = session.outputs.get(output_id).prolog.clone();
        let epilog = session.outputs.get(output_id).epilog.clone();
        let body = session.outputs.get(output_id).body.clone();
        let rule_ids = session.outputs.get(output_id).rules.clone();

        if let Some(vma_expr) = &prolog.vma {
            let mut ctx = LayoutEvalContext {
                dot,
                symbols: &mut symbols,
                sections: &placed,
                regions: &session.memory_regions,
                max_page_size: session.options.max_page_size,
                common_page_size: session.options.common_page_size,
            };
            dot = vma_expr.eval(&mut ctx)?;
        }
        if let Some(align_expr) = &prolog.align {
            let mut ctx = LayoutEvalContext {
                dot,
                symbols: &mut symbols,
                sections: &placed,
                regions: &session.memory_regions,
                max_page_size: session.options.max_page_size,
                common_page_size: session.options.common_page_size,
            };
            let align = align_expr.eval(&mut ctx)?;
            dot = crate::script::expr::align_up_u64(dot, align.max(1));
        }

        let start = dot;
        let mut rule_cursor = 0usize;
        let mut any_section_placed = false;

        for stmt in &body {
            match stmt {
                SectionBodyStatement::InputSection(_) => {
                    let rule_id = rule_ids[rule_cursor];
                    rule_cursor += 1;
                    let flattened = session
                        .rules
                        .get_mut(rule_id)
                        .sort_and_flatten(&session.sections);
                    for section_id in flattened {
                        place_input_section(
                            session,
                            output_id,
                            section_id,
                            &mut dot,
                            &mut any_section_placed,
                        )?;
                    }
                }
                SectionBodyStatement::Assignment(assign) => {
                    let rhs = {
                        let mut ctx = LayoutEvalContext {
                            dot,
                            symbols: &mut symbols,
                            sections: &placed,
                            regions: &session.memory_regions,
                            max_page_size: session.options.max_page_size,
                            common_page_size: session.options.common_page_size,
                        };
                        assign.value.eval(&mut ctx)?
                    };
                    let current = if assign.name == "." {
                        dot
                    } else {
                        symbols.get(&assign.name).copied().unwrap_or(0)
                    };
                    let new_value = apply_assign_op(assign.op, current, rhs);
                    if assign.name == "." {
                        dot = new_value;
                    } else {
                        let already_defined = session
                            .names
                            .get_by_name(&assign.name)
                            .map(|id| session.names.get(id).desc == crate::model::symbol::Desc::Defined)
                            .unwrap_or(false);
                        resolver::apply_scripted_assignment(&mut session.names, &assign.name, assign.wrapper, new_value);
                        let should_set = match assign.wrapper {
                            AssignWrapper::Provide | AssignWrapper::ProvideHidden => !already_defined,
                            AssignWrapper::None | AssignWrapper::Hidden => true,
                        };
                        if should_set {
                            symbols.insert(assign.name.clone(), new_value);
                        }
                    }
                }
                SectionBodyStatement::Data { width,.. } => {
                    dot += *width as u64;
                }
                SectionBodyStatement::Fill(_) => {}
            }
        }

        let size = dot - start;

        let load_start = if let Some(at_expr) = &prolog.at {
            let mut ctx = LayoutEvalContext {
                dot,
                symbols: &mut symbols,
                sections: &placed,
                regions: &session.memory_regions,
                max_page_size: session.options.max_page_size,
                common_page_size: session.options.common_page_size,
            };
            at_expr.eval(&mut ctx)?
        } else if let Some(region_name) = &epilog.at_region {
            region_cursor(session, region_name).unwrap_or(start)
        } else {
            start
        };

        {
            let entry = session.outputs.get_mut(output_id);
            entry.address = Some(start);
            entry.load_address = Some(load_start);
            entry.size = size;
        }

        if let Some(region_name) = &epilog.region {
            advance_region(session, region_name, size)?;
        }
        if let Some(region_name) = &epilog.at_region {
            advance_region(session, region_name, size)?;
        }

        for phdr_name in &epilog.phdrs {
            if let Some(segment_id) = find_segment_id(session, phdr_name) {
                let flags = section_segment_flags(session.outputs.get(output_id).flags);
                session.segments.get_mut(segment_id).sections.push(output_id);
                session.segments.get_mut(segment_id).merge_flags(flags);
                session.outputs.get_mut(output_id).segment = Some(segment_id);
            }
        }

        let entry = session.outputs.get(output_id);
        placed.insert(
            entry.name.clone(),
            PlacedSection {
                address: start,
                load_address: load_start,
                size,
                alignment: entry.alignment,
            },
        );
    }

    Ok(())
}

fn place_input_section(
    session: &mut LinkerSession,
    output_id: OutputSectionId,
    section_id: SectionId,
    dot: &mut u64,
    any_section_placed: &mut bool,
) -> Result<(), Diag> {
    let (sec_flags, sec_kind, sec_align, is_dead, sec_name) = {
        let section = session.sections.get(section_id);
        (
            section.flags,
            section.kind,
            section.alignment,
            section.is_dead(),
            section.name.clone(),
        )
    };
    if is_dead {
        return Ok(());
    }

    *dot = crate::script::expr::align_up_u64(*dot, sec_align.max(1));
    let section_addr = *dot;
    let sec_size = place_fragments(session, section_id);
    {
        let section = session.sections.get_mut(section_id);
        section.address = Some(section_addr);
        section.output_section = Some(output_id);
    }
    *dot += sec_size;

    let prior_flags = session
        .outputs
        .get_mut(output_id)
        .merge_section(sec_flags, sec_kind, sec_align);
    if *any_section_placed && prior_flags != sec_flags && !session.options.no_warn_mismatch {
        session.diagnostics.emit(Diag::ConflictingSectionFlags {
                section: sec_name,
                first: prior_flags.bits(),
                second: sec_flags.bits(),
        });
    }
    *any_section_placed = true;
    Ok(())
}

/// Assign every one of `section_id`'s fragments a section-relative
/// `unaligned_offset`, in fragment-list order: `offset = align_up(., frag.alignment);
/// . += frag.size`, with `.` here a cursor local to the section rather than the
/// global location counter. Returns the cursor's final value (this section's total
/// size including inter-fragment alignment padding), which
/// [`Section::total_fragment_size`] deliberately does not account for.
fn place_fragments(session: &mut LinkerSession, section_id: SectionId) -> u64 {
    let fragment_ids = session.sections.get(section_id).fragments.clone();
    let mut cursor: u32 = 0;
    for fragment_id in fragment_ids {
        let fragment = session.fragments.get_mut(fragment_id);
        let padded = crate::model::fragment::align_up(cursor, fragment.header.alignment);
        fragment.header.unaligned_offset = Some(cursor);
        cursor = padded + fragment.size() as u32;
    }
    cursor as u64
}

fn discard_rule_sections(session: &mut LinkerSession, output_id: OutputSectionId) {
    let rule_ids = session.outputs.get(output_id).rules.clone();
    for rule_id in rule_ids {
        let flattened = session
            .rules
            .get_mut(rule_id)
            .sort_and_flatten(&session.sections);
        for section_id in flattened {
            session.sections.get_mut(section_id).is_discarded = true;
        }
    }
}

/// Which common-symbol allocation policy a target uses : Hexagon
/// splits commons into `.scommon.{1,2,4,8}` accumulator sections keyed by
/// alignment; RISC-V folds every common symbol into a single `.bss`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommonAllocationTarget {
    /// `.scommon.1` / `.scommon.2` / `.scommon.4` / `.scommon.8`, bucketed by
    /// alignment
    Hexagon,
    /// A single `.bss`
    RiscV,
}

fn common_symbol_alignment(size: u64) -> u64 {
    match size {
        0..=1 => 1,
        2 => 2,
        3..=4 => 4,
        _ => 8,
    }
}

fn find_or_create_bss_like_section(
    session: &mut LinkerSession,
    name: &str,
    alignment: u64,
    hex_gprel: bool,
) -> SectionId {
    for (id, section) in session.sections.iter() {
        if section.name == name {
            return id;
        }
    }
    let mut flags = SectionFlags::ALLOC | SectionFlags::WRITE;
    if hex_gprel {
        flags |= SectionFlags::HEX_GPREL;
    }
    let mut section = Section::new(name, flags, SectionKind::NoBits);
    section.variant = crate::model::section::SectionVariant::Common;
    section.alignment = alignment;
    session.sections.push(section)
}

/// Materialize storage for every unresolved `Desc::Common` symbol : for
/// each, synthesize a zero-fill fragment sized/aligned to the symbol's common
/// size/alignment, append it to the target's common-storage section(s), and point
/// the symbol at the new fragment. Must run before [`assign_addresses`], since
/// address assignment only walks fragments already appended to a section via a
/// matched rule (and common-storage sections are matched like any other `.bss`-like
/// input section).
pub fn allocate_common_symbols(
    session: &mut LinkerSession,
    target: CommonAllocationTarget,
) -> Result<(), Diag> {
    let common_ids: Vec<SymbolId> = session
        .names
        .iter()
        .filter(|(_, info)| matches!(info.desc, crate::model::symbol::Desc::Common))
        .map(|(id, _)| id)
        .collect();

    for symbol_id in common_ids {
        let size = session.names.get(symbol_id).size.max(1);
        let alignment = common_symbol_alignment(size);
        let section_name = match target {
            CommonAllocationTarget::Hexagon => format!(".scommon.{alignment}"),
            CommonAllocationTarget::RiscV => ".bss".to_string(),
        };
        let hex_gprel = matches!(target, CommonAllocationTarget::Hexagon);
        let section_id = find_or_create_bss_like_section(session, &section_name, alignment, hex_gprel);

        let header = crate::model::fragment::FragmentHeader::new(section_id, alignment as u32);
        let fragment = crate::model::fragment::Fragment::new(
            header,
            crate::model::fragment::FragmentKind::Fillment {
                value: 0,
                size: size as u32,
            },
        );
        let fragment_id = session.fragments.push(fragment);

        {
            let section = session.sections.get_mut(section_id);
            section.fragments.push(fragment_id);
            section.alignment = section.alignment.max(alignment);
        }

        let info = session.names.get_mut(symbol_id);
        info.fragment = Some(fragment_id);
        info.desc = crate::model::symbol::Desc::Defined;
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod test {
    use super::*;
    use crate::config::GeneralOptions;
    use crate::model::symbol::Desc;

    fn session() -> LinkerSession {
        LinkerSession::new(GeneralOptions::builder().build())
    }

    #[test]
    fn find_or_insert_dedups_by_name() {
        let mut outputs: Arena<OutputSectionEntry> = Arena::new();
        let a = find_or_insert(&mut outputs, ".text", 0);
        let b = find_or_insert(&mut outputs, ".text", 1);
        assert_eq!(a, b);
        assert_eq!(outputs.len(), 1);
    }

    #[test]
    fn build_from_script_populates_memory_and_outputs() {
        let mut session = session();
        let diags = crate::diag::Diagnostics::new(false, false);
        let src = "MEMORY { RAM (rwx) : ORIGIN = 0x1000, LENGTH = 0x1000 } \
            SECTIONS {.text : { *(.text) } }";
        let mut parser = crate::script::Parser::new("t.ld", src, &diags);
        let script = parser.parse(|_| None);
        assert!(diags.is_empty());

        build_from_script(&mut session, &script).unwrap();
        assert_eq!(session.memory_regions.len(), 1);
        assert_eq!(session.outputs.len(), 1);
        assert_eq!(session.rules.len(), 1);
        let (_, region) = session.memory_regions.iter().next().unwrap();
        assert_eq!(region.origin, 0x1000);
        assert_eq!(region.length, 0x1000);
    }

    #[test]
    fn assign_addresses_places_matched_section_and_advances_dot() {
        use crate::input::{Input, InputAttributes, InputFile};
        use crate::model::section::{Section, SectionFlags, SectionKind};
        use crate::script::ast::{InputSectDesc, SectionPattern, SortPolicy};
        use crate::script::ast::KeepPolicy;

        let mut session = session();
        let section_id = session.sections.push({
                let mut s = Section::new(".text", SectionFlags::ALLOC, SectionKind::ProgBits);
                s.alignment = 4;
                s
        });
        let frag = crate::model::fragment::Fragment::new(
            crate::model::fragment::FragmentHeader::new(section_id, 4),
            crate::model::fragment::FragmentKind::Fillment { value: 0, size: 16 },
        );
        let frag_id = session.fragments.push(frag);
        session.sections.get_mut(section_id).fragments.push(frag_id);

        let mut input = Input::new("a.o", 0, InputAttributes::empty());
        input.file = Some(InputFile::ObjectFile {
                sections: vec![section_id],
        });
        session.inputs.push(input);

        let desc = InputSectDesc {
            keep: KeepPolicy::NoKeep,
            file_pattern: "*".to_string(),
            member_pattern: None,
            is_archive: false,
            exclude_files: Vec::new(),
            sections: vec![SectionPattern {
                    pattern: ".text".to_string(),
                    sort: SortPolicy::None,
                    exclude_files: Vec::new(),
            }],
        };
        let mut prolog = SectionProlog::default();
        prolog.vma = Some(crate::script::expr::Expr::Number(0x1000));
        let output_id = find_or_insert(&mut session.outputs, ".text", 0);
        session.outputs.get_mut(output_id).prolog = prolog;
        let rule_id = session
            .rules
            .push(crate::rule::RuleContainer::new(output_id, desc.clone(), 0));
        session.outputs.get_mut(output_id).rules.push(rule_id);
        session
            .outputs
            .get_mut(output_id)
            .body
            .push(SectionBodyStatement::InputSection(desc));
        session.rules.get_mut(rule_id).append(0, section_id);

        assign_addresses(&mut session).unwrap();

        assert_eq!(session.outputs.get(output_id).address, Some(0x1000));
        assert_eq!(session.outputs.get(output_id).size, 16);
        assert_eq!(session.sections.get(section_id).address, Some(0x1000));
    }

    #[test]
    fn allocate_common_symbols_splits_hexagon_by_alignment() {
        let mut session = session();
        let one = session.names.intern("small");
        session.names.get_mut(one).size = 1;
        session.names.get_mut(one).desc = Desc::Common;
        let eight = session.names.intern("big");
        session.names.get_mut(eight).size = 64;
        session.names.get_mut(eight).desc = Desc::Common;

        allocate_common_symbols(&mut session, CommonAllocationTarget::Hexagon).unwrap();

        assert!(session
                .sections
                .iter()
                .any(|(_, s)| s.name == ".scommon.1"));
        assert!(session
                .sections
                .iter()
                .any(|(_, s)| s.name == ".scommon.8"));
        assert_eq!(session.names.get(one).desc, Desc::Defined);
        assert!(session.names.get(eight).fragment.is_some());
        assert!(session
                .sections
                .iter()
                .find(|(_, s)| s.name == ".scommon.1")
                .unwrap()
                .1
                .flags
                .contains(SectionFlags::HEX_GPREL));
    }

    #[test]
    fn allocate_common_symbols_merges_into_single_bss_for_riscv() {
        let mut session = session();
        let a = session.names.intern("a");
        session.names.get_mut(a).size = 4;
        session.names.get_mut(a).desc = Desc::Common;
        let b = session.names.intern("b");
        session.names.get_mut(b).size = 4;
        session.names.get_mut(b).desc = Desc::Common;

        allocate_common_symbols(&mut session, CommonAllocationTarget::RiscV).unwrap();

        let bss_count = session.sections.iter().filter(|(_, s)| s.name == ".bss").count();
        assert_eq!(bss_count, 1);
    }

    #[test]
    fn provide_binds_an_undefined_symbol_during_address_assignment() {
        let mut session = session();
        let diags = crate::diag::Diagnostics::new(false, false);
        let src = "SECTIONS { .text : { PROVIDE(foo = 0x1); } }";
        let mut parser = crate::script::Parser::new("t.ld", src, &diags);
        let script = parser.parse(|_| None);
        assert!(diags.is_empty());

        build_from_script(&mut session, &script).unwrap();
        assign_addresses(&mut session).unwrap();

        let id = session.names.get_by_name("foo").unwrap();
        assert_eq!(session.names.get(id).desc, Desc::Defined);
        assert_eq!(session.names.get(id).value, Some(1));
    }

    #[test]
    fn provide_leaves_an_already_defined_symbol_untouched() {
        let mut session = session();
        let foo = session.names.intern("foo");
        session.names.get_mut(foo).desc = Desc::Defined;
        session.names.get_mut(foo).value = Some(0xABC);

        let diags = crate::diag::Diagnostics::new(false, false);
        let src = "SECTIONS { .text : { PROVIDE(foo = 0x1); } }";
        let mut parser = crate::script::Parser::new("t.ld", src, &diags);
        let script = parser.parse(|_| None);
        assert!(diags.is_empty());

        build_from_script(&mut session, &script).unwrap();
        assign_addresses(&mut session).unwrap();

        assert_eq!(session.names.get(foo).value, Some(0xABC));
    }
}
