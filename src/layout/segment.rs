//! Program header segments : the groupings of output
//! sections that become `p_type`/`p_flags`/`p_vaddr`/... entries in the final image.

use crate::diag::Diag;
use crate::session::OutputSectionId;

/// Recognized `PT_*` segment types, plus the target-specific `PT_RISCV_ATTRIBUTES`
/// and a numeric escape hatch for anything else a script names directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhdrType {
    /// `PT_NULL`
    Null,
    /// `PT_LOAD`
    Load,
    /// `PT_DYNAMIC`
    Dynamic,
    /// `PT_INTERP`
    Interp,
    /// `PT_NOTE`
    Note,
    /// `PT_PHDR`
    Phdr,
    /// `PT_TLS`
    Tls,
    /// `PT_GNU_EH_FRAME`
    GnuEhFrame,
    /// `PT_GNU_STACK`
    GnuStack,
    /// `PT_GNU_RELRO`
    GnuRelro,
    /// `PT_RISCV_ATTRIBUTES`
    RiscvAttributes,
    /// A raw numeric `p_type` given directly in the script
    Raw(u32),
}

impl PhdrType {
    /// The raw ELF `p_type` value.
    pub fn value(self) -> u32 {
        match self {
            PhdrType::Null => 0,
            PhdrType::Load => 1,
            PhdrType::Dynamic => 2,
            PhdrType::Interp => 3,
            PhdrType::Note => 4,
            PhdrType::Phdr => 6,
            PhdrType::Tls => 7,
            PhdrType::GnuEhFrame => 0x6474_e550,
            PhdrType::GnuStack => 0x6474_e551,
            PhdrType::GnuRelro => 0x6474_e552,
            PhdrType::RiscvAttributes => 0x7000_0003,
            PhdrType::Raw(v) => v,
        }
    }

    /// Resolve a `PHDRS` type keyword (or a raw numeric literal) to a [`PhdrType`].
    pub fn parse(text: &str, file: &str, line: u32) -> Result<Self, Diag> {
        Ok(match text {
                "PT_NULL" => PhdrType::Null,
                "PT_LOAD" => PhdrType::Load,
                "PT_DYNAMIC" => PhdrType::Dynamic,
                "PT_INTERP" => PhdrType::Interp,
                "PT_NOTE" => PhdrType::Note,
                "PT_PHDR" => PhdrType::Phdr,
                "PT_TLS" => PhdrType::Tls,
                "PT_GNU_EH_FRAME" => PhdrType::GnuEhFrame,
                "PT_GNU_STACK" => PhdrType::GnuStack,
                "PT_GNU_RELRO" => PhdrType::GnuRelro,
                "PT_RISCV_ATTRIBUTES" => PhdrType::RiscvAttributes,
                other => {
                    if let Ok(v) = other.parse::<u32>() {
                        PhdrType::Raw(v)
                    } else {
                        return Err(Diag::InvalidPhdrType {
                                file: file.to_string(),
                                line,
                                type_name: other.to_string(),
                        });
                    }
                }
        })
    }
}

bitflags::bitflags! {
    /// `p_flags`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct SegmentFlags: u32 {
        /// `PF_X`
        const EXEC = 0x1;
        /// `PF_W`
        const WRITE = 0x2;
        /// `PF_R`
        const READ = 0x4;
    }
}

/// One program header segment, assembled from a `PHDRS` declaration (or the
/// implicit default segments synthesized when no `PHDRS` command is present).
#[derive(Debug, Clone)]
pub struct Segment {
    /// The `PHDRS` entry name, referenced by `:name` in section epilogs
    pub name: String,
    /// `p_type`
    pub phdr_type: PhdrType,
    /// `p_flags`, the union of every contained output section's permissions
    pub flags: SegmentFlags,
    /// `FILEHDR`: include the ELF header in this segment
    pub filehdr: bool,
    /// `PHDRS`: include the program header table in this segment
    pub phdrs_kw: bool,
    /// Explicit `AT(expr)` load address, if given
    pub at: Option<u64>,
    /// Assigned `p_vaddr`; `None` until address assignment runs
    pub vaddr: Option<u64>,
    /// Assigned `p_paddr`
    pub paddr: Option<u64>,
    /// `p_filesz`
    pub filesz: u64,
    /// `p_memsz`
    pub memsz: u64,
    /// `p_align`
    pub align: u64,
    /// Output sections contained in this segment, in declaration order
    pub sections: Vec<OutputSectionId>,
}

impl Segment {
    /// A fresh, unplaced segment.
    pub fn new(name: impl Into<String>, phdr_type: PhdrType) -> Self {
        Self {
            name: name.into(),
            phdr_type,
            flags: SegmentFlags::empty(),
            filehdr: false,
            phdrs_kw: false,
            at: None,
            vaddr: None,
            paddr: None,
            filesz: 0,
            memsz: 0,
            align: 0,
            sections: Vec::new(),
        }
    }

    /// Widen this segment's flags to include `section_flags`, per the "union of
    /// flags" rule used when multiple output sections share a segment.
    pub fn merge_flags(&mut self, section_flags: SegmentFlags) {
        self.flags |= section_flags;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod test {
    use super::*;

    #[test]
    fn parses_known_phdr_types() {
        assert_eq!(PhdrType::parse("PT_LOAD", "t.ld", 1).unwrap(), PhdrType::Load);
        assert_eq!(PhdrType::parse("PT_GNU_STACK", "t.ld", 1).unwrap().value(), 0x6474_e551);
    }

    #[test]
    fn parses_raw_numeric_type() {
        assert_eq!(PhdrType::parse("42", "t.ld", 1).unwrap(), PhdrType::Raw(42));
    }

    #[test]
    fn unknown_type_is_invalid() {
        assert!(matches!(
                PhdrType::parse("PT_BOGUS", "t.ld", 1),
                Err(Diag::InvalidPhdrType {.. })
        ));
    }

    #[test]
    fn merge_flags_unions_permissions() {
        let mut seg = Segment::new("text", PhdrType::Load);
        seg.merge_flags(SegmentFlags::READ);
        seg.merge_flags(SegmentFlags::EXEC);
        assert!(seg.flags.contains(SegmentFlags::READ | SegmentFlags::EXEC));
        assert!(!seg.flags.contains(SegmentFlags::WRITE));
    }
}
