//! Architecture specific definitions for Qualcomm Hexagon (EM_QDSP6 / "Hexagon")

use num_derive::FromPrimitive;

use crate::base::ElfWord;

#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive)]
#[non_exhaustive]
/// Hexagon relocation types relevant to PLT/GOT synthesis and trampoline insertion.
/// Encodings follow the Hexagon ABI; only the subset the linker core acts on directly
/// is modeled, the same narrowing applied to other architectures' relocation-adjacent
/// enums (see [`crate::arch::riscv::ElfRelocationTypeRISCV`]).
pub enum ElfRelocationTypeHexagon {
    /// No relocation
    None = 0,
    /// 32-bit absolute address
    Abs32 = 6,
    /// 32-bit PC-relative, used by absolute trampoline stubs (pairs with
    /// [`ElfRelocationTypeHexagon::B22PcrelX`])
    B32PcrelX = 72,
    /// 22-bit PC-relative branch, shifted by 2
    B22Pcrel = 1,
    /// 22-bit PC-relative branch, "extended" (low half of a 32-bit pair)
    B22PcrelX = 73,
    /// 15-bit PC-relative branch, shifted by 2
    B15Pcrel = 2,
    /// 13-bit PC-relative branch, shifted by 2
    B13Pcrel = 3,
    /// 9-bit PC-relative branch, shifted by 2
    B9Pcrel = 4,
    /// 6-bit PC-relative, extended form used by PIC trampolines
    B6PcrelX = 53,
    /// GOT-relative low 16
    GotLo16 = 44,
    /// GOT-relative high 16
    GotHi16 = 45,
    /// PLT-relative B22, used for calls through the PLT
    PltB22Pcrel = 22,
    /// Copy relocation for a data symbol resolved against a dynamic object
    Copy = 26,
    /// Absolute address of a GOT slot, filled in at load time
    GlobDat = 27,
    /// PLT lazy-binding entry
    JmpSlot = 28,
    /// Load-time relative fixup for position-independent code
    Relative = 29,
}

impl ElfRelocationTypeHexagon {
    /// The branch relocations whose signed displacement can overflow its encoding and
    /// may require a trampoline, paired with the encoding's bit width (before the `<<2`
    /// scale).
    pub const fn branch_bits(self) -> Option<u32> {
        match self {
            Self::B22Pcrel | Self::B22PcrelX => Some(22),
            Self::B15Pcrel => Some(15),
            Self::B13Pcrel => Some(13),
            Self::B9Pcrel => Some(9),
            _ => None,
        }
    }
}

#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
/// Section Header Types specific to Hexagon
pub enum ElfSectionHeaderTypeHexagon {
    /// Hexagon ELF attributes (`.hexagon.attributes`)
    Attributes = Self::ATTRIBUTES,
}

impl ElfSectionHeaderTypeHexagon {
    /// `SHT_HEXAGON_ATTRIBUTES`
    pub const ATTRIBUTES: u32 = 0x70000003;
}

impl<const EC: u8, const ED: u8> From<ElfSectionHeaderTypeHexagon> for ElfWord<EC, ED> {
    fn from(value: ElfSectionHeaderTypeHexagon) -> Self {
        Self(value as u32)
    }
}

/// Special section indices reserved for sized common symbols (`SHN_HEXAGON_SCOMMON`
/// through `SHN_HEXAGON_SCOMMON_8`), used to split `.scommon` allocation by size per
/// the rule matcher's common-symbol handling.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum HexagonCommonSectionIndex {
    /// Generic small-common section index
    Scommon = 0xff00,
    /// 1-byte small-common
    Scommon1 = 0xff01,
    /// 2-byte small-common
    Scommon2 = 0xff02,
    /// 4-byte small-common
    Scommon4 = 0xff03,
    /// 8-byte small-common
    Scommon8 = 0xff04,
}

/// `DT_HEXAGON_VER`: tags the ABI version of a Hexagon dynamic object
pub const DT_HEXAGON_VER: u64 = 0x7000_0001;
/// Value eld writes into `DT_HEXAGON_VER`
pub const DT_HEXAGON_VER_VALUE: u64 = 3;
