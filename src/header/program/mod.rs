//! Implementation of the ELF program header. An array of these, pointed to by the
//! ELF header's `program_header_offset`, describes the segments the loader maps at
//! run time.

use std::io::{Read, Seek, Write};

use num_traits::FromPrimitive;
use typed_builder::TypedBuilder;

use crate::{
    base::{ElfAddress, ElfOffset, ElfWord},
    error::{Error, ErrorContext},
    from_primitive, Config, FromReader, HasWrittenSize, ToWriter,
};

from_primitive! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    #[non_exhaustive]
    /// The kind of segment a program header describes
    enum ElfProgramHeaderType<const EC: u8, const ED: u8> {
        /// Unused entry
        Null = 0,
        /// Loadable segment
        Load = 1,
        /// Dynamic linking information
        Dynamic = 2,
        /// Interpreter path
        Interp = 3,
        /// Auxiliary information
        Note = 4,
        /// Reserved, unspecified semantics
        Shlib = 5,
        /// Segment containing the program header table itself
        Phdr = 6,
        /// Thread-local storage template
        Tls = 7,
        /// GNU-specific: indicates stack executability
        GnuStack = 0x6474e551,
        /// GNU-specific: read-only after relocation
        GnuRelro = 0x6474e552,
        /// GNU-specific: `.eh_frame_hdr` segment
        GnuEhFrame = 0x6474e550,
        /// GNU-specific: properties read by the loader
        GnuProperty = 0x6474e553,
    }
}

impl<R, const EC: u8, const ED: u8> FromReader<R> for ElfProgramHeaderType<EC, ED>
where
    R: Read + Seek,
{
    type Error = Error;

    fn from_reader_with(reader: &mut R, config: &mut Config) -> Result<Self, Self::Error> {
        let ty = ElfWord::<EC, ED>::from_reader_with(reader, config)?;

        Self::from_u32(ty.0).ok_or(Error::InvalidType {
            context: ErrorContext::from_reader(reader, std::mem::size_of::<ElfWord<EC, ED>>())
                .map_err(Error::from)?,
        })
    }
}

impl<W, const EC: u8, const ED: u8> ToWriter<W> for ElfProgramHeaderType<EC, ED>
where
    W: Write,
{
    type Error = Error;

    fn to_writer(&self, writer: &mut W) -> Result<(), Self::Error> {
        ElfWord::<EC, ED>(*self as u32).to_writer(writer)
    }
}

impl<const EC: u8, const ED: u8> HasWrittenSize for ElfProgramHeaderType<EC, ED> {
    const SIZE: usize = std::mem::size_of::<ElfWord<EC, ED>>();
}

bitflags::bitflags! {
    /// Segment permission flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ElfProgramHeaderFlags: u32 {
        /// Segment is executable
        const EXECUTE = 0x1;
        /// Segment is writable
        const WRITE = 0x2;
        /// Segment is readable
        const READ = 0x4;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, TypedBuilder)]
/// An entry in the program header table, describing one segment
pub struct ElfProgramHeader<const EC: u8, const ED: u8> {
    /// The kind of segment this array element describes
    pub r#type: ElfProgramHeaderType<EC, ED>,
    /// Segment permission flags
    pub flags: ElfProgramHeaderFlags,
    /// Offset from the beginning of the file at which the first byte of the segment
    /// resides
    pub offset: ElfOffset<EC, ED>,
    /// Virtual address at which the first byte of the segment resides in memory
    pub virtual_address: ElfAddress<EC, ED>,
    /// Physical address of the segment, on systems for which physical addressing is
    /// relevant
    pub physical_address: ElfAddress<EC, ED>,
    /// Number of bytes in the file image of the segment; may be zero
    pub file_size: ElfWord<EC, ED>,
    /// Number of bytes in the memory image of the segment; may be zero
    pub memory_size: ElfWord<EC, ED>,
    /// Alignment for the segment in memory and in the file; 0 and 1 mean no
    /// alignment is required, otherwise a positive, integral power of two, with
    /// `virtual_address` congruent to `offset` modulo alignment
    pub alignment: ElfWord<EC, ED>,
}

impl<const EC: u8, const ED: u8> ElfProgramHeader<EC, ED> {
    /// True if `ElfProgramHeaderFlags::EXECUTE` and `ElfProgramHeaderFlags::WRITE` are
    /// both set. Such a segment is unusual and several loaders/verifiers reject it.
    pub fn is_write_execute(&self) -> bool {
        self.flags
            .contains(ElfProgramHeaderFlags::EXECUTE | ElfProgramHeaderFlags::WRITE)
    }
}

impl<R, const EC: u8, const ED: u8> FromReader<R> for ElfProgramHeader<EC, ED>
where
    R: Read + Seek,
{
    type Error = Error;

    fn from_reader_with(reader: &mut R, config: &mut Config) -> Result<Self, Self::Error> {
        let r#type = ElfProgramHeaderType::<EC, ED>::from_reader_with(reader, config)?;
        let flags = ElfProgramHeaderFlags::from_bits_truncate(
            ElfWord::<EC, ED>::from_reader_with(reader, config)?.0,
        );
        let offset = ElfOffset::<EC, ED>::from_reader_with(reader, config)?;
        let virtual_address = ElfAddress::<EC, ED>::from_reader_with(reader, config)?;
        let physical_address = ElfAddress::<EC, ED>::from_reader_with(reader, config)?;
        let file_size = ElfWord::<EC, ED>::from_reader_with(reader, config)?;
        let memory_size = ElfWord::<EC, ED>::from_reader_with(reader, config)?;
        let alignment = ElfWord::<EC, ED>::from_reader_with(reader, config)?;

        Ok(Self {
            r#type,
            flags,
            offset,
            virtual_address,
            physical_address,
            file_size,
            memory_size,
            alignment,
        })
    }
}

impl<W, const EC: u8, const ED: u8> ToWriter<W> for ElfProgramHeader<EC, ED>
where
    W: Write,
{
    type Error = Error;

    fn to_writer(&self, writer: &mut W) -> Result<(), Self::Error> {
        self.r#type.to_writer(writer)?;
        ElfWord::<EC, ED>(self.flags.bits()).to_writer(writer)?;
        self.offset.to_writer(writer)?;
        self.virtual_address.to_writer(writer)?;
        self.physical_address.to_writer(writer)?;
        self.file_size.to_writer(writer)?;
        self.memory_size.to_writer(writer)?;
        self.alignment.to_writer(writer)?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::header::elf::identification::{ElfClass, ElfDataEncoding};

    #[test]
    fn test_program_header_type_roundtrip() {
        let mut bytes_le = &[0x01, 0x00, 0x00, 0x00];
        let ty = ElfProgramHeaderType::<
            { ElfClass::Elf64 as u8 },
            { ElfDataEncoding::LittleEndian as u8 },
        >::from_reader(&mut std::io::Cursor::new(&mut bytes_le))
        .unwrap();
        assert_eq!(ty, ElfProgramHeaderType::Load);

        let mut out = Vec::new();
        ty.to_writer(&mut out).unwrap();
        assert_eq!(out, bytes_le);
    }

    #[test]
    fn test_program_header_flags() {
        let flags = ElfProgramHeaderFlags::READ | ElfProgramHeaderFlags::EXECUTE;
        assert!(!flags.contains(ElfProgramHeaderFlags::WRITE));
        assert!(!ElfProgramHeader::<
            { ElfClass::Elf64 as u8 },
            { ElfDataEncoding::LittleEndian as u8 },
        > {
            r#type: ElfProgramHeaderType::Load,
            flags,
            offset: ElfOffset(0),
            virtual_address: ElfAddress(0),
            physical_address: ElfAddress(0),
            file_size: ElfWord(0),
            memory_size: ElfWord(0),
            alignment: ElfWord(0),
        }
        .is_write_execute());
    }
}
