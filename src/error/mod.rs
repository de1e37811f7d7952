//! Error types for ELF object file handling and for the linker core built on top of it.

use std::io::{Read, Seek, SeekFrom};

use typed_builder::TypedBuilder;

use crate::{
    base::ElfByte,
    header::elf::{
        identification::{ElfClass, ElfDataEncoding, ELF_CLASS_DEFAULT, ELF_DATA_ENCODING_DEFAULT},
        ElfMachine,
    },
};

#[derive(Debug, Clone, PartialEq, Eq, Hash, TypedBuilder)]
/// Byte-level location of a decoding error, used to point diagnostics back at the
/// offending bytes.
pub struct ErrorContext {
    #[builder(default)]
    /// Byte offset within the stream where the erroring value begins
    pub offset: u64,
    #[builder(default)]
    /// Number of bytes the erroring value occupies
    pub size: usize,
}

impl ErrorContext {
    /// Build a context from the reader's current position, stepping back `size` bytes
    /// (the value was just read and rejected).
    pub fn from_reader<R>(reader: &mut R, size: usize) -> Result<Self, std::io::Error>
    where
        R: Read + Seek,
    {
        let pos = reader.stream_position()?;
        Ok(Self {
            offset: pos.saturating_sub(size as u64),
            size,
        })
    }

    /// Build a context at an explicit offset from the start of the stream, restoring
    /// the reader's prior position afterward.
    pub fn from_reader_at<R>(reader: &mut R, offset: u64, size: usize) -> Result<Self, Error>
    where
        R: Read + Seek,
    {
        let prior = reader.stream_position().map_err(Error::from)?;
        reader
            .seek(SeekFrom::Start(offset))
            .map_err(Error::from)?;
        reader.seek(SeekFrom::Start(prior)).map_err(Error::from)?;
        Ok(Self { offset, size })
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq, Hash)]
/// Error type for errors during ELF object handling
pub enum Error {
    /// An I/O error occurred while reading or writing an ELF object
    #[error("An I/O error occurred: {kind}")]
    Io {
        /// The kind of I/O error
        kind: std::io::ErrorKind,
    },
    /// Invalid value for ELF Class
    #[error("Invalid value {} for ELF Class", class.0)]
    InvalidClass {
        /// The invalid byte
        class: ElfByte,
    },
    /// Invalid value for ELF Data Encoding
    #[error("Invalid value {} for ELF Data Encoding", encoding.0)]
    InvalidDataEncoding {
        /// The invalid byte
        encoding: ElfByte,
    },
    /// Invalid value {value} for ELF Class
    #[error("Invalid value {value} for ELF Class")]
    InvalidElfClass {
        /// The invalid value
        value: u8,
    },
    /// Invalid value {value} for ELF Data Encoding
    #[error("Invalid value {value} for ELF Data Encoding")]
    InvalidElfDataEncoding {
        /// The invalid value
        value: u8,
    },
    /// Invalid pairing of class and data encoding
    #[error("Invalid pairing of ELF class {class:?} and data encoding {encoding:?}")]
    InvalidClassEncodingPair {
        /// The class
        class: ElfClass,
        /// The data encoding
        encoding: ElfDataEncoding,
    },
    /// Invalid value {elf_class}/{elf_data_encoding} for class/encoding
    #[error(
        "Invalid value {elf_class} for ELF Class or {elf_data_encoding} for ELF Data Encoding"
    )]
    InvalidElfClassOrDataEncoding {
        /// The invalid class byte
        elf_class: u8,
        /// The invalid data encoding byte
        elf_data_encoding: u8,
    },
    /// Invalid value for ELF Identifier Version
    #[error("Invalid value {} for ELF Identifier Version", version.0)]
    InvalidIdentifierVersion {
        /// The invalid byte
        version: ElfByte,
    },
    /// Invalid value {value} for ELF Identifier Version
    #[error("Invalid value {value} for ELF Identifier Version")]
    InvalidElfIdentifierVersion {
        /// The invalid value
        value: u8,
    },
    /// Invalid value for ELF OS ABI
    #[error("Invalid value {} for ELF OS ABI", os_abi.0)]
    InvalidOsAbi {
        /// The invalid byte
        os_abi: ElfByte,
    },
    /// Invalid value {value} for ELF OS ABI
    #[error("Invalid value {value} for ELF OS ABI")]
    InvalidElfOsAbi {
        /// The invalid value
        value: u8,
    },
    /// A compile-time (const generic) class parameter did not correspond to a known class
    #[error("Invalid const generic ELF class parameter: {class}")]
    InvalidConstantClass {
        /// The invalid const generic value
        class: u8,
    },
    /// A compile-time (const generic) data encoding parameter did not correspond to a
    /// known data encoding
    #[error("Invalid const generic ELF data encoding parameter: {encoding}")]
    InvalidConstantDataEncoding {
        /// The invalid const generic value
        encoding: u8,
    },
    /// Invalid ELF object type
    #[error("Invalid ELF object type at {context:?}")]
    InvalidType {
        /// The location of the error
        context: ErrorContext,
    },
    /// Invalid ELF machine
    #[error("Invalid ELF machine at {context:?}")]
    InvalidMachine {
        /// The location of the error
        context: ErrorContext,
    },
    /// Invalid ELF object version
    #[error("Invalid ELF object version at {context:?}")]
    InvalidVersion {
        /// The location of the error
        context: ErrorContext,
    },
    /// Invalid compression header type
    #[error("Invalid ELF compression header type at {context:?}")]
    InvalidCompressionHeaderType {
        /// The location of the error
        context: ErrorContext,
    },
    /// Invalid section header type
    #[error("Invalid ELF section header type at {context:?}")]
    InvalidElfSectionHeaderType {
        /// The location of the error
        context: ErrorContext,
    },
    /// Invalid section header flags
    #[error("Invalid ELF section header flags at {context:?}")]
    InvalidElfSectionHeaderFlags {
        /// The location of the error
        context: ErrorContext,
    },
    /// A header flag value did not correspond to any known flag for `machine`
    #[error("Invalid header flag value {value:#x} for machine {machine:?}")]
    InvalidHeaderFlagForMachine {
        /// The machine the flags were being decoded for
        machine: Option<ElfMachine<ELF_CLASS_DEFAULT, ELF_DATA_ENCODING_DEFAULT>>,
        /// The raw flags value
        value: u32,
    },
    /// A machine-specific section header type was decoded against the wrong machine
    #[error("Section header type {value:#x} is not valid for machine {machine:?}, expected one of {expected_machines:?}")]
    InvalidMachineForSectionHeaderType {
        /// The machine actually configured
        machine: Option<ElfMachine<ELF_CLASS_DEFAULT, ELF_DATA_ENCODING_DEFAULT>>,
        /// The machines this section header type is valid for
        expected_machines: Vec<ElfMachine<ELF_CLASS_DEFAULT, ELF_DATA_ENCODING_DEFAULT>>,
        /// The raw value
        value: u32,
    },
    /// A machine-specific section header type value was not recognized
    #[error("Invalid section header type {value:#x} for machine {machine:?}")]
    InvalidSectionHeaderType {
        /// The machine the type was being decoded for
        machine: Option<ElfMachine<ELF_CLASS_DEFAULT, ELF_DATA_ENCODING_DEFAULT>>,
        /// The raw value
        value: u32,
    },
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io { kind: e.kind() }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
