//! Definitions for ELF Files

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic, missing_docs)]

use error::Error;
use header::elf::{
    identification::{
        ElfClass, ElfDataEncoding, ElfHeaderIdentifier, ElfOSABI, ELF_CLASS_DEFAULT,
        ELF_DATA_ENCODING_DEFAULT,
    },
    ElfHeader, ElfMachine,
};
use std::{
    collections::HashSet,
    io::{Read, Seek, SeekFrom, Write},
};
use typed_builder::TypedBuilder;

pub mod arch;
pub mod base;
pub mod buildid;
pub mod config;
pub mod diag;
pub mod driver;
pub mod dynamic;
pub mod error;
pub mod header;
pub mod input;
pub mod layout;
pub mod model;
pub mod os;
pub mod plugin;
pub mod relax;
pub mod relocation;
pub mod reproduce;
pub mod resolver;
pub mod rule;
pub mod script;
pub mod session;

#[macro_export]
/// Add the ability to convert a primitive to an enum
macro_rules! from_primitive {
    (
        $(#[$enum_attr:meta])*
        $(visibility:vis)? enum $enum_name:ident <$(const $trait_param:ident : $trait_bound:tt),*> {
            $(
                $(#[$variant_attr:meta])*
                $variant_name:ident = $variant_value:expr,
            )*
        }
    ) => {
        $(#[$enum_attr])*
        pub enum $enum_name <$(const $trait_param : $trait_bound),*> {
            $(
                $(#[$variant_attr])*
                $variant_name = $variant_value,
            )*
        }

        impl <$(const $trait_param : $trait_bound),*> num_traits::FromPrimitive for $enum_name <$($trait_param),*> {
            fn from_i64(n: i64) -> Option<Self> {
                match n {
                    $(
                        $variant_value => Some($enum_name::$variant_name),
                    )*
                    _ => None,
                }
            }

            fn from_u64(n: u64) -> Option<Self> {
                match n {
                    $(
                        $variant_value => Some($enum_name::$variant_name),
                    )*
                    _ => None,
                }
            }
        }
    };
}

/// Decode an owned instance of a type from a reader
pub trait FromReader<R>
where
    R: Read + Seek,
    Self: Sized,
{
    /// The error type for this operation
    type Error;

    /// Decode an instance of this type from a reader
    fn from_reader_with(reader: &mut R, config: &mut Config) -> Result<Self, Self::Error>;

    /// Decode an instance of this type from a reader
    fn from_reader(reader: &mut R) -> Result<Self, Self::Error> {
        Self::from_reader_with(reader, &mut Config::default())
    }
}

/// Encode an instance of a type to a writer
pub trait ToWriter<W>
where
    W: Write,
    Self: Sized,
{
    /// The error type for this operation
    type Error;

    /// Encode an instance of this type to a writer
    fn to_writer(&self, writer: &mut W) -> Result<(), Self::Error>;
}

/// A type which always has a known size when written to a writer
pub trait HasWrittenSize {
    /// The size when written
    const SIZE: usize;
}

/// Attempt to convert a value from one type to another type, possibly
/// fallibly, and use a configuration
pub trait TryFromWithConfig<T>: Sized {
    /// The error type
    type Error;

    /// Try to convert from value with `config`
    fn try_from_with(value: T, config: &mut Config) -> Result<Self, Self::Error>;
}

#[derive(Debug, Default, TypedBuilder)]
/// A configuration for the object file handler. Primarily configures errors which should
/// be ignored.
pub struct Config {
    #[builder(default = ElfClass::default())]
    /// The default class to use if no valid class is found
    default_class: ElfClass,
    #[builder(default = ElfDataEncoding::default())]
    /// The default data encoding to use if no valid class is found
    default_encoding: ElfDataEncoding,
    #[builder(setter(into))]
    /// Ignored errors. Each error is handled somewhat differently when it is ignored,
    /// and the implementation for each is located where the error would have been raised.
    /// For example, an invalid data encoding may be inferred from the machine field.
    ignore: HashSet<Error>,
    #[builder(default, setter(into, strip_option))]
    /// The machine type of the ELF object currently being decoded
    machine: Option<ElfMachine<ELF_CLASS_DEFAULT, ELF_DATA_ENCODING_DEFAULT>>,
    #[builder(default, setter(into, strip_option))]
    /// The OS ABI of the ELF object currently being decoded
    os_abi: Option<ElfOSABI>,
}

impl Config {
    pub(crate) fn default_elf_kind<R>(&mut self, reader: &mut R) -> Result<ElfKind, Error>
    where
        R: Read + Seek,
    {
        match (self.default_class, self.default_encoding) {
            (ElfClass::Elf32, ElfDataEncoding::LittleEndian) => {
                Ok(ElfKind::Elf32LE(Elf::<
                    { ElfClass::ELF_CLASS_32 },
                    { ElfDataEncoding::ELF_DATA_ENCODING_LITTLE_ENDIAN },
                >::from_reader_with(
                    reader, self
                )?))
            }
            (ElfClass::Elf32, ElfDataEncoding::BigEndian) => {
                Ok(ElfKind::Elf32LE(Elf::<
                    { ElfClass::ELF_CLASS_32 },
                    { ElfDataEncoding::ELF_DATA_ENCODING_LITTLE_ENDIAN },
                >::from_reader_with(
                    reader, self
                )?))
            }
            (ElfClass::Elf64, ElfDataEncoding::LittleEndian) => {
                Ok(ElfKind::Elf32LE(Elf::<
                    { ElfClass::ELF_CLASS_32 },
                    { ElfDataEncoding::ELF_DATA_ENCODING_LITTLE_ENDIAN },
                >::from_reader_with(
                    reader, self
                )?))
            }
            (ElfClass::Elf64, ElfDataEncoding::BigEndian) => {
                Ok(ElfKind::Elf32LE(Elf::<
                    { ElfClass::ELF_CLASS_32 },
                    { ElfDataEncoding::ELF_DATA_ENCODING_LITTLE_ENDIAN },
                >::from_reader_with(
                    reader, self
                )?))
            }
            (c, e) => Err(Error::InvalidClassEncodingPair {
                class: c,
                encoding: e,
            }),
        }
    }
}

#[derive(Debug, Clone)]
/// An ELF object file
pub struct Elf<const EC: u8, const ED: u8> {
    /// The ELF object file header
    pub header: ElfHeader<EC, ED>,
}

impl<R, const EC: u8, const ED: u8> FromReader<R> for Elf<EC, ED>
where
    R: Read + Seek,
{
    type Error = Error;

    fn from_reader_with(reader: &mut R, config: &mut Config) -> Result<Self, Self::Error> {
        Ok(Self {
            header: ElfHeader::<EC, ED>::from_reader_with(reader, config)?,
        })
    }
}

#[derive(Debug, Clone)]
/// An ELF object file which may be of any class or any data encoding
pub enum ElfKind {
    /// A 32-bit, Little Endian ELF object file
    Elf32LE(Elf<{ ElfClass::Elf32 as u8 }, { ElfDataEncoding::LittleEndian as u8 }>),
    /// A 32-bit, Big Endian ELF object file
    Elf32BE(Elf<{ ElfClass::Elf32 as u8 }, { ElfDataEncoding::BigEndian as u8 }>),
    /// A 64-bit, Little Endian ELF object file
    Elf64LE(Elf<{ ElfClass::Elf64 as u8 }, { ElfDataEncoding::LittleEndian as u8 }>),
    /// A 64-bit, Big Endian ELF object file
    Elf64BE(Elf<{ ElfClass::Elf64 as u8 }, { ElfDataEncoding::BigEndian as u8 }>),
}

impl<R> FromReader<R> for ElfKind
where
    R: Read + Seek,
{
    type Error = Error;

    fn from_reader_with(reader: &mut R, config: &mut Config) -> Result<Self, Self::Error> {
        reader
            .seek(SeekFrom::Start(0))
            .map_err(|e| Error::Io { kind: e.kind() })?;

        let ident = ElfHeaderIdentifier::from_reader_with(reader, config)?;

        reader
            .seek(SeekFrom::Start(0))
            .map_err(|e| Error::Io { kind: e.kind() })?;

        match (ident.class, ident.data_encoding) {
            (ElfClass::Elf32, ElfDataEncoding::LittleEndian) => {
                Ok(Self::Elf32LE(Elf::<
                    { ElfClass::Elf32 as u8 },
                    { ElfDataEncoding::LittleEndian as u8 },
                >::from_reader_with(
                    reader, config
                )?))
            }
            (ElfClass::Elf32, ElfDataEncoding::BigEndian) => Ok(Self::Elf32BE(Elf::<
                { ElfClass::Elf32 as u8 },
                { ElfDataEncoding::BigEndian as u8 },
            >::from_reader_with(
                reader, config
            )?)),
            (ElfClass::Elf64, ElfDataEncoding::LittleEndian) => {
                Ok(Self::Elf64LE(Elf::<
                    { ElfClass::Elf64 as u8 },
                    { ElfDataEncoding::LittleEndian as u8 },
                >::from_reader_with(
                    reader, config
                )?))
            }
            (ElfClass::Elf64, ElfDataEncoding::BigEndian) => Ok(Self::Elf64BE(Elf::<
                { ElfClass::Elf64 as u8 },
                { ElfDataEncoding::BigEndian as u8 },
            >::from_reader_with(
                reader, config
            )?)),
            (ElfClass::None, e) => {
                let err = Error::InvalidClassEncodingPair {
                    class: ElfClass::None,
                    encoding: e,
                };

                if config.ignore.contains(&err) {
                    config.default_elf_kind(reader)
                } else {
                    Err(err)
                }
            }
            (c, ElfDataEncoding::None) => {
                let err = Error::InvalidClassEncodingPair {
                    class: c,
                    encoding: ElfDataEncoding::None,
                };

                if config.ignore.contains(&err) {
                    config.default_elf_kind(reader)
                } else {
                    Err(err)
                }
            }
        }
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod test {
    use super::*;

    fn minimal_elf64_le() -> Vec<u8> {
        let mut bytes = vec![0u8; ElfHeader::<
            { ElfClass::Elf64 as u8 },
            { ElfDataEncoding::LittleEndian as u8 },
        >::SIZE];
        bytes[0..4].copy_from_slice(&[0x7f, 0x45, 0x4c, 0x46]);
        bytes[4] = ElfClass::Elf64 as u8;
        bytes[5] = ElfDataEncoding::LittleEndian as u8;
        bytes[6] = 1; // identifier version, current
        bytes[7] = ElfOSABI::NoneSystemV as u8;
        bytes[16..18].copy_from_slice(&(2u16).to_le_bytes()); // e_type: executable
        bytes[18..20].copy_from_slice(&(62u16).to_le_bytes()); // e_machine: x86_64
        bytes[20..24].copy_from_slice(&(1u32).to_le_bytes()); // e_version: current
        bytes[52..54].copy_from_slice(
            &(ElfHeader::<
                { ElfClass::Elf64 as u8 },
                { ElfDataEncoding::LittleEndian as u8 },
            >::SIZE as u16)
                .to_le_bytes(),
        );
        bytes
    }

    #[test]
    fn test_elf_kind_detects_class_and_encoding() {
        let mut bytes = minimal_elf64_le();
        let kind = ElfKind::from_reader(&mut std::io::Cursor::new(&mut bytes)).unwrap();
        assert!(matches!(kind, ElfKind::Elf64LE(_)));
    }

    #[test]
    fn test_elf_kind_rejects_bad_magic() {
        let mut bytes = minimal_elf64_le();
        bytes[0] = 0x00;
        let result = ElfKind::from_reader(&mut std::io::Cursor::new(&mut bytes));
        assert!(result.is_err());
    }

    #[test]
    fn test_config_ignores_configured_errors() {
        let mut bytes = minimal_elf64_le();
        bytes[4] = ElfClass::None as u8;
        let mut config = Config::builder()
            .default_class(ElfClass::Elf64)
            .default_encoding(ElfDataEncoding::LittleEndian)
            .ignore([Error::InvalidClassEncodingPair {
                class: ElfClass::None,
                encoding: ElfDataEncoding::LittleEndian,
            }])
            .build();
        let kind =
            ElfKind::from_reader_with(&mut std::io::Cursor::new(&mut bytes), &mut config).unwrap();
        assert!(matches!(kind, ElfKind::Elf32LE(_)));
    }
}
