//! Structures for various header types in the ELF object file format

pub mod compression;
pub mod elf;
pub mod program;
pub mod section;
