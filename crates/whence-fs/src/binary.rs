//! Content probes: ELF `PT_INTERP` and `#!` lines.
//!
//! The ELF reader understands just enough of the format to find the program
//! header table: both classes, both byte orders, no section headers.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use crate::{Error, Result};

const ELF_MAGIC: &[u8; 4] = b"\x7fELF";
const PT_INTERP: u32 = 3;
const MAX_INTERP_LEN: u64 = 4096;
const MAX_SHEBANG_LEN: u64 = 4096;
const MAX_PHDR_TABLE: u64 = 1 << 20;

#[derive(Clone, Copy)]
enum Class {
    Elf32,
    Elf64,
}

#[derive(Clone, Copy)]
enum Endian {
    Little,
    Big,
}

impl Endian {
    fn u16(self, b: &[u8]) -> u16 {
        let raw = [b[0], b[1]];
        match self {
            Self::Little => u16::from_le_bytes(raw),
            Self::Big => u16::from_be_bytes(raw),
        }
    }

    fn u32(self, b: &[u8]) -> u32 {
        let raw = [b[0], b[1], b[2], b[3]];
        match self {
            Self::Little => u32::from_le_bytes(raw),
            Self::Big => u32::from_be_bytes(raw),
        }
    }

    fn u64(self, b: &[u8]) -> u64 {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&b[..8]);
        match self {
            Self::Little => u64::from_le_bytes(raw),
            Self::Big => u64::from_be_bytes(raw),
        }
    }
}

struct ProgramHeaders {
    class:   Class,
    endian:  Endian,
    offset:  u64,
    entsize: u64,
    count:   u64,
}

impl ProgramHeaders {
    fn parse(ident_and_header: &[u8], path: &Path) -> Result<Option<Self>> {
        if ident_and_header.len() < 16 || &ident_and_header[..4] != ELF_MAGIC {
            return Ok(None);
        }
        let malformed = |reason| Error::MalformedElf {
            path: path.to_path_buf(),
            reason,
        };

        let class = match ident_and_header[4] {
            1 => Class::Elf32,
            2 => Class::Elf64,
            _ => return Err(malformed("unknown class")),
        };
        let endian = match ident_and_header[5] {
            1 => Endian::Little,
            2 => Endian::Big,
            _ => return Err(malformed("unknown byte order")),
        };

        let h = ident_and_header;
        let (offset, entsize, count) = match class {
            Class::Elf64 => {
                if h.len() < 64 {
                    return Err(malformed("truncated header"));
                }
                (endian.u64(&h[0x20..]), endian.u16(&h[0x36..]), endian.u16(&h[0x38..]))
            }
            Class::Elf32 => {
                if h.len() < 52 {
                    return Err(malformed("truncated header"));
                }
                (
                    u64::from(endian.u32(&h[0x1c..])),
                    endian.u16(&h[0x2a..]),
                    endian.u16(&h[0x2c..]),
                )
            }
        };

        let min_entsize = match class {
            Class::Elf64 => 56,
            Class::Elf32 => 32,
        };
        if count > 0 && u64::from(entsize) < min_entsize {
            return Err(malformed("program header entry too small"));
        }

        Ok(Some(Self {
            class,
            endian,
            offset,
            entsize: u64::from(entsize),
            count: u64::from(count),
        }))
    }

    /// `(p_type, p_offset, p_filesz)` of one entry.
    fn entry(&self, raw: &[u8]) -> (u32, u64, u64) {
        let e = self.endian;
        match self.class {
            Class::Elf64 => (e.u32(raw), e.u64(&raw[8..]), e.u64(&raw[32..])),
            Class::Elf32 => (
                e.u32(raw),
                u64::from(e.u32(&raw[4..])),
                u64::from(e.u32(&raw[16..])),
            ),
        }
    }
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn read_prefix(file: &mut File, path: &Path, limit: u64) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    file.by_ref()
        .take(limit)
        .read_to_end(&mut buf)
        .map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(buf)
}

/// Returns the `PT_INTERP` path of an ELF executable.
///
/// `Ok(None)` for files that are not ELF or carry no interpreter (static
/// binaries). Truncated or inconsistent headers are an error.
pub fn elf_interpreter(path: &Path) -> Result<Option<String>> {
    let mut file = open(path)?;
    let header = read_prefix(&mut file, path, 64)?;
    let Some(phdrs) = ProgramHeaders::parse(&header, path)? else {
        return Ok(None);
    };
    if phdrs.count == 0 {
        return Ok(None);
    }

    let table_len = phdrs.entsize.saturating_mul(phdrs.count);
    if table_len > MAX_PHDR_TABLE {
        return Err(Error::MalformedElf {
            path: path.to_path_buf(),
            reason: "program header table too large",
        });
    }

    let read_err = |source| Error::Read {
        path: path.to_path_buf(),
        source,
    };
    file.seek(SeekFrom::Start(phdrs.offset)).map_err(read_err)?;
    let table = read_prefix(&mut file, path, table_len)?;
    if (table.len() as u64) < table_len {
        return Err(Error::MalformedElf {
            path: path.to_path_buf(),
            reason: "truncated program header table",
        });
    }

    for raw in table.chunks_exact(phdrs.entsize as usize) {
        let (p_type, p_offset, p_filesz) = phdrs.entry(raw);
        if p_type != PT_INTERP {
            continue;
        }
        file.seek(SeekFrom::Start(p_offset)).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let bytes = read_prefix(&mut file, path, p_filesz.min(MAX_INTERP_LEN))?;
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        let interp = String::from_utf8_lossy(&bytes[..end]).into_owned();
        return Ok((!interp.is_empty()).then_some(interp));
    }

    Ok(None)
}

/// Returns the text after `#!` on the first line, verbatim apart from the
/// line terminator.
pub fn shebang(path: &Path) -> Result<Option<String>> {
    let mut file = open(path)?;
    let head = read_prefix(&mut file, path, MAX_SHEBANG_LEN)?;
    let Some(rest) = head.strip_prefix(b"#!") else {
        return Ok(None);
    };

    let line_end = rest.iter().position(|&b| b == b'\n').unwrap_or(rest.len());
    let line = rest[..line_end].strip_suffix(b"\r").unwrap_or(&rest[..line_end]);
    Ok((!line.is_empty()).then(|| String::from_utf8_lossy(line).into_owned()))
}

/// Whether the file starts with the ELF magic.
pub fn is_elf(path: &Path) -> Result<bool> {
    let mut file = open(path)?;
    let head = read_prefix(&mut file, path, 4)?;
    Ok(head.as_slice() == ELF_MAGIC)
}
