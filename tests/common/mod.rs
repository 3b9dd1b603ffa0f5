//! Builders for PACK archives used across the integration tests.

#![allow(dead_code)]

use std::io::Write;
use tempfile::NamedTempFile;

/// Lay out an archive: header, contents in order, then the index.
pub fn build_pack(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut content = Vec::new();
    let mut records = Vec::new();
    for (name, data) in files {
        records.push((name.as_bytes().to_vec(), 12 + content.len() as u32, data.len() as u32));
        content.extend_from_slice(data);
    }
    assemble(&content, &records)
}

/// Header plus `content` at offset 12 plus an index of explicit records.
pub fn assemble(content: &[u8], records: &[(Vec<u8>, u32, u32)]) -> Vec<u8> {
    let index_offset = 12 + content.len() as u32;
    let index_size = (records.len() * 64) as u32;

    let mut out = Vec::new();
    out.extend_from_slice(b"PACK");
    out.extend_from_slice(&index_offset.to_le_bytes());
    out.extend_from_slice(&index_size.to_le_bytes());
    out.extend_from_slice(content);
    for (name, offset, size) in records {
        let mut raw = [0u8; 64];
        raw[..name.len()].copy_from_slice(name);
        raw[56..60].copy_from_slice(&offset.to_le_bytes());
        raw[60..64].copy_from_slice(&size.to_le_bytes());
        out.extend_from_slice(&raw);
    }
    out
}

/// The small archive most tests work with.
pub fn sample_pack() -> Vec<u8> {
    build_pack(&[
        ("readme.txt", &b"abcdefgh"[..]),
        ("maps/e1m1.bsp", &b"\x1d\x00\x00\x00BSPDATA"[..]),
        ("sound/empty.wav", &b""[..]),
        ("progs.dat", &b"0123456789"[..]),
    ])
}

pub fn write_temp(data: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp archive");
    file.write_all(data).expect("write temp archive");
    file.flush().expect("flush temp archive");
    file
}
