use bytes::Bytes;
use chrono::NaiveDate;
use std::collections::HashSet;
use std::io::{Cursor, Write};
use vignette_core::model::Term;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// One file of a pack archive.
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    /// Illustration id, used to disambiguate duplicate names.
    pub id: i64,
    pub name: String,
    pub data: Bytes,
}

/// Builds a deflated zip archive. Blocking; call from `spawn_blocking`.
///
/// Entries sharing a name after the first are stored as `{id}-{name}`, or
/// `{id}-{n}-{name}` when that is taken as well. Emitted names are unique.
pub fn build_zip(entries: Vec<ArchiveEntry>) -> zip::result::ZipResult<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let mut seen = HashSet::new();
    for entry in entries {
        let mut name = entry.name.clone();
        let mut attempt = 0u32;
        while !seen.insert(name.clone()) {
            attempt += 1;
            name = match attempt {
                1 => format!("{}-{}", entry.id, entry.name),
                n => format!("{}-{n}-{}", entry.id, entry.name),
            };
        }
        writer.start_file(name, options)?;
        writer.write_all(&entry.data)?;
    }

    Ok(writer.finish()?.into_inner())
}

/// `pack-{slug}-{id}-{YYYYMMDD}.zip`
pub fn pack_archive_name(pack: &Term, date: NaiveDate) -> String {
    format!("pack-{}-{}-{}.zip", pack.slug, pack.id, date.format("%Y%m%d"))
}
