//! On-disk format of persisted indexes.
//!
//! An index file is the dataset's magic bytes, `0xFF` padding up to a 16-byte
//! boundary, then the rkyv archive. Files are memory-mapped and accessed
//! without deserialization.
use std::fs::{self, File, Metadata};
use std::io::{Read, Write};
use std::ops::Deref;
use std::path::{Path, PathBuf};

use memmap2::Mmap;
use rkyv::api::high::{HighSerializer, HighValidator};
use rkyv::bytecheck::CheckBytes;
use rkyv::rancor::Error;
use rkyv::ser::allocator::ArenaHandle;
use rkyv::util::AlignedVec;
use rkyv::{access, access_unchecked, Archive, Serialize};
use sha2::{Digest, Sha256};
use log::warn;
use tempfile::NamedTempFile;

use crate::errors::{PitchdicError, Result};

const RKYV_ALIGNMENT: usize = 16;

/// Validation strategy used when opening a persisted index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Default)]
pub enum LoadMode {
    /// Perform validation on every load. (Safest)
    #[default]
    Validate,
    /// Skip validation if a pre-computed hash matches. (Fastest for repeated loads)
    TrustCache,
}

// Owns the memory backing an archived index.
#[allow(dead_code)]
enum IndexBuffer {
    Mmap(Mmap),
    Aligned(AlignedVec<RKYV_ALIGNMENT>),
}

/// A read-only index accessed in place from its file.
pub struct MappedIndex<T>
where
    T: Archive,
    T::Archived: 'static,
{
    _buffer: IndexBuffer,
    data: &'static T::Archived,
}

impl<T> Deref for MappedIndex<T>
where
    T: Archive,
    T::Archived: 'static,
{
    type Target = T::Archived;

    fn deref(&self) -> &Self::Target {
        self.data
    }
}

#[inline(always)]
const fn data_start(magic: &[u8]) -> usize {
    let len = magic.len();
    len + (RKYV_ALIGNMENT - len % RKYV_ALIGNMENT) % RKYV_ALIGNMENT
}

/// Serializes an index to a writer.
pub(crate) fn write_index<T, W>(value: &T, magic: &[u8], mut wtr: W) -> Result<()>
where
    T: for<'a> Serialize<HighSerializer<AlignedVec, ArenaHandle<'a>, Error>>,
    W: Write,
{
    wtr.write_all(magic)?;
    wtr.write_all(&vec![0xFF; data_start(magic) - magic.len()])?;

    let bytes = rkyv::to_bytes::<Error>(value).map_err(|e| {
        PitchdicError::invalid_state("rkyv serialization failed", e.to_string())
    })?;
    wtr.write_all(&bytes)?;
    Ok(())
}

/// Writes an index next to `path` and atomically moves it into place.
///
/// A concurrent reader observes either the old file or the complete new one.
pub(crate) fn persist_index<T>(value: &T, magic: &[u8], path: &Path) -> Result<()>
where
    T: for<'a> Serialize<HighSerializer<AlignedVec, ArenaHandle<'a>, Error>>,
{
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut temp_file = NamedTempFile::new_in(dir)?;
    write_index(value, magic, &mut temp_file)?;
    temp_file.as_file().sync_all()?;
    temp_file.persist(path)?;

    // The old hash no longer describes the file.
    let _ = fs::remove_file(hash_path(path));
    Ok(())
}

/// Opens a persisted index by memory-mapping it.
///
/// With [`LoadMode::TrustCache`], validation is skipped when a `.sha256` file
/// next to the index matches the index's metadata; otherwise the archive is
/// validated and the hash file is (re)written on success.
pub(crate) fn open_index<T>(path: &Path, magic: &[u8], mode: LoadMode) -> Result<MappedIndex<T>>
where
    T: Archive,
    T::Archived: 'static + for<'a> CheckBytes<HighValidator<'a, Error>>,
{
    let mut file = File::open(path).map_err(|e| {
        PitchdicError::invalid_argument("path", format!("Failed to open index file: {}", e))
    })?;
    let meta = file.metadata()?;

    let mut header = vec![0u8; magic.len()];
    file.read_exact(&mut header)?;
    if header != magic {
        return Err(PitchdicError::invalid_argument(
            "path",
            "The magic number of the index mismatches.",
        ));
    }

    let mmap = unsafe { Mmap::map(&file)? };

    let Some(data_bytes) = mmap.get(data_start(magic)..) else {
        return Err(PitchdicError::invalid_format(
            "path",
            "Index file too small or corrupted.",
        ));
    };

    let hash_path = hash_path(path);
    let current_hash = compute_metadata_hash(&meta);

    if mode == LoadMode::TrustCache
        && let Ok(cached_hash) = fs::read_to_string(&hash_path)
        && cached_hash == current_hash
    {
        let archived = unsafe { access_unchecked::<T::Archived>(data_bytes) };
        // SAFETY: the mapping is owned by the returned value and never remapped.
        let data: &'static T::Archived = unsafe { &*(archived as *const _) };
        return Ok(MappedIndex { _buffer: IndexBuffer::Mmap(mmap), data });
    }

    match access::<T::Archived, Error>(data_bytes) {
        Ok(archived) => {
            if mode == LoadMode::TrustCache {
                write_hash(&hash_path, &current_hash);
            }
            let data: &'static T::Archived = unsafe { &*(archived as *const _) };
            Ok(MappedIndex { _buffer: IndexBuffer::Mmap(mmap), data })
        }
        Err(_) => {
            let mut aligned_bytes = AlignedVec::with_capacity(data_bytes.len());
            aligned_bytes.extend_from_slice(data_bytes);

            let archived = access::<T::Archived, Error>(&aligned_bytes).map_err(|e| {
                PitchdicError::invalid_state(
                    "rkyv validation failed. The index file may be corrupted or incompatible.",
                    e.to_string(),
                )
            })?;
            // SAFETY: AlignedVec ensures correct alignment and is owned by the returned value.
            let data: &'static T::Archived = unsafe { &*(archived as *const _) };
            Ok(MappedIndex { _buffer: IndexBuffer::Aligned(aligned_bytes), data })
        }
    }
}

// The hash file only speeds up later loads; the index stays usable without it.
fn write_hash(hash_path: &Path, hash: &str) {
    if let Err(e) = fs::write(hash_path, hash) {
        warn!("[pitchdic] Failed to write {}: {}", hash_path.display(), e);
    }
}

/// Gets the path of the hash file accompanying an index.
pub(crate) fn hash_path(path: &Path) -> PathBuf {
    let mut s = path.as_os_str().to_owned();
    s.push(".sha256");
    PathBuf::from(s)
}

#[inline(always)]
pub(crate) fn compute_metadata_hash(meta: &Metadata) -> String {
    let mut hasher = Sha256::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        hasher.update(meta.dev().to_le_bytes());
        hasher.update(meta.ino().to_le_bytes());
        hasher.update(meta.size().to_le_bytes());
        hasher.update(meta.mtime().to_le_bytes());
        hasher.update(meta.mtime_nsec().to_le_bytes());
    }

    #[cfg(not(unix))]
    {
        use std::time::SystemTime;

        hasher.update(meta.len().to_le_bytes());
        match meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(SystemTime::UNIX_EPOCH).ok())
        {
            Some(duration) => {
                hasher.update(duration.as_secs().to_le_bytes());
                hasher.update(duration.subsec_nanos().to_le_bytes());
            }
            None => hasher.update([0u8; 12]),
        }
    }

    hex::encode(hasher.finalize())
}
