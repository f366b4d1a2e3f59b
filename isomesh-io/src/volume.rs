//! TIFF image-stack volume loading
//!
//! A volume is a directory of single-plane TIFF slices with identical
//! geometry, ordered by filename. Only the first file's header is parsed;
//! every slice's pixel plane is then read at the same offset. Slice reads
//! go to disjoint slabs of one contiguous buffer, so they run in parallel.

use byteorder::{BigEndian, ByteOrder, LittleEndian, ReadBytesExt};
use isomesh_core::{Error, Result};
use rayon::prelude::*;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

const TIFF_MAGIC: u16 = 42;

const TAG_IMAGE_WIDTH: u16 = 0x0100;
const TAG_IMAGE_LENGTH: u16 = 0x0101;
const TAG_BITS_PER_SAMPLE: u16 = 0x0102;
const TAG_COMPRESSION: u16 = 0x0103;
const TAG_STRIP_OFFSETS: u16 = 0x0111;

const FIELD_TYPE_SHORT: u16 = 3;
const COMPRESSION_NONE: u32 = 1;

/// A dense voxel volume with 8- or 16-bit unsigned samples
#[derive(Debug, Clone)]
pub struct Volume {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub bits_per_voxel: u32,
    voxels: Vec<u8>,
}

impl Volume {
    /// Load a volume from a directory of TIFF slices
    ///
    /// Slices are ordered by filename. Samples wider than one byte are
    /// converted to host byte order on load.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let files = find_slice_files(path.as_ref())?;
        if files.is_empty() {
            return Err(Error::InvalidData(format!(
                "no TIFF slices found in {}",
                path.as_ref().display()
            )));
        }

        let file = File::open(&files[0])?;
        let mut reader = BufReader::new(file);

        let mut order = [0u8; 2];
        reader.read_exact(&mut order)?;
        let (layout, native_order) = match &order {
            b"II" => (
                parse_header::<LittleEndian, _>(&mut reader)?,
                cfg!(target_endian = "little"),
            ),
            b"MM" => (
                parse_header::<BigEndian, _>(&mut reader)?,
                cfg!(target_endian = "big"),
            ),
            _ => {
                return Err(Error::UnsupportedFormat(
                    "unsupported TIFF byte order".to_string(),
                ))
            }
        };
        drop(reader);

        if layout.width == 0 || layout.height == 0 {
            return Err(Error::InvalidData(
                "TIFF image has invalid dimensions".to_string(),
            ));
        }
        if layout.compression != COMPRESSION_NONE {
            return Err(Error::Unsupported(
                "compressed TIFF slices are not supported".to_string(),
            ));
        }
        if layout.bits_per_sample != 8 && layout.bits_per_sample != 16 {
            return Err(Error::Unsupported(format!(
                "{} bits per sample",
                layout.bits_per_sample
            )));
        }

        let depth = files.len() as u32;
        let bytes_per_voxel = (layout.bits_per_sample / 8) as usize;
        let slice_len = layout.width as usize * layout.height as usize * bytes_per_voxel;
        log::debug!(
            "loading {} slices of {}x{} at {} bits per voxel",
            depth,
            layout.width,
            layout.height,
            layout.bits_per_sample
        );

        let mut voxels = vec![0u8; slice_len * files.len()];
        voxels
            .par_chunks_mut(slice_len)
            .zip(files.par_iter())
            .try_for_each(|(slab, file)| -> Result<()> {
                let mut reader = File::open(file)?;
                reader.seek(SeekFrom::Start(layout.data_offset))?;
                reader.read_exact(slab)?;
                Ok(())
            })?;

        if !native_order && bytes_per_voxel > 1 {
            for sample in voxels.chunks_exact_mut(2) {
                sample.swap(0, 1);
            }
        }

        Ok(Self {
            width: layout.width,
            height: layout.height,
            depth,
            bits_per_voxel: layout.bits_per_sample,
            voxels,
        })
    }

    /// Fetch the sample at a lattice point, promoted losslessly to `f32`
    pub fn sample(&self, x: u32, y: u32, z: u32) -> f32 {
        let index = x as usize + self.width as usize * (y as usize + self.height as usize * z as usize);
        match self.bits_per_voxel {
            8 => self.voxels[index] as f32,
            _ => {
                let bytes = &self.voxels[index * 2..index * 2 + 2];
                u16::from_ne_bytes([bytes[0], bytes[1]]) as f32
            }
        }
    }

    /// A sampling closure over this volume's lattice
    pub fn sampler(&self) -> impl Fn(u32, u32, u32) -> f32 + '_ {
        move |x, y, z| self.sample(x, y, z)
    }

    /// Raw sample bytes in host order, row-major by slice
    pub fn voxel_bytes(&self) -> &[u8] {
        &self.voxels
    }
}

/// Geometry and pixel-data location shared by every slice of a stack.
struct SliceLayout {
    width: u32,
    height: u32,
    bits_per_sample: u32,
    compression: u32,
    data_offset: u64,
}

/// TIFF files in the volume directory, ordered by filename. A file path is
/// accepted too and stands for its parent directory.
fn find_slice_files(path: &Path) -> Result<Vec<PathBuf>> {
    if !path.exists() {
        return Err(Error::InvalidData(format!(
            "volume path {} not found",
            path.display()
        )));
    }
    let dir = if path.is_dir() {
        path
    } else {
        path.parent().unwrap_or(Path::new("."))
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry_path = entry?.path();
        let is_tiff = matches!(
            entry_path.extension().and_then(|e| e.to_str()),
            Some("tif") | Some("tiff")
        );
        if is_tiff && entry_path.is_file() {
            files.push(entry_path);
        }
    }
    files.sort();
    Ok(files)
}

/// Parse the header and first image file directory of a TIFF whose byte
/// order mark has already been consumed.
fn parse_header<E: ByteOrder, R: Read + Seek>(reader: &mut R) -> Result<SliceLayout> {
    let magic = reader.read_u16::<E>()?;
    if magic != TIFF_MAGIC {
        return Err(Error::InvalidData("invalid TIFF magic number".to_string()));
    }

    let ifd_offset = reader.read_u32::<E>()?;
    reader.seek(SeekFrom::Start(ifd_offset as u64))?;

    let entry_count = reader.read_u16::<E>()?;
    let mut entries = Vec::with_capacity(entry_count as usize);
    for _ in 0..entry_count {
        let tag = reader.read_u16::<E>()?;
        let field_type = reader.read_u16::<E>()?;
        let count = reader.read_u32::<E>()?;
        let mut value = [0u8; 4];
        reader.read_exact(&mut value)?;
        entries.push((tag, field_type, count, value));
    }

    let mut layout = SliceLayout {
        width: 0,
        height: 0,
        bits_per_sample: 0,
        compression: COMPRESSION_NONE,
        data_offset: 8,
    };

    for (tag, field_type, count, value) in entries {
        // Values are left-justified within the four-byte field; SHORT
        // entries occupy only its first two bytes.
        let value = if field_type == FIELD_TYPE_SHORT {
            E::read_u16(&value[..2]) as u32
        } else {
            E::read_u32(&value)
        };

        match tag {
            TAG_IMAGE_WIDTH => layout.width = value,
            TAG_IMAGE_LENGTH => layout.height = value,
            TAG_BITS_PER_SAMPLE => layout.bits_per_sample = value,
            TAG_COMPRESSION => layout.compression = value,
            TAG_STRIP_OFFSETS => {
                if count == 1 {
                    layout.data_offset = value as u64;
                } else {
                    // Multiple strips: the pixel plane starts at the first.
                    reader.seek(SeekFrom::Start(value as u64))?;
                    layout.data_offset = reader.read_u32::<E>()? as u64;
                }
            }
            _ => {}
        }
    }

    Ok(layout)
}
