//! Raw memory images: an exact byte-for-byte copy of memory, with no header.

use std::{fs::File, io::{self, Read, Write}, path::Path};

/// Reads an image file into `memory`, starting at offset 0.
///
/// A file shorter than `memory` leaves the remaining bytes untouched, and a
/// longer one is truncated. Returns the number of bytes loaded.
pub fn load_image(path: impl AsRef<Path>, memory: &mut [u8]) -> io::Result<usize> {
    let mut bytes = Vec::with_capacity(memory.len());
    File::open(path)?
        .take(memory.len() as u64)
        .read_to_end(&mut bytes)?;

    memory[..bytes.len()].copy_from_slice(&bytes);
    Ok(bytes.len())
}

/// Writes the whole of `memory` to an image file, replacing any existing file.
pub fn dump_image(path: impl AsRef<Path>, memory: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(memory)?;
    file.flush()
}

#[cfg(test)]
mod test {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::{dump_image, load_image};

    #[test]
    fn test_dump_then_load() {
        let mut memory = [0u8; 64];
        for (i, byte) in memory.iter_mut().enumerate() {
            *byte = i as u8 ^ 0x5A;
        }

        let file = NamedTempFile::new().unwrap();
        dump_image(file.path(), &memory).unwrap();
        assert_eq!(std::fs::read(file.path()).unwrap(), memory.to_vec());

        let mut loaded = [0u8; 64];
        assert_eq!(load_image(file.path(), &mut loaded).unwrap(), 64);
        assert_eq!(loaded, memory);
    }

    #[test]
    fn test_short_image_keeps_tail() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&[1, 2, 3]).unwrap();

        let mut memory = [0xEE; 6];
        assert_eq!(load_image(file.path(), &mut memory).unwrap(), 3);
        assert_eq!(memory, [1, 2, 3, 0xEE, 0xEE, 0xEE]);
    }

    #[test]
    fn test_long_image_is_truncated() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&[9; 10]).unwrap();

        let mut memory = [0; 4];
        assert_eq!(load_image(file.path(), &mut memory).unwrap(), 4);
        assert_eq!(memory, [9; 4]);
    }

    #[test]
    fn test_missing_file() {
        let mut memory = [0; 4];
        assert!(load_image("/definitely/not/here.bin", &mut memory).is_err());
        assert_eq!(memory, [0; 4]);
    }
}
