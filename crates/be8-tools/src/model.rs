use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;

use be8_rs::memory::{image_from_slice, Image, MEM_SIZE};

/// Reads a raw image file. Shorter files are zero padded.
pub fn load_image(path: &Path) -> Result<Image> {
    let file = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    image_from_slice(&file).with_context(|| {
        format!("{} is {} bytes, an image holds at most {}", path.display(), file.len(), MEM_SIZE)
    })
}

/// Reads assembly source from `path`, or from stdin when no path is given.
pub fn load_source(path: Option<&Path>) -> Result<String> {
    match path {
        Some(p) => std::fs::read_to_string(p).with_context(|| format!("reading {}", p.display())),
        None => read_source(std::io::stdin().lock()).context("reading stdin"),
    }
}

pub fn read_source<R: Read>(mut reader: R) -> Result<String> {
    let mut src = String::new();
    reader.read_to_string(&mut src)?;
    Ok(src)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loader_pads_short_images() {
        let cwd = std::env::current_dir().unwrap();
        let path = cwd.join("_test_short.bin");
        std::fs::write(&path, [0x14u8, 0x25, 0x50]).unwrap();
        let img = load_image(&path).unwrap();
        assert_eq!(&img[..3], &[0x14, 0x25, 0x50]);
        assert!(img[3..].iter().all(|&b| b == 0));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn source_reads_from_any_reader() {
        let src = read_source("LDI 5\nOUT\nHLT\n".as_bytes()).unwrap();
        assert_eq!(be8_rs::assemble(&src).unwrap().bytes(), &[0x75, 0x50, 0xF0]);
    }

    #[test]
    fn source_reads_from_file_when_given() {
        let cwd = std::env::current_dir().unwrap();
        let path = cwd.join("_test_src.asm");
        std::fs::write(&path, "HLT ; stop\n").unwrap();
        assert_eq!(load_source(Some(&path)).unwrap(), "HLT ; stop\n");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn loader_rejects_oversized_images() {
        let cwd = std::env::current_dir().unwrap();
        let path = cwd.join("_test_big.bin");
        std::fs::write(&path, [0u8; 17]).unwrap();
        assert!(load_image(&path).is_err());
        let _ = std::fs::remove_file(&path);
    }
}
