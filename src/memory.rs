use serde::{Deserialize, Serialize};

pub const MEM_SIZE: usize = 16;

/// A full machine image: one packed byte per address.
pub type Image = [u8; MEM_SIZE];

/// The 16-byte store shared by code and data.
///
/// Addresses are 4 bits wide; anything above is masked off, so no access can
/// land outside the array.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Memory {
    cells: Image,
}

impl Memory {
    pub fn new(image: Image) -> Self {
        Self { cells: image }
    }

    pub fn read(&self, addr: u8) -> u8 {
        self.cells[usize::from(addr & 0x0F)]
    }

    pub fn write(&mut self, addr: u8, val: u8) {
        self.cells[usize::from(addr & 0x0F)] = val;
    }

    pub fn as_bytes(&self) -> &Image {
        &self.cells
    }
}

/// Pads a program shorter than the address space with zeroes.
pub fn image_from_slice(bytes: &[u8]) -> Option<Image> {
    if bytes.len() > MEM_SIZE {
        return None;
    }
    let mut img = [0u8; MEM_SIZE];
    img[..bytes.len()].copy_from_slice(bytes);
    Some(img)
}
