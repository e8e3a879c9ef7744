/*!
  The bit-addressable store: one flat byte buffer addressed by bit offset.

  Two access widths exist. Words are 32 bits, little-endian, and must begin on a bit offset
  divisible by 32. Symbols are 2 bits and must begin on an even bit offset whose two bits lie
  in one byte; within a byte, symbol slot `k` occupies bits `2k` and `2k + 1`, least
  significant first. Offsets arrive as `i64` because the device computes them in signed
  registers; a negative offset is simply out of bounds.

  The store never grows. Every access outside `[0, bits())` is a `Fault`.
*/

use crate::error::Fault;

pub const BITS_PER_BYTE    : usize = 8;
pub const BYTES_PER_WORD   : usize = 4;
pub const WORD_BITS        : usize = BITS_PER_BYTE * BYTES_PER_WORD;
pub const SYMBOL_BITS      : usize = 2;
pub const SYMBOLS_PER_BYTE : usize = BITS_PER_BYTE / SYMBOL_BITS;
/// Largest value a symbol may hold. The fourth 2-bit pattern is never a symbol.
pub const MAX_SYMBOL       : u8    = 2;

lazy_static! {
  /// `ISOLATE_MASKS[k]` keeps only symbol slot `k` of a byte.
  pub static ref ISOLATE_MASKS: [u8; SYMBOLS_PER_BYTE] =
    [0b0000_0011, 0b0000_1100, 0b0011_0000, 0b1100_0000];

  /// `ERASE_MASKS[k]` clears symbol slot `k` of a byte and keeps the rest.
  pub static ref ERASE_MASKS: [u8; SYMBOLS_PER_BYTE] = {
    let mut masks = [0u8; SYMBOLS_PER_BYTE];
    for (slot, mask) in masks.iter_mut().enumerate() {
      *mask = !ISOLATE_MASKS[slot];
    }
    masks
  };

  /// `PLACE_MASKS[s][k]` is symbol `s` already shifted into slot `k`.
  pub static ref PLACE_MASKS: [[u8; SYMBOLS_PER_BYTE]; MAX_SYMBOL as usize + 1] = {
    let mut masks = [[0u8; SYMBOLS_PER_BYTE]; MAX_SYMBOL as usize + 1];
    for (symbol, row) in masks.iter_mut().enumerate() {
      for (slot, mask) in row.iter_mut().enumerate() {
        *mask = (symbol as u8) << (slot * SYMBOL_BITS);
      }
    }
    masks
  };
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BitStore {
  bytes: Vec<u8>
}

impl BitStore {

  /// A zero-filled store of `len` bytes.
  pub fn new(len: usize) -> BitStore {
    BitStore { bytes: vec![0; len] }
  }

  pub fn from_bytes(bytes: Vec<u8>) -> BitStore {
    BitStore { bytes }
  }

  pub fn len(&self) -> usize {
    self.bytes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.bytes.is_empty()
  }

  /// Size of the store in bits, the exclusive upper bound of every offset.
  pub fn bits(&self) -> usize {
    self.bytes.len() * BITS_PER_BYTE
  }

  pub fn as_bytes(&self) -> &[u8] {
    &self.bytes
  }

  pub fn into_bytes(self) -> Vec<u8> {
    self.bytes
  }

  // region Word access

  pub fn read_word(&self, offset: i64) -> Result<u32, Fault> {
    let start = self.word_start(offset)?;
    let mut word = [0u8; BYTES_PER_WORD];
    word.copy_from_slice(&self.bytes[start..start + BYTES_PER_WORD]);
    Ok(u32::from_le_bytes(word))
  }

  pub fn write_word(&mut self, offset: i64, value: u32) -> Result<(), Fault> {
    let start = self.word_start(offset)?;
    self.bytes[start..start + BYTES_PER_WORD].copy_from_slice(&value.to_le_bytes());
    Ok(())
  }

  /// Byte index of the word at `offset`, after the alignment and bounds checks.
  fn word_start(&self, offset: i64) -> Result<usize, Fault> {
    self.check_bounds(offset, WORD_BITS)?;
    if offset % WORD_BITS as i64 != 0 {
      return Err(Fault::MisalignedWord(offset));
    }
    Ok(offset as usize / BITS_PER_BYTE)
  }

  // endregion

  // region Symbol access

  pub fn read_symbol(&self, offset: i64) -> Result<u8, Fault> {
    let (byte, slot) = self.symbol_position(offset)?;
    let symbol = (self.bytes[byte] & ISOLATE_MASKS[slot]) >> (slot * SYMBOL_BITS);
    if symbol > MAX_SYMBOL {
      return Err(Fault::InvalidSymbol { offset, value: symbol as i64 });
    }
    Ok(symbol)
  }

  pub fn write_symbol(&mut self, offset: i64, symbol: u8) -> Result<(), Fault> {
    let (byte, slot) = self.symbol_position(offset)?;
    if symbol > MAX_SYMBOL {
      return Err(Fault::InvalidSymbol { offset, value: symbol as i64 });
    }
    self.bytes[byte] = (self.bytes[byte] & ERASE_MASKS[slot]) | PLACE_MASKS[symbol as usize][slot];
    Ok(())
  }

  /// The byte holding the symbol at `offset` and the symbol's slot within that byte.
  fn symbol_position(&self, offset: i64) -> Result<(usize, usize), Fault> {
    self.check_bounds(offset, SYMBOL_BITS)?;
    let bit = offset as usize % BITS_PER_BYTE;
    if bit % SYMBOL_BITS != 0 || bit > BITS_PER_BYTE - SYMBOL_BITS {
      return Err(Fault::MisalignedSymbol(offset));
    }
    Ok((offset as usize / BITS_PER_BYTE, bit / SYMBOL_BITS))
  }

  // endregion

  fn check_bounds(&self, offset: i64, width: usize) -> Result<(), Fault> {
    match offset >= 0 && (offset as usize) + width <= self.bits() {
      true  => Ok(()),
      false => Err(Fault::OffsetOutOfBounds { offset, bits: self.bits() })
    }
  }

}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn words_are_little_endian(){
    let mut store = BitStore::new(8);
    store.write_word(32, 0x0403_0201).unwrap();
    assert_eq!(store.as_bytes(), &[0, 0, 0, 0, 1, 2, 3, 4]);
    assert_eq!(store.read_word(32).unwrap(), 0x0403_0201);
    assert_eq!(store.read_word(0).unwrap(), 0);
  }

  #[test]
  fn misaligned_word(){
    let mut store = BitStore::new(8);
    assert_eq!(store.read_word(8), Err(Fault::MisalignedWord(8)));
    assert_eq!(store.write_word(16, 1), Err(Fault::MisalignedWord(16)));
  }

  #[test]
  fn word_out_of_bounds(){
    let store = BitStore::new(8);
    assert_eq!(store.read_word(64), Err(Fault::OffsetOutOfBounds { offset: 64, bits: 64 }));
    assert_eq!(store.read_word(-32), Err(Fault::OffsetOutOfBounds { offset: -32, bits: 64 }));
  }

  #[test]
  fn symbols_leave_neighbours_alone(){
    let mut store = BitStore::new(2);
    for slot in 0..8 {
      store.write_symbol(slot * 2, (slot % 3) as u8).unwrap();
    }
    store.write_symbol(6, 2).unwrap();
    store.write_symbol(6, 1).unwrap();
    let read: Vec<u8> = (0..8).map(|slot| store.read_symbol(slot * 2).unwrap()).collect();
    assert_eq!(read, vec![0, 1, 2, 1, 1, 2, 0, 1]);
  }

  #[test]
  fn symbol_bit_order(){
    let mut store = BitStore::new(1);
    store.write_symbol(2, 1).unwrap();
    store.write_symbol(6, 2).unwrap();
    assert_eq!(store.as_bytes()[0], 0b1000_0100);
  }

  #[test]
  fn odd_symbol_offset(){
    let mut store = BitStore::new(1);
    assert_eq!(store.read_symbol(3), Err(Fault::MisalignedSymbol(3)));
    assert_eq!(store.write_symbol(5, 0), Err(Fault::MisalignedSymbol(5)));
  }

  #[test]
  fn bad_symbol_values(){
    let mut store = BitStore::from_bytes(vec![0b0000_0011]);
    assert_eq!(store.read_symbol(0), Err(Fault::InvalidSymbol { offset: 0, value: 3 }));
    assert_eq!(store.write_symbol(2, 3), Err(Fault::InvalidSymbol { offset: 2, value: 3 }));
    assert_eq!(store.write_symbol(8, 0), Err(Fault::OffsetOutOfBounds { offset: 8, bits: 8 }));
  }

}
