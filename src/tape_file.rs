//! Reading and writing a machine as its raw buffer. Files are read whole before a run and
//! written whole after one; nothing touches the file while the machine steps.

use std::fs;
use std::path::Path;

use log::info;

use crate::error::LoadError;
use crate::machine::Machine;

pub fn load<P: AsRef<Path>>(path: P) -> Result<Machine, LoadError> {
  let path = path.as_ref();
  let bytes = fs::read(path).map_err(|source| {
    LoadError::Io { path: path.to_path_buf(), source }
  })?;
  Machine::from_bytes(bytes)
}

pub fn save<P: AsRef<Path>>(path: P, machine: &Machine) -> Result<(), LoadError> {
  let path = path.as_ref();
  fs::write(path, machine.as_bytes()).map_err(|source| {
    LoadError::Io { path: path.to_path_buf(), source }
  })?;
  info!("saved {} bytes to {}", machine.as_bytes().len(), path.display());
  Ok(())
}


#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  use crate::interpreter::DEFAULT_MAX_STEPS;
  use crate::programs::Program;

  #[test]
  fn saved_machines_load_equal(){
    let directory = tempdir().unwrap();
    let path = directory.path().join("bb3.tape");

    let mut machine = Program::BusyBeaver3.build().unwrap();
    machine.run(DEFAULT_MAX_STEPS, true).unwrap();
    save(&path, &machine).unwrap();

    let loaded = load(&path).unwrap();
    assert_eq!(loaded, machine);
    assert!(loaded.is_halted().unwrap());
    assert_eq!(fs::metadata(&path).unwrap().len() as usize, machine.as_bytes().len());
  }

  #[test]
  fn loaded_machines_keep_running(){
    let directory = tempdir().unwrap();
    let path = directory.path().join("add1.tape");
    save(&path, &Program::Add1.build().unwrap()).unwrap();

    let mut machine = load(&path).unwrap();
    let outcome = machine.run(DEFAULT_MAX_STEPS, true).unwrap();
    assert_eq!(outcome.transitions(), 6);
  }

  #[test]
  fn missing_file(){
    let directory = tempdir().unwrap();
    let path = directory.path().join("absent.tape");
    match load(&path) {
      Err(LoadError::Io { path: reported, .. }) => assert_eq!(reported, path),
      other => panic!("expected an I/O error, got {:?}", other.map(|_| ()))
    }
  }

  #[test]
  fn truncated_file(){
    let directory = tempdir().unwrap();
    let path = directory.path().join("short.tape");
    let bytes = Program::Add1.build().unwrap().to_bytes();
    fs::write(&path, &bytes[..bytes.len() - 4]).unwrap();
    assert!(matches!(load(&path), Err(LoadError::LengthMismatch { .. })));

    fs::write(&path, &bytes[..2]).unwrap();
    assert!(matches!(load(&path), Err(LoadError::TooShort(2))));
  }

}
