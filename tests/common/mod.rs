#![allow(dead_code)]

pub mod command;
pub mod file;

/// Current content of a working-tree file
pub fn read_file(dir: &std::path::Path, name: &str) -> String {
    std::fs::read_to_string(dir.join(name)).expect("Failed to read file")
}
