pub extern crate toolchain_files;

#[macro_use]
mod macros;

pub mod frontend;
