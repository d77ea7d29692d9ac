#![allow(missing_docs)]

pub mod binning;
pub mod error;
