#![allow(dead_code)]

pub mod bingo_helpers;
pub mod utils;
