pub mod bingo;
pub mod catalog;
pub mod generator;
pub mod interpreter;
pub mod rand;
pub mod situation;

#[cfg(test)]
pub(crate) mod test_support;
