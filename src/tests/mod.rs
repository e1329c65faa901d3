#[cfg(test)]
pub mod common;
#[cfg(test)]
mod branch_search;
