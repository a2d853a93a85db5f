//! Model representations.

pub mod gbdt;
