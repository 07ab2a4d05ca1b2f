//! Protocol module

pub mod avbtp;
