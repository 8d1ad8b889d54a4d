pub mod bitpay;

pub use bitpay::{BitPayConfig, BitPayProvider};
