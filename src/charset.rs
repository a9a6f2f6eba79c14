//! Common alphabets for charset-compressed `char` and `varchar` fields.
//!
//! A field declared with `{charset}` stores each character as its index in the
//! alphabet, using ⌈log₂(len)⌉ bits instead of a full 8-bit code.

pub const ALPHANUMERIC: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
pub const NUMERIC: &str = "0123456789";
pub const HEXADECIMAL: &str = "0123456789ABCDEF";
pub const ALPHA: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
pub const ALPHAUPPER: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const ALPHALOWER: &str = "abcdefghijklmnopqrstuvwxyz";
