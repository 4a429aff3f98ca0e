pub mod emitters;
pub mod supply;
