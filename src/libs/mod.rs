pub mod batch;
pub mod best;
pub mod blast;
pub mod error;
pub mod filter;
pub mod hsp;
pub mod io;
pub mod proteome;
pub mod rbh;
