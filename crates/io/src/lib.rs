#![forbid(unsafe_code)]

pub mod ply;
pub mod xyz;

pub use ply::{read_ply, write_ply, write_ply_binary};
pub use xyz::{parse_xyz, read_xyz};
