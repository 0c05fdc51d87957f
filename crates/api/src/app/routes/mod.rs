//! Services bundled with the binary.

pub mod system;
