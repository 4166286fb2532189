pub mod partner;
pub mod traffic;
