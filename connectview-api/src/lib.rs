pub mod impls;
pub mod service;

pub use impls::ConnectApiImpl;
