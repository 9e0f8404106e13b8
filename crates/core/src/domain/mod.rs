pub mod message;
pub mod product;
pub mod wire;
