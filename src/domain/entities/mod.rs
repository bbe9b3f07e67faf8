//! Domain entities - Core objects with identity

mod player;

pub use player::Player;
