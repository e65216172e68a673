pub mod card;
pub mod image;
pub mod state;

pub use card::*;
pub use image::*;
pub use state::*;
