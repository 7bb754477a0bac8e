pub mod artifact;
pub mod common;
pub mod history;
pub mod image;
pub mod request;
pub mod transport;
pub mod video;

pub use artifact::*;
pub use common::*;
pub use history::*;
pub use image::*;
pub use request::*;
pub use transport::*;
pub use video::*;
