pub mod guitar;
pub mod instrument;
pub mod voicing;


pub use guitar::{GuitarConfig, GuitarType};
pub use instrument::{Guitar, GuitarRenderer, StringCommand};
pub use voicing::{compute_frets, FretAssignment};
