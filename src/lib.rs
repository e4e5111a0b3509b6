pub mod audio_player;
pub mod error;
pub mod guitar;
pub mod karplus_strong;
pub mod music_representation;
