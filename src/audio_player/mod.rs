pub mod audio_context;
pub mod audio_player;
pub mod offline;


pub use audio_context::AudioContext;
pub use audio_player::{write_data, AudioPlayer, OutputDevice};
pub use offline::{render_offline, render_to_wav};
