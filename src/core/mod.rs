pub mod device;
pub mod engine;
pub mod post;
pub mod prepare;
pub mod runner;
pub mod stereo;
