mod handler;

pub use handler::preview;
