pub mod document;
pub mod error;
pub mod options;
pub mod outline;
pub mod pipeline;
pub mod plugin;
