pub mod app;
pub mod commands;
pub mod container;
pub mod context;
pub mod dispatch;
pub mod env;
pub mod info;
pub mod output;
pub mod page;
pub mod ready;
pub mod resolve;
pub mod runtime;

pub use app::run;
