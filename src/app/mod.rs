pub mod server;

pub use server::{build_router, run_server, AppState};
