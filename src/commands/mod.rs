pub mod session;
pub mod settings;
pub mod utils;

pub use session::{run_session, show_status};
pub use settings::{set_limit, show_settings};
