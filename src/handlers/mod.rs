pub mod deploy;
pub mod echo;
pub mod health;
pub mod list;
pub mod save;

pub use deploy::deploy_handler;
pub use echo::request_echo_handler;
pub use health::{health_handler, root_handler};
pub use list::list_handler;
pub use save::{save_handler, save_query_handler};
