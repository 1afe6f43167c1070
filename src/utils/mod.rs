pub mod actor;
pub mod parameter_error_handler;
pub mod response;
pub mod validate;

pub use actor::actor_id;
pub use parameter_error_handler::json_error_handler;
pub use parameter_error_handler::query_error_handler;
pub use response::error_response;
