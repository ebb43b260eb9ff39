mod init;
mod serve;
mod user;

pub use init::cmd_init;
pub use serve::cmd_serve;
pub use user::{cmd_user_add, cmd_user_delete, cmd_user_list, cmd_user_passwd};
