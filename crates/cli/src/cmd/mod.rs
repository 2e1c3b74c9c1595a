mod info;
mod install;
mod options;
mod resolve;
mod verify;

pub use info::cmd_info;
pub use install::cmd_install;
pub use options::RecipeArgs;
pub use resolve::cmd_resolve;
pub use verify::cmd_test;
