pub mod change;
pub mod registry;
pub mod status;
pub mod template;
