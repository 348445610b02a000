pub mod interaction;
pub mod stack;
