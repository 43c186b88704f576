pub mod classify;
pub mod repl;

pub use classify::is_prime;
