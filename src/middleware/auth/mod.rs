mod security;

pub use security::protect;
