mod session_rng;

pub mod connect_k;

pub use session_rng::SessionRng;
