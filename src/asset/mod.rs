//! Image asset handling: content digests, destination selection and copying.

mod copy;
mod dedup;
mod digest;

// Selection (pure functions)
pub use dedup::{Destination, Reservations, choose_destination};

// Processing (side effects)
pub use copy::{ImportError, copy_file, ensure_dir};
