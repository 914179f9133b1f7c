mod question;

pub use question::{NUM_OPTIONS, Question};
