pub mod genome;
pub mod read;

// re-export for cleaner imports
pub use self::genome::GenomeTable;
pub use self::read::{Read, Strand};
