pub mod dataset;
pub mod interval;

// re-export for cleaner imports
pub use self::dataset::ChromosomeDataset;
pub use self::interval::Interval;
