/// CSV tables and output file naming.
pub mod export;
