pub mod encoding;
pub mod fingerprint;
pub mod merge;
pub mod normalize;
pub mod numerus;
pub mod qa;
pub mod stats;
pub mod store;
pub mod translator;
pub mod writer;
