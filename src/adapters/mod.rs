//! Concrete blockchain adapters.

pub mod ethereum;
