//! Set of traits for defining a graph abstraction.
//! 
//! The module contains traits for defining directed, weighted graphs whose nodes carry a
//! geographic position. Search algorithms and the map matcher are written against these
//! traits, so any graph representation implementing them can be matched against.
//! 
mod graph;
mod spatial;
mod weighted;

pub use graph::*;
pub use spatial::*;
pub use weighted::*;
