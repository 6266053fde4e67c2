//! # Integration Flows

mod acquaintance;
mod lifecycle;
mod speech;

#[cfg(test)]
mod support;
