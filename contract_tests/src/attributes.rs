//! Attribute validity lattice contracts
