//! Admission, supersede, and correlation contracts
