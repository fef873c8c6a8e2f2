//! The election policy: a pure function from a view to an elected member.

mod policy;


pub use policy::Preference;
